//=========================================================================
// Dialogue Configuration
//=========================================================================
//
// Timing and presentation constants shared by the reveal machine, the
// choice menu, the letterbox and the presentation snapshot.
//
//=========================================================================

//=== DialogueConfig ======================================================

/// Timing constants for dialogue presentation.
///
/// # Default Values
///
/// - **Character interval**: 1/40 s between revealed characters
/// - **Character ease-in**: 0.4 s for a glyph to settle
/// - **Box ease rate**: 10.0 per second (box fully visible in 0.1 s)
/// - **Choice ease-in**: 0.5 s, staggered by 0.1 s per choice
/// - **Highlight ease rate**: 3.0 per second
/// - **Talking threshold**: lines longer than 3 characters animate the mouth
/// - **Letterbox ease rate**: 10.0 per second
/// - **Face prefix**: `faces/`
///
/// # Examples
///
/// ```
/// use aetheric_cutscene::core::DialogueConfig;
///
/// let config = DialogueConfig::default()
///     .with_character_interval(1.0 / 60.0)
///     .with_box_ease_rate(20.0);
/// assert_eq!(config.box_ease_rate, 20.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueConfig {
    /// Seconds between two revealed characters.
    pub character_interval: f32,

    /// Seconds a single glyph takes to ease into place.
    pub character_ease_in: f32,

    /// Visibility gained (or lost) per second while the box eases.
    pub box_ease_rate: f32,

    /// Seconds a single choice takes to ease in.
    pub choice_ease_in: f32,

    /// Stagger between consecutive choices easing in.
    pub choice_ease_offset: f32,

    /// Highlight ease gained per second on the selected choice.
    pub highlight_ease_rate: f32,

    /// Lines strictly longer than this animate the talking portrait.
    pub talking_threshold: usize,

    /// Letterbox ease gained (or lost) per second.
    pub letterbox_ease_rate: f32,

    /// Prefix prepended to face keys when resolving portraits.
    pub face_prefix: String,
}

impl DialogueConfig {
    /// Sets the delay between revealed characters.
    ///
    /// # Panics
    ///
    /// Panics if `seconds <= 0.0`.
    pub fn with_character_interval(mut self, seconds: f32) -> Self {
        assert!(seconds > 0.0, "Character interval must be positive, got {}", seconds);
        self.character_interval = seconds;
        self
    }

    /// Sets how long one glyph takes to ease into place.
    ///
    /// # Panics
    ///
    /// Panics if `seconds <= 0.0`.
    pub fn with_character_ease_in(mut self, seconds: f32) -> Self {
        assert!(seconds > 0.0, "Character ease-in must be positive, got {}", seconds);
        self.character_ease_in = seconds;
        self
    }

    /// Sets the dialogue box ease rate.
    ///
    /// # Panics
    ///
    /// Panics if `rate <= 0.0`.
    pub fn with_box_ease_rate(mut self, rate: f32) -> Self {
        assert!(rate > 0.0, "Box ease rate must be positive, got {}", rate);
        self.box_ease_rate = rate;
        self
    }

    /// Sets the per-choice ease-in duration and stagger.
    ///
    /// # Panics
    ///
    /// Panics if `ease_in <= 0.0` or `offset < 0.0`.
    pub fn with_choice_easing(mut self, ease_in: f32, offset: f32) -> Self {
        assert!(ease_in > 0.0, "Choice ease-in must be positive, got {}", ease_in);
        assert!(offset >= 0.0, "Choice ease offset must not be negative, got {}", offset);
        self.choice_ease_in = ease_in;
        self.choice_ease_offset = offset;
        self
    }

    /// Sets the letterbox ease rate.
    ///
    /// # Panics
    ///
    /// Panics if `rate <= 0.0`.
    pub fn with_letterbox_ease_rate(mut self, rate: f32) -> Self {
        assert!(rate > 0.0, "Letterbox ease rate must be positive, got {}", rate);
        self.letterbox_ease_rate = rate;
        self
    }

    /// Sets the prefix used to build portrait keys.
    pub fn with_face_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.face_prefix = prefix.into();
        self
    }

    /// Seconds for the whole choice list to finish easing in.
    pub fn choice_list_ease_time(&self, count: usize) -> f32 {
        count.saturating_sub(1) as f32 * self.choice_ease_offset + self.choice_ease_in
    }
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            character_interval: 1.0 / 40.0,
            character_ease_in: 0.4,
            box_ease_rate: 10.0,
            choice_ease_in: 0.5,
            choice_ease_offset: 0.1,
            highlight_ease_rate: 3.0,
            talking_threshold: 3,
            letterbox_ease_rate: 10.0,
            face_prefix: "faces/".to_string(),
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
