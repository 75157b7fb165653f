//=========================================================================
// Dialogue Lines
//=========================================================================

//=== External Dependencies ===============================================

use serde::{Deserialize, Serialize};

//=== DialogueLine ========================================================

/// One authored line of a conversation.
///
/// Choices reference other lines by `id`; a conversation is a directed
/// graph over its lines, not necessarily acyclic.
///
/// # Example
///
/// ```
/// use aetheric_cutscene::core::dialogue::DialogueLine;
///
/// let line = DialogueLine::new("ask", "theo", "Coffee or <wavy>tea</wavy>?")
///     .with_voice("theo")
///     .with_choices(["coffee", "tea"]);
/// assert!(line.has_choices());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DialogueLine {
    /// Identifier choices use to jump to this line.
    #[serde(default)]
    pub id: String,

    /// Speaker face key, without the portrait prefix.
    #[serde(default)]
    pub face: String,

    /// Voice cue played when the reveal starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,

    /// Raw markup.
    pub text: String,

    /// Identifiers of the lines the player may continue with.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,

    /// Ends the conversation after this line (ignored when it has choices).
    #[serde(default, rename = "end")]
    pub end_dialogue: bool,
}

impl DialogueLine {
    pub fn new(id: impl Into<String>, face: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            face: face.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    /// Marks the line as the last of its conversation.
    pub fn ending(mut self) -> Self {
        self.end_dialogue = true;
        self
    }

    pub fn has_choices(&self) -> bool {
        !self.choices.is_empty()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
