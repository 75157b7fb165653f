//=========================================================================
// Choice Selection
//=========================================================================
//
// Highlight cursor over a list of choices.
//
// Movement wraps circularly. The last confirmed index is remembered and
// becomes the initial highlight the next time a list of at least that
// many choices opens.
//
//=========================================================================

//=== ChoiceSelection =====================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChoiceSelection {
    highlighted: usize,
    last_confirmed: usize,
}

impl ChoiceSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets the highlight for a list of `count` choices.
    pub fn open(&mut self, count: usize) {
        self.highlighted = if self.last_confirmed < count {
            self.last_confirmed
        } else {
            0
        };
    }

    /// Moves the highlight up, wrapping from the first to the last choice.
    pub fn move_up(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        self.highlighted = match self.highlighted {
            0 => count - 1,
            i => (i - 1).min(count - 1),
        };
    }

    /// Moves the highlight down, wrapping from the last to the first choice.
    pub fn move_down(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        self.highlighted = (self.highlighted + 1) % count;
    }

    /// Locks the highlighted index as the result.
    pub fn confirm(&mut self) -> usize {
        self.last_confirmed = self.highlighted;
        self.highlighted
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    pub fn last_confirmed(&self) -> usize {
        self.last_confirmed
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
