//=========================================================================
// Menu Actions & Controls
//=========================================================================
//
// The closed set of inputs cutscenes react to, and the per-tick snapshot
// of which of them were pressed.
//
// Architecture:
//   keys/buttons pressed this frame → ActionMapper → MenuAction → Controls
//
// Every signal in `Controls` is edge-triggered: true only on the tick the
// bound key or button went down.
//
//=========================================================================

//=== MenuAction ==========================================================

/// High-level menu input consumed by dialogue and cutscenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuAction {
    Confirm,
    Cancel,
    Up,
    Down,
    Left,
    Right,
}

impl MenuAction {
    pub const ALL: [MenuAction; 6] = [
        MenuAction::Confirm,
        MenuAction::Cancel,
        MenuAction::Up,
        MenuAction::Down,
        MenuAction::Left,
        MenuAction::Right,
    ];
}

//=== Controls ============================================================

/// Edge-triggered menu signals for one tick.
///
/// # Example
///
/// ```
/// use aetheric_cutscene::core::input::{Controls, MenuAction};
///
/// let controls = Controls::pressed(&[MenuAction::Cancel]);
/// assert!(controls.skip());
/// assert!(!controls.confirm);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    pub confirm: bool,
    pub cancel: bool,
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Controls {
    /// No signal pressed.
    pub const NONE: Controls = Controls {
        confirm: false,
        cancel: false,
        up: false,
        down: false,
        left: false,
        right: false,
    };

    /// Controls with exactly the given actions pressed.
    pub fn pressed(actions: &[MenuAction]) -> Self {
        let mut controls = Self::NONE;
        for &action in actions {
            controls.press(action);
        }
        controls
    }

    /// Marks `action` as pressed this tick.
    pub fn press(&mut self, action: MenuAction) {
        match action {
            MenuAction::Confirm => self.confirm = true,
            MenuAction::Cancel => self.cancel = true,
            MenuAction::Up => self.up = true,
            MenuAction::Down => self.down = true,
            MenuAction::Left => self.left = true,
            MenuAction::Right => self.right = true,
        }
    }

    pub fn is_pressed(&self, action: MenuAction) -> bool {
        match action {
            MenuAction::Confirm => self.confirm,
            MenuAction::Cancel => self.cancel,
            MenuAction::Up => self.up,
            MenuAction::Down => self.down,
            MenuAction::Left => self.left,
            MenuAction::Right => self.right,
        }
    }

    /// Confirm or cancel: both advance and fast-forward dialogue.
    pub fn skip(&self) -> bool {
        self.confirm || self.cancel
    }

    pub fn any(&self) -> bool {
        *self != Self::NONE
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
