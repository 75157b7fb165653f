//=========================================================================
// Input System
//=========================================================================
//
// Turns each frame's raw input events into the `Controls` snapshot that
// cutscenes read.
//
// Architecture:
//   InputEvent batches → StateTracker (edges) → ActionMapper → Controls
//
// Owned and updated by the logic thread once per tick.
//
//=========================================================================

//=== Submodules ==========================================================

mod action;
mod action_mapper;
pub mod event;
mod state_tracker;

//=== External Dependencies ===============================================

use log::trace;

//=== Public API ==========================================================

pub use action::{Controls, MenuAction};
pub use action_mapper::ActionMapper;
pub use event::{InputEvent, KeyCode, Modifiers, MouseButton};
pub use state_tracker::StateTracker;

//=== InputSystem =========================================================

#[derive(Debug)]
pub struct InputSystem {
    tracker: StateTracker,
    mapper: ActionMapper,
    controls: Controls,
}

impl InputSystem {
    /// Creates a system with the default menu bindings.
    pub fn new() -> Self {
        Self::with_mapper(ActionMapper::with_default_bindings())
    }

    pub fn with_mapper(mapper: ActionMapper) -> Self {
        Self {
            tracker: StateTracker::new(),
            mapper,
            controls: Controls::NONE,
        }
    }

    //--- update() ---------------------------------------------------------

    /// Consumes this frame's batches and returns the resulting controls.
    pub fn update(&mut self, batches: &[Vec<InputEvent>]) -> Controls {
        self.tracker.clear();
        for batch in batches {
            self.tracker.process_events(batch);
        }

        let mut controls = Controls::NONE;
        for key in self.tracker.keys_pressed() {
            if let Some(action) = self.mapper.map_key(key) {
                controls.press(action);
            }
        }
        for button in self.tracker.buttons_pressed() {
            if let Some(action) = self.mapper.map_button(button) {
                controls.press(action);
            }
        }

        if controls.any() {
            trace!(target: "platform::input", "Controls: {:?}", controls);
        }
        self.controls = controls;
        controls
    }

    //--- Queries ----------------------------------------------------------

    /// Controls produced by the last update.
    pub fn controls(&self) -> Controls {
        self.controls
    }

    pub fn tracker(&self) -> &StateTracker {
        &self.tracker
    }

    pub fn mapper_mut(&mut self) -> &mut ActionMapper {
        &mut self.mapper
    }
}

impl Default for InputSystem {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_press_becomes_one_tick_of_control() {
        let mut system = InputSystem::new();

        let controls = system.update(&[vec![InputEvent::key_down(KeyCode::Enter)]]);
        assert!(controls.confirm);

        // Still held: no new edge.
        let controls = system.update(&[]);
        assert_eq!(controls, Controls::NONE);
    }

    #[test]
    fn modifiers_do_not_block_bindings() {
        let mut system = InputSystem::new();
        let shifted = InputEvent::KeyDown { key: KeyCode::ArrowDown, modifiers: Modifiers::SHIFT };
        assert!(system.update(&[vec![shifted]]).down);
    }

    #[test]
    fn batches_merge_within_a_frame() {
        let mut system = InputSystem::new();
        let controls = system.update(&[
            vec![InputEvent::key_down(KeyCode::KeyW)],
            vec![InputEvent::MouseMoved { x: 3.0, y: 4.0 }],
            vec![InputEvent::key_down(KeyCode::Escape)],
        ]);
        assert!(controls.up && controls.cancel);
        assert!(!controls.confirm);
        assert_eq!(system.controls(), controls);
    }

    #[test]
    fn custom_bindings_apply() {
        let mut system = InputSystem::with_mapper(ActionMapper::new());
        assert_eq!(system.update(&[vec![InputEvent::key_down(KeyCode::Enter)]]), Controls::NONE);

        system.mapper_mut().bind_key(KeyCode::Tab, MenuAction::Confirm);
        assert!(system.update(&[vec![InputEvent::key_down(KeyCode::Tab)]]).confirm);
    }
}
