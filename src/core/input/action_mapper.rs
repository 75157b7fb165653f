//=========================================================================
// Action Mapper
//=========================================================================
//
// Binds keys and mouse buttons to menu actions.
//
// Architecture:
//   key/button pressed this frame → HashMap → MenuAction
//
// Bindings ignore modifiers: Shift+Enter still confirms.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::collections::HashMap;

//=== Internal Dependencies ===============================================

use super::action::MenuAction;
use super::event::{KeyCode, MouseButton};

//=== ActionMapper ========================================================

#[derive(Debug, Clone, Default)]
pub struct ActionMapper {
    key_bindings: HashMap<KeyCode, MenuAction>,
    mouse_bindings: HashMap<MouseButton, MenuAction>,
}

impl ActionMapper {
    /// Creates a mapper with no bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter/Space/C confirm, Escape/X/Backspace cancel, arrows and WASD
    /// navigate, left click confirms.
    pub fn with_default_bindings() -> Self {
        use KeyCode::*;
        use MenuAction::*;

        let mut mapper = Self::new();
        for (key, action) in [
            (Enter, Confirm),
            (Space, Confirm),
            (KeyC, Confirm),
            (Escape, Cancel),
            (KeyX, Cancel),
            (Backspace, Cancel),
            (ArrowUp, Up),
            (KeyW, Up),
            (ArrowDown, Down),
            (KeyS, Down),
            (ArrowLeft, Left),
            (KeyA, Left),
            (ArrowRight, Right),
            (KeyD, Right),
        ] {
            mapper.bind_key(key, action);
        }
        mapper.bind_mouse(MouseButton::Left, Confirm);
        mapper
    }

    //--- Binding API ------------------------------------------------------

    /// Binds `key`, replacing any previous binding of that key.
    pub fn bind_key(&mut self, key: KeyCode, action: MenuAction) {
        self.key_bindings.insert(key, action);
    }

    pub fn bind_mouse(&mut self, button: MouseButton, action: MenuAction) {
        self.mouse_bindings.insert(button, action);
    }

    pub fn unbind_key(&mut self, key: KeyCode) {
        self.key_bindings.remove(&key);
    }

    pub fn unbind_mouse(&mut self, button: MouseButton) {
        self.mouse_bindings.remove(&button);
    }

    /// Removes every binding of `action`.
    pub fn clear_action(&mut self, action: MenuAction) {
        self.key_bindings.retain(|_, bound| *bound != action);
        self.mouse_bindings.retain(|_, bound| *bound != action);
    }

    //--- Mapping ----------------------------------------------------------

    pub fn map_key(&self, key: KeyCode) -> Option<MenuAction> {
        self.key_bindings.get(&key).copied()
    }

    pub fn map_button(&self, button: MouseButton) -> Option<MenuAction> {
        self.mouse_bindings.get(&button).copied()
    }

    /// Keys currently bound to `action`.
    pub fn keys_for(&self, action: MenuAction) -> Vec<KeyCode> {
        self.key_bindings
            .iter()
            .filter(|(_, bound)| **bound == action)
            .map(|(key, _)| *key)
            .collect()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_action() {
        let mapper = ActionMapper::with_default_bindings();
        for action in MenuAction::ALL {
            assert!(!mapper.keys_for(action).is_empty(), "{action:?} unbound");
        }
        assert_eq!(mapper.map_key(KeyCode::KeyW), Some(MenuAction::Up));
        assert_eq!(mapper.map_key(KeyCode::Escape), Some(MenuAction::Cancel));
        assert_eq!(mapper.map_button(MouseButton::Left), Some(MenuAction::Confirm));
    }

    #[test]
    fn unbound_input_maps_to_nothing() {
        let mapper = ActionMapper::new();
        assert_eq!(mapper.map_key(KeyCode::Enter), None);
        assert_eq!(mapper.map_key(KeyCode::Unidentified), None);
    }

    #[test]
    fn rebinding_replaces_previous_action() {
        let mut mapper = ActionMapper::with_default_bindings();
        mapper.bind_key(KeyCode::Space, MenuAction::Cancel);
        assert_eq!(mapper.map_key(KeyCode::Space), Some(MenuAction::Cancel));

        mapper.unbind_key(KeyCode::Space);
        assert_eq!(mapper.map_key(KeyCode::Space), None);
    }

    #[test]
    fn clear_action_removes_keys_and_buttons() {
        let mut mapper = ActionMapper::with_default_bindings();
        mapper.clear_action(MenuAction::Confirm);
        assert!(mapper.keys_for(MenuAction::Confirm).is_empty());
        assert_eq!(mapper.map_button(MouseButton::Left), None);
        assert_eq!(mapper.map_key(KeyCode::Escape), Some(MenuAction::Cancel));
    }
}
