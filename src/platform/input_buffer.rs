//=========================================================================
// Input Buffer
//=========================================================================
//
// Per-frame store between winit callbacks and the platform channel.
//
// - `discrete`: keys, buttons and focus changes, order kept; an exact
//   repeat of the previous event (key auto-repeat) is dropped
// - `continuous`: the latest cursor position only
//
// Drained once per `RedrawRequested`.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::input::event::InputEvent;

//=== InputBuffer =========================================================

pub(crate) struct InputBuffer {
    discrete: Vec<InputEvent>,
    cursor: Option<InputEvent>,
}

impl InputBuffer {
    pub(crate) fn new() -> Self {
        const DISCRETE_BASE: usize = 32;

        Self {
            discrete: Vec::with_capacity(DISCRETE_BASE),
            cursor: None,
        }
    }

    //--- Recording --------------------------------------------------------

    pub(crate) fn push_discrete(&mut self, event: InputEvent) {
        if self.discrete.last() != Some(&event) {
            self.discrete.push(event);
        }
    }

    /// Keeps only the newest continuous event.
    pub(crate) fn push_continuous(&mut self, event: InputEvent) {
        self.cursor = Some(event);
    }

    //--- Drain ------------------------------------------------------------

    /// Takes this frame's events, or `None` when nothing arrived.
    pub(crate) fn drain(&mut self) -> Option<(Vec<InputEvent>, Vec<InputEvent>)> {
        if self.is_empty() {
            return None;
        }
        let capacity = self.discrete.capacity();
        let discrete = std::mem::replace(&mut self.discrete, Vec::with_capacity(capacity));
        let continuous = self.cursor.take().into_iter().collect();
        Some((discrete, continuous))
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.discrete.is_empty() && self.cursor.is_none()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::event::KeyCode;

    #[test]
    fn auto_repeat_is_collapsed() {
        let mut buffer = InputBuffer::new();
        buffer.push_discrete(InputEvent::key_down(KeyCode::ArrowDown));
        buffer.push_discrete(InputEvent::key_down(KeyCode::ArrowDown));
        buffer.push_discrete(InputEvent::key_up(KeyCode::ArrowDown));
        buffer.push_discrete(InputEvent::key_down(KeyCode::ArrowDown));

        let (discrete, _) = buffer.drain().unwrap();
        assert_eq!(discrete.len(), 3);
    }

    #[test]
    fn cursor_keeps_latest_position() {
        let mut buffer = InputBuffer::new();
        buffer.push_continuous(InputEvent::MouseMoved { x: 10.0, y: 10.0 });
        buffer.push_continuous(InputEvent::MouseMoved { x: 20.0, y: 30.0 });

        let (discrete, continuous) = buffer.drain().unwrap();
        assert!(discrete.is_empty());
        assert_eq!(continuous, vec![InputEvent::MouseMoved { x: 20.0, y: 30.0 }]);
    }

    #[test]
    fn drain_empties_and_reports_nothing_next() {
        let mut buffer = InputBuffer::new();
        assert!(buffer.drain().is_none());

        buffer.push_discrete(InputEvent::FocusLost);
        assert!(buffer.drain().is_some());
        assert!(buffer.is_empty());
        assert!(buffer.drain().is_none());
    }
}
