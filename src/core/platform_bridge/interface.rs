//=========================================================================
// Platform Bridge Interface
//=========================================================================
//
// Messages the platform sends to the logic thread, and the errors that
// stop the platform from running at all.
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::input::event::InputEvent;

//=== PlatformEvent =======================================================

/// One message over the platform → logic channel.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PlatformEvent {
    /// Input gathered during one rendered frame. Never sent empty.
    Inputs {
        /// Keys, buttons and focus changes, in arrival order.
        discrete: Vec<InputEvent>,

        /// Latest cursor position only.
        continuous: Vec<InputEvent>,
    },

    /// The window is closing; the logic thread should stop.
    WindowClosed,
}

impl PlatformEvent {
    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Inputs { discrete, continuous } => discrete.len() + continuous.len(),
            Self::WindowClosed => 0,
        }
    }
}

//=== PlatformError =======================================================

/// Fatal platform failures. winit errors are carried as text so the core
/// never names winit types.
#[derive(Debug, Error)]
pub(crate) enum PlatformError {
    #[error("event loop creation failed: {0}")]
    EventLoopCreation(String),

    #[error("event loop error: {0}")]
    EventLoopExecution(String),
}

//=========================================================================
// Unit Tests
//=========================================================================
