//=========================================================================
// Platform Bridge
//=========================================================================
//
// Contract between the windowing thread and the logic thread.
//
// Components:
// - `interface`: messages and errors crossing the thread boundary
// - `event_collector`: logic-side draining of those messages per tick
//
//=========================================================================

//=== Module Declarations =================================================

pub(crate) mod event_collector;
pub(crate) mod interface;

//=== Internal API ========================================================

pub(crate) use event_collector::{EventCollector, TickControl};
pub(crate) use interface::{PlatformError, PlatformEvent};
