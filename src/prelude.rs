//=========================================================================
// Prelude
//=========================================================================
//
// Common imports for authoring cutscenes.
//
// Usage:
//   use aetheric_cutscene::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine
pub use crate::engine::{Engine, EngineBuilder};

// Host
pub use crate::core::{CutsceneError, DialogueConfig, World};

// Scheduling
pub use crate::core::coroutine::{step_fn, BoxedStep, Frames, Resume, Script, Step, Wait};

// Cutscenes
pub use crate::core::cutscene::audio::{cues, AudioSink};
pub use crate::core::cutscene::motion::{Face, FaceEachOther, MoveTo, MoveToDistance};
pub use crate::core::cutscene::{Cutscene, Pose, Stage};

// Dialogue
pub use crate::core::dialogue::{talk, DialogueLine, DialoguePool, LineCatalog, Say, SayLine};

// Input
pub use crate::core::input::{Controls, MenuAction};
