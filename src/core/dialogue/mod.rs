//=========================================================================
// Dialogue
//=========================================================================
//
// Presenting lines and walking conversations.
//
//   line      → authored line data (serde)
//   catalog   → named conversations loaded from JSON
//   choice    → highlight cursor of the choice menu
//   reveal    → per-line presentation state machine
//   say       → SayLine / Say steps run by cutscenes
//   pool      → per-speaker conversations selected by index
//   portrait  → portrait frame lookup
//   snapshot  → read-only per-frame view for rendering
//
//=========================================================================

//=== Submodules ==========================================================

mod catalog;
mod choice;
mod line;
mod pool;
mod portrait;
mod reveal;
mod say;
mod snapshot;

//=== Public API ==========================================================

pub use catalog::LineCatalog;
pub use choice::ChoiceSelection;
pub use line::DialogueLine;
pub use pool::{talk, DialoguePool, SharedPool};
pub use portrait::{resolve_portrait, PortraitCatalog};
pub use reveal::{ChoiceView, Phase, Presentation, RevealStatus};
pub use say::{Say, SayLine};
pub use snapshot::{ChoiceSnapshot, Glyph, LineSnapshot, StageSnapshot};
