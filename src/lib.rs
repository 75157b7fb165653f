//=========================================================================
// Aetheric Cutscene: Library Root
//=========================================================================
//
// Cooperative cutscenes, dialogue markup and branching conversations on
// top of a fixed-rate logic thread.
//
// Typical usage:
// ```no_run
// use aetheric_cutscene::prelude::*;
//
// EngineBuilder::new()
//     .build()
//     .init(|world| {
//         world.add(Cutscene::new("sign", |_| {
//             Say::new(vec![DialogueLine::new("a", "", "Keep out!")])
//         }));
//     })
//     .run();
// ```
//
// Errors surface as `Result`s or as cutscene failures collected by the
// World. The only panicking entry points are `EngineBuilder::with_tps`
// and `EngineBuilder::with_channel_capacity`, which reject non-positive
// values.
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds everything that runs on the logic thread: the scheduler,
// markup, dialogue, cutscenes and the World hosting them.
//
pub mod core;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `platform` owns the winit window and event loop; `engine` wires it to
// the logic thread.
//
mod engine;
mod platform;

//--- Public Exports ------------------------------------------------------

pub use engine::{Engine, EngineBuilder};
