//=========================================================================
// Coroutines
//=========================================================================
//
// Cooperative, tick-driven scripted behavior.
//
// Architecture:
// ```text
//   Scheduler ──update(dt)──> top Step ──resume()──> Resume
//       ▲                                              │
//       │   Yield(Frame)      → resume next update     │
//       │   Yield(Wait(s))    → resume once s elapsed  │
//       │   Yield(Await(step))→ push child, drive it   │
//       └── Done              → pop, continue parent ──┘
// ```
//
// A step suspends only by returning `Resume::Yield`. The three
// suspension kinds in `Suspend` are the only legal yield values.
//
//=========================================================================

//=== Submodules ==========================================================

mod scheduler;
mod steps;

//=== Internal Dependencies ===============================================

use crate::core::error::CutsceneError;

//=== Public API ==========================================================

pub use scheduler::{Scheduler, MAX_RESUMES, WAIT_EPSILON};
pub use steps::{step_fn, Frames, Script, StepFn, Wait};

//=== Suspend =============================================================

/// Suspension request issued by a step.
pub enum Suspend<C> {
    /// Resume on the next `Scheduler::update`.
    Frame,

    /// Resume once the given number of seconds has elapsed.
    Wait(f32),

    /// Drive the child to completion, then resume the parent.
    Await(BoxedStep<C>),
}

//=== Resume ==============================================================

/// Outcome of resuming a step once.
pub enum Resume<C> {
    /// The step suspended and must be resumed later.
    Yield(Suspend<C>),

    /// The step finished.
    Done,
}

impl<C> Resume<C> {
    /// Shorthand for `Resume::Yield(Suspend::Frame)`.
    pub fn frame() -> Self {
        Resume::Yield(Suspend::Frame)
    }

    /// Shorthand for `Resume::Yield(Suspend::Wait(seconds))`.
    pub fn wait(seconds: f32) -> Self {
        Resume::Yield(Suspend::Wait(seconds))
    }

    /// Shorthand for awaiting a child step.
    pub fn await_step(step: impl Step<C> + 'static) -> Self {
        Resume::Yield(Suspend::Await(Box::new(step)))
    }

    /// Shorthand for awaiting an already boxed child step.
    pub fn await_boxed(step: BoxedStep<C>) -> Self {
        Resume::Yield(Suspend::Await(step))
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Resume::Done)
    }
}

impl<C> std::fmt::Debug for Resume<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resume::Yield(Suspend::Frame) => write!(f, "Yield(Frame)"),
            Resume::Yield(Suspend::Wait(seconds)) => write!(f, "Yield(Wait({seconds}))"),
            Resume::Yield(Suspend::Await(step)) => write!(f, "Yield(Await({}))", step.name()),
            Resume::Done => write!(f, "Done"),
        }
    }
}

//=== Step ================================================================

/// A resumable unit of sequential logic driven by a [`Scheduler`].
///
/// `ctx` is the context owned by whoever drives the scheduler (for
/// cutscenes, the `Stage`). `dt` is the duration of the current tick; a
/// step resumed several times within one tick (after a child finishes)
/// sees the same `dt` each time.
///
/// Returning `Err` abandons the whole task.
pub trait Step<C> {
    fn resume(&mut self, ctx: &mut C, dt: f32) -> Result<Resume<C>, CutsceneError>;

    /// Short name used in scheduler diagnostics.
    fn name(&self) -> &'static str {
        "step"
    }
}

/// Heap-allocated step, as stored by the scheduler.
pub type BoxedStep<C> = Box<dyn Step<C>>;

impl<C> Step<C> for BoxedStep<C> {
    fn resume(&mut self, ctx: &mut C, dt: f32) -> Result<Resume<C>, CutsceneError> {
        (**self).resume(ctx, dt)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
