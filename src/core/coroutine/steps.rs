//=========================================================================
// Step Helpers
//=========================================================================
//
// Small building blocks for composing scripted behavior:
//
//   step_fn  → closure as a step
//   Wait     → suspend for a fixed number of seconds
//   Frames   → suspend for a fixed number of frames
//   Script   → ordered list of waits, frames, instant actions and
//              awaited child steps
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::collections::VecDeque;

//=== Internal Dependencies ===============================================

use super::{BoxedStep, Resume, Step};
use crate::core::error::CutsceneError;

//=== StepFn ==============================================================

/// Closure adapter produced by [`step_fn`].
pub struct StepFn<F> {
    f: F,
}

/// Wraps a closure as a step. The closure is called on every resume.
pub fn step_fn<C, F>(f: F) -> StepFn<F>
where
    F: FnMut(&mut C, f32) -> Result<Resume<C>, CutsceneError>,
{
    StepFn { f }
}

impl<C, F> Step<C> for StepFn<F>
where
    F: FnMut(&mut C, f32) -> Result<Resume<C>, CutsceneError>,
{
    fn resume(&mut self, ctx: &mut C, dt: f32) -> Result<Resume<C>, CutsceneError> {
        (self.f)(ctx, dt)
    }

    fn name(&self) -> &'static str {
        "step_fn"
    }
}

//=== Wait ================================================================

/// Suspends for `seconds`, then finishes.
#[derive(Debug, Clone, Copy)]
pub struct Wait {
    seconds: f32,
    issued: bool,
}

impl Wait {
    pub fn new(seconds: f32) -> Self {
        Self { seconds, issued: false }
    }
}

impl<C> Step<C> for Wait {
    fn resume(&mut self, _ctx: &mut C, _dt: f32) -> Result<Resume<C>, CutsceneError> {
        if self.issued {
            return Ok(Resume::Done);
        }
        self.issued = true;
        Ok(Resume::wait(self.seconds))
    }

    fn name(&self) -> &'static str {
        "wait"
    }
}

//=== Frames ==============================================================

/// Suspends for `count` frames, then finishes.
#[derive(Debug, Clone, Copy)]
pub struct Frames {
    remaining: u32,
}

impl Frames {
    pub fn new(count: u32) -> Self {
        Self { remaining: count }
    }
}

impl<C> Step<C> for Frames {
    fn resume(&mut self, _ctx: &mut C, _dt: f32) -> Result<Resume<C>, CutsceneError> {
        if self.remaining == 0 {
            return Ok(Resume::Done);
        }
        self.remaining -= 1;
        Ok(Resume::frame())
    }

    fn name(&self) -> &'static str {
        "frames"
    }
}

//=== Script ==============================================================

type Factory<C> = Box<dyn FnOnce(&mut C) -> Result<BoxedStep<C>, CutsceneError>>;
type Action<C> = Box<dyn FnOnce(&mut C) -> Result<(), CutsceneError>>;
type Condition<C> = Box<dyn FnMut(&mut C) -> bool>;

enum Item<C> {
    Then(Factory<C>),
    Run(Action<C>),
    Until(Condition<C>),
    Wait(f32),
    Frame,
}

/// Ordered list of scripted items executed one after another.
///
/// Instant actions run back to back within the same tick; waits, frames,
/// conditions and awaited steps suspend the script.
///
/// # Examples
///
/// ```
/// use aetheric_cutscene::core::coroutine::{Scheduler, Script};
///
/// let script = Script::<Vec<&str>>::new()
///     .run(|log| { log.push("start"); Ok(()) })
///     .wait(0.5)
///     .run(|log| { log.push("end"); Ok(()) });
///
/// let mut log = Vec::new();
/// let mut scheduler = Scheduler::new();
/// scheduler.run(Box::new(script));
/// scheduler.update(&mut log, 0.1).unwrap();
/// assert_eq!(log, vec!["start"]);
/// ```
pub struct Script<C> {
    items: VecDeque<Item<C>>,
}

impl<C: 'static> Script<C> {
    pub fn new() -> Self {
        Self { items: VecDeque::new() }
    }

    //--- Builder API ------------------------------------------------------

    /// Awaits the step built by `factory` when the script reaches it.
    pub fn then<F>(mut self, factory: F) -> Self
    where
        F: FnOnce(&mut C) -> Result<BoxedStep<C>, CutsceneError> + 'static,
    {
        self.items.push_back(Item::Then(Box::new(factory)));
        self
    }

    /// Awaits an already constructed step.
    pub fn then_step(self, step: impl Step<C> + 'static) -> Self {
        let boxed: BoxedStep<C> = Box::new(step);
        self.then(move |_| Ok(boxed))
    }

    /// Runs an instant action without suspending.
    pub fn run<F>(mut self, action: F) -> Self
    where
        F: FnOnce(&mut C) -> Result<(), CutsceneError> + 'static,
    {
        self.items.push_back(Item::Run(Box::new(action)));
        self
    }

    /// Suspends one frame at a time until `condition` holds.
    pub fn until<F>(mut self, condition: F) -> Self
    where
        F: FnMut(&mut C) -> bool + 'static,
    {
        self.items.push_back(Item::Until(Box::new(condition)));
        self
    }

    /// Suspends for `seconds`.
    pub fn wait(mut self, seconds: f32) -> Self {
        self.items.push_back(Item::Wait(seconds));
        self
    }

    /// Suspends for one frame.
    pub fn frame(mut self) -> Self {
        self.items.push_back(Item::Frame);
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<C: 'static> Default for Script<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: 'static> Step<C> for Script<C> {
    fn resume(&mut self, ctx: &mut C, _dt: f32) -> Result<Resume<C>, CutsceneError> {
        while let Some(item) = self.items.pop_front() {
            match item {
                Item::Run(action) => action(ctx)?,
                Item::Then(factory) => return Ok(Resume::await_boxed(factory(ctx)?)),
                Item::Wait(seconds) => return Ok(Resume::wait(seconds)),
                Item::Frame => return Ok(Resume::frame()),
                Item::Until(mut condition) => {
                    if !condition(ctx) {
                        self.items.push_front(Item::Until(condition));
                        return Ok(Resume::frame());
                    }
                }
            }
        }
        Ok(Resume::Done)
    }

    fn name(&self) -> &'static str {
        "script"
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
