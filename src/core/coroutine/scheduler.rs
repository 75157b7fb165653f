//=========================================================================
// Scheduler
//=========================================================================
//
// Drives one task (a stack of nested steps) to completion across ticks.
//
// Update flow:
//   1. Pending wait: subtract dt, stop unless the remainder reached zero
//   2. Resume the innermost step
//   3. Frame / Wait → stop for this tick
//      Await        → push child and resume it immediately
//      Done         → pop and resume the parent immediately
//
// Surplus wait time within a tick is dropped, not carried forward.
// Cancelling (or replacing) the task drops the suspended stack without
// resuming it.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, trace, warn};

//=== Internal Dependencies ===============================================

use super::{BoxedStep, Resume, Step, Suspend};
use crate::core::error::CutsceneError;

//=== Constants ===========================================================

/// Maximum number of resumes performed by a single `update`.
///
/// A chain of steps that never suspends would otherwise hang the tick.
/// Work left when the budget runs out continues on the next update.
pub const MAX_RESUMES: usize = 256;

/// Remaining wait time at or below this value counts as elapsed.
pub const WAIT_EPSILON: f32 = 1e-5;

//=== Scheduler ===========================================================

/// Owns at most one active task and advances it once per tick.
///
/// # Examples
///
/// ```
/// use aetheric_cutscene::core::coroutine::{Resume, Scheduler, step_fn};
///
/// let mut ticks = 0;
/// let mut scheduler = Scheduler::<u32>::new();
/// scheduler.run(Box::new(step_fn(|count: &mut u32, _dt| {
///     *count += 1;
///     Ok(if *count < 3 { Resume::frame() } else { Resume::Done })
/// })));
///
/// let mut count = 0;
/// while scheduler.is_running() {
///     scheduler.update(&mut count, 1.0 / 60.0).unwrap();
///     ticks += 1;
/// }
/// assert_eq!(ticks, 3);
/// ```
pub struct Scheduler<C> {
    /// Suspended call stack; the innermost step is last.
    stack: Vec<BoxedStep<C>>,

    /// Seconds left on the wait issued by the innermost step.
    waiting: Option<f32>,
}

impl<C> Scheduler<C> {
    pub fn new() -> Self {
        Self {
            stack: Vec::with_capacity(8),
            waiting: None,
        }
    }

    //--- Task Control -----------------------------------------------------

    /// Installs a new top-level task, cancelling any task already running.
    pub fn run(&mut self, step: BoxedStep<C>) {
        if self.is_running() {
            debug!(
                target: "scheduler",
                "Replacing running task (depth {}) with '{}'",
                self.stack.len(),
                step.name()
            );
        }
        self.clear();
        self.stack.push(step);
    }

    /// Boxes and installs a new top-level task.
    pub fn run_step(&mut self, step: impl Step<C> + 'static) {
        self.run(Box::new(step));
    }

    /// Abandons the running task without resuming it.
    pub fn cancel(&mut self) {
        if self.is_running() {
            debug!(target: "scheduler", "Cancelling task (depth {})", self.stack.len());
        }
        self.clear();
    }

    //--- Queries ----------------------------------------------------------

    /// Returns true while a task is installed and unfinished.
    pub fn is_running(&self) -> bool {
        !self.stack.is_empty()
    }

    /// Number of nested steps currently suspended.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Seconds left on the current wait, if any.
    pub fn remaining_wait(&self) -> Option<f32> {
        self.waiting
    }

    //--- update() ---------------------------------------------------------

    /// Advances the running task by one tick.
    ///
    /// On error the whole task is abandoned and the error returned.
    pub fn update(&mut self, ctx: &mut C, dt: f32) -> Result<(), CutsceneError> {
        if let Some(remaining) = self.waiting.as_mut() {
            *remaining -= dt;
            if *remaining > WAIT_EPSILON {
                return Ok(());
            }
            self.waiting = None;
        }

        let mut budget = MAX_RESUMES;

        while let Some(top) = self.stack.last_mut() {
            if budget == 0 {
                warn!(
                    target: "scheduler",
                    "Task did not suspend after {} resumes, continuing next tick",
                    MAX_RESUMES
                );
                break;
            }
            budget -= 1;

            let resumed = top.resume(ctx, dt);
            match resumed {
                Ok(Resume::Yield(Suspend::Frame)) => break,
                Ok(Resume::Yield(Suspend::Wait(seconds))) => {
                    self.waiting = Some(seconds);
                    break;
                }
                Ok(Resume::Yield(Suspend::Await(child))) => {
                    trace!(target: "scheduler", "Awaiting '{}'", child.name());
                    self.stack.push(child);
                }
                Ok(Resume::Done) => {
                    self.stack.pop();
                }
                Err(err) => {
                    debug!(target: "scheduler", "Task failed, abandoning stack: {}", err);
                    self.clear();
                    return Err(err);
                }
            }
        }

        Ok(())
    }

    //--- Internal Helpers -------------------------------------------------

    fn clear(&mut self) {
        self.stack.clear();
        self.waiting = None;
    }
}

impl<C> Default for Scheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
