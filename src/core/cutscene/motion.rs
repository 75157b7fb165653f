//=========================================================================
// Scripted Motion
//=========================================================================
//
// Steps that walk and turn named puppets on the stage. A puppet missing
// from the stage turns the step into a no-op.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::f32::consts::TAU;

//=== External Dependencies ===============================================

use glam::Vec2;
use log::trace;

//=== Internal Dependencies ===============================================

use super::stage::Stage;
use crate::core::coroutine::{Resume, Step};
use crate::core::ease::{angle_approach, angle_diff, angle_of, approach_vec, from_angle};
use crate::core::error::CutsceneError;

//=== Constants ===========================================================

/// Walking speed, in units per second.
pub const WALK_SPEED: f32 = 50.0;

/// Turning speed, in radians per second.
pub const TURN_SPEED: f32 = TAU * 1.5;

/// Facing counts as reached within this many radians.
pub const FACING_TOLERANCE: f32 = 0.05;

/// Farther moves turn towards the destination first.
pub const TURN_FIRST_DISTANCE: f32 = 4.0;

//=== Face ================================================================

/// Turns a puppet towards a point.
pub struct Face {
    puppet: String,
    target: Vec2,
}

impl Face {
    pub fn new(puppet: impl Into<String>, target: Vec2) -> Self {
        Self {
            puppet: puppet.into(),
            target,
        }
    }
}

impl Step<Stage> for Face {
    fn resume(&mut self, stage: &mut Stage, dt: f32) -> Result<Resume<Stage>, CutsceneError> {
        let Some(pose) = stage.puppets.get_mut(&self.puppet) else {
            return Ok(Resume::Done);
        };
        let Some(wanted) = (self.target - pose.position).try_normalize() else {
            return Ok(Resume::Done);
        };

        let (current, goal) = (angle_of(pose.facing), angle_of(wanted));
        if angle_diff(current, goal).abs() <= FACING_TOLERANCE {
            return Ok(Resume::Done);
        }

        pose.facing = from_angle(angle_approach(current, goal, TURN_SPEED * dt));
        Ok(Resume::frame())
    }

    fn name(&self) -> &'static str {
        "face"
    }
}

//=== MoveTo ==============================================================

/// Walks a puppet to a point at [`WALK_SPEED`].
pub struct MoveTo {
    puppet: String,
    target: Vec2,
    turned: bool,
}

impl MoveTo {
    pub fn new(puppet: impl Into<String>, target: Vec2) -> Self {
        Self {
            puppet: puppet.into(),
            target,
            turned: false,
        }
    }
}

impl Step<Stage> for MoveTo {
    fn resume(&mut self, stage: &mut Stage, dt: f32) -> Result<Resume<Stage>, CutsceneError> {
        let Some(pose) = stage.puppets.get_mut(&self.puppet) else {
            return Ok(Resume::Done);
        };

        if !self.turned {
            self.turned = true;
            if pose.position.distance(self.target) > TURN_FIRST_DISTANCE {
                trace!(target: "cutscene", "{} turns before walking", self.puppet);
                return Ok(Resume::await_step(Face::new(self.puppet.clone(), self.target)));
            }
        }

        if pose.position == self.target {
            return Ok(Resume::Done);
        }

        pose.position = approach_vec(pose.position, self.target, WALK_SPEED * dt);
        Ok(Resume::frame())
    }

    fn name(&self) -> &'static str {
        "move_to"
    }
}

//=== MoveToDistance ======================================================

/// Walks a puppet towards a point, stopping `distance` units short of it
/// on the side it came from.
pub struct MoveToDistance {
    puppet: String,
    target: Vec2,
    distance: f32,
    started: bool,
}

impl MoveToDistance {
    pub fn new(puppet: impl Into<String>, target: Vec2, distance: f32) -> Self {
        Self {
            puppet: puppet.into(),
            target,
            distance,
            started: false,
        }
    }
}

impl Step<Stage> for MoveToDistance {
    fn resume(&mut self, stage: &mut Stage, _dt: f32) -> Result<Resume<Stage>, CutsceneError> {
        if self.started {
            return Ok(Resume::Done);
        }
        self.started = true;

        let Some(pose) = stage.puppet(&self.puppet) else {
            return Ok(Resume::Done);
        };
        let normal = (pose.position - self.target).normalize_or_zero();
        let stop = self.target + normal * self.distance;
        Ok(Resume::await_step(MoveTo::new(self.puppet.clone(), stop)))
    }

    fn name(&self) -> &'static str {
        "move_to_distance"
    }
}

//=== FaceEachOther =======================================================

/// Turns `first` towards `second`, then `second` towards `first`.
pub struct FaceEachOther {
    first: String,
    second: String,
    turned: usize,
}

impl FaceEachOther {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
            turned: 0,
        }
    }
}

impl Step<Stage> for FaceEachOther {
    fn resume(&mut self, stage: &mut Stage, _dt: f32) -> Result<Resume<Stage>, CutsceneError> {
        let (Some(first), Some(second)) = (stage.puppet(&self.first), stage.puppet(&self.second)) else {
            return Ok(Resume::Done);
        };

        let next = match self.turned {
            0 => Face::new(self.first.clone(), second.position),
            1 => Face::new(self.second.clone(), first.position),
            _ => return Ok(Resume::Done),
        };
        self.turned += 1;
        Ok(Resume::await_step(next))
    }

    fn name(&self) -> &'static str {
        "face_each_other"
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
