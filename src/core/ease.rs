//=========================================================================
// Easing & Approach Helpers
//=========================================================================
//
// Scalar, vector and angle helpers shared by dialogue presentation and
// scripted motion.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::Vec2;
use std::f32::consts::{PI, TAU};

//=== Curves ==============================================================

pub fn cube_out(t: f32) -> f32 {
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}

pub fn quart_in(t: f32) -> f32 {
    t * t * t * t
}

pub fn clamp01(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

//=== Approach ============================================================

/// Moves `value` towards `target` by at most `step`.
pub fn approach(value: f32, target: f32, step: f32) -> f32 {
    if value < target {
        (value + step).min(target)
    } else {
        (value - step).max(target)
    }
}

/// Moves `value` towards `target` by at most `step` along a straight line.
pub fn approach_vec(value: Vec2, target: Vec2, step: f32) -> Vec2 {
    let offset = target - value;
    let distance = offset.length();
    if distance <= step || distance == 0.0 {
        target
    } else {
        value + offset / distance * step
    }
}

//=== Angles ==============================================================

/// Signed shortest difference `to - from`, in `(-PI, PI]`.
pub fn angle_diff(from: f32, to: f32) -> f32 {
    let mut diff = (to - from) % TAU;
    if diff > PI {
        diff -= TAU;
    } else if diff <= -PI {
        diff += TAU;
    }
    diff
}

/// Turns `from` towards `to` by at most `step` radians, the short way.
pub fn angle_approach(from: f32, to: f32, step: f32) -> f32 {
    let diff = angle_diff(from, to);
    if diff.abs() <= step {
        to
    } else {
        from + step * diff.signum()
    }
}

pub fn angle_of(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

pub fn from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

//=== Intervals ===========================================================

/// True during the second half of every `2 * interval` period of `time`.
pub fn between_interval(time: f32, interval: f32) -> bool {
    time % (interval * 2.0) >= interval
}

//=========================================================================
// Unit Tests
//=========================================================================
