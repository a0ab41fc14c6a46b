//! Masquerade - stealth infiltration game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (geometry, perception, guard AI, doors)
//! - `level`: Data-driven level descriptions
//! - `settings`: Tuning and preferences

pub mod error;
pub mod level;
pub mod settings;
pub mod sim;

pub use error::{Error, Result};
pub use level::LevelData;
pub use settings::{AiTuning, PlayerTuning, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Default agent collision radius
    pub const AGENT_RADIUS: f32 = 12.0;
    /// Default enemy sight distance
    pub const SIGHT_RANGE: f32 = 220.0;
    /// Default enemy sight cone (full width, degrees)
    pub const SIGHT_ANGLE: f32 = 90.0;

    /// Walkers stop chasing a search point within this distance
    pub const SEARCH_ARRIVE_DIST: f32 = 20.0;
    /// Patrol goal is reached within this distance
    pub const PATROL_ARRIVE_DIST: f32 = 10.0;

    /// Projectile defaults
    pub const PROJECTILE_RADIUS: f32 = 3.0;
    pub const PROJECTILE_SPEED: f32 = 420.0;
    pub const PROJECTILE_TTL: f32 = 2.0;
}

/// Wrap an angle in degrees to (-180, 180]
#[inline]
pub fn wrap_degrees(angle: f32) -> f32 {
    let r = angle % 360.0;
    if r <= -180.0 {
        r + 360.0
    } else if r > 180.0 {
        r - 360.0
    } else {
        r
    }
}

/// Unit vector for a heading in degrees
#[inline]
pub fn heading_vec(degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians())
}

/// Heading in degrees from `from` toward `to`
#[inline]
pub fn bearing_deg(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x).to_degrees()
}

/// Turn `current` toward `target` by at most `max_step` degrees.
///
/// The delta is always wrapped before clamping, so headings either side of
/// the ±180° seam turn the short way round. The sign of `max_step` is
/// ignored and a NaN step leaves the heading where it is.
#[inline]
pub fn turn_toward(current: f32, target: f32, max_step: f32) -> f32 {
    if max_step.is_nan() {
        return wrap_degrees(current);
    }
    let max_step = max_step.abs();
    let delta = wrap_degrees(target - current);
    let step = delta.clamp(-max_step, max_step);
    wrap_degrees(current + step)
}
