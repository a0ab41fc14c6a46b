//! Line-of-sight checks
//!
//! Cheapest checks first: range, then view cone, then wall and door
//! occlusion. Closed doors occlude regardless of the observer's clearance;
//! open doors never do.

use glam::Vec2;

use super::geometry::{segment_intersects_rect, segment_intersects_rotated_rect};
use super::state::{Agent, Level};
use crate::{bearing_deg, wrap_degrees};

/// Is `target` within range of `observer`?
#[inline]
pub fn in_range(observer: &Agent, target: Vec2) -> bool {
    observer.pos.distance(target) <= observer.sight_range
}

/// Is `target` inside the observer's view cone (ignoring range)?
pub fn in_view_cone(observer: &Agent, target: Vec2) -> bool {
    if observer.sight_angle >= 360.0 {
        return true;
    }
    let diff = wrap_degrees(bearing_deg(observer.pos, target) - observer.rotation);
    diff.abs() <= observer.sight_angle / 2.0
}

/// Is the straight line `from -> to` clear of walls and closed doors?
pub fn line_clear(from: Vec2, to: Vec2, level: &Level) -> bool {
    let walls_clear = !level
        .walls
        .iter()
        .any(|w| segment_intersects_rotated_rect(from, to, &w.rect, w.rotation));
    walls_clear
        && !level
            .doors
            .iter()
            .any(|d| !d.is_open && segment_intersects_rect(from, to, &d.rect))
}

/// Can `observer` perceive `target`?
///
/// Inactive observers see nothing.
pub fn can_see(observer: &Agent, target: Vec2, level: &Level) -> bool {
    observer.active
        && in_range(observer, target)
        && in_view_cone(observer, target)
        && line_clear(observer.pos, target, level)
}
