//! Circle-vs-world movement resolution
//!
//! Moves are resolved one axis at a time, so an agent pushing diagonally into
//! a wall keeps sliding along the free axis instead of stopping dead.

use glam::Vec2;

use super::access::door_blocks;
use super::geometry::circle_intersects_rotated_rect;
use super::state::{Agent, Level};

/// Would `agent` overlap a wall or a door that blocks it if placed at `pos`?
pub fn overlaps_world(agent: &Agent, pos: Vec2, level: &Level) -> bool {
    let r = agent.radius;
    level
        .walls
        .iter()
        .any(|w| circle_intersects_rotated_rect(pos, r, &w.rect, w.rotation))
        || level
            .doors
            .iter()
            .any(|d| door_blocks(agent, d) && circle_intersects_rotated_rect(pos, r, &d.rect, 0.0))
}

/// Apply `delta` to `agent` against the level.
///
/// Returns the resolved position and whether either axis was reverted.
/// Inactive agents do not move.
pub fn resolve_move(agent: &Agent, delta: Vec2, level: &Level) -> (Vec2, bool) {
    if !agent.active {
        return (agent.pos, false);
    }

    let mut pos = agent.pos;
    let mut blocked = false;

    if delta.x != 0.0 {
        let candidate = Vec2::new(pos.x + delta.x, pos.y);
        if overlaps_world(agent, candidate, level) {
            blocked = true;
        } else {
            pos = candidate;
        }
    }

    if delta.y != 0.0 {
        let candidate = Vec2::new(pos.x, pos.y + delta.y);
        if overlaps_world(agent, candidate, level) {
            blocked = true;
        } else {
            pos = candidate;
        }
    }

    (pos, blocked)
}

/// Does a projectile at `pos` hit a wall or a closed door?
///
/// Closed doors stop bullets whatever the shooter's clearance.
pub fn projectile_hits_world(pos: Vec2, radius: f32, level: &Level) -> bool {
    level
        .walls
        .iter()
        .any(|w| circle_intersects_rotated_rect(pos, radius, &w.rect, w.rotation))
        || level
            .doors
            .iter()
            .any(|d| !d.is_open && circle_intersects_rotated_rect(pos, radius, &d.rect, 0.0))
}
