//! Door access control
//!
//! One rule: an agent may pass a door iff its permission is at least the
//! door's requirement. Passing never consumes or changes the identity.
//! `is_open` is a per-tick proximity flag, not a persistent unlock.

use super::geometry::circle_intersects_rotated_rect;
use super::state::{Agent, Door, Level, PermissionLevel};

/// Whether `permission` clears `door`
#[inline]
pub fn can_pass(permission: PermissionLevel, door: &Door) -> bool {
    permission >= door.required
}

/// Whether a closed door physically stops `agent`
#[inline]
pub fn door_blocks(agent: &Agent, door: &Door) -> bool {
    !door.is_open && !can_pass(agent.permission(), door)
}

/// Recompute every door's open flag from the player's position.
///
/// A door is open this tick iff the player is active, cleared for it, and
/// overlapping its frame (radius grown by `margin`). Enemies never open
/// doors.
pub fn refresh_doors(level: &mut Level, player: &Agent, margin: f32) {
    for door in &mut level.doors {
        let was_open = door.is_open;
        door.is_open = player.active
            && can_pass(player.permission(), door)
            && circle_intersects_rotated_rect(player.pos, player.radius + margin, &door.rect, 0.0);
        if door.is_open != was_open {
            log::debug!(
                "Door at ({}, {}) {}",
                door.rect.x,
                door.rect.y,
                if door.is_open { "opened" } else { "closed" }
            );
        }
    }
}
