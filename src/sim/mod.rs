//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by pool slot)
//! - No rendering or platform dependencies

pub mod access;
pub mod ai;
pub mod collision;
pub mod geometry;
pub mod perception;
pub mod pool;
pub mod raycast;
pub mod state;
pub mod tick;

pub use access::{can_pass, door_blocks, refresh_doors};
pub use ai::{AiEnv, ProjectileSink, Stimulus, notify_hit, transition, update_enemy};
pub use collision::resolve_move;
pub use geometry::{
    Rect, circle_intersects_rotated_rect, segment_intersection, segment_intersects_rect,
    segment_intersects_rotated_rect,
};
pub use perception::can_see;
pub use pool::{Handle, Pool};
pub use raycast::{closest_ray_hit, vision_cone};
pub use state::{
    Abilities, Agent, AiKind, Behavior, BehaviorKind, Door, GameEvent, GamePhase, Identity, Level,
    PLAYER_MAX_HEALTH, PermissionLevel, Projectile, Wall, World,
};
pub use tick::{TickInput, tick};
