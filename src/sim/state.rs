//! Simulation state and core data types
//!
//! `World` is the explicit simulation context: every core function receives
//! what it needs from here by reference instead of reaching for globals.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use super::pool::{Handle, Pool};
use crate::consts::*;
use crate::settings::Settings;

/// Clearance tiers, strictly ordered
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum PermissionLevel {
    #[default]
    None = 0,
    Staff = 1,
    Guard = 2,
    Admin = 3,
}

impl PermissionLevel {
    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionLevel::None => "None",
            PermissionLevel::Staff => "Staff",
            PermissionLevel::Guard => "Guard",
            PermissionLevel::Admin => "Admin",
        }
    }
}

/// Ability bits carried by an identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Abilities(pub u8);

impl Abilities {
    pub const NONE: Self = Self(0);
    /// May fire when attacking
    pub const ARMED: Self = Self(1 << 0);
    /// May restrain others from behind
    pub const TAKEDOWN: Self = Self(1 << 1);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// What an agent is "wearing": clearance plus attributes.
///
/// Copy value; handing it to someone else replaces theirs wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub permission: PermissionLevel,
    pub abilities: Abilities,
    /// Tint for the mask sprite (0xRRGGBB)
    pub color: u32,
    /// Movement speed (units/sec)
    pub speed: f32,
}

impl Identity {
    /// Bare face, no clearance
    pub fn unmasked() -> Self {
        Self {
            permission: PermissionLevel::None,
            abilities: Abilities::TAKEDOWN,
            color: 0x9a9a9a,
            speed: 110.0,
        }
    }

    pub fn staff() -> Self {
        Self {
            permission: PermissionLevel::Staff,
            abilities: Abilities::NONE,
            color: 0x4fa3e0,
            speed: 90.0,
        }
    }

    pub fn guard() -> Self {
        Self {
            permission: PermissionLevel::Guard,
            abilities: Abilities::ARMED.union(Abilities::TAKEDOWN),
            color: 0xd9a441,
            speed: 100.0,
        }
    }

    pub fn admin() -> Self {
        Self {
            permission: PermissionLevel::Admin,
            abilities: Abilities::ARMED.union(Abilities::TAKEDOWN),
            color: 0xc23b3b,
            speed: 95.0,
        }
    }

    /// Stock mask for a clearance tier
    pub fn for_permission(permission: PermissionLevel) -> Self {
        match permission {
            PermissionLevel::None => Self::unmasked(),
            PermissionLevel::Staff => Self::staff(),
            PermissionLevel::Guard => Self::guard(),
            PermissionLevel::Admin => Self::admin(),
        }
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::unmasked()
    }
}

/// Static wall: rectangle rotated about its center
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub rect: Rect,
    /// Degrees
    #[serde(default)]
    pub rotation: f32,
}

impl Wall {
    pub fn new(rect: Rect, rotation: f32) -> Self {
        Self { rect, rotation }
    }
}

/// Permission-gated door (never rotated)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub rect: Rect,
    pub required: PermissionLevel,
    /// Recomputed every tick; open doors neither block nor occlude
    #[serde(default)]
    pub is_open: bool,
}

impl Door {
    pub fn new(rect: Rect, required: PermissionLevel) -> Self {
        Self {
            rect,
            required,
            is_open: false,
        }
    }
}

/// Behavior archetype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AiKind {
    /// Mobile: patrols, chases, searches
    Walker,
    /// Stationary sentry: turns but never moves
    Guardian,
    /// No AI (the player)
    #[default]
    None,
}

/// Behavior state with its transient data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Behavior {
    Idle { wait: f32 },
    Patrol { goal: Vec2 },
    /// `reaction` counts down before the first shot after acquiring a target
    Attack { reaction: f32 },
    Search { timer: f32, arrived: bool },
}

/// Tag-only view of [`Behavior`], used by the transition table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorKind {
    Idle,
    Patrol,
    Attack,
    Search,
}

impl Behavior {
    pub fn kind(&self) -> BehaviorKind {
        match self {
            Behavior::Idle { .. } => BehaviorKind::Idle,
            Behavior::Patrol { .. } => BehaviorKind::Patrol,
            Behavior::Attack { .. } => BehaviorKind::Attack,
            Behavior::Search { .. } => BehaviorKind::Search,
        }
    }
}

impl Default for Behavior {
    fn default() -> Self {
        Behavior::Idle { wait: 0.0 }
    }
}

/// Any simulated actor: enemy or player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub pos: Vec2,
    /// Heading in degrees (0 = +X, counter-clockwise)
    pub rotation: f32,
    pub radius: f32,
    pub active: bool,
    /// Externally imposed (restrained by the player); AI does not advance
    #[serde(default)]
    pub restrained: bool,
    pub identity: Identity,
    pub ai: AiKind,
    pub behavior: Behavior,
    pub sight_range: f32,
    /// Full cone width in degrees, 0..=360
    pub sight_angle: f32,
    /// How long to search after losing the target or being hit
    pub search_duration: f32,
    pub last_known_target: Vec2,
    pub shoot_cooldown: f32,
    /// Guardian idle sway, in degrees; kept apart from `last_known_target`
    #[serde(default)]
    pub jitter: f32,
}

impl Agent {
    pub fn enemy(ai: AiKind, pos: Vec2, rotation: f32, identity: Identity) -> Self {
        Self {
            pos,
            rotation: crate::wrap_degrees(rotation),
            radius: AGENT_RADIUS,
            active: true,
            restrained: false,
            identity,
            ai,
            behavior: Behavior::default(),
            sight_range: SIGHT_RANGE,
            sight_angle: SIGHT_ANGLE,
            search_duration: 4.0,
            last_known_target: pos,
            shoot_cooldown: 0.0,
            jitter: 0.0,
        }
    }

    pub fn player(pos: Vec2, identity: Identity) -> Self {
        Self {
            sight_range: 0.0,
            sight_angle: 0.0,
            ..Self::enemy(AiKind::None, pos, 0.0, identity)
        }
    }

    pub fn with_sight(mut self, range: f32, angle: f32) -> Self {
        self.sight_range = range;
        self.sight_angle = angle.clamp(0.0, 360.0);
        self
    }

    pub fn with_search_duration(mut self, seconds: f32) -> Self {
        self.search_duration = seconds;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn permission(&self) -> PermissionLevel {
        self.identity.permission
    }

    /// Whether the AI should advance this tick
    pub fn is_thinking(&self) -> bool {
        self.active && !self.restrained && self.ai != AiKind::None
    }
}

/// A bullet in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Seconds left before it fizzles
    pub ttl: f32,
    /// Shooter, never hit by its own bullet
    pub owner: Option<Handle>,
}

impl Projectile {
    pub fn new(pos: Vec2, heading_deg: f32, owner: Option<Handle>) -> Self {
        Self {
            pos,
            vel: crate::heading_vec(heading_deg) * PROJECTILE_SPEED,
            radius: PROJECTILE_RADIUS,
            ttl: PROJECTILE_TTL,
            owner,
        }
    }
}

/// Static geometry of a level plus player start
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Level {
    pub walls: Vec<Wall>,
    pub doors: Vec<Door>,
    pub player_spawn: Vec2,
    pub player_identity: Identity,
    /// Reaching this zone completes the level
    #[serde(default)]
    pub exit: Option<Rect>,
}

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Infiltrating,
    /// Player health ran out
    Caught,
    /// Player reached the exit
    Escaped,
}

/// Things that happened during a tick, for HUD/audio collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EnemySpotted { enemy: Handle },
    ShotFired { enemy: Handle },
    PlayerHit { health: u8 },
    EnemyAlerted { enemy: Handle },
    EnemyRestrained { enemy: Handle },
    MaskStolen { enemy: Handle, permission: PermissionLevel },
    Caught,
    Escaped,
}

/// Starting player health
pub const PLAYER_MAX_HEALTH: u8 = 3;

/// The whole simulation context
#[derive(Debug, Clone)]
pub struct World {
    pub level: Level,
    /// Enemies in level order; slots stay put when one is removed
    pub enemies: Pool<Agent>,
    pub player: Agent,
    pub player_health: u8,
    pub projectiles: Pool<Projectile>,
    pub rng: Pcg32,
    pub seed: u64,
    pub time_ticks: u64,
    pub phase: GamePhase,
    pub settings: Settings,
    /// Events from the most recent tick
    pub events: Vec<GameEvent>,
}

impl World {
    pub fn new(level: Level, seed: u64, settings: Settings) -> Self {
        let mut player = Agent::player(level.player_spawn, level.player_identity);
        player.radius = settings.player.radius;
        Self {
            level,
            enemies: Pool::new(),
            player,
            player_health: PLAYER_MAX_HEALTH,
            projectiles: Pool::new(),
            rng: Pcg32::seed_from_u64(seed),
            seed,
            time_ticks: 0,
            phase: GamePhase::Infiltrating,
            settings,
            events: Vec::new(),
        }
    }

    pub fn add_enemy(&mut self, enemy: Agent) -> Handle {
        self.enemies.insert(enemy)
    }

    /// Drop an enemy (e.g. on level scripting); stale handles are ignored
    pub fn remove_enemy(&mut self, handle: Handle) -> Option<Agent> {
        self.enemies.remove(handle)
    }
}
