//! Data-driven level descriptions
//!
//! Levels are authored as JSON and turned into a [`World`] once at load.
//! This is the only place level data is checked; the simulation trusts it
//! afterwards.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{AGENT_RADIUS, SIGHT_ANGLE, SIGHT_RANGE};
use crate::error::{Error, Result};
use crate::settings::Settings;
use crate::sim::{Agent, AiKind, Door, Identity, Level, PermissionLevel, Rect, Wall, World};

fn default_radius() -> f32 {
    AGENT_RADIUS
}

fn default_sight_range() -> f32 {
    SIGHT_RANGE
}

fn default_sight_angle() -> f32 {
    SIGHT_ANGLE
}

fn default_search_duration() -> f32 {
    4.0
}

/// One enemy placement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyData {
    pub ai: AiKind,
    pub pos: Vec2,
    #[serde(default)]
    pub rotation: f32,
    /// Which stock mask the enemy wears
    pub mask: PermissionLevel,
    #[serde(default = "default_radius")]
    pub radius: f32,
    #[serde(default = "default_sight_range")]
    pub sight_range: f32,
    #[serde(default = "default_sight_angle")]
    pub sight_angle: f32,
    #[serde(default = "default_search_duration")]
    pub search_duration: f32,
}

impl EnemyData {
    pub fn new(ai: AiKind, pos: Vec2, rotation: f32, mask: PermissionLevel) -> Self {
        Self {
            ai,
            pos,
            rotation,
            mask,
            radius: AGENT_RADIUS,
            sight_range: SIGHT_RANGE,
            sight_angle: SIGHT_ANGLE,
            search_duration: default_search_duration(),
        }
    }

    fn to_agent(&self) -> Agent {
        Agent::enemy(
            self.ai,
            self.pos,
            self.rotation,
            Identity::for_permission(self.mask),
        )
        .with_radius(self.radius)
        .with_sight(self.sight_range, self.sight_angle)
        .with_search_duration(self.search_duration)
    }
}

/// A complete level description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelData {
    pub name: String,
    #[serde(default)]
    pub walls: Vec<Wall>,
    #[serde(default)]
    pub doors: Vec<Door>,
    #[serde(default)]
    pub enemies: Vec<EnemyData>,
    pub player_spawn: Vec2,
    /// Mask the player starts in
    #[serde(default)]
    pub player_mask: PermissionLevel,
    #[serde(default)]
    pub exit: Option<Rect>,
}

fn check(ok: bool, what: impl FnOnce() -> String) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidLevel(what()))
    }
}

fn check_rect(rect: &Rect, what: &str) -> Result<()> {
    check(
        rect.width > 0.0 && rect.height > 0.0,
        || format!("{what} has non-positive size"),
    )
}

impl LevelData {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = Self::from_json(&std::fs::read_to_string(path)?)?;
        log::info!("Loaded level '{}' from {}", data.name, path.display());
        Ok(data)
    }

    /// Check the invariants the simulation relies on
    pub fn validate(&self) -> Result<()> {
        for (i, wall) in self.walls.iter().enumerate() {
            check_rect(&wall.rect, &format!("wall {i}"))?;
        }
        for (i, door) in self.doors.iter().enumerate() {
            check_rect(&door.rect, &format!("door {i}"))?;
        }
        if let Some(exit) = &self.exit {
            check_rect(exit, "exit")?;
        }
        for (i, e) in self.enemies.iter().enumerate() {
            check(e.radius > 0.0, || format!("enemy {i}: radius must be positive"))?;
            check((0.0..=360.0).contains(&e.sight_angle), || {
                format!("enemy {i}: sight angle {} outside 0..=360", e.sight_angle)
            })?;
            check(e.sight_range >= 0.0, || {
                format!("enemy {i}: negative sight range")
            })?;
            check(e.search_duration >= 0.0, || {
                format!("enemy {i}: negative search duration")
            })?;
            check(e.ai != AiKind::None, || format!("enemy {i}: no AI kind"))?;
        }
        Ok(())
    }

    /// Geometry and player start, without enemies
    pub fn to_level(&self) -> Level {
        Level {
            walls: self.walls.clone(),
            doors: self
                .doors
                .iter()
                .map(|d| Door::new(d.rect, d.required))
                .collect(),
            player_spawn: self.player_spawn,
            player_identity: Identity::for_permission(self.player_mask),
            exit: self.exit,
        }
    }

    /// Validate and build a fresh simulation
    pub fn into_world(self, seed: u64, settings: Settings) -> Result<World> {
        self.validate()?;
        let mut world = World::new(self.to_level(), seed, settings);
        for enemy in &self.enemies {
            world.add_enemy(enemy.to_agent());
        }
        log::info!(
            "Level '{}': {} walls, {} doors, {} enemies",
            self.name,
            world.level.walls.len(),
            world.level.doors.len(),
            world.enemies.len()
        );
        Ok(world)
    }

    /// Built-in level used by the demo binary
    pub fn demo() -> Self {
        let wall = |x, y, w, h| Wall::new(Rect::new(x, y, w, h), 0.0);
        Self {
            name: "Loading Dock".to_string(),
            walls: vec![
                // Outer shell
                wall(0.0, 0.0, 800.0, 10.0),
                wall(0.0, 590.0, 800.0, 10.0),
                wall(0.0, 0.0, 10.0, 600.0),
                wall(790.0, 0.0, 10.0, 600.0),
                // Partition with a gap for the staff door
                wall(300.0, 10.0, 10.0, 250.0),
                wall(300.0, 320.0, 10.0, 270.0),
                // Vault partition with a gap for the admin door
                wall(560.0, 10.0, 10.0, 400.0),
                wall(560.0, 470.0, 10.0, 120.0),
                // Crates
                Wall::new(Rect::new(150.0, 380.0, 60.0, 60.0), 30.0),
                Wall::new(Rect::new(420.0, 150.0, 80.0, 20.0), -15.0),
            ],
            doors: vec![
                Door::new(Rect::new(300.0, 260.0, 10.0, 60.0), PermissionLevel::Staff),
                Door::new(Rect::new(560.0, 410.0, 10.0, 60.0), PermissionLevel::Admin),
            ],
            enemies: vec![
                EnemyData::new(
                    AiKind::Walker,
                    Vec2::new(200.0, 150.0),
                    90.0,
                    PermissionLevel::Staff,
                ),
                EnemyData::new(
                    AiKind::Guardian,
                    Vec2::new(350.0, 290.0),
                    0.0,
                    PermissionLevel::Guard,
                ),
                EnemyData::new(
                    AiKind::Walker,
                    Vec2::new(450.0, 450.0),
                    180.0,
                    PermissionLevel::Admin,
                ),
            ],
            player_spawn: Vec2::new(60.0, 540.0),
            player_mask: PermissionLevel::None,
            exit: Some(Rect::new(680.0, 500.0, 80.0, 60.0)),
        }
    }
}
