//! Game settings and AI tuning
//!
//! Loaded from a JSON file next to the binary; any problem falls back to
//! defaults so a bad config never stops the game from starting.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Multiplier on guard reaction time and fire cooldown
    pub fn reflex_scale(&self) -> f32 {
        match self {
            Difficulty::Easy => 1.5,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 0.7,
        }
    }

    /// Shot spread in degrees (either side)
    pub fn inaccuracy(&self) -> f32 {
        match self {
            Difficulty::Easy => 8.0,
            Difficulty::Normal => 4.0,
            Difficulty::Hard => 2.0,
        }
    }
}

/// Enemy behavior tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiTuning {
    // === Turn rates (degrees/sec) ===
    /// Tracking a visible target
    pub attack_turn_rate: f32,
    /// Heading toward a search point
    pub search_turn_rate: f32,
    /// Gentle turn while patrolling
    pub patrol_turn_rate: f32,
    /// Look-around spin after reaching a search point
    pub spin_rate: f32,
    /// Guardian tracking the nearest door while idle
    pub guardian_turn_rate: f32,

    // === Guardian sway ===
    /// Max jitter either side of the door bearing (degrees)
    pub jitter_amplitude: f32,
    /// Jitter random-walk speed (degrees/sec)
    pub jitter_rate: f32,

    // === Combat ===
    /// Walkers stop closing in at this distance
    pub standoff_range: f32,
    /// Seconds between shots
    pub fire_cooldown: f32,
    /// Delay before the first shot after acquiring a target
    pub reaction_time: f32,
    /// Random spread applied to shot heading (degrees, either side)
    pub inaccuracy: f32,

    // === Patrol ===
    /// Fraction of identity speed used while patrolling
    pub patrol_speed_factor: f32,
    /// Patrol goals are picked within this distance of the agent
    pub patrol_radius: f32,
    /// Idle wait range (seconds)
    pub idle_wait_min: f32,
    pub idle_wait_max: f32,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            attack_turn_rate: 360.0,
            search_turn_rate: 180.0,
            patrol_turn_rate: 90.0,
            spin_rate: 120.0,
            guardian_turn_rate: 60.0,

            jitter_amplitude: 8.0,
            jitter_rate: 20.0,

            standoff_range: 110.0,
            fire_cooldown: 0.6,
            reaction_time: 0.25,
            inaccuracy: 4.0,

            patrol_speed_factor: 0.5,
            patrol_radius: 150.0,
            idle_wait_min: 1.0,
            idle_wait_max: 3.0,
        }
    }
}

/// Rates, distances and times must be finite magnitudes
fn non_negative(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidSettings(format!(
            "{name} must be finite and non-negative, got {value}"
        )))
    }
}

impl AiTuning {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("attack_turn_rate", self.attack_turn_rate),
            ("search_turn_rate", self.search_turn_rate),
            ("patrol_turn_rate", self.patrol_turn_rate),
            ("spin_rate", self.spin_rate),
            ("guardian_turn_rate", self.guardian_turn_rate),
            ("jitter_amplitude", self.jitter_amplitude),
            ("jitter_rate", self.jitter_rate),
            ("standoff_range", self.standoff_range),
            ("fire_cooldown", self.fire_cooldown),
            ("reaction_time", self.reaction_time),
            ("inaccuracy", self.inaccuracy),
            ("patrol_speed_factor", self.patrol_speed_factor),
            ("patrol_radius", self.patrol_radius),
            ("idle_wait_min", self.idle_wait_min),
            ("idle_wait_max", self.idle_wait_max),
        ];
        for (name, value) in fields {
            non_negative(name, value)?;
        }
        if self.idle_wait_min > self.idle_wait_max {
            return Err(Error::InvalidSettings(format!(
                "idle_wait_min {} exceeds idle_wait_max {}",
                self.idle_wait_min, self.idle_wait_max
            )));
        }
        Ok(())
    }
}

/// Player tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Collision radius
    pub radius: f32,
    /// Extra reach (beyond touching) for takedowns and mask theft
    pub reach: f32,
    /// Doors open for an eligible player this close to the frame
    pub door_trigger_margin: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            radius: 12.0,
            reach: 10.0,
            door_trigger_margin: 4.0,
        }
    }
}

impl PlayerTuning {
    pub fn validate(&self) -> Result<()> {
        non_negative("radius", self.radius)?;
        if self.radius == 0.0 {
            return Err(Error::InvalidSettings("radius must be positive".to_string()));
        }
        non_negative("reach", self.reach)?;
        non_negative("door_trigger_margin", self.door_trigger_margin)
    }
}

/// Game settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: Difficulty,
    pub ai: AiTuning,
    pub player: PlayerTuning,
}

impl Settings {
    /// Create settings from a difficulty preset (applies preset defaults)
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        let mut settings = Self::default();
        settings.apply_difficulty(difficulty);
        settings
    }

    /// Apply a difficulty preset on top of the default AI tuning
    pub fn apply_difficulty(&mut self, difficulty: Difficulty) {
        let base = AiTuning::default();
        self.difficulty = difficulty;
        self.ai.reaction_time = base.reaction_time * difficulty.reflex_scale();
        self.ai.fire_cooldown = base.fire_cooldown * difficulty.reflex_scale();
        self.ai.inaccuracy = difficulty.inaccuracy();
    }

    /// Parse and validate settings JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        self.ai.validate()?;
        self.player.validate()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from disk, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path)
            .map_err(crate::Error::from)
            .and_then(|json| Self::from_json(&json))
        {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Using default settings ({}: {})", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Settings saved");
        Ok(())
    }
}
