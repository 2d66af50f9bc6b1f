//! Data-driven game balance
//!
//! [`Tuning`] mirrors the compile-time defaults in [`crate::consts`] plus every
//! balance knob of the simulation. It travels inside the game state so a run is
//! reproducible from (seed, tuning, inputs). Any subset of fields can be
//! overridden from JSON; missing keys keep their defaults.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::powerups::{ActivationPolicy, PowerUpKind};

/// Errors raised while loading or validating configuration
#[derive(Debug)]
pub enum ConfigError {
    /// The JSON document could not be parsed
    Parse(serde_json::Error),
    /// Reading or writing a config file failed
    Io(std::io::Error),
    /// A value parsed but is outside its usable range
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(e) => write!(f, "invalid config JSON: {}", e),
            ConfigError::Io(e) => write!(f, "config file error: {}", e),
            ConfigError::Invalid { field, reason } => {
                write!(f, "config field '{}' {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Parse(e) => Some(e),
            ConfigError::Io(e) => Some(e),
            ConfigError::Invalid { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Balance values for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Spawner ===
    /// Simulated time between enemy spawns
    pub spawn_interval_ms: f32,
    /// Disable to drive enemy creation by hand (tests, attract mode)
    pub spawning: bool,
    /// Upper bound of the random spawn radius
    pub max_enemy_spawn_radius: f32,
    /// Radii below this get bumped up by this amount
    pub min_enemy_spawn_radius: f32,

    // === Scoring ===
    pub wound_reward: u64,
    pub kill_reward: u64,

    // === Difficulty curve: base + log10(score / divisor + 1) * scale ===
    pub difficulty_base: f32,
    pub difficulty_divisor: f32,
    pub difficulty_scale: f32,

    // === Drops ===
    /// Probability that a kill records a power-up drop
    pub drop_chance: f64,
    /// No drop is recorded while this many power-ups lie on the ground
    pub max_ground_power_ups: usize,

    // === Particles ===
    pub wound_particles: usize,
    pub kill_particles: usize,
    pub damage_particles: usize,
    /// Oldest particles are discarded past this count
    pub max_particles: usize,

    // === Player feedback ===
    pub damage_tint_ms: f32,
    pub heal_tint_ms: f32,
    pub damage_flash_frames: u32,
    pub heal_flash_frames: u32,

    // === Firing ===
    pub rapid_fire_interval_ms: f32,
    pub multishot_count: usize,
    /// Angle between neighbouring multishot bullets (radians)
    pub multishot_spread: f32,

    // === Progression ===
    pub rank_speed_bonus: f32,
    pub rank_projectile_speed_bonus: f32,
    pub level_up_frames: u32,
    pub streak_notification_frames: u32,

    // === Power-ups ===
    pub shockwave_speed: f32,
    pub activation: ActivationPolicy,
    /// Kinds that can drop; the registry knows all of them
    pub enabled_power_ups: Vec<PowerUpKind>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            spawn_interval_ms: 600.0,
            spawning: true,
            max_enemy_spawn_radius: 40.0,
            min_enemy_spawn_radius: 10.0,

            wound_reward: 20,
            kill_reward: 10,

            difficulty_base: BASE_DIFFICULTY,
            difficulty_divisor: 500.0,
            difficulty_scale: 4.0,

            drop_chance: 0.1,
            max_ground_power_ups: 3,

            wound_particles: 8,
            kill_particles: 25,
            damage_particles: 30,
            max_particles: 1000,

            damage_tint_ms: 300.0,
            heal_tint_ms: 300.0,
            damage_flash_frames: 15,
            heal_flash_frames: 20,

            rapid_fire_interval_ms: 100.0,
            multishot_count: 5,
            multishot_spread: 0.15,

            rank_speed_bonus: 0.2,
            rank_projectile_speed_bonus: 0.5,
            level_up_frames: 120,
            streak_notification_frames: 90,

            shockwave_speed: 18.0,
            activation: ActivationPolicy::Immediate,
            enabled_power_ups: PowerUpKind::ALL.to_vec(),
        }
    }
}

impl Tuning {
    /// Parse tuning overrides from JSON and validate the result
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.spawn_interval_ms > 0.0) {
            return Err(ConfigError::Invalid {
                field: "spawn_interval_ms",
                reason: "must be positive",
            });
        }
        if self.min_enemy_spawn_radius <= 0.0
            || self.max_enemy_spawn_radius < self.min_enemy_spawn_radius
        {
            return Err(ConfigError::Invalid {
                field: "max_enemy_spawn_radius",
                reason: "must be at least min_enemy_spawn_radius (> 0)",
            });
        }
        if !(self.difficulty_divisor > 0.0) {
            return Err(ConfigError::Invalid {
                field: "difficulty_divisor",
                reason: "must be positive",
            });
        }
        if !(0.0..=1.0).contains(&self.drop_chance) {
            return Err(ConfigError::Invalid {
                field: "drop_chance",
                reason: "must be within [0, 1]",
            });
        }
        if self.multishot_count == 0 {
            return Err(ConfigError::Invalid {
                field: "multishot_count",
                reason: "must be at least 1",
            });
        }
        if self.enabled_power_ups.is_empty() {
            return Err(ConfigError::Invalid {
                field: "enabled_power_ups",
                reason: "must name at least one kind",
            });
        }
        if let ActivationPolicy::Hotbar { slots: 0 } = self.activation {
            return Err(ConfigError::Invalid {
                field: "activation",
                reason: "hotbar needs at least one slot",
            });
        }
        Ok(())
    }
}
