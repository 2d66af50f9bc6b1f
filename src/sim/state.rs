//! Game state and core simulation types
//!
//! Everything a run needs to be resumed or replayed lives here.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entities::{Enemy, MoveIntent, Particle, Player, PowerUp, Projectile, Shockwave};
use super::geometry::Bounds;
use super::powerups::{self, ActivePowerUp, PowerUpKind};
use super::progression::Notification;
use crate::consts::*;
use crate::tuning::Tuning;

/// Arsenal values shared by every shot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlobalSettings {
    /// Enemy speed (px/frame), rises with score and never falls
    pub difficulty: f32,
    pub projectile_radius: f32,
    pub projectile_damage: i32,
    pub base_projectile_radius: f32,
    pub base_projectile_damage: i32,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            difficulty: BASE_DIFFICULTY,
            projectile_radius: PROJECTILE_RADIUS,
            projectile_damage: PROJECTILE_DAMAGE,
            base_projectile_radius: PROJECTILE_RADIUS,
            base_projectile_damage: PROJECTILE_DAMAGE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Flags {
    pub is_running: bool,
    pub game_started: bool,
    pub rapid_fire_active: bool,
    pub multishot_active: bool,
    /// A kill this frame recorded a drop point
    pub power_up_dropped: bool,
}

/// Something noteworthy that happened during a frame
///
/// Consumers (audio cues, HUD effects) read these after each advance; the
/// list is cleared at the start of the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Shot { count: usize },
    EnemySpawned { id: u32 },
    EnemyWounded { id: u32 },
    EnemyKilled { id: u32, pos: Vec2 },
    /// Enemy hit an invincible player
    EnemyRammed { id: u32 },
    ShockwaveKill { id: u32 },
    PlayerHit { lives: u8 },
    PowerUpDropped(PowerUpKind),
    PowerUpCollected(PowerUpKind),
    PowerUpQueued(PowerUpKind),
    PowerUpActivated(PowerUpKind),
    PowerUpExpired(PowerUpKind),
    RankUp { rank: u32 },
    StreakTier { tier: usize },
    GameOver { score: u64 },
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub bounds: Bounds,
    /// Frames advanced so far
    pub frame: u64,
    /// Simulated play time (ms)
    pub time_ms: f64,
    pub player: Player,
    /// Sorted by id
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    /// Visual only
    #[serde(skip)]
    pub particles: Vec<Particle>,
    /// Ground pickups, sorted by id
    pub power_ups: Vec<PowerUp>,
    pub shockwave: Option<Shockwave>,
    pub active_power_ups: Vec<ActivePowerUp>,
    /// Parked pickups under the hotbar policy
    pub hotbar: Vec<PowerUpKind>,
    pub settings: GlobalSettings,
    pub flags: Flags,
    /// Movement held during the last frame
    pub input: MoveIntent,
    /// Where the next ground power-up should appear
    pub pending_power_up_drop: Option<Vec2>,
    /// Pickup waiting to be routed through the activation policy
    pub collected_power_up: Option<PowerUpKind>,
    pub level_up: Option<Notification>,
    pub streak_notice: Option<Notification>,
    /// Time since the last enemy spawn (ms)
    pub spawn_timer_ms: f32,
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Fresh running match with the player at the center of `bounds`
    pub fn new(seed: u64, bounds: Bounds, tuning: Tuning) -> Self {
        log::info!(
            "New match: seed {}, playfield {}x{}",
            seed,
            bounds.width,
            bounds.height
        );
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            bounds,
            frame: 0,
            time_ms: 0.0,
            player: Player::new(bounds.center()),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            particles: Vec::new(),
            power_ups: Vec::new(),
            shockwave: None,
            active_power_ups: Vec::new(),
            hotbar: Vec::new(),
            settings: GlobalSettings::default(),
            flags: Flags {
                is_running: true,
                game_started: true,
                ..Default::default()
            },
            input: MoveIntent::default(),
            pending_power_up_drop: None,
            collected_power_up: None,
            level_up: None,
            streak_notice: None,
            spawn_timer_ms: 0.0,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        powerups::is_active(self, kind)
    }

    pub fn is_paused(&self) -> bool {
        self.flags.game_started && !self.flags.is_running
    }

    /// Cap the particle list, dropping the oldest first
    pub fn trim_particles(&mut self) {
        let max = self.tuning.max_particles;
        if self.particles.len() > max {
            let excess = self.particles.len() - max;
            self.particles.drain(..excess);
        }
    }

    /// Keep id-carrying collections sorted for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.power_ups.sort_by_key(|p| p.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entities::Color;

    #[test]
    fn test_new_state() {
        let state = GameState::new(1, Bounds::new(800.0, 600.0), Tuning::default());
        assert_eq!(state.player.pos, Vec2::new(400.0, 300.0));
        assert_eq!(state.player.lives, STARTING_LIVES);
        assert!(state.flags.is_running);
        assert!(!state.is_paused());
        assert_eq!(state.settings.difficulty, BASE_DIFFICULTY);
    }

    #[test]
    fn test_entity_ids_increase() {
        let mut state = GameState::new(1, Bounds::default(), Tuning::default());
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert!(b > a);
    }

    #[test]
    fn test_trim_particles_drops_oldest() {
        let mut state = GameState::new(1, Bounds::default(), Tuning {
            max_particles: 2,
            ..Default::default()
        });
        for i in 0..4 {
            state.particles.push(Particle {
                pos: Vec2::splat(i as f32),
                radius: 1.0,
                color: Color::WHITE,
                vel: Vec2::ZERO,
                alpha: 1.0,
            });
        }
        state.trim_particles();
        assert_eq!(state.particles.len(), 2);
        assert_eq!(state.particles[0].pos, Vec2::splat(2.0));
    }

    #[test]
    fn test_snapshot_round_trip_skips_particles() {
        let mut state = GameState::new(9, Bounds::default(), Tuning::default());
        state.particles.push(Particle {
            pos: Vec2::ZERO,
            radius: 1.0,
            color: Color::WHITE,
            vel: Vec2::ZERO,
            alpha: 1.0,
        });
        let json = serde_json::to_string(&state).unwrap();
        let restored: GameState = serde_json::from_str(&json).unwrap();
        assert!(restored.particles.is_empty());
        assert_eq!(restored.rng, state.rng);
        assert_eq!(restored.player, state.player);
    }
}
