//! Circle Shoot - a top-down arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, progression, power-ups)
//! - `session`: Frame driver (elapsed time, pause/resume, auto-fire cadence)
//! - `renderer`: Snapshot-to-draw-list conversion and HUD model
//! - `leaderboard`: Score submission rules, ranking and player names
//! - `persistence`: Versioned JSON save envelopes
//! - `tuning`: Data-driven game balance

pub mod leaderboard;
pub mod persistence;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use leaderboard::Leaderboard;
pub use session::GameSession;
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

/// Game configuration constants
///
/// Movement constants are per frame (the simulation integrates positions once per
/// frame-advance); timers are in milliseconds of simulated time.
pub mod consts {
    /// Maximum lives a player can hold
    pub const MAX_LIVES: u8 = 5;
    pub const STARTING_LIVES: u8 = 3;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 15.0;
    pub const PLAYER_SPEED: f32 = 3.0;
    pub const PROJECTILE_SPEED: f32 = 10.0;

    /// Projectile defaults
    pub const PROJECTILE_RADIUS: f32 = 5.0;
    pub const PROJECTILE_DAMAGE: i32 = 1;

    /// Collision tolerance: bodies collide when their gap is below this
    pub const COLLISION_TOLERANCE: f32 = 1.0;

    /// Particle alpha lost per frame
    pub const PARTICLE_FADE: f32 = 0.01;

    /// Enemy radius lost on a non-lethal hit
    pub const ENEMY_SHRINK: f32 = 20.0;
    /// Smallest radius an enemy can be shrunk to
    pub const MIN_ENEMY_RADIUS: f32 = 1.0;
    /// Spawn radius above which enemies take two hits
    pub const TOUGH_ENEMY_RADIUS: f32 = 30.0;

    /// Ground power-up radius
    pub const POWER_UP_RADIUS: f32 = 15.0;

    /// Starting global difficulty (enemy speed, px/frame)
    pub const BASE_DIFFICULTY: f32 = 2.0;
}
