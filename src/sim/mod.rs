//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Elapsed time comes in from the caller
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod entities;
pub mod geometry;
pub mod powerups;
pub mod progression;
pub mod state;
pub mod tick;

pub use entities::{Color, Enemy, MoveIntent, Particle, Player, PowerUp, Projectile, Shockwave, Tint};
pub use geometry::{Body, Bounds};
pub use powerups::{ActivationPolicy, ActivePowerUp, PowerUpKind};
pub use progression::{Notification, StreakTracker};
pub use state::{Flags, GameEvent, GameState, GlobalSettings};
pub use tick::{FrameInput, FrameOutcome, advance_frame};
