//! Entity records and their per-frame update functions
//!
//! Entities are plain values. Each `update` takes `&self` and returns the
//! entity one frame later; the state machine decides what to keep.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Body, Bounds, angle_to, velocity_from_angle};
use super::powerups::PowerUpKind;
use super::progression::StreakTracker;
use crate::consts::*;

/// Linear RGB color
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::from_hex(0xffffff);
    pub const PROJECTILE: Color = Color::from_hex(0xff0000);
    /// Player damage particles and tint
    pub const DAMAGE: Color = Color::from_hex(0xff2d2d);
    pub const HEAL: Color = Color::from_hex(0x00ff88);
    pub const SHOCKWAVE: Color = Color::from_hex(0x00ffff);

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    /// HSL to RGB; hue in degrees, saturation and lightness in [0, 1]
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = lightness - c / 2.0;
        Self {
            r: r + m,
            g: g + m,
            b: b + m,
        }
    }

    pub fn to_rgba(self, alpha: f32) -> [f32; 4] {
        [self.r, self.g, self.b, alpha]
    }
}

/// Transient player coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tint {
    #[default]
    Neutral,
    /// Just took a hit
    Damage,
    /// Just picked up health
    Heal,
    /// Invincible; the renderer cycles hues
    Rainbow,
}

/// Held movement directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MoveIntent {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

/// The player's ship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub radius: f32,
    /// Radius without power-up modifiers
    pub base_radius: f32,
    /// Current move speed (px/frame)
    pub speed: f32,
    /// Move speed without power-up modifiers; raised on rank-up
    pub base_speed: f32,
    pub lives: u8,
    pub score: u64,
    pub tint: Tint,
    /// Time left before a damage/heal tint fades back
    pub tint_ms: f32,
    /// Frames of red screen flash left
    pub damage_flash: u32,
    /// Frames of green screen flash left
    pub heal_flash: u32,
    pub is_invincible: bool,
    pub has_power_up: bool,
    /// 1-based rank, never decreases within a match
    pub rank: u32,
    /// Speed of fired projectiles (px/frame); raised on rank-up
    pub projectile_speed: f32,
    pub streak: StreakTracker,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            radius: PLAYER_RADIUS,
            base_radius: PLAYER_RADIUS,
            speed: PLAYER_SPEED,
            base_speed: PLAYER_SPEED,
            lives: STARTING_LIVES,
            score: 0,
            tint: Tint::Neutral,
            tint_ms: 0.0,
            damage_flash: 0,
            heal_flash: 0,
            is_invincible: false,
            has_power_up: false,
            rank: 1,
            projectile_speed: PROJECTILE_SPEED,
            streak: StreakTracker::default(),
        }
    }

    /// Move along held directions and count down the screen flashes
    ///
    /// A direction is ignored once the edge of the circle sits on or past the
    /// matching boundary; the step itself is not clamped.
    pub fn update(&self, intent: MoveIntent, bounds: &Bounds) -> Self {
        let mut next = self.clone();
        let (r, v) = (self.radius, self.speed);

        if intent.right && next.pos.x + r < bounds.width {
            next.pos.x += v;
        }
        if intent.left && next.pos.x - r > 0.0 {
            next.pos.x -= v;
        }
        if intent.up && next.pos.y - r > 0.0 {
            next.pos.y -= v;
        }
        if intent.down && next.pos.y + r < bounds.height {
            next.pos.y += v;
        }

        next.damage_flash = next.damage_flash.saturating_sub(1);
        next.heal_flash = next.heal_flash.saturating_sub(1);
        next
    }
}

impl Body for Player {
    fn pos(&self) -> Vec2 {
        self.pos
    }

    fn radius(&self) -> f32 {
        self.radius
    }
}

/// A homing enemy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub color: Color,
    pub vel: Vec2,
    /// Hits left; may go negative under heavy damage
    pub health: i32,
}

impl Enemy {
    /// Spawn an enemy aimed at `target`
    pub fn new(id: u32, pos: Vec2, radius: f32, color: Color, target: Vec2, speed: f32) -> Self {
        Self {
            id,
            pos,
            radius,
            color,
            vel: velocity_from_angle(angle_to(pos, target), speed),
            health: if radius > TOUGH_ENEMY_RADIUS { 2 } else { 1 },
        }
    }

    /// Step with the current velocity, then re-aim at `target`
    pub fn update(&self, target: Vec2, speed: f32) -> Self {
        let pos = self.pos + self.vel;
        Self {
            pos,
            vel: velocity_from_angle(angle_to(pos, target), speed),
            ..self.clone()
        }
    }

    pub fn damaged(&self, amount: i32) -> Self {
        Self {
            health: self.health - amount,
            ..self.clone()
        }
    }

    pub fn shrunk(&self, amount: f32) -> Self {
        Self {
            radius: (self.radius - amount).max(MIN_ENEMY_RADIUS),
            ..self.clone()
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.health < 1
    }
}

impl Body for Enemy {
    fn pos(&self) -> Vec2 {
        self.pos
    }

    fn radius(&self) -> f32 {
        self.radius
    }
}

/// A bullet flying in a straight line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub radius: f32,
    pub color: Color,
    pub vel: Vec2,
}

impl Projectile {
    pub fn update(&self) -> Self {
        Self {
            pos: self.pos + self.vel,
            ..self.clone()
        }
    }
}

impl Body for Projectile {
    fn pos(&self) -> Vec2 {
        self.pos
    }

    fn radius(&self) -> f32 {
        self.radius
    }
}

/// Cosmetic debris
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub radius: f32,
    pub color: Color,
    pub vel: Vec2,
    /// Opacity, 1 at birth; the particle is dropped at 0
    pub alpha: f32,
}

impl Particle {
    pub fn update(&self) -> Self {
        Self {
            pos: self.pos + self.vel,
            alpha: self.alpha - PARTICLE_FADE,
            ..self.clone()
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alpha > 0.0
    }
}

/// A collectible lying on the playfield
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub kind: PowerUpKind,
    /// Starting hue for the shimmer effect (degrees)
    pub hue: f32,
}

impl Body for PowerUp {
    fn pos(&self) -> Vec2 {
        self.pos
    }

    fn radius(&self) -> f32 {
        self.radius
    }
}

/// Expanding ring that wipes out enemies it sweeps over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shockwave {
    pub origin: Vec2,
    pub radius: f32,
    /// Growth per frame
    pub speed: f32,
    pub active: bool,
    /// Enemy ids already struck by this ring
    pub hit_enemies: Vec<u32>,
}

impl Shockwave {
    pub fn new(origin: Vec2, speed: f32) -> Self {
        Self {
            origin,
            radius: 0.0,
            speed,
            active: true,
            hit_enemies: Vec::new(),
        }
    }

    /// Grow by one frame; deactivates past `max_radius`
    pub fn update(&self, max_radius: f32) -> Self {
        let radius = self.radius + self.speed;
        Self {
            radius,
            active: self.active && radius <= max_radius,
            ..self.clone()
        }
    }

    /// Whether the ring has reached any part of `body`
    pub fn reaches(&self, body: &impl Body) -> bool {
        self.origin.distance(body.pos()) - body.radius() <= self.radius
    }
}
