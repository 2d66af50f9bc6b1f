//! Circle geometry for the playfield
//!
//! Every gameplay entity is a circle. Screen coordinates: origin top-left,
//! y grows downward.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::COLLISION_TOLERANCE;

/// Anything with a circular hit-box
pub trait Body {
    fn pos(&self) -> Vec2;
    fn radius(&self) -> f32;
}

/// Rectangular playfield, `(0, 0)` to `(width, height)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Length of the screen diagonal
    pub fn diagonal(&self) -> f32 {
        self.width.hypot(self.height)
    }

    /// Pull a point inside the playfield, keeping `margin` from every edge
    pub fn clamp_inside(&self, point: Vec2, margin: f32) -> Vec2 {
        let max_x = (self.width - margin).max(margin);
        let max_y = (self.height - margin).max(margin);
        Vec2::new(point.x.clamp(margin, max_x), point.y.clamp(margin, max_y))
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Distance between two circle centers
#[inline]
pub fn distance(a: &impl Body, b: &impl Body) -> f32 {
    a.pos().distance(b.pos())
}

/// Forgiving overlap test: the gap between the two circles is under one unit
#[inline]
pub fn is_colliding(a: &impl Body, b: &impl Body) -> bool {
    distance(a, b) - a.radius() - b.radius() < COLLISION_TOLERANCE
}

/// Angle of the line from `from` to `to`
#[inline]
pub fn angle_to(from: Vec2, to: Vec2) -> f32 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Velocity vector for a heading and speed
#[inline]
pub fn velocity_from_angle(angle: f32, speed: f32) -> Vec2 {
    Vec2::new(angle.cos() * speed, angle.sin() * speed)
}

/// True once the circle lies entirely past any edge of the playfield
pub fn is_out_of_bounds(body: &impl Body, bounds: &Bounds) -> bool {
    let p = body.pos();
    let r = body.radius();
    p.x + r < 0.0 || p.x - r > bounds.width || p.y + r < 0.0 || p.y - r > bounds.height
}
