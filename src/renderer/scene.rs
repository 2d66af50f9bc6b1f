//! Draw list for one frame
//!
//! A [`Scene`] is a pure function of a game snapshot and the frame counter.
//! Backends either draw the instances directly or flatten them to triangles
//! with [`Scene::vertices`].

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use super::shapes;
use super::vertex::{Vertex, colors};
use crate::sim::{Color, GameState, Tint};

/// A filled circle
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct CircleInstance {
    pub center: [f32; 2],
    pub radius: f32,
    pub color: [f32; 4],
}

/// A hollow circle
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct RingInstance {
    pub center: [f32; 2],
    pub radius: f32,
    pub width: f32,
    pub color: [f32; 4],
}

/// Full-screen tint, strongest at the edges for damage and at the player for heals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenFlash {
    pub color: [f32; 4],
    pub intensity: f32,
    pub focus: Vec2,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub clear_color: [f32; 4],
    /// Back to front
    pub circles: Vec<CircleInstance>,
    pub rings: Vec<RingInstance>,
    pub flashes: Vec<ScreenFlash>,
}

fn circle(center: Vec2, radius: f32, color: [f32; 4]) -> CircleInstance {
    CircleInstance {
        center: center.to_array(),
        radius,
        color,
    }
}

fn ring(center: Vec2, radius: f32, width: f32, color: [f32; 4]) -> RingInstance {
    RingInstance {
        center: center.to_array(),
        radius,
        width,
        color,
    }
}

/// Player color for the current tint; the rainbow cycles with the frame counter
pub fn player_color(tint: Tint, frame: u64) -> [f32; 4] {
    match tint {
        Tint::Neutral => colors::PLAYER,
        Tint::Damage => colors::PLAYER_DAMAGE,
        Tint::Heal => colors::PLAYER_HEAL,
        Tint::Rainbow => Color::from_hsl((frame * 10 % 360) as f32, 1.0, 0.5).to_rgba(1.0),
    }
}

impl Scene {
    /// Build the draw list; `reduced_motion` freezes pulses and drops flashes
    pub fn from_state(state: &GameState, reduced_motion: bool) -> Self {
        let frame = state.frame;
        let t = frame as f32;
        let pulse = |speed: f32, amount: f32| {
            if reduced_motion {
                1.0
            } else {
                (t * speed).sin() * amount + 1.0
            }
        };

        let mut scene = Scene {
            clear_color: colors::BACKGROUND,
            ..Default::default()
        };

        for particle in &state.particles {
            scene.circles.push(circle(
                particle.pos,
                particle.radius,
                particle.color.to_rgba(particle.alpha.clamp(0.0, 1.0)),
            ));
        }

        for power_up in &state.power_ups {
            let hue = (power_up.hue + t * 5.0) % 360.0;
            let color = Color::from_hsl(hue, 1.0, 0.65).to_rgba(1.0);
            let ring_radius = power_up.radius + 8.0 + (pulse(0.1, 4.0) - 1.0);
            scene.rings.push(ring(power_up.pos, ring_radius, 2.0, [
                color[0], color[1], color[2], 0.8,
            ]));
            scene
                .circles
                .push(circle(power_up.pos, power_up.radius * pulse(0.15, 0.4), color));
            scene.circles.push(circle(
                power_up.pos,
                power_up.radius * 0.4,
                colors::POWER_UP_CORE,
            ));
        }

        for enemy in &state.enemies {
            scene
                .circles
                .push(circle(enemy.pos, enemy.radius, enemy.color.to_rgba(1.0)));
        }

        for projectile in &state.projectiles {
            scene.circles.push(circle(
                projectile.pos,
                projectile.radius,
                projectile.color.to_rgba(1.0),
            ));
        }

        let player = &state.player;
        scene
            .circles
            .push(circle(player.pos, player.radius, player_color(player.tint, frame)));

        if let Some(wave) = state.shockwave.as_ref().filter(|w| w.active) {
            scene
                .rings
                .push(ring(wave.origin, wave.radius, 8.0, colors::SHOCKWAVE));
            scene
                .rings
                .push(ring(wave.origin, wave.radius, 3.0, colors::SHOCKWAVE_INNER));
            scene.rings.push(ring(
                wave.origin,
                (wave.radius - 20.0).max(0.0),
                2.0,
                colors::SHOCKWAVE_TRAIL,
            ));
        }

        if !reduced_motion {
            if player.damage_flash > 0 {
                let full = state.tuning.damage_flash_frames.max(1) as f32;
                scene.flashes.push(ScreenFlash {
                    color: colors::DAMAGE_FLASH,
                    intensity: player.damage_flash as f32 / full * 0.4,
                    focus: state.bounds.center(),
                });
            }
            if player.heal_flash > 0 {
                let full = state.tuning.heal_flash_frames.max(1) as f32;
                scene.flashes.push(ScreenFlash {
                    color: colors::HEAL_FLASH,
                    intensity: player.heal_flash as f32 / full * 0.5,
                    focus: player.pos,
                });
            }
        }

        scene
    }

    /// Triangulate every circle and ring
    pub fn vertices(&self, max_edge: f32) -> Vec<Vertex> {
        let mut vertices = Vec::new();
        for c in &self.circles {
            let segments = shapes::segments_for_radius(c.radius, max_edge);
            vertices.extend(shapes::circle(Vec2::from(c.center), c.radius, c.color, segments));
        }
        for r in &self.rings {
            let segments = shapes::segments_for_radius(r.radius, max_edge);
            vertices.extend(shapes::ring(
                Vec2::from(r.center),
                r.radius - r.width / 2.0,
                r.radius + r.width / 2.0,
                r.color,
                segments,
            ));
        }
        vertices
    }
}
