//! Collision detection and resolution
//!
//! Runs after every entity has moved. Resolution order per frame:
//! player vs enemies, projectiles vs enemies, player vs ground power-ups.

use glam::Vec2;
use rand::Rng;

use super::entities::{Color, Particle, Tint};
use super::geometry::is_colliding;
use super::state::{GameEvent, GameState};
use crate::consts::ENEMY_SHRINK;

/// Whether the frame survived collision resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Continue,
    /// Last life lost; the caller discards the partially resolved state
    GameOver,
}

/// Resolve all overlaps for the current frame
pub fn resolve(state: &mut GameState) -> Resolution {
    if player_vs_enemies(state) == Resolution::GameOver {
        return Resolution::GameOver;
    }
    projectiles_vs_enemies(state);
    player_vs_power_ups(state);
    state.trim_particles();
    Resolution::Continue
}

/// Burst of debris flying out of `pos`
pub fn spawn_particles(state: &mut GameState, pos: Vec2, color: Color, count: usize) {
    state.particles.reserve(count);
    for _ in 0..count {
        let radius = state.rng.random::<f32>() * 4.0;
        let vx = (state.rng.random::<f32>() - 0.5) * (state.rng.random::<f32>() * 6.0);
        let vy = (state.rng.random::<f32>() - 0.5) * (state.rng.random::<f32>() * 6.0);
        state.particles.push(Particle {
            pos,
            radius,
            color,
            vel: Vec2::new(vx, vy),
            alpha: 1.0,
        });
    }
}

fn player_vs_enemies(state: &mut GameState) -> Resolution {
    let enemies = std::mem::take(&mut state.enemies);
    let mut survivors = Vec::with_capacity(enemies.len());

    for enemy in enemies {
        if !is_colliding(&state.player, &enemy) {
            survivors.push(enemy);
            continue;
        }

        if state.player.is_invincible {
            let (pos, count) = (state.player.pos, state.tuning.kill_particles);
            spawn_particles(state, pos, enemy.color, count);
            state.events.push(GameEvent::EnemyRammed { id: enemy.id });
            continue;
        }

        if state.player.lives <= 1 {
            return Resolution::GameOver;
        }

        let tuning = &state.tuning;
        let player = &mut state.player;
        player.lives -= 1;
        player.tint = Tint::Damage;
        player.tint_ms = tuning.damage_tint_ms;
        player.damage_flash = tuning.damage_flash_frames;
        player.streak = player.streak.reset();
        let (pos, count) = (player.pos, tuning.damage_particles);

        log::debug!("Player hit, {} lives left", state.player.lives);
        spawn_particles(state, pos, Color::DAMAGE, count);
        state.events.push(GameEvent::PlayerHit {
            lives: state.player.lives,
        });
    }

    state.enemies = survivors;
    Resolution::Continue
}

/// Each enemy, in order, absorbs every remaining projectile that overlaps it
///
/// Overlap is tested against the enemy as it stood at the start of the pass,
/// so a wound that shrinks it does not let later bullets slip past. Bullets
/// landing on an enemy that is already dead still count as kills.
fn projectiles_vs_enemies(state: &mut GameState) {
    let enemies = std::mem::take(&mut state.enemies);
    let mut survivors = Vec::with_capacity(enemies.len());

    for enemy in enemies {
        let projectiles = std::mem::take(&mut state.projectiles);
        let (hits, misses): (Vec<_>, Vec<_>) = projectiles
            .into_iter()
            .partition(|p| is_colliding(p, &enemy));
        state.projectiles = misses;

        let mut current = enemy.clone();
        let mut killed = false;
        for projectile in hits {
            current = current.damaged(state.settings.projectile_damage);
            if current.is_destroyed() {
                state.player.score += state.tuning.kill_reward;
                let count = state.tuning.kill_particles;
                spawn_particles(state, projectile.pos, enemy.color, count);
                if !killed {
                    state.events.push(GameEvent::EnemyKilled {
                        id: enemy.id,
                        pos: enemy.pos,
                    });
                    killed = true;
                }
                roll_drop(state, projectile.pos);
            } else {
                current = current.shrunk(ENEMY_SHRINK);
                state.player.score += state.tuning.wound_reward;
                let count = state.tuning.wound_particles;
                spawn_particles(state, projectile.pos, enemy.color, count);
                state.events.push(GameEvent::EnemyWounded { id: enemy.id });
            }
        }

        if !current.is_destroyed() {
            survivors.push(current);
        }
    }

    state.enemies = survivors;
}

/// Chance to record a drop point where an enemy died
fn roll_drop(state: &mut GameState, pos: Vec2) {
    if state.pending_power_up_drop.is_some()
        || state.power_ups.len() >= state.tuning.max_ground_power_ups
    {
        return;
    }
    if state.rng.random::<f64>() < state.tuning.drop_chance {
        state.pending_power_up_drop = Some(pos);
        state.flags.power_up_dropped = true;
    }
}

/// Pick up at most one power-up per frame
fn player_vs_power_ups(state: &mut GameState) {
    if state.collected_power_up.is_some() {
        return;
    }
    if let Some(index) = state
        .power_ups
        .iter()
        .position(|p| is_colliding(&state.player, p))
    {
        let power_up = state.power_ups.remove(index);
        log::debug!("Picked up {}", power_up.kind.as_str());
        state.collected_power_up = Some(power_up.kind);
    }
}

/// Grow the shockwave ring and destroy every enemy it sweeps over
pub fn update_shockwave(state: &mut GameState) {
    let Some(wave) = state.shockwave.take() else {
        return;
    };
    let mut wave = wave.update(state.bounds.diagonal());
    if !wave.active {
        return;
    }

    let enemies = std::mem::take(&mut state.enemies);
    let mut survivors = Vec::with_capacity(enemies.len());
    for enemy in enemies {
        if wave.hit_enemies.contains(&enemy.id) || !wave.reaches(&enemy) {
            survivors.push(enemy);
            continue;
        }
        wave.hit_enemies.push(enemy.id);
        state.player.score += state.tuning.kill_reward;
        let count = state.tuning.kill_particles;
        spawn_particles(state, enemy.pos, enemy.color, count);
        state.events.push(GameEvent::ShockwaveKill { id: enemy.id });
    }

    state.enemies = survivors;
    state.shockwave = Some(wave);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entities::{Enemy, PowerUp, Projectile, Shockwave};
    use crate::sim::geometry::Bounds;
    use crate::sim::powerups::PowerUpKind;
    use crate::tuning::Tuning;

    fn state() -> GameState {
        let mut state = GameState::new(3, Bounds::new(800.0, 600.0), Tuning::default());
        state.player.pos = Vec2::new(400.0, 300.0);
        state
    }

    fn enemy(state: &mut GameState, pos: Vec2, radius: f32) -> Enemy {
        let id = state.next_entity_id();
        Enemy::new(id, pos, radius, Color::WHITE, state.player.pos, 2.0)
    }

    fn projectile(pos: Vec2) -> Projectile {
        Projectile {
            pos,
            radius: 5.0,
            color: Color::PROJECTILE,
            vel: Vec2::ZERO,
        }
    }

    #[test]
    fn test_player_hit_costs_life() {
        let mut s = state();
        let e = enemy(&mut s, Vec2::new(420.0, 300.0), 10.0);
        s.enemies.push(e);
        s.player.streak.time_ms = 7_000.0;
        s.player.streak.tier = 1;

        assert_eq!(resolve(&mut s), Resolution::Continue);
        assert_eq!(s.player.lives, 2);
        assert!(s.enemies.is_empty());
        assert_eq!(s.player.tint, Tint::Damage);
        assert_eq!(s.player.damage_flash, 15);
        assert_eq!(s.player.streak.time_ms, 0.0);
        assert_eq!(s.particles.len(), 30);
    }

    #[test]
    fn test_last_life_is_game_over() {
        let mut s = state();
        s.player.lives = 1;
        let e = enemy(&mut s, Vec2::new(410.0, 300.0), 10.0);
        s.enemies.push(e);
        assert_eq!(resolve(&mut s), Resolution::GameOver);
    }

    #[test]
    fn test_invincible_player_rams_enemies() {
        let mut s = state();
        s.player.is_invincible = true;
        let e = enemy(&mut s, Vec2::new(410.0, 300.0), 10.0);
        s.enemies.push(e);
        assert_eq!(resolve(&mut s), Resolution::Continue);
        assert_eq!(s.player.lives, 3);
        assert_eq!(s.player.score, 0);
        assert!(s.enemies.is_empty());
        assert_eq!(s.particles.len(), 25);
    }

    #[test]
    fn test_wound_then_kill() {
        let mut s = state();
        let e = enemy(&mut s, Vec2::new(100.0, 100.0), 35.0);
        s.enemies.push(e);
        s.projectiles.push(projectile(Vec2::new(100.0, 100.0)));

        resolve(&mut s);
        assert_eq!(s.player.score, 20);
        assert_eq!(s.enemies[0].radius, 15.0);
        assert_eq!(s.enemies[0].health, 1);
        assert!(s.projectiles.is_empty());
        assert_eq!(s.particles.len(), 8);

        s.projectiles.push(projectile(Vec2::new(100.0, 100.0)));
        resolve(&mut s);
        assert_eq!(s.player.score, 30);
        assert!(s.enemies.is_empty());
    }

    #[test]
    fn test_dead_enemy_keeps_absorbing_projectiles() {
        let mut s = state();
        let e = enemy(&mut s, Vec2::new(100.0, 100.0), 20.0);
        s.enemies.push(e);
        for _ in 0..5 {
            s.projectiles.push(projectile(Vec2::new(100.0, 100.0)));
        }

        resolve(&mut s);
        assert_eq!(s.player.score, 50);
        assert!(s.enemies.is_empty());
        assert!(s.projectiles.is_empty());
        let kills = s
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::EnemyKilled { .. }))
            .count();
        assert_eq!(kills, 1);
    }

    #[test]
    fn test_same_frame_hits_use_starting_radius() {
        let mut s = state();
        let e = enemy(&mut s, Vec2::new(100.0, 100.0), 35.0);
        s.enemies.push(e);
        s.projectiles.push(projectile(Vec2::new(100.0, 100.0)));
        // Outside the radius the enemy shrinks to after the first hit
        s.projectiles.push(projectile(Vec2::new(130.0, 100.0)));

        resolve(&mut s);
        assert_eq!(s.player.score, 30);
        assert!(s.enemies.is_empty());
        assert!(s.projectiles.is_empty());
        assert_eq!(s.particles.len(), 8 + 25);
    }

    #[test]
    fn test_earlier_enemy_takes_shared_projectile() {
        let mut s = state();
        let first = enemy(&mut s, Vec2::new(100.0, 100.0), 20.0);
        let second = enemy(&mut s, Vec2::new(120.0, 100.0), 20.0);
        let second_id = second.id;
        s.enemies.push(first);
        s.enemies.push(second);
        s.projectiles.push(projectile(Vec2::new(110.0, 100.0)));

        resolve(&mut s);
        assert_eq!(s.player.score, 10);
        assert_eq!(s.enemies.len(), 1);
        assert_eq!(s.enemies[0].id, second_id);
    }

    #[test]
    fn test_drop_recorded_on_kill() {
        let mut s = state();
        s.tuning.drop_chance = 1.0;
        let e = enemy(&mut s, Vec2::new(100.0, 100.0), 20.0);
        s.enemies.push(e);
        s.projectiles.push(projectile(Vec2::new(101.0, 100.0)));

        resolve(&mut s);
        assert_eq!(s.pending_power_up_drop, Some(Vec2::new(101.0, 100.0)));
        assert!(s.flags.power_up_dropped);
    }

    #[test]
    fn test_no_drop_when_ground_full() {
        let mut s = state();
        s.tuning.drop_chance = 1.0;
        for i in 0..3 {
            let id = s.next_entity_id();
            s.power_ups.push(PowerUp {
                id,
                pos: Vec2::new(700.0, 50.0 + i as f32 * 100.0),
                radius: 15.0,
                kind: PowerUpKind::Speed,
                hue: 0.0,
            });
        }
        let e = enemy(&mut s, Vec2::new(100.0, 100.0), 20.0);
        s.enemies.push(e);
        s.projectiles.push(projectile(Vec2::new(100.0, 100.0)));

        resolve(&mut s);
        assert!(s.pending_power_up_drop.is_none());
    }

    #[test]
    fn test_power_up_pickup() {
        let mut s = state();
        let id = s.next_entity_id();
        s.power_ups.push(PowerUp {
            id,
            pos: Vec2::new(420.0, 300.0),
            radius: 15.0,
            kind: PowerUpKind::Cannon,
            hue: 0.0,
        });
        resolve(&mut s);
        assert!(s.power_ups.is_empty());
        assert_eq!(s.collected_power_up, Some(PowerUpKind::Cannon));
    }

    #[test]
    fn test_shockwave_sweeps_enemies_once() {
        let mut s = state();
        let near = enemy(&mut s, Vec2::new(425.0, 300.0), 10.0);
        let far = enemy(&mut s, Vec2::new(700.0, 300.0), 10.0);
        s.enemies.push(near.clone());
        s.enemies.push(far);
        s.shockwave = Some(Shockwave::new(s.player.pos, 18.0));

        update_shockwave(&mut s);
        assert_eq!(s.enemies.len(), 1);
        assert_eq!(s.player.score, 10);
        let wave = s.shockwave.as_ref().unwrap();
        assert_eq!(wave.hit_enemies, vec![near.id]);
    }

    #[test]
    fn test_shockwave_ends_past_diagonal() {
        let mut s = state();
        let mut wave = Shockwave::new(s.player.pos, 18.0);
        wave.radius = s.bounds.diagonal();
        s.shockwave = Some(wave);
        update_shockwave(&mut s);
        assert!(s.shockwave.is_none());
    }
}
