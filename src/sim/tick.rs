//! Per-frame state transition
//!
//! [`advance_frame`] is the only way a running match moves forward. It takes
//! a snapshot and returns a new one, in a fixed order:
//!
//! 1. power-up timers
//! 2. no-hit streak
//! 3. difficulty and rank
//! 4. input events, spawner, entity movement
//! 5. shockwave
//! 6. collisions (a lost last life ends the frame here)
//! 7. collected power-up
//! 8. power-up drop
//! 9. tint timers

use glam::Vec2;
use rand::Rng;

use super::collision::{self, Resolution};
use super::entities::{Color, Enemy, MoveIntent, PowerUp, Projectile, Tint};
use super::geometry::{angle_to, is_out_of_bounds, velocity_from_angle};
use super::powerups;
use super::progression;
use super::state::{GameEvent, GameState};
use crate::consts::POWER_UP_RADIUS;

/// Input gathered for a single frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// One shot (or fan) toward each point
    pub fire_at: Vec<Vec2>,
    /// Activate a parked hotbar power-up
    pub use_hotbar_slot: Option<usize>,
}

impl FrameInput {
    pub fn intent(&self) -> MoveIntent {
        MoveIntent {
            left: self.left,
            right: self.right,
            up: self.up,
            down: self.down,
        }
    }
}

/// Result of advancing one frame
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    Running(GameState),
    /// Terminal snapshot; further frames return it unchanged
    GameOver(GameState),
}

impl FrameOutcome {
    pub fn state(&self) -> &GameState {
        match self {
            FrameOutcome::Running(s) | FrameOutcome::GameOver(s) => s,
        }
    }

    pub fn into_state(self) -> GameState {
        match self {
            FrameOutcome::Running(s) | FrameOutcome::GameOver(s) => s,
        }
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self, FrameOutcome::GameOver(_))
    }
}

/// Advance the match by one frame of `elapsed_ms` simulated time
///
/// Paused and finished states come back unchanged. Negative or non-finite
/// elapsed time counts as zero.
pub fn advance_frame(state: &GameState, input: &FrameInput, elapsed_ms: f32) -> FrameOutcome {
    if !state.flags.game_started {
        return FrameOutcome::GameOver(state.clone());
    }
    if !state.flags.is_running {
        return FrameOutcome::Running(state.clone());
    }

    let elapsed = if elapsed_ms.is_finite() {
        elapsed_ms.max(0.0)
    } else {
        0.0
    };

    let mut next = state.clone();
    next.events.clear();
    next.flags.power_up_dropped = false;
    next.frame += 1;
    next.time_ms += elapsed as f64;
    next.input = input.intent();

    powerups::tick_active(&mut next, elapsed);
    progression::update_streak(&mut next, elapsed);
    progression::update_progression(&mut next);
    update_entities(&mut next, input, elapsed);
    collision::update_shockwave(&mut next);

    let before_collisions = next.clone();
    if collision::resolve(&mut next) == Resolution::GameOver {
        return FrameOutcome::GameOver(end_match(before_collisions));
    }

    if let Some(kind) = next.collected_power_up.take() {
        powerups::collect(&mut next, kind);
    }
    materialize_drop(&mut next);
    update_tint(&mut next, elapsed);
    next.normalize_order();

    FrameOutcome::Running(next)
}

fn end_match(mut state: GameState) -> GameState {
    state.flags.is_running = false;
    state.flags.game_started = false;
    state.events.push(GameEvent::GameOver {
        score: state.player.score,
    });
    log::info!(
        "Game over: score {}, rank {}, {:.1}s played",
        state.player.score,
        state.player.rank,
        state.time_ms / 1000.0
    );
    state
}

fn update_entities(state: &mut GameState, input: &FrameInput, elapsed_ms: f32) {
    if let Some(slot) = input.use_hotbar_slot {
        powerups::use_hotbar_slot(state, slot);
    }
    for &target in &input.fire_at {
        fire(state, target);
    }

    if state.tuning.spawning {
        let interval = state.tuning.spawn_interval_ms;
        state.spawn_timer_ms += elapsed_ms;
        if state.spawn_timer_ms >= interval {
            // At most one spawn per frame; a long frame does not flood the field
            state.spawn_timer_ms = (state.spawn_timer_ms - interval).min(interval);
            spawn_enemy(state);
        }
    }

    state.player = state.player.update(state.input, &state.bounds);

    let target = state.player.pos;
    let speed = state.settings.difficulty;
    state.enemies = state
        .enemies
        .iter()
        .map(|e| e.update(target, speed))
        .collect();

    let bounds = state.bounds;
    state.projectiles = state
        .projectiles
        .iter()
        .map(Projectile::update)
        .filter(|p| !is_out_of_bounds(p, &bounds))
        .collect();

    state.particles = state
        .particles
        .iter()
        .map(|p| p.update())
        .filter(|p| p.is_alive())
        .collect();
}

/// Shoot from the player toward `target`; multishot fans out the volley
pub fn fire(state: &mut GameState, target: Vec2) {
    let origin = state.player.pos;
    let angle = angle_to(origin, target);
    let count = if state.flags.multishot_active {
        state.tuning.multishot_count
    } else {
        1
    };
    let middle = (count as f32 - 1.0) / 2.0;

    for i in 0..count {
        let heading = angle + (i as f32 - middle) * state.tuning.multishot_spread;
        state.projectiles.push(Projectile {
            pos: origin,
            radius: state.settings.projectile_radius,
            color: Color::PROJECTILE,
            vel: velocity_from_angle(heading, state.player.projectile_speed),
        });
    }
    state.events.push(GameEvent::Shot { count });
}

/// Spawn one enemy just outside a random edge, aimed at the player
pub fn spawn_enemy(state: &mut GameState) {
    let tuning = &state.tuning;
    let bounds = state.bounds;
    let rng = &mut state.rng;

    let mut radius = (rng.random::<f32>() * tuning.max_enemy_spawn_radius).round();
    if radius < tuning.min_enemy_spawn_radius {
        radius += tuning.min_enemy_spawn_radius;
    }

    let pos = if rng.random::<f32>() < 0.5 {
        let x = if rng.random::<f32>() < 0.5 {
            -radius
        } else {
            bounds.width + radius
        };
        Vec2::new(x, rng.random::<f32>() * bounds.height)
    } else {
        let y = if rng.random::<f32>() < 0.5 {
            -radius
        } else {
            bounds.height + radius
        };
        Vec2::new(rng.random::<f32>() * bounds.width, y)
    };
    let color = Color::from_hsl(rng.random::<f32>() * 360.0, 0.5, 0.5);

    let id = state.next_entity_id();
    let enemy = Enemy::new(
        id,
        pos,
        radius,
        color,
        state.player.pos,
        state.settings.difficulty,
    );
    state.enemies.push(enemy);
    state.events.push(GameEvent::EnemySpawned { id });
}

/// Turn a recorded drop point into a ground power-up
fn materialize_drop(state: &mut GameState) {
    let Some(point) = state.pending_power_up_drop.take() else {
        return;
    };
    let kind = powerups::random_kind(
        &mut state.rng,
        &state.tuning.enabled_power_ups,
        &state.active_power_ups,
    );
    let hue = state.rng.random::<f32>() * 360.0;
    let pos = state.bounds.clamp_inside(point, POWER_UP_RADIUS);
    let id = state.next_entity_id();

    log::debug!("Dropped {} at ({:.0}, {:.0})", kind.as_str(), pos.x, pos.y);
    state.power_ups.push(PowerUp {
        id,
        pos,
        radius: POWER_UP_RADIUS,
        kind,
        hue,
    });
    state.events.push(GameEvent::PowerUpDropped(kind));
}

fn update_tint(state: &mut GameState, elapsed_ms: f32) {
    let player = &mut state.player;
    if player.is_invincible {
        player.tint = Tint::Rainbow;
        return;
    }
    if matches!(player.tint, Tint::Damage | Tint::Heal) {
        player.tint_ms -= elapsed_ms;
        if player.tint_ms <= 0.0 {
            player.tint = Tint::Neutral;
            player.tint_ms = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{MAX_LIVES, STARTING_LIVES};
    use crate::sim::geometry::Bounds;
    use crate::sim::powerups::PowerUpKind;
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    const FRAME_MS: f32 = 16.0;

    /// Match without the spawner so scenarios control every enemy
    fn quiet_state() -> GameState {
        let tuning = Tuning {
            spawning: false,
            drop_chance: 0.0,
            ..Default::default()
        };
        GameState::new(12345, Bounds::new(800.0, 600.0), tuning)
    }

    fn add_enemy(state: &mut GameState, pos: Vec2, radius: f32) -> u32 {
        let id = state.next_entity_id();
        let enemy = Enemy::new(id, pos, radius, Color::WHITE, state.player.pos, 2.0);
        state.enemies.push(enemy);
        id
    }

    fn add_power_up(state: &mut GameState, kind: PowerUpKind) {
        let id = state.next_entity_id();
        state.power_ups.push(PowerUp {
            id,
            pos: state.player.pos,
            radius: POWER_UP_RADIUS,
            kind,
            hue: 0.0,
        });
    }

    fn still_projectile(pos: Vec2) -> Projectile {
        Projectile {
            pos,
            radius: 5.0,
            color: Color::PROJECTILE,
            vel: Vec2::ZERO,
        }
    }

    fn step(state: &GameState) -> GameState {
        advance_frame(state, &FrameInput::default(), FRAME_MS).into_state()
    }

    #[test]
    fn test_last_life_freezes_match() {
        let mut state = quiet_state();
        state.player.lives = 1;
        state.player.score = 70;
        let pos = state.player.pos;
        add_enemy(&mut state, pos + Vec2::new(5.0, 0.0), 20.0);

        let outcome = advance_frame(&state, &FrameInput::default(), FRAME_MS);
        assert!(outcome.is_game_over());
        let over = outcome.into_state();
        assert_eq!(over.player.lives, 1);
        assert_eq!(over.player.score, 70);
        assert!(!over.flags.is_running);
        assert_eq!(over.enemies.len(), 1, "pre-collision snapshot");
        assert!(over.events.contains(&GameEvent::GameOver { score: 70 }));

        let again = advance_frame(&over, &FrameInput::default(), FRAME_MS);
        assert!(again.is_game_over());
        assert_eq!(again.state(), &over);
    }

    #[test]
    fn test_projectile_wounds_tough_enemy() {
        let mut state = quiet_state();
        let id = add_enemy(&mut state, Vec2::new(100.0, 100.0), 35.0);
        state.projectiles.push(still_projectile(Vec2::new(100.0, 100.0)));

        let next = step(&state);
        assert_eq!(next.player.score, 20);
        let enemy = next.enemies.iter().find(|e| e.id == id).unwrap();
        assert_eq!(enemy.radius, 15.0);
        assert_eq!(enemy.health, 1);
        assert!(next.projectiles.is_empty());
        assert!(next.events.contains(&GameEvent::EnemyWounded { id }));
    }

    #[test]
    fn test_projectile_kills_enemy() {
        let mut state = quiet_state();
        let id = add_enemy(&mut state, Vec2::new(100.0, 100.0), 20.0);
        state.projectiles.push(still_projectile(Vec2::new(100.0, 100.0)));

        let next = step(&state);
        assert_eq!(next.player.score, 10);
        assert!(next.enemies.iter().all(|e| e.id != id));
        assert!(next.projectiles.is_empty());
    }

    #[test]
    fn test_speed_pickup_then_extension() {
        let mut state = quiet_state();
        add_power_up(&mut state, PowerUpKind::Speed);

        let next = step(&state);
        assert_eq!(next.player.speed, 6.0);
        assert!(next.player.has_power_up);
        assert_eq!(next.active_power_ups.len(), 1);
        assert_eq!(next.active_power_ups[0].time_remaining, 18_000.0);

        let mut next = next;
        add_power_up(&mut next, PowerUpKind::Speed);
        let after = step(&next);
        assert_eq!(after.active_power_ups.len(), 1);
        assert_eq!(
            after.active_power_ups[0].time_remaining,
            18_000.0 - FRAME_MS + 18_000.0
        );
    }

    #[test]
    fn test_single_rank_up() {
        let mut state = quiet_state();
        state.player.score = 100;

        let next = step(&state);
        assert_eq!(next.player.rank, 2);
        assert_eq!(next.player.lives, STARTING_LIVES + 1);
        let notice = next.level_up.unwrap();
        assert_eq!(notice.value, 2);
        assert_eq!(notice.frames_remaining, 120);
        assert!(next.events.contains(&GameEvent::RankUp { rank: 2 }));
    }

    #[test]
    fn test_paused_state_is_untouched() {
        let mut state = quiet_state();
        state.flags.is_running = false;
        let input = FrameInput {
            right: true,
            fire_at: vec![Vec2::ZERO],
            ..Default::default()
        };
        let outcome = advance_frame(&state, &input, 500.0);
        assert!(!outcome.is_game_over());
        assert_eq!(outcome.state(), &state);
    }

    #[test]
    fn test_bad_elapsed_counts_as_zero() {
        let mut state = quiet_state();
        add_power_up(&mut state, PowerUpKind::Cannon);
        let state = step(&state);
        let remaining = state.active_power_ups[0].time_remaining;

        for elapsed in [-50.0, f32::NAN, f32::INFINITY] {
            let next = advance_frame(&state, &FrameInput::default(), elapsed).into_state();
            assert_eq!(next.active_power_ups[0].time_remaining, remaining);
            assert_eq!(next.time_ms, state.time_ms);
            assert_eq!(next.frame, state.frame + 1);
        }
    }

    #[test]
    fn test_fire_and_multishot() {
        let mut state = quiet_state();
        let input = FrameInput {
            fire_at: vec![Vec2::new(800.0, 300.0)],
            ..Default::default()
        };
        let next = advance_frame(&state, &input, FRAME_MS).into_state();
        assert_eq!(next.projectiles.len(), 1);
        assert!((next.projectiles[0].vel.x - 10.0).abs() < 1e-4);
        assert!(next.events.contains(&GameEvent::Shot { count: 1 }));

        state.flags.multishot_active = true;
        let next = advance_frame(&state, &input, FRAME_MS).into_state();
        assert_eq!(next.projectiles.len(), 5);
        let middle = next.projectiles[2].vel;
        assert!(middle.y.abs() < 1e-4);
        assert!(next.projectiles[0].vel.y < 0.0);
        assert!(next.projectiles[4].vel.y > 0.0);
    }

    #[test]
    fn test_projectiles_leave_playfield() {
        let mut state = quiet_state();
        state.projectiles.push(Projectile {
            pos: Vec2::new(798.0, 300.0),
            radius: 5.0,
            color: Color::PROJECTILE,
            vel: Vec2::new(10.0, 0.0),
        });
        let next = step(&state);
        assert!(next.projectiles.is_empty());
    }

    #[test]
    fn test_spawner_cadence() {
        let mut state = quiet_state();
        state.tuning.spawning = true;

        let next = advance_frame(&state, &FrameInput::default(), 599.0).into_state();
        assert!(next.enemies.is_empty());

        let next = advance_frame(&next, &FrameInput::default(), 1.0).into_state();
        assert_eq!(next.enemies.len(), 1);
        let enemy = &next.enemies[0];
        assert!((10.0..=40.0).contains(&enemy.radius));
        assert_eq!(enemy.health, if enemy.radius > 30.0 { 2 } else { 1 });
        assert!(matches!(next.events[..], [GameEvent::EnemySpawned { .. }]));
    }

    #[test]
    fn test_drop_lands_inside_playfield() {
        let mut state = quiet_state();
        state.pending_power_up_drop = Some(Vec2::new(-40.0, 900.0));

        let next = step(&state);
        assert!(next.pending_power_up_drop.is_none());
        assert_eq!(next.power_ups.len(), 1);
        assert_eq!(next.power_ups[0].pos, Vec2::new(15.0, 585.0));
    }

    #[test]
    fn test_damage_tint_fades() {
        let mut state = quiet_state();
        state.player.tint = Tint::Damage;
        state.player.tint_ms = 300.0;

        let next = advance_frame(&state, &FrameInput::default(), 200.0).into_state();
        assert_eq!(next.player.tint, Tint::Damage);
        let next = advance_frame(&next, &FrameInput::default(), 150.0).into_state();
        assert_eq!(next.player.tint, Tint::Neutral);
    }

    #[test]
    fn test_hotbar_slot_from_input() {
        let mut state = quiet_state();
        state.tuning.activation = powerups::ActivationPolicy::Hotbar { slots: 3 };
        add_power_up(&mut state, PowerUpKind::Tiny);

        let next = step(&state);
        assert_eq!(next.hotbar, vec![PowerUpKind::Tiny]);
        assert!(!next.player.has_power_up);

        let input = FrameInput {
            use_hotbar_slot: Some(0),
            ..Default::default()
        };
        let next = advance_frame(&next, &input, FRAME_MS).into_state();
        assert!(next.hotbar.is_empty());
        assert_eq!(next.player.radius, powerups::TINY_RADIUS);
    }

    #[test]
    fn test_determinism() {
        let bounds = Bounds::new(640.0, 480.0);
        let mut a = GameState::new(99, bounds, Tuning::default());
        let mut b = GameState::new(99, bounds, Tuning::default());

        for i in 0..600 {
            let input = FrameInput {
                left: i % 90 < 30,
                right: i % 90 > 60,
                fire_at: if i % 7 == 0 {
                    vec![Vec2::new((i * 13 % 640) as f32, 0.0)]
                } else {
                    Vec::new()
                },
                ..Default::default()
            };
            a = advance_frame(&a, &input, FRAME_MS).into_state();
            b = advance_frame(&b, &input, FRAME_MS).into_state();
        }
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn prop_score_never_drops_and_lives_stay_bounded(
            seed in any::<u64>(),
            moves in prop::collection::vec((any::<bool>(), any::<bool>(), any::<bool>(), 0u8..8), 1..120),
        ) {
            let mut state = GameState::new(seed, Bounds::new(400.0, 300.0), Tuning::default());
            for (left, up, shoot, dir) in moves {
                let input = FrameInput {
                    left,
                    right: !left,
                    up,
                    down: !up,
                    fire_at: if shoot {
                        vec![Vec2::new(dir as f32 * 50.0, 0.0)]
                    } else {
                        Vec::new()
                    },
                    use_hotbar_slot: None,
                };
                let outcome = advance_frame(&state, &input, 50.0);
                let next = outcome.state();
                prop_assert!(next.player.score >= state.player.score);
                prop_assert!(next.player.lives <= MAX_LIVES);
                prop_assert!(next.player.lives >= 1);
                prop_assert!(next.settings.difficulty >= state.settings.difficulty);
                prop_assert!(next.player.rank >= state.player.rank);
                for p in &next.particles {
                    prop_assert!(p.alpha > 0.0 && p.alpha <= 1.0);
                }
                let over = outcome.is_game_over();
                state = outcome.into_state();
                if over {
                    break;
                }
            }
        }
    }
}
