//! Power-up registry
//!
//! Each kind declares a duration plus an `apply` and a `remove` transform.
//! Every field a kind touches is owned by that kind alone, and `remove`
//! restores it from the player's or the arsenal's baseline, so effects of
//! different kinds can be stacked and expired in any order.
//!
//! | kind       | owns                                   |
//! |------------|----------------------------------------|
//! | Health     | lives (+1), heal tint / flash          |
//! | Speed      | `player.speed`                         |
//! | Tiny       | `player.radius`                        |
//! | Cannon     | projectile radius and damage           |
//! | Invincible | `player.is_invincible`, rainbow tint   |
//! | RapidFire  | `flags.rapid_fire_active`              |
//! | Shockwave  | `shockwave` (spawns one)               |
//! | Multishot  | `flags.multishot_active`               |

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entities::{Shockwave, Tint};
use super::state::{GameEvent, GameState};
use crate::consts::MAX_LIVES;

pub const SPEED_MULTIPLIER: f32 = 2.0;
pub const TINY_RADIUS: f32 = 5.0;
pub const CANNON_RADIUS: f32 = 30.0;
pub const CANNON_DAMAGE: i32 = 2;

/// Every power-up the game knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Health,
    Speed,
    Tiny,
    Cannon,
    Invincible,
    RapidFire,
    Shockwave,
    Multishot,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 8] = [
        PowerUpKind::Health,
        PowerUpKind::Speed,
        PowerUpKind::Tiny,
        PowerUpKind::Cannon,
        PowerUpKind::Invincible,
        PowerUpKind::RapidFire,
        PowerUpKind::Shockwave,
        PowerUpKind::Multishot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerUpKind::Health => "health",
            PowerUpKind::Speed => "speed",
            PowerUpKind::Tiny => "tiny",
            PowerUpKind::Cannon => "cannon",
            PowerUpKind::Invincible => "invincible",
            PowerUpKind::RapidFire => "rapidFire",
            PowerUpKind::Shockwave => "shockwave",
            PowerUpKind::Multishot => "multishot",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "health" => Some(PowerUpKind::Health),
            "speed" => Some(PowerUpKind::Speed),
            "tiny" => Some(PowerUpKind::Tiny),
            "cannon" => Some(PowerUpKind::Cannon),
            "invincible" => Some(PowerUpKind::Invincible),
            "rapidfire" | "rapid_fire" => Some(PowerUpKind::RapidFire),
            "shockwave" => Some(PowerUpKind::Shockwave),
            "multishot" => Some(PowerUpKind::Multishot),
            _ => None,
        }
    }

    pub fn effect(&self) -> &'static PowerUpEffect {
        match self {
            PowerUpKind::Health => &HEALTH,
            PowerUpKind::Speed => &SPEED,
            PowerUpKind::Tiny => &TINY,
            PowerUpKind::Cannon => &CANNON,
            PowerUpKind::Invincible => &INVINCIBLE,
            PowerUpKind::RapidFire => &RAPID_FIRE,
            PowerUpKind::Shockwave => &SHOCKWAVE,
            PowerUpKind::Multishot => &MULTISHOT,
        }
    }

    /// Instant kinds take effect on pickup; their duration only feeds the HUD
    pub fn is_instant(&self) -> bool {
        self.effect().instant
    }

    pub fn duration_ms(&self) -> f32 {
        self.effect().duration_ms
    }
}

/// Registry entry for one kind
pub struct PowerUpEffect {
    pub duration_ms: f32,
    pub instant: bool,
    pub apply: fn(&mut GameState),
    pub remove: fn(&mut GameState),
}

static HEALTH: PowerUpEffect = PowerUpEffect {
    duration_ms: 500.0,
    instant: true,
    apply: |s| {
        s.player.lives = (s.player.lives + 1).min(MAX_LIVES);
        s.player.heal_flash = s.tuning.heal_flash_frames;
        if !s.player.is_invincible {
            s.player.tint = Tint::Heal;
            s.player.tint_ms = s.tuning.heal_tint_ms;
        }
    },
    remove: |s| {
        if s.player.tint == Tint::Heal {
            s.player.tint = Tint::Neutral;
            s.player.tint_ms = 0.0;
        }
    },
};

static SPEED: PowerUpEffect = PowerUpEffect {
    duration_ms: 18_000.0,
    instant: false,
    apply: |s| s.player.speed = s.player.base_speed * SPEED_MULTIPLIER,
    remove: |s| s.player.speed = s.player.base_speed,
};

static TINY: PowerUpEffect = PowerUpEffect {
    duration_ms: 20_000.0,
    instant: false,
    apply: |s| s.player.radius = TINY_RADIUS,
    remove: |s| s.player.radius = s.player.base_radius,
};

static CANNON: PowerUpEffect = PowerUpEffect {
    duration_ms: 15_000.0,
    instant: false,
    apply: |s| {
        s.settings.projectile_radius = CANNON_RADIUS;
        s.settings.projectile_damage = CANNON_DAMAGE;
    },
    remove: |s| {
        s.settings.projectile_radius = s.settings.base_projectile_radius;
        s.settings.projectile_damage = s.settings.base_projectile_damage;
    },
};

static INVINCIBLE: PowerUpEffect = PowerUpEffect {
    duration_ms: 8_000.0,
    instant: false,
    apply: |s| {
        s.player.is_invincible = true;
        s.player.tint = Tint::Rainbow;
        s.player.tint_ms = 0.0;
    },
    remove: |s| {
        s.player.is_invincible = false;
        if s.player.tint == Tint::Rainbow {
            s.player.tint = Tint::Neutral;
        }
    },
};

static RAPID_FIRE: PowerUpEffect = PowerUpEffect {
    duration_ms: 15_000.0,
    instant: false,
    apply: |s| s.flags.rapid_fire_active = true,
    remove: |s| s.flags.rapid_fire_active = false,
};

static SHOCKWAVE: PowerUpEffect = PowerUpEffect {
    duration_ms: 100.0,
    instant: true,
    apply: |s| s.shockwave = Some(Shockwave::new(s.player.pos, s.tuning.shockwave_speed)),
    remove: |_| {},
};

static MULTISHOT: PowerUpEffect = PowerUpEffect {
    duration_ms: 12_000.0,
    instant: false,
    apply: |s| s.flags.multishot_active = true,
    remove: |s| s.flags.multishot_active = false,
};

/// What happens to a non-instant pickup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActivationPolicy {
    /// Activate on pickup; re-collecting an active kind extends it
    #[default]
    Immediate,
    /// Park pickups in a bounded hotbar until the player fires them off
    Hotbar { slots: usize },
}

/// An effect currently applied to the run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivePowerUp {
    pub kind: PowerUpKind,
    pub time_remaining: f32,
    /// Full length of the bar (grows when extended)
    pub duration: f32,
}

impl ActivePowerUp {
    pub fn progress(&self) -> f32 {
        if self.duration > 0.0 {
            (self.time_remaining / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Pure `apply`: the state with `kind` granted
pub fn apply(kind: PowerUpKind, state: &GameState) -> GameState {
    let mut next = state.clone();
    apply_effect(&mut next, kind);
    next
}

/// Pure `remove`: the state with `kind`'s fields back at their baselines
pub fn remove(kind: PowerUpKind, state: &GameState) -> GameState {
    let mut next = state.clone();
    remove_effect(&mut next, kind);
    next
}

/// Activate a power-up given by name; unknown names leave the state as is
pub fn activate_by_name(state: &GameState, name: &str) -> GameState {
    let mut next = state.clone();
    match PowerUpKind::from_name(name) {
        Some(kind) => activate(&mut next, kind),
        None => log::warn!("Ignoring unknown power-up '{}'", name),
    }
    next
}

/// Remove a power-up given by name; unknown names leave the state as is
pub fn deactivate_by_name(state: &GameState, name: &str) -> GameState {
    let mut next = state.clone();
    match PowerUpKind::from_name(name) {
        Some(kind) => deactivate(&mut next, kind),
        None => log::warn!("Ignoring unknown power-up '{}'", name),
    }
    next
}

fn apply_effect(state: &mut GameState, kind: PowerUpKind) {
    (kind.effect().apply)(state);
    state.player.has_power_up = true;
}

fn remove_effect(state: &mut GameState, kind: PowerUpKind) {
    (kind.effect().remove)(state);
    state.player.has_power_up = state.active_power_ups.iter().any(|a| a.kind != kind);
}

pub fn is_active(state: &GameState, kind: PowerUpKind) -> bool {
    state.active_power_ups.iter().any(|a| a.kind == kind)
}

/// Apply `kind` and track its timer, or extend the timer if already running
pub fn activate(state: &mut GameState, kind: PowerUpKind) {
    let duration = kind.duration_ms();
    if let Some(entry) = state.active_power_ups.iter_mut().find(|a| a.kind == kind) {
        entry.time_remaining += duration;
        entry.duration = entry.duration.max(entry.time_remaining);
        if kind.is_instant() {
            apply_effect(state, kind);
        }
        log::debug!("Extended {} power-up", kind.as_str());
    } else {
        state.active_power_ups.push(ActivePowerUp {
            kind,
            time_remaining: duration,
            duration,
        });
        apply_effect(state, kind);
        log::info!("Activated {} power-up ({} ms)", kind.as_str(), duration);
    }
    state.events.push(GameEvent::PowerUpActivated(kind));
}

/// Drop `kind`'s timer and undo its effect
pub fn deactivate(state: &mut GameState, kind: PowerUpKind) {
    state.active_power_ups.retain(|a| a.kind != kind);
    remove_effect(state, kind);
}

/// Route a pickup through the activation policy
pub fn collect(state: &mut GameState, kind: PowerUpKind) {
    state.events.push(GameEvent::PowerUpCollected(kind));

    let slots = match state.tuning.activation {
        ActivationPolicy::Hotbar { slots } if !kind.is_instant() && !is_active(state, kind) => {
            slots
        }
        _ => {
            activate(state, kind);
            return;
        }
    };

    if state.hotbar.len() < slots {
        state.hotbar.push(kind);
        state.events.push(GameEvent::PowerUpQueued(kind));
    } else {
        log::debug!("Hotbar full, {} pickup lost", kind.as_str());
    }
}

/// Fire off a hotbar slot; out-of-range slots are ignored
pub fn use_hotbar_slot(state: &mut GameState, slot: usize) {
    if slot < state.hotbar.len() {
        let kind = state.hotbar.remove(slot);
        activate(state, kind);
    }
}

/// Count active timers down and expire the finished ones
pub fn tick_active(state: &mut GameState, elapsed_ms: f32) {
    let mut expired = Vec::new();
    for entry in &mut state.active_power_ups {
        entry.time_remaining -= elapsed_ms;
        if entry.time_remaining <= 0.0 {
            expired.push(entry.kind);
        }
    }
    if expired.is_empty() {
        return;
    }

    state.active_power_ups.retain(|a| a.time_remaining > 0.0);
    for kind in expired {
        remove_effect(state, kind);
        log::info!("{} power-up expired", kind.as_str());
        state.events.push(GameEvent::PowerUpExpired(kind));
    }
}

/// Re-derive move speed after the baseline changed
pub fn refresh_speed(state: &mut GameState) {
    state.player.speed = if is_active(state, PowerUpKind::Speed) {
        state.player.base_speed * SPEED_MULTIPLIER
    } else {
        state.player.base_speed
    };
}

/// Pick a drop kind, preferring kinds that are not already active
pub fn random_kind(
    rng: &mut impl Rng,
    enabled: &[PowerUpKind],
    active: &[ActivePowerUp],
) -> PowerUpKind {
    let pool: &[PowerUpKind] = if enabled.is_empty() {
        &PowerUpKind::ALL
    } else {
        enabled
    };
    let available: Vec<PowerUpKind> = pool
        .iter()
        .copied()
        .filter(|k| !active.iter().any(|a| a.kind == *k))
        .collect();

    if available.is_empty() {
        pool[rng.random_range(0..pool.len())]
    } else {
        available[rng.random_range(0..available.len())]
    }
}
