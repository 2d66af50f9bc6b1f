//! Difficulty curve, ranks and the no-hit streak

use serde::{Deserialize, Serialize};

use super::powerups;
use super::state::{GameEvent, GameState};
use crate::consts::MAX_LIVES;
use crate::tuning::Tuning;

/// Score needed for each rank, ascending; index 0 is rank 1
pub const RANK_THRESHOLDS: [u64; 15] = [
    0, 100, 300, 600, 1_000, 1_500, 2_200, 3_000, 4_000, 5_500, 7_500, 10_000, 13_000, 17_000,
    22_000,
];

pub const RANK_TITLES: [&str; 15] = [
    "RECRUIT",
    "CADET",
    "PILOT",
    "WARRIOR",
    "VETERAN",
    "ELITE",
    "COMMANDER",
    "CAPTAIN",
    "ADMIRAL",
    "LEGEND",
    "COSMIC HERO",
    "STAR SLAYER",
    "VOID WALKER",
    "GALAXY GUARDIAN",
    "CELESTIAL",
];

/// Unbroken time (ms) needed for each streak tier; tier 0 is "no streak"
pub const STREAK_THRESHOLDS_MS: [f32; 8] = [
    0.0, 5_000.0, 10_000.0, 20_000.0, 35_000.0, 55_000.0, 80_000.0, 120_000.0,
];

pub const STREAK_TITLES: [&str; 7] = [
    "FOCUSED",
    "UNTOUCHED",
    "FLAWLESS",
    "GODLIKE",
    "IMMORTAL",
    "INVINCIBLE",
    "LEGENDARY",
];

/// Enemy speed for a score; never lower than `current`
pub fn difficulty_for_score(score: u64, current: f32, tuning: &Tuning) -> f32 {
    let curve = tuning.difficulty_base
        + (score as f32 / tuning.difficulty_divisor + 1.0).log10() * tuning.difficulty_scale;
    curve.max(current)
}

/// 1-based rank for a score
pub fn rank_for_score(score: u64) -> u32 {
    RANK_THRESHOLDS.iter().rposition(|&t| score >= t).unwrap_or(0) as u32 + 1
}

/// Title shown for a rank; ranks past the table keep the last title
pub fn rank_title(rank: u32) -> &'static str {
    let index = (rank.max(1) as usize - 1).min(RANK_TITLES.len() - 1);
    RANK_TITLES[index]
}

/// Tier reached after `time_ms` without being hit
pub fn streak_tier(time_ms: f32) -> usize {
    STREAK_THRESHOLDS_MS
        .iter()
        .rposition(|&t| time_ms >= t)
        .unwrap_or(0)
}

pub fn streak_title(tier: usize) -> Option<&'static str> {
    tier.checked_sub(1).and_then(|i| STREAK_TITLES.get(i)).copied()
}

/// Live and best no-hit streak
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StreakTracker {
    pub time_ms: f32,
    pub tier: usize,
    /// Longest streak this run
    pub best_ms: f32,
    /// Highest tier this run
    pub best_tier: usize,
}

impl StreakTracker {
    /// Add unhit time; returns the tracker and the tier just reached, if any
    pub fn advance(&self, elapsed_ms: f32) -> (Self, Option<usize>) {
        let time_ms = self.time_ms + elapsed_ms;
        let tier = streak_tier(time_ms);
        let next = Self {
            time_ms,
            tier,
            best_ms: self.best_ms.max(time_ms),
            best_tier: self.best_tier.max(tier),
        };
        let reached = (tier > self.tier).then_some(tier);
        (next, reached)
    }

    /// Drop the live streak, keeping the run's best
    pub fn reset(&self) -> Self {
        Self {
            time_ms: 0.0,
            tier: 0,
            ..*self
        }
    }
}

/// Timed banner; `value` is the rank or streak tier it announces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub value: u32,
    pub frames_remaining: u32,
    pub total_frames: u32,
}

impl Notification {
    pub fn new(value: u32, frames: u32) -> Self {
        Self {
            value,
            frames_remaining: frames,
            total_frames: frames,
        }
    }

    /// One frame older; `None` once spent
    pub fn tick(self) -> Option<Self> {
        let frames_remaining = self.frames_remaining.saturating_sub(1);
        (frames_remaining > 0).then_some(Self {
            frames_remaining,
            ..self
        })
    }
}

/// Streak step of the frame: grow the timer, announce new tiers
pub fn update_streak(state: &mut GameState, elapsed_ms: f32) {
    state.streak_notice = state.streak_notice.and_then(Notification::tick);

    let (streak, reached) = state.player.streak.advance(elapsed_ms);
    state.player.streak = streak;

    if let Some(tier) = reached {
        log::debug!(
            "Streak tier {} ({}) at {:.1}s",
            tier,
            streak_title(tier).unwrap_or("-"),
            streak.time_ms / 1000.0
        );
        state.streak_notice = Some(Notification::new(
            tier as u32,
            state.tuning.streak_notification_frames,
        ));
        state.events.push(GameEvent::StreakTier { tier });
    }
}

/// Difficulty and rank step of the frame
pub fn update_progression(state: &mut GameState) {
    state.level_up = state.level_up.and_then(Notification::tick);

    let score = state.player.score;
    state.settings.difficulty =
        difficulty_for_score(score, state.settings.difficulty, &state.tuning);

    let rank = rank_for_score(score);
    if rank <= state.player.rank {
        return;
    }

    let gained = rank - state.player.rank;
    let tuning = &state.tuning;
    let player = &mut state.player;
    player.rank = rank;
    player.lives = (player.lives as u32 + gained).min(MAX_LIVES as u32) as u8;
    player.base_speed += tuning.rank_speed_bonus * gained as f32;
    player.projectile_speed += tuning.rank_projectile_speed_bonus * gained as f32;
    state.level_up = Some(Notification::new(rank, tuning.level_up_frames));
    powerups::refresh_speed(state);

    log::info!(
        "Rank up: {} ({}) at score {}",
        rank,
        rank_title(rank),
        score
    );
    state.events.push(GameEvent::RankUp { rank });
}
