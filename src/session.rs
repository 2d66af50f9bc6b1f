//! Frame driver
//!
//! [`GameSession`] owns the live game state and is the only thing that
//! advances it. Callers report input as it happens and call
//! [`GameSession::frame`] once per display refresh with a timestamp; the
//! session turns timestamps into elapsed time and queues shots for the next
//! frame instead of touching the state directly.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::leaderboard::ScoreSubmission;
use crate::sim::{
    Bounds, FrameInput, FrameOutcome, GameEvent, GameState, MoveIntent, advance_frame,
};
use crate::tuning::Tuning;

/// Where a finished run ended up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    pub score: u64,
    pub rank: u32,
    /// Simulated play time, pauses excluded
    pub duration_ms: u64,
    pub frames: u64,
    pub best_streak_ms: f32,
    pub best_streak_tier: usize,
}

impl RunSummary {
    fn from_state(state: &GameState) -> Self {
        Self {
            seed: state.seed,
            score: state.player.score,
            rank: state.player.rank,
            duration_ms: state.time_ms.max(0.0) as u64,
            frames: state.frame,
            best_streak_ms: state.player.streak.best_ms,
            best_streak_tier: state.player.streak.best_tier,
        }
    }

    /// Leaderboard submission for this run
    pub fn submission(&self, visitor_id: &str) -> ScoreSubmission {
        ScoreSubmission {
            visitor_id: visitor_id.to_string(),
            score: self.score as i64,
            rank_achieved: self.rank,
            duration_ms: self.duration_ms as i64,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameSession {
    state: GameState,
    tuning: Tuning,
    bounds: Bounds,
    /// Timestamp of the previous frame; `None` right after start or resume
    last_timestamp_ms: Option<f64>,
    movement: MoveIntent,
    queued_shots: Vec<Vec2>,
    queued_hotbar_slot: Option<usize>,
    /// Where held fire is aimed, if the trigger is down
    trigger: Option<Vec2>,
    auto_fire_ms: f32,
    summary: Option<RunSummary>,
}

impl GameSession {
    pub fn new(seed: u64, bounds: Bounds, tuning: Tuning) -> Self {
        Self {
            state: GameState::new(seed, bounds, tuning.clone()),
            tuning,
            bounds,
            last_timestamp_ms: None,
            movement: MoveIntent::default(),
            queued_shots: Vec::new(),
            queued_hotbar_slot: None,
            trigger: None,
            auto_fire_ms: 0.0,
            summary: None,
        }
    }

    /// Resume from a saved snapshot
    pub fn from_state(state: GameState) -> Self {
        let mut session = Self::new(state.seed, state.bounds, state.tuning.clone());
        if !state.flags.game_started {
            session.summary = Some(RunSummary::from_state(&state));
        }
        session.state = state;
        session
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Set once the run has ended
    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    pub fn is_over(&self) -> bool {
        self.summary.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.state.is_paused()
    }

    pub fn set_movement(&mut self, movement: MoveIntent) {
        self.movement = movement;
    }

    /// Queue one shot toward `target`
    pub fn fire(&mut self, target: Vec2) {
        self.queued_shots.push(target);
    }

    /// Press or move the trigger; shots repeat while rapid fire is active
    pub fn hold_trigger(&mut self, target: Vec2) {
        if self.trigger.is_none() {
            self.auto_fire_ms = 0.0;
        }
        self.trigger = Some(target);
    }

    pub fn release_trigger(&mut self) {
        self.trigger = None;
    }

    pub fn use_hotbar_slot(&mut self, slot: usize) {
        self.queued_hotbar_slot = Some(slot);
    }

    pub fn pause(&mut self) {
        if self.state.flags.is_running && !self.is_over() {
            self.state.flags.is_running = false;
            log::info!("Paused at frame {}", self.state.frame);
        }
    }

    /// Resume play; the time spent paused is never simulated
    pub fn resume(&mut self) {
        if self.is_paused() {
            self.state.flags.is_running = true;
            self.last_timestamp_ms = None;
            log::info!("Resumed at frame {}", self.state.frame);
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.is_paused() {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Start over with a new seed, keeping tuning and playfield
    pub fn restart(&mut self, seed: u64) {
        *self = Self::new(seed, self.bounds, self.tuning.clone());
    }

    /// Advance one frame at `timestamp_ms`; returns the frame's events
    pub fn frame(&mut self, timestamp_ms: f64) -> &[GameEvent] {
        if self.is_over() || self.is_paused() {
            self.last_timestamp_ms = None;
            return &[];
        }

        let elapsed = match self.last_timestamp_ms {
            Some(last) => (timestamp_ms - last).max(0.0) as f32,
            None => 0.0,
        };
        self.last_timestamp_ms = Some(timestamp_ms);

        let mut fire_at = std::mem::take(&mut self.queued_shots);
        if let Some(aim) = self.auto_fire(elapsed) {
            fire_at.push(aim);
        }
        let input = FrameInput {
            left: self.movement.left,
            right: self.movement.right,
            up: self.movement.up,
            down: self.movement.down,
            fire_at,
            use_hotbar_slot: self.queued_hotbar_slot.take(),
        };

        match advance_frame(&self.state, &input, elapsed) {
            FrameOutcome::Running(next) => self.state = next,
            FrameOutcome::GameOver(last) => {
                let summary = RunSummary::from_state(&last);
                log::info!(
                    "Run finished: score {}, rank {}, {} ms",
                    summary.score,
                    summary.rank,
                    summary.duration_ms
                );
                self.summary = Some(summary);
                self.state = last;
            }
        }
        &self.state.events
    }

    /// Rapid-fire cadence: at most one automatic shot per frame
    fn auto_fire(&mut self, elapsed_ms: f32) -> Option<Vec2> {
        let aim = self.trigger?;
        if !self.state.flags.rapid_fire_active {
            self.auto_fire_ms = 0.0;
            return None;
        }
        let interval = self.tuning.rapid_fire_interval_ms;
        self.auto_fire_ms += elapsed_ms;
        if self.auto_fire_ms < interval {
            return None;
        }
        self.auto_fire_ms = (self.auto_fire_ms - interval).min(interval);
        Some(aim)
    }
}
