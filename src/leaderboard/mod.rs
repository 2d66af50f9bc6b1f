//! Score leaderboard
//!
//! An in-memory store with the rules of the public leaderboard service:
//! submissions are rate limited per visitor and checked for plausibility,
//! each visitor is ranked by their best score, and players get a generated
//! handle on first contact which they may rename later.
//!
//! Timestamps are passed in by the caller so the store stays deterministic.

pub mod names;

use std::collections::HashMap;
use std::fmt;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

pub use names::{NameError, generate_name, validate_name};

/// Largest page `top_scores` returns
pub const MAX_LEADERBOARD_LIMIT: usize = 100;
pub const MAX_SCORE: i64 = 1_000_000;
/// Plausibility cap, applied once a run is longer than a second
pub const MAX_POINTS_PER_SECOND: f64 = 150.0;
/// Minimum gap between two submissions from one visitor
pub const RATE_LIMIT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub enum LeaderboardError {
    MissingVisitor,
    RateLimited { wait_secs: u64 },
    InvalidScore,
    InvalidDuration,
    /// Too many points for the time played
    ImplausibleScore,
    PlayerNotFound,
    InvalidName(NameError),
    NameTaken,
}

impl fmt::Display for LeaderboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaderboardError::MissingVisitor => write!(f, "visitorId is required"),
            LeaderboardError::RateLimited { wait_secs } => write!(
                f,
                "Please wait {} seconds before submitting another score",
                wait_secs
            ),
            LeaderboardError::InvalidScore => write!(f, "Invalid score value"),
            LeaderboardError::InvalidDuration => write!(f, "Invalid duration value"),
            LeaderboardError::ImplausibleScore => write!(f, "Score appears invalid"),
            LeaderboardError::PlayerNotFound => write!(f, "Player not found"),
            LeaderboardError::InvalidName(e) => write!(f, "{}", e),
            LeaderboardError::NameTaken => write!(f, "Name is already taken"),
        }
    }
}

impl std::error::Error for LeaderboardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LeaderboardError::InvalidName(e) => Some(e),
            _ => None,
        }
    }
}

impl From<NameError> for LeaderboardError {
    fn from(e: NameError) -> Self {
        LeaderboardError::InvalidName(e)
    }
}

pub type LeaderboardResult<T> = Result<T, LeaderboardError>;

/// A finished run as sent by a client
///
/// Numbers are signed so out-of-range client values can be rejected
/// explicitly instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub visitor_id: String,
    pub score: i64,
    pub rank_achieved: u32,
    pub duration_ms: i64,
}

impl ScoreSubmission {
    /// Bounds and points-per-second checks
    pub fn validate(&self) -> LeaderboardResult<()> {
        if !(0..=MAX_SCORE).contains(&self.score) {
            return Err(LeaderboardError::InvalidScore);
        }
        if self.duration_ms < 0 {
            return Err(LeaderboardError::InvalidDuration);
        }
        if self.duration_ms > 1000 {
            let points_per_second = self.score as f64 / (self.duration_ms as f64 / 1000.0);
            if points_per_second > MAX_POINTS_PER_SECOND {
                return Err(LeaderboardError::ImplausibleScore);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub score_id: u64,
    pub player_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub visitor_id: String,
    pub name: String,
    pub created_at_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: u64,
    pub visitor_id: String,
    pub score: u64,
    pub rank_achieved: u32,
    pub duration_ms: u64,
    pub created_at_ms: u64,
}

/// One row of the public table: a visitor's best
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based position in the table
    pub rank: usize,
    pub name: String,
    pub score: u64,
    pub rank_achieved: u32,
    pub games_played: u32,
    pub last_played_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub best_score: u64,
    pub best_rank: u32,
    pub games_played: u32,
    /// 1 + number of visitors with a strictly higher best score
    pub global_rank: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub name: String,
    pub visitor_id: String,
    pub created_at_ms: u64,
    pub stats: Option<PlayerStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub visitor_id: String,
    pub is_new: bool,
}

/// Per-visitor aggregate used for ranking
struct Best {
    score: u64,
    rank: u32,
    games: u32,
    last_played_ms: u64,
}

fn default_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leaderboard {
    players: Vec<PlayerRecord>,
    scores: Vec<ScoreRecord>,
    next_score_id: u64,
    /// Last accepted submission per visitor; not persisted
    #[serde(skip)]
    last_submission_ms: HashMap<String, u64>,
    #[serde(skip, default = "default_rng")]
    rng: Pcg32,
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Leaderboard {
    /// Empty store; `seed` drives generated names
    pub fn new(seed: u64) -> Self {
        Self {
            players: Vec::new(),
            scores: Vec::new(),
            next_score_id: 1,
            last_submission_ms: HashMap::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn players(&self) -> &[PlayerRecord] {
        &self.players
    }

    pub fn scores(&self) -> &[ScoreRecord] {
        &self.scores
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    fn player_index(&self, visitor_id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.visitor_id == visitor_id)
    }

    pub fn player(&self, visitor_id: &str) -> Option<&PlayerRecord> {
        self.player_index(visitor_id).map(|i| &self.players[i])
    }

    /// Case-insensitive
    pub fn is_name_taken(&self, name: &str) -> bool {
        self.players
            .iter()
            .any(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// A fresh handle nobody uses yet
    pub fn generate_name(&mut self, now_ms: u64) -> String {
        let players = &self.players;
        names::generate_unique_name(
            &mut self.rng,
            |name| players.iter().any(|p| p.name.eq_ignore_ascii_case(name)),
            now_ms,
        )
    }

    /// Known visitors keep their name; new ones get a generated handle
    pub fn register(&mut self, visitor_id: &str, now_ms: u64) -> LeaderboardResult<Registration> {
        if visitor_id.is_empty() {
            return Err(LeaderboardError::MissingVisitor);
        }
        if let Some(player) = self.player(visitor_id) {
            return Ok(Registration {
                name: player.name.clone(),
                visitor_id: player.visitor_id.clone(),
                is_new: false,
            });
        }
        let player = self.create_player(visitor_id, now_ms);
        Ok(Registration {
            name: player.name.clone(),
            visitor_id: player.visitor_id.clone(),
            is_new: true,
        })
    }

    fn create_player(&mut self, visitor_id: &str, now_ms: u64) -> &PlayerRecord {
        let name = self.generate_name(now_ms);
        log::info!("Registered player {} for visitor {}", name, visitor_id);
        self.players.push(PlayerRecord {
            visitor_id: visitor_id.to_string(),
            name,
            created_at_ms: now_ms,
        });
        &self.players[self.players.len() - 1]
    }

    /// Record a finished run
    ///
    /// The rate-limit window starts as soon as a request passes the limiter,
    /// even if the score is then rejected.
    pub fn submit(
        &mut self,
        submission: &ScoreSubmission,
        now_ms: u64,
    ) -> LeaderboardResult<SubmitReceipt> {
        let visitor_id = submission.visitor_id.as_str();
        if visitor_id.is_empty() {
            return Err(LeaderboardError::MissingVisitor);
        }

        if let Some(&last) = self.last_submission_ms.get(visitor_id) {
            let since = now_ms.saturating_sub(last);
            if since < RATE_LIMIT_MS {
                let wait_secs = (RATE_LIMIT_MS - since).div_ceil(1000);
                log::warn!("Rate limited submission from {}", visitor_id);
                return Err(LeaderboardError::RateLimited { wait_secs });
            }
        }
        self.last_submission_ms.insert(visitor_id.to_string(), now_ms);

        if let Err(e) = submission.validate() {
            log::warn!("Rejected score from {}: {}", visitor_id, e);
            return Err(e);
        }

        let player_name = match self.player(visitor_id) {
            Some(player) => player.name.clone(),
            None => self.create_player(visitor_id, now_ms).name.clone(),
        };

        let score_id = self.next_score_id;
        self.next_score_id += 1;
        self.scores.push(ScoreRecord {
            id: score_id,
            visitor_id: visitor_id.to_string(),
            score: submission.score as u64,
            rank_achieved: submission.rank_achieved.max(1),
            duration_ms: submission.duration_ms as u64,
            created_at_ms: now_ms,
        });
        log::info!(
            "Score {} recorded for {} (id {})",
            submission.score,
            player_name,
            score_id
        );

        Ok(SubmitReceipt {
            score_id,
            player_name,
        })
    }

    /// Best run per visitor, in player registration order
    fn bests(&self) -> Vec<(&PlayerRecord, Best)> {
        let mut bests: HashMap<&str, Best> = HashMap::new();
        for s in &self.scores {
            let best = bests.entry(s.visitor_id.as_str()).or_insert(Best {
                score: 0,
                rank: 0,
                games: 0,
                last_played_ms: 0,
            });
            best.score = best.score.max(s.score);
            best.rank = best.rank.max(s.rank_achieved);
            best.games += 1;
            best.last_played_ms = best.last_played_ms.max(s.created_at_ms);
        }
        self.players
            .iter()
            .filter_map(|p| bests.remove(p.visitor_id.as_str()).map(|b| (p, b)))
            .collect()
    }

    /// The top `limit` visitors by best score; 0 means the maximum page
    pub fn top_scores(&self, limit: usize) -> Vec<LeaderboardEntry> {
        let limit = if limit == 0 {
            MAX_LEADERBOARD_LIMIT
        } else {
            limit.min(MAX_LEADERBOARD_LIMIT)
        };

        let mut bests = self.bests();
        bests.sort_by(|a, b| b.1.score.cmp(&a.1.score));
        bests
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(i, (player, best))| LeaderboardEntry {
                rank: i + 1,
                name: player.name.clone(),
                score: best.score,
                rank_achieved: best.rank,
                games_played: best.games,
                last_played_ms: best.last_played_ms,
            })
            .collect()
    }

    /// `None` until the visitor has at least one score
    pub fn player_stats(&self, visitor_id: &str) -> Option<PlayerStats> {
        let bests = self.bests();
        let (_, mine) = bests.iter().find(|(p, _)| p.visitor_id == visitor_id)?;
        let higher = bests.iter().filter(|(_, b)| b.score > mine.score).count();
        Some(PlayerStats {
            best_score: mine.score,
            best_rank: mine.rank,
            games_played: mine.games,
            global_rank: higher + 1,
        })
    }

    pub fn profile(&self, visitor_id: &str) -> LeaderboardResult<PlayerProfile> {
        let player = self
            .player(visitor_id)
            .ok_or(LeaderboardError::PlayerNotFound)?;
        Ok(PlayerProfile {
            name: player.name.clone(),
            visitor_id: player.visitor_id.clone(),
            created_at_ms: player.created_at_ms,
            stats: self.player_stats(visitor_id),
        })
    }

    /// Change a player's name; returns the name now in effect
    pub fn rename(&mut self, visitor_id: &str, name: &str) -> LeaderboardResult<String> {
        let name = validate_name(name)?;
        let index = self
            .player_index(visitor_id)
            .ok_or(LeaderboardError::PlayerNotFound)?;

        if self.players[index].name.eq_ignore_ascii_case(name) {
            return Ok(self.players[index].name.clone());
        }
        if self.is_name_taken(name) {
            return Err(LeaderboardError::NameTaken);
        }

        log::info!("{} renamed to {}", self.players[index].name, name);
        self.players[index].name = name.to_string();
        Ok(name.to_string())
    }

    /// Whether `name` is valid and free
    pub fn check_name(&self, name: &str) -> LeaderboardResult<bool> {
        let name = validate_name(name)?;
        Ok(!self.is_name_taken(name))
    }

    /// Table position a score would take right now, if it makes the page
    pub fn potential_position(&self, score: u64) -> Option<usize> {
        if score == 0 {
            return None;
        }
        let table = self.top_scores(MAX_LEADERBOARD_LIMIT);
        let position = table.iter().position(|e| score > e.score);
        match position {
            Some(i) => Some(i + 1),
            None if table.len() < MAX_LEADERBOARD_LIMIT => Some(table.len() + 1),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(visitor: &str, score: i64, duration_ms: i64) -> ScoreSubmission {
        ScoreSubmission {
            visitor_id: visitor.to_string(),
            score,
            rank_achieved: 1,
            duration_ms,
        }
    }

    #[test]
    fn test_validation_rules() {
        assert!(submission("a", 0, 0).validate().is_ok());
        assert!(submission("a", 1_000_000, 10_000_000).validate().is_ok());
        assert_eq!(
            submission("a", -1, 0).validate(),
            Err(LeaderboardError::InvalidScore)
        );
        assert_eq!(
            submission("a", 1_000_001, 10_000_000).validate(),
            Err(LeaderboardError::InvalidScore)
        );
        assert_eq!(
            submission("a", 10, -5).validate(),
            Err(LeaderboardError::InvalidDuration)
        );
        // 150 points per second is the ceiling
        assert!(submission("a", 300, 2_000).validate().is_ok());
        assert_eq!(
            submission("a", 301, 2_000).validate(),
            Err(LeaderboardError::ImplausibleScore)
        );
        // Short runs are not rate-checked
        assert!(submission("a", 5_000, 1_000).validate().is_ok());
    }

    #[test]
    fn test_submit_creates_player_and_rate_limits() {
        let mut board = Leaderboard::new(1);
        let receipt = board.submit(&submission("v1", 100, 60_000), 0).unwrap();
        assert_eq!(receipt.score_id, 1);
        assert_eq!(board.player("v1").unwrap().name, receipt.player_name);

        let err = board.submit(&submission("v1", 120, 60_000), 3_500).unwrap_err();
        assert_eq!(err, LeaderboardError::RateLimited { wait_secs: 7 });

        let receipt2 = board.submit(&submission("v1", 120, 60_000), 10_000).unwrap();
        assert_eq!(receipt2.score_id, 2);
        assert_eq!(receipt2.player_name, receipt.player_name);
    }

    #[test]
    fn test_rejected_submission_still_starts_window() {
        let mut board = Leaderboard::new(1);
        let err = board.submit(&submission("v1", -3, 0), 0).unwrap_err();
        assert_eq!(err, LeaderboardError::InvalidScore);
        assert!(board.players().is_empty());
        assert!(matches!(
            board.submit(&submission("v1", 10, 0), 1_000),
            Err(LeaderboardError::RateLimited { .. })
        ));
    }

    #[test]
    fn test_missing_visitor() {
        let mut board = Leaderboard::new(1);
        assert_eq!(
            board.submit(&submission("", 10, 0), 0),
            Err(LeaderboardError::MissingVisitor)
        );
        assert_eq!(board.register("", 0), Err(LeaderboardError::MissingVisitor));
    }

    #[test]
    fn test_top_scores_best_per_visitor() {
        let mut board = Leaderboard::new(2);
        board.submit(&submission("a", 300, 60_000), 0).unwrap();
        board.submit(&submission("b", 500, 60_000), 0).unwrap();
        board.submit(&submission("a", 900, 60_000), 20_000).unwrap();
        board.submit(&submission("c", 100, 60_000), 0).unwrap();

        let top = board.top_scores(0);
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].score, 900);
        assert_eq!(top[0].games_played, 2);
        assert_eq!(top[0].last_played_ms, 20_000);
        assert_eq!(top[1].score, 500);
        assert_eq!(top[2].rank, 3);

        assert_eq!(board.top_scores(2).len(), 2);
        assert_eq!(board.top_scores(500).len(), 3);
    }

    #[test]
    fn test_player_stats_global_rank() {
        let mut board = Leaderboard::new(3);
        board.submit(&submission("a", 300, 60_000), 0).unwrap();
        board.submit(&submission("b", 500, 60_000), 0).unwrap();
        board.submit(&submission("c", 500, 60_000), 0).unwrap();

        assert_eq!(board.player_stats("b").unwrap().global_rank, 1);
        assert_eq!(board.player_stats("c").unwrap().global_rank, 1);
        let stats = board.player_stats("a").unwrap();
        assert_eq!(stats.global_rank, 3);
        assert_eq!(stats.games_played, 1);

        board.register("d", 0).unwrap();
        assert!(board.player_stats("d").is_none());
        assert!(board.profile("d").unwrap().stats.is_none());
        assert_eq!(board.profile("zz"), Err(LeaderboardError::PlayerNotFound));
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut board = Leaderboard::new(4);
        let first = board.register("v", 0).unwrap();
        assert!(first.is_new);
        let again = board.register("v", 5).unwrap();
        assert!(!again.is_new);
        assert_eq!(again.name, first.name);
    }

    #[test]
    fn test_rename_rules() {
        let mut board = Leaderboard::new(5);
        board.register("a", 0).unwrap();
        board.register("b", 0).unwrap();
        board.rename("a", "Zed").unwrap();

        assert_eq!(board.rename("b", "zED"), Err(LeaderboardError::NameTaken));
        assert_eq!(board.rename("a", " zed "), Ok("Zed".to_string()));
        assert_eq!(
            board.rename("b", "no"),
            Err(LeaderboardError::InvalidName(NameError::TooShort))
        );
        assert_eq!(
            board.rename("nobody", "Valid1"),
            Err(LeaderboardError::PlayerNotFound)
        );
        assert_eq!(board.check_name("ZED"), Ok(false));
        assert_eq!(board.check_name("Fresh"), Ok(true));
        assert!(board.check_name("system").is_err());
    }

    #[test]
    fn test_potential_position() {
        let mut board = Leaderboard::new(6);
        assert_eq!(board.potential_position(0), None);
        assert_eq!(board.potential_position(10), Some(1));
        board.submit(&submission("a", 300, 60_000), 0).unwrap();
        assert_eq!(board.potential_position(200), Some(2));
        assert_eq!(board.potential_position(400), Some(1));
    }
}
