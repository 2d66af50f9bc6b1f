//! HUD model: everything the overlay shows, already formatted

use crate::consts::MAX_LIVES;
use crate::sim::progression::{rank_title, streak_title};
use crate::sim::{GameState, Notification, PowerUpKind};

/// Level-up banner fade timings (frames)
const LEVEL_UP_FADE_IN: u32 = 20;
const LEVEL_UP_FADE_OUT: u32 = 30;
/// Streak banner fade timings (frames)
const STREAK_FADE_IN: u32 = 15;
const STREAK_FADE_OUT: u32 = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct PowerUpBar {
    pub label: String,
    /// Remaining fraction in [0, 1]
    pub progress: f32,
    /// Whole seconds left, rounded up
    pub seconds_left: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StreakDisplay {
    pub time_text: String,
    pub tier: usize,
    pub title: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Banner {
    pub headline: String,
    pub subtitle: String,
    pub alpha: f32,
    pub scale: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub score_text: String,
    /// One entry per heart slot, `true` when filled
    pub hearts: Vec<bool>,
    pub rank: u32,
    pub rank_title: &'static str,
    pub power_up_bars: Vec<PowerUpBar>,
    pub hotbar: Vec<&'static str>,
    pub streak: Option<StreakDisplay>,
    pub level_up: Option<Banner>,
    pub streak_banner: Option<Banner>,
}

impl Hud {
    pub fn from_state(state: &GameState) -> Self {
        let player = &state.player;
        Self {
            score_text: format_score(player.score),
            hearts: (0..MAX_LIVES).map(|i| i < player.lives).collect(),
            rank: player.rank,
            rank_title: rank_title(player.rank),
            power_up_bars: state
                .active_power_ups
                .iter()
                .map(|a| PowerUpBar {
                    label: label(a.kind),
                    progress: a.progress(),
                    seconds_left: (a.time_remaining.max(0.0) / 1000.0).ceil() as u32,
                })
                .collect(),
            hotbar: state.hotbar.iter().map(PowerUpKind::as_str).collect(),
            streak: format_streak_time(player.streak.time_ms).map(|time_text| StreakDisplay {
                time_text,
                tier: player.streak.tier,
                title: streak_title(player.streak.tier),
            }),
            level_up: state.level_up.map(level_up_banner),
            streak_banner: state.streak_notice.and_then(streak_banner),
        }
    }
}

fn label(kind: PowerUpKind) -> String {
    kind.as_str().to_uppercase()
}

/// Score with thousands separators
pub fn format_score(score: u64) -> String {
    let digits = score.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `"Ns"` under a minute, `"M:SS"` after; nothing below one second
pub fn format_streak_time(time_ms: f32) -> Option<String> {
    let seconds = (time_ms.max(0.0) / 1000.0).floor() as u64;
    if seconds < 1 {
        return None;
    }
    let (minutes, seconds) = (seconds / 60, seconds % 60);
    Some(if minutes > 0 {
        format!("{}:{:02}", minutes, seconds)
    } else {
        format!("{}s", seconds)
    })
}

/// Fade in over the first `fade_in` frames, out over the last `fade_out`
pub fn banner_alpha(notice: &Notification, fade_in: u32, fade_out: u32) -> f32 {
    let left = notice.frames_remaining;
    let shown = notice.total_frames.saturating_sub(left);
    if shown < fade_in {
        shown as f32 / fade_in as f32
    } else if left < fade_out {
        left as f32 / fade_out as f32
    } else {
        1.0
    }
}

fn level_up_banner(notice: Notification) -> Banner {
    let shown = notice.total_frames.saturating_sub(notice.frames_remaining);
    let scale = if shown < LEVEL_UP_FADE_IN {
        1.0 + shown as f32 / 40.0
    } else {
        1.0
    };
    Banner {
        headline: "LEVEL UP!".to_string(),
        subtitle: format!("RANK {}: {}", notice.value, rank_title(notice.value)),
        alpha: banner_alpha(&notice, LEVEL_UP_FADE_IN, LEVEL_UP_FADE_OUT),
        scale,
    }
}

fn streak_banner(notice: Notification) -> Option<Banner> {
    let title = streak_title(notice.value as usize)?;
    Some(Banner {
        headline: title.to_string(),
        subtitle: "NO-HIT STREAK".to_string(),
        alpha: banner_alpha(&notice, STREAK_FADE_IN, STREAK_FADE_OUT),
        scale: 1.0,
    })
}
