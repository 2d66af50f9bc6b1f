//! Circle Shoot entry point
//!
//! Runs a headless match with a simple autopilot at a fixed 60 Hz clock,
//! builds the draw list and HUD every frame, then submits the run to a local
//! leaderboard.
//!
//! Usage: `circle-shoot [seed] [max_frames] [tuning.json] [save.json]`

use std::path::PathBuf;
use std::process::ExitCode;

use glam::Vec2;

use circle_shoot::leaderboard::Leaderboard;
use circle_shoot::persistence;
use circle_shoot::renderer::vertex::as_bytes;
use circle_shoot::renderer::{Hud, Scene, Vertex};
use circle_shoot::sim::{Bounds, GameEvent, GameState, MoveIntent};
use circle_shoot::{GameSession, Settings, Tuning};

const FRAME_MS: f64 = 1000.0 / 60.0;
/// Autopilot fires once every this many frames
const FIRE_EVERY: u64 = 8;
/// Autopilot steps away from enemies closer than this
const DANGER_RADIUS: f32 = 120.0;

struct Args {
    seed: u64,
    max_frames: u64,
    tuning: Option<PathBuf>,
    save: Option<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = std::env::args().skip(1);
    let seed = match args.next() {
        Some(s) => s.parse().map_err(|_| format!("invalid seed '{}'", s))?,
        None => 1,
    };
    let max_frames = match args.next() {
        Some(s) => s.parse().map_err(|_| format!("invalid frame count '{}'", s))?,
        None => 60 * 60 * 5,
    };
    Ok(Args {
        seed,
        max_frames,
        tuning: args.next().map(PathBuf::from),
        save: args.next().map(PathBuf::from),
    })
}

fn load_tuning(path: Option<&PathBuf>) -> Result<Tuning, String> {
    let Some(path) = path else {
        return Ok(Tuning::default());
    };
    let json = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    Tuning::from_json(&json).map_err(|e| format!("{}: {}", path.display(), e))
}

/// Aim at the nearest enemy and back away from anything too close
fn autopilot(state: &GameState) -> (MoveIntent, Option<Vec2>) {
    let player = state.player.pos;
    let nearest = state
        .enemies
        .iter()
        .min_by(|a, b| {
            a.pos
                .distance_squared(player)
                .total_cmp(&b.pos.distance_squared(player))
        });

    let Some(enemy) = nearest else {
        return (MoveIntent::default(), None);
    };

    let mut intent = MoveIntent::default();
    let away = player - enemy.pos;
    if away.length() - enemy.radius < DANGER_RADIUS {
        intent.left = away.x < 0.0;
        intent.right = away.x > 0.0;
        intent.up = away.y < 0.0;
        intent.down = away.y > 0.0;
    }
    (intent, Some(enemy.pos))
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Circle Shoot (headless) starting...");

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("usage: circle-shoot [seed] [max_frames] [tuning.json] [save.json]");
            return ExitCode::FAILURE;
        }
    };
    let base = match load_tuning(args.tuning.as_ref()) {
        Ok(tuning) => tuning,
        Err(e) => {
            eprintln!("tuning: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let settings = Settings::default();
    let tuning = settings.apply_to(&base);
    let mut session = GameSession::new(args.seed, Bounds::new(800.0, 600.0), tuning);

    let mut kills = 0u32;
    let mut upload_bytes = 0usize;
    log::debug!(
        "Vertex layout: stride {} bytes, color at offset {}",
        Vertex::STRIDE,
        Vertex::COLOR_OFFSET
    );
    for frame in 0..args.max_frames {
        let (intent, target) = autopilot(session.state());
        session.set_movement(intent);
        if let Some(target) = target.filter(|_| frame % FIRE_EVERY == 0) {
            session.fire(target);
        }

        let events = session.frame(frame as f64 * FRAME_MS);
        for event in events {
            match event {
                GameEvent::EnemyKilled { .. } | GameEvent::ShockwaveKill { .. } => kills += 1,
                GameEvent::RankUp { rank } => println!("frame {}: rank {}", frame, rank),
                GameEvent::PowerUpActivated(kind) => {
                    println!("frame {}: {} activated", frame, kind.as_str())
                }
                _ => {}
            }
        }

        let scene = Scene::from_state(session.state(), settings.reduced_motion);
        let vertices = scene.vertices(settings.quality.circle_edge());
        upload_bytes = as_bytes(&vertices).len();

        if session.is_over() {
            break;
        }
    }

    let hud = Hud::from_state(session.state());
    println!(
        "score {} | rank {} ({}) | kills {} | last frame {} vertex bytes",
        hud.score_text, hud.rank, hud.rank_title, kills, upload_bytes
    );

    let Some(summary) = session.summary().cloned() else {
        println!("Still alive after {} frames", args.max_frames);
        return save_snapshot(session.state(), args.save.as_ref());
    };

    let mut leaderboard = Leaderboard::new(args.seed);
    let now_ms = summary.duration_ms;
    match leaderboard.submit(&summary.submission("local"), now_ms) {
        Ok(receipt) => {
            println!("Recorded as {} (score #{})", receipt.player_name, receipt.score_id);
            if let Some(stats) = leaderboard.player_stats("local") {
                println!(
                    "best {} | global rank {} | games {}",
                    stats.best_score, stats.global_rank, stats.games_played
                );
            }
        }
        Err(e) => println!("Score not recorded: {}", e),
    }

    save_snapshot(session.state(), args.save.as_ref())
}

fn save_snapshot(state: &GameState, path: Option<&PathBuf>) -> ExitCode {
    let Some(path) = path else {
        return ExitCode::SUCCESS;
    };
    match persistence::save_to_path(state, path, state.time_ms as u64) {
        Ok(()) => {
            println!("Snapshot saved to {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("save failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
