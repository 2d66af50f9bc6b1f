//! Save/load persistence
//!
//! Game snapshots and the leaderboard store are written as a versioned JSON
//! envelope. Loading checks the envelope version and payload kind before the
//! payload itself is decoded, so a leaderboard file can never be read back as
//! a game save.

use std::fmt;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::leaderboard::Leaderboard;
use crate::sim::GameState;

/// Current save format version
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug)]
pub enum PersistError {
    Json(serde_json::Error),
    Io(std::io::Error),
    UnsupportedVersion { found: u32, expected: u32 },
    KindMismatch { expected: &'static str, found: String },
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistError::Json(e) => write!(f, "malformed save: {}", e),
            PersistError::Io(e) => write!(f, "save file error: {}", e),
            PersistError::UnsupportedVersion { found, expected } => write!(
                f,
                "save version {} is not supported (expected {})",
                found, expected
            ),
            PersistError::KindMismatch { expected, found } => {
                write!(f, "expected a {} save, found {}", expected, found)
            }
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistError::Json(e) => Some(e),
            PersistError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(e: serde_json::Error) -> Self {
        PersistError::Json(e)
    }
}

impl From<std::io::Error> for PersistError {
    fn from(e: std::io::Error) -> Self {
        PersistError::Io(e)
    }
}

pub type PersistResult<T> = Result<T, PersistError>;

/// Anything that can be saved in an envelope
pub trait Persist: Serialize + DeserializeOwned {
    /// Tag written into the envelope
    const KIND: &'static str;
}

impl Persist for GameState {
    const KIND: &'static str = "game_state";
}

impl Persist for Leaderboard {
    const KIND: &'static str = "leaderboard";
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    version: u32,
    kind: String,
    saved_at_ms: u64,
    payload: T,
}

/// Header fields, read before the payload is decoded
#[derive(Deserialize)]
struct Header {
    version: u32,
    kind: String,
}

pub fn to_json<T: Persist>(value: &T, saved_at_ms: u64) -> PersistResult<String> {
    let envelope = Envelope {
        version: SAVE_VERSION,
        kind: T::KIND.to_string(),
        saved_at_ms,
        payload: value,
    };
    Ok(serde_json::to_string(&envelope)?)
}

pub fn from_json<T: Persist>(json: &str) -> PersistResult<T> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let header: Header = serde_json::from_value(value.clone())?;
    if header.version != SAVE_VERSION {
        return Err(PersistError::UnsupportedVersion {
            found: header.version,
            expected: SAVE_VERSION,
        });
    }
    if header.kind != T::KIND {
        return Err(PersistError::KindMismatch {
            expected: T::KIND,
            found: header.kind,
        });
    }
    let envelope: Envelope<T> = serde_json::from_value(value)?;
    Ok(envelope.payload)
}

/// Write through a temporary file so a crash never leaves half a save
pub fn save_to_path<T: Persist>(value: &T, path: &Path, saved_at_ms: u64) -> PersistResult<()> {
    let json = to_json(value, saved_at_ms)?;
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;
    log::info!("Saved {} to {}", T::KIND, path.display());
    Ok(())
}

pub fn load_from_path<T: Persist>(path: &Path) -> PersistResult<T> {
    let json = std::fs::read_to_string(path)?;
    match from_json(&json) {
        Ok(value) => {
            log::info!("Loaded {} from {}", T::KIND, path.display());
            Ok(value)
        }
        Err(e) => {
            log::warn!("Failed to load {} from {}: {}", T::KIND, path.display(), e);
            Err(e)
        }
    }
}
