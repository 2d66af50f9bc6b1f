//! Game settings and preferences
//!
//! Persisted separately from game saves as a small JSON file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::sim::ActivationPolicy;
use crate::tuning::{ConfigError, ConfigResult, Tuning};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 100,
            QualityPreset::Medium => 500,
            QualityPreset::High => 2000,
        }
    }

    /// Pixel length of a circle edge when triangulating
    pub fn circle_edge(&self) -> f32 {
        match self {
            QualityPreset::Low => 8.0,
            QualityPreset::Medium => 4.0,
            QualityPreset::High => 2.0,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Particle effects (explosions, damage bursts)
    pub particles: bool,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,

    // === Accessibility ===
    /// Reduced motion (no pulses or screen flashes)
    pub reduced_motion: bool,

    // === Gameplay ===
    /// Overrides the tuning's power-up activation policy when set
    pub activation: Option<ActivationPolicy>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            particles: true,
            show_fps: false,
            reduced_motion: false,
            activation: None,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Fold player preferences into the balance values of a new run
    pub fn apply_to(&self, tuning: &Tuning) -> Tuning {
        let mut tuning = tuning.clone();
        tuning.max_particles = tuning.max_particles.min(self.max_particles());
        if let Some(policy) = self.activation {
            tuning.activation = policy;
        }
        tuning
    }

    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        if let Some(ActivationPolicy::Hotbar { slots: 0 }) = settings.activation {
            return Err(ConfigError::Invalid {
                field: "activation",
                reason: "hotbar needs at least one slot",
            });
        }
        Ok(settings)
    }

    /// Load settings from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> ConfigResult<Self> {
        match std::fs::read_to_string(path) {
            Ok(json) => {
                let settings = Self::from_json(&json)?;
                log::info!("Loaded settings from {}", path.display());
                Ok(settings)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("Using default settings");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
