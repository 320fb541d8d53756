//! User settings and on-disk locations.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How the gamepad pause button is read across polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PauseTrigger {
    /// Toggle on the press transition only.
    #[default]
    Edge,
    /// Toggle on every poll that reads the button as held.
    Level,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Frame rate of the combined update/render loop.
    pub fps: u32,
    /// World units covered by one terminal pixel (half a cell vertically).
    pub units_per_pixel: f64,
    pub sound: bool,
    pub pipe_interval_ms: u64,
    pub gamepad_poll_ms: u64,
    pub pause_trigger: PauseTrigger,
    /// Fixed seed for pipe heights. Random when unset.
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps: 60,
            units_per_pixel: 8.0,
            sound: true,
            pipe_interval_ms: 2000,
            gamepad_poll_ms: 100,
            pause_trigger: PauseTrigger::Edge,
            seed: None,
        }
    }
}

impl Settings {
    /// Clamp values that would stall or break the loop.
    pub fn sanitized(mut self) -> Self {
        self.fps = self.fps.clamp(10, 240);
        if !(self.units_per_pixel.is_finite() && self.units_per_pixel >= 1.0) {
            self.units_per_pixel = Settings::default().units_per_pixel;
        }
        self.pipe_interval_ms = self.pipe_interval_ms.max(100);
        self.gamepad_poll_ms = self.gamepad_poll_ms.max(10);
        self
    }
}

/// Load settings, falling back to defaults when the file is missing or
/// unreadable.
pub fn load_settings(path: &Path) -> Settings {
    let Ok(json) = fs::read_to_string(path) else {
        return Settings::default();
    };
    match serde_json::from_str::<Settings>(&json) {
        Ok(settings) => settings.sanitized(),
        Err(e) => {
            warn!("Ignoring malformed settings file {}: {}", path.display(), e);
            Settings::default()
        }
    }
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}

// ── Paths ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Paths {
    pub settings: PathBuf,
    pub high_score: PathBuf,
    pub log: PathBuf,
}

impl Paths {
    pub fn resolve() -> Result<Self> {
        let dirs = ProjectDirs::from("io.github", "flappy-arcade", "flappy-arcade").ok_or(Error::NoHomeDir)?;
        Ok(Self::in_dirs(dirs.config_dir(), dirs.data_local_dir()))
    }

    pub fn in_dirs(config_dir: &Path, data_dir: &Path) -> Self {
        Self {
            settings: config_dir.join("settings.json"),
            high_score: data_dir.join("highscore.json"),
            log: data_dir.join("flappy.log"),
        }
    }
}
