//! Durable storage for the single high-score value.

use std::cell::Cell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub trait HighScoreStore {
    /// The stored high score, or 0 when nothing valid is stored.
    fn load(&self) -> u32;

    fn save(&self, score: u32) -> Result<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Record {
    #[serde(rename = "highScore")]
    high_score: u32,
}

impl<S: HighScoreStore + ?Sized> HighScoreStore for Rc<S> {
    fn load(&self) -> u32 {
        (**self).load()
    }

    fn save(&self, score: u32) -> Result<()> {
        (**self).save(score)
    }
}

/// Keeps `{"highScore": n}` in a JSON file.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HighScoreStore for JsonFileStore {
    fn load(&self) -> u32 {
        let Ok(json) = fs::read_to_string(&self.path) else {
            return 0;
        };
        match serde_json::from_str::<Record>(&json) {
            Ok(record) => record.high_score,
            Err(e) => {
                warn!("Unreadable high score in {}: {}", self.path.display(), e);
                0
            }
        }
    }

    fn save(&self, score: u32) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(&Record { high_score: score })?;
        // Write then rename so a crash never leaves half a file behind.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Process-lifetime store, for tests and for running without a data dir.
#[derive(Debug, Default)]
pub struct MemoryStore {
    value: Cell<u32>,
    writes: Cell<u32>,
}

impl MemoryStore {
    pub fn with_score(score: u32) -> Self {
        Self {
            value: Cell::new(score),
            writes: Cell::new(0),
        }
    }

    pub fn writes(&self) -> u32 {
        self.writes.get()
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> u32 {
        self.value.get()
    }

    fn save(&self, score: u32) -> Result<()> {
        self.value.set(score);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
