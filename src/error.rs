use std::io;

use thiserror::Error;

/// Errors raised by the persistence and configuration layers.
///
/// Gameplay itself never fails; callers log these and carry on.
#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not determine a home directory for game data")]
    NoHomeDir,
}

pub type Result<T> = std::result::Result<T, Error>;
