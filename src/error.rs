//! Crate error type
//!
//! Gameplay never fails; only selector parsing, configuration and browser/GPU
//! setup produce errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArcadeError {
    #[error("unknown game id: {0:?}")]
    UnknownGame(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("DOM error: {0}")]
    Dom(String),

    #[error("GPU error: {0}")]
    Gpu(String),
}

pub type Result<T> = std::result::Result<T, ArcadeError>;
