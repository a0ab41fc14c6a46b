//! Errors for the loading surface (level and settings files).
//!
//! The simulation itself never fails; see `sim` for the no-op conventions.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid level data: {0}")]
    InvalidLevel(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

pub type Result<T> = std::result::Result<T, Error>;
