//! Error types for qtionary operations.
//!
//! The page transform itself never fails; these cover the edges around it:
//! loading settings, decoding dictionary API responses, compiling selectors.

use thiserror::Error;

/// Errors surfaced to callers of the library.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Message reported by the dictionary service (its `error.info`).
    #[error("{0}")]
    Api(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
}

pub type Result<T> = std::result::Result<T, Error>;
