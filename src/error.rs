//! Error taxonomy for the resolution pipeline.
//!
//! Extractor-internal failures never cross the extractor boundary; they
//! are logged and collapsed to "no candidate". The resolver surfaces a
//! single aggregated failure shape (`AllSourcesFailed`). `Config` errors
//! are fatal at startup only.

use thiserror::Error;

/// Resolution pipeline errors
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("validation failed for {0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("all sources failed (attempted: {attempted:?}): {last_error}")]
    AllSourcesFailed {
        attempted: Vec<String>,
        last_error: String,
    },
}

impl From<reqwest::Error> for ResolveError {
    fn from(err: reqwest::Error) -> Self {
        ResolveError::Network(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;
