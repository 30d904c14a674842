//! Error types for TGAM Score

use crate::types::Channel;
use thiserror::Error;

/// Errors that can occur while loading or scoring a session
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Invalid session: {0}")]
    InvalidSession(#[from] InvalidSession),

    #[error("Invalid threshold: {0} is not a finite number")]
    InvalidThreshold(f64),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Failed to parse session data: {0}")]
    ParseError(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// The session invariant that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidSession {
    #[error("attention has {attention} samples but meditation has {meditation}")]
    LengthMismatch { attention: usize, meditation: usize },

    #[error("session has no samples")]
    Empty,

    #[error("{channel} score at index {index} is not a finite number")]
    NonFiniteScore { channel: Channel, index: usize },

    #[error("{channel} scores sum beyond the range of a 64-bit float")]
    SumOverflow { channel: Channel },
}
