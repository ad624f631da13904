//! Error types for Skyline.

use thiserror::Error;

/// Top-level error type for Skyline operations.
#[derive(Debug, Error)]
pub enum SkylineError {
    /// Simulation configuration rejected
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
