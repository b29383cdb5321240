//! Error types for Duskfall.
//!
//! The simulation itself never fails: rejected transitions and ignored hits
//! are ordinary return values. These types cover the edges where data enters
//! or leaves the core (configuration, snapshots, files).

use thiserror::Error;

/// Top-level error type for Duskfall operations.
#[derive(Debug, Error)]
pub enum DuskfallError {
    /// Configuration could not be parsed or failed validation
    #[error("Config error: {0}")]
    Config(String),

    /// A snapshot could not be restored
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Duskfall operations.
pub type DuskfallResult<T> = Result<T, DuskfallError>;
