//! Error types for the scanning core

use thiserror::Error;

use crate::card::CardNetwork;
use crate::session::SessionState;

/// Result type for scanner operations
pub type Result<T> = std::result::Result<T, ScanError>;

/// Errors surfaced by the scanning core
///
/// OCR noise is never an error: unreadable observations are simply discarded.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Operation not allowed in the session's current state
    #[error("Cannot {operation} while session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    /// A network rule pattern failed to compile
    #[error("Invalid pattern for {network} rule: {source}")]
    InvalidPattern {
        network: CardNetwork,
        #[source]
        source: regex::Error,
    },

    /// Configuration values out of range
    #[error("Configuration error: {0}")]
    Config(String),

    /// The scan worker thread is gone
    #[error("Scan worker disconnected")]
    WorkerDisconnected,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
