//! Error types for the trackfuse environment abstraction.

use thiserror::Error;

/// Errors that can occur in the collaborator layer.
#[derive(Debug, Error)]
pub enum EnvError {
    /// A required input (track file, cluster file, geometry) could not be
    /// located. Fatal for the run that needed it.
    #[error("Missing resource: {0}")]
    MissingResource(String),

    /// Extrapolation failed (non-finite state, unreachable target plane).
    #[error("Propagation failed: {0}")]
    Propagation(String),

    /// Underlying I/O failure while reading a resource.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record encoding/decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EnvError {
    /// Creates a missing-resource error.
    pub fn missing(resource: impl Into<String>) -> Self {
        Self::MissingResource(resource.into())
    }

    /// Creates a propagation error.
    pub fn propagation(msg: impl Into<String>) -> Self {
        Self::Propagation(msg.into())
    }
}
