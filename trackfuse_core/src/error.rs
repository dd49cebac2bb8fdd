//! Error types for the matching engine.

use thiserror::Error;
use trackfuse_env::EnvError;

/// Errors that can occur during a matching run.
///
/// Per-pair numerical failures (a singular residual covariance) are recovered
/// inside the assignment loop and never abort a run; they only surface as an
/// error from the single-pair API. Collaborator failures are fatal for the
/// run that hit them.
#[derive(Debug, Error)]
pub enum MatchingError {
    /// The 2×2 residual covariance of a candidate pair is not invertible;
    /// the pair cannot be scored.
    #[error("Residual covariance is singular")]
    SingularResidualCovariance,

    /// A collaborator (loader, propagator) failed; carries the diagnostic.
    #[error("Collaborator failure: {0}")]
    Env(#[from] EnvError),

    /// Persisted output could not be written or read back.
    #[error("Persistence I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted output could not be encoded or decoded.
    #[error("Persistence encoding error: {0}")]
    Serialization(#[from] serde_json::Error),
}
