//! Trackfuse Core - Two-Subsystem Global Track Matching
//!
//! This library fuses track collections reconstructed independently by two
//! detector subsystems into one global track collection:
//! 1. **Common plane**: both collections are extrapolated to a fixed
//!    matching plane by the collaborator layer (`trackfuse_env`)
//! 2. **Statistical combination**: each spectrometer seed is combined with a
//!    telescope measurement through a single Kalman position update with a
//!    chi-square compatibility score
//! 3. **Assignment**: every seed commits to its minimum-chi-square telescope
//!    candidate, producing the global collection
//!
//! The engine is a synchronous batch computation over finite collections;
//! there is no network or CLI surface here.

pub mod assign;
pub mod config;
pub mod convert;
pub mod error;
pub mod manager;
pub mod matcher;
pub mod persist;
pub mod track;

// Re-export key types for convenience
pub use assign::run_matching;
pub use config::{CovarianceUpdate, MatchingConfig};
pub use convert::FrameTransform;
pub use error::MatchingError;
pub use manager::MatchingRun;
pub use matcher::{match_xy, PlanarMeasurement};
pub use persist::TrackSetFile;
pub use track::{Cluster, TrackState};
