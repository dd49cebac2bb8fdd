//! Deterministic synthetic-event harness for the trackfuse engine.
//!
//! Seeds a ground-truth oracle, produces smeared telescope and spectrometer
//! collections for the same set of true particles, runs the full matching
//! pipeline, and scores the committed assignments against the truth pairing.
//! All randomness derives from a single 64-bit seed, so any failure is
//! reproducible by its seed number.

pub mod oracle;
pub mod report;

pub use oracle::{EventOracle, OracleConfig, SyntheticEvent};
pub use report::MatchingReport;

/// Derives the physics seed from the master seed, keeping event generation
/// decoupled from any other seeded component.
pub fn physics_seed(master_seed: u64) -> u64 {
    master_seed.wrapping_mul(0x9e3779b97f4a7c15)
}
