//! Trackfuse Environment Abstraction Layer
//!
//! This crate is the seam between the matching engine and everything the
//! engine treats as an external collaborator:
//! - **Loading** reconstructed track and cluster records from storage
//! - **Field lookup** (longitudinal field component at a global point)
//! - **Longitudinal extrapolation** of a state + covariance between z planes
//!
//! The engine in `trackfuse_core` consumes only the traits defined here
//! ([`TrackSource`], [`FieldMap`], [`Propagator`]); the concrete
//! implementations in this crate (JSON file source, uniform field, helix
//! extrapolator) are the ones the batch driver wires in. Tests substitute
//! their own.

mod error;
mod field;
mod propagate;
mod source;
mod types;

pub use error::EnvError;
pub use field::{ConstantFieldMap, FieldMap};
pub use propagate::{HelixPropagator, LinePropagator, Propagator};
pub use source::{JsonTrackSource, MemoryTrackSource, TrackSource};
pub use types::{RawCluster, TrackParameters};
