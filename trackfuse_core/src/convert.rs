//! Spectrometer-to-common-frame conversion.
//!
//! The spectrometer delivers its states in its own parametrization frame.
//! When the two subsystems share a frame the conversion is the identity;
//! when they do not, the difference is expressed here as an affine map on
//! the state vector with the matching Jacobian transport of the covariance.

use nalgebra::{Matrix5, Vector5};
use serde::{Deserialize, Serialize};
use trackfuse_env::TrackParameters;

use crate::track::TrackState;

/// Affine change of track frame: x' = J·x + c, P' = J·P·Jᵀ.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameTransform {
    jacobian: Matrix5<f64>,
    offset: Vector5<f64>,
}

impl FrameTransform {
    /// The identity transform (both subsystems already share a frame).
    pub fn identity() -> Self {
        Self {
            jacobian: Matrix5::identity(),
            offset: Vector5::zeros(),
        }
    }

    /// Creates a transform from its Jacobian and offset.
    pub fn new(jacobian: Matrix5<f64>, offset: Vector5<f64>) -> Self {
        Self { jacobian, offset }
    }

    /// True if applying the transform is a no-op.
    pub fn is_identity(&self) -> bool {
        self.jacobian == Matrix5::identity() && self.offset == Vector5::zeros()
    }

    /// Applies the frame change to a propagated state record.
    ///
    /// The z coordinate is unchanged: the input must already sit at the
    /// matching plane, and a frame change does not move it off the plane.
    pub fn apply(&self, raw: &TrackParameters) -> TrackParameters {
        let parameters = self.jacobian * raw.parameters + self.offset;
        let covariance = self.jacobian * raw.covariance * self.jacobian.transpose();
        TrackParameters::new(
            parameters,
            0.5 * (covariance + covariance.transpose()),
            raw.z,
        )
    }

    /// Converts a fully propagated spectrometer record into the common
    /// [`TrackState`] representation.
    pub fn to_track_state(&self, raw: &TrackParameters) -> TrackState {
        if self.is_identity() {
            TrackState::from(raw.clone())
        } else {
            TrackState::from(self.apply(raw))
        }
    }
}

impl Default for FrameTransform {
    fn default() -> Self {
        Self::identity()
    }
}
