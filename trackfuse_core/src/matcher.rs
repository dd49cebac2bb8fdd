//! Statistical combination of a spectrometer seed with a telescope
//! measurement: a single Kalman filter update restricted to the two
//! transverse position coordinates, scored by chi-square.

use nalgebra::{Matrix2, Matrix2x5, Matrix5, Vector2};

use crate::config::CovarianceUpdate;
use crate::error::MatchingError;
use crate::track::TrackState;

/// A telescope track reduced to what the update consumes: its transverse
/// position and the 2×2 position covariance, both at the matching plane.
#[derive(Debug, Clone)]
pub struct PlanarMeasurement {
    /// Measured (x, y) position (cm).
    pub position: Vector2<f64>,

    /// 2×2 position covariance (cm²).
    pub covariance: Matrix2<f64>,
}

impl PlanarMeasurement {
    /// Extracts the measurement view of a telescope track.
    pub fn from_track(track: &TrackState) -> Self {
        Self {
            position: track.position(),
            covariance: track.position_covariance(),
        }
    }
}

/// The 2×5 observation operator selecting (x, y) out of the state vector.
fn observation_operator() -> Matrix2x5<f64> {
    let mut h = Matrix2x5::zeros();
    h[(0, 0)] = 1.0;
    h[(1, 1)] = 1.0;
    h
}

/// Combines a seed (the prediction) with a planar measurement.
///
/// Both inputs must be valid at the same z. Returns the combined state at
/// that z carrying the updated parameters, the covariance selected by
/// `update`, and the chi-square of the residual. Returns `None` when the
/// residual covariance S = V + H·P·Hᵀ is singular (or the score comes out
/// non-finite): such a pair is not matchable and must never be selected.
pub fn match_xy(
    seed: &TrackState,
    measurement: &PlanarMeasurement,
    update: CovarianceUpdate,
) -> Option<TrackState> {
    let h = observation_operator();
    let x = seed.parameters();
    let p = seed.covariance();

    // Covariance of residuals
    let s = measurement.covariance + h * p * h.transpose();
    let s_inv = s.try_inverse()?;

    // Kalman gain matrix
    let k = p * h.transpose() * s_inv;

    // Residuals of prediction
    let r = measurement.position - h * x;
    let chi2 = (r.transpose() * s_inv * r)[(0, 0)];
    if !chi2.is_finite() {
        return None;
    }

    let updated_parameters = x + k * r;
    let covariance = match update {
        CovarianceUpdate::Filtered => {
            let filtered = (Matrix5::identity() - k * h) * p;
            0.5 * (filtered + filtered.transpose())
        }
        CovarianceUpdate::Predicted => *p,
    };

    let mut combined = TrackState::new(updated_parameters, covariance, seed.z());
    combined.set_match_chi2(chi2);
    Some(combined)
}

/// Single-pair combination with the singular case surfaced as an error.
pub fn match_tracks(
    seed: &TrackState,
    telescope_track: &TrackState,
    update: CovarianceUpdate,
) -> Result<TrackState, MatchingError> {
    let measurement = PlanarMeasurement::from_track(telescope_track);
    match_xy(seed, &measurement, update).ok_or(MatchingError::SingularResidualCovariance)
}
