//! Configuration for a matching run.

use serde::{Deserialize, Serialize};

/// Which covariance the combined track carries out of the Kalman update.
///
/// The legacy production chain stored the seed's *predicted* covariance on
/// the combined track rather than the filtered one; both behaviors are kept
/// selectable so results can be reproduced either way. The updated parameter
/// vector is carried in both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CovarianceUpdate {
    /// Textbook filtered covariance (I − K·H)·P, symmetrized.
    Filtered,

    /// Legacy-compatible: keep the prediction's covariance unchanged.
    Predicted,
}

/// Configuration for the matching engine.
#[derive(Debug, Clone)]
pub struct MatchingConfig {
    /// Longitudinal coordinate (cm) of the matching plane. Both collections
    /// must sit at this z before any pair is scored.
    pub matching_plane_z: f64,

    /// Global point (cm) at which the field is sampled once per run.
    pub field_point: [f64; 3],

    /// Covariance carried by the combined tracks.
    pub covariance_update: CovarianceUpdate,

    /// Optional chi-square acceptance cut. Candidates scoring above the cut
    /// are not selectable; `None` keeps every finite candidate eligible,
    /// which reproduces the legacy argmin-only behavior.
    pub chi2_cut: Option<f64>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            matching_plane_z: -77.5,         // last telescope plane
            field_point: [0.0, 0.0, -61.4],  // between the plane and the dipole
            covariance_update: CovarianceUpdate::Filtered,
            chi2_cut: None,
        }
    }
}
