//! Track state and cluster representations shared across the engine.

use std::f64::consts::TAU;

use nalgebra::{Matrix2, Matrix5, Vector2, Vector5};
use serde::{Deserialize, Serialize};
use trackfuse_env::{RawCluster, TrackParameters};

/// A trajectory state estimate at a fixed longitudinal coordinate, plus the
/// matching bookkeeping the engine writes onto its outputs.
///
/// Parameter convention `(x, y, tx, ty, q/p)`: transverse position (cm),
/// direction tangents dx/dz and dy/dz, charge over momentum (1/(GeV/c)).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackState {
    parameters: Vector5<f64>,
    covariance: Matrix5<f64>,
    z: f64,

    /// Chi-square of the committed combination; `None` until a match is
    /// performed (and for seeds that found no eligible candidate).
    match_chi2: Option<f64>,

    /// Index of the chosen telescope track; `None` before matching and for
    /// unmatched seeds. Once set it indexes the telescope collection as it
    /// existed at assignment time, so that collection must not be compacted
    /// afterwards.
    best_match: Option<usize>,
}

impl TrackState {
    /// Creates an unmatched state.
    pub fn new(parameters: Vector5<f64>, covariance: Matrix5<f64>, z: f64) -> Self {
        Self {
            parameters,
            covariance,
            z,
            match_chi2: None,
            best_match: None,
        }
    }

    /// 5-component state vector.
    #[inline]
    pub fn parameters(&self) -> &Vector5<f64> {
        &self.parameters
    }

    /// 5×5 covariance matrix.
    #[inline]
    pub fn covariance(&self) -> &Matrix5<f64> {
        &self.covariance
    }

    /// Longitudinal coordinate (cm) at which the state is valid.
    #[inline]
    pub fn z(&self) -> f64 {
        self.z
    }

    /// Transverse position (x, y).
    #[inline]
    pub fn position(&self) -> Vector2<f64> {
        Vector2::new(self.parameters[0], self.parameters[1])
    }

    /// Transverse position covariance (upper-left 2×2 block).
    #[inline]
    pub fn position_covariance(&self) -> Matrix2<f64> {
        self.covariance.fixed_view::<2, 2>(0, 0).into_owned()
    }

    /// Chi-square of the committed combination, if any.
    #[inline]
    pub fn match_chi2(&self) -> Option<f64> {
        self.match_chi2
    }

    /// Chi-square as a ranking score: +∞ when no combination was performed,
    /// so unmatched states order after every real candidate.
    #[inline]
    pub fn score(&self) -> f64 {
        self.match_chi2.unwrap_or(f64::INFINITY)
    }

    /// Index of the chosen telescope track, if a match was committed.
    #[inline]
    pub fn best_match(&self) -> Option<usize> {
        self.best_match
    }

    /// True if a match was committed onto this state.
    #[inline]
    pub fn is_matched(&self) -> bool {
        self.best_match.is_some()
    }

    pub(crate) fn set_match_chi2(&mut self, chi2: f64) {
        self.match_chi2 = Some(chi2);
    }

    pub(crate) fn set_best_match(&mut self, telescope_index: usize) {
        self.best_match = Some(telescope_index);
    }

    /// The numeric state record, without the matching bookkeeping.
    pub fn to_parameters(&self) -> TrackParameters {
        TrackParameters::new(self.parameters, self.covariance, self.z)
    }
}

impl From<TrackParameters> for TrackState {
    fn from(raw: TrackParameters) -> Self {
        Self::new(raw.parameters, raw.covariance, raw.z)
    }
}

/// A decoded detector cluster in the global frame, with the derived polar
/// coordinates the engine keys on.
///
/// Created once per loaded record and immutable afterwards; owned by the
/// run's [`crate::manager::MatchingRun`] for its duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    /// Global x position (cm).
    pub x: f64,
    /// Global y position (cm).
    pub y: f64,
    /// Global z position (cm).
    pub z: f64,
    /// Polar radius in the transverse plane (cm).
    pub r: f64,
    /// Azimuth in the transverse plane, wrapped to [0, 2π).
    pub phi: f64,
    /// Variance of the x coordinate (cm²).
    pub sigma_x2: f64,
    /// Variance of the y coordinate (cm²).
    pub sigma_y2: f64,
    /// Sequential cluster identifier within the run.
    pub id: usize,
    /// Identifier of the sensor that produced the cluster.
    pub sensor_id: u16,
}

impl Cluster {
    /// Builds a cluster from a raw record, deriving (r, phi) from (x, y).
    pub fn from_raw(id: usize, raw: &RawCluster) -> Self {
        let r = raw.x.hypot(raw.y);
        let phi = raw.y.atan2(raw.x).rem_euclid(TAU);
        Self {
            x: raw.x,
            y: raw.y,
            z: raw.z,
            r,
            phi,
            sigma_x2: raw.sigma_x2,
            sigma_y2: raw.sigma_y2,
            id,
            sensor_id: raw.sensor_id,
        }
    }
}
