//! Common record types exchanged with the collaborator layer.

use nalgebra::{Matrix5, Vector5};
use serde::{Deserialize, Serialize};

/// A track state estimate valid at a single longitudinal coordinate.
///
/// This is the raw numeric record both detector subsystems deliver and the
/// unit the propagator advances. The parameter convention is
/// `(x, y, tx, ty, q/p)`: transverse position in cm, direction tangents
/// `dx/dz` and `dy/dz`, and charge over momentum in 1/(GeV/c).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackParameters {
    /// 5-component state vector.
    pub parameters: Vector5<f64>,

    /// 5×5 symmetric covariance of `parameters`.
    pub covariance: Matrix5<f64>,

    /// Longitudinal coordinate (cm) at which the state is valid.
    pub z: f64,
}

impl TrackParameters {
    /// Creates a new state record.
    pub fn new(parameters: Vector5<f64>, covariance: Matrix5<f64>, z: f64) -> Self {
        Self {
            parameters,
            covariance,
            z,
        }
    }

    /// Transverse x position (cm).
    #[inline]
    pub fn x(&self) -> f64 {
        self.parameters[0]
    }

    /// Transverse y position (cm).
    #[inline]
    pub fn y(&self) -> f64 {
        self.parameters[1]
    }

    /// True if every parameter and covariance entry is finite.
    pub fn is_finite(&self) -> bool {
        self.parameters.iter().all(|v| v.is_finite())
            && self.covariance.iter().all(|v| v.is_finite())
    }
}

/// A decoded cluster record in the global frame.
///
/// Pattern decoding and local-to-global alignment happen upstream of this
/// crate; loaders deliver clusters already positioned in the global frame
/// with their per-axis variances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCluster {
    /// Global x position (cm).
    pub x: f64,

    /// Global y position (cm).
    pub y: f64,

    /// Global z position (cm).
    pub z: f64,

    /// Variance of the x coordinate (cm²).
    pub sigma_x2: f64,

    /// Variance of the y coordinate (cm²).
    pub sigma_y2: f64,

    /// Identifier of the sensor that produced the cluster.
    pub sensor_id: u16,
}
