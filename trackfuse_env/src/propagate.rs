//! Longitudinal track extrapolation between z planes.
//!
//! The engine never steps through the field itself; it hands a state to a
//! [`Propagator`] and receives the state advanced to the target plane with
//! its covariance transported through the motion-model Jacobian.

use nalgebra::{Matrix5, Vector5};

use crate::error::EnvError;
use crate::types::TrackParameters;

/// Curvature per unit q/p and field: k = BENDING_CONSTANT * Bz * (q/p),
/// with Bz in kGauss, momentum in GeV/c and lengths in cm.
const BENDING_CONSTANT: f64 = 2.99792458e-4;

/// Advances a state + covariance to a target longitudinal coordinate.
pub trait Propagator {
    /// Extrapolates `track` to `target_z` in a field of strength `field_z`.
    ///
    /// On success the track's parameters and covariance are replaced by the
    /// transported values and its z becomes `target_z`. Dimensionality is
    /// preserved. Failures (non-finite inputs or outputs) leave no partial
    /// update behind.
    fn extrapolate_to_z(
        &self,
        track: &mut TrackParameters,
        target_z: f64,
        field_z: f64,
    ) -> Result<(), EnvError>;
}

/// Small-angle helix extrapolator.
///
/// Expands the helix to second order in the step Δz: the slopes rotate with
/// curvature k = BENDING_CONSTANT · Bz · q/p and the transverse position
/// picks up the quadratic sagitta term. The covariance is transported as
/// J P Jᵀ with the analytic Jacobian of the same expansion.
#[derive(Debug, Clone, Copy, Default)]
pub struct HelixPropagator;

impl Propagator for HelixPropagator {
    fn extrapolate_to_z(
        &self,
        track: &mut TrackParameters,
        target_z: f64,
        field_z: f64,
    ) -> Result<(), EnvError> {
        if !track.is_finite() || !target_z.is_finite() || !field_z.is_finite() {
            return Err(EnvError::propagation("non-finite extrapolation input"));
        }

        let dz = target_z - track.z;
        let x = track.parameters[0];
        let y = track.parameters[1];
        let tx = track.parameters[2];
        let ty = track.parameters[3];
        let qop = track.parameters[4];

        let kb = BENDING_CONSTANT * field_z;
        let k = kb * qop;

        let parameters = Vector5::new(
            x + tx * dz + 0.5 * k * ty * dz * dz,
            y + ty * dz - 0.5 * k * tx * dz * dz,
            tx + k * ty * dz,
            ty - k * tx * dz,
            qop,
        );

        let mut jacobian = Matrix5::identity();
        jacobian[(0, 2)] = dz;
        jacobian[(0, 3)] = 0.5 * k * dz * dz;
        jacobian[(0, 4)] = 0.5 * kb * ty * dz * dz;
        jacobian[(1, 2)] = -0.5 * k * dz * dz;
        jacobian[(1, 3)] = dz;
        jacobian[(1, 4)] = -0.5 * kb * tx * dz * dz;
        jacobian[(2, 3)] = k * dz;
        jacobian[(2, 4)] = kb * ty * dz;
        jacobian[(3, 2)] = -k * dz;
        jacobian[(3, 4)] = -kb * tx * dz;

        let transported = jacobian * track.covariance * jacobian.transpose();

        let candidate = TrackParameters::new(
            parameters,
            0.5 * (transported + transported.transpose()),
            target_z,
        );
        if !candidate.is_finite() {
            return Err(EnvError::propagation(format!(
                "non-finite state after extrapolation to z = {target_z}"
            )));
        }

        *track = candidate;
        Ok(())
    }
}

/// Straight-line extrapolator for field-free regions.
///
/// Equivalent to [`HelixPropagator`] at Bz = 0 or q/p = 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinePropagator;

impl Propagator for LinePropagator {
    fn extrapolate_to_z(
        &self,
        track: &mut TrackParameters,
        target_z: f64,
        _field_z: f64,
    ) -> Result<(), EnvError> {
        HelixPropagator.extrapolate_to_z(track, target_z, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_track() -> TrackParameters {
        TrackParameters::new(
            Vector5::new(1.0, -2.0, 0.1, -0.05, 0.25),
            Matrix5::identity(),
            -40.0,
        )
    }

    #[test]
    fn line_propagation_moves_position_by_slope() {
        let mut track = sample_track();
        LinePropagator
            .extrapolate_to_z(&mut track, -60.0, -5.0)
            .unwrap();

        assert_relative_eq!(track.parameters[0], 1.0 + 0.1 * -20.0, epsilon = 1e-12);
        assert_relative_eq!(track.parameters[1], -2.0 + -0.05 * -20.0, epsilon = 1e-12);
        assert_relative_eq!(track.parameters[2], 0.1, epsilon = 1e-12);
        assert_eq!(track.z, -60.0);
    }

    #[test]
    fn helix_reduces_to_line_without_field() {
        let mut helix = sample_track();
        let mut line = sample_track();

        HelixPropagator
            .extrapolate_to_z(&mut helix, -77.5, 0.0)
            .unwrap();
        LinePropagator
            .extrapolate_to_z(&mut line, -77.5, -5.0)
            .unwrap();

        assert_relative_eq!(helix.parameters, line.parameters, epsilon = 1e-12);
        assert_relative_eq!(helix.covariance, line.covariance, epsilon = 1e-12);
    }

    #[test]
    fn helix_reduces_to_line_for_neutral_state() {
        let mut track = sample_track();
        track.parameters[4] = 0.0;
        let mut line = track.clone();

        HelixPropagator
            .extrapolate_to_z(&mut track, -77.5, -5.0)
            .unwrap();
        LinePropagator
            .extrapolate_to_z(&mut line, -77.5, 0.0)
            .unwrap();

        assert_relative_eq!(track.parameters, line.parameters, epsilon = 1e-12);
    }

    #[test]
    fn helix_bends_slopes_in_field() {
        let mut track = sample_track();
        HelixPropagator
            .extrapolate_to_z(&mut track, -77.5, -5.0)
            .unwrap();

        let dz = -77.5 - -40.0;
        let k = BENDING_CONSTANT * -5.0 * 0.25;
        assert_relative_eq!(track.parameters[2], 0.1 + k * -0.05 * dz, epsilon = 1e-12);
        assert_relative_eq!(track.parameters[3], -0.05 - k * 0.1 * dz, epsilon = 1e-12);
        assert_relative_eq!(track.parameters[4], 0.25, epsilon = 1e-12);
    }

    #[test]
    fn covariance_stays_symmetric_and_grows_transversely() {
        let mut track = sample_track();
        HelixPropagator
            .extrapolate_to_z(&mut track, -90.0, -5.0)
            .unwrap();

        assert_relative_eq!(
            track.covariance,
            track.covariance.transpose(),
            epsilon = 1e-12
        );
        // Slope uncertainty feeds the transported position variance.
        assert!(track.covariance[(0, 0)] > 1.0);
        assert!(track.covariance[(1, 1)] > 1.0);
    }

    #[test]
    fn round_trip_returns_to_start() {
        let original = sample_track();
        let mut track = original.clone();

        HelixPropagator
            .extrapolate_to_z(&mut track, -77.5, -5.0)
            .unwrap();
        HelixPropagator
            .extrapolate_to_z(&mut track, original.z, -5.0)
            .unwrap();

        // The quadratic expansion is not exactly reversible, but the
        // residual at these step lengths is far below detector resolution.
        assert_relative_eq!(track.parameters[0], original.parameters[0], epsilon = 1e-6);
        assert_relative_eq!(track.parameters[1], original.parameters[1], epsilon = 1e-6);
        assert_relative_eq!(track.parameters[2], original.parameters[2], epsilon = 1e-6);
    }

    #[test]
    fn non_finite_input_is_rejected() {
        let mut track = sample_track();
        track.parameters[0] = f64::NAN;

        let result = HelixPropagator.extrapolate_to_z(&mut track, -77.5, -5.0);
        assert!(matches!(result, Err(EnvError::Propagation(_))));
    }
}
