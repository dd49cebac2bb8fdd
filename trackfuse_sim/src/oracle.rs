//! Ground truth oracle for synthetic matching events.
//!
//! The oracle owns the true particle states and manufactures the two
//! detector views of them: precise telescope tracks at the matching plane
//! and coarse spectrometer seeds delivered further downstream, so the
//! pipeline has to propagate them in. Truth track *i* produces telescope
//! record *i* and spectrometer record *i*; a perfect engine maps seed *i*
//! back to telescope index *i*.

use nalgebra::{Matrix5, Vector5};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use trackfuse_env::{HelixPropagator, MemoryTrackSource, Propagator, RawCluster, TrackParameters};

/// Generation parameters for one synthetic event.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// Number of true particles.
    pub n_tracks: usize,

    /// Matching-plane coordinate (cm); telescope records are delivered here.
    pub plane_z: f64,

    /// Coordinate (cm) at which spectrometer seeds are delivered.
    pub seed_z: f64,

    /// Field strength used for truth transport (kGauss).
    pub bz: f64,

    /// Half-width of the transverse position window at the plane (cm).
    pub position_window: f64,

    /// Telescope position resolution (cm).
    pub telescope_position_sigma: f64,

    /// Telescope slope resolution.
    pub telescope_slope_sigma: f64,

    /// Spectrometer position resolution at the plane (cm).
    pub seed_position_sigma: f64,

    /// Spectrometer slope resolution.
    pub seed_slope_sigma: f64,

    /// Momentum range (GeV/c) for the true particles.
    pub momentum_range: (f64, f64),
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            n_tracks: 20,
            plane_z: -77.5,
            seed_z: -117.5,
            bz: -5.0,
            position_window: 10.0,
            telescope_position_sigma: 5.0e-3, // 50 um pixels
            telescope_slope_sigma: 1.0e-3,
            seed_position_sigma: 5.0e-2,
            seed_slope_sigma: 5.0e-3,
            momentum_range: (2.0, 20.0),
        }
    }
}

/// A true particle state at the matching plane.
#[derive(Debug, Clone)]
pub struct TruthParticle {
    /// Truth index; also the index of both detector records derived from it.
    pub id: usize,

    /// True (x, y, tx, ty, q/p) at the matching plane.
    pub state: Vector5<f64>,
}

/// One generated event: the truth list plus the loader the pipeline reads.
#[derive(Debug, Clone)]
pub struct SyntheticEvent {
    pub truth: Vec<TruthParticle>,
    pub source: MemoryTrackSource,
}

/// Generates synthetic events from a seed.
pub struct EventOracle {
    config: OracleConfig,
    rng: ChaCha8Rng,
}

impl EventOracle {
    /// Creates an oracle from a physics seed and generation config.
    pub fn new(physics_seed: u64, config: OracleConfig) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(physics_seed),
        }
    }

    /// Generates the next event.
    pub fn generate(&mut self) -> SyntheticEvent {
        let cfg = self.config.clone();
        let mut truth = Vec::with_capacity(cfg.n_tracks);
        let mut telescope = Vec::with_capacity(cfg.n_tracks);
        let mut spectrometer = Vec::with_capacity(cfg.n_tracks);
        let mut clusters = Vec::with_capacity(cfg.n_tracks);

        let slope_spread = Normal::new(0.0, 0.2).unwrap();
        let tel_pos = Normal::new(0.0, cfg.telescope_position_sigma).unwrap();
        let tel_slope = Normal::new(0.0, cfg.telescope_slope_sigma).unwrap();
        let seed_pos = Normal::new(0.0, cfg.seed_position_sigma).unwrap();
        let seed_slope = Normal::new(0.0, cfg.seed_slope_sigma).unwrap();

        for id in 0..cfg.n_tracks {
            let x = self.rng.gen_range(-cfg.position_window..cfg.position_window);
            let y = self.rng.gen_range(-cfg.position_window..cfg.position_window);
            let tx = slope_spread.sample(&mut self.rng);
            let ty = slope_spread.sample(&mut self.rng);
            let charge = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            let momentum = self
                .rng
                .gen_range(cfg.momentum_range.0..cfg.momentum_range.1);
            let qop = charge / momentum;

            let state = Vector5::new(x, y, tx, ty, qop);
            truth.push(TruthParticle { id, state });

            telescope.push(self.telescope_record(&state, &tel_pos, &tel_slope));
            spectrometer.push(self.spectrometer_record(&state, &seed_pos, &seed_slope));
            clusters.push(RawCluster {
                x: telescope[id].parameters[0],
                y: telescope[id].parameters[1],
                z: cfg.plane_z,
                sigma_x2: cfg.telescope_position_sigma.powi(2),
                sigma_y2: cfg.telescope_position_sigma.powi(2),
                sensor_id: (id % 936) as u16,
            });
        }

        SyntheticEvent {
            truth,
            source: MemoryTrackSource {
                spectrometer,
                telescope,
                clusters,
            },
        }
    }

    fn telescope_record(
        &mut self,
        state: &Vector5<f64>,
        pos: &Normal<f64>,
        slope: &Normal<f64>,
    ) -> TrackParameters {
        let cfg = &self.config;
        let qop_sigma = 0.02 * state[4].abs();
        let parameters = Vector5::new(
            state[0] + pos.sample(&mut self.rng),
            state[1] + pos.sample(&mut self.rng),
            state[2] + slope.sample(&mut self.rng),
            state[3] + slope.sample(&mut self.rng),
            state[4] * (1.0 + 0.02 * self.rng.gen_range(-1.0..1.0)),
        );
        let covariance = Matrix5::from_diagonal(&Vector5::new(
            cfg.telescope_position_sigma.powi(2),
            cfg.telescope_position_sigma.powi(2),
            cfg.telescope_slope_sigma.powi(2),
            cfg.telescope_slope_sigma.powi(2),
            qop_sigma.powi(2),
        ));
        TrackParameters::new(parameters, covariance, cfg.plane_z)
    }

    fn spectrometer_record(
        &mut self,
        state: &Vector5<f64>,
        pos: &Normal<f64>,
        slope: &Normal<f64>,
    ) -> TrackParameters {
        let cfg = &self.config;
        let qop_sigma = 0.05 * state[4].abs();
        let smeared = Vector5::new(
            state[0] + pos.sample(&mut self.rng),
            state[1] + pos.sample(&mut self.rng),
            state[2] + slope.sample(&mut self.rng),
            state[3] + slope.sample(&mut self.rng),
            state[4] * (1.0 + 0.05 * self.rng.gen_range(-1.0..1.0)),
        );
        let covariance = Matrix5::from_diagonal(&Vector5::new(
            cfg.seed_position_sigma.powi(2),
            cfg.seed_position_sigma.powi(2),
            cfg.seed_slope_sigma.powi(2),
            cfg.seed_slope_sigma.powi(2),
            qop_sigma.powi(2),
        ));

        // Deliver the seed away from the plane: transport the smeared state
        // with the same helix model the pipeline will use to bring it back.
        let mut record = TrackParameters::new(smeared, covariance, cfg.plane_z);
        HelixPropagator
            .extrapolate_to_z(&mut record, cfg.seed_z, cfg.bz)
            .expect("truth transport of a finite state");
        record
    }
}
