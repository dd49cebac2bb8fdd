//! Per-seed assignment: score every spectrometer seed against every
//! telescope track and commit the minimum-chi-square candidate.

use crate::config::MatchingConfig;
use crate::matcher::{match_xy, PlanarMeasurement};
use crate::track::TrackState;

/// Runs the all-pairs matching loop.
///
/// For seed *i*, every telescope track *j* is scored with the Kalman XY
/// combination; the minimum-chi-square candidate wins and its telescope
/// index is committed as `best_match`. Ties keep the first-seen minimum, so
/// the output is deterministic for a given input order. The assignment is
/// independent per seed: a telescope track may be claimed by more than one
/// seed, and no global exclusivity is enforced.
///
/// Pairs whose residual covariance is singular are skipped, as are
/// candidates above the optional chi-square cut. A seed with no eligible
/// candidate (including the empty-telescope case) yields its own state,
/// unmatched. An empty seed collection yields an empty output.
///
/// Every seed's result depends only on that seed and read-only views of the
/// telescope collection, so the loop body parallelizes over seeds without
/// changing results.
pub fn run_matching(
    seeds: &[TrackState],
    telescope: &[TrackState],
    config: &MatchingConfig,
) -> Vec<TrackState> {
    let measurements: Vec<PlanarMeasurement> =
        telescope.iter().map(PlanarMeasurement::from_track).collect();

    seeds
        .iter()
        .map(|seed| best_candidate(seed, &measurements, config))
        .collect()
}

fn best_candidate(
    seed: &TrackState,
    measurements: &[PlanarMeasurement],
    config: &MatchingConfig,
) -> TrackState {
    let mut best: Option<(usize, TrackState)> = None;

    for (index, measurement) in measurements.iter().enumerate() {
        let Some(candidate) = match_xy(seed, measurement, config.covariance_update) else {
            continue;
        };
        let chi2 = candidate.score();
        if let Some(cut) = config.chi2_cut {
            if chi2 > cut {
                continue;
            }
        }
        let improves = match &best {
            Some((_, current)) => chi2 < current.score(),
            None => true,
        };
        if improves {
            best = Some((index, candidate));
        }
    }

    match best {
        Some((index, mut winner)) => {
            winner.set_best_match(index);
            winner
        }
        None => seed.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CovarianceUpdate;
    use approx::assert_relative_eq;
    use nalgebra::{Matrix5, Vector5};

    fn state_at(x: f64, y: f64) -> TrackState {
        TrackState::new(Vector5::new(x, y, 0.0, 0.0, 0.1), Matrix5::identity(), -77.5)
    }

    fn config() -> MatchingConfig {
        MatchingConfig::default()
    }

    #[test]
    fn identity_covariances_rank_by_euclidean_distance() {
        let seeds = vec![state_at(0.0, 0.0)];
        let telescope = vec![
            state_at(3.0, 0.0),
            state_at(0.5, 0.5), // closest
            state_at(-2.0, 1.0),
        ];

        let global = run_matching(&seeds, &telescope, &config());
        assert_eq!(global.len(), 1);
        assert_eq!(global[0].best_match(), Some(1));
    }

    #[test]
    fn each_seed_gets_its_own_winner() {
        let seeds = vec![state_at(0.0, 0.0), state_at(10.0, 10.0)];
        let telescope = vec![state_at(0.1, 0.0), state_at(10.1, 10.0)];

        let global = run_matching(&seeds, &telescope, &config());
        assert_eq!(global[0].best_match(), Some(0));
        assert_eq!(global[1].best_match(), Some(1));
    }

    #[test]
    fn assignment_is_not_exclusive() {
        // Both seeds sit closest to the same telescope track.
        let seeds = vec![state_at(0.0, 0.0), state_at(0.2, 0.0)];
        let telescope = vec![state_at(0.1, 0.0), state_at(50.0, 50.0)];

        let global = run_matching(&seeds, &telescope, &config());
        assert_eq!(global[0].best_match(), Some(0));
        assert_eq!(global[1].best_match(), Some(0));
    }

    #[test]
    fn tie_breaks_to_first_seen_minimum() {
        let seeds = vec![state_at(0.0, 0.0)];
        // Symmetric candidates with identical chi2.
        let telescope = vec![state_at(1.0, 0.0), state_at(-1.0, 0.0)];

        let global = run_matching(&seeds, &telescope, &config());
        assert_eq!(global[0].best_match(), Some(0));
    }

    #[test]
    fn empty_telescope_yields_unmatched_seeds() {
        let seeds = vec![state_at(0.0, 0.0), state_at(1.0, 1.0)];

        let global = run_matching(&seeds, &[], &config());
        assert_eq!(global.len(), 2);
        for (seed, out) in seeds.iter().zip(&global) {
            assert!(out.best_match().is_none());
            assert!(out.match_chi2().is_none());
            assert_eq!(out.score(), f64::INFINITY);
            assert_eq!(out.parameters(), seed.parameters());
        }
    }

    #[test]
    fn empty_seeds_yield_empty_global_collection() {
        let telescope = vec![state_at(0.0, 0.0), state_at(1.0, 0.0)];
        let global = run_matching(&[], &telescope, &config());
        assert!(global.is_empty());
    }

    #[test]
    fn rerunning_is_deterministic() {
        let seeds: Vec<TrackState> = (0..8)
            .map(|i| state_at(i as f64 * 0.7 - 2.0, (i % 3) as f64))
            .collect();
        let telescope: Vec<TrackState> = (0..12)
            .map(|j| state_at(j as f64 * 0.5 - 3.0, (j % 4) as f64 * 0.5))
            .collect();

        let first = run_matching(&seeds, &telescope, &config());
        let second = run_matching(&seeds, &telescope, &config());

        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.best_match(), b.best_match());
            assert_eq!(a.match_chi2(), b.match_chi2());
        }
    }

    #[test]
    fn singular_candidates_are_skipped_not_fatal() {
        let seeds = vec![TrackState::new(
            Vector5::zeros(),
            Matrix5::zeros(), // degenerate seed: S is singular against a zero-covariance measurement
            -77.5,
        )];
        let degenerate =
            TrackState::new(Vector5::new(1.0, 0.0, 0.0, 0.0, 0.0), Matrix5::zeros(), -77.5);

        let global = run_matching(&seeds, &[degenerate], &config());
        assert_eq!(global.len(), 1);
        assert!(global[0].best_match().is_none());
    }

    #[test]
    fn chi2_cut_leaves_distant_seeds_unmatched() {
        let mut cfg = config();
        cfg.chi2_cut = Some(1.0);
        // Residual 4 cm with S = 2·I gives chi2 = 8, above the cut.
        let seeds = vec![state_at(0.0, 0.0)];
        let telescope = vec![state_at(4.0, 0.0)];

        let global = run_matching(&seeds, &telescope, &cfg);
        assert!(global[0].best_match().is_none());

        cfg.chi2_cut = None;
        let global = run_matching(&seeds, &telescope, &cfg);
        assert_eq!(global[0].best_match(), Some(0));
        assert_relative_eq!(global[0].match_chi2().unwrap(), 8.0, epsilon = 1e-12);
    }

    #[test]
    fn winner_carries_combined_state_in_predicted_mode() {
        let mut cfg = config();
        cfg.covariance_update = CovarianceUpdate::Predicted;
        let seeds = vec![state_at(0.0, 0.0)];
        let telescope = vec![state_at(1.0, 0.0)];

        let global = run_matching(&seeds, &telescope, &cfg);
        // Parameters updated halfway, covariance kept from the prediction.
        assert_relative_eq!(global[0].parameters()[0], 0.5, epsilon = 1e-12);
        assert_eq!(global[0].covariance(), seeds[0].covariance());
    }
}
