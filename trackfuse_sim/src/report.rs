//! Scoring the engine's assignments against the truth pairing.

use serde::Serialize;
use trackfuse_core::MatchingRun;

/// Summary of one matching run against a synthetic event.
#[derive(Debug, Clone, Serialize)]
pub struct MatchingReport {
    /// Master seed of the run.
    pub seed: u64,

    /// Number of spectrometer seeds.
    pub n_seeds: usize,

    /// Number of telescope tracks.
    pub n_telescope: usize,

    /// Seeds that committed a match.
    pub matched: usize,

    /// Matched seeds whose committed index equals their truth partner.
    pub correct: usize,

    /// Mean chi-square over the matched seeds.
    pub mean_chi2: Option<f64>,

    /// Whether the run met the purity threshold.
    pub passed: bool,
}

impl MatchingReport {
    /// Scores a finished run. The oracle emits index-aligned collections,
    /// so seed *i*'s true partner is telescope index *i*.
    pub fn from_run(seed: u64, run: &MatchingRun, min_purity: f64) -> Self {
        let global = run.global_tracks();
        let matched = global.iter().filter(|t| t.is_matched()).count();
        let correct = global
            .iter()
            .enumerate()
            .filter(|(i, t)| t.best_match() == Some(*i))
            .count();

        let chi2_sum: f64 = global.iter().filter_map(|t| t.match_chi2()).sum();
        let mean_chi2 = (matched > 0).then(|| chi2_sum / matched as f64);

        let n_seeds = global.len();
        let purity = if n_seeds > 0 {
            correct as f64 / n_seeds as f64
        } else {
            1.0
        };

        Self {
            seed,
            n_seeds,
            n_telescope: run.telescope_tracks().len(),
            matched,
            correct,
            mean_chi2,
            passed: purity >= min_purity,
        }
    }

    /// Fraction of seeds committed to their true partner.
    pub fn purity(&self) -> f64 {
        if self.n_seeds == 0 {
            1.0
        } else {
            self.correct as f64 / self.n_seeds as f64
        }
    }
}
