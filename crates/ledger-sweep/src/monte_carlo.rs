//! Seeded Monte Carlo sampling inside the documented parameter ranges.

use crate::{metric_stats, run_scenarios, Metric, ScenarioOutcome, Stats};
use ledger_core::{HistoricalSeries, ParamKind, ScenarioParams};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::info;

/// Draw every parameter uniformly from its documented range.
pub fn sample_params<R: Rng>(rng: &mut R) -> ScenarioParams {
    let mut params = ScenarioParams::default();
    for kind in ParamKind::ALL {
        let b = kind.bound();
        params.set(kind, rng.gen_range(b.min..=b.max));
    }
    params
}

/// Outcomes of a sampled batch plus per-metric statistics.
#[derive(Clone, Debug, Serialize)]
pub struct MonteCarloReport {
    pub seed: u64,
    pub runs: Vec<ScenarioOutcome>,
    pub stats: Vec<(Metric, Stats)>,
}

impl MonteCarloReport {
    pub fn stats_for(&self, metric: Metric) -> Option<&Stats> {
        self.stats.iter().find(|(m, _)| *m == metric).map(|(_, s)| s)
    }
}

/// Sample `runs` scenarios from `seed` and evaluate them in parallel.
///
/// Sampling is sequential, so the same seed always yields the same report.
pub fn monte_carlo(history: &HistoricalSeries, runs: usize, seed: u64) -> MonteCarloReport {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let scenarios: Vec<ScenarioParams> = (0..runs).map(|_| sample_params(&mut rng)).collect();
    let outcomes = run_scenarios(history, &scenarios);
    let stats = Metric::ALL
        .iter()
        .map(|m| (*m, metric_stats(&outcomes, *m)))
        .collect();
    let report = MonteCarloReport {
        seed,
        runs: outcomes,
        stats,
    };
    if let Some(gap) = report.stats_for(Metric::CumulativeGap) {
        info!(runs, seed, gap_mean = gap.mean, gap_std = gap.std_dev, "monte carlo done");
    }
    report
}
