#![deny(warnings)]

//! Parallel evaluation of independent scenarios against one shared history.
//!
//! Each run is a pure function of the history and its parameters, so runs are
//! spread over the rayon pool with no coordination. Results always come back
//! in input order.

mod monte_carlo;
mod sensitivity;
mod stats;

pub use monte_carlo::{monte_carlo, sample_params, MonteCarloReport};
pub use sensitivity::{grid, sensitivity, SweepPoint};
pub use stats::Stats;

use ledger_core::{HistoricalSeries, ScenarioParams};
use ledger_engine::{simulate, LedgerSummary};
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

/// Headline figure tracked across scenarios.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Metric {
    CumulativeDebt,
    CumulativeRegenValue,
    CumulativeGap,
    NetSystemBalance,
    FinalDeltaPct,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::CumulativeDebt,
        Metric::CumulativeRegenValue,
        Metric::CumulativeGap,
        Metric::NetSystemBalance,
        Metric::FinalDeltaPct,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::CumulativeDebt => "cumulative_debt",
            Metric::CumulativeRegenValue => "cumulative_regen_value",
            Metric::CumulativeGap => "cumulative_gap",
            Metric::NetSystemBalance => "net_system_balance",
            Metric::FinalDeltaPct => "final_delta_pct",
        }
    }

    fn read(&self, s: &LedgerSummary) -> f64 {
        match self {
            Metric::CumulativeDebt => s.cumulative_debt,
            Metric::CumulativeRegenValue => s.cumulative_regen_value,
            Metric::CumulativeGap => s.cumulative_gap,
            Metric::NetSystemBalance => s.net_system_balance,
            Metric::FinalDeltaPct => s.final_delta_pct,
        }
    }
}

/// Parameters of one run and the summary of its ledger.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScenarioOutcome {
    pub params: ScenarioParams,
    pub summary: Option<LedgerSummary>,
}

impl ScenarioOutcome {
    /// Metric value, NaN for an empty ledger.
    pub fn metric(&self, m: Metric) -> f64 {
        self.summary.as_ref().map(|s| m.read(s)).unwrap_or(f64::NAN)
    }
}

/// Run every scenario on the rayon pool.
pub fn run_scenarios(history: &HistoricalSeries, scenarios: &[ScenarioParams]) -> Vec<ScenarioOutcome> {
    let outcomes: Vec<ScenarioOutcome> = scenarios
        .par_iter()
        .map(|params| ScenarioOutcome {
            params: params.clone(),
            summary: LedgerSummary::from_records(&simulate(history, params)),
        })
        .collect();
    debug!(scenarios = outcomes.len(), "scenario batch complete");
    outcomes
}

/// Statistics of `metric` over a batch of outcomes.
pub fn metric_stats(outcomes: &[ScenarioOutcome], metric: Metric) -> Stats {
    let samples: Vec<f64> = outcomes.iter().map(|o| o.metric(metric)).collect();
    Stats::from_samples(&samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_core::reference::reference_series;
    use ledger_core::ParamKind;

    #[test]
    fn parallel_matches_sequential_in_order() {
        let history = reference_series();
        let scenarios: Vec<ScenarioParams> = (0..8)
            .map(|i| ScenarioParams::default().with(ParamKind::Gamma, f64::from(i) * 0.4))
            .collect();
        let par = run_scenarios(&history, &scenarios);
        assert_eq!(par.len(), scenarios.len());
        for (out, params) in par.iter().zip(&scenarios) {
            assert_eq!(&out.params, params);
            let seq = LedgerSummary::from_records(&simulate(&history, params));
            assert_eq!(out.summary, seq);
        }
    }

    #[test]
    fn empty_batch_is_empty() {
        assert!(run_scenarios(&reference_series(), &[]).is_empty());
    }

    #[test]
    fn metric_reads_summary() {
        let out = run_scenarios(&reference_series(), &[ScenarioParams::default()]);
        let s = out[0].summary.as_ref().unwrap();
        assert_eq!(out[0].metric(Metric::CumulativeGap), s.cumulative_gap);
        assert_eq!(out[0].metric(Metric::NetSystemBalance), s.net_system_balance);
        let stats = metric_stats(&out, Metric::CumulativeDebt);
        assert_eq!(stats.n, 1);
        assert_eq!(stats.mean, s.cumulative_debt);
    }

    #[test]
    fn empty_summary_reads_nan() {
        let out = ScenarioOutcome {
            params: ScenarioParams::default(),
            summary: None,
        };
        assert!(out.metric(Metric::FinalDeltaPct).is_nan());
        assert_eq!(metric_stats(&[out], Metric::FinalDeltaPct).n, 0);
    }
}
