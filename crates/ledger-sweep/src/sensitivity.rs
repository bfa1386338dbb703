//! One-parameter sensitivity sweeps.

use crate::{run_scenarios, Metric, ScenarioOutcome};
use ledger_core::{HistoricalSeries, ParamKind, ScenarioParams};
use serde::Serialize;
use tracing::info;

/// One point of a sweep: the swept value and the resulting outcome.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SweepPoint {
    pub value: f64,
    pub outcome: ScenarioOutcome,
}

impl SweepPoint {
    pub fn metric(&self, m: Metric) -> f64 {
        self.outcome.metric(m)
    }
}

/// `steps` evenly spaced values across the documented range of `kind`,
/// endpoints included. The horizon is rounded to whole years and deduplicated.
pub fn grid(kind: ParamKind, steps: usize) -> Vec<f64> {
    let b = kind.bound();
    let mut values: Vec<f64> = match steps {
        0 => Vec::new(),
        1 => vec![b.min],
        n => (0..n)
            .map(|i| b.min + (b.max - b.min) * i as f64 / (n - 1) as f64)
            .collect(),
    };
    if kind == ParamKind::ProjYears {
        values.iter_mut().for_each(|v| *v = v.round());
        values.dedup();
    }
    values
}

/// Vary `kind` over [`grid`] while holding the rest of `base` fixed.
pub fn sensitivity(history: &HistoricalSeries, base: &ScenarioParams, kind: ParamKind, steps: usize) -> Vec<SweepPoint> {
    let values = grid(kind, steps);
    let scenarios: Vec<ScenarioParams> = values.iter().map(|v| base.with(kind, *v)).collect();
    let points: Vec<SweepPoint> = values
        .into_iter()
        .zip(run_scenarios(history, &scenarios))
        .map(|(value, outcome)| SweepPoint { value, outcome })
        .collect();
    info!(param = kind.name(), points = points.len(), "sensitivity sweep done");
    points
}
