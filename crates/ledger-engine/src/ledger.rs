//! Aggregator: stitches retropolation, history and projection into one
//! year-ordered ledger with running totals.

use crate::externality::{rate_total, TOTAL_RATE};
use crate::historical::historical_pass;
use crate::projection::DualPathProjector;
use crate::retro::retropolate;
use ledger_core::reference::reference_series;
use ledger_core::{validate_year, HistoricalSeries, ScenarioParams, YearRecord};
use std::borrow::Cow;
use tracing::{debug, warn};

/// State carried across phases.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunningTotals {
    /// Cumulative extractive externality cost; never repaid.
    pub debt: f64,
    /// Cumulative regenerative value created; zero before projection.
    pub regen: f64,
}

/// Run the full engine: a pure function of the series and the parameters.
///
/// Never fails. Years outside the supported calendar range are ignored, and
/// a series left empty is replaced by the built-in reference data.
pub fn simulate(history: &HistoricalSeries, params: &ScenarioParams) -> Vec<YearRecord> {
    debug_assert!((rate_total() - TOTAL_RATE).abs() < 1e-9);

    let mut history: Cow<'_, HistoricalSeries> = Cow::Borrowed(history);
    if history.years().any(|(y, _)| validate_year(y).is_err()) {
        let dropped = history.to_mut().retain_years(|y| validate_year(y).is_ok());
        warn!(dropped, "ignoring years outside the supported range");
    }
    if history.is_empty() {
        warn!("empty historical series, using reference data");
        history = Cow::Owned(reference_series());
    }
    // The reference series is never empty.
    let (Some(first), Some((last, last_row))) = (history.first_year(), history.last_observation()) else {
        return Vec::new();
    };

    let today = params.starting_indices();
    let tickers = history.tickers();
    // A reported aggregate anchors the projection when present.
    let last_ni = last_row.combined_net_income(tickers);

    let mut totals = RunningTotals::default();
    let mut records = retropolate(first, last, &today, tickers, &mut totals);
    records.extend(historical_pass(&history, &today, &mut totals));
    records.extend(
        DualPathProjector::new(&history, last, last_ni, params).run(params.proj_years, &mut totals),
    );

    debug!(
        records = records.len(),
        first_year = records.first().map(|r| r.year),
        last_year = records.last().map(|r| r.year),
        debt = totals.debt,
        regen = totals.regen,
        "simulation complete"
    );
    records
}
