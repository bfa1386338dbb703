//! Retropolation: estimated pre-history before the first observed year.

use crate::externality::category_costs;
use crate::ledger::RunningTotals;
use ledger_core::reference::{retro_revenue, retro_start};
use ledger_core::{EntityFigures, IndexTriple, Phase, Ticker, YearRecord};
use tracing::debug;

/// Net income estimated as this share of revenue (display only).
pub const RETRO_NET_INCOME_RATIO: f64 = 0.15;

/// Linear backward recession of one index: `max(floor, today - rate * years_ago)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Recession {
    pub floor: f64,
    pub decay_per_year: f64,
}

impl Recession {
    pub fn apply(&self, today: f64, years_ago: i32) -> f64 {
        (today - self.decay_per_year * f64::from(years_ago)).max(self.floor)
    }
}

pub const ECOLOGICAL_RECESSION: Recession = Recession {
    floor: 0.10,
    decay_per_year: 0.005,
};
pub const SOCIAL_RECESSION: Recession = Recession {
    floor: 0.15,
    decay_per_year: 0.004,
};
pub const INSTITUTIONAL_RECESSION: Recession = Recession {
    floor: 0.20,
    decay_per_year: 0.003,
};

/// Index levels assumed `years_ago` years before today.
pub fn degraded_indices(today: &IndexTriple, years_ago: i32) -> IndexTriple {
    IndexTriple::new(
        ECOLOGICAL_RECESSION.apply(today.ecological, years_ago),
        SOCIAL_RECESSION.apply(today.social, years_ago),
        INSTITUTIONAL_RECESSION.apply(today.institutional, years_ago),
    )
}

/// Build one record per year in `[table start, first_observed)`.
///
/// `anchor_year` is the last observed year; index recession is measured from
/// it. Revenue is split evenly over `tickers`; prices and net income are
/// unknown. Costs accumulate into `totals.debt`.
pub fn retropolate(
    first_observed: i32,
    anchor_year: i32,
    today: &IndexTriple,
    tickers: &[Ticker],
    totals: &mut RunningTotals,
) -> Vec<YearRecord> {
    let mut records = Vec::new();
    for year in retro_start()..first_observed {
        let Some(revenue) = retro_revenue(year) else {
            continue;
        };
        let indices = degraded_indices(today, anchor_year - year);
        let costs = category_costs(revenue, &indices);
        let cost = costs.total();
        totals.debt += cost;

        let surplus = revenue * RETRO_NET_INCOME_RATIO;
        let per_entity = if tickers.is_empty() {
            0.0
        } else {
            revenue / tickers.len() as f64
        };

        let mut rec = YearRecord::zeroed(year, Phase::Retropolation);
        rec.entities = tickers
            .iter()
            .map(|t| EntityFigures {
                ticker: t.clone(),
                price: 0.0,
                net_income: 0.0,
                revenue: per_entity,
            })
            .collect();
        rec.surplus = surplus;
        rec.revenue = revenue;
        rec.category_costs = costs;
        rec.extractive_market_value = surplus;
        rec.extractive_cost = cost;
        rec.extractive_true_value = surplus - cost;
        rec.cumulative_extractive_cost = totals.debt;
        rec.extractive_indices = indices;
        rec.regen_indices = indices;
        rec.regen_external_cost = cost;
        rec.cumulative_gap = -totals.debt;
        rec.net_system_balance = -totals.debt;
        records.push(rec);
    }
    debug!(years = records.len(), debt = totals.debt, "retropolation done");
    records
}
