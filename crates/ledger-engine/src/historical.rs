//! Historical pass over observed years.
//!
//! Costs use today's index levels for every observed year rather than
//! interpolating toward the retropolated values, so index trajectories jump
//! at the retropolation/history boundary.

use crate::externality::category_costs;
use crate::ledger::RunningTotals;
use ledger_core::{EntityFigures, HistoricalSeries, IndexTriple, Phase, YearObservation, YearRecord};
use tracing::debug;

/// One record per year from the first to the last observed year. Years with
/// no observation in between read as zero.
pub fn historical_pass(
    history: &HistoricalSeries,
    today: &IndexTriple,
    totals: &mut RunningTotals,
) -> Vec<YearRecord> {
    let (Some(first), Some(last)) = (history.first_year(), history.last_year()) else {
        return Vec::new();
    };
    let empty = YearObservation::default();
    let tickers = history.tickers();
    let mut records = Vec::with_capacity((last - first + 1) as usize);

    for year in first..=last {
        let row = history.get(year).unwrap_or(&empty);
        let entities: Vec<EntityFigures> = tickers
            .iter()
            .map(|t| EntityFigures {
                ticker: t.clone(),
                price: row.price(t),
                net_income: row.net_income(t),
                revenue: row.revenue(t),
            })
            .collect();
        let surplus = row.summed_net_income(tickers);
        let revenue = row.summed_revenue(tickers);

        let costs = category_costs(revenue, today);
        let cost = costs.total();
        totals.debt += cost;

        let mut rec = YearRecord::zeroed(year, Phase::Historical);
        rec.entities = entities;
        rec.surplus = surplus;
        rec.revenue = revenue;
        rec.category_costs = costs;
        rec.extractive_market_value = surplus;
        rec.extractive_cost = cost;
        rec.extractive_true_value = surplus - cost;
        rec.cumulative_extractive_cost = totals.debt;
        rec.extractive_indices = *today;
        // Mirror of a 50/50 split; regenerative accounting starts with projection.
        rec.regen_retained = surplus * 0.5;
        rec.matrix_capital = surplus * 0.5;
        rec.regen_value = surplus;
        rec.regen_indices = *today;
        rec.regen_external_cost = cost;
        rec.cumulative_gap = -totals.debt;
        rec.net_system_balance = -totals.debt;
        records.push(rec);
    }
    debug!(years = records.len(), debt = totals.debt, "historical pass done");
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_core::{EntityObservation, Ticker};

    fn series() -> HistoricalSeries {
        let mut s = HistoricalSeries::new(vec![Ticker::from("A"), Ticker::from("B")]);
        s.insert(2021, Ticker::from("A"), EntityObservation::new(10.0, 4.0e9, 10.0e9));
        s.insert(2021, Ticker::from("B"), EntityObservation::new(20.0, 2.0e9, 6.0e9));
        s.insert(2023, Ticker::from("A"), EntityObservation::new(11.0, 5.0e9, 12.0e9));
        s
    }

    #[test]
    fn sums_entities_and_uses_today_indices() {
        let mut totals = RunningTotals {
            debt: 100.0,
            regen: 0.0,
        };
        let today = IndexTriple::uniform(0.5);
        let recs = historical_pass(&series(), &today, &mut totals);
        let r = &recs[0];
        assert_eq!(r.year, 2021);
        assert_eq!(r.surplus, 6.0e9);
        assert_eq!(r.revenue, 16.0e9);
        assert_eq!(r.extractive_indices, today);
        assert_eq!(r.cumulative_extractive_cost, 100.0 + r.extractive_cost);
        assert_eq!(r.matrix_capital, 3.0e9);
        assert_eq!(r.regen_value, 6.0e9);
        assert_eq!(r.cumulative_regen_value, 0.0);
        assert_eq!(r.cumulative_gap, -r.cumulative_extractive_cost);
    }

    #[test]
    fn reported_aggregate_does_not_override_entity_sums() {
        let mut s = series();
        s.set_combined(2021, Some(1.0e9), Some(1.0e9));
        let today = IndexTriple::uniform(0.5);
        let recs = historical_pass(&s, &today, &mut RunningTotals::default());
        let r = &recs[0];
        assert_eq!(r.surplus, 6.0e9);
        assert_eq!(r.revenue, 16.0e9);
        let entity_ni: f64 = r.entities.iter().map(|e| e.net_income).sum();
        let entity_rev: f64 = r.entities.iter().map(|e| e.revenue).sum();
        assert_eq!(r.surplus, entity_ni);
        assert_eq!(r.revenue, entity_rev);
        assert_eq!(r.extractive_cost, category_costs(16.0e9, &today).total());
    }

    #[test]
    fn gap_years_are_zero_rows() {
        let mut totals = RunningTotals::default();
        let recs = historical_pass(&series(), &IndexTriple::uniform(0.5), &mut totals);
        let years: Vec<i32> = recs.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2021, 2022, 2023]);
        assert_eq!(recs[1].revenue, 0.0);
        assert_eq!(recs[1].extractive_cost, 0.0);
        assert_eq!(recs[1].entities.len(), 2);
        assert_eq!(recs[1].cumulative_extractive_cost, recs[0].cumulative_extractive_cost);
        // Missing entity in 2023 fails soft to zero.
        assert_eq!(recs[2].entities[1].revenue, 0.0);
    }

    #[test]
    fn empty_series_yields_nothing() {
        let mut totals = RunningTotals::default();
        let recs = historical_pass(&HistoricalSeries::default(), &IndexTriple::uniform(0.5), &mut totals);
        assert!(recs.is_empty());
    }
}
