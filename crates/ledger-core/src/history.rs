//! Historical input series: observed per-entity financials by year.

use crate::{coerce_f64, Ticker};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// One entity's reported figures for one year. `None` = not observed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityObservation {
    pub price: Option<f64>,
    pub net_income: Option<f64>,
    pub revenue: Option<f64>,
}

impl EntityObservation {
    pub fn new(price: f64, net_income: f64, revenue: f64) -> Self {
        Self {
            price: Some(price),
            net_income: Some(net_income),
            revenue: Some(revenue),
        }
    }
}

/// All observations for one year, plus optional reported aggregates.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct YearObservation {
    pub entities: BTreeMap<Ticker, EntityObservation>,
    /// Reported combined net income; overrides the per-entity sum when set.
    pub combined_net_income: Option<f64>,
    /// Reported combined revenue; overrides the per-entity sum when set.
    pub combined_revenue: Option<f64>,
}

impl YearObservation {
    pub fn entity(&self, ticker: &Ticker) -> EntityObservation {
        self.entities.get(ticker).copied().unwrap_or_default()
    }

    /// Price for `ticker`, zero when unknown.
    pub fn price(&self, ticker: &Ticker) -> f64 {
        coerce_f64(self.entity(ticker).price, 0.0)
    }

    /// Net income for `ticker`, zero when unknown.
    pub fn net_income(&self, ticker: &Ticker) -> f64 {
        coerce_f64(self.entity(ticker).net_income, 0.0)
    }

    /// Revenue for `ticker`, zero when unknown.
    pub fn revenue(&self, ticker: &Ticker) -> f64 {
        coerce_f64(self.entity(ticker).revenue, 0.0)
    }

    /// Sum of per-entity net income over `tickers`.
    pub fn summed_net_income(&self, tickers: &[Ticker]) -> f64 {
        tickers.iter().map(|t| self.net_income(t)).sum()
    }

    /// Sum of per-entity revenue over `tickers`.
    pub fn summed_revenue(&self, tickers: &[Ticker]) -> f64 {
        tickers.iter().map(|t| self.revenue(t)).sum()
    }

    /// Reported combined net income, else the sum over `tickers`.
    pub fn combined_net_income(&self, tickers: &[Ticker]) -> f64 {
        coerce_f64(self.combined_net_income, self.summed_net_income(tickers))
    }

    /// Reported combined revenue, else the sum over `tickers`.
    pub fn combined_revenue(&self, tickers: &[Ticker]) -> f64 {
        coerce_f64(self.combined_revenue, self.summed_revenue(tickers))
    }
}

/// Ordered mapping year -> observations for a fixed set of tracked tickers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSeries {
    tickers: Vec<Ticker>,
    years: BTreeMap<i32, YearObservation>,
}

impl HistoricalSeries {
    pub fn new(tickers: Vec<Ticker>) -> Self {
        Self {
            tickers,
            years: BTreeMap::new(),
        }
    }

    /// Tracked tickers, in display order.
    pub fn tickers(&self) -> &[Ticker] {
        &self.tickers
    }

    /// Record an entity observation, registering unseen tickers at the end.
    pub fn insert(&mut self, year: i32, ticker: Ticker, obs: EntityObservation) {
        if !self.tickers.contains(&ticker) {
            self.tickers.push(ticker.clone());
        }
        self.years.entry(year).or_default().entities.insert(ticker, obs);
    }

    /// Record reported aggregates for a year.
    pub fn set_combined(&mut self, year: i32, net_income: Option<f64>, revenue: Option<f64>) {
        let row = self.years.entry(year).or_default();
        row.combined_net_income = net_income;
        row.combined_revenue = revenue;
    }

    pub fn get(&self, year: i32) -> Option<&YearObservation> {
        self.years.get(&year)
    }

    /// Observed years in ascending order.
    pub fn years(&self) -> impl Iterator<Item = (i32, &YearObservation)> {
        self.years.iter().map(|(y, o)| (*y, o))
    }

    /// Last observed year with its observations.
    pub fn last_observation(&self) -> Option<(i32, &YearObservation)> {
        self.years.iter().next_back().map(|(y, o)| (*y, o))
    }

    /// Keep only the years for which `keep` holds. Returns how many were dropped.
    pub fn retain_years<F: FnMut(i32) -> bool>(&mut self, mut keep: F) -> usize {
        let before = self.years.len();
        self.years.retain(|y, _| keep(*y));
        before - self.years.len()
    }

    pub fn first_year(&self) -> Option<i32> {
        self.years.keys().next().copied()
    }

    pub fn last_year(&self) -> Option<i32> {
        self.years.keys().next_back().copied()
    }

    /// Number of observed years.
    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Fill missing per-entity cells from the previous observed year.
    ///
    /// Returns the number of cells filled.
    pub fn forward_fill(&mut self) -> usize {
        let mut last: BTreeMap<Ticker, EntityObservation> = BTreeMap::new();
        let mut filled = 0;
        for row in self.years.values_mut() {
            for ticker in &self.tickers {
                let prev = last.get(ticker).copied().unwrap_or_default();
                let cur = row.entities.entry(ticker.clone()).or_default();
                filled += fill_cell(&mut cur.price, prev.price);
                filled += fill_cell(&mut cur.net_income, prev.net_income);
                filled += fill_cell(&mut cur.revenue, prev.revenue);
                last.insert(ticker.clone(), *cur);
            }
        }
        debug!(filled, years = self.years.len(), "forward-filled historical series");
        filled
    }
}

fn fill_cell(cell: &mut Option<f64>, prev: Option<f64>) -> usize {
    let missing = !cell.map(f64::is_finite).unwrap_or(false);
    match (missing, prev) {
        (true, Some(p)) if p.is_finite() => {
            *cell = Some(p);
            1
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blk() -> Ticker {
        Ticker::from("BLK")
    }

    fn stt() -> Ticker {
        Ticker::from("STT")
    }

    #[test]
    fn combined_sums_entities_unless_reported() {
        let mut s = HistoricalSeries::new(vec![blk(), stt()]);
        s.insert(2021, blk(), EntityObservation::new(700.0, 5.0e9, 19.0e9));
        s.insert(2021, stt(), EntityObservation::new(90.0, 2.0e9, 12.0e9));
        let row = s.get(2021).unwrap();
        assert_eq!(row.combined_net_income(s.tickers()), 7.0e9);
        assert_eq!(row.combined_revenue(s.tickers()), 31.0e9);

        s.set_combined(2021, Some(12.0e9), None);
        let row = s.get(2021).unwrap();
        assert_eq!(row.combined_net_income(s.tickers()), 12.0e9);
        assert_eq!(row.combined_revenue(s.tickers()), 31.0e9);
        // reported aggregates never leak into the per-entity sums
        assert_eq!(row.summed_net_income(s.tickers()), 7.0e9);
        assert_eq!(row.summed_revenue(s.tickers()), 31.0e9);
    }

    #[test]
    fn missing_cells_read_as_zero() {
        let mut s = HistoricalSeries::new(vec![blk()]);
        s.insert(
            2022,
            blk(),
            EntityObservation {
                price: None,
                net_income: Some(f64::NAN),
                revenue: Some(1.0),
            },
        );
        let row = s.get(2022).unwrap();
        assert_eq!(row.price(&blk()), 0.0);
        assert_eq!(row.net_income(&blk()), 0.0);
        assert_eq!(row.revenue(&blk()), 1.0);
        assert_eq!(row.price(&stt()), 0.0);
    }

    #[test]
    fn forward_fill_copies_previous_year() {
        let mut s = HistoricalSeries::new(vec![blk()]);
        s.insert(2021, blk(), EntityObservation::new(700.0, 5.0e9, 19.0e9));
        s.insert(
            2022,
            blk(),
            EntityObservation {
                price: Some(600.0),
                net_income: None,
                revenue: Some(f64::NAN),
            },
        );
        assert_eq!(s.forward_fill(), 2);
        let row = s.get(2022).unwrap();
        assert_eq!(row.price(&blk()), 600.0);
        assert_eq!(row.net_income(&blk()), 5.0e9);
        assert_eq!(row.revenue(&blk()), 19.0e9);
    }

    #[test]
    fn year_bounds_and_order() {
        let mut s = HistoricalSeries::new(vec![]);
        assert!(s.is_empty());
        s.insert(2024, blk(), EntityObservation::default());
        s.insert(2021, stt(), EntityObservation::default());
        assert_eq!(s.first_year(), Some(2021));
        assert_eq!(s.last_year(), Some(2024));
        assert_eq!(s.tickers(), &[blk(), stt()]);
        let years: Vec<i32> = s.years().map(|(y, _)| y).collect();
        assert_eq!(years, vec![2021, 2024]);
        assert_eq!(s.last_observation().map(|(y, _)| y), Some(2024));
    }

    #[test]
    fn retain_years_drops_and_counts() {
        let mut s = HistoricalSeries::new(vec![blk()]);
        for y in [1800, 2021, 2022, i32::MAX] {
            s.insert(y, blk(), EntityObservation::default());
        }
        assert_eq!(s.retain_years(|y| (1900..=2200).contains(&y)), 2);
        assert_eq!(s.first_year(), Some(2021));
        assert_eq!(s.last_year(), Some(2022));
        assert_eq!(s.tickers(), &[blk()]);
    }
}
