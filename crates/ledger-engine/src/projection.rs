//! Dual-path projector.
//!
//! Both paths start from the same surplus each year. The extractive path keeps
//! everything and lets its indices decay; the regenerative path diverts half
//! into matrix capital, which is leveraged and nudges its indices toward 1.

use crate::externality::category_costs;
use crate::ledger::RunningTotals;
use ledger_core::{
    EntityFigures, HistoricalSeries, IndexTriple, Phase, ScenarioParams, Ticker, YearRecord,
};
use tracing::debug;

/// Projected revenue per unit of projected net income.
pub const REVENUE_MULTIPLIER: f64 = 3.2;
/// Share of surplus diverted into matrix capital.
pub const MATRIX_SHARE: f64 = 0.5;
/// Lower bound for extractive indices.
pub const EXTRACTIVE_FLOOR: f64 = 0.02;
/// Relative decay speed of the social and institutional indices.
pub const SOCIAL_DECAY_FACTOR: f64 = 0.8;
pub const INSTITUTIONAL_DECAY_FACTOR: f64 = 0.5;
/// Scale of the logarithmic allocation impact.
pub const IMPACT_SCALE: f64 = 0.04;
/// Fixed yearly institutional improvement on the regenerative path.
pub const INSTITUTIONAL_DRIFT: f64 = 0.008;
/// Wellness value per unit of allocated capital at full index health.
pub const WELLNESS_MULTIPLIER: f64 = 2.5;
/// Price growth relative to surplus growth.
pub const PRICE_GROWTH_FACTOR: f64 = 0.6;
/// Price assumed when an entity's last price is unknown.
pub const DEFAULT_PRICE: f64 = 50.0;

/// Extractive path state: indices decaying geometrically to a floor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExtractivePath {
    pub indices: IndexTriple,
}

impl ExtractivePath {
    /// Ecology decays fastest, institutions slowest.
    pub fn advance(&mut self, ext_degrad: f64) {
        let i = &mut self.indices;
        i.ecological = (i.ecological * (1.0 - ext_degrad)).max(EXTRACTIVE_FLOOR);
        i.social = (i.social * (1.0 - ext_degrad * SOCIAL_DECAY_FACTOR)).max(EXTRACTIVE_FLOOR);
        i.institutional =
            (i.institutional * (1.0 - ext_degrad * INSTITUTIONAL_DECAY_FACTOR)).max(EXTRACTIVE_FLOOR);
    }
}

/// Saturating impact of an allocation on its bound index.
pub fn allocation_impact(allocation: f64, scale: f64) -> f64 {
    IMPACT_SCALE * (allocation / scale).max(0.0).ln_1p()
}

/// Move `index` toward 1 by `impact` of the remaining distance.
pub fn nudge(index: f64, impact: f64) -> f64 {
    (index + impact * (1.0 - index)).min(1.0)
}

/// Regenerative path state: indices improving with allocated capital.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegenerativePath {
    pub indices: IndexTriple,
}

/// Flows of one regenerative year.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RegenerativeYear {
    pub retained: f64,
    pub matrix_capital: f64,
    pub dialysis_rate: f64,
    pub dialysis_throughput: f64,
    pub alpha: f64,
    pub metamorphosis: f64,
    pub wellness: f64,
    pub value: f64,
}

impl RegenerativePath {
    /// Dialysis rate, throttled by the healthier of ecology and society and
    /// scaled by institutional integrity.
    pub fn dialysis_rate(&self, dr_0: f64, beta: f64) -> f64 {
        let i = &self.indices;
        dr_0 * (1.0 - beta * i.ecological.max(i.social)) * i.institutional
    }

    /// Advance one year with surplus `surplus`. `impact_scale` normalizes
    /// allocations against the last observed surplus.
    pub fn advance(&mut self, surplus: f64, params: &ScenarioParams, impact_scale: f64) -> RegenerativeYear {
        let q = MATRIX_SHARE * surplus;
        let retained = surplus - q;
        let dr = self.dialysis_rate(params.dr_0, params.beta);
        let throughput = dr * q;
        let alpha = if params.dr_0 > 0.0 {
            1.0 + params.gamma * (dr / params.dr_0)
        } else {
            1.0
        };
        let mq = alpha * q;
        let q_b = params.q_b_share * q;
        let q_h = (1.0 - params.q_b_share) * q;

        let i = &mut self.indices;
        i.ecological = nudge(i.ecological, allocation_impact(q_b, impact_scale));
        i.social = nudge(i.social, allocation_impact(q_h, impact_scale));
        i.institutional = nudge(i.institutional, INSTITUTIONAL_DRIFT);

        let mw_b = q_b * i.ecological * WELLNESS_MULTIPLIER;
        let mw_h = q_h * i.social * WELLNESS_MULTIPLIER;
        let wellness = mw_b + mw_h;

        RegenerativeYear {
            retained,
            matrix_capital: q,
            dialysis_rate: dr,
            dialysis_throughput: throughput,
            alpha,
            metamorphosis: mq,
            wellness,
            value: retained + mq + wellness,
        }
    }
}

/// Per-entity distribution of projected surplus.
#[derive(Clone, Debug, PartialEq)]
struct EntityBase {
    ticker: Ticker,
    share: f64,
    price: f64,
}

/// Advances both paths year by year from the last observed year.
#[derive(Clone, Debug)]
pub struct DualPathProjector {
    params: ScenarioParams,
    base_year: i32,
    last_ni: f64,
    impact_scale: f64,
    entities: Vec<EntityBase>,
    extractive: ExtractivePath,
    regenerative: RegenerativePath,
}

impl DualPathProjector {
    /// Set up from the last observed year of `history`.
    pub fn new(history: &HistoricalSeries, base_year: i32, last_ni: f64, params: &ScenarioParams) -> Self {
        let tickers = history.tickers();
        let (incomes, prices): (Vec<f64>, Vec<f64>) = match history.get(base_year) {
            Some(row) => tickers
                .iter()
                .map(|t| (row.net_income(t), row.price(t)))
                .unzip(),
            None => (vec![0.0; tickers.len()], vec![0.0; tickers.len()]),
        };
        let total: f64 = incomes.iter().sum();
        let entities = tickers
            .iter()
            .zip(incomes.iter().zip(prices.iter()))
            .map(|(t, (ni, price))| EntityBase {
                ticker: t.clone(),
                share: if total != 0.0 {
                    ni / total
                } else {
                    1.0 / tickers.len() as f64
                },
                price: if *price != 0.0 { *price } else { DEFAULT_PRICE },
            })
            .collect();
        let start = params.starting_indices();
        Self {
            params: params.clone(),
            base_year,
            last_ni,
            impact_scale: (last_ni * 0.5 + 1.0).max(1.0),
            entities,
            extractive: ExtractivePath { indices: start },
            regenerative: RegenerativePath { indices: start },
        }
    }

    /// Project year `base_year + step` (`step` starts at 1). Steps must be
    /// taken in ascending order.
    pub fn step(&mut self, step: u32, totals: &mut RunningTotals) -> YearRecord {
        let p = &self.params;
        let exp = step as i32;
        let surplus = self.last_ni * (1.0 + p.growth_rate).powi(exp);
        let price_growth = (1.0 + p.growth_rate * PRICE_GROWTH_FACTOR).powi(exp);

        let entities: Vec<EntityFigures> = self
            .entities
            .iter()
            .map(|e| EntityFigures {
                ticker: e.ticker.clone(),
                price: e.price * price_growth,
                net_income: surplus * e.share,
                revenue: surplus * e.share * REVENUE_MULTIPLIER,
            })
            .collect();
        let revenue = if entities.is_empty() {
            surplus * REVENUE_MULTIPLIER
        } else {
            entities.iter().map(|e| e.revenue).sum()
        };

        // Extractive path keeps the whole surplus.
        self.extractive.advance(p.ext_degrad);
        let costs = category_costs(revenue, &self.extractive.indices);
        let ext_cost = costs.total();
        let ext_true = surplus - ext_cost;

        let regen = self.regenerative.advance(surplus, p, self.impact_scale);
        let regen_cost = category_costs(revenue, &self.regenerative.indices).total();

        // Normalized by gross surplus; true value can sit near or below zero.
        let delta_abs = regen.value - ext_true;
        let delta_pct = delta_abs / surplus.max(1.0) * 100.0;

        let annual = (regen.metamorphosis - regen.matrix_capital) + regen.wellness;
        totals.debt += ext_cost;
        totals.regen += annual;

        let mut rec = YearRecord::zeroed(self.base_year + exp, Phase::Projection);
        rec.entities = entities;
        rec.surplus = surplus;
        rec.revenue = revenue;
        rec.category_costs = costs;
        rec.extractive_market_value = surplus;
        rec.extractive_cost = ext_cost;
        rec.extractive_true_value = ext_true;
        rec.cumulative_extractive_cost = totals.debt;
        rec.extractive_indices = self.extractive.indices;
        rec.regen_retained = regen.retained;
        rec.matrix_capital = regen.matrix_capital;
        rec.matrix_metamorphosis = regen.metamorphosis;
        rec.wellness_total = regen.wellness;
        rec.regen_value = regen.value;
        rec.regen_annual_creation = annual;
        rec.cumulative_regen_value = totals.regen;
        rec.regen_indices = self.regenerative.indices;
        rec.regen_external_cost = regen_cost;
        rec.dialysis_throughput = regen.dialysis_throughput;
        rec.dialysis_rate = regen.dialysis_rate;
        rec.alpha = regen.alpha;
        rec.delta_abs = delta_abs;
        rec.delta_pct = delta_pct;
        rec.cumulative_gap = totals.debt + totals.regen;
        rec.net_system_balance = totals.regen - totals.debt;
        rec
    }

    /// Project `years` consecutive years.
    pub fn run(mut self, years: u32, totals: &mut RunningTotals) -> Vec<YearRecord> {
        let records: Vec<YearRecord> = (1..=years).map(|i| self.step(i, totals)).collect();
        debug!(
            years = records.len(),
            last_ni = self.last_ni,
            debt = totals.debt,
            regen = totals.regen,
            "projection done"
        );
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_core::EntityObservation;
    use proptest::prelude::*;

    fn single_entity(ni: f64) -> HistoricalSeries {
        let mut s = HistoricalSeries::new(vec![Ticker::from("A")]);
        s.insert(2021, Ticker::from("A"), EntityObservation::new(100.0, ni, ni * 3.0));
        s
    }

    #[test]
    fn extractive_decay_orders_indices() {
        let mut path = ExtractivePath {
            indices: IndexTriple::uniform(0.5),
        };
        path.advance(0.1);
        let i = path.indices;
        assert!(i.ecological < i.social && i.social < i.institutional);
        assert_eq!(i.ecological, 0.5 * (1.0 - 0.1));
    }

    #[test]
    fn extractive_floor_holds() {
        let mut path = ExtractivePath {
            indices: IndexTriple::uniform(0.03),
        };
        for _ in 0..200 {
            path.advance(0.10);
        }
        assert_eq!(path.indices, IndexTriple::uniform(EXTRACTIVE_FLOOR));
    }

    #[test]
    fn alpha_is_neutral_without_base_rate() {
        let params = ScenarioParams {
            dr_0: 0.0,
            ..ScenarioParams::default()
        };
        let mut path = RegenerativePath {
            indices: IndexTriple::uniform(0.5),
        };
        let y = path.advance(10.0e9, &params, 5.0e9 + 1.0);
        assert_eq!(y.alpha, 1.0);
        assert_eq!(y.metamorphosis, y.matrix_capital);
    }

    #[test]
    fn matrix_capital_is_half_of_surplus() {
        let params = ScenarioParams::default();
        let mut projector = DualPathProjector::new(&single_entity(8.0e9), 2021, 8.0e9, &params);
        let mut totals = RunningTotals::default();
        for i in 1..=5 {
            let r = projector.step(i, &mut totals);
            assert_eq!(r.matrix_capital, 0.5 * r.surplus);
            assert_eq!(r.regen_retained, r.surplus - r.matrix_capital);
            assert_eq!(r.year, 2021 + i as i32);
        }
    }

    #[test]
    fn shares_follow_last_net_income() {
        let mut s = HistoricalSeries::new(vec![Ticker::from("A"), Ticker::from("B")]);
        s.insert(2021, Ticker::from("A"), EntityObservation::new(0.0, 3.0e9, 9.0e9));
        s.insert(2021, Ticker::from("B"), EntityObservation::new(40.0, 1.0e9, 3.0e9));
        let params = ScenarioParams {
            growth_rate: 0.0,
            ..ScenarioParams::default()
        };
        let mut projector = DualPathProjector::new(&s, 2021, 4.0e9, &params);
        let r = projector.step(1, &mut RunningTotals::default());
        assert_eq!(r.entities[0].net_income, 4.0e9 * 0.75);
        assert_eq!(r.entities[1].revenue, 4.0e9 * 0.25 * REVENUE_MULTIPLIER);
        // Unknown price falls back to the default.
        assert_eq!(r.entities[0].price, DEFAULT_PRICE);
        assert_eq!(r.entities[1].price, 40.0);
    }

    #[test]
    fn zero_income_splits_evenly() {
        let mut s = HistoricalSeries::new(vec![Ticker::from("A"), Ticker::from("B")]);
        s.insert(2021, Ticker::from("A"), EntityObservation::default());
        let projector = DualPathProjector::new(&s, 2021, 12.0e9, &ScenarioParams::default());
        assert!(projector.entities.iter().all(|e| e.share == 0.5));
    }

    #[test]
    fn negative_surplus_does_not_produce_nan() {
        let params = ScenarioParams::default();
        let projector = DualPathProjector::new(&single_entity(-5.0e9), 2021, -5.0e9, &params);
        let mut totals = RunningTotals::default();
        let recs = projector.run(10, &mut totals);
        for r in &recs {
            assert!(r.regen_value.is_finite());
            assert!(r.delta_pct.is_finite());
            assert!(r.regen_indices.is_normalized());
        }
    }

    proptest! {
        #[test]
        fn nudge_stays_in_unit_interval(index in 0.0f64..=1.0, impact in 0.0f64..=1.0) {
            let v = nudge(index, impact);
            prop_assert!(v >= index);
            prop_assert!(v <= 1.0);
        }

        #[test]
        fn indices_stay_normalized(
            growth in 0.0f64..=0.15,
            gamma in 0.0f64..=3.0,
            dr in 0.01f64..=0.20,
            beta in 0.0f64..=0.5,
            start in 0.1f64..=0.9,
            qb in 0.0f64..=1.0,
            degrad in 0.01f64..=0.10,
        ) {
            let params = ScenarioParams {
                growth_rate: growth, gamma, dr_0: dr, beta,
                ehi_0: start, hri_0: start, iri_0: start,
                q_b_share: qb, ext_degrad: degrad, proj_years: 20,
            };
            let projector = DualPathProjector::new(&single_entity(12.0e9), 2021, 12.0e9, &params);
            let mut totals = RunningTotals::default();
            let recs = projector.run(20, &mut totals);
            let mut prev_regen = 0.0;
            for r in &recs {
                prop_assert!(r.extractive_indices.is_normalized());
                prop_assert!(r.regen_indices.is_normalized());
                prop_assert!(r.alpha >= 1.0);
                prop_assert!(r.cumulative_regen_value >= prev_regen);
                prev_regen = r.cumulative_regen_value;
            }
        }
    }
}
