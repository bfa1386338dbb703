//! Flat tabular view of a ledger: one row per year, one column per field.

use ledger_core::{IndexTriple, Ticker, YearRecord};
use ledger_engine::ExternalityCategory;

/// Scalar columns following the per-entity and per-category blocks, in order.
const SCALAR_COLUMNS: [&str; 25] = [
    "extractive_market_value",
    "extractive_cost",
    "extractive_true_value",
    "cumulative_extractive_cost",
    "ext_ehi",
    "ext_hri",
    "ext_iri",
    "regen_retained",
    "matrix_capital",
    "matrix_metamorphosis",
    "wellness_total",
    "regen_value",
    "regen_annual_creation",
    "cumulative_regen_value",
    "regen_ehi",
    "regen_hri",
    "regen_iri",
    "regen_external_cost",
    "dialysis_throughput",
    "dialysis_rate",
    "alpha",
    "delta_abs",
    "delta_pct",
    "cumulative_gap",
    "net_system_balance",
];

/// Column layout for a set of records.
#[derive(Clone, Debug, PartialEq)]
pub struct FlatTable {
    tickers: Vec<Ticker>,
}

impl FlatTable {
    /// Layout covering every entity that appears in `records`, in order of
    /// first appearance.
    pub fn for_records(records: &[YearRecord]) -> Self {
        let mut tickers: Vec<Ticker> = Vec::new();
        for e in records.iter().flat_map(|r| r.entities.iter()) {
            if !tickers.contains(&e.ticker) {
                tickers.push(e.ticker.clone());
            }
        }
        Self { tickers }
    }

    pub fn tickers(&self) -> &[Ticker] {
        &self.tickers
    }

    pub fn header(&self) -> Vec<String> {
        let mut cols = vec!["year".to_string(), "phase".to_string()];
        for t in &self.tickers {
            cols.push(format!("{t}_price"));
            cols.push(format!("{t}_net_income"));
            cols.push(format!("{t}_revenue"));
        }
        cols.push("surplus".into());
        cols.push("revenue".into());
        cols.extend(ExternalityCategory::ALL.iter().map(|c| format!("cost_{}", c.key())));
        cols.extend(SCALAR_COLUMNS.iter().map(|c| c.to_string()));
        cols
    }

    /// Cells of one record. Entities missing from the record read as zero.
    pub fn row(&self, r: &YearRecord) -> Vec<String> {
        let mut cells = vec![r.year.to_string(), r.phase.as_str().to_string()];
        for t in &self.tickers {
            match r.entities.iter().find(|e| &e.ticker == t) {
                Some(e) => {
                    cells.push(num(e.price));
                    cells.push(num(e.net_income));
                    cells.push(num(e.revenue));
                }
                None => cells.extend(std::iter::repeat(num(0.0)).take(3)),
            }
        }
        cells.push(num(r.surplus));
        cells.push(num(r.revenue));
        cells.extend(r.category_costs.0.iter().map(|v| num(*v)));

        let scalars = [r.extractive_market_value, r.extractive_cost, r.extractive_true_value, r.cumulative_extractive_cost];
        cells.extend(scalars.iter().map(|v| num(*v)));
        push_indices(&mut cells, &r.extractive_indices);
        let scalars = [
            r.regen_retained,
            r.matrix_capital,
            r.matrix_metamorphosis,
            r.wellness_total,
            r.regen_value,
            r.regen_annual_creation,
            r.cumulative_regen_value,
        ];
        cells.extend(scalars.iter().map(|v| num(*v)));
        push_indices(&mut cells, &r.regen_indices);
        let scalars = [
            r.regen_external_cost,
            r.dialysis_throughput,
            r.dialysis_rate,
            r.alpha,
            r.delta_abs,
            r.delta_pct,
            r.cumulative_gap,
            r.net_system_balance,
        ];
        cells.extend(scalars.iter().map(|v| num(*v)));
        cells
    }
}

fn push_indices(cells: &mut Vec<String>, i: &IndexTriple) {
    cells.push(num(i.ecological));
    cells.push(num(i.social));
    cells.push(num(i.institutional));
}

// Shortest representation that reads back to the same f64.
fn num(v: f64) -> String {
    v.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_core::reference::reference_series;
    use ledger_core::{Phase, ScenarioParams};
    use ledger_engine::simulate;

    #[test]
    fn header_and_rows_align() {
        let recs = simulate(&reference_series(), &ScenarioParams::default());
        let table = FlatTable::for_records(&recs);
        assert_eq!(table.tickers().len(), 5);
        let header = table.header();
        assert_eq!(header.len(), 2 + 5 * 3 + 2 + 8 + SCALAR_COLUMNS.len());
        for r in &recs {
            assert_eq!(table.row(r).len(), header.len());
        }
        assert_eq!(header[2], "BLK_price");
        assert!(header.contains(&"cost_climate".to_string()));
    }

    #[test]
    fn values_read_back_exactly() {
        let recs = simulate(&reference_series(), &ScenarioParams::default());
        let table = FlatTable::for_records(&recs);
        let header = table.header();
        let col = |name: &str| header.iter().position(|h| h == name).unwrap();
        let last = recs.last().unwrap();
        let row = table.row(last);
        assert_eq!(row[col("phase")], "Projection");
        assert_eq!(row[col("cumulative_gap")].parse::<f64>().unwrap(), last.cumulative_gap);
        assert_eq!(row[col("regen_iri")].parse::<f64>().unwrap(), last.regen_indices.institutional);
        assert_eq!(row[col("alpha")].parse::<f64>().unwrap(), last.alpha);
    }

    #[test]
    fn missing_entity_cells_are_zero() {
        let mut a = YearRecord::zeroed(2000, Phase::Retropolation);
        a.entities.push(ledger_core::EntityFigures {
            ticker: Ticker::from("A"),
            price: 1.0,
            net_income: 2.0,
            revenue: 3.0,
        });
        let b = YearRecord::zeroed(2001, Phase::Retropolation);
        let table = FlatTable::for_records(&[a.clone(), b.clone()]);
        assert_eq!(&table.row(&a)[2..5], &["1", "2", "3"]);
        assert_eq!(&table.row(&b)[2..5], &["0", "0", "0"]);
    }
}
