//! Headline figures of a finished ledger.

use ledger_core::{IndexTriple, Phase, YearRecord};
use serde::Serialize;

/// Key figures read off a ledger.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LedgerSummary {
    pub first_year: i32,
    pub last_observed_year: i32,
    pub horizon_year: i32,
    /// Debt accumulated through the last non-projected year.
    pub legacy_debt: f64,
    pub cumulative_debt: f64,
    pub cumulative_regen_value: f64,
    pub cumulative_gap: f64,
    pub net_system_balance: f64,
    pub final_extractive_cost: f64,
    pub final_true_value: f64,
    pub final_regen_value: f64,
    pub final_delta_abs: f64,
    pub final_delta_pct: f64,
    pub final_extractive_indices: IndexTriple,
    pub final_regen_indices: IndexTriple,
}

impl LedgerSummary {
    /// `None` for an empty ledger.
    pub fn from_records(records: &[YearRecord]) -> Option<Self> {
        let first = records.first()?;
        let last = records.last()?;
        let last_past = records
            .iter()
            .rev()
            .find(|r| r.phase != Phase::Projection)
            .unwrap_or(first);
        Some(Self {
            first_year: first.year,
            last_observed_year: last_past.year,
            horizon_year: last.year,
            legacy_debt: last_past.cumulative_extractive_cost,
            cumulative_debt: last.cumulative_extractive_cost,
            cumulative_regen_value: last.cumulative_regen_value,
            cumulative_gap: last.cumulative_gap,
            net_system_balance: last.net_system_balance,
            final_extractive_cost: last.extractive_cost,
            final_true_value: last.extractive_true_value,
            final_regen_value: last.regen_value,
            final_delta_abs: last.delta_abs,
            final_delta_pct: last.delta_pct,
            final_extractive_indices: last.extractive_indices,
            final_regen_indices: last.regen_indices,
        })
    }
}

/// Relative change of an index against its starting level, in percent.
pub fn index_change_pct(value: f64, start: f64) -> f64 {
    (value / start.max(0.01) - 1.0) * 100.0
}

/// Compact USD amount: "$1.23 T", "$4.56 B", "$7.8 M", "$950".
/// Non-finite input renders as "$0".
pub fn fmt_usd(v: f64) -> String {
    if !v.is_finite() {
        return "$0".to_string();
    }
    let a = v.abs();
    if a >= 1e12 {
        format!("${:.2} T", v / 1e12)
    } else if a >= 1e9 {
        format!("${:.2} B", v / 1e9)
    } else if a >= 1e6 {
        format!("${:.1} M", v / 1e6)
    } else {
        format!("${:.0}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulate;
    use ledger_core::reference::reference_series;
    use ledger_core::ScenarioParams;

    #[test]
    fn usd_formatting() {
        assert_eq!(fmt_usd(1.5e12), "$1.50 T");
        assert_eq!(fmt_usd(-2.5e9), "$-2.50 B");
        assert_eq!(fmt_usd(7.84e6), "$7.8 M");
        assert_eq!(fmt_usd(950.0), "$950");
        assert_eq!(fmt_usd(f64::NAN), "$0");
    }

    #[test]
    fn summary_reads_final_and_legacy_rows() {
        let recs = simulate(&reference_series(), &ScenarioParams::default());
        let s = LedgerSummary::from_records(&recs).unwrap();
        assert_eq!(s.first_year, 1996);
        assert_eq!(s.last_observed_year, 2025);
        assert_eq!(s.horizon_year, 2035);
        assert!(s.legacy_debt > 0.0);
        assert!(s.cumulative_debt > s.legacy_debt);
        assert!(s.cumulative_regen_value > 0.0);
        assert_eq!(s.cumulative_gap, s.cumulative_debt + s.cumulative_regen_value);
    }

    #[test]
    fn empty_ledger_has_no_summary() {
        assert!(LedgerSummary::from_records(&[]).is_none());
    }

    #[test]
    fn index_change() {
        assert_eq!(index_change_pct(0.6, 0.5), (0.6 / 0.5 - 1.0) * 100.0);
        assert!(index_change_pct(0.5, 0.0).is_finite());
    }
}
