#![deny(warnings)]

//! Core domain models and invariants for the matrix ledger.
//!
//! This crate defines the serializable types shared by the engine, the data
//! provider, the exporters and the CLI:
//! - the year-indexed [`YearRecord`] ledger row and its [`Phase`]
//! - the three composite indices ([`IndexKind`], [`IndexTriple`])
//! - scenario parameters with bounds validation ([`ScenarioParams`])
//! - the historical input series ([`HistoricalSeries`])

mod history;
mod params;
pub mod reference;

pub use history::{EntityObservation, HistoricalSeries, YearObservation};
pub use params::{ParamBound, ParamKind, ScenarioParams};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Number of externality categories carried on every record.
pub const CATEGORY_COUNT: usize = 8;

/// Which part of the timeline a record belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Estimated pre-history, before real data begins.
    Retropolation,
    /// Observed years from the historical series.
    Historical,
    /// Dual-path future years.
    Projection,
}

impl Phase {
    /// Stable string form used by tabular exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Retropolation => "Retropolation",
            Phase::Historical => "Historical",
            Phase::Projection => "Projection",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three composite health indices. 1 = fully healthy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexKind {
    /// Ecological health (EHI).
    Ecological,
    /// Human/social health (HRI).
    Social,
    /// Institutional integrity (IRI).
    Institutional,
}

impl IndexKind {
    pub const ALL: [IndexKind; 3] = [
        IndexKind::Ecological,
        IndexKind::Social,
        IndexKind::Institutional,
    ];

    /// Short label, e.g. "EHI".
    pub fn label(&self) -> &'static str {
        match self {
            IndexKind::Ecological => "EHI",
            IndexKind::Social => "HRI",
            IndexKind::Institutional => "IRI",
        }
    }
}

/// One value per index kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexTriple {
    pub ecological: f64,
    pub social: f64,
    pub institutional: f64,
}

impl IndexTriple {
    pub fn new(ecological: f64, social: f64, institutional: f64) -> Self {
        Self {
            ecological,
            social,
            institutional,
        }
    }

    /// Same value for all three indices.
    pub fn uniform(v: f64) -> Self {
        Self::new(v, v, v)
    }

    pub fn get(&self, kind: IndexKind) -> f64 {
        match kind {
            IndexKind::Ecological => self.ecological,
            IndexKind::Social => self.social,
            IndexKind::Institutional => self.institutional,
        }
    }

    /// Whether every index lies within [0,1].
    pub fn is_normalized(&self) -> bool {
        IndexKind::ALL
            .iter()
            .all(|k| (0.0..=1.0).contains(&self.get(*k)))
    }
}

/// Ticker symbol of a tracked entity, e.g. "BLK".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Ticker(pub String);

impl Ticker {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Ticker {
    fn from(s: &str) -> Self {
        Ticker(s.to_string())
    }
}

/// A listed entity whose financials feed the ledger.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackedEntity {
    pub ticker: Ticker,
    /// Display name, e.g. "BlackRock Inc.".
    pub name: String,
    /// Chart colour as hex, consistent across consumers.
    pub color: String,
}

/// Per-entity figures for one year. Zero means unknown.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityFigures {
    pub ticker: Ticker,
    pub price: f64,
    pub net_income: f64,
    pub revenue: f64,
}

/// Externality cost per category, in catalogue order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryCosts(pub [f64; CATEGORY_COUNT]);

impl CategoryCosts {
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }
}

/// One ledger row per calendar year.
///
/// Every field is present in every phase; fields a phase does not produce are
/// zero-filled (with `alpha` = 1) so consumers need no phase-conditional logic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct YearRecord {
    pub year: i32,
    pub phase: Phase,
    /// Per-entity figures in tracked-entity order.
    pub entities: Vec<EntityFigures>,
    /// Combined surplus S (net income).
    pub surplus: f64,
    /// Combined revenue.
    pub revenue: f64,
    pub category_costs: CategoryCosts,
    /// Extractive gross value before externalities.
    pub extractive_market_value: f64,
    /// Total extractive externality cost for the year.
    pub extractive_cost: f64,
    /// Gross value minus total cost.
    pub extractive_true_value: f64,
    /// Running debt since the first retropolated year; never decreases.
    pub cumulative_extractive_cost: f64,
    pub extractive_indices: IndexTriple,
    /// Surplus kept after diverting matrix capital.
    pub regen_retained: f64,
    /// Matrix capital Q.
    pub matrix_capital: f64,
    /// Leveraged matrix value MQ.
    pub matrix_metamorphosis: f64,
    /// Wellness monetization MW.
    pub wellness_total: f64,
    /// Total regenerative value.
    pub regen_value: f64,
    /// Net value created above the base allocation this year.
    pub regen_annual_creation: f64,
    /// Zero until projection starts.
    pub cumulative_regen_value: f64,
    pub regen_indices: IndexTriple,
    /// Residual externality cost under the regenerative indices.
    pub regen_external_cost: f64,
    pub dialysis_throughput: f64,
    pub dialysis_rate: f64,
    pub alpha: f64,
    pub delta_abs: f64,
    pub delta_pct: f64,
    pub cumulative_gap: f64,
    /// Cumulative regenerative value minus cumulative debt.
    pub net_system_balance: f64,
}

impl YearRecord {
    /// A record with every numeric field zero and a neutral leverage factor.
    pub fn zeroed(year: i32, phase: Phase) -> Self {
        Self {
            year,
            phase,
            entities: Vec::new(),
            surplus: 0.0,
            revenue: 0.0,
            category_costs: CategoryCosts::default(),
            extractive_market_value: 0.0,
            extractive_cost: 0.0,
            extractive_true_value: 0.0,
            cumulative_extractive_cost: 0.0,
            extractive_indices: IndexTriple::default(),
            regen_retained: 0.0,
            matrix_capital: 0.0,
            matrix_metamorphosis: 0.0,
            wellness_total: 0.0,
            regen_value: 0.0,
            regen_annual_creation: 0.0,
            cumulative_regen_value: 0.0,
            regen_indices: IndexTriple::default(),
            regen_external_cost: 0.0,
            dialysis_throughput: 0.0,
            dialysis_rate: 0.0,
            alpha: 1.0,
            delta_abs: 0.0,
            delta_pct: 0.0,
            cumulative_gap: 0.0,
            net_system_balance: 0.0,
        }
    }
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A scenario parameter lies outside its documented range.
    #[error("parameter {name} = {value} is out of range [{min}, {max}]")]
    ParamOutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    /// Numeric field must be finite.
    #[error("parameter {0} is not a finite number")]
    NonFinite(&'static str),
    /// Year outside supported range [1900, 2200].
    #[error("year {0} is out of supported range [1900, 2200]")]
    YearOutOfRange(i32),
}

/// Validate a calendar year used as a ledger key.
pub fn validate_year(year: i32) -> Result<(), ValidationError> {
    if !(1900..=2200).contains(&year) {
        return Err(ValidationError::YearOutOfRange(year));
    }
    Ok(())
}

/// Safe float: missing or non-finite values become `default`.
pub fn coerce_f64(v: Option<f64>, default: f64) -> f64 {
    match v {
        Some(f) if f.is_finite() => f,
        _ => default,
    }
}

/// Parse a raw text cell into a number, `None` for blanks, "NaN" and junk.
pub fn parse_cell(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
}
