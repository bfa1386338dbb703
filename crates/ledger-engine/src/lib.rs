#![deny(warnings)]

//! Simulation engine for the matrix ledger.
//!
//! A run is a pure function of a historical series and a parameter set. It
//! produces one [`YearRecord`](ledger_core::YearRecord) per year in three
//! strictly ordered phases:
//! - retropolation of estimated pre-history ([`retro`])
//! - the observed history ([`historical`])
//! - the extractive vs regenerative projection ([`projection`])
//!
//! The only state carried between phases is the cumulative externality debt
//! and the regenerative index triple.

pub mod externality;
pub mod historical;
pub mod ledger;
pub mod projection;
pub mod retro;
pub mod summary;

pub use externality::{category_costs, cost, ExternalityCategory, TOTAL_RATE};
pub use ledger::{simulate, RunningTotals};
pub use projection::DualPathProjector;
pub use summary::{fmt_usd, LedgerSummary};
