#![deny(warnings)]

//! Market data collaborator: supplies the historical series the engine runs
//! on, with a TTL cache and a deterministic fallback to the reference dataset.

mod cache;
mod csv_source;

pub use cache::{CacheKey, CachedProvider, Clock, SystemClock, DEFAULT_TTL_SECS};
pub use csv_source::{parse_history, CsvHistoryProvider, COMBINED_TICKER};

use ledger_core::reference::{reference_series, tracked_tickers};
use ledger_core::{HistoricalSeries, Ticker};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

/// Fewer observed years than this and the reference dataset is used instead.
pub const MIN_OBSERVED_YEARS: usize = 3;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("io error on {path}: {message}")]
    Io { path: String, message: String },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing column: {0}")]
    MissingColumn(&'static str),
    #[error("line {line}: invalid year {raw:?}")]
    InvalidYear { line: usize, raw: String },
    #[error("line {line}: empty ticker")]
    EmptyTicker { line: usize },
}

/// Why a provider could not supply a series.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum UnavailableReason {
    /// The source answered with no rows for the requested tickers.
    Empty,
    /// Too few observed years to anchor a run.
    TooShort { years: usize },
    /// The source failed; carries the rendered error.
    Failed(String),
}

impl std::fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnavailableReason::Empty => f.write_str("no rows"),
            UnavailableReason::TooShort { years } => write!(f, "only {years} observed year(s)"),
            UnavailableReason::Failed(e) => write!(f, "source failed: {e}"),
        }
    }
}

/// Result of one fetch. Providers never panic and never return partial errors.
#[derive(Clone, Debug, PartialEq)]
pub enum ProviderOutcome {
    Available(HistoricalSeries),
    Unavailable(UnavailableReason),
}

impl ProviderOutcome {
    pub fn is_available(&self) -> bool {
        matches!(self, ProviderOutcome::Available(_))
    }
}

/// Source of historical observations for a set of tickers.
pub trait HistoryProvider {
    /// Short label for logs and run reports.
    fn name(&self) -> &str;

    /// Fetch observations for `tickers`. An empty slice means all tickers the
    /// source knows.
    fn fetch(&self, tickers: &[Ticker]) -> ProviderOutcome;
}

impl<P: HistoryProvider + ?Sized> HistoryProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch(&self, tickers: &[Ticker]) -> ProviderOutcome {
        (**self).fetch(tickers)
    }
}

/// Serves the built-in reference dataset.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReferenceProvider;

impl HistoryProvider for ReferenceProvider {
    fn name(&self) -> &str {
        "reference"
    }

    fn fetch(&self, tickers: &[Ticker]) -> ProviderOutcome {
        let full = reference_series();
        if tickers.is_empty() {
            return ProviderOutcome::Available(full);
        }
        let mut series = HistoricalSeries::new(tickers.to_vec());
        for (year, row) in full.years() {
            for ticker in tickers {
                if let Some(obs) = row.entities.get(ticker) {
                    series.insert(year, ticker.clone(), *obs);
                }
            }
        }
        if series.is_empty() {
            ProviderOutcome::Unavailable(UnavailableReason::Empty)
        } else {
            ProviderOutcome::Available(series)
        }
    }
}

/// Where a resolved series came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum HistorySource {
    Provider(String),
    Reference(UnavailableReason),
}

/// A series ready for the engine, tagged with its origin.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedHistory {
    pub series: HistoricalSeries,
    pub source: HistorySource,
}

impl ResolvedHistory {
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, HistorySource::Reference(_))
    }
}

/// Ask `provider` for `tickers` and fall back to the reference dataset when it
/// is unavailable or covers fewer than [`MIN_OBSERVED_YEARS`] years.
pub fn resolve_history<P: HistoryProvider + ?Sized>(provider: &P, tickers: &[Ticker]) -> ResolvedHistory {
    let reason = match provider.fetch(tickers) {
        ProviderOutcome::Available(series) if series.len() >= MIN_OBSERVED_YEARS => {
            info!(
                provider = provider.name(),
                years = series.len(),
                first = series.first_year(),
                last = series.last_year(),
                "historical series resolved"
            );
            return ResolvedHistory {
                series,
                source: HistorySource::Provider(provider.name().to_string()),
            };
        }
        ProviderOutcome::Available(series) => UnavailableReason::TooShort { years: series.len() },
        ProviderOutcome::Unavailable(reason) => reason,
    };
    warn!(provider = provider.name(), %reason, "provider unavailable, using reference data");
    ResolvedHistory {
        series: reference_series(),
        source: HistorySource::Reference(reason),
    }
}

/// Tickers tracked by default.
pub fn default_tickers() -> Vec<Ticker> {
    tracked_tickers()
}
