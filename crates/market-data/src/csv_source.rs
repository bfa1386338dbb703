//! Long-format CSV history: one row per (year, ticker).
//!
//! Required header columns are `year` and `ticker`; `price`, `net_income` and
//! `revenue` are optional. Blank or non-numeric cells count as unobserved.
//! Rows whose ticker is [`COMBINED_TICKER`] carry the reported aggregates.

use crate::{HistoryProvider, ProviderError, ProviderOutcome, UnavailableReason};
use csv::{ReaderBuilder, StringRecord, Trim};
use ledger_core::{parse_cell, validate_year, EntityObservation, HistoricalSeries, Ticker};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Ticker value marking a row of reported combined figures.
pub const COMBINED_TICKER: &str = "COMBINED";

struct Columns {
    year: usize,
    ticker: usize,
    price: Option<usize>,
    net_income: Option<usize>,
    revenue: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, ProviderError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        Ok(Self {
            year: find("year").ok_or(ProviderError::MissingColumn("year"))?,
            ticker: find("ticker").ok_or(ProviderError::MissingColumn("ticker"))?,
            price: find("price"),
            net_income: find("net_income"),
            revenue: find("revenue"),
        })
    }

    fn cell(record: &StringRecord, idx: Option<usize>) -> Option<f64> {
        idx.and_then(|i| record.get(i)).and_then(parse_cell)
    }
}

/// Parse a long-format history from any reader.
///
/// `tickers` restricts and orders the tracked set; an empty slice keeps every
/// ticker in order of first appearance. The result is forward-filled.
pub fn parse_history<R: Read>(reader: R, tickers: &[Ticker]) -> Result<HistoricalSeries, ProviderError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);
    let cols = Columns::locate(rdr.headers()?)?;

    let mut series = HistoricalSeries::new(tickers.to_vec());
    let mut skipped = 0usize;
    for (idx, result) in rdr.records().enumerate() {
        let record = result?;
        // 1-indexed, plus the header row
        let line = idx + 2;
        let raw_year = record.get(cols.year).unwrap_or("");
        let year: i32 = raw_year.parse().map_err(|_| ProviderError::InvalidYear {
            line,
            raw: raw_year.to_string(),
        })?;
        validate_year(year).map_err(|_| ProviderError::InvalidYear {
            line,
            raw: raw_year.to_string(),
        })?;
        let ticker = record.get(cols.ticker).unwrap_or("");
        if ticker.is_empty() {
            return Err(ProviderError::EmptyTicker { line });
        }

        let net_income = Columns::cell(&record, cols.net_income);
        let revenue = Columns::cell(&record, cols.revenue);
        if ticker.eq_ignore_ascii_case(COMBINED_TICKER) {
            series.set_combined(year, net_income, revenue);
            continue;
        }
        let ticker = Ticker::from(ticker);
        if !tickers.is_empty() && !tickers.contains(&ticker) {
            skipped += 1;
            continue;
        }
        let obs = EntityObservation {
            price: Columns::cell(&record, cols.price),
            net_income,
            revenue,
        };
        series.insert(year, ticker, obs);
    }

    let filled = series.forward_fill();
    debug!(years = series.len(), skipped, filled, "parsed csv history");
    Ok(series)
}

/// Reads history from a CSV file on every fetch.
#[derive(Clone, Debug)]
pub struct CsvHistoryProvider {
    path: PathBuf,
    label: String,
}

impl CsvHistoryProvider {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let label = format!("csv:{}", path.display());
        Self { path, label }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and parse the file.
    pub fn load(&self, tickers: &[Ticker]) -> Result<HistoricalSeries, ProviderError> {
        let file = File::open(&self.path).map_err(|e| ProviderError::Io {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;
        parse_history(file, tickers)
    }
}

impl HistoryProvider for CsvHistoryProvider {
    fn name(&self) -> &str {
        &self.label
    }

    fn fetch(&self, tickers: &[Ticker]) -> ProviderOutcome {
        match self.load(tickers) {
            Ok(series) if series.is_empty() => ProviderOutcome::Unavailable(UnavailableReason::Empty),
            Ok(series) => ProviderOutcome::Available(series),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "csv history unreadable");
                ProviderOutcome::Unavailable(UnavailableReason::Failed(e.to_string()))
            }
        }
    }
}
