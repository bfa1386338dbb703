#![deny(warnings)]

//! Export of finished ledgers: a flat CSV with every record field and a JSON
//! document with the run parameters and headline figures.

mod table;

pub use table::FlatTable;

use chrono::{SecondsFormat, Utc};
use ledger_core::reference::describe;
use ledger_core::{ScenarioParams, TrackedEntity, YearRecord};
use ledger_engine::LedgerSummary;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("nothing to export")]
    Empty,
}

/// Default location for CSV exports.
pub fn default_export_path() -> &'static str {
    "./exports/matrix_ledger.csv"
}

/// Write `records` as CSV, header first.
pub fn write_csv<W: Write>(records: &[YearRecord], out: W) -> Result<(), ExportError> {
    if records.is_empty() {
        return Err(ExportError::Empty);
    }
    let table = FlatTable::for_records(records);
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(table.header())?;
    for r in records {
        wtr.write_record(table.row(r))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write a CSV file, creating parent directories as needed.
pub fn export_csv<P: AsRef<Path>>(path: P, records: &[YearRecord]) -> Result<(), ExportError> {
    let path = path.as_ref();
    ensure_parent(path)?;
    write_csv(records, File::create(path)?)?;
    info!(path = %path.display(), rows = records.len(), "csv export written");
    Ok(())
}

/// JSON export document.
#[derive(Debug, Serialize)]
pub struct LedgerDocument<'a> {
    pub generated_at: String,
    pub params: &'a ScenarioParams,
    /// Display names and colours of the entities in `records`.
    pub entities: Vec<TrackedEntity>,
    pub summary: Option<LedgerSummary>,
    pub records: &'a [YearRecord],
}

impl<'a> LedgerDocument<'a> {
    pub fn new(params: &'a ScenarioParams, records: &'a [YearRecord]) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            params,
            entities: FlatTable::for_records(records).tickers().iter().map(describe).collect(),
            summary: LedgerSummary::from_records(records),
            records,
        }
    }
}

/// Write the JSON document, pretty-printed.
pub fn write_json<W: Write>(doc: &LedgerDocument<'_>, out: W) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(out, doc)?;
    Ok(())
}

pub fn export_json<P: AsRef<Path>>(path: P, params: &ScenarioParams, records: &[YearRecord]) -> Result<(), ExportError> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let doc = LedgerDocument::new(params, records);
    write_json(&doc, File::create(path)?)?;
    info!(path = %path.display(), rows = records.len(), "json export written");
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
