#![deny(warnings)]

//! Headless CLI: resolves the historical series, runs the ledger, prints the
//! headline KPIs and writes the requested exports.

mod config;

use anyhow::{Context, Result};
use config::{ConfigError, RunConfig};
use ledger_core::{HistoricalSeries, IndexKind, ParamKind, ScenarioParams};
use ledger_engine::summary::index_change_pct;
use ledger_engine::{fmt_usd, simulate, LedgerSummary};
use ledger_sweep::{monte_carlo, sensitivity, Metric};
use market_data::{
    resolve_history, CachedProvider, CsvHistoryProvider, HistoryProvider, HistorySource, ReferenceProvider,
};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

const SENSITIVITY_STEPS: usize = 11;
const DEFAULT_RUNS: usize = 200;
const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    config: Option<PathBuf>,
    years: Option<u32>,
    history: Option<PathBuf>,
    csv: Option<PathBuf>,
    json: Option<PathBuf>,
    sweep: Option<String>,
    seed: Option<u64>,
    runs: Option<usize>,
}

fn parse_args() -> CliArgs {
    parse_from(std::env::args().skip(1))
}

fn parse_from<I: Iterator<Item = String>>(mut it: I) -> CliArgs {
    let mut args = CliArgs::default();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => args.config = it.next().map(PathBuf::from),
            "--years" => args.years = it.next().and_then(|s| s.parse().ok()),
            "--history" => args.history = it.next().map(PathBuf::from),
            "--csv" => args.csv = it.next().map(PathBuf::from),
            "--json" => args.json = it.next().map(PathBuf::from),
            "--sweep" => args.sweep = it.next(),
            "--seed" => args.seed = it.next().and_then(|s| s.parse().ok()),
            "--runs" => args.runs = it.next().and_then(|s| s.parse().ok()),
            _ => {}
        }
    }
    args
}

fn apply_overrides(cfg: &mut RunConfig, args: &CliArgs) {
    if let Some(years) = args.years {
        cfg.params.proj_years = years;
    }
    if let Some(path) = &args.history {
        cfg.history_csv = Some(path.clone());
    }
    if let Some(path) = &args.csv {
        cfg.export_csv = Some(path.clone());
    }
    if let Some(path) = &args.json {
        cfg.export_json = Some(path.clone());
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum SweepTarget {
    Param(ParamKind),
    MonteCarlo,
}

impl SweepTarget {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw {
            "mc" | "monte-carlo" => Ok(SweepTarget::MonteCarlo),
            name => ParamKind::from_name(name)
                .map(SweepTarget::Param)
                .ok_or_else(|| ConfigError::UnknownSweep(name.to_string())),
        }
    }
}

fn provider_for(cfg: &RunConfig) -> Box<dyn HistoryProvider> {
    match &cfg.history_csv {
        Some(path) => Box::new(CachedProvider::new(CsvHistoryProvider::new(path), cfg.cache_ttl_secs)),
        None => Box::new(ReferenceProvider),
    }
}

fn print_summary(s: &LedgerSummary, params: &ScenarioParams, source: &HistorySource) {
    let origin = match source {
        HistorySource::Provider(name) => name.clone(),
        HistorySource::Reference(reason) => format!("reference data ({reason})"),
    };
    println!(
        "Ledger {}..{} | history through {} | source: {}",
        s.first_year, s.horizon_year, s.last_observed_year, origin
    );
    println!(
        "Debt | legacy: {} | cumulative: {} | regen created: {} | gap: {} | balance: {}",
        fmt_usd(s.legacy_debt),
        fmt_usd(s.cumulative_debt),
        fmt_usd(s.cumulative_regen_value),
        fmt_usd(s.cumulative_gap),
        fmt_usd(s.net_system_balance)
    );
    println!(
        "Final year | extractive cost: {} | true value: {} | regen value: {} | delta: {} ({:+.1}%)",
        fmt_usd(s.final_extractive_cost),
        fmt_usd(s.final_true_value),
        fmt_usd(s.final_regen_value),
        fmt_usd(s.final_delta_abs),
        s.final_delta_pct
    );
    let start = params.starting_indices();
    for kind in IndexKind::ALL {
        let ext = s.final_extractive_indices.get(kind);
        let reg = s.final_regen_indices.get(kind);
        println!(
            "{} | extractive: {:.3} ({:+.1}%) | regenerative: {:.3} ({:+.1}%)",
            kind.label(),
            ext,
            index_change_pct(ext, start.get(kind)),
            reg,
            index_change_pct(reg, start.get(kind))
        );
    }
}

fn run_sweep(target: SweepTarget, history: &HistoricalSeries, base: &ScenarioParams, args: &CliArgs) {
    match target {
        SweepTarget::Param(kind) => {
            println!("Sensitivity | {}", kind.name());
            for p in sensitivity(history, base, kind, SENSITIVITY_STEPS) {
                println!(
                    "  {:>8.4} | gap: {} | balance: {} | delta: {:+.1}%",
                    p.value,
                    fmt_usd(p.metric(Metric::CumulativeGap)),
                    fmt_usd(p.metric(Metric::NetSystemBalance)),
                    p.metric(Metric::FinalDeltaPct)
                );
            }
        }
        SweepTarget::MonteCarlo => {
            let runs = args.runs.unwrap_or(DEFAULT_RUNS);
            let seed = args.seed.unwrap_or(DEFAULT_SEED);
            let report = monte_carlo(history, runs, seed);
            println!("Monte Carlo | runs: {} | seed: {}", runs, seed);
            for (metric, st) in &report.stats {
                let fmt = |v: f64| match metric {
                    Metric::FinalDeltaPct => format!("{:+.1}%", v),
                    _ => fmt_usd(v),
                };
                println!(
                    "  {:<24} | mean: {} | std: {} | 95% CI: [{}, {}] | min: {} | max: {}",
                    metric.name(),
                    fmt(st.mean),
                    fmt(st.std_dev),
                    fmt(st.ci_lower),
                    fmt(st.ci_upper),
                    fmt(st.min),
                    fmt(st.max)
                );
            }
        }
    }
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        git = env!("GIT_SHA"),
        built = env!("BUILD_DATE"),
        ?args,
        "starting matrix-ledger"
    );

    let mut cfg = match &args.config {
        Some(path) => RunConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => RunConfig::default(),
    };
    apply_overrides(&mut cfg, &args);
    cfg.validate()?;
    let sweep = args.sweep.as_deref().map(SweepTarget::parse).transpose()?;

    let provider = provider_for(&cfg);
    let resolved = resolve_history(&provider, &cfg.tickers());
    let records = simulate(&resolved.series, &cfg.params);
    info!(records = records.len(), fallback = resolved.is_fallback(), "ledger computed");

    match LedgerSummary::from_records(&records) {
        Some(summary) => print_summary(&summary, &cfg.params, &resolved.source),
        None => println!("Ledger is empty"),
    }

    if let Some(path) = &cfg.export_csv {
        ledger_export::export_csv(path, &records).with_context(|| format!("writing {}", path.display()))?;
    }
    if let Some(path) = &cfg.export_json {
        ledger_export::export_json(path, &cfg.params, &records)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    if let Some(target) = sweep {
        run_sweep(target, &resolved.series, &cfg.params, &args);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> CliArgs {
        parse_from(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn flags_parse() {
        let a = args(&["--years", "15", "--csv", "out.csv", "--sweep", "gamma", "--seed", "7", "--bogus"]);
        assert_eq!(a.years, Some(15));
        assert_eq!(a.csv, Some(PathBuf::from("out.csv")));
        assert_eq!(a.sweep.as_deref(), Some("gamma"));
        assert_eq!(a.seed, Some(7));
        assert_eq!(a.config, None);
    }

    #[test]
    fn bad_numbers_are_ignored() {
        let a = args(&["--years", "many"]);
        assert_eq!(a.years, None);
    }

    #[test]
    fn flags_override_config() {
        let mut cfg = RunConfig::default();
        cfg.export_csv = Some(PathBuf::from("from-config.csv"));
        apply_overrides(&mut cfg, &args(&["--years", "12", "--history", "h.csv"]));
        assert_eq!(cfg.params.proj_years, 12);
        assert_eq!(cfg.history_csv, Some(PathBuf::from("h.csv")));
        assert_eq!(cfg.export_csv, Some(PathBuf::from("from-config.csv")));
    }

    #[test]
    fn sweep_targets() {
        assert_eq!(SweepTarget::parse("mc").unwrap(), SweepTarget::MonteCarlo);
        assert_eq!(SweepTarget::parse("beta").unwrap(), SweepTarget::Param(ParamKind::Beta));
        assert!(matches!(SweepTarget::parse("delta"), Err(ConfigError::UnknownSweep(_))));
    }

    #[test]
    fn reference_provider_without_history_file() {
        let cfg = RunConfig::default();
        let resolved = resolve_history(&provider_for(&cfg), &cfg.tickers());
        assert!(!resolved.is_fallback());
        assert_eq!(resolved.series.len(), 5);
    }

    #[test]
    fn unreadable_history_falls_back() {
        let cfg = RunConfig {
            history_csv: Some(PathBuf::from("/nonexistent/history.csv")),
            ..RunConfig::default()
        };
        let resolved = resolve_history(&provider_for(&cfg), &cfg.tickers());
        assert!(resolved.is_fallback());
    }
}
