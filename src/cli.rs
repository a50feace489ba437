//! CLI definition and dispatch.

use chrono::Local;
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::time::Duration;
use tracing::{info, warn};

use crate::adapters::console_report;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::{default_export_name, CsvReportAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self, BacktestConfig};
use crate::domain::config_validation::validate_config;
use crate::domain::error::TrendscanError;
use crate::domain::scan::{scan_symbols, ScanConfig, ScanRow};
use crate::domain::timing::BuyTimingAnalyzer;
use crate::domain::trend::TrendScreener;
use crate::domain::watchlist::{self, dedupe, normalize_symbol, parse_symbol_file};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_DATA_DIR: &str = "data";

/// Screened when `screen` is given no symbols.
pub const WATCHLIST_INDEX: &str = "watchlist";

#[derive(Parser, Debug)]
#[command(
    name = "trendscan",
    about = "Trend screening, buy timing and backtests over daily price files"
)]
pub struct Cli {
    /// INI configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Directory holding <SYMBOL>.csv price files
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

/// Where the symbols for a run come from. Positional symbols, an index
/// and a file may be combined; duplicates are dropped.
#[derive(Args, Debug, Default)]
pub struct SymbolArgs {
    pub symbols: Vec<String>,
    /// Named index (see `indices`)
    #[arg(short, long)]
    pub index: Option<String>,
    /// File with one symbol per line
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the built-in indices
    Indices,
    /// Full trend report for each symbol
    Screen {
        /// Defaults to the built-in watchlist
        symbols: Vec<String>,
    },
    /// Rank many symbols by trend score
    Scan {
        #[command(flatten)]
        source: SymbolArgs,
        /// Rows to display
        #[arg(short, long)]
        top: Option<usize>,
        /// Export results to trend_scan_<timestamp>.csv
        #[arg(long)]
        save: bool,
        /// Export results to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Buy-timing report for each symbol
    Timing {
        #[arg(required = true)]
        symbols: Vec<String>,
    },
    /// Compare buy-timing entries against buy-and-hold
    Backtest {
        #[command(flatten)]
        source: SymbolArgs,
        /// Starting cash
        #[arg(long)]
        capital: Option<f64>,
    },
}

/// Everything a command needs after config and flags are merged.
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub scan: ScanConfig,
    pub backtest: BacktestConfig,
}

pub fn run(cli: Cli) -> ExitCode {
    let settings = match load_settings(cli.config.as_ref(), cli.data_dir.as_ref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let data_port = CsvAdapter::new(settings.data_dir.clone());

    match cli.command {
        Command::Indices => run_indices(),
        Command::Screen { symbols } => run_screen(&data_port, &settings, &symbols),
        Command::Scan {
            source,
            top,
            save,
            output,
        } => run_scan(&data_port, &settings, &source, top, save, output.as_ref()),
        Command::Timing { symbols } => run_timing(&data_port, &settings, &symbols),
        Command::Backtest { source, capital } => {
            run_backtest(&data_port, &settings, &source, capital)
        }
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, TrendscanError> {
    FileConfigAdapter::from_file(path).map_err(|e| TrendscanError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

pub fn load_settings(
    config_path: Option<&PathBuf>,
    data_dir: Option<&PathBuf>,
) -> Result<Settings, TrendscanError> {
    let adapter = match config_path {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            load_config(path)?
        }
        None => FileConfigAdapter::empty(),
    };
    validate_config(&adapter)?;

    let data_dir = data_dir
        .cloned()
        .or_else(|| adapter.get_string("data", "dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

    Ok(Settings {
        data_dir,
        scan: build_scan_config(&adapter),
        backtest: build_backtest_config(&adapter),
    })
}

/// Expects a config that passed `validate_config`.
pub fn build_scan_config(adapter: &dyn ConfigPort) -> ScanConfig {
    let defaults = ScanConfig::default();
    let lookback = adapter.get_int("data", "lookback_days", 0);
    ScanConfig {
        batch_size: adapter.get_int("scan", "batch_size", defaults.batch_size as i64) as usize,
        delay: Duration::try_from_secs_f64(
            adapter.get_double("scan", "delay_secs", defaults.delay.as_secs_f64()),
        )
        .unwrap_or(defaults.delay),
        top: adapter.get_int("scan", "top", defaults.top as i64) as usize,
        min_bars: defaults.min_bars,
        symbol_suffix: adapter
            .get_string("scan", "symbol_suffix")
            .map(|s| s.trim().to_string())
            .unwrap_or(defaults.symbol_suffix),
        lookback_days: u32::try_from(lookback).ok().filter(|&d| d > 0),
    }
}

/// Expects a config that passed `validate_config`.
pub fn build_backtest_config(adapter: &dyn ConfigPort) -> BacktestConfig {
    let defaults = BacktestConfig::default();
    BacktestConfig {
        initial_capital: adapter.get_double("backtest", "initial_capital", defaults.initial_capital),
        warmup: adapter.get_int("backtest", "warmup", defaults.warmup as i64) as usize,
        atr_multiplier: adapter.get_double("backtest", "atr_multiplier", defaults.atr_multiplier),
        stop_window: adapter.get_int("backtest", "stop_window", defaults.stop_window as i64)
            as usize,
    }
}

/// Positional symbols get the configured suffix; index members are used
/// as listed.
pub fn resolve_symbols(source: &SymbolArgs, suffix: &str) -> Result<Vec<String>, TrendscanError> {
    let mut symbols: Vec<String> = source
        .symbols
        .iter()
        .map(|s| normalize_symbol(s, suffix))
        .collect();
    if let Some(name) = &source.index {
        symbols.extend(watchlist::resolve_index(name)?);
    }
    if let Some(path) = &source.file {
        let content = fs::read_to_string(path)?;
        symbols.extend(parse_symbol_file(&content, suffix));
    }
    Ok(dedupe(symbols))
}

fn print_usage_hint() {
    eprint!("{}", console_report::render_indices(&watchlist::list_indices()));
    eprintln!();
    eprintln!("examples:");
    eprintln!("  trendscan scan --index nikkei_sample");
    eprintln!("  trendscan scan --file symbols.txt --top 10 --save");
    eprintln!("  trendscan backtest 7203.T 6758.T");
}

/// `None` means guidance was printed and the command should stop cleanly.
fn symbols_or_guidance(source: &SymbolArgs, suffix: &str) -> Result<Option<Vec<String>>, ExitCode> {
    match resolve_symbols(source, suffix) {
        Ok(symbols) if symbols.is_empty() => {
            eprintln!("no symbols given");
            print_usage_hint();
            Ok(None)
        }
        Ok(symbols) => Ok(Some(symbols)),
        Err(e @ TrendscanError::Watchlist(_)) => {
            eprintln!("{e}");
            print_usage_hint();
            Ok(None)
        }
        Err(TrendscanError::Io(e)) if e.kind() == ErrorKind::NotFound => {
            let path = source.file.as_deref().unwrap_or(Path::new(""));
            eprintln!("symbol file not found: {}", path.display());
            Ok(None)
        }
        Err(e) => {
            eprintln!("error: {e}");
            Err((&e).into())
        }
    }
}

fn run_indices() -> ExitCode {
    print!("{}", console_report::render_indices(&watchlist::list_indices()));
    ExitCode::SUCCESS
}

fn display_name(data_port: &dyn DataPort, symbol: &str) -> String {
    data_port.display_name(symbol).unwrap_or_default()
}

fn run_screen(data_port: &dyn DataPort, settings: &Settings, symbols: &[String]) -> ExitCode {
    let symbols = if symbols.is_empty() {
        match watchlist::resolve_index(WATCHLIST_INDEX) {
            Ok(members) => members,
            Err(e) => {
                let err = TrendscanError::from(e);
                eprintln!("error: {err}");
                return (&err).into();
            }
        }
    } else {
        symbols.to_vec()
    };

    let screener = TrendScreener;
    let mut rows = Vec::new();
    for raw in &symbols {
        let symbol = normalize_symbol(raw, &settings.scan.symbol_suffix);
        match data_port.fetch_history(&symbol, settings.scan.lookback_days) {
            Ok(bars) => {
                let analysis = screener.analyze(&bars);
                let name = display_name(data_port, &symbol);
                print!("{}", console_report::render_trend_report(&symbol, &name, &analysis));
                rows.push(ScanRow::from_analysis(&symbol, &name, &analysis));
            }
            Err(e) => {
                warn!(%symbol, error = %e, "skipping symbol");
                eprintln!("warning: skipping {} ({})", symbol, e);
            }
        }
    }
    if rows.len() > 1 {
        print!("{}", console_report::render_screen_summary(&rows));
    }
    ExitCode::SUCCESS
}

fn run_timing(data_port: &dyn DataPort, settings: &Settings, symbols: &[String]) -> ExitCode {
    let analyzer = BuyTimingAnalyzer;
    for raw in symbols {
        let symbol = normalize_symbol(raw, &settings.scan.symbol_suffix);
        match data_port.fetch_history(&symbol, settings.scan.lookback_days) {
            Ok(bars) => {
                let analysis = analyzer.analyze(&bars);
                let name = display_name(data_port, &symbol);
                print!("{}", console_report::render_timing_report(&symbol, &name, &analysis));
            }
            Err(e) => {
                warn!(%symbol, error = %e, "skipping symbol");
                eprintln!("warning: skipping {} ({})", symbol, e);
            }
        }
    }
    ExitCode::SUCCESS
}

fn run_scan(
    data_port: &dyn DataPort,
    settings: &Settings,
    source: &SymbolArgs,
    top: Option<usize>,
    save: bool,
    output: Option<&PathBuf>,
) -> ExitCode {
    let symbols = match symbols_or_guidance(source, &settings.scan.symbol_suffix) {
        Ok(Some(s)) => s,
        Ok(None) => return ExitCode::SUCCESS,
        Err(code) => return code,
    };

    eprintln!("Scanning {} symbols...", symbols.len());
    let cancel = AtomicBool::new(false);
    let mut pause = |d: Duration| std::thread::sleep(d);
    let outcome = scan_symbols(data_port, &symbols, &settings.scan, &cancel, &mut pause);
    eprintln!(
        "Done: {} analysed, {} skipped",
        outcome.rows.len(),
        outcome.skipped.len()
    );

    print!(
        "{}",
        console_report::render_scan_table(&outcome, top.unwrap_or(settings.scan.top))
    );

    if (save || output.is_some()) && !outcome.rows.is_empty() {
        let path = output
            .cloned()
            .unwrap_or_else(|| PathBuf::from(default_export_name(Local::now())));
        let path_str = path.display().to_string();
        match CsvReportAdapter::new().write_scan(&outcome.rows, &path_str) {
            Ok(()) => eprintln!("saved: {}", path_str),
            Err(e) => {
                eprintln!("error: failed to write {}: {e}", path_str);
                return (&e).into();
            }
        }
    }

    ExitCode::SUCCESS
}

fn run_backtest(
    data_port: &dyn DataPort,
    settings: &Settings,
    source: &SymbolArgs,
    capital: Option<f64>,
) -> ExitCode {
    let mut config = settings.backtest.clone();
    if let Some(capital) = capital {
        if !capital.is_finite() || capital <= 0.0 {
            let e = TrendscanError::ConfigInvalid {
                section: "backtest".into(),
                key: "initial_capital".into(),
                reason: "--capital must be positive".into(),
            };
            eprintln!("error: {e}");
            return (&e).into();
        }
        config.initial_capital = capital;
    }

    let symbols = match symbols_or_guidance(source, &settings.scan.symbol_suffix) {
        Ok(Some(s)) => s,
        Ok(None) => return ExitCode::SUCCESS,
        Err(code) => return code,
    };

    let mut results = Vec::new();
    for symbol in &symbols {
        let bars = match data_port.fetch_history(symbol, settings.scan.lookback_days) {
            Ok(bars) => bars,
            Err(e) => {
                warn!(%symbol, error = %e, "skipping symbol");
                eprintln!("warning: skipping {} ({})", symbol, e);
                continue;
            }
        };
        match backtest::simulate(&bars, &config) {
            Ok(result) => {
                let name = display_name(data_port, symbol);
                print!("{}", console_report::render_backtest(symbol, &name, &result));
                results.push(result);
            }
            Err(e) => {
                warn!(%symbol, error = %e, "skipping symbol");
                eprintln!("warning: skipping {} ({})", symbol, e);
            }
        }
    }

    match backtest::summarize(&results) {
        Some(summary) => print!("{}", console_report::render_backtest_summary(&summary)),
        None => eprintln!("no symbol had enough data to backtest"),
    }
    ExitCode::SUCCESS
}
