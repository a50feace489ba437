//! Multi-symbol trend scan.
//!
//! Runs the trend screener over each symbol in order, skipping symbols that
//! fail to load or are too short, and pausing after every full batch. A
//! cancellation flag is checked before each symbol; whatever was gathered so
//! far is still returned.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::domain::trend::{self, TrendAnalysis, TrendLabel, TrendScreener};
use crate::ports::data_port::DataPort;

#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub batch_size: usize,
    pub delay: Duration,
    pub top: usize,
    pub min_bars: usize,
    /// Appended to bare symbols read from files or the command line.
    pub symbol_suffix: String,
    pub lookback_days: Option<u32>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            batch_size: 20,
            delay: Duration::from_secs(1),
            top: 20,
            min_bars: trend::MIN_BARS,
            symbol_suffix: String::new(),
            lookback_days: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanRow {
    pub symbol: String,
    pub name: String,
    pub score: u8,
    pub trend_type: TrendLabel,
    pub yearly_return: f64,
    pub ma50_slope: f64,
    pub days_above_ma50: f64,
}

impl ScanRow {
    pub fn from_analysis(symbol: &str, name: &str, analysis: &TrendAnalysis) -> Self {
        let (yearly_return, ma50_slope, days_above_ma50) = analysis
            .metrics
            .as_ref()
            .map_or((0.0, 0.0, 0.0), |m| (m.yearly_return, m.ma50_slope_3m, m.days_above_ma50));
        ScanRow {
            symbol: symbol.to_string(),
            name: name.to_string(),
            score: analysis.score,
            trend_type: analysis.label,
            yearly_return,
            ma50_slope,
            days_above_ma50,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    Retrieval(String),
    NoData,
    InsufficientBars { bars: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Sorted by score, highest first. Ties keep input order.
    pub rows: Vec<ScanRow>,
    pub skipped: Vec<SkippedSymbol>,
    pub cancelled: bool,
}

impl ScanOutcome {
    pub fn top(&self, n: usize) -> &[ScanRow] {
        &self.rows[..n.min(self.rows.len())]
    }

    pub fn tally(&self) -> BTreeMap<TrendLabel, usize> {
        let mut counts = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(row.trend_type).or_insert(0) += 1;
        }
        counts
    }

    pub fn with_label(&self, label: TrendLabel) -> impl Iterator<Item = &ScanRow> {
        self.rows.iter().filter(move |r| r.trend_type == label)
    }
}

pub fn scan_symbols(
    data_port: &dyn DataPort,
    symbols: &[String],
    config: &ScanConfig,
    cancel: &AtomicBool,
    pause: &mut dyn FnMut(Duration),
) -> ScanOutcome {
    let screener = TrendScreener;
    let mut outcome = ScanOutcome::default();
    let total = symbols.len();

    for (i, symbol) in symbols.iter().enumerate() {
        if cancel.load(Ordering::Relaxed) {
            info!(done = i, total, "scan cancelled");
            outcome.cancelled = true;
            break;
        }

        if i > 0 && config.batch_size > 0 && i % config.batch_size == 0 {
            debug!(done = i, total, delay_ms = config.delay.as_millis() as u64, "batch pause");
            pause(config.delay);
        }

        let bars = match data_port.fetch_history(symbol, config.lookback_days) {
            Ok(bars) => bars,
            Err(e) => {
                warn!(%symbol, error = %e, "skipping symbol, retrieval failed");
                outcome.skipped.push(SkippedSymbol {
                    symbol: symbol.clone(),
                    reason: SkipReason::Retrieval(e.to_string()),
                });
                continue;
            }
        };

        if bars.is_empty() {
            warn!(%symbol, "skipping symbol, no data");
            outcome.skipped.push(SkippedSymbol {
                symbol: symbol.clone(),
                reason: SkipReason::NoData,
            });
            continue;
        }

        if bars.len() < config.min_bars {
            warn!(%symbol, bars = bars.len(), minimum = config.min_bars, "skipping symbol, too few bars");
            outcome.skipped.push(SkippedSymbol {
                symbol: symbol.clone(),
                reason: SkipReason::InsufficientBars { bars: bars.len() },
            });
            continue;
        }

        let analysis = screener.analyze(&bars);
        let name = data_port
            .display_name(symbol)
            .unwrap_or_else(|| symbol.clone());
        outcome
            .rows
            .push(ScanRow::from_analysis(symbol, &name, &analysis));
    }

    sort_rows(&mut outcome.rows);
    outcome
}

/// Stable sort, highest score first.
pub fn sort_rows(rows: &mut [ScanRow]) {
    rows.sort_by(|a, b| b.score.cmp(&a.score));
}
