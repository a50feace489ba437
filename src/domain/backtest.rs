//! Buy-timing backtest against a buy-and-hold baseline.
//!
//! Replays a series bar by bar. From the end of the warmup on, the buy-timing
//! analyzer sees only `bars[..=i]`; a `BUY_NOW` with no open position buys as
//! many whole shares as cash allows, and an open position exits when the close
//! drops below `trailing_high - atr_multiplier * range_atr`.

use tracing::debug;

use crate::domain::error::TrendscanError;
use crate::domain::indicator::atr::range_atr;
use crate::domain::position::{Position, TradeRecord};
use crate::domain::price_bar::PriceBar;
use crate::domain::timing::{BuyTimingAnalyzer, TimingSignal};
use crate::domain::trend::pct_change;

pub const MIN_BARS: usize = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    /// Bars skipped for decisions; they still feed indicator history.
    pub warmup: usize,
    pub atr_multiplier: f64,
    /// The stop's range-ATR spans `stop_window + 1` bars ending at the
    /// current one.
    pub stop_window: usize,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: 1_000_000.0,
            warmup: 50,
            atr_multiplier: 2.0,
            stop_window: 14,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub timing_return: f64,
    pub bh_return: f64,
    pub difference: f64,
    pub trades: Vec<TradeRecord>,
    pub final_value_timing: f64,
    pub final_value_bh: f64,
    /// BUY_NOW signals seen after warmup, with or without an open position.
    pub buy_signals: usize,
    /// Whether a position was still open (and marked to market) at the end.
    pub open_at_end: bool,
}

pub fn simulate(bars: &[PriceBar], config: &BacktestConfig) -> Result<BacktestResult, TrendscanError> {
    let minimum = MIN_BARS.max(config.warmup + 1);
    if bars.len() < minimum {
        return Err(TrendscanError::InsufficientData {
            bars: bars.len(),
            minimum,
        });
    }

    let analyzer = BuyTimingAnalyzer;
    let mut cash = config.initial_capital;
    let mut position: Option<Position> = None;
    let mut trades = Vec::new();
    let mut buy_signals = 0usize;

    for i in config.warmup..bars.len() {
        let bar = &bars[i];
        let signal = analyzer.analyze(&bars[..=i]).signal;
        if signal == TimingSignal::BuyNow {
            buy_signals += 1;
        }

        match position.as_mut() {
            None => {
                if signal != TimingSignal::BuyNow {
                    continue;
                }
                let shares = (cash / bar.close).floor() as u64;
                if shares == 0 {
                    debug!(date = %bar.date, close = bar.close, cash, "signal ignored, cannot afford one share");
                    continue;
                }
                let opened = Position::open(i, bar.date, bar.close, shares);
                cash -= opened.cost();
                debug!(date = %bar.date, price = bar.close, shares, "position opened");
                position = Some(opened);
            }
            Some(open) => {
                open.ratchet(bar.close);
                let atr = range_atr(bars, i, config.stop_window);
                if open.should_stop(bar.close, atr, config.atr_multiplier) {
                    if let Some(closing) = position.take() {
                        cash += closing.market_value(bar.close);
                        let trade = closing.close(bar.date, bar.close);
                        debug!(date = %bar.date, price = bar.close, pnl_pct = trade.pnl_pct, "position closed");
                        trades.push(trade);
                    }
                }
            }
        }
    }

    let last_close = bars[bars.len() - 1].close;
    let open_at_end = position.is_some();
    let final_value_timing = cash + position.as_ref().map_or(0.0, |p| p.market_value(last_close));

    let entry_close = bars[config.warmup].close;
    let bh_shares = (config.initial_capital / entry_close).floor();
    let final_value_bh = bh_shares * last_close + (config.initial_capital - bh_shares * entry_close);

    let timing_return = pct_change(config.initial_capital, final_value_timing);
    let bh_return = buy_and_hold_return(bars, config.warmup);

    Ok(BacktestResult {
        timing_return,
        bh_return,
        difference: timing_return - bh_return,
        trades,
        final_value_timing,
        final_value_bh,
        buy_signals,
        open_at_end,
    })
}

/// Price return in percent from the close at `entry` to the final close.
pub fn buy_and_hold_return(bars: &[PriceBar], entry: usize) -> f64 {
    match (bars.get(entry), bars.last()) {
        (Some(first), Some(last)) => (last.close - first.close) / first.close * 100.0,
        _ => 0.0,
    }
}

/// Aggregate over several symbols' backtests.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestSummary {
    pub runs: usize,
    pub avg_timing_return: f64,
    pub avg_bh_return: f64,
    pub timing_wins: usize,
    pub bh_wins: usize,
}

impl BacktestSummary {
    pub fn timing_outperformed(&self) -> bool {
        self.avg_timing_return > self.avg_bh_return
    }
}

pub fn summarize(results: &[BacktestResult]) -> Option<BacktestSummary> {
    if results.is_empty() {
        return None;
    }
    let runs = results.len();
    let timing_wins = results.iter().filter(|r| r.difference > 0.0).count();
    Some(BacktestSummary {
        runs,
        avg_timing_return: results.iter().map(|r| r.timing_return).sum::<f64>() / runs as f64,
        avg_bh_return: results.iter().map(|r| r.bh_return).sum::<f64>() / runs as f64,
        timing_wins,
        bh_wins: runs - timing_wins,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close * 1.005,
                low: close * 0.995,
                close,
                volume: Some(5_000),
            })
            .collect()
    }

    fn sample_result(timing: f64, bh: f64) -> BacktestResult {
        BacktestResult {
            timing_return: timing,
            bh_return: bh,
            difference: timing - bh,
            trades: vec![],
            final_value_timing: 0.0,
            final_value_bh: 0.0,
            buy_signals: 0,
            open_at_end: false,
        }
    }

    #[test]
    fn default_config() {
        let c = BacktestConfig::default();
        assert_relative_eq!(c.initial_capital, 1_000_000.0);
        assert_eq!(c.warmup, 50);
        assert_relative_eq!(c.atr_multiplier, 2.0);
        assert_eq!(c.stop_window, 14);
    }

    #[test]
    fn rejects_short_series() {
        let bars = bars_from_closes(&[100.0; 59]);
        let err = simulate(&bars, &BacktestConfig::default()).unwrap_err();
        assert!(matches!(err, TrendscanError::InsufficientData { bars: 59, minimum: 60 }));
    }

    #[test]
    fn rejects_warmup_beyond_series() {
        let bars = bars_from_closes(&[100.0; 80]);
        let config = BacktestConfig {
            warmup: 80,
            ..BacktestConfig::default()
        };
        assert!(simulate(&bars, &config).is_err());
    }

    #[test]
    fn flat_series_never_trades() {
        let bars = bars_from_closes(&[100.0; 120]);
        let result = simulate(&bars, &BacktestConfig::default()).unwrap();
        assert!(result.trades.is_empty());
        assert_eq!(result.buy_signals, 0);
        assert_relative_eq!(result.timing_return, 0.0);
        assert_relative_eq!(result.bh_return, 0.0);
    }

    #[test]
    fn buy_and_hold_is_price_return_from_warmup_close() {
        let closes: Vec<f64> = (0..100).map(|i| 80.0 + i as f64 * 0.7).collect();
        let bars = bars_from_closes(&closes);
        let result = simulate(&bars, &BacktestConfig::default()).unwrap();
        let expected = (closes[99] - closes[50]) / closes[50] * 100.0;
        assert_eq!(result.bh_return, expected);
    }

    #[test]
    fn buy_and_hold_value_keeps_uninvested_cash() {
        let closes: Vec<f64> = (0..70).map(|i| if i < 50 { 300.0 } else { 330.0 }).collect();
        let bars = bars_from_closes(&closes);
        let result = simulate(&bars, &BacktestConfig::default()).unwrap();
        // 1_000_000 / 330 -> 3030 shares, 100 left over
        assert_relative_eq!(result.final_value_bh, 3030.0 * 330.0 + 100.0, epsilon = 1e-6);
    }

    #[test]
    fn summarize_counts_wins() {
        let summary = summarize(&[sample_result(10.0, 5.0), sample_result(-2.0, 4.0)]).unwrap();
        assert_eq!(summary.runs, 2);
        assert_eq!(summary.timing_wins, 1);
        assert_eq!(summary.bh_wins, 1);
        assert_relative_eq!(summary.avg_timing_return, 4.0);
        assert_relative_eq!(summary.avg_bh_return, 4.5);
        assert!(!summary.timing_outperformed());
    }

    #[test]
    fn summarize_empty_is_none() {
        assert!(summarize(&[]).is_none());
    }
}
