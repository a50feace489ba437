//! Plain-text console rendering.
//!
//! Each function returns the full block as a `String`; the CLI decides where
//! it goes.

use crate::domain::backtest::{BacktestResult, BacktestSummary};
use crate::domain::scan::{ScanOutcome, ScanRow};
use crate::domain::timing::TimingAnalysis;
use crate::domain::trend::{TrendAnalysis, TrendLabel};

const RULE_WIDTH: usize = 72;

fn rule(ch: char) -> String {
    let mut line: String = std::iter::repeat_n(ch, RULE_WIDTH).collect();
    line.push('\n');
    line
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

pub fn render_indices(indices: &[(&str, usize)]) -> String {
    let mut out = String::from("Available indices:\n");
    for (name, count) in indices {
        out.push_str(&format!("  {:<16} {:>3} symbols\n", name, count));
    }
    out
}

pub fn render_trend_report(symbol: &str, name: &str, analysis: &TrendAnalysis) -> String {
    let mut out = rule('=');
    out.push_str(&format!("{} {}\n", symbol, name));
    out.push_str(&rule('='));
    out.push_str(&format!(
        "score: {}/100  [{}]\n",
        analysis.score, analysis.label
    ));
    for reason in &analysis.reasons {
        out.push_str(&format!("  {}\n", reason));
    }
    if let Some(m) = &analysis.metrics {
        out.push_str(&format!(
            "price {:.2}  MA20 {:.2}  MA50 {:.2}  MA200 {:.2}\n",
            m.current_price, m.ma20, m.ma50, m.ma200
        ));
        out.push_str(&format!(
            "YTD {:+.1}%  1y {:+.1}%  ATR {:.1}%  MA50 1m {:+.1}%\n",
            m.ytd_return, m.yearly_return, m.atr_pct, m.ma50_slope_1m
        ));
    }
    out
}

pub fn render_timing_report(symbol: &str, name: &str, analysis: &TimingAnalysis) -> String {
    let mut out = rule('-');
    out.push_str(&format!("{} {}\n", symbol, name));
    out.push_str(&format!(
        "timing score: {}/100  [{}]\n",
        analysis.score, analysis.signal
    ));
    for reason in &analysis.reasons {
        out.push_str(&format!("  {}\n", reason));
    }
    if let Some(c) = &analysis.conditions {
        out.push_str(&format!(
            "price {:.2}  RSI {:.0}  ATR {:.2}  volume x{:.2}\n",
            c.current_price, c.rsi, c.atr, c.vol_ratio
        ));
    }
    out
}

/// Score-ordered one-liners after screening several symbols, closing with
/// the strong-trend names.
pub fn render_screen_summary(rows: &[ScanRow]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    let mut sorted: Vec<&ScanRow> = rows.iter().collect();
    sorted.sort_by(|a, b| b.score.cmp(&a.score));

    let mut out = rule('=');
    out.push_str("Trend summary (by score)\n");
    out.push_str(&rule('='));
    for r in &sorted {
        out.push_str(&format!(
            "{:>3}  {:<10} {:<12} {:>+7.1}%  {}\n",
            r.score,
            r.symbol,
            r.trend_type.as_str(),
            r.yearly_return,
            truncate(&r.name, 20)
        ));
    }

    let strong: Vec<&str> = sorted
        .iter()
        .filter(|r| r.trend_type == TrendLabel::StrongTrend)
        .map(|r| r.symbol.as_str())
        .collect();
    if strong.is_empty() {
        out.push_str("\nno strong trends found\n");
    } else {
        out.push_str(&format!("\nstrong trends: {}\n", strong.join(", ")));
    }
    out
}

pub fn render_scan_table(outcome: &ScanOutcome, top: usize) -> String {
    if outcome.rows.is_empty() {
        return "No results.\n".to_string();
    }

    let mut out = rule('=');
    out.push_str("Trend ranking (by score)\n");
    out.push_str(&rule('='));
    out.push_str(&format!(
        "{:>4}  {:>5}  {:<10} {:<12} {:>8} {:>8}  name\n",
        "rank", "score", "symbol", "trend", "1y", "MA50"
    ));
    out.push_str(&rule('-'));
    for (i, r) in outcome.top(top).iter().enumerate() {
        out.push_str(&format!(
            "{:>4}  {:>5}  {:<10} {:<12} {:>+7.1}% {:>+7.1}%  {}\n",
            i + 1,
            r.score,
            r.symbol,
            r.trend_type.as_str(),
            r.yearly_return,
            r.ma50_slope,
            truncate(&r.name, 18)
        ));
    }

    let tally = outcome.tally();
    let count = |label: TrendLabel| tally.get(&label).copied().unwrap_or(0);
    out.push_str(&rule('-'));
    out.push_str(&format!("{} symbols analysed\n", outcome.rows.len()));
    for label in [
        TrendLabel::StrongTrend,
        TrendLabel::WeakTrend,
        TrendLabel::Sideways,
        TrendLabel::Downtrend,
    ] {
        out.push_str(&format!("  {:<13} {}\n", label.as_str(), count(label)));
    }

    let strong: Vec<&str> = outcome
        .with_label(TrendLabel::StrongTrend)
        .take(10)
        .map(|r| r.symbol.as_str())
        .collect();
    if !strong.is_empty() {
        out.push_str(&format!("watch: {}\n", strong.join(", ")));
    }
    if !outcome.skipped.is_empty() {
        out.push_str(&format!("{} symbols skipped\n", outcome.skipped.len()));
    }
    if outcome.cancelled {
        out.push_str("scan cancelled, results are partial\n");
    }
    out
}

pub fn render_backtest(symbol: &str, name: &str, result: &BacktestResult) -> String {
    let mut out = format!("[{} {}]\n", symbol, name);
    out.push_str(&format!(
        "  timing:       {:+.1}% ({} trades, {} buy signals)\n",
        result.timing_return,
        result.trades.len(),
        result.buy_signals
    ));
    out.push_str(&format!("  buy and hold: {:+.1}%\n", result.bh_return));
    let verdict = if result.difference > 0.0 {
        "timing wins"
    } else {
        "buy and hold wins"
    };
    out.push_str(&format!(
        "  difference:   {:+.1}% ({})\n",
        result.difference, verdict
    ));
    out
}

pub fn render_backtest_summary(summary: &BacktestSummary) -> String {
    let mut out = rule('=');
    out.push_str(&format!("Summary over {} symbols\n", summary.runs));
    out.push_str(&rule('='));
    out.push_str("average return:\n");
    out.push_str(&format!("  timing:       {:+.1}%\n", summary.avg_timing_return));
    out.push_str(&format!("  buy and hold: {:+.1}%\n", summary.avg_bh_return));
    out.push_str(&format!(
        "record: timing {} - {} buy and hold\n",
        summary.timing_wins, summary.bh_wins
    ));
    let edge = summary.avg_timing_return - summary.avg_bh_return;
    if summary.timing_outperformed() {
        out.push_str(&format!("timing strategy ahead by {:+.1}%\n", edge));
    } else {
        out.push_str(&format!("buy and hold ahead by {:+.1}%\n", -edge));
    }
    out
}
