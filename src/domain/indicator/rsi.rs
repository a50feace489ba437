//! RSI (Relative Strength Index).
//!
//! Average gain and loss are the simple means of the per-bar gains and losses
//! over the trailing `period` bars (not Wilder's recursive smoothing).
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Bar 0 has no previous close and is reported as a neutral 50.
//! Bars 1..period are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::price_bar::PriceBar;

pub const NEUTRAL_RSI: f64 = 50.0;

pub fn calculate_rsi(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());

    if let Some(first) = bars.first() {
        values.push(IndicatorPoint::valid(first.date, NEUTRAL_RSI));
    }

    // gains[k] / losses[k] describe the move into bar k + 1.
    let mut gains: Vec<f64> = Vec::with_capacity(bars.len().saturating_sub(1));
    let mut losses: Vec<f64> = Vec::with_capacity(bars.len().saturating_sub(1));
    for pair in bars.windows(2) {
        let change = pair[1].close - pair[0].close;
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    for (i, bar) in bars.iter().enumerate().skip(1) {
        if period == 0 || i < period {
            values.push(IndicatorPoint::invalid(bar.date));
            continue;
        }
        let window = i - period..i;
        let avg_gain = gains[window.clone()].iter().sum::<f64>() / period as f64;
        let avg_loss = losses[window].iter().sum::<f64>() / period as f64;
        values.push(IndicatorPoint::valid(bar.date, rsi_from_averages(avg_gain, avg_loss)));
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}
