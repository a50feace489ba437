//! Simple moving average of close.
//!
//! Each valid point is the mean of `close[i - period + 1 ..= i]`, summed
//! fresh per window so any prefix of a series yields the same values as the
//! full series.
//!
//! Warmup: first `period - 1` bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::price_bar::PriceBar;

pub fn calculate_sma(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if period == 0 || i + 1 < period {
                IndicatorPoint::invalid(bar.date)
            } else {
                let sum: f64 = bars[i + 1 - period..=i].iter().map(|b| b.close).sum();
                IndicatorPoint::valid(bar.date, sum / period as f64)
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}
