//! Average True Range.
//!
//! Two deliberately separate computations live here:
//! - [`calculate_atr`]: trailing mean of the true range, where the first bar
//!   falls back to `high - low`. Used by both analyzers.
//! - [`range_atr`]: mean of plain `high - low` over a window ending at a bar,
//!   with no gap terms. Used only by the backtest trailing stop.
//!
//! The two disagree whenever price gaps between sessions.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::price_bar::PriceBar;

pub fn true_ranges(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.range()
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect()
}

/// Warmup: first `period - 1` bars are invalid.
pub fn calculate_atr(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    let tr_values = true_ranges(bars);

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if period == 0 || i + 1 < period {
                IndicatorPoint::invalid(bar.date)
            } else {
                let sum: f64 = tr_values[i + 1 - period..=i].iter().sum();
                IndicatorPoint::valid(bar.date, sum / period as f64)
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Atr(period),
        values,
    }
}

/// Mean `high - low` over `bars[end - lookback ..= end]`, clamped at the
/// start of the series. The window holds `lookback + 1` bars once enough
/// history exists. Returns 0.0 when `end` is out of range.
pub fn range_atr(bars: &[PriceBar], end: usize, lookback: usize) -> f64 {
    if end >= bars.len() {
        return 0.0;
    }
    let window = &bars[end.saturating_sub(lookback)..=end];
    window.iter().map(PriceBar::range).sum::<f64>() / window.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_bar(day: u32, high: f64, low: f64, close: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high,
            low,
            close,
            volume: Some(1000),
        }
    }

    #[test]
    fn atr_warmup_is_flagged() {
        let bars: Vec<PriceBar> = (1..=5).map(|d| make_bar(d, 110.0, 90.0, 100.0)).collect();
        let series = calculate_atr(&bars, 3);
        assert_eq!(series.len(), 5);
        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[2].valid);
        assert!(series.values[4].valid);
    }

    #[test]
    fn first_true_range_falls_back_to_high_low() {
        let bars = vec![make_bar(1, 110.0, 100.0, 105.0), make_bar(2, 130.0, 120.0, 125.0)];
        let tr = true_ranges(&bars);
        assert_relative_eq!(tr[0], 10.0);
        // gap up: |130 - 105| = 25
        assert_relative_eq!(tr[1], 25.0);
    }

    #[test]
    fn atr_is_trailing_mean_of_true_range() {
        let bars = vec![
            make_bar(1, 110.0, 100.0, 105.0),
            make_bar(2, 115.0, 105.0, 110.0),
            make_bar(3, 120.0, 110.0, 115.0),
            make_bar(4, 140.0, 130.0, 135.0),
        ];
        let series = calculate_atr(&bars, 3);
        assert_relative_eq!(series.value_at(2).unwrap(), 10.0);
        // window TRs: 10, 10, |140 - 115| = 25
        assert_relative_eq!(series.value_at(3).unwrap(), 15.0);
    }

    #[test]
    fn atr_of_flat_series_is_zero() {
        let bars: Vec<PriceBar> = (1..=20).map(|d| make_bar(d, 50.0, 50.0, 50.0)).collect();
        let series = calculate_atr(&bars, 14);
        assert_eq!(series.last_value(), Some(0.0));
    }

    #[test]
    fn range_atr_ignores_gaps() {
        let bars = vec![
            make_bar(1, 110.0, 100.0, 105.0),
            make_bar(2, 130.0, 120.0, 125.0),
        ];
        assert_relative_eq!(range_atr(&bars, 1, 14), 10.0);
        let series = calculate_atr(&bars, 2);
        assert_relative_eq!(series.value_at(1).unwrap(), 17.5);
    }

    #[test]
    fn range_atr_window_is_inclusive() {
        let bars: Vec<PriceBar> = (1..=20)
            .map(|d| make_bar(d, 100.0 + d as f64, 100.0, 100.0))
            .collect();
        // end = 19, lookback 2 -> bars 17, 18, 19 with ranges 18, 19, 20
        assert_relative_eq!(range_atr(&bars, 19, 2), 19.0);
    }

    #[test]
    fn range_atr_out_of_range_end() {
        assert_eq!(range_atr(&[], 0, 14), 0.0);
    }
}
