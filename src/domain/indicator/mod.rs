//! Technical indicators over a price window.
//!
//! Every indicator returns an [`IndicatorSeries`] index-aligned with its input.
//! Points before the warmup window is satisfied carry `valid: false` and a
//! placeholder value of `0.0`; callers must check the flag.

pub mod atr;
pub mod rsi;
pub mod sma;

use chrono::NaiveDate;
use std::fmt;

use crate::domain::price_bar::PriceBar;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: f64,
}

impl IndicatorPoint {
    pub(crate) fn invalid(date: NaiveDate) -> Self {
        IndicatorPoint {
            date,
            valid: false,
            value: 0.0,
        }
    }

    pub(crate) fn valid(date: NaiveDate, value: f64) -> Self {
        IndicatorPoint {
            date,
            valid: true,
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Rsi(usize),
    Atr(usize),
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index`, or `None` when out of range or still warming up.
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values
            .get(index)
            .filter(|p| p.valid)
            .map(|p| p.value)
    }

    pub fn last_value(&self) -> Option<f64> {
        self.values.len().checked_sub(1).and_then(|i| self.value_at(i))
    }
}

/// The indicator bundle both analyzers draw from.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    pub sma20: IndicatorSeries,
    pub sma50: IndicatorSeries,
    pub sma200: IndicatorSeries,
    pub rsi14: IndicatorSeries,
    pub atr14: IndicatorSeries,
}

impl IndicatorSet {
    pub fn compute(bars: &[PriceBar]) -> Self {
        IndicatorSet {
            sma20: sma::calculate_sma(bars, 20),
            sma50: sma::calculate_sma(bars, 50),
            sma200: sma::calculate_sma(bars, 200),
            rsi14: rsi::calculate_rsi(bars, 14),
            atr14: atr::calculate_atr(bars, 14),
        }
    }

    pub fn get(&self, indicator_type: IndicatorType) -> Option<&IndicatorSeries> {
        [
            &self.sma20,
            &self.sma50,
            &self.sma200,
            &self.rsi14,
            &self.atr14,
        ]
        .into_iter()
        .find(|s| s.indicator_type == indicator_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars(count: usize) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        (0..count)
            .map(|i| {
                let close = 100.0 + i as f64;
                PriceBar {
                    date: start + chrono::Duration::days(i as i64),
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: Some(1000),
                }
            })
            .collect()
    }

    #[test]
    fn indicator_type_display() {
        assert_eq!(IndicatorType::Sma(20).to_string(), "SMA(20)");
        assert_eq!(IndicatorType::Rsi(14).to_string(), "RSI(14)");
        assert_eq!(IndicatorType::Atr(14).to_string(), "ATR(14)");
    }

    #[test]
    fn value_at_respects_valid_flag() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let series = IndicatorSeries {
            indicator_type: IndicatorType::Sma(2),
            values: vec![IndicatorPoint::invalid(date), IndicatorPoint::valid(date, 5.0)],
        };
        assert_eq!(series.value_at(0), None);
        assert_eq!(series.value_at(1), Some(5.0));
        assert_eq!(series.value_at(2), None);
        assert_eq!(series.last_value(), Some(5.0));
    }

    #[test]
    fn last_value_of_empty_series_is_none() {
        let series = IndicatorSeries {
            indicator_type: IndicatorType::Atr(14),
            values: vec![],
        };
        assert!(series.is_empty());
        assert_eq!(series.last_value(), None);
    }

    #[test]
    fn set_is_index_aligned() {
        let input = bars(210);
        let set = IndicatorSet::compute(&input);
        for series in [&set.sma20, &set.sma50, &set.sma200, &set.rsi14, &set.atr14] {
            assert_eq!(series.len(), input.len());
        }
        assert!(set.sma200.value_at(198).is_none());
        assert!(set.sma200.value_at(199).is_some());
    }

    #[test]
    fn set_lookup_by_type() {
        let set = IndicatorSet::compute(&bars(60));
        assert_eq!(
            set.get(IndicatorType::Sma(50)).map(|s| s.indicator_type),
            Some(IndicatorType::Sma(50))
        );
        assert!(set.get(IndicatorType::Sma(100)).is_none());
    }
}
