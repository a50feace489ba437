//! Daily price bar and price-series validation.

use chrono::NaiveDate;

use crate::domain::error::TrendscanError;

/// One trading day. A price series is a `[PriceBar]` sorted ascending by
/// date without duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<u64>,
}

impl PriceBar {
    /// high - low
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    fn check(&self) -> Result<(), TrendscanError> {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return Err(TrendscanError::MalformedBar {
                date: self.date,
                reason: "prices must be positive and finite".into(),
            });
        }
        if self.low > self.open.min(self.close) || self.high < self.open.max(self.close) {
            return Err(TrendscanError::MalformedBar {
                date: self.date,
                reason: format!(
                    "open {} / close {} outside low {} .. high {}",
                    self.open, self.close, self.low, self.high
                ),
            });
        }
        Ok(())
    }
}

/// Rejects a window containing a malformed bar or non-increasing dates.
pub fn validate_series(bars: &[PriceBar]) -> Result<(), TrendscanError> {
    for bar in bars {
        bar.check()?;
    }
    for pair in bars.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(TrendscanError::UnorderedDates {
                prev: pair[0].date,
                next: pair[1].date,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            open: 100.0,
            high: 110.0,
            low: 90.0,
            close: 105.0,
            volume: Some(50_000),
        }
    }

    #[test]
    fn range_is_high_minus_low() {
        assert!((sample_bar().range() - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_hl_dominates() {
        let bar = sample_bar();
        assert!((bar.true_range(100.0) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        let bar = sample_bar();
        // |110 - 70| = 40
        assert!((bar.true_range(70.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_down() {
        let bar = sample_bar();
        // |90 - 130| = 40
        assert!((bar.true_range(130.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn validate_accepts_well_formed_series() {
        let first = sample_bar();
        let second = PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 16).unwrap(),
            ..sample_bar()
        };
        assert!(validate_series(&[first, second]).is_ok());
        assert!(validate_series(&[]).is_ok());
    }

    #[test]
    fn validate_rejects_close_above_high() {
        let bar = PriceBar {
            close: 111.0,
            ..sample_bar()
        };
        let err = validate_series(&[bar]).unwrap_err();
        assert!(matches!(err, TrendscanError::MalformedBar { .. }));
    }

    #[test]
    fn validate_rejects_open_below_low() {
        let bar = PriceBar {
            open: 89.0,
            ..sample_bar()
        };
        assert!(validate_series(&[bar]).is_err());
    }

    #[test]
    fn validate_rejects_non_positive_price() {
        let bar = PriceBar {
            low: 0.0,
            ..sample_bar()
        };
        assert!(validate_series(&[bar]).is_err());
    }

    #[test]
    fn validate_rejects_duplicate_dates() {
        let err = validate_series(&[sample_bar(), sample_bar()]).unwrap_err();
        assert!(matches!(err, TrendscanError::UnorderedDates { .. }));
    }
}
