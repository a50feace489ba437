//! Structured scoring reasons.
//!
//! Scoring emits `(factor, band, points, value)` tuples; text is produced only
//! by the `Display` impl so the scoring functions stay presentation-free.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Factor {
    /// `value` carries the required bar count.
    InsufficientData,

    // Trend screener
    PerfectOrder,
    Ma50Slope3m,
    Ma200Slope,
    HigherHighsLows,
    YearlyReturn,
    DaysAboveMa50,

    // Buy-timing analyzer
    TrendDirection,
    PullbackDepth,
    PriceVsMa20,
    RsiZone,
    PriceVsMa50,
}

/// One factor's contribution. `band` is the index of the threshold band the
/// value fell into, 0 being the highest-scoring band.
#[derive(Debug, Clone, PartialEq)]
pub struct Reason {
    pub factor: Factor,
    pub band: u8,
    pub points: u8,
    pub value: f64,
}

impl Reason {
    pub fn new(factor: Factor, band: u8, points: u8, value: f64) -> Self {
        Reason {
            factor,
            band,
            points,
            value,
        }
    }

    pub fn insufficient_data(required_bars: usize) -> Self {
        Reason::new(Factor::InsufficientData, 0, 0, required_bars as f64)
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.value;
        match (self.factor, self.band) {
            (Factor::InsufficientData, _) => {
                write!(f, "insufficient data ({:.0} bars required)", v)
            }

            (Factor::PerfectOrder, 0) => write!(f, "✓ perfect order (price > MA20 > MA50 > MA200)"),
            (Factor::PerfectOrder, _) => write!(f, "✗ not in perfect order"),

            (Factor::Ma50Slope3m, 0) => write!(f, "✓ MA50 rising strongly ({:+.1}% over 3 months)", v),
            (Factor::Ma50Slope3m, 1) => write!(f, "○ MA50 rising ({:+.1}% over 3 months)", v),
            (Factor::Ma50Slope3m, 2) => write!(f, "△ MA50 rising slightly ({:+.1}% over 3 months)", v),
            (Factor::Ma50Slope3m, 3) => write!(f, "△ MA50 flat ({:+.1}% over 3 months)", v),
            (Factor::Ma50Slope3m, _) => write!(f, "✗ MA50 falling ({:+.1}% over 3 months)", v),

            (Factor::Ma200Slope, 0) => write!(f, "✓ long-term trend rising (MA200 {:+.1}%)", v),
            (Factor::Ma200Slope, 1) => write!(f, "○ long-term trend edging up (MA200 {:+.1}%)", v),
            (Factor::Ma200Slope, 2) => write!(f, "△ long-term trend flat (MA200 {:+.1}%)", v),
            (Factor::Ma200Slope, _) => write!(f, "✗ long-term trend falling (MA200 {:+.1}%)", v),

            (Factor::HigherHighsLows, 0) => write!(f, "✓ higher highs and higher lows"),
            (Factor::HigherHighsLows, 1) => write!(f, "○ higher highs"),
            (Factor::HigherHighsLows, 2) => write!(f, "○ higher lows"),
            (Factor::HigherHighsLows, _) => write!(f, "✗ no higher highs or higher lows"),

            (Factor::YearlyReturn, 0) => write!(f, "✓ excellent yearly performance ({:+.0}%)", v),
            (Factor::YearlyReturn, 1) => write!(f, "○ good yearly performance ({:+.0}%)", v),
            (Factor::YearlyReturn, 2) => write!(f, "△ positive year ({:+.0}%)", v),
            (Factor::YearlyReturn, _) => write!(f, "✗ negative year ({:+.0}%)", v),

            (Factor::DaysAboveMa50, 0) => write!(f, "✓ consistently above MA50 ({:.0}% of days)", v),
            (Factor::DaysAboveMa50, 1) => write!(f, "○ mostly above MA50 ({:.0}% of days)", v),
            (Factor::DaysAboveMa50, 2) => write!(f, "△ crossing MA50 back and forth ({:.0}% of days)", v),
            (Factor::DaysAboveMa50, _) => write!(f, "✗ mostly below MA50 ({:.0}% of days)", v),

            (Factor::TrendDirection, 0) => write!(f, "✓ uptrend (MA50 slope {:+.1}%)", v),
            (Factor::TrendDirection, 1) => write!(f, "△ gentle uptrend (MA50 slope {:+.1}%)", v),
            (Factor::TrendDirection, _) => write!(f, "✗ downtrend (MA50 slope {:+.1}%)", v),

            (Factor::PullbackDepth, 0) => write!(f, "✓ ideal pullback (-{:.1}% from high)", v),
            (Factor::PullbackDepth, 1) => write!(f, "△ shallow pullback (-{:.1}% from high)", v),
            (Factor::PullbackDepth, 2) => write!(f, "△ deep pullback (-{:.1}% from high)", v),
            (Factor::PullbackDepth, 3) => write!(f, "✗ near highs (-{:.1}% from high)", v),
            (Factor::PullbackDepth, _) => write!(f, "✗ fallen too far (-{:.1}% from high)", v),

            (Factor::PriceVsMa20, 0) => write!(f, "✓ inside MA20 support zone ({:+.1}%)", v),
            (Factor::PriceVsMa20, 1) => write!(f, "△ below MA20 ({:+.1}%)", v),
            (Factor::PriceVsMa20, 2) => write!(f, "△ slightly extended above MA20 ({:+.1}%)", v),
            (Factor::PriceVsMa20, _) => write!(f, "✗ far from MA20 ({:+.1}%)", v),

            (Factor::RsiZone, 0) => write!(f, "✓ RSI rebound zone (RSI={:.0})", v),
            (Factor::RsiZone, 1) => write!(f, "△ RSI oversold, awaiting rebound (RSI={:.0})", v),
            (Factor::RsiZone, 2) => write!(f, "△ RSI neutral (RSI={:.0})", v),
            (Factor::RsiZone, 3) => write!(f, "✗ RSI overbought (RSI={:.0})", v),
            (Factor::RsiZone, _) => write!(f, "RSI={:.0}", v),

            (Factor::PriceVsMa50, 0) => write!(f, "✓ above MA50 (long-term uptrend)"),
            (Factor::PriceVsMa50, 1) => write!(f, "△ near MA50"),
            (Factor::PriceVsMa50, _) => write!(f, "✗ below MA50 (long-term trend weak)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_renders_requirement() {
        assert_eq!(
            Reason::insufficient_data(200).to_string(),
            "insufficient data (200 bars required)"
        );
    }

    #[test]
    fn signed_values_render_with_sign() {
        let up = Reason::new(Factor::Ma50Slope3m, 0, 20, 12.345);
        let down = Reason::new(Factor::Ma50Slope3m, 4, 0, -7.34);
        assert_eq!(up.to_string(), "✓ MA50 rising strongly (+12.3% over 3 months)");
        assert_eq!(down.to_string(), "✗ MA50 falling (-7.3% over 3 months)");
    }

    #[test]
    fn shallow_and_deep_pullbacks_render_differently() {
        let shallow = Reason::new(Factor::PullbackDepth, 1, 15, 4.0);
        let deep = Reason::new(Factor::PullbackDepth, 2, 15, 20.0);
        assert_ne!(shallow.to_string(), deep.to_string());
        assert_eq!(shallow.points, deep.points);
    }

    #[test]
    fn residual_rsi_band_has_no_mark() {
        let reason = Reason::new(Factor::RsiZone, 4, 5, 62.4);
        assert_eq!(reason.to_string(), "RSI=62");
    }
}
