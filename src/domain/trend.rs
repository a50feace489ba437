//! Trend screener: is this instrument in a sustained trend?
//!
//! Six additive factors, 100 points in total:
//!
//! | factor                  | max | bands                                   |
//! |-------------------------|-----|-----------------------------------------|
//! | perfect order           | 15  | flat                                    |
//! | MA50 slope, 3 months    | 20  | >10 / >5 / >0 / >-5 / else              |
//! | MA200 slope, 3 months   | 15  | >5 / >0 / >-3 / else                    |
//! | higher highs and lows   | 15  | both / highs / lows / neither           |
//! | trailing-year return    | 20  | >50 / >20 / >0 / else                   |
//! | % of days above MA50    | 15  | >80 / >60 / >40 / else                  |

use chrono::Datelike;
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::indicator::{IndicatorSeries, IndicatorSet};
use crate::domain::price_bar::PriceBar;
use crate::domain::reason::{Factor, Reason};

pub const MIN_BARS: usize = 200;
const CONSISTENCY_WINDOW: usize = 120;
const MIN_SUBPERIOD: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TrendLabel {
    StrongTrend,
    WeakTrend,
    Sideways,
    Downtrend,
    Unknown,
}

impl TrendLabel {
    pub fn from_score(score: u8) -> Self {
        match score {
            75.. => TrendLabel::StrongTrend,
            50..=74 => TrendLabel::WeakTrend,
            25..=49 => TrendLabel::Sideways,
            _ => TrendLabel::Downtrend,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendLabel::StrongTrend => "STRONG_TREND",
            TrendLabel::WeakTrend => "WEAK_TREND",
            TrendLabel::Sideways => "SIDEWAYS",
            TrendLabel::Downtrend => "DOWNTREND",
            TrendLabel::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the six factors are scored from. Percentages are in percent
/// units (12.5 means 12.5%).
#[derive(Debug, Clone, PartialEq)]
pub struct TrendMetrics {
    pub current_price: f64,
    pub ma20: f64,
    pub ma50: f64,
    pub ma200: f64,
    pub ma50_slope_1m: f64,
    pub ma50_slope_3m: f64,
    pub ma200_slope: f64,
    pub price_vs_ma20: f64,
    pub price_vs_ma50: f64,
    pub price_vs_ma200: f64,
    pub perfect_order: bool,
    pub higher_highs: bool,
    pub higher_lows: bool,
    pub ytd_return: f64,
    pub yearly_return: f64,
    pub atr_pct: f64,
    pub days_above_ma50: f64,
}

impl TrendMetrics {
    /// Named view of the metrics; booleans map to 1.0 / 0.0.
    pub fn to_map(&self) -> BTreeMap<&'static str, f64> {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        BTreeMap::from([
            ("current_price", self.current_price),
            ("ma20", self.ma20),
            ("ma50", self.ma50),
            ("ma200", self.ma200),
            ("ma50_slope_1m", self.ma50_slope_1m),
            ("ma50_slope_3m", self.ma50_slope_3m),
            ("ma200_slope", self.ma200_slope),
            ("price_vs_ma20", self.price_vs_ma20),
            ("price_vs_ma50", self.price_vs_ma50),
            ("price_vs_ma200", self.price_vs_ma200),
            ("perfect_order", flag(self.perfect_order)),
            ("higher_highs", flag(self.higher_highs)),
            ("higher_lows", flag(self.higher_lows)),
            ("ytd_return", self.ytd_return),
            ("yearly_return", self.yearly_return),
            ("atr_pct", self.atr_pct),
            ("days_above_ma50", self.days_above_ma50),
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendAnalysis {
    pub score: u8,
    pub label: TrendLabel,
    pub reasons: Vec<Reason>,
    /// `None` only when the window was too short to analyze.
    pub metrics: Option<TrendMetrics>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TrendScreener;

impl TrendScreener {
    /// Never fails: a window shorter than [`MIN_BARS`] yields
    /// `UNKNOWN` with score 0 and a single reason.
    pub fn analyze(&self, bars: &[PriceBar]) -> TrendAnalysis {
        if bars.len() < MIN_BARS {
            return TrendAnalysis {
                score: 0,
                label: TrendLabel::Unknown,
                reasons: vec![Reason::insufficient_data(MIN_BARS)],
                metrics: None,
            };
        }

        let metrics = compute_metrics(bars);
        let reasons = score_metrics(&metrics);
        let score: u8 = reasons.iter().map(|r| r.points).sum();

        TrendAnalysis {
            score,
            label: TrendLabel::from_score(score),
            reasons,
            metrics: Some(metrics),
        }
    }
}

/// Percent change from `base` to `value`; 0 when the base is not positive.
pub(crate) fn pct_change(base: f64, value: f64) -> f64 {
    if base > 0.0 {
        (value - base) / base * 100.0
    } else {
        0.0
    }
}

/// Percent change of an indicator between `lag` bars ago and now; 0 when
/// either end is still warming up.
pub(crate) fn series_slope(series: &IndicatorSeries, lag: usize) -> f64 {
    let n = series.len();
    match (
        n.checked_sub(lag).and_then(|i| series.value_at(i)),
        series.last_value(),
    ) {
        (Some(then), Some(now)) => pct_change(then, now),
        _ => 0.0,
    }
}

/// Callers guarantee at least [`MIN_BARS`] bars.
pub fn compute_metrics(bars: &[PriceBar]) -> TrendMetrics {
    let n = bars.len();
    let indicators = IndicatorSet::compute(bars);
    let last = &bars[n - 1];
    let current_price = last.close;

    let ma20 = indicators.sma20.last_value().unwrap_or(0.0);
    let ma50 = indicators.sma50.last_value().unwrap_or(0.0);
    let ma200 = indicators.sma200.last_value().unwrap_or(0.0);

    let (higher_highs, higher_lows) = higher_highs_lows(bars);

    let ytd_start = bars
        .iter()
        .position(|b| b.date.year() == last.date.year())
        .unwrap_or(0);

    let atr = indicators.atr14.last_value().unwrap_or(0.0);
    let atr_pct = if current_price > 0.0 {
        atr / current_price * 100.0
    } else {
        0.0
    };

    TrendMetrics {
        current_price,
        ma20,
        ma50,
        ma200,
        ma50_slope_1m: series_slope(&indicators.sma50, 20),
        ma50_slope_3m: series_slope(&indicators.sma50, 60),
        ma200_slope: series_slope(&indicators.sma200, 60),
        price_vs_ma20: pct_change(ma20, current_price),
        price_vs_ma50: pct_change(ma50, current_price),
        price_vs_ma200: pct_change(ma200, current_price),
        perfect_order: current_price > ma20 && ma20 > ma50 && ma50 > ma200,
        higher_highs,
        higher_lows,
        ytd_return: pct_change(bars[ytd_start].close, current_price),
        yearly_return: pct_change(bars[0].close, current_price),
        atr_pct,
        days_above_ma50: days_above(bars, &indicators.sma50, CONSISTENCY_WINDOW),
    }
}

/// Splits the last `3 * (n / 3)` bars into three consecutive periods and checks
/// whether period highs and period lows strictly rise. Both flags are false
/// unless each period holds more than 20 bars.
pub fn higher_highs_lows(bars: &[PriceBar]) -> (bool, bool) {
    let period = bars.len() / 3;
    if period <= MIN_SUBPERIOD {
        return (false, false);
    }

    let window = &bars[bars.len() - period * 3..];
    let (mut highs, mut lows) = ([0.0; 3], [0.0; 3]);
    for (k, chunk) in window.chunks(period).enumerate() {
        highs[k] = chunk.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        lows[k] = chunk.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    }

    (
        highs[0] < highs[1] && highs[1] < highs[2],
        lows[0] < lows[1] && lows[1] < lows[2],
    )
}

/// Percentage of the last `window` bars closing above the MA. 0 when the
/// series is shorter than the window.
fn days_above(bars: &[PriceBar], ma: &IndicatorSeries, window: usize) -> f64 {
    let n = bars.len();
    if n < window {
        return 0.0;
    }
    let above = (n - window..n)
        .filter(|&i| ma.value_at(i).is_some_and(|m| bars[i].close > m))
        .count();
    above as f64 / window as f64 * 100.0
}

/// One reason per factor, in fixed order.
pub fn score_metrics(m: &TrendMetrics) -> Vec<Reason> {
    vec![
        score_perfect_order(m.perfect_order),
        score_ma50_slope(m.ma50_slope_3m),
        score_ma200_slope(m.ma200_slope),
        score_higher_highs_lows(m.higher_highs, m.higher_lows),
        score_yearly_return(m.yearly_return),
        score_days_above_ma50(m.days_above_ma50),
    ]
}

pub fn score_perfect_order(perfect_order: bool) -> Reason {
    if perfect_order {
        Reason::new(Factor::PerfectOrder, 0, 15, 1.0)
    } else {
        Reason::new(Factor::PerfectOrder, 1, 0, 0.0)
    }
}

pub fn score_ma50_slope(slope: f64) -> Reason {
    let (band, points) = if slope > 10.0 {
        (0, 20)
    } else if slope > 5.0 {
        (1, 15)
    } else if slope > 0.0 {
        (2, 8)
    } else if slope > -5.0 {
        (3, 3)
    } else {
        (4, 0)
    };
    Reason::new(Factor::Ma50Slope3m, band, points, slope)
}

pub fn score_ma200_slope(slope: f64) -> Reason {
    let (band, points) = if slope > 5.0 {
        (0, 15)
    } else if slope > 0.0 {
        (1, 10)
    } else if slope > -3.0 {
        (2, 5)
    } else {
        (3, 0)
    };
    Reason::new(Factor::Ma200Slope, band, points, slope)
}

pub fn score_higher_highs_lows(higher_highs: bool, higher_lows: bool) -> Reason {
    let (band, points) = match (higher_highs, higher_lows) {
        (true, true) => (0, 15),
        (true, false) => (1, 10),
        (false, true) => (2, 8),
        (false, false) => (3, 0),
    };
    Reason::new(Factor::HigherHighsLows, band, points, 0.0)
}

pub fn score_yearly_return(yearly_return: f64) -> Reason {
    let (band, points) = if yearly_return > 50.0 {
        (0, 20)
    } else if yearly_return > 20.0 {
        (1, 15)
    } else if yearly_return > 0.0 {
        (2, 8)
    } else {
        (3, 0)
    };
    Reason::new(Factor::YearlyReturn, band, points, yearly_return)
}

pub fn score_days_above_ma50(days: f64) -> Reason {
    let (band, points) = if days > 80.0 {
        (0, 15)
    } else if days > 60.0 {
        (1, 10)
    } else if days > 40.0 {
        (2, 5)
    } else {
        (3, 0)
    };
    Reason::new(Factor::DaysAboveMa50, band, points, days)
}
