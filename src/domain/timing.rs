//! Buy-timing analyzer: is now a good entry inside the trend?
//!
//! Five additive factors, 100 points in total. Pullback depth is scored
//! non-monotonically: a 5-15% dip from the 20-day high earns the most, while
//! both shallower and deeper dips earn less.

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::indicator::atr::calculate_atr;
use crate::domain::indicator::rsi::{calculate_rsi, NEUTRAL_RSI};
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::price_bar::PriceBar;
use crate::domain::reason::{Factor, Reason};
use crate::domain::trend::{pct_change, series_slope};

pub const MIN_BARS: usize = 50;
const HIGH_LOOKBACK: usize = 20;
const VOLUME_LOOKBACK: usize = 20;
const SLOPE_LAG: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingSignal {
    BuyNow,
    Wait,
    NotYet,
}

impl TimingSignal {
    pub fn from_score(score: u8) -> Self {
        match score {
            70.. => TimingSignal::BuyNow,
            50..=69 => TimingSignal::Wait,
            _ => TimingSignal::NotYet,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimingSignal::BuyNow => "BUY_NOW",
            TimingSignal::Wait => "WAIT",
            TimingSignal::NotYet => "NOT_YET",
        }
    }
}

impl fmt::Display for TimingSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimingConditions {
    pub current_price: f64,
    pub ma20: f64,
    pub ma50: f64,
    pub rsi: f64,
    pub atr: f64,
    pub pullback_pct: f64,
    pub ma50_slope: f64,
    pub vol_ratio: f64,
    pub price_vs_ma20: f64,
    pub price_vs_ma50: f64,
}

impl TimingConditions {
    pub fn to_map(&self) -> BTreeMap<&'static str, f64> {
        BTreeMap::from([
            ("current_price", self.current_price),
            ("ma20", self.ma20),
            ("ma50", self.ma50),
            ("rsi", self.rsi),
            ("atr", self.atr),
            ("pullback_pct", self.pullback_pct),
            ("ma50_slope", self.ma50_slope),
            ("vol_ratio", self.vol_ratio),
            ("price_vs_ma20", self.price_vs_ma20),
            ("price_vs_ma50", self.price_vs_ma50),
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimingAnalysis {
    pub score: u8,
    pub signal: TimingSignal,
    pub reasons: Vec<Reason>,
    pub conditions: Option<TimingConditions>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuyTimingAnalyzer;

impl BuyTimingAnalyzer {
    /// Never fails: a window shorter than [`MIN_BARS`] yields `NOT_YET`
    /// with score 0 and a single reason.
    pub fn analyze(&self, bars: &[PriceBar]) -> TimingAnalysis {
        if bars.len() < MIN_BARS {
            return TimingAnalysis {
                score: 0,
                signal: TimingSignal::NotYet,
                reasons: vec![Reason::insufficient_data(MIN_BARS)],
                conditions: None,
            };
        }

        let conditions = compute_conditions(bars);
        let reasons = score_conditions(&conditions);
        let score: u8 = reasons.iter().map(|r| r.points).sum();

        TimingAnalysis {
            score,
            signal: TimingSignal::from_score(score),
            reasons,
            conditions: Some(conditions),
        }
    }
}

/// Callers guarantee at least [`MIN_BARS`] bars.
pub fn compute_conditions(bars: &[PriceBar]) -> TimingConditions {
    let n = bars.len();
    let sma20 = calculate_sma(bars, 20);
    let sma50 = calculate_sma(bars, 50);
    let rsi = calculate_rsi(bars, 14);
    let atr = calculate_atr(bars, 14);

    let current_price = bars[n - 1].close;
    let ma20 = sma20.last_value().unwrap_or(0.0);
    let ma50 = sma50.last_value().unwrap_or(0.0);

    let high_20d = bars[n.saturating_sub(HIGH_LOOKBACK)..]
        .iter()
        .map(|b| b.high)
        .fold(f64::NEG_INFINITY, f64::max);
    let pullback_pct = if high_20d > 0.0 {
        (high_20d - current_price) / high_20d * 100.0
    } else {
        0.0
    };

    TimingConditions {
        current_price,
        ma20,
        ma50,
        rsi: rsi.last_value().unwrap_or(NEUTRAL_RSI),
        atr: atr.last_value().unwrap_or(0.0),
        pullback_pct,
        ma50_slope: series_slope(&sma50, SLOPE_LAG),
        vol_ratio: volume_ratio(bars),
        price_vs_ma20: pct_change(ma20, current_price),
        price_vs_ma50: pct_change(ma50, current_price),
    }
}

/// Latest volume over the mean of the trailing 20 volumes (current bar
/// included). 1.0 when any of them is missing, the mean is zero, or there
/// is not enough history.
pub fn volume_ratio(bars: &[PriceBar]) -> f64 {
    if bars.len() < VOLUME_LOOKBACK {
        return 1.0;
    }
    let window = &bars[bars.len() - VOLUME_LOOKBACK..];
    let volumes: Option<Vec<u64>> = window.iter().map(|b| b.volume).collect();
    let Some(volumes) = volumes else {
        return 1.0;
    };
    let avg = volumes.iter().map(|&v| v as f64).sum::<f64>() / VOLUME_LOOKBACK as f64;
    match volumes.last() {
        Some(&latest) if avg > 0.0 => latest as f64 / avg,
        _ => 1.0,
    }
}

/// One reason per factor, in fixed order.
pub fn score_conditions(c: &TimingConditions) -> Vec<Reason> {
    vec![
        score_trend_direction(c.ma50_slope),
        score_pullback(c.pullback_pct),
        score_price_vs_ma20(c.price_vs_ma20),
        score_rsi(c.rsi),
        score_price_vs_ma50(c.price_vs_ma50),
    ]
}

pub fn score_trend_direction(ma50_slope: f64) -> Reason {
    let (band, points) = if ma50_slope > 1.0 {
        (0, 20)
    } else if ma50_slope > 0.0 {
        (1, 10)
    } else {
        (2, 0)
    };
    Reason::new(Factor::TrendDirection, band, points, ma50_slope)
}

pub fn score_pullback(pullback_pct: f64) -> Reason {
    let (band, points) = if (5.0..=15.0).contains(&pullback_pct) {
        (0, 25)
    } else if (3.0..5.0).contains(&pullback_pct) {
        (1, 15)
    } else if pullback_pct > 15.0 && pullback_pct <= 25.0 {
        (2, 15)
    } else if pullback_pct < 3.0 {
        (3, 5)
    } else {
        (4, 0)
    };
    Reason::new(Factor::PullbackDepth, band, points, pullback_pct)
}

pub fn score_price_vs_ma20(deviation: f64) -> Reason {
    let (band, points) = if (-5.0..=2.0).contains(&deviation) {
        (0, 20)
    } else if (-10.0..-5.0).contains(&deviation) {
        (1, 15)
    } else if deviation > 2.0 && deviation <= 5.0 {
        (2, 10)
    } else {
        (3, 0)
    };
    Reason::new(Factor::PriceVsMa20, band, points, deviation)
}

pub fn score_rsi(rsi: f64) -> Reason {
    let (band, points) = if (30.0..=45.0).contains(&rsi) {
        (0, 20)
    } else if (25.0..30.0).contains(&rsi) {
        (1, 15)
    } else if rsi > 45.0 && rsi <= 55.0 {
        (2, 10)
    } else if rsi > 70.0 {
        (3, 0)
    } else {
        (4, 5)
    };
    Reason::new(Factor::RsiZone, band, points, rsi)
}

pub fn score_price_vs_ma50(deviation: f64) -> Reason {
    let (band, points) = if deviation > 0.0 {
        (0, 15)
    } else if deviation > -5.0 {
        (1, 10)
    } else {
        (2, 0)
    };
    Reason::new(Factor::PriceVsMa50, band, points, deviation)
}
