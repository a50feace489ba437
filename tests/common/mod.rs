#![allow(dead_code)]

use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::HashMap;
use trendscan::domain::error::TrendscanError;
pub use trendscan::domain::price_bar::PriceBar;
use trendscan::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
    pub names: HashMap<String, String>,
    pub fetched: RefCell<Vec<String>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            names: HashMap::new(),
            fetched: RefCell::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    pub fn with_name(mut self, symbol: &str, name: &str) -> Self {
        self.names.insert(symbol.to_string(), name.to_string());
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetched.borrow().len()
    }
}

impl DataPort for MockDataPort {
    fn fetch_history(
        &self,
        symbol: &str,
        _lookback_days: Option<u32>,
    ) -> Result<Vec<PriceBar>, TrendscanError> {
        self.fetched.borrow_mut().push(symbol.to_string());
        if let Some(reason) = self.errors.get(symbol) {
            return Err(TrendscanError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }

    fn display_name(&self, symbol: &str) -> Option<String> {
        self.names.get(symbol).cloned()
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Bar with a 1% band either side of the close.
pub fn make_bar(date: NaiveDate, close: f64) -> PriceBar {
    PriceBar {
        date,
        open: close,
        high: close * 1.01,
        low: close * 0.99,
        close,
        volume: Some(10_000),
    }
}

pub fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
    let start = date(2022, 1, 3);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(start + chrono::Duration::days(i as i64), close))
        .collect()
}

pub fn flat_bars(count: usize, price: f64) -> Vec<PriceBar> {
    bars_from_closes(&vec![price; count])
}

pub fn ramp_bars(count: usize, start_price: f64, step: f64) -> Vec<PriceBar> {
    let closes: Vec<f64> = (0..count).map(|i| start_price + i as f64 * step).collect();
    bars_from_closes(&closes)
}

/// 100 for bars 0..50, then a straight line reaching 150 on the last bar.
pub fn plateau_then_ramp(count: usize) -> Vec<PriceBar> {
    let ramp_len = (count - 50) as f64;
    let closes: Vec<f64> = (0..count)
        .map(|i| {
            if i < 50 {
                100.0
            } else {
                100.0 + (i - 49) as f64 * 50.0 / ramp_len
            }
        })
        .collect();
    bars_from_closes(&closes)
}

/// Uptrend with a superimposed oscillation, so pullbacks and recoveries
/// both occur.
pub fn wavy_uptrend(count: usize) -> Vec<PriceBar> {
    let closes: Vec<f64> = (0..count)
        .map(|i| {
            let t = i as f64;
            100.0 + t * 0.3 + 8.0 * (t / 7.0).sin()
        })
        .collect();
    bars_from_closes(&closes)
}

/// Linear climb from 100 to 199, one bar back down to 185 (an 8% pullback
/// from the 20-day high, just under MA20), then a steady climb from 185.
pub fn dip_then_rise(count: usize) -> Vec<PriceBar> {
    let closes: Vec<f64> = (0..count)
        .map(|i| {
            if i < 100 {
                100.0 + i as f64
            } else {
                185.0 + (i - 100) as f64
            }
        })
        .collect();
    bars_from_closes(&closes)
}
