//! CSV file data adapter.
//!
//! Reads `<dir>/<SYMBOL>.csv` with a header row naming at least `Date`,
//! `Open`, `High`, `Low` and `Close` (any case, any column order). A
//! `Volume` column is optional and extra columns are ignored. Dates may
//! carry a time or timezone suffix after the `YYYY-MM-DD` prefix.

use crate::domain::error::TrendscanError;
use crate::domain::price_bar::{validate_series, PriceBar};
use crate::domain::watchlist::lookup_name;
use crate::ports::data_port::DataPort;
use chrono::{Duration, NaiveDate};
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, TrendscanError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| TrendscanError::Data {
                reason: format!("missing {} column", name),
            })
        };
        Ok(Columns {
            date: require("date")?,
            open: require("open")?,
            high: require("high")?,
            low: require("low")?,
            close: require("close")?,
            volume: find("volume"),
        })
    }
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn parse_bars(content: &str) -> Result<Vec<PriceBar>, TrendscanError> {
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let columns = Columns::from_headers(rdr.headers()?)?;
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result?;
            let field = |idx: usize, name: &str| {
                record
                    .get(idx)
                    .map(str::trim)
                    .ok_or_else(|| TrendscanError::Data {
                        reason: format!("missing {} value", name),
                    })
            };
            let price = |idx: usize, name: &str| -> Result<f64, TrendscanError> {
                field(idx, name)?
                    .parse()
                    .map_err(|e| TrendscanError::Data {
                        reason: format!("invalid {} value: {}", name, e),
                    })
            };

            let date_str = field(columns.date, "date")?;
            let date = NaiveDate::parse_from_str(date_str.get(..10).unwrap_or(date_str), "%Y-%m-%d")
                .map_err(|e| TrendscanError::Data {
                    reason: format!("invalid date '{}': {}", date_str, e),
                })?;

            let volume = match columns.volume.and_then(|idx| record.get(idx)).map(str::trim) {
                None | Some("") => None,
                Some(raw) => Some(parse_volume(raw)?),
            };

            bars.push(PriceBar {
                date,
                open: price(columns.open, "open")?,
                high: price(columns.high, "high")?,
                low: price(columns.low, "low")?,
                close: price(columns.close, "close")?,
                volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

/// Providers sometimes write volume as a float (`12345.0`).
fn parse_volume(raw: &str) -> Result<u64, TrendscanError> {
    if let Ok(v) = raw.parse::<u64>() {
        return Ok(v);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v.round() as u64),
        _ => Err(TrendscanError::Data {
            reason: format!("invalid volume value: {}", raw),
        }),
    }
}

/// Bars within `days` calendar days of the latest bar.
fn trim_lookback(bars: Vec<PriceBar>, days: u32) -> Vec<PriceBar> {
    let Some(last) = bars.last().map(|b| b.date) else {
        return bars;
    };
    let cutoff = last - Duration::days(i64::from(days));
    bars.into_iter().filter(|b| b.date > cutoff).collect()
}

impl DataPort for CsvAdapter {
    fn fetch_history(
        &self,
        symbol: &str,
        lookback_days: Option<u32>,
    ) -> Result<Vec<PriceBar>, TrendscanError> {
        let path = self.csv_path(symbol);
        if !path.exists() {
            return Err(TrendscanError::NoData {
                symbol: symbol.to_string(),
            });
        }
        let content = fs::read_to_string(&path)?;
        let bars = Self::parse_bars(&content).map_err(|e| TrendscanError::Data {
            reason: format!("{}: {}", path.display(), e),
        })?;
        validate_series(&bars)?;

        Ok(match lookback_days {
            Some(days) => trim_lookback(bars, days),
            None => bars,
        })
    }

    fn display_name(&self, symbol: &str) -> Option<String> {
        lookup_name(symbol).map(str::to_string)
    }
}
