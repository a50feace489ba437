//! Configuration validation.
//!
//! Every key is optional. A key that is present must parse and fall in
//! range, otherwise the run stops before any data is read.

use std::str::FromStr;
use std::time::Duration;

use crate::domain::error::TrendscanError;
use crate::ports::config_port::ConfigPort;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), TrendscanError> {
    validate_data_section(config)?;
    validate_scan_section(config)?;
    validate_backtest_section(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> TrendscanError {
    TrendscanError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// `Ok(None)` when the key is absent.
fn parsed<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, TrendscanError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| invalid(section, key, &format!("'{}' is not a valid number", raw))),
    }
}

fn validate_data_section(config: &dyn ConfigPort) -> Result<(), TrendscanError> {
    if let Some(days) = parsed::<i64>(config, "data", "lookback_days")? {
        if days <= 0 {
            return Err(invalid("data", "lookback_days", "lookback_days must be positive"));
        }
    }
    if let Some(dir) = config.get_string("data", "dir") {
        if dir.trim().is_empty() {
            return Err(invalid("data", "dir", "dir must not be empty"));
        }
    }
    Ok(())
}

fn validate_scan_section(config: &dyn ConfigPort) -> Result<(), TrendscanError> {
    if let Some(size) = parsed::<i64>(config, "scan", "batch_size")? {
        if size <= 0 {
            return Err(invalid("scan", "batch_size", "batch_size must be positive"));
        }
    }
    if let Some(delay) = parsed::<f64>(config, "scan", "delay_secs")? {
        if !delay.is_finite() || delay < 0.0 {
            return Err(invalid("scan", "delay_secs", "delay_secs must be non-negative"));
        }
        if Duration::try_from_secs_f64(delay).is_err() {
            return Err(invalid("scan", "delay_secs", "delay_secs is too large"));
        }
    }
    if let Some(top) = parsed::<i64>(config, "scan", "top")? {
        if top <= 0 {
            return Err(invalid("scan", "top", "top must be positive"));
        }
    }
    Ok(())
}

fn validate_backtest_section(config: &dyn ConfigPort) -> Result<(), TrendscanError> {
    if let Some(capital) = parsed::<f64>(config, "backtest", "initial_capital")? {
        if !capital.is_finite() || capital <= 0.0 {
            return Err(invalid(
                "backtest",
                "initial_capital",
                "initial_capital must be positive",
            ));
        }
    }
    if let Some(warmup) = parsed::<i64>(config, "backtest", "warmup")? {
        if warmup < 0 {
            return Err(invalid("backtest", "warmup", "warmup must be non-negative"));
        }
    }
    if let Some(k) = parsed::<f64>(config, "backtest", "atr_multiplier")? {
        if !k.is_finite() || k <= 0.0 {
            return Err(invalid(
                "backtest",
                "atr_multiplier",
                "atr_multiplier must be positive",
            ));
        }
    }
    if let Some(window) = parsed::<i64>(config, "backtest", "stop_window")? {
        if window <= 0 {
            return Err(invalid("backtest", "stop_window", "stop_window must be positive"));
        }
    }
    Ok(())
}
