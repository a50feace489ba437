//! Core domain types and logic.

pub mod price_bar;
pub mod indicator;
pub mod reason;
pub mod trend;
pub mod timing;
pub mod position;
pub mod backtest;
pub mod scan;
pub mod watchlist;
pub mod config_validation;
pub mod error;
