//! trendscan: trend screening and buy-timing analysis for daily price series.
//!
//! Hexagonal architecture: scoring and simulation in [`domain`], port traits
//! in [`ports`], file-backed implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
