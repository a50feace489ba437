//! Price-history access port.

use crate::domain::error::TrendscanError;
use crate::domain::price_bar::PriceBar;

pub trait DataPort {
    /// Ascending bars for `symbol`. With `lookback_days`, only bars within
    /// that many calendar days of the latest bar are returned. An unknown
    /// symbol may return either `NoData` or an empty vector.
    fn fetch_history(
        &self,
        symbol: &str,
        lookback_days: Option<u32>,
    ) -> Result<Vec<PriceBar>, TrendscanError>;

    fn display_name(&self, _symbol: &str) -> Option<String> {
        None
    }
}
