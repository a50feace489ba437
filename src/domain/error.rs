//! Domain error types.

use chrono::NaiveDate;

use crate::domain::watchlist::WatchlistError;

/// Top-level error type for trendscan.
#[derive(Debug, thiserror::Error)]
pub enum TrendscanError {
    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no price data for {symbol}")]
    NoData { symbol: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Watchlist(#[from] WatchlistError),

    #[error("malformed bar on {date}: {reason}")]
    MalformedBar { date: NaiveDate, reason: String },

    #[error("dates out of order: {next} does not follow {prev}")]
    UnorderedDates { prev: NaiveDate, next: NaiveDate },

    #[error("insufficient data: have {bars} bars, need {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TrendscanError> for std::process::ExitCode {
    fn from(err: &TrendscanError) -> Self {
        let code: u8 = match err {
            TrendscanError::Io(_) | TrendscanError::Csv(_) => 1,
            TrendscanError::ConfigParse { .. } | TrendscanError::ConfigInvalid { .. } => 2,
            TrendscanError::Data { .. }
            | TrendscanError::MalformedBar { .. }
            | TrendscanError::UnorderedDates { .. } => 3,
            TrendscanError::Watchlist(_) => 4,
            TrendscanError::NoData { .. } | TrendscanError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_message() {
        let err = TrendscanError::InsufficientData {
            bars: 42,
            minimum: 60,
        };
        assert_eq!(err.to_string(), "insufficient data: have 42 bars, need 60");
    }

    #[test]
    fn unordered_dates_message() {
        let err = TrendscanError::UnorderedDates {
            prev: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            next: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "dates out of order: 2024-03-01 does not follow 2024-03-02"
        );
    }

    #[test]
    fn watchlist_error_is_transparent() {
        let err = TrendscanError::from(WatchlistError::UnknownIndex {
            name: "nikkei9999".into(),
        });
        assert_eq!(err.to_string(), "unknown index: nikkei9999");
    }

    #[test]
    fn exit_codes_are_distinct_per_category() {
        let config: std::process::ExitCode = (&TrendscanError::ConfigInvalid {
            section: "scan".into(),
            key: "top".into(),
            reason: "must be positive".into(),
        })
            .into();
        let data: std::process::ExitCode = (&TrendscanError::NoData {
            symbol: "7011.T".into(),
        })
            .into();
        assert_eq!(format!("{:?}", config), format!("{:?}", std::process::ExitCode::from(2)));
        assert_eq!(format!("{:?}", data), format!("{:?}", std::process::ExitCode::from(5)));
    }
}
