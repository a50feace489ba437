//! Single open position and closed-trade records for the backtest.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub entry_index: usize,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub shares: u64,
    pub trailing_high: f64,
}

impl Position {
    pub fn open(entry_index: usize, entry_date: NaiveDate, entry_price: f64, shares: u64) -> Self {
        Position {
            entry_index,
            entry_date,
            entry_price,
            shares,
            trailing_high: entry_price,
        }
    }

    pub fn cost(&self) -> f64 {
        self.shares as f64 * self.entry_price
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.shares as f64 * price
    }

    /// The trailing high only ever moves up.
    pub fn ratchet(&mut self, close: f64) {
        if close > self.trailing_high {
            self.trailing_high = close;
        }
    }

    pub fn stop_price(&self, atr: f64, multiplier: f64) -> f64 {
        self.trailing_high - atr * multiplier
    }

    pub fn should_stop(&self, close: f64, atr: f64, multiplier: f64) -> bool {
        close < self.stop_price(atr, multiplier)
    }

    pub fn close(self, exit_date: NaiveDate, exit_price: f64) -> TradeRecord {
        TradeRecord {
            entry_date: self.entry_date,
            exit_date,
            entry_price: self.entry_price,
            exit_price,
            shares: self.shares,
            pnl_pct: (exit_price - self.entry_price) / self.entry_price * 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_price: f64,
    pub exit_price: f64,
    pub shares: u64,
    pub pnl_pct: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_position() -> Position {
        Position::open(
            60,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            50.0,
            100,
        )
    }

    #[test]
    fn open_initializes_trailing_high_to_entry() {
        let pos = sample_position();
        assert_relative_eq!(pos.trailing_high, 50.0);
        assert_relative_eq!(pos.cost(), 5000.0);
    }

    #[test]
    fn ratchet_only_moves_up() {
        let mut pos = sample_position();
        pos.ratchet(55.0);
        pos.ratchet(52.0);
        assert_relative_eq!(pos.trailing_high, 55.0);
    }

    #[test]
    fn stop_fires_strictly_below_stop_price() {
        let mut pos = sample_position();
        pos.ratchet(60.0);
        // 60 - 2 * 2.5 = 55
        assert_relative_eq!(pos.stop_price(2.5, 2.0), 55.0);
        assert!(!pos.should_stop(55.0, 2.5, 2.0));
        assert!(pos.should_stop(54.9, 2.5, 2.0));
    }

    #[test]
    fn close_records_percentage_pnl() {
        let pos = sample_position();
        let trade = pos.close(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(), 55.0);
        assert_relative_eq!(trade.pnl_pct, 10.0);
        assert_eq!(trade.shares, 100);
        assert_eq!(trade.entry_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn market_value_marks_to_price() {
        assert_relative_eq!(sample_position().market_value(45.0), 4500.0);
    }
}
