//! CSV export of scan results.

use chrono::{DateTime, Local};

use crate::domain::error::TrendscanError;
use crate::domain::scan::{sort_rows, ScanRow};
use crate::ports::report_port::ReportPort;

pub const HEADER: [&str; 7] = [
    "symbol",
    "name",
    "score",
    "trend_type",
    "yearly_return",
    "ma50_slope",
    "days_above_ma50",
];

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// `trend_scan_YYYYmmdd_HHMMSS.csv` for the given moment.
pub fn default_export_name(now: DateTime<Local>) -> String {
    format!("trend_scan_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

impl ReportPort for CsvReportAdapter {
    fn write_scan(&self, rows: &[ScanRow], output_path: &str) -> Result<(), TrendscanError> {
        let mut sorted = rows.to_vec();
        sort_rows(&mut sorted);

        let mut wtr = csv::Writer::from_path(output_path)?;
        wtr.write_record(HEADER)?;
        for row in &sorted {
            wtr.write_record([
                row.symbol.clone(),
                row.name.clone(),
                row.score.to_string(),
                row.trend_type.as_str().to_string(),
                format!("{:.2}", row.yearly_return),
                format!("{:.2}", row.ma50_slope),
                format!("{:.1}", row.days_above_ma50),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }
}
