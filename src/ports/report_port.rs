//! Scan export port.

use crate::domain::error::TrendscanError;
use crate::domain::scan::ScanRow;

pub trait ReportPort {
    fn write_scan(&self, rows: &[ScanRow], output_path: &str) -> Result<(), TrendscanError>;
}
