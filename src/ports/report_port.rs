//! Report output port trait.

use crate::domain::error::KumoError;
use crate::domain::report::BacktestResponse;
use std::path::Path;

/// Port for writing backtest responses.
pub trait ReportPort {
    fn write(&self, response: &BacktestResponse, output_path: &Path) -> Result<(), KumoError>;
}
