//! JSON report adapter.

use crate::domain::error::KumoError;
use crate::domain::report::BacktestResponse;
use crate::ports::report_port::ReportPort;
use std::fs;
use std::path::Path;

/// Writes the response envelope as pretty-printed JSON.
pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn render(response: &BacktestResponse) -> Result<String, KumoError> {
        serde_json::to_string_pretty(response).map_err(|e| KumoError::ReportWrite {
            reason: format!("failed to serialize report: {}", e),
        })
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(&self, response: &BacktestResponse, output_path: &Path) -> Result<(), KumoError> {
        let json = Self::render(response)?;

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| KumoError::ReportWrite {
                reason: format!("failed to create {}: {}", parent.display(), e),
            })?;
        }

        fs::write(output_path, json).map_err(|e| KumoError::ReportWrite {
            reason: format!("failed to write {}: {}", output_path.display(), e),
        })?;

        tracing::info!(path = %output_path.display(), "report written");
        Ok(())
    }
}
