//! JSON report adapter implementing ReportPort.

use std::fs;
use std::path::Path;

use crate::domain::error::AlgoError;
use crate::domain::report::JobOutcome;
use crate::ports::report_port::ReportPort;
use tracing::debug;

#[derive(Debug, Default)]
pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(outcome: &JobOutcome) -> Result<String, AlgoError> {
        serde_json::to_string_pretty(outcome).map_err(|e| AlgoError::Io(e.into()))
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(&self, outcome: &JobOutcome, output_path: &Path) -> Result<(), AlgoError> {
        let json = Self::render(outcome)?;
        fs::write(output_path, json)?;
        debug!(path = %output_path.display(), "job outcome written");
        Ok(())
    }
}
