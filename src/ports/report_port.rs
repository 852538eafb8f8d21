//! Job outcome output port.

use crate::domain::error::AlgoError;
use crate::domain::report::JobOutcome;
use std::path::Path;

/// Port for persisting the outcome of one backtest job.
pub trait ReportPort {
    fn write(&self, outcome: &JobOutcome, output_path: &Path) -> Result<(), AlgoError>;
}
