//! Performance report and job outcome, the JSON contract of a run.

use crate::domain::error::{AlgoError, ErrorKind};
use crate::domain::metrics::Metrics;
use crate::domain::ohlcv::PriceBar;
use crate::domain::portfolio::{EquityPoint, Fill};
use crate::domain::prediction::fusion::Confirmation;
use crate::domain::strategy::StrategyType;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    pub ticker: String,
    pub strategy_name: String,
    pub strategy_type: StrategyType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
    #[serde(flatten)]
    pub metrics: Metrics,
    pub final_portfolio_value: f64,
    pub trade_count: usize,
    pub trades: Vec<Fill>,
    pub ml_confirmation: Confirmation,
    pub equity_curve: Vec<EquityPoint>,
    pub price_series: Vec<PriceBar>,
}

/// Why a job failed, without internal detail beyond the error message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFailure {
    pub kind: ErrorKind,
    pub ticker: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy_type: Option<StrategyType>,
    pub message: String,
}

impl JobFailure {
    pub fn from_error(
        err: &AlgoError,
        ticker: impl Into<String>,
        strategy_type: Option<StrategyType>,
    ) -> Self {
        JobFailure {
            kind: err.kind(),
            ticker: ticker.into(),
            strategy_type,
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobResult {
    Success { report: PerformanceReport },
    Failure { error: JobFailure },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(flatten)]
    pub result: JobResult,
}

impl JobOutcome {
    pub fn success(report: PerformanceReport) -> Self {
        JobOutcome {
            job_id: None,
            result: JobResult::Success { report },
        }
    }

    pub fn failure(error: JobFailure) -> Self {
        JobOutcome {
            job_id: None,
            result: JobResult::Failure { error },
        }
    }

    pub fn with_job_id(mut self, job_id: Option<String>) -> Self {
        self.job_id = job_id;
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self.result, JobResult::Success { .. })
    }

    pub fn report(&self) -> Option<&PerformanceReport> {
        match &self.result {
            JobResult::Success { report } => Some(report),
            JobResult::Failure { .. } => None,
        }
    }

    pub fn failure_info(&self) -> Option<&JobFailure> {
        match &self.result {
            JobResult::Success { .. } => None,
            JobResult::Failure { error } => Some(error),
        }
    }
}
