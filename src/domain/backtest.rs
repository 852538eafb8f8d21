//! Simulation orchestrator.
//!
//! One run: signals -> optional fusion -> portfolio replay -> metrics ->
//! report. [`run_simulation`] does no I/O; [`run_job`] wraps it with a price
//! fetch and turns every failure into a [`JobOutcome`].

use crate::domain::error::AlgoError;
use crate::domain::metrics::{round2, Metrics};
use crate::domain::ohlcv::PriceSeries;
use crate::domain::portfolio::{self, DEFAULT_INITIAL_CAPITAL};
use crate::domain::prediction::fusion;
use crate::domain::prediction::registry::ArtifactRegistry;
use crate::domain::report::{JobFailure, JobOutcome, PerformanceReport};
use crate::domain::strategy::StrategyDescriptor;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
}

impl BacktestConfig {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        BacktestConfig {
            start_date,
            end_date,
            initial_capital: DEFAULT_INITIAL_CAPITAL,
        }
    }

    pub fn with_initial_capital(mut self, initial_capital: f64) -> Self {
        self.initial_capital = initial_capital;
        self
    }

    pub fn validate(&self) -> Result<(), AlgoError> {
        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(AlgoError::invalid(
                "backtest",
                "initial_capital",
                "initial_capital must be positive",
            ));
        }
        if self.start_date >= self.end_date {
            return Err(AlgoError::invalid(
                "backtest",
                "start_date",
                "start_date must be before end_date",
            ));
        }
        Ok(())
    }
}

/// Run one strategy over an already-fetched series.
///
/// Fails only on configuration errors. An unavailable predictive model does
/// not fail the run; the report's `ml_confirmation` says what happened.
pub fn run_simulation(
    descriptor: &StrategyDescriptor,
    series: &PriceSeries,
    registry: &ArtifactRegistry,
    config: &BacktestConfig,
) -> Result<PerformanceReport, AlgoError> {
    descriptor.validate()?;
    config.validate()?;

    let bars = series.bars();
    info!(
        ticker = %descriptor.ticker,
        strategy = %descriptor.strategy_type(),
        bars = bars.len(),
        "running simulation"
    );

    let signals = descriptor.kind.generate_signals(bars);
    debug!(
        buys = signals.buy_count(),
        sells = signals.sell_count(),
        "signals generated"
    );

    let fused = fusion::fuse(signals, bars, registry, descriptor.model.as_ref());
    let portfolio = portfolio::simulate(
        series.ticker(),
        bars,
        &fused.signals,
        config.initial_capital,
    )?;

    let metrics = Metrics::compute(&portfolio.equity_curve);
    let final_value = portfolio
        .equity_curve
        .last()
        .map(|p| p.value)
        .unwrap_or(config.initial_capital);

    info!(
        ticker = %descriptor.ticker,
        trades = portfolio.fills.len(),
        total_return_pct = metrics.total_return_pct,
        "simulation finished"
    );

    Ok(PerformanceReport {
        ticker: series.ticker().to_string(),
        strategy_name: descriptor.name.clone(),
        strategy_type: descriptor.strategy_type(),
        start_date: series.first_date(),
        end_date: series.last_date(),
        initial_capital: config.initial_capital,
        metrics,
        final_portfolio_value: round2(final_value),
        trade_count: portfolio.fills.len(),
        trades: portfolio.fills,
        ml_confirmation: fused.confirmation,
        equity_curve: portfolio.equity_curve,
        price_series: bars.to_vec(),
    })
}

/// Validate, fetch, simulate, and wrap the result for the job runner.
/// Configuration problems are reported before any price data is read.
pub fn run_job(
    data_port: &dyn DataPort,
    descriptor: &StrategyDescriptor,
    registry: &ArtifactRegistry,
    config: &BacktestConfig,
) -> JobOutcome {
    let result = descriptor
        .validate()
        .and_then(|()| config.validate())
        .and_then(|()| {
            data_port.fetch_series(&descriptor.ticker, config.start_date, config.end_date)
        })
        .and_then(|series| run_simulation(descriptor, &series, registry, config));

    match result {
        Ok(report) => JobOutcome::success(report),
        Err(e) => JobOutcome::failure(JobFailure::from_error(
            &e,
            descriptor.ticker.clone(),
            Some(descriptor.strategy_type()),
        )),
    }
}
