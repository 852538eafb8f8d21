//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::backtest;
use crate::domain::config_validation::{load_run_config, Overrides, RunConfig};
use crate::domain::error::AlgoError;
use crate::domain::prediction::fusion::Confirmation;
use crate::domain::prediction::registry::{ArtifactRegistry, SetEntry};
use crate::domain::report::{JobFailure, JobOutcome, PerformanceReport};
use crate::domain::strategy::{StrategyKind, StrategyType};
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "algosphere", about = "Strategy backtester with model confirmation")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest and write the job outcome as JSON
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Overrides [backtest] ticker
        #[arg(long)]
        ticker: Option<String>,
        /// Overrides [strategy] type
        #[arg(long)]
        strategy_type: Option<String>,
        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,
        #[arg(long)]
        job_id: Option<String>,
    },
    /// Validate a backtest configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List the model sets of a registry file
    Models {
        #[arg(short, long)]
        registry: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            ticker,
            strategy_type,
            output,
            job_id,
        } => run_backtest(
            &config,
            Overrides {
                ticker: ticker.as_deref(),
                strategy_type: strategy_type.as_deref(),
            },
            &output,
            job_id,
        ),
        Command::Validate { config } => run_validate(&config),
        Command::Models { registry } => run_models(&registry),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

/// Load the model registry once. A registry file that cannot be read leaves
/// every set unregistered, so runs asking for a model degrade instead of failing.
pub fn load_registry(path: Option<&Path>) -> ArtifactRegistry {
    match path {
        None => ArtifactRegistry::empty(),
        Some(path) => match FileConfigAdapter::from_file(path) {
            Ok(adapter) => ArtifactRegistry::load(&adapter),
            Err(e) => {
                error!(path = %path.display(), error = %e, "model registry could not be read");
                ArtifactRegistry::empty()
            }
        },
    }
}

fn run_backtest(
    config_path: &Path,
    overrides: Overrides<'_>,
    output_path: &Path,
    job_id: Option<String>,
) -> ExitCode {
    info!(config = %config_path.display(), "loading config");

    let run_config = FileConfigAdapter::from_file(config_path)
        .and_then(|adapter| load_run_config(&adapter, overrides));

    let outcome = match run_config {
        Ok(run_config) => execute(&run_config),
        Err(e) => {
            eprintln!("error: {e}");
            JobOutcome::failure(failure_without_run(&e, config_path, overrides))
        }
    };

    finish(outcome.with_job_id(job_id), output_path)
}

fn execute(run_config: &RunConfig) -> JobOutcome {
    let registry = load_registry(run_config.registry_path.as_deref());
    let data_port = CsvAdapter::new(run_config.data_path.clone());

    let outcome = backtest::run_job(
        &data_port,
        &run_config.descriptor,
        &registry,
        &run_config.backtest,
    );

    match (outcome.report(), outcome.failure_info()) {
        (Some(report), _) => print_summary(report),
        (None, Some(failure)) => eprintln!("error: {} ({})", failure.message, failure.kind),
        (None, None) => {}
    }
    outcome
}

/// Best-effort failure context when the config itself is the problem.
fn failure_without_run(err: &AlgoError, config_path: &Path, overrides: Overrides<'_>) -> JobFailure {
    let adapter = FileConfigAdapter::from_file(config_path).ok();
    let lookup = |section: &str, key: &str| {
        adapter
            .as_ref()
            .and_then(|a| a.get_string(section, key))
            .map(|s| s.trim().to_string())
    };

    let ticker = overrides
        .ticker
        .map(str::to_string)
        .or_else(|| lookup("backtest", "ticker"))
        .unwrap_or_default();
    let strategy_type = overrides
        .strategy_type
        .map(str::to_string)
        .or_else(|| lookup("strategy", "type"))
        .and_then(|t| t.parse::<StrategyType>().ok());

    JobFailure::from_error(err, ticker, strategy_type)
}

fn finish(outcome: JobOutcome, output_path: &Path) -> ExitCode {
    if let Err(e) = JsonReportAdapter::new().write(&outcome, output_path) {
        eprintln!("error: failed to write report: {e}");
        return ExitCode::from(&e);
    }
    eprintln!("\nReport written to: {}", output_path.display());

    match outcome.failure_info() {
        None => ExitCode::SUCCESS,
        Some(failure) => failure.kind.into(),
    }
}

fn print_summary(report: &PerformanceReport) {
    eprintln!(
        "\n=== Results: {} ({}, {}) ===",
        report.ticker, report.strategy_name, report.strategy_type
    );
    eprintln!("Period:           {} to {}", report.start_date, report.end_date);
    eprintln!("Total Return:     {:.2}%", report.metrics.total_return_pct);
    eprintln!("Annualized:       {:.2}%", report.metrics.annualized_return_pct);
    eprintln!("Sharpe Ratio:     {:.2}", report.metrics.sharpe_ratio);
    eprintln!("Max Drawdown:     {:.2}%", report.metrics.max_drawdown_pct);
    eprintln!("Final Value:      {:.2}", report.final_portfolio_value);
    eprintln!("Total Trades:     {}", report.trade_count);
    eprintln!("ML Confirmation:  {}", describe_confirmation(report));
}

fn describe_confirmation(report: &PerformanceReport) -> String {
    match &report.ml_confirmation {
        Confirmation::NotRequested => "not requested".to_string(),
        Confirmation::Applied {
            set,
            model,
            suppressed_buys,
            ..
        } => format!("{set}/{model}, {suppressed_buys} buys suppressed"),
        Confirmation::Unavailable { set, model, reason } => {
            format!("{set}/{model} unavailable ({reason}), not applied")
        }
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let run_config = match load_run_config(&adapter, Overrides::default()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("Config validated successfully");

    let d = &run_config.descriptor;
    eprintln!("\nStrategy:");
    eprintln!("  name:   {}", d.name);
    eprintln!("  type:   {}", d.strategy_type());
    eprintln!("  params: {}", describe_params(&d.kind));
    match &d.model {
        Some(selection) => eprintln!("  model:  {}/{}", selection.set, selection.model),
        None => eprintln!("  model:  none"),
    }

    let bt = &run_config.backtest;
    eprintln!("\nBacktest:");
    eprintln!("  ticker:  {}", d.ticker);
    eprintln!("  period:  {} to {}", bt.start_date, bt.end_date);
    eprintln!("  capital: {:.2}", bt.initial_capital);
    eprintln!("  data:    {}", run_config.data_path.display());
    if let Some(registry) = &run_config.registry_path {
        eprintln!("  models:  {}", registry.display());
    }

    ExitCode::SUCCESS
}

fn describe_params(kind: &StrategyKind) -> String {
    match kind {
        StrategyKind::TrendFollowing(p) => {
            format!("fast_window={} slow_window={}", p.fast_window, p.slow_window)
        }
        StrategyKind::MeanReversion(p) => format!("window={} std_dev={}", p.window, p.std_dev),
        StrategyKind::Volatility(p) => format!(
            "window={} std_dev={} squeeze_threshold={}",
            p.window, p.std_dev, p.squeeze_threshold
        ),
    }
}

fn run_models(registry_path: &Path) -> ExitCode {
    let adapter = match load_config(registry_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let registry = ArtifactRegistry::load(&adapter);

    let mut count = 0;
    for (name, entry) in registry.entries() {
        count += 1;
        match entry {
            SetEntry::Loaded(set) => {
                eprintln!("{name}: available");
                for model in set.models() {
                    eprintln!(
                        "  {} ({} features, threshold {})",
                        model.name(),
                        model.features().len(),
                        model.threshold()
                    );
                }
            }
            SetEntry::Unavailable(reason) => eprintln!("{name}: unavailable ({reason})"),
        }
    }

    if count == 0 {
        eprintln!("no model sets registered");
    }
    ExitCode::SUCCESS
}
