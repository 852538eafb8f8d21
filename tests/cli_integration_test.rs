//! CLI integration tests with real INI and CSV files on disk.
//!
//! Tests cover:
//! - Config loading into a run configuration
//! - Registry loading, including a registry file that cannot be read
//! - The backtest command end to end, success and failure outcomes
//! - The validate and models commands

mod common;

use algosphere::adapters::file_config_adapter::FileConfigAdapter;
use algosphere::cli::{self, Cli, Command};
use algosphere::domain::config_validation::{load_run_config, Overrides};
use algosphere::domain::strategy::StrategyType;
use common::*;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tempfile::TempDir;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const REGISTRY_INI: &str = r#"
[registry]
sets = SetA,SetB

[SetA]
models = RandomForest,GradientBoosting

[SetA.RandomForest]
kind = logistic
features = Close
weights = 1.0
bias = -100.0

[SetA.GradientBoosting]
kind = logistic
features = Close,Volume
weights = 1.0,0.0
bias = -100.0

[SetB]
models = Broken

[SetB.Broken]
kind = linear
features = Close,Open
weights = 1.0
"#;

/// Workspace with price files, a registry and a config for `ticker`.
struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let prices = dir.path().join("prices");
        fs::create_dir(&prices).unwrap();
        write_csv(&prices, "TREND", &bars_from_closes(&rising_closes()));
        write_csv(&prices, "OSC", &bars_from_closes(&oscillating_closes()));
        fs::write(dir.path().join("models.ini"), REGISTRY_INI).unwrap();
        Fixture { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write_config(&self, ticker: &str, strategy: &str) -> PathBuf {
        let content = format!(
            "[backtest]\nticker = {ticker}\nstart_date = 2023-01-01\nend_date = 2023-12-31\ninitial_capital = 100000\n\n\
             [data]\npath = {}\n\n[models]\nregistry = {}\n\n[strategy]\n{strategy}",
            self.path("prices").display(),
            self.path("models.ini").display(),
        );
        let path = self.path("backtest.ini");
        fs::write(&path, content).unwrap();
        path
    }

    fn backtest(&self, config: &Path, ticker: Option<&str>, job_id: Option<&str>) -> (ExitCode, serde_json::Value) {
        let output = self.path("report.json");
        let code = cli::run(Cli {
            command: Command::Backtest {
                config: config.to_path_buf(),
                ticker: ticker.map(str::to_string),
                strategy_type: None,
                output: output.clone(),
                job_id: job_id.map(str::to_string),
            },
        });
        let json = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        (code, json)
    }
}

fn same_code(actual: ExitCode, expected: ExitCode) -> bool {
    format!("{:?}", actual) == format!("{:?}", expected)
}

mod config_loading {
    use super::*;

    #[test]
    fn run_config_from_file() {
        let fixture = Fixture::new();
        let path = fixture.write_config("TREND", "type = trend\nfast_window = 5\nslow_window = 10\n");
        let adapter = FileConfigAdapter::from_file(&path).unwrap();
        let run = load_run_config(&adapter, Overrides::default()).unwrap();

        assert_eq!(run.descriptor.ticker, "TREND");
        assert_eq!(run.descriptor.strategy_type(), StrategyType::TrendFollowing);
        assert_eq!(run.backtest.start_date, date(2023, 1, 1));
        assert_eq!(run.data_path, fixture.path("prices"));
        assert_eq!(run.registry_path, Some(fixture.path("models.ini")));
    }

    #[test]
    fn registry_loaded_from_file() {
        let fixture = Fixture::new();
        let registry = cli::load_registry(Some(fixture.path("models.ini").as_path()));

        assert!(registry.is_available("SetA"));
        assert!(!registry.is_available("SetB"));
    }

    #[test]
    fn unreadable_registry_is_empty() {
        let registry = cli::load_registry(Some(Path::new("/nonexistent/models.ini")));
        assert_eq!(registry.entries().count(), 0);
    }
}

mod backtest_command {
    use super::*;

    #[test]
    fn trend_backtest_writes_success_report() {
        let fixture = Fixture::new();
        let config =
            fixture.write_config("TREND", "name = Fast Cross\ntype = TrendFollowing\nfast_window = 5\nslow_window = 10\n");
        let (code, json) = fixture.backtest(&config, None, Some("job-1"));

        assert!(same_code(code, ExitCode::SUCCESS));
        assert_eq!(json["status"], "SUCCESS");
        assert_eq!(json["jobId"], "job-1");
        let report = &json["report"];
        assert_eq!(report["ticker"], "TREND");
        assert_eq!(report["strategyName"], "Fast Cross");
        assert_eq!(report["strategyType"], "TrendFollowing");
        assert!(report["totalReturnPct"].as_f64().unwrap() > 0.0);
        assert!(report["finalPortfolioValue"].as_f64().unwrap() > 100_000.0);
        assert_eq!(report["maxDrawdownPct"], 0.0);
        assert_eq!(report["mlConfirmation"]["status"], "NOT_REQUESTED");
        // all generated bars fall inside 2023
        assert_eq!(report["equityCurve"].as_array().unwrap().len(), 252);
        assert_eq!(report["priceSeries"].as_array().unwrap().len(), 252);
    }

    #[test]
    fn ensemble_confirmation_recorded() {
        let fixture = Fixture::new();
        let config = fixture.write_config(
            "OSC",
            "type = MeanReversion\nmodel_set = SetA\nmodel = Ensemble\n",
        );
        let (code, json) = fixture.backtest(&config, None, None);

        assert!(same_code(code, ExitCode::SUCCESS));
        let confirmation = &json["report"]["mlConfirmation"];
        assert_eq!(confirmation["status"], "APPLIED");
        assert_eq!(confirmation["set"], "SetA");
        assert_eq!(confirmation["model"], "Ensemble");
        // every trough closes at 90 and scores below 0.5
        assert!(confirmation["suppressedBuys"].as_u64().unwrap() > 0);
        assert_eq!(json["report"]["tradeCount"], 0);
    }

    #[test]
    fn broken_model_set_degrades_to_pass_through() {
        let fixture = Fixture::new();
        let config = fixture.write_config(
            "OSC",
            "type = MeanReversion\nmodel_set = SetB\nmodel = Broken\n",
        );
        let (code, json) = fixture.backtest(&config, None, None);

        assert!(same_code(code, ExitCode::SUCCESS));
        assert_eq!(json["report"]["mlConfirmation"]["status"], "UNAVAILABLE");
        assert!(json["report"]["tradeCount"].as_u64().unwrap() > 0);
    }

    #[test]
    fn ticker_override_selects_other_file() {
        let fixture = Fixture::new();
        let config = fixture.write_config("TREND", "type = MeanReversion\n");
        let (_, json) = fixture.backtest(&config, Some("OSC"), None);

        assert_eq!(json["report"]["ticker"], "OSC");
    }

    #[test]
    fn missing_price_file_writes_data_failure() {
        let fixture = Fixture::new();
        let config = fixture.write_config("NOPE", "type = Volatility\n");
        let (code, json) = fixture.backtest(&config, None, Some("job-9"));

        assert!(same_code(code, ExitCode::from(5)));
        assert_eq!(json["status"], "FAILURE");
        assert_eq!(json["jobId"], "job-9");
        assert_eq!(json["error"]["kind"], "DataError");
        assert_eq!(json["error"]["ticker"], "NOPE");
        assert_eq!(json["error"]["strategyType"], "Volatility");
    }

    #[test]
    fn invalid_parameters_write_configuration_failure() {
        let fixture = Fixture::new();
        let config = fixture.write_config("TREND", "type = TrendFollowing\nfast_window = 0\n");
        let (code, json) = fixture.backtest(&config, None, None);

        assert!(same_code(code, ExitCode::from(2)));
        assert_eq!(json["error"]["kind"], "ConfigurationError");
        assert_eq!(json["error"]["ticker"], "TREND");
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("fast_window"));
    }

    #[test]
    fn unknown_strategy_type_fails_without_type() {
        let fixture = Fixture::new();
        let config = fixture.write_config("TREND", "type = Arbitrage\n");
        let (code, json) = fixture.backtest(&config, None, None);

        assert!(same_code(code, ExitCode::from(2)));
        assert_eq!(json["error"]["kind"], "ConfigurationError");
        assert!(json["error"].get("strategyType").is_none());
    }

    #[test]
    fn missing_config_file_writes_failure() {
        let fixture = Fixture::new();
        let (code, json) = fixture.backtest(&fixture.path("absent.ini"), Some("TREND"), None);

        assert!(same_code(code, ExitCode::from(2)));
        assert_eq!(json["status"], "FAILURE");
        assert_eq!(json["error"]["ticker"], "TREND");
    }
}

mod other_commands {
    use super::*;

    #[test]
    fn validate_accepts_good_config() {
        let fixture = Fixture::new();
        let config = fixture.write_config("TREND", "type = Volatility\nsqueeze_threshold = 1.2\n");
        let code = cli::run(Cli {
            command: Command::Validate { config },
        });
        assert!(same_code(code, ExitCode::SUCCESS));
    }

    #[test]
    fn validate_rejects_bad_config() {
        let file = write_temp_ini("[backtest]\nticker = X\nstart_date = 2023-01-01\n");
        let code = cli::run(Cli {
            command: Command::Validate {
                config: file.path().to_path_buf(),
            },
        });
        assert!(same_code(code, ExitCode::from(2)));
    }

    #[test]
    fn models_lists_registry() {
        let fixture = Fixture::new();
        let code = cli::run(Cli {
            command: Command::Models {
                registry: fixture.path("models.ini"),
            },
        });
        assert!(same_code(code, ExitCode::SUCCESS));
    }

    #[test]
    fn models_fails_on_missing_registry() {
        let code = cli::run(Cli {
            command: Command::Models {
                registry: PathBuf::from("/nonexistent/models.ini"),
            },
        });
        assert!(same_code(code, ExitCode::from(2)));
    }
}
