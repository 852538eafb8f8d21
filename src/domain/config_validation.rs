//! Configuration validation.
//!
//! Reads the `[backtest]`, `[data]`, `[strategy]` and `[models]` sections and
//! builds the inputs of a run. Every problem is reported as a configuration
//! error naming its section and key, before any price data is touched.

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::AlgoError;
use crate::domain::portfolio::DEFAULT_INITIAL_CAPITAL;
use crate::domain::prediction::ModelSelection;
use crate::domain::signal::mean_reversion::MeanReversionParams;
use crate::domain::signal::trend::TrendParams;
use crate::domain::signal::volatility::VolatilityParams;
use crate::domain::strategy::{StrategyDescriptor, StrategyKind, StrategyType};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::str::FromStr;

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides<'a> {
    pub ticker: Option<&'a str>,
    pub strategy_type: Option<&'a str>,
}

/// Everything one backtest run needs, validated.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub descriptor: StrategyDescriptor,
    pub backtest: BacktestConfig,
    pub data_path: PathBuf,
    pub registry_path: Option<PathBuf>,
}

pub fn load_run_config(
    config: &dyn ConfigPort,
    overrides: Overrides<'_>,
) -> Result<RunConfig, AlgoError> {
    let backtest = load_backtest_config(config)?;
    let ticker = match overrides.ticker {
        Some(t) => t.trim().to_string(),
        None => required(config, "backtest", "ticker")?,
    };
    let descriptor = load_strategy(config, &ticker, overrides.strategy_type)?;

    Ok(RunConfig {
        descriptor,
        backtest,
        data_path: optional(config, "data", "path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
        registry_path: optional(config, "models", "registry").map(PathBuf::from),
    })
}

pub fn load_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, AlgoError> {
    let start_date = parse_date(config, "start_date")?;
    let end_date = parse_date(config, "end_date")?;
    let initial_capital =
        parse_or(config, "backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL)?;

    let backtest =
        BacktestConfig::new(start_date, end_date).with_initial_capital(initial_capital);
    backtest.validate()?;
    Ok(backtest)
}

/// Build and validate the strategy descriptor for `ticker`.
pub fn load_strategy(
    config: &dyn ConfigPort,
    ticker: &str,
    type_override: Option<&str>,
) -> Result<StrategyDescriptor, AlgoError> {
    let type_name = match type_override {
        Some(t) => t.to_string(),
        None => required(config, "strategy", "type")?,
    };
    let strategy_type: StrategyType = type_name.parse()?;

    let kind = match strategy_type {
        StrategyType::TrendFollowing => {
            let d = TrendParams::default();
            StrategyKind::TrendFollowing(TrendParams {
                fast_window: parse_or(config, "strategy", "fast_window", d.fast_window)?,
                slow_window: parse_or(config, "strategy", "slow_window", d.slow_window)?,
            })
        }
        StrategyType::MeanReversion => {
            let d = MeanReversionParams::default();
            StrategyKind::MeanReversion(MeanReversionParams {
                window: parse_or(config, "strategy", "window", d.window)?,
                std_dev: parse_or(config, "strategy", "std_dev", d.std_dev)?,
            })
        }
        StrategyType::Volatility => {
            let d = VolatilityParams::default();
            StrategyKind::Volatility(VolatilityParams {
                window: parse_or(config, "strategy", "window", d.window)?,
                std_dev: parse_or(config, "strategy", "std_dev", d.std_dev)?,
                squeeze_threshold: parse_or(
                    config,
                    "strategy",
                    "squeeze_threshold",
                    d.squeeze_threshold,
                )?,
            })
        }
    };

    let mut descriptor = StrategyDescriptor::new(ticker, kind);
    if let Some(name) = optional(config, "strategy", "name") {
        descriptor = descriptor.with_name(name);
    }
    if let Some(selection) = load_model_selection(config)? {
        descriptor = descriptor.with_model(selection);
    }

    descriptor.validate()?;
    Ok(descriptor)
}

fn load_model_selection(config: &dyn ConfigPort) -> Result<Option<ModelSelection>, AlgoError> {
    let set = optional(config, "strategy", "model_set");
    let model = optional(config, "strategy", "model");

    match (set, model) {
        (Some(set), Some(model)) => Ok(Some(ModelSelection::new(set, &model))),
        (None, None) => Ok(None),
        (Some(_), None) => Err(AlgoError::invalid(
            "strategy",
            "model",
            "model must be given together with model_set",
        )),
        (None, Some(_)) => Err(AlgoError::invalid(
            "strategy",
            "model_set",
            "model_set must be given together with model",
        )),
    }
}

/// Non-empty trimmed value, if present.
fn optional(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn required(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, AlgoError> {
    optional(config, section, key).ok_or_else(|| AlgoError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    })
}

fn parse_or<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: T,
) -> Result<T, AlgoError> {
    match optional(config, section, key) {
        Some(raw) => raw.parse::<T>().map_err(|_| {
            AlgoError::invalid(section, key, format!("cannot parse {:?}", raw))
        }),
        None => Ok(default),
    }
}

fn parse_date(config: &dyn ConfigPort, key: &str) -> Result<NaiveDate, AlgoError> {
    let raw = required(config, "backtest", key)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
        AlgoError::invalid(
            "backtest",
            key,
            format!("invalid {} format, expected YYYY-MM-DD", key),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;
    use crate::domain::prediction::ModelChoice;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    const BACKTEST: &str = "[backtest]\nticker = TSLA\nstart_date = 2020-01-01\nend_date = 2024-12-31\n";

    fn with_strategy(strategy: &str) -> FileConfigAdapter {
        make_config(&format!("{}\n[strategy]\n{}", BACKTEST, strategy))
    }

    #[test]
    fn valid_config_passes() {
        let config = make_config(
            r#"
[backtest]
ticker = TSLA
start_date = 2020-01-01
end_date = 2024-12-31
initial_capital = 50000

[data]
path = /data/prices

[strategy]
name = Golden Cross
type = TrendFollowing
fast_window = 20
slow_window = 100

[models]
registry = models.ini
"#,
        );
        let run = load_run_config(&config, Overrides::default()).unwrap();

        assert_eq!(run.descriptor.ticker, "TSLA");
        assert_eq!(run.descriptor.name, "Golden Cross");
        assert_eq!(
            run.descriptor.kind,
            StrategyKind::TrendFollowing(TrendParams {
                fast_window: 20,
                slow_window: 100
            })
        );
        assert_eq!(run.backtest.initial_capital, 50_000.0);
        assert_eq!(run.data_path, PathBuf::from("/data/prices"));
        assert_eq!(run.registry_path, Some(PathBuf::from("models.ini")));
    }

    #[test]
    fn defaults_applied() {
        let config = with_strategy("type = Volatility\n");
        let run = load_run_config(&config, Overrides::default()).unwrap();

        assert_eq!(run.backtest.initial_capital, DEFAULT_INITIAL_CAPITAL);
        assert_eq!(run.data_path, PathBuf::from("."));
        assert_eq!(run.registry_path, None);
        assert_eq!(
            run.descriptor.kind,
            StrategyKind::Volatility(VolatilityParams::default())
        );
        assert_eq!(run.descriptor.name, "Volatility");
        assert!(run.descriptor.model.is_none());
    }

    #[test]
    fn overrides_take_precedence() {
        let config = with_strategy("type = Volatility\n");
        let run = load_run_config(
            &config,
            Overrides {
                ticker: Some("AAPL"),
                strategy_type: Some("mean_reversion"),
            },
        )
        .unwrap();

        assert_eq!(run.descriptor.ticker, "AAPL");
        assert_eq!(run.descriptor.strategy_type(), StrategyType::MeanReversion);
    }

    #[test]
    fn initial_capital_must_be_positive() {
        let config = make_config(&format!("{}initial_capital = -100\n[strategy]\ntype = trend\n", BACKTEST));
        let err = load_run_config(&config, Overrides::default()).unwrap_err();
        assert!(matches!(err, AlgoError::ConfigInvalid { key, .. } if key == "initial_capital"));
    }

    #[test]
    fn invalid_start_date_format_fails() {
        let config = make_config("[backtest]\nticker = X\nstart_date = 2020/01/01\nend_date = 2024-12-31\n");
        let err = load_backtest_config(&config).unwrap_err();
        assert!(matches!(err, AlgoError::ConfigInvalid { key, .. } if key == "start_date"));
    }

    #[test]
    fn missing_end_date_fails() {
        let config = make_config("[backtest]\nstart_date = 2020-01-01\n");
        let err = load_backtest_config(&config).unwrap_err();
        assert!(matches!(err, AlgoError::ConfigMissing { key, .. } if key == "end_date"));
    }

    #[test]
    fn start_date_after_end_date_fails() {
        let config = make_config("[backtest]\nstart_date = 2024-12-31\nend_date = 2020-01-01\n");
        let err = load_backtest_config(&config).unwrap_err();
        assert!(matches!(err, AlgoError::ConfigInvalid { key, .. } if key == "start_date"));
    }

    #[test]
    fn missing_ticker_fails() {
        let config = make_config("[backtest]\nstart_date = 2020-01-01\nend_date = 2024-12-31\n[strategy]\ntype = trend\n");
        let err = load_run_config(&config, Overrides::default()).unwrap_err();
        assert!(matches!(err, AlgoError::ConfigMissing { key, .. } if key == "ticker"));
    }

    #[test]
    fn missing_strategy_type_fails() {
        let config = with_strategy("name = Nameless\n");
        let err = load_run_config(&config, Overrides::default()).unwrap_err();
        assert!(
            matches!(err, AlgoError::ConfigMissing { section, key } if section == "strategy" && key == "type")
        );
    }

    #[test]
    fn unknown_strategy_type_fails() {
        let config = with_strategy("type = Arbitrage\n");
        let err = load_run_config(&config, Overrides::default()).unwrap_err();
        assert!(matches!(err, AlgoError::UnknownStrategy { name } if name == "Arbitrage"));
    }

    #[test]
    fn unparsable_window_fails() {
        let config = with_strategy("type = MeanReversion\nwindow = twenty\n");
        let err = load_run_config(&config, Overrides::default()).unwrap_err();
        assert!(matches!(err, AlgoError::ConfigInvalid { key, .. } if key == "window"));
    }

    #[test]
    fn negative_window_fails() {
        let config = with_strategy("type = MeanReversion\nwindow = -5\n");
        assert!(load_run_config(&config, Overrides::default()).is_err());
    }

    #[test]
    fn zero_window_fails() {
        let config = with_strategy("type = Volatility\nwindow = 0\n");
        let err = load_run_config(&config, Overrides::default()).unwrap_err();
        assert!(matches!(err, AlgoError::ConfigInvalid { key, .. } if key == "window"));
    }

    #[test]
    fn oversized_volatility_window_fails() {
        let window = usize::MAX / 2 + 1;
        let config = with_strategy(&format!("type = Volatility\nwindow = {}\n", window));
        let err = load_run_config(&config, Overrides::default()).unwrap_err();
        assert!(matches!(err, AlgoError::ConfigInvalid { key, .. } if key == "window"));
    }

    #[test]
    fn fast_window_must_be_below_slow_window() {
        let config = with_strategy("type = TrendFollowing\nfast_window = 200\nslow_window = 50\n");
        let err = load_run_config(&config, Overrides::default()).unwrap_err();
        assert!(matches!(err, AlgoError::ConfigInvalid { key, .. } if key == "fast_window"));
    }

    #[test]
    fn model_selection_parsed() {
        let config = with_strategy("type = Volatility\nmodel_set = SetA\nmodel = Ensemble\n");
        let run = load_run_config(&config, Overrides::default()).unwrap();
        let model = run.descriptor.model.unwrap();
        assert_eq!(model.set, "SetA");
        assert_eq!(model.model, ModelChoice::Ensemble);
    }

    #[test]
    fn model_set_without_model_fails() {
        let config = with_strategy("type = Volatility\nmodel_set = SetA\n");
        let err = load_run_config(&config, Overrides::default()).unwrap_err();
        assert!(matches!(err, AlgoError::ConfigInvalid { key, .. } if key == "model"));
    }

    #[test]
    fn model_without_model_set_fails() {
        let config = with_strategy("type = Volatility\nmodel = RandomForest\n");
        let err = load_run_config(&config, Overrides::default()).unwrap_err();
        assert!(matches!(err, AlgoError::ConfigInvalid { key, .. } if key == "model_set"));
    }
}
