//! Strategy descriptor: which signal generator to run, with its parameters,
//! and an optional predictive model for buy confirmation.

use crate::domain::error::AlgoError;
use crate::domain::ohlcv::PriceBar;
use crate::domain::prediction::ModelSelection;
use crate::domain::signal::mean_reversion::{self, MeanReversionParams};
use crate::domain::signal::trend::{self, TrendParams};
use crate::domain::signal::volatility::{self, VolatilityParams};
use crate::domain::signal::SignalSeries;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StrategyType {
    TrendFollowing,
    MeanReversion,
    Volatility,
}

impl FromStr for StrategyType {
    type Err = AlgoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "trendfollowing" | "trend" | "momentum" => Ok(StrategyType::TrendFollowing),
            "meanreversion" => Ok(StrategyType::MeanReversion),
            "volatility" | "volatilitybreakout" => Ok(StrategyType::Volatility),
            _ => Err(AlgoError::UnknownStrategy {
                name: s.trim().to_string(),
            }),
        }
    }
}

impl fmt::Display for StrategyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyType::TrendFollowing => "TrendFollowing",
            StrategyType::MeanReversion => "MeanReversion",
            StrategyType::Volatility => "Volatility",
        };
        f.write_str(name)
    }
}

/// One variant per generator, each carrying its own parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrategyKind {
    TrendFollowing(TrendParams),
    MeanReversion(MeanReversionParams),
    Volatility(VolatilityParams),
}

impl StrategyKind {
    /// The variant for `strategy_type` with default parameters.
    pub fn with_defaults(strategy_type: StrategyType) -> Self {
        match strategy_type {
            StrategyType::TrendFollowing => StrategyKind::TrendFollowing(TrendParams::default()),
            StrategyType::MeanReversion => {
                StrategyKind::MeanReversion(MeanReversionParams::default())
            }
            StrategyType::Volatility => StrategyKind::Volatility(VolatilityParams::default()),
        }
    }

    pub fn strategy_type(&self) -> StrategyType {
        match self {
            StrategyKind::TrendFollowing(_) => StrategyType::TrendFollowing,
            StrategyKind::MeanReversion(_) => StrategyType::MeanReversion,
            StrategyKind::Volatility(_) => StrategyType::Volatility,
        }
    }

    pub fn generate_signals(&self, bars: &[PriceBar]) -> SignalSeries {
        match self {
            StrategyKind::TrendFollowing(p) => trend::generate(bars, p),
            StrategyKind::MeanReversion(p) => mean_reversion::generate(bars, p),
            StrategyKind::Volatility(p) => volatility::generate(bars, p),
        }
    }

    /// Reject parameter combinations no generator can run with.
    pub fn validate(&self) -> Result<(), AlgoError> {
        match self {
            StrategyKind::TrendFollowing(p) => {
                positive_window("fast_window", p.fast_window)?;
                positive_window("slow_window", p.slow_window)?;
                if p.fast_window >= p.slow_window {
                    return Err(AlgoError::invalid(
                        "strategy",
                        "fast_window",
                        "fast_window must be less than slow_window",
                    ));
                }
            }
            StrategyKind::MeanReversion(p) => {
                positive_window("window", p.window)?;
                positive_value("std_dev", p.std_dev)?;
            }
            StrategyKind::Volatility(p) => {
                positive_window("window", p.window)?;
                if p.window.checked_mul(2).is_none() {
                    return Err(AlgoError::invalid(
                        "strategy",
                        "window",
                        "window is too large for the squeeze lookback",
                    ));
                }
                positive_value("std_dev", p.std_dev)?;
                positive_value("squeeze_threshold", p.squeeze_threshold)?;
            }
        }
        Ok(())
    }
}

fn positive_window(key: &str, value: usize) -> Result<(), AlgoError> {
    if value == 0 {
        return Err(AlgoError::invalid(
            "strategy",
            key,
            format!("{} must be positive", key),
        ));
    }
    Ok(())
}

fn positive_value(key: &str, value: f64) -> Result<(), AlgoError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(AlgoError::invalid(
            "strategy",
            key,
            format!("{} must be a positive number", key),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyDescriptor {
    pub name: String,
    pub ticker: String,
    pub kind: StrategyKind,
    pub model: Option<ModelSelection>,
}

impl StrategyDescriptor {
    pub fn new(ticker: impl Into<String>, kind: StrategyKind) -> Self {
        let kind_name = kind.strategy_type().to_string();
        Self {
            name: kind_name,
            ticker: ticker.into(),
            kind,
            model: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_model(mut self, selection: ModelSelection) -> Self {
        self.model = Some(selection);
        self
    }

    pub fn strategy_type(&self) -> StrategyType {
        self.kind.strategy_type()
    }

    pub fn validate(&self) -> Result<(), AlgoError> {
        if self.ticker.trim().is_empty() {
            return Err(AlgoError::ConfigMissing {
                section: "backtest".into(),
                key: "ticker".into(),
            });
        }
        self.kind.validate()
    }
}
