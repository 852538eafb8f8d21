//! Feature extraction contract tied to each predictive artifact.

use crate::domain::ohlcv::PriceBar;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeatureError {
    #[error("unknown feature column: {0}")]
    UnknownColumn(String),

    #[error("feature list is empty")]
    Empty,

    #[error("expected {expected} weights for {expected} features, got {actual}")]
    WeightCount { expected: usize, actual: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureColumn {
    Open,
    High,
    Low,
    Close,
    Volume,
    /// close / previous close - 1; absent on the first bar
    Return,
    /// (high - low) / close
    Range,
}

impl FromStr for FeatureColumn {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(FeatureColumn::Open),
            "high" => Ok(FeatureColumn::High),
            "low" => Ok(FeatureColumn::Low),
            "close" => Ok(FeatureColumn::Close),
            "volume" => Ok(FeatureColumn::Volume),
            "return" => Ok(FeatureColumn::Return),
            "range" => Ok(FeatureColumn::Range),
            _ => Err(FeatureError::UnknownColumn(s.trim().to_string())),
        }
    }
}

impl fmt::Display for FeatureColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeatureColumn::Open => "Open",
            FeatureColumn::High => "High",
            FeatureColumn::Low => "Low",
            FeatureColumn::Close => "Close",
            FeatureColumn::Volume => "Volume",
            FeatureColumn::Return => "Return",
            FeatureColumn::Range => "Range",
        };
        f.write_str(name)
    }
}

impl FeatureColumn {
    fn value(&self, bars: &[PriceBar], index: usize) -> Option<f64> {
        let bar = bars.get(index)?;
        let value = match self {
            FeatureColumn::Open => bar.open,
            FeatureColumn::High => bar.high,
            FeatureColumn::Low => bar.low,
            FeatureColumn::Close => bar.close,
            FeatureColumn::Volume => bar.volume,
            FeatureColumn::Return => {
                let prev = bars.get(index.checked_sub(1)?)?;
                bar.simple_return(prev.close)
            }
            FeatureColumn::Range => bar.range_ratio(),
        };
        value.is_finite().then_some(value)
    }
}

/// Ordered feature columns fixed when the artifact is registered.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSpec {
    columns: Vec<FeatureColumn>,
}

impl FeatureSpec {
    pub fn new(columns: Vec<FeatureColumn>) -> Result<Self, FeatureError> {
        if columns.is_empty() {
            return Err(FeatureError::Empty);
        }
        Ok(Self { columns })
    }

    /// Parse a comma-separated column list such as `Open,High,Low,Close,Volume`.
    pub fn parse(list: &str) -> Result<Self, FeatureError> {
        let columns = list
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(FeatureColumn::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(columns)
    }

    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Feature vector for bar `index`; `None` if any column has no value there.
    pub fn extract(&self, bars: &[PriceBar], index: usize) -> Option<Vec<f64>> {
        self.columns.iter().map(|c| c.value(bars, index)).collect()
    }
}
