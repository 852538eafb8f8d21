#![allow(dead_code)]

use algosphere::domain::backtest::BacktestConfig;
use algosphere::domain::error::AlgoError;
pub use algosphere::domain::ohlcv::{PriceBar, PriceSeries};
use algosphere::domain::prediction::features::FeatureSpec;
use algosphere::domain::prediction::registry::ArtifactRegistry;
use algosphere::domain::prediction::{LinearModel, ModelArtifact, ModelSet};
use algosphere::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_series(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, AlgoError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(AlgoError::MalformedData {
                ticker: ticker.to_string(),
                reason: reason.clone(),
            });
        }
        let bars: Vec<PriceBar> = self
            .data
            .get(ticker)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start && b.date <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        PriceSeries::new(ticker, bars)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One bar per calendar day from 2023-01-01.
pub fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
    let start = date(2023, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close + 0.5,
            low: close - 0.5,
            close,
            volume: 10_000.0,
        })
        .collect()
}

pub fn series(ticker: &str, closes: &[f64]) -> PriceSeries {
    PriceSeries::new(ticker, bars_from_closes(closes)).unwrap()
}

/// 252 closes: flat at 100 for 20 bars, then a steady rise to 200.
pub fn rising_closes() -> Vec<f64> {
    (0..252)
        .map(|i| {
            if i < 20 {
                100.0
            } else {
                100.0 + (i - 19) as f64 * 100.0 / 232.0
            }
        })
        .collect()
}

/// 252 closes around 100: a trough of 90 at every i % 20 == 5, a peak of 110
/// at every i % 20 == 15.
pub fn oscillating_closes() -> Vec<f64> {
    (0..252)
        .map(|i| match i % 20 {
            5 => 90.0,
            15 => 110.0,
            _ => 100.0,
        })
        .collect()
}

/// Ten bars inside a 1-unit band, then a five-unit jump.
pub fn squeeze_breakout_closes() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..10)
        .map(|i| if i % 2 == 0 { 100.0 } else { 100.5 })
        .collect();
    closes.push(105.5);
    closes
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig::new(date(2023, 1, 1), date(2024, 12, 31))
}

/// Registry with `SetA` holding one linear model scoring `close - 100`, and
/// `SetB` recorded as failed to load.
pub fn sample_registry() -> ArtifactRegistry {
    let model = ModelArtifact::new(
        "Linear",
        LinearModel {
            weights: vec![1.0],
            bias: -100.0,
        },
        FeatureSpec::parse("Close").unwrap(),
    )
    .unwrap();
    ArtifactRegistry::empty()
        .with_set("SetA", ModelSet::new().with_model(model))
        .with_unavailable("SetB", "artifact file missing")
}

pub fn write_csv(dir: &Path, ticker: &str, bars: &[PriceBar]) {
    let mut content = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date, b.open, b.high, b.low, b.close, b.volume
        ));
    }
    fs::write(dir.join(format!("{}.csv", ticker)), content).unwrap();
}
