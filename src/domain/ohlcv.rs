//! OHLCV bar and price series representation.

use crate::domain::error::AlgoError;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// (high - low) / close
    pub fn range_ratio(&self) -> f64 {
        (self.high - self.low) / self.close
    }

    /// close / prev_close - 1
    pub fn simple_return(&self, prev_close: f64) -> f64 {
        self.close / prev_close - 1.0
    }
}

/// Ordered, duplicate-free bars for one ticker.
///
/// Construction through [`PriceSeries::new`] guarantees strictly increasing
/// dates, finite OHLC values and a positive close on every bar, so downstream
/// stages never divide by a zero price.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    ticker: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(ticker: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, AlgoError> {
        let ticker = ticker.into();
        if bars.is_empty() {
            return Err(AlgoError::NoData { ticker });
        }

        for (i, bar) in bars.iter().enumerate() {
            let fields = [
                ("open", bar.open),
                ("high", bar.high),
                ("low", bar.low),
                ("close", bar.close),
            ];
            if let Some((name, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
                return Err(AlgoError::malformed(
                    &ticker,
                    format!("non-finite {} on {}", name, bar.date),
                ));
            }
            if bar.close <= 0.0 {
                return Err(AlgoError::malformed(
                    &ticker,
                    format!("non-positive close on {}", bar.date),
                ));
            }
            if i > 0 && bars[i - 1].date >= bar.date {
                return Err(AlgoError::malformed(
                    &ticker,
                    format!(
                        "dates not strictly increasing at {} (after {})",
                        bar.date,
                        bars[i - 1].date
                    ),
                ));
            }
        }

        Ok(Self { ticker, bars })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.bars[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.bars[self.bars.len() - 1].date
    }

    pub fn into_bars(self) -> Vec<PriceBar> {
        self.bars
    }
}
