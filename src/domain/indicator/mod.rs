//! Rolling indicators over a price series.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters
//! - `IndicatorSeries`: A time series of indicator values, parallel to the bars
//!
//! Every calculator is a pure function of the bars and its window parameters.
//! Points inside the warmup (not enough trailing bars) are marked invalid and
//! carry no usable value.

pub mod bollinger;
pub mod sma;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Bollinger(Bands),
}

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: IndicatorValue,
}

impl IndicatorPoint {
    pub fn simple(&self) -> Option<f64> {
        match (self.valid, &self.value) {
            (true, IndicatorValue::Simple(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn bands(&self) -> Option<Bands> {
        match (self.valid, &self.value) {
            (true, IndicatorValue::Bollinger(b)) => Some(*b),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
    BandWidth {
        period: usize,
        stddev_mult_x100: u32,
    },
}

impl IndicatorType {
    pub fn bollinger(period: usize, multiplier: f64) -> Self {
        IndicatorType::Bollinger {
            period,
            stddev_mult_x100: mult_x100(multiplier),
        }
    }

    pub fn band_width(period: usize, multiplier: f64) -> Self {
        IndicatorType::BandWidth {
            period,
            stddev_mult_x100: mult_x100(multiplier),
        }
    }
}

fn mult_x100(multiplier: f64) -> u32 {
    (multiplier * 100.0).round().max(0.0) as u32
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn simple_at(&self, index: usize) -> Option<f64> {
        self.values.get(index).and_then(IndicatorPoint::simple)
    }

    pub fn bands_at(&self, index: usize) -> Option<Bands> {
        self.values.get(index).and_then(IndicatorPoint::bands)
    }

    /// Index of the first valid point, if any.
    pub fn first_valid(&self) -> Option<usize> {
        self.values.iter().position(|p| p.valid)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
            IndicatorType::BandWidth {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BANDWIDTH({},{})", period, mult)
            }
        }
    }
}
