//! Bollinger Bands and band width.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//!
//! Band width = (Upper - Lower) / Middle, defined only where the bands are
//! and the middle band is non-zero.
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are invalid.

use crate::domain::indicator::{
    Bands, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::PriceBar;

pub fn calculate_bollinger(bars: &[PriceBar], period: usize, multiplier: f64) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    let warmup = period.saturating_sub(1);

    for (i, bar) in bars.iter().enumerate() {
        let valid = period > 0 && i >= warmup;

        let bands = if valid {
            let window = &bars[i + 1 - period..=i];

            let middle: f64 = window.iter().map(|b| b.close).sum::<f64>() / period as f64;

            let variance: f64 = window
                .iter()
                .map(|b| {
                    let diff = b.close - middle;
                    diff * diff
                })
                .sum::<f64>()
                / period as f64;

            let stddev = variance.sqrt();

            Bands {
                upper: middle + multiplier * stddev,
                middle,
                lower: middle - multiplier * stddev,
            }
        } else {
            Bands {
                upper: 0.0,
                middle: 0.0,
                lower: 0.0,
            }
        };

        values.push(IndicatorPoint {
            date: bar.date,
            valid,
            value: IndicatorValue::Bollinger(bands),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::bollinger(period, multiplier),
        values,
    }
}

/// Relative band width; `None` when the middle band is zero or the result is
/// not finite.
pub fn band_width(upper: f64, lower: f64, middle: f64) -> Option<f64> {
    if middle == 0.0 {
        return None;
    }
    let width = (upper - lower) / middle;
    width.is_finite().then_some(width)
}

/// Band width series derived from a Bollinger series.
pub fn calculate_band_width(bollinger: &IndicatorSeries) -> IndicatorSeries {
    let indicator_type = match bollinger.indicator_type {
        IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        } => IndicatorType::BandWidth {
            period,
            stddev_mult_x100,
        },
        ref other => other.clone(),
    };

    let values = bollinger
        .values
        .iter()
        .map(|point| {
            let width = point
                .bands()
                .and_then(|b| band_width(b.upper, b.lower, b.middle));
            IndicatorPoint {
                date: point.date,
                valid: width.is_some(),
                value: IndicatorValue::Simple(width.unwrap_or(0.0)),
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}
