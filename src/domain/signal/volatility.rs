//! Volatility breakout after a Bollinger squeeze.
//!
//! A bar is in a squeeze when its band width is below `squeeze_threshold`
//! times the trailing mean band width over `2 * window` bars (current bar
//! included). A buy fires on bar i when bar i-1 was a squeeze and the close of
//! bar i is above the upper band of bar i-1; a sell fires when bar i-1 was a
//! squeeze and the close of bar i is below the lower band of bar i-1.

use crate::domain::indicator::bollinger::{calculate_band_width, calculate_bollinger};
use crate::domain::indicator::IndicatorSeries;
use crate::domain::ohlcv::PriceBar;
use crate::domain::signal::{SignalPoint, SignalSeries};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolatilityParams {
    pub window: usize,
    pub std_dev: f64,
    pub squeeze_threshold: f64,
}

impl Default for VolatilityParams {
    fn default() -> Self {
        Self {
            window: 20,
            std_dev: 2.0,
            squeeze_threshold: 1.5,
        }
    }
}

/// Squeeze state per bar; `None` until a full trailing window of band widths
/// exists.
pub fn squeeze_flags(widths: &IndicatorSeries, lookback: usize, threshold: f64) -> Vec<Option<bool>> {
    let mut flags = vec![None; widths.values.len()];
    if lookback == 0 {
        return flags;
    }

    for i in (lookback - 1)..widths.values.len() {
        let window: Option<Vec<f64>> = (i + 1 - lookback..=i).map(|j| widths.simple_at(j)).collect();
        let Some(window) = window else {
            continue;
        };
        let mean = window.iter().sum::<f64>() / lookback as f64;
        flags[i] = Some(window[lookback - 1] < threshold * mean);
    }

    flags
}

pub fn generate(bars: &[PriceBar], params: &VolatilityParams) -> SignalSeries {
    let bands = calculate_bollinger(bars, params.window, params.std_dev);
    let widths = calculate_band_width(&bands);
    // a squeeze mean longer than any series never completes
    let Some(lookback) = params.window.checked_mul(2) else {
        return SignalSeries::idle(bars);
    };
    let squeeze = squeeze_flags(&widths, lookback, params.squeeze_threshold);
    debug!(
        indicator = %widths.indicator_type,
        squeeze_bars = squeeze.iter().filter(|s| **s == Some(true)).count(),
        "computed band width squeeze"
    );

    let mut series = SignalSeries::idle(bars);

    for i in 1..bars.len() {
        let (Some(was_squeeze), Some(prev)) = (squeeze[i - 1], bands.bands_at(i - 1)) else {
            continue;
        };
        let close = bars[i].close;

        series.points[i] = SignalPoint {
            date: bars[i].date,
            evaluated: true,
            buy: was_squeeze && close > prev.upper,
            sell: was_squeeze && close < prev.lower,
        };
    }

    series
}
