//! Mean reversion on Bollinger band breaches.
//!
//! Buy when the close drops from at-or-above the lower band to below it;
//! sell when the close rises from at-or-below the upper band to above it.

use crate::domain::indicator::bollinger::calculate_bollinger;
use crate::domain::ohlcv::PriceBar;
use crate::domain::signal::{crossed_above, crossed_below, SignalPoint, SignalSeries};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanReversionParams {
    pub window: usize,
    pub std_dev: f64,
}

impl Default for MeanReversionParams {
    fn default() -> Self {
        Self {
            window: 20,
            std_dev: 2.0,
        }
    }
}

pub fn generate(bars: &[PriceBar], params: &MeanReversionParams) -> SignalSeries {
    let bands = calculate_bollinger(bars, params.window, params.std_dev);
    debug!(indicator = %bands.indicator_type, "computed mean reversion bands");

    let mut series = SignalSeries::idle(bars);

    for i in 1..bars.len() {
        let (Some(prev), Some(curr)) = (bands.bands_at(i - 1), bands.bands_at(i)) else {
            continue;
        };
        let prev_close = bars[i - 1].close;
        let close = bars[i].close;

        series.points[i] = SignalPoint {
            date: bars[i].date,
            evaluated: true,
            buy: crossed_below(prev_close, prev.lower, close, curr.lower),
            sell: crossed_above(prev_close, prev.upper, close, curr.upper),
        };
    }

    series
}
