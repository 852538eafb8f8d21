//! Trend-following: fast/slow SMA crossover.
//!
//! Buy on the bar where SMA(fast) moves from at-or-below SMA(slow) to above
//! it (golden cross); sell on the symmetric move below (death cross).

use crate::domain::indicator::sma::calculate_sma;
use crate::domain::ohlcv::PriceBar;
use crate::domain::signal::{crossed_above, crossed_below, SignalPoint, SignalSeries};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendParams {
    pub fast_window: usize,
    pub slow_window: usize,
}

impl Default for TrendParams {
    fn default() -> Self {
        Self {
            fast_window: 50,
            slow_window: 200,
        }
    }
}

pub fn generate(bars: &[PriceBar], params: &TrendParams) -> SignalSeries {
    let fast = calculate_sma(bars, params.fast_window);
    let slow = calculate_sma(bars, params.slow_window);
    debug!(fast = %fast.indicator_type, slow = %slow.indicator_type, "computed trend indicators");

    let mut series = SignalSeries::idle(bars);

    for i in 1..bars.len() {
        let (Some(prev_fast), Some(prev_slow), Some(f), Some(s)) = (
            fast.simple_at(i - 1),
            slow.simple_at(i - 1),
            fast.simple_at(i),
            slow.simple_at(i),
        ) else {
            continue;
        };

        series.points[i] = SignalPoint {
            date: bars[i].date,
            evaluated: true,
            buy: crossed_above(prev_fast, prev_slow, f, s),
            sell: crossed_below(prev_fast, prev_slow, f, s),
        };
    }

    series
}
