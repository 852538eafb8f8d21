//! Buy/sell signal series and the three signal generators.
//!
//! A generator is a pure function from bars and parameters to a
//! [`SignalSeries`] parallel to the bars. Rules are evaluated on the
//! transition from bar i-1 to bar i, so a condition that persists only fires
//! on the bar where it first becomes true. Bars whose indicators are still in
//! warmup are marked as not evaluated and never carry a signal.

pub mod mean_reversion;
pub mod trend;
pub mod volatility;

use crate::domain::ohlcv::PriceBar;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalPoint {
    pub date: NaiveDate,
    pub evaluated: bool,
    pub buy: bool,
    pub sell: bool,
}

impl SignalPoint {
    pub fn idle(date: NaiveDate) -> Self {
        SignalPoint {
            date,
            evaluated: false,
            buy: false,
            sell: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalSeries {
    pub points: Vec<SignalPoint>,
}

impl SignalSeries {
    /// A series with no evaluated bars and no signals.
    pub fn idle(bars: &[PriceBar]) -> Self {
        SignalSeries {
            points: bars.iter().map(|b| SignalPoint::idle(b.date)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn buy_count(&self) -> usize {
        self.points.iter().filter(|p| p.buy).count()
    }

    pub fn sell_count(&self) -> usize {
        self.points.iter().filter(|p| p.sell).count()
    }

    pub fn is_signal_free(&self) -> bool {
        self.points.iter().all(|p| !p.buy && !p.sell)
    }

    /// Indices where buy and sell are both set.
    pub fn conflicts(&self) -> Vec<usize> {
        self.points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.buy && p.sell)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn buy_indices(&self) -> Vec<usize> {
        self.points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.buy)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn sell_indices(&self) -> Vec<usize> {
        self.points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.sell)
            .map(|(i, _)| i)
            .collect()
    }
}

/// `a` moves from at-or-below `b` to strictly above it.
pub fn crossed_above(prev_a: f64, prev_b: f64, a: f64, b: f64) -> bool {
    prev_a <= prev_b && a > b
}

/// `a` moves from at-or-above `b` to strictly below it.
pub fn crossed_below(prev_a: f64, prev_b: f64, a: f64, b: f64) -> bool {
    prev_a >= prev_b && a < b
}
