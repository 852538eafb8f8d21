//! Portfolio state machine and bar-by-bar simulation.
//!
//! The portfolio is either fully in cash (`Flat`) or fully invested
//! (`Invested`). A buy moves all cash into the position at the bar's close; a
//! sell moves the whole position back to cash at the bar's close. At most one
//! transition happens per bar and a sell takes precedence over a buy.

use crate::domain::error::AlgoError;
use crate::domain::ohlcv::PriceBar;
use crate::domain::signal::SignalSeries;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fill {
    pub side: TradeSide,
    pub date: NaiveDate,
    pub price: f64,
    pub quantity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Holding {
    Flat,
    Invested,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub position_size: f64,
    pub initial_capital: f64,
    pub fills: Vec<Fill>,
    pub equity_curve: Vec<EquityPoint>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            cash: initial_capital,
            position_size: 0.0,
            initial_capital,
            fills: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    pub fn holding(&self) -> Holding {
        if self.position_size > 0.0 {
            Holding::Invested
        } else {
            Holding::Flat
        }
    }

    pub fn value(&self, price: f64) -> f64 {
        self.cash + self.position_size * price
    }

    /// Flat -> Invested at `price`. Returns whether a transition happened.
    pub fn buy(&mut self, date: NaiveDate, price: f64) -> bool {
        if self.holding() == Holding::Invested || self.cash <= 0.0 {
            return false;
        }
        let quantity = self.cash / price;
        self.position_size = quantity;
        self.cash = 0.0;
        self.fills.push(Fill {
            side: TradeSide::Buy,
            date,
            price,
            quantity,
        });
        true
    }

    /// Invested -> Flat at `price`. Returns whether a transition happened.
    pub fn sell(&mut self, date: NaiveDate, price: f64) -> bool {
        if self.holding() == Holding::Flat {
            return false;
        }
        let quantity = self.position_size;
        self.cash = quantity * price;
        self.position_size = 0.0;
        self.fills.push(Fill {
            side: TradeSide::Sell,
            date,
            price,
            quantity,
        });
        true
    }

    pub fn record_equity(&mut self, date: NaiveDate, price: f64) {
        let value = self.value(price);
        self.equity_curve.push(EquityPoint { date, value });
    }
}

/// Replay `signals` over the bars of `ticker` from `initial_capital`, one
/// transition per bar.
pub fn simulate(
    ticker: &str,
    bars: &[PriceBar],
    signals: &SignalSeries,
    initial_capital: f64,
) -> Result<Portfolio, AlgoError> {
    if signals.len() != bars.len() {
        return Err(AlgoError::malformed(
            ticker,
            format!(
                "signal series has {} points for {} bars",
                signals.len(),
                bars.len()
            ),
        ));
    }

    let mut portfolio = Portfolio::new(initial_capital);

    for (bar, signal) in bars.iter().zip(&signals.points) {
        if signal.buy && signal.sell {
            warn!(date = %bar.date, "buy and sell on the same bar, applying sell only");
        }

        if signal.sell {
            portfolio.sell(bar.date, bar.close);
        } else if signal.buy {
            portfolio.buy(bar.date, bar.close);
        }

        portfolio.record_equity(bar.date, bar.close);
    }

    Ok(portfolio)
}
