//! Performance metrics from an equity curve.
//!
//! Every metric falls back to 0 when its inputs are degenerate (empty curve,
//! zero starting value, zero elapsed days, zero variance) so reports never
//! carry NaN or infinity. Values are rounded to 2 decimal places.

use super::portfolio::EquityPoint;
use serde::Serialize;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const CALENDAR_DAYS_PER_YEAR: f64 = 365.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub total_return_pct: f64,
    pub annualized_return_pct: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown_pct: f64,
}

impl Metrics {
    pub fn compute(equity_curve: &[EquityPoint]) -> Self {
        let (Some(first), Some(last)) = (equity_curve.first(), equity_curve.last()) else {
            return Self::zero();
        };
        if first.value == 0.0 {
            return Self::zero();
        }

        let total_return_pct = finite_or_zero((last.value / first.value - 1.0) * 100.0);

        let days = (last.date - first.date).num_days();
        let annualized_return_pct = if days > 0 {
            let growth = 1.0 + total_return_pct / 100.0;
            finite_or_zero((growth.powf(CALENDAR_DAYS_PER_YEAR / days as f64) - 1.0) * 100.0)
        } else {
            0.0
        };

        Metrics {
            total_return_pct: round2(total_return_pct),
            annualized_return_pct: round2(annualized_return_pct),
            sharpe_ratio: round2(compute_sharpe(equity_curve)),
            max_drawdown_pct: round2(compute_max_drawdown(equity_curve)),
        }
    }

    fn zero() -> Self {
        Metrics {
            total_return_pct: 0.0,
            annualized_return_pct: 0.0,
            sharpe_ratio: 0.0,
            max_drawdown_pct: 0.0,
        }
    }
}

pub fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.is_finite() { rounded } else { value }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Annualized Sharpe ratio of day-over-day changes, zero risk-free rate,
/// sample standard deviation.
fn compute_sharpe(equity_curve: &[EquityPoint]) -> f64 {
    let returns: Vec<f64> = equity_curve
        .windows(2)
        .filter(|w| w[0].value != 0.0)
        .map(|w| w[1].value / w[0].value - 1.0)
        .collect();

    if returns.len() < 2 {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean: f64 = returns.iter().sum::<f64>() / n;
    let variance: f64 = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        finite_or_zero(mean / stddev * TRADING_DAYS_PER_YEAR.sqrt())
    } else {
        0.0
    }
}

/// Most negative (value - running max) / running max, as a percentage.
fn compute_max_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;

    for point in equity_curve {
        peak = peak.max(point.value);
        if peak > 0.0 {
            let dd = (point.value - peak) / peak * 100.0;
            max_dd = max_dd.min(dd);
        }
    }

    finite_or_zero(max_dd)
}
