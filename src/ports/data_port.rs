//! Price data access port.

use crate::domain::error::AlgoError;
use crate::domain::ohlcv::PriceSeries;
use chrono::NaiveDate;

pub trait DataPort {
    /// Bars for `ticker` with `start <= date <= end`, oldest first.
    fn fetch_series(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, AlgoError>;
}
