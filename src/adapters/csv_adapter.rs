//! CSV file data adapter.
//!
//! Reads `<base_path>/<TICKER>.csv`. Columns are located by header name,
//! case-insensitively: `date, open, high, low, close` are required and
//! `volume` is optional.

use crate::domain::error::AlgoError;
use crate::domain::ohlcv::{PriceBar, PriceSeries};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use csv::StringRecord;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct CsvAdapter {
    base_path: PathBuf,
}

struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn locate(ticker: &str, headers: &StringRecord) -> Result<Self, AlgoError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| AlgoError::MissingColumn {
                ticker: ticker.to_string(),
                column: name.to_string(),
            })
        };

        Ok(Columns {
            date: require("date")?,
            open: require("open")?,
            high: require("high")?,
            low: require("low")?,
            close: require("close")?,
            volume: find("volume"),
        })
    }
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }
}

fn field<'a>(ticker: &str, record: &'a StringRecord, idx: usize, name: &str) -> Result<&'a str, AlgoError> {
    record.get(idx).map(str::trim).ok_or_else(|| {
        AlgoError::malformed(ticker, format!("row is missing the {} field", name))
    })
}

fn number(ticker: &str, record: &StringRecord, idx: usize, name: &str) -> Result<f64, AlgoError> {
    let raw = field(ticker, record, idx, name)?;
    raw.parse::<f64>()
        .map_err(|_| AlgoError::malformed(ticker, format!("invalid {} value: {:?}", name, raw)))
}

impl DataPort for CsvAdapter {
    fn fetch_series(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, AlgoError> {
        let path = self.csv_path(ticker);
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AlgoError::NoData {
                ticker: ticker.to_string(),
            },
            std::io::ErrorKind::InvalidData => {
                AlgoError::malformed(ticker, format!("price file is not valid UTF-8: {}", e))
            }
            _ => AlgoError::Io(e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| AlgoError::malformed(ticker, format!("CSV header error: {}", e)))?
            .clone();
        let columns = Columns::locate(ticker, &headers)?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result
                .map_err(|e| AlgoError::malformed(ticker, format!("CSV parse error: {}", e)))?;

            let date_str = field(ticker, &record, columns.date, "date")?;
            let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT).map_err(|e| {
                AlgoError::malformed(ticker, format!("invalid date {:?}: {}", date_str, e))
            })?;

            if date < start || date > end {
                continue;
            }

            let volume = match columns.volume {
                Some(idx) => number(ticker, &record, idx, "volume")?,
                None => 0.0,
            };

            bars.push(PriceBar {
                date,
                open: number(ticker, &record, columns.open, "open")?,
                high: number(ticker, &record, columns.high, "high")?,
                low: number(ticker, &record, columns.low, "low")?,
                close: number(ticker, &record, columns.close, "close")?,
                volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        if let Some(pair) = bars.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(AlgoError::malformed(
                ticker,
                format!("duplicate bar for {}", pair[0].date),
            ));
        }

        debug!(ticker, bars = bars.len(), path = %path.display(), "price series loaded");
        PriceSeries::new(ticker, bars)
    }
}
