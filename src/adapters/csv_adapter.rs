//! CSV file candle adapter.
//!
//! One file per symbol and timeframe, `<base>/<SYMBOL>_<TF>.csv`, with a
//! `timestamp,open,high,low,close` header and epoch-second timestamps.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;

use super::{into_series, load_error};
use crate::domain::candle::{Candle, CandleSeries};
use crate::domain::error::BacktestError;
use crate::ports::data_port::CandlePort;

pub struct CsvCandleAdapter {
    base_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

impl CsvCandleAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str, timeframe: &str) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", symbol, timeframe))
    }
}

impl CandlePort for CsvCandleAdapter {
    fn fetch_series(
        &self,
        symbol: &str,
        timeframe: &str,
    ) -> Result<Option<CandleSeries>, BacktestError> {
        let path = self.csv_path(symbol, timeframe);
        if !path.is_file() {
            debug!(path = %path.display(), "candle file not found");
            return Ok(None);
        }

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&path)
            .map_err(|e| {
                load_error(symbol, timeframe, format!("failed to read {}: {}", path.display(), e))
            })?;

        let mut candles = Vec::new();
        for result in rdr.deserialize() {
            let row: CsvRow = result
                .map_err(|e| load_error(symbol, timeframe, format!("CSV parse error: {}", e)))?;
            candles.push(Candle::new(row.timestamp, row.open, row.high, row.low, row.close));
        }

        into_series(symbol, timeframe, candles).map(Some)
    }
}
