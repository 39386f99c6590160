//! JSON candle files as exported by the MT5 history downloader.
//!
//! Layout: `<base>/<SYMBOL>/<SYMBOL>_<TF>_<suffix>.json`, each file an array
//! of `[time, open, high, low, close, ...]` rows with `time` in epoch seconds.
//! Columns past `close` (tick volume, spread, real volume) are ignored.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use super::{into_series, load_error};
use crate::domain::candle::{Candle, CandleSeries};
use crate::domain::error::BacktestError;
use crate::ports::data_port::CandlePort;

pub struct JsonCandleAdapter {
    base_path: PathBuf,
    suffix: String,
}

impl JsonCandleAdapter {
    pub fn new(base_path: PathBuf, suffix: impl Into<String>) -> Self {
        Self {
            base_path,
            suffix: suffix.into(),
        }
    }

    fn json_path(&self, symbol: &str, timeframe: &str) -> PathBuf {
        self.base_path
            .join(symbol)
            .join(format!("{}_{}_{}.json", symbol, timeframe, self.suffix))
    }
}

fn row_to_candle(
    symbol: &str,
    timeframe: &str,
    index: usize,
    row: &[f64],
) -> Result<Candle, BacktestError> {
    match *row {
        [time, open, high, low, close, ..] => {
            Ok(Candle::new(time as i64, open, high, low, close))
        }
        _ => Err(load_error(
            symbol,
            timeframe,
            format!("row {index} has {} columns, expected at least 5", row.len()),
        )),
    }
}

impl CandlePort for JsonCandleAdapter {
    fn fetch_series(
        &self,
        symbol: &str,
        timeframe: &str,
    ) -> Result<Option<CandleSeries>, BacktestError> {
        let path = self.json_path(symbol, timeframe);
        if !path.is_file() {
            debug!(path = %path.display(), "candle file not found");
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            load_error(symbol, timeframe, format!("failed to read {}: {}", path.display(), e))
        })?;
        let rows: Vec<Vec<f64>> = serde_json::from_str(&content).map_err(|e| {
            load_error(symbol, timeframe, format!("JSON parse error in {}: {}", path.display(), e))
        })?;

        let candles = rows
            .iter()
            .enumerate()
            .map(|(i, row)| row_to_candle(symbol, timeframe, i, row))
            .collect::<Result<Vec<_>, _>>()?;

        into_series(symbol, timeframe, candles).map(Some)
    }
}
