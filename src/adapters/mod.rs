//! Concrete adapter implementations for ports.

pub mod console_report;
pub mod csv_adapter;
pub mod file_config_adapter;
pub mod json_adapter;

use crate::domain::candle::{Candle, CandleSeries};
use crate::domain::error::BacktestError;

/// Sorts loaded rows by timestamp and validates them into a series.
fn into_series(
    symbol: &str,
    timeframe: &str,
    mut candles: Vec<Candle>,
) -> Result<CandleSeries, BacktestError> {
    candles.sort_by_key(|c| c.timestamp);
    CandleSeries::new(candles).map_err(|source| BacktestError::InvalidSeries {
        symbol: symbol.to_string(),
        timeframe: timeframe.to_string(),
        source,
    })
}

fn load_error(symbol: &str, timeframe: &str, reason: impl Into<String>) -> BacktestError {
    BacktestError::DataLoad {
        symbol: symbol.to_string(),
        timeframe: timeframe.to_string(),
        reason: reason.into(),
    }
}
