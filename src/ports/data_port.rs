//! Candle data access port.

use crate::domain::candle::CandleSeries;
use crate::domain::error::BacktestError;

pub trait CandlePort {
    /// Series for `symbol` on `timeframe`; `Ok(None)` when no data exists.
    fn fetch_series(
        &self,
        symbol: &str,
        timeframe: &str,
    ) -> Result<Option<CandleSeries>, BacktestError>;
}
