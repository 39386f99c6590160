//! OHLC candle and validated candle series.

use crate::domain::error::SeriesError;
use chrono::DateTime;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
        }
    }

    /// high - low
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// |close - open| / (high - low), 0 for a zero-range bar.
    pub fn body_ratio(&self) -> f64 {
        let range = self.range();
        if range <= 0.0 {
            return 0.0;
        }
        (self.close - self.open).abs() / range
    }

    fn check(&self, index: usize) -> Result<(), SeriesError> {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite()) {
            return Err(SeriesError::NonFinite {
                index,
                timestamp: self.timestamp,
            });
        }
        let bracketed = self.low <= self.open.min(self.close) && self.high >= self.open.max(self.close);
        if !bracketed {
            return Err(SeriesError::InvalidRange {
                index,
                timestamp: self.timestamp,
                low: self.low,
                high: self.high,
            });
        }
        Ok(())
    }
}

/// Formats a unix timestamp (seconds) as `YYYY-MM-DD HH:MM`, falling back to
/// the raw number when it is out of range.
pub fn format_timestamp(ts: i64) -> String {
    match DateTime::from_timestamp(ts, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => ts.to_string(),
    }
}

/// Timestamp-ascending candles of one instrument on one timeframe.
///
/// Construction enforces strictly increasing timestamps and
/// `low <= open, close <= high` on every bar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new(candles: Vec<Candle>) -> Result<Self, SeriesError> {
        for (i, candle) in candles.iter().enumerate() {
            candle.check(i)?;
            if i > 0 && candle.timestamp <= candles[i - 1].timestamp {
                return Err(SeriesError::NotAscending {
                    index: i,
                    previous: candles[i - 1].timestamp,
                    timestamp: candle.timestamp,
                });
            }
        }
        Ok(Self { candles })
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Candle> {
        self.candles.get(index)
    }

    /// Index of the first candle with `timestamp > ts`.
    ///
    /// Binary search over the sorted timestamps; returns the same index a
    /// front-to-back scan for the first match would.
    pub fn first_after(&self, ts: i64) -> Option<usize> {
        let idx = self.candles.partition_point(|c| c.timestamp <= ts);
        (idx < self.candles.len()).then_some(idx)
    }
}
