#![allow(dead_code)]

use breakout_bt::domain::candle::{Candle, CandleSeries};
use breakout_bt::domain::engine::InstrumentSeries;
use breakout_bt::domain::error::BacktestError;
use breakout_bt::ports::data_port::CandlePort;
use std::collections::HashMap;

pub type Bar = (i64, f64, f64, f64, f64);

pub struct MockCandlePort {
    pub series: HashMap<(String, String), CandleSeries>,
    pub errors: HashMap<String, String>,
}

impl MockCandlePort {
    pub fn new() -> Self {
        Self {
            series: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(mut self, symbol: &str, timeframe: &str, series: CandleSeries) -> Self {
        self.series
            .insert((symbol.to_string(), timeframe.to_string()), series);
        self
    }

    /// Registers all three series of `instrument` under H1 / M15 / M5.
    pub fn with_instrument(self, instrument: &InstrumentSeries) -> Self {
        let symbol = instrument.symbol.clone();
        self.with_series(&symbol, "H1", instrument.slow.clone())
            .with_series(&symbol, "M15", instrument.medium.clone())
            .with_series(&symbol, "M5", instrument.fast.clone())
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl CandlePort for MockCandlePort {
    fn fetch_series(
        &self,
        symbol: &str,
        timeframe: &str,
    ) -> Result<Option<CandleSeries>, BacktestError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(BacktestError::DataLoad {
                symbol: symbol.to_string(),
                timeframe: timeframe.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self
            .series
            .get(&(symbol.to_string(), timeframe.to_string()))
            .cloned())
    }
}

pub fn series(bars: &[Bar]) -> CandleSeries {
    CandleSeries::new(
        bars.iter()
            .map(|&(t, o, h, l, c)| Candle::new(t, o, h, l, c))
            .collect(),
    )
    .unwrap()
}

pub fn instrument(symbol: &str, slow: &[Bar], medium: &[Bar], fast: &[Bar]) -> InstrumentSeries {
    InstrumentSeries {
        symbol: symbol.to_string(),
        slow: series(slow),
        medium: series(medium),
        fast: series(fast),
    }
}

/// LONG bias at t=7200, medium break at 8100, entry bar at 8400 with
/// close 100 and low 95 (risk 5). `fast_tail` follows the entry bar.
pub fn long_breakout(symbol: &str, fast_tail: &[Bar]) -> InstrumentSeries {
    let mut fast = vec![
        (8100, 95.0, 96.0, 94.0, 95.5),
        (8400, 96.0, 100.0, 95.0, 100.0),
    ];
    fast.extend_from_slice(fast_tail);
    instrument(
        symbol,
        &[
            (0, 90.0, 92.0, 88.0, 91.0),
            (3600, 91.0, 93.0, 90.0, 92.0),
            (7200, 92.0, 96.0, 91.5, 95.0),
        ],
        &[(7200, 94.0, 95.0, 93.0, 94.5), (8100, 94.5, 97.0, 94.0, 96.0)],
        &fast,
    )
}

/// SHORT bias at t=7200, medium break at 8100, entry bar at 8400 with
/// close 200 and high 210 (risk 10). `fast_tail` follows the entry bar.
pub fn short_breakout(symbol: &str, fast_tail: &[Bar]) -> InstrumentSeries {
    let mut fast = vec![
        (8100, 205.0, 206.0, 204.0, 205.0),
        (8400, 204.0, 210.0, 199.0, 200.0),
    ];
    fast.extend_from_slice(fast_tail);
    instrument(
        symbol,
        &[
            (0, 220.0, 222.0, 218.0, 219.0),
            (3600, 219.0, 220.0, 215.0, 216.0),
            (7200, 216.0, 216.5, 208.0, 209.0),
        ],
        &[
            (7200, 209.0, 210.0, 207.0, 208.0),
            (8100, 208.0, 208.5, 204.0, 205.0),
        ],
        &fast,
    )
}

pub fn port_for(instruments: &[InstrumentSeries]) -> MockCandlePort {
    instruments
        .iter()
        .fold(MockCandlePort::new(), |port, inst| port.with_instrument(inst))
}

pub fn symbols(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
