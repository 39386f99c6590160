//! Instrument universe: symbol lists and loading the three series per symbol.
//!
//! An instrument with a missing, empty or unreadable series is skipped and
//! reported; the run only fails when nothing is left.

use std::collections::HashSet;
use std::fmt;

use tracing::{info, warn};

use crate::domain::backtest::Timeframes;
use crate::domain::candle::CandleSeries;
use crate::domain::engine::InstrumentSeries;
use crate::domain::error::BacktestError;
use crate::ports::data_port::CandlePort;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),
}

/// Splits a comma-separated symbol list. Symbols are case-sensitive because
/// they name files on disk.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let symbol = token.trim();
        if symbol.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        if !seen.insert(symbol) {
            return Err(UniverseError::DuplicateSymbol(symbol.to_string()));
        }
        symbols.push(symbol.to_string());
    }

    Ok(symbols)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Missing { timeframe: String },
    Empty { timeframe: String },
    Invalid { timeframe: String, reason: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Missing { timeframe } => write!(f, "no {timeframe} data"),
            SkipReason::Empty { timeframe } => write!(f, "{timeframe} series is empty"),
            SkipReason::Invalid { timeframe, reason } => {
                write!(f, "{timeframe} series unusable: {reason}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedInstrument {
    pub symbol: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default)]
pub struct LoadedUniverse {
    pub instruments: Vec<InstrumentSeries>,
    pub skipped: Vec<SkippedInstrument>,
}

fn fetch_one(
    port: &dyn CandlePort,
    symbol: &str,
    timeframe: &str,
) -> Result<CandleSeries, SkipReason> {
    match port.fetch_series(symbol, timeframe) {
        Ok(Some(series)) if series.is_empty() => Err(SkipReason::Empty {
            timeframe: timeframe.to_string(),
        }),
        Ok(Some(series)) => Ok(series),
        Ok(None) => Err(SkipReason::Missing {
            timeframe: timeframe.to_string(),
        }),
        Err(e) => Err(SkipReason::Invalid {
            timeframe: timeframe.to_string(),
            reason: e.to_string(),
        }),
    }
}

fn load_instrument(
    port: &dyn CandlePort,
    symbol: &str,
    timeframes: &Timeframes,
) -> Result<InstrumentSeries, SkipReason> {
    Ok(InstrumentSeries {
        symbol: symbol.to_string(),
        slow: fetch_one(port, symbol, &timeframes.slow)?,
        medium: fetch_one(port, symbol, &timeframes.medium)?,
        fast: fetch_one(port, symbol, &timeframes.fast)?,
    })
}

pub fn load_universe(
    port: &dyn CandlePort,
    symbols: &[String],
    timeframes: &Timeframes,
) -> Result<LoadedUniverse, BacktestError> {
    let mut loaded = LoadedUniverse::default();

    for symbol in symbols {
        match load_instrument(port, symbol, timeframes) {
            Ok(series) => {
                info!(
                    symbol = %symbol,
                    slow = series.slow.len(),
                    medium = series.medium.len(),
                    fast = series.fast.len(),
                    "instrument loaded"
                );
                loaded.instruments.push(series);
            }
            Err(reason) => {
                warn!(symbol = %symbol, %reason, "skipping instrument");
                loaded.skipped.push(SkippedInstrument {
                    symbol: symbol.clone(),
                    reason,
                });
            }
        }
    }

    if loaded.instruments.is_empty() {
        return Err(BacktestError::NoInstruments);
    }

    if !loaded.skipped.is_empty() {
        info!(
            loaded = loaded.instruments.len(),
            total = symbols.len(),
            "backtesting partial universe"
        );
    }

    Ok(loaded)
}
