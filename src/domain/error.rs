//! Domain error types.

/// A candle series that violates ordering or OHLC invariants.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeriesError {
    #[error("candle {index}: timestamp {timestamp} does not follow {previous}")]
    NotAscending {
        index: usize,
        previous: i64,
        timestamp: i64,
    },

    #[error("candle {index} at {timestamp}: low {low} / high {high} do not bracket open and close")]
    InvalidRange {
        index: usize,
        timestamp: i64,
        low: f64,
        high: f64,
    },

    #[error("candle {index} at {timestamp}: non-finite price")]
    NonFinite { index: usize, timestamp: i64 },
}

/// Top-level error type for breakout-bt.
#[derive(Debug, thiserror::Error)]
pub enum BacktestError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("failed to load {symbol} {timeframe}: {reason}")]
    DataLoad {
        symbol: String,
        timeframe: String,
        reason: String,
    },

    #[error("invalid {symbol} {timeframe} series: {source}")]
    InvalidSeries {
        symbol: String,
        timeframe: String,
        #[source]
        source: SeriesError,
    },

    #[error("no instrument had a complete set of series")]
    NoInstruments,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&BacktestError> for std::process::ExitCode {
    fn from(err: &BacktestError) -> Self {
        let code: u8 = match err {
            BacktestError::Io(_) => 1,
            BacktestError::ConfigParse { .. }
            | BacktestError::ConfigMissing { .. }
            | BacktestError::ConfigInvalid { .. } => 2,
            BacktestError::DataLoad { .. } | BacktestError::InvalidSeries { .. } => 3,
            BacktestError::NoInstruments => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_error_names_the_index() {
        let err = SeriesError::NotAscending {
            index: 3,
            previous: 200,
            timestamp: 100,
        };
        assert_eq!(
            err.to_string(),
            "candle 3: timestamp 100 does not follow 200"
        );
    }

    #[test]
    fn invalid_series_wraps_source() {
        let err = BacktestError::InvalidSeries {
            symbol: "GOLD".into(),
            timeframe: "M5".into(),
            source: SeriesError::NonFinite {
                index: 0,
                timestamp: 60,
            },
        };
        let text = err.to_string();
        assert!(text.starts_with("invalid GOLD M5 series"));
        assert!(text.contains("non-finite price"));
    }

    #[test]
    fn config_missing_display() {
        let err = BacktestError::ConfigMissing {
            section: "backtest".into(),
            key: "symbols".into(),
        };
        assert_eq!(err.to_string(), "missing config key [backtest] symbols");
    }
}
