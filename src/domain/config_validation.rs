//! Configuration validation.
//!
//! Validates all config fields before the backtest runs.

use crate::domain::backtest::DataFormat;
use crate::domain::error::BacktestError;
use crate::domain::exit_policy::PolicyKind;
use crate::domain::universe::parse_symbols;
use crate::ports::config_port::ConfigPort;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    validate_data_dir(config)?;
    validate_format(config)?;
    validate_symbols(config)?;
    validate_timeframes(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    validate_policy(config)?;
    for key in ["rr", "step", "cap"] {
        validate_positive(config, key)?;
    }
    validate_min_body_ratio(config)?;
    Ok(())
}

/// `[spread]` and `[min_range]`: every value must be a non-negative number.
pub fn validate_instrument_params(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    for section in ["spread", "min_range"] {
        for (symbol, raw) in config.section_entries(section) {
            let value = parse_number(section, &symbol, &raw)?;
            if value < 0.0 {
                return Err(invalid(section, &symbol, "must be non-negative"));
            }
        }
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> BacktestError {
    BacktestError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_number(section: &str, key: &str, raw: &str) -> Result<f64, BacktestError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(section, key, &format!("'{}' is not a number", raw.trim())))
}

fn optional_number(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, BacktestError> {
    config
        .get_string(section, key)
        .map(|raw| parse_number(section, key, &raw))
        .transpose()
}

fn validate_data_dir(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    match config.get_string("backtest", "data_dir") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(BacktestError::ConfigMissing {
            section: "backtest".to_string(),
            key: "data_dir".to_string(),
        }),
    }
}

fn validate_format(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    match config.get_string("backtest", "format") {
        Some(s) if DataFormat::parse(&s).is_none() => Err(invalid(
            "backtest",
            "format",
            "format must be json or csv",
        )),
        _ => Ok(()),
    }
}

fn validate_symbols(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    match config.get_string("backtest", "symbols") {
        Some(s) if !s.trim().is_empty() => parse_symbols(&s)
            .map(|_| ())
            .map_err(|e| invalid("backtest", "symbols", &e.to_string())),
        _ => Err(BacktestError::ConfigMissing {
            section: "backtest".to_string(),
            key: "symbols".to_string(),
        }),
    }
}

fn validate_timeframes(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    for key in ["slow", "medium", "fast"] {
        if let Some(s) = config.get_string("backtest", key) {
            if s.trim().is_empty() {
                return Err(invalid("backtest", key, "timeframe label must not be empty"));
            }
        }
    }
    Ok(())
}

fn validate_policy(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    match config.get_string("strategy", "policy") {
        Some(s) => s
            .parse::<PolicyKind>()
            .map(|_| ())
            .map_err(|e| invalid("strategy", "policy", &e.to_string())),
        None => Ok(()),
    }
}

fn validate_positive(config: &dyn ConfigPort, key: &str) -> Result<(), BacktestError> {
    match optional_number(config, "strategy", key)? {
        Some(v) if v <= 0.0 => Err(invalid("strategy", key, &format!("{key} must be positive"))),
        _ => Ok(()),
    }
}

fn validate_min_body_ratio(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    match optional_number(config, "strategy", "min_body_ratio")? {
        Some(v) if !(0.0..=1.0).contains(&v) => Err(invalid(
            "strategy",
            "min_body_ratio",
            "min_body_ratio must be between 0 and 1",
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    fn invalid_key(err: &BacktestError) -> Option<&str> {
        match err {
            BacktestError::ConfigInvalid { key, .. } => Some(key),
            _ => None,
        }
    }

    #[test]
    fn valid_backtest_config_passes() {
        let config = make_config(
            r#"
[backtest]
data_dir = data
format = json
symbols = GOLD,Usa500
slow = H1
medium = M15
fast = M5
suffix = 2y
"#,
        );
        assert!(validate_backtest_config(&config).is_ok());
    }

    #[test]
    fn missing_data_dir_fails() {
        let config = make_config("[backtest]\nsymbols = GOLD\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, BacktestError::ConfigMissing { key, .. } if key == "data_dir"));
    }

    #[test]
    fn unknown_format_fails() {
        let config = make_config("[backtest]\ndata_dir = d\nformat = parquet\nsymbols = GOLD\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert_eq!(invalid_key(&err), Some("format"));
    }

    #[test]
    fn missing_symbols_fails() {
        let config = make_config("[backtest]\ndata_dir = d\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, BacktestError::ConfigMissing { key, .. } if key == "symbols"));
    }

    #[test]
    fn duplicate_symbols_fail() {
        let config = make_config("[backtest]\ndata_dir = d\nsymbols = GOLD,GOLD\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert_eq!(invalid_key(&err), Some("symbols"));
        assert!(err.to_string().contains("duplicate symbol: GOLD"));
    }

    #[test]
    fn empty_symbol_token_fails() {
        let config = make_config("[backtest]\ndata_dir = d\nsymbols = GOLD,,Usa500\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert_eq!(invalid_key(&err), Some("symbols"));
    }

    #[test]
    fn valid_strategy_config_passes() {
        let config = make_config(
            "[strategy]\npolicy = ladder-stepN\nrr = 2\nstep = 2\ncap = 10\nmin_body_ratio = 0.3\n",
        );
        assert!(validate_strategy_config(&config).is_ok());
    }

    #[test]
    fn empty_strategy_section_uses_defaults() {
        let config = make_config("[strategy]\n");
        assert!(validate_strategy_config(&config).is_ok());
    }

    #[test]
    fn unknown_policy_fails() {
        let config = make_config("[strategy]\npolicy = trailing\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert_eq!(invalid_key(&err), Some("policy"));
    }

    #[test]
    fn non_positive_rr_step_cap_fail() {
        for key in ["rr", "step", "cap"] {
            let config = make_config(&format!("[strategy]\n{key} = 0\n"));
            let err = validate_strategy_config(&config).unwrap_err();
            assert_eq!(invalid_key(&err), Some(key));
        }
    }

    #[test]
    fn non_numeric_cap_fails() {
        let config = make_config("[strategy]\ncap = lots\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(err.to_string().contains("'lots' is not a number"));
    }

    #[test]
    fn min_body_ratio_out_of_range_fails() {
        let config = make_config("[strategy]\nmin_body_ratio = 1.5\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert_eq!(invalid_key(&err), Some("min_body_ratio"));
    }

    #[test]
    fn negative_spread_fails() {
        let config = make_config("[spread]\nGOLD = -0.1\n");
        let err = validate_instrument_params(&config).unwrap_err();
        assert!(
            matches!(err, BacktestError::ConfigInvalid { section, key, .. } if section == "spread" && key == "GOLD")
        );
    }

    #[test]
    fn non_numeric_min_range_fails() {
        let config = make_config("[min_range]\nUsa500 = wide\n");
        let err = validate_instrument_params(&config).unwrap_err();
        assert_eq!(invalid_key(&err), Some("Usa500"));
    }

    #[test]
    fn instrument_params_pass() {
        let config = make_config("[spread]\nGOLD = 0.15\n\n[min_range]\nGOLD = 0.5\n");
        assert!(validate_instrument_params(&config).is_ok());
    }
}
