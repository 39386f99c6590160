//! Backtest configuration.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::domain::entry::EntryParams;
use crate::domain::exit_policy::{ExitPolicy, PolicyKind, PolicyParams};

/// On-disk candle layout understood by the bundled adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Json,
    Csv,
}

impl DataFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Some(DataFormat::Json),
            "csv" => Some(DataFormat::Csv),
            _ => None,
        }
    }
}

/// Timeframe labels for the three roles, e.g. H1 / M15 / M5.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeframes {
    pub slow: String,
    pub medium: String,
    pub fast: String,
}

impl Default for Timeframes {
    fn default() -> Self {
        Timeframes {
            slow: "H1".into(),
            medium: "M15".into(),
            fast: "M5".into(),
        }
    }
}

/// Parameters the engine applies to every instrument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyConfig {
    pub policy: ExitPolicy,
    /// Minimum body/range ratio of the bias bar; 0 disables the filter.
    pub min_body_ratio: f64,
}

impl StrategyConfig {
    pub fn new(policy: ExitPolicy) -> Self {
        StrategyConfig {
            policy,
            min_body_ratio: 0.0,
        }
    }

    /// Same filters, different exit policy.
    pub fn with_policy(&self, policy: ExitPolicy) -> Self {
        StrategyConfig { policy, ..*self }
    }
}

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub data_dir: PathBuf,
    pub format: DataFormat,
    /// Suffix of JSON candle files, e.g. `2y` in `GOLD_H1_2y.json`.
    pub suffix: String,
    pub symbols: Vec<String>,
    pub timeframes: Timeframes,
    pub policy_kind: PolicyKind,
    pub policy_params: PolicyParams,
    pub min_body_ratio: f64,
    pub spreads: HashMap<String, f64>,
    pub min_ranges: HashMap<String, f64>,
}

impl BacktestConfig {
    pub fn policy(&self) -> ExitPolicy {
        ExitPolicy::new(self.policy_kind, &self.policy_params)
    }

    pub fn strategy(&self) -> StrategyConfig {
        StrategyConfig {
            policy: self.policy(),
            min_body_ratio: self.min_body_ratio,
        }
    }

    /// Spread and minimum range for `symbol`; unknown symbols get zeros.
    pub fn entry_params(&self, symbol: &str) -> EntryParams {
        EntryParams {
            spread: self.spreads.get(symbol).copied().unwrap_or(0.0),
            min_range: self.min_ranges.get(symbol).copied().unwrap_or(0.0),
        }
    }
}
