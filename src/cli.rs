//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

use crate::adapters::console_report::ConsoleReportAdapter;
use crate::adapters::csv_adapter::CsvCandleAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_adapter::JsonCandleAdapter;
use crate::domain::backtest::{BacktestConfig, DataFormat, Timeframes};
use crate::domain::config_validation::{
    validate_backtest_config, validate_instrument_params, validate_strategy_config,
};
use crate::domain::engine::{BacktestReport, run_universe};
use crate::domain::error::BacktestError;
use crate::domain::exit_policy::{
    DEFAULT_CAP_R, DEFAULT_RR, DEFAULT_STEP_R, ExitPolicy, PolicyKind, PolicyParams,
};
use crate::domain::universe::{LoadedUniverse, load_universe, parse_symbols};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::CandlePort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "breakout-bt", about = "Multi-timeframe breakout backtester")]
pub struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest with one exit policy
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Override [strategy] policy
        #[arg(long)]
        policy: Option<String>,
        /// Override [backtest] symbols (comma-separated)
        #[arg(long)]
        symbols: Option<String>,
    },
    /// Run every exit policy over the same data
    Compare {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbols: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            config,
            policy,
            symbols,
        } => run_backtest(&config, policy.as_deref(), symbols.as_deref()),
        Command::Compare { config, symbols } => run_compare(&config, symbols.as_deref()),
        Command::Validate { config } => validate_config_file(&config).map(|_| ()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, BacktestError> {
    FileConfigAdapter::from_file(path).map_err(|e| BacktestError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn validate_all(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    validate_backtest_config(config)?;
    validate_strategy_config(config)?;
    validate_instrument_params(config)
}

fn per_symbol(config: &dyn ConfigPort, section: &str) -> HashMap<String, f64> {
    config
        .section_entries(section)
        .into_iter()
        .filter_map(|(symbol, raw)| raw.trim().parse().ok().map(|v| (symbol, v)))
        .collect()
}

/// Builds the run configuration from an already validated config.
pub fn build_backtest_config(
    config: &dyn ConfigPort,
    symbols_override: Option<&str>,
) -> Result<BacktestConfig, BacktestError> {
    let data_dir = config
        .get_string("backtest", "data_dir")
        .ok_or_else(|| BacktestError::ConfigMissing {
            section: "backtest".into(),
            key: "data_dir".into(),
        })?;

    let symbols_raw = match symbols_override {
        Some(s) => s.to_string(),
        None => config.get_string("backtest", "symbols").unwrap_or_default(),
    };
    let symbols = parse_symbols(&symbols_raw).map_err(|e| BacktestError::ConfigInvalid {
        section: "backtest".into(),
        key: "symbols".into(),
        reason: e.to_string(),
    })?;

    let format = config
        .get_string("backtest", "format")
        .map_or(Some(DataFormat::Json), |s| DataFormat::parse(&s))
        .ok_or_else(|| BacktestError::ConfigInvalid {
            section: "backtest".into(),
            key: "format".into(),
            reason: "format must be json or csv".into(),
        })?;

    let policy_kind = parse_policy(
        config
            .get_string("strategy", "policy")
            .as_deref()
            .unwrap_or(PolicyKind::LadderOneR.name()),
    )?;

    let defaults = Timeframes::default();
    let timeframe = |key: &str, fallback: String| {
        config
            .get_string("backtest", key)
            .map(|s| s.trim().to_string())
            .unwrap_or(fallback)
    };

    Ok(BacktestConfig {
        data_dir: PathBuf::from(data_dir.trim()),
        format,
        suffix: config
            .get_string("backtest", "suffix")
            .unwrap_or_else(|| "2y".to_string()),
        symbols,
        timeframes: Timeframes {
            slow: timeframe("slow", defaults.slow),
            medium: timeframe("medium", defaults.medium),
            fast: timeframe("fast", defaults.fast),
        },
        policy_kind,
        policy_params: PolicyParams {
            rr: config.get_double("strategy", "rr", DEFAULT_RR),
            step: config.get_double("strategy", "step", DEFAULT_STEP_R),
            cap: config.get_double("strategy", "cap", DEFAULT_CAP_R),
        },
        min_body_ratio: config.get_double("strategy", "min_body_ratio", 0.0),
        spreads: per_symbol(config, "spread"),
        min_ranges: per_symbol(config, "min_range"),
    })
}

fn parse_policy(name: &str) -> Result<PolicyKind, BacktestError> {
    name.parse::<PolicyKind>()
        .map_err(|e| BacktestError::ConfigInvalid {
            section: "strategy".into(),
            key: "policy".into(),
            reason: e.to_string(),
        })
}

pub fn candle_port(config: &BacktestConfig) -> Box<dyn CandlePort> {
    match config.format {
        DataFormat::Json => Box::new(JsonCandleAdapter::new(
            config.data_dir.clone(),
            config.suffix.clone(),
        )),
        DataFormat::Csv => Box::new(CsvCandleAdapter::new(config.data_dir.clone())),
    }
}

/// Loads, validates and builds the config, then loads every instrument.
pub fn load_backtest(
    config_path: &Path,
    symbols: Option<&str>,
) -> Result<(BacktestConfig, LoadedUniverse), BacktestError> {
    info!(path = %config_path.display(), "loading config");
    let adapter = load_config(config_path)?;
    validate_all(&adapter)?;
    let bt_config = build_backtest_config(&adapter, symbols)?;

    info!(
        symbols = bt_config.symbols.len(),
        dir = %bt_config.data_dir.display(),
        "loading candles"
    );
    let port = candle_port(&bt_config);
    let universe = load_universe(port.as_ref(), &bt_config.symbols, &bt_config.timeframes)?;
    Ok((bt_config, universe))
}

/// Runs `policies` over one loaded universe, in order.
pub fn run_policies(
    bt_config: &BacktestConfig,
    universe: &LoadedUniverse,
    policies: &[ExitPolicy],
) -> Vec<BacktestReport> {
    let base = bt_config.strategy();
    policies
        .iter()
        .map(|&policy| {
            info!(%policy, instruments = universe.instruments.len(), "running backtest");
            run_universe(
                &universe.instruments,
                universe.skipped.clone(),
                &base.with_policy(policy),
                |symbol| bt_config.entry_params(symbol),
            )
        })
        .collect()
}

fn run_backtest(
    config_path: &Path,
    policy_override: Option<&str>,
    symbols: Option<&str>,
) -> Result<(), BacktestError> {
    let (mut bt_config, universe) = load_backtest(config_path, symbols)?;
    if let Some(name) = policy_override {
        bt_config.policy_kind = parse_policy(name)?;
    }

    let reports = run_policies(&bt_config, &universe, &[bt_config.policy()]);
    ConsoleReportAdapter.write_all(&reports)
}

fn run_compare(config_path: &Path, symbols: Option<&str>) -> Result<(), BacktestError> {
    let (bt_config, universe) = load_backtest(config_path, symbols)?;
    let policies: Vec<ExitPolicy> = PolicyKind::ALL
        .into_iter()
        .map(|kind| ExitPolicy::new(kind, &bt_config.policy_params))
        .collect();

    let reports = run_policies(&bt_config, &universe, &policies);
    ConsoleReportAdapter.write_all(&reports)
}

pub fn validate_config_file(config_path: &Path) -> Result<BacktestConfig, BacktestError> {
    let adapter = load_config(config_path)?;
    validate_all(&adapter)?;
    let bt_config = build_backtest_config(&adapter, None)?;
    info!(
        policy = %bt_config.policy(),
        symbols = bt_config.symbols.len(),
        "config validated successfully"
    );
    Ok(bt_config)
}
