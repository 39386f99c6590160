//! Core domain types and logic.

pub mod backtest;
pub mod candle;
pub mod config_validation;
pub mod engine;
pub mod entry;
pub mod error;
pub mod exit_policy;
pub mod signal;
pub mod simulator;
pub mod stats;
pub mod universe;
