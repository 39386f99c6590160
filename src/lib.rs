//! breakout-bt: multi-timeframe breakout backtester.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod logging;
pub mod ports;
