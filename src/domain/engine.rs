//! Signal pipeline and universe driver.
//!
//! [`evaluate_instrument`] is a pure function of one instrument's three
//! series and the strategy; [`run_universe`] fans instruments out over the
//! rayon pool and blends the results in input order.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::domain::backtest::StrategyConfig;
use crate::domain::candle::{CandleSeries, format_timestamp};
use crate::domain::entry::{EntryParams, Position, resolve_entry};
use crate::domain::exit_policy::ExitPolicy;
use crate::domain::signal::{BiasSignal, StructureBreak, detect_bias, find_structure_break};
use crate::domain::simulator::{TradeOutcome, simulate};
use crate::domain::stats::InstrumentStats;
use crate::domain::universe::SkippedInstrument;

/// First slow bar examined for a bias.
pub const FIRST_BIAS_INDEX: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentSeries {
    pub symbol: String,
    pub slow: CandleSeries,
    pub medium: CandleSeries,
    pub fast: CandleSeries,
}

/// One simulated trade and the signals that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeRecord {
    pub bias: BiasSignal,
    pub structure_break: StructureBreak,
    pub position: Position,
    pub outcome: TradeOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentReport {
    pub symbol: String,
    pub stats: InstrumentStats,
    /// Every simulated trade, open ones included, in slow-bar order.
    pub trades: Vec<TradeRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestReport {
    pub policy: ExitPolicy,
    pub instruments: Vec<InstrumentReport>,
    pub skipped: Vec<SkippedInstrument>,
    pub global: InstrumentStats,
}

pub fn evaluate_instrument(
    series: &InstrumentSeries,
    strategy: &StrategyConfig,
    entry: &EntryParams,
) -> InstrumentReport {
    let mut stats = InstrumentStats::default();
    let mut trades = Vec::new();

    for i in FIRST_BIAS_INDEX..series.slow.len() {
        let Some(bias) = detect_bias(&series.slow, i, strategy.min_body_ratio) else {
            continue;
        };
        stats.biases += 1;

        let Some(brk) = find_structure_break(&series.medium, &bias) else {
            continue;
        };
        stats.breaks += 1;

        let position = match resolve_entry(&series.fast, &brk, entry) {
            Ok(p) => p,
            Err(rejection) => {
                debug!(symbol = %series.symbol, ?rejection, "entry rejected");
                stats.rejected_entries += 1;
                continue;
            }
        };

        let outcome = simulate(&series.fast, &position, &strategy.policy);
        debug!(
            symbol = %series.symbol,
            direction = %position.direction,
            entry_time = %format_timestamp(position.entry_timestamp),
            entry = position.entry_price,
            stop = position.initial_stop,
            ?outcome,
            "trade simulated"
        );
        stats.record(&outcome);
        trades.push(TradeRecord {
            bias,
            structure_break: brk,
            position,
            outcome,
        });
    }

    info!(
        symbol = %series.symbol,
        trades = stats.trades,
        open = stats.open,
        rejected = stats.rejected_entries,
        "instrument evaluated"
    );

    InstrumentReport {
        symbol: series.symbol.clone(),
        stats,
        trades,
    }
}

/// Evaluate every instrument independently and blend the totals.
///
/// `entry_params` supplies each symbol's spread and range filter.
pub fn run_universe<F>(
    instruments: &[InstrumentSeries],
    skipped: Vec<SkippedInstrument>,
    strategy: &StrategyConfig,
    entry_params: F,
) -> BacktestReport
where
    F: Fn(&str) -> EntryParams + Sync,
{
    let reports: Vec<InstrumentReport> = instruments
        .par_iter()
        .map(|series| evaluate_instrument(series, strategy, &entry_params(&series.symbol)))
        .collect();

    let global = InstrumentStats::blend(reports.iter().map(|r| &r.stats));

    BacktestReport {
        policy: strategy.policy,
        instruments: reports,
        skipped,
        global,
    }
}
