//! Trade replay on the fast timeframe.
//!
//! One replay loop serves every [`ExitPolicy`]. All R values are measured
//! against the original entry and initial risk, never the ratcheted stop.

use crate::domain::candle::{Candle, CandleSeries};
use crate::domain::entry::Position;
use crate::domain::exit_policy::ExitPolicy;
use crate::domain::signal::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeClass {
    Win,
    Loss,
    Breakeven,
}

impl OutcomeClass {
    pub fn classify(realized_r: f64) -> Self {
        if realized_r > 0.0 {
            OutcomeClass::Win
        } else if realized_r < 0.0 {
            OutcomeClass::Loss
        } else {
            OutcomeClass::Breakeven
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitReason {
    StopLoss,
    /// Stop and target both inside one bar, resolved to the stop.
    StopAndTarget,
    TakeProfit,
    TrailingStop,
    Cap,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeResult {
    pub realized_r: f64,
    pub max_rr: f64,
    pub outcome: OutcomeClass,
    pub exit_reason: ExitReason,
    pub exit_timestamp: i64,
    pub exit_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TradeOutcome {
    Closed(TradeResult),
    /// The series ended before any exit fired.
    Open { max_rr: f64 },
}

impl TradeOutcome {
    pub fn closed(&self) -> Option<&TradeResult> {
        match self {
            TradeOutcome::Closed(result) => Some(result),
            TradeOutcome::Open { .. } => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, TradeOutcome::Open { .. })
    }

    pub fn max_rr(&self) -> f64 {
        match self {
            TradeOutcome::Closed(result) => result.max_rr,
            TradeOutcome::Open { max_rr } => *max_rr,
        }
    }
}

/// Effective stop on one replayed bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopLevel {
    pub timestamp: i64,
    pub stop: f64,
}

/// Replay `fast` after the entry bar and return the outcome.
pub fn simulate(fast: &CandleSeries, position: &Position, policy: &ExitPolicy) -> TradeOutcome {
    replay(fast, position, policy, |_| {})
}

/// Like [`simulate`], also returning the stop in force on every replayed bar.
pub fn simulate_traced(
    fast: &CandleSeries,
    position: &Position,
    policy: &ExitPolicy,
) -> (TradeOutcome, Vec<StopLevel>) {
    let mut path = Vec::new();
    let outcome = replay(fast, position, policy, |level| path.push(level));
    (outcome, path)
}

fn replay<F: FnMut(StopLevel)>(
    fast: &CandleSeries,
    position: &Position,
    policy: &ExitPolicy,
    on_bar: F,
) -> TradeOutcome {
    let after_entry = fast
        .candles()
        .iter()
        .enumerate()
        .skip(position.entry_index + 1);

    match *policy {
        ExitPolicy::FixedRrNaive { rr } => fixed_target(after_entry, position, rr, false, on_bar),
        ExitPolicy::FixedRrRealistic { rr } => {
            fixed_target(after_entry, position, rr, true, on_bar)
        }
        ExitPolicy::LadderOneR { cap } => ladder(after_entry, position, 1.0, cap, on_bar),
        ExitPolicy::LadderStep { step, cap } => ladder(after_entry, position, step, cap, on_bar),
    }
}

/// Favorable extreme of `bar` for the trade direction.
fn best_price(direction: Direction, bar: &Candle) -> f64 {
    match direction {
        Direction::Long => bar.high,
        Direction::Short => bar.low,
    }
}

fn stop_touched(direction: Direction, bar: &Candle, stop: f64) -> bool {
    match direction {
        Direction::Long => bar.low <= stop,
        Direction::Short => bar.high >= stop,
    }
}

fn level_reached(direction: Direction, bar: &Candle, level: f64) -> bool {
    match direction {
        Direction::Long => bar.high >= level,
        Direction::Short => bar.low <= level,
    }
}

fn close(
    realized_r: f64,
    max_rr: f64,
    exit_reason: ExitReason,
    (exit_index, bar): (usize, &Candle),
) -> TradeOutcome {
    TradeOutcome::Closed(TradeResult {
        realized_r,
        max_rr,
        outcome: OutcomeClass::classify(realized_r),
        exit_reason,
        exit_timestamp: bar.timestamp,
        exit_index,
    })
}

fn fixed_target<'a, I, F>(
    bars: I,
    position: &Position,
    rr: f64,
    realistic: bool,
    mut on_bar: F,
) -> TradeOutcome
where
    I: Iterator<Item = (usize, &'a Candle)>,
    F: FnMut(StopLevel),
{
    let direction = position.direction;
    let stop = position.initial_stop;
    let target = position.price_at_r(rr);
    let mut max_rr = 0.0_f64;

    for (i, bar) in bars {
        on_bar(StopLevel {
            timestamp: bar.timestamp,
            stop,
        });
        max_rr = max_rr.max(position.r_multiple(best_price(direction, bar)));

        let hit_sl = stop_touched(direction, bar, stop);
        let hit_tp = level_reached(direction, bar, target);

        if realistic {
            if hit_sl && hit_tp {
                return close(-1.0, max_rr, ExitReason::StopAndTarget, (i, bar));
            }
            if hit_sl {
                return close(-1.0, max_rr, ExitReason::StopLoss, (i, bar));
            }
            if hit_tp {
                return close(rr, max_rr.max(rr), ExitReason::TakeProfit, (i, bar));
            }
        } else {
            // The stop wins an in-bar tie only because it is checked first.
            if hit_sl {
                return close(-1.0, max_rr, ExitReason::StopLoss, (i, bar));
            }
            if hit_tp {
                return close(rr, max_rr.max(rr), ExitReason::TakeProfit, (i, bar));
            }
        }
    }

    TradeOutcome::Open { max_rr }
}

fn ladder<'a, I, F>(bars: I, position: &Position, step: f64, cap: f64, mut on_bar: F) -> TradeOutcome
where
    I: Iterator<Item = (usize, &'a Candle)>,
    F: FnMut(StopLevel),
{
    let direction = position.direction;
    let unit = step * position.risk_per_unit;
    let cap_price = position.price_at_r(cap);

    let mut stop = position.initial_stop;
    let mut stop_r = -1.0_f64;
    let mut best_steps = 0.0_f64;

    for (i, bar) in bars {
        // Cap is evaluated before the stop, even if both sit inside this bar.
        if level_reached(direction, bar, cap_price) {
            on_bar(StopLevel {
                timestamp: bar.timestamp,
                stop,
            });
            return close(cap, cap, ExitReason::Cap, (i, bar));
        }

        let favorable = direction.favorable(position.entry_price, best_price(direction, bar));
        let steps = (favorable / unit).floor();
        if steps > best_steps {
            best_steps = steps;
            if best_steps >= 1.0 {
                // Protect the previous whole step, skipping any in between.
                stop_r = (best_steps - 1.0) * step;
                stop = position.entry_price + direction.sign() * stop_r * position.risk_per_unit;
            }
        }

        on_bar(StopLevel {
            timestamp: bar.timestamp,
            stop,
        });

        if stop_touched(direction, bar, stop) {
            let reason = if best_steps >= 1.0 {
                ExitReason::TrailingStop
            } else {
                ExitReason::StopLoss
            };
            return close(stop_r, best_steps * step, reason, (i, bar));
        }
    }

    TradeOutcome::Open {
        max_rr: best_steps * step,
    }
}
