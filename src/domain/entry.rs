//! Entry resolution on the fast timeframe.

use crate::domain::candle::CandleSeries;
use crate::domain::signal::{Direction, StructureBreak};

/// Per-instrument entry parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryParams {
    /// Price offset added against the trader at the fill.
    pub spread: f64,
    /// Minimum `high - low` of the entry bar.
    pub min_range: f64,
}

impl Default for EntryParams {
    fn default() -> Self {
        EntryParams {
            spread: 0.0,
            min_range: 0.0,
        }
    }
}

/// An open trade. Only built with `risk_per_unit > 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub direction: Direction,
    pub entry_price: f64,
    pub initial_stop: f64,
    pub entry_timestamp: i64,
    /// Index of the entry bar in the fast series.
    pub entry_index: usize,
    pub risk_per_unit: f64,
}

impl Position {
    /// Price at `r` multiples of risk from the entry, in the trade direction.
    pub fn price_at_r(&self, r: f64) -> f64 {
        self.entry_price + self.direction.sign() * r * self.risk_per_unit
    }

    /// Signed R-multiple of `price` relative to the entry.
    pub fn r_multiple(&self, price: f64) -> f64 {
        self.direction.favorable(self.entry_price, price) / self.risk_per_unit
    }
}

/// Why a structure break did not become a position. Not an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryRejection {
    NoFastBar,
    RangeTooSmall { range: f64 },
    NonPositiveRisk { entry: f64, stop: f64 },
}

/// Resolve the fill and initial stop from the first fast bar after the break.
pub fn resolve_entry(
    fast: &CandleSeries,
    brk: &StructureBreak,
    params: &EntryParams,
) -> Result<Position, EntryRejection> {
    let entry_index = fast
        .first_after(brk.timestamp)
        .ok_or(EntryRejection::NoFastBar)?;
    let bar = &fast.candles()[entry_index];

    let range = bar.range();
    if range < params.min_range {
        return Err(EntryRejection::RangeTooSmall { range });
    }

    let (entry, stop) = match brk.direction {
        Direction::Long => (bar.close + params.spread, bar.low),
        Direction::Short => (bar.close - params.spread, bar.high),
    };

    let risk = brk.direction.favorable(stop, entry);
    if risk <= 0.0 {
        return Err(EntryRejection::NonPositiveRisk { entry, stop });
    }

    Ok(Position {
        direction: brk.direction,
        entry_price: entry,
        initial_stop: stop,
        entry_timestamp: bar.timestamp,
        entry_index,
        risk_per_unit: risk,
    })
}
