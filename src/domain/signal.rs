//! Slow-timeframe bias and medium-timeframe structure breaks.
//!
//! Both detectors use the same local two-bar rule: a close beyond the
//! previous bar's extreme.

use std::fmt;

use crate::domain::candle::{Candle, CandleSeries};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// +1 for long, -1 for short.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }

    /// Price distance travelled in this direction from `from` to `to`.
    pub fn favorable(self, from: f64, to: f64) -> f64 {
        self.sign() * (to - from)
    }

    /// Whether `cur` closes beyond the extreme of `prev` in this direction.
    pub fn breaks(self, prev: &Candle, cur: &Candle) -> bool {
        match self {
            Direction::Long => cur.close > prev.high,
            Direction::Short => cur.close < prev.low,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiasSignal {
    pub direction: Direction,
    pub source_timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructureBreak {
    pub timestamp: i64,
    pub direction: Direction,
}

/// Bias of slow bar `index` against its predecessor.
///
/// `min_body_ratio > 0` additionally requires the bar's body to cover at
/// least that fraction of its range. Returns `None` for `index == 0` or an
/// out-of-range index.
pub fn detect_bias(slow: &CandleSeries, index: usize, min_body_ratio: f64) -> Option<BiasSignal> {
    if index == 0 {
        return None;
    }
    let prev = slow.get(index - 1)?;
    let cur = slow.get(index)?;

    if min_body_ratio > 0.0 && cur.body_ratio() < min_body_ratio {
        return None;
    }

    // A valid candle cannot close both above prev.high and below prev.low.
    let direction = if Direction::Long.breaks(prev, cur) {
        Direction::Long
    } else if Direction::Short.breaks(prev, cur) {
        Direction::Short
    } else {
        return None;
    };

    Some(BiasSignal {
        direction,
        source_timestamp: cur.timestamp,
    })
}

/// First medium bar strictly after the bias bar that breaks its predecessor
/// in the bias direction.
///
/// Every call scans from the start of `medium`; nothing is remembered
/// between biases, so consecutive biases may resolve to the same break.
pub fn find_structure_break(medium: &CandleSeries, bias: &BiasSignal) -> Option<StructureBreak> {
    let candles = medium.candles();
    // Bar 0 has no predecessor and is never a candidate.
    let start = medium.first_after(bias.source_timestamp)?.max(1);

    candles[start..]
        .iter()
        .zip(&candles[start - 1..])
        .find(|(cur, prev)| bias.direction.breaks(prev, cur))
        .map(|(cur, _)| StructureBreak {
            timestamp: cur.timestamp,
            direction: bias.direction,
        })
}
