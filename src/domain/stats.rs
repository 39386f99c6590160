//! Per-instrument and blended trade statistics.

use crate::domain::simulator::{ExitReason, OutcomeClass, TradeOutcome};

pub const BUCKET_COUNT: usize = 7;

/// Labels for `(-inf,0) [0,0] (0,1) [1,2) [2,4) [4,6) [6,10]`.
pub const BUCKET_LABELS: [&str; BUCKET_COUNT] = ["<0", "0", "0-1", "1-2", "2-4", "4-6", "6-10"];

/// Fixed R-multiple distribution. Every recorded trade lands in exactly one
/// bucket; anything at or above 6R (including values past 10R) is counted in
/// the last one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RHistogram {
    counts: [usize; BUCKET_COUNT],
}

impl RHistogram {
    pub fn bucket_index(r: f64) -> usize {
        if r < 0.0 {
            0
        } else if r == 0.0 {
            1
        } else if r < 1.0 {
            2
        } else if r < 2.0 {
            3
        } else if r < 4.0 {
            4
        } else if r < 6.0 {
            5
        } else {
            6
        }
    }

    pub fn record(&mut self, r: f64) {
        self.counts[Self::bucket_index(r)] += 1;
    }

    pub fn counts(&self) -> &[usize; BUCKET_COUNT] {
        &self.counts
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn merge(&mut self, other: &RHistogram) {
        for (mine, theirs) in self.counts.iter_mut().zip(other.counts.iter()) {
            *mine += theirs;
        }
    }

    /// `(label, count)` pairs in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        BUCKET_LABELS.iter().copied().zip(self.counts.iter().copied())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstrumentStats {
    /// Slow bars that produced a bias.
    pub biases: usize,
    /// Biases confirmed by a medium-timeframe break.
    pub breaks: usize,
    /// Breaks that did not become a position.
    pub rejected_entries: usize,
    /// Closed trades; `open` trades are not included.
    pub trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub breakevens: usize,
    /// Trades still running when the fast series ended.
    pub open: usize,
    /// Losses where stop and target were both touched in the exit bar.
    pub same_bar_ties: usize,
    pub sum_r: f64,
    pub sum_win_r: f64,
    pub max_rr: f64,
    pub histogram: RHistogram,
}

fn ratio(num: f64, den: usize) -> Option<f64> {
    (den > 0).then(|| num / den as f64)
}

impl InstrumentStats {
    pub fn record(&mut self, outcome: &TradeOutcome) {
        let Some(result) = outcome.closed() else {
            self.open += 1;
            return;
        };

        let r = result.realized_r;
        self.trades += 1;
        self.sum_r += r;
        self.max_rr = self.max_rr.max(result.max_rr);
        self.histogram.record(r);

        match result.outcome {
            OutcomeClass::Win => {
                self.wins += 1;
                self.sum_win_r += r;
            }
            OutcomeClass::Loss => self.losses += 1,
            OutcomeClass::Breakeven => self.breakevens += 1,
        }

        if result.exit_reason == ExitReason::StopAndTarget {
            self.same_bar_ties += 1;
        }
    }

    /// Adds another instrument's totals. Sums are merged, never averages.
    pub fn merge(&mut self, other: &InstrumentStats) {
        self.biases += other.biases;
        self.breaks += other.breaks;
        self.rejected_entries += other.rejected_entries;
        self.trades += other.trades;
        self.wins += other.wins;
        self.losses += other.losses;
        self.breakevens += other.breakevens;
        self.open += other.open;
        self.same_bar_ties += other.same_bar_ties;
        self.sum_r += other.sum_r;
        self.sum_win_r += other.sum_win_r;
        self.max_rr = self.max_rr.max(other.max_rr);
        self.histogram.merge(&other.histogram);
    }

    pub fn blend<'a, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = &'a InstrumentStats>,
    {
        parts.into_iter().fold(Self::default(), |mut acc, s| {
            acc.merge(s);
            acc
        })
    }

    pub fn win_rate(&self) -> Option<f64> {
        ratio(self.wins as f64, self.trades)
    }

    pub fn loss_rate(&self) -> Option<f64> {
        ratio(self.losses as f64, self.trades)
    }

    pub fn breakeven_rate(&self) -> Option<f64> {
        ratio(self.breakevens as f64, self.trades)
    }

    pub fn avg_r(&self) -> Option<f64> {
        ratio(self.sum_r, self.trades)
    }

    pub fn avg_win_r(&self) -> Option<f64> {
        ratio(self.sum_win_r, self.wins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::simulator::TradeResult;
    use approx::assert_relative_eq;

    fn trade(r: f64, max_rr: f64) -> TradeOutcome {
        TradeOutcome::Closed(TradeResult {
            realized_r: r,
            max_rr,
            outcome: OutcomeClass::classify(r),
            exit_reason: if r < 0.0 {
                ExitReason::StopLoss
            } else {
                ExitReason::TrailingStop
            },
            exit_timestamp: 0,
            exit_index: 0,
        })
    }

    #[test]
    fn bucket_boundaries() {
        let cases = [
            (-1.0, 0),
            (-0.0001, 0),
            (0.0, 1),
            (0.5, 2),
            (1.0, 3),
            (1.999, 3),
            (2.0, 4),
            (3.5, 4),
            (4.0, 5),
            (5.99, 5),
            (6.0, 6),
            (10.0, 6),
            (15.0, 6),
        ];
        for (r, bucket) in cases {
            assert_eq!(RHistogram::bucket_index(r), bucket, "r={r}");
        }
    }

    #[test]
    fn empty_stats_report_not_available() {
        let stats = InstrumentStats::default();
        assert_eq!(stats.win_rate(), None);
        assert_eq!(stats.breakeven_rate(), None);
        assert_eq!(stats.loss_rate(), None);
        assert_eq!(stats.avg_r(), None);
        assert_eq!(stats.avg_win_r(), None);
    }

    #[test]
    fn record_classifies_and_sums() {
        let mut stats = InstrumentStats::default();
        for (r, m) in [(2.0, 3.0), (-1.0, 0.4), (0.0, 1.0), (10.0, 10.0)] {
            stats.record(&trade(r, m));
        }
        assert_eq!(stats.trades, 4);
        assert_eq!(stats.wins, 2);
        assert_eq!(stats.losses, 1);
        assert_eq!(stats.breakevens, 1);
        assert_relative_eq!(stats.avg_r().unwrap(), 11.0 / 4.0);
        assert_relative_eq!(stats.avg_win_r().unwrap(), 6.0);
        assert_relative_eq!(stats.win_rate().unwrap(), 0.5);
        assert_relative_eq!(stats.breakeven_rate().unwrap(), 0.25);
        assert_eq!(stats.max_rr, 10.0);
        assert_eq!(stats.histogram.counts(), &[1, 1, 0, 0, 1, 0, 1]);
        assert_eq!(stats.histogram.total(), stats.trades);
    }

    #[test]
    fn open_trades_are_counted_separately() {
        let mut stats = InstrumentStats::default();
        stats.record(&TradeOutcome::Open { max_rr: 7.0 });
        stats.record(&trade(1.0, 2.0));
        assert_eq!(stats.open, 1);
        assert_eq!(stats.trades, 1);
        assert_eq!(stats.max_rr, 2.0);
        assert_eq!(stats.histogram.total(), 1);
    }

    #[test]
    fn same_bar_ties_counted() {
        let mut stats = InstrumentStats::default();
        stats.record(&TradeOutcome::Closed(TradeResult {
            realized_r: -1.0,
            max_rr: 2.5,
            outcome: OutcomeClass::Loss,
            exit_reason: ExitReason::StopAndTarget,
            exit_timestamp: 0,
            exit_index: 0,
        }));
        assert_eq!(stats.same_bar_ties, 1);
        assert_eq!(stats.losses, 1);
    }

    #[test]
    fn blend_weights_by_trade_count() {
        let mut a = InstrumentStats::default();
        a.record(&trade(3.0, 3.0));
        let mut b = InstrumentStats::default();
        for _ in 0..3 {
            b.record(&trade(-1.0, 0.0));
        }
        let global = InstrumentStats::blend([&a, &b]);
        assert_eq!(global.trades, 4);
        // (3 - 3) / 4, not the mean of 3.0 and -1.0
        assert_relative_eq!(global.avg_r().unwrap(), 0.0);
        assert_relative_eq!(global.win_rate().unwrap(), 0.25);
        assert_eq!(global.histogram.total(), 4);
        assert_eq!(global.max_rr, 3.0);
    }

    #[test]
    fn histogram_iter_pairs_labels() {
        let mut h = RHistogram::default();
        h.record(0.5);
        h.record(7.0);
        let pairs: Vec<_> = h.iter().collect();
        assert_eq!(pairs[2], ("0-1", 1));
        assert_eq!(pairs[6], ("6-10", 1));
        assert_eq!(pairs.len(), BUCKET_COUNT);
    }
}
