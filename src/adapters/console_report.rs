//! Plain-text report on stdout.

use std::fmt::Write;

use crate::domain::engine::BacktestReport;
use crate::domain::error::BacktestError;
use crate::domain::stats::InstrumentStats;
use crate::ports::report_port::ReportPort;

pub struct ConsoleReportAdapter;

fn pct(v: Option<f64>) -> String {
    v.map_or_else(|| "n/a".to_string(), |v| format!("{:.1}%", v * 100.0))
}

fn r(v: Option<f64>) -> String {
    v.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v))
}

fn write_totals(out: &mut String, s: &InstrumentStats) -> std::fmt::Result {
    writeln!(out, "\n=== Totals ===")?;
    writeln!(out, "Trades:           {}", s.trades)?;
    writeln!(out, "Wins:             {}", s.wins)?;
    writeln!(out, "Losses:           {}", s.losses)?;
    writeln!(out, "Breakevens:       {}", s.breakevens)?;
    writeln!(out, "Open:             {}", s.open)?;
    writeln!(out, "Rejected entries: {}", s.rejected_entries)?;
    writeln!(out, "Same-bar ties:    {}", s.same_bar_ties)?;
    writeln!(out, "Win rate:         {}", pct(s.win_rate()))?;
    writeln!(out, "Loss rate:        {}", pct(s.loss_rate()))?;
    writeln!(out, "Breakeven rate:   {}", pct(s.breakeven_rate()))?;
    writeln!(out, "Avg R:            {}", r(s.avg_r()))?;
    writeln!(out, "Avg win R:        {}", r(s.avg_win_r()))?;
    writeln!(out, "Max RR:           {:.2}", s.max_rr)?;

    writeln!(out, "\n=== R Distribution ===")?;
    let total = s.histogram.total();
    for (label, count) in s.histogram.iter() {
        let share = (total > 0).then(|| count as f64 / total as f64);
        writeln!(out, "{:<6} {:>6}  {:>6}", label, count, pct(share))?;
    }
    Ok(())
}

pub fn render_report(report: &BacktestReport) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    render_into(&mut out, report)?;
    Ok(out)
}

fn render_into(out: &mut String, report: &BacktestReport) -> std::fmt::Result {
    writeln!(out, "=== {} ===", report.policy)?;
    writeln!(
        out,
        "{:<12} {:>7} {:>5} {:>7} {:>7} {:>8} {:>7}",
        "Symbol", "Trades", "Open", "Win%", "AvgR", "AvgWinR", "MaxRR"
    )?;
    for inst in &report.instruments {
        let s = &inst.stats;
        writeln!(
            out,
            "{:<12} {:>7} {:>5} {:>7} {:>7} {:>8} {:>7.2}",
            inst.symbol,
            s.trades,
            s.open,
            pct(s.win_rate()),
            r(s.avg_r()),
            r(s.avg_win_r()),
            s.max_rr
        )?;
    }

    for skipped in &report.skipped {
        writeln!(out, "skipped {}: {}", skipped.symbol, skipped.reason)?;
    }

    write_totals(out, &report.global)
}

impl ReportPort for ConsoleReportAdapter {
    fn write(&self, report: &BacktestReport) -> Result<(), BacktestError> {
        use std::io::Write as _;
        let text = render_report(report).map_err(std::io::Error::other)?;
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        writeln!(stdout)?;
        Ok(())
    }
}
