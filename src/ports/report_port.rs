//! Report output port.

use crate::domain::engine::BacktestReport;
use crate::domain::error::BacktestError;

/// Port for presenting backtest results.
pub trait ReportPort {
    fn write(&self, report: &BacktestReport) -> Result<(), BacktestError>;

    /// Default implementation: writes each report in turn.
    fn write_all(&self, reports: &[BacktestReport]) -> Result<(), BacktestError> {
        reports.iter().try_for_each(|r| self.write(r))
    }
}
