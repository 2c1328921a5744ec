//! Report generation port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::config_validation::RunParams;
use crate::domain::error::EngineError;
use crate::domain::metrics::Metrics;

/// Everything a ledger sink needs to render one finished run.
pub struct RunReport<'a> {
    pub params: &'a RunParams,
    pub result: &'a BacktestResult,
    pub metrics: &'a Metrics,
    pub capsules_written: usize,
    pub data_source: &'a str,
    pub data_sha256: &'a str,
}

/// Port for writing run outputs.
pub trait ReportPort {
    fn write(&self, report: &RunReport<'_>) -> Result<(), EngineError>;
}
