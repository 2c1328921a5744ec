//! Backtest event loop.
//!
//! A strict sequential fold over the bars: strategy decision, ledger update,
//! then one equity sample per bar. BacktestConfig defines run parameters.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::audit::AuditRecord;
use crate::domain::bar::Bar;
use crate::domain::error::EngineError;
use crate::domain::ledger::{LedgerState, SizingParams, Trade};
use crate::domain::strategy::Strategy;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 50_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub sizing: SizingParams,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            sizing: SizingParams::default(),
        }
    }
}

/// Running peak and maximum fractional decline from it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DrawdownTracker {
    peak: Option<f64>,
    max_drawdown: f64,
}

impl DrawdownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in the next equity value and return the drawdown at that point.
    pub fn update(&mut self, value: f64) -> f64 {
        let peak = match self.peak {
            Some(p) if p >= value => p,
            _ => value,
        };
        self.peak = Some(peak);
        let dd = if peak > 0.0 { (peak - value) / peak } else { 0.0 };
        if dd > self.max_drawdown {
            self.max_drawdown = dd;
        }
        dd
    }

    pub fn max_drawdown(&self) -> f64 {
        self.max_drawdown
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub trade_log: Vec<Trade>,
    pub equity_curve: Vec<f64>,
    pub drawdown_curve: Vec<f64>,
    pub audit_log: Vec<AuditRecord>,
    pub max_drawdown: f64,
    pub final_cash: f64,
    pub final_position: i64,
}

impl BacktestResult {
    pub fn bars_processed(&self) -> usize {
        self.equity_curve.len()
    }
}

/// Per-run fold state. Constructed fresh for every run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunState {
    pub ledger: LedgerState,
    pub drawdown: DrawdownTracker,
    pub drawdown_curve: Vec<f64>,
    pub audit_log: Vec<AuditRecord>,
}

impl RunState {
    pub fn new(initial_capital: f64) -> Self {
        RunState {
            ledger: LedgerState::new(initial_capital),
            drawdown: DrawdownTracker::new(),
            drawdown_curve: Vec::new(),
            audit_log: Vec::new(),
        }
    }

    pub fn into_result(self) -> BacktestResult {
        BacktestResult {
            max_drawdown: self.drawdown.max_drawdown(),
            final_cash: self.ledger.cash,
            final_position: self.ledger.position_size,
            trade_log: self.ledger.trade_log,
            equity_curve: self.ledger.equity_curve,
            drawdown_curve: self.drawdown_curve,
            audit_log: self.audit_log,
        }
    }
}

/// Process one bar against `run`: decision, ledger update, equity sample.
pub fn step_bar(
    strategy: &mut dyn Strategy,
    run: &mut RunState,
    bar: &Bar,
    config: &BacktestConfig,
) -> Result<(), EngineError> {
    let price = bar.close()?;
    let decision = strategy.process_bar(bar)?;

    if let Some(record) = decision.record {
        debug!(timestamp = %record.timestamp, verdict = %record.verdict, "audit record");
        run.audit_log.push(record);
    }

    if let Some(order) = decision.order {
        if let Some(trade) = run.ledger.apply(&order, price, &config.sizing) {
            debug!(
                timestamp = %trade.timestamp,
                action = %trade.action,
                price = trade.price,
                size = trade.size,
                "trade filled"
            );
        }
    }

    let equity = run.ledger.mark(price);
    let dd = run.drawdown.update(equity);
    run.drawdown_curve.push(dd);
    Ok(())
}

/// Run `strategy` over `bars` in the order given.
pub fn run_backtest(
    strategy: &mut dyn Strategy,
    bars: &[Bar],
    config: &BacktestConfig,
) -> Result<BacktestResult, EngineError> {
    info!(
        strategy = strategy.name(),
        bars = bars.len(),
        initial_capital = config.initial_capital,
        "starting backtest"
    );

    let mut run = RunState::new(config.initial_capital);
    strategy.reset();

    let mut previous: Option<&Bar> = None;
    for bar in bars {
        if let Some(prev) = previous {
            warn_if_out_of_order(prev, bar);
        }
        step_bar(strategy, &mut run, bar, config)?;
        previous = Some(bar);
    }

    strategy.finalize();
    let result = run.into_result();

    info!(
        bars = result.bars_processed(),
        trades = result.trade_log.len(),
        final_equity = result.equity_curve.last().copied().unwrap_or(config.initial_capital),
        max_drawdown = result.max_drawdown,
        "backtest finished"
    );
    Ok(result)
}

fn warn_if_out_of_order(prev: &Bar, bar: &Bar) {
    if let (Some(a), Some(b)) = (prev.parsed_time(), bar.parsed_time()) {
        if b < a {
            warn!(
                previous = %prev.timestamp,
                current = %bar.timestamp,
                "bar timestamp precedes its predecessor"
            );
        }
    }
}
