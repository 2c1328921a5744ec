//! Performance metrics over a finished equity curve.

use serde::Serialize;

use super::backtest::DrawdownTracker;
use super::error::EngineError;
use super::ledger::{Trade, TradeAction};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub sharpe: f64,
    pub max_drawdown: f64,
    pub num_trades: usize,
    pub final_equity: f64,
}

impl Metrics {
    pub fn compute(equity_curve: &[f64], trade_log: &[Trade]) -> Result<Self, EngineError> {
        let final_equity = *equity_curve.last().ok_or(EngineError::EmptyCurve)?;
        let returns = simple_returns(equity_curve);

        Ok(Metrics {
            sharpe: sharpe_ratio(&returns),
            max_drawdown: max_drawdown(equity_curve),
            num_trades: trade_log
                .iter()
                .filter(|t| t.action == TradeAction::Buy)
                .count(),
            final_equity,
        })
    }
}

/// Aggregate metrics for a finished run.
pub fn summarize(equity_curve: &[f64], trade_log: &[Trade]) -> Result<Metrics, EngineError> {
    Metrics::compute(equity_curve, trade_log)
}

/// Step returns; a zero previous equity yields a zero return.
pub fn simple_returns(equity_curve: &[f64]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .map(|w| {
            let (prev, curr) = (w[0], w[1]);
            if prev == 0.0 { 0.0 } else { (curr - prev) / prev }
        })
        .collect()
}

/// Annualized mean/sample-stddev ratio. Zero when undefined.
pub fn sharpe_ratio(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let divisor = (n - 1.0).max(1.0);
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / divisor;
    let stddev = if variance > 0.0 { variance.sqrt() } else { 0.0 };

    if stddev > 0.0 {
        let sharpe = mean / stddev * TRADING_DAYS_PER_YEAR.sqrt();
        if sharpe.is_finite() { sharpe } else { 0.0 }
    } else {
        0.0
    }
}

pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    let mut tracker = DrawdownTracker::new();
    for &v in equity_curve {
        tracker.update(v);
    }
    tracker.max_drawdown()
}
