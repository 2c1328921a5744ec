//! Single-slot cash/position ledger.
//!
//! Entries are sized from a risk budget against a fixed-fraction stop:
//! `size = max(1, floor(cash * risk_percent / (price * fixed_fraction)))`.
//! No cash check is made on entry, so cash may go negative.

use serde::Serialize;
use std::fmt;

use crate::domain::strategy::{Order, Side};

/// Floor for the stop distance so a zero price cannot divide by zero.
const MIN_STOP_DISTANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TradeAction {
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "SELL")]
    Sell,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => f.write_str("BUY"),
            TradeAction::Sell => f.write_str("SELL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub timestamp: String,
    pub action: TradeAction,
    pub price: f64,
    pub size: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizingParams {
    pub risk_percent: f64,
    pub fixed_fraction: f64,
}

impl Default for SizingParams {
    fn default() -> Self {
        SizingParams {
            risk_percent: 0.01,
            fixed_fraction: 0.005,
        }
    }
}

/// Whole-unit entry size; never below one.
pub fn position_size(cash: f64, price: f64, sizing: &SizingParams) -> i64 {
    let stop_distance = (price * sizing.fixed_fraction).max(MIN_STOP_DISTANCE);
    let risk_capital = cash * sizing.risk_percent;
    let raw = (risk_capital / stop_distance).floor();
    if raw.is_finite() && raw >= 1.0 {
        raw as i64
    } else {
        1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerState {
    pub cash: f64,
    pub position_size: i64,
    pub equity_curve: Vec<f64>,
    pub trade_log: Vec<Trade>,
}

impl LedgerState {
    pub fn new(initial_cash: f64) -> Self {
        LedgerState {
            cash: initial_cash,
            position_size: 0,
            equity_curve: Vec::new(),
            trade_log: Vec::new(),
        }
    }

    pub fn is_flat(&self) -> bool {
        self.position_size == 0
    }

    pub fn equity(&self, price: f64) -> f64 {
        self.cash + self.position_size as f64 * price
    }

    /// Apply an order at `price`. Returns the trade it produced, if any:
    /// a long order while already long, or a flat order while flat, is a no-op.
    pub fn apply(&mut self, order: &Order, price: f64, sizing: &SizingParams) -> Option<&Trade> {
        match order.side {
            Side::Long if self.is_flat() => {
                let size = position_size(self.cash, price, sizing);
                self.cash -= size as f64 * price;
                self.position_size = size;
                self.trade_log.push(Trade {
                    timestamp: order.timestamp.clone(),
                    action: TradeAction::Buy,
                    price,
                    size,
                });
                self.trade_log.last()
            }
            Side::Flat if !self.is_flat() => {
                let size = self.position_size;
                self.cash += size as f64 * price;
                self.position_size = 0;
                self.trade_log.push(Trade {
                    timestamp: order.timestamp.clone(),
                    action: TradeAction::Sell,
                    price,
                    size,
                });
                self.trade_log.last()
            }
            _ => None,
        }
    }

    /// Append the mark-to-market equity at `price` and return it.
    pub fn mark(&mut self, price: f64) -> f64 {
        let equity = self.equity(price);
        self.equity_curve.push(equity);
        equity
    }
}

/// A completed BUY→SELL pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundTrip {
    pub entry_time: String,
    pub exit_time: String,
    pub entry_price: f64,
    pub exit_price: f64,
    pub size: i64,
    pub pnl: f64,
}

/// Pair each BUY with the SELL that follows it. A trailing open BUY is dropped.
pub fn round_trips(trade_log: &[Trade]) -> Vec<RoundTrip> {
    let mut trips = Vec::new();
    let mut entry: Option<&Trade> = None;
    for trade in trade_log {
        match trade.action {
            TradeAction::Buy => entry = Some(trade),
            TradeAction::Sell => {
                if let Some(buy) = entry.take() {
                    trips.push(RoundTrip {
                        entry_time: buy.timestamp.clone(),
                        exit_time: trade.timestamp.clone(),
                        entry_price: buy.price,
                        exit_price: trade.price,
                        size: trade.size,
                        pnl: (trade.price - buy.price) * trade.size as f64,
                    });
                }
            }
        }
    }
    trips
}
