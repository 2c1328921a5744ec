//! Strategy lifecycle and the per-bar decision it produces.

use serde::Serialize;

use crate::domain::audit::AuditRecord;
use crate::domain::bar::Bar;
use crate::domain::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Flat,
}

/// An order intent. Consumed by the ledger on the bar it was emitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub side: Side,
    pub size: u32,
    pub timestamp: String,
}

impl Order {
    pub fn long(timestamp: &str) -> Self {
        Order {
            side: Side::Long,
            size: 1,
            timestamp: timestamp.to_string(),
        }
    }

    pub fn flat(timestamp: &str) -> Self {
        Order {
            side: Side::Flat,
            size: 0,
            timestamp: timestamp.to_string(),
        }
    }
}

/// Output of one bar: at most one order and at most one audit record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Decision {
    pub order: Option<Order>,
    pub record: Option<AuditRecord>,
}

pub trait Strategy {
    /// Identifier the strategy is registered under.
    fn name(&self) -> &'static str;

    /// Clear all run state. Called before the first bar of every run.
    fn reset(&mut self);

    fn process_bar(&mut self, bar: &Bar) -> Result<Decision, EngineError>;

    /// Called once after the last bar.
    fn finalize(&mut self) {}
}
