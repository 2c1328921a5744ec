//! Core simulation types and logic.

pub mod bar;
pub mod regime;
pub mod signal;
pub mod strategy;
pub mod imm_core;
pub mod registry;
pub mod audit;
pub mod ledger;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
pub mod narrative;
pub mod error;
