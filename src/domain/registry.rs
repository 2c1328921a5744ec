//! Explicit strategy registry: identifier to constructor, resolved once per run.

use crate::domain::config_validation::{build_imm_params, validate_strategy_config};
use crate::domain::error::EngineError;
use crate::domain::imm_core::{self, ImmCore};
use crate::domain::strategy::Strategy;
use crate::ports::config_port::ConfigPort;

pub type StrategyConstructor = fn(&dyn ConfigPort) -> Result<Box<dyn Strategy>, EngineError>;

pub const DEFAULT_STRATEGY: &str = imm_core::NAME;

const REGISTRY: &[(&str, StrategyConstructor)] = &[(imm_core::NAME, build_imm_core)];

fn build_imm_core(config: &dyn ConfigPort) -> Result<Box<dyn Strategy>, EngineError> {
    validate_strategy_config(config)?;
    Ok(Box::new(ImmCore::new(build_imm_params(config)?)))
}

pub fn known_strategies() -> Vec<&'static str> {
    REGISTRY.iter().map(|(name, _)| *name).collect()
}

pub fn lookup(name: &str) -> Option<StrategyConstructor> {
    REGISTRY
        .iter()
        .find(|(id, _)| *id == name)
        .map(|(_, ctor)| *ctor)
}

/// Construct the strategy registered under `name` from `config`.
pub fn build_strategy(name: &str, config: &dyn ConfigPort) -> Result<Box<dyn Strategy>, EngineError> {
    let ctor = lookup(name).ok_or_else(|| EngineError::UnknownStrategy {
        name: name.to_string(),
        known: known_strategies().join(", "),
    })?;
    ctor(config)
}
