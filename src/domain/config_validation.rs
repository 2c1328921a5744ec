//! Configuration validation and construction.
//!
//! Every section is checked before a run starts. Missing keys are
//! `ConfigMissing`, unparsable values `ConfigInvalid`, and values that parse
//! but break an invariant are `InvalidParameter`.

use serde::Serialize;

use crate::domain::audit::DEFAULT_CLAIM;
use crate::domain::backtest::{BacktestConfig, DEFAULT_INITIAL_CAPITAL};
use crate::domain::error::{EngineError, ParameterError};
use crate::domain::imm_core::ImmParams;
use crate::domain::ledger::SizingParams;
use crate::domain::regime::RegimeThresholds;
use crate::domain::registry::{self, DEFAULT_STRATEGY};
use crate::domain::signal::SignalConfig;
use crate::ports::config_port::ConfigPort;

const DEFAULT_FIXED_FRACTION: f64 = 0.005;

/// Everything a run was configured with, as recorded in the run capsule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunParams {
    pub strategy: String,
    pub claim: String,
    pub data_source: Option<String>,
    pub strategy_params: ImmParams,
    pub backtest: BacktestConfig,
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), EngineError> {
    build_imm_params(config).map(|_| ())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), EngineError> {
    validate_strategy_name(config)?;
    build_backtest_config(config).map(|_| ())
}

pub fn build_imm_params(config: &dyn ConfigPort) -> Result<ImmParams, EngineError> {
    let p = required_f64(config, "entropy", "P_threshold")?;
    let np = required_f64(config, "entropy", "NP_threshold")?;
    let collapse = required_f64(config, "entropy", "CollapseThreshold")?;
    let thresholds = RegimeThresholds::new(p, np, collapse)?;

    let fast = required_i64(config, "signals", "EmaFast")?;
    let slow = required_i64(config, "signals", "EmaSlow")?;
    let signals = SignalConfig::new(fast, slow)?;

    Ok(ImmParams { thresholds, signals })
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, EngineError> {
    let initial_capital =
        optional_f64(config, "backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL)?;
    if !(initial_capital > 0.0 && initial_capital.is_finite()) {
        return Err(ParameterError::OutOfRange {
            name: "initial_capital",
            value: initial_capital,
            reason: "must be positive",
        }
        .into());
    }

    let risk_percent = required_f64(config, "risk", "RiskPercent")?;
    if !(risk_percent > 0.0 && risk_percent <= 1.0) {
        return Err(ParameterError::OutOfRange {
            name: "RiskPercent",
            value: risk_percent,
            reason: "must be in (0, 1]",
        }
        .into());
    }

    let fixed_fraction = optional_f64(config, "risk", "FixedFraction", DEFAULT_FIXED_FRACTION)?;
    if !(fixed_fraction > 0.0 && fixed_fraction < 1.0) {
        return Err(ParameterError::OutOfRange {
            name: "FixedFraction",
            value: fixed_fraction,
            reason: "must be in (0, 1)",
        }
        .into());
    }

    Ok(BacktestConfig {
        initial_capital,
        sizing: SizingParams {
            risk_percent,
            fixed_fraction,
        },
    })
}

pub fn strategy_name(config: &dyn ConfigPort) -> String {
    config
        .get_string("backtest", "strategy")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_STRATEGY.to_string())
}

pub fn claim(config: &dyn ConfigPort) -> String {
    config
        .get_string("backtest", "claim")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_CLAIM.to_string())
}

pub fn build_run_params(
    config: &dyn ConfigPort,
    strategy_override: Option<&str>,
) -> Result<RunParams, EngineError> {
    Ok(RunParams {
        strategy: strategy_override
            .map(str::to_string)
            .unwrap_or_else(|| strategy_name(config)),
        claim: claim(config),
        data_source: config
            .get_string("backtest", "data_source")
            .filter(|s| !s.trim().is_empty()),
        strategy_params: build_imm_params(config)?,
        backtest: build_backtest_config(config)?,
    })
}

fn validate_strategy_name(config: &dyn ConfigPort) -> Result<(), EngineError> {
    let name = strategy_name(config);
    if registry::lookup(&name).is_none() {
        return Err(EngineError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "strategy".to_string(),
            reason: format!(
                "unknown strategy '{}', expected one of: {}",
                name,
                registry::known_strategies().join(", ")
            ),
        });
    }
    Ok(())
}

fn required_string(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, EngineError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(EngineError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

fn required_f64(config: &dyn ConfigPort, section: &str, key: &str) -> Result<f64, EngineError> {
    let raw = required_string(config, section, key)?;
    parse_f64(&raw, section, key)
}

fn optional_f64(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, EngineError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => parse_f64(s.trim(), section, key),
        _ => Ok(default),
    }
}

fn required_i64(config: &dyn ConfigPort, section: &str, key: &str) -> Result<i64, EngineError> {
    let raw = required_string(config, section, key)?;
    raw.parse::<i64>().map_err(|_| EngineError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: format!("expected an integer, got '{}'", raw),
    })
}

fn parse_f64(raw: &str, section: &str, key: &str) -> Result<f64, EngineError> {
    raw.parse::<f64>().map_err(|_| EngineError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: format!("expected a number, got '{}'", raw),
    })
}
