//! Entropy-aware EMA crossover strategy.
//!
//! Goes long when the regime is P-like and the fast EMA is above the slow
//! EMA. Flattens on NP/collapse (verdict FLAT) or when the crossover fails
//! (verdict CROSS-DOWN). Independently of the transition, a collapse-regime
//! bar always yields a record with the `P≠NP (claim)` verdict.

use serde::Serialize;
use tracing::debug;

use crate::domain::audit::{AuditRecord, Verdict};
use crate::domain::bar::Bar;
use crate::domain::error::EngineError;
use crate::domain::regime::{Regime, RegimeResult, RegimeThresholds};
use crate::domain::signal::{EngineState, PositionState, SignalConfig};
use crate::domain::strategy::{Decision, Order, Strategy};

pub const NAME: &str = "imm_core";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImmParams {
    pub thresholds: RegimeThresholds,
    pub signals: SignalConfig,
}

/// Advance `state` by one bar.
pub fn step(params: &ImmParams, state: &mut EngineState, bar: &Bar) -> Result<Decision, EngineError> {
    let price = bar.close()?;
    let entropy = bar.entropy()?;

    let regime = params.thresholds.classify(entropy)?;
    let (ema_fast, ema_slow) = state.update_emas(price, &params.signals);

    let (order, verdict) = transition(state, &regime, ema_fast, ema_slow, &bar.timestamp);
    let verdict = apply_collapse_override(regime.regime, verdict);

    let record = verdict.map(|v| AuditRecord::new(&bar.timestamp, &regime, v));
    if let Some(ref o) = order {
        debug!(timestamp = %bar.timestamp, side = ?o.side, regime = %regime.regime, "order emitted");
    }

    Ok(Decision { order, record })
}

fn transition(
    state: &mut EngineState,
    regime: &RegimeResult,
    ema_fast: f64,
    ema_slow: f64,
    timestamp: &str,
) -> (Option<Order>, Option<Verdict>) {
    match state.position {
        PositionState::Flat => {
            if regime.regime == Regime::PLike && ema_fast > ema_slow {
                state.position = PositionState::Long;
                (Some(Order::long(timestamp)), Some(Verdict::Open))
            } else {
                (None, None)
            }
        }
        PositionState::Long => {
            let verdict = match regime.regime {
                Regime::Np | Regime::Collapse => Some(Verdict::Flat),
                _ if ema_fast <= ema_slow => Some(Verdict::CrossDown),
                _ => None,
            };
            match verdict {
                Some(v) => {
                    state.position = PositionState::Flat;
                    (Some(Order::flat(timestamp)), Some(v))
                }
                None => (None, None),
            }
        }
    }
}

/// A collapse-regime bar always carries the collapse claim, even when the
/// transition emitted nothing.
fn apply_collapse_override(regime: Regime, verdict: Option<Verdict>) -> Option<Verdict> {
    if regime == Regime::Collapse {
        Some(Verdict::CollapseClaim)
    } else {
        verdict
    }
}

#[derive(Debug, Clone)]
pub struct ImmCore {
    params: ImmParams,
    state: EngineState,
}

impl ImmCore {
    pub fn new(params: ImmParams) -> Self {
        ImmCore {
            params,
            state: EngineState::new(),
        }
    }

    /// Resume from an injected state snapshot.
    pub fn with_state(params: ImmParams, state: EngineState) -> Self {
        ImmCore { params, state }
    }

    pub fn params(&self) -> &ImmParams {
        &self.params
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }
}

impl Strategy for ImmCore {
    fn name(&self) -> &'static str {
        NAME
    }

    fn reset(&mut self) {
        self.state.reset();
    }

    fn process_bar(&mut self, bar: &Bar) -> Result<Decision, EngineError> {
        step(&self.params, &mut self.state, bar)
    }
}
