//! EMA signal parameters and per-run engine state.
//!
//! k = 2/(n+1). The first observation seeds the average directly (no SMA
//! warmup), and a period of 1 tracks price exactly.

use serde::Serialize;

use crate::domain::error::ParameterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SignalConfig {
    fast_period: usize,
    slow_period: usize,
}

impl SignalConfig {
    pub fn new(fast_period: i64, slow_period: i64) -> Result<Self, ParameterError> {
        if fast_period <= 0 {
            return Err(ParameterError::NonPositivePeriod {
                name: "EmaFast",
                value: fast_period,
            });
        }
        if slow_period <= 0 {
            return Err(ParameterError::NonPositivePeriod {
                name: "EmaSlow",
                value: slow_period,
            });
        }
        let (fast, slow) = (fast_period as usize, slow_period as usize);
        if fast >= slow {
            return Err(ParameterError::PeriodOrder { fast, slow });
        }
        Ok(SignalConfig {
            fast_period: fast,
            slow_period: slow,
        })
    }

    pub fn fast_period(&self) -> usize {
        self.fast_period
    }

    pub fn slow_period(&self) -> usize {
        self.slow_period
    }
}

/// One step of an exponential moving average.
pub fn ema_update(previous: Option<f64>, price: f64, period: usize) -> f64 {
    match previous {
        Some(prev) if period > 1 => {
            let k = 2.0 / (period as f64 + 1.0);
            k * price + (1.0 - k) * prev
        }
        _ => price,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PositionState {
    #[default]
    Flat,
    Long,
}

impl PositionState {
    /// 0 when flat, 1 when long.
    pub fn as_units(self) -> u8 {
        match self {
            PositionState::Flat => 0,
            PositionState::Long => 1,
        }
    }
}

/// Mutable strategy state, owned by exactly one run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EngineState {
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub position: PositionState,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fold `price` into both averages and return `(fast, slow)`.
    pub fn update_emas(&mut self, price: f64, config: &SignalConfig) -> (f64, f64) {
        let fast = ema_update(self.ema_fast, price, config.fast_period);
        let slow = ema_update(self.ema_slow, price, config.slow_period);
        self.ema_fast = Some(fast);
        self.ema_slow = Some(slow);
        (fast, slow)
    }
}
