//! Entropy regime classification.
//!
//! Order of evaluation: `entropy >= collapse` first, then `< p`, then `< np`,
//! else NP. The collapse band wins even when all three thresholds coincide.

use serde::Serialize;
use std::fmt;

use crate::domain::error::ParameterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Regime {
    #[serde(rename = "P-like")]
    PLike,
    #[serde(rename = "NP-drift")]
    NpDrift,
    #[serde(rename = "NP")]
    Np,
    #[serde(rename = "collapse")]
    Collapse,
}

impl Regime {
    /// Display glyph used when rendering audit records.
    pub fn glyph(self) -> &'static str {
        match self {
            Regime::PLike => "⥁",
            Regime::NpDrift | Regime::Np => "⟲",
            Regime::Collapse => "⧖",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Regime::PLike => "P-like",
            Regime::NpDrift => "NP-drift",
            Regime::Np => "NP",
            Regime::Collapse => "collapse",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated `p <= np <= collapse` thresholds, all non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegimeThresholds {
    p: f64,
    np: f64,
    collapse: f64,
}

impl RegimeThresholds {
    pub fn new(p: f64, np: f64, collapse: f64) -> Result<Self, ParameterError> {
        for (name, value) in [
            ("P_threshold", p),
            ("NP_threshold", np),
            ("CollapseThreshold", collapse),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(ParameterError::NegativeThreshold { name, value });
            }
        }
        if p > np {
            return Err(ParameterError::NonMonotonicThresholds {
                lower_name: "P_threshold",
                lower: p,
                upper_name: "NP_threshold",
                upper: np,
            });
        }
        if np > collapse {
            return Err(ParameterError::NonMonotonicThresholds {
                lower_name: "NP_threshold",
                lower: np,
                upper_name: "CollapseThreshold",
                upper: collapse,
            });
        }
        Ok(RegimeThresholds { p, np, collapse })
    }

    pub fn p(&self) -> f64 {
        self.p
    }

    pub fn np(&self) -> f64 {
        self.np
    }

    pub fn collapse(&self) -> f64 {
        self.collapse
    }

    pub fn classify(&self, entropy: f64) -> Result<RegimeResult, ParameterError> {
        if entropy.is_nan() {
            return Err(ParameterError::NanEntropy { entropy });
        }
        if entropy < 0.0 {
            return Err(ParameterError::NegativeEntropy { entropy });
        }

        let regime = if entropy >= self.collapse {
            Regime::Collapse
        } else if entropy < self.p {
            Regime::PLike
        } else if entropy < self.np {
            Regime::NpDrift
        } else {
            Regime::Np
        };

        Ok(RegimeResult {
            regime,
            glyph: regime.glyph(),
            entropy,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegimeResult {
    pub regime: Regime,
    pub glyph: &'static str,
    pub entropy: f64,
}

/// Validate the thresholds and classify a single entropy reading.
pub fn classify(
    entropy: f64,
    p: f64,
    np: f64,
    collapse: f64,
) -> Result<RegimeResult, ParameterError> {
    RegimeThresholds::new(p, np, collapse)?.classify(entropy)
}
