//! Audit records ("capsules") and their run-level summaries.

use serde::Serialize;
use std::fmt;

use crate::domain::regime::{Regime, RegimeResult};

pub const COLLAPSE_CLAIM: &str = "P≠NP (claim)";
pub const DEFAULT_CLAIM: &str = "P≠NP";
pub const INCONCLUSIVE: &str = "INCONCLUSIVE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    #[serde(rename = "OPEN")]
    Open,
    #[serde(rename = "FLAT")]
    Flat,
    #[serde(rename = "CROSS-DOWN")]
    CrossDown,
    #[serde(rename = "P≠NP (claim)")]
    CollapseClaim,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Open => "OPEN",
            Verdict::Flat => "FLAT",
            Verdict::CrossDown => "CROSS-DOWN",
            Verdict::CollapseClaim => COLLAPSE_CLAIM,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditRecord {
    pub timestamp: String,
    pub glyph: &'static str,
    pub entropy: f64,
    pub regime: Regime,
    pub verdict: Verdict,
}

impl AuditRecord {
    pub fn new(timestamp: &str, regime: &RegimeResult, verdict: Verdict) -> Self {
        AuditRecord {
            timestamp: timestamp.to_string(),
            glyph: regime.glyph,
            entropy: regime.entropy,
            regime: regime.regime,
            verdict,
        }
    }
}

/// Number of records carrying the collapse claim.
pub fn collapse_hits(records: &[AuditRecord]) -> usize {
    records
        .iter()
        .filter(|r| r.verdict == Verdict::CollapseClaim)
        .count()
}

/// `P≠NP (claim)` if any collapse was recorded during the run, else `OPEN`.
pub fn run_verdict(records: &[AuditRecord]) -> Verdict {
    if collapse_hits(records) > 0 {
        Verdict::CollapseClaim
    } else {
        Verdict::Open
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntropyTracePoint {
    pub timestamp: String,
    pub entropy: f64,
    pub regime: Regime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapsuleSummary {
    pub claim: String,
    pub verdict: String,
    pub entropy_trace: Vec<EntropyTracePoint>,
}

impl CapsuleSummary {
    /// The verdict is the last one emitted, or `INCONCLUSIVE` for an empty log.
    pub fn from_records(claim: &str, records: &[AuditRecord]) -> Self {
        let verdict = records
            .last()
            .map(|r| r.verdict.to_string())
            .unwrap_or_else(|| INCONCLUSIVE.to_string());
        let entropy_trace = records
            .iter()
            .map(|r| EntropyTracePoint {
                timestamp: r.timestamp.clone(),
                entropy: r.entropy,
                regime: r.regime,
            })
            .collect();
        CapsuleSummary {
            claim: claim.to_string(),
            verdict,
            entropy_trace,
        }
    }
}
