//! File report adapter implementing ReportPort.
//!
//! Writes one directory per run:
//! - `trades_blotter.csv`: every fill, `ts,action,px,size`
//! - `round_trips.csv`: each BUY paired with its closing SELL
//! - `metrics.json`: `Metrics` plus the starting equity
//! - `proof_capsule.json`: run-level capsule with data hash and evidence
//! - `capsule_summary.json`: claim, last verdict and entropy trace
//! - `summary.txt`: plain-text day summary

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::info;

use crate::domain::audit::{self, CapsuleSummary};
use crate::domain::config_validation::RunParams;
use crate::domain::error::EngineError;
use crate::domain::ledger::{self, TradeAction};
use crate::domain::metrics::Metrics;
use crate::domain::narrative::make_day_summary;
use crate::ports::report_port::{ReportPort, RunReport};

pub const CAPSULE_SCHEMA_VERSION: &str = "capsule-1.1.0";

pub const BLOTTER_FILE: &str = "trades_blotter.csv";
pub const ROUND_TRIPS_FILE: &str = "round_trips.csv";
pub const METRICS_FILE: &str = "metrics.json";
pub const CAPSULE_FILE: &str = "proof_capsule.json";
pub const CAPSULE_SUMMARY_FILE: &str = "capsule_summary.json";
pub const SUMMARY_FILE: &str = "summary.txt";

#[derive(Serialize)]
struct BlotterRow<'a> {
    ts: &'a str,
    action: TradeAction,
    px: f64,
    size: i64,
}

#[derive(Debug, Serialize)]
pub struct MetricsReport<'a> {
    pub start_equity: f64,
    #[serde(flatten)]
    pub metrics: &'a Metrics,
}

#[derive(Debug, Serialize)]
pub struct Evidence {
    pub collapse_hits: usize,
}

#[derive(Debug, Serialize)]
pub struct ProofCapsule<'a> {
    pub schema_version: &'static str,
    pub created_utc: String,
    pub data_source: &'a str,
    pub data_sha256: &'a str,
    pub params: &'a RunParams,
    pub verdict: audit::Verdict,
    pub evidence: Evidence,
    pub metrics: MetricsReport<'a>,
}

pub struct FileReportAdapter {
    out_dir: PathBuf,
}

impl FileReportAdapter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }

    fn write_blotter(&self, report: &RunReport<'_>) -> Result<(), EngineError> {
        let mut wtr = headerless_writer(&self.out_dir.join(BLOTTER_FILE))?;
        wtr.write_record(["ts", "action", "px", "size"])?;
        for trade in &report.result.trade_log {
            wtr.serialize(BlotterRow {
                ts: &trade.timestamp,
                action: trade.action,
                px: trade.price,
                size: trade.size,
            })?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_round_trips(&self, report: &RunReport<'_>) -> Result<(), EngineError> {
        let mut wtr = headerless_writer(&self.out_dir.join(ROUND_TRIPS_FILE))?;
        wtr.write_record([
            "entry_time",
            "exit_time",
            "entry_price",
            "exit_price",
            "size",
            "pnl",
        ])?;
        for trip in ledger::round_trips(&report.result.trade_log) {
            wtr.serialize(trip)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_json<T: Serialize>(&self, file: &str, value: &T) -> Result<(), EngineError> {
        let text = serde_json::to_string_pretty(value)?;
        fs::write(self.out_dir.join(file), text)?;
        Ok(())
    }
}

/// Header rows are written explicitly so empty files still carry one.
fn headerless_writer(path: &Path) -> Result<csv::Writer<fs::File>, EngineError> {
    Ok(csv::WriterBuilder::new().has_headers(false).from_path(path)?)
}

impl ReportPort for FileReportAdapter {
    fn write(&self, report: &RunReport<'_>) -> Result<(), EngineError> {
        fs::create_dir_all(&self.out_dir)?;

        self.write_blotter(report)?;
        self.write_round_trips(report)?;

        let start_equity = report.params.backtest.initial_capital;
        self.write_json(
            METRICS_FILE,
            &MetricsReport {
                start_equity,
                metrics: report.metrics,
            },
        )?;

        let verdict = audit::run_verdict(&report.result.audit_log);
        let capsule = ProofCapsule {
            schema_version: CAPSULE_SCHEMA_VERSION,
            created_utc: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            data_source: report.data_source,
            data_sha256: report.data_sha256,
            params: report.params,
            verdict,
            evidence: Evidence {
                collapse_hits: audit::collapse_hits(&report.result.audit_log),
            },
            metrics: MetricsReport {
                start_equity,
                metrics: report.metrics,
            },
        };
        self.write_json(CAPSULE_FILE, &capsule)?;

        let summary = CapsuleSummary::from_records(&report.params.claim, &report.result.audit_log);
        self.write_json(CAPSULE_SUMMARY_FILE, &summary)?;

        let text = make_day_summary(report.metrics, report.capsules_written, verdict.as_str());
        fs::write(self.out_dir.join(SUMMARY_FILE), text)?;

        info!(out_dir = %self.out_dir.display(), "report written");
        Ok(())
    }
}
