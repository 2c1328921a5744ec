//! Dual-sink audit writer: a CSV proof ledger and a JSONL capsule stream.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::domain::audit::{AuditRecord, Verdict};
use crate::domain::error::EngineError;
use crate::domain::regime::Regime;
use crate::ports::audit_port::AuditSink;

const HASH_CHUNK_SIZE: usize = 8192;

#[derive(Serialize)]
struct LedgerRow<'a> {
    ts: &'a str,
    glyph: &'a str,
    entropy: f64,
    verdict: Verdict,
}

#[derive(Serialize)]
struct CapsuleLine<'a> {
    ts: &'a str,
    glyph: &'a str,
    entropy: f64,
    regime: Regime,
    verdict: Verdict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedgerStats {
    pub capsules_written: usize,
}

pub struct ProofLedger {
    csv: csv::Writer<File>,
    jsonl: BufWriter<File>,
    count: usize,
}

impl ProofLedger {
    /// Create (truncating) both sinks and write the CSV header.
    pub fn create(csv_path: &Path, jsonl_path: &Path) -> Result<Self, EngineError> {
        let csv = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(csv_path)?;
        let jsonl = BufWriter::new(File::create(jsonl_path)?);
        let mut ledger = ProofLedger {
            csv,
            jsonl,
            count: 0,
        };
        ledger
            .csv
            .write_record(["ts", "glyph", "entropy", "verdict"])?;
        Ok(ledger)
    }

    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            capsules_written: self.count,
        }
    }
}

impl AuditSink for ProofLedger {
    fn write_record(&mut self, record: &AuditRecord) -> Result<(), EngineError> {
        self.csv.serialize(LedgerRow {
            ts: &record.timestamp,
            glyph: record.glyph,
            entropy: record.entropy,
            verdict: record.verdict,
        })?;

        let line = CapsuleLine {
            ts: &record.timestamp,
            glyph: record.glyph,
            entropy: record.entropy,
            regime: record.regime,
            verdict: record.verdict,
        };
        serde_json::to_writer(&mut self.jsonl, &line)?;
        self.jsonl.write_all(b"\n")?;

        self.count += 1;
        Ok(())
    }

    fn records_written(&self) -> usize {
        self.count
    }

    fn close(&mut self) -> Result<(), EngineError> {
        self.csv.flush()?;
        self.jsonl.flush()?;
        Ok(())
    }
}

/// Lowercase hex SHA-256 of a file's contents, read in fixed-size chunks.
pub fn sha256_file(path: &Path) -> Result<String, EngineError> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; HASH_CHUNK_SIZE];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
