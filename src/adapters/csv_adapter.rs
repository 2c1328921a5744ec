//! CSV bar source.
//!
//! Columns are matched by header name. `timestamp` and `close` columns must
//! exist; an `entropy` column is expected but a bar with an empty cell is
//! still loaded and rejected later by the engine. Row order is preserved.

use crate::domain::bar::Bar;
use crate::domain::error::EngineError;
use crate::ports::data_port::BarSource;
use std::io::Read;
use std::path::PathBuf;

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl BarSource for CsvAdapter {
    fn fetch_bars(&self) -> Result<Vec<Bar>, EngineError> {
        let file = std::fs::File::open(&self.path).map_err(|e| EngineError::Data {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;
        read_bars(file)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

struct Columns {
    timestamp: usize,
    close: usize,
    entropy: Option<usize>,
    symbol: Option<usize>,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    volume: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, EngineError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let required = |name: &str| {
            find(name).ok_or_else(|| EngineError::Data {
                reason: format!("missing {} column", name),
            })
        };
        Ok(Columns {
            timestamp: required("timestamp")?,
            close: required("close")?,
            entropy: find("entropy"),
            symbol: find("symbol"),
            open: find("open"),
            high: find("high"),
            low: find("low"),
            volume: find("volume"),
        })
    }
}

/// Parse bars from any CSV reader with a header row.
pub fn read_bars<R: Read>(reader: R) -> Result<Vec<Bar>, EngineError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let columns = Columns::from_headers(rdr.headers()?)?;

    let mut bars = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        let line = row + 2;

        let timestamp = record
            .get(columns.timestamp)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| EngineError::Data {
                reason: format!("line {}: empty timestamp", line),
            })?
            .to_string();

        bars.push(Bar {
            symbol: columns
                .symbol
                .and_then(|i| record.get(i))
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            open: number(&record, columns.open, "open", line)?,
            high: number(&record, columns.high, "high", line)?,
            low: number(&record, columns.low, "low", line)?,
            close: number(&record, Some(columns.close), "close", line)?,
            volume: number(&record, columns.volume, "volume", line)?,
            entropy: number(&record, columns.entropy, "entropy", line)?,
            timestamp,
        });
    }

    Ok(bars)
}

fn number(
    record: &csv::StringRecord,
    column: Option<usize>,
    name: &str,
    line: usize,
) -> Result<Option<f64>, EngineError> {
    let Some(raw) = column.and_then(|i| record.get(i)).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    raw.parse::<f64>().map(Some).map_err(|e| EngineError::Data {
        reason: format!("line {}: invalid {} value '{}': {}", line, name, raw, e),
    })
}
