//! Market observation ("bar") representation.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::domain::error::{EngineError, ParameterError};

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// One time-stamped observation. Only `timestamp`, `close` and `entropy` are
/// read by the simulation; the remaining fields are carried through.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: String,
    pub symbol: Option<String>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
    pub entropy: Option<f64>,
}

impl Bar {
    /// A bar carrying only the fields the simulation requires.
    pub fn new(timestamp: impl Into<String>, close: f64, entropy: f64) -> Self {
        Bar {
            timestamp: timestamp.into(),
            symbol: None,
            open: None,
            high: None,
            low: None,
            close: Some(close),
            volume: None,
            entropy: Some(entropy),
        }
    }

    /// The close price. NaN and infinities are rejected.
    pub fn close(&self) -> Result<f64, EngineError> {
        let close = self.close.ok_or_else(|| self.missing("close"))?;
        if !close.is_finite() {
            return Err(ParameterError::NonFiniteClose {
                close,
                timestamp: self.timestamp.clone(),
            }
            .into());
        }
        Ok(close)
    }

    pub fn entropy(&self) -> Result<f64, EngineError> {
        self.entropy.ok_or_else(|| self.missing("entropy"))
    }

    /// The timestamp as a date-time, when it is in a recognised format.
    /// Opaque labels (e.g. `t0`) return `None`.
    pub fn parsed_time(&self) -> Option<NaiveDateTime> {
        let ts = self.timestamp.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
            return Some(dt.naive_utc());
        }
        for fmt in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(ts, fmt) {
                return Some(dt);
            }
        }
        NaiveDate::parse_from_str(ts, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }

    fn missing(&self, field: &'static str) -> EngineError {
        EngineError::MissingField {
            field,
            timestamp: self.timestamp.clone(),
        }
    }
}
