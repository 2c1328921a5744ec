//! Domain error types.

/// A rejected parameter, detailed enough to point at the offending value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParameterError {
    #[error("entropy must be non-negative, got {entropy}")]
    NegativeEntropy { entropy: f64 },

    #[error("entropy must be a number, got {entropy}")]
    NanEntropy { entropy: f64 },

    #[error("close at {timestamp} must be finite, got {close}")]
    NonFiniteClose { close: f64, timestamp: String },

    #[error("threshold {name} must be non-negative, got {value}")]
    NegativeThreshold { name: &'static str, value: f64 },

    #[error("thresholds must be monotonic: {lower_name} = {lower} exceeds {upper_name} = {upper}")]
    NonMonotonicThresholds {
        lower_name: &'static str,
        lower: f64,
        upper_name: &'static str,
        upper: f64,
    },

    #[error("period {name} must be a positive integer, got {value}")]
    NonPositivePeriod { name: &'static str, value: i64 },

    #[error("fast EMA period ({fast}) must be shorter than slow EMA period ({slow})")]
    PeriodOrder { fast: usize, slow: usize },

    #[error("{name} = {value} is out of range: {reason}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

/// Top-level error type for living-engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(#[from] ParameterError),

    #[error("bar at {timestamp} is missing required field '{field}'")]
    MissingField {
        field: &'static str,
        timestamp: String,
    },

    #[error("equity curve is empty: no bars were processed")]
    EmptyCurve,

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown strategy '{name}' (known: {known})")]
    UnknownStrategy { name: String, known: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("serialization error: {reason}")]
    Serialize { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialize {
            reason: err.to_string(),
        }
    }
}

impl From<csv::Error> for EngineError {
    fn from(err: csv::Error) -> Self {
        EngineError::Data {
            reason: format!("CSV error: {err}"),
        }
    }
}

impl From<&EngineError> for std::process::ExitCode {
    fn from(err: &EngineError) -> Self {
        let code: u8 = match err {
            EngineError::Io(_) | EngineError::Serialize { .. } => 1,
            EngineError::ConfigParse { .. }
            | EngineError::ConfigMissing { .. }
            | EngineError::ConfigInvalid { .. }
            | EngineError::UnknownStrategy { .. } => 2,
            EngineError::InvalidParameter(_) => 3,
            EngineError::MissingField { .. } | EngineError::Data { .. } => 4,
            EngineError::EmptyCurve => 5,
        };
        std::process::ExitCode::from(code)
    }
}
