#![allow(dead_code)]

use living_engine::adapters::file_config_adapter::FileConfigAdapter;
use living_engine::domain::backtest::BacktestConfig;
use living_engine::domain::bar::Bar;
use living_engine::domain::error::EngineError;
use living_engine::domain::imm_core::{ImmCore, ImmParams};
use living_engine::domain::ledger::SizingParams;
use living_engine::domain::regime::RegimeThresholds;
use living_engine::domain::signal::SignalConfig;
use living_engine::ports::data_port::BarSource;
use std::cell::Cell;
use std::io::Write;

pub const PARAMS_INI: &str = r#"
[entropy]
P_threshold = 0.045
NP_threshold = 0.09
CollapseThreshold = 0.12

[signals]
EmaFast = 12
EmaSlow = 30

[risk]
RiskPercent = 0.01

[backtest]
strategy = imm_core
initial_capital = 50000
"#;

/// Short EMA periods so crossovers appear within a handful of bars.
pub const FAST_INI: &str = r#"
[entropy]
P_threshold = 0.045
NP_threshold = 0.09
CollapseThreshold = 0.12

[signals]
EmaFast = 2
EmaSlow = 3

[risk]
RiskPercent = 0.01
"#;

pub struct MockBarSource {
    pub bars: Vec<Bar>,
    pub error: Option<String>,
    pub fetches: Cell<usize>,
}

impl MockBarSource {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self {
            bars,
            error: None,
            fetches: Cell::new(0),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            bars: Vec::new(),
            error: Some(reason.to_string()),
            fetches: Cell::new(0),
        }
    }
}

impl BarSource for MockBarSource {
    fn fetch_bars(&self) -> Result<Vec<Bar>, EngineError> {
        self.fetches.set(self.fetches.get() + 1);
        if let Some(reason) = &self.error {
            return Err(EngineError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.bars.clone())
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}

pub fn make_bar(ts: &str, close: f64, entropy: f64) -> Bar {
    Bar::new(ts, close, entropy)
}

pub fn standard_params() -> ImmParams {
    ImmParams {
        thresholds: RegimeThresholds::new(0.045, 0.09, 0.12).unwrap(),
        signals: SignalConfig::new(12, 30).unwrap(),
    }
}

pub fn fast_params() -> ImmParams {
    ImmParams {
        thresholds: RegimeThresholds::new(0.045, 0.09, 0.12).unwrap(),
        signals: SignalConfig::new(2, 3).unwrap(),
    }
}

pub fn fast_strategy() -> ImmCore {
    ImmCore::new(fast_params())
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig {
        initial_capital: 50_000.0,
        sizing: SizingParams {
            risk_percent: 0.01,
            fixed_fraction: 0.005,
        },
    }
}

/// Enter on t1, hold through NP-drift on t2, flatten on NP at t3, then a
/// collapse bar while flat at t4.
pub fn round_trip_bars() -> Vec<Bar> {
    vec![
        make_bar("2024-01-01", 100.0, 0.01),
        make_bar("2024-01-02", 110.0, 0.02),
        make_bar("2024-01-03", 120.0, 0.06),
        make_bar("2024-01-04", 115.0, 0.10),
        make_bar("2024-01-05", 116.0, 0.13),
    ]
}

/// Steadily rising prices with a given entropy per bar.
pub fn generate_bars(count: usize, start_price: f64, entropy: f64) -> Vec<Bar> {
    (0..count)
        .map(|i| make_bar(&format!("t{i:04}"), start_price + i as f64, entropy))
        .collect()
}

pub fn config_adapter(content: &str) -> FileConfigAdapter {
    FileConfigAdapter::from_string(content).unwrap()
}

pub fn write_temp_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

pub fn bars_csv(bars: &[Bar]) -> String {
    let mut out = String::from("timestamp,symbol,close,entropy\n");
    for bar in bars {
        out.push_str(&format!(
            "{},X,{},{}\n",
            bar.timestamp,
            bar.close.unwrap(),
            bar.entropy.unwrap()
        ));
    }
    out
}
