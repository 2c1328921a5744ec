//! CLI integration tests for the backtest command orchestration.
//!
//! Tests cover:
//! - Config parsing from real INI files on disk
//! - Strategy resolution and overrides
//! - Full pipeline with MockBarSource and with CSV files
//! - Exit codes for each error family
//! - `validate` and `hash` subcommands

mod common;

use clap::Parser;
use common::*;
use living_engine::adapters::csv_adapter::CsvAdapter;
use living_engine::adapters::file_config_adapter::FileConfigAdapter;
use living_engine::adapters::proof_ledger::sha256_file;
use living_engine::cli::{self, Cli};
use living_engine::domain::config_validation::build_run_params;
use living_engine::domain::error::{EngineError, ParameterError};
use std::fs;
use std::process::ExitCode;
use tempfile::TempDir;

mod config_loading {
    use super::*;

    #[test]
    fn loads_run_params_from_disk() {
        let file = write_temp_file(PARAMS_INI);
        let config = cli::load_config(file.path()).unwrap();
        let params = build_run_params(&config, None).unwrap();

        assert_eq!(params.strategy, "imm_core");
        assert_eq!(params.claim, "P≠NP");
        assert!((params.backtest.initial_capital - 50_000.0).abs() < f64::EPSILON);
        assert!((params.backtest.sizing.risk_percent - 0.01).abs() < f64::EPSILON);
        assert!((params.backtest.sizing.fixed_fraction - 0.005).abs() < f64::EPSILON);
        assert_eq!(params.strategy_params.signals.fast_period(), 12);
        assert_eq!(params.strategy_params.signals.slow_period(), 30);
    }

    #[test]
    fn missing_file_maps_to_config_exit_code() {
        let result = cli::load_config(std::path::Path::new("/nonexistent/params.ini"));
        assert_eq!(result.err(), Some(ExitCode::from(2)));
    }

    #[test]
    fn strategy_override_wins() {
        let config = config_adapter(&PARAMS_INI.replace("strategy = imm_core", "strategy = other"));
        let params = build_run_params(&config, Some("imm_core")).unwrap();
        assert_eq!(params.strategy, "imm_core");
    }
}

mod pipeline {
    use super::*;

    #[test]
    fn mock_source_writes_every_artifact() {
        let dir = TempDir::new().unwrap();
        let config = config_adapter(FAST_INI);
        let source = MockBarSource::new(round_trip_bars());

        let outcome =
            cli::run_backtest_pipeline(&config, &source, "deadbeef", None, dir.path()).unwrap();

        assert_eq!(source.fetches.get(), 1);
        assert_eq!(outcome.result.bars_processed(), 5);
        assert_eq!(outcome.metrics.num_trades, 1);
        assert_eq!(outcome.capsules_written, 3);

        for file in [
            "proof_ledger.csv",
            "capsules.jsonl",
            "trades_blotter.csv",
            "round_trips.csv",
            "metrics.json",
            "proof_capsule.json",
            "capsule_summary.json",
            "summary.txt",
        ] {
            assert!(dir.path().join(file).exists(), "{file} missing");
        }

        let capsule: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(dir.path().join("proof_capsule.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(capsule["data_sha256"], "deadbeef");
        assert_eq!(capsule["params"]["strategy_params"]["signals"]["fast_period"], 2);

        let jsonl = fs::read_to_string(dir.path().join("capsules.jsonl")).unwrap();
        assert_eq!(jsonl.lines().count(), 3);

        let summary = fs::read_to_string(dir.path().join("summary.txt")).unwrap();
        assert!(summary.contains("(capsules: 3)"));
    }

    #[test]
    fn csv_source_end_to_end() {
        let dir = TempDir::new().unwrap();
        let data_path = dir.path().join("bars.csv");
        fs::write(&data_path, bars_csv(&round_trip_bars())).unwrap();
        let out = dir.path().join("out");

        let config = config_adapter(FAST_INI);
        let source = CsvAdapter::new(data_path.clone());
        let digest = sha256_file(&data_path).unwrap();
        let outcome = cli::run_backtest_pipeline(&config, &source, &digest, None, &out).unwrap();

        assert_eq!(outcome.result.trade_log.len(), 2);
        let capsule: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join("proof_capsule.json")).unwrap())
                .unwrap();
        assert_eq!(capsule["data_source"], data_path.display().to_string());
        assert_eq!(capsule["data_sha256"], digest);
        assert_eq!(digest.len(), 64);
    }

    #[test]
    fn unknown_strategy_is_rejected_before_reading_bars() {
        let dir = TempDir::new().unwrap();
        let config = config_adapter(FAST_INI);
        let source = MockBarSource::new(round_trip_bars());

        let err = cli::run_backtest_pipeline(&config, &source, "", Some("momentum"), dir.path())
            .unwrap_err();
        match &err {
            EngineError::UnknownStrategy { name, known } => {
                assert_eq!(name, "momentum");
                assert!(known.contains("imm_core"));
            }
            other => panic!("unexpected error {other}"),
        }
        assert_eq!(source.fetches.get(), 0);
        assert_eq!(ExitCode::from(&err), ExitCode::from(2));
    }

    #[test]
    fn empty_source_is_empty_curve() {
        let dir = TempDir::new().unwrap();
        let config = config_adapter(FAST_INI);
        let source = MockBarSource::new(Vec::new());

        let err = cli::run_backtest_pipeline(&config, &source, "", None, dir.path()).unwrap_err();
        assert!(matches!(err, EngineError::EmptyCurve));
        assert_eq!(ExitCode::from(&err), ExitCode::from(5));
    }

    #[test]
    fn missing_field_maps_to_data_exit_code() {
        let dir = TempDir::new().unwrap();
        let config = config_adapter(FAST_INI);
        let mut bars = round_trip_bars();
        bars[1].entropy = None;
        let source = MockBarSource::new(bars);

        let err = cli::run_backtest_pipeline(&config, &source, "", None, dir.path()).unwrap_err();
        assert!(matches!(err, EngineError::MissingField { field: "entropy", .. }));
        assert_eq!(ExitCode::from(&err), ExitCode::from(4));
    }

    #[test]
    fn invalid_thresholds_map_to_parameter_exit_code() {
        let dir = TempDir::new().unwrap();
        let config = config_adapter(&FAST_INI.replace("P_threshold = 0.045", "P_threshold = 0.5"));
        let source = MockBarSource::new(round_trip_bars());

        let err = cli::run_backtest_pipeline(&config, &source, "", None, dir.path()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidParameter(ParameterError::NonMonotonicThresholds { .. })
        ));
        assert_eq!(ExitCode::from(&err), ExitCode::from(3));
    }

    #[test]
    fn source_error_propagates() {
        let dir = TempDir::new().unwrap();
        let config = config_adapter(FAST_INI);
        let source = MockBarSource::failing("truncated file");

        let err = cli::run_backtest_pipeline(&config, &source, "", None, dir.path()).unwrap_err();
        assert!(matches!(err, EngineError::Data { ref reason } if reason == "truncated file"));
    }
}

mod commands {
    use super::*;

    fn run_args(args: &[&str]) -> ExitCode {
        cli::run(Cli::try_parse_from(args).unwrap())
    }

    #[test]
    fn validate_accepts_good_config() {
        let file = write_temp_file(PARAMS_INI);
        let path = file.path().to_str().unwrap();
        assert_eq!(
            run_args(&["living-engine", "validate", "--config", path]),
            ExitCode::SUCCESS
        );
    }

    #[test]
    fn validate_rejects_missing_risk() {
        let content = PARAMS_INI.replace("RiskPercent = 0.01", "");
        let file = write_temp_file(&content);
        let path = file.path().to_str().unwrap();
        assert_eq!(
            run_args(&["living-engine", "validate", "--config", path]),
            ExitCode::from(2)
        );
    }

    #[test]
    fn validate_rejects_unknown_strategy() {
        let content = PARAMS_INI.replace("strategy = imm_core", "strategy = nope");
        let file = write_temp_file(&content);
        let path = file.path().to_str().unwrap();
        assert_eq!(
            run_args(&["living-engine", "validate", "--config", path]),
            ExitCode::from(2)
        );
    }

    #[test]
    fn hash_existing_and_missing_files() {
        let file = write_temp_file("abc");
        let path = file.path().to_str().unwrap();
        assert_eq!(run_args(&["living-engine", "hash", path]), ExitCode::SUCCESS);
        assert_eq!(
            run_args(&["living-engine", "hash", "/nonexistent/bars.csv"]),
            ExitCode::from(1)
        );
    }

    #[test]
    fn backtest_command_writes_output_dir() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("params.ini");
        let data_path = dir.path().join("bars.csv");
        let out = dir.path().join("run");
        fs::write(&config_path, FAST_INI).unwrap();
        fs::write(&data_path, bars_csv(&round_trip_bars())).unwrap();

        let code = run_args(&[
            "living-engine",
            "backtest",
            "--config",
            config_path.to_str().unwrap(),
            "--data",
            data_path.to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
        ]);
        assert_eq!(code, ExitCode::SUCCESS);

        let blotter = fs::read_to_string(out.join("trades_blotter.csv")).unwrap();
        assert_eq!(blotter.lines().count(), 3);
        let ledger = fs::read_to_string(out.join("proof_ledger.csv")).unwrap();
        assert!(ledger.starts_with("ts,glyph,entropy,verdict\n"));
    }

    #[test]
    fn backtest_command_bad_csv_is_data_error() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("params.ini");
        let data_path = dir.path().join("bars.csv");
        fs::write(&config_path, FAST_INI).unwrap();
        fs::write(&data_path, "timestamp,close,entropy\nt0,oops,0.01\n").unwrap();

        let code = run_args(&[
            "living-engine",
            "backtest",
            "-c",
            config_path.to_str().unwrap(),
            "-d",
            data_path.to_str().unwrap(),
            "-o",
            dir.path().join("run").to_str().unwrap(),
        ]);
        assert_eq!(code, ExitCode::from(4));
    }

    #[test]
    fn from_string_and_from_file_agree() {
        let file = write_temp_file(PARAMS_INI);
        let a = build_run_params(&FileConfigAdapter::from_file(file.path()).unwrap(), None).unwrap();
        let b = build_run_params(&config_adapter(PARAMS_INI), None).unwrap();
        assert_eq!(a, b);
    }
}
