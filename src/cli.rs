//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::file_report_adapter::FileReportAdapter;
use crate::adapters::proof_ledger::{sha256_file, ProofLedger};
use crate::domain::audit;
use crate::domain::backtest::{self as backtest_engine, BacktestResult};
use crate::domain::config_validation::{
    build_run_params, validate_backtest_config, validate_strategy_config, RunParams,
};
use crate::domain::error::EngineError;
use crate::domain::metrics::{self, Metrics};
use crate::domain::registry;
use crate::ports::audit_port::AuditSink;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::BarSource;
use crate::ports::report_port::{ReportPort, RunReport};

pub const PROOF_LEDGER_FILE: &str = "proof_ledger.csv";
pub const CAPSULES_FILE: &str = "capsules.jsonl";

#[derive(Parser, Debug)]
#[command(
    name = "living-engine",
    about = "Entropy-regime backtest simulator with an auditable proof ledger"
)]
pub struct Cli {
    /// Log level for diagnostics on stderr
    #[arg(long, global = true, default_value = "info")]
    pub log_level: Level,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest over a bar CSV
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long, default_value = "out")]
        output: PathBuf,
        /// Strategy identifier, overriding [backtest] strategy
        #[arg(short, long)]
        strategy: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print the SHA-256 digest of a file
    Hash { file: PathBuf },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            data,
            output,
            strategy,
        } => run_backtest(&config, &data, &output, strategy.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::Hash { file } => run_hash(&file),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Outputs of one completed pipeline run.
#[derive(Debug)]
pub struct RunOutcome {
    pub params: RunParams,
    pub result: BacktestResult,
    pub metrics: Metrics,
    pub capsules_written: usize,
}

/// Configure, simulate and persist one run into `output_dir`.
///
/// The strategy is resolved through the registry, bars are read from
/// `source` in the order given, audit records go to the proof ledger and
/// the remaining artifacts to the file report adapter.
pub fn run_backtest_pipeline(
    config: &dyn ConfigPort,
    source: &dyn BarSource,
    data_sha256: &str,
    strategy_override: Option<&str>,
    output_dir: &Path,
) -> Result<RunOutcome, EngineError> {
    let params = build_run_params(config, strategy_override)?;
    let mut strategy = registry::build_strategy(&params.strategy, config)?;

    let bars = source.fetch_bars()?;
    let result = backtest_engine::run_backtest(strategy.as_mut(), &bars, &params.backtest)?;
    let metrics = metrics::summarize(&result.equity_curve, &result.trade_log)?;

    std::fs::create_dir_all(output_dir)?;
    let mut ledger = ProofLedger::create(
        &output_dir.join(PROOF_LEDGER_FILE),
        &output_dir.join(CAPSULES_FILE),
    )?;
    ledger.write_many(&result.audit_log)?;
    ledger.close()?;
    let capsules_written = ledger.records_written();

    let data_source = source.describe();
    FileReportAdapter::new(output_dir.to_path_buf()).write(&RunReport {
        params: &params,
        result: &result,
        metrics: &metrics,
        capsules_written,
        data_source: &data_source,
        data_sha256,
    })?;

    Ok(RunOutcome {
        params,
        result,
        metrics,
        capsules_written,
    })
}

fn run_backtest(
    config_path: &Path,
    data_path: &Path,
    output_dir: &Path,
    strategy_override: Option<&str>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let data_sha256 = match sha256_file(data_path) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("error: failed to hash {}: {e}", data_path.display());
            return (&e).into();
        }
    };

    eprintln!("Loading bars from {}", data_path.display());
    let source = CsvAdapter::new(data_path.to_path_buf());
    let outcome = match run_backtest_pipeline(
        &adapter,
        &source,
        &data_sha256,
        strategy_override,
        output_dir,
    ) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    print_summary(&outcome);
    eprintln!("\nOutputs written to {}", output_dir.display());
    ExitCode::SUCCESS
}

fn print_summary(outcome: &RunOutcome) {
    let m = &outcome.metrics;
    eprintln!("\nStrategy:      {}", outcome.params.strategy);
    eprintln!("Bars:          {}", outcome.result.bars_processed());
    eprintln!("Trades:        {}", m.num_trades);
    eprintln!("Final equity:  {:.2}", m.final_equity);
    eprintln!("Sharpe:        {:.4}", m.sharpe);
    eprintln!("Max drawdown:  {:.2}%", m.max_drawdown * 100.0);
    eprintln!(
        "Verdict:       {} ({} capsules, {} collapse hits)",
        audit::run_verdict(&outcome.result.audit_log),
        outcome.capsules_written,
        audit::collapse_hits(&outcome.result.audit_log)
    );
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let checked = validate_strategy_config(&adapter)
        .and_then(|()| validate_backtest_config(&adapter))
        .and_then(|()| build_run_params(&adapter, None));
    let params = match checked {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let t = params.strategy_params.thresholds;
    let s = params.strategy_params.signals;
    eprintln!("\nStrategy: {}", params.strategy);
    eprintln!("  thresholds: P < {}  NP < {}  collapse >= {}", t.p(), t.np(), t.collapse());
    eprintln!("  EMA periods: fast {}  slow {}", s.fast_period(), s.slow_period());
    eprintln!("\nBacktest:");
    eprintln!("  initial capital: {:.2}", params.backtest.initial_capital);
    eprintln!("  risk percent:    {}", params.backtest.sizing.risk_percent);
    eprintln!("  fixed fraction:  {}", params.backtest.sizing.fixed_fraction);
    eprintln!("  claim:           {}", params.claim);
    if let Some(source) = &params.data_source {
        eprintln!("  data source:     {}", source);
    }

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_hash(path: &Path) -> ExitCode {
    match sha256_file(path) {
        Ok(digest) => {
            println!("{digest}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
