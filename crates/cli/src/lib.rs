// Copyright 2025 iorgate Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI for iorgate.
//!
//! This crate provides the `iorgate` command-line interface: validating a
//! captured benchmark log, printing a tolerance band, and running the full
//! orchestrated benchmark test.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use iorgate_adapters::{judge, Orchestrator, RunOutcome, TestStatus};
use iorgate_benchmarks::{count_passed, io, BenchmarkResult};
use iorgate_core::{
    compute_band_with_mode, Baseline, ComparisonMode, ExpectedOutcome, RunConfig, SummaryLayout,
    ToleranceBand, Validator,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// iorgate CLI.
#[derive(Parser, Debug)]
#[command(name = "iorgate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a captured benchmark log against a baseline.
    Validate(ValidateArgs),

    /// Print the tolerance band for an expected value.
    Band {
        /// Expected bandwidth.
        #[arg(long)]
        expected: f64,

        /// Tolerance in percent.
        #[arg(long)]
        deviation: f64,

        /// Truncate to whole numbers before comparing.
        #[arg(long)]
        truncate: bool,
    },

    /// Start servers, create a pool, run the benchmark and validate it.
    ///
    /// The pool is destroyed and the servers are stopped however the run ends.
    Run {
        /// Run configuration file (TOML).
        #[arg(short, long, env = "IORGATE_CONFIG")]
        config: PathBuf,

        /// Test id whose baseline applies.
        #[arg(long)]
        test_id: String,

        /// Directory to record the result in.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Arguments of `iorgate validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Benchmark output to validate.
    #[arg(long)]
    pub log: PathBuf,

    /// Run configuration holding the baseline table.
    #[arg(short, long, requires = "test_id", conflicts_with_all = ["write", "read", "deviation"])]
    pub config: Option<PathBuf>,

    /// Test id whose baseline applies; names the recorded result.
    #[arg(long)]
    pub test_id: Option<String>,

    /// Expected mean write bandwidth.
    #[arg(long, required_unless_present = "config")]
    pub write: Option<f64>,

    /// Expected mean read bandwidth.
    #[arg(long, required_unless_present = "config")]
    pub read: Option<f64>,

    /// Tolerance in percent.
    #[arg(long, required_unless_present = "config")]
    pub deviation: Option<f64>,

    /// Truncate to whole numbers before comparing.
    #[arg(long)]
    pub truncate: bool,

    /// Line prefix that opens the summary block.
    #[arg(long)]
    pub marker: Option<String>,

    /// Directory to record the result in.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Expected outcome; overrides the configuration.
    #[arg(long, value_enum)]
    pub expect: Option<Expectation>,
}

/// Expected outcome as given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Expectation {
    /// The run must pass.
    Pass,
    /// The run must regress or fail.
    Fail,
}

impl From<Expectation> for ExpectedOutcome {
    fn from(value: Expectation) -> Self {
        match value {
            Expectation::Pass => ExpectedOutcome::Pass,
            Expectation::Fail => ExpectedOutcome::Fail,
        }
    }
}

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// The test met its expected outcome.
    Passed,
    /// A regression or an expectation mismatch.
    Failed,
    /// The test could not be judged.
    Error,
}

impl Exit {
    /// Numeric exit code.
    pub fn code(self) -> u8 {
        match self {
            Exit::Passed => 0,
            Exit::Failed => 1,
            Exit::Error => 2,
        }
    }
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit.code())
    }
}

/// Exit status for a judged run.
pub fn exit_for(outcome: &RunOutcome, status: &TestStatus) -> Exit {
    match (status, outcome) {
        (TestStatus::Passed, _) => Exit::Passed,
        (TestStatus::Failed(_), RunOutcome::Errored(_)) => Exit::Error,
        (TestStatus::Failed(_), RunOutcome::Completed(_)) => Exit::Failed,
    }
}

/// Install the tracing subscriber.
///
/// `RUST_LOG` applies unless `verbose` is set; the default level is info.
/// Logs go to stderr so that stdout carries only the report.
pub fn init_tracing(verbose: bool, json: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Parse the command line, install logging and run the command.
pub async fn run() -> Result<Exit> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);
    execute(cli).await
}

/// Run a parsed command.
pub async fn execute(cli: Cli) -> Result<Exit> {
    match cli.command {
        Commands::Validate(args) => validate_log(&args),
        Commands::Band {
            expected,
            deviation,
            truncate,
        } => {
            let band = compute_band_with_mode(expected, deviation, comparison_mode(truncate))?;
            println!("{}", render_band(&band));
            Ok(Exit::Passed)
        }
        Commands::Run {
            config,
            test_id,
            output,
        } => {
            let config = RunConfig::load(&config)
                .with_context(|| format!("loading {}", config.display()))?;
            let report = Orchestrator::from_config(&config).run(&config, &test_id).await;
            finish(
                &report.test_id,
                config.validation.expected_outcome,
                &report.outcome,
                &report.status,
                &report.cleanup_errors,
                output.as_deref(),
            )
        }
    }
}

fn validate_log(args: &ValidateArgs) -> Result<Exit> {
    let (test_id, validator, expected) = build_validator(args)?;
    let text = std::fs::read_to_string(&args.log)
        .with_context(|| format!("reading {}", args.log.display()))?;

    let outcome = match validator.validate(&text) {
        Ok(validation) => RunOutcome::Completed(validation),
        Err(e) => RunOutcome::Errored(e.into()),
    };
    let status = judge(expected, &outcome);
    finish(&test_id, expected, &outcome, &status, &[], args.output.as_deref())
}

fn build_validator(args: &ValidateArgs) -> Result<(String, Validator, ExpectedOutcome)> {
    let (test_id, baseline, mut mode, mut layout, mut expected) = match &args.config {
        Some(path) => {
            let config = RunConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?;
            let test_id = args
                .test_id
                .clone()
                .context("--test-id is required with --config")?;
            let baseline = config.baseline(&test_id)?;
            let validation = config.validation;
            (
                test_id,
                baseline,
                validation.comparison,
                validation.summary,
                validation.expected_outcome,
            )
        }
        None => {
            let (Some(write), Some(read), Some(deviation)) = (args.write, args.read, args.deviation)
            else {
                bail!("--write, --read and --deviation are required without --config");
            };
            let test_id = args
                .test_id
                .clone()
                .unwrap_or_else(|| default_test_id(&args.log));
            (
                test_id,
                Baseline::new(write, read, deviation)?,
                ComparisonMode::Float,
                SummaryLayout::default(),
                ExpectedOutcome::Pass,
            )
        }
    };

    if args.truncate {
        mode = ComparisonMode::Truncated;
    }
    if let Some(marker) = &args.marker {
        layout.marker = marker.clone();
    }
    if let Some(expect) = args.expect {
        expected = expect.into();
    }

    let validator = Validator::new(baseline).with_mode(mode).with_layout(layout);
    Ok((test_id, validator, expected))
}

fn default_test_id(log: &Path) -> String {
    log.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "adhoc".to_string())
}

fn comparison_mode(truncate: bool) -> ComparisonMode {
    if truncate {
        ComparisonMode::Truncated
    } else {
        ComparisonMode::Float
    }
}

fn finish(
    test_id: &str,
    expected: ExpectedOutcome,
    outcome: &RunOutcome,
    status: &TestStatus,
    cleanup_errors: &[String],
    output: Option<&Path>,
) -> Result<Exit> {
    println!(
        "{}",
        render_report(test_id, expected, outcome, status, cleanup_errors)
    );

    if let Some(dir) = output {
        let result = match outcome {
            RunOutcome::Completed(validation) => BenchmarkResult::from_validation(test_id, validation),
            RunOutcome::Errored(e) => BenchmarkResult::from_error(test_id, e),
        }
        .with_status(status.is_passed());
        let results = io::record_result(dir, result)
            .with_context(|| format!("recording result in {}", dir.display()))?;
        info!(
            dir = %dir.display(),
            recorded = results.len(),
            passed = count_passed(&results),
            "result recorded"
        );
    }

    Ok(exit_for(outcome, status))
}

/// Human-readable tolerance band.
pub fn render_band(band: &ToleranceBand) -> String {
    format!(
        "[{:.2}, {:.2}] (expected {:.2}, deviation {}%)",
        band.low, band.high, band.expected, band.deviation_percent
    )
}

/// Human-readable report of a judged run.
pub fn render_report(
    test_id: &str,
    expected: ExpectedOutcome,
    outcome: &RunOutcome,
    status: &TestStatus,
    cleanup_errors: &[String],
) -> String {
    let label = match status {
        TestStatus::Passed => "PASS".green().bold(),
        TestStatus::Failed(_) => match outcome {
            RunOutcome::Completed(_) => "FAIL".red().bold(),
            RunOutcome::Errored(_) => "ERROR".yellow().bold(),
        },
    };

    let mut lines = Vec::new();
    match outcome {
        RunOutcome::Completed(validation) => {
            let verdict = &validation.verdict;
            lines.push(format!("{label} {test_id}: {}", verdict.outcome));
            lines.push(format!(
                "  write {:.2} {}",
                validation.measurement.write_bandwidth,
                render_band(&validation.write_band)
            ));
            lines.push(format!(
                "  read  {:.2} {}",
                validation.measurement.read_bandwidth,
                render_band(&validation.read_band)
            ));
            if let Some(message) = verdict.message() {
                lines.extend(message.lines().map(|l| format!("  {l}")));
            }
            lines.extend(
                verdict
                    .improvement_notes()
                    .into_iter()
                    .map(|n| format!("  note: {n}")),
            );
        }
        RunOutcome::Errored(e) => {
            lines.push(format!("{label} {test_id}: error"));
            lines.push(format!("  {e}"));
        }
    }

    if expected == ExpectedOutcome::Fail {
        match status {
            TestStatus::Passed => lines.push("  expected to fail: satisfied".to_string()),
            TestStatus::Failed(reason) => lines.push(format!("  {reason}")),
        }
    }
    lines.extend(cleanup_errors.iter().map(|e| format!("  cleanup failed: {e}")));
    lines.join("\n")
}
