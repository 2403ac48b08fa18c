//! I/O operations for benchmark results.
//!
//! This module provides functionality to read and write benchmark
//! results under an output directory:
//!
//! - `raw/<test id>.json` - one file per run
//! - `all_results.json` - every recorded run, sorted by test id
//! - `summary.md` - Markdown summary of all recorded runs

use crate::markdown;
use crate::result::BenchmarkResult;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default output directory path.
pub const OUTPUT_DIR: &str = "benchmarks/output";

/// Raw results directory name.
pub const RAW_DIR: &str = "raw";

/// Combined results file name.
pub const ALL_RESULTS_FILE: &str = "all_results.json";

/// Summary file name.
pub const SUMMARY_FILE: &str = "summary.md";

/// Ensure output directories exist.
pub fn ensure_output_dirs(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir.join(RAW_DIR))
}

/// Path of the raw file for a result.
pub fn raw_result_path(dir: &Path, target_id: &str) -> PathBuf {
    dir.join(RAW_DIR)
        .join(format!("{}.json", target_id.replace(['/', '\\'], "_")))
}

/// Write benchmark results to JSON file.
pub fn write_results_json(results: &[BenchmarkResult], path: impl AsRef<Path>) -> io::Result<()> {
    let json = serde_json::to_string_pretty(results)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    fs::write(path, json)
}

/// Write individual result to raw directory.
pub fn write_raw_result(dir: &Path, result: &BenchmarkResult) -> io::Result<()> {
    ensure_output_dirs(dir)?;
    let json = serde_json::to_string_pretty(result)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    fs::write(raw_result_path(dir, &result.target_id), json)
}

/// Write summary markdown file.
pub fn write_summary(dir: &Path, results: &[BenchmarkResult]) -> io::Result<()> {
    ensure_output_dirs(dir)?;
    let summary = markdown::generate_summary(results);
    fs::write(dir.join(SUMMARY_FILE), summary)
}

/// Write all benchmark outputs (raw JSON, combined JSON and summary).
pub fn write_all_outputs(dir: &Path, results: &[BenchmarkResult]) -> io::Result<()> {
    ensure_output_dirs(dir)?;

    for result in results {
        write_raw_result(dir, result)?;
    }

    write_results_json(results, dir.join(ALL_RESULTS_FILE))?;
    write_summary(dir, results)?;

    Ok(())
}

/// Add one result to the outputs already in `dir`.
///
/// A previous result with the same test id is replaced. Returns every
/// recorded result, sorted by test id.
pub fn record_result(dir: &Path, result: BenchmarkResult) -> io::Result<Vec<BenchmarkResult>> {
    let all_path = dir.join(ALL_RESULTS_FILE);
    let mut results = if all_path.exists() {
        read_results_json(&all_path)?
    } else {
        Vec::new()
    };
    results.retain(|r| r.target_id != result.target_id);
    results.push(result);
    results.sort_by(|a, b| a.target_id.cmp(&b.target_id));
    write_all_outputs(dir, &results)?;
    Ok(results)
}

/// Read results from JSON file.
pub fn read_results_json(path: impl AsRef<Path>) -> io::Result<Vec<BenchmarkResult>> {
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&content)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
