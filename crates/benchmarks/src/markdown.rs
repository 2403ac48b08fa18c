//! Markdown output generation for benchmark results.
//!
//! This module provides functionality to generate markdown-formatted
//! reports of validated runs.

use crate::result::BenchmarkResult;
use std::fmt::Write;

/// Generate a markdown summary from benchmark results.
pub fn generate_summary(results: &[BenchmarkResult]) -> String {
    let mut output = String::new();

    writeln!(output, "# Benchmark Summary").unwrap();
    writeln!(output).unwrap();
    writeln!(output, "Generated: {}", chrono::Utc::now().to_rfc3339()).unwrap();
    writeln!(output).unwrap();
    writeln!(output, "## Results").unwrap();
    writeln!(output).unwrap();
    writeln!(output, "| Test ID | Outcome | Write | Read | Passed | Timestamp |").unwrap();
    writeln!(output, "|---------|---------|-------|------|--------|-----------|").unwrap();

    for result in results {
        writeln!(
            output,
            "| {} | {} | {} | {} | {} | {} |",
            result.target_id,
            result.outcome().unwrap_or("-"),
            bandwidth_cell(result, "write"),
            bandwidth_cell(result, "read"),
            match result.passed() {
                Some(true) => "yes",
                Some(false) => "no",
                None => "-",
            },
            result.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        )
        .unwrap();
    }

    let details: Vec<&BenchmarkResult> = results
        .iter()
        .filter(|r| r.message().is_some() || !notes(r).is_empty())
        .collect();
    if !details.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "## Details").unwrap();
        for result in details {
            writeln!(output).unwrap();
            writeln!(output, "### {}", result.target_id).unwrap();
            writeln!(output).unwrap();
            if let Some(message) = result.message() {
                for line in message.lines() {
                    writeln!(output, "- {line}").unwrap();
                }
            }
            for note in notes(result) {
                writeln!(output, "- note: {note}").unwrap();
            }
        }
    }

    writeln!(output).unwrap();
    writeln!(output, "---").unwrap();
    writeln!(output, "Total runs: {}", results.len()).unwrap();

    output
}

fn bandwidth_cell(result: &BenchmarkResult, metric: &str) -> String {
    let measured = result
        .metrics
        .get(format!("{metric}_bandwidth"))
        .and_then(|v| v.as_f64());
    let band = result.metrics.get(format!("{metric}_band"));
    let low = band.and_then(|b| b.get("low")).and_then(|v| v.as_f64());
    let high = band.and_then(|b| b.get("high")).and_then(|v| v.as_f64());
    match (measured, low, high) {
        (Some(m), Some(l), Some(h)) => format!("{m:.2} [{l:.2}, {h:.2}]"),
        (Some(m), _, _) => format!("{m:.2}"),
        _ => "-".to_string(),
    }
}

fn notes(result: &BenchmarkResult) -> Vec<&str> {
    result
        .metrics
        .get("notes")
        .and_then(|v| v.as_array())
        .map(|notes| notes.iter().filter_map(|n| n.as_str()).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_table_row() {
        let result = BenchmarkResult::new(
            "testID_1",
            json!({
                "outcome": "pass",
                "write_bandwidth": 1394.32,
                "read_bandwidth": 1596.5,
                "write_band": {"low": 1330.0, "high": 1470.0},
                "read_band": {"low": 1520.0, "high": 1680.0},
                "message": null,
                "notes": [],
                "passed": true,
            }),
        );
        let summary = generate_summary(&[result]);
        assert!(summary.contains("| testID_1 | pass | 1394.32 [1330.00, 1470.00] | 1596.50 [1520.00, 1680.00] | yes |"));
        assert!(!summary.contains("## Details"));
        assert!(summary.contains("Total runs: 1"));
    }

    #[test]
    fn test_summary_details_for_failures_and_notes() {
        let failed = BenchmarkResult::from_error("testID_2", "summary marker not found");
        let noted = BenchmarkResult::new(
            "testID_3",
            json!({"outcome": "pass", "notes": ["mean write bandwidth 30.00% above baseline"]}),
        );
        let summary = generate_summary(&[failed, noted]);
        assert!(summary.contains("| testID_2 | error | - | - | - |"));
        assert!(summary.contains("### testID_2"));
        assert!(summary.contains("- summary marker not found"));
        assert!(summary.contains("- note: mean write bandwidth 30.00% above baseline"));
    }
}
