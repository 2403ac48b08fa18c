// Copyright 2025 iorgate Contributors
// SPDX-License-Identifier: Apache-2.0

//! Summary block extraction from raw benchmark output.
//!
//! The benchmark prints a marker line followed by a fixed block of rows.
//! Two of those rows carry the aggregate write and read results; each is
//! whitespace-separated and holds the mean bandwidth in a fixed column.
//!
//! ```text
//! Summary of all tests:
//! Operation   Max(MiB)   Min(MiB)  Mean(MiB)     StdDev ...
//! ---------   --------   --------  ---------     ------ ...
//! write        1402.43    1386.21    1394.32       8.11 ...
//! read         1611.90    1580.02    1596.50      15.94 ...
//! ```
//!
//! Only the first marker is honoured. The caller supplies the text, the
//! extractor never touches the filesystem.

use crate::error::ParseError;
use crate::measurement::{BenchmarkMeasurement, Metric};
use serde::{Deserialize, Serialize};

/// Marker line printed by the benchmark ahead of its aggregate results.
pub const SUMMARY_MARKER: &str = "Summary of all tests:";

/// Where the aggregate rows sit relative to the marker line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryLayout {
    /// Prefix identifying the marker line.
    pub marker: String,
    /// Zero-based index of the write row within the block after the marker.
    pub write_row: usize,
    /// Zero-based index of the read row within the block after the marker.
    pub read_row: usize,
    /// Zero-based whitespace field index of the mean bandwidth.
    pub mean_column: usize,
}

impl Default for SummaryLayout {
    fn default() -> Self {
        Self {
            marker: SUMMARY_MARKER.to_string(),
            write_row: 2,
            read_row: 3,
            mean_column: 3,
        }
    }
}

impl SummaryLayout {
    /// Default layout with a different marker.
    pub fn with_marker(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            ..Self::default()
        }
    }

    /// Number of lines that must follow the marker.
    pub fn block_len(&self) -> usize {
        self.write_row.max(self.read_row) + 1
    }

    /// Extract the measurement from the full text of a benchmark log.
    pub fn extract(&self, text: &str) -> Result<BenchmarkMeasurement, ParseError> {
        self.extract_lines(text.lines())
    }

    /// Extract the measurement from an ordered sequence of lines.
    pub fn extract_lines<'a, I>(&self, lines: I) -> Result<BenchmarkMeasurement, ParseError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut lines = lines.into_iter();

        if !lines
            .by_ref()
            .any(|line| line.starts_with(self.marker.as_str()))
        {
            return Err(ParseError::MissingMarker {
                marker: self.marker.clone(),
            });
        }

        let expected = self.block_len();
        let block: Vec<&str> = lines.take(expected).collect();
        if block.len() < expected {
            return Err(ParseError::TruncatedBlock {
                expected,
                found: block.len(),
            });
        }

        let write = parse_mean(Metric::Write, block[self.write_row], self.mean_column)?;
        let read = parse_mean(Metric::Read, block[self.read_row], self.mean_column)?;
        Ok(BenchmarkMeasurement::new(write, read))
    }
}

/// Extract the measurement using the default layout and the given marker.
pub fn extract_measurement(text: &str, marker: &str) -> Result<BenchmarkMeasurement, ParseError> {
    SummaryLayout::with_marker(marker).extract(text)
}

fn parse_mean(metric: Metric, row: &str, column: usize) -> Result<f64, ParseError> {
    let fields: Vec<&str> = row.split_whitespace().collect();
    let field = fields.get(column).ok_or_else(|| ParseError::ShortRow {
        metric,
        row: row.trim().to_string(),
        tokens: fields.len(),
        required: column + 1,
    })?;

    field
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ParseError::InvalidNumber {
            metric,
            value: (*field).to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const IOR_OUTPUT: &str = "\
IOR-3.0.1: MPI Coordinated Test of Parallel I/O
Began: Tue Oct 16 10:02:11 2018
Options:
api                 : DAOS
Max Write: 1402.43 MiB/sec (1470.55 MB/sec)
Max Read:  1611.90 MiB/sec (1690.20 MB/sec)

Summary of all tests:
Operation   Max(MiB)   Min(MiB)  Mean(MiB)     StdDev    Mean(s) Test#
---------   --------   --------  ---------     ------    ------- -----
write        1402.43    1386.21    1394.32       8.11   17.62613     0
read         1611.90    1580.02    1596.50      15.94   15.39051     0

Finished: Tue Oct 16 10:03:02 2018
";

    #[test]
    fn test_extracts_rows_after_marker() {
        let text = "Summary of all tests:\nheader\nseparator\na b c 120.5\na b c 95.0\n";
        let m = extract_measurement(text, SUMMARY_MARKER).unwrap();
        assert_eq!(m, BenchmarkMeasurement::new(120.5, 95.0));
    }

    #[test]
    fn test_extracts_from_ior_output() {
        let m = SummaryLayout::default().extract(IOR_OUTPUT).unwrap();
        assert_eq!(m.write_bandwidth, 1394.32);
        assert_eq!(m.read_bandwidth, 1596.50);
    }

    #[test]
    fn test_missing_marker() {
        let err = extract_measurement("no summary here\nwrite 1 2 3\n", SUMMARY_MARKER).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingMarker {
                marker: SUMMARY_MARKER.to_string()
            }
        );
    }

    #[test]
    fn test_empty_input_is_missing_marker() {
        let err = extract_measurement("", SUMMARY_MARKER).unwrap_err();
        assert!(matches!(err, ParseError::MissingMarker { .. }));
    }

    #[test]
    fn test_truncated_block() {
        let text = "Summary of all tests:\nheader\nseparator\na b c 120.5\n";
        let err = extract_measurement(text, SUMMARY_MARKER).unwrap_err();
        assert_eq!(
            err,
            ParseError::TruncatedBlock {
                expected: 4,
                found: 3
            }
        );
    }

    #[test]
    fn test_short_row() {
        let text = "Summary of all tests:\nheader\nseparator\nwrite 1 2\nread 1 2 3\n";
        let err = extract_measurement(text, SUMMARY_MARKER).unwrap_err();
        match err {
            ParseError::ShortRow {
                metric,
                tokens,
                required,
                ..
            } => {
                assert_eq!(metric, Metric::Write);
                assert_eq!(tokens, 3);
                assert_eq!(required, 4);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_field() {
        let text = "Summary of all tests:\nheader\nseparator\nwrite 1 2 3\nread 1 2 fast\n";
        let err = extract_measurement(text, SUMMARY_MARKER).unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidNumber {
                metric: Metric::Read,
                value: "fast".to_string()
            }
        );
    }

    #[test]
    fn test_non_finite_field_is_rejected() {
        for value in ["NaN", "inf", "-inf"] {
            let text = format!("Summary of all tests:\nh\ns\nwrite 1 2 {value}\nread 1 2 3\n");
            let err = extract_measurement(&text, SUMMARY_MARKER).unwrap_err();
            assert!(matches!(err, ParseError::InvalidNumber { .. }), "{value}");
        }
    }

    #[test]
    fn test_first_marker_wins() {
        let text = "\
Summary of all tests:
h
s
write 1 2 100.0
read 1 2 200.0
Summary of all tests:
h
s
write 1 2 999.0
read 1 2 999.0
";
        let m = extract_measurement(text, SUMMARY_MARKER).unwrap();
        assert_eq!(m, BenchmarkMeasurement::new(100.0, 200.0));
    }

    #[test]
    fn test_handles_crlf_line_endings() {
        let text = "Summary of all tests:\r\nh\r\ns\r\nwrite 1 2 10.5\r\nread 1 2 11.5\r\n";
        let m = extract_measurement(text, SUMMARY_MARKER).unwrap();
        assert_eq!(m, BenchmarkMeasurement::new(10.5, 11.5));
    }

    #[test]
    fn test_custom_layout() {
        let layout = SummaryLayout {
            marker: "== totals".to_string(),
            write_row: 0,
            read_row: 1,
            mean_column: 1,
        };
        assert_eq!(layout.block_len(), 2);
        let lines = vec!["noise", "== totals (MiB/s)", "write 50", "read 60"];
        let m = layout.extract_lines(lines).unwrap();
        assert_eq!(m, BenchmarkMeasurement::new(50.0, 60.0));
    }
}
