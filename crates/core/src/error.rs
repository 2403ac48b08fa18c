// Copyright 2025 iorgate Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for the validator core.

use crate::measurement::Metric;
use thiserror::Error;

/// Failures while locating or reading the summary block of benchmark output.
///
/// These are hard failures of the run and are kept apart from a bandwidth
/// regression, which is a verdict rather than an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// No line starts with the summary marker.
    #[error("summary marker {marker:?} not found in benchmark output")]
    MissingMarker {
        /// Marker that was searched for.
        marker: String,
    },

    /// Fewer lines follow the marker than the summary block needs.
    #[error("summary block truncated: expected {expected} lines after the marker, found {found}")]
    TruncatedBlock {
        /// Lines required after the marker.
        expected: usize,
        /// Lines actually present.
        found: usize,
    },

    /// A summary row does not reach the mean bandwidth column.
    #[error("{metric} summary row has {tokens} fields, need at least {required}: {row:?}")]
    ShortRow {
        /// Metric the row was expected to hold.
        metric: Metric,
        /// Offending row, trimmed.
        row: String,
        /// Number of whitespace-separated fields found.
        tokens: usize,
        /// Number of fields required.
        required: usize,
    },

    /// The mean bandwidth field is not a finite decimal number.
    #[error("{metric} mean bandwidth {value:?} is not a finite number")]
    InvalidNumber {
        /// Metric the field belongs to.
        metric: Metric,
        /// Raw field text.
        value: String,
    },
}

/// Errors produced by the validator core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Benchmark output could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Baseline, tolerance or run configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Build an [`Error::InvalidConfig`].
    pub fn invalid_config<T: Into<String>>(msg: T) -> Self {
        Error::InvalidConfig(msg.into())
    }

    /// Whether this error came from parsing benchmark output.
    pub fn is_parse(&self) -> bool {
        matches!(self, Error::Parse(_))
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::InvalidConfig(err.to_string())
    }
}

/// Result type for validator operations.
pub type Result<T> = std::result::Result<T, Error>;
