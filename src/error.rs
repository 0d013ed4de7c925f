// src/error.rs
//! Unified error handling for the PSD extraction and normalization stack
//!
//! Errors fall into three severities. Fatal errors abort a whole run, skipped
//! recordings are logged and the run continues with the next input, and I/O
//! failures abandon the remaining output of one recording.

use std::fmt;
use std::path::PathBuf;
use serde::Serialize;
use thiserror::Error;

use crate::processing::filters::FilterError;

/// Unified error type for the whole crate
#[derive(Debug, Error)]
pub enum PsdError {
    /// Invalid configuration or unusable run inputs; always fatal
    #[error("[CONFIG] Configuration error in {component}: {reason}")]
    Configuration {
        component: String,
        reason: String,
    },

    /// A single recording (or table) could not be processed and was skipped
    #[error("[SKIP] {recording}: {reason}")]
    RecordingSkipped {
        recording: String,
        reason: SkipReason,
    },

    /// Filesystem failure while reading or writing an artifact
    #[error("[IO] {operation} failed for {}: {source}", .path.display())]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV encoding or decoding failure
    #[error("[CSV] {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Persisted scaler artifact is corrupt or does not fit the data
    #[error("[SCALER] {}: {reason}", .path.display())]
    ScalerArtifact {
        path: PathBuf,
        reason: String,
    },

    /// Filter design or application failure
    #[error("[FILTER] {0}")]
    Filter(#[from] FilterError),
}

/// Why a recording was skipped
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SkipReason {
    /// Fewer samples than one analysis window
    TooShort { num_samples: usize, window_size: usize },
    /// Channels disagree on length or frame count
    ShapeMismatch { channel: usize, expected: usize, actual: usize },
    /// A filename-derived field could not be determined
    MissingMetadata { field: String, detail: String },
    /// The input holds no data rows
    EmptyInput,
    /// A cell could not be parsed as a finite number
    InvalidSample { row: usize, column: usize, value: String },
    /// A table row has a different number of cells than the header
    RaggedRow { row: usize, expected: usize, actual: usize },
    /// Table columns differ from the rest of the dataset
    SchemaMismatch { expected: Vec<String>, actual: Vec<String> },
    /// No channel of the hemisphere layout exists in the recording
    NoHemisphereChannels { hemisphere: String, num_channels: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TooShort { num_samples, window_size } => write!(
                f,
                "recording too short for one frame ({} samples, window {})",
                num_samples, window_size
            ),
            SkipReason::ShapeMismatch { channel, expected, actual } => write!(
                f,
                "shape mismatch on channel {} (expected {}, got {})",
                channel, expected, actual
            ),
            SkipReason::MissingMetadata { field, detail } => {
                write!(f, "no {} could be derived ({})", field, detail)
            }
            SkipReason::EmptyInput => write!(f, "input contains no data"),
            SkipReason::InvalidSample { row, column, value } => write!(
                f,
                "invalid value {:?} at row {}, column {}",
                value, row, column
            ),
            SkipReason::RaggedRow { row, expected, actual } => write!(
                f,
                "row {} has {} cells (expected {})",
                row, actual, expected
            ),
            SkipReason::SchemaMismatch { expected, actual } => write!(
                f,
                "column mismatch (expected [{}], got [{}])",
                expected.join(", "),
                actual.join(", ")
            ),
            SkipReason::NoHemisphereChannels { hemisphere, num_channels } => write!(
                f,
                "no {} hemisphere channels among {} recorded channels",
                hemisphere, num_channels
            ),
        }
    }
}

/// How the batch runner treats an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// Stop the run immediately
    Fatal,
    /// Log and continue with the next input
    Skipped,
    /// Abandon the current recording's output and continue
    Io,
}

impl PsdError {
    /// Severity used by the runner to decide whether to continue
    pub fn severity(&self) -> Severity {
        match self {
            PsdError::Configuration { .. } | PsdError::ScalerArtifact { .. } => Severity::Fatal,
            PsdError::Filter(FilterError::InvalidParameters(_)) => Severity::Fatal,
            PsdError::RecordingSkipped { .. } | PsdError::Filter(_) => Severity::Skipped,
            PsdError::Io { .. } | PsdError::Csv { .. } => Severity::Io,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    /// Shorthand for a skipped recording
    pub fn skipped(recording: impl Into<String>, reason: SkipReason) -> Self {
        PsdError::RecordingSkipped {
            recording: recording.into(),
            reason,
        }
    }

    pub fn io(operation: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PsdError::Io {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        PsdError::Csv {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for crate operations
pub type PsdResult<T> = Result<T, PsdError>;

/// Error builder carrying the reporting component
pub struct PsdErrorBuilder {
    component: String,
}

impl PsdErrorBuilder {
    pub fn new(component: &str) -> Self {
        Self {
            component: component.to_string(),
        }
    }

    pub fn configuration(self, reason: impl Into<String>) -> PsdError {
        PsdError::Configuration {
            component: self.component,
            reason: reason.into(),
        }
    }

    pub fn invalid_value(self, field: &str, value: impl fmt::Display, expected: &str) -> PsdError {
        PsdError::Configuration {
            component: self.component,
            reason: format!("{} = {} is invalid (expected {})", field, value, expected),
        }
    }
}

/// Convert foreign I/O results into crate errors with path context
pub trait IntoPsdError<T> {
    fn psd_err(self, operation: &str, path: impl Into<PathBuf>) -> PsdResult<T>;
}

impl<T> IntoPsdError<T> for Result<T, std::io::Error> {
    fn psd_err(self, operation: &str, path: impl Into<PathBuf>) -> PsdResult<T> {
        self.map_err(|err| PsdError::io(operation, path, err))
    }
}

impl<T> IntoPsdError<T> for Result<T, csv::Error> {
    fn psd_err(self, _operation: &str, path: impl Into<PathBuf>) -> PsdResult<T> {
        self.map_err(|err| PsdError::csv(path, err))
    }
}
