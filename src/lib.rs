//! eeg-psd: band PSD feature extraction and normalization for EEG recordings
//!
//! The crate turns multi-channel EEG recordings into per-frame band power
//! features and prepares them for classification:
//!
//! - Zero-phase Chebyshev type-II band-pass filtering (delta, theta, alpha, beta)
//! - Overlapping frame segmentation and FFT peak power estimation
//! - Left/right hemisphere summaries labelled with the recording's emotion class
//! - Standard or min-max normalization with persisted scalers
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use eeg_psd::config::ExtractionConfig;
//! use eeg_psd::reporting::{NoProgress, TracingLogSink};
//! use eeg_psd::runner::BatchRunner;
//! use std::path::{Path, PathBuf};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let inputs = vec![PathBuf::from("data/P1_h.csv")];
//!     let mut runner = BatchRunner::new(NoProgress, TracingLogSink);
//!     let report = runner.extract(&ExtractionConfig::default(), &inputs, Path::new("out"))?;
//!     println!("{}", report.summary());
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod error;
pub mod io;
pub mod metadata;
pub mod normalization;
pub mod processing;
pub mod reporting;
pub mod runner;
pub mod table;

// Re-export commonly used types for convenience
pub use config::{ConfigLoader, PsdConfig, ScalerKind};
pub use error::{PsdError, PsdResult, Severity, SkipReason};
pub use metadata::EmotionClass;
pub use normalization::{DatasetNormalizer, NormalizationMode, ScalerModel};
pub use processing::{
    BandFilterBank, ChannelPsdPipeline, FrequencyBand, HemisphereSummarizer, Recording,
    RecordingPsd,
};
pub use reporting::{LogSink, ProgressReporter, RunReport};
pub use runner::BatchRunner;
pub use table::FeatureTable;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: "Band PSD feature extraction and normalization for EEG recordings".to_string(),
        features: vec![
            "Zero-phase Chebyshev type-II band filters".to_string(),
            "Hemisphere PSD summaries".to_string(),
            "Persisted standard and min-max scalers".to_string(),
            "Stroke summary collation".to_string(),
        ],
    }
}

/// Library version information
#[derive(Debug, Clone, serde::Serialize)]
pub struct VersionInfo {
    /// Library name
    pub name: String,
    /// Version string
    pub version: String,
    /// Description
    pub description: String,
    /// List of features
    pub features: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        let info = version_info();
        assert_eq!(info.name, NAME);
        assert_eq!(info.version, VERSION);
        assert!(!info.features.is_empty());
    }

    #[test]
    fn test_constants() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "eeg-psd");
    }
}
