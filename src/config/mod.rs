// src/config/mod.rs
//! Configuration management for extraction and normalization runs

pub mod constants;
pub mod loader;
pub mod processing_config;

pub use constants::*;
pub use loader::{ConfigError, ConfigLoader};
pub use processing_config::*;

use serde::{Deserialize, Serialize};

/// Complete run configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct PsdConfig {
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub normalization: NormalizationConfig,
}

impl PsdConfig {
    /// Validate configuration consistency
    pub fn validate_consistency(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let extraction = &self.extraction;
        let fs = extraction.sample_rate_hz;

        if !fs.is_finite()
            || !(signal::MIN_SAMPLING_RATE_HZ..=signal::MAX_SAMPLING_RATE_HZ).contains(&fs)
        {
            errors.push(format!(
                "Sample rate ({} Hz) must be within {}-{} Hz",
                fs,
                signal::MIN_SAMPLING_RATE_HZ,
                signal::MAX_SAMPLING_RATE_HZ
            ));
        }

        let window = extraction.windowing.window_size_samples;
        let overlap = extraction.windowing.overlap_percent;
        if window == 0 {
            errors.push("Window size must be at least one sample".to_string());
        }
        if !(0.0..100.0).contains(&overlap) {
            errors.push(format!("Overlap ({}%) must be in [0, 100)", overlap));
        } else if window > 0 && extraction.step_size() == 0 {
            errors.push(format!(
                "Window of {} samples with {}% overlap gives a zero step",
                window, overlap
            ));
        }

        let fft_size = extraction.fft_size();
        let bins = extraction.spectrum.retained_bins;
        if fft_size == 0 {
            errors.push("FFT size must be positive".to_string());
        }
        if bins == 0 || bins > fft_size {
            errors.push(format!(
                "Retained bins ({}) must be within 1..={} (FFT size)",
                bins, fft_size
            ));
        }

        let order = extraction.filter.order;
        if !(filters::MIN_FILTER_ORDER..=filters::MAX_FILTER_ORDER).contains(&order) {
            errors.push(format!(
                "Filter order ({}) must be {}-{}",
                order,
                filters::MIN_FILTER_ORDER,
                filters::MAX_FILTER_ORDER
            ));
        } else {
            // forward-backward pad length for a band-pass of this order
            let padlen = 3 * (2 * order + 1);
            if window <= padlen {
                errors.push(format!(
                    "Window size ({}) must exceed the zero-phase pad length ({})",
                    window, padlen
                ));
            }
        }

        let attenuation = extraction.filter.stopband_attenuation_db;
        if !(attenuation.is_finite() && attenuation > 0.0) {
            errors.push(format!(
                "Stopband attenuation ({} dB) must be positive",
                attenuation
            ));
        }

        let nyquist = fs / 2.0;
        for (name, edges) in [
            ("delta", extraction.bands.delta),
            ("theta", extraction.bands.theta),
            ("alpha", extraction.bands.alpha),
            ("beta", extraction.bands.beta),
        ] {
            if !(edges.low_hz > 0.0 && edges.low_hz < edges.high_hz && edges.high_hz < nyquist) {
                errors.push(format!(
                    "Band {} ({}-{} Hz) must satisfy 0 < low < high < Nyquist ({} Hz)",
                    name, edges.low_hz, edges.high_hz, nyquist
                ));
            }
        }

        if self.normalization.train_context.trim().is_empty() {
            errors.push("Training scaler context must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Configuration summary for display/logging
    pub fn get_summary(&self) -> ConfigSummary {
        ConfigSummary {
            sample_rate_hz: self.extraction.sample_rate_hz,
            window_size: self.extraction.windowing.window_size_samples,
            step_size: self.extraction.step_size(),
            fft_size: self.extraction.fft_size(),
            retained_bins: self.extraction.spectrum.retained_bins,
            scaler: self.normalization.scaler,
        }
    }
}

/// Configuration summary for display/logging
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub sample_rate_hz: f64,
    pub window_size: usize,
    pub step_size: usize,
    pub fft_size: usize,
    pub retained_bins: usize,
    pub scaler: ScalerKind,
}
