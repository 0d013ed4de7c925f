// src/config/processing_config.rs
//! Feature extraction and normalization configuration structures

use serde::{Deserialize, Serialize};
use crate::config::constants::*;

/// Per-recording feature extraction configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ExtractionConfig {
    #[serde(default = "defaults::sample_rate_hz")]
    pub sample_rate_hz: f64,

    /// Skip recordings whose file name carries no emotion class
    #[serde(default = "defaults::require_class")]
    pub require_class: bool,

    /// Spread channel work over the rayon pool
    #[serde(default)]
    pub parallel_channels: bool,

    #[serde(default)]
    pub windowing: WindowingConfig,

    #[serde(default)]
    pub spectrum: SpectrumConfig,

    #[serde(default)]
    pub filter: FilterDesignConfig,

    #[serde(default)]
    pub bands: BandCutoffs,
}

/// Frame segmentation configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WindowingConfig {
    #[serde(default = "defaults::window_size_samples")]
    pub window_size_samples: usize,
    #[serde(default = "defaults::overlap_percent")]
    pub overlap_percent: f64,
}

/// Spectral peak estimation configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SpectrumConfig {
    /// Transform length; the sample rate (rounded) when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fft_size: Option<usize>,
    #[serde(default = "defaults::retained_bins")]
    pub retained_bins: usize,
}

/// Chebyshev type-II design parameters shared by every band
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FilterDesignConfig {
    #[serde(default = "defaults::filter_order")]
    pub order: usize,
    #[serde(default = "defaults::stopband_attenuation_db")]
    pub stopband_attenuation_db: f64,
}

/// Band edge pair in Hz
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct BandEdges {
    pub low_hz: f64,
    pub high_hz: f64,
}

impl BandEdges {
    pub const fn new(low_hz: f64, high_hz: f64) -> Self {
        Self { low_hz, high_hz }
    }

    /// Edges normalized to Nyquist (`Fs / 2`)
    pub fn normalized(&self, sample_rate_hz: f64) -> (f64, f64) {
        let nyquist = sample_rate_hz / 2.0;
        (self.low_hz / nyquist, self.high_hz / nyquist)
    }
}

/// Cutoffs for the four canonical EEG bands
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct BandCutoffs {
    pub delta: BandEdges,
    pub theta: BandEdges,
    pub alpha: BandEdges,
    pub beta: BandEdges,
}

/// Dataset normalization configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NormalizationConfig {
    #[serde(default = "defaults::scaler")]
    pub scaler: ScalerKind,
    /// Context name used for the persisted training scaler
    #[serde(default = "defaults::train_context")]
    pub train_context: String,
}

/// Scaling transform variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalerKind {
    /// Zero mean, unit (population) variance
    Standard,
    /// Linear map of each column onto [0, 1]
    MinMax,
}

impl std::str::FromStr for ScalerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(ScalerKind::Standard),
            "minmax" | "min-max" | "min_max" => Ok(ScalerKind::MinMax),
            other => Err(format!("unknown scaler '{}' (expected standard or minmax)", other)),
        }
    }
}

impl ExtractionConfig {
    /// Effective transform length
    pub fn fft_size(&self) -> usize {
        self.spectrum
            .fft_size
            .unwrap_or_else(|| self.sample_rate_hz.round() as usize)
    }

    /// Hop between consecutive frame starts
    pub fn step_size(&self) -> usize {
        let window = self.windowing.window_size_samples as f64;
        (window - window * self.windowing.overlap_percent / 100.0).ceil() as usize
    }
}

mod defaults {
    use super::*;

    pub fn sample_rate_hz() -> f64 { signal::DEFAULT_SAMPLING_RATE_HZ }
    pub fn require_class() -> bool { true }
    pub fn window_size_samples() -> usize { windowing::DEFAULT_WINDOW_SIZE_SAMPLES }
    pub fn overlap_percent() -> f64 { windowing::DEFAULT_OVERLAP_PERCENT }
    pub fn retained_bins() -> usize { spectrum::DEFAULT_RETAINED_BINS }
    pub fn filter_order() -> usize { filters::DEFAULT_FILTER_ORDER }
    pub fn stopband_attenuation_db() -> f64 { filters::DEFAULT_STOPBAND_ATTENUATION_DB }
    pub fn scaler() -> ScalerKind { ScalerKind::Standard }
    pub fn train_context() -> String { paths::DEFAULT_TRAIN_CONTEXT.to_string() }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: defaults::sample_rate_hz(),
            require_class: defaults::require_class(),
            parallel_channels: false,
            windowing: WindowingConfig::default(),
            spectrum: SpectrumConfig::default(),
            filter: FilterDesignConfig::default(),
            bands: BandCutoffs::default(),
        }
    }
}

impl Default for WindowingConfig {
    fn default() -> Self {
        Self {
            window_size_samples: defaults::window_size_samples(),
            overlap_percent: defaults::overlap_percent(),
        }
    }
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            fft_size: None,
            retained_bins: defaults::retained_bins(),
        }
    }
}

impl Default for FilterDesignConfig {
    fn default() -> Self {
        Self {
            order: defaults::filter_order(),
            stopband_attenuation_db: defaults::stopband_attenuation_db(),
        }
    }
}

impl Default for BandCutoffs {
    fn default() -> Self {
        let edges = |(low, high): (f64, f64)| BandEdges::new(low, high);
        Self {
            delta: edges(filters::DELTA_BAND_HZ),
            theta: edges(filters::THETA_BAND_HZ),
            alpha: edges(filters::ALPHA_BAND_HZ),
            beta: edges(filters::BETA_BAND_HZ),
        }
    }
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            scaler: defaults::scaler(),
            train_context: defaults::train_context(),
        }
    }
}
