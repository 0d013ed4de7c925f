// src/processing/filter_bank.rs
//! Per-band zero-phase filter bank

use crate::config::processing_config::{BandEdges, ExtractionConfig};
use crate::error::{PsdErrorBuilder, PsdResult};
use crate::processing::filters::{ChebyshevType2, FilterError, ZeroPhaseFilter};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four analysed EEG bands, in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyBand {
    Delta,
    Theta,
    Alpha,
    Beta,
}

impl FrequencyBand {
    pub const ALL: [FrequencyBand; 4] = [
        FrequencyBand::Delta,
        FrequencyBand::Theta,
        FrequencyBand::Alpha,
        FrequencyBand::Beta,
    ];

    /// Lower-case name used in artifact file names
    pub fn name(&self) -> &'static str {
        match self {
            FrequencyBand::Delta => "delta",
            FrequencyBand::Theta => "theta",
            FrequencyBand::Alpha => "alpha",
            FrequencyBand::Beta => "beta",
        }
    }

    /// Upper-case prefix of the hemisphere feature columns
    pub fn column_prefix(&self) -> &'static str {
        match self {
            FrequencyBand::Delta => "DELTA",
            FrequencyBand::Theta => "THETA",
            FrequencyBand::Alpha => "ALPHA",
            FrequencyBand::Beta => "BETA",
        }
    }

    /// Configured stopband edges of this band
    pub fn edges(&self, config: &ExtractionConfig) -> BandEdges {
        match self {
            FrequencyBand::Delta => config.bands.delta,
            FrequencyBand::Theta => config.bands.theta,
            FrequencyBand::Alpha => config.bands.alpha,
            FrequencyBand::Beta => config.bands.beta,
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for FrequencyBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One value per frequency band
#[derive(Debug, Clone, PartialEq)]
pub struct BandSet<T> {
    values: [T; 4],
}

impl<T> BandSet<T> {
    /// Build by evaluating `f` for every band in canonical order
    pub fn from_fn(mut f: impl FnMut(FrequencyBand) -> T) -> Self {
        Self {
            values: FrequencyBand::ALL.map(&mut f),
        }
    }

    /// Fallible variant of [`BandSet::from_fn`]; stops at the first error
    pub fn try_from_fn<E>(mut f: impl FnMut(FrequencyBand) -> Result<T, E>) -> Result<Self, E> {
        let [delta, theta, alpha, beta] = FrequencyBand::ALL;
        Ok(Self {
            values: [f(delta)?, f(theta)?, f(alpha)?, f(beta)?],
        })
    }

    pub fn get(&self, band: FrequencyBand) -> &T {
        &self.values[band.index()]
    }

    pub fn get_mut(&mut self, band: FrequencyBand) -> &mut T {
        &mut self.values[band.index()]
    }

    /// Iterate `(band, value)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (FrequencyBand, &T)> {
        FrequencyBand::ALL.into_iter().zip(self.values.iter())
    }

    pub fn map<U>(&self, mut f: impl FnMut(FrequencyBand, &T) -> U) -> BandSet<U> {
        BandSet::from_fn(|band| f(band, self.get(band)))
    }
}

/// Chebyshev type-II band-pass filters for every band, designed once
#[derive(Debug, Clone)]
pub struct BandFilterBank {
    filters: BandSet<ZeroPhaseFilter>,
    sample_rate_hz: f64,
}

impl BandFilterBank {
    /// Design all band filters from configuration
    pub fn new(config: &ExtractionConfig) -> PsdResult<Self> {
        let fs = config.sample_rate_hz;
        let order = config.filter.order;
        let attenuation = config.filter.stopband_attenuation_db;
        let window = config.windowing.window_size_samples;

        let filters = BandSet::try_from_fn(|band| {
            let edges = band.edges(config);
            let nyquist = fs / 2.0;
            if !(edges.low_hz > 0.0 && edges.low_hz < edges.high_hz && edges.high_hz < nyquist) {
                return Err(PsdErrorBuilder::new("filter_bank").invalid_value(
                    &format!("{} band", band),
                    format!("{}-{} Hz", edges.low_hz, edges.high_hz),
                    &format!("0 < low < high < {} Hz", nyquist),
                ));
            }

            let design = |edges: BandEdges| -> Result<ZeroPhaseFilter, FilterError> {
                let (low, high) = edges.normalized(fs);
                let coefficients = ChebyshevType2::bandpass(order, attenuation, low, high)?;
                ZeroPhaseFilter::new(coefficients)
            };
            let filter = design(edges).map_err(|e| {
                PsdErrorBuilder::new("filter_bank").configuration(format!("{} band: {}", band, e))
            })?;

            if window <= filter.padlen() {
                return Err(PsdErrorBuilder::new("filter_bank").configuration(format!(
                    "window of {} samples must exceed the {} band pad length {}",
                    window,
                    band,
                    filter.padlen()
                )));
            }

            tracing::debug!(
                band = %band,
                low_hz = edges.low_hz,
                high_hz = edges.high_hz,
                "designed band-pass filter"
            );
            Ok(filter)
        })?;

        Ok(Self {
            filters,
            sample_rate_hz: fs,
        })
    }

    /// Zero-phase filter one frame through `band`
    pub fn apply(&self, band: FrequencyBand, frame: &[f64]) -> Result<Vec<f64>, FilterError> {
        self.filters.get(band).apply(frame)
    }

    pub fn filter(&self, band: FrequencyBand) -> &ZeroPhaseFilter {
        self.filters.get(band)
    }

    pub fn sample_rate_hz(&self) -> f64 {
        self.sample_rate_hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PsdError, Severity};

    fn tone(freq_hz: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| (2.0 * std::f64::consts::PI * freq_hz * i as f64 / 256.0).sin())
            .collect()
    }

    fn rms(x: &[f64]) -> f64 {
        (x.iter().map(|v| v * v).sum::<f64>() / x.len() as f64).sqrt()
    }

    #[test]
    fn test_band_order_and_names() {
        let names: Vec<_> = FrequencyBand::ALL.iter().map(|b| b.name()).collect();
        assert_eq!(names, vec!["delta", "theta", "alpha", "beta"]);
        assert_eq!(FrequencyBand::Alpha.column_prefix(), "ALPHA");
    }

    #[test]
    fn test_band_set_map_and_iter() {
        let set = BandSet::from_fn(|band| band.name().len());
        let doubled = set.map(|_, &n| n * 2);
        assert_eq!(*doubled.get(FrequencyBand::Delta), 10);
        assert_eq!(*doubled.get(FrequencyBand::Beta), 8);

        let bands: Vec<_> = set.iter().map(|(band, _)| band).collect();
        assert_eq!(bands, FrequencyBand::ALL.to_vec());
    }

    #[test]
    fn test_filter_bank_creation() {
        let bank = BandFilterBank::new(&ExtractionConfig::default()).unwrap();
        for band in FrequencyBand::ALL {
            assert_eq!(bank.filter(band).padlen(), 15);
        }
        assert_eq!(bank.sample_rate_hz(), 256.0);
    }

    #[test]
    fn test_filter_bank_selects_band() {
        let bank = BandFilterBank::new(&ExtractionConfig::default()).unwrap();
        let input = tone(10.0, 512);

        let alpha = bank.apply(FrequencyBand::Alpha, &input).unwrap();
        let beta = bank.apply(FrequencyBand::Beta, &input).unwrap();
        assert_eq!(alpha.len(), input.len());

        // the centre of the output avoids edge transients
        let centre = 128..384;
        assert!(rms(&alpha[centre.clone()]) > 10.0 * rms(&beta[centre]));
    }

    /// Frequency of maximum gain inside the band edges, on a 0.01 Hz grid
    fn passband_peak_hz(bank: &BandFilterBank, band: FrequencyBand) -> f64 {
        let edges = band.edges(&ExtractionConfig::default());
        let coefficients = bank.filter(band).coefficients();
        let steps = ((edges.high_hz - edges.low_hz) / 0.01) as usize;
        (0..=steps)
            .map(|i| edges.low_hz + i as f64 * 0.01)
            .map(|f| (f, coefficients.magnitude_at(f / 256.0)))
            .fold((edges.low_hz, f64::MIN), |best, (f, m)| if m > best.1 { (f, m) } else { best })
            .0
    }

    #[test]
    fn test_zero_phase_keeps_peak_of_symmetric_pulse() {
        let bank = BandFilterBank::new(&ExtractionConfig::default()).unwrap();
        let centre = 1024usize;

        for band in FrequencyBand::ALL {
            let carrier_hz = passband_peak_hz(&bank, band);
            let pulse: Vec<f64> = (0..2048)
                .map(|n| {
                    let t = n as f64 - centre as f64;
                    (-0.5 * (t / 128.0).powi(2)).exp()
                        * (2.0 * std::f64::consts::PI * carrier_hz * t / 256.0).cos()
                })
                .collect();

            let filtered = bank.apply(band, &pulse).unwrap();
            let peak = filtered
                .iter()
                .enumerate()
                .fold((0, f64::MIN), |best, (i, &v)| if v.abs() > best.1 { (i, v.abs()) } else { best });
            assert_eq!(peak.0, centre, "{} band peaked at {}", band, peak.0);
        }
    }

    #[test]
    fn test_cutoff_above_nyquist_is_fatal() {
        let mut config = ExtractionConfig::default();
        config.bands.theta.high_hz = 200.0;

        let err = BandFilterBank::new(&config).unwrap_err();
        assert_eq!(err.severity(), Severity::Fatal);
        match err {
            PsdError::Configuration { component, reason } => {
                assert_eq!(component, "filter_bank");
                assert!(reason.contains("theta"));
            }
            other => panic!("Expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_short_window_is_fatal() {
        let mut config = ExtractionConfig::default();
        config.windowing.window_size_samples = 15;
        assert!(BandFilterBank::new(&config).unwrap_err().is_fatal());
    }
}
