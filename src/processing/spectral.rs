// src/processing/spectral.rs
//! Peak spectral power of a frame

use crate::error::{PsdErrorBuilder, PsdResult};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Maximum `|X[k]|^2` over the leading bins of a fixed-size FFT
#[derive(Clone)]
pub struct SpectralPowerEstimator {
    fft: Arc<dyn Fft<f64>>,
    fft_size: usize,
    retained_bins: usize,
}

impl std::fmt::Debug for SpectralPowerEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectralPowerEstimator")
            .field("fft_size", &self.fft_size)
            .field("retained_bins", &self.retained_bins)
            .finish()
    }
}

impl SpectralPowerEstimator {
    /// Plan a forward FFT of `fft_size` keeping the first `retained_bins` bins
    pub fn new(fft_size: usize, retained_bins: usize) -> PsdResult<Self> {
        if fft_size == 0 {
            return Err(PsdErrorBuilder::new("spectral").invalid_value(
                "fft_size",
                fft_size,
                "a positive transform length",
            ));
        }
        if retained_bins == 0 || retained_bins > fft_size {
            return Err(PsdErrorBuilder::new("spectral").invalid_value(
                "retained_bins",
                retained_bins,
                &format!("1..={}", fft_size),
            ));
        }

        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(fft_size);

        Ok(Self {
            fft,
            fft_size,
            retained_bins,
        })
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn retained_bins(&self) -> usize {
        self.retained_bins
    }

    /// Peak power of the frame
    pub fn peak_power(&self, frame: &[f64]) -> f64 {
        self.peak_bin(frame).1
    }

    /// `(bin, power)` of the peak; the lowest bin wins ties
    pub fn peak_bin(&self, frame: &[f64]) -> (usize, f64) {
        let mut buffer: Vec<Complex<f64>> = frame
            .iter()
            .take(self.fft_size)
            .map(|&v| Complex::new(v, 0.0))
            .collect();
        buffer.resize(self.fft_size, Complex::new(0.0, 0.0));
        self.fft.process(&mut buffer);

        buffer
            .iter()
            .take(self.retained_bins)
            .map(|c| c.norm_sqr())
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (bin, power)| {
                if power > best.1 {
                    (bin, power)
                } else {
                    best
                }
            })
    }
}
