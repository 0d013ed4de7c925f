// src/processing/filters/mod.rs
//! Digital IIR filter design and zero-phase application

pub mod chebyshev;
pub mod iir;

pub use chebyshev::*;
pub use iir::*;

/// Transfer function coefficients, `a[0]` normalized to 1
#[derive(Debug, Clone, PartialEq)]
pub struct IirCoefficients {
    pub b: Vec<f64>, // Numerator coefficients
    pub a: Vec<f64>, // Denominator coefficients
}

impl IirCoefficients {
    /// Build from raw coefficients, normalizing by `a[0]`
    pub fn new(b: Vec<f64>, a: Vec<f64>) -> Result<Self, FilterError> {
        let leading = a
            .iter()
            .position(|&c| c != 0.0)
            .ok_or_else(|| FilterError::InvalidCoefficients("denominator is all zeros".to_string()))?;
        let a = &a[leading..];
        if b.is_empty() {
            return Err(FilterError::InvalidCoefficients("numerator is empty".to_string()));
        }
        if b.iter().chain(a.iter()).any(|c| !c.is_finite()) {
            return Err(FilterError::InvalidCoefficients("non-finite coefficient".to_string()));
        }

        let a0 = a[0];
        Ok(Self {
            b: b.iter().map(|&c| c / a0).collect(),
            a: a.iter().map(|&c| c / a0).collect(),
        })
    }

    /// Number of taps of the longer polynomial
    pub fn len(&self) -> usize {
        self.a.len().max(self.b.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Filter order (number of delay elements)
    pub fn order(&self) -> usize {
        self.len().saturating_sub(1)
    }

    /// Magnitude response at a normalized frequency (cycles/sample, 0..0.5)
    pub fn magnitude_at(&self, normalized_freq: f64) -> f64 {
        use rustfft::num_complex::Complex;
        let w = 2.0 * std::f64::consts::PI * normalized_freq;
        let z_inv = Complex::from_polar(1.0, -w);
        let eval = |coeffs: &[f64]| {
            coeffs
                .iter()
                .rev()
                .fold(Complex::new(0.0, 0.0), |acc, &c| acc * z_inv + c)
        };
        (eval(&self.b) / eval(&self.a)).norm()
    }
}

/// Common filter error types
#[derive(Debug, Clone, PartialEq)]
pub enum FilterError {
    InvalidParameters(String),
    InvalidCoefficients(String),
    InputTooShort { len: usize, padlen: usize },
}

impl std::fmt::Display for FilterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterError::InvalidParameters(msg) => write!(f, "Invalid parameters: {}", msg),
            FilterError::InvalidCoefficients(msg) => write!(f, "Invalid coefficients: {}", msg),
            FilterError::InputTooShort { len, padlen } => write!(
                f,
                "Input of {} samples must be longer than the pad length {}",
                len, padlen
            ),
        }
    }
}

impl std::error::Error for FilterError {}
