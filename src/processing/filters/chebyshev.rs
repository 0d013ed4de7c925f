// src/processing/filters/chebyshev.rs
//! Chebyshev type-II IIR design
//!
//! Design runs in zero/pole/gain form: analog prototype, frequency transform,
//! bilinear transform with pre-warping, then expansion into `b`/`a`
//! polynomials. Critical frequencies are normalized to Nyquist, so a valid
//! band-pass pair satisfies `0 < low < high < 1`. For a type-II filter they
//! mark the edges where the stopband attenuation is first reached.

use super::{FilterError, IirCoefficients};
use rustfft::num_complex::Complex;
use std::f64::consts::PI;

type C64 = Complex<f64>;

/// Digital sample rate assumed by the normalized design
const DESIGN_FS: f64 = 2.0;

/// Zero/pole/gain representation
#[derive(Debug, Clone)]
struct Zpk {
    zeros: Vec<C64>,
    poles: Vec<C64>,
    gain: f64,
}

/// Chebyshev type-II coefficient calculator
pub struct ChebyshevType2;

impl ChebyshevType2 {
    /// Band-pass design from Nyquist-normalized stopband edges
    pub fn bandpass(
        order: usize,
        stopband_attenuation_db: f64,
        low: f64,
        high: f64,
    ) -> Result<IirCoefficients, FilterError> {
        Self::validate_order(order, stopband_attenuation_db)?;
        for edge in [low, high] {
            if !(edge.is_finite() && edge > 0.0 && edge < 1.0) {
                return Err(FilterError::InvalidParameters(format!(
                    "critical frequency {} must satisfy 0 < Wn < 1",
                    edge
                )));
            }
        }
        if low >= high {
            return Err(FilterError::InvalidParameters(format!(
                "low edge {} must be below high edge {}",
                low, high
            )));
        }

        let warped_low = Self::prewarp(low);
        let warped_high = Self::prewarp(high);
        let bandwidth = warped_high - warped_low;
        let center = (warped_low * warped_high).sqrt();

        let prototype = Self::analog_prototype(order, stopband_attenuation_db);
        let analog = Self::lowpass_to_bandpass(prototype, center, bandwidth);
        Self::to_coefficients(Self::bilinear(analog))
    }

    fn validate_order(order: usize, stopband_attenuation_db: f64) -> Result<(), FilterError> {
        if order == 0 || order > 8 {
            return Err(FilterError::InvalidParameters("Order must be 1-8".to_string()));
        }
        if !(stopband_attenuation_db.is_finite() && stopband_attenuation_db > 0.0) {
            return Err(FilterError::InvalidParameters(
                "Stopband attenuation must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn prewarp(normalized: f64) -> f64 {
        2.0 * DESIGN_FS * (PI * normalized / DESIGN_FS).tan()
    }

    /// Normalized analog prototype with stopband edge at 1 rad/s
    fn analog_prototype(order: usize, stopband_attenuation_db: f64) -> Zpk {
        let n = order as i64;
        let de = 1.0 / (10f64.powf(0.1 * stopband_attenuation_db) - 1.0).sqrt();
        let mu = (1.0 / de).asinh() / order as f64;

        // Odd orders have no zero for m = 0 (it would sit at infinity)
        let m: Vec<i64> = if order % 2 == 1 {
            (-n + 1..0).step_by(2).chain((2..n).step_by(2)).collect()
        } else {
            (-n + 1..n).step_by(2).collect()
        };

        let zeros: Vec<C64> = m
            .iter()
            .map(|&mi| {
                let s = (mi as f64 * PI / (2.0 * order as f64)).sin();
                -(C64::new(0.0, 1.0) / s).conj()
            })
            .collect();

        let poles: Vec<C64> = (-n + 1..n)
            .step_by(2)
            .map(|k| {
                let p = -C64::from_polar(1.0, PI * k as f64 / (2.0 * order as f64));
                let warped = C64::new(mu.sinh() * p.re, mu.cosh() * p.im);
                C64::new(1.0, 0.0) / warped
            })
            .collect();

        let num = product(poles.iter().map(|&p| -p));
        let den = product(zeros.iter().map(|&z| -z));
        let gain = (num / den).re;

        Zpk { zeros, poles, gain }
    }

    fn lowpass_to_bandpass(zpk: Zpk, center: f64, bandwidth: f64) -> Zpk {
        let degree = zpk.poles.len() - zpk.zeros.len();
        let center_sq = C64::new(center * center, 0.0);

        let split = |roots: &[C64]| -> Vec<C64> {
            let scaled: Vec<C64> = roots.iter().map(|&r| r * (bandwidth / 2.0)).collect();
            let upper = scaled.iter().map(|&r| r + (r * r - center_sq).sqrt());
            let lower = scaled.iter().map(|&r| r - (r * r - center_sq).sqrt());
            upper.chain(lower).collect()
        };

        let mut zeros = split(&zpk.zeros);
        zeros.extend(std::iter::repeat(C64::new(0.0, 0.0)).take(degree));
        let poles = split(&zpk.poles);

        Zpk {
            zeros,
            poles,
            gain: zpk.gain * bandwidth.powi(degree as i32),
        }
    }

    fn bilinear(zpk: Zpk) -> Zpk {
        let degree = zpk.poles.len() - zpk.zeros.len();
        let fs2 = C64::new(2.0 * DESIGN_FS, 0.0);

        let mut zeros: Vec<C64> = zpk.zeros.iter().map(|&z| (fs2 + z) / (fs2 - z)).collect();
        zeros.extend(std::iter::repeat(C64::new(-1.0, 0.0)).take(degree));
        let poles: Vec<C64> = zpk.poles.iter().map(|&p| (fs2 + p) / (fs2 - p)).collect();

        let num = product(zpk.zeros.iter().map(|&z| fs2 - z));
        let den = product(zpk.poles.iter().map(|&p| fs2 - p));
        let gain = zpk.gain * (num / den).re;

        Zpk { zeros, poles, gain }
    }

    fn to_coefficients(zpk: Zpk) -> Result<IirCoefficients, FilterError> {
        let b: Vec<f64> = poly(&zpk.zeros).iter().map(|c| c.re * zpk.gain).collect();
        let a: Vec<f64> = poly(&zpk.poles).iter().map(|c| c.re).collect();
        IirCoefficients::new(b, a)
    }
}

/// Monic polynomial coefficients (highest power first) with the given roots
fn poly(roots: &[C64]) -> Vec<C64> {
    let mut coeffs = vec![C64::new(1.0, 0.0)];
    for &root in roots {
        let mut next = vec![C64::new(0.0, 0.0); coeffs.len() + 1];
        for (i, &c) in coeffs.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c * root;
        }
        coeffs = next;
    }
    coeffs
}

fn product(values: impl Iterator<Item = C64>) -> C64 {
    values.fold(C64::new(1.0, 0.0), |acc, v| acc * v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attenuation_floor(db: f64) -> f64 {
        10f64.powf(-db / 20.0)
    }

    #[test]
    fn test_bandpass_shape() {
        let coeffs = ChebyshevType2::bandpass(2, 40.0, 8.0 / 128.0, 12.0 / 128.0).unwrap();
        assert_eq!(coeffs.b.len(), 5);
        assert_eq!(coeffs.a.len(), 5);
        assert_eq!(coeffs.a[0], 1.0);
        // symmetric numerator
        assert!((coeffs.b[0] - coeffs.b[4]).abs() < 1e-12);
        assert!((coeffs.b[1] - coeffs.b[3]).abs() < 1e-12);
    }

    #[test]
    fn test_bandpass_matches_reference_design() {
        let coeffs = ChebyshevType2::bandpass(2, 40.0, 8.0 / 128.0, 12.0 / 128.0).unwrap();
        let expected_b = [0.00995051, -0.0384701, 0.05707203, -0.0384701, 0.00995051];
        let expected_a = [1.0, -3.865814, 5.716667, -3.828205, 0.980638];
        for (got, want) in coeffs.b.iter().zip(expected_b) {
            assert!((got - want).abs() < 1e-7, "b: {} vs {}", got, want);
        }
        for (got, want) in coeffs.a.iter().zip(expected_a) {
            assert!((got - want).abs() < 1e-5, "a: {} vs {}", got, want);
        }
    }

    #[test]
    fn test_bandpass_response() {
        let fs = 256.0;
        let floor = attenuation_floor(40.0);
        for (low, high) in [(0.5, 4.0), (4.0, 7.0), (8.0, 12.0), (13.0, 30.0)] {
            let coeffs = ChebyshevType2::bandpass(2, 40.0, low / 128.0, high / 128.0).unwrap();
            let center = (low * high).sqrt();

            // unit gain at the geometric centre of the warped band
            assert!(coeffs.magnitude_at(center / fs) > 0.99, "band {}-{}", low, high);
            // stopband never rises above the attenuation floor
            for f in [0.0, low, high, 60.0, 100.0, 128.0] {
                assert!(
                    coeffs.magnitude_at(f / fs) <= floor * 1.001,
                    "band {}-{} at {} Hz",
                    low,
                    high,
                    f
                );
            }
        }
    }

    #[test]
    fn test_odd_order_bandpass() {
        let coeffs = ChebyshevType2::bandpass(3, 40.0, 0.1, 0.3).unwrap();
        assert_eq!(coeffs.a.len(), 7);
        assert!(coeffs.magnitude_at(0.5) <= attenuation_floor(40.0) * 1.001);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(ChebyshevType2::bandpass(2, 40.0, 0.0, 0.5).is_err());
        assert!(ChebyshevType2::bandpass(2, 40.0, 0.2, 1.0).is_err());
        assert!(ChebyshevType2::bandpass(2, 40.0, 0.4, 0.2).is_err());
        assert!(ChebyshevType2::bandpass(0, 40.0, 0.1, 0.2).is_err());
        assert!(ChebyshevType2::bandpass(2, -3.0, 0.1, 0.2).is_err());
        assert!(ChebyshevType2::bandpass(2, 40.0, f64::NAN, 0.2).is_err());
    }
}
