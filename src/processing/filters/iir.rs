// src/processing/filters/iir.rs
//! IIR recursion and forward-backward (zero-phase) application

use super::{FilterError, IirCoefficients};

/// IIR filter in direct form II transposed
#[derive(Debug, Clone)]
pub struct IirFilter {
    coefficients: IirCoefficients,
    state: Vec<f64>,
}

impl IirFilter {
    /// Create filter from coefficients with zeroed state
    pub fn new(coefficients: IirCoefficients) -> Self {
        let n = coefficients.len();
        Self {
            coefficients: Self::padded(coefficients, n),
            state: vec![0.0; n.saturating_sub(1)],
        }
    }

    /// Replace the delay-line state
    pub fn set_state(&mut self, state: &[f64]) {
        self.state.copy_from_slice(state);
    }

    /// Process single sample
    pub fn process_sample(&mut self, input: f64) -> f64 {
        let b = &self.coefficients.b;
        let a = &self.coefficients.a;
        let n = self.state.len();

        if n == 0 {
            return b[0] * input;
        }

        let output = b[0] * input + self.state[0];
        for i in 0..n - 1 {
            self.state[i] = b[i + 1] * input + self.state[i + 1] - a[i + 1] * output;
        }
        self.state[n - 1] = b[n] * input - a[n] * output;

        output
    }

    /// Filter a whole slice, continuing from the current state
    pub fn process(&mut self, input: &[f64]) -> Vec<f64> {
        input.iter().map(|&x| self.process_sample(x)).collect()
    }

    /// Reset filter state
    pub fn reset(&mut self) {
        self.state.fill(0.0);
    }

    pub fn coefficients(&self) -> &IirCoefficients {
        &self.coefficients
    }

    /// Pad `b` and `a` with trailing zeros to a common length
    fn padded(mut coefficients: IirCoefficients, n: usize) -> IirCoefficients {
        coefficients.b.resize(n, 0.0);
        coefficients.a.resize(n, 0.0);
        coefficients
    }
}

/// Steady-state delay-line values for a unit step input
///
/// Solves `(I - A^T) zi = b[1..] - a[1..] * b[0]`, where `A` is the
/// companion matrix of the denominator.
pub fn steady_state_initial_conditions(coefficients: &IirCoefficients) -> Result<Vec<f64>, FilterError> {
    let n = coefficients.len();
    if n < 2 {
        return Ok(Vec::new());
    }
    let mut b = coefficients.b.clone();
    let mut a = coefficients.a.clone();
    b.resize(n, 0.0);
    a.resize(n, 0.0);

    let size = n - 1;
    let mut matrix = vec![vec![0.0; size]; size];
    for (row, values) in matrix.iter_mut().enumerate() {
        values[row] = 1.0;
        values[0] += a[row + 1];
        if row + 1 < size {
            values[row + 1] -= 1.0;
        }
    }
    let rhs: Vec<f64> = (1..n).map(|i| b[i] - a[i] * b[0]).collect();

    solve_linear(matrix, rhs)
}

/// Gaussian elimination with partial pivoting
fn solve_linear(mut matrix: Vec<Vec<f64>>, mut rhs: Vec<f64>) -> Result<Vec<f64>, FilterError> {
    let n = rhs.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| matrix[i][col].abs().total_cmp(&matrix[j][col].abs()))
            .unwrap_or(col);
        if matrix[pivot][col].abs() < f64::EPSILON {
            return Err(FilterError::InvalidCoefficients(
                "singular system for initial conditions".to_string(),
            ));
        }
        matrix.swap(col, pivot);
        rhs.swap(col, pivot);

        for row in col + 1..n {
            let factor = matrix[row][col] / matrix[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                matrix[row][k] -= factor * matrix[col][k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut solution = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| matrix[row][k] * solution[k]).sum();
        solution[row] = (rhs[row] - tail) / matrix[row][row];
    }
    Ok(solution)
}

/// Forward-backward filter with odd-extension padding
///
/// The output has no phase shift relative to the input. Each pass starts
/// from the steady-state initial conditions scaled by its first sample, so
/// edge transients stay small.
#[derive(Debug, Clone)]
pub struct ZeroPhaseFilter {
    coefficients: IirCoefficients,
    initial_conditions: Vec<f64>,
    padlen: usize,
}

impl ZeroPhaseFilter {
    pub fn new(coefficients: IirCoefficients) -> Result<Self, FilterError> {
        let initial_conditions = steady_state_initial_conditions(&coefficients)?;
        let padlen = 3 * coefficients.a.len().max(coefficients.b.len());
        Ok(Self {
            coefficients,
            initial_conditions,
            padlen,
        })
    }

    /// Samples of odd extension added at each end
    pub fn padlen(&self) -> usize {
        self.padlen
    }

    /// Inputs must be strictly longer than this
    pub fn min_input_len(&self) -> usize {
        self.padlen + 1
    }

    pub fn coefficients(&self) -> &IirCoefficients {
        &self.coefficients
    }

    /// Filter `input` forwards then backwards
    pub fn apply(&self, input: &[f64]) -> Result<Vec<f64>, FilterError> {
        if input.len() <= self.padlen {
            return Err(FilterError::InputTooShort {
                len: input.len(),
                padlen: self.padlen,
            });
        }

        let extended = self.odd_extension(input);
        let mut filter = IirFilter::new(self.coefficients.clone());

        filter.set_state(&self.scaled_conditions(extended[0]));
        let mut forward = filter.process(&extended);

        forward.reverse();
        filter.set_state(&self.scaled_conditions(forward[0]));
        let mut backward = filter.process(&forward);
        backward.reverse();

        Ok(backward[self.padlen..backward.len() - self.padlen].to_vec())
    }

    fn scaled_conditions(&self, scale: f64) -> Vec<f64> {
        self.initial_conditions.iter().map(|&zi| zi * scale).collect()
    }

    /// Point-reflect `padlen` samples about each end point
    fn odd_extension(&self, input: &[f64]) -> Vec<f64> {
        let n = input.len();
        let first = input[0];
        let last = input[n - 1];

        let mut extended = Vec::with_capacity(n + 2 * self.padlen);
        extended.extend((1..=self.padlen).rev().map(|i| 2.0 * first - input[i]));
        extended.extend_from_slice(input);
        extended.extend((1..=self.padlen).map(|i| 2.0 * last - input[n - 1 - i]));
        extended
    }
}
