//! Least-squares polynomial fitting over trading-day ordinals.
//!
//! The series is indexed `0..n-1` and the ordinal is rescaled to `[0, 1]`
//! before the normal equations are built, which keeps the system well
//! conditioned for a few years of daily bars. Solving is plain Gaussian
//! elimination with partial pivoting, so the same input always produces the
//! same coefficients.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegressionError {
    #[error("degree {degree} needs at least {required} points, got {actual}")]
    TooFewPoints {
        degree: usize,
        required: usize,
        actual: usize,
    },
    #[error("non-finite value at ordinal {0}")]
    NonFinite(usize),
    #[error("normal equations are singular")]
    Singular,
}

/// A fitted polynomial `c0 + c1*u + c2*u^2 + ...` with `u = ordinal / scale`.
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialFit {
    coefficients: Vec<f64>,
    scale: f64,
}

impl PolynomialFit {
    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Coefficients in ascending powers of the rescaled ordinal.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Value of the polynomial at a (possibly future) ordinal.
    pub fn evaluate(&self, ordinal: f64) -> f64 {
        let u = ordinal / self.scale;
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, c| acc * u + c)
    }

    /// Fitted values for ordinals `0..n`.
    pub fn fitted(&self, n: usize) -> Vec<f64> {
        (0..n).map(|i| self.evaluate(i as f64)).collect()
    }
}

/// Fit `values[i] ≈ p(i)` for a polynomial of the given degree.
pub fn fit_polynomial(values: &[f64], degree: usize) -> Result<PolynomialFit, RegressionError> {
    let n = values.len();
    let size = degree + 1;
    if n < size {
        return Err(RegressionError::TooFewPoints {
            degree,
            required: size,
            actual: n,
        });
    }
    if let Some(idx) = values.iter().position(|v| !v.is_finite()) {
        return Err(RegressionError::NonFinite(idx));
    }

    let scale = if n > 1 { (n - 1) as f64 } else { 1.0 };

    // Sums of u^k for k in 0..=2*degree and of u^k * y for k in 0..=degree.
    let mut power_sums = vec![0.0; 2 * degree + 1];
    let mut rhs = vec![0.0; size];
    for (i, &y) in values.iter().enumerate() {
        let u = i as f64 / scale;
        let mut power = 1.0;
        for (k, sum) in power_sums.iter_mut().enumerate() {
            *sum += power;
            if k < size {
                rhs[k] += power * y;
            }
            power *= u;
        }
    }

    let normal: Vec<Vec<f64>> = (0..size)
        .map(|row| (0..size).map(|col| power_sums[row + col]).collect())
        .collect();

    let coefficients = solve_linear_system(normal, rhs)?;
    Ok(PolynomialFit { coefficients, scale })
}

fn solve_linear_system(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>, RegressionError> {
    let n = b.len();
    let magnitude = a.iter().flatten().fold(0.0_f64, |m, v| m.max(v.abs()));
    if magnitude == 0.0 {
        return Err(RegressionError::Singular);
    }
    let tolerance = magnitude * 1e-12;

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot_row][col].abs() <= tolerance {
            return Err(RegressionError::Singular);
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        let pivot = a[col].clone();
        let pivot_rhs = b[col];
        for row in (col + 1)..n {
            let factor = a[row][col] / pivot[col];
            for (k, value) in a[row].iter_mut().enumerate().skip(col) {
                *value -= factor * pivot[k];
            }
            b[row] -= factor * pivot_rhs;
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }

    if x.iter().any(|v| !v.is_finite()) {
        return Err(RegressionError::Singular);
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_fit_recovers_line() {
        let values: Vec<f64> = (0..20).map(|i| 100.0 + 2.0 * i as f64).collect();
        let fit = fit_polynomial(&values, 1).unwrap();

        assert_eq!(fit.degree(), 1);
        assert!((fit.evaluate(0.0) - 100.0).abs() < 1e-9);
        assert!((fit.evaluate(20.0) - 140.0).abs() < 1e-9);
        for (fitted, actual) in fit.fitted(values.len()).iter().zip(&values) {
            assert!((fitted - actual).abs() < 1e-9);
        }
    }

    #[test]
    fn test_quadratic_fit_recovers_parabola() {
        let values: Vec<f64> = (0..30)
            .map(|i| {
                let x = i as f64;
                50.0 - 1.5 * x + 0.25 * x * x
            })
            .collect();
        let fit = fit_polynomial(&values, 2).unwrap();

        assert!((fit.evaluate(30.0) - (50.0 - 45.0 + 225.0)).abs() < 1e-6);
        assert!((fit.evaluate(12.0) - values[12]).abs() < 1e-8);
    }

    #[test]
    fn test_quadratic_on_linear_data_has_no_curvature() {
        let values: Vec<f64> = (0..15).map(|i| 10.0 + 0.5 * i as f64).collect();
        let fit = fit_polynomial(&values, 2).unwrap();
        assert!(fit.coefficients()[2].abs() < 1e-8);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let values: Vec<f64> = (0..40)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.3)
            .collect();
        let first = fit_polynomial(&values, 2).unwrap();
        let second = fit_polynomial(&values, 2).unwrap();
        assert_eq!(first.coefficients(), second.coefficients());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(
            fit_polynomial(&[1.0, 2.0], 2),
            Err(RegressionError::TooFewPoints {
                degree: 2,
                required: 3,
                actual: 2
            })
        );
        assert_eq!(
            fit_polynomial(&[1.0, f64::NAN, 3.0], 1),
            Err(RegressionError::NonFinite(1))
        );
    }

    #[test]
    fn test_singular_system_is_reported() {
        let a = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        assert_eq!(solve_linear_system(a, vec![1.0, 2.0]), Err(RegressionError::Singular));
        assert_eq!(
            solve_linear_system(vec![vec![0.0]], vec![1.0]),
            Err(RegressionError::Singular)
        );
    }
}
