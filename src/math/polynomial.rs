//! Least-squares polynomial fitting and evaluation.
use nalgebra::{DMatrix, DVector};

/// Fits a polynomial of the requested degree to (x, y) in the least-squares
/// sense. Coefficients are ordered by their power: index 0 is the constant
/// term. The effective degree is lowered when fewer than `degree + 1`
/// samples are available; singular directions resolve to zero coefficients.
pub fn polynomial_fit(x: &[f64], y: &[f64], degree: usize) -> Vec<f64> {
    let len = x.len().min(y.len());

    if len == 0 {
        return Vec::new();
    }

    let degree = degree.min(len - 1);

    let vandermonde = DMatrix::from_fn(len, degree + 1, |i, j| x[i].powi(j as i32));
    let rhs = DVector::from_column_slice(&y[..len]);

    match vandermonde.svd(true, true).solve(&rhs, 1.0e-12) {
        Ok(coefficients) => coefficients.iter().copied().collect(),
        Err(_) => vec![0.0; degree + 1],
    }
}

/// Evaluates a polynomial at `x` using Horner's scheme.
/// Coefficients are ordered by their power, like [polynomial_fit] returns.
pub fn polynomial_eval(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}
