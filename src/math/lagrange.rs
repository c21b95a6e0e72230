//! Windowed Lagrange interpolation over a time-ordered table.
use crate::errors::LagrangeError;

use nalgebra::SVector;

/// Outcome of one interpolation. When the selected window abuts either end
/// of the table, the target abscissa is no longer centered and `centered`
/// is lowered; the value remains usable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LagrangeOutput<const N: usize> {
    /// Interpolated dependent values, same arity as the table rows.
    pub value: SVector<f64, N>,

    /// True when the target lies inside the central interval of the window.
    pub centered: bool,
}

/// Lagrangian interpolation of degree `degree` at abscissa `x`,
/// as per <https://www.math.univ-paris13.fr/~japhet/L2/2020-2021/Interpolation.pdf>.
/// `x_values` must be strictly increasing. The contiguous window of
/// `degree + 1` samples closest to `x` is selected, preferring the one that
/// keeps `x` inside its central interval.
pub fn lagrange_interpolation<const N: usize>(
    x_values: &[f64],
    y_values: &[SVector<f64, N>],
    degree: usize,
    x: f64,
) -> Result<LagrangeOutput<N>, LagrangeError> {
    let len = x_values.len();
    let window = degree + 1;

    if len != y_values.len() || len < window {
        return Err(LagrangeError::DataSizeMismatch);
    }

    if x < x_values[0] || x > x_values[len - 1] {
        return Err(LagrangeError::XOutOfBounds);
    }

    // Index of the first sample strictly past the target: the window wants
    // `half` samples at or below x and `half` above.
    let half = window / 2;
    let upper = x_values.partition_point(|&t| t <= x);
    let start = upper.saturating_sub(half).min(len - window);
    let centered = upper >= half && upper + (window - half) <= len;

    let mut value = SVector::<f64, N>::zeros();

    for i in start..start + window {
        let mut l_i = 1.0_f64;

        for j in start..start + window {
            if j != i {
                l_i *= x - x_values[j];
                l_i /= x_values[i] - x_values[j];
            }
        }

        value += y_values[i] * l_i;
    }

    Ok(LagrangeOutput { value, centered })
}
