//! Piecewise polynomial detrending of residual series.
use crate::{
    math::{polynomial_eval, polynomial_fit},
    residuals::split_bins,
};

/// Detrending polynomial degree used operationally.
pub const DEFAULT_DETREND_DEGREE: usize = 9;

/// Splits (times, residuals) into bins of `bin_size_s` and subtracts a
/// least-squares polynomial of `degree` from each bin. The output
/// preserves length, order and time tags; residuals become the detrended
/// values. The final bin, possibly shorter than `bin_size_s`, is always
/// detrended at degree [DEFAULT_DETREND_DEGREE], whatever `degree` says.
pub fn bin_polynomial_detrend(
    bin_size_s: f64,
    times: &[f64],
    residuals: &[f64],
    degree: usize,
) -> Vec<(f64, f64)> {
    let len = times.len().min(residuals.len());
    let mut detrended = Vec::with_capacity(len);

    if len == 0 {
        return detrended;
    }

    let ranges = split_bins(&times[..len], bin_size_s);
    let last = ranges.len() - 1;

    for (bin_index, range) in ranges.into_iter().enumerate() {
        let bin_degree = if bin_index == last {
            DEFAULT_DETREND_DEGREE
        } else {
            degree
        };

        detrend_bin(
            &mut detrended,
            &times[range.clone()],
            &residuals[range],
            bin_degree,
        );
    }

    detrended
}

/// Fits one bin and emits its detrended samples. The fit runs on
/// bin-relative times to keep the normal problem well conditioned; the
/// subtracted trend is unchanged by the shift.
fn detrend_bin(detrended: &mut Vec<(f64, f64)>, times: &[f64], residuals: &[f64], degree: usize) {
    let origin = times[0];

    let shifted: Vec<f64> = times.iter().map(|t| t - origin).collect();
    let coefficients = polynomial_fit(&shifted, residuals, degree);

    for (time, residual) in times.iter().zip(residuals) {
        detrended.push((*time, residual - polynomial_eval(&coefficients, time - origin)));
    }
}
