//! Residual pre and post filtering.
use crate::{
    math::{histogram_counts, polynomial_eval, polynomial_fit, HistogramBin},
    residuals::split_bins,
};

use itertools::Itertools;

/// Indices of the residuals inside the inclusive `[lower, upper]` band.
/// Empty when the input is empty or the band is degenerate.
pub fn window_prefilter(residuals: &[f64], upper: f64, lower: f64) -> Vec<usize> {
    if residuals.is_empty() || upper <= lower {
        return Vec::new();
    }

    residuals
        .iter()
        .enumerate()
        .filter(|(_, &residual)| residual <= upper && residual >= lower)
        .map(|(index, _)| index)
        .collect()
}

/// Histogram based range gate filtering over the whole series.
///
/// The series is split into `bin_size_s` bins; each bin is filtered with
/// [histogram_prefilter_bin], the gate depth and photon threshold evenly
/// divided by `divisions`. Returns the accepted indices over the whole
/// series, empty on degenerate input.
pub fn histogram_prefilter(
    times: &[f64],
    residuals: &[f64],
    bin_size_s: f64,
    depth: f64,
    min_photons: usize,
    divisions: usize,
) -> Vec<usize> {
    if times.is_empty()
        || residuals.is_empty()
        || times.len() != residuals.len()
        || depth <= 0.0
        || bin_size_s <= 0.0
        || divisions == 0
    {
        return Vec::new();
    }

    let divided_depth = depth / divisions as f64;
    let divided_min_photons = min_photons / divisions;

    let mut selected = Vec::new();

    for range in split_bins(times, bin_size_s) {
        let offset = range.start;
        let accepted =
            histogram_prefilter_bin(&residuals[range], divided_depth, divided_min_photons);
        selected.extend(accepted.into_iter().map(|index| index + offset));
    }

    selected
}

/// Histogram based range gate filtering of one bin.
///
/// The bin residuals are counted into columns of `depth` width spanning
/// the range gate; the tallest column is expanded left and right while
/// neighbours hold at least `min_photons` counts, and the indices of the
/// residuals inside the contiguous accepted columns are returned.
pub fn histogram_prefilter_bin(residuals_bin: &[f64], depth: f64, min_photons: usize) -> Vec<usize> {
    let (min, max) = match residuals_bin.iter().minmax().into_option() {
        Some((min, max)) => (*min, *max),
        None => return Vec::new(),
    };

    // range gate width and column count
    let gate_width = min.abs() + max.abs();
    let columns_count = (gate_width / depth).floor() as usize;

    let columns = histogram_counts(residuals_bin, columns_count, min, max);

    if columns.is_empty() {
        return Vec::new();
    }

    let mut tallest = 0;
    for (index, column) in columns.iter().enumerate() {
        if column.count > columns[tallest].count {
            tallest = index;
        }
    }

    if columns[tallest].count < min_photons {
        return Vec::new();
    }

    // expand the tallest column while neighbours hold the photon threshold
    let mut first = tallest;
    while first > 0 && columns[first - 1].count >= min_photons {
        first -= 1;
    }

    let mut last = tallest + 1;
    while last < columns.len() && columns[last].count >= min_photons {
        last += 1;
    }

    let accepted: &[HistogramBin] = &columns[first..last];

    residuals_bin
        .iter()
        .enumerate()
        .filter(|(_, &residual)| {
            accepted
                .iter()
                .any(|column| residual >= column.lower_edge && residual < column.upper_edge)
        })
        .map(|(index, _)| index)
        .collect()
}

/// Polynomial trend filtering over the whole series: indices of the
/// residuals within `1.5 * depth` of the fitted trend.
pub fn histogram_postfilter(times: &[f64], residuals: &[f64], depth: f64) -> Vec<usize> {
    let len = times.len().min(residuals.len());

    if len == 0 {
        return Vec::new();
    }

    let band = depth * 1.5;

    // trend over the whole series, fitted on session-relative times
    let origin = times[0];
    let shifted: Vec<f64> = times[..len].iter().map(|t| t - origin).collect();
    let coefficients = polynomial_fit(&shifted, &residuals[..len], 9);

    (0..len)
        .filter(|&index| {
            let trend = polynomial_eval(&coefficients, shifted[index]);
            residuals[index] >= trend - band && residuals[index] <= trend + band
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::{
        histogram_postfilter, histogram_prefilter, histogram_prefilter_bin, window_prefilter,
    };

    #[test]
    fn window_band_is_inclusive_and_complete() {
        let residuals = [-30.0, -10.0, 0.0, 10.0, 10.5, 29.9, 30.0, 31.0];
        let indices = window_prefilter(&residuals, 30.0, -10.0);
        assert_eq!(indices, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn degenerate_window_is_refused() {
        assert!(window_prefilter(&[], 10.0, -10.0).is_empty());
        assert!(window_prefilter(&[1.0], -10.0, 10.0).is_empty());
        assert!(window_prefilter(&[1.0], 10.0, 10.0).is_empty());
    }

    #[test]
    fn tallest_column_expansion_is_contiguous() {
        // dense cluster in [0, 10), sparse returns further away
        let mut residuals = Vec::new();
        for k in 0..100 {
            residuals.push((k % 10) as f64);
        }
        residuals.extend([250.0, 251.0, -300.0, 420.0]);

        let selected = histogram_prefilter_bin(&residuals, 10.0, 5);

        // only cluster members survive, by their original index
        assert_eq!(selected.len(), 100);
        for index in &selected {
            assert!(*index < 100);
        }
    }

    #[test]
    fn below_threshold_gate_rejects_everything() {
        let residuals = [1.0, 2.0, 100.0, 101.0];
        assert!(histogram_prefilter_bin(&residuals, 5.0, 10).is_empty());
    }

    #[test]
    fn prefilter_offsets_bin_local_indices() {
        let mut times = Vec::new();
        let mut residuals = Vec::new();

        // two 30 s bins, each with a dense cluster and one far outlier
        for bin in 0..2 {
            let base = bin as f64 * 60.0;
            for k in 0..50 {
                times.push(base + k as f64 * 0.2);
                residuals.push((k % 5) as f64);
            }
            times.push(base + 11.0);
            residuals.push(500.0);
        }

        let selected = histogram_prefilter(&times, &residuals, 30.0, 20.0, 5, 1);

        assert!(!selected.is_empty());
        // outliers sit at indices 50 and 101
        assert!(!selected.contains(&50));
        assert!(!selected.contains(&101));
        // indices from the second bin are offset past the first
        assert!(selected.iter().any(|&index| index > 50));
        // accepted indices form a subset of the input
        assert!(selected.iter().all(|&index| index < residuals.len()));
    }

    #[test]
    fn postfilter_keeps_the_trend_band() {
        let times: Vec<f64> = (0..100).map(|k| k as f64).collect();
        let mut residuals: Vec<f64> = times.iter().map(|t| 2.0 * t).collect();
        residuals[40] += 100.0;
        residuals[60] -= 100.0;

        let selected = histogram_postfilter(&times, &residuals, 20.0);

        assert!(!selected.contains(&40));
        assert!(!selected.contains(&60));
        assert_eq!(selected.len(), 98);
    }

    #[test]
    fn degenerate_inputs_are_refused() {
        assert!(histogram_prefilter(&[], &[], 30.0, 10.0, 5, 1).is_empty());
        assert!(histogram_prefilter(&[1.0], &[1.0, 2.0], 30.0, 10.0, 5, 1).is_empty());
        assert!(histogram_prefilter(&[1.0], &[1.0], 30.0, 0.0, 5, 1).is_empty());
        assert!(histogram_prefilter(&[1.0], &[1.0], 30.0, 10.0, 5, 0).is_empty());
        assert!(histogram_postfilter(&[], &[], 10.0).is_empty());
    }
}
