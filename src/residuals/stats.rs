//! Iterative robust statistics over residual bins.
use crate::{
    errors::{BinStatsError, StatsError},
    residuals::{gaussian_peak, split_bins},
};

use log::trace;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Convergence loop hard limit.
const MAX_ITERATIONS: usize = 20;

/// The two rejection bands formed around the robust mean.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RejectionBand {
    /// Band of width rejection factor times the RMS.
    Scaled,

    /// Band of width one RMS.
    Unit,
}

impl std::fmt::Display for RejectionBand {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Scaled => f.write_str("scaled RMS"),
            Self::Unit => f.write_str("single RMS"),
        }
    }
}

/// Robust statistics of one bin within one rejection band.
#[derive(Default, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RejectionStats {
    /// Iterations until the robust mean converged.
    pub iterations: usize,

    /// Samples inside the band at convergence.
    pub accepted: usize,

    /// Samples outside the band at convergence.
    pub rejected: usize,

    /// Robust mean (picoseconds).
    pub mean_ps: f64,

    /// Root mean square about the mean (picoseconds).
    pub rms_ps: f64,

    /// Skewness of the accepted samples.
    pub skew: f64,

    /// Excess kurtosis of the accepted samples (ILRS convention).
    pub kurtosis_excess: f64,

    /// Gaussian peak location (picoseconds).
    pub peak_ps: f64,

    /// Accepted samples over bin population, in percent.
    pub acceptance_pct: f64,

    /// Per-sample acceptance, indexed like the original bin data.
    pub accepted_mask: Vec<bool>,
}

/// Robust statistics of one bin: the scaled band record and the single
/// RMS band record.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BinStats {
    /// Bin population.
    pub points: usize,

    /// Rejection factor the scaled band was formed with.
    pub rejection_factor: f64,

    /// Statistics within the scaled (rejection factor times RMS) band.
    pub scaled: RejectionStats,

    /// Statistics within the single RMS band.
    pub unit: RejectionStats,
}

struct Convergence {
    iterations: usize,
    mean: f64,
    rms: f64,
    rejection: f64,
}

enum ConvergenceFailure {
    AllRejected,
    NotConverged,
}

/// Iteratively forms the robust mean: samples within `rejection` of the
/// current mean refine it, and when `scale` is provided the band tracks
/// the refreshed RMS. Converges when the mean moves less than `tolerance`.
fn converge(
    data: &[f64],
    seed_mean: f64,
    initial_rejection: f64,
    scale: Option<f64>,
    tolerance: f64,
) -> Result<Convergence, ConvergenceFailure> {
    let mut mean = seed_mean;
    let mut rejection = initial_rejection;
    let mut rms = 0.0;

    let mut last_mean = f64::MAX;
    let mut iterations = 0;
    let mut converged = false;

    while iterations < MAX_ITERATIONS && !converged {
        let mut sum = 0.0_f64;
        let mut sum_squares = 0.0_f64;
        let mut count = 0_usize;

        for &sample in data {
            let residual = sample - mean;
            if residual.abs() <= rejection {
                sum += residual;
                sum_squares += residual * residual;
                count += 1;
            }
        }

        if count == 0 {
            return Err(ConvergenceFailure::AllRejected);
        }

        let delta = sum / count as f64;
        mean += delta;
        rms = (sum_squares / count as f64 - delta * delta).max(0.0).sqrt();

        if let Some(factor) = scale {
            rejection = factor * rms;
        }

        if (mean - last_mean).abs() < tolerance {
            converged = true;
        }

        last_mean = mean;
        iterations += 1;
    }

    if !converged {
        return Err(ConvergenceFailure::NotConverged);
    }

    Ok(Convergence {
        iterations,
        mean,
        rms,
        rejection,
    })
}

/// Central moments and acceptance mask about a converged mean.
/// Returns None when the final band accepts no sample.
fn moments(data: &[f64], mean: f64, rejection: f64) -> Option<(usize, Vec<bool>, f64, f64)> {
    let mut c2 = 0.0_f64;
    let mut c3 = 0.0_f64;
    let mut c4 = 0.0_f64;
    let mut accepted = 0_usize;
    let mut mask = Vec::with_capacity(data.len());

    for &sample in data {
        let residual = sample - mean;
        if residual.abs() <= rejection {
            let squared = residual * residual;
            c2 += squared;
            c3 += squared * residual;
            c4 += squared * squared;
            accepted += 1;
            mask.push(true);
        } else {
            mask.push(false);
        }
    }

    if accepted == 0 {
        return None;
    }

    c2 /= accepted as f64;
    c3 /= accepted as f64;
    c4 /= accepted as f64;

    let skew = c3 / c2.powf(1.5);
    let kurtosis = c4 / (c2 * c2);

    Some((accepted, mask, skew, kurtosis))
}

fn band_stats(
    data: &[f64],
    convergence: &Convergence,
    band: RejectionBand,
) -> Result<RejectionStats, BinStatsError> {
    let (accepted, mask, skew, kurtosis) = moments(data, convergence.mean, convergence.rejection)
        .ok_or(BinStatsError::AllRejected(band))?;

    let peak_ps = gaussian_peak(data, convergence.mean)
        .ok_or(BinStatsError::PeakCalculationFailed(band))?;

    Ok(RejectionStats {
        iterations: convergence.iterations,
        accepted,
        rejected: data.len() - accepted,
        mean_ps: convergence.mean,
        rms_ps: convergence.rms,
        skew,
        kurtosis_excess: kurtosis - 3.0, // ILRS convention
        peak_ps,
        acceptance_pct: accepted as f64 * 100.0 / data.len() as f64,
        accepted_mask: mask,
    })
}

/// Robust statistics of one residual bin.
///
/// Two rejection bands are converged in sequence: the scaled band,
/// refreshed to `rejection_factor` times the RMS at every iteration, then
/// the single RMS band, seeded with the scaled result and held at the
/// scaled RMS width. The convergence criterion is a mean displacement
/// below `tolerance_ps`.
pub fn bin_stats(
    data: &[f64],
    rejection_factor: f64,
    tolerance_ps: f64,
) -> Result<BinStats, BinStatsError> {
    let scaled_convergence = converge(data, 0.0, f64::MAX, Some(rejection_factor), tolerance_ps)
        .map_err(|failure| match failure {
            ConvergenceFailure::AllRejected => BinStatsError::AllRejected(RejectionBand::Scaled),
            ConvergenceFailure::NotConverged => BinStatsError::NotConverged(RejectionBand::Scaled),
        })?;

    let scaled = band_stats(data, &scaled_convergence, RejectionBand::Scaled)?;

    let unit_convergence = converge(
        data,
        scaled_convergence.mean,
        scaled_convergence.rms,
        None,
        tolerance_ps,
    )
    .map_err(|failure| match failure {
        ConvergenceFailure::AllRejected => BinStatsError::AllRejected(RejectionBand::Unit),
        ConvergenceFailure::NotConverged => BinStatsError::NotConverged(RejectionBand::Unit),
    })?;

    let unit = band_stats(data, &unit_convergence, RejectionBand::Unit)?;

    trace!(
        "bin of {} samples converged in {} + {} iterations",
        data.len(),
        scaled.iterations,
        unit.iterations,
    );

    Ok(BinStats {
        points: data.len(),
        rejection_factor,
        scaled,
        unit,
    })
}

/// One bin entry of [ResidualsStats]: population and per-bin outcome.
#[derive(Clone, Debug, PartialEq)]
pub struct ResidualsBin {
    /// Bin population.
    pub points: usize,

    /// Per-bin statistics, or the failure that voided this bin.
    pub stats: Result<BinStats, BinStatsError>,
}

/// Overall outcome of the aggregation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StatsOutcome {
    /// Every bin converged.
    Complete,

    /// At least one bin failed; its samples only count as rejected.
    SomeBinsFailed,
}

/// Aggregated residual statistics over all bins.
#[derive(Clone, Debug, PartialEq)]
pub struct ResidualsStats {
    /// Rejection factor the bins were converged with.
    pub rejection_factor: f64,

    /// Bin duration (seconds).
    pub bin_size_s: f64,

    /// Total population over all bins.
    pub total_points: usize,

    /// Per-bin records, in time order.
    pub bins: Vec<ResidualsBin>,

    /// Scaled band totals: iterations, mean, RMS, skew, kurtosis and peak
    /// averaged over successful bins; counts and mask over all bins.
    pub total_scaled: RejectionStats,

    /// Single RMS band totals, aggregated like `total_scaled`.
    pub total_unit: RejectionStats,

    /// Aggregation outcome.
    pub outcome: StatsOutcome,
}

/// Splits detrended residuals into bins, runs [bin_stats] on each and
/// aggregates. Earlier successful bins are always retained: a failing bin
/// degrades the [StatsOutcome] and contributes its population to the
/// rejected counts only.
pub fn residuals_stats(
    bin_size_s: f64,
    data: &[(f64, f64)],
    rejection_factor: f64,
    tolerance_ps: f64,
) -> Result<ResidualsStats, StatsError> {
    let times: Vec<f64> = data.iter().map(|(time, _)| *time).collect();
    let ranges = split_bins(&times, bin_size_s);

    let mut bins = Vec::with_capacity(ranges.len());
    let mut succeeded = 0_usize;

    let mut total_scaled = RejectionStats::default();
    let mut total_unit = RejectionStats::default();

    for range in ranges {
        let samples: Vec<f64> = data[range].iter().map(|(_, residual)| *residual).collect();
        let points = samples.len();

        let stats = bin_stats(&samples, rejection_factor, tolerance_ps);

        match &stats {
            Ok(bin) => {
                succeeded += 1;
                accumulate(&mut total_scaled, &bin.scaled);
                accumulate(&mut total_unit, &bin.unit);
            },
            Err(_) => {
                // a voided bin only contributes rejected samples
                total_scaled.rejected += points;
                total_unit.rejected += points;
                total_scaled
                    .accepted_mask
                    .extend(std::iter::repeat(false).take(points));
                total_unit
                    .accepted_mask
                    .extend(std::iter::repeat(false).take(points));
            },
        }

        bins.push(ResidualsBin { points, stats });
    }

    if succeeded == 0 {
        return Err(StatsError::AllBinsFailed);
    }

    let total_points = data.len();
    finalize(&mut total_scaled, succeeded, total_points);
    finalize(&mut total_unit, succeeded, total_points);

    let outcome = if succeeded == bins.len() {
        StatsOutcome::Complete
    } else {
        StatsOutcome::SomeBinsFailed
    };

    Ok(ResidualsStats {
        rejection_factor,
        bin_size_s,
        total_points,
        bins,
        total_scaled,
        total_unit,
        outcome,
    })
}

fn accumulate(total: &mut RejectionStats, bin: &RejectionStats) {
    total.iterations += bin.iterations;
    total.accepted += bin.accepted;
    total.rejected += bin.rejected;
    total.mean_ps += bin.mean_ps;
    total.rms_ps += bin.rms_ps;
    total.skew += bin.skew;
    total.kurtosis_excess += bin.kurtosis_excess;
    total.peak_ps += bin.peak_ps;
    total.accepted_mask.extend(bin.accepted_mask.iter().copied());
}

fn finalize(total: &mut RejectionStats, succeeded: usize, total_points: usize) {
    total.iterations /= succeeded;
    total.mean_ps /= succeeded as f64;
    total.rms_ps /= succeeded as f64;
    total.skew /= succeeded as f64;
    total.kurtosis_excess /= succeeded as f64;
    total.peak_ps /= succeeded as f64;
    total.acceptance_pct = total.accepted as f64 * 100.0 / total_points as f64;
}
