//! Gaussian peak location refinement.
use crate::math::{polynomial_eval, polynomial_fit};

/// Default Gaussian kernel width (picoseconds).
const DEFAULT_SIGMA_PS: f64 = 25.0;

/// Default coarse scan window (picoseconds).
const DEFAULT_WIDTH_PS: f64 = 200.0;

/// Default coarse scan step (picoseconds).
const DEFAULT_STEP_PS: f64 = 8.0;

/// Locates the distribution peak of `data` around `seed_ps` with the
/// operational kernel width, scan window and step.
/// See [gaussian_peak_with].
pub fn gaussian_peak(data: &[f64], seed_ps: f64) -> Option<f64> {
    gaussian_peak_with(
        data,
        seed_ps,
        DEFAULT_SIGMA_PS,
        DEFAULT_WIDTH_PS,
        DEFAULT_STEP_PS,
    )
}

/// Locates the distribution peak of `data` by scanning a Gaussian kernel
/// density estimate around `seed_ps`.
///
/// A coarse grid of `width_ps / step_ps + 1` samples is refined with a
/// tenth-step scan around its maximum. When several modes survive within
/// the half maximum region, the upper envelope is fitted with a quartic
/// and the fitted maximum polished by Newton-Raphson.
///
/// Returns None on degenerate input: empty data, non positive kernel
/// width, window or step.
pub fn gaussian_peak_with(
    data: &[f64],
    seed_ps: f64,
    sigma_ps: f64,
    width_ps: f64,
    step_ps: f64,
) -> Option<f64> {
    if data.is_empty() || sigma_ps <= 0.0 || width_ps <= 0.0 || step_ps <= 0.0 {
        return None;
    }

    let density = |x: f64| -> f64 {
        data.iter()
            .map(|residual| (-((x - residual) / sigma_ps).powi(2) / 2.0).exp())
            .sum()
    };

    let fine_step = step_ps / 10.0;
    let points = (width_ps / step_ps).round() as usize + 1;
    let centre = (points - 1) / 2;

    let mut x: Vec<f64> = (0..points)
        .map(|k| seed_ps + (k as f64 - centre as f64) * step_ps)
        .collect();

    let mut y: Vec<f64> = x.iter().map(|&abscissa| density(abscissa)).collect();

    let mut index_max = 0;
    for (index, value) in y.iter().enumerate() {
        if *value > y[index_max] {
            index_max = index;
        }
    }

    // fine scan: tenth-steps across the two coarse intervals surrounding
    // the maximum
    let mut fine = x[index_max.saturating_sub(1)];
    let mut fine_max = (0.0, 0.0);

    for _ in 0..19 {
        fine += fine_step;
        let sum = density(fine);
        if sum > fine_max.1 {
            fine_max = (fine, sum);
        }
    }

    let (peak, peak_density) = fine_max;
    x[index_max] = peak;
    y[index_max] = peak_density;

    // normalise the scan to a maximum of 100
    let factor = 100.0 / peak_density;
    for value in y.iter_mut() {
        *value *= factor;
    }

    // count modes within the half maximum region by slope sign transitions
    let mut modes = 1_usize;

    let mut slope_sign = 1_i32;
    let mut i = index_max;
    while i > 0 && y[i] >= 50.0 {
        i -= 1;
        if y[i] > y[i + 1] {
            if slope_sign == 1 {
                modes += 1;
            }
            slope_sign = -1;
        } else {
            slope_sign = 1;
        }
    }

    slope_sign = -1;
    i = index_max;
    while i < y.len() - 1 && y[i] >= 50.0 {
        i += 1;
        if y[i] > y[i - 1] {
            if slope_sign == -1 {
                modes += 1;
            }
            slope_sign = 1;
        } else {
            slope_sign = -1;
        }
    }

    if modes == 0 {
        return None;
    } else if modes == 1 {
        return Some(peak);
    }

    // ambiguous half maximum region: fit the upper envelope with a quartic
    let (x_fit, y_fit): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(&y)
        .filter(|(_, &value)| value >= 40.0)
        .map(|(&abscissa, &value)| (abscissa, value))
        .unzip();

    let span = x_fit.last()? - x_fit.first()?;
    let fit_step = span / (points - 1) as f64;

    if fit_step <= 0.0 {
        return Some(peak);
    }

    let coefficients = polynomial_fit(&x_fit, &y_fit, 4);
    let coefficient = |i: usize| coefficients.get(i).copied().unwrap_or(0.0);

    // coarse scan of the fitted curve
    let mut best = (x_fit[0], f64::MIN);
    let mut abscissa = x_fit[0];
    while abscissa <= x_fit[0] + span {
        let value = polynomial_eval(&coefficients, abscissa);
        if value > best.1 {
            best = (abscissa, value);
        }
        abscissa += fit_step;
    }

    // polish the fitted maximum: Newton-Raphson on the quartic derivative
    let mut root = best.0;

    for _ in 0..4 {
        let root_2 = root * root;
        let root_3 = root_2 * root;

        let derivative = coefficient(1)
            + 2.0 * coefficient(2) * root
            + 3.0 * coefficient(3) * root_2
            + 4.0 * coefficient(4) * root_3;

        let second = 2.0 * coefficient(2) + 6.0 * coefficient(3) * root + 12.0 * coefficient(4) * root_2;

        if second == 0.0 {
            break;
        }

        root -= derivative / second;
    }

    Some(root)
}
