//! Pass generation scenarios over synthetic ephemerides.
use crate::{
    prelude::*,
    tests::test_pool::{sfel_station, vertical_profile_ephemeris},
};

/// Horizontal stand-off of the synthetic satellite (meters).
const OFFSET_M: f64 = 1.0E6;

#[test]
fn single_arc_yields_a_single_pass() {
    let _ = env_logger::builder().is_test(true).try_init();

    let start = MjdInstant::new(60093, 0.0);

    // parabolic height profile peaking mid-window: elevation rises through
    // the threshold and falls back once
    let peak_m = 8.0E5;
    let height = move |t: f64| peak_m * (1.0 - ((t - 3600.0) / 2400.0).powi(2));

    // table runs past the scanned window so the bounce-time windows stay
    // covered near the end
    let ephemeris = vertical_profile_ephemeris(start, 60.0, 126, OFFSET_M, height);

    let minimum_elevation_deg = 9.0;
    let interval_s = 0.5;

    let calculator = PassCalculator::new(
        CpfInterpolator::new(&ephemeris, sfel_station()),
        minimum_elevation_deg,
        interval_s,
    );

    let passes = calculator
        .passes(start, start.add_seconds(7200.0))
        .unwrap();

    assert_eq!(passes.len(), 1);
    let pass = &passes[0];

    // analytic threshold crossings of the height profile
    let threshold_m = OFFSET_M * minimum_elevation_deg.to_radians().tan();
    let half_arc_s = 2400.0 * (1.0 - threshold_m / peak_m).sqrt();
    let expected_steps = (2.0 * half_arc_s / interval_s).ceil() as i64;

    let steps = pass.steps.len() as i64;
    assert!(
        (steps - expected_steps).abs() <= 2,
        "unexpected step count: {steps} instead of ~{expected_steps}"
    );

    // first step carries zero rates
    assert_eq!(pass.steps[0].azimuth_rate_deg_s, 0.0);
    assert_eq!(pass.steps[0].elevation_rate_deg_s, 0.0);

    // every step respects the elevation floor and the sampling interval
    for pair in pass.steps.windows(2) {
        assert!(pair[0].elevation_deg >= minimum_elevation_deg);
        let dt = pair[1].instant().seconds_since(&pair[0].instant());
        assert!((dt - interval_s).abs() < 1e-9);
    }

    // elevation is monotone up to culmination then monotone down
    let culmination = pass
        .steps
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.elevation_deg.total_cmp(&b.elevation_deg))
        .map(|(index, _)| index)
        .unwrap();

    for pair in pass.steps[..culmination].windows(2) {
        assert!(pair[1].elevation_deg >= pair[0].elevation_deg);
    }
    for pair in pass.steps[culmination..].windows(2) {
        assert!(pair[1].elevation_deg <= pair[0].elevation_deg);
    }

    assert!(pass.max_elevation_deg().unwrap() < 40.0);
    assert!(pass.duration_s() > 0.0);
}

#[test]
fn two_arcs_yield_ordered_passes() {
    let start = MjdInstant::new(60093, 43200.0);

    // quartic height profile: two humps separated by a dip below the
    // horizon, resolved exactly by the interpolation windows
    let height =
        move |t: f64| -1.8E-8 * t * (t - 3000.0) * (t - 4000.0) * (t - 7000.0);

    let ephemeris = vertical_profile_ephemeris(start, 50.0, 145, OFFSET_M, height);

    let calculator = PassCalculator::new(
        CpfInterpolator::new(&ephemeris, sfel_station()),
        9.0,
        10.0,
    );

    let passes = calculator
        .passes(start, start.add_seconds(7000.0))
        .unwrap();

    assert_eq!(passes.len(), 2);

    // strictly increasing pass times
    let first_end = passes[0].end().unwrap();
    let second_start = passes[1].start().unwrap();
    assert!(first_end < second_start);

    for pass in &passes {
        assert!(!pass.steps.is_empty());
        assert_eq!(pass.minimum_elevation_deg, 9.0);
        assert_eq!(pass.interval_s, 10.0);

        for step in &pass.steps {
            assert!(step.elevation_deg >= 9.0);
            assert!((0.0..360.0).contains(&step.azimuth_deg));
        }
    }
}

#[test]
fn scan_below_threshold_yields_no_pass() {
    let start = MjdInstant::new(60093, 0.0);

    // the profile culminates below the requested minimum elevation
    let height = move |t: f64| 1.0E5 * (1.0 - ((t - 3600.0) / 2400.0).powi(2));
    let ephemeris = vertical_profile_ephemeris(start, 60.0, 126, OFFSET_M, height);

    let calculator = PassCalculator::new(
        CpfInterpolator::new(&ephemeris, sfel_station()),
        9.0,
        10.0,
    );

    let passes = calculator
        .passes(start, start.add_seconds(7200.0))
        .unwrap();

    assert!(passes.is_empty());
}
