//! Full-rate residual computation, detrending and statistics.
mod detrend;
mod filters;
mod peak;
mod stats;

pub use detrend::{bin_polynomial_detrend, DEFAULT_DETREND_DEGREE};
pub use filters::{
    histogram_postfilter, histogram_prefilter, histogram_prefilter_bin, window_prefilter,
};
pub use peak::{gaussian_peak, gaussian_peak_with};
pub use stats::{
    bin_stats, residuals_stats, BinStats, RejectionBand, RejectionStats, ResidualsBin,
    ResidualsStats, StatsOutcome,
};

use crate::{
    constants::{NANOMETER_TO_MICROMETER, SECOND_TO_PICOSECOND, SPEED_OF_LIGHT_M_S},
    coordinates::SurfaceLocation,
    ephemeris::Ephemeris,
    errors::ResidualsError,
    interpolator::{CpfInterpolator, InterpolationFunction, PredictionMode},
    meteo::{MeteoRecord, WaterVaporPressureModel},
    tropo::path_delay_marini_murray,
    MjdInstant,
};

use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Observation input of one ranging session, as extracted from the
/// ranging data container by an upstream parser.
#[derive(Default, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RangingSession {
    /// Session start.
    pub start: MjdInstant,

    /// Transmit wavelength (nanometers), from the system configuration.
    pub wavelength_nm: Option<f64>,

    /// Full-rate observations: (time tag in seconds of day, observed
    /// two-way flight time in seconds), monotone in time tag modulo day
    /// rollovers.
    pub flight_times: Vec<(f64, f64)>,

    /// Surface meteorological records, ordered by time tag.
    pub meteo: Vec<MeteoRecord>,
}

/// Output of the full-rate residual computation.
#[derive(Default, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FullRateResiduals {
    /// Detrended residuals: (time tag in seconds of day, residual in
    /// picoseconds), in observation order.
    pub residuals: Vec<(f64, f64)>,

    /// Predicted two-way flight times (picoseconds), in observation order.
    pub predicted_2w_ps: Vec<f64>,

    /// Two-way tropospheric corrections (picoseconds), in observation order.
    pub tropo_correction_2w_ps: Vec<f64>,
}

/// Computes detrended full-rate residuals for a ranging session.
///
/// ## Input
/// - ephemeris: tabulated [Ephemeris] covering the session
/// - start_mjd: integer Modified Julian Day of the first observation;
/// incremented internally on day rollovers
/// - flight_time_data: (time tag in seconds of day, observed two-way
/// flight time in seconds) pairs
/// - meteo_records: surface meteo, ordered by time tag; the latest record
/// not past each observation is selected (no interpolation)
/// - location: station [SurfaceLocation]
/// - wavelength_um: transmit wavelength (micrometers)
/// - bin_size_s: detrending bin size (seconds)
/// - model: [WaterVaporPressureModel] for the tropospheric correction
#[allow(clippy::too_many_arguments)]
pub fn full_rate_residuals(
    ephemeris: &Ephemeris,
    start_mjd: u32,
    flight_time_data: &[(f64, f64)],
    meteo_records: &[MeteoRecord],
    location: SurfaceLocation,
    wavelength_um: f64,
    bin_size_s: f64,
    model: WaterVaporPressureModel,
) -> Result<FullRateResiduals, ResidualsError> {
    if ephemeris.is_empty() {
        return Err(ResidualsError::EmptyEphemeris);
    }

    let interpolator = CpfInterpolator::new(ephemeris, location);
    let geodetic = interpolator.station_location().geodetic;

    let mut mjd = start_mjd;
    let mut meteo_index = 0;

    let mut times = Vec::with_capacity(flight_time_data.len());
    let mut residuals = Vec::with_capacity(flight_time_data.len());
    let mut predicted_2w_ps = Vec::with_capacity(flight_time_data.len());
    let mut tropo_correction_2w_ps = Vec::with_capacity(flight_time_data.len());

    for (index, (time_tag, flight_time_2w)) in flight_time_data.iter().enumerate() {
        // select the latest meteo record not past this observation
        while meteo_index < meteo_records.len()
            && *time_tag > meteo_records[meteo_index].time_tag_sod
        {
            meteo_index += 1;
        }

        // day rollover
        if index > 0 && *time_tag < flight_time_data[index - 1].0 {
            mjd += 1;
        }

        let prediction = interpolator
            .predict(
                MjdInstant::new(mjd, *time_tag),
                PredictionMode::InstantVector,
                InterpolationFunction::Lagrange9,
            )
            .map_err(ResidualsError::CalculationFailed)?;

        let mut correction_2w_ps = 0.0;

        if !meteo_records.is_empty() {
            let selected = &meteo_records[meteo_index.saturating_sub(1)];

            let delay_m = path_delay_marini_murray(
                selected.pressure_mbar,
                selected.temperature_k,
                selected.humidity_pct,
                prediction.elevation_deg.to_radians(),
                wavelength_um,
                geodetic.latitude,
                geodetic.altitude,
                model,
            );

            // two-way correction, meters to light picoseconds
            correction_2w_ps = 2.0 * delay_m / SPEED_OF_LIGHT_M_S * SECOND_TO_PICOSECOND;
        }

        let prediction_2w_ps = prediction.time_of_flight_2w_s * SECOND_TO_PICOSECOND;

        times.push(*time_tag);
        residuals.push(flight_time_2w * SECOND_TO_PICOSECOND - prediction_2w_ps - correction_2w_ps);
        predicted_2w_ps.push(prediction_2w_ps);
        tropo_correction_2w_ps.push(correction_2w_ps);
    }

    debug!("computed {} full-rate residuals", residuals.len());

    Ok(FullRateResiduals {
        residuals: bin_polynomial_detrend(bin_size_s, &times, &residuals, DEFAULT_DETREND_DEGREE),
        predicted_2w_ps,
        tropo_correction_2w_ps,
    })
}

/// Computes detrended full-rate residuals from a [RangingSession],
/// deriving the start day, wavelength and meteo records from the session.
pub fn residuals_from_session(
    ephemeris: &Ephemeris,
    session: &RangingSession,
    location: SurfaceLocation,
    bin_size_s: f64,
    model: WaterVaporPressureModel,
) -> Result<FullRateResiduals, ResidualsError> {
    if session.flight_times.is_empty() {
        return Err(ResidualsError::EmptyObservations);
    }

    let wavelength_nm = session
        .wavelength_nm
        .ok_or(ResidualsError::MissingWavelength)?;

    full_rate_residuals(
        ephemeris,
        session.start.day(),
        &session.flight_times,
        &session.meteo,
        location,
        wavelength_nm * NANOMETER_TO_MICROMETER,
        bin_size_s,
        model,
    )
}

/// Splits a time-ordered series into bins: a bin closes once a sample
/// lies more than `bin_size_s` past the bin start. Returns contiguous
/// index ranges partitioning the input.
pub(crate) fn split_bins(times: &[f64], bin_size_s: f64) -> Vec<std::ops::Range<usize>> {
    let mut ranges = Vec::new();

    if times.is_empty() {
        return ranges;
    }

    let mut start = 0;

    for (index, time) in times.iter().enumerate() {
        if time - times[start] > bin_size_s {
            ranges.push(start..index);
            start = index;
        }
    }

    ranges.push(start..times.len());
    ranges
}

#[cfg(test)]
mod test {
    use super::{residuals_from_session, split_bins, RangingSession};
    use crate::{
        coordinates::{AngleUnit, GeocentricPoint, GeodeticPoint, LengthUnit, SurfaceLocation},
        ephemeris::{Ephemeris, PositionRecord},
        errors::ResidualsError,
        meteo::WaterVaporPressureModel,
        MjdInstant,
    };

    fn station() -> SurfaceLocation {
        SurfaceLocation::new(
            GeodeticPoint::new(
                36.46525556,
                353.79469440,
                98.177,
                AngleUnit::Degrees,
                LengthUnit::Meters,
            ),
            GeocentricPoint::new(5105473.885, -555110.526, 3769892.958),
        )
    }

    fn ephemeris() -> Ephemeris {
        let records = (0..61)
            .map(|k| {
                let t = k as f64 * 60.0;
                PositionRecord::new(60093, t, (7.0E6 + 1.0E3 * t, 0.0, 0.0))
            })
            .collect();
        Ephemeris::new(records)
    }

    #[test]
    fn session_without_observations_is_rejected() {
        let session = RangingSession {
            start: MjdInstant::new(60093, 0.0),
            wavelength_nm: Some(532.0),
            ..Default::default()
        };

        assert_eq!(
            residuals_from_session(
                &ephemeris(),
                &session,
                station(),
                30.0,
                WaterVaporPressureModel::GiacomoDavis,
            ),
            Err(ResidualsError::EmptyObservations)
        );
    }

    #[test]
    fn session_without_wavelength_is_rejected() {
        let session = RangingSession {
            start: MjdInstant::new(60093, 0.0),
            wavelength_nm: None,
            flight_times: vec![(1800.0, 0.04)],
            ..Default::default()
        };

        assert_eq!(
            residuals_from_session(
                &ephemeris(),
                &session,
                station(),
                30.0,
                WaterVaporPressureModel::GiacomoDavis,
            ),
            Err(ResidualsError::MissingWavelength)
        );
    }

    #[test]
    fn empty_ephemeris_is_rejected() {
        let session = RangingSession {
            start: MjdInstant::new(60093, 0.0),
            wavelength_nm: Some(532.0),
            flight_times: vec![(1800.0, 0.04)],
            ..Default::default()
        };

        assert_eq!(
            residuals_from_session(
                &Ephemeris::new(Vec::new()),
                &session,
                station(),
                30.0,
                WaterVaporPressureModel::GiacomoDavis,
            ),
            Err(ResidualsError::EmptyEphemeris)
        );
    }

    #[test]
    fn bin_splitting_partitions_the_input() {
        let times = [0.0, 10.0, 20.0, 30.0, 31.0, 40.0, 70.0, 95.0];
        let ranges = split_bins(&times, 30.0);

        assert_eq!(ranges, vec![0..4, 4..6, 6..8]);
        assert_eq!(ranges.iter().map(|r| r.len()).sum::<usize>(), times.len());

        assert!(split_bins(&[], 30.0).is_empty());
        assert_eq!(split_bins(&[5.0], 30.0), vec![0..1]);
    }
}
