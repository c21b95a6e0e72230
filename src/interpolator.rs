//! Light-time iterated ephemeris interpolation for a fixed station.
use crate::{
    constants::{EARTH_ROTATION_RAD_DAY, SECONDS_PER_DAY, SPEED_OF_LIGHT_M_S},
    coordinates::{AngleUnit, LengthUnit, SurfaceLocation},
    ephemeris::Ephemeris,
    errors::PredictionError,
    math::{lagrange_interpolation, r2, r3, Matrix3, Vector3},
    MjdInstant, Vector3D,
};

use log::debug;

use std::f64::consts::{FRAC_PI_2, PI};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Geometry convention of a [CpfInterpolator] prediction.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PredictionMode {
    /// Station and satellite both frozen at transmit time: no light-time
    /// iteration. Not suitable for the range gate generator.
    InstantVector,

    /// Range to the satellite at bounce time, pointing along the outbound
    /// beam, with the transmit/bounce direction differences reported.
    #[default]
    AverageDistance,

    /// Outbound beam pointing and bounce-time geometry, without the
    /// direction differences convention.
    OutboundVector,
}

/// Interpolation function selector.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InterpolationFunction {
    /// 9th degree Lagrange interpolation, compatible with standard
    /// prediction file sampling.
    #[default]
    Lagrange9,

    /// 16 point Lagrange interpolation. Reserved, not implemented yet.
    Lagrange16,
}

/// One resolved prediction.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Prediction {
    /// Integer Modified Julian Day of the request.
    pub mjd: u32,

    /// Request datetime as fractional Modified Julian Days.
    pub mjdt: f64,

    /// Seconds elapsed in `mjd`.
    pub seconds_of_day: f64,

    /// One-way range (meters), center of mass correction applied when
    /// the ephemeris publishes one.
    pub range_m: f64,

    /// Round trip flight time (seconds).
    pub time_of_flight_2w_s: f64,

    /// Azimuth (degrees), in `[0, 360)`.
    pub azimuth_deg: f64,

    /// Elevation (degrees).
    pub elevation_deg: f64,

    /// Transmit minus bounce azimuth, doubled (degrees), in `[-360, 360]`.
    /// Zero outside [PredictionMode::AverageDistance].
    pub azimuth_difference_deg: f64,

    /// Transmit minus bounce elevation, doubled (degrees).
    /// Zero outside [PredictionMode::AverageDistance].
    pub elevation_difference_deg: f64,

    /// Interpolated geocentric position (meters).
    pub geocentric_m: Vector3D,

    /// Lowered when any interpolation window abutted the ephemeris
    /// boundaries: the prediction remains usable but is no longer
    /// supported by a centered window.
    pub centered: bool,
}

/// Resamples a tabulated ephemeris for one fixed station, producing
/// pointing directions and round trip flight times. The ephemeris table
/// and the station rotation matrix are computed at construction and
/// immutable afterwards: predictions may run concurrently.
#[derive(Clone, Debug)]
pub struct CpfInterpolator {
    /// Station location, geodetic converted to radians and meters.
    location: SurfaceLocation,

    /// Center of mass correction (meters), from the ephemeris header.
    com_correction_m: Option<f64>,

    /// First and last tabulated instants.
    window: Option<(MjdInstant, MjdInstant)>,

    /// Sample times, relative to the first record (seconds).
    times: Vec<f64>,

    /// Geocentric positions (meters), parallel to `times`.
    positions: Vec<Vector3>,

    /// Geocentric to local East-North-Up rotation.
    rotation: Matrix3,
}

impl CpfInterpolator {
    /// Builds a new [CpfInterpolator] for this (ephemeris, station) pair.
    /// The ephemeris table is copied into an immutable internal cache.
    pub fn new(ephemeris: &Ephemeris, location: SurfaceLocation) -> Self {
        let geodetic = location
            .geodetic
            .converted(AngleUnit::Radians, LengthUnit::Meters);

        let location = SurfaceLocation::new(geodetic, location.geocentric);

        // topocentric rotation: longitude about Z, colatitude about Y,
        // half turn about Z
        let rotation = r3(PI) * r2(FRAC_PI_2 - geodetic.latitude) * r3(geodetic.longitude);

        let mut times = Vec::with_capacity(ephemeris.len());
        let mut positions = Vec::with_capacity(ephemeris.len());

        let window = match (ephemeris.first_instant(), ephemeris.last_instant()) {
            (Some(first), Some(last)) => {
                for record in ephemeris.records() {
                    let (x_m, y_m, z_m) = record.position_m;
                    times.push(record.instant().seconds_since(&first));
                    positions.push(Vector3::new(x_m, y_m, z_m));
                }
                Some((first, last))
            },
            _ => None,
        };

        debug!(
            "interpolator ready: {} position records, com correction {:?} m",
            times.len(),
            ephemeris.com_correction_m(),
        );

        Self {
            location,
            com_correction_m: ephemeris.com_correction_m(),
            window,
            times,
            positions,
            rotation,
        }
    }

    /// Returns true if this [CpfInterpolator] holds no position record.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Returns true if this [CpfInterpolator] can serve predictions.
    pub fn is_ready(&self) -> bool {
        !self.times.is_empty()
    }

    /// Station location served by this [CpfInterpolator],
    /// geodetic coordinates expressed in radians and meters.
    pub fn station_location(&self) -> &SurfaceLocation {
        &self.location
    }

    /// Center of mass correction applied to ranges (meters), if any.
    pub fn com_correction_m(&self) -> Option<f64> {
        self.com_correction_m
    }

    /// First and last instants covered by the ephemeris table.
    pub fn available_time_window(&self) -> Option<(MjdInstant, MjdInstant)> {
        self.window
    }

    /// Resolves the prediction at a fractional Modified Julian Day datetime.
    /// See [Self::predict].
    pub fn predict_at(
        &self,
        mjdt: f64,
        mode: PredictionMode,
        function: InterpolationFunction,
    ) -> Result<Prediction, PredictionError> {
        self.predict(MjdInstant::from_fractional_days(mjdt), mode, function)
    }

    /// Resolves the pointing direction and round trip flight time at the
    /// requested instant.
    ///
    /// ## Input
    /// - instant: requested [MjdInstant]
    /// - mode: [PredictionMode] geometry convention
    /// - function: [InterpolationFunction] resampling method
    ///
    /// ## Output
    /// - [Prediction] on success. `centered` is lowered when an
    /// interpolation window was not centered on its target: such results
    /// remain usable.
    pub fn predict(
        &self,
        instant: MjdInstant,
        mode: PredictionMode,
        function: InterpolationFunction,
    ) -> Result<Prediction, PredictionError> {
        let (first, _) = self.window.ok_or(PredictionError::NoPositionRecords)?;

        let last_time = self
            .times
            .last()
            .copied()
            .ok_or(PredictionError::NoPositionRecords)?;

        // abscissa relative to the first tabulated record
        let x = instant.seconds_since(&first);

        if x < 0.0 || x > last_time {
            return Err(PredictionError::XInterpolatedOutOfBounds);
        }

        let degree = match function {
            InterpolationFunction::Lagrange9 => 9,
            InterpolationFunction::Lagrange16 => {
                return Err(PredictionError::UnknownInterpolator);
            },
        };

        let transmit = lagrange_interpolation(&self.times, &self.positions, degree, x)?;
        let mut centered = transmit.centered;

        let station = self.location.geocentric.to_vector();

        // topocentric vector station/object, both at transmit time
        let topocentric = transmit.value - station;
        let transmit_range_m = topocentric.norm();

        let (azimuth_deg, elevation_deg) = self.local_direction(&topocentric);

        if mode == PredictionMode::InstantVector {
            let range_m = transmit_range_m - self.com_correction_m.unwrap_or(0.0);

            return Ok(Prediction {
                mjd: instant.day(),
                mjdt: instant.as_fractional_days(),
                seconds_of_day: instant.seconds_of_day(),
                range_m,
                time_of_flight_2w_s: 2.0 * range_m / SPEED_OF_LIGHT_M_S,
                azimuth_deg,
                elevation_deg,
                azimuth_difference_deg: 0.0,
                elevation_difference_deg: 0.0,
                geocentric_m: to_triplet(&transmit.value),
                centered,
            });
        }

        // Laser pulse two-way trip: two light-time iterations, the station
        // spun back by the Earth rotation accrued over the outbound leg.
        let mut station_rotated = station;
        let mut time_out = transmit_range_m / SPEED_OF_LIGHT_M_S;
        let mut bounce_position = transmit.value;
        let mut outbound = topocentric;

        for _ in 0..2 {
            let bounce_x = x + time_out;

            let bounce = lagrange_interpolation(&self.times, &self.positions, degree, bounce_x)?;
            centered &= bounce.centered;
            bounce_position = bounce.value;

            outbound = bounce_position - station_rotated;
            time_out = outbound.norm() / SPEED_OF_LIGHT_M_S;

            let accrued = EARTH_ROTATION_RAD_DAY * (time_out / SECONDS_PER_DAY);
            station_rotated = r3(accrued) * station_rotated;
        }

        // outbound laser beam pointing direction
        let (azimuth_out_deg, elevation_out_deg) = self.local_direction(&outbound);

        // difference between receive and transmit direction at transmit time
        let mut azimuth_difference_deg = 2.0 * (azimuth_deg - azimuth_out_deg);
        if azimuth_difference_deg < -360.0 {
            azimuth_difference_deg += 720.0;
        }
        if azimuth_difference_deg > 360.0 {
            azimuth_difference_deg -= 720.0;
        }
        let elevation_difference_deg = 2.0 * (elevation_deg - elevation_out_deg);

        // average distance: station at transmit time, object at bounce time
        let bounce_topocentric = bounce_position - station;
        let range_m = bounce_topocentric.norm() - self.com_correction_m.unwrap_or(0.0);

        let (azimuth_difference_deg, elevation_difference_deg) = match mode {
            PredictionMode::AverageDistance => (azimuth_difference_deg, elevation_difference_deg),
            _ => (0.0, 0.0),
        };

        Ok(Prediction {
            mjd: instant.day(),
            mjdt: instant.as_fractional_days(),
            seconds_of_day: instant.seconds_of_day(),
            range_m,
            time_of_flight_2w_s: 2.0 * range_m / SPEED_OF_LIGHT_M_S,
            azimuth_deg: azimuth_out_deg,
            elevation_deg: elevation_out_deg,
            azimuth_difference_deg,
            elevation_difference_deg,
            geocentric_m: to_triplet(&bounce_position),
            centered,
        })
    }

    /// Azimuth and elevation (degrees) of a geocentric topocentric vector,
    /// in the station local frame.
    fn local_direction(&self, topocentric: &Vector3) -> (f64, f64) {
        let local = self.rotation * topocentric;

        let mut elevation_deg = (local.z / (local.x * local.x + local.y * local.y).sqrt())
            .atan()
            .to_degrees();

        // singular zenith case (Vallado, p. 263); should never be reached
        if elevation_deg == 90.0 {
            elevation_deg += 0.01;
        }

        let mut azimuth_deg = (-local.y).atan2(local.x).to_degrees();
        if azimuth_deg < 0.0 {
            azimuth_deg += 360.0;
        }

        (azimuth_deg, elevation_deg)
    }
}

fn to_triplet(vector: &Vector3) -> Vector3D {
    (vector.x, vector.y, vector.z)
}
