//! Satellite Laser Ranging support library.
#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

/*
 * SLRUTILS is part of the nav-solutions framework.
 * Authors: Guillaume W. Bres <guillaume.bressaix@gmail.com> et al.
 * This framework is shipped under Mozilla Public V2 license.
 *
 * Documentation: https://github.com/nav-solutions/slrutils
 */

use crate::constants::SECONDS_PER_DAY;

use hifitime::Epoch;

#[cfg(test)]
mod tests;

mod constants;
mod coordinates;
mod ephemeris;
mod errors;
mod interpolator;
mod math;
mod meteo;
mod passes;
mod residuals;
mod tropo;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Plain (x, y, z) coordinates triplet.
pub type Vector3D = (f64, f64, f64);

pub mod prelude {
    pub use crate::{
        constants::{
            EARTH_ROTATION_RAD_DAY, NANOMETER_TO_MICROMETER, SECONDS_PER_DAY,
            SECOND_TO_PICOSECOND, SPEED_OF_LIGHT_M_S,
        },
        coordinates::{AngleUnit, GeocentricPoint, GeodeticPoint, LengthUnit, SurfaceLocation},
        ephemeris::{Ephemeris, PositionRecord},
        errors::{
            BinStatsError, LagrangeError, PassError, PredictionError, ResidualsError, StatsError,
        },
        interpolator::{CpfInterpolator, InterpolationFunction, Prediction, PredictionMode},
        meteo::{water_vapor_pressure, MeteoRecord, WaterVaporPressureModel},
        passes::{Pass, PassCalculator, PassStep},
        residuals::{
            bin_polynomial_detrend, bin_stats, full_rate_residuals, gaussian_peak,
            gaussian_peak_with, histogram_postfilter, histogram_prefilter,
            histogram_prefilter_bin, residuals_from_session, residuals_stats, window_prefilter,
            BinStats, FullRateResiduals, RangingSession, RejectionBand, RejectionStats,
            ResidualsBin, ResidualsStats, StatsOutcome, DEFAULT_DETREND_DEGREE,
        },
        tropo::path_delay_marini_murray,
        MjdInstant, Vector3D,
    };

    // Pub re-export
    pub use hifitime::{Duration, Epoch, TimeScale};
}

/// Datetime expressed as an integer Modified Julian Day paired with
/// seconds of that day. Instants are totally ordered and normalized:
/// the seconds of day always lie in `[0, 86400)`.
#[derive(Default, Copy, Clone, Debug, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MjdInstant {
    day: u32,
    seconds_of_day: f64,
}

impl MjdInstant {
    /// Builds a new [MjdInstant]; seconds outside `[0, 86400)` roll into
    /// the day count.
    pub fn new(day: u32, seconds_of_day: f64) -> Self {
        let mut instant = Self {
            day,
            seconds_of_day,
        };
        instant.normalize();
        instant
    }

    /// Builds a new [MjdInstant] from a fractional MJD datetime.
    pub fn from_fractional_days(mjdt: f64) -> Self {
        let day = mjdt.floor();
        Self::new(day as u32, (mjdt - day) * SECONDS_PER_DAY)
    }

    /// Builds a new [MjdInstant] from a [hifitime::Epoch], in UTC.
    pub fn from_epoch(epoch: Epoch) -> Self {
        Self::from_fractional_days(epoch.to_mjd_utc_days())
    }

    /// Integer Modified Julian Day.
    pub fn day(&self) -> u32 {
        self.day
    }

    /// Seconds elapsed in the day, in `[0, 86400)`.
    pub fn seconds_of_day(&self) -> f64 {
        self.seconds_of_day
    }

    /// This instant as fractional Modified Julian Days.
    pub fn as_fractional_days(&self) -> f64 {
        self.day as f64 + self.seconds_of_day / SECONDS_PER_DAY
    }

    /// This instant as a [hifitime::Epoch], in UTC.
    pub fn epoch(&self) -> Epoch {
        Epoch::from_mjd_utc(self.as_fractional_days())
    }

    /// Copies and returns [Self] translated by `seconds`, correctly
    /// crossing day boundaries.
    pub fn add_seconds(&self, seconds: f64) -> Self {
        Self::new(self.day, self.seconds_of_day + seconds)
    }

    /// Signed duration in seconds from `rhs` to self.
    pub fn seconds_since(&self, rhs: &Self) -> f64 {
        (self.day as f64 - rhs.day as f64) * SECONDS_PER_DAY + self.seconds_of_day
            - rhs.seconds_of_day
    }

    fn normalize(&mut self) {
        while self.seconds_of_day >= SECONDS_PER_DAY {
            self.seconds_of_day -= SECONDS_PER_DAY;
            self.day += 1;
        }
        while self.seconds_of_day < 0.0 && self.day > 0 {
            self.seconds_of_day += SECONDS_PER_DAY;
            self.day -= 1;
        }
    }
}

impl std::fmt::Display for MjdInstant {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "MJD {} + {:.6} s", self.day, self.seconds_of_day)
    }
}
