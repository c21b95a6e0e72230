//! Visibility pass enumeration over an ephemeris.
use crate::{
    errors::PassError,
    interpolator::{CpfInterpolator, InterpolationFunction, PredictionMode},
    MjdInstant,
};

use hifitime::Epoch;
use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One sample of a visibility [Pass].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PassStep {
    /// Integer Modified Julian Day of this step.
    pub mjd: u32,

    /// Seconds elapsed in `mjd`.
    pub seconds_of_day: f64,

    /// Azimuth (degrees), in `[0, 360)`.
    pub azimuth_deg: f64,

    /// Elevation (degrees), at least the configured minimum.
    pub elevation_deg: f64,

    /// Azimuth rate (deg.s⁻¹). Zero on the first step of a pass.
    pub azimuth_rate_deg_s: f64,

    /// Elevation rate (deg.s⁻¹). Zero on the first step of a pass.
    pub elevation_rate_deg_s: f64,
}

impl PassStep {
    /// Sampling instant of this step.
    pub fn instant(&self) -> MjdInstant {
        MjdInstant::new(self.mjd, self.seconds_of_day)
    }

    /// Sampling instant of this step, as a [hifitime::Epoch] in UTC.
    pub fn epoch(&self) -> Epoch {
        self.instant().epoch()
    }
}

/// One visibility pass: a non empty sequence of steps above the minimum
/// elevation, spaced by the sampling interval.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pass {
    /// Elevation threshold this pass was scanned with (degrees).
    pub minimum_elevation_deg: f64,

    /// Sampling interval between steps (seconds).
    pub interval_s: f64,

    /// Time ordered steps, first and last marking the horizon crossings
    /// (or the scanned interval boundaries).
    pub steps: Vec<PassStep>,
}

impl Pass {
    /// Instant of the first step.
    pub fn start(&self) -> Option<MjdInstant> {
        self.steps.first().map(PassStep::instant)
    }

    /// Instant of the last step.
    pub fn end(&self) -> Option<MjdInstant> {
        self.steps.last().map(PassStep::instant)
    }

    /// Scanned duration of this pass (seconds).
    pub fn duration_s(&self) -> f64 {
        match (self.start(), self.end()) {
            (Some(start), Some(end)) => end.seconds_since(&start),
            _ => 0.0,
        }
    }

    /// Highest sampled elevation (degrees).
    pub fn max_elevation_deg(&self) -> Option<f64> {
        self.steps
            .iter()
            .map(|step| step.elevation_deg)
            .reduce(f64::max)
    }
}

/// Scans an ephemeris at a fixed sampling interval and groups the samples
/// above a minimum elevation into visibility passes.
#[derive(Clone, Debug)]
pub struct PassCalculator {
    /// Elevation threshold (degrees).
    minimum_elevation_deg: f64,

    /// Sampling interval (seconds).
    interval_s: f64,

    /// Prediction source.
    interpolator: CpfInterpolator,
}

impl PassCalculator {
    /// Builds a new [PassCalculator] around this [CpfInterpolator].
    pub fn new(interpolator: CpfInterpolator, minimum_elevation_deg: f64, interval_s: f64) -> Self {
        Self {
            minimum_elevation_deg,
            interval_s,
            interpolator,
        }
    }

    /// Elevation threshold (degrees).
    pub fn minimum_elevation_deg(&self) -> f64 {
        self.minimum_elevation_deg
    }

    /// Updates the elevation threshold (degrees).
    pub fn set_minimum_elevation_deg(&mut self, minimum_elevation_deg: f64) {
        self.minimum_elevation_deg = minimum_elevation_deg;
    }

    /// Sampling interval (seconds).
    pub fn interval_s(&self) -> f64 {
        self.interval_s
    }

    /// Updates the sampling interval (seconds).
    pub fn set_interval_s(&mut self, interval_s: f64) {
        self.interval_s = interval_s;
    }

    /// Underlying prediction source.
    pub fn interpolator(&self) -> &CpfInterpolator {
        &self.interpolator
    }

    /// Walks `[start, end]` at the sampling interval and returns the
    /// visibility passes, in strictly increasing start time.
    ///
    /// The requested interval must be fully covered by the ephemeris.
    pub fn passes(&self, start: MjdInstant, end: MjdInstant) -> Result<Vec<Pass>, PassError> {
        let (table_start, table_end) = self
            .interpolator
            .available_time_window()
            .ok_or(PassError::EphemerisNotValid)?;

        if start < table_start || end > table_end {
            return Err(PassError::IntervalOutsideEphemeris);
        }

        let mut passes = Vec::<Pass>::new();
        let mut steps = Vec::<PassStep>::new();

        let mut current = start;

        while current <= end {
            let prediction = self.interpolator.predict(
                current,
                PredictionMode::AverageDistance,
                InterpolationFunction::Lagrange9,
            )?;

            if prediction.elevation_deg >= self.minimum_elevation_deg {
                let (azimuth_rate_deg_s, elevation_rate_deg_s) = match steps.last() {
                    Some(previous) => (
                        (prediction.azimuth_deg - previous.azimuth_deg) / self.interval_s,
                        (prediction.elevation_deg - previous.elevation_deg) / self.interval_s,
                    ),
                    None => (0.0, 0.0),
                };

                steps.push(PassStep {
                    mjd: current.day(),
                    seconds_of_day: current.seconds_of_day(),
                    azimuth_deg: prediction.azimuth_deg,
                    elevation_deg: prediction.elevation_deg,
                    azimuth_rate_deg_s,
                    elevation_rate_deg_s,
                });
            } else if !steps.is_empty() {
                passes.push(self.commit(std::mem::take(&mut steps)));
            }

            current = current.add_seconds(self.interval_s);
        }

        if !steps.is_empty() {
            passes.push(self.commit(steps));
        }

        debug!("found {} passes over the requested interval", passes.len());

        Ok(passes)
    }

    fn commit(&self, steps: Vec<PassStep>) -> Pass {
        Pass {
            minimum_elevation_deg: self.minimum_elevation_deg,
            interval_s: self.interval_s,
            steps,
        }
    }
}

#[cfg(test)]
mod test {
    use super::PassCalculator;
    use crate::{
        coordinates::{AngleUnit, GeocentricPoint, GeodeticPoint, LengthUnit, SurfaceLocation},
        ephemeris::{Ephemeris, PositionRecord},
        errors::PassError,
        interpolator::CpfInterpolator,
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

    #[test]
    fn empty_ephemeris_is_rejected() {
        let interpolator = CpfInterpolator::new(&Ephemeris::new(Vec::new()), station());
        let calculator = PassCalculator::new(interpolator, 9.0, 1.0);

        assert_eq!(
            calculator.passes(MjdInstant::new(60093, 0.0), MjdInstant::new(60093, 10.0)),
            Err(PassError::EphemerisNotValid)
        );
    }

    #[test]
    fn uncovered_interval_is_rejected() {
        let records = (0..30)
            .map(|k| PositionRecord::new(60093, 600.0 + 60.0 * k as f64, (7.0E6, 0.0, 0.0)))
            .collect();

        let interpolator = CpfInterpolator::new(&Ephemeris::new(records), station());
        let calculator = PassCalculator::new(interpolator, 9.0, 1.0);

        // starts before the table
        assert_eq!(
            calculator.passes(MjdInstant::new(60093, 0.0), MjdInstant::new(60093, 1000.0)),
            Err(PassError::IntervalOutsideEphemeris)
        );

        // ends after the table
        assert_eq!(
            calculator.passes(
                MjdInstant::new(60093, 700.0),
                MjdInstant::new(60093, 86000.0)
            ),
            Err(PassError::IntervalOutsideEphemeris)
        );
    }

    #[test]
    fn configuration_accessors() {
        let interpolator = CpfInterpolator::new(&Ephemeris::new(Vec::new()), station());
        let mut calculator = PassCalculator::new(interpolator, 9.0, 0.5);

        assert_eq!(calculator.minimum_elevation_deg(), 9.0);
        assert_eq!(calculator.interval_s(), 0.5);

        calculator.set_minimum_elevation_deg(15.0);
        calculator.set_interval_s(1.0);
        assert_eq!(calculator.minimum_elevation_deg(), 15.0);
        assert_eq!(calculator.interval_s(), 1.0);
    }
}
