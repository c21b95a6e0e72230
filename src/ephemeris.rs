//! Tabulated geocentric ephemeris, as distributed in prediction files.
use crate::{MjdInstant, Vector3D};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One tabulated geocentric position sample.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PositionRecord {
    /// Integer Modified Julian Day of this sample.
    pub mjd: u32,

    /// Seconds elapsed in `mjd`.
    pub seconds_of_day: f64,

    /// Geocentric position, in meters ECEF.
    pub position_m: Vector3D,

    /// Geocentric velocity vector in m.s⁻¹, when distributed.
    pub velocity_m_s: Option<Vector3D>,
}

impl PositionRecord {
    /// Builds a new [PositionRecord] without velocity information.
    pub fn new(mjd: u32, seconds_of_day: f64, position_m: Vector3D) -> Self {
        Self {
            mjd,
            seconds_of_day,
            position_m,
            velocity_m_s: None,
        }
    }

    /// Copies and returns [Self] with a velocity vector.
    pub fn with_velocity_m_s(&self, velocity_m_s: Vector3D) -> Self {
        let mut record = *self;
        record.velocity_m_s = Some(velocity_m_s);
        record
    }

    /// Sampling instant of this record.
    pub fn instant(&self) -> MjdInstant {
        MjdInstant::new(self.mjd, self.seconds_of_day)
    }
}

/// Tabulated satellite ephemeris: time-ordered geocentric position
/// records, with the optional center of mass correction published in the
/// prediction header.
#[derive(Default, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ephemeris {
    /// Retro-reflector array offset with respect to the satellite center
    /// of mass (meters), when published.
    com_correction_m: Option<f64>,

    /// Time-ordered position records.
    records: Vec<PositionRecord>,
}

impl Ephemeris {
    /// Builds a new [Ephemeris] from time-ordered position records.
    pub fn new(records: Vec<PositionRecord>) -> Self {
        Self {
            com_correction_m: None,
            records,
        }
    }

    /// Copies and returns [Self] with the center of mass correction, in meters.
    pub fn with_com_correction_m(&self, com_correction_m: f64) -> Self {
        let mut ephemeris = self.clone();
        ephemeris.com_correction_m = Some(com_correction_m);
        ephemeris
    }

    /// Center of mass correction (meters), when published.
    pub fn com_correction_m(&self) -> Option<f64> {
        self.com_correction_m
    }

    /// Tabulated position records.
    pub fn records(&self) -> &[PositionRecord] {
        &self.records
    }

    /// Returns true if this [Ephemeris] holds no position record.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total number of position records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Instant of the first tabulated record.
    pub fn first_instant(&self) -> Option<MjdInstant> {
        self.records.first().map(PositionRecord::instant)
    }

    /// Instant of the last tabulated record.
    pub fn last_instant(&self) -> Option<MjdInstant> {
        self.records.last().map(PositionRecord::instant)
    }

    /// Sampling instant and geocentric coordinates [Iterator].
    pub fn positions_iter(&self) -> impl Iterator<Item = (MjdInstant, Vector3D)> + '_ {
        self.records.iter().map(|rec| (rec.instant(), rec.position_m))
    }

    /// Returns true if all records are evenly spaced in time.
    /// You should verify this prior to any interpolation (post processing).
    pub fn has_steady_sampling(&self) -> bool {
        let mut spacing = Option::<f64>::None;

        for pair in self.records.windows(2) {
            let dt = pair[1].instant().seconds_since(&pair[0].instant());

            if let Some(spacing) = spacing {
                if (dt - spacing).abs() > 1.0E-6 {
                    return false;
                }
            }

            spacing = Some(dt);
        }
        true
    }
}

#[cfg(test)]
mod test {
    use super::{Ephemeris, PositionRecord};
    use crate::MjdInstant;

    fn synthetic(interval_s: f64) -> Ephemeris {
        let records = (0..10)
            .map(|k| {
                PositionRecord::new(
                    60093,
                    43200.0 + k as f64 * interval_s,
                    (7.0E6 + k as f64, 0.0, 0.0),
                )
            })
            .collect();
        Ephemeris::new(records)
    }

    #[test]
    fn time_interval_queries() {
        let ephemeris = synthetic(180.0);
        assert!(!ephemeris.is_empty());
        assert_eq!(ephemeris.len(), 10);
        assert_eq!(
            ephemeris.first_instant(),
            Some(MjdInstant::new(60093, 43200.0))
        );
        assert_eq!(
            ephemeris.last_instant(),
            Some(MjdInstant::new(60093, 43200.0 + 9.0 * 180.0))
        );
    }

    #[test]
    fn steady_sampling_detection() {
        assert!(synthetic(180.0).has_steady_sampling());

        let mut records: Vec<_> = synthetic(60.0).records().to_vec();
        records.last_mut().unwrap().seconds_of_day += 1.0;
        assert!(!Ephemeris::new(records).has_steady_sampling());

        // trivially steady
        assert!(Ephemeris::new(Vec::new()).has_steady_sampling());
    }

    #[test]
    fn com_correction_is_optional() {
        let ephemeris = synthetic(180.0);
        assert_eq!(ephemeris.com_correction_m(), None);
        assert_eq!(
            ephemeris.with_com_correction_m(0.251).com_correction_m(),
            Some(0.251)
        );
    }
}
