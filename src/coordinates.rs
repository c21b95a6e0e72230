//! Station coordinate types.
use crate::{math::Vector3, Vector3D};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Angular storage unit of a [GeodeticPoint].
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AngleUnit {
    #[default]
    Degrees,
    Radians,
}

/// Linear storage unit of coordinate types.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LengthUnit {
    #[default]
    Meters,
    Kilometers,
}

/// Geodetic station location. The stored scalars are expressed in
/// `angle_unit` / `length_unit`; [GeodeticPoint::convert] rescales the
/// storage while preserving the physical point.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeodeticPoint {
    /// Latitude, positive north.
    pub latitude: f64,

    /// Longitude, positive east.
    pub longitude: f64,

    /// Altitude above the reference ellipsoid.
    pub altitude: f64,

    /// Unit of `latitude` and `longitude`.
    pub angle_unit: AngleUnit,

    /// Unit of `altitude`.
    pub length_unit: LengthUnit,
}

impl GeodeticPoint {
    /// Builds a new [GeodeticPoint] from latitude, longitude and altitude
    /// expressed in the provided units.
    pub fn new(
        latitude: f64,
        longitude: f64,
        altitude: f64,
        angle_unit: AngleUnit,
        length_unit: LengthUnit,
    ) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
            angle_unit,
            length_unit,
        }
    }

    /// Rescales the stored scalars to the requested units.
    /// The physical point is preserved.
    pub fn convert(&mut self, angle_unit: AngleUnit, length_unit: LengthUnit) {
        match (self.angle_unit, angle_unit) {
            (AngleUnit::Degrees, AngleUnit::Radians) => {
                self.latitude = self.latitude.to_radians();
                self.longitude = self.longitude.to_radians();
            },
            (AngleUnit::Radians, AngleUnit::Degrees) => {
                self.latitude = self.latitude.to_degrees();
                self.longitude = self.longitude.to_degrees();
            },
            _ => {},
        }

        match (self.length_unit, length_unit) {
            (LengthUnit::Meters, LengthUnit::Kilometers) => {
                self.altitude *= 1.0E-3;
            },
            (LengthUnit::Kilometers, LengthUnit::Meters) => {
                self.altitude *= 1.0E3;
            },
            _ => {},
        }

        self.angle_unit = angle_unit;
        self.length_unit = length_unit;
    }

    /// Copies and returns [Self] converted to the requested units.
    pub fn converted(&self, angle_unit: AngleUnit, length_unit: LengthUnit) -> Self {
        let mut point = *self;
        point.convert(angle_unit, length_unit);
        point
    }
}

/// Geocentric (Earth-fixed cartesian) station location, stored in meters.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeocentricPoint {
    pub x_m: f64,
    pub y_m: f64,
    pub z_m: f64,
}

impl GeocentricPoint {
    /// Builds a new [GeocentricPoint] from cartesian coordinates in meters.
    pub fn new(x_m: f64, y_m: f64, z_m: f64) -> Self {
        Self { x_m, y_m, z_m }
    }

    /// Returns the (x, y, z) coordinates expressed in the requested unit.
    pub fn coordinates(&self, unit: LengthUnit) -> Vector3D {
        match unit {
            LengthUnit::Meters => (self.x_m, self.y_m, self.z_m),
            LengthUnit::Kilometers => (self.x_m * 1.0E-3, self.y_m * 1.0E-3, self.z_m * 1.0E-3),
        }
    }

    pub(crate) fn to_vector(self) -> Vector3 {
        Vector3::new(self.x_m, self.y_m, self.z_m)
    }
}

/// Paired geodetic / geocentric description of the same physical station.
/// Both representations are provided externally and must agree to
/// millimeter precision: the library never re-derives one from the other.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SurfaceLocation {
    pub geodetic: GeodeticPoint,
    pub geocentric: GeocentricPoint,
}

impl SurfaceLocation {
    pub fn new(geodetic: GeodeticPoint, geocentric: GeocentricPoint) -> Self {
        Self {
            geodetic,
            geocentric,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn geodetic_conversion_roundtrip() {
        let mut point = GeodeticPoint::new(
            36.46525556,
            353.79469440,
            98.177,
            AngleUnit::Degrees,
            LengthUnit::Meters,
        );

        point.convert(AngleUnit::Radians, LengthUnit::Kilometers);
        assert_eq!(point.angle_unit, AngleUnit::Radians);
        assert_abs_diff_eq!(point.latitude, 0.6364388, epsilon = 1e-6);
        assert_abs_diff_eq!(point.altitude, 0.098177, epsilon = 1e-12);

        point.convert(AngleUnit::Degrees, LengthUnit::Meters);
        assert_abs_diff_eq!(point.latitude, 36.46525556, epsilon = 1e-9);
        assert_abs_diff_eq!(point.longitude, 353.79469440, epsilon = 1e-9);
        assert_abs_diff_eq!(point.altitude, 98.177, epsilon = 1e-9);
    }

    #[test]
    fn conversion_to_same_unit_is_identity() {
        let point = GeodeticPoint::new(10.0, 20.0, 30.0, AngleUnit::Degrees, LengthUnit::Meters);
        assert_eq!(point.converted(AngleUnit::Degrees, LengthUnit::Meters), point);
    }

    #[test]
    fn geocentric_extraction() {
        let point = GeocentricPoint::new(5105473.885, -555110.526, 3769892.958);
        let (x_km, y_km, z_km) = point.coordinates(LengthUnit::Kilometers);
        assert_abs_diff_eq!(x_km, 5105.473885, epsilon = 1e-9);
        assert_abs_diff_eq!(y_km, -555.110526, epsilon = 1e-9);
        assert_abs_diff_eq!(z_km, 3769.892958, epsilon = 1e-9);
    }
}
