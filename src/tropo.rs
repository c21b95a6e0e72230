//! Marini and Murray tropospheric path delay.
use crate::meteo::{water_vapor_pressure, WaterVaporPressureModel};

/// One-way tropospheric path delay (meters) after Marini and Murray.
///
/// ## Input
/// - pressure_mbar: surface pressure (mbar)
/// - temperature_k: surface temperature (K)
/// - humidity_pct: surface relative humidity (%)
/// - elevation_rad: apparent elevation of the target (radians)
/// - wavelength_um: laser wavelength (micrometers)
/// - latitude_rad: station geodetic latitude (radians)
/// - altitude_m: station altitude above the ellipsoid (meters)
/// - model: [WaterVaporPressureModel] used for the wet component
///
/// Callers double the returned value for the round trip correction.
pub fn path_delay_marini_murray(
    pressure_mbar: f64,
    temperature_k: f64,
    humidity_pct: f64,
    elevation_rad: f64,
    wavelength_um: f64,
    latitude_rad: f64,
    altitude_m: f64,
    model: WaterVaporPressureModel,
) -> f64 {
    let e0 = water_vapor_pressure(humidity_pct, temperature_k, pressure_mbar, model);

    let a = 0.2357E-2 * pressure_mbar + 0.141E-3 * e0;

    let k = 1.163
        - 0.968E-2 * (2.0 * latitude_rad).cos()
        - 0.104E-2 * temperature_k
        + 0.1435E-4 * pressure_mbar;

    let b = 1.084E-8 * pressure_mbar * temperature_k * k
        + 4.734E-8 * (2.0 * pressure_mbar.powi(2)) / (temperature_k * (3.0 - 1.0 / k));

    // laser frequency parameter and laser site function
    let f_lambda = 0.9650 + 0.0164 * wavelength_um.powi(-2) + 0.228E-3 * wavelength_um.powi(-4);
    let f_site = 1.0 - 0.26E-2 * (2.0 * latitude_rad).cos() - 0.31E-6 * altitude_m;

    let sine = elevation_rad.sin();
    let ab = a + b;

    (f_lambda / f_site) * (ab / (sine + (b / ab) / (sine + 0.01)))
}
