//! Surface meteorological data and water vapor pressure models.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One surface meteorological sample. Immutable after insertion.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeteoRecord {
    /// Sampling time tag, in seconds of day.
    pub time_tag_sod: f64,

    /// Surface pressure (mbar)
    pub pressure_mbar: f64,

    /// Surface temperature (K)
    pub temperature_k: f64,

    /// Surface relative humidity (%)
    pub humidity_pct: f64,
}

impl MeteoRecord {
    pub fn new(time_tag_sod: f64, pressure_mbar: f64, temperature_k: f64, humidity_pct: f64) -> Self {
        Self {
            time_tag_sod,
            pressure_mbar,
            temperature_k,
            humidity_pct,
        }
    }
}

/// Water vapor pressure model selector.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WaterVaporPressureModel {
    /// The formulation published with the original Marini and Murray model.
    OriginalMariniMurray,

    /// Saturation pressure after Giacomo (1982) and Davis (1992), with the
    /// Giacomo enhancement factor.
    #[default]
    GiacomoDavis,
}

/// Water vapor pressure (mbar) at the surface, from relative humidity (%),
/// temperature (K) and pressure (mbar).
pub fn water_vapor_pressure(
    humidity_pct: f64,
    temperature_k: f64,
    pressure_mbar: f64,
    model: WaterVaporPressureModel,
) -> f64 {
    match model {
        WaterVaporPressureModel::OriginalMariniMurray => {
            let temperature_c = temperature_k - 273.15;
            humidity_pct * 6.11E-2 * 10.0_f64.powf(7.5 * temperature_c / (237.3 + temperature_c))
        },
        WaterVaporPressureModel::GiacomoDavis => {
            // saturation vapor pressure (mbar)
            let saturation = 0.01
                * (1.2378847E-5 * temperature_k.powi(2) - 1.9121316E-2 * temperature_k
                    + 33.93711047
                    - 6.3431645E3 / temperature_k)
                    .exp();

            let enhancement =
                1.00062 + 3.14E-6 * pressure_mbar + 5.6E-7 * (temperature_k - 273.15).powi(2);

            humidity_pct * 0.01 * enhancement * saturation
        },
    }
}
