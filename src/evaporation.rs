/*!
Module for vapor pressure and open-water evaporation.

Saturation vapor pressure follows the Clausius-Clapeyron approximation used in most
introductory texts. Evaporation is estimated with two empirical mass-transfer formulas:

* Meyer (1915): E = C·(es − ea)·(1 + W/10), with E in in/day, pressures in inHg and
  wind speed W in mph.
* Dunne (1978): E = (0.013 + 0.00016·u)·ea·(100 − RH)/100, with E in cm/day, ea in mb
  and wind run u in km/day.
*/
use serde::Deserialize;

use crate::error::{HydroError, Result, finite, non_negative};

pub const PA_TO_IN_HG: f64 = 2.9533e-4;
pub const PA_TO_MB: f64 = 0.01;
pub const IN_TO_CM: f64 = 2.54;
pub const MPH_TO_KM_PER_HR: f64 = 1.61;

/** Meyer coefficient for large, deep water bodies. */
pub const MEYER_LARGE_LAKE: f64 = 0.36;

/** Saturation vapor pressure [Pa] at air temperature `temp` [°C]. */
pub fn saturation_vapor_pressure(temp: f64) -> f64 {
    611.0 * (17.27 * temp / (temp + 237.3)).exp()
}

/** Checked form of [`saturation_vapor_pressure`]. */
pub fn try_saturation_vapor_pressure(temp: f64) -> Result<f64> {
    finite("temperature", temp)?;
    if temp + 237.3 == 0.0 {
        return Err(HydroError::OutOfRange {
            name: "temperature",
            value: temp,
            reason: "-237.3 °C is a pole of the Clausius-Clapeyron approximation",
        });
    }
    Ok(saturation_vapor_pressure(temp))
}

/** Relative humidity [%] from actual and saturation vapor pressures. */
pub fn relative_humidity(actual: f64, saturation: f64) -> f64 {
    100.0 * actual / saturation
}

/** Meyer evaporation [in/day]; pressures in inHg, wind in mph. */
pub fn meyer_evaporation(coefficient: f64, es_in_hg: f64, ea_in_hg: f64, wind_mph: f64) -> f64 {
    coefficient * (es_in_hg - ea_in_hg) * (1.0 + wind_mph / 10.0)
}

/** Dunne evaporation [cm/day]; vapor pressure in mb, wind run in km/day. */
pub fn dunne_evaporation(ea_mb: f64, relative_humidity: f64, wind_km_per_day: f64) -> f64 {
    (0.013 + 0.00016 * wind_km_per_day) * ea_mb * ((100.0 - relative_humidity) / 100.0)
}

// Daily meteorology over an open water surface
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Weather {
    pub air_temperature: f64, // [°C]
    pub dew_point: f64,       // [°C], sets the actual vapor pressure
    pub wind_speed_mph: f64,  // [mph]
    #[serde(default = "default_meyer_coefficient")]
    pub meyer_coefficient: f64,
}

fn default_meyer_coefficient() -> f64 {
    MEYER_LARGE_LAKE
}

impl Weather {
    pub fn new(air_temperature: f64, dew_point: f64, wind_speed_mph: f64) -> Result<Self> {
        let weather = Weather {
            air_temperature,
            dew_point,
            wind_speed_mph,
            meyer_coefficient: MEYER_LARGE_LAKE,
        };
        weather.validate()?;
        Ok(weather)
    }

    pub fn validate(&self) -> Result<()> {
        try_saturation_vapor_pressure(self.air_temperature)?;
        try_saturation_vapor_pressure(self.dew_point)?;
        non_negative("wind speed", self.wind_speed_mph)?;
        non_negative("Meyer coefficient", self.meyer_coefficient)?;
        if self.dew_point > self.air_temperature {
            return Err(HydroError::OutOfRange {
                name: "dew point",
                value: self.dew_point,
                reason: "cannot exceed the air temperature",
            });
        }
        Ok(())
    }

    pub fn saturation_vapor_pressure(&self) -> f64 {
        saturation_vapor_pressure(self.air_temperature)
    }

    pub fn actual_vapor_pressure(&self) -> f64 {
        saturation_vapor_pressure(self.dew_point)
    }

    pub fn relative_humidity(&self) -> f64 {
        relative_humidity(self.actual_vapor_pressure(), self.saturation_vapor_pressure())
    }

    /** Meyer evaporation converted to cm/day. */
    pub fn meyer(&self) -> f64 {
        meyer_evaporation(
            self.meyer_coefficient,
            self.saturation_vapor_pressure() * PA_TO_IN_HG,
            self.actual_vapor_pressure() * PA_TO_IN_HG,
            self.wind_speed_mph,
        ) * IN_TO_CM
    }

    /** Dunne evaporation in cm/day. */
    pub fn dunne(&self) -> f64 {
        let wind_run = self.wind_speed_mph * MPH_TO_KM_PER_HR * 24.0;
        dunne_evaporation(
            self.actual_vapor_pressure() * PA_TO_MB,
            self.relative_humidity(),
            wind_run,
        )
    }
}
