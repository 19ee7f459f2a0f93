//! Hourly irradiance-to-power model: transposition, cell temperature,
//! and the DC/AC electrical chain.

use crate::catalog::{Inverter, SolarModule};
use crate::error::SimResult;
use crate::pv::array::{ArrayConfiguration, check_string_compatibility};
use crate::solar::SunPosition;
use crate::weather::DayWeather;

/// Ground reflectance used by the isotropic transposition.
const ALBEDO: f64 = 0.2;

/// Floor on sin(elevation) when deriving beam-normal irradiance, so a
/// grazing sun cannot blow the beam component up.
const MIN_SIN_ELEVATION: f64 = 0.0872; // sin(5°)

/// One hour of weather input to the power model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherSample {
    /// Global horizontal irradiance (W/m²).
    pub ghi_wm2: f64,
    /// Diffuse horizontal irradiance (W/m²).
    pub dhi_wm2: f64,
    /// Ambient temperature (°C).
    pub temp_c: f64,
    /// Wind speed (m/s).
    pub wind_ms: f64,
}

impl WeatherSample {
    /// Extracts the sample for one hour of a representative day.
    pub fn from_day(day: &DayWeather, hour: usize) -> Self {
        Self {
            ghi_wm2: day.ghi_wm2[hour],
            dhi_wm2: day.dhi_wm2[hour],
            temp_c: day.temp_c[hour],
            wind_ms: day.wind_ms[hour],
        }
    }
}

/// Electrical state of the system for one simulated hour. Immutable value.
///
/// `efficiency` and `performance_ratio` are display-only derived fields;
/// energy accounting uses `ac_power_w` alone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlySimulationResult {
    /// Hour of day (0-23).
    pub hour: usize,
    /// Global horizontal irradiance input (W/m²).
    pub ghi_wm2: f64,
    /// Plane-of-array irradiance after transposition (W/m²).
    pub poa_wm2: f64,
    /// Ambient temperature (°C).
    pub ambient_c: f64,
    /// Modeled cell temperature (°C).
    pub cell_c: f64,
    /// Array DC output (W).
    pub dc_power_w: f64,
    /// Inverter AC output after clipping (W).
    pub ac_power_w: f64,
    /// AC output over irradiance on the total module area.
    pub efficiency: f64,
    /// STP-normalized yield ratio for this hour.
    pub performance_ratio: f64,
}

/// A fully specified PV system: module, inverter, and array layout.
///
/// Construction validates every component and the string/MPPT pairing, so
/// a `PvSystem` in hand is always internally consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct PvSystem {
    pub module: SolarModule,
    pub inverter: Inverter,
    pub array: ArrayConfiguration,
}

impl PvSystem {
    /// Creates a validated system.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SimError::InvalidParameter`] for implausible
    /// records and [`crate::SimError::IncompatibleComponents`] when the
    /// string voltage falls outside the inverter's MPPT window.
    pub fn new(
        module: SolarModule,
        inverter: Inverter,
        array: ArrayConfiguration,
    ) -> SimResult<Self> {
        module.validate()?;
        inverter.validate()?;
        array.losses.validate()?;
        check_string_compatibility(&module, &inverter, array.modules_in_series)?;
        Ok(Self {
            module,
            inverter,
            array,
        })
    }

    /// Array DC rating (W).
    pub fn dc_rating_w(&self) -> f64 {
        self.array.dc_rating_w(&self.module)
    }

    /// Total module face area (m²).
    pub fn total_area_m2(&self) -> f64 {
        self.module.area_m2() * self.array.module_count() as f64
    }

    /// Simulates one hour of operation.
    ///
    /// A sun below the horizon or zero irradiance yields an all-zero
    /// result (exact zeros, never NaN). `shaded` suppresses the beam
    /// component while diffuse light survives.
    pub fn simulate_hour(
        &self,
        hour: usize,
        sample: &WeatherSample,
        sun: &SunPosition,
        shaded: bool,
    ) -> HourlySimulationResult {
        let poa = self.poa_irradiance(sample, sun, shaded);
        if poa <= 0.0 {
            return HourlySimulationResult {
                hour,
                ghi_wm2: sample.ghi_wm2,
                poa_wm2: 0.0,
                ambient_c: sample.temp_c,
                cell_c: sample.temp_c,
                dc_power_w: 0.0,
                ac_power_w: 0.0,
                efficiency: 0.0,
                performance_ratio: 0.0,
            };
        }

        let cell_c = self.cell_temperature(poa, sample.temp_c, sample.wind_ms);

        let temp_factor = 1.0 + self.module.temp_coeff_pct_per_c / 100.0 * (cell_c - 25.0);
        let dc_power_w = ((poa / 1000.0)
            * self.module.power_w
            * self.array.module_count() as f64
            * temp_factor
            * self.array.losses.dc_derate())
        .max(0.0);

        // Clipping is a hard ceiling: DC beyond the AC rating is lost.
        let ac_power_w = (dc_power_w * self.inverter.efficiency * self.array.losses.ac_derate())
            .min(self.inverter.ac_rated_w);

        let efficiency = ac_power_w / (poa * self.total_area_m2());
        let performance_ratio = (ac_power_w / self.dc_rating_w()) / (poa / 1000.0);

        HourlySimulationResult {
            hour,
            ghi_wm2: sample.ghi_wm2,
            poa_wm2: poa,
            ambient_c: sample.temp_c,
            cell_c,
            dc_power_w,
            ac_power_w,
            efficiency,
            performance_ratio,
        }
    }

    /// Isotropic-sky transposition of horizontal irradiance onto the
    /// array plane: projected beam + isotropic diffuse + ground-reflected.
    fn poa_irradiance(&self, sample: &WeatherSample, sun: &SunPosition, shaded: bool) -> f64 {
        if !sun.is_up() || sample.ghi_wm2 <= 0.0 {
            return 0.0;
        }

        let tilt = self.array.tilt_deg.to_radians();
        let elevation = sun.elevation_deg.to_radians();

        let beam_horizontal = (sample.ghi_wm2 - sample.dhi_wm2).max(0.0);
        let beam_normal = beam_horizontal / elevation.sin().max(MIN_SIN_ELEVATION);

        let cos_aoi = elevation.sin() * tilt.cos()
            + elevation.cos()
                * tilt.sin()
                * (sun.azimuth_deg - self.array.azimuth_deg).to_radians().cos();

        let beam = if shaded {
            0.0
        } else {
            beam_normal * cos_aoi.max(0.0)
        };
        let diffuse = sample.dhi_wm2 * (1.0 + tilt.cos()) / 2.0;
        let ground = sample.ghi_wm2 * ALBEDO * (1.0 - tilt.cos()) / 2.0;

        beam + diffuse + ground
    }

    /// NOCT-style linear cell temperature with a wind relief factor.
    fn cell_temperature(&self, poa_wm2: f64, ambient_c: f64, wind_ms: f64) -> f64 {
        let wind_relief = (9.5 / (5.7 + 3.8 * wind_ms.max(0.0))).min(1.0);
        ambient_c + (self.module.noct_c - 20.0) / 800.0 * poa_wm2 * wind_relief
    }
}
