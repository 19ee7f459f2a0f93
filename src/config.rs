//! TOML-based scenario configuration and preset definitions.
//!
//! The configuration layer is glue between a scenario file and the typed
//! domain inputs: every `to_*` conversion revalidates through the domain
//! constructors, so an invalid scenario is rejected before any
//! computation proceeds.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::battery::{
    BatteryParameters, DispatchPolicy, GridLimits, PeakShaving, SelfConsumption, TimeOfUse,
};
use crate::catalog::{Inverter, InverterKind, Location, ModuleTechnology, SolarModule};
use crate::error::SimResult;
use crate::finance::FinancialInputs;
use crate::pv::{ArrayConfiguration, LossFactors};
use crate::tariff::TariffSchedule;
use crate::weather::SyntheticWeather;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the residential preset. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::residential`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Installation site.
    #[serde(default)]
    pub location: LocationConfig,
    /// Solar module catalog record.
    #[serde(default)]
    pub module: ModuleConfig,
    /// Inverter catalog record.
    #[serde(default)]
    pub inverter: InverterConfig,
    /// Array layout and losses.
    #[serde(default)]
    pub array: ArrayConfig,
    /// Battery storage parameters.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Import/export tariff.
    #[serde(default)]
    pub tariff: TariffConfig,
    /// Household load shape.
    #[serde(default)]
    pub load: LoadConfig,
    /// Investment parameters.
    #[serde(default)]
    pub economics: EconomicsConfig,
    /// Weather synthesis and dispatch policy selection.
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Installation site.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocationConfig {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub label: String,
    pub utc_offset_hours: f64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            latitude_deg: 37.77,
            longitude_deg: -122.42,
            label: "San Francisco, CA".to_string(),
            utc_offset_hours: -8.0,
        }
    }
}

/// Solar module catalog record.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModuleConfig {
    pub manufacturer: String,
    pub model: String,
    /// STC power rating (W).
    pub power_w: f64,
    /// Module efficiency (0..1).
    pub efficiency: f64,
    pub length_m: f64,
    pub width_m: f64,
    /// `"mono"`, `"poly"`, or `"thin_film"`.
    pub technology: String,
    pub temp_coeff_pct_per_c: f64,
    pub noct_c: f64,
    pub vmp_v: f64,
    pub voc_v: f64,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            manufacturer: "Helios".to_string(),
            model: "H-360M".to_string(),
            power_w: 360.0,
            efficiency: 0.205,
            length_m: 1.76,
            width_m: 1.05,
            technology: "mono".to_string(),
            temp_coeff_pct_per_c: -0.35,
            noct_c: 44.0,
            vmp_v: 34.2,
            voc_v: 41.0,
        }
    }
}

/// Inverter catalog record.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InverterConfig {
    pub manufacturer: String,
    pub model: String,
    pub ac_rated_w: f64,
    pub max_dc_w: f64,
    pub efficiency: f64,
    pub mppt_min_v: f64,
    pub mppt_max_v: f64,
    pub mppt_trackers: u32,
    /// `"string"`, `"micro"`, or `"hybrid"`.
    pub kind: String,
}

impl Default for InverterConfig {
    fn default() -> Self {
        Self {
            manufacturer: "GridWave".to_string(),
            model: "GW-12K".to_string(),
            ac_rated_w: 12_000.0,
            max_dc_w: 16_000.0,
            efficiency: 0.97,
            mppt_min_v: 200.0,
            mppt_max_v: 800.0,
            mppt_trackers: 2,
            kind: "string".to_string(),
        }
    }
}

/// Array layout and loss fractions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArrayConfig {
    pub modules_in_series: u32,
    pub strings_in_parallel: u32,
    pub tilt_deg: f64,
    pub azimuth_deg: f64,
    pub soiling_loss: f64,
    pub shading_loss: f64,
    pub mismatch_loss: f64,
    pub dc_wiring_loss: f64,
    pub ac_wiring_loss: f64,
    pub availability_loss: f64,
}

impl Default for ArrayConfig {
    fn default() -> Self {
        Self {
            modules_in_series: 10,
            strings_in_parallel: 4,
            tilt_deg: 30.0,
            azimuth_deg: 180.0,
            soiling_loss: 0.02,
            shading_loss: 0.03,
            mismatch_loss: 0.02,
            dc_wiring_loss: 0.02,
            ac_wiring_loss: 0.01,
            availability_loss: 0.01,
        }
    }
}

/// Battery storage parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    pub capacity_kwh: f64,
    pub max_charge_kw: f64,
    pub max_discharge_kw: f64,
    pub round_trip_efficiency: f64,
    pub depth_of_discharge: f64,
    pub cycle_life: u32,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity_kwh: 10.0,
            max_charge_kw: 5.0,
            max_discharge_kw: 5.0,
            round_trip_efficiency: 0.95,
            depth_of_discharge: 0.9,
            cycle_life: 6000,
        }
    }
}

/// Import/export tariff.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TariffConfig {
    pub offpeak_rate: f64,
    pub peak_rate: f64,
    pub peak_start_hour: u32,
    pub peak_end_hour: u32,
    pub export_rate: f64,
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            offpeak_rate: 0.18,
            peak_rate: 0.38,
            peak_start_hour: 16,
            peak_end_hour: 21,
            export_rate: 0.06,
        }
    }
}

/// Household load shape: a flat base with morning and evening bumps.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadConfig {
    /// Consumption every hour (kWh).
    pub base_kwh: f64,
    /// Extra consumption during hours 6-8 (kWh).
    pub morning_peak_kwh: f64,
    /// Extra consumption during hours 18-21 (kWh).
    pub evening_peak_kwh: f64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            base_kwh: 0.6,
            morning_peak_kwh: 0.8,
            evening_peak_kwh: 1.6,
        }
    }
}

/// Investment parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EconomicsConfig {
    /// System cost after incentives.
    pub net_system_cost: f64,
    /// First-year savings plus feed-in revenue.
    pub annual_revenue_year1: f64,
    pub annual_maintenance: f64,
    pub price_inflation: f64,
    pub discount_rate: f64,
    pub horizon_years: usize,
    /// Overrides the technology-default degradation rate when set.
    pub degradation_rate: Option<f64>,
}

impl Default for EconomicsConfig {
    fn default() -> Self {
        Self {
            net_system_cost: 24_000.0,
            annual_revenue_year1: 2_600.0,
            annual_maintenance: 180.0,
            price_inflation: 0.02,
            discount_rate: 0.04,
            horizon_years: 25,
            degradation_rate: None,
        }
    }
}

/// Weather synthesis and dispatch policy selection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Seed for the synthetic weather provider.
    pub weather_seed: u64,
    /// Average cloud attenuation (0..1).
    pub cloudiness: f64,
    /// Dispatch policy: `"self_consumption"`, `"time_of_use"`, or
    /// `"peak_shaving"`.
    pub policy: String,
    /// Import-rate threshold for the time-of-use policy.
    pub tou_threshold_rate: f64,
    /// Grid import limit (kW); unlimited when absent.
    pub grid_import_limit_kw: Option<f64>,
    /// Grid export limit (kW); unlimited when absent.
    pub grid_export_limit_kw: Option<f64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            weather_seed: 42,
            cloudiness: 0.15,
            policy: "self_consumption".to_string(),
            tou_threshold_rate: 0.28,
            grid_import_limit_kw: None,
            grid_export_limit_kw: None,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"array.modules_in_series"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl ScenarioConfig {
    /// Returns the residential preset (the built-in defaults).
    pub fn residential() -> Self {
        Self {
            location: LocationConfig::default(),
            module: ModuleConfig::default(),
            inverter: InverterConfig::default(),
            array: ArrayConfig::default(),
            battery: BatteryConfig::default(),
            tariff: TariffConfig::default(),
            load: LoadConfig::default(),
            economics: EconomicsConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }

    /// Returns the commercial preset: larger array and inverter, flat
    /// daytime-heavy load, peak-shaving dispatch.
    pub fn commercial() -> Self {
        Self {
            module: ModuleConfig {
                model: "H-450C".to_string(),
                power_w: 450.0,
                efficiency: 0.215,
                length_m: 2.10,
                width_m: 1.05,
                vmp_v: 41.5,
                voc_v: 49.5,
                ..ModuleConfig::default()
            },
            inverter: InverterConfig {
                model: "GW-50K".to_string(),
                ac_rated_w: 50_000.0,
                max_dc_w: 65_000.0,
                efficiency: 0.98,
                mppt_min_v: 250.0,
                mppt_max_v: 1000.0,
                mppt_trackers: 4,
                ..InverterConfig::default()
            },
            array: ArrayConfig {
                modules_in_series: 14,
                strings_in_parallel: 9,
                tilt_deg: 15.0,
                ..ArrayConfig::default()
            },
            battery: BatteryConfig {
                capacity_kwh: 40.0,
                max_charge_kw: 20.0,
                max_discharge_kw: 20.0,
                ..BatteryConfig::default()
            },
            load: LoadConfig {
                base_kwh: 4.5,
                morning_peak_kwh: 2.0,
                evening_peak_kwh: 0.5,
            },
            economics: EconomicsConfig {
                net_system_cost: 95_000.0,
                annual_revenue_year1: 11_000.0,
                annual_maintenance: 900.0,
                ..EconomicsConfig::default()
            },
            simulation: SimulationConfig {
                policy: "peak_shaving".to_string(),
                ..SimulationConfig::default()
            },
            ..Self::residential()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["residential", "commercial"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "residential" => Ok(Self::residential()),
            "commercial" => Ok(Self::commercial()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is
    /// invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown
    /// fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates field-level constraints and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid. Deeper
    /// physical validation happens in the `to_*` conversions.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if !(-90.0..=90.0).contains(&self.location.latitude_deg) {
            errors.push(ConfigError {
                field: "location.latitude_deg".into(),
                message: "must be in [-90, 90]".into(),
            });
        }
        if !["mono", "poly", "thin_film"].contains(&self.module.technology.as_str()) {
            errors.push(ConfigError {
                field: "module.technology".into(),
                message: format!(
                    "must be \"mono\", \"poly\", or \"thin_film\", got \"{}\"",
                    self.module.technology
                ),
            });
        }
        if !["string", "micro", "hybrid"].contains(&self.inverter.kind.as_str()) {
            errors.push(ConfigError {
                field: "inverter.kind".into(),
                message: format!(
                    "must be \"string\", \"micro\", or \"hybrid\", got \"{}\"",
                    self.inverter.kind
                ),
            });
        }
        if self.array.modules_in_series == 0 {
            errors.push(ConfigError {
                field: "array.modules_in_series".into(),
                message: "must be > 0".into(),
            });
        }
        if self.array.strings_in_parallel == 0 {
            errors.push(ConfigError {
                field: "array.strings_in_parallel".into(),
                message: "must be > 0".into(),
            });
        }
        if !["self_consumption", "time_of_use", "peak_shaving"]
            .contains(&self.simulation.policy.as_str())
        {
            errors.push(ConfigError {
                field: "simulation.policy".into(),
                message: format!(
                    "must be \"self_consumption\", \"time_of_use\", or \"peak_shaving\", got \"{}\"",
                    self.simulation.policy
                ),
            });
        }
        if self.economics.horizon_years == 0 {
            errors.push(ConfigError {
                field: "economics.horizon_years".into(),
                message: "must be > 0".into(),
            });
        }

        errors
    }

    /// Builds the validated site location.
    pub fn to_location(&self) -> SimResult<Location> {
        Location::new(
            self.location.latitude_deg,
            self.location.longitude_deg,
            self.location.label.clone(),
            self.location.utc_offset_hours,
        )
    }

    /// Builds the solar module record. Unknown technology strings fall
    /// back to monocrystalline; [`Self::validate`] reports them.
    pub fn to_module(&self) -> SimResult<SolarModule> {
        let technology = match self.module.technology.as_str() {
            "poly" => ModuleTechnology::Polycrystalline,
            "thin_film" => ModuleTechnology::ThinFilm,
            _ => ModuleTechnology::Monocrystalline,
        };
        let module = SolarModule {
            manufacturer: self.module.manufacturer.clone(),
            model: self.module.model.clone(),
            power_w: self.module.power_w,
            efficiency: self.module.efficiency,
            length_m: self.module.length_m,
            width_m: self.module.width_m,
            technology,
            temp_coeff_pct_per_c: self.module.temp_coeff_pct_per_c,
            noct_c: self.module.noct_c,
            vmp_v: self.module.vmp_v,
            voc_v: self.module.voc_v,
        };
        module.validate()?;
        Ok(module)
    }

    /// Builds the inverter record.
    pub fn to_inverter(&self) -> SimResult<Inverter> {
        let kind = match self.inverter.kind.as_str() {
            "micro" => InverterKind::Micro,
            "hybrid" => InverterKind::Hybrid,
            _ => InverterKind::String,
        };
        let inverter = Inverter {
            manufacturer: self.inverter.manufacturer.clone(),
            model: self.inverter.model.clone(),
            ac_rated_w: self.inverter.ac_rated_w,
            max_dc_w: self.inverter.max_dc_w,
            efficiency: self.inverter.efficiency,
            mppt_min_v: self.inverter.mppt_min_v,
            mppt_max_v: self.inverter.mppt_max_v,
            mppt_trackers: self.inverter.mppt_trackers,
            kind,
        };
        inverter.validate()?;
        Ok(inverter)
    }

    /// Builds the validated array configuration.
    pub fn to_array(&self) -> SimResult<ArrayConfiguration> {
        ArrayConfiguration::new(
            self.array.modules_in_series,
            self.array.strings_in_parallel,
            self.array.tilt_deg,
            self.array.azimuth_deg,
            LossFactors {
                soiling: self.array.soiling_loss,
                shading: self.array.shading_loss,
                mismatch: self.array.mismatch_loss,
                dc_wiring: self.array.dc_wiring_loss,
                ac_wiring: self.array.ac_wiring_loss,
                availability: self.array.availability_loss,
            },
        )
    }

    /// Builds the validated battery parameters.
    pub fn to_battery(&self) -> SimResult<BatteryParameters> {
        BatteryParameters::new(
            self.battery.capacity_kwh,
            self.battery.max_charge_kw,
            self.battery.max_discharge_kw,
            self.battery.round_trip_efficiency,
            self.battery.depth_of_discharge,
            self.battery.cycle_life,
        )
    }

    /// Builds the validated tariff schedule.
    pub fn to_tariff(&self) -> SimResult<TariffSchedule> {
        TariffSchedule::new(
            self.tariff.offpeak_rate,
            self.tariff.peak_rate,
            self.tariff.peak_start_hour,
            self.tariff.peak_end_hour,
            self.tariff.export_rate,
        )
    }

    /// Builds the 24-entry household load profile (kWh per hour).
    pub fn to_load_profile(&self) -> [f64; 24] {
        let mut profile = [self.load.base_kwh; 24];
        for slot in profile.iter_mut().take(9).skip(6) {
            *slot += self.load.morning_peak_kwh;
        }
        for slot in profile.iter_mut().take(22).skip(18) {
            *slot += self.load.evening_peak_kwh;
        }
        profile
    }

    /// Builds the financial inputs, resolving the degradation rate from
    /// the module technology when no override is configured.
    pub fn to_financial_inputs(&self) -> SimResult<FinancialInputs> {
        let degradation_rate = match self.economics.degradation_rate {
            Some(rate) => rate,
            None => self.to_module()?.technology.default_degradation_rate(),
        };
        let inputs = FinancialInputs {
            net_system_cost: self.economics.net_system_cost,
            annual_revenue_year1: self.economics.annual_revenue_year1,
            annual_maintenance: self.economics.annual_maintenance,
            price_inflation: self.economics.price_inflation,
            discount_rate: self.economics.discount_rate,
            degradation_rate,
            horizon_years: self.economics.horizon_years,
        };
        inputs.validate()?;
        Ok(inputs)
    }

    /// Builds the dispatch policy selected by `simulation.policy`.
    /// Unknown names fall back to self-consumption; [`Self::validate`]
    /// reports them.
    pub fn to_policy(&self) -> Box<dyn DispatchPolicy> {
        match self.simulation.policy.as_str() {
            "time_of_use" => Box::new(TimeOfUse {
                threshold_rate: self.simulation.tou_threshold_rate,
            }),
            "peak_shaving" => Box::new(PeakShaving),
            _ => Box::new(SelfConsumption),
        }
    }

    /// Builds the grid limits; absent limits are unconstrained.
    pub fn to_grid_limits(&self) -> SimResult<GridLimits> {
        GridLimits::new(
            self.simulation.grid_import_limit_kw.unwrap_or(f64::INFINITY),
            self.simulation.grid_export_limit_kw.unwrap_or(f64::INFINITY),
        )
    }

    /// Builds the synthetic weather provider for this scenario.
    pub fn to_synthetic_weather(&self) -> SyntheticWeather {
        SyntheticWeather {
            seed: self.simulation.weather_seed,
            cloudiness: self.simulation.cloudiness,
            ..SyntheticWeather::default()
        }
    }
}
