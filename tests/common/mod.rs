//! Shared test fixtures for integration tests.

#![allow(dead_code)] // each test binary uses a subset of the fixtures

use pvsite_sim::battery::BatteryParameters;
use pvsite_sim::catalog::{Inverter, InverterKind, Location, ModuleTechnology, SolarModule};
use pvsite_sim::finance::FinancialInputs;
use pvsite_sim::pv::{ArrayConfiguration, LossFactors, PvSystem};
use pvsite_sim::tariff::TariffSchedule;
use pvsite_sim::weather::{SyntheticWeather, WeatherData};

/// Default installation site (San Francisco).
pub fn default_location() -> Location {
    Location::new(37.77, -122.42, "San Francisco, CA", -8.0).unwrap()
}

/// Default 360 W monocrystalline module.
pub fn default_module() -> SolarModule {
    SolarModule {
        manufacturer: "Helios".to_string(),
        model: "H-360M".to_string(),
        power_w: 360.0,
        efficiency: 0.205,
        length_m: 1.76,
        width_m: 1.05,
        technology: ModuleTechnology::Monocrystalline,
        temp_coeff_pct_per_c: -0.35,
        noct_c: 44.0,
        vmp_v: 34.2,
        voc_v: 41.0,
    }
}

/// Default 12 kW string inverter with a 200-800 V MPPT window.
pub fn default_inverter() -> Inverter {
    Inverter {
        manufacturer: "GridWave".to_string(),
        model: "GW-12K".to_string(),
        ac_rated_w: 12_000.0,
        max_dc_w: 16_000.0,
        efficiency: 0.97,
        mppt_min_v: 200.0,
        mppt_max_v: 800.0,
        mppt_trackers: 2,
        kind: InverterKind::String,
    }
}

/// Default array: 10 in series × 4 strings, 30° tilt, due south.
pub fn default_array() -> ArrayConfiguration {
    ArrayConfiguration::new(10, 4, 30.0, 180.0, LossFactors::default()).unwrap()
}

/// Default 14.4 kWp system built from the fixtures above.
pub fn default_system() -> PvSystem {
    PvSystem::new(default_module(), default_inverter(), default_array()).unwrap()
}

/// Deterministic 12-month synthetic weather series (seed 42).
pub fn default_weather() -> WeatherData {
    SyntheticWeather::default()
        .generate(&default_location())
        .unwrap()
}

/// Default battery (10 kWh, 5 kW, 95% round trip, 90% DoD).
pub fn default_battery() -> BatteryParameters {
    BatteryParameters::new(10.0, 5.0, 5.0, 0.95, 0.9, 6000).unwrap()
}

/// Time-of-use tariff with a 16-21 h peak window.
pub fn tou_tariff() -> TariffSchedule {
    TariffSchedule::new(0.18, 0.38, 16, 21, 0.06).unwrap()
}

/// Flat tariff for cases where hour-of-day must not matter.
pub fn flat_tariff() -> TariffSchedule {
    TariffSchedule::flat(0.25, 0.08).unwrap()
}

/// Default investment inputs (25-year horizon).
pub fn default_financial_inputs() -> FinancialInputs {
    FinancialInputs {
        net_system_cost: 24_000.0,
        annual_revenue_year1: 2_600.0,
        annual_maintenance: 180.0,
        price_inflation: 0.02,
        discount_rate: 0.04,
        degradation_rate: 0.004,
        horizon_years: 25,
    }
}

/// Bell-shaped single-day production profile peaking at noon (kWh/h).
pub fn bell_production() -> [f64; 24] {
    let mut production = [0.0; 24];
    for (hour, slot) in production.iter_mut().enumerate() {
        if (6..=18).contains(&hour) {
            let x = (hour as f64 - 12.0) / 6.0;
            *slot = 6.0 * (1.0 - x * x).max(0.0);
        }
    }
    production
}

/// Household load with morning and evening peaks (kWh/h).
pub fn household_load() -> [f64; 24] {
    let mut load = [0.6; 24];
    for slot in load.iter_mut().take(9).skip(6) {
        *slot += 0.8;
    }
    for slot in load.iter_mut().take(22).skip(18) {
        *slot += 1.6;
    }
    load
}
