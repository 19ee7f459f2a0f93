//! Integration tests for the solar-to-production pipeline.

mod common;

use approx::assert_relative_eq;
use pvsite_sim::SimError;
use pvsite_sim::pv::{ProductionSimulator, multi_year_forecast};
use pvsite_sim::solar::{Obstruction, sun_position};
use pvsite_sim::weather::WeatherData;

#[test]
fn annual_run_covers_twelve_months() {
    let system = common::default_system();
    let weather = common::default_weather();
    let sim = ProductionSimulator::new(&system, &weather, &[]);
    let year = sim.simulate_year().unwrap();

    assert_eq!(year.months.len(), 12);
    for (index, month) in year.months.iter().enumerate() {
        assert_eq!(month.month as usize, index + 1);
        assert!(month.energy_kwh > 0.0, "month {} produced nothing", month.month);
    }
}

#[test]
fn specific_yield_reproducible_from_hourly_sums() {
    let system = common::default_system();
    let weather = common::default_weather();
    let sim = ProductionSimulator::new(&system, &weather, &[]);
    let year = sim.simulate_year().unwrap();

    // Re-sum the hourly energies independently of the aggregator.
    let mut annual_kwh = 0.0;
    for month in 1..=12 {
        let day = sim.simulate_day(month).unwrap();
        let daily_kwh: f64 = day.iter().map(|h| h.ac_power_w / 1000.0).sum();
        let days = match month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31.0,
            4 | 6 | 9 | 11 => 30.0,
            _ => 28.0,
        };
        annual_kwh += daily_kwh * days;
    }

    assert_relative_eq!(year.energy_kwh, annual_kwh, max_relative = 1e-12);
    let dc_kwp = 360.0 * 10.0 * 4.0 / 1000.0;
    assert_relative_eq!(
        year.specific_yield_kwh_per_kwp,
        annual_kwh / dc_kwp,
        max_relative = 1e-12
    );
}

#[test]
fn powers_are_zero_and_finite_whenever_sun_is_down() {
    let system = common::default_system();
    let weather = common::default_weather();
    let sim = ProductionSimulator::new(&system, &weather, &[]);

    for month in 1..=12 {
        let day = sim.simulate_day(month).unwrap();
        for result in &day {
            let sun = sun_position(37.77, month, result.hour as u32).unwrap();
            if !sun.is_up() {
                assert_eq!(result.dc_power_w, 0.0, "month {month} hour {}", result.hour);
                assert_eq!(result.ac_power_w, 0.0, "month {month} hour {}", result.hour);
            }
            assert!(result.dc_power_w.is_finite());
            assert!(result.ac_power_w >= 0.0);
        }
    }
}

#[test]
fn ac_power_never_exceeds_inverter_rating_over_the_year() {
    let system = common::default_system();
    let weather = common::default_weather();
    let sim = ProductionSimulator::new(&system, &weather, &[]);

    for month in 1..=12 {
        for result in sim.simulate_day(month).unwrap() {
            assert!(
                result.ac_power_w <= system.inverter.ac_rated_w,
                "clipping violated in month {month} hour {}",
                result.hour
            );
        }
    }
}

#[test]
fn identical_runs_produce_identical_results() {
    let system = common::default_system();
    let weather = common::default_weather();
    let first = ProductionSimulator::new(&system, &weather, &[])
        .simulate_year()
        .unwrap();
    let second = ProductionSimulator::new(&system, &weather, &[])
        .simulate_year()
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn missing_month_fails_instead_of_zeroing() {
    let system = common::default_system();
    let mut weather = WeatherData::new(common::default_location());
    let full = common::default_weather();
    for month in 1..=11 {
        weather
            .insert_month(month, full.month(month).unwrap().clone())
            .unwrap();
    }
    let sim = ProductionSimulator::new(&system, &weather, &[]);
    assert_eq!(
        sim.simulate_year().unwrap_err(),
        SimError::MissingWeatherData { month: 12 }
    );
}

#[test]
fn southern_horizon_obstruction_costs_energy() {
    let system = common::default_system();
    let weather = common::default_weather();
    let clear = ProductionSimulator::new(&system, &weather, &[])
        .simulate_year()
        .unwrap();

    let ridge = vec![Obstruction::HorizonSegment {
        elevation_deg: 30.0,
        azimuth_start_deg: 120.0,
        azimuth_end_deg: 240.0,
    }];
    let shaded = ProductionSimulator::new(&system, &weather, &ridge)
        .simulate_year()
        .unwrap();

    assert!(shaded.energy_kwh < clear.energy_kwh);
    // Winter months suffer most: the sun sits lower in the blocked arc.
    assert!(shaded.months[11].energy_kwh < clear.months[11].energy_kwh);
}

#[test]
fn multi_year_forecast_decays_toward_technology_rate() {
    let system = common::default_system();
    let weather = common::default_weather();
    let year = ProductionSimulator::new(&system, &weather, &[])
        .simulate_year()
        .unwrap();

    let rate = system.module.technology.default_degradation_rate();
    let forecast = multi_year_forecast(year.energy_kwh, rate, 25).unwrap();
    assert_eq!(forecast.len(), 25);
    assert_eq!(forecast[0], year.energy_kwh);
    for window in forecast.windows(2) {
        assert!((window[1] / window[0] - (1.0 - rate)).abs() < 1e-12);
    }
}
