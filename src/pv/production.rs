//! Production aggregation: the hourly model swept across days, months,
//! and years.

use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::pv::power::{HourlySimulationResult, PvSystem, WeatherSample};
use crate::solar::{Obstruction, is_shaded, sun_position};
use crate::weather::WeatherData;

/// Aggregated production for one month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyResult {
    /// Calendar month (1-12).
    pub month: u32,
    /// AC energy for the whole month (kWh).
    pub energy_kwh: f64,
    /// AC energy per hour of the representative day (kWh).
    pub daily_profile_kwh: [f64; 24],
}

/// Aggregated production for one year.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnualResult {
    /// Total AC energy (kWh).
    pub energy_kwh: f64,
    /// Annual energy per installed DC capacity (kWh/kWp).
    pub specific_yield_kwh_per_kwp: f64,
    /// Mean performance ratio over hours with non-zero irradiance.
    pub performance_ratio: f64,
    /// Per-month breakdown, January first.
    pub months: Vec<MonthlyResult>,
}

/// Sweeps the hourly power model across a weather series for one system.
///
/// Borrows its inputs immutably; every call computes a fresh result owned
/// by the caller. Runs are deterministic and require no internal locking.
#[derive(Debug, Clone)]
pub struct ProductionSimulator<'a> {
    system: &'a PvSystem,
    weather: &'a WeatherData,
    obstructions: &'a [Obstruction],
}

impl<'a> ProductionSimulator<'a> {
    pub fn new(
        system: &'a PvSystem,
        weather: &'a WeatherData,
        obstructions: &'a [Obstruction],
    ) -> Self {
        Self {
            system,
            weather,
            obstructions,
        }
    }

    /// Simulates the representative day of a month, hour by hour.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::MissingWeatherData`] when the weather series
    /// has no record for the month.
    pub fn simulate_day(&self, month: u32) -> SimResult<Vec<HourlySimulationResult>> {
        let day = self.weather.month(month)?;
        let latitude = self.weather.location.latitude_deg;

        let mut hours = Vec::with_capacity(24);
        for hour in 0..24 {
            let sun = sun_position(latitude, month, hour as u32)?;
            // Below the horizon the shading check is skipped outright.
            let shaded = sun.is_up() && is_shaded(self.obstructions, &sun);
            let sample = WeatherSample::from_day(day, hour);
            hours.push(self.system.simulate_hour(hour, &sample, &sun, shaded));
        }
        Ok(hours)
    }

    /// Aggregates one month by scaling its representative day.
    pub fn simulate_month(&self, month: u32) -> SimResult<MonthlyResult> {
        let hours = self.simulate_day(month)?;
        aggregate_month(month, &hours)
    }

    /// Aggregates the full year.
    ///
    /// Specific yield divides by the array DC rating; the average
    /// performance ratio excludes zero-irradiance hours from the mean.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::MissingWeatherData`] on the first absent month
    /// rather than substituting zero.
    pub fn simulate_year(&self) -> SimResult<AnnualResult> {
        let mut months = Vec::with_capacity(12);
        let mut pr_sum = 0.0;
        let mut pr_hours = 0usize;

        for month in 1..=12 {
            let hours = self.simulate_day(month)?;
            for result in &hours {
                if result.poa_wm2 > 0.0 {
                    pr_sum += result.performance_ratio;
                    pr_hours += 1;
                }
            }
            months.push(aggregate_month(month, &hours)?);
        }

        let energy_kwh: f64 = months.iter().map(|m| m.energy_kwh).sum();
        let dc_rating_kwp = self.system.dc_rating_w() / 1000.0;
        let performance_ratio = if pr_hours > 0 {
            pr_sum / pr_hours as f64
        } else {
            0.0
        };

        debug!(energy_kwh, performance_ratio, "aggregated year");
        Ok(AnnualResult {
            energy_kwh,
            specific_yield_kwh_per_kwp: energy_kwh / dc_rating_kwp,
            performance_ratio,
            months,
        })
    }
}

/// Scales a representative day up to its calendar month.
fn aggregate_month(month: u32, hours: &[HourlySimulationResult]) -> SimResult<MonthlyResult> {
    let mut daily_profile_kwh = [0.0; 24];
    for (slot, result) in daily_profile_kwh.iter_mut().zip(hours) {
        *slot = result.ac_power_w / 1000.0;
    }
    let daily_kwh: f64 = daily_profile_kwh.iter().sum();
    let energy_kwh = daily_kwh * days_in_month(month)? as f64;

    debug!(month, energy_kwh, "aggregated month");
    Ok(MonthlyResult {
        month,
        energy_kwh,
        daily_profile_kwh,
    })
}

/// Projects annual energy over a system lifetime with compounding
/// degradation: year y yields `first_year × (1 − rate)^(y−1)`.
///
/// The rate is a parameter, not a shared constant — technology defaults
/// come from [`crate::catalog::ModuleTechnology::default_degradation_rate`]
/// and callers may override them.
///
/// # Errors
///
/// Returns [`SimError::InvalidParameter`] if the rate is outside [0, 1)
/// or `years` is zero.
pub fn multi_year_forecast(
    first_year_kwh: f64,
    degradation_rate: f64,
    years: usize,
) -> SimResult<Vec<f64>> {
    if !(0.0..1.0).contains(&degradation_rate) {
        return Err(SimError::invalid("degradation_rate", "must be in [0, 1)"));
    }
    if years == 0 {
        return Err(SimError::invalid("years", "must be > 0"));
    }
    Ok((0..years)
        .map(|y| first_year_kwh * (1.0 - degradation_rate).powi(y as i32))
        .collect())
}

/// Days per month of the non-leap reference year.
pub fn days_in_month(month: u32) -> SimResult<u32> {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => Ok(31),
        4 | 6 | 9 | 11 => Ok(30),
        2 => Ok(28),
        _ => Err(SimError::invalid("month", "must be in [1, 12]")),
    }
}
