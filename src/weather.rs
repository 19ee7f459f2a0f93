//! Weather time series consumed by the simulation pipeline.
//!
//! The core never fetches weather itself: an external provider (file, API,
//! or the synthetic generator below) must deliver a complete, immutable
//! series before the deterministic pipeline begins.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::catalog::Location;
use crate::error::{SimError, SimResult};
use crate::solar::sun_position;

/// Representative-day weather record for one month: 24-entry sequences of
/// irradiance, temperature, wind, and humidity.
#[derive(Debug, Clone, PartialEq)]
pub struct DayWeather {
    /// Global horizontal irradiance (W/m²) per hour.
    pub ghi_wm2: [f64; 24],
    /// Diffuse horizontal irradiance (W/m²) per hour.
    pub dhi_wm2: [f64; 24],
    /// Ambient temperature (°C) per hour.
    pub temp_c: [f64; 24],
    /// Wind speed (m/s) per hour.
    pub wind_ms: [f64; 24],
    /// Relative humidity (%) per hour.
    pub humidity_pct: [f64; 24],
}

/// Location-tagged mapping from month (1-12) to a representative day.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherData {
    /// Site the series was recorded or generated for.
    pub location: Location,
    months: BTreeMap<u32, DayWeather>,
}

impl WeatherData {
    /// Creates an empty series for the given location.
    pub fn new(location: Location) -> Self {
        Self {
            location,
            months: BTreeMap::new(),
        }
    }

    /// Inserts the representative day for a month (1-12).
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] if the month is out of range.
    pub fn insert_month(&mut self, month: u32, day: DayWeather) -> SimResult<()> {
        if !(1..=12).contains(&month) {
            return Err(SimError::invalid("month", "must be in [1, 12]"));
        }
        self.months.insert(month, day);
        Ok(())
    }

    /// The representative day for a month.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::MissingWeatherData`] when the month is absent.
    /// Zero-substitution would silently corrupt annual totals, so an
    /// absent month fails loudly instead.
    pub fn month(&self, month: u32) -> SimResult<&DayWeather> {
        self.months
            .get(&month)
            .ok_or(SimError::MissingWeatherData { month })
    }

    /// Months present in the series, ascending.
    pub fn available_months(&self) -> impl Iterator<Item = u32> + '_ {
        self.months.keys().copied()
    }
}

/// Seeded synthetic weather generator.
///
/// Stands in for the external weather provider in tests and sizing
/// studies: clear-sky irradiance from the site's sun path, a seasonal
/// temperature swing, and Gaussian perturbations from a seeded RNG. The
/// output is deterministic per seed.
#[derive(Debug, Clone)]
pub struct SyntheticWeather {
    /// Master random seed.
    pub seed: u64,
    /// Fraction of clear-sky irradiance removed on average (0..1).
    pub cloudiness: f64,
    /// Site annual mean temperature (°C).
    pub mean_temp_c: f64,
    /// Seasonal temperature amplitude (°C).
    pub seasonal_swing_c: f64,
}

impl Default for SyntheticWeather {
    fn default() -> Self {
        Self {
            seed: 42,
            cloudiness: 0.15,
            mean_temp_c: 14.0,
            seasonal_swing_c: 9.0,
        }
    }
}

/// Peak clear-sky global irradiance at normal incidence (W/m²).
const CLEAR_SKY_PEAK_WM2: f64 = 1000.0;

impl SyntheticWeather {
    /// Generates a complete 12-month series for the location.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] if `cloudiness` is outside
    /// [0, 1).
    pub fn generate(&self, location: &Location) -> SimResult<WeatherData> {
        if !(0.0..1.0).contains(&self.cloudiness) {
            return Err(SimError::invalid("cloudiness", "must be in [0, 1)"));
        }
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut data = WeatherData::new(location.clone());
        for month in 1..=12 {
            let day = self.representative_day(location, month, &mut rng)?;
            data.insert_month(month, day)?;
        }
        Ok(data)
    }

    fn representative_day(
        &self,
        location: &Location,
        month: u32,
        rng: &mut StdRng,
    ) -> SimResult<DayWeather> {
        let mut ghi = [0.0; 24];
        let mut dhi = [0.0; 24];
        let mut temp = [0.0; 24];
        let mut wind = [0.0; 24];
        let mut humidity = [0.0; 24];

        // Seasonal phase peaks in July for the northern hemisphere and
        // January for the southern.
        let season = (std::f64::consts::TAU * (month as f64 - 7.0) / 12.0).cos();
        let hemisphere = if location.latitude_deg >= 0.0 { 1.0 } else { -1.0 };
        let month_mean_temp = self.mean_temp_c + self.seasonal_swing_c * season * hemisphere;

        for (hour, ghi_slot) in ghi.iter_mut().enumerate() {
            let sun = sun_position(location.latitude_deg, month, hour as u32)?;
            if sun.is_up() {
                let air_mass_atten = sun.elevation_deg.to_radians().sin().powf(1.15);
                let sky = 1.0 - self.cloudiness * (1.0 + gaussian_noise(rng, 0.5)).clamp(0.0, 2.0);
                let clear = CLEAR_SKY_PEAK_WM2 * air_mass_atten;
                *ghi_slot = (clear * sky.clamp(0.0, 1.0)).max(0.0);
                // Diffuse fraction rises with cloud cover.
                let diffuse_frac = (0.20 + 0.6 * (1.0 - sky)).clamp(0.0, 1.0);
                dhi[hour] = *ghi_slot * diffuse_frac;
            }

            // Diurnal swing lags solar noon by two hours.
            let diurnal =
                4.0 * (std::f64::consts::TAU * (hour as f64 - 14.0) / 24.0).cos();
            temp[hour] = month_mean_temp + diurnal + gaussian_noise(rng, 0.4);
            wind[hour] = (3.0 + gaussian_noise(rng, 1.0)).max(0.0);
            humidity[hour] = (60.0 - 15.0 * season + gaussian_noise(rng, 5.0)).clamp(5.0, 100.0);
        }

        Ok(DayWeather {
            ghi_wm2: ghi,
            dhi_wm2: dhi,
            temp_c: temp,
            wind_ms: wind,
            humidity_pct: humidity,
        })
    }
}

/// Gaussian noise via the Box-Muller transform.
fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }
    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
    z0 * std_dev
}
