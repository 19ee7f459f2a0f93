//! Array configuration, the hourly power model, and production
//! aggregation.

/// Array geometry, loss categories, and MPPT string sizing.
pub mod array;
/// Hourly irradiance-to-power model.
pub mod power;
/// Day/month/year aggregation and multi-year forecasting.
pub mod production;

pub use array::{ArrayConfiguration, LossFactors, check_string_compatibility, suggest_series_range};
pub use power::{HourlySimulationResult, PvSystem, WeatherSample};
pub use production::{AnnualResult, MonthlyResult, ProductionSimulator, multi_year_forecast};
