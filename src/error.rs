//! Error types shared across the simulation core.

use thiserror::Error;

/// Convenience alias used by all fallible entry points.
pub type SimResult<T> = Result<T, SimError>;

/// Failure conditions surfaced by the simulation core.
///
/// All failures are synchronous and local: they are returned directly to
/// the immediate caller before any partial result is produced. The core
/// never retries — the computation is pure, so retrying invalid input is
/// pointless.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// An input value is outside its documented domain. Rejected before
    /// any computation proceeds.
    #[error("invalid parameter `{field}`: {message}")]
    InvalidParameter {
        /// Name of the offending parameter.
        field: &'static str,
        /// Constraint description.
        message: String,
    },

    /// A module/inverter pairing cannot operate together, e.g. the string
    /// voltage falls outside the inverter's MPPT window. Never silently
    /// clamped.
    #[error("incompatible components: {0}")]
    IncompatibleComponents(String),

    /// A weather sample the aggregator needs is absent. Substituting zero
    /// would silently corrupt annual totals, so this fails loudly instead.
    #[error("missing weather data for month {month}")]
    MissingWeatherData {
        /// Calendar month (1-12) with no data.
        month: u32,
    },
}

impl SimError {
    /// Shorthand for an [`SimError::InvalidParameter`] with a formatted message.
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        SimError::InvalidParameter {
            field,
            message: message.into(),
        }
    }
}
