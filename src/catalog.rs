//! Immutable component records: site location and module/inverter catalog
//! entries.
//!
//! Catalog entries arrive fully populated from an external catalog
//! collaborator; this module only defines their shape and the validation
//! applied before they enter the simulation pipeline.

use crate::error::{SimError, SimResult};

/// Geographic site of the installation. Immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    /// Latitude in degrees, positive north.
    pub latitude_deg: f64,
    /// Longitude in degrees, positive east.
    pub longitude_deg: f64,
    /// Human-readable address label.
    pub label: String,
    /// Offset from UTC in hours.
    pub utc_offset_hours: f64,
}

impl Location {
    /// Creates a validated location.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] if latitude is outside
    /// [-90, 90] or longitude outside [-180, 180].
    pub fn new(
        latitude_deg: f64,
        longitude_deg: f64,
        label: impl Into<String>,
        utc_offset_hours: f64,
    ) -> SimResult<Self> {
        if !(-90.0..=90.0).contains(&latitude_deg) {
            return Err(SimError::invalid("latitude_deg", "must be in [-90, 90]"));
        }
        if !(-180.0..=180.0).contains(&longitude_deg) {
            return Err(SimError::invalid("longitude_deg", "must be in [-180, 180]"));
        }
        Ok(Self {
            latitude_deg,
            longitude_deg,
            label: label.into(),
            utc_offset_hours,
        })
    }
}

/// Cell technology of a solar module. Drives the default annual
/// degradation rate used in multi-year forecasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleTechnology {
    Monocrystalline,
    Polycrystalline,
    ThinFilm,
}

impl ModuleTechnology {
    /// Default annual degradation rate for this technology, as a fraction
    /// of the previous year's output. Callers may override per scenario.
    pub fn default_degradation_rate(self) -> f64 {
        match self {
            ModuleTechnology::Monocrystalline => 0.004,
            ModuleTechnology::Polycrystalline => 0.006,
            ModuleTechnology::ThinFilm => 0.010,
        }
    }
}

/// A solar module catalog entry. Immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct SolarModule {
    pub manufacturer: String,
    pub model: String,
    /// Rated power at standard test conditions (W).
    pub power_w: f64,
    /// Module efficiency at STC (0..1).
    pub efficiency: f64,
    /// Physical length (m).
    pub length_m: f64,
    /// Physical width (m).
    pub width_m: f64,
    /// Cell technology variant.
    pub technology: ModuleTechnology,
    /// Power temperature coefficient (%/°C, typically negative).
    pub temp_coeff_pct_per_c: f64,
    /// Nominal operating cell temperature (°C).
    pub noct_c: f64,
    /// Voltage at maximum power point (V).
    pub vmp_v: f64,
    /// Open-circuit voltage (V).
    pub voc_v: f64,
}

impl SolarModule {
    /// Checks that the record is physically plausible.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] on non-positive power,
    /// dimensions, or voltages, or efficiency outside (0, 1).
    pub fn validate(&self) -> SimResult<()> {
        if self.power_w <= 0.0 {
            return Err(SimError::invalid("module.power_w", "must be > 0"));
        }
        if !(0.0..1.0).contains(&self.efficiency) || self.efficiency == 0.0 {
            return Err(SimError::invalid("module.efficiency", "must be in (0, 1)"));
        }
        if self.length_m <= 0.0 || self.width_m <= 0.0 {
            return Err(SimError::invalid("module.dimensions", "must be > 0"));
        }
        if self.noct_c <= 0.0 {
            return Err(SimError::invalid("module.noct_c", "must be > 0"));
        }
        if self.vmp_v <= 0.0 || self.voc_v < self.vmp_v {
            return Err(SimError::invalid(
                "module.voltages",
                "vmp must be > 0 and voc >= vmp",
            ));
        }
        Ok(())
    }

    /// Module face area (m²).
    pub fn area_m2(&self) -> f64 {
        self.length_m * self.width_m
    }
}

/// Inverter topology variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InverterKind {
    String,
    Micro,
    Hybrid,
}

/// An inverter catalog entry. Immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct Inverter {
    pub manufacturer: String,
    pub model: String,
    /// Rated AC output power (W). Output above this is clipped.
    pub ac_rated_w: f64,
    /// Maximum admissible DC input power (W).
    pub max_dc_w: f64,
    /// Conversion efficiency (0..1).
    pub efficiency: f64,
    /// Lower bound of the MPPT voltage window (V).
    pub mppt_min_v: f64,
    /// Upper bound of the MPPT voltage window (V).
    pub mppt_max_v: f64,
    /// Number of independent MPP trackers.
    pub mppt_trackers: u32,
    /// Topology variant.
    pub kind: InverterKind,
}

impl Inverter {
    /// Checks that the record is physically plausible.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] on non-positive ratings,
    /// efficiency outside (0, 1], or an inverted MPPT window.
    pub fn validate(&self) -> SimResult<()> {
        if self.ac_rated_w <= 0.0 || self.max_dc_w <= 0.0 {
            return Err(SimError::invalid("inverter.ratings", "must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.efficiency) || self.efficiency == 0.0 {
            return Err(SimError::invalid(
                "inverter.efficiency",
                "must be in (0, 1]",
            ));
        }
        if self.mppt_min_v <= 0.0 || self.mppt_max_v <= self.mppt_min_v {
            return Err(SimError::invalid(
                "inverter.mppt_window",
                "must satisfy 0 < min < max",
            ));
        }
        if self.mppt_trackers == 0 {
            return Err(SimError::invalid("inverter.mppt_trackers", "must be > 0"));
        }
        Ok(())
    }
}
