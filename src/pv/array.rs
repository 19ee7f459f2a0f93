//! Array geometry, per-category losses, and MPPT string sizing.

use crate::catalog::{Inverter, SolarModule};
use crate::error::{SimError, SimResult};

/// Cold-condition safety margin applied to the string open-circuit
/// voltage check: Voc rises above its STC value on cold mornings.
const VOC_SAFETY_FACTOR: f64 = 1.15;

/// Per-category loss fractions, each in [0, 0.99].
///
/// The first four apply on the DC side of the inverter, the last two on
/// the AC side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LossFactors {
    pub soiling: f64,
    pub shading: f64,
    pub mismatch: f64,
    pub dc_wiring: f64,
    pub ac_wiring: f64,
    /// Downtime loss fraction (inverter trips, grid outages).
    pub availability: f64,
}

impl Default for LossFactors {
    fn default() -> Self {
        Self {
            soiling: 0.02,
            shading: 0.03,
            mismatch: 0.02,
            dc_wiring: 0.02,
            ac_wiring: 0.01,
            availability: 0.01,
        }
    }
}

impl LossFactors {
    /// Checks every category is within [0, 0.99].
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] naming the first offending
    /// category. Out-of-range losses are caller errors, never clamped.
    pub fn validate(&self) -> SimResult<()> {
        let categories = [
            ("losses.soiling", self.soiling),
            ("losses.shading", self.shading),
            ("losses.mismatch", self.mismatch),
            ("losses.dc_wiring", self.dc_wiring),
            ("losses.ac_wiring", self.ac_wiring),
            ("losses.availability", self.availability),
        ];
        for (field, value) in categories {
            if !(0.0..=0.99).contains(&value) {
                return Err(SimError::invalid(field, "must be in [0, 0.99]"));
            }
        }
        Ok(())
    }

    /// Combined DC-side derate: ∏(1 − lossᵢ) over soiling, shading,
    /// mismatch, and DC wiring.
    pub fn dc_derate(&self) -> f64 {
        (1.0 - self.soiling) * (1.0 - self.shading) * (1.0 - self.mismatch) * (1.0 - self.dc_wiring)
    }

    /// Combined AC-side derate: (1 − AC wiring) · (1 − availability).
    pub fn ac_derate(&self) -> f64 {
        (1.0 - self.ac_wiring) * (1.0 - self.availability)
    }
}

/// Electrical and geometric layout of the module array.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayConfiguration {
    /// Modules wired in series per string.
    pub modules_in_series: u32,
    /// Parallel strings.
    pub strings_in_parallel: u32,
    /// Tilt from horizontal (degrees, 0 = flat).
    pub tilt_deg: f64,
    /// Array azimuth (degrees, 180 = due south).
    pub azimuth_deg: f64,
    /// Per-category loss fractions.
    pub losses: LossFactors,
}

impl ArrayConfiguration {
    /// Creates a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] on zero counts, tilt outside
    /// [0, 90], or loss fractions outside [0, 0.99].
    pub fn new(
        modules_in_series: u32,
        strings_in_parallel: u32,
        tilt_deg: f64,
        azimuth_deg: f64,
        losses: LossFactors,
    ) -> SimResult<Self> {
        if modules_in_series == 0 {
            return Err(SimError::invalid("modules_in_series", "must be > 0"));
        }
        if strings_in_parallel == 0 {
            return Err(SimError::invalid("strings_in_parallel", "must be > 0"));
        }
        if !(0.0..=90.0).contains(&tilt_deg) {
            return Err(SimError::invalid("tilt_deg", "must be in [0, 90]"));
        }
        losses.validate()?;
        Ok(Self {
            modules_in_series,
            strings_in_parallel,
            tilt_deg,
            azimuth_deg,
            losses,
        })
    }

    /// Total module count.
    pub fn module_count(&self) -> u32 {
        self.modules_in_series * self.strings_in_parallel
    }

    /// Array DC rating (W): module STC power × series × parallel.
    pub fn dc_rating_w(&self, module: &SolarModule) -> f64 {
        module.power_w * self.module_count() as f64
    }
}

/// Checks that a series count produces a string voltage inside the
/// inverter's MPPT window.
///
/// The operating check uses string Vmp; the safety check caps cold-weather
/// string Voc at `mppt_max · 1.15`.
///
/// # Errors
///
/// Returns [`SimError::IncompatibleComponents`] describing the violated
/// bound. The condition is surfaced, never silently clamped.
pub fn check_string_compatibility(
    module: &SolarModule,
    inverter: &Inverter,
    modules_in_series: u32,
) -> SimResult<()> {
    if modules_in_series == 0 {
        return Err(SimError::invalid("modules_in_series", "must be > 0"));
    }
    let string_vmp = module.vmp_v * modules_in_series as f64;
    let string_voc = module.voc_v * modules_in_series as f64;

    if string_vmp < inverter.mppt_min_v {
        return Err(SimError::IncompatibleComponents(format!(
            "string Vmp {string_vmp:.0} V below MPPT minimum {:.0} V ({modules_in_series} × {})",
            inverter.mppt_min_v, module.model,
        )));
    }
    if string_vmp > inverter.mppt_max_v {
        return Err(SimError::IncompatibleComponents(format!(
            "string Vmp {string_vmp:.0} V above MPPT maximum {:.0} V ({modules_in_series} × {})",
            inverter.mppt_max_v, module.model,
        )));
    }
    if string_voc > inverter.mppt_max_v * VOC_SAFETY_FACTOR {
        return Err(SimError::IncompatibleComponents(format!(
            "string Voc {string_voc:.0} V exceeds safe input limit {:.0} V",
            inverter.mppt_max_v * VOC_SAFETY_FACTOR,
        )));
    }
    Ok(())
}

/// Inclusive range of series counts compatible with the inverter's MPPT
/// window, or `None` if no count fits. Auto-sizing helper.
pub fn suggest_series_range(module: &SolarModule, inverter: &Inverter) -> Option<(u32, u32)> {
    let mut min_fit = None;
    let mut max_fit = None;
    for series in 1..=60 {
        if check_string_compatibility(module, inverter, series).is_ok() {
            min_fit.get_or_insert(series);
            max_fit = Some(series);
        }
    }
    min_fit.zip(max_fit)
}
