//! Sun position from a simplified declination/hour-angle model.
//!
//! Inputs are a latitude, a calendar month, and a local solar hour; the
//! model resolves a representative mid-month sun position. Accuracy is in
//! the order of a degree or two, which is sufficient for sizing studies.

use crate::error::{SimError, SimResult};

/// Maximum solar declination (degrees), reached at the solstices.
const MAX_DECLINATION_DEG: f64 = 23.45;

/// Sun position for a given latitude, month, and hour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunPosition {
    /// Elevation above the horizon (degrees). Negative when the sun is down.
    pub elevation_deg: f64,
    /// Compass azimuth (degrees), normalized to [0, 360), 0 = north.
    pub azimuth_deg: f64,
    /// Solar declination used for this position (degrees).
    pub declination_deg: f64,
    /// Hour angle relative to solar noon (degrees).
    pub hour_angle_deg: f64,
}

impl SunPosition {
    /// Whether the sun is above the horizon. Below the horizon all
    /// downstream power is zero and shading checks are skipped.
    pub fn is_up(&self) -> bool {
        self.elevation_deg > 0.0
    }
}

/// Computes the sun position for a latitude, month (1-12), and local solar
/// hour (0-23).
///
/// Declination follows the mid-month sinusoid
/// `23.45° · sin(2π(month − 3)/12)`; the hour angle is `(hour − 12) · 15°`.
///
/// # Errors
///
/// Returns [`SimError::InvalidParameter`] if latitude, month, or hour is
/// out of range.
pub fn sun_position(latitude_deg: f64, month: u32, hour: u32) -> SimResult<SunPosition> {
    if !(-90.0..=90.0).contains(&latitude_deg) {
        return Err(SimError::invalid("latitude_deg", "must be in [-90, 90]"));
    }
    if !(1..=12).contains(&month) {
        return Err(SimError::invalid("month", "must be in [1, 12]"));
    }
    if hour > 23 {
        return Err(SimError::invalid("hour", "must be in [0, 23]"));
    }

    let declination_deg = MAX_DECLINATION_DEG
        * (std::f64::consts::TAU * (month as f64 - 3.0) / 12.0).sin();
    let hour_angle_deg = (hour as f64 - 12.0) * 15.0;

    let lat = latitude_deg.to_radians();
    let decl = declination_deg.to_radians();
    let ha = hour_angle_deg.to_radians();

    let elevation =
        (lat.sin() * decl.sin() + lat.cos() * decl.cos() * ha.cos()).asin();

    // Two-argument arctangent avoids the quadrant ambiguity of the
    // cos-based form near due east/west.
    let azimuth = (-decl.cos() * ha.sin())
        .atan2(decl.sin() * lat.cos() - decl.cos() * lat.sin() * ha.cos());

    Ok(SunPosition {
        elevation_deg: elevation.to_degrees(),
        azimuth_deg: normalize_azimuth(azimuth.to_degrees()),
        declination_deg,
        hour_angle_deg,
    })
}

/// Maps an angle in degrees onto [0, 360).
fn normalize_azimuth(deg: f64) -> f64 {
    let wrapped = deg % 360.0;
    if wrapped < 0.0 { wrapped + 360.0 } else { wrapped }
}
