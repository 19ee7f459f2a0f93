//! Obstruction shading: determines whether a sun position is blocked.

use crate::solar::position::SunPosition;

/// Angular half-width (degrees) assumed for point obstructions that carry
/// no explicit width, so poles and chimneys still cast a shadow.
const SLENDER_HALF_WIDTH_DEG: f64 = 2.0;

/// A shading obstruction near the array.
///
/// Two variants cover the survey inputs installers record: a discrete
/// object at a known height/distance/bearing, and a measured horizon
/// segment spanning an azimuth range.
#[derive(Debug, Clone, PartialEq)]
pub enum Obstruction {
    /// A discrete object (tree, pole, neighboring building).
    Point {
        /// Height above the array plane (m).
        height_m: f64,
        /// Horizontal distance from the array (m).
        distance_m: f64,
        /// Compass bearing of the object center (degrees).
        azimuth_deg: f64,
        /// Facade width (m) for extended obstructions. `None` models a
        /// slender object such as a pole.
        width_m: Option<f64>,
    },
    /// A segment of elevated horizon (ridge line, hillside).
    HorizonSegment {
        /// Apparent elevation of the horizon over this segment (degrees).
        elevation_deg: f64,
        /// Segment start bearing (degrees).
        azimuth_start_deg: f64,
        /// Segment end bearing (degrees). May be numerically smaller than
        /// the start when the segment wraps through north.
        azimuth_end_deg: f64,
    },
}

impl Obstruction {
    /// Apparent elevation angle of the obstruction (degrees).
    pub fn elevation_angle_deg(&self) -> f64 {
        match self {
            Obstruction::Point {
                height_m,
                distance_m,
                ..
            } => (height_m / distance_m).atan().to_degrees(),
            Obstruction::HorizonSegment { elevation_deg, .. } => *elevation_deg,
        }
    }

    /// Azimuth span covered by the obstruction, as (start, end) bearings.
    fn azimuth_span_deg(&self) -> (f64, f64) {
        match self {
            Obstruction::Point {
                distance_m,
                azimuth_deg,
                width_m,
                ..
            } => {
                let half_width = match width_m {
                    Some(w) => (w / (2.0 * distance_m)).atan().to_degrees(),
                    None => SLENDER_HALF_WIDTH_DEG,
                };
                (azimuth_deg - half_width, azimuth_deg + half_width)
            }
            Obstruction::HorizonSegment {
                azimuth_start_deg,
                azimuth_end_deg,
                ..
            } => (*azimuth_start_deg, *azimuth_end_deg),
        }
    }

    /// Whether this obstruction blocks the given sun position.
    ///
    /// The sun is blocked iff its elevation does not exceed the
    /// obstruction's apparent elevation and its azimuth falls within the
    /// obstruction's azimuth span.
    pub fn shades(&self, sun: &SunPosition) -> bool {
        if sun.elevation_deg > self.elevation_angle_deg() {
            return false;
        }
        let (start, end) = self.azimuth_span_deg();
        azimuth_within(sun.azimuth_deg, start, end)
    }
}

/// Whether `azimuth` lies inside the arc from `start` to `end`, walking
/// clockwise. Handles spans that wrap through north.
fn azimuth_within(azimuth_deg: f64, start_deg: f64, end_deg: f64) -> bool {
    let az = wrap(azimuth_deg);
    let start = wrap(start_deg);
    let end = wrap(end_deg);
    if start <= end {
        (start..=end).contains(&az)
    } else {
        az >= start || az <= end
    }
}

fn wrap(deg: f64) -> f64 {
    let w = deg % 360.0;
    if w < 0.0 { w + 360.0 } else { w }
}

/// Whether any obstruction blocks the given sun position. Obstructions
/// combine with OR: one blocker suffices.
pub fn is_shaded(obstructions: &[Obstruction], sun: &SunPosition) -> bool {
    obstructions.iter().any(|o| o.shades(sun))
}
