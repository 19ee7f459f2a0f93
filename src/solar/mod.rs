//! Solar geometry: sun position and obstruction shading.

/// Sun position from latitude, month, and local solar hour.
pub mod position;
/// Obstruction variants and shading evaluation.
pub mod shading;

pub use position::{SunPosition, sun_position};
pub use shading::{Obstruction, is_shaded};
