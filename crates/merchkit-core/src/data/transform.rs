//! Placement transform for artwork inside a print area.

use serde::{Deserialize, Serialize};

/// Smallest allowed uniform scale.
pub const MIN_SCALE: f64 = 0.1;
/// Largest allowed uniform scale.
pub const MAX_SCALE: f64 = 3.0;

/// Placement of artwork within a print area.
///
/// `x` and `y` are the CENTER of the artwork's bounding box in percent of the
/// print area width/height. `scale` multiplies the base render size and
/// `rotation` is in degrees, clockwise on screen.
///
/// This is also the persisted record shape: four plain numbers, no unit
/// conversion in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub rotation: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 50.0,
            y: 50.0,
            scale: 1.0,
            rotation: 0.0,
        }
    }
}

impl Transform {
    pub fn new(x: f64, y: f64, scale: f64, rotation: f64) -> Self {
        Self {
            x,
            y,
            scale,
            rotation,
        }
    }

    /// Clamps position to [0,100] and scale to [MIN_SCALE, MAX_SCALE].
    ///
    /// Rotation is left as-is. Non-finite components are replaced rather than
    /// propagated: position falls back to the center, scale to the minimum
    /// and rotation to zero. Total and idempotent.
    pub fn clamp(&self) -> Transform {
        Transform {
            x: clamp_percent(self.x),
            y: clamp_percent(self.y),
            scale: clamp_scale(self.scale),
            rotation: if self.rotation.is_finite() {
                self.rotation
            } else {
                0.0
            },
        }
    }

    /// Same placement with rotation wrapped into [0,360).
    pub fn with_normalized_rotation(&self) -> Transform {
        Transform {
            rotation: normalize_degrees(self.rotation),
            ..*self
        }
    }

    /// True when every component is inside its valid domain.
    pub fn is_valid(&self) -> bool {
        (0.0..=100.0).contains(&self.x)
            && (0.0..=100.0).contains(&self.y)
            && (MIN_SCALE..=MAX_SCALE).contains(&self.scale)
            && self.rotation.is_finite()
    }
}

/// Clamps a percent coordinate, mapping non-finite input to the center.
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        50.0
    }
}

/// Clamps a scale factor, mapping non-finite or non-positive input to the minimum.
pub fn clamp_scale(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value.clamp(MIN_SCALE, MAX_SCALE)
    } else {
        MIN_SCALE
    }
}

/// Wraps an angle in degrees into [0,360).
pub fn normalize_degrees(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}
