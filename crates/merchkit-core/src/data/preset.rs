//! Preset placement catalog entries.

use super::print_area::Side;
use super::transform::Transform;
use serde::{Deserialize, Serialize};

/// Position and scale of a preset; rotation is implicitly zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PresetTransform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl PresetTransform {
    pub fn new(x: f64, y: f64, scale: f64) -> Self {
        Self { x, y, scale }
    }

    pub fn to_transform(&self) -> Transform {
        Transform::new(self.x, self.y, self.scale, 0.0)
    }
}

/// Named placement used to label production output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetPosition {
    pub id: String,
    pub label: String,
    pub transform: PresetTransform,
    pub side: Side,
}

impl PresetPosition {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        side: Side,
        x: f64,
        y: f64,
        scale: f64,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            transform: PresetTransform::new(x, y, scale),
            side,
        }
    }
}
