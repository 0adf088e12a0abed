//! Print areas, product sides and surface kinds.

use crate::units::{mm_to_px, DEFAULT_DPI};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Side of a product that carries a print area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Front,
    Back,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Back => "back",
        }
    }

    /// The other side of the garment.
    pub fn flipped(&self) -> Side {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "front" => Ok(Self::Front),
            "back" => Ok(Self::Back),
            _ => Err(format!("Unknown side: {}", s)),
        }
    }
}

/// Geometry of the product surface the texture is wrapped onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceKind {
    /// Flat or gently curved panels (shirts, totes, posters)
    #[default]
    Flat,
    /// Surfaces wrapped around an axis (mugs, bottles)
    Cylindrical,
}

/// Physical print region for one product side.
///
/// Percent coordinates in a `Transform` map into the pixel canvas derived
/// from these dimensions at `dpi`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrintArea {
    pub width_mm: f64,
    pub height_mm: f64,
    #[serde(default = "default_dpi")]
    pub dpi: f64,
}

fn default_dpi() -> f64 {
    DEFAULT_DPI
}

impl PrintArea {
    pub fn new(width_mm: f64, height_mm: f64) -> Self {
        Self {
            width_mm,
            height_mm,
            dpi: DEFAULT_DPI,
        }
    }

    pub fn with_dpi(mut self, dpi: f64) -> Self {
        self.dpi = dpi;
        self
    }

    /// Canvas size in whole pixels, never smaller than 1x1.
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            to_pixels(mm_to_px(self.width_mm, self.dpi)),
            to_pixels(mm_to_px(self.height_mm, self.dpi)),
        )
    }

    pub fn is_valid(&self) -> bool {
        self.width_mm.is_finite()
            && self.height_mm.is_finite()
            && self.dpi.is_finite()
            && self.width_mm > 0.0
            && self.height_mm > 0.0
            && self.dpi > 0.0
    }
}

fn to_pixels(value: f64) -> u32 {
    if value.is_finite() && value >= 1.0 {
        value.round().min(u32::MAX as f64) as u32
    } else {
        1
    }
}
