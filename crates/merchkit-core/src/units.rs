//! Unit conversion utilities
//!
//! Print areas are specified in millimeters and rasterized at a fixed DPI.
//! Placement math works in percent of the print area; pixels only appear at
//! render and hit-test call sites.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Millimeters per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// Raster density used to derive print-area canvases (CSS reference pixel).
pub const DEFAULT_DPI: f64 = 96.0;

/// Measurement system used when labelling physical sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementSystem {
    /// Metric system (mm)
    #[default]
    Metric,
    /// Imperial system (inches)
    Imperial,
}

impl fmt::Display for MeasurementSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metric => write!(f, "Metric"),
            Self::Imperial => write!(f, "Imperial"),
        }
    }
}

impl FromStr for MeasurementSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "metric" | "mm" => Ok(Self::Metric),
            "imperial" | "inch" | "in" => Ok(Self::Imperial),
            _ => Err(format!("Unknown measurement system: {}", s)),
        }
    }
}

/// Convert a physical length to pixels at `dpi`.
pub fn mm_to_px(mm: f64, dpi: f64) -> f64 {
    mm / MM_PER_INCH * dpi
}

/// Convert a pixel length back to millimeters at `dpi`.
pub fn px_to_mm(px: f64, dpi: f64) -> f64 {
    px / dpi * MM_PER_INCH
}

/// Format length value for display
///
/// * `value_mm` - Value in millimeters
/// * `system` - Target measurement system
pub fn format_length(value_mm: f64, system: MeasurementSystem) -> String {
    match system {
        MeasurementSystem::Metric => format!("{:.1} mm", value_mm),
        MeasurementSystem::Imperial => format!("{:.2} in", value_mm / MM_PER_INCH),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a4_width_at_96_dpi() {
        assert_eq!(mm_to_px(210.0, DEFAULT_DPI).round(), 794.0);
        assert_eq!(mm_to_px(95.0, DEFAULT_DPI).round(), 359.0);
    }

    #[test]
    fn test_px_mm_inverse() {
        let px = mm_to_px(123.4, 300.0);
        assert!((px_to_mm(px, 300.0) - 123.4).abs() < 1e-9);
    }

    #[test]
    fn test_format_length() {
        assert_eq!(format_length(25.4, MeasurementSystem::Metric), "25.4 mm");
        assert_eq!(format_length(25.4, MeasurementSystem::Imperial), "1.00 in");
    }

    #[test]
    fn test_measurement_system_parse() {
        assert_eq!("mm".parse::<MeasurementSystem>(), Ok(MeasurementSystem::Metric));
        assert_eq!("IN".parse::<MeasurementSystem>(), Ok(MeasurementSystem::Imperial));
        assert!("furlong".parse::<MeasurementSystem>().is_err());
    }
}
