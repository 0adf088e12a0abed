//! Snap-to-preset detection for production handoff.

use merchkit_core::{PresetPosition, Side, Transform};
use std::fmt;

/// Default positional tolerance, in percent of the print area.
pub const DEFAULT_TOLERANCE_PERCENT: f64 = 3.0;
/// Default scale tolerance.
pub const DEFAULT_TOLERANCE_SCALE: f64 = 0.05;

/// Returns the first preset on `side` within tolerance of `transform`.
///
/// Rotation is not compared.
pub fn match_preset<'a>(
    transform: &Transform,
    side: Side,
    catalog: &'a [PresetPosition],
    tolerance_percent: f64,
    tolerance_scale: f64,
) -> Option<&'a PresetPosition> {
    catalog.iter().filter(|p| p.side == side).find(|p| {
        (transform.x - p.transform.x).abs() <= tolerance_percent
            && (transform.y - p.transform.y).abs() <= tolerance_percent
            && (transform.scale - p.transform.scale).abs() <= tolerance_scale
    })
}

pub fn match_preset_default<'a>(
    transform: &Transform,
    side: Side,
    catalog: &'a [PresetPosition],
) -> Option<&'a PresetPosition> {
    match_preset(
        transform,
        side,
        catalog,
        DEFAULT_TOLERANCE_PERCENT,
        DEFAULT_TOLERANCE_SCALE,
    )
}

/// Looks up a preset by id.
pub fn find_preset<'a>(catalog: &'a [PresetPosition], id: &str) -> Option<&'a PresetPosition> {
    catalog.iter().find(|p| p.id == id)
}

pub fn front_positions() -> Vec<PresetPosition> {
    vec![
        PresetPosition::new("center-chest", "Center Chest", Side::Front, 50.0, 35.0, 0.6),
        PresetPosition::new("left-chest", "Left Chest", Side::Front, 30.0, 25.0, 0.3),
        PresetPosition::new("right-chest", "Right Chest", Side::Front, 70.0, 25.0, 0.3),
        PresetPosition::new("full-front", "Full Front", Side::Front, 50.0, 45.0, 1.2),
        PresetPosition::new("lower-front", "Lower Front", Side::Front, 50.0, 75.0, 0.5),
    ]
}

pub fn back_positions() -> Vec<PresetPosition> {
    vec![
        PresetPosition::new("upper-back", "Upper Back", Side::Back, 50.0, 20.0, 0.5),
        PresetPosition::new("center-back", "Center Back", Side::Back, 50.0, 45.0, 1.0),
        PresetPosition::new("lower-back", "Lower Back", Side::Back, 50.0, 75.0, 0.5),
        PresetPosition::new("full-back", "Full Back", Side::Back, 50.0, 50.0, 1.5),
    ]
}

/// Front positions followed by back positions.
pub fn default_catalog() -> Vec<PresetPosition> {
    let mut catalog = front_positions();
    catalog.extend(back_positions());
    catalog
}

/// Human-facing description of the current placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementLabel {
    Preset { id: String, label: String },
    Custom,
}

impl PlacementLabel {
    pub fn from_match(preset: Option<&PresetPosition>) -> Self {
        match preset {
            Some(p) => PlacementLabel::Preset {
                id: p.id.clone(),
                label: p.label.clone(),
            },
            None => PlacementLabel::Custom,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, PlacementLabel::Custom)
    }

    pub fn preset_id(&self) -> Option<&str> {
        match self {
            PlacementLabel::Preset { id, .. } => Some(id),
            PlacementLabel::Custom => None,
        }
    }
}

impl fmt::Display for PlacementLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementLabel::Preset { label, .. } => f.write_str(label),
            PlacementLabel::Custom => f.write_str("custom position"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_unique() {
        let catalog = default_catalog();
        let mut ids: Vec<_> = catalog.iter().map(|p| p.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn test_presets_do_not_overlap_within_tolerance() {
        let catalog = default_catalog();
        for p in &catalog {
            let hit = match_preset_default(&p.transform.to_transform(), p.side, &catalog);
            assert_eq!(hit.map(|h| h.id.as_str()), Some(p.id.as_str()));
        }
    }

    #[test]
    fn test_label_display() {
        assert_eq!(PlacementLabel::Custom.to_string(), "custom position");
        let preset = find_preset(&front_positions(), "left-chest").cloned();
        let label = PlacementLabel::from_match(preset.as_ref());
        assert_eq!(label.to_string(), "Left Chest");
        assert_eq!(label.preset_id(), Some("left-chest"));
    }
}
