use merchkit_core::{PresetPosition, Side, Transform};
use merchkit_customizer::presets::{find_preset, DEFAULT_TOLERANCE_PERCENT};
use merchkit_customizer::{
    back_positions, default_catalog, front_positions, match_preset, match_preset_default,
    PlacementLabel,
};

#[test]
fn test_default_placement_is_custom() {
    let catalog = default_catalog();
    let hit = match_preset_default(&Transform::default(), Side::Front, &catalog);
    assert!(hit.is_none());
    assert_eq!(PlacementLabel::from_match(hit), PlacementLabel::Custom);
}

#[test]
fn test_exact_preset_matches() {
    let catalog = default_catalog();
    let t = Transform::new(50.0, 35.0, 0.6, 0.0);
    let hit = match_preset_default(&t, Side::Front, &catalog).map(|p| p.id.as_str());
    assert_eq!(hit, Some("center-chest"));
}

#[test]
fn test_within_tolerance_matches() {
    let catalog = default_catalog();
    let t = Transform::new(52.9, 32.1, 0.64, 0.0);
    let hit = match_preset_default(&t, Side::Front, &catalog).map(|p| p.id.as_str());
    assert_eq!(hit, Some("center-chest"));
}

#[test]
fn test_outside_tolerance_is_none() {
    let catalog = default_catalog();
    let t = Transform::new(50.0, 35.0 + DEFAULT_TOLERANCE_PERCENT + 0.5, 0.6, 0.0);
    assert!(match_preset_default(&t, Side::Front, &catalog).is_none());
    let t = Transform::new(50.0, 35.0, 0.7, 0.0);
    assert!(match_preset_default(&t, Side::Front, &catalog).is_none());
}

#[test]
fn test_rotation_is_not_compared() {
    let catalog = default_catalog();
    let t = Transform::new(50.0, 35.0, 0.6, 137.0);
    assert!(match_preset_default(&t, Side::Front, &catalog).is_some());
}

#[test]
fn test_side_filter() {
    let catalog = default_catalog();
    let center_chest = Transform::new(50.0, 35.0, 0.6, 0.0);
    assert!(match_preset_default(&center_chest, Side::Back, &catalog).is_none());

    let upper_back = Transform::new(50.0, 20.0, 0.5, 0.0);
    let hit = match_preset_default(&upper_back, Side::Back, &catalog).map(|p| p.id.as_str());
    assert_eq!(hit, Some("upper-back"));
}

#[test]
fn test_first_match_wins() {
    let catalog = vec![
        PresetPosition::new("a", "A", Side::Front, 50.0, 50.0, 1.0),
        PresetPosition::new("b", "B", Side::Front, 51.0, 50.0, 1.0),
    ];
    let t = Transform::new(50.5, 50.0, 1.0, 0.0);
    let hit = match_preset(&t, Side::Front, &catalog, 3.0, 0.05).map(|p| p.id.as_str());
    assert_eq!(hit, Some("a"));
}

#[test]
fn test_builtin_catalogs() {
    assert!(front_positions().iter().all(|p| p.side == Side::Front));
    assert!(back_positions().iter().all(|p| p.side == Side::Back));
    let center = find_preset(&front_positions(), "center-chest").cloned();
    let center = center.expect("center-chest preset");
    assert_eq!(center.transform.to_transform(), Transform::new(50.0, 35.0, 0.6, 0.0));
}
