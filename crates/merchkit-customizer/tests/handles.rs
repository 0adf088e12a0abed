use merchkit_core::{PrintArea, Transform};
use merchkit_customizer::{
    detect_handle, handle_positions, BoundingSize, CanvasFrame, Handle, HandleGeometry, Stage,
};

/// 210 x 95 mm at 96 DPI.
fn stage() -> Stage {
    let frame = CanvasFrame::from_print_area(&PrintArea::new(210.0, 95.0));
    Stage::new(frame, BoundingSize::new(200.0, 200.0))
}

#[test]
fn test_frame_from_print_area() {
    let s = stage();
    assert_eq!(s.frame, CanvasFrame::new(794.0, 359.0));
}

#[test]
fn test_center_is_move_at_any_rotation() {
    let s = stage();
    for rotation in [0.0, 15.0, 45.0, 90.0, 180.0, 271.5, -30.0, 720.0] {
        let t = Transform::new(50.0, 50.0, 1.0, rotation);
        let c = s.frame.center_px(&t);
        assert_eq!(detect_handle(c.x, c.y, &t, &s), Handle::Move, "rotation {rotation}");
    }
}

#[test]
fn test_corner_symmetry_unrotated() {
    let s = stage();
    let t = Transform::default();
    let c = s.frame.center_px(&t);
    let (hw, hh) = (100.0, 100.0);

    assert_eq!(detect_handle(c.x - hw, c.y - hh, &t, &s), Handle::Nw);
    assert_eq!(detect_handle(c.x + hw, c.y - hh, &t, &s), Handle::Ne);
    assert_eq!(detect_handle(c.x - hw, c.y + hh, &t, &s), Handle::Sw);
    assert_eq!(detect_handle(c.x + hw, c.y + hh, &t, &s), Handle::Se);
}

#[test]
fn test_corner_follows_scale() {
    let s = stage();
    let t = Transform::new(50.0, 50.0, 0.5, 0.0);
    let c = s.frame.center_px(&t);
    assert_eq!(detect_handle(c.x + 50.0, c.y + 50.0, &t, &s), Handle::Se);
    assert_eq!(detect_handle(c.x + 100.0, c.y + 100.0, &t, &s), Handle::None);
}

#[test]
fn test_rotated_quarter_turn_moves_corners() {
    let s = stage();
    let t = Transform::new(50.0, 50.0, 1.0, 90.0);
    let c = s.frame.center_px(&t);
    // the local top-left corner sits at the screen top-right after 90 degrees
    assert_eq!(detect_handle(c.x + 100.0, c.y - 100.0, &t, &s), Handle::Nw);
    // the rotate knob sits to the right of the center
    assert_eq!(detect_handle(c.x + 140.0, c.y, &t, &s), Handle::Rotate);
}

#[test]
fn test_rotate_knob_above_top_edge() {
    let s = stage();
    let t = Transform::default();
    let c = s.frame.center_px(&t);
    assert_eq!(detect_handle(c.x, c.y - 140.0, &t, &s), Handle::Rotate);
    assert_eq!(detect_handle(c.x + 9.0, c.y - 131.0, &t, &s), Handle::Rotate);
    assert_eq!(detect_handle(c.x, c.y - 160.0, &t, &s), Handle::None);
}

#[test]
fn test_rotate_wins_over_corner() {
    let s = stage().with_geometry(HandleGeometry {
        handle_size: 10.0,
        rotate_offset: 0.0,
    });
    let t = Transform::new(50.0, 50.0, 0.1, 0.0);
    let c = s.frame.center_px(&t);
    // inside both the knob and the nw hotspot
    assert_eq!(detect_handle(c.x - 5.0, c.y - 10.0, &t, &s), Handle::Rotate);
}

#[test]
fn test_corner_wins_over_body() {
    let s = stage();
    let t = Transform::default();
    let c = s.frame.center_px(&t);
    assert_eq!(detect_handle(c.x + 95.0, c.y + 95.0, &t, &s), Handle::Se);
    assert_eq!(detect_handle(c.x + 80.0, c.y + 80.0, &t, &s), Handle::Move);
}

#[test]
fn test_outside_is_none() {
    let s = stage();
    let t = Transform::default();
    let c = s.frame.center_px(&t);
    assert_eq!(detect_handle(c.x + 120.0, c.y, &t, &s), Handle::None);
    assert_eq!(detect_handle(0.0, 0.0, &t, &s), Handle::None);
}

#[test]
fn test_handle_positions_unrotated() {
    let s = stage();
    let t = Transform::default();
    let p = handle_positions(&t, &s);
    assert!((p.nw.x - 297.0).abs() < 1e-9);
    assert!((p.nw.y - 79.5).abs() < 1e-9);
    assert!((p.se.x - 497.0).abs() < 1e-9);
    assert!((p.rotate.y - 39.5).abs() < 1e-9);
    assert!((p.top_center.y - 79.5).abs() < 1e-9);
}
