use merchkit_core::{ArtworkReference, PrintArea, SurfaceKind, Transform};
use merchkit_customizer::{
    encode_png_data_uri, Artwork, BoundingSize, CanvasFrame, DualRenderer, PreviewRenderer,
    RenderOptions, RenderScene, Stage, TextureProjector, WrapMode,
};
use tiny_skia::{Color, ColorU8, Pixmap};

fn red_artwork(epoch: u64) -> Artwork {
    let mut pixmap = Pixmap::new(100, 100).expect("pixmap");
    pixmap.fill(Color::from_rgba8(255, 0, 0, 255));
    Artwork::new(ArtworkReference::new("memory://art/red.png"), pixmap, epoch)
}

fn print_area() -> PrintArea {
    PrintArea::new(210.0, 95.0)
}

fn stage() -> Stage {
    Stage::new(
        CanvasFrame::from_print_area(&print_area()),
        BoundingSize::new(200.0, 200.0),
    )
}

fn pixel(pixmap: &Pixmap, x: u32, y: u32) -> ColorU8 {
    pixmap.pixel(x, y).expect("in bounds").demultiply()
}

const RED: ColorU8 = ColorU8::from_rgba(255, 0, 0, 255);

#[test]
fn test_preview_without_artwork_draws_background() {
    let renderer = PreviewRenderer::default();
    let pixmap = renderer
        .render(None, &Transform::default(), &stage())
        .expect("preview");
    assert_eq!((pixmap.width(), pixmap.height()), (794, 359));
    assert_eq!(pixel(&pixmap, 3, 3), ColorU8::from_rgba(245, 245, 245, 255));
}

#[test]
fn test_preview_draws_artwork_at_transform() {
    let renderer = PreviewRenderer::default();
    let art = red_artwork(1);
    let t = Transform::new(25.0, 50.0, 0.5, 0.0);
    let pixmap = renderer.render(Some(&art), &t, &stage()).expect("preview");
    // center at x = 198.5; half width 50
    assert_eq!(pixel(&pixmap, 198, 179), RED);
    assert_ne!(pixel(&pixmap, 397, 179), RED);
}

#[test]
fn test_texture_is_artwork_only() {
    let art = red_artwork(1);
    let pixmap = TextureProjector
        .project(&art, &Transform::default(), &stage())
        .expect("texture");
    assert_eq!(pixel(&pixmap, 397, 179), RED);
    assert_eq!(pixmap.pixel(3, 3).map(|p| p.alpha()), Some(0));
}

#[test]
fn test_preview_and_texture_agree() {
    let options = RenderOptions {
        show_selection: false,
        ..RenderOptions::default()
    };
    let preview = PreviewRenderer::new(options);
    let art = red_artwork(1);
    let s = stage();

    for t in [
        Transform::default(),
        Transform::new(30.0, 60.0, 0.7, 45.0),
        Transform::new(80.0, 20.0, 1.3, 300.0),
    ] {
        let p = preview.render(Some(&art), &t, &s).expect("preview");
        let tex = TextureProjector.project(&art, &t, &s).expect("texture");
        let mut covered = 0;
        for y in (0..tex.height()).step_by(7) {
            for x in (0..tex.width()).step_by(7) {
                let texel = pixel(&tex, x, y);
                if texel.alpha() == 255 {
                    covered += 1;
                    assert_eq!(pixel(&p, x, y), texel, "({x}, {y}) for {t:?}");
                }
            }
        }
        assert!(covered > 0, "artwork not visible for {t:?}");
    }
}

fn scene<'a>(artwork: Option<&'a Artwork>, transform: Transform, surface: SurfaceKind) -> RenderScene<'a> {
    RenderScene {
        artwork,
        transform,
        print_area: print_area(),
        surface,
        stage: stage(),
    }
}

#[test]
fn test_dual_renderer_skips_unchanged_scene() {
    let mut renderer = DualRenderer::default();
    let art = red_artwork(1);
    let t = Transform::default();

    assert!(renderer.sync(&scene(Some(&art), t, SurfaceKind::Flat)));
    assert!(!renderer.sync(&scene(Some(&art), t, SurfaceKind::Flat)));
    assert_eq!(renderer.passes(), 1);

    let moved = Transform { x: 60.0, ..t };
    assert!(renderer.sync(&scene(Some(&art), moved, SurfaceKind::Flat)));
    assert_eq!(renderer.material().map.as_ref().map(|m| m.version), Some(2));

    // same reference under a new load epoch is a different artwork
    let reloaded = red_artwork(2);
    assert!(renderer.sync(&scene(Some(&reloaded), moved, SurfaceKind::Flat)));
    assert_eq!(renderer.passes(), 3);
}

#[test]
fn test_dual_renderer_without_artwork_falls_back() {
    let mut renderer = DualRenderer::default();
    let art = red_artwork(1);
    renderer.sync(&scene(Some(&art), Transform::default(), SurfaceKind::Flat));
    assert!(renderer.material().has_map());

    renderer.sync(&scene(None, Transform::default(), SurfaceKind::Flat));
    assert!(!renderer.material().has_map());
    assert!(renderer.preview().is_some());
    let colors = renderer.vertex_colors();
    assert!(!colors.is_empty());
    assert!(colors.iter().all(|c| *c == Color::WHITE));
}

#[test]
fn test_cylindrical_texture_wraps_around() {
    let mut renderer = DualRenderer::default();
    let art = red_artwork(1);
    renderer.sync(&scene(Some(&art), Transform::default(), SurfaceKind::Cylindrical));
    let map = renderer.material().map.as_ref().expect("map");
    assert_eq!((map.wrap_s, map.wrap_t), (WrapMode::Repeat, WrapMode::ClampToEdge));
    assert!(map.needs_update);
    assert_eq!(
        renderer.mesh().map(|m| m.surface),
        Some(SurfaceKind::Cylindrical)
    );
}

#[test]
fn test_mesh_shows_artwork_at_center() {
    let mut renderer = DualRenderer::default();
    let art = red_artwork(1);
    renderer.sync(&scene(Some(&art), Transform::default(), SurfaceKind::Flat));
    let mesh = renderer.mesh().expect("mesh");
    let colors = renderer.vertex_colors();
    let center = mesh
        .vertices
        .iter()
        .position(|v| (v.uv.x - 0.5).abs() < 1e-9 && (v.uv.y - 0.5).abs() < 1e-9)
        .expect("center vertex");
    assert_eq!(colors[center], Color::from_rgba8(255, 0, 0, 255));
}

#[test]
fn test_data_uri_export() {
    let mut renderer = DualRenderer::default().with_data_uri_export(true);
    let art = red_artwork(1);
    renderer.sync(&scene(Some(&art), Transform::default(), SurfaceKind::Flat));
    let map = renderer.material().map.as_ref().expect("map");
    let uri = map.data_uri.as_deref().expect("data uri");
    assert!(uri.starts_with("data:image/png;base64,"));
    assert_eq!(encode_png_data_uri(&map.pixmap).ok().as_deref(), Some(uri));
}
