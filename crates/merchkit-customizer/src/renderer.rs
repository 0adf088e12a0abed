//! 2D print-area preview rendered with tiny-skia.
//!
//! Both the preview and the texture projector draw artwork through
//! [`draw_artwork`], so the two outputs cannot disagree about placement.

use crate::handles::{BoundingSize, CanvasFrame, Stage};
use image::RgbaImage;
use merchkit_core::{ArtworkReference, Transform};
use tiny_skia::{
    Color, ColorU8, FilterQuality, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke,
    StrokeDash, Transform as SkTransform,
};

/// Decoded artwork ready for drawing.
#[derive(Debug, Clone)]
pub struct Artwork {
    reference: ArtworkReference,
    pixmap: Pixmap,
    epoch: u64,
}

impl Artwork {
    pub fn new(reference: ArtworkReference, pixmap: Pixmap, epoch: u64) -> Self {
        Self {
            reference,
            pixmap,
            epoch,
        }
    }

    pub fn reference(&self) -> &ArtworkReference {
        &self.reference
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Load epoch this artwork was installed under.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Aspect-fitted render size at scale 1.
    pub fn bounds(&self, base_px: f64) -> BoundingSize {
        BoundingSize::fit(self.width(), self.height(), base_px)
    }
}

/// Canvas-space transform for the artwork's local frame: origin at the
/// artwork center, x along the rotated width.
pub fn local_transform(transform: &Transform, frame: &CanvasFrame) -> SkTransform {
    let center = frame.center_px(transform);
    SkTransform::from_translate(center.x as f32, center.y as f32)
        .pre_rotate(transform.rotation as f32)
}

/// Draws `artwork` centered on the transform, rotated, scaled into `bounds`.
pub fn draw_artwork(
    target: &mut Pixmap,
    artwork: &Artwork,
    transform: &Transform,
    frame: &CanvasFrame,
    bounds: &BoundingSize,
) {
    let (iw, ih) = (artwork.width() as f32, artwork.height() as f32);
    if iw <= 0.0 || ih <= 0.0 {
        return;
    }
    let sx = (bounds.width * transform.scale) as f32 / iw;
    let sy = (bounds.height * transform.scale) as f32 / ih;
    let ts = local_transform(transform, frame)
        .pre_scale(sx, sy)
        .pre_translate(-iw / 2.0, -ih / 2.0);

    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    target.draw_pixmap(0, 0, artwork.pixmap().as_ref(), &paint, ts, None);
}

/// Preview drawing options.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub show_grid: bool,
    pub show_guides: bool,
    pub show_selection: bool,
    /// Grid spacing in pixels.
    pub grid_spacing: f32,
    pub background: Color,
    pub grid_color: Color,
    pub guide_color: Color,
    pub selection_color: Color,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_grid: true,
            show_guides: true,
            show_selection: true,
            grid_spacing: 20.0,
            background: Color::from_rgba8(245, 245, 245, 255),
            grid_color: Color::from_rgba8(220, 220, 220, 255),
            guide_color: Color::from_rgba8(52, 152, 219, 180),
            selection_color: Color::from_rgba8(0, 120, 215, 255),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PreviewRenderer {
    options: RenderOptions,
}

impl PreviewRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Renders the print area preview; `None` only for a zero-sized frame.
    pub fn render(
        &self,
        artwork: Option<&Artwork>,
        transform: &Transform,
        stage: &Stage,
    ) -> Option<Pixmap> {
        let mut pixmap = Pixmap::new(
            stage.frame.width.round() as u32,
            stage.frame.height.round() as u32,
        )?;
        pixmap.fill(self.options.background);

        if self.options.show_grid {
            self.draw_grid(&mut pixmap);
        }
        if self.options.show_guides {
            self.draw_guides(&mut pixmap);
        }

        if let Some(artwork) = artwork {
            draw_artwork(&mut pixmap, artwork, transform, &stage.frame, &stage.bounds);
            if self.options.show_selection {
                self.draw_selection(&mut pixmap, transform, stage);
            }
        }

        Some(pixmap)
    }

    fn draw_grid(&self, pixmap: &mut Pixmap) {
        let spacing = self.options.grid_spacing;
        if spacing < 1.0 {
            return;
        }
        let (w, h) = (pixmap.width() as f32, pixmap.height() as f32);
        let mut pb = PathBuilder::new();
        let mut x = spacing;
        while x < w {
            pb.move_to(x, 0.0);
            pb.line_to(x, h);
            x += spacing;
        }
        let mut y = spacing;
        while y < h {
            pb.move_to(0.0, y);
            pb.line_to(w, y);
            y += spacing;
        }
        if let Some(path) = pb.finish() {
            let paint = solid(self.options.grid_color, false);
            let stroke = Stroke {
                width: 1.0,
                ..Default::default()
            };
            pixmap.stroke_path(&path, &paint, &stroke, SkTransform::identity(), None);
        }
    }

    fn draw_guides(&self, pixmap: &mut Pixmap) {
        let (w, h) = (pixmap.width() as f32, pixmap.height() as f32);
        let mut pb = PathBuilder::new();
        pb.move_to(w / 2.0, 0.0);
        pb.line_to(w / 2.0, h);
        pb.move_to(0.0, h / 2.0);
        pb.line_to(w, h / 2.0);
        if let Some(path) = pb.finish() {
            let paint = solid(self.options.guide_color, true);
            let stroke = Stroke {
                width: 1.0,
                dash: StrokeDash::new(vec![6.0, 4.0], 0.0),
                ..Default::default()
            };
            pixmap.stroke_path(&path, &paint, &stroke, SkTransform::identity(), None);
        }
    }

    /// Border, corner handles, rotate knob and its guide line, drawn in the
    /// same local frame the hit-tester inverts.
    fn draw_selection(&self, pixmap: &mut Pixmap, transform: &Transform, stage: &Stage) {
        let ts = local_transform(transform, &stage.frame);
        let (hw, hh) = stage.bounds.half_extents(transform.scale);
        let (hw, hh) = (hw as f32, hh as f32);
        let size = stage.geometry.handle_size as f32;
        let offset = stage.geometry.rotate_offset as f32;
        let paint = solid(self.options.selection_color, true);
        let stroke = Stroke {
            width: 1.5,
            ..Default::default()
        };

        if let Some(rect) = Rect::from_xywh(-hw, -hh, hw * 2.0, hh * 2.0) {
            let border = PathBuilder::from_rect(rect);
            pixmap.stroke_path(&border, &paint, &stroke, ts, None);
        }

        let mut pb = PathBuilder::new();
        pb.move_to(0.0, -hh);
        pb.line_to(0.0, -hh - offset);
        if let Some(line) = pb.finish() {
            pixmap.stroke_path(&line, &paint, &stroke, ts, None);
        }

        for (cx, cy) in [(-hw, -hh), (hw, -hh), (-hw, hh), (hw, hh)] {
            if let Some(rect) = Rect::from_xywh(cx - size / 2.0, cy - size / 2.0, size, size) {
                pixmap.fill_rect(rect, &paint, ts, None);
            }
        }

        if let Some(knob) = PathBuilder::from_circle(0.0, -hh - offset, size / 2.0) {
            pixmap.fill_path(&knob, &paint, tiny_skia::FillRule::Winding, ts, None);
        }
    }
}

fn solid(color: Color, anti_alias: bool) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = anti_alias;
    paint
}

/// Converts a premultiplied pixmap to straight-alpha RGBA.
pub fn pixmap_to_rgba(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    image
}

/// Converts straight-alpha RGBA into a premultiplied pixmap.
pub fn rgba_to_pixmap(image: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}
