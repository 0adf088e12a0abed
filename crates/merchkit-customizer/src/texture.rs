//! Texture projection of the placed artwork for the 3D product view.

use crate::handles::Stage;
use crate::renderer::{draw_artwork, pixmap_to_rgba, Artwork};
use base64::Engine;
use image::ImageEncoder;
use merchkit_core::{SurfaceKind, Transform};
use tiny_skia::{Color, Pixmap};

/// Texture coordinate wrapping, per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    Repeat,
    ClampToEdge,
}

/// Wrap modes `(s, t)` suited to a surface.
///
/// Cylindrical surfaces repeat around their circumference so the seam
/// samples continuously; the axis direction always clamps.
pub fn wrap_modes_for(surface: SurfaceKind) -> (WrapMode, WrapMode) {
    match surface {
        SurfaceKind::Flat => (WrapMode::ClampToEdge, WrapMode::ClampToEdge),
        SurfaceKind::Cylindrical => (WrapMode::Repeat, WrapMode::ClampToEdge),
    }
}

fn wrap(coord: f64, mode: WrapMode) -> f64 {
    match mode {
        WrapMode::Repeat => coord.rem_euclid(1.0),
        WrapMode::ClampToEdge => coord.clamp(0.0, 1.0),
    }
}

/// Raster bound to a material, with its export and dirty state.
#[derive(Debug, Clone)]
pub struct Texture {
    pub pixmap: Pixmap,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    /// Set when the pixels changed and the GPU copy is stale.
    pub needs_update: bool,
    pub version: u64,
    /// PNG data URI of the pixels, when exported.
    pub data_uri: Option<String>,
}

impl Texture {
    pub fn new(pixmap: Pixmap, surface: SurfaceKind) -> Self {
        let (wrap_s, wrap_t) = wrap_modes_for(surface);
        Self {
            pixmap,
            wrap_s,
            wrap_t,
            needs_update: true,
            version: 1,
            data_uri: None,
        }
    }

    /// Nearest texel at `(u, v)`, `v = 0` being the top row. Straight alpha.
    pub fn sample(&self, u: f64, v: f64) -> Color {
        let (w, h) = (self.pixmap.width(), self.pixmap.height());
        let u = wrap(if u.is_finite() { u } else { 0.0 }, self.wrap_s);
        let v = wrap(if v.is_finite() { v } else { 0.0 }, self.wrap_t);
        let x = ((u * w as f64) as u32).min(w.saturating_sub(1));
        let y = ((v * h as f64) as u32).min(h.saturating_sub(1));
        match self.pixmap.pixel(x, y) {
            Some(p) => {
                let c = p.demultiply();
                Color::from_rgba8(c.red(), c.green(), c.blue(), c.alpha())
            }
            None => Color::TRANSPARENT,
        }
    }

    /// Marks the GPU copy as uploaded.
    pub fn mark_uploaded(&mut self) {
        self.needs_update = false;
    }
}

/// Material of the product mesh the artwork is projected onto.
#[derive(Debug, Clone)]
pub struct MeshMaterial {
    pub name: String,
    pub base_color: Color,
    pub map: Option<Texture>,
}

impl MeshMaterial {
    pub fn new(name: impl Into<String>, base_color: Color) -> Self {
        Self {
            name: name.into(),
            base_color,
            map: None,
        }
    }

    /// Installs a new map, carrying the version forward.
    pub fn set_map(&mut self, mut texture: Texture) {
        texture.version = self.map.as_ref().map_or(1, |m| m.version + 1);
        texture.needs_update = true;
        self.map = Some(texture);
    }

    /// Falls back to the plain base material.
    pub fn clear_map(&mut self) {
        self.map = None;
    }

    pub fn has_map(&self) -> bool {
        self.map.is_some()
    }

    /// Surface color at `(u, v)`: the texel composited over the base color.
    pub fn shade(&self, u: f64, v: f64) -> Color {
        let Some(map) = &self.map else {
            return self.base_color;
        };
        let texel = map.sample(u, v);
        let a = texel.alpha();
        let base = self.base_color;
        let mix = |top: f32, bottom: f32| top * a + bottom * (1.0 - a);
        Color::from_rgba(
            mix(texel.red(), base.red()),
            mix(texel.green(), base.green()),
            mix(texel.blue(), base.blue()),
            a + base.alpha() * (1.0 - a),
        )
        .unwrap_or(base)
    }
}

impl Default for MeshMaterial {
    fn default() -> Self {
        Self::new("product", Color::WHITE)
    }
}

/// Draws the artwork alone onto a transparent print-area sized raster.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextureProjector;

impl TextureProjector {
    pub fn project(&self, artwork: &Artwork, transform: &Transform, stage: &Stage) -> Option<Pixmap> {
        let mut pixmap = Pixmap::new(
            stage.frame.width.round() as u32,
            stage.frame.height.round() as u32,
        )?;
        draw_artwork(&mut pixmap, artwork, transform, &stage.frame, &stage.bounds);
        Some(pixmap)
    }

    /// Projects and wraps the result as a texture with wrap modes for `surface`.
    pub fn project_texture(
        &self,
        artwork: &Artwork,
        transform: &Transform,
        stage: &Stage,
        surface: SurfaceKind,
    ) -> Option<Texture> {
        self.project(artwork, transform, stage)
            .map(|pixmap| Texture::new(pixmap, surface))
    }
}

/// Encodes a pixmap as PNG.
pub fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, image::ImageError> {
    let rgba = pixmap_to_rgba(pixmap);
    let mut png_bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
    encoder.write_image(
        rgba.as_raw(),
        rgba.width(),
        rgba.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(png_bytes)
}

/// Encodes a pixmap as a `data:image/png;base64,` URI.
pub fn encode_png_data_uri(pixmap: &Pixmap) -> Result<String, image::ImageError> {
    let png = encode_png(pixmap)?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(png);
    Ok(format!("data:image/png;base64,{encoded}"))
}
