//! Hit-testing against the rotated artwork bounding box.
//!
//! All geometry here is in canvas pixels with the y axis pointing down.
//! The transform stays in percent; conversion happens through the
//! [`CanvasFrame`] passed in by the caller.

use merchkit_core::{PrintArea, Transform};
use nalgebra::{Point2, Rotation2, Vector2};

/// Pixel-space point on the print area canvas.
pub type Point = Point2<f64>;

/// Default half-extent of a handle hotspot in pixels.
pub const DEFAULT_HANDLE_SIZE: f64 = 10.0;
/// Default distance of the rotate knob above the top edge in pixels.
pub const DEFAULT_ROTATE_OFFSET: f64 = 40.0;
/// Default edge length of the square the artwork is fitted into at scale 1.
pub const DEFAULT_BASE_SIZE: f64 = 200.0;

/// Interactive hotspot on the artwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Handle {
    #[default]
    None,
    Move,
    Nw,
    Ne,
    Sw,
    Se,
    Rotate,
}

impl Handle {
    pub fn is_corner(&self) -> bool {
        matches!(self, Handle::Nw | Handle::Ne | Handle::Sw | Handle::Se)
    }

    /// True for handles whose key carries an `e` or `w`.
    pub fn affects_width(&self) -> bool {
        self.is_corner()
    }

    /// True for handles whose key carries an `n` or `s`.
    pub fn affects_height(&self) -> bool {
        self.is_corner()
    }

    /// Sign applied to a local x delta when growing the width.
    pub(crate) fn width_sign(&self) -> f64 {
        match self {
            Handle::Ne | Handle::Se => 1.0,
            Handle::Nw | Handle::Sw => -1.0,
            _ => 0.0,
        }
    }

    /// Sign applied to a local y delta when growing the height.
    pub(crate) fn height_sign(&self) -> f64 {
        match self {
            Handle::Sw | Handle::Se => 1.0,
            Handle::Nw | Handle::Ne => -1.0,
            _ => 0.0,
        }
    }

    /// CSS-style cursor hint for hover feedback.
    pub fn cursor_name(&self) -> &'static str {
        match self {
            Handle::None => "default",
            Handle::Move => "move",
            Handle::Nw | Handle::Se => "nwse-resize",
            Handle::Ne | Handle::Sw => "nesw-resize",
            Handle::Rotate => "grab",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Handle::None => "none",
            Handle::Move => "move",
            Handle::Nw => "nw",
            Handle::Ne => "ne",
            Handle::Sw => "sw",
            Handle::Se => "se",
            Handle::Rotate => "rotate",
        }
    }
}

/// Pixel size of the print area canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasFrame {
    pub width: f64,
    pub height: f64,
}

impl CanvasFrame {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Frame matching the pixel dimensions of a print area.
    pub fn from_print_area(area: &PrintArea) -> Self {
        let (w, h) = area.pixel_size();
        Self::new(w as f64, h as f64)
    }

    pub fn percent_to_px(&self, x_percent: f64, y_percent: f64) -> Point {
        Point::new(
            x_percent / 100.0 * self.width,
            y_percent / 100.0 * self.height,
        )
    }

    /// Converts a pixel position into percent of the frame; a degenerate
    /// frame maps everything to zero.
    pub fn px_to_percent(&self, point: Point) -> (f64, f64) {
        (
            ratio(point.x, self.width) * 100.0,
            ratio(point.y, self.height) * 100.0,
        )
    }

    /// Pixel-space center of the artwork.
    pub fn center_px(&self, transform: &Transform) -> Point {
        self.percent_to_px(transform.x, transform.y)
    }
}

fn ratio(value: f64, total: f64) -> f64 {
    if total.abs() > f64::EPSILON {
        value / total
    } else {
        0.0
    }
}

/// Render size of the artwork at scale 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSize {
    pub width: f64,
    pub height: f64,
}

impl BoundingSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Fits an image's aspect ratio into a `base_px` square.
    pub fn fit(image_width: u32, image_height: u32, base_px: f64) -> Self {
        if image_width == 0 || image_height == 0 {
            return Self::new(base_px, base_px);
        }
        let (w, h) = (image_width as f64, image_height as f64);
        if w >= h {
            Self::new(base_px, base_px * h / w)
        } else {
            Self::new(base_px * w / h, base_px)
        }
    }

    /// Half extents after applying `scale`.
    pub fn half_extents(&self, scale: f64) -> (f64, f64) {
        (self.width * scale / 2.0, self.height * scale / 2.0)
    }
}

impl Default for BoundingSize {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_SIZE, DEFAULT_BASE_SIZE)
    }
}

/// Handle hotspot dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleGeometry {
    pub handle_size: f64,
    pub rotate_offset: f64,
}

impl Default for HandleGeometry {
    fn default() -> Self {
        Self {
            handle_size: DEFAULT_HANDLE_SIZE,
            rotate_offset: DEFAULT_ROTATE_OFFSET,
        }
    }
}

/// Conversion factors shared by hit-testing, gestures and rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stage {
    pub frame: CanvasFrame,
    pub bounds: BoundingSize,
    pub geometry: HandleGeometry,
}

impl Stage {
    pub fn new(frame: CanvasFrame, bounds: BoundingSize) -> Self {
        Self {
            frame,
            bounds,
            geometry: HandleGeometry::default(),
        }
    }

    pub fn with_geometry(mut self, geometry: HandleGeometry) -> Self {
        self.geometry = geometry;
        self
    }
}

/// Rotates a screen-space offset into the artwork's local axes.
pub fn to_local(dx: f64, dy: f64, rotation_degrees: f64) -> (f64, f64) {
    let theta = -rotation_degrees * std::f64::consts::PI / 180.0;
    let (sin, cos) = theta.sin_cos();
    (dx * cos - dy * sin, dx * sin + dy * cos)
}

/// Resolves which handle lies under a pointer.
pub fn detect_handle(pointer_x: f64, pointer_y: f64, transform: &Transform, stage: &Stage) -> Handle {
    let center = stage.frame.center_px(transform);
    let (local_x, local_y) = to_local(
        pointer_x - center.x,
        pointer_y - center.y,
        transform.rotation,
    );
    let (half_width, half_height) = stage.bounds.half_extents(transform.scale);
    let size = stage.geometry.handle_size;

    if local_x.abs() < size
        && (local_y + half_height + stage.geometry.rotate_offset).abs() < size
    {
        return Handle::Rotate;
    }

    let corners = [
        (-half_width, -half_height, Handle::Nw),
        (half_width, -half_height, Handle::Ne),
        (-half_width, half_height, Handle::Sw),
        (half_width, half_height, Handle::Se),
    ];
    for (corner_x, corner_y, handle) in corners {
        if (local_x - corner_x).abs() < size && (local_y - corner_y).abs() < size {
            return handle;
        }
    }

    if local_x.abs() < half_width && local_y.abs() < half_height {
        return Handle::Move;
    }

    Handle::None
}

/// Pixel centers of the on-screen handles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandlePositions {
    pub center: Point,
    pub nw: Point,
    pub ne: Point,
    pub sw: Point,
    pub se: Point,
    /// Midpoint of the top edge, where the guide line to the knob starts.
    pub top_center: Point,
    pub rotate: Point,
}

impl HandlePositions {
    pub fn corners(&self) -> [(Handle, Point); 4] {
        [
            (Handle::Nw, self.nw),
            (Handle::Ne, self.ne),
            (Handle::Sw, self.sw),
            (Handle::Se, self.se),
        ]
    }
}

/// Forward-rotates the local handle layout into canvas pixels.
pub fn handle_positions(transform: &Transform, stage: &Stage) -> HandlePositions {
    let center = stage.frame.center_px(transform);
    let rotation = Rotation2::new(transform.rotation.to_radians());
    let (hw, hh) = stage.bounds.half_extents(transform.scale);
    let place = |lx: f64, ly: f64| center + rotation * Vector2::new(lx, ly);

    HandlePositions {
        center,
        nw: place(-hw, -hh),
        ne: place(hw, -hh),
        sw: place(-hw, hh),
        se: place(hw, hh),
        top_center: place(0.0, -hh),
        rotate: place(0.0, -hh - stage.geometry.rotate_offset),
    }
}
