//! Data models shared by the customizer engine and its collaborators.

pub mod artwork;
pub mod preset;
pub mod print_area;
pub mod transform;

pub use artwork::ArtworkReference;
pub use preset::{PresetPosition, PresetTransform};
pub use print_area::{PrintArea, Side, SurfaceKind};
pub use transform::{
    clamp_percent, clamp_scale, normalize_degrees, Transform, MAX_SCALE, MIN_SCALE,
};
