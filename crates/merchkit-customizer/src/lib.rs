//! # merchkit Customizer
//!
//! Artwork placement engine for the product customizer. It keeps a
//! percent-based transform for uploaded artwork, lets users manipulate it
//! with pointer and touch gestures, and renders the result both as a 2D
//! print-area preview and as a texture on the product's 3D mesh.
//!
//! ## Core Components
//!
//! - **History**: bounded undo/redo over committed transforms
//! - **Handles**: hit-testing against the rotated bounding box
//! - **Controller**: drag, corner resize, rotate and pinch gestures
//! - **Renderer / Texture / Mesh**: tiny-skia preview, texture projection
//!   and the product surface it is wrapped onto
//! - **Presets**: snap-to-preset detection for production handoff
//! - **Artwork**: asynchronous fetch and decode of uploaded images
//! - **Session**: ties the above together for one product
//!
//! ## Architecture
//!
//! ```text
//! CustomizationSession
//!   ├── TransformHistory (committed transform, undo/redo)
//!   ├── ManipulationController (live transform during gestures)
//!   │     └── detect_handle (Stage: frame, bounds, handle geometry)
//!   ├── ArtworkSlot (Empty | Loading | Ready | Failed)
//!   └── DualRenderer
//!         ├── PreviewRenderer (2D)
//!         └── TextureProjector → MeshMaterial → ProductMesh (3D)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use merchkit_customizer::{CompositeSource, CustomizationSession, SessionOptions};
//!
//! let mut session = CustomizationSession::new(catalog, SessionOptions::default())?;
//! let ticket = session.begin_artwork_load("file:///tmp/logo.png".into(), false);
//! let completion = merchkit_customizer::load_artwork(&CompositeSource::new(), ticket).await;
//! session.complete_artwork_load(completion);
//! session.apply_preset("center-chest");
//! session.render();
//! ```

pub mod artwork;
pub mod controller;
pub mod dual;
pub mod handles;
pub mod history;
pub mod mesh;
pub mod presets;
pub mod renderer;
pub mod session;
pub mod texture;

pub use artwork::{
    decode_artwork, load_artwork, ArtworkSource, CompositeSource, DataUriSource, FileSource,
    LoadCompletion, LoadTicket, ObjectStoreSource, MAX_ARTWORK_DIMENSION,
};
pub use controller::{
    ControllerOptions, GestureState, GestureUpdate, ManipulationController, Modifiers,
};
pub use dual::{DualRenderer, RenderScene};
pub use handles::{
    detect_handle, handle_positions, BoundingSize, CanvasFrame, Handle, HandleGeometry,
    HandlePositions, Point, Stage,
};
pub use history::TransformHistory;
pub use mesh::{ProductMesh, Vertex};
pub use presets::{
    back_positions, default_catalog, front_positions, match_preset, match_preset_default,
    PlacementLabel,
};
pub use renderer::{draw_artwork, Artwork, PreviewRenderer, RenderOptions};
pub use session::{ArtworkSlot, CustomizationSession, LoadOutcome, SessionEvent, SessionOptions};
pub use texture::{
    encode_png, encode_png_data_uri, MeshMaterial, Texture, TextureProjector, WrapMode,
};

pub use tiny_skia::{Color, Pixmap};
