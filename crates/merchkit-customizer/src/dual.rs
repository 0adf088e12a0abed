//! Keeps the 2D preview and the 3D material in lockstep.

use crate::handles::Stage;
use crate::mesh::ProductMesh;
use crate::renderer::{Artwork, PreviewRenderer, RenderOptions};
use crate::texture::{encode_png_data_uri, MeshMaterial, TextureProjector};
use merchkit_core::{ArtworkReference, PrintArea, SurfaceKind, Transform};
use tiny_skia::{Color, Pixmap};
use tracing::{debug, warn};

/// Inputs of one render pass.
#[derive(Debug, Clone, Copy)]
pub struct RenderScene<'a> {
    pub artwork: Option<&'a Artwork>,
    pub transform: Transform,
    pub print_area: PrintArea,
    pub surface: SurfaceKind,
    pub stage: Stage,
}

#[derive(Debug, Clone, PartialEq)]
struct SyncKey {
    artwork: Option<(ArtworkReference, u64)>,
    transform: Transform,
    print_area: PrintArea,
    surface: SurfaceKind,
    stage: Stage,
}

impl SyncKey {
    fn of(scene: &RenderScene<'_>) -> Self {
        Self {
            artwork: scene
                .artwork
                .map(|a| (a.reference().clone(), a.epoch())),
            transform: scene.transform,
            print_area: scene.print_area,
            surface: scene.surface,
            stage: scene.stage,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DualRenderer {
    preview: PreviewRenderer,
    projector: TextureProjector,
    material: MeshMaterial,
    mesh: Option<ProductMesh>,
    preview_pixmap: Option<Pixmap>,
    export_data_uri: bool,
    last: Option<SyncKey>,
    passes: u64,
}

impl DualRenderer {
    pub fn new(options: RenderOptions, base_color: Color) -> Self {
        Self {
            preview: PreviewRenderer::new(options),
            projector: TextureProjector,
            material: MeshMaterial::new("product", base_color),
            mesh: None,
            preview_pixmap: None,
            export_data_uri: false,
            last: None,
            passes: 0,
        }
    }

    /// Also export each texture as a PNG data URI.
    pub fn with_data_uri_export(mut self, enabled: bool) -> Self {
        self.export_data_uri = enabled;
        self
    }

    /// Re-renders both outputs when any scene input changed.
    ///
    /// Returns whether a pass ran.
    pub fn sync(&mut self, scene: &RenderScene<'_>) -> bool {
        let key = SyncKey::of(scene);
        if self.last.as_ref() == Some(&key) {
            return false;
        }

        let mesh_stale = self.last.as_ref().map_or(true, |last| {
            last.print_area != key.print_area || last.surface != key.surface
        });
        if mesh_stale {
            self.mesh = Some(ProductMesh::for_print_area(&scene.print_area, scene.surface));
        }

        self.preview_pixmap = self
            .preview
            .render(scene.artwork, &scene.transform, &scene.stage);

        let texture = scene.artwork.and_then(|artwork| {
            self.projector
                .project_texture(artwork, &scene.transform, &scene.stage, scene.surface)
        });
        match texture {
            Some(mut texture) => {
                if self.export_data_uri {
                    match encode_png_data_uri(&texture.pixmap) {
                        Ok(uri) => texture.data_uri = Some(uri),
                        Err(e) => warn!("texture export failed: {}", e),
                    }
                }
                self.material.set_map(texture);
            }
            None => self.material.clear_map(),
        }

        self.passes += 1;
        debug!(pass = self.passes, has_map = self.material.has_map(), "render pass");
        self.last = Some(key);
        true
    }

    /// Forces the next `sync` to render.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    pub fn preview(&self) -> Option<&Pixmap> {
        self.preview_pixmap.as_ref()
    }

    pub fn material(&self) -> &MeshMaterial {
        &self.material
    }

    pub fn material_mut(&mut self) -> &mut MeshMaterial {
        &mut self.material
    }

    pub fn mesh(&self) -> Option<&ProductMesh> {
        self.mesh.as_ref()
    }

    /// Per-vertex colors of the mesh with the current material.
    pub fn vertex_colors(&self) -> Vec<Color> {
        self.mesh
            .as_ref()
            .map(|mesh| mesh.project(&self.material))
            .unwrap_or_default()
    }

    /// Number of render passes run so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn options(&self) -> &RenderOptions {
        self.preview.options()
    }
}

impl Default for DualRenderer {
    fn default() -> Self {
        Self::new(RenderOptions::default(), Color::WHITE)
    }
}
