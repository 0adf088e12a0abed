//! # merchkit
//!
//! Artwork placement engine for a print-on-demand product customizer.
//!
//! ## Architecture
//!
//! merchkit is organized as a workspace with multiple crates:
//!
//! 1. **merchkit-core** - Transform model, print areas, presets, store records
//! 2. **merchkit-customizer** - Hit-testing, gestures, history, 2D preview and 3D texture
//! 3. **merchkit-settings** - Configuration files and validation
//! 4. **merchkit** - Logging setup, settings glue and the headless CLI
//!
//! ## Features
//!
//! - **Normalized placement**: percent position, scale and rotation about the artwork center
//! - **Interactive manipulation**: drag, corner resize, rotate knob, pinch zoom
//! - **Dual rendering**: a canvas preview and a mesh texture drawn from the same transform
//! - **Preset detection**: production placement zones matched within tolerance

pub use merchkit_core::{
    ArtworkReference, CustomizationRecord, PresetPosition, PrintArea, ProductCatalog, Side,
    SurfaceKind, Transform,
};
pub use merchkit_customizer::{CustomizationSession, PlacementLabel, SessionOptions};
pub use merchkit_settings::Config;

use anyhow::Context;
use merchkit_core::units::{format_length, MeasurementSystem};
use merchkit_customizer::{
    encode_png, load_artwork, Color, CompositeSource, ControllerOptions, FileSource,
    HandleGeometry, LoadOutcome, RenderOptions,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Build timestamp
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with tracing
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    // stdout carries command output
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("logging already initialized")?;

    Ok(())
}

fn color([r, g, b, a]: [u8; 4]) -> Color {
    Color::from_rgba8(r, g, b, a)
}

/// Maps validated settings onto session tunables.
pub fn session_options(config: &Config) -> anyhow::Result<SessionOptions> {
    config.validate()?;
    let c = &config.customizer;
    let r = &config.rendering;
    let [background, grid, guide, selection, product] = r.colors()?;

    Ok(SessionOptions {
        history_limit: c.history_limit,
        base_artwork_px: c.base_artwork_px,
        geometry: HandleGeometry {
            handle_size: c.handle_size,
            rotate_offset: c.rotate_offset,
        },
        controller: ControllerOptions {
            min_dimension_px: c.min_dimension_px,
        },
        tolerance_percent: c.preset_tolerance_percent,
        tolerance_scale: c.preset_tolerance_scale,
        render: RenderOptions {
            show_grid: r.show_grid,
            show_guides: r.show_guides,
            show_selection: r.show_selection,
            grid_spacing: r.grid_spacing,
            background: color(background),
            grid_color: color(grid),
            guide_color: color(guide),
            selection_color: color(selection),
        },
        base_color: color(product),
        export_texture_data_uri: r.export_texture_data_uri,
    })
}

/// Physical print area of a render job.
///
/// Jobs may omit `dpi`; the configured density applies then.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct JobPrintArea {
    pub width_mm: f64,
    pub height_mm: f64,
    #[serde(default)]
    pub dpi: Option<f64>,
}

impl JobPrintArea {
    pub fn resolve(&self, default_dpi: f64) -> PrintArea {
        PrintArea::new(self.width_mm, self.height_mm).with_dpi(self.dpi.unwrap_or(default_dpi))
    }
}

/// A saved customization together with the product it was placed on.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderJob {
    pub product: String,
    #[serde(default)]
    pub surface: SurfaceKind,
    pub print_area: JobPrintArea,
    #[serde(default)]
    pub presets: Vec<PresetPosition>,
    pub customization: CustomizationRecord,
}

impl RenderJob {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid render job")
    }

    pub fn catalog(&self, default_dpi: f64) -> ProductCatalog {
        ProductCatalog::new(self.product.clone(), self.surface)
            .with_print_area(
                self.customization.side,
                self.print_area.resolve(default_dpi),
            )
            .with_presets(self.presets.clone())
    }
}

/// Files written by [`render_job`].
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutput {
    pub print_area: PrintArea,
    pub preview: PathBuf,
    pub texture: Option<PathBuf>,
    pub label: PlacementLabel,
    pub transform: Transform,
}

impl RenderOutput {
    /// Physical print size, e.g. `210.0 mm x 95.0 mm`.
    pub fn print_size(&self, system: MeasurementSystem) -> String {
        format!(
            "{} x {}",
            format_length(self.print_area.width_mm, system),
            format_length(self.print_area.height_mm, system)
        )
    }
}

/// Reopens a customization, loads its artwork and writes `preview.png`
/// and `texture.png` into `out_dir`. Session tunables and the default
/// print density come from `config`.
///
/// Artwork that fails to load degrades to a preview without artwork and
/// no texture.
pub async fn render_job(
    job: &RenderJob,
    config: &Config,
    artwork_root: &Path,
    out_dir: &Path,
) -> anyhow::Result<RenderOutput> {
    let options = session_options(config)?;
    let catalog = job.catalog(config.customizer.dpi);
    let (mut session, ticket) =
        CustomizationSession::from_record(catalog, &job.customization, options)?;

    let source = CompositeSource::new().with_files(FileSource::with_root(artwork_root));
    let completion = load_artwork(&source, ticket).await;
    if let LoadOutcome::Failed(e) = session.complete_artwork_load(completion) {
        tracing::warn!("rendering without artwork: {}", e);
    }
    session.render();

    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let renderer = session.renderer();
    let preview_pixmap = renderer
        .preview()
        .context("print area has no drawable pixels")?;
    let preview = out_dir.join("preview.png");
    tokio::fs::write(&preview, encode_png(preview_pixmap)?).await?;

    let texture = match renderer.material().map.as_ref() {
        Some(map) => {
            let path = out_dir.join("texture.png");
            tokio::fs::write(&path, encode_png(&map.pixmap)?).await?;
            Some(path)
        }
        None => None,
    };

    tracing::info!("rendered {} into {}", job.product, out_dir.display());
    Ok(RenderOutput {
        print_area: session.print_area(),
        preview,
        texture,
        label: session.placement_label(),
        transform: session.transform(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use merchkit_customizer::Pixmap;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    #[test]
    fn test_default_config_matches_default_options() {
        let options = session_options(&Config::default()).expect("options");
        assert_eq!(options, SessionOptions::default());
    }

    #[test]
    fn test_session_options_follow_config() {
        let mut config = Config::default();
        config.customizer.handle_size = 16.0;
        config.customizer.history_limit = 5;
        config.rendering.show_grid = false;
        config.rendering.product_color = "#000000".to_string();

        let options = session_options(&config).expect("options");
        assert_eq!(options.geometry.handle_size, 16.0);
        assert_eq!(options.history_limit, 5);
        assert!(!options.render.show_grid);
        assert_eq!(options.base_color, Color::BLACK);
    }

    fn job(dpi: &str) -> RenderJob {
        RenderJob::from_json(&format!(
            r#"{{
                "product": "classic-tee",
                "print_area": {{ "width_mm": 210.0, "height_mm": 95.0 {dpi} }},
                "customization": {{
                    "artwork": "logo.png",
                    "transform": {{ "x": 50.0, "y": 50.0, "scale": 1.0, "rotation": 0.0 }},
                    "side": "back"
                }}
            }}"#
        ))
        .expect("job")
    }

    #[test]
    fn test_job_without_dpi_uses_configured_density() {
        let area = job("")
            .catalog(192.0)
            .require_print_area(Side::Back)
            .expect("back area");
        assert_eq!(area.dpi, 192.0);
        assert_eq!(area.pixel_size(), (1587, 718));

        let area = job(r#", "dpi": 96.0"#)
            .catalog(192.0)
            .require_print_area(Side::Back)
            .expect("back area");
        assert_eq!(area.pixel_size(), (794, 359));
    }

    #[test]
    fn test_print_size_follows_measurement_system() {
        let output = RenderOutput {
            print_area: PrintArea::new(254.0, 127.0),
            preview: PathBuf::from("preview.png"),
            texture: None,
            label: PlacementLabel::Custom,
            transform: Transform::default(),
        };
        assert_eq!(
            output.print_size(MeasurementSystem::Metric),
            "254.0 mm x 127.0 mm"
        );
        assert_eq!(
            output.print_size(MeasurementSystem::Imperial),
            "10.00 in x 5.00 in"
        );
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = Config::default();
        config.rendering.selection_color = "red".to_string();
        assert!(session_options(&config).is_err());
    }

    fn job_json(artwork: &str, transform: &str) -> String {
        format!(
            r#"{{
                "product": "classic-tee",
                "surface": "flat",
                "print_area": {{ "width_mm": 210.0, "height_mm": 95.0 }},
                "customization": {{
                    "artwork": "{artwork}",
                    "transform": {transform},
                    "side": "front"
                }}
            }}"#
        )
    }

    fn write_logo(dir: &Path) {
        let mut pixmap = Pixmap::new(50, 50).expect("pixmap");
        pixmap.fill(Color::from_rgba8(200, 30, 30, 255));
        std::fs::write(dir.join("logo.png"), encode_png(&pixmap).expect("png")).expect("write");
    }

    #[tokio::test]
    async fn test_render_job_writes_preview_and_texture() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_logo(dir.path());
        let job = RenderJob::from_json(&job_json(
            "logo.png",
            r#"{ "x": 50.0, "y": 35.0, "scale": 0.6, "rotation": 0.0 }"#,
        ))
        .expect("job");

        let out = dir.path().join("out");
        let output = render_job(&job, &Config::default(), dir.path(), &out)
            .await
            .expect("render");

        assert_eq!(output.transform, Transform::new(50.0, 35.0, 0.6, 0.0));
        assert_eq!(output.label.preset_id(), Some("center-chest"));
        assert_eq!(output.print_area.pixel_size(), (794, 359));

        let preview = std::fs::read(&output.preview).expect("preview");
        assert!(preview.starts_with(PNG_MAGIC));
        let texture = std::fs::read(output.texture.expect("texture path")).expect("texture");
        assert!(texture.starts_with(PNG_MAGIC));
    }

    #[tokio::test]
    async fn test_render_job_applies_configured_dpi() {
        let dir = tempfile::tempdir().expect("tempdir");
        let job = RenderJob::from_json(&job_json(
            "absent.png",
            r#"{ "x": 50.0, "y": 50.0, "scale": 1.0, "rotation": 0.0 }"#,
        ))
        .expect("job");

        let mut config = Config::default();
        config.customizer.dpi = 192.0;
        let output = render_job(&job, &config, dir.path(), dir.path())
            .await
            .expect("render");

        assert_eq!(output.print_area.dpi, 192.0);
        assert_eq!(output.print_area.pixel_size(), (1587, 718));
    }

    #[tokio::test]
    async fn test_missing_artwork_renders_preview_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        let job = RenderJob::from_json(&job_json(
            "absent.png",
            r#"{ "x": 12.0, "y": 80.0, "scale": 1.1, "rotation": 15.0 }"#,
        ))
        .expect("job");

        let output = render_job(&job, &Config::default(), dir.path(), dir.path())
            .await
            .expect("render");

        assert!(output.preview.exists());
        assert_eq!(output.texture, None);
        assert_eq!(output.label, PlacementLabel::Custom);
        assert_eq!(output.transform, Transform::new(12.0, 80.0, 1.1, 15.0));
    }

    #[test]
    fn test_job_without_print_area_is_rejected() {
        let json = r#"{ "product": "mug", "customization": {
            "artwork": "a.png",
            "transform": { "x": 50.0, "y": 50.0, "scale": 1.0, "rotation": 0.0 },
            "side": "front"
        } }"#;
        assert!(RenderJob::from_json(json).is_err());
    }
}
