//! merchkit: headless renderer for saved customizations.
//!
//! ```text
//! merchkit render job.json --out renders/
//! merchkit presets --side back
//! merchkit config > ~/.config/merchkit/config.toml
//! ```

#![allow(clippy::print_stdout)]

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use merchkit::{init_logging, render_job, Config, RenderJob, Side};
use merchkit_customizer::default_catalog;
use merchkit_settings::default_config_path;

#[derive(Parser)]
#[command(name = "merchkit", version, long_version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")"))]
struct Cli {
    /// Configuration file (TOML or JSON). Defaults to the platform config dir.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the preview and texture of a saved customization.
    Render {
        /// Render job JSON: product, print area and customization record.
        job: PathBuf,

        /// Directory relative artwork paths resolve against. Defaults to the job's directory.
        #[arg(long)]
        artwork_root: Option<PathBuf>,

        /// Output directory for preview.png and texture.png.
        #[arg(long, short, default_value = ".")]
        out: PathBuf,
    },
    /// List the built-in preset positions.
    Presets {
        /// Only list presets for this side (front, back).
        #[arg(long)]
        side: Option<Side>,
    },
    /// Print the effective configuration as TOML.
    Config {
        /// Print built-in defaults instead of the loaded file.
        #[arg(long)]
        defaults: bool,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match path {
        Some(path) => return Ok(Config::load_from_file(path)?),
        None => default_config_path(),
    };
    match path {
        Ok(path) => Ok(Config::load_or_default(&path)?),
        Err(e) => {
            tracing::warn!("using default configuration: {}", e);
            Ok(Config::default())
        }
    }
}

async fn render(config: &Config, job: &Path, artwork_root: Option<PathBuf>, out: &Path) -> anyhow::Result<()> {
    let text = tokio::fs::read_to_string(job)
        .await
        .with_context(|| format!("reading {}", job.display()))?;
    let parsed = RenderJob::from_json(&text)?;
    let root = artwork_root
        .or_else(|| job.parent().map(Path::to_path_buf))
        .unwrap_or_default();

    let output = render_job(&parsed, config, &root, out).await?;
    let (width_px, height_px) = output.print_area.pixel_size();
    println!(
        "print area: {} ({}x{} px at {} dpi)",
        output.print_size(config.customizer.measurement_system),
        width_px,
        height_px,
        output.print_area.dpi
    );
    println!("preview: {}", output.preview.display());
    match &output.texture {
        Some(texture) => println!("texture: {}", texture.display()),
        None => println!("texture: none (artwork unavailable)"),
    }
    let t = output.transform;
    println!(
        "placement: {} (x {:.2}%, y {:.2}%, scale {:.2}, rotation {:.1}°)",
        output.label, t.x, t.y, t.scale, t.rotation
    );
    Ok(())
}

fn list_presets(side: Option<Side>) {
    for preset in default_catalog()
        .iter()
        .filter(|p| side.is_none_or(|s| p.side == s))
    {
        let t = &preset.transform;
        println!(
            "{:<6} {:<14} {:<14} x {:>5.1}%  y {:>5.1}%  scale {:.2}",
            preset.side.as_str(),
            preset.id,
            preset.label,
            t.x,
            t.y,
            t.scale
        );
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    match cli.command {
        Command::Render {
            job,
            artwork_root,
            out,
        } => {
            let config = load_config(cli.config.as_deref())?;
            render(&config, &job, artwork_root, &out).await?;
        }
        Command::Presets { side } => list_presets(side),
        Command::Config { defaults } => {
            let config = if defaults {
                Config::default()
            } else {
                load_config(cli.config.as_deref())?
            };
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}
