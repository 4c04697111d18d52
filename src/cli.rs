//! Command line front end.
//!
//! ```text
//! roikit render <image> <profiles.json> <out.png> [--width N] [--max-height N] [--config PATH]
//! ```
//!
//! `render` composites every visible profile of a profile document over a
//! camera still, fitted the same way the interactive surface fits it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use roikit_annotator::{
    pixmap_to_image, FrameGeometry, ProfileDocument, RenderStyle, Renderer, Scene,
};
use roikit_settings::Config;

#[derive(Parser, Debug)]
#[command(
    name = "roikit",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")"),
    about = "Region-of-interest annotation for camera stills",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Composite the visible profiles of a document over an image.
    Render(RenderArgs),
}

/// Arguments of the `render` command.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct RenderArgs {
    /// Camera still to draw over
    pub image: PathBuf,
    /// Profile document (JSON)
    pub profiles: PathBuf,
    /// PNG to write
    pub output: PathBuf,
    /// Container width in pixels; overrides the config
    #[arg(long, value_parser = parse_dimension)]
    pub width: Option<f64>,
    /// Maximum frame height in pixels; overrides the config
    #[arg(long, value_parser = parse_dimension)]
    pub max_height: Option<f64>,
    /// Config file to use instead of the default location
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn parse_dimension(value: &str) -> std::result::Result<f64, String> {
    let n: f64 = value
        .parse()
        .map_err(|_| format!("expected a number, got '{}'", value))?;
    if !(n.is_finite() && n > 0.0) {
        return Err(format!("must be positive, got {}", n));
    }
    Ok(n)
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load_or_default().context("Failed to load config")?,
    };
    Ok(config)
}

/// Renders a profile document over an image and writes a PNG.
pub fn render(args: &RenderArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.render.container_width = width;
    }
    if let Some(max_height) = args.max_height {
        config.render.max_height = max_height;
    }

    let image = image::open(&args.image)
        .with_context(|| format!("Failed to decode {}", args.image.display()))?
        .to_rgba8();
    let (natural_width, natural_height) = image.dimensions();
    let document = ProfileDocument::load_from_file(&args.profiles)?;

    let frame = FrameGeometry::fit(
        natural_width as f64,
        natural_height as f64,
        config.render.container_width,
        config.render.max_height,
    )
    .with_context(|| {
        format!(
            "Cannot fit a {}x{} image into {}x{}",
            natural_width,
            natural_height,
            config.render.container_width,
            config.render.max_height
        )
    })?;

    let mut renderer = Renderer::new(RenderStyle::from(&config.render));
    renderer.set_base_image(image);
    let pixmap = renderer
        .render(&frame, &Scene::new(&document.profiles))
        .with_context(|| format!("Frame {} is too small to render", frame))?;

    let shapes: usize = document
        .profiles
        .iter()
        .filter(|p| p.visible)
        .map(|p| p.shapes.len())
        .sum();
    pixmap_to_image(&pixmap)
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    tracing::info!(
        "Rendered {} shapes at {} to {}",
        shapes,
        frame,
        args.output.display()
    );
    Ok(())
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Render(args) => render(&args),
    }
}
