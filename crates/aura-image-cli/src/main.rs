//! aura-image - render image files through a RenderSurface
//!
//! Stands in for the UI boundary: sets properties on a surface, waits for
//! each load, and writes the composited frame to a PNG file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use aura_image::{Config, ImageSource, Rect, RenderSurface, ResizeMode};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: aura-image <path>... [--out FILE] [--size WxH] [--mode MODE] [--radius R] [--config FILE]";

#[derive(Debug)]
struct Args {
    paths: Vec<String>,
    out: PathBuf,
    width: f32,
    height: f32,
    mode: ResizeMode,
    radius: f32,
    config: Option<PathBuf>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut parsed = Args {
            paths: Vec::new(),
            out: PathBuf::from("aura-image.png"),
            width: 320.0,
            height: 240.0,
            mode: ResizeMode::default(),
            radius: 0.0,
            config: None,
        };

        while let Some(arg) = args.next() {
            let mut value = |name: &str| args.next().with_context(|| format!("{name} needs a value"));
            match arg.as_str() {
                "--out" | "-o" => parsed.out = PathBuf::from(value("--out")?),
                "--size" => {
                    let size = value("--size")?;
                    let (w, h) = size
                        .split_once('x')
                        .with_context(|| format!("size must look like 320x240, got {size}"))?;
                    parsed.width = w.parse().context("invalid width")?;
                    parsed.height = h.parse().context("invalid height")?;
                }
                "--mode" => parsed.mode = value("--mode")?.parse()?,
                "--radius" => parsed.radius = value("--radius")?.parse().context("invalid radius")?,
                "--config" => parsed.config = Some(PathBuf::from(value("--config")?)),
                "--help" | "-h" => bail!(USAGE),
                flag if flag.starts_with("--") => bail!("unknown option {flag}\n{USAGE}"),
                _ => parsed.paths.push(arg),
            }
        }

        if parsed.paths.is_empty() {
            bail!(USAGE);
        }
        Ok(parsed)
    }

    /// Output file for the `index`th input
    fn output_for(&self, index: usize) -> PathBuf {
        if self.paths.len() == 1 {
            return self.out.clone();
        }

        let stem = self.out.file_stem().and_then(|s| s.to_str()).unwrap_or("aura-image");
        let file = format!("{stem}-{index}.png");
        match self.out.parent() {
            Some(dir) if dir != Path::new("") => dir.join(file),
            _ => PathBuf::from(file),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse(std::env::args().skip(1))?;

    let config = match &args.config {
        Some(path) => Config::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };
    tracing::debug!("Using {:?}", config);

    let source = ImageSource::new(&config.source);
    let mut surface = RenderSurface::new(source, config.render.clone());

    surface.on_load(|e| tracing::info!("Loaded {} ({}x{})", e.path, e.width, e.height));
    surface.on_error(|e| tracing::error!("Could not load {} ({}): {}", e.path, e.reason, e.message));

    surface.set_target_rect(Rect::new(0.0, 0.0, args.width, args.height));
    surface.set_resize_mode(args.mode);
    surface.set_corner_radius(args.radius);

    let mut failures = 0;
    for (index, path) in args.paths.iter().enumerate() {
        surface.set_path(path.as_str());
        if !surface.wait_for_completion() {
            failures += 1;
            continue;
        }

        let Some(canvas) = surface.frame().and_then(|frame| frame.canvas.as_ref()) else {
            tracing::warn!("Nothing to write for {}: target has no area", path);
            continue;
        };

        let out = args.output_for(index);
        canvas
            .save_png(&out)
            .with_context(|| format!("writing {}", out.display()))?;
        tracing::info!("Wrote {}", out.display());
    }

    let stats = surface.source().stats();
    tracing::info!(
        "Done: {} decode(s), {} cache hit(s), {} byte(s) cached",
        stats.decodes,
        stats.hits,
        stats.bytes
    );

    if failures > 0 {
        bail!("{failures} of {} image(s) failed to load", args.paths.len());
    }
    Ok(())
}
