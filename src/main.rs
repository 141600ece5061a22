use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use neo_tracker::config::TrackerConfig;
use neo_tracker::render_site;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;

/// Render a saved NeoWs feed payload to a standalone 3D page.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Feed payload (full NeoWs response or a date -> records mapping)
    input: PathBuf,
    /// JSON config file; missing fields keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Output HTML path
    #[arg(short, long)]
    out: Option<PathBuf>,
    /// Seed for marker placement
    #[arg(long)]
    seed: Option<u64>,
    /// Disable camera auto-rotation
    #[arg(long)]
    no_spin: bool,
    #[arg(long, default_value = "Near-Earth Asteroids Close Approaches")]
    title: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => TrackerConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => TrackerConfig::default(),
    };
    if let Some(out) = args.out {
        config.export.out_path = out;
    }
    if args.no_spin {
        config.export.rotation.enabled = false;
    }

    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    // A payload that is not JSON at all renders as an empty scene.
    let payload: Option<Value> = match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("{} is not valid JSON ({err}); rendering without data", args.input.display());
            None
        }
    };

    let mut rng = match args.seed.or(config.feed.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let report = render_site(payload.as_ref(), &args.title, &config, &mut rng)
        .context("failed to export page")?;

    info!(
        "Rendered {} points to {} ({} skipped)",
        report.points,
        report.path.display(),
        report.skipped.total()
    );
    Ok(())
}
