use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Days, Local};
use clap::Parser;
use log::{info, warn};
use neo_tracker::config::TrackerConfig;
use neo_tracker::feed::client::FeedClient;
use neo_tracker::render_site;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Fetch this week's close approaches and publish the rotating 3D page.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long)]
    out: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    no_spin: bool,
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

    let today = Local::now().date_naive();
    let end = today
        .checked_add_days(Days::new(u64::from(config.feed.window_days)))
        .context("fetch window overflows the calendar")?;
    let start = today.format("%Y-%m-%d").to_string();
    let end = end.format("%Y-%m-%d").to_string();

    let client = FeedClient::from_env().context("failed to build HTTP client")?;
    let payload = match client.fetch_window(&start, &end) {
        Ok(payload) => Some(payload),
        Err(err) => {
            warn!("Feed request failed ({err}); producing an empty page");
            None
        }
    };

    let title = if payload.is_some() {
        format!("Near-Earth Asteroids Close Approaches ({start} → {end})")
    } else {
        format!("Near-Earth Asteroids ({start} → {end})")
    };

    let mut rng = match args.seed.or(config.feed.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let report = render_site(payload.as_ref(), &title, &config, &mut rng)
        .with_context(|| format!("failed to write {}", config.export.out_path.display()))?;

    info!(
        "Published {} close approaches to {} ({} missing approach data, {} malformed)",
        report.points,
        report.path.display(),
        report.skipped.missing_approach,
        report.skipped.malformed
    );
    Ok(())
}
