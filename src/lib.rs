pub mod config;
pub mod export;
pub mod feed;
pub mod scene;
pub mod transform;
pub mod units;

use std::path::PathBuf;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::TrackerConfig;
use crate::export::ExportError;
use crate::transform::SkipCounts;

/// One close approach, ready to be plotted around the observing body.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlotPoint {
    pub name: String,
    /// Position in AU, origin at the observing body. The direction is an
    /// illustrative random placement; only the radius is physical.
    pub pos: [f64; 3],
    pub diameter_km: f64,
    pub hazardous: bool,
    pub distance_km: f64,
    pub velocity_kps: f64,
    /// Pre-formatted hover text (`<br>` separated).
    pub label: String,
}

impl PlotPoint {
    pub fn distance_au(&self) -> f64 {
        let [x, y, z] = self.pos;
        (x * x + y * y + z * z).sqrt()
    }

    /// Largest absolute coordinate, used for axis bounds.
    pub fn max_abs_coord(&self) -> f64 {
        self.pos.iter().fold(0.0_f64, |acc, c| acc.max(c.abs()))
    }
}

/// Summary of one feed -> page run.
#[derive(Clone, Debug)]
pub struct SiteReport {
    pub path: PathBuf,
    pub points: usize,
    pub skipped: SkipCounts,
}

/// Transforms `payload` (if any), builds the scene and writes the page.
///
/// A missing payload still produces a styled page with only the body.
pub fn render_site<R: Rng + ?Sized>(
    payload: Option<&Value>,
    title: &str,
    config: &TrackerConfig,
    rng: &mut R,
) -> Result<SiteReport, ExportError> {
    let outcome = payload
        .map(|payload| transform::transform_feed(payload, rng))
        .unwrap_or_default();
    let points = outcome.points.len();
    let scene = scene::build_scene(outcome.points, &config.scene);
    let path = export::write_page(&scene, title, &config.export)?;
    Ok(SiteReport {
        path,
        points,
        skipped: outcome.skipped,
    })
}
