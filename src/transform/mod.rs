use log::{debug, info, warn};
use rand::Rng;
use serde_json::Value;
use thiserror::Error;

use crate::feed::{feed_entries, FeedNumber, RawApproachRecord};
use crate::units::{km_to_au, sample_direction, spherical_to_cartesian};
use crate::PlotPoint;

/// Used when the feed has no diameter, so markers never collapse to zero.
pub const DEFAULT_DIAMETER_KM: f64 = 0.001;
pub const UNKNOWN_NAME: &str = "Unknown object";

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("record has no close-approach data")]
    NoCloseApproach,
    #[error("field '{field}' is not a non-negative number: {value:?}")]
    MalformedField { field: &'static str, value: String },
    #[error("record does not match the feed schema: {0}")]
    InvalidRecord(#[from] serde_json::Error),
}

impl TransformError {
    fn missing(field: &'static str) -> Self {
        TransformError::MalformedField {
            field,
            value: "<missing>".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SkipCounts {
    pub missing_approach: usize,
    pub malformed: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.missing_approach + self.malformed
    }
}

#[derive(Clone, Debug, Default)]
pub struct TransformOutcome {
    pub points: Vec<PlotPoint>,
    pub skipped: SkipCounts,
}

/// A record after defaults and numeric parsing, before any geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidRecord {
    pub name: String,
    pub hazardous: bool,
    pub diameter_km: f64,
    pub distance_km: f64,
    pub velocity_kps: f64,
}

impl ValidRecord {
    pub fn from_raw(record: &RawApproachRecord) -> Result<Self, TransformError> {
        let approach = record.first_approach().ok_or(TransformError::NoCloseApproach)?;

        let distance_km = parse_field(
            "miss_distance.kilometers",
            approach.miss_distance_km().ok_or_else(|| TransformError::missing("miss_distance.kilometers"))?,
        )?;
        let velocity_kps = parse_field(
            "relative_velocity.kilometers_per_second",
            approach
                .velocity_kps()
                .ok_or_else(|| TransformError::missing("relative_velocity.kilometers_per_second"))?,
        )?;
        let diameter_km = match record.max_diameter_km() {
            Some(raw) => parse_field("estimated_diameter_max", raw)?,
            None => DEFAULT_DIAMETER_KM,
        };

        Ok(ValidRecord {
            name: record.name.clone().unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            hazardous: record.is_potentially_hazardous_asteroid.unwrap_or(false),
            diameter_km,
            distance_km,
            velocity_kps,
        })
    }
}

/// Distances, speeds and sizes are magnitudes; a negative value is malformed.
fn parse_field(field: &'static str, raw: &FeedNumber) -> Result<f64, TransformError> {
    raw.as_f64()
        .filter(|n| *n >= 0.0)
        .ok_or_else(|| TransformError::MalformedField {
            field,
            value: raw.raw(),
        })
}

pub fn transform_record<R: Rng + ?Sized>(
    record: &RawApproachRecord,
    rng: &mut R,
) -> Result<PlotPoint, TransformError> {
    let valid = ValidRecord::from_raw(record)?;
    Ok(place(valid, rng))
}

/// Places the object at its true miss distance in a randomly sampled
/// direction.
fn place<R: Rng + ?Sized>(record: ValidRecord, rng: &mut R) -> PlotPoint {
    let radius_au = km_to_au(record.distance_km);
    let (theta, phi) = sample_direction(rng);
    let label = hover_label(&record);
    PlotPoint {
        pos: spherical_to_cartesian(radius_au, theta, phi),
        label,
        name: record.name,
        diameter_km: record.diameter_km,
        hazardous: record.hazardous,
        distance_km: record.distance_km,
        velocity_kps: record.velocity_kps,
    }
}

pub fn hover_label(record: &ValidRecord) -> String {
    format!(
        "Name: {}<br>Distance: {} km<br>Velocity: {:.2} km/s<br>Diameter: {:.3} km<br>Hazardous: {}",
        record.name,
        format_thousands(record.distance_km),
        record.velocity_kps,
        record.diameter_km,
        if record.hazardous { "Yes" } else { "No" },
    )
}

/// Rounds to a whole number and groups digits with commas.
pub fn format_thousands(value: f64) -> String {
    let rounded = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(rounded.len() + rounded.len() / 3 + 1);
    for (i, ch) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value.is_sign_negative() && rounded != "0" {
        grouped.insert(0, '-');
    }
    grouped
}

/// Turns a whole feed payload into plot points, in payload order.
///
/// Per-record problems are counted and skipped; they never fail the batch.
pub fn transform_feed<R: Rng + ?Sized>(payload: &Value, rng: &mut R) -> TransformOutcome {
    let mut outcome = TransformOutcome::default();

    for entry in feed_entries(payload) {
        let result = entry
            .record
            .map_err(TransformError::from)
            .and_then(|record| transform_record(&record, rng));
        match result {
            Ok(point) => outcome.points.push(point),
            Err(TransformError::NoCloseApproach) => {
                debug!("Skipping record on {} without close-approach data", entry.date);
                outcome.skipped.missing_approach += 1;
            }
            Err(err) => {
                warn!("Skipping malformed record on {}: {err}", entry.date);
                outcome.skipped.malformed += 1;
            }
        }
    }

    info!(
        "Processed {} close approach events ({} without approach data, {} malformed)",
        outcome.points.len(),
        outcome.skipped.missing_approach,
        outcome.skipped.malformed
    );
    outcome
}
