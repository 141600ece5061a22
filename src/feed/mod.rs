//! Raw NeoWs feed types and payload walking.
//!
//! Every field the feed may omit is an `Option` here; defaults and numeric
//! validation are applied once, in [`crate::transform`].

#[cfg(feature = "fetch")]
pub mod client;

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope key used by the full NeoWs `feed` response.
pub const NEAR_EARTH_OBJECTS_KEY: &str = "near_earth_objects";

/// NeoWs sends some numbers as JSON numbers and others as strings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FeedNumber {
    Number(f64),
    Text(String),
}

impl FeedNumber {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeedNumber::Number(n) => Some(*n),
            FeedNumber::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    pub fn raw(&self) -> String {
        match self {
            FeedNumber::Number(n) => n.to_string(),
            FeedNumber::Text(s) => s.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RawApproachRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_potentially_hazardous_asteroid: Option<bool>,
    #[serde(default)]
    pub estimated_diameter: Option<EstimatedDiameter>,
    #[serde(default)]
    pub close_approach_data: Vec<RawCloseApproach>,
}

impl RawApproachRecord {
    pub fn max_diameter_km(&self) -> Option<&FeedNumber> {
        self.estimated_diameter
            .as_ref()?
            .kilometers
            .as_ref()?
            .estimated_diameter_max
            .as_ref()
    }

    pub fn first_approach(&self) -> Option<&RawCloseApproach> {
        self.close_approach_data.first()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct EstimatedDiameter {
    #[serde(default)]
    pub kilometers: Option<DiameterRange>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct DiameterRange {
    #[serde(default)]
    pub estimated_diameter_min: Option<FeedNumber>,
    #[serde(default)]
    pub estimated_diameter_max: Option<FeedNumber>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RawCloseApproach {
    #[serde(default)]
    pub close_approach_date: Option<String>,
    #[serde(default)]
    pub miss_distance: Option<MissDistance>,
    #[serde(default)]
    pub relative_velocity: Option<RelativeVelocity>,
}

impl RawCloseApproach {
    pub fn miss_distance_km(&self) -> Option<&FeedNumber> {
        self.miss_distance.as_ref()?.kilometers.as_ref()
    }

    pub fn velocity_kps(&self) -> Option<&FeedNumber> {
        self.relative_velocity.as_ref()?.kilometers_per_second.as_ref()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct MissDistance {
    #[serde(default)]
    pub kilometers: Option<FeedNumber>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RelativeVelocity {
    #[serde(default)]
    pub kilometers_per_second: Option<FeedNumber>,
}

/// One array element of the feed, tagged with its date key.
#[derive(Debug)]
pub struct FeedEntry {
    pub date: String,
    pub record: Result<RawApproachRecord, serde_json::Error>,
}

/// Flattens a feed payload into entries, keeping date order and the order of
/// records within each date.
///
/// Accepts the full NeoWs response or the bare date -> records mapping. Any
/// other shape yields no entries.
pub fn feed_entries(payload: &Value) -> Vec<FeedEntry> {
    let dates = match payload.get(NEAR_EARTH_OBJECTS_KEY) {
        Some(Value::Object(dates)) => dates,
        Some(other) => {
            warn!("'{NEAR_EARTH_OBJECTS_KEY}' is not an object ({}); treating as no data", kind(other));
            return Vec::new();
        }
        None => match payload {
            Value::Object(dates) => dates,
            other => {
                warn!("feed payload is not an object ({}); treating as no data", kind(other));
                return Vec::new();
            }
        },
    };

    let mut entries = Vec::new();
    for (date, records) in dates {
        let Value::Array(records) = records else {
            warn!("feed date {date} does not hold a list ({}); skipping", kind(records));
            continue;
        };
        entries.extend(records.iter().map(|raw| FeedEntry {
            date: date.clone(),
            record: RawApproachRecord::deserialize(raw),
        }));
    }
    entries
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
