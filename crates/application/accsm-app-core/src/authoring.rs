//! Setup authoring: the new-setup form and in-place edits of a viewed setup.
//!
//! Both stamp the `ACCSMData` block (modification time, tags, setup type)
//! into the JSON before it is validated and saved by the backend.

use accsm_core::filename::SetupFilename;
use accsm_core::{CarId, SetupFile, SetupId, TrackId};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};

use crate::error::DraftError;

pub const SETUP_TYPES: [&str; 4] = ["race", "qualifying", "wet", "custom"];
pub const DEFAULT_SETUP_TYPE: &str = "race";

const META_KEY: &str = "ACCSMData";

/// Skeleton of a blank setup for `car_id`.
pub fn setup_template(car_id: &str) -> Value {
    json!({
        "carName": car_id,
        "basicSetup": {
            "tyres": { "tyreSet": 0, "tyrePressure": [27.5, 27.0, 26.5, 26.0] },
            "alignment": {
                "camber": [0, 0, 0, 0],
                "toe": [0, 0, 0, 0],
                "staticCamber": [0, 0, 0, 0],
                "toeOutLinear": [0, 0, 0, 0],
                "casterLF": 0,
                "casterRF": 0,
                "steerRatio": 0
            },
            "electronics": {
                "tC1": 1,
                "tC2": 0,
                "abs": 3,
                "eCUMap": 0,
                "fuelMix": 0,
                "telemetryLaps": accsm_config::LFM_TELEMETRY_LAPS
            },
            "strategy": {
                "fuel": 0,
                "nPitStops": 0,
                "tyreSet": 0,
                "frontBrakePadCompound": 0,
                "rearBrakePadCompound": 0,
                "pitStrategy": [{
                    "fuelToAdd": 0,
                    "tyres": { "tyreSet": 0, "tyrePressure": [0.0, 0.0, 0.0, 0.0] },
                    "tyreStrategy": 0
                }],
                "fuelPerLap": 0.0
            }
        },
        "advancedSetup": {
            "mechanicalBalance": {
                "aRBFront": 0,
                "aRBRear": 0,
                "wheelRate": [0, 0, 0, 0],
                "bumpStopRateUp": [0, 0, 0, 0],
                "bumpStopWindow": [0, 0, 0, 0],
                "bumpStopRateDown": [0, 0, 0, 0],
                "ballastKg": 0,
                "ballastPos": 0
            },
            "dampers": {
                "bumpSlow": [0, 0, 0, 0],
                "bumpFast": [0, 0, 0, 0],
                "reboundSlow": [0, 0, 0, 0],
                "reboundFast": [0, 0, 0, 0]
            },
            "aeroBalance": {
                "rideHeight": [0, 0],
                "rodLength": [0, 0, 0, 0],
                "splitter": 0,
                "rearWing": 0,
                "brakeDuct": [0, 0]
            },
            "drivetrain": { "preload": 0 }
        },
        "trackBopType": 0
    })
}

/// Comma-separated tag input, trimmed, blanks dropped.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Tags and setup type as typed in the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupMeta {
    pub tags: String,
    pub setup_type: String,
}

impl Default for SetupMeta {
    fn default() -> Self {
        Self {
            tags: String::new(),
            setup_type: DEFAULT_SETUP_TYPE.to_string(),
        }
    }
}

impl SetupMeta {
    fn write_into(&self, block: &mut Map<String, Value>, now: DateTime<Utc>) {
        block.insert(
            "lastModified".into(),
            now.to_rfc3339_opts(SecondsFormat::Millis, true).into(),
        );
        block.insert("tags".into(), parse_tags(&self.tags).into());
        block.insert("setupType".into(), self.setup_type.clone().into());
    }
}

/// Content ready for `validate_setup` and the save call.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSetup {
    pub content: Value,
    pub file: SetupFile,
}

impl PreparedSetup {
    fn from_value(content: Value) -> Result<Self, DraftError> {
        let file = serde_json::from_value(content.clone()).map_err(DraftError::Incomplete)?;
        Ok(Self { content, file })
    }
}

fn parse_object(text: &str) -> Result<Map<String, Value>, DraftError> {
    match serde_json::from_str(text).map_err(DraftError::InvalidJson)? {
        Value::Object(map) => Ok(map),
        _ => Err(DraftError::NotAnObject),
    }
}

/// The new-setup form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupDraft {
    pub car: CarId,
    pub track: TrackId,
    pub filename: String,
    pub meta: SetupMeta,
    pub content: String,
}

impl SetupDraft {
    /// A form prefilled with the blank template for `car`.
    pub fn new(car: impl Into<CarId>, track: impl Into<TrackId>) -> Self {
        let car = car.into();
        let content = format!("{:#}", setup_template(&car));
        Self {
            car,
            track: track.into(),
            filename: String::new(),
            meta: SetupMeta::default(),
            content,
        }
    }

    /// Checks the form and stamps a fresh `ACCSMData` block, replacing any
    /// block pasted into the content.
    pub fn prepare(&self, now: DateTime<Utc>) -> Result<(SetupId, PreparedSetup), DraftError> {
        let car = self.car.trim();
        let track = self.track.trim();
        if car.is_empty() || track.is_empty() || self.filename.trim().is_empty() {
            return Err(DraftError::MissingFields);
        }
        let id = SetupId::new(car, track, SetupFilename::ensure_json(&self.filename));

        let mut content = parse_object(&self.content)?;
        let mut block = Map::new();
        self.meta.write_into(&mut block, now);
        content.insert(META_KEY.into(), Value::Object(block));

        Ok((id, PreparedSetup::from_value(Value::Object(content))?))
    }
}

/// Edit form of a viewed setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupEdit {
    pub meta: SetupMeta,
    pub content: String,
}

impl SetupEdit {
    pub fn from_setup(file: &SetupFile) -> Result<Self, serde_json::Error> {
        let meta = match &file.accsm_data {
            Some(data) => SetupMeta {
                tags: data.tags.join(", "),
                setup_type: data.setup_type.clone(),
            },
            None => SetupMeta::default(),
        };
        Ok(Self {
            meta,
            content: serde_json::to_string_pretty(file)?,
        })
    }

    /// Stamps the edited content. Keys of an existing `ACCSMData` block the
    /// form does not own are kept.
    pub fn prepare(&self, now: DateTime<Utc>) -> Result<PreparedSetup, DraftError> {
        let mut content = parse_object(&self.content)?;
        let block = content
            .entry(META_KEY)
            .or_insert_with(|| Value::Object(Map::new()));
        if !block.is_object() {
            *block = Value::Object(Map::new());
        }
        if let Value::Object(block) = block {
            self.meta.write_into(block, now);
        }
        PreparedSetup::from_value(Value::Object(content))
    }
}
