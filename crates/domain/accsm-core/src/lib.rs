use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub mod classify;
pub mod filename;
pub mod track_match;

pub use classify::{classify, SetupKind, SetupMatch, SimplifyResult};
pub use track_match::{find_common_track, find_track};

pub type CarId = String;
pub type TrackId = String;

/// Reference dictionaries as returned by the backend, keyed by folder id.
pub type Cars = HashMap<CarId, Car>;
pub type Tracks = HashMap<TrackId, Track>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Car {
    pub id: CarId,
    pub pretty_name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub brand_name: String,
    #[serde(default)]
    pub brand_country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Track {
    pub id: TrackId,
    pub pretty_name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub country: String,
}

/// Application metadata block stored inside every managed setup file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccsmData {
    pub last_modified: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub setup_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SetupFile {
    pub car_name: String,
    pub basic_setup: serde_json::Value,
    pub advanced_setup: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_bop_type: Option<i32>,
    #[serde(rename = "ACCSMData", default, skip_serializing_if = "Option::is_none")]
    pub accsm_data: Option<AccsmData>,
    #[serde(flatten)]
    pub other_fields: HashMap<String, serde_json::Value>,
}

/// Identity of a setup: the (car, track, filename) triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SetupId {
    pub car: CarId,
    pub track: TrackId,
    pub filename: String,
}

impl SetupId {
    pub fn new(
        car: impl Into<CarId>,
        track: impl Into<TrackId>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            car: car.into(),
            track: track.into(),
            filename: filename.into(),
        }
    }

    pub fn with_filename(&self, filename: impl Into<String>) -> Self {
        Self {
            car: self.car.clone(),
            track: self.track.clone(),
            filename: filename.into(),
        }
    }
}

impl fmt::Display for SetupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.car, self.track, self.filename)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SetupInfo {
    pub filename: String,
    pub display_name: String,
    pub last_modified: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub setup_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackFolder {
    pub track_id: TrackId,
    pub track_name: String,
    pub setups: Vec<SetupInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CarFolder {
    pub car_id: CarId,
    pub car_name: String,
    pub tracks: Vec<TrackFolder>,
}

/// Snapshot of the whole car -> track -> setup tree as last scanned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FolderStructure {
    pub cars: Vec<CarFolder>,
    pub total_setups: usize,
    pub last_scan: DateTime<Utc>,
}

impl FolderStructure {
    pub fn car(&self, car_id: &str) -> Option<&CarFolder> {
        self.cars.iter().find(|c| c.car_id == car_id)
    }

    pub fn track_folder(&self, car_id: &str, track_id: &str) -> Option<&TrackFolder> {
        self.car(car_id)?
            .tracks
            .iter()
            .find(|t| t.track_id == track_id)
    }

    pub fn find_setup(&self, id: &SetupId) -> Option<&SetupInfo> {
        self.track_folder(&id.car, &id.track)?
            .setups
            .iter()
            .find(|s| s.filename == id.filename)
    }

    pub fn contains_setup(&self, id: &SetupId) -> bool {
        self.find_setup(id).is_some()
    }

    /// Track ids present anywhere in the tree, in first-seen order.
    pub fn unique_track_ids(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for track in self.cars.iter().flat_map(|c| c.tracks.iter()) {
            if !out.contains(&track.track_id.as_str()) {
                out.push(track.track_id.as_str());
            }
        }
        out
    }

    pub fn setup_count_for_track(&self, track_id: &str) -> usize {
        self.cars
            .iter()
            .flat_map(|c| c.tracks.iter())
            .filter(|t| t.track_id == track_id)
            .map(|t| t.setups.len())
            .sum()
    }

    pub fn car_count_for_track(&self, track_id: &str) -> usize {
        self.cars
            .iter()
            .filter(|c| c.tracks.iter().any(|t| t.track_id == track_id))
            .count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportResult {
    pub path: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car: Option<CarId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<TrackId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationResult {
    pub path: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_content: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car: Option<CarId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

/// One accepted item of a validated import batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SetupImportData {
    pub json_content: serde_json::Value,
    pub car: CarId,
    pub track: TrackId,
    pub filename: String,
    pub apply_lfm: bool,
}
