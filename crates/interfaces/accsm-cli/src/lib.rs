pub mod commands;

use accsm_core::{SetupKind, SimplifyResult};
use serde::Serialize;

/// One row of `classify --json`.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifyReport {
    pub filename: String,
    pub kind: Option<SetupKind>,
    pub confidence: Option<f32>,
    pub suggested_name: String,
}

impl From<SimplifyResult> for ClassifyReport {
    fn from(r: SimplifyResult) -> Self {
        Self {
            filename: r.original_filename,
            kind: r.matched.map(|m| m.kind),
            confidence: r.matched.map(|m| m.confidence),
            suggested_name: r.suggested_name,
        }
    }
}

/// Output of `track --json`.
#[derive(Debug, Clone, Serialize)]
pub struct TrackReport {
    pub files: Vec<TrackHit>,
    pub common_track: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackHit {
    pub filename: String,
    pub track: Option<&'static str>,
}
