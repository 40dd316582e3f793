//! Filename heuristics that guess what a setup is for.
//!
//! Confidence values only order competing matches; they are not probabilities.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::filename::SetupFilename;

const QUALIFY_2_FULL: &[&str] = &["QUALI2", "QUALY2", "QUALIFYING2", "Q2", "QUALIFY2"];
const QUALIFY_FULL: &[&str] = &["QUALI", "QUALY", "QUALIFY", "QUALIFYING", "QUAL"];
const QUALIFY_SHORT: &[&str] = &["Q"];
const RACE_FULL: &[&str] = &["RACE", "RACING", "RAC"];
const RACE_SHORT: &[&str] = &["R", "RS"];
const WET_FULL: &[&str] = &["WET"];
const WET_SHORT: &[&str] = &["W"];

const FULL_CONFIDENCE: f32 = 0.9;
const SHORT_CONFIDENCE: f32 = 0.7;
const WET_FULL_CONFIDENCE: f32 = 0.8;
const WET_SHORT_CONFIDENCE: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SetupKind {
    Race,
    Qualify,
    #[serde(rename = "qualify-2")]
    Qualify2,
    Wet,
}

impl SetupKind {
    /// Short label used for simplified filenames.
    pub fn label(self) -> &'static str {
        match self {
            SetupKind::Race => "race",
            SetupKind::Qualify => "quali",
            SetupKind::Qualify2 => "quali 2",
            SetupKind::Wet => "wet",
        }
    }

    pub fn is_qualifying(self) -> bool {
        matches!(self, SetupKind::Qualify | SetupKind::Qualify2)
    }

    /// `<label>.json`, or `(<prefix>) <label>.json` when a non-empty prefix is given.
    pub fn simplified_filename(self, prefix: Option<&str>) -> String {
        match prefix.map(str::trim).filter(|p| !p.is_empty()) {
            Some(p) => format!("({p}) {}.json", self.label()),
            None => format!("{}.json", self.label()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SetupMatch {
    pub kind: SetupKind,
    pub confidence: f32,
}

impl SetupMatch {
    fn new(kind: SetupKind, confidence: f32) -> Self {
        Self { kind, confidence }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplifyResult {
    pub original_filename: String,
    pub matched: Option<SetupMatch>,
    pub suggested_name: String,
}

struct Normalized {
    full: String,
    tokens: Vec<String>,
}

fn normalize(filename: &str) -> Normalized {
    let full = SetupFilename::strip_json(filename).to_uppercase();
    let tokens = full
        .split(|c: char| c == '_' || c == '-' || c == '.' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    Normalized { full, tokens }
}

fn contains_any(full: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| full.contains(p))
}

fn has_token(tokens: &[String], patterns: &[&str]) -> bool {
    tokens.iter().any(|t| patterns.contains(&t.as_str()))
}

fn match_qualify(n: &Normalized) -> Option<SetupMatch> {
    // Q2 first: every Q2 pattern also contains a plain qualifying pattern.
    if contains_any(&n.full, QUALIFY_2_FULL) {
        return Some(SetupMatch::new(SetupKind::Qualify2, FULL_CONFIDENCE));
    }
    if contains_any(&n.full, QUALIFY_FULL) {
        return Some(SetupMatch::new(SetupKind::Qualify, FULL_CONFIDENCE));
    }
    if has_token(&n.tokens, QUALIFY_SHORT) {
        return Some(SetupMatch::new(SetupKind::Qualify, SHORT_CONFIDENCE));
    }
    None
}

fn match_race(n: &Normalized) -> Option<SetupMatch> {
    if contains_any(&n.full, RACE_FULL) {
        return Some(SetupMatch::new(SetupKind::Race, FULL_CONFIDENCE));
    }
    if has_token(&n.tokens, RACE_SHORT) {
        return Some(SetupMatch::new(SetupKind::Race, SHORT_CONFIDENCE));
    }
    None
}

fn match_wet(n: &Normalized) -> Option<SetupMatch> {
    if contains_any(&n.full, WET_FULL) {
        return Some(SetupMatch::new(SetupKind::Wet, WET_FULL_CONFIDENCE));
    }
    if has_token(&n.tokens, WET_SHORT) {
        return Some(SetupMatch::new(SetupKind::Wet, WET_SHORT_CONFIDENCE));
    }
    None
}

/// Guess the setup kind of `filename`.
///
/// Each detector runs independently; the highest confidence wins and ties keep
/// the earlier detector (qualify, then race, then wet).
pub fn classify(filename: &str) -> SimplifyResult {
    let normalized = normalize(filename);

    let best = [
        match_qualify(&normalized),
        match_race(&normalized),
        match_wet(&normalized),
    ]
    .into_iter()
    .flatten()
    .fold(None::<SetupMatch>, |best, current| match best {
        Some(b) if current.confidence <= b.confidence => Some(b),
        _ => Some(current),
    });

    let suggested_name = match best {
        Some(m) => m.kind.label().to_string(),
        None => SetupFilename::strip_json(filename).to_string(),
    };

    SimplifyResult {
        original_filename: filename.to_string(),
        matched: best,
        suggested_name,
    }
}

pub fn classify_kind(filename: &str) -> Option<SetupKind> {
    classify(filename).matched.map(|m| m.kind)
}

/// True when the batch holds at least one qualifying and at least one race setup.
pub fn has_qualy_and_race<S: AsRef<str>>(filenames: &[S]) -> bool {
    let kinds: Vec<SetupKind> = filenames
        .iter()
        .filter_map(|f| classify_kind(f.as_ref()))
        .collect();
    kinds.iter().any(|k| k.is_qualifying()) && kinds.contains(&SetupKind::Race)
}

/// Simplified filenames by batch index; unclassified entries are left out.
pub fn simplified_names<S: AsRef<str>>(
    filenames: &[S],
    prefix: Option<&str>,
) -> BTreeMap<usize, String> {
    filenames
        .iter()
        .enumerate()
        .filter_map(|(ix, f)| {
            classify_kind(f.as_ref()).map(|kind| (ix, kind.simplified_filename(prefix)))
        })
        .collect()
}
