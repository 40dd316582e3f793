use crate::{ClassifyReport, TrackHit, TrackReport};
use accsm_core::classify::{has_qualy_and_race, simplified_names};
use accsm_core::track_match::TRACK_PATTERNS;
use accsm_core::{classify, find_common_track, find_track};
use anyhow::{Context, Result};
use std::io::Write;

pub fn cmd_classify(filenames: &[String], json: bool, out: &mut impl Write) -> Result<()> {
    let reports: Vec<ClassifyReport> = filenames
        .iter()
        .map(|f| ClassifyReport::from(classify(f)))
        .collect();

    if json {
        let text = serde_json::to_string_pretty(&reports)?;
        writeln!(out, "{text}")?;
        return Ok(());
    }

    for r in &reports {
        tracing::debug!(filename = %r.filename, kind = ?r.kind, "classified");
        match (r.kind, r.confidence) {
            (Some(kind), Some(confidence)) => writeln!(
                out,
                "{}: {} ({confidence:.1}) -> {}.json",
                r.filename,
                kind.label(),
                r.suggested_name
            )?,
            _ => writeln!(out, "{}: unknown", r.filename)?,
        }
    }
    Ok(())
}

pub fn track_report(filenames: &[String]) -> TrackReport {
    TrackReport {
        files: filenames
            .iter()
            .map(|f| TrackHit {
                filename: f.clone(),
                track: find_track(f),
            })
            .collect(),
        common_track: find_common_track(filenames),
    }
}

pub fn cmd_track(filenames: &[String], json: bool, out: &mut impl Write) -> Result<()> {
    let report = track_report(filenames);

    if json {
        let text = serde_json::to_string_pretty(&report)?;
        writeln!(out, "{text}")?;
        return Ok(());
    }

    for hit in &report.files {
        writeln!(out, "{}: {}", hit.filename, hit.track.unwrap_or("-"))?;
    }
    writeln!(out, "common: {}", report.common_track.unwrap_or("none"))?;
    Ok(())
}

pub fn cmd_simplify(filenames: &[String], prefix: Option<&str>, out: &mut impl Write) -> Result<()> {
    let simplified = simplified_names(filenames, prefix);
    for (ix, name) in filenames.iter().enumerate() {
        match simplified.get(&ix) {
            Some(new_name) => writeln!(out, "{name} -> {new_name}")?,
            None => writeln!(out, "{name} (unchanged)")?,
        }
    }
    if filenames.len() >= 2 && !has_qualy_and_race(filenames) {
        writeln!(out, ":: batch has no qualifying/race pair")
            .context("Failed to write summary")?;
    }
    Ok(())
}

pub fn cmd_patterns(out: &mut impl Write) -> Result<()> {
    for (track, patterns) in TRACK_PATTERNS {
        writeln!(out, "{track:<16} {}", patterns.join(", "))?;
    }
    Ok(())
}
