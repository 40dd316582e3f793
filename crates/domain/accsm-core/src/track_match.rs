//! Track inference from setup filenames.
//!
//! Patterns are uppercase substrings. Entries are checked in table order and the
//! first hit wins, so a name carrying abbreviations of two tracks resolves to the
//! one listed first.

use crate::filename::SetupFilename;

/// `(track id, patterns)` in match order. Ids are backend track folder names.
pub const TRACK_PATTERNS: &[(&str, &[&str])] = &[
    ("Barcelona", &["BARCELONA", "CATALUNYA", "BCN"]),
    ("brands_hatch", &["BRANDS HATCH", "BRANDS"]),
    ("cota", &["COTA", "AMERICA"]),
    ("donington", &["DONINGTON", "DON"]),
    ("Hungaroring", &["HUNGARORING", "BUDAPEST"]),
    ("Imola", &["IMOLA", "IMO"]),
    ("indianapolis", &["INDIANAPOLIS", "INDY"]),
    ("Kyalami", &["KYALAMI", "KYA"]),
    ("Laguna_Seca", &["LAGUNA SECA", "LAGUNA", "LAG"]),
    ("misano", &["MISANO", "MIS"]),
    ("monza", &["MONZA", "MNZ", "MON"]),
    ("mount_panorama", &["MOUNT PANORAMA", "BATHURST"]),
    ("nurburgring", &["NURBURGRING", "NURB", "NUR"]),
    (
        "nurburgring_24h",
        &["NURBURGRING 24H", "NURB 24H", "N24H", "NORDSCHLEIFE"],
    ),
    ("oulton_park", &["OULTON PARK", "OULTON"]),
    ("Paul_Ricard", &["PAUL RICARD", "RICARD", "PAUL"]),
    ("Silverstone", &["SILVERSTONE", "SILV", "SIL"]),
    ("snetterton", &["SNETTERTON", "SNET"]),
    ("Spa", &["SPA", "FRANCORCHAMPS"]),
    ("Suzuka", &["SUZUKA", "SUZ"]),
    ("Valencia", &["VALENCIA", "RICARDO TORMO", "VAL"]),
    ("watkins_glen", &["WATKINS GLEN", "WATKINS", "WGI"]),
    ("Zandvoort", &["ZANDVOORT", "ZAN"]),
    ("Zolder", &["ZOLDER", "ZOL"]),
    ("red_bull_ring", &["RED BULL RING", "RBR", "SPIELBERG", "AUSTRIA"]),
];

pub fn find_track(filename: &str) -> Option<&'static str> {
    let normalized = SetupFilename::strip_json(filename).to_uppercase();
    TRACK_PATTERNS
        .iter()
        .find(|(_, patterns)| patterns.iter().any(|p| normalized.contains(p)))
        .map(|(track_id, _)| *track_id)
}

/// The track every filename resolves to, if they all resolve to the same one.
pub fn find_common_track<S: AsRef<str>>(filenames: &[S]) -> Option<&'static str> {
    let (first, rest) = filenames.split_first()?;
    let candidate = find_track(first.as_ref())?;
    rest.iter()
        .all(|f| find_track(f.as_ref()) == Some(candidate))
        .then_some(candidate)
}
