pub const JSON_EXTENSION: &str = "json";

pub struct SetupFilename;

impl SetupFilename {
    /// Drop a trailing `.json`, case-insensitively.
    pub fn strip_json(name: &str) -> &str {
        let len = name.len();
        if len >= 5 && name.is_char_boundary(len - 5) && name[len - 5..].eq_ignore_ascii_case(".json")
        {
            &name[..len - 5]
        } else {
            name
        }
    }

    /// Trimmed name with a `.json` suffix appended when missing.
    pub fn ensure_json(name: &str) -> String {
        let trimmed = name.trim();
        if trimmed.ends_with(".json") {
            trimmed.to_string()
        } else {
            format!("{trimmed}.json")
        }
    }

    /// Name without its last extension, whatever it is.
    pub fn stem(name: &str) -> &str {
        match Self::split_extension(name) {
            Some((stem, _)) => stem,
            None => name,
        }
    }

    /// Last extension of the name, `json` when there is none.
    pub fn extension(name: &str) -> &str {
        match Self::split_extension(name) {
            Some((_, ext)) => ext,
            None => JSON_EXTENSION,
        }
    }

    fn split_extension(name: &str) -> Option<(&str, &str)> {
        let dot = name.rfind('.')?;
        let ext = &name[dot + 1..];
        if ext.is_empty() || ext.contains('/') {
            return None;
        }
        Some((&name[..dot], ext))
    }
}
