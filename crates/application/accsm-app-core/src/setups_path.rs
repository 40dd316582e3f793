use crate::error::PathError;

const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

/// Trimmed setups folder path, or why it cannot be used.
///
/// A leading Windows drive (`C:`) is the only place a colon is accepted.
pub fn check_setups_path(input: &str) -> Result<&str, PathError> {
    let path = input.trim();
    if path.is_empty() {
        return Err(PathError::Empty);
    }
    if path.chars().count() < 3 {
        return Err(PathError::TooShort);
    }

    let bytes = path.as_bytes();
    let rest = if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        &path[2..]
    } else {
        path
    };
    if rest.contains(INVALID_CHARS) {
        return Err(PathError::InvalidCharacters);
    }
    Ok(path)
}
