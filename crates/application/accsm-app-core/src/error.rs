#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The backend rejected the call; the text is shown to the user as-is.
    #[error("{0}")]
    Backend(String),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("malformed backend payload: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenameError {
    #[error("setup name cannot be empty")]
    Empty,
    #[error("setup name is unchanged")]
    Unchanged,
}

/// A setup form that cannot be sent to the backend as typed.
#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    #[error("Please fill in all required fields")]
    MissingFields,
    #[error("Invalid JSON format")]
    InvalidJson(#[source] serde_json::Error),
    #[error("setup content must be a JSON object")]
    NotAnObject,
    #[error("setup is incomplete: {0}")]
    Incomplete(#[source] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("Path cannot be empty")]
    Empty,
    #[error("Path is too short")]
    TooShort,
    #[error("Path contains invalid characters")]
    InvalidCharacters,
}
