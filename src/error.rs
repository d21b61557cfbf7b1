use thiserror::Error;

/// Errors surfaced by the board's library API.
///
/// Per-repository lookup failures are not errors in this sense; they are
/// reported as [`crate::lookup::LookupFailure`] outcomes and healed by the
/// orchestrator.
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed repository string '{0}': expected \"owner/name\"")]
    MalformedRepositoryString(String),

    #[error("malformed element key '{0}'")]
    MalformedKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
