use thiserror::Error;

/// Domain error for board operations.
///
/// `Validation` is surfaced to the caller synchronously and always leaves the
/// board unchanged. `Persistence` covers remote read/write failures: reads
/// surface it, writes only log it. `Configuration` marks an unusable
/// environment; the load path prefers the demo-board fallback over raising it.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("{0}")]
    Validation(String),

    #[error("remote store not configured: {0}")]
    Configuration(String),

    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl BoardError {
    pub fn validation(message: impl Into<String>) -> Self {
        BoardError::Validation(message.into())
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        BoardError::Persistence(message.into())
    }
}

impl From<rusqlite::Error> for BoardError {
    fn from(err: rusqlite::Error) -> Self {
        BoardError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for BoardError {
    fn from(err: serde_json::Error) -> Self {
        BoardError::Persistence(err.to_string())
    }
}

impl From<std::io::Error> for BoardError {
    fn from(err: std::io::Error) -> Self {
        BoardError::Persistence(err.to_string())
    }
}
