use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogbookError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Unrecognized date '{0}'. Use e.g. \"July 1, 2026\" or \"Date to be announced\"")]
    InvalidDate(String),

    #[error("Coordinates out of range: lat {lat}, lng {lng}")]
    InvalidCoordinates { lat: f64, lng: f64 },

    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),

    #[error("A session with id '{0}' already exists")]
    DuplicateId(String),

    #[error("Invalid Entry Code. Please consult the Logbook Records.")]
    InvalidCredential,

    #[error("The console is locked")]
    Locked,

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Submission error: {0}")]
    Submission(String),

    #[error("A request is already in flight")]
    Busy,

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LogbookError>;

impl From<LogbookError> for String {
    fn from(err: LogbookError) -> Self {
        err.to_string()
    }
}

impl From<serde_json::Error> for LogbookError {
    fn from(err: serde_json::Error) -> Self {
        LogbookError::Serialization(err.to_string())
    }
}

impl From<rusqlite::Error> for LogbookError {
    fn from(err: rusqlite::Error) -> Self {
        LogbookError::Storage(err.to_string())
    }
}
