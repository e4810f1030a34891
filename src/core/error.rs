use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum BenchError {
    #[error("Cannot parse config: {0}")]
    ConfigParsingError(String),
    #[error("Invalid operation '{0}', expected one of: {1}")]
    InvalidOperation(String, String),
    #[error("Unknown backend '{0}'")]
    UnknownBackend(String),
    #[error("Backend '{0}' is listed more than once")]
    DuplicateBackend(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Backend error: {0}")]
    BackendError(String),
}

impl From<std::io::Error> for BenchError {
    fn from(err: std::io::Error) -> Self {
        BenchError::IoError(err.to_string())
    }
}

impl From<rusqlite::Error> for BenchError {
    fn from(err: rusqlite::Error) -> Self {
        BenchError::DatabaseError(err.to_string())
    }
}
