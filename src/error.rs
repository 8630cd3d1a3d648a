//! Error types for ytsum.

use rusqlite::ErrorCode;
use thiserror::Error;

/// Library-level error type for ytsum operations.
#[derive(Error, Debug)]
pub enum YtsumError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Video not found: {0}")]
    VideoNotFound(String),

    #[error("Duplicate {entity} for key '{key}'")]
    DuplicateKey { entity: &'static str, key: String },

    #[error("Cannot store {entity}: video '{video_id}' does not exist")]
    ForeignKeyViolation {
        entity: &'static str,
        video_id: String,
    },

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Database error: {0}")]
    Database(rusqlite::Error),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl YtsumError {
    /// Classify an error raised by an insert of `entity` keyed by `key`.
    ///
    /// Primary key and unique violations become [`YtsumError::DuplicateKey`],
    /// foreign key violations become [`YtsumError::ForeignKeyViolation`]
    /// (with `key` reported as the referenced video id).
    pub fn from_insert(err: rusqlite::Error, entity: &'static str, key: &str) -> Self {
        if let rusqlite::Error::SqliteFailure(ref failure, _) = err {
            if failure.code == ErrorCode::ConstraintViolation {
                match failure.extended_code {
                    rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                    | rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE => {
                        return YtsumError::DuplicateKey {
                            entity,
                            key: key.to_string(),
                        };
                    }
                    rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                        return YtsumError::ForeignKeyViolation {
                            entity,
                            video_id: key.to_string(),
                        };
                    }
                    _ => {}
                }
            }
        }
        err.into()
    }

    /// Whether this error reports a uniqueness conflict.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, YtsumError::DuplicateKey { .. })
    }
}

impl From<rusqlite::Error> for YtsumError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref failure, _)
                if matches!(
                    failure.code,
                    ErrorCode::CannotOpen
                        | ErrorCode::DatabaseBusy
                        | ErrorCode::DatabaseLocked
                        | ErrorCode::SystemIoFailure
                        | ErrorCode::NotADatabase
                ) =>
            {
                YtsumError::StorageUnavailable(err.to_string())
            }
            other => YtsumError::Database(other),
        }
    }
}

/// Result type alias for ytsum operations.
pub type Result<T> = std::result::Result<T, YtsumError>;
