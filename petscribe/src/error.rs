//! Error types for Petscribe
//!
//! All errors use thiserror for structured error handling.
//! These errors can be serialized for display by a front end.

use crate::calendar::ParseTimeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The persisted collection could not be read or decoded
    #[error("Storage read error: {0}")]
    StorageRead(String),

    /// The persisted collection could not be written
    #[error("Storage write error: {0}")]
    StorageWrite(String),

    /// Missing or malformed user input, raised before any write
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Pet not found: {0}")]
    PetNotFound(String),

    #[error("Invalid time of day: {0}")]
    InvalidTime(#[from] ParseTimeError),

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error("{0}")]
    Generic(String),
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
