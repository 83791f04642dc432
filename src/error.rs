//! Error types for scs-models

use thiserror::Error;

/// Main error type for model and prefab descriptor operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{format} version {version:#x} is not supported")]
    UnsupportedVersion { format: &'static str, version: u32 },

    #[error("Wrong file format: {0}")]
    WrongFormat(String),

    #[error("Malformed data: {0}")]
    MalformedData(String),

    #[error("List can hold at most {capacity} elements")]
    CapacityExceeded { capacity: usize },

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// Result type alias for scs-models operations
pub type Result<T> = std::result::Result<T, Error>;
