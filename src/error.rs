//! Error types shared by the orchestrator, the storage gateway and the
//! configuration layer.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Home or preferences location cannot be resolved.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A profile could not produce a usable storage client.
    #[error("Credential error: {0}")]
    Credential(String),

    /// A list/get/head call against the backend failed.
    #[error("Backend error: {0}")]
    Backend(String),

    /// The backend answered without size or modification time.
    #[error("Invalid object metadata: {0}")]
    InvalidMetadata(String),

    /// Object content cannot be shown as text.
    #[error("Preview unavailable: {0}")]
    Preview(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
