//! Error types for the admin controller

use folio_client::{GatewayError, UploadError};

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// Another save or delete is still in flight
    #[error("A save is already in progress")]
    SaveInProgress,

    /// A content save stopped at `key`. Keys in `written` were stored
    /// before the failure and stay stored.
    #[error("Failed to save '{key}' after writing {} field(s): {source}", written.len())]
    SaveFailure {
        key: String,
        written: Vec<String>,
        #[source]
        source: GatewayError,
    },

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Upload failed: {0}")]
    Upload(#[from] UploadError),
}

pub type Result<T> = std::result::Result<T, ControllerError>;
