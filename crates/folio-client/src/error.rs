//! Error types for the Folio client

/// Errors raised by [`DataGateway`](crate::gateway::DataGateway) implementations
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Request failed with status {status}: {body}")]
    Request { status: u16, body: String },

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Errors raised by the media upload pipeline.
///
/// Nothing here is retried; the caller surfaces the error and the user
/// re-triggers the upload.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The upload-URL endpoint answered with a non-success status
    #[error("Upload request rejected with status {status}: {body}")]
    UploadRequest { status: u16, body: String },

    /// The upload-URL endpoint answered 2xx but reported an error in its payload
    #[error("Signed URL error: {0}")]
    SignedUrl(String),

    /// The PUT to the signed URL failed or returned a non-2xx status
    #[error("Upload transfer failed: {0}")]
    UploadTransfer(String),

    #[error("Invalid file: {0}")]
    InvalidFile(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
