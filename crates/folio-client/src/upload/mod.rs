//! Media Upload Pipeline
//!
//! `upload(file, path, on_progress) -> public URL` in three steps:
//!
//! 1. pick a credential: the session's access token, else the anonymous key;
//! 2. ask the upload function for a signed URL and the eventual public URL;
//! 3. PUT the raw bytes to the signed URL, reporting whole-number progress.
//!
//! Nothing is retried and nothing is resumed: a failed transfer starts over
//! from byte zero when the user triggers it again. The pipeline does not
//! touch any cached content; storing the returned URL is the caller's job.

pub mod media;
pub mod transport;

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::constants::{UPLOAD_ACTION_GET_URL, api_path};
use crate::error::UploadError;
use crate::gateway::DataGateway;

pub use media::MediaFile;
pub use transport::{ReqwestTransport, TransportResponse, UploadTransport};

/// Payload of the upload-URL endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadTarget {
    #[serde(default)]
    signed_url: Option<String>,
    #[serde(default)]
    public_url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Convert byte progress to a whole percentage.
///
/// `None` when the total is unknown or zero. The result is clamped to
/// `0..=100` even if a transport over-reports.
pub fn percent_complete(sent: u64, total: Option<u64>) -> Option<u8> {
    let total = total.filter(|t| *t > 0)?;
    let pct = (sent as f64 / total as f64 * 100.0).round();
    Some(pct.clamp(0.0, 100.0) as u8)
}

/// Forwards percentages to the caller, never going backwards and never
/// repeating a value.
struct ProgressReporter<F> {
    last: Option<u8>,
    on_progress: F,
}

impl<F: FnMut(u8)> ProgressReporter<F> {
    fn new(on_progress: F) -> Self {
        Self {
            last: None,
            on_progress,
        }
    }

    fn report(&mut self, sent: u64, total: Option<u64>) {
        let Some(pct) = percent_complete(sent, total) else {
            return;
        };
        if self.last.is_some_and(|last| pct <= last) {
            return;
        }
        self.last = Some(pct);
        (self.on_progress)(pct);
    }
}

/// Uploads media through the backend's signed-URL function
pub struct MediaUploader {
    gateway: Arc<dyn DataGateway>,
    transport: Arc<dyn UploadTransport>,
    base_url: String,
    anon_key: String,
}

impl MediaUploader {
    /// Create an uploader that talks HTTP through `reqwest`
    pub fn new(config: &ClientConfig, gateway: Arc<dyn DataGateway>) -> anyhow::Result<Self> {
        let transport = ReqwestTransport::new(config.connect_timeout_ms)?;
        Ok(Self::with_transport(config, gateway, Arc::new(transport)))
    }

    pub fn with_transport(
        config: &ClientConfig,
        gateway: Arc<dyn DataGateway>,
        transport: Arc<dyn UploadTransport>,
    ) -> Self {
        Self {
            gateway,
            transport,
            base_url: config.base_url.clone(),
            anon_key: config.anon_key.clone(),
        }
    }

    /// Full URL of the upload-URL endpoint for a destination path
    pub fn upload_url_endpoint(&self, path: &str) -> String {
        let query = serde_urlencoded::to_string([("action", UPLOAD_ACTION_GET_URL), ("path", path)])
            .unwrap_or_default();
        format!("{}{}?{}", self.base_url, api_path::UPLOAD_FUNCTION, query)
    }

    /// Upload `file` to `path` and return its public URL.
    ///
    /// `on_progress` receives non-decreasing percentages in `0..=100`, only
    /// while the transport knows the total size.
    pub async fn upload<F>(
        &self,
        file: &MediaFile,
        path: &str,
        on_progress: F,
    ) -> Result<String, UploadError>
    where
        F: FnMut(u8) + Send,
    {
        let token = self
            .gateway
            .access_token()
            .await
            .unwrap_or_else(|| self.anon_key.clone());

        let endpoint = self.upload_url_endpoint(path);
        let response = self
            .transport
            .request_upload_url(&endpoint, &token)
            .await
            .map_err(|e| UploadError::UploadRequest {
                status: 0,
                body: e.to_string(),
            })?;

        if !response.is_success() {
            warn!("Upload URL request for {} failed with {}", path, response.status);
            return Err(UploadError::UploadRequest {
                status: response.status,
                body: response.body,
            });
        }

        let target: UploadTarget = serde_json::from_str(&response.body)
            .map_err(|e| UploadError::SignedUrl(format!("invalid response: {}", e)))?;
        if let Some(error) = target.error {
            return Err(UploadError::SignedUrl(error));
        }
        let (Some(signed_url), Some(public_url)) = (target.signed_url, target.public_url) else {
            return Err(UploadError::SignedUrl(
                "response is missing signedUrl or publicUrl".to_string(),
            ));
        };

        let mut reporter = ProgressReporter::new(on_progress);
        let mut sink = |sent: u64, total: Option<u64>| reporter.report(sent, total);
        let response = self
            .transport
            .put_file(&signed_url, file.content_type(), file.bytes.clone(), &mut sink)
            .await
            .map_err(|e| UploadError::UploadTransfer(format!("Network error during upload: {}", e)))?;

        if !response.is_success() {
            return Err(UploadError::UploadTransfer(format!(
                "status {}: {}",
                response.status, response.body
            )));
        }

        info!("Uploaded {} ({} bytes) to {}", file.name, file.len(), path);
        Ok(public_url)
    }
}
