//! HTTP exchanges used by the upload pipeline
//!
//! The pipeline only needs two calls: a POST that mints the signed URL and
//! a PUT that streams the file. Keeping them behind [`UploadTransport`]
//! lets the pipeline run against scripted transports in tests.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client};
use tokio::sync::mpsc;
use tracing::debug;

/// Size of the pieces the PUT body is streamed in
pub const UPLOAD_CHUNK_SIZE: usize = 256 * 1024;

/// Status and body of a finished exchange
#[derive(Clone, Debug, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Byte-level progress sink: `(bytes_sent, total_bytes)`. `total_bytes` is
/// `None` when the transport cannot tell.
pub type ByteProgress<'a> = &'a mut (dyn FnMut(u64, Option<u64>) + Send);

#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// POST to the upload-URL endpoint with a bearer token
    async fn request_upload_url(&self, url: &str, token: &str)
    -> anyhow::Result<TransportResponse>;

    /// PUT the body to the signed URL, reporting byte progress as it goes
    async fn put_file(
        &self,
        url: &str,
        content_type: &str,
        body: Bytes,
        progress: ByteProgress<'_>,
    ) -> anyhow::Result<TransportResponse>;
}

/// [`UploadTransport`] over `reqwest`.
///
/// Only a connect timeout is set: a slow transfer is never cut short by
/// the client.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(connect_timeout_ms: u64) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(connect_timeout_ms))
            .build()?;
        Ok(Self { client })
    }
}

fn chunks(body: &Bytes) -> Vec<Bytes> {
    (0..body.len())
        .step_by(UPLOAD_CHUNK_SIZE)
        .map(|start| body.slice(start..(start + UPLOAD_CHUNK_SIZE).min(body.len())))
        .collect()
}

#[async_trait]
impl UploadTransport for ReqwestTransport {
    async fn request_upload_url(
        &self,
        url: &str,
        token: &str,
    ) -> anyhow::Result<TransportResponse> {
        debug!("POST {}", url);
        let response = self.client.post(url).bearer_auth(token).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Ok(TransportResponse { status, body })
    }

    async fn put_file(
        &self,
        url: &str,
        content_type: &str,
        body: Bytes,
        progress: ByteProgress<'_>,
    ) -> anyhow::Result<TransportResponse> {
        let total = body.len() as u64;
        debug!("PUT {} ({} bytes)", url, total);

        // The body stream runs inside hyper, so sent counts come back over a channel
        let (tx, mut rx) = mpsc::unbounded_channel::<u64>();
        let mut sent = 0u64;
        let stream = futures::stream::iter(chunks(&body).into_iter().map(move |chunk| {
            sent += chunk.len() as u64;
            let _ = tx.send(sent);
            Ok::<Bytes, std::io::Error>(chunk)
        }));

        progress(0, Some(total));

        let request = self
            .client
            .put(url)
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_LENGTH, total)
            .body(Body::wrap_stream(stream))
            .send();
        tokio::pin!(request);

        let result = loop {
            tokio::select! {
                Some(sent) = rx.recv() => progress(sent, Some(total)),
                result = &mut request => break result,
            }
        };
        while let Ok(sent) = rx.try_recv() {
            progress(sent, Some(total));
        }

        let response = result?;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Ok(TransportResponse { status, body })
    }
}
