//! Files handed to the upload pipeline

use std::path::Path;

use bytes::Bytes;

use crate::constants::FALLBACK_CONTENT_TYPE;
use crate::error::UploadError;

/// A file to upload: its name, declared MIME type and raw bytes
#[derive(Clone, Debug)]
pub struct MediaFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl MediaFile {
    /// Wrap in-memory bytes. The MIME type is inferred from the file name.
    pub fn new(name: &str, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.to_string(),
            content_type: guess_content_type(name).map(str::to_string),
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    /// Read a file from disk
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, UploadError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| UploadError::InvalidFile(format!("no file name in {}", path.display())))?;
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::new(name, bytes))
    }

    /// Extension after the last dot, if the name has one
    pub fn extension(&self) -> Option<&str> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }

    /// Declared MIME type, or a generic binary type
    pub fn content_type(&self) -> &str {
        self.content_type
            .as_deref()
            .filter(|ct| !ct.is_empty())
            .unwrap_or(FALLBACK_CONTENT_TYPE)
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn guess_content_type(name: &str) -> Option<&'static str> {
    let ext = name.rsplit_once('.')?.1.to_ascii_lowercase();
    let content_type = match ext.as_str() {
        // Images
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",

        // Video
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",

        // Documents
        "pdf" => "application/pdf",

        _ => return None,
    };
    Some(content_type)
}
