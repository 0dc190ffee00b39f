//! Where each kind of media lands in the storage bucket

use std::fmt;
use std::str::FromStr;

use folio_client::{MediaFile, UploadError};

/// Extension used when the file name has none
const DEFAULT_EXTENSION: &str = "bin";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Resume,
}

impl MediaKind {
    /// Destination path for `file`, stamped with `now_millis`.
    ///
    /// Resumes must be PDFs; anything else is rejected before upload.
    pub fn destination_path(&self, file: &MediaFile, now_millis: i64) -> Result<String, UploadError> {
        match self {
            MediaKind::Image => Ok(format!("images/{}.{}", now_millis, extension(file))),
            MediaKind::Video => Ok(format!("videos/{}.{}", now_millis, extension(file))),
            MediaKind::Resume => {
                if !file.name.to_ascii_lowercase().ends_with(".pdf") {
                    return Err(UploadError::InvalidFile(
                        "Only PDF files are allowed.".to_string(),
                    ));
                }
                Ok(format!("resume/resume_{}.pdf", now_millis))
            }
        }
    }
}

fn extension(file: &MediaFile) -> &str {
    file.extension().unwrap_or(DEFAULT_EXTENSION)
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Resume => "resume",
        })
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "image" => Ok(MediaKind::Image),
            "video" => Ok(MediaKind::Video),
            "resume" => Ok(MediaKind::Resume),
            other => Err(format!("unknown media kind '{}'", other)),
        }
    }
}
