//! Per-slot upload progress as the dashboard displays it
//!
//! A slot shows its percentage while the transfer runs and keeps showing
//! the final state for [`PROGRESS_HOLD`] after completion or failure.

use std::time::Duration;

use tokio::time::Instant;

/// How long a finished upload's progress stays on screen
pub const PROGRESS_HOLD: Duration = Duration::from_millis(1200);

const ERROR_PREFIX: &str = "Upload failed: ";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UploadProgress {
    percent: Option<u8>,
    finished_at: Option<Instant>,
    error: Option<String>,
}

impl UploadProgress {
    /// Reset the slot for a new transfer at 0%
    pub fn start(&mut self) {
        self.percent = Some(0);
        self.finished_at = None;
        self.error = None;
    }

    pub fn update(&mut self, percent: u8) {
        if self.finished_at.is_none() {
            self.percent = Some(percent.min(100));
        }
    }

    pub fn finish(&mut self, now: Instant) {
        self.finished_at = Some(now);
    }

    pub fn fail(&mut self, message: &str, now: Instant) {
        self.error = Some(format!("{}{}", ERROR_PREFIX, message));
        self.finished_at = Some(now);
    }

    /// Refuse a file before any transfer starts. The message is shown as-is.
    pub fn reject(&mut self, message: &str) {
        self.percent = None;
        self.finished_at = None;
        self.error = Some(message.to_string());
    }

    /// Percentage to display, `None` once the hold has elapsed
    pub fn percent_at(&self, now: Instant) -> Option<u8> {
        match self.finished_at {
            Some(done) if now.duration_since(done) >= PROGRESS_HOLD => None,
            _ => self.percent,
        }
    }

    /// Inline error of the last transfer; stays until the next start
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.percent.is_some() && self.finished_at.is_none()
    }
}
