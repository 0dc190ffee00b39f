//! Transient status line shown after a save or delete

use std::time::Duration;

use tokio::time::Instant;

/// How long a status message stays visible
pub const STATUS_DISPLAY: Duration = Duration::from_secs(2);

pub const SAVED: &str = "Saved!";
pub const DELETED: &str = "Deleted!";

#[derive(Clone, Debug, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub shown_at: Instant,
}

impl StatusMessage {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            shown_at: Instant::now(),
        }
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at) < STATUS_DISPLAY
    }

    /// The text while visible, `""` afterwards
    pub fn text_at(&self, now: Instant) -> &str {
        if self.is_visible(now) { self.text.as_str() } else { "" }
    }
}
