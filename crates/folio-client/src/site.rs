//! Site Data Aggregator: the public read path
//!
//! Fetches every content entry and every project once, concurrently, and
//! hands them back as a flat lookup plus an ordered list. There is no
//! polling and no invalidation; call [`SiteDataAggregator::load`] again to
//! refresh.

use std::sync::Arc;

use tracing::warn;

use crate::gateway::DataGateway;
use crate::model::{ContentMap, Project, content_map, sort_by_display_order, text_or};

/// Outcome of one fetch: the data, or why it could not be read.
///
/// Keeps "the store is empty" apart from "the store could not be reached".
#[derive(Clone, Debug, PartialEq)]
pub enum Fetch<T> {
    Ready(T),
    Failed { reason: String },
}

impl<T> Fetch<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Fetch::Ready(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Fetch::Ready(value) => Some(value),
            Fetch::Failed { .. } => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            Fetch::Ready(_) => None,
            Fetch::Failed { reason } => Some(reason),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetch<U> {
        match self {
            Fetch::Ready(value) => Fetch::Ready(f(value)),
            Fetch::Failed { reason } => Fetch::Failed { reason },
        }
    }
}

impl<T: Default> Fetch<T> {
    /// The data, or an empty value when the fetch failed
    pub fn into_value_or_default(self) -> T {
        match self {
            Fetch::Ready(value) => value,
            Fetch::Failed { .. } => T::default(),
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for Fetch<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Fetch::Ready(value),
            Err(e) => Fetch::Failed {
                reason: e.to_string(),
            },
        }
    }
}

/// Everything the public sections render from
#[derive(Clone, Debug, PartialEq)]
pub struct SiteData {
    pub content: Fetch<ContentMap>,
    pub projects: Fetch<Vec<Project>>,
}

static EMPTY_CONTENT: std::sync::LazyLock<ContentMap> = std::sync::LazyLock::new(ContentMap::new);

impl SiteData {
    /// Content value for `key`, or `fallback` when it is missing, blank,
    /// or the content fetch failed
    pub fn text<'a>(&'a self, key: &str, fallback: &'a str) -> &'a str {
        let content = self.content.ready().unwrap_or(&EMPTY_CONTENT);
        text_or(content, key, fallback)
    }

    /// Projects in display order; empty when the fetch failed
    pub fn projects(&self) -> &[Project] {
        self.projects.ready().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Link to the resume PDF, empty when none is set
    pub fn resume_url(&self) -> &str {
        self.text("resume_url", "")
    }

    pub fn is_complete(&self) -> bool {
        self.content.is_ready() && self.projects.is_ready()
    }
}

/// Read-only loader for the public site
pub struct SiteDataAggregator {
    gateway: Arc<dyn DataGateway>,
}

impl SiteDataAggregator {
    pub fn new(gateway: Arc<dyn DataGateway>) -> Self {
        Self { gateway }
    }

    /// Fetch content and projects concurrently
    pub async fn load(&self) -> SiteData {
        let (content, projects) =
            tokio::join!(self.gateway.list_content(), self.gateway.list_projects());

        if let Err(e) = &content {
            warn!("Failed to load site content: {}", e);
        }
        if let Err(e) = &projects {
            warn!("Failed to load projects: {}", e);
        }

        SiteData {
            content: Fetch::from(content).map(content_map),
            projects: Fetch::from(projects).map(|mut projects| {
                sort_by_display_order(&mut projects);
                projects
            }),
        }
    }
}
