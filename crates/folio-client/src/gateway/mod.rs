//! Remote Data Gateway
//!
//! Typed façade over the backend's two tables and its session. Components
//! receive a gateway explicitly (usually as `Arc<dyn DataGateway>`), which
//! lets tests swap in [`MemoryGateway`] instead of the network.

pub mod memory;
pub mod rest;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{ContentEntry, Project, ProjectDraft, Session};

pub use memory::{MemoryGateway, WriteGate};
pub use rest::RestGateway;

/// Read/write access to `site_content`, `projects` and the auth session
#[async_trait]
pub trait DataGateway: Send + Sync {
    /// Current non-expired session, if any
    async fn session(&self) -> Option<Session>;

    /// Access token of the current session
    async fn access_token(&self) -> Option<String> {
        self.session().await.map(|s| s.access_token)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    async fn sign_out(&self) -> Result<()>;

    /// All content rows, in store order
    async fn list_content(&self) -> Result<Vec<ContentEntry>>;

    /// Insert or overwrite the row with this key, stamping `updated_at`
    async fn upsert_content(&self, key: &str, value: &str) -> Result<()>;

    /// All projects ordered by `display_order` ascending
    async fn list_projects(&self) -> Result<Vec<Project>>;

    async fn insert_project(&self, draft: &ProjectDraft) -> Result<()>;

    async fn update_project(&self, id: &str, draft: &ProjectDraft) -> Result<()>;

    async fn delete_project(&self, id: &str) -> Result<()>;
}
