//! Gateway backed by the hosted REST API

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::constants::{column, table};
use crate::error::Result;
use crate::gateway::DataGateway;
use crate::http::{RestClient, asc_order, eq_filter};
use crate::model::{ContentEntry, Project, ProjectDraft, Session};

/// [`DataGateway`] that talks to the backend over HTTP
pub struct RestGateway {
    http_client: RestClient,
}

#[derive(Serialize)]
struct ContentRow<'a> {
    key: &'a str,
    value: &'a str,
    updated_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct ProjectRow<'a> {
    #[serde(flatten)]
    draft: &'a ProjectDraft,
    updated_at: DateTime<Utc>,
}

impl RestGateway {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            http_client: RestClient::new(config)?,
        })
    }

    pub fn from_client(http_client: RestClient) -> Self {
        Self { http_client }
    }

    /// Get the underlying HTTP client
    pub fn http_client(&self) -> &RestClient {
        &self.http_client
    }
}

#[async_trait]
impl DataGateway for RestGateway {
    async fn session(&self) -> Option<Session> {
        self.http_client.session()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let session = self.http_client.sign_in(email, password).await?;
        info!("Signed in as {}", session.user_email.as_deref().unwrap_or(email));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<()> {
        self.http_client.sign_out().await
    }

    async fn list_content(&self) -> Result<Vec<ContentEntry>> {
        self.http_client
            .select(table::SITE_CONTENT, &[("select", "*")])
            .await
    }

    async fn upsert_content(&self, key: &str, value: &str) -> Result<()> {
        debug!("Upserting content key {}", key);
        self.http_client
            .insert(
                table::SITE_CONTENT,
                &[("on_conflict", column::KEY)],
                &ContentRow {
                    key,
                    value,
                    updated_at: Utc::now(),
                },
                "resolution=merge-duplicates,return=minimal",
            )
            .await
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        let order = asc_order(column::DISPLAY_ORDER);
        self.http_client
            .select(
                table::PROJECTS,
                &[("select", "*"), ("order", order.as_str())],
            )
            .await
    }

    async fn insert_project(&self, draft: &ProjectDraft) -> Result<()> {
        self.http_client
            .insert(
                table::PROJECTS,
                &[] as &[(&str, &str)],
                &ProjectRow {
                    draft,
                    updated_at: Utc::now(),
                },
                "return=minimal",
            )
            .await
    }

    async fn update_project(&self, id: &str, draft: &ProjectDraft) -> Result<()> {
        let filter = eq_filter(id);
        self.http_client
            .update(
                table::PROJECTS,
                &[(column::ID, filter.as_str())],
                &ProjectRow {
                    draft,
                    updated_at: Utc::now(),
                },
            )
            .await
    }

    async fn delete_project(&self, id: &str) -> Result<()> {
        let filter = eq_filter(id);
        self.http_client
            .delete(table::PROJECTS, &[(column::ID, filter.as_str())])
            .await
    }
}
