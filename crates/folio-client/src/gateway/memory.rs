//! In-process gateway with fault injection
//!
//! Holds both tables in memory and mimics the backend's observable
//! behavior: upsert-by-key, server-assigned project ids and timestamps,
//! `display_order` ordering. Reads and writes can be made to fail, and
//! writes can be held back behind a [`WriteGate`] to observe a save while
//! it is in flight.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use crate::error::{GatewayError, Result};
use crate::gateway::DataGateway;
use crate::model::{
    ContentEntry, Project, ProjectDraft, Session, sort_by_display_order,
};

#[derive(Default)]
struct Faults {
    content_reads: bool,
    project_reads: bool,
    project_writes: bool,
    upsert_keys: HashSet<String>,
}

#[derive(Default)]
struct MemoryState {
    content: Vec<ContentEntry>,
    projects: Vec<Project>,
    session: Option<Session>,
    credentials: Option<(String, String)>,
    faults: Faults,
    upsert_log: Option<Vec<String>>,
    write_gate: Option<Arc<Semaphore>>,
}

/// Handle that releases writes held by [`MemoryGateway::gate_writes`]
#[derive(Clone)]
pub struct WriteGate {
    semaphore: Arc<Semaphore>,
}

impl WriteGate {
    /// Let every pending and future write through
    pub fn open(&self) {
        // Closing wakes all waiters; acquire on a closed semaphore returns at once
        self.semaphore.close();
    }
}

/// [`DataGateway`] kept entirely in memory
#[derive(Default)]
pub struct MemoryGateway {
    state: Mutex<MemoryState>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed content rows
    pub fn with_content<I, K, V>(self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        {
            let mut state = self.state.lock();
            for (key, value) in entries {
                upsert(&mut state.content, key.into(), value.into());
            }
        }
        self
    }

    /// Seed project rows as-is
    pub fn with_projects(self, projects: Vec<Project>) -> Self {
        self.state.lock().projects.extend(projects);
        self
    }

    /// Accept this email/password pair in `sign_in`
    pub fn with_credentials(self, email: &str, password: &str) -> Self {
        self.state.lock().credentials = Some((email.to_string(), password.to_string()));
        self
    }

    pub fn fail_content_reads(&self, fail: bool) {
        self.state.lock().faults.content_reads = fail;
    }

    pub fn fail_project_reads(&self, fail: bool) {
        self.state.lock().faults.project_reads = fail;
    }

    pub fn fail_project_writes(&self, fail: bool) {
        self.state.lock().faults.project_writes = fail;
    }

    /// Make every upsert of `key` fail
    pub fn fail_upsert_on(&self, key: &str) {
        self.state.lock().faults.upsert_keys.insert(key.to_string());
    }

    /// Hold every subsequent write until the returned gate is opened
    pub fn gate_writes(&self) -> WriteGate {
        let semaphore = Arc::new(Semaphore::new(0));
        self.state.lock().write_gate = Some(semaphore.clone());
        WriteGate { semaphore }
    }

    /// Start logging the keys passed to `upsert_content`
    pub fn recording_upserts(self) -> Self {
        self.state.lock().upsert_log = Some(Vec::new());
        self
    }

    /// Keys passed to `upsert_content`, in call order, including failed
    /// ones. Empty unless [`recording_upserts`](Self::recording_upserts)
    /// was called.
    pub fn upsert_attempts(&self) -> Vec<String> {
        self.state.lock().upsert_log.clone().unwrap_or_default()
    }

    pub fn content_value(&self, key: &str) -> Option<String> {
        self.state
            .lock()
            .content
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.clone())
    }

    pub fn project_count(&self) -> usize {
        self.state.lock().projects.len()
    }

    async fn wait_for_write(&self) {
        let gate = self.state.lock().write_gate.clone();
        if let Some(semaphore) = gate {
            // No permits are ever added, so this only returns once the gate is closed
            let _ = semaphore.acquire().await;
        }
    }
}

fn upsert(content: &mut Vec<ContentEntry>, key: String, value: String) {
    let now = Some(Utc::now());
    match content.iter_mut().find(|e| e.key == key) {
        Some(entry) => {
            entry.value = value;
            entry.updated_at = now;
        }
        None => content.push(ContentEntry {
            key,
            value,
            updated_at: now,
        }),
    }
}

fn unavailable(what: &str) -> GatewayError {
    GatewayError::Unavailable(format!("{} failed", what))
}

#[async_trait]
impl DataGateway for MemoryGateway {
    async fn session(&self) -> Option<Session> {
        let mut state = self.state.lock();
        if state
            .session
            .as_ref()
            .is_some_and(|s| s.is_expired(Utc::now()))
        {
            state.session = None;
        }
        state.session.clone()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let mut state = self.state.lock();
        let accepted = state
            .credentials
            .as_ref()
            .is_some_and(|(e, p)| e == email && p == password);
        if !accepted {
            return Err(GatewayError::AuthFailed(
                "Invalid login credentials".to_string(),
            ));
        }

        let session = Session {
            access_token: uuid::Uuid::new_v4().to_string(),
            refresh_token: None,
            expires_at: Utc::now() + chrono::Duration::hours(1),
            user_email: Some(email.to_string()),
        };
        state.session = Some(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> Result<()> {
        self.state.lock().session = None;
        Ok(())
    }

    async fn list_content(&self) -> Result<Vec<ContentEntry>> {
        let state = self.state.lock();
        if state.faults.content_reads {
            return Err(unavailable("site_content select"));
        }
        Ok(state.content.clone())
    }

    async fn upsert_content(&self, key: &str, value: &str) -> Result<()> {
        self.wait_for_write().await;
        let mut state = self.state.lock();
        if let Some(log) = state.upsert_log.as_mut() {
            log.push(key.to_string());
        }
        if state.faults.upsert_keys.contains(key) {
            return Err(unavailable("site_content upsert"));
        }
        upsert(&mut state.content, key.to_string(), value.to_string());
        Ok(())
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        let state = self.state.lock();
        if state.faults.project_reads {
            return Err(unavailable("projects select"));
        }
        let mut projects = state.projects.clone();
        sort_by_display_order(&mut projects);
        Ok(projects)
    }

    async fn insert_project(&self, draft: &ProjectDraft) -> Result<()> {
        self.wait_for_write().await;
        let mut state = self.state.lock();
        if state.faults.project_writes {
            return Err(unavailable("projects insert"));
        }
        let now = Some(Utc::now());
        let mut project = Project {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            ..Default::default()
        };
        draft.apply_to(&mut project);
        state.projects.push(project);
        Ok(())
    }

    async fn update_project(&self, id: &str, draft: &ProjectDraft) -> Result<()> {
        self.wait_for_write().await;
        let mut state = self.state.lock();
        if state.faults.project_writes {
            return Err(unavailable("projects update"));
        }
        // Like an `id=eq.` filter, an unknown id matches nothing and is not an error
        if let Some(project) = state.projects.iter_mut().find(|p| p.id == id) {
            draft.apply_to(project);
            project.updated_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn delete_project(&self, id: &str) -> Result<()> {
        self.wait_for_write().await;
        let mut state = self.state.lock();
        if state.faults.project_writes {
            return Err(unavailable("projects delete"));
        }
        state.projects.retain(|p| p.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: &str, name: &str, order: i32) -> Project {
        Project {
            id: id.to_string(),
            name: name.to_string(),
            display_order: order,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_upsert_overwrites_by_key() {
        let gateway = MemoryGateway::new()
            .with_content([("hero_tagline", "old")])
            .recording_upserts();

        gateway.upsert_content("hero_tagline", "new").await.unwrap();
        gateway.upsert_content("resume_url", "/cv.pdf").await.unwrap();

        let rows = gateway.list_content().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(gateway.content_value("hero_tagline").as_deref(), Some("new"));
        assert_eq!(gateway.upsert_attempts(), vec!["hero_tagline", "resume_url"]);
    }

    #[tokio::test]
    async fn test_upserts_not_logged_by_default() {
        let gateway = MemoryGateway::new();
        gateway.upsert_content("hero_tagline", "new").await.unwrap();

        assert!(gateway.upsert_attempts().is_empty());
        assert_eq!(gateway.content_value("hero_tagline").as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_projects_listed_by_display_order() {
        let gateway = MemoryGateway::new().with_projects(vec![
            project("3", "DONSTROY", 4),
            project("1", "SPINE", 1),
            project("2", "ALIA", 1),
        ]);

        let names: Vec<_> = gateway
            .list_projects()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["SPINE", "ALIA", "DONSTROY"]);
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamps() {
        let gateway = MemoryGateway::new();
        gateway
            .insert_project(&ProjectDraft::named("LEVEL GROUP"))
            .await
            .unwrap();

        let projects = gateway.list_projects().await.unwrap();
        assert_eq!(projects.len(), 1);
        assert!(!projects[0].id.is_empty());
        assert!(projects[0].created_at.is_some());
    }

    #[tokio::test]
    async fn test_sign_in() {
        let gateway = MemoryGateway::new().with_credentials("me@site.dev", "secret");

        assert!(gateway.sign_in("me@site.dev", "wrong").await.is_err());
        assert!(gateway.access_token().await.is_none());

        gateway.sign_in("me@site.dev", "secret").await.unwrap();
        assert!(gateway.access_token().await.is_some());

        gateway.sign_out().await.unwrap();
        assert!(gateway.session().await.is_none());
    }

    #[tokio::test]
    async fn test_injected_faults() {
        let gateway = MemoryGateway::new().recording_upserts();
        gateway.fail_content_reads(true);
        gateway.fail_upsert_on("bad");

        assert!(matches!(
            gateway.list_content().await,
            Err(GatewayError::Unavailable(_))
        ));
        assert!(gateway.upsert_content("bad", "x").await.is_err());
        assert!(gateway.upsert_content("good", "x").await.is_ok());
        assert_eq!(gateway.upsert_attempts(), vec!["bad", "good"]);
    }
}
