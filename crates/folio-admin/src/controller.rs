//! Admin Data Controller
//!
//! Owns the dashboard's view of the backend: the content map, the ordered
//! project list, unsaved field edits, upload slots and the transient
//! status line. Every save or delete passes through a single in-flight
//! gate; a second one issued while the first is running is rejected with
//! [`ControllerError::SaveInProgress`] rather than queued.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use folio_client::{
    ContentMap, DataGateway, Fetch, MediaFile, MediaUploader, Project, ProjectDraft, UploadError,
    content_map, sort_by_display_order,
};
use parking_lot::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::edits::LocalEdits;
use crate::error::{ControllerError, Result};
use crate::media::MediaKind;
use crate::section::Section;
use crate::status::{DELETED, SAVED, StatusMessage};
use crate::upload_state::UploadProgress;

/// What a [`AdminDataController::load_all`] call managed to read.
///
/// Each half carries the number of rows loaded, or why it failed. A failed
/// half leaves the previously loaded data in place.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadReport {
    pub content: Fetch<usize>,
    pub projects: Fetch<usize>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.content.is_ready() && self.projects.is_ready()
    }
}

struct AdminState {
    content: ContentMap,
    projects: Vec<Project>,
    loading: bool,
    status: Option<StatusMessage>,
    edits: LocalEdits,
    uploads: HashMap<String, UploadProgress>,
}

impl Default for AdminState {
    fn default() -> Self {
        Self {
            content: ContentMap::new(),
            projects: Vec::new(),
            // Nothing has been read yet
            loading: true,
            status: None,
            edits: LocalEdits::default(),
            uploads: HashMap::new(),
        }
    }
}

/// Clears the saving flag when dropped, whichever way the save ends
struct SavingGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct AdminDataController {
    gateway: Arc<dyn DataGateway>,
    state: RwLock<AdminState>,
    saving: AtomicBool,
}

impl AdminDataController {
    pub fn new(gateway: Arc<dyn DataGateway>) -> Self {
        Self {
            gateway,
            state: RwLock::new(AdminState::default()),
            saving: AtomicBool::new(false),
        }
    }

    pub fn gateway(&self) -> &Arc<dyn DataGateway> {
        &self.gateway
    }

    fn begin_save(&self) -> Result<SavingGuard<'_>> {
        self.saving
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ControllerError::SaveInProgress)?;
        Ok(SavingGuard { flag: &self.saving })
    }

    fn show_status(&self, text: &str) {
        self.state.write().status = Some(StatusMessage::new(text));
    }

    /// Fetch content and projects concurrently and replace the local copies
    pub async fn load_all(&self) -> LoadReport {
        self.state.write().loading = true;

        let (content, projects) =
            tokio::join!(self.gateway.list_content(), self.gateway.list_projects());

        let mut state = self.state.write();
        let content = match content {
            Ok(rows) => {
                state.content = content_map(rows);
                Fetch::Ready(state.content.len())
            }
            Err(e) => {
                warn!("Failed to load site content: {}", e);
                Fetch::Failed {
                    reason: e.to_string(),
                }
            }
        };
        let projects = match projects {
            Ok(mut rows) => {
                sort_by_display_order(&mut rows);
                state.projects = rows;
                Fetch::Ready(state.projects.len())
            }
            Err(e) => {
                warn!("Failed to load projects: {}", e);
                Fetch::Failed {
                    reason: e.to_string(),
                }
            }
        };
        state.loading = false;

        LoadReport { content, projects }
    }

    /// Upsert each field in order, stopping at the first failure.
    ///
    /// Fields written before a failure stay written: they are merged into
    /// the local map and their pending edits are dropped. The error names
    /// the failing key and the written ones.
    pub async fn save_content_fields<I, K, V>(&self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let fields: Vec<(String, String)> = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let _guard = self.begin_save()?;

        let mut written = Vec::with_capacity(fields.len());
        for (key, value) in &fields {
            debug!("Saving content field {}", key);
            if let Err(source) = self.gateway.upsert_content(key, value).await {
                warn!("Failed to save content field {}: {}", key, source);
                self.commit_written(&fields[..written.len()]);
                return Err(ControllerError::SaveFailure {
                    key: key.clone(),
                    written,
                    source,
                });
            }
            written.push(key.clone());
        }

        self.commit_written(&fields);
        info!("Saved {} content field(s)", fields.len());
        self.show_status(SAVED);
        Ok(())
    }

    /// Record stored fields locally; their edits are no longer pending
    fn commit_written(&self, fields: &[(String, String)]) {
        let mut state = self.state.write();
        for (key, value) in fields {
            state.content.insert(key.clone(), value.clone());
        }
        state.edits.clear_keys(fields.iter().map(|(key, _)| key.as_str()));
    }

    /// Update the project when the draft has an id, insert it otherwise,
    /// then reload the project list from the store
    pub async fn save_project(&self, draft: &ProjectDraft) -> Result<()> {
        let _guard = self.begin_save()?;

        match &draft.id {
            Some(id) => self.gateway.update_project(id, draft).await?,
            None => self.gateway.insert_project(draft).await?,
        }
        self.refresh_projects().await?;

        info!(
            "Saved project {}",
            draft.name.as_deref().or(draft.id.as_deref()).unwrap_or("")
        );
        self.show_status(SAVED);
        Ok(())
    }

    pub async fn delete_project(&self, id: &str) -> Result<()> {
        let _guard = self.begin_save()?;

        self.gateway.delete_project(id).await?;
        self.refresh_projects().await?;

        info!("Deleted project {}", id);
        self.show_status(DELETED);
        Ok(())
    }

    async fn refresh_projects(&self) -> Result<()> {
        let mut projects = self.gateway.list_projects().await?;
        sort_by_display_order(&mut projects);
        self.state.write().projects = projects;
        Ok(())
    }

    /// Save every field of `section` as currently displayed.
    ///
    /// Edits of written fields are dropped; on failure the rest stay
    /// pending.
    pub async fn save_section(&self, section: Section) -> Result<()> {
        let fields: Vec<(String, String)> = {
            let state = self.state.read();
            section
                .keys()
                .iter()
                .map(|key| {
                    let value = state.edits.resolve(key, &state.content).to_string();
                    (key.to_string(), value)
                })
                .collect()
        };

        self.save_content_fields(fields).await
    }

    /// Value shown in the editor: the unsaved edit, else the stored value
    pub fn field(&self, key: &str) -> String {
        let state = self.state.read();
        state.edits.resolve(key, &state.content).to_string()
    }

    pub fn set_field(&self, key: &str, value: &str) {
        self.state.write().edits.set(key, value);
    }

    pub fn has_pending_edits(&self) -> bool {
        !self.state.read().edits.is_empty()
    }

    pub fn section_has_pending_edits(&self, section: Section) -> bool {
        self.state.read().edits.contains_any(section.keys())
    }

    pub fn discard_edits(&self) {
        self.state.write().edits.clear();
    }

    /// Upload `file` into the bucket folder for `kind`, tracking progress
    /// under `slot` and forwarding each percentage to `on_progress`.
    /// Returns the public URL.
    pub async fn upload_media<F>(
        &self,
        slot: &str,
        kind: MediaKind,
        file: &MediaFile,
        uploader: &MediaUploader,
        mut on_progress: F,
    ) -> Result<String>
    where
        F: FnMut(u8) + Send,
    {
        let path = match kind.destination_path(file, Utc::now().timestamp_millis()) {
            Ok(path) => path,
            Err(e) => {
                let message = match &e {
                    UploadError::InvalidFile(reason) => reason.clone(),
                    other => other.to_string(),
                };
                self.with_slot(slot, |s| s.reject(&message));
                return Err(e.into());
            }
        };

        self.with_slot(slot, UploadProgress::start);
        let result = uploader
            .upload(file, &path, |pct| {
                self.with_slot(slot, |s| s.update(pct));
                on_progress(pct);
            })
            .await;

        match result {
            Ok(url) => {
                self.with_slot(slot, |s| s.finish(Instant::now()));
                Ok(url)
            }
            Err(e) => {
                warn!("Upload of {} failed: {}", file.name, e);
                self.with_slot(slot, |s| s.fail(&e.to_string(), Instant::now()));
                Err(e.into())
            }
        }
    }

    /// Upload into a content field and stage the returned URL as an edit
    /// of that field. The edit still needs saving.
    pub async fn upload_field<F>(
        &self,
        key: &str,
        kind: MediaKind,
        file: &MediaFile,
        uploader: &MediaUploader,
        on_progress: F,
    ) -> Result<String>
    where
        F: FnMut(u8) + Send,
    {
        let url = self.upload_media(key, kind, file, uploader, on_progress).await?;
        self.set_field(key, &url);
        Ok(url)
    }

    fn with_slot(&self, slot: &str, f: impl FnOnce(&mut UploadProgress)) {
        let mut state = self.state.write();
        f(state.uploads.entry(slot.to_string()).or_default());
    }

    /// Percentage shown for `slot`, if a transfer is running or just ended
    pub fn upload_progress(&self, slot: &str) -> Option<u8> {
        let now = Instant::now();
        self.state
            .read()
            .uploads
            .get(slot)
            .and_then(|s| s.percent_at(now))
    }

    pub fn upload_error(&self, slot: &str) -> Option<String> {
        self.state
            .read()
            .uploads
            .get(slot)
            .and_then(|s| s.error().map(str::to_string))
    }

    pub fn content(&self) -> ContentMap {
        self.state.read().content.clone()
    }

    pub fn content_value(&self, key: &str) -> Option<String> {
        self.state.read().content.get(key).cloned()
    }

    pub fn projects(&self) -> Vec<Project> {
        self.state.read().projects.clone()
    }

    pub fn project(&self, id: &str) -> Option<Project> {
        self.state.read().projects.iter().find(|p| p.id == id).cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::Acquire)
    }

    /// Status line text, `""` when nothing is shown
    pub fn status_text(&self) -> String {
        let now = Instant::now();
        self.state
            .read()
            .status
            .as_ref()
            .map(|s| s.text_at(now).to_string())
            .unwrap_or_default()
    }
}
