//! Client model types
//!
//! Rows of the `site_content` and `projects` tables, the partial project
//! edited by the admin, and the authenticated session.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Flat `key -> value` view of all content entries
pub type ContentMap = HashMap<String, String>;

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One editable text/URL field of the public site
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Build the flat lookup from table rows. Later rows win on duplicate keys.
pub fn content_map(entries: Vec<ContentEntry>) -> ContentMap {
    entries.into_iter().map(|e| (e.key, e.value)).collect()
}

/// Look up a content value, substituting `fallback` when the key is
/// missing or its value is blank.
pub fn text_or<'a>(content: &'a ContentMap, key: &str, fallback: &'a str) -> &'a str {
    match content.get(key) {
        Some(value) if !value.is_empty() => value,
        _ => fallback,
    }
}

/// A portfolio case study
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subtitle: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub year: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub highlights: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub video_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub display_order: i32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Project {
    /// Split the `"A • B • C"` tag line into individual tags
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .split('•')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// Order projects by `display_order` ascending. The sort is stable, so
/// ties keep the order the store returned them in.
pub fn sort_by_display_order(projects: &mut [Project]) {
    projects.sort_by_key(|p| p.display_order);
}

/// Partial project as edited in the admin.
///
/// `id == None` means the project has not been inserted yet; the server
/// assigns the id on insert. Unset fields are left out of the request
/// body so the server keeps (or defaults) them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlights: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
}

impl ProjectDraft {
    /// A draft for a project that does not exist yet
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Append a highlight; blank input is ignored.
    pub fn add_highlight(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.highlights
            .get_or_insert_with(Vec::new)
            .push(text.to_string());
    }

    /// Remove the highlight at `index`, if there is one.
    pub fn remove_highlight(&mut self, index: usize) -> Option<String> {
        let highlights = self.highlights.as_mut()?;
        (index < highlights.len()).then(|| highlights.remove(index))
    }

    /// Overlay the draft's set fields onto `project`
    pub fn apply_to(&self, project: &mut Project) {
        if let Some(v) = &self.name {
            project.name = v.clone();
        }
        if let Some(v) = &self.subtitle {
            project.subtitle = v.clone();
        }
        if let Some(v) = &self.year {
            project.year = v.clone();
        }
        if let Some(v) = &self.tags {
            project.tags = v.clone();
        }
        if let Some(v) = &self.description {
            project.description = v.clone();
        }
        if let Some(v) = &self.highlights {
            project.highlights = v.clone();
        }
        if let Some(v) = &self.image_url {
            project.image_url = v.clone();
        }
        if let Some(v) = &self.video_url {
            project.video_url = v.clone();
        }
        if let Some(v) = self.display_order {
            project.display_order = v;
        }
    }
}

impl From<&Project> for ProjectDraft {
    fn from(p: &Project) -> Self {
        Self {
            id: Some(p.id.clone()),
            name: Some(p.name.clone()),
            subtitle: Some(p.subtitle.clone()),
            year: Some(p.year.clone()),
            tags: Some(p.tags.clone()),
            description: Some(p.description.clone()),
            highlights: Some(p.highlights.clone()),
            image_url: Some(p.image_url.clone()),
            video_url: Some(p.video_url.clone()),
            display_order: Some(p.display_order),
        }
    }
}

/// Authenticated session issued by the identity provider
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub user_email: Option<String>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Password-grant token response
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
    #[serde(default)]
    pub user: Option<TokenUser>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenUser {
    #[serde(default)]
    pub email: Option<String>,
}

fn default_expires_in() -> i64 {
    3600
}

impl TokenResponse {
    pub(crate) fn into_session(self, now: DateTime<Utc>) -> Session {
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: now + chrono::Duration::seconds(self.expires_in),
            user_email: self.user.and_then(|u| u.email),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: &str, order: i32) -> Project {
        Project {
            id: id.to_string(),
            display_order: order,
            ..Default::default()
        }
    }

    #[test]
    fn test_project_deserialization_with_nulls() {
        let json = r#"{
            "id": "4f1c",
            "name": "SPINE",
            "subtitle": null,
            "year": "2023–2025",
            "tags": "Action Game • Unreal Engine",
            "description": "Combat systems",
            "highlights": null,
            "image_url": "https://cdn/x.png",
            "video_url": null,
            "display_order": 1,
            "created_at": "2025-01-02T03:04:05.123456+00:00",
            "updated_at": null
        }"#;

        let p: Project = serde_json::from_str(json).unwrap();
        assert_eq!(p.id, "4f1c");
        assert_eq!(p.subtitle, "");
        assert!(p.highlights.is_empty());
        assert_eq!(p.video_url, "");
        assert!(p.created_at.is_some());
        assert!(p.updated_at.is_none());
        assert_eq!(p.tag_list(), vec!["Action Game", "Unreal Engine"]);
    }

    #[test]
    fn test_sort_by_display_order_is_stable() {
        let mut projects = vec![project("c", 2), project("a", 1), project("b", 1)];
        sort_by_display_order(&mut projects);
        let ids: Vec<_> = projects.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_text_or_fallback() {
        let mut content = ContentMap::new();
        content.insert("hero_tagline".to_string(), "Hello".to_string());
        content.insert("about_text1".to_string(), String::new());

        assert_eq!(text_or(&content, "hero_tagline", "x"), "Hello");
        assert_eq!(text_or(&content, "about_text1", "fallback"), "fallback");
        assert_eq!(text_or(&content, "missing", "fallback"), "fallback");
    }

    #[test]
    fn test_draft_serialization_skips_unset() {
        let draft = ProjectDraft::named("X");
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "X" }));
        assert!(draft.is_new());
    }

    #[test]
    fn test_draft_highlights() {
        let mut draft = ProjectDraft::default();
        draft.add_highlight("  Parkour integrated into combat ");
        draft.add_highlight("   ");
        draft.add_highlight("Cinematic finishers");
        assert_eq!(
            draft.highlights.as_deref(),
            Some(
                &[
                    "Parkour integrated into combat".to_string(),
                    "Cinematic finishers".to_string()
                ][..]
            )
        );

        assert_eq!(draft.remove_highlight(5), None);
        assert_eq!(
            draft.remove_highlight(0).as_deref(),
            Some("Parkour integrated into combat")
        );
        assert_eq!(draft.highlights.unwrap().len(), 1);
    }

    #[test]
    fn test_draft_from_project_and_apply() {
        let mut p = project("id-1", 3);
        p.name = "ALIA".to_string();

        let mut draft = ProjectDraft::from(&p);
        assert_eq!(draft.id.as_deref(), Some("id-1"));
        draft.name = Some("ALIA 2".to_string());
        draft.display_order = Some(0);

        draft.apply_to(&mut p);
        assert_eq!(p.name, "ALIA 2");
        assert_eq!(p.display_order, 0);
        assert_eq!(p.id, "id-1");
    }

    #[test]
    fn test_token_response_into_session() {
        let json = r#"{"access_token":"jwt","refresh_token":"r","expires_in":60,"user":{"email":"me@site.dev"}}"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        let now = Utc::now();
        let session = token.into_session(now);

        assert_eq!(session.access_token, "jwt");
        assert_eq!(session.user_email.as_deref(), Some("me@site.dev"));
        assert!(!session.is_expired(now));
        assert!(session.is_expired(now + chrono::Duration::seconds(61)));
    }
}
