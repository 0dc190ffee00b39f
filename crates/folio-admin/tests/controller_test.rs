//! AdminDataController tests against the in-memory gateway

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use folio_admin::{AdminDataController, ControllerError, MediaKind, Section};
use folio_client::upload::TransportResponse;
use folio_client::upload::transport::ByteProgress;
use folio_client::{
    ClientConfig, MediaFile, MediaUploader, MemoryGateway, Project, ProjectDraft, UploadTransport,
};
use proptest::prelude::*;

fn setup(gateway: MemoryGateway) -> (Arc<MemoryGateway>, Arc<AdminDataController>) {
    let gateway = Arc::new(gateway.recording_upserts());
    let controller = Arc::new(AdminDataController::new(gateway.clone()));
    (gateway, controller)
}

#[tokio::test]
async fn test_save_content_fields_updates_map() {
    let (gateway, controller) = setup(MemoryGateway::new());
    controller.load_all().await;

    controller
        .save_content_fields([("a", "1"), ("b", "2")])
        .await
        .unwrap();

    assert_eq!(controller.content_value("a").as_deref(), Some("1"));
    assert_eq!(controller.content_value("b").as_deref(), Some("2"));
    assert_eq!(gateway.content_value("b").as_deref(), Some("2"));
    assert_eq!(controller.status_text(), "Saved!");
}

#[tokio::test]
async fn test_save_stops_at_first_failure() {
    let (gateway, controller) = setup(MemoryGateway::new().with_content([("k1", "old")]));
    controller.load_all().await;
    gateway.fail_upsert_on("k2");

    let err = controller
        .save_content_fields([("k1", "v1"), ("k2", "v2"), ("k3", "v3")])
        .await
        .unwrap_err();

    match err {
        ControllerError::SaveFailure { key, written, .. } => {
            assert_eq!(key, "k2");
            assert_eq!(written, vec!["k1"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(gateway.upsert_attempts(), vec!["k1", "k2"]);
    assert_eq!(gateway.content_value("k1").as_deref(), Some("v1"));
    assert_eq!(gateway.content_value("k3"), None);

    assert_eq!(controller.content_value("k1").as_deref(), Some("v1"));
    assert_eq!(controller.content_value("k2"), None);
    assert_eq!(controller.status_text(), "");
    assert!(!controller.is_saving());
}

#[tokio::test]
async fn test_overlapping_save_is_rejected() {
    let (gateway, controller) = setup(MemoryGateway::new());
    let gate = gateway.gate_writes();

    let first = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.save_content_fields([("a", "1")]).await })
    };
    while !controller.is_saving() {
        tokio::task::yield_now().await;
    }

    let err = controller
        .save_content_fields([("b", "2")])
        .await
        .unwrap_err();
    assert!(matches!(err, ControllerError::SaveInProgress));
    assert!(matches!(
        controller.delete_project("p").await,
        Err(ControllerError::SaveInProgress)
    ));

    gate.open();
    first.await.unwrap().unwrap();

    assert!(!controller.is_saving());
    assert_eq!(gateway.upsert_attempts(), vec!["a"]);
    controller.save_content_fields([("b", "2")]).await.unwrap();
}

#[tokio::test]
async fn test_save_project_insert_then_update() {
    let (gateway, controller) = setup(MemoryGateway::new());
    controller.load_all().await;

    controller
        .save_project(&ProjectDraft::named("X"))
        .await
        .unwrap();
    let projects = controller.projects();
    assert_eq!(projects.iter().filter(|p| p.name == "X").count(), 1);
    let id = projects[0].id.clone();
    assert!(!id.is_empty());

    let mut draft = ProjectDraft::from(&projects[0]);
    draft.subtitle = Some("Combat prototype".to_string());
    draft.add_highlight("Fluid combat");
    controller.save_project(&draft).await.unwrap();

    let updated = controller.project(&id).unwrap();
    assert_eq!(updated.subtitle, "Combat prototype");
    assert_eq!(updated.highlights, vec!["Fluid combat"]);
    assert_eq!(gateway.project_count(), 1);
}

#[tokio::test]
async fn test_delete_project_refreshes_list() {
    let (gateway, controller) = setup(MemoryGateway::new().with_projects(vec![
        Project {
            id: "p-1".to_string(),
            name: "SPINE".to_string(),
            display_order: 1,
            ..Default::default()
        },
        Project {
            id: "p-2".to_string(),
            name: "ALIA".to_string(),
            display_order: 2,
            ..Default::default()
        },
    ]));
    controller.load_all().await;

    controller.delete_project("p-1").await.unwrap();

    assert!(controller.project("p-1").is_none());
    assert_eq!(controller.projects().len(), 1);
    assert_eq!(gateway.project_count(), 1);
    assert_eq!(controller.status_text(), "Deleted!");
}

#[tokio::test]
async fn test_project_write_failure_keeps_list() {
    let (gateway, controller) = setup(MemoryGateway::new());
    controller.load_all().await;
    gateway.fail_project_writes(true);

    let err = controller
        .save_project(&ProjectDraft::named("X"))
        .await
        .unwrap_err();
    assert!(matches!(err, ControllerError::Gateway(_)));
    assert!(controller.projects().is_empty());
    assert!(!controller.is_saving());
}

#[tokio::test(start_paused = true)]
async fn test_status_clears_after_two_seconds() {
    let (_, controller) = setup(MemoryGateway::new());
    controller.save_content_fields([("a", "1")]).await.unwrap();
    assert_eq!(controller.status_text(), "Saved!");

    tokio::time::advance(Duration::from_millis(1500)).await;
    assert_eq!(controller.status_text(), "Saved!");

    tokio::time::advance(Duration::from_millis(500)).await;
    assert_eq!(controller.status_text(), "");
}

#[tokio::test]
async fn test_save_section_commits_edits() {
    let (gateway, controller) = setup(
        MemoryGateway::new().with_content([("about_text1", "Bio"), ("hero_tagline", "Hi")]),
    );
    controller.load_all().await;

    controller.set_field("about_text2", "Second paragraph");
    controller.set_field("hero_tagline", "Unsaved");
    controller.save_section(Section::About).await.unwrap();

    assert_eq!(
        gateway.upsert_attempts(),
        vec!["about_image_url", "about_text1", "about_text2", "about_text3"]
    );
    assert_eq!(gateway.content_value("about_text1").as_deref(), Some("Bio"));
    assert_eq!(
        gateway.content_value("about_text2").as_deref(),
        Some("Second paragraph")
    );
    assert!(!controller.section_has_pending_edits(Section::About));
    // Other sections keep their edits
    assert!(controller.section_has_pending_edits(Section::Hero));
    assert_eq!(controller.field("hero_tagline"), "Unsaved");
}

#[tokio::test]
async fn test_save_section_failure_keeps_unwritten_edits() {
    let (gateway, controller) = setup(MemoryGateway::new());
    gateway.fail_upsert_on("contact_text1");

    controller.set_field("telegram_url", "https://t.me/me");
    controller.set_field("contact_text1", "Say hi");
    assert!(controller.save_section(Section::Contact).await.is_err());

    assert_eq!(controller.field("telegram_url"), "https://t.me/me");
    assert_eq!(controller.content_value("telegram_url").as_deref(), Some("https://t.me/me"));
    assert!(controller.section_has_pending_edits(Section::Contact));
    assert_eq!(controller.field("contact_text1"), "Say hi");
}

/// Transport that grants every upload and reports halfway then done
struct InstantTransport;

#[async_trait]
impl UploadTransport for InstantTransport {
    async fn request_upload_url(&self, url: &str, _token: &str) -> anyhow::Result<TransportResponse> {
        let path = url.rsplit("path=").next().unwrap_or_default().replace("%2F", "/");
        Ok(TransportResponse::new(
            200,
            format!(
                r#"{{"signedUrl":"https://storage.example/sign/{0}","publicUrl":"https://cdn.example/{0}"}}"#,
                path
            ),
        ))
    }

    async fn put_file(
        &self,
        _url: &str,
        _content_type: &str,
        body: Bytes,
        progress: ByteProgress<'_>,
    ) -> anyhow::Result<TransportResponse> {
        let total = body.len() as u64;
        progress(total / 2, Some(total));
        progress(total, Some(total));
        Ok(TransportResponse::new(200, ""))
    }
}

fn uploader(gateway: Arc<MemoryGateway>) -> MediaUploader {
    MediaUploader::with_transport(
        &ClientConfig::new("https://demo.supabase.co").with_anon_key("anon"),
        gateway,
        Arc::new(InstantTransport),
    )
}

#[tokio::test(start_paused = true)]
async fn test_upload_field_stages_url_and_holds_progress() {
    let (gateway, controller) = setup(MemoryGateway::new());
    let uploader = uploader(gateway.clone());
    let file = MediaFile::new("portrait.webp", vec![0u8; 64]);

    let mut seen = Vec::new();
    let url = controller
        .upload_field("about_image_url", MediaKind::Image, &file, &uploader, |p| {
            seen.push(p)
        })
        .await
        .unwrap();

    assert_eq!(seen, vec![50, 100]);

    assert!(url.starts_with("https://cdn.example/images/"));
    assert!(url.ends_with(".webp"));
    assert_eq!(controller.field("about_image_url"), url);
    assert_eq!(gateway.content_value("about_image_url"), None);
    assert_eq!(controller.upload_progress("about_image_url"), Some(100));

    tokio::time::advance(Duration::from_millis(1200)).await;
    assert_eq!(controller.upload_progress("about_image_url"), None);
    assert_eq!(controller.upload_error("about_image_url"), None);
}

#[tokio::test]
async fn test_resume_upload_rejects_non_pdf() {
    let (gateway, controller) = setup(MemoryGateway::new());
    let uploader = uploader(gateway);
    let file = MediaFile::new("cv.docx", vec![1, 2, 3]);

    let err = controller
        .upload_field("resume_url", MediaKind::Resume, &file, &uploader, |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, ControllerError::Upload(_)));
    assert_eq!(
        controller.upload_error("resume_url").as_deref(),
        Some("Only PDF files are allowed.")
    );
    assert_eq!(controller.upload_progress("resume_url"), None);
    assert_eq!(controller.field("resume_url"), "");
}

#[tokio::test]
async fn test_direct_save_drops_pending_edit() {
    let (gateway, controller) = setup(MemoryGateway::new());
    let uploader = uploader(gateway.clone());
    let file = MediaFile::new("hero.png", vec![0u8; 8]);

    let staged = controller
        .upload_field("hero_image_url", MediaKind::Image, &file, &uploader, |_| {})
        .await
        .unwrap();
    controller.set_field("hero_tagline", "Unsaved");
    assert_eq!(controller.field("hero_image_url"), staged);

    controller
        .save_content_fields([("hero_image_url", "https://cdn.example/final.png")])
        .await
        .unwrap();

    assert_eq!(
        controller.field("hero_image_url"),
        "https://cdn.example/final.png"
    );
    // Fields not written keep their edits
    assert_eq!(controller.field("hero_tagline"), "Unsaved");
    assert!(controller.section_has_pending_edits(Section::Hero));
}

#[tokio::test]
async fn test_failed_direct_save_drops_only_written_edits() {
    let (gateway, controller) = setup(MemoryGateway::new());
    gateway.fail_upsert_on("about_text2");
    controller.set_field("about_text1", "draft one");
    controller.set_field("about_text2", "draft two");

    assert!(
        controller
            .save_content_fields([("about_text1", "saved one"), ("about_text2", "saved two")])
            .await
            .is_err()
    );

    assert_eq!(controller.field("about_text1"), "saved one");
    assert_eq!(controller.field("about_text2"), "draft two");
}

proptest! {
    #[test]
    fn prop_partial_save_writes_exact_prefix(count in 1usize..8, fail_at in 0usize..8) {
        let keys: Vec<String> = (0..count).map(|i| format!("key_{}", i)).collect();
        let gateway = MemoryGateway::new();
        if fail_at < count {
            gateway.fail_upsert_on(&keys[fail_at]);
        }
        let (gateway, controller) = setup(gateway);

        let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
        let fields: Vec<(String, String)> = keys.iter().map(|k| (k.clone(), "v".to_string())).collect();
        let result = runtime.block_on(controller.save_content_fields(fields));

        let attempted = gateway.upsert_attempts();
        if fail_at < count {
            prop_assert!(result.is_err());
            prop_assert_eq!(attempted.len(), fail_at + 1);
        } else {
            prop_assert!(result.is_ok());
            prop_assert_eq!(attempted.len(), count);
        }
        for (i, key) in keys.iter().enumerate() {
            let stored = gateway.content_value(key).is_some();
            prop_assert_eq!(stored, i < fail_at.min(count));
            prop_assert_eq!(controller.content_value(key).is_some(), stored);
        }
        prop_assert!(!controller.is_saving());
    }
}
