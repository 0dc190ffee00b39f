use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use folio_admin::{AdminDataController, MediaKind, Section};
use folio_client::{DataGateway, MediaFile, MediaUploader};

use crate::config::Settings;

fn print_progress(pct: u8) {
    let mut stderr = std::io::stderr();
    let _ = write!(stderr, "\rUploading... {}%", pct);
    let _ = stderr.flush();
}

pub async fn run(
    settings: &Settings,
    gateway: Arc<dyn DataGateway>,
    kind: MediaKind,
    file: &Path,
    key: Option<&str>,
) -> anyhow::Result<()> {
    let media = MediaFile::from_path(file).await?;
    let uploader = MediaUploader::new(&settings.client_config(), gateway.clone())?;
    let controller = AdminDataController::new(gateway);

    let Some(key) = key else {
        let url = controller
            .upload_media(&kind.to_string(), kind, &media, &uploader, print_progress)
            .await;
        eprintln!();
        println!("{}", url?);
        return Ok(());
    };

    // A section save writes every field of the section, so start from what is stored
    let report = controller.load_all().await;
    if let Some(reason) = report.content.failure() {
        anyhow::bail!("cannot read current content before saving '{}': {}", key, reason);
    }

    let url = controller
        .upload_field(key, kind, &media, &uploader, print_progress)
        .await;
    eprintln!();
    println!("{}", url?);

    save_field(&controller, key).await?;
    println!("{}", controller.status_text());
    Ok(())
}

/// Persist a staged field, together with its section when it belongs to one
pub async fn save_field(controller: &AdminDataController, key: &str) -> anyhow::Result<()> {
    match Section::of_key(key) {
        Some(section) => controller.save_section(section).await?,
        None => {
            let value = controller.field(key);
            controller.save_content_fields([(key, value)]).await?
        }
    }
    Ok(())
}
