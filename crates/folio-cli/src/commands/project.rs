use std::path::Path;

use anyhow::Context;
use folio_admin::AdminDataController;
use folio_client::ProjectDraft;

pub async fn save(controller: &AdminDataController, json: &Path) -> anyhow::Result<()> {
    let text = tokio::fs::read_to_string(json)
        .await
        .with_context(|| format!("failed to read {}", json.display()))?;
    let draft: ProjectDraft = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a valid project draft", json.display()))?;

    controller.save_project(&draft).await?;
    println!("{}", controller.status_text());
    for project in controller.projects() {
        println!("  {}. {} id={}", project.display_order, project.name, project.id);
    }
    Ok(())
}

pub async fn delete(controller: &AdminDataController, id: &str) -> anyhow::Result<()> {
    controller.delete_project(id).await?;
    println!("{}", controller.status_text());
    Ok(())
}
