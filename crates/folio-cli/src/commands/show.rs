use std::fmt::Write;
use std::sync::Arc;

use folio_client::{DataGateway, SiteData, SiteDataAggregator};

pub async fn run(gateway: Arc<dyn DataGateway>) -> anyhow::Result<()> {
    let data = SiteDataAggregator::new(gateway).load().await;
    print!("{}", render_site(&data));
    if !data.is_complete() {
        anyhow::bail!("site data could not be read completely");
    }
    Ok(())
}

/// Plain-text listing of content (sorted by key) and projects (display order)
pub fn render_site(data: &SiteData) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Content:");
    match data.content.ready() {
        Some(content) => {
            let mut keys: Vec<_> = content.keys().collect();
            keys.sort();
            for key in keys {
                let _ = writeln!(out, "  {} = {}", key, content[key]);
            }
        }
        None => {
            let _ = writeln!(out, "  unavailable: {}", data.content.failure().unwrap_or_default());
        }
    }

    let _ = writeln!(out, "Projects:");
    match data.projects.failure() {
        Some(reason) => {
            let _ = writeln!(out, "  unavailable: {}", reason);
        }
        None => {
            for project in data.projects() {
                let _ = write!(out, "  {}. {}", project.display_order, project.name);
                if !project.year.is_empty() {
                    let _ = write!(out, " ({})", project.year);
                }
                let tags = project.tag_list();
                if !tags.is_empty() {
                    let _ = write!(out, " [{}]", tags.join(", "));
                }
                let _ = writeln!(out, " id={}", project.id);
            }
        }
    }

    out
}
