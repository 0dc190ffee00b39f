//! Subcommand implementations

mod content;
mod project;
mod show;
mod upload;

use std::sync::Arc;

use folio_admin::AdminDataController;
use folio_client::{DataGateway, MemoryGateway, RestGateway};
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::config::Settings;

pub use show::render_site;
pub use upload::save_field;

/// Gateway for the configured backend, or an empty in-memory store
pub fn build_gateway(settings: &Settings, offline: bool) -> anyhow::Result<Arc<dyn DataGateway>> {
    if offline {
        debug!("Using in-memory store");
        let mut gateway = MemoryGateway::new();
        if let Some((email, password)) = settings.credentials() {
            gateway = gateway.with_credentials(email, password);
        }
        return Ok(Arc::new(gateway));
    }

    if settings.url.is_empty() {
        anyhow::bail!("no backend URL configured; set `url` in folio.toml, FOLIO_URL or --url");
    }
    Ok(Arc::new(RestGateway::new(settings.client_config())?))
}

/// Sign in with the configured credentials, if there are any.
///
/// Without credentials requests go out with the anonymous key.
async fn sign_in(gateway: &dyn DataGateway, settings: &Settings) -> anyhow::Result<()> {
    if let Some((email, password)) = settings.credentials() {
        gateway.sign_in(email, password).await?;
    }
    Ok(())
}

pub async fn run(cli: &Cli, settings: &Settings) -> anyhow::Result<()> {
    let gateway = build_gateway(settings, cli.offline)?;

    match &cli.command {
        Command::Show => show::run(gateway).await,
        Command::Set { fields } => {
            sign_in(gateway.as_ref(), settings).await?;
            let controller = AdminDataController::new(gateway);
            content::run(&controller, fields.clone()).await
        }
        Command::ProjectSave { json } => {
            sign_in(gateway.as_ref(), settings).await?;
            let controller = AdminDataController::new(gateway);
            project::save(&controller, json).await
        }
        Command::ProjectDelete { id } => {
            sign_in(gateway.as_ref(), settings).await?;
            let controller = AdminDataController::new(gateway);
            project::delete(&controller, id).await
        }
        Command::Upload { kind, file, key } => {
            if cli.offline {
                anyhow::bail!("upload needs a backend; drop --offline");
            }
            sign_in(gateway.as_ref(), settings).await?;
            upload::run(settings, gateway, *kind, file, key.as_deref()).await
        }
    }
}
