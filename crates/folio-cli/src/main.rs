//! folioctl entry point

use clap::Parser;
use folio_cli::cli::Cli;
use folio_cli::config::Settings;
use folio_cli::{commands, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose)?;

    let settings = Settings::load(cli.config.as_deref(), &cli.overrides())?;
    commands::run(&cli, &settings).await
}
