//! Command line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use folio_admin::MediaKind;

use crate::config::Overrides;

#[derive(Debug, Parser)]
#[command(name = "folioctl", version, about = "Read and edit a Folio portfolio")]
pub struct Cli {
    /// Settings file (default: ./folio.toml when present)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL
    #[arg(long = "url", global = true)]
    pub url: Option<String>,

    /// Public anonymous API key
    #[arg(long = "anon-key", global = true)]
    pub anon_key: Option<String>,

    /// Work against an empty in-memory store instead of the backend
    #[arg(long = "offline", global = true)]
    pub offline: bool,

    /// Log at debug level unless FOLIO_LOG or RUST_LOG says otherwise
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            url: self.url.clone(),
            anon_key: self.anon_key.clone(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print all content and the ordered project list
    Show,

    /// Save content fields in the order given
    Set {
        #[arg(value_name = "KEY=VALUE", required = true, value_parser = parse_assignment)]
        fields: Vec<(String, String)>,
    },

    /// Insert or update a project from a JSON draft
    ProjectSave {
        #[arg(long = "json", value_name = "FILE")]
        json: PathBuf,
    },

    /// Delete a project by id
    ProjectDelete { id: String },

    /// Upload a media file and print its public URL
    Upload {
        #[arg(long = "kind", value_parser = parse_media_kind)]
        kind: MediaKind,

        file: PathBuf,

        /// Also save the URL into this content field
        #[arg(long = "key")]
        key: Option<String>,
    },
}

/// Parse a `KEY=VALUE` argument. The value may be empty or contain `=`.
pub fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_media_kind(s: &str) -> Result<MediaKind, String> {
    s.parse()
}
