//! folioctl settings
//!
//! Sources, lowest precedence first: built-in defaults, the settings file,
//! `FOLIO_*` environment variables, command line flags.

use std::path::Path;

use config::{Config, Environment, File};
use folio_client::ClientConfig;
use serde::Deserialize;

/// Settings file read when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "folio.toml";

pub const ENV_PREFIX: &str = "FOLIO";

const DEFAULT_CONNECT_TIMEOUT_MS: i64 = 5000;
const DEFAULT_READ_TIMEOUT_MS: i64 = 30000;

/// Values given on the command line
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub anon_key: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    /// Admin credentials used by the editing commands
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Settings {
    /// Load settings. An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> anyhow::Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = Config::builder()
            .set_default("connect_timeout_ms", DEFAULT_CONNECT_TIMEOUT_MS)?
            .set_default("read_timeout_ms", DEFAULT_READ_TIMEOUT_MS)?
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .set_override_option("url", overrides.url.clone())?
            .set_override_option("anon_key", overrides.anon_key.clone())?
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.url)
            .with_anon_key(&self.anon_key)
            .with_timeouts(self.connect_timeout_ms, self.read_timeout_ms)
    }

    /// Email and password, when both are set
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.email.as_deref(), self.password.as_deref()) {
            (Some(email), Some(password)) if !email.is_empty() => Some((email, password)),
            _ => None,
        }
    }
}
