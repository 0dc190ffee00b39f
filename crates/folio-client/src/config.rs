// Configuration for the Folio client

/// Connection settings for the hosted backend
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Project base URL (e.g. "https://abc.supabase.co")
    pub base_url: String,
    /// Public anonymous key, used when no session exists
    pub anon_key: String,
    /// Connection timeout in milliseconds (default: 5000)
    pub connect_timeout_ms: u64,
    /// Read timeout in milliseconds (default: 30000). Not applied to media transfers.
    pub read_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:54321".to_string(),
            anon_key: String::new(),
            connect_timeout_ms: 5000,
            read_timeout_ms: 30000,
        }
    }
}

impl ClientConfig {
    /// Create a config for the given base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    /// Set the public anonymous key
    pub fn with_anon_key(mut self, anon_key: &str) -> Self {
        self.anon_key = anon_key.to_string();
        self
    }

    /// Set timeouts
    pub fn with_timeouts(mut self, connect_ms: u64, read_ms: u64) -> Self {
        self.connect_timeout_ms = connect_ms;
        self.read_timeout_ms = read_ms;
        self
    }

    /// Join a path onto the base URL
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
