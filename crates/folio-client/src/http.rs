//! HTTP plumbing for the hosted backend
//!
//! Wraps a `reqwest::Client` with the project base URL, the anonymous key
//! and the current session. Every request carries `apikey` plus a bearer
//! token: the session's access token when signed in, the anonymous key
//! otherwise. Requests are never retried.

use std::time::Duration;

use chrono::Utc;
use parking_lot::RwLock;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, error};

use crate::config::ClientConfig;
use crate::constants::api_path;
use crate::error::{GatewayError, Result};
use crate::model::{Session, TokenResponse};

/// HTTP client bound to one backend project
pub struct RestClient {
    client: Client,
    config: ClientConfig,
    session: RwLock<Option<Session>>,
}

impl RestClient {
    /// Create a new client. No network traffic happens until the first request.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.read_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            config,
            session: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the full URL of a table endpoint
    pub fn table_url(&self, table: &str) -> String {
        self.config.url(&format!("{}/{}", api_path::REST, table))
    }

    /// Current session, dropping it once it has expired
    pub fn session(&self) -> Option<Session> {
        let now = Utc::now();
        {
            let guard = self.session.read();
            match guard.as_ref() {
                Some(s) if !s.is_expired(now) => return Some(s.clone()),
                None => return None,
                Some(_) => {}
            }
        }
        debug!("Session expired, clearing");
        *self.session.write() = None;
        None
    }

    pub fn set_session(&self, session: Session) {
        *self.session.write() = Some(session);
    }

    pub fn clear_session(&self) -> Option<Session> {
        self.session.write().take()
    }

    /// Bearer credential: session token if signed in, anonymous key otherwise
    pub fn bearer_token(&self) -> String {
        self.session()
            .map(|s| s.access_token)
            .unwrap_or_else(|| self.config.anon_key.clone())
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.config.anon_key)
            .bearer_auth(self.bearer_token())
    }

    /// Exchange email/password for a session and keep it
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        #[derive(Serialize)]
        struct Credentials<'a> {
            email: &'a str,
            password: &'a str,
        }

        let url = self.config.url(api_path::AUTH_TOKEN);
        debug!("Signing in at {}", url);

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.config.anon_key)
            .query(&[("grant_type", "password")])
            .json(&Credentials { email, password })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::AuthFailed(format!(
                "Login failed with status {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await?;
        let session = token.into_session(Utc::now());
        self.set_session(session.clone());
        Ok(session)
    }

    /// Revoke the session remotely and forget it locally.
    ///
    /// The local session is cleared even if the logout call fails.
    pub async fn sign_out(&self) -> Result<()> {
        let Some(session) = self.clear_session() else {
            return Ok(());
        };

        let url = self.config.url(api_path::AUTH_LOGOUT);
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await?;
        check_status(response).await.map(|_| ())
    }

    /// GET a table with query parameters and decode the rows
    pub async fn select<T, Q>(&self, table: &str, query: &Q) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.table_url(table);
        debug!("GET {}", url);
        let response = self
            .authorized(self.client.get(&url))
            .query(query)
            .send()
            .await?;
        handle_response(response).await
    }

    /// POST a JSON body to a table. `prefer` is sent as the `Prefer` header.
    pub async fn insert<B, Q>(&self, table: &str, query: &Q, body: &B, prefer: &str) -> Result<()>
    where
        B: Serialize + ?Sized,
        Q: Serialize + ?Sized,
    {
        let url = self.table_url(table);
        debug!("POST {}", url);
        let response = self
            .authorized(self.client.post(&url))
            .header("Prefer", prefer)
            .query(query)
            .json(body)
            .send()
            .await?;
        check_status(response).await.map(|_| ())
    }

    /// PATCH rows matching the query filter
    pub async fn update<B, Q>(&self, table: &str, query: &Q, body: &B) -> Result<()>
    where
        B: Serialize + ?Sized,
        Q: Serialize + ?Sized,
    {
        let url = self.table_url(table);
        debug!("PATCH {}", url);
        let response = self
            .authorized(self.client.patch(&url))
            .header("Prefer", "return=minimal")
            .query(query)
            .json(body)
            .send()
            .await?;
        check_status(response).await.map(|_| ())
    }

    /// DELETE rows matching the query filter
    pub async fn delete<Q>(&self, table: &str, query: &Q) -> Result<()>
    where
        Q: Serialize + ?Sized,
    {
        let url = self.table_url(table);
        debug!("DELETE {}", url);
        let response = self
            .authorized(self.client.delete(&url))
            .query(query)
            .send()
            .await?;
        check_status(response).await.map(|_| ())
    }
}

/// Equality filter value for a column, e.g. `eq.42`
pub fn eq_filter(value: &str) -> String {
    format!("eq.{}", value)
}

/// Ascending order clause for a column, e.g. `display_order.asc`
pub fn asc_order(column: &str) -> String {
    format!("{}.asc", column)
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        error!("Request failed with status {}: {}", status, body);
        Err(GatewayError::Request {
            status: status.as_u16(),
            body,
        })
    }
}

async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = check_status(response).await?;
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
