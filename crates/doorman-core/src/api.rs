//! Client for the remote authentication service.
//!
//! One endpoint: `POST {endpoint}/api/auth/login` with a JSON body
//! `{"username", "password"}`, answered by `{"token"}` on success.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::AuthError;

/// Path of the login endpoint, relative to the configured base.
pub const LOGIN_PATH: &str = "/api/auth/login";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Username and password as typed into the form.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Both fields contain something other than whitespace.
    pub fn is_complete(&self) -> bool {
        !self.username.trim().is_empty() && !self.password.trim().is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Exchanges credentials for a token.
pub trait AuthApi: Send + Sync {
    /// Performs one login request and returns the issued token.
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<String, AuthError>> + Send;
}

/// `AuthApi` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAuthClient {
    http: reqwest::Client,
    login_url: String,
}

impl HttpAuthClient {
    /// Creates a client for the service rooted at `endpoint`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(endpoint: &url::Url) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .context("build HTTP client")?;
        Ok(Self {
            http,
            login_url: login_url(endpoint.as_str()),
        })
    }

    /// Creates a client for `config.api_endpoint`.
    ///
    /// # Errors
    /// Returns an error if the endpoint is invalid or the client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.endpoint_url()?)
    }
}

impl AuthApi for HttpAuthClient {
    async fn login(&self, credentials: &Credentials) -> Result<String, AuthError> {
        debug!(url = %self.login_url, username = %credentials.username, "sending login request");

        let response = self
            .http
            .post(&self.login_url)
            .json(credentials)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| transport_error(&e))?;
        debug!(status = status.as_u16(), "login response received");

        if !status.is_success() {
            return Err(AuthError::from_status(status.as_u16(), &body));
        }
        extract_token(&body)
    }
}

fn login_url(endpoint: &str) -> String {
    format!("{}{LOGIN_PATH}", endpoint.trim_end_matches('/'))
}

fn transport_error(err: &reqwest::Error) -> AuthError {
    if err.is_timeout() {
        AuthError::timed_out()
    } else {
        AuthError::network(err.to_string())
    }
}

/// Pulls a non-empty string `token` out of a success body.
pub fn extract_token(body: &str) -> Result<String, AuthError> {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return Err(AuthError::UnexpectedResponse);
    };
    match value.get("token").and_then(Value::as_str) {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(AuthError::UnexpectedResponse),
    }
}
