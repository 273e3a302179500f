use std::time::Duration;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{AuthApi, Credentials};
use crate::config::Config;
use crate::error::AuthError;
use crate::session::{self, Session, SessionContext};
use crate::storage::SessionStore;

/// Runs login requests and records their outcome.
///
/// Owns the side effects of a login: the request (bounded by a timeout and a
/// cancellation token), the write to durable storage and the update of the
/// shared [`SessionContext`].
pub struct Authenticator<A, S> {
    api: A,
    store: S,
    context: SessionContext,
    timeout: Duration,
}

impl<A: AuthApi, S: SessionStore> Authenticator<A, S> {
    pub fn new(api: A, store: S, context: SessionContext) -> Self {
        Self {
            api,
            store,
            context,
            timeout: Duration::from_secs(Config::DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Checks durable storage for an existing session.
    ///
    /// A non-empty stored token marks the context authenticated and returns
    /// `true`.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    pub fn restore(&self) -> Result<bool> {
        if session::load_token(&self.store)?.is_none() {
            return Ok(false);
        }
        let username = session::load_username(&self.store)?;
        debug!(username = ?username, "restored stored session");
        self.context.mark_authenticated(username);
        Ok(true)
    }

    /// Exchanges `credentials` for a session and persists it.
    ///
    /// Nothing is written unless a token arrives before both the timeout and
    /// `cancel` fire.
    ///
    /// # Errors
    /// Returns the `AuthError` describing why no session was established.
    pub async fn authenticate(
        &self,
        credentials: &Credentials,
        cancel: &CancellationToken,
    ) -> Result<Session, AuthError> {
        let result = self.exchange(credentials, cancel).await;
        match &result {
            Ok(session) => info!(username = %session.username, "login succeeded"),
            Err(AuthError::Cancelled) => debug!("login cancelled"),
            Err(err) => warn!(kind = err.kind(), error = %err, "login failed"),
        }
        result
    }

    async fn exchange(
        &self,
        credentials: &Credentials,
        cancel: &CancellationToken,
    ) -> Result<Session, AuthError> {
        let request = tokio::time::timeout(self.timeout, self.api.login(credentials));
        let token = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(AuthError::Cancelled),
            outcome = request => match outcome {
                Ok(result) => result?,
                Err(_elapsed) => return Err(AuthError::timed_out()),
            },
        };

        if cancel.is_cancelled() {
            return Err(AuthError::Cancelled);
        }

        let session = Session {
            token,
            username: credentials.username.clone(),
        };
        session::persist_session(&self.store, &session)
            .map_err(|e| AuthError::Storage(format!("{e:#}")))?;
        self.context.mark_authenticated(Some(session.username.clone()));
        Ok(session)
    }
}
