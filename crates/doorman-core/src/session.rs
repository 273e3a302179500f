//! Authenticated session: what gets persisted and who knows about it.
//!
//! The persisted form is two keys in a [`SessionStore`]: `token` (the raw
//! token string) and `user` (a JSON object `{"username": ...}`). The
//! in-process view is a [`SessionContext`], which replaces an ambient
//! "is authenticated" flag with a value that is passed around explicitly.

use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::storage::SessionStore;

/// Storage key for the raw token.
pub const TOKEN_KEY: &str = "token";
/// Storage key for the JSON-encoded [`StoredUser`].
pub const USER_KEY: &str = "user";

/// A token plus the username it was issued for.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub username: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &mask_token(&self.token))
            .field("username", &self.username)
            .finish()
    }
}

/// Payload stored under [`USER_KEY`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUser {
    pub username: String,
}

/// Returns the stored token, treating blank values as absent.
///
/// # Errors
/// Returns an error if the store cannot be read.
pub fn load_token<S: SessionStore + ?Sized>(store: &S) -> Result<Option<String>> {
    let token = store.get(TOKEN_KEY).context("read stored token")?;
    Ok(token.filter(|t| !t.trim().is_empty()))
}

/// Returns the username saved alongside the token, if it can be decoded.
///
/// # Errors
/// Returns an error if the store cannot be read.
pub fn load_username<S: SessionStore + ?Sized>(store: &S) -> Result<Option<String>> {
    let Some(raw) = store.get(USER_KEY).context("read stored user")? else {
        return Ok(None);
    };
    match serde_json::from_str::<StoredUser>(&raw) {
        Ok(user) => Ok(Some(user.username)),
        Err(err) => {
            tracing::warn!(error = %err, "ignoring malformed stored user");
            Ok(None)
        }
    }
}

/// Writes both session keys together. On failure neither key changes, so a
/// half-written session can never restore as authenticated.
///
/// # Errors
/// Returns an error if the keys cannot be written.
pub fn persist_session<S: SessionStore + ?Sized>(store: &S, session: &Session) -> Result<()> {
    let user = serde_json::to_string(&StoredUser {
        username: session.username.clone(),
    })
    .context("serialize stored user")?;

    store
        .set_many(&[(TOKEN_KEY, session.token.as_str()), (USER_KEY, user.as_str())])
        .context("write session")
}

/// Removes both session keys. Returns whether a token was present.
///
/// # Errors
/// Returns an error if the store cannot be written.
pub fn clear_session<S: SessionStore + ?Sized>(store: &S) -> Result<bool> {
    let had_token = store
        .remove(TOKEN_KEY)
        .context("remove session token")?
        .is_some_and(|t| !t.trim().is_empty());
    store.remove(USER_KEY).context("remove session user")?;
    Ok(had_token)
}

/// Masks a token for display, keeping a few characters at each end.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthStatus {
    #[default]
    SignedOut,
    Authenticated {
        username: Option<String>,
    },
}

impl AuthStatus {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthStatus::Authenticated { .. })
    }
}

/// Shared authentication status.
///
/// Cloning yields another handle onto the same status. All writes go through
/// [`SessionContext::mark_authenticated`] and [`SessionContext::mark_signed_out`].
#[derive(Debug, Clone)]
pub struct SessionContext {
    tx: Arc<watch::Sender<AuthStatus>>,
}

impl SessionContext {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AuthStatus::SignedOut);
        Self { tx: Arc::new(tx) }
    }

    pub fn status(&self) -> AuthStatus {
        self.tx.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_authenticated()
    }

    pub fn mark_authenticated(&self, username: Option<String>) {
        self.tx.send_replace(AuthStatus::Authenticated { username });
    }

    pub fn mark_signed_out(&self) {
        self.tx.send_replace(AuthStatus::SignedOut);
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn alice() -> Session {
        Session {
            token: "abc".to_string(),
            username: "alice".to_string(),
        }
    }

    #[test]
    fn test_persist_writes_token_and_user_json() {
        let store = MemoryStore::new();
        persist_session(&store, &alice()).unwrap();

        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("abc"));
        assert_eq!(
            store.get(USER_KEY).unwrap().as_deref(),
            Some(r#"{"username":"alice"}"#)
        );
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_load_token_ignores_blank_values() {
        let store = MemoryStore::new();
        assert_eq!(load_token(&store).unwrap(), None);

        store.set(TOKEN_KEY, "  ").unwrap();
        assert_eq!(load_token(&store).unwrap(), None);

        store.set(TOKEN_KEY, "abc").unwrap();
        assert_eq!(load_token(&store).unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn test_load_username_tolerates_garbage() {
        let store = MemoryStore::new();
        store.set(USER_KEY, "not json").unwrap();
        assert_eq!(load_username(&store).unwrap(), None);

        persist_session(&store, &alice()).unwrap();
        assert_eq!(load_username(&store).unwrap().as_deref(), Some("alice"));
    }

    #[test]
    fn test_clear_session_reports_previous_token() {
        let store = MemoryStore::new();
        assert!(!clear_session(&store).unwrap());

        persist_session(&store, &alice()).unwrap();
        assert!(clear_session(&store).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_mask_token_hides_middle() {
        assert_eq!(mask_token("short"), "*****");
        assert_eq!(mask_token("abcd1234567890wxyz"), "abcd...wxyz");
    }

    #[test]
    fn test_session_debug_does_not_leak_token() {
        let session = Session {
            token: "super-secret-token-value".to_string(),
            username: "alice".to_string(),
        };
        let debug = format!("{session:?}");
        assert!(!debug.contains("super-secret-token-value"));
        assert!(debug.contains("alice"));
    }

    #[test]
    fn test_context_handles_share_one_status() {
        let context = SessionContext::new();
        let other_handle = context.clone();
        assert!(!context.is_authenticated());

        other_handle.mark_authenticated(Some("alice".to_string()));
        assert_eq!(
            context.status(),
            AuthStatus::Authenticated {
                username: Some("alice".to_string())
            }
        );

        context.mark_signed_out();
        assert!(!other_handle.is_authenticated());
    }
}
