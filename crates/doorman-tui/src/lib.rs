//! Terminal login form for doorman.
//!
//! Elm-style layout: `state` holds everything, `update` is the reducer,
//! `render` draws, and `runtime` owns the terminal and executes effects.

pub mod common;
pub mod effects;
pub mod events;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stdin, stdout};
use std::sync::Arc;

use anyhow::{Result, bail};
use doorman_core::api::AuthApi;
use doorman_core::login::{Authenticator, Navigator, Route};
use doorman_core::storage::SessionStore;
use tracing::debug;

pub use runtime::TuiRuntime;

/// How the login form ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// A stored session skipped the form and went to the landing route.
    Restored,
    Navigated { route: Route, replace: bool },
    Quit,
}

/// Navigator that remembers where the form asked to go.
#[derive(Debug, Default)]
pub struct RouteRecorder {
    destination: Option<(Route, bool)>,
}

impl RouteRecorder {
    pub fn destination(&self) -> Option<(Route, bool)> {
        self.destination
    }

    pub fn into_exit(self) -> Exit {
        match self.destination {
            Some((route, replace)) => Exit::Navigated { route, replace },
            None => Exit::Quit,
        }
    }
}

impl Navigator for RouteRecorder {
    fn navigate(&mut self, route: Route, replace: bool) {
        debug!(?route, replace, "navigate");
        self.destination = Some((route, replace));
    }
}

/// Shows the login form until the user logs in, follows the register link
/// or quits.
///
/// A stored session skips the form entirely and returns [`Exit::Restored`],
/// a redirect to the landing route with history replaced. Must be called
/// inside a tokio runtime.
///
/// # Errors
/// Returns an error if storage cannot be read, if there is no interactive
/// terminal, or if terminal I/O fails.
pub fn run_login_form<A, S>(auth: Arc<Authenticator<A, S>>, endpoint: &str) -> Result<Exit>
where
    A: AuthApi + 'static,
    S: SessionStore + 'static,
{
    if auth.restore()? {
        debug!("stored session found, skipping login form");
        return Ok(Exit::Restored);
    }

    if !stdin().is_terminal() || !stdout().is_terminal() {
        bail!(
            "The login form needs an interactive terminal.\n\
             Use `doorman login --username <name> --password-stdin` instead."
        );
    }

    let runtime = TuiRuntime::new(auth, endpoint)?;
    Ok(runtime.run()?.into_exit())
}
