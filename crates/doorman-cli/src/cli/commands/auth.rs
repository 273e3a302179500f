//! Auth command handlers.

use std::io::{self, Read};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use doorman_core::api::{Credentials, HttpAuthClient};
use doorman_core::config::Config;
use doorman_core::error::GENERIC_MESSAGE;
use doorman_core::login::{Authenticator, LoginView, Route};
use doorman_core::session::{self, AuthStatus, SessionContext};
use doorman_core::storage::FileStore;
use doorman_tui::{Exit, RouteRecorder};
use tracing::info;

/// How `doorman login` collects credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginMode {
    /// Full-screen login form.
    Interactive,
    /// Username from the command line, password read from stdin.
    PasswordStdin { username: String },
}

type HttpAuthenticator = Authenticator<HttpAuthClient, FileStore>;

fn authenticator(config: &Config) -> Result<HttpAuthenticator> {
    let api = HttpAuthClient::from_config(config)?;
    Ok(
        Authenticator::new(api, FileStore::open_default(), SessionContext::new())
            .with_timeout(config.request_timeout()),
    )
}

pub async fn login(config: &Config, mode: LoginMode) -> Result<()> {
    match mode {
        LoginMode::Interactive => login_interactive(config),
        LoginMode::PasswordStdin { username } => login_with_stdin(config, username).await,
    }
}

fn login_interactive(config: &Config) -> Result<()> {
    let auth = Arc::new(authenticator(config)?);
    let exit = doorman_tui::run_login_form(Arc::clone(&auth), &config.api_endpoint)?;
    report_exit(config, &auth, exit);
    Ok(())
}

async fn login_with_stdin(config: &Config, username: String) -> Result<()> {
    let mut view = LoginView::new(authenticator(config)?, RouteRecorder::default());
    if !view.mount()? {
        report_exit(config, view.authenticator(), Exit::Restored);
        return Ok(());
    }

    let password = read_password_stdin()?;
    if let Err(err) = view.submit_with(Credentials::new(username, password)).await {
        let message = err
            .user_message()
            .unwrap_or(GENERIC_MESSAGE)
            .to_string();
        return Err(anyhow!(message));
    }

    let exit = view
        .navigator()
        .destination()
        .map_or(Exit::Quit, |(route, replace)| Exit::Navigated { route, replace });
    report_exit(config, view.authenticator(), exit);
    Ok(())
}

/// Reads the whole of stdin, dropping only the trailing line break.
fn read_password_stdin() -> Result<String> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read password from stdin")?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

fn signed_in_username(auth: &HttpAuthenticator) -> String {
    match auth.context().status() {
        AuthStatus::Authenticated {
            username: Some(username),
        } => username,
        AuthStatus::Authenticated { username: None } | AuthStatus::SignedOut => {
            "unknown user".to_string()
        }
    }
}

fn report_exit(config: &Config, auth: &HttpAuthenticator, exit: Exit) {
    match exit {
        Exit::Restored => {
            println!("Already logged in as {}.", signed_in_username(auth));
            println!("Redirecting to {}", Route::Landing.path(config));
        }
        Exit::Navigated {
            route: Route::Landing,
            ..
        } => {
            println!("✓ Logged in as {}", signed_in_username(auth));
            println!("  Session saved to: {}", auth.store().path().display());
            println!("Redirecting to {}", Route::Landing.path(config));
        }
        Exit::Navigated { route, .. } => {
            println!("Redirecting to {}", route.path(config));
        }
        Exit::Quit => println!("Login cancelled."),
    }
}

pub fn logout() -> Result<()> {
    let store = FileStore::open_default();
    if session::clear_session(&store)? {
        info!("logged out");
        println!("✓ Logged out");
        println!("  Session removed from: {}", store.path().display());
    } else {
        println!("Not logged in (no session found).");
    }
    Ok(())
}

pub fn status() -> Result<()> {
    let store = FileStore::open_default();
    let Some(token) = session::load_token(&store)? else {
        println!("Not logged in.");
        return Ok(());
    };

    let username = session::load_username(&store)?;
    println!(
        "Logged in as {}",
        username.as_deref().unwrap_or("unknown user")
    );
    println!("  Token: {}", session::mask_token(&token));
    println!("  Storage: {}", store.path().display());
    Ok(())
}
