//! The login view.
//!
//! Split in three layers so the terminal UI can drive the same logic from
//! its reducer:
//! - `form`: pure form state and its transitions (no I/O).
//! - `authenticator`: the request, session persistence and context update.
//! - `view`: `LoginView`, which composes both with a `Navigator`.

mod authenticator;
mod form;
mod view;

pub use authenticator::Authenticator;
pub use form::{LoginForm, Phase};
pub use view::LoginView;

use crate::config::Config;

/// Destinations the login view can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    /// Authenticated post-login destination.
    Landing,
    Register,
}

impl Route {
    /// Path of this route under `config`.
    pub fn path(self, config: &Config) -> &str {
        match self {
            Route::Login => "/",
            Route::Landing => &config.landing_route,
            Route::Register => &config.register_route,
        }
    }
}

/// Router seam. `replace` means the current entry is overwritten, so going
/// back does not return to the login view.
pub trait Navigator {
    fn navigate(&mut self, route: Route, replace: bool);
}

impl<N: Navigator + ?Sized> Navigator for &mut N {
    fn navigate(&mut self, route: Route, replace: bool) {
        (**self).navigate(route, replace);
    }
}
