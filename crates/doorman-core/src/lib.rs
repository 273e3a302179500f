//! Core of the doorman login client.
//!
//! Holds everything that is independent of how the login form is drawn:
//! configuration, the durable session store, the HTTP auth client and the
//! `LoginView` component that ties them together.

pub mod api;
pub mod config;
pub mod error;
pub mod login;
pub mod session;
pub mod storage;

pub use error::AuthError;
