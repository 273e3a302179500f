//! Login form state.
//!
//! State machine: `Idle -> Submitting -> {Idle (with error), Redirecting}`.
//! Only `begin_submit` enters `Submitting` and only `finish_submit` leaves it.

use crate::api::Credentials;
use crate::error::AuthError;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Redirecting,
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    error: Option<String>,
    password_visible: bool,
    loading: bool,
    phase: Phase,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_password_visible(&self) -> bool {
        self.password_visible
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn toggle_password_visibility(&mut self) {
        self.password_visible = !self.password_visible;
    }

    /// Starts a submission.
    ///
    /// Rejects with `InFlight` (state untouched) unless the form is idle.
    /// Otherwise clears the previous error, validates, and on success moves
    /// to `Submitting` and returns the credentials to send.
    ///
    /// # Errors
    /// `InFlight` when not idle, `Validation` when a field is blank.
    pub fn begin_submit(&mut self) -> Result<Credentials, AuthError> {
        if self.phase != Phase::Idle {
            return Err(AuthError::InFlight);
        }

        self.error = None;
        let credentials = Credentials::new(self.username.clone(), self.password.clone());
        if !credentials.is_complete() {
            let err = AuthError::Validation;
            self.error = err.user_message().map(str::to_string);
            return Err(err);
        }

        self.loading = true;
        self.phase = Phase::Submitting;
        Ok(credentials)
    }

    /// Completes a submission started by `begin_submit`.
    ///
    /// Always clears `loading`. Success moves to `Redirecting` and drops the
    /// typed credentials; failure returns to `Idle` with the error's message.
    pub fn finish_submit(&mut self, result: &Result<Session, AuthError>) {
        if self.phase != Phase::Submitting {
            return;
        }

        self.loading = false;
        match result {
            Ok(_) => {
                self.phase = Phase::Redirecting;
                self.error = None;
                self.username.clear();
                self.password.clear();
            }
            Err(err) => {
                self.phase = Phase::Idle;
                self.error = err.user_message().map(str::to_string);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GENERIC_MESSAGE, REJECTED_MESSAGE, VALIDATION_MESSAGE};

    fn filled(username: &str, password: &str) -> LoginForm {
        LoginForm {
            username: username.to_string(),
            password: password.to_string(),
            ..LoginForm::default()
        }
    }

    fn session() -> Session {
        Session {
            token: "abc".to_string(),
            username: "alice".to_string(),
        }
    }

    #[test]
    fn test_blank_fields_fail_validation_without_loading() {
        for (username, password) in [("", ""), ("alice", ""), ("", "secret"), ("  ", "\t")] {
            let mut form = filled(username, password);
            assert_eq!(form.begin_submit(), Err(AuthError::Validation));
            assert_eq!(form.error(), Some(VALIDATION_MESSAGE));
            assert!(!form.is_loading());
            assert_eq!(form.phase(), Phase::Idle);
        }
    }

    #[test]
    fn test_begin_submit_enters_submitting() {
        let mut form = filled("alice", "secret");
        let credentials = form.begin_submit().unwrap();

        assert_eq!(credentials, Credentials::new("alice", "secret"));
        assert!(form.is_loading());
        assert_eq!(form.phase(), Phase::Submitting);
    }

    #[test]
    fn test_second_submit_while_in_flight_is_rejected() {
        let mut form = filled("alice", "secret");
        form.begin_submit().unwrap();

        assert_eq!(form.begin_submit(), Err(AuthError::InFlight));
        assert!(form.is_loading());
        assert_eq!(form.phase(), Phase::Submitting);
    }

    #[test]
    fn test_begin_submit_clears_previous_error() {
        let mut form = filled("alice", "");
        let _ = form.begin_submit();
        assert!(form.error().is_some());

        form.password = "secret".to_string();
        form.begin_submit().unwrap();
        assert_eq!(form.error(), None);
    }

    #[test]
    fn test_failure_returns_to_idle_with_message() {
        let mut form = filled("alice", "wrong");
        form.begin_submit().unwrap();
        form.finish_submit(&Err(AuthError::Rejected));

        assert!(!form.is_loading());
        assert_eq!(form.phase(), Phase::Idle);
        assert_eq!(form.error(), Some(REJECTED_MESSAGE));
        assert_eq!(form.password, "wrong");
    }

    #[test]
    fn test_cancellation_returns_to_idle_silently() {
        let mut form = filled("alice", "secret");
        form.begin_submit().unwrap();
        form.finish_submit(&Err(AuthError::Cancelled));

        assert!(!form.is_loading());
        assert_eq!(form.phase(), Phase::Idle);
        assert_eq!(form.error(), None);
    }

    #[test]
    fn test_success_redirects_and_forgets_credentials() {
        let mut form = filled("alice", "secret");
        form.begin_submit().unwrap();
        form.finish_submit(&Ok(session()));

        assert!(!form.is_loading());
        assert_eq!(form.phase(), Phase::Redirecting);
        assert!(form.username.is_empty());
        assert!(form.password.is_empty());
        assert_eq!(form.begin_submit(), Err(AuthError::InFlight));
    }

    #[test]
    fn test_finish_without_begin_is_ignored() {
        let mut form = filled("alice", "secret");
        form.finish_submit(&Err(AuthError::network("boom")));
        assert_eq!(form.error(), None);
        assert_eq!(form.phase(), Phase::Idle);
    }

    #[test]
    fn test_new_error_replaces_old_one() {
        let mut form = filled("alice", "secret");
        form.begin_submit().unwrap();
        form.finish_submit(&Err(AuthError::Rejected));
        form.begin_submit().unwrap();
        form.finish_submit(&Err(AuthError::network("reset")));
        assert_eq!(form.error(), Some(GENERIC_MESSAGE));
    }

    #[test]
    fn test_toggle_password_visibility_only_flips_flag() {
        let mut form = filled("alice", "secret");
        assert!(!form.is_password_visible());
        form.toggle_password_visibility();
        assert!(form.is_password_visible());
        form.toggle_password_visibility();
        assert!(!form.is_password_visible());
        assert_eq!(form.phase(), Phase::Idle);
        assert_eq!(form.error(), None);
    }
}
