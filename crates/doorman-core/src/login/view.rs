use anyhow::Result;
use tokio_util::sync::CancellationToken;

use super::{Authenticator, LoginForm, Navigator, Route};
use crate::api::{AuthApi, Credentials};
use crate::error::AuthError;
use crate::session::Session;
use crate::storage::SessionStore;

/// Username/password login component.
///
/// Owns the form state and drives it through one submission at a time,
/// sending the user to [`Route::Landing`] once a session exists.
pub struct LoginView<A, S, N> {
    form: LoginForm,
    auth: Authenticator<A, S>,
    navigator: N,
    cancel: CancellationToken,
}

impl<A: AuthApi, S: SessionStore, N: Navigator> LoginView<A, S, N> {
    pub fn new(auth: Authenticator<A, S>, navigator: N) -> Self {
        Self {
            form: LoginForm::new(),
            auth,
            navigator,
            cancel: CancellationToken::new(),
        }
    }

    pub fn form(&self) -> &LoginForm {
        &self.form
    }

    pub fn authenticator(&self) -> &Authenticator<A, S> {
        &self.auth
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Token that aborts the outstanding (or next) submission when cancelled.
    ///
    /// Each token ends one submission: once a submission has observed the
    /// cancel, the view switches to a fresh token, so call this again before
    /// the next one.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs once before the form is shown.
    ///
    /// With a stored session this redirects to the landing route (replacing
    /// history) and returns `false`: the form must not be rendered.
    ///
    /// # Errors
    /// Returns an error if durable storage cannot be read.
    pub fn mount(&mut self) -> Result<bool> {
        if self.auth.restore()? {
            self.navigator.navigate(Route::Landing, true);
            return Ok(false);
        }
        Ok(true)
    }

    /// Submits whatever is currently in the form.
    ///
    /// # Errors
    /// Returns the `AuthError` for the failed attempt; the matching message is
    /// also left in the form.
    pub async fn submit(&mut self) -> Result<Session, AuthError> {
        let credentials = self.form.begin_submit()?;
        let result = self.auth.authenticate(&credentials, &self.cancel).await;
        if self.cancel.is_cancelled() {
            self.cancel = CancellationToken::new();
        }
        self.form.finish_submit(&result);
        if result.is_ok() {
            self.navigator.navigate(Route::Landing, true);
        }
        result
    }

    /// Fills the form with `credentials` and submits it.
    ///
    /// # Errors
    /// See [`LoginView::submit`].
    pub async fn submit_with(&mut self, credentials: Credentials) -> Result<Session, AuthError> {
        self.form.username = credentials.username;
        self.form.password = credentials.password;
        self.submit().await
    }

    pub fn toggle_password_visibility(&mut self) {
        self.form.toggle_password_visibility();
    }

    /// Follows the "Create an account" link.
    pub fn open_register(&mut self) {
        self.navigator.navigate(Route::Register, false);
    }
}

#[cfg(test)]
mod tests {
    use super::super::authenticator::tests::StubApi;
    use super::*;
    use crate::error::{
        BAD_REQUEST_MESSAGE, REJECTED_MESSAGE, SERVER_ERROR_MESSAGE, UNEXPECTED_RESPONSE_MESSAGE,
        VALIDATION_MESSAGE,
    };
    use crate::login::Phase;
    use crate::session::{SessionContext, TOKEN_KEY, USER_KEY};
    use crate::storage::MemoryStore;

    #[derive(Debug, Default)]
    struct RecordingNavigator {
        visits: Vec<(Route, bool)>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&mut self, route: Route, replace: bool) {
            self.visits.push((route, replace));
        }
    }

    fn view(api: StubApi) -> LoginView<StubApi, MemoryStore, RecordingNavigator> {
        let auth = Authenticator::new(api, MemoryStore::new(), SessionContext::new());
        LoginView::new(auth, RecordingNavigator::default())
    }

    #[tokio::test]
    async fn test_alice_with_valid_password_lands_on_dashboard() {
        let mut view = view(StubApi::token("abc"));
        assert!(view.mount().unwrap());

        let session = view
            .submit_with(Credentials::new("alice", "secret"))
            .await
            .unwrap();

        assert_eq!(session.token, "abc");
        let store = view.authenticator().store();
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("abc"));
        assert_eq!(
            store.get(USER_KEY).unwrap().as_deref(),
            Some(r#"{"username":"alice"}"#)
        );
        assert!(view.authenticator().context().is_authenticated());
        assert_eq!(view.navigator().visits, vec![(Route::Landing, true)]);
        assert!(!view.form().is_loading());
        assert_eq!(view.form().phase(), Phase::Redirecting);
    }

    #[tokio::test]
    async fn test_alice_with_wrong_password_sees_rejection() {
        let mut view = view(StubApi::respond(Err(AuthError::Rejected)));

        let err = view
            .submit_with(Credentials::new("alice", "wrong"))
            .await
            .unwrap_err();

        assert_eq!(err, AuthError::Rejected);
        assert_eq!(view.form().error(), Some(REJECTED_MESSAGE));
        assert!(view.authenticator().store().is_empty());
        assert!(view.navigator().visits.is_empty());
        assert!(!view.form().is_loading());
    }

    #[tokio::test]
    async fn test_each_failure_sets_its_message_and_clears_loading() {
        let cases = [
            (AuthError::BadRequest, BAD_REQUEST_MESSAGE),
            (AuthError::Server, SERVER_ERROR_MESSAGE),
            (AuthError::UnexpectedResponse, UNEXPECTED_RESPONSE_MESSAGE),
        ];
        for (err, message) in cases {
            let mut view = view(StubApi::respond(Err(err)));
            let _ = view.submit_with(Credentials::new("alice", "secret")).await;

            assert_eq!(view.form().error(), Some(message));
            assert!(!view.form().is_loading());
            assert!(view.authenticator().store().is_empty());
            assert!(!view.authenticator().context().is_authenticated());
        }
    }

    #[tokio::test]
    async fn test_blank_credentials_never_reach_the_api() {
        for (username, password) in [("", "secret"), ("alice", ""), ("   ", "  ")] {
            let mut view = view(StubApi::token("abc"));

            let err = view
                .submit_with(Credentials::new(username, password))
                .await
                .unwrap_err();

            assert_eq!(err, AuthError::Validation);
            assert_eq!(view.form().error(), Some(VALIDATION_MESSAGE));
            assert_eq!(view.authenticator().api().calls(), 0);
            assert!(!view.form().is_loading());
        }
    }

    #[tokio::test]
    async fn test_one_request_per_submission() {
        let mut view = view(StubApi::respond(Err(AuthError::Server)));

        let _ = view.submit_with(Credentials::new("alice", "secret")).await;
        assert_eq!(view.authenticator().api().calls(), 1);

        let _ = view.submit().await;
        assert_eq!(view.authenticator().api().calls(), 2);
    }

    #[test]
    fn test_mount_with_stored_token_skips_form() {
        let mut view = view(StubApi::token("abc"));
        view.authenticator().store().set(TOKEN_KEY, "xyz").unwrap();

        assert!(!view.mount().unwrap());
        assert_eq!(view.navigator().visits, vec![(Route::Landing, true)]);
        assert!(view.authenticator().context().is_authenticated());
    }

    #[test]
    fn test_register_link_pushes_history() {
        let mut view = view(StubApi::token("abc"));
        view.open_register();
        assert_eq!(view.navigator().visits, vec![(Route::Register, false)]);
    }

    #[tokio::test]
    async fn test_cancelled_submission_stays_on_form() {
        let mut view = view(StubApi::token("abc"));
        view.cancellation().cancel();

        let err = view
            .submit_with(Credentials::new("alice", "secret"))
            .await
            .unwrap_err();

        assert_eq!(err, AuthError::Cancelled);
        assert_eq!(view.form().error(), None);
        assert_eq!(view.form().phase(), Phase::Idle);
        assert!(view.navigator().visits.is_empty());
        assert!(view.authenticator().store().is_empty());
    }

    #[tokio::test]
    async fn test_submit_after_cancel_goes_through() {
        let mut view = view(StubApi::token("abc"));
        let stale = view.cancellation();
        stale.cancel();
        let err = view
            .submit_with(Credentials::new("alice", "secret"))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::Cancelled);

        let session = view.submit().await.unwrap();

        assert_eq!(session.token, "abc");
        assert!(!view.cancellation().is_cancelled());
        assert_eq!(view.navigator().visits, vec![(Route::Landing, true)]);
        assert_eq!(
            view.authenticator().store().get(TOKEN_KEY).unwrap().as_deref(),
            Some("abc")
        );
    }
}
