//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They represent I/O and task spawning only (no direct UI mutations).
//!
//! Cancellation is initiated from the reducer via `UiEffect::CancelTask`.
//! The runtime executes it by calling `token.cancel()` on the provided token.

use doorman_core::api::Credentials;
use doorman_core::login::Route;
use tokio_util::sync::CancellationToken;

use crate::common::TaskId;

#[derive(Debug)]
pub enum UiEffect {
    /// Spawn the login request for a submission the reducer accepted.
    ///
    /// `cancel` is already stored in `TaskState`, so a cancel issued before
    /// the task starts still reaches it.
    SpawnLogin {
        task: TaskId,
        credentials: Credentials,
        cancel: CancellationToken,
    },

    /// Cancel a running task (no-op when the token is absent).
    CancelTask { token: Option<CancellationToken> },

    /// Leave the login view.
    Navigate { route: Route, replace: bool },
}
