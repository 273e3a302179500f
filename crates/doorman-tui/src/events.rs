//! UI event types.
//!
//! All external inputs (terminal, ticks, async results) are converted to
//! `UiEvent` before being processed by the reducer.
//!
//! ## Task Lifecycle Events
//!
//! The login request follows a uniform lifecycle:
//! - The reducer reserves the task and creates its cancellation token
//!   before emitting `UiEffect::SpawnLogin`
//! - The runtime emits `UiEvent::LoginFinished` with the result when done
//! - The reducer is the only place that mutates `TaskState`

use crossterm::event::Event as CrosstermEvent;
use doorman_core::AuthError;
use doorman_core::session::Session;

use crate::common::TaskCompleted;

#[derive(Debug)]
pub enum UiEvent {
    /// Raw terminal input (keys, paste, resize).
    Terminal(CrosstermEvent),
    /// Animation cadence.
    Tick,
    LoginFinished(TaskCompleted<Result<Session, AuthError>>),
}
