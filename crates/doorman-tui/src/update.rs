//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(state, event)`
//! and executes the returned effects.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use doorman_core::AuthError;
use doorman_core::login::Route;
use doorman_core::session::Session;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::common::TaskCompleted;
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::{AppState, Focus};

/// The main reducer function.
///
/// Takes the current state and an event, mutates state, and returns effects
/// for the runtime to execute.
pub fn update(state: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            if state.form.is_loading() {
                state.spinner_frame = state.spinner_frame.wrapping_add(1);
            }
            vec![]
        }
        UiEvent::Terminal(Event::Key(key)) if key.kind != KeyEventKind::Release => {
            handle_key(state, key)
        }
        UiEvent::Terminal(Event::Paste(text)) => {
            insert_text(state, &text);
            vec![]
        }
        UiEvent::Terminal(_) => vec![],
        UiEvent::LoginFinished(completed) => handle_login_finished(state, completed),
    }
}

fn handle_key(state: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Esc => quit(state),
        KeyCode::Char('c') if ctrl => quit(state),
        KeyCode::Char('v') if ctrl => {
            state.form.toggle_password_visibility();
            vec![]
        }
        KeyCode::Char('r') if ctrl => open_register(state),
        KeyCode::Tab | KeyCode::Down => {
            state.focus = state.focus.next();
            vec![]
        }
        KeyCode::BackTab | KeyCode::Up => {
            state.focus = state.focus.prev();
            vec![]
        }
        KeyCode::Enter => match state.focus {
            Focus::Register => open_register(state),
            Focus::Username | Focus::Password | Focus::Submit => submit(state),
        },
        KeyCode::Backspace => {
            if let Some(field) = editable_field(state) {
                field.pop();
            }
            vec![]
        }
        KeyCode::Char(c) if !ctrl => {
            if let Some(field) = editable_field(state) {
                field.push(c);
            }
            vec![]
        }
        _ => vec![],
    }
}

/// Fields are frozen while a request is in flight or the view is leaving.
fn editable_field(state: &mut AppState) -> Option<&mut String> {
    if state.form.is_loading() || state.login_task.is_running() {
        return None;
    }
    state.focused_field_mut()
}

fn insert_text(state: &mut AppState, text: &str) {
    if let Some(field) = editable_field(state) {
        // Pasted newlines would otherwise end up inside the credential.
        field.extend(text.chars().filter(|c| !c.is_control()));
    }
}

fn submit(state: &mut AppState) -> Vec<UiEffect> {
    match state.form.begin_submit() {
        Ok(credentials) => {
            let task = state.task_seq.next_id();
            let cancel = CancellationToken::new();
            state.login_task.reserve(task, cancel.clone());
            state.spinner_frame = 0;
            vec![UiEffect::SpawnLogin {
                task,
                credentials,
                cancel,
            }]
        }
        Err(err) => {
            debug!(kind = err.kind(), "submit rejected");
            vec![]
        }
    }
}

fn handle_login_finished(
    state: &mut AppState,
    completed: TaskCompleted<Result<Session, AuthError>>,
) -> Vec<UiEffect> {
    if !state.login_task.finish_if_active(completed.id) {
        debug!(task = completed.id.0, "ignoring stale login result");
        return vec![];
    }

    state.form.finish_submit(&completed.result);
    match completed.result {
        Ok(_) => vec![UiEffect::Navigate {
            route: Route::Landing,
            replace: true,
        }],
        Err(_) => {
            if state.focus == Focus::Submit {
                state.focus = Focus::Password;
            }
            vec![]
        }
    }
}

fn open_register(state: &mut AppState) -> Vec<UiEffect> {
    let mut effects = cancel_login(state);
    effects.push(UiEffect::Navigate {
        route: Route::Register,
        replace: false,
    });
    effects
}

fn quit(state: &mut AppState) -> Vec<UiEffect> {
    state.should_quit = true;
    cancel_login(state)
}

fn cancel_login(state: &mut AppState) -> Vec<UiEffect> {
    if !state.login_task.is_running() {
        return vec![];
    }
    let token = state.login_task.cancel.take();
    state.login_task.clear();
    vec![UiEffect::CancelTask { token }]
}
