//! TUI state.

use doorman_core::login::LoginForm;

use crate::common::{TaskSeq, TaskState};

/// Focusable elements of the form, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Username,
    Password,
    Submit,
    Register,
}

impl Focus {
    const ORDER: [Focus; 4] = [
        Focus::Username,
        Focus::Password,
        Focus::Submit,
        Focus::Register,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    #[must_use]
    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

#[derive(Debug, Default)]
pub struct AppState {
    pub form: LoginForm,
    pub focus: Focus,
    pub login_task: TaskState,
    pub task_seq: TaskSeq,
    pub should_quit: bool,
    pub spinner_frame: usize,
    /// Shown in the footer so the user knows where credentials go.
    pub endpoint: String,
}

impl AppState {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Text field under focus, if any.
    pub fn focused_field_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            Focus::Username => Some(&mut self.form.username),
            Focus::Password => Some(&mut self.form.password),
            Focus::Submit | Focus::Register => None,
        }
    }
}
