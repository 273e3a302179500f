//! TUI runtime - owns terminal, runs event loop, executes effects.
//!
//! This is the "Elm runtime" boundary: all side effects happen here.
//! The reducer stays pure and produces effects; this module executes them.
//!
//! Async results come back through an inbox channel that the loop drains
//! every frame, so the reducer never awaits anything.

use std::io::Stdout;
use std::mem;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use doorman_core::api::{AuthApi, Credentials};
use doorman_core::login::{Authenticator, Navigator};
use doorman_core::storage::SessionStore;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::common::{TaskCompleted, TaskId};
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::{RouteRecorder, render, terminal, update};

/// Tick cadence while a request is in flight (spinner animation).
pub const FRAME_DURATION: Duration = Duration::from_millis(80);

/// Poll duration when idle.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(250);

type UiEventSender = mpsc::UnboundedSender<UiEvent>;
type UiEventReceiver = mpsc::UnboundedReceiver<UiEvent>;

/// Full-screen login runtime.
///
/// Owns the terminal and state. Terminal state is restored on drop.
pub struct TuiRuntime<A, S> {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pub state: AppState,
    auth: Arc<Authenticator<A, S>>,
    navigator: RouteRecorder,
    inbox_tx: UiEventSender,
    inbox_rx: UiEventReceiver,
    last_tick: Instant,
}

impl<A, S> TuiRuntime<A, S>
where
    A: AuthApi + 'static,
    S: SessionStore + 'static,
{
    /// Enters the alternate screen. Must be called inside a tokio runtime.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be set up.
    pub fn new(auth: Arc<Authenticator<A, S>>, endpoint: impl Into<String>) -> Result<Self> {
        // Set up panic hook BEFORE entering alternate screen
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

        Ok(Self {
            terminal,
            state: AppState::new(endpoint),
            auth,
            navigator: RouteRecorder::default(),
            inbox_tx,
            inbox_rx,
            last_tick: Instant::now(),
        })
    }

    /// Runs until the user quits or the form navigates away.
    ///
    /// # Errors
    /// Returns an error if drawing or reading terminal input fails.
    pub fn run(mut self) -> Result<RouteRecorder> {
        self.event_loop()?;
        Ok(mem::take(&mut self.navigator))
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.state.should_quit && self.navigator.destination().is_none() {
            if dirty {
                self.terminal.draw(|frame| render::render(&self.state, frame))?;
            }

            let events = self.collect_events()?;
            dirty = !events.is_empty();
            for event in events {
                let effects = update::update(&mut self.state, event);
                self.execute_effects(effects);
            }
        }

        Ok(())
    }

    /// Collects events from the inbox and the terminal, then a Tick if due.
    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        let tick_interval = if self.state.login_task.is_running() {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        let poll_duration = if events.is_empty() {
            tick_interval.saturating_sub(self.last_tick.elapsed())
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::SpawnLogin {
                task,
                credentials,
                cancel,
            } => self.spawn_login(task, credentials, cancel),
            UiEffect::CancelTask { token } => {
                if let Some(cancel) = token {
                    cancel.cancel();
                }
            }
            UiEffect::Navigate { route, replace } => self.navigator.navigate(route, replace),
        }
    }

    /// Spawns the request; its result comes back as `LoginFinished`.
    fn spawn_login(&self, id: TaskId, credentials: Credentials, cancel: CancellationToken) {
        let tx = self.inbox_tx.clone();
        debug!(task = id.0, "spawning login request");
        let auth = Arc::clone(&self.auth);
        tokio::spawn(async move {
            let result = auth.authenticate(&credentials, &cancel).await;
            let _ = tx.send(UiEvent::LoginFinished(TaskCompleted { id, result }));
        });
    }
}

impl<A, S> Drop for TuiRuntime<A, S> {
    fn drop(&mut self) {
        // Leaving the view must not leave a request running behind it.
        if let Some(cancel) = self.state.login_task.cancel.take() {
            cancel.cancel();
        }
        let _ = terminal::restore_terminal();
    }
}
