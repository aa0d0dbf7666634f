//! TUI runtime - owns terminal, runs event loop, executes effects.
//!
//! This is the "Elm runtime" boundary: all side effects happen here.
//! The reducer stays pure and produces effects; this module executes them.
//!
//! Backend calls are spawned on tokio with the task id the reducer assigned.
//! Their results come back through the inbox wrapped in
//! `UiEvent::TaskCompleted`, so the reducer can drop results for screens that
//! are no longer mounted.

mod handlers;
mod inbox;

use std::future::Future;
use std::io::Stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use inbox::{UiEventReceiver, UiEventSender};
use megablog_core::backend::Backend;
use megablog_core::config::Config;
use megablog_core::submit::SubmitOptions;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;

use crate::common::{TaskCompleted, TaskId, TaskKind};
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::{render, terminal, update};

/// Tick cadence while tasks are running or the user is typing.
pub const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Tick cadence when nothing is happening.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(100);

/// Full-screen TUI runtime.
///
/// Owns the terminal and state. Runs the event loop and executes effects.
/// Terminal state is restored on drop and on panic.
pub struct TuiRuntime<B: Backend> {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pub state: AppState,
    backend: Arc<B>,
    submit_options: SubmitOptions,
    /// Inbox sender - spawned handlers send events here.
    inbox_tx: UiEventSender,
    /// Inbox receiver - runtime drains this each iteration.
    inbox_rx: UiEventReceiver,
    last_tick: Instant,
    last_terminal_event: Instant,
}

impl<B: Backend> TuiRuntime<B> {
    /// Creates a new TUI runtime and enters the alternate screen.
    pub fn new(config: &Config, backend: Arc<B>) -> Result<Self> {
        // Set up panic hook BEFORE entering alternate screen
        terminal::install_panic_hook();

        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

        let now = Instant::now();
        Ok(Self {
            terminal,
            state: AppState::new(config.editor.clone()),
            backend,
            submit_options: SubmitOptions {
                compensate_failed_uploads: config.editor.compensate_failed_uploads,
            },
            inbox_tx,
            inbox_rx,
            last_tick: now,
            last_terminal_event: now,
        })
    }

    /// Runs the main event loop.
    pub fn run(&mut self) -> Result<()> {
        terminal::enable_input_features()?;

        let effects = update::startup(&mut self.state);
        self.execute_effects(effects);
        let result = self.event_loop();

        let _ = terminal::disable_input_features();
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.state.should_quit {
            let events = self.collect_events()?;

            for event in events {
                if matches!(&event, UiEvent::Terminal(_)) {
                    self.last_terminal_event = Instant::now();
                }
                // Renders are batched to the tick cadence.
                if matches!(&event, UiEvent::Tick) {
                    dirty = true;
                }
                let effects = update::update(&mut self.state, event);
                self.execute_effects(effects);
            }

            if dirty {
                self.terminal.draw(|frame| {
                    render::render(&self.state, frame);
                })?;
                dirty = false;
            }
        }

        Ok(())
    }

    /// Collects events from the inbox and the terminal, then emits a Tick
    /// once the tick interval elapsed.
    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        let recent_terminal_activity = self.last_terminal_event.elapsed() < IDLE_POLL_DURATION;
        let tick_interval = if self.state.tasks.is_any_running() || recent_terminal_activity {
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

    /// Spawns a backend task and reports its result as `TaskCompleted`.
    fn spawn_task<Fut>(&self, kind: TaskKind, id: TaskId, fut: Fut)
    where
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            let inner = fut.await;
            let completed = TaskCompleted {
                id,
                result: Box::new(inner),
            };
            let _ = tx.send(UiEvent::TaskCompleted { kind, completed });
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        let backend = Arc::clone(&self.backend);
        match effect {
            UiEffect::Quit => {
                self.state.should_quit = true;
            }
            UiEffect::OpenBrowser { url } => {
                if let Err(e) = open::that(&url) {
                    tracing::warn!(%url, "failed to open browser: {e}");
                }
            }
            UiEffect::ResolveSession { task } => {
                self.spawn_task(
                    TaskKind::Session,
                    task,
                    handlers::resolve_session(backend),
                );
            }
            UiEffect::LoadFeed { task, feed } => {
                self.spawn_task(TaskKind::Feed, task, handlers::load_feed(backend, feed));
            }
            UiEffect::LoadPost { task, id } => {
                self.spawn_task(TaskKind::PostLoad, task, handlers::load_post(backend, id));
            }
            UiEffect::Login { task, credentials } => {
                self.spawn_task(TaskKind::Auth, task, handlers::login(backend, credentials));
            }
            UiEffect::Signup { task, account } => {
                self.spawn_task(TaskKind::Auth, task, handlers::signup(backend, account));
            }
            UiEffect::Logout { task } => {
                self.spawn_task(TaskKind::Logout, task, handlers::logout(backend));
            }
            UiEffect::SubmitPost {
                task,
                draft,
                target,
            } => {
                let options = self.submit_options;
                self.spawn_task(
                    TaskKind::Submit,
                    task,
                    handlers::submit_post(backend, draft, target, options),
                );
            }
            UiEffect::DeletePost { task, post } => {
                self.spawn_task(TaskKind::Delete, task, handlers::delete_post(backend, post));
            }
        }
    }
}

impl<B: Backend> Drop for TuiRuntime<B> {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}
