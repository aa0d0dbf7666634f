//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.
//!
//! Navigation is also decided here: every route change rebuilds the screen,
//! forgets screen-scoped tasks, attaches the route's guard, and evaluates it.
//! A guard redirect replaces the current route instead of pushing history.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use megablog_core::guard::{GuardOutcome, RouteGuard};
use megablog_core::posts::DeleteOutcome;
use megablog_core::routes::Route;

use crate::common::TaskKind;
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::navigation::{NavTarget, nav_item_for_key};
use crate::screens::{Navigation, Screen, ScreenUpdate};
use crate::state::AppState;

const DELETE_FAILED: &str = "Failed to delete post. Please try again.";

/// The main reducer function.
///
/// Takes the current state and an event, mutates state, and returns effects
/// for the runtime to execute.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            app.spinner_frame = app.spinner_frame.wrapping_add(1);
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(app, term_event),
        UiEvent::TaskCompleted { kind, completed } => {
            if app.tasks.state_mut(kind).finish_if_active(completed.id) {
                update(app, *completed.result)
            } else {
                tracing::debug!(?kind, id = completed.id.0, "dropping stale task result");
                vec![]
            }
        }
        UiEvent::SessionResolved { user } => {
            tracing::info!(signed_in = user.is_some(), "session resolved");
            app.session.resolve(user);
            on_session_changed(app)
        }
        UiEvent::FeedLoaded { result } => {
            if let Err(e) = &result {
                tracing::warn!("feed load failed: {e}");
            }
            if let Screen::Home(list) | Screen::AllPosts(list) = &mut app.screen {
                list.on_loaded(result);
            }
            vec![]
        }
        UiEvent::PostLoaded {
            id,
            post,
            preview_url,
        } => {
            let Some(post) = post else {
                tracing::info!(post_id = %id, "post not found, returning home");
                return navigate(app, Route::Home, false);
            };
            match &mut app.screen {
                Screen::Post(view) if view.id() == id => view.on_loaded(post, preview_url),
                Screen::Editor(editor) => editor.on_loaded(post),
                _ => {}
            }
            vec![]
        }
        UiEvent::AuthFinished { result } => match result {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "signed in");
                app.session.login(user);
                on_session_changed(app)
            }
            Err(message) => {
                match &mut app.screen {
                    Screen::Login(login) => login.on_failed(message),
                    Screen::Signup(signup) => signup.on_failed(message),
                    _ => {}
                }
                vec![]
            }
        },
        UiEvent::LogoutFinished { result } => {
            app.session.logout();
            let effects = on_session_changed(app);
            if let Err(message) = result {
                tracing::warn!("logout failed: {message}");
                app.banner = Some(message);
            }
            effects
        }
        UiEvent::SubmitFinished { result } => match result {
            Ok(route) => navigate(app, route, true),
            Err(message) => {
                if let Screen::Editor(editor) = &mut app.screen {
                    editor.on_submit_failed(message);
                }
                vec![]
            }
        },
        UiEvent::DeleteFinished { outcome } => match outcome {
            DeleteOutcome::Deleted { .. } => navigate(app, Route::Home, false),
            DeleteOutcome::NotDeleted => {
                if let Screen::Post(view) = &mut app.screen {
                    view.on_delete_failed();
                }
                app.banner = Some(DELETE_FAILED.to_string());
                vec![]
            }
        },
    }
}

/// Effects issued once when the runtime starts.
pub fn startup(app: &mut AppState) -> Vec<UiEffect> {
    let task = app.task_seq.next_id();
    app.tasks.state_mut(TaskKind::Session).start(task);
    let mut effects = vec![UiEffect::ResolveSession { task }];
    effects.extend(evaluate_guard(app));
    effects
}

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
        Event::Paste(text) => {
            if app.screen_visible() {
                app.screen.handle_paste(&text);
            }
            vec![]
        }
        _ => vec![],
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return vec![UiEffect::Quit];
    }

    if let KeyCode::F(n) = key.code {
        return match nav_item_for_key(&app.session, n).map(|item| item.target) {
            Some(NavTarget::Go(route)) => navigate(app, route, true),
            Some(NavTarget::Logout) => start_logout(app),
            None => vec![],
        };
    }

    if !app.screen_visible() {
        return match key.code {
            KeyCode::Esc => go_back(app),
            _ => vec![],
        };
    }

    let (screen, mut ctx) = app.screen_and_ctx();
    let ScreenUpdate {
        mut effects,
        navigation,
    } = screen.handle_key(&mut ctx, key);
    match navigation {
        Some(Navigation::To(route)) => effects.extend(navigate(app, route, true)),
        Some(Navigation::Back) => effects.extend(go_back(app)),
        None => {}
    }
    effects
}

fn start_logout(app: &mut AppState) -> Vec<UiEffect> {
    if app.tasks.state(TaskKind::Logout).is_running() {
        return vec![];
    }
    let task = app.task_seq.next_id();
    app.tasks.state_mut(TaskKind::Logout).start(task);
    vec![UiEffect::Logout { task }]
}

fn go_back(app: &mut AppState) -> Vec<UiEffect> {
    match app.history.pop() {
        Some(route) => navigate(app, route, false),
        None => vec![],
    }
}

/// Mounts `route`. `push` records the current route in the back history.
pub fn navigate(app: &mut AppState, route: Route, push: bool) -> Vec<UiEffect> {
    if push && app.route != route {
        app.history.push(app.route.clone());
    }
    tracing::debug!(from = %app.route, to = %route, "navigate");

    app.tasks.clear_screen_tasks();
    app.banner = None;
    app.screen = Screen::for_route(&route, &app.editor);
    app.guard = route.access().map(RouteGuard::new);
    app.route = route;
    app.screen_mounted = false;
    evaluate_guard(app)
}

fn evaluate_guard(app: &mut AppState) -> Vec<UiEffect> {
    let outcome = match app.guard.as_mut() {
        Some(guard) => guard.evaluate(&app.session),
        None => GuardOutcome::Render,
    };
    apply_guard_outcome(app, outcome)
}

fn on_session_changed(app: &mut AppState) -> Vec<UiEffect> {
    let Some(guard) = app.guard.as_mut() else {
        return vec![];
    };
    match guard.on_session_change(&app.session) {
        Some(outcome) => apply_guard_outcome(app, outcome),
        None => vec![],
    }
}

fn apply_guard_outcome(app: &mut AppState, outcome: GuardOutcome) -> Vec<UiEffect> {
    match outcome {
        GuardOutcome::Loading => vec![],
        GuardOutcome::Redirect(route) => navigate(app, route, false),
        GuardOutcome::Render => mount_screen(app),
    }
}

fn mount_screen(app: &mut AppState) -> Vec<UiEffect> {
    if app.screen_mounted {
        return vec![];
    }
    app.screen_mounted = true;
    let (screen, mut ctx) = app.screen_and_ctx();
    screen.mount(&mut ctx)
}
