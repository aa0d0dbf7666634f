//! Application state.
//!
//! `AppState` is the single value the reducer mutates. It holds the session
//! store, the mounted route and screen, the guard attached to that route,
//! and the bookkeeping for in-flight backend tasks.

use megablog_core::config::EditorConfig;
use megablog_core::guard::RouteGuard;
use megablog_core::routes::Route;
use megablog_core::session::SessionStore;

use crate::common::{TaskSeq, Tasks};
use crate::navigation::History;
use crate::screens::{Screen, ScreenCtx};

#[derive(Debug)]
pub struct AppState {
    pub should_quit: bool,
    pub session: SessionStore,
    pub route: Route,
    pub history: History,
    /// Guard of the mounted route; `None` for unguarded routes.
    pub guard: Option<RouteGuard>,
    pub screen: Screen,
    /// True once the screen's initial effects have been issued.
    pub screen_mounted: bool,
    /// App-level error (e.g. a failed logout or delete).
    pub banner: Option<String>,
    pub task_seq: TaskSeq,
    pub tasks: Tasks,
    pub editor: EditorConfig,
    pub spinner_frame: usize,
}

impl AppState {
    /// Starts on the home screen with the session still loading.
    pub fn new(editor: EditorConfig) -> Self {
        let route = Route::Home;
        Self {
            should_quit: false,
            session: SessionStore::new(),
            screen: Screen::for_route(&route, &editor),
            route,
            history: History::default(),
            guard: None,
            screen_mounted: false,
            banner: None,
            task_seq: TaskSeq::default(),
            tasks: Tasks::default(),
            editor,
            spinner_frame: 0,
        }
    }

    /// True when the mounted screen may be drawn and receive keys.
    pub fn screen_visible(&self) -> bool {
        self.guard.as_ref().is_none_or(RouteGuard::allows_render)
    }

    /// Splits the state into the mounted screen and the context it may use.
    pub fn screen_and_ctx(&mut self) -> (&mut Screen, ScreenCtx<'_>) {
        (
            &mut self.screen,
            ScreenCtx {
                session: &self.session,
                editor: &self.editor,
                task_seq: &mut self.task_seq,
                tasks: &mut self.tasks,
            },
        )
    }
}
