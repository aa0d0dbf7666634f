//! Screens of the client.
//!
//! Each screen owns its state, key handler, and render function, the same
//! way for every route. Key handlers never perform I/O: they return a
//! [`ScreenUpdate`] carrying effects and an optional navigation request that
//! the reducer applies.

pub mod editor;
pub mod login;
pub mod post;
pub mod posts;
pub mod signup;

use crossterm::event::KeyEvent;
use megablog_core::config::EditorConfig;
use megablog_core::posts::Feed;
use megablog_core::routes::Route;
use megablog_core::session::SessionStore;
use ratatui::Frame;
use ratatui::layout::Rect;

pub use editor::EditorState;
pub use login::LoginState;
pub use post::PostViewState;
pub use posts::PostListState;
pub use signup::SignupState;

use crate::common::{TaskId, TaskKind, TaskSeq, Tasks};
use crate::effects::UiEffect;

/// Where a screen wants to go next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    To(Route),
    Back,
}

/// Result of a screen key handler.
#[derive(Debug, Default)]
pub struct ScreenUpdate {
    pub effects: Vec<UiEffect>,
    pub navigation: Option<Navigation>,
}

impl ScreenUpdate {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn effects(effects: Vec<UiEffect>) -> Self {
        Self {
            effects,
            navigation: None,
        }
    }

    pub fn navigate(route: Route) -> Self {
        Self {
            effects: Vec::new(),
            navigation: Some(Navigation::To(route)),
        }
    }

    pub fn back() -> Self {
        Self {
            effects: Vec::new(),
            navigation: Some(Navigation::Back),
        }
    }
}

/// What a key handler may read or allocate outside its own state.
pub struct ScreenCtx<'a> {
    pub session: &'a SessionStore,
    pub editor: &'a EditorConfig,
    pub task_seq: &'a mut TaskSeq,
    pub tasks: &'a mut Tasks,
}

impl ScreenCtx<'_> {
    /// Allocates a task id and marks it as the active task of `kind`.
    pub fn start_task(&mut self, kind: TaskKind) -> TaskId {
        let id = self.task_seq.next_id();
        self.tasks.state_mut(kind).start(id);
        id
    }
}

/// The mounted screen.
#[derive(Debug)]
pub enum Screen {
    Home(PostListState),
    AllPosts(PostListState),
    Post(PostViewState),
    Login(LoginState),
    Signup(SignupState),
    Editor(EditorState),
}

impl Screen {
    pub fn for_route(route: &Route, editor: &EditorConfig) -> Self {
        match route {
            Route::Home => Screen::Home(PostListState::new(Feed::Home)),
            Route::AllPosts => Screen::AllPosts(PostListState::new(Feed::All)),
            Route::Post(id) => Screen::Post(PostViewState::new(id)),
            Route::Login => Screen::Login(LoginState::new()),
            Route::Signup => Screen::Signup(SignupState::new()),
            Route::AddPost => Screen::Editor(EditorState::create(editor.default_status)),
            Route::EditPost(id) => Screen::Editor(EditorState::edit(id)),
        }
    }

    /// Effects to run once the screen is allowed to render (initial loads).
    pub fn mount(&mut self, ctx: &mut ScreenCtx<'_>) -> Vec<UiEffect> {
        match self {
            Screen::Home(list) | Screen::AllPosts(list) => vec![list.start_loading(ctx)],
            Screen::Post(view) => vec![view.start_loading(ctx)],
            Screen::Editor(editor) => editor.start_loading(ctx).into_iter().collect(),
            Screen::Login(_) | Screen::Signup(_) => vec![],
        }
    }

    pub fn handle_key(&mut self, ctx: &mut ScreenCtx<'_>, key: KeyEvent) -> ScreenUpdate {
        match self {
            Screen::Home(list) | Screen::AllPosts(list) => list.handle_key(ctx, key),
            Screen::Post(view) => view.handle_key(ctx, key),
            Screen::Login(login) => login.handle_key(ctx, key),
            Screen::Signup(signup) => signup.handle_key(ctx, key),
            Screen::Editor(editor) => editor.handle_key(ctx, key),
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        match self {
            Screen::Login(login) => login.handle_paste(text),
            Screen::Signup(signup) => signup.handle_paste(text),
            Screen::Editor(editor) => editor.handle_paste(text),
            Screen::Home(_) | Screen::AllPosts(_) | Screen::Post(_) => {}
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, session: &SessionStore, spinner: usize) {
        match self {
            Screen::Home(list) => posts::render_home(frame, area, list, session, spinner),
            Screen::AllPosts(list) => posts::render_all_posts(frame, area, list, spinner),
            Screen::Post(view) => post::render(frame, area, view, session, spinner),
            Screen::Login(login) => login::render(frame, area, login),
            Screen::Signup(signup) => signup::render(frame, area, signup),
            Screen::Editor(editor) => editor::render(frame, area, editor, spinner),
        }
    }

    /// Footer hints for the mounted screen.
    pub fn hints(&self, session: &SessionStore) -> Vec<(&'static str, &'static str)> {
        match self {
            Screen::Home(_) | Screen::AllPosts(_) => posts::hints(),
            Screen::Post(view) => post::hints(view, session),
            Screen::Login(_) | Screen::Signup(_) => vec![
                ("Tab", "next field"),
                ("Enter", "submit"),
                ("Esc", "back"),
            ],
            Screen::Editor(editor) => editor::hints(editor),
        }
    }
}
