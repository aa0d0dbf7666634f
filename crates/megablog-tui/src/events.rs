//! UI event types.
//!
//! Everything the reducer reacts to: terminal input, the tick, and results
//! of backend tasks delivered through the runtime inbox.

use crossterm::event::Event;
use megablog_core::models::{Post, User};
use megablog_core::posts::DeleteOutcome;
use megablog_core::routes::Route;

use crate::common::{TaskCompleted, TaskKind};

#[derive(Debug)]
pub enum UiEvent {
    /// Animation tick.
    Tick,

    /// Raw terminal input.
    Terminal(Event),

    /// A backend task finished. The inner event is applied only if the task
    /// is still the active one for its kind.
    TaskCompleted {
        kind: TaskKind,
        completed: TaskCompleted<Box<UiEvent>>,
    },

    /// Startup session lookup finished.
    SessionResolved { user: Option<User> },

    /// A post list finished loading.
    FeedLoaded { result: Result<Vec<Post>, String> },

    /// A single post finished loading (`None` if missing).
    PostLoaded {
        id: String,
        post: Option<Post>,
        preview_url: Option<String>,
    },

    /// Login or signup finished.
    AuthFinished { result: Result<User, String> },

    /// Logout finished. The local session is cleared either way.
    LogoutFinished { result: Result<(), String> },

    /// The submission pipeline finished; `Ok` holds the route to open.
    SubmitFinished { result: Result<Route, String> },

    /// Post deletion finished.
    DeleteFinished { outcome: DeleteOutcome },
}
