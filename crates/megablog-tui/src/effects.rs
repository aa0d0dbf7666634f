//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They represent I/O and task spawning only (no direct UI mutations).
//!
//! Every backend call carries the [`TaskId`] the reducer marked active for
//! it; the runtime echoes the id back with the result.

use megablog_core::models::{Credentials, NewAccount, Post, User};
use megablog_core::posts::Feed;
use megablog_core::submit::PostDraft;

use crate::common::TaskId;

/// Which kind of submission the editor requested.
#[derive(Debug, Clone)]
pub enum SubmitTarget {
    Create { author: User },
    Update { existing: Post },
}

/// Effects returned by the reducer for the runtime to execute.
#[derive(Debug)]
pub enum UiEffect {
    /// Quit the application.
    Quit,

    /// Ask the backend who is signed in (startup).
    ResolveSession { task: TaskId },

    /// Load a list of posts.
    LoadFeed { task: TaskId, feed: Feed },

    /// Load one post (detail view or editor pre-fill).
    LoadPost { task: TaskId, id: String },

    /// Log in and fetch the profile.
    Login {
        task: TaskId,
        credentials: Credentials,
    },

    /// Create an account, log in, and fetch the profile.
    Signup { task: TaskId, account: NewAccount },

    /// End the backend session.
    Logout { task: TaskId },

    /// Run the post submission pipeline.
    SubmitPost {
        task: TaskId,
        draft: PostDraft,
        target: SubmitTarget,
    },

    /// Delete a post and then its featured image.
    DeletePost { task: TaskId, post: Post },

    /// Open a URL in the system browser.
    OpenBrowser { url: String },
}
