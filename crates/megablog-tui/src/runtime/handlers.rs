//! Effect handlers for the TUI runtime.
//!
//! Handlers are pure async functions that return a `UiEvent`. They perform
//! backend I/O and never touch state; the runtime spawns them and forwards
//! the result to the inbox.

use std::sync::Arc;

use megablog_core::auth;
use megablog_core::backend::Backend;
use megablog_core::models::{Credentials, NewAccount, Post};
use megablog_core::posts::{self, Feed};
use megablog_core::submit::{self, PostDraft, SubmitMode, SubmitOptions};

use crate::effects::SubmitTarget;
use crate::events::UiEvent;

pub async fn resolve_session<B: Backend>(backend: Arc<B>) -> UiEvent {
    UiEvent::SessionResolved {
        user: auth::resolve_session(&*backend).await,
    }
}

pub async fn load_feed<B: Backend>(backend: Arc<B>, feed: Feed) -> UiEvent {
    let result = posts::load_feed(&*backend, feed)
        .await
        .map(|list| list.documents)
        .map_err(|e| e.to_string());
    UiEvent::FeedLoaded { result }
}

/// Loads a post and, if it has a featured image, its preview URL.
pub async fn load_post<B: Backend>(backend: Arc<B>, id: String) -> UiEvent {
    let post = backend.get_post(&id).await;
    let preview_url = post
        .as_ref()
        .filter(|p| !p.featured_image.is_empty())
        .map(|p| backend.file_preview_url(&p.featured_image));
    UiEvent::PostLoaded {
        id,
        post,
        preview_url,
    }
}

pub async fn login<B: Backend>(backend: Arc<B>, credentials: Credentials) -> UiEvent {
    let result = auth::sign_in(&*backend, &credentials)
        .await
        .map_err(|e| e.user_message());
    UiEvent::AuthFinished { result }
}

pub async fn signup<B: Backend>(backend: Arc<B>, account: NewAccount) -> UiEvent {
    let result = auth::sign_up(&*backend, &account)
        .await
        .map_err(|e| e.user_message());
    UiEvent::AuthFinished { result }
}

pub async fn logout<B: Backend>(backend: Arc<B>) -> UiEvent {
    let result = auth::sign_out(&*backend)
        .await
        .map_err(|e| e.to_string());
    UiEvent::LogoutFinished { result }
}

pub async fn submit_post<B: Backend>(
    backend: Arc<B>,
    draft: PostDraft,
    target: SubmitTarget,
    options: SubmitOptions,
) -> UiEvent {
    let mode = match &target {
        SubmitTarget::Create { author } => SubmitMode::Create { author },
        SubmitTarget::Update { existing } => SubmitMode::Update { existing },
    };
    let result = submit::submit_post(&*backend, &draft, mode, options)
        .await
        .map_err(|e| e.user_message());
    UiEvent::SubmitFinished { result }
}

pub async fn delete_post<B: Backend>(backend: Arc<B>, post: Post) -> UiEvent {
    UiEvent::DeleteFinished {
        outcome: posts::delete_post_with_image(&*backend, &post).await,
    }
}
