//! Post listing and deletion flows.

use crate::backend::{Backend, BackendResult};
use crate::models::{DocumentList, Post, PostFilters};

pub const LOAD_POSTS_FAILED: &str = "Failed to load posts. Please try again.";

/// Which list of posts a screen shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    /// Active posts only.
    Home,
    /// Every post regardless of status.
    All,
}

impl Feed {
    pub fn filters(self) -> PostFilters {
        match self {
            Feed::Home => PostFilters::active(),
            Feed::All => PostFilters::all(),
        }
    }
}

/// Fetches the posts for a feed.
///
/// # Errors
/// Returns the backend error unchanged; screens show [`LOAD_POSTS_FAILED`].
pub async fn load_feed<B: Backend>(backend: &B, feed: Feed) -> BackendResult<DocumentList<Post>> {
    let result = backend.get_posts(&feed.filters()).await;
    match &result {
        Ok(list) => tracing::debug!(?feed, total = list.total, "feed loaded"),
        Err(e) => tracing::warn!(?feed, "feed failed: {e}"),
    }
    result
}

/// Result of deleting a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Record deleted; `image_deleted` tells whether the featured image went too.
    Deleted { image_deleted: bool },
    /// The backend refused; nothing else was attempted.
    NotDeleted,
}

/// Deletes the record and then, only if that succeeded, its featured image.
pub async fn delete_post_with_image<B: Backend>(backend: &B, post: &Post) -> DeleteOutcome {
    if !backend.delete_post(&post.id).await {
        return DeleteOutcome::NotDeleted;
    }
    tracing::info!(post_id = %post.id, "post deleted");

    if post.featured_image.is_empty() {
        return DeleteOutcome::Deleted {
            image_deleted: false,
        };
    }
    let image_deleted = match backend.delete_file(&post.featured_image).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(file_id = %post.featured_image, "Failed to delete featured image: {e}");
            false
        }
    };
    DeleteOutcome::Deleted { image_deleted }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::{Call, FakeBackend};
    use crate::models::PostStatus;

    fn post(id: &str, status: PostStatus) -> Post {
        Post {
            id: id.to_string(),
            title: id.to_string(),
            content: String::new(),
            featured_image: format!("{id}-image"),
            status,
            user_id: "user-1".to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_home_feed_only_active() {
        let backend = FakeBackend::new();
        backend.insert_post(post("a", PostStatus::Active));
        backend.insert_post(post("b", PostStatus::Inactive));

        let home = load_feed(&backend, Feed::Home).await.unwrap();
        assert_eq!(home.total, 1);
        assert_eq!(home.documents[0].id, "a");

        let all = load_feed(&backend, Feed::All).await.unwrap();
        assert_eq!(all.total, 2);
    }

    #[tokio::test]
    async fn test_delete_removes_record_then_image() {
        let backend = FakeBackend::new();
        backend.insert_post(post("a", PostStatus::Active));

        let outcome = delete_post_with_image(&backend, &post("a", PostStatus::Active)).await;
        assert_eq!(
            outcome,
            DeleteOutcome::Deleted {
                image_deleted: true
            }
        );
        assert_eq!(
            backend.calls(),
            vec![
                Call::DeletePost("a".to_string()),
                Call::DeleteFile("a-image".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_record_delete_keeps_image() {
        let backend = FakeBackend::new().with_state(|s| s.fail_delete_post = true);
        backend.insert_post(post("a", PostStatus::Active));

        let outcome = delete_post_with_image(&backend, &post("a", PostStatus::Active)).await;
        assert_eq!(outcome, DeleteOutcome::NotDeleted);
        assert_eq!(backend.calls(), vec![Call::DeletePost("a".to_string())]);
    }
}
