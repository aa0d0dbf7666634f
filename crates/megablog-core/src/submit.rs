//! Post submission pipeline.
//!
//! Create: precondition (image present) → upload → create record → navigate.
//! Update: optional upload → update record → delete old image → navigate.
//! An update only sends the body when its text differs from the stored one.
//!
//! Steps run strictly in order and the first failing step ends the run.
//! The old image is only deleted after the update returned a record; a failed
//! delete is logged and ignored. Without compensation a failed record mutation
//! leaves a fresh upload orphaned.

use std::fmt;

use crate::backend::{Backend, BackendError};
use crate::content;
use crate::forms::{self, FieldErrors, FormValues, field};
use crate::models::{ImageFile, NewPost, Post, PostStatus, PostUpdate, User};
use crate::routes::Route;
use crate::slug::slugify;

/// Fallback shown when a backend error carries no message.
pub const GENERIC_ERROR: &str = "Something went wrong. Please try again.";
/// Shown when creating a post without an image.
pub const MISSING_IMAGE: &str = "Please select an image";

/// Editor contents at the time of submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PostDraft {
    pub title: String,
    pub slug: String,
    /// Plain editor text; stored as paragraph HTML.
    pub content: String,
    pub status: PostStatus,
    pub image: Option<ImageFile>,
}

impl PostDraft {
    /// Pre-fills a draft from a stored post. The slug is the document id.
    pub fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            slug: post.id.clone(),
            content: content::html_to_text(&post.content),
            status: post.status,
            image: None,
        }
    }

    /// Values fed to the post rule table.
    pub fn form_values(&self) -> FormValues {
        let image = self
            .image
            .as_ref()
            .map(|img| img.path.display().to_string())
            .unwrap_or_default();
        FormValues::new()
            .with(field::TITLE, self.title.clone())
            .with(field::SLUG, slugify(&self.slug))
            .with(field::CONTENT, self.content.clone())
            .with(field::STATUS, self.status.as_str())
            .with(field::IMAGE, image)
    }

    /// Runs the post rule table plus the on-disk image check.
    pub fn validate(&self, creating: bool, max_image_bytes: u64) -> FieldErrors {
        let mut errors = forms::validate(&forms::post_rules(creating), &self.form_values());
        if !errors.contains_key(field::IMAGE)
            && let Some(image) = &self.image
            && let Some(message) = forms::check_image_file(image, max_image_bytes)
        {
            errors.insert(field::IMAGE, message);
        }
        errors
    }
}

/// Whether the pipeline creates a new post or updates an existing one.
#[derive(Debug, Clone, Copy)]
pub enum SubmitMode<'a> {
    Create { author: &'a User },
    Update { existing: &'a Post },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmitOptions {
    /// Delete a fresh upload when the record mutation that follows it fails.
    pub compensate_failed_uploads: bool,
}

/// Failure of a submission, collapsed to one user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// Create was requested without an image; no backend call was made.
    MissingImage,
    Backend(BackendError),
}

impl SubmitError {
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::MissingImage => MISSING_IMAGE.to_string(),
            SubmitError::Backend(e) if e.message.trim().is_empty() => GENERIC_ERROR.to_string(),
            SubmitError::Backend(e) => e.message.clone(),
        }
    }
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user_message())
    }
}

impl std::error::Error for SubmitError {}

impl From<BackendError> for SubmitError {
    fn from(e: BackendError) -> Self {
        SubmitError::Backend(e)
    }
}

/// Runs the pipeline and returns the route to navigate to on success.
///
/// # Errors
/// Returns the first failing step's error.
pub async fn submit_post<B: Backend>(
    backend: &B,
    draft: &PostDraft,
    mode: SubmitMode<'_>,
    options: SubmitOptions,
) -> Result<Route, SubmitError> {
    let result = match mode {
        SubmitMode::Create { author } => create(backend, draft, author, options).await,
        SubmitMode::Update { existing } => update(backend, draft, existing, options).await,
    };
    match &result {
        Ok(route) => tracing::info!(%route, "post submitted"),
        Err(e) => tracing::warn!("post submission failed: {e}"),
    }
    result
}

async fn create<B: Backend>(
    backend: &B,
    draft: &PostDraft,
    author: &User,
    options: SubmitOptions,
) -> Result<Route, SubmitError> {
    let image = draft.image.as_ref().ok_or(SubmitError::MissingImage)?;

    let file = backend.upload_file(image).await?;

    let new_post = NewPost {
        slug: slugify(&draft.slug),
        title: draft.title.clone(),
        content: content::text_to_html(&draft.content),
        featured_image: file.id.clone(),
        status: draft.status,
        user_id: author.id.clone(),
    };
    let post = match backend.create_post(&new_post).await {
        Ok(post) => post,
        Err(e) => {
            compensate(backend, &file.id, options).await;
            return Err(e.into());
        }
    };

    Ok(Route::Post(post.id))
}

async fn update<B: Backend>(
    backend: &B,
    draft: &PostDraft,
    existing: &Post,
    options: SubmitOptions,
) -> Result<Route, SubmitError> {
    let uploaded = match &draft.image {
        Some(image) => Some(backend.upload_file(image).await?),
        None => None,
    };

    // Stored markup survives unless the body text was actually edited.
    let body = (draft.content != content::html_to_text(&existing.content))
        .then(|| content::text_to_html(&draft.content));
    let changes = PostUpdate {
        title: Some(draft.title.clone()),
        content: body,
        featured_image: uploaded.as_ref().map(|file| file.id.clone()),
        status: Some(draft.status),
    };
    let post = match backend.update_post(&existing.id, &changes).await {
        Ok(post) => post,
        Err(e) => {
            if let Some(file) = &uploaded {
                compensate(backend, &file.id, options).await;
            }
            return Err(e.into());
        }
    };

    if let Some(file) = &uploaded
        && !existing.featured_image.is_empty()
        && existing.featured_image != file.id
        && let Err(e) = backend.delete_file(&existing.featured_image).await
    {
        tracing::warn!(
            file_id = %existing.featured_image,
            "Failed to delete previous featured image: {e}"
        );
    }

    Ok(Route::Post(post.id))
}

async fn compensate<B: Backend>(backend: &B, file_id: &str, options: SubmitOptions) {
    if !options.compensate_failed_uploads {
        tracing::warn!(file_id, "record mutation failed; uploaded file left orphaned");
        return;
    }
    if let Err(e) = backend.delete_file(file_id).await {
        tracing::warn!(file_id, "Failed to delete orphaned upload: {e}");
    }
}
