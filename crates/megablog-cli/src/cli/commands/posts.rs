//! Post command handlers.

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use megablog_core::backend::{AppwriteBackend, Backend};
use megablog_core::config::Config;
use megablog_core::content::html_to_text;
use megablog_core::models::{ImageFile, Post, PostStatus, User};
use megablog_core::posts::{self, DeleteOutcome, Feed, LOAD_POSTS_FAILED};
use megablog_core::slug::slugify;
use megablog_core::submit::{self, PostDraft, SubmitMode, SubmitOptions};

use super::{connect, ensure_valid};

const NOT_SIGNED_IN: &str = "Not signed in. Run `megablog login` first.";

pub struct CreateArgs {
    pub title: String,
    pub slug: Option<String>,
    pub content: String,
    pub status: Option<String>,
    pub image: PathBuf,
}

pub struct EditArgs {
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<String>,
    pub image: Option<PathBuf>,
}

pub async fn list(config: &Config, all: bool, json: bool) -> Result<()> {
    let backend = connect(config)?;
    let feed = if all {
        if backend.current_user().await.is_none() {
            anyhow::bail!(NOT_SIGNED_IN);
        }
        Feed::All
    } else {
        Feed::Home
    };

    let list = posts::load_feed(&backend, feed)
        .await
        .map_err(|e| anyhow!(e).context(LOAD_POSTS_FAILED))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }
    if list.documents.is_empty() {
        println!("No posts yet.");
        return Ok(());
    }
    for post in &list.documents {
        let date = post
            .created_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        println!(
            "{:<32} {:<8} {:>10}  {}",
            post.id,
            post.status.as_str(),
            date,
            post.title
        );
    }
    Ok(())
}

pub async fn show(config: &Config, id: &str, json: bool) -> Result<()> {
    let backend = connect(config)?;
    let post = fetch(&backend, id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&post)?);
        return Ok(());
    }

    println!("{}", post.title);
    println!("id:      {}", post.id);
    println!("status:  {}", post.status);
    if let Some(created) = post.created_at {
        println!("created: {}", created.format("%Y-%m-%d %H:%M UTC"));
    }
    if !post.featured_image.is_empty() {
        println!("image:   {}", backend.file_preview_url(&post.featured_image));
    }
    println!();
    println!("{}", html_to_text(&post.content));
    Ok(())
}

pub async fn create(config: &Config, args: CreateArgs) -> Result<()> {
    let draft = PostDraft {
        slug: args.slug.unwrap_or_else(|| slugify(&args.title)),
        title: args.title,
        content: args.content,
        status: parse_status(args.status.as_deref(), config.editor.default_status)?,
        image: Some(ImageFile::new(args.image)),
    };
    ensure_valid(&draft.validate(true, config.editor.max_image_bytes))?;

    let backend = connect(config)?;
    let author = require_user(&backend).await?;
    let route = submit::submit_post(
        &backend,
        &draft,
        SubmitMode::Create { author: &author },
        submit_options(config),
    )
    .await?;
    println!("Created post {route}");
    Ok(())
}

pub async fn edit(config: &Config, id: &str, args: EditArgs) -> Result<()> {
    let backend = connect(config)?;
    let user = require_user(&backend).await?;
    let existing = fetch(&backend, id).await?;
    ensure_author(&existing, &user)?;

    let mut draft = PostDraft::from_post(&existing);
    if let Some(title) = args.title {
        draft.title = title;
    }
    if let Some(content) = args.content {
        draft.content = content;
    }
    draft.status = parse_status(args.status.as_deref(), draft.status)?;
    draft.image = args.image.map(ImageFile::new);
    ensure_valid(&draft.validate(false, config.editor.max_image_bytes))?;

    let route = submit::submit_post(
        &backend,
        &draft,
        SubmitMode::Update {
            existing: &existing,
        },
        submit_options(config),
    )
    .await?;
    println!("Updated post {route}");
    Ok(())
}

pub async fn delete(config: &Config, id: &str) -> Result<()> {
    let backend = connect(config)?;
    let user = require_user(&backend).await?;
    let post = fetch(&backend, id).await?;
    ensure_author(&post, &user)?;

    match posts::delete_post_with_image(&backend, &post).await {
        DeleteOutcome::Deleted {
            image_deleted: true,
        } => println!("Deleted post {id} and its image."),
        DeleteOutcome::Deleted {
            image_deleted: false,
        } => println!("Deleted post {id}. The featured image could not be removed."),
        DeleteOutcome::NotDeleted => anyhow::bail!("Failed to delete post {id}."),
    }
    Ok(())
}

async fn fetch(backend: &AppwriteBackend, id: &str) -> Result<Post> {
    backend
        .get_post(id)
        .await
        .ok_or_else(|| anyhow!("Post '{id}' not found."))
}

async fn require_user(backend: &AppwriteBackend) -> Result<User> {
    backend
        .current_user()
        .await
        .ok_or_else(|| anyhow!(NOT_SIGNED_IN))
}

fn ensure_author(post: &Post, user: &User) -> Result<()> {
    if post.is_authored_by(Some(user)) {
        Ok(())
    } else {
        anyhow::bail!("Only the author can change post '{}'.", post.id)
    }
}

fn parse_status(raw: Option<&str>, default: PostStatus) -> Result<PostStatus> {
    raw.map_or(Ok(default), |s| s.parse().map_err(|e: String| anyhow!(e)))
}

fn submit_options(config: &Config) -> SubmitOptions {
    SubmitOptions {
        compensate_failed_uploads: config.editor.compensate_failed_uploads,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_defaults_and_rejects() {
        assert_eq!(
            parse_status(None, PostStatus::Inactive).unwrap(),
            PostStatus::Inactive
        );
        assert_eq!(
            parse_status(Some("Active"), PostStatus::Inactive).unwrap(),
            PostStatus::Active
        );
        assert!(parse_status(Some("draft"), PostStatus::Active).is_err());
    }

    #[test]
    fn test_ensure_author() {
        let user = User {
            id: "u1".to_string(),
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
        };
        let mut post = Post {
            id: "p".to_string(),
            title: "T".to_string(),
            content: String::new(),
            featured_image: String::new(),
            status: PostStatus::Active,
            user_id: "u1".to_string(),
            created_at: None,
            updated_at: None,
        };
        assert!(ensure_author(&post, &user).is_ok());
        post.user_id = "u2".to_string();
        assert!(ensure_author(&post, &user).is_err());
    }
}
