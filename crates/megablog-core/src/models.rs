//! Records exchanged with the backend.
//!
//! Field names follow the backend's JSON shape (`$id`, `$createdAt`, ...) so the
//! same types serve the HTTP client and the screens.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account profile of a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// Session handle returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub expire: Option<String>,
}

/// Visibility of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Visible to all readers.
    #[default]
    Active,
    /// Hidden from the home feed.
    Inactive,
}

impl PostStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PostStatus::Active => "active",
            PostStatus::Inactive => "inactive",
        }
    }

    /// Returns the other status (used by the editor's toggle).
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            PostStatus::Active => PostStatus::Inactive,
            PostStatus::Inactive => PostStatus::Active,
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(PostStatus::Active),
            "inactive" => Ok(PostStatus::Inactive),
            other => Err(format!(
                "Unknown status '{other}'. Expected 'active' or 'inactive'."
            )),
        }
    }
}

/// A stored post document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Document id; equal to the slug chosen at creation.
    #[serde(rename = "$id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "featuredImage", default)]
    pub featured_image: String,
    #[serde(default)]
    pub status: PostStatus,
    #[serde(rename = "userID", default)]
    pub user_id: String,
    #[serde(rename = "$createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "$updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Returns true if `user` wrote this post.
    pub fn is_authored_by(&self, user: Option<&User>) -> bool {
        user.is_some_and(|u| u.id == self.user_id)
    }
}

/// Fields sent when creating a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPost {
    /// Becomes the document id.
    #[serde(skip)]
    pub slug: String,
    pub title: String,
    pub content: String,
    #[serde(rename = "featuredImage")]
    pub featured_image: String,
    pub status: PostStatus,
    #[serde(rename = "userID")]
    pub user_id: String,
}

/// Fields sent when updating a post. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct PostUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(rename = "featuredImage", skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
}

/// Query filters for listing posts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PostFilters {
    /// Only return posts with this status. `None` returns every post.
    pub status: Option<PostStatus>,
}

impl PostFilters {
    /// Filters used by the home feed.
    pub fn active() -> Self {
        Self {
            status: Some(PostStatus::Active),
        }
    }

    /// No filtering ("All Posts").
    pub fn all() -> Self {
        Self::default()
    }
}

/// A page of documents returned by a list call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentList<T> {
    #[serde(default)]
    pub total: u64,
    pub documents: Vec<T>,
}

impl<T> Default for DocumentList<T> {
    fn default() -> Self {
        Self {
            total: 0,
            documents: Vec::new(),
        }
    }
}

/// Result of a file upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "sizeOriginal", default)]
    pub size: u64,
}

/// Account details submitted at signup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Email/password pair submitted at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// A local image selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub path: PathBuf,
}

impl ImageFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File name component, used as the uploaded file's name.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().to_string())
    }

    /// Lowercased extension, if any.
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
    }

    /// MIME type derived from the extension.
    pub fn mime_type(&self) -> &'static str {
        match self.extension().as_deref() {
            Some("png") => "image/png",
            Some("jpg" | "jpeg") => "image/jpeg",
            Some("gif") => "image/gif",
            _ => "application/octet-stream",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_deserializes_backend_shape() {
        let json = r#"{
            "$id": "hello-world",
            "$createdAt": "2024-05-01T10:00:00.000+00:00",
            "$updatedAt": "2024-05-02T10:00:00.000+00:00",
            "title": "Hello, World",
            "content": "<p>Hi</p>",
            "featuredImage": "file-1",
            "status": "inactive",
            "userID": "user-1",
            "$permissions": []
        }"#;
        let post: Post = serde_json::from_str(json).unwrap();
        assert_eq!(post.id, "hello-world");
        assert_eq!(post.status, PostStatus::Inactive);
        assert_eq!(post.user_id, "user-1");
        assert!(post.created_at.is_some());
    }

    #[test]
    fn test_post_update_skips_unset_fields() {
        let update = PostUpdate {
            title: Some("New".to_string()),
            ..PostUpdate::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "title": "New" }));
    }

    #[test]
    fn test_is_authored_by() {
        let post: Post = serde_json::from_value(serde_json::json!({
            "$id": "p", "title": "t", "userID": "u1"
        }))
        .unwrap();
        let author = User {
            id: "u1".to_string(),
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
        };
        let other = User {
            id: "u2".to_string(),
            ..author.clone()
        };
        assert!(post.is_authored_by(Some(&author)));
        assert!(!post.is_authored_by(Some(&other)));
        assert!(!post.is_authored_by(None));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(" Active ".parse::<PostStatus>(), Ok(PostStatus::Active));
        assert!("draft".parse::<PostStatus>().is_err());
    }

    #[test]
    fn test_image_mime_type() {
        assert_eq!(ImageFile::new("/tmp/a.JPG").mime_type(), "image/jpeg");
        assert_eq!(ImageFile::new("/tmp/a.gif").mime_type(), "image/gif");
        assert_eq!(ImageFile::new("/tmp/a").mime_type(), "application/octet-stream");
    }
}
