//! Appwrite REST implementation of [`Backend`].

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use uuid::Uuid;

use super::{Backend, BackendError, BackendResult, SessionCache};
use crate::config::ResolvedBackend;
use crate::models::{
    Credentials, DocumentList, ImageFile, NewAccount, NewPost, Post, PostFilters, PostStatus,
    PostUpdate, Session, UploadedFile, User,
};

const PROJECT_HEADER: &str = "X-Appwrite-Project";
/// Carries the session when cookies are unavailable (non-browser clients).
const FALLBACK_COOKIES_HEADER: &str = "X-Fallback-Cookies";

/// Appwrite client.
pub struct AppwriteBackend {
    config: ResolvedBackend,
    http: reqwest::Client,
    session_path: PathBuf,
    cookie: Mutex<Option<String>>,
}

impl AppwriteBackend {
    /// Creates a client that persists its session in the default location.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ResolvedBackend) -> Result<Self> {
        Self::with_session_path(config, SessionCache::cache_path())
    }

    /// Creates a client that persists its session at `session_path`.
    ///
    /// A saved session is reused only if it was issued by the same endpoint
    /// and project.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_session_path(config: ResolvedBackend, session_path: PathBuf) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let cookie = match SessionCache::load_from(&session_path) {
            Ok(Some(cache)) if cache.matches(&config.endpoint, &config.project_id) => {
                Some(cache.cookie)
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Ignoring unreadable session cache: {e:#}");
                None
            }
        };

        Ok(Self {
            config,
            http,
            session_path,
            cookie: Mutex::new(cookie),
        })
    }

    pub fn config(&self) -> &ResolvedBackend {
        &self.config
    }

    /// Returns true if a session cookie is available.
    pub fn has_session(&self) -> bool {
        self.cookie().is_some()
    }

    fn cookie(&self) -> Option<String> {
        self.cookie
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_cookie(&self, cookie: Option<String>) {
        *self.cookie.lock().unwrap_or_else(PoisonError::into_inner) = cookie;
    }

    fn documents_path(&self) -> String {
        format!(
            "/databases/{}/collections/{}/documents",
            self.config.database_id, self.config.collection_id
        )
    }

    fn document_path(&self, id: &str) -> String {
        format!("{}/{id}", self.documents_path())
    }

    fn files_path(&self) -> String {
        format!("/storage/buckets/{}/files", self.config.bucket_id)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!(%method, path, "appwrite request");
        let mut builder = self
            .http
            .request(method, format!("{}{path}", self.config.endpoint))
            .header(PROJECT_HEADER, &self.config.project_id);
        if let Some(cookie) = self.cookie() {
            builder = builder.header(FALLBACK_COOKIES_HEADER, cookie);
        }
        builder
    }

    async fn send(builder: RequestBuilder) -> BackendResult<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::http_status(status.as_u16(), &body));
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> BackendResult<T> {
        let response = Self::send(builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::parse(format!("Failed to parse response: {e}")))
    }

    /// Session cookie in the shape Appwrite expects back, built from the
    /// response header or, failing that, the session `secret`.
    fn session_cookie(&self, header: Option<String>, body: &Value) -> Option<String> {
        header.filter(|c| !c.trim().is_empty()).or_else(|| {
            let secret = body.get("secret").and_then(Value::as_str)?;
            if secret.is_empty() {
                return None;
            }
            let mut map = serde_json::Map::new();
            map.insert(
                format!("a_session_{}", self.config.project_id),
                Value::String(secret.to_string()),
            );
            Some(Value::Object(map).to_string())
        })
    }

    fn persist_session(&self, cookie: &str, user_id: &str) {
        let cache = SessionCache {
            endpoint: self.config.endpoint.clone(),
            project_id: self.config.project_id.clone(),
            cookie: cookie.to_string(),
            user_id: user_id.to_string(),
        };
        if let Err(e) = cache.save_to(&self.session_path) {
            tracing::warn!("Failed to persist session: {e:#}");
        }
    }

    fn forget_session(&self) {
        self.set_cookie(None);
        if let Err(e) = SessionCache::clear_at(&self.session_path) {
            tracing::warn!("Failed to clear session: {e:#}");
        }
    }
}

/// Appwrite JSON query selecting posts with the given status.
fn status_query(status: PostStatus) -> String {
    json!({
        "method": "equal",
        "attribute": "status",
        "values": [status.as_str()],
    })
    .to_string()
}

impl Backend for AppwriteBackend {
    async fn create_account(&self, account: &NewAccount) -> BackendResult<User> {
        let body = json!({
            "userId": Uuid::new_v4().simple().to_string(),
            "email": account.email,
            "password": account.password,
            "name": account.name,
        });
        let user: User = Self::send_json(self.request(Method::POST, "/account").json(&body)).await?;
        tracing::info!(user_id = %user.id, "account created");
        Ok(user)
    }

    async fn login(&self, credentials: &Credentials) -> BackendResult<Session> {
        let body = json!({
            "email": credentials.email,
            "password": credentials.password,
        });
        let response =
            Self::send(self.request(Method::POST, "/account/sessions/email").json(&body)).await?;

        let header = response
            .headers()
            .get(FALLBACK_COOKIES_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body: Value = response
            .json()
            .await
            .map_err(|e| BackendError::parse(format!("Failed to parse session: {e}")))?;
        let session: Session = serde_json::from_value(body.clone())
            .map_err(|e| BackendError::parse(format!("Failed to parse session: {e}")))?;

        match self.session_cookie(header, &body) {
            Some(cookie) => {
                self.persist_session(&cookie, &session.user_id);
                self.set_cookie(Some(cookie));
            }
            None => tracing::warn!("Login response carried no session cookie"),
        }
        tracing::info!(user_id = %session.user_id, "logged in");
        Ok(session)
    }

    async fn logout(&self) -> BackendResult<()> {
        let result = Self::send(self.request(Method::DELETE, "/account/sessions/current")).await;
        self.forget_session();
        match result {
            Ok(_) => Ok(()),
            // The server already considers the session gone.
            Err(e) if e.is_unauthorized() => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn current_user(&self) -> Option<User> {
        if !self.has_session() {
            return None;
        }
        match Self::send_json::<User>(self.request(Method::GET, "/account")).await {
            Ok(user) => Some(user),
            Err(e) if e.is_unauthorized() => {
                tracing::info!("Saved session is no longer valid");
                self.forget_session();
                None
            }
            Err(e) => {
                tracing::warn!(kind = %e.kind, "current_user failed: {e}");
                None
            }
        }
    }

    async fn create_post(&self, post: &NewPost) -> BackendResult<Post> {
        let body = json!({
            "documentId": post.slug,
            "data": post,
        });
        Self::send_json(
            self.request(Method::POST, &self.documents_path())
                .json(&body),
        )
        .await
    }

    async fn update_post(&self, id: &str, update: &PostUpdate) -> BackendResult<Post> {
        let body = json!({ "data": update });
        Self::send_json(
            self.request(Method::PATCH, &self.document_path(id))
                .json(&body),
        )
        .await
    }

    async fn delete_post(&self, id: &str) -> bool {
        match Self::send(self.request(Method::DELETE, &self.document_path(id))).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(post_id = id, "delete_post failed: {e}");
                false
            }
        }
    }

    async fn get_post(&self, id: &str) -> Option<Post> {
        match Self::send_json(self.request(Method::GET, &self.document_path(id))).await {
            Ok(post) => Some(post),
            Err(e) => {
                tracing::warn!(post_id = id, kind = %e.kind, "get_post failed: {e}");
                None
            }
        }
    }

    async fn get_posts(&self, filters: &PostFilters) -> BackendResult<DocumentList<Post>> {
        let mut builder = self.request(Method::GET, &self.documents_path());
        if let Some(status) = filters.status {
            builder = builder.query(&[("queries[]", status_query(status))]);
        }
        Self::send_json(builder).await
    }

    async fn upload_file(&self, file: &ImageFile) -> BackendResult<UploadedFile> {
        let bytes = tokio::fs::read(&file.path).await.map_err(|e| {
            BackendError::io(format!("Failed to read {}: {e}", file.path.display()))
        })?;
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file.file_name())
            .mime_str(file.mime_type())
            .map_err(|e| BackendError::io(format!("Invalid file type: {e}")))?;
        let form = reqwest::multipart::Form::new()
            .text("fileId", Uuid::new_v4().simple().to_string())
            .part("file", part);

        let uploaded: UploadedFile =
            Self::send_json(self.request(Method::POST, &self.files_path()).multipart(form)).await?;
        tracing::info!(file_id = %uploaded.id, "file uploaded");
        Ok(uploaded)
    }

    async fn delete_file(&self, id: &str) -> BackendResult<()> {
        Self::send(self.request(Method::DELETE, &format!("{}/{id}", self.files_path()))).await?;
        tracing::info!(file_id = id, "file deleted");
        Ok(())
    }

    fn file_preview_url(&self, id: &str) -> String {
        format!(
            "{}{}/{id}/preview?project={}",
            self.config.endpoint,
            self.files_path(),
            self.config.project_id
        )
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn resolved() -> ResolvedBackend {
        ResolvedBackend {
            endpoint: "http://127.0.0.1:9/v1".to_string(),
            project_id: "proj".to_string(),
            database_id: "db".to_string(),
            collection_id: "posts".to_string(),
            bucket_id: "images".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_preview_url() {
        let dir = tempfile::tempdir().unwrap();
        let backend =
            AppwriteBackend::with_session_path(resolved(), dir.path().join("session.json"))
                .unwrap();
        assert_eq!(
            backend.file_preview_url("file-1"),
            "http://127.0.0.1:9/v1/storage/buckets/images/files/file-1/preview?project=proj"
        );
        assert_eq!(
            backend.document_path("hello"),
            "/databases/db/collections/posts/documents/hello"
        );
    }

    #[test]
    fn test_status_query_shape() {
        let query: Value = serde_json::from_str(&status_query(PostStatus::Active)).unwrap();
        assert_eq!(
            query,
            json!({"method": "equal", "attribute": "status", "values": ["active"]})
        );
    }

    #[test]
    fn test_saved_session_reused_only_for_same_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        SessionCache {
            endpoint: "http://127.0.0.1:9/v1".to_string(),
            project_id: "proj".to_string(),
            cookie: "{}".to_string(),
            user_id: "u1".to_string(),
        }
        .save_to(&path)
        .unwrap();

        let backend = AppwriteBackend::with_session_path(resolved(), path.clone()).unwrap();
        assert!(backend.has_session());

        let other = ResolvedBackend {
            project_id: "other".to_string(),
            ..resolved()
        };
        let backend = AppwriteBackend::with_session_path(other, path).unwrap();
        assert!(!backend.has_session());
    }

    #[test]
    fn test_cookie_from_secret_when_header_missing() {
        let dir = tempfile::tempdir().unwrap();
        let backend =
            AppwriteBackend::with_session_path(resolved(), dir.path().join("session.json"))
                .unwrap();
        let cookie = backend
            .session_cookie(None, &json!({"secret": "abc"}))
            .unwrap();
        assert_eq!(cookie, r#"{"a_session_proj":"abc"}"#);
        assert_eq!(backend.session_cookie(None, &json!({"secret": ""})), None);
        assert_eq!(
            backend.session_cookie(Some("hdr".to_string()), &json!({})),
            Some("hdr".to_string())
        );
    }
}
