//! In-memory backend that records every call.

use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{Backend, BackendError, BackendErrorKind, BackendResult};
use crate::models::{
    Credentials, DocumentList, ImageFile, NewAccount, NewPost, Post, PostFilters, PostUpdate,
    Session, UploadedFile, User,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateAccount(String),
    Login(String),
    Logout,
    CurrentUser,
    CreatePost(String),
    UpdatePost(String),
    DeletePost(String),
    GetPost(String),
    GetPosts,
    UploadFile(String),
    DeleteFile(String),
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub accounts: BTreeMap<String, (User, String)>,
    pub signed_in: Option<User>,
    pub posts: BTreeMap<String, Post>,
    pub files: Vec<String>,
    pub next_file: u32,
    pub fail_upload: bool,
    pub fail_create_post: bool,
    pub fail_update_post: bool,
    pub fail_delete_post: bool,
    pub fail_delete_file: bool,
}

#[derive(Debug, Default)]
pub struct FakeBackend {
    pub calls: Mutex<Vec<Call>>,
    pub state: Mutex<FakeState>,
}

fn failure(message: &str) -> BackendError {
    BackendError::new(BackendErrorKind::HttpStatus, message)
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn with_state(self, f: impl FnOnce(&mut FakeState)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn add_account(&self, user: User, password: &str) {
        self.state
            .lock()
            .unwrap()
            .accounts
            .insert(user.email.clone(), (user, password.to_string()));
    }

    pub fn sign_in_as(&self, user: User) {
        self.state.lock().unwrap().signed_in = Some(user);
    }

    pub fn insert_post(&self, post: Post) {
        self.state.lock().unwrap().posts.insert(post.id.clone(), post);
    }

    pub fn post(&self, id: &str) -> Option<Post> {
        self.state.lock().unwrap().posts.get(id).cloned()
    }

    pub fn files(&self) -> Vec<String> {
        self.state.lock().unwrap().files.clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Backend for FakeBackend {
    async fn create_account(&self, account: &NewAccount) -> BackendResult<User> {
        self.record(Call::CreateAccount(account.email.clone()));
        let mut state = self.state.lock().unwrap();
        if state.accounts.contains_key(&account.email) {
            return Err(BackendError::new(
                BackendErrorKind::HttpStatus,
                "A user with the same email already exists.",
            ));
        }
        let user = User {
            id: format!("user-{}", state.accounts.len() + 1),
            name: account.name.clone(),
            email: account.email.clone(),
        };
        state
            .accounts
            .insert(account.email.clone(), (user.clone(), account.password.clone()));
        Ok(user)
    }

    async fn login(&self, credentials: &Credentials) -> BackendResult<Session> {
        self.record(Call::Login(credentials.email.clone()));
        let mut state = self.state.lock().unwrap();
        let Some((user, password)) = state.accounts.get(&credentials.email).cloned() else {
            return Err(BackendError::http_status(
                401,
                r#"{"message":"Invalid credentials."}"#,
            ));
        };
        if password != credentials.password {
            return Err(BackendError::http_status(
                401,
                r#"{"message":"Invalid credentials."}"#,
            ));
        }
        state.signed_in = Some(user.clone());
        Ok(Session {
            id: "session-1".to_string(),
            user_id: user.id,
            expire: None,
        })
    }

    async fn logout(&self) -> BackendResult<()> {
        self.record(Call::Logout);
        self.state.lock().unwrap().signed_in = None;
        Ok(())
    }

    async fn current_user(&self) -> Option<User> {
        self.record(Call::CurrentUser);
        self.state.lock().unwrap().signed_in.clone()
    }

    async fn create_post(&self, post: &NewPost) -> BackendResult<Post> {
        self.record(Call::CreatePost(post.slug.clone()));
        let mut state = self.state.lock().unwrap();
        if state.fail_create_post {
            return Err(failure("Document with the requested ID already exists."));
        }
        let stored = Post {
            id: post.slug.clone(),
            title: post.title.clone(),
            content: post.content.clone(),
            featured_image: post.featured_image.clone(),
            status: post.status,
            user_id: post.user_id.clone(),
            created_at: None,
            updated_at: None,
        };
        state.posts.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn update_post(&self, id: &str, update: &PostUpdate) -> BackendResult<Post> {
        self.record(Call::UpdatePost(id.to_string()));
        let mut state = self.state.lock().unwrap();
        if state.fail_update_post {
            return Err(failure("Server error"));
        }
        let Some(post) = state.posts.get_mut(id) else {
            return Err(BackendError::http_status(404, ""));
        };
        if let Some(title) = &update.title {
            post.title.clone_from(title);
        }
        if let Some(content) = &update.content {
            post.content.clone_from(content);
        }
        if let Some(image) = &update.featured_image {
            post.featured_image.clone_from(image);
        }
        if let Some(status) = update.status {
            post.status = status;
        }
        Ok(post.clone())
    }

    async fn delete_post(&self, id: &str) -> bool {
        self.record(Call::DeletePost(id.to_string()));
        let mut state = self.state.lock().unwrap();
        if state.fail_delete_post {
            return false;
        }
        state.posts.remove(id).is_some()
    }

    async fn get_post(&self, id: &str) -> Option<Post> {
        self.record(Call::GetPost(id.to_string()));
        self.state.lock().unwrap().posts.get(id).cloned()
    }

    async fn get_posts(&self, filters: &PostFilters) -> BackendResult<DocumentList<Post>> {
        self.record(Call::GetPosts);
        let state = self.state.lock().unwrap();
        let documents: Vec<Post> = state
            .posts
            .values()
            .filter(|p| filters.status.is_none_or(|s| p.status == s))
            .cloned()
            .collect();
        Ok(DocumentList {
            total: documents.len() as u64,
            documents,
        })
    }

    async fn upload_file(&self, file: &ImageFile) -> BackendResult<UploadedFile> {
        self.record(Call::UploadFile(file.file_name()));
        let mut state = self.state.lock().unwrap();
        if state.fail_upload {
            return Err(failure("Storage quota exceeded"));
        }
        state.next_file += 1;
        let id = format!("file-{}", state.next_file);
        state.files.push(id.clone());
        Ok(UploadedFile {
            id,
            name: file.file_name(),
            size: 0,
        })
    }

    async fn delete_file(&self, id: &str) -> BackendResult<()> {
        self.record(Call::DeleteFile(id.to_string()));
        let mut state = self.state.lock().unwrap();
        if state.fail_delete_file {
            return Err(failure("File not found"));
        }
        state.files.retain(|f| f != id);
        Ok(())
    }

    fn file_preview_url(&self, id: &str) -> String {
        format!("http://fake/files/{id}/preview")
    }
}
