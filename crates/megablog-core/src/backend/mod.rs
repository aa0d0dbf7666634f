//! Backend facade.
//!
//! [`Backend`] lists every operation the client needs from the hosted
//! service. [`AppwriteBackend`] implements it over the Appwrite REST API.
//! Flows in this crate are generic over the trait so they can run against
//! an in-memory fake in tests.

mod appwrite;
mod error;
#[cfg(any(test, feature = "testing"))]
pub mod fake;
mod session_cache;

use std::future::Future;

pub use appwrite::AppwriteBackend;
pub use error::{BackendError, BackendErrorKind, BackendResult};
pub use session_cache::SessionCache;

use crate::models::{
    Credentials, DocumentList, ImageFile, NewAccount, NewPost, Post, PostFilters, PostUpdate,
    Session, UploadedFile, User,
};

/// Operations offered by the hosted backend.
///
/// Lookups that can legitimately miss (`current_user`, `get_post`) and
/// `delete_post` swallow errors after logging them; everything else returns
/// a [`BackendError`].
pub trait Backend: Send + Sync + 'static {
    fn create_account(
        &self,
        account: &NewAccount,
    ) -> impl Future<Output = BackendResult<User>> + Send;

    fn login(&self, credentials: &Credentials)
    -> impl Future<Output = BackendResult<Session>> + Send;

    fn logout(&self) -> impl Future<Output = BackendResult<()>> + Send;

    /// Returns the signed-in user, or `None` when there is no valid session.
    fn current_user(&self) -> impl Future<Output = Option<User>> + Send;

    fn create_post(&self, post: &NewPost) -> impl Future<Output = BackendResult<Post>> + Send;

    fn update_post(
        &self,
        id: &str,
        update: &PostUpdate,
    ) -> impl Future<Output = BackendResult<Post>> + Send;

    /// Returns true if the record was deleted.
    fn delete_post(&self, id: &str) -> impl Future<Output = bool> + Send;

    fn get_post(&self, id: &str) -> impl Future<Output = Option<Post>> + Send;

    fn get_posts(
        &self,
        filters: &PostFilters,
    ) -> impl Future<Output = BackendResult<DocumentList<Post>>> + Send;

    fn upload_file(
        &self,
        file: &ImageFile,
    ) -> impl Future<Output = BackendResult<UploadedFile>> + Send;

    fn delete_file(&self, id: &str) -> impl Future<Output = BackendResult<()>> + Send;

    /// URL of a rendered preview of the stored file.
    fn file_preview_url(&self, id: &str) -> String;
}
