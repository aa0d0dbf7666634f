//! Account flows: session resolution, login, signup, logout.
//!
//! These functions only talk to the backend; recording the result in the
//! [`SessionStore`](crate::session::SessionStore) is left to the caller, which
//! is the store's single writer.

use std::fmt;

use crate::backend::{Backend, BackendError};
use crate::forms::{FormValues, field};
use crate::models::{Credentials, NewAccount, User};

pub const LOGIN_FAILED: &str = "Login failed. Please try again.";
pub const SIGNUP_FAILED: &str = "Account creation failed. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    Login,
    Signup,
}

impl AuthAction {
    fn fallback(self) -> &'static str {
        match self {
            AuthAction::Login => LOGIN_FAILED,
            AuthAction::Signup => SIGNUP_FAILED,
        }
    }
}

/// Failure of a login or signup, with a single display message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthError {
    pub action: AuthAction,
    /// `None` when the backend accepted the request but no user came back.
    pub source: Option<BackendError>,
}

impl AuthError {
    fn new(action: AuthAction, source: Option<BackendError>) -> Self {
        Self { action, source }
    }

    pub fn user_message(&self) -> String {
        self.source
            .as_ref()
            .map(|e| e.message.trim())
            .filter(|msg| !msg.is_empty())
            .map_or_else(|| self.action.fallback().to_string(), str::to_string)
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user_message())
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl Credentials {
    /// Builds credentials from a validated login or signup form.
    pub fn from_form(values: &FormValues) -> Self {
        Self {
            email: values.get(field::EMAIL).trim().to_string(),
            password: values.get(field::PASSWORD).to_string(),
        }
    }
}

impl NewAccount {
    /// Builds the account profile from a validated signup form.
    pub fn from_form(values: &FormValues) -> Self {
        Self {
            name: values.get(field::NAME).trim().to_string(),
            email: values.get(field::EMAIL).trim().to_string(),
            password: values.get(field::PASSWORD).to_string(),
        }
    }
}

/// Startup lookup: the signed-in user, if the saved session is still valid.
pub async fn resolve_session<B: Backend>(backend: &B) -> Option<User> {
    let user = backend.current_user().await;
    tracing::info!(authenticated = user.is_some(), "session resolved");
    user
}

/// Logs in and fetches the account profile.
///
/// # Errors
/// Returns an [`AuthError`] if either call fails.
pub async fn sign_in<B: Backend>(backend: &B, credentials: &Credentials) -> Result<User, AuthError> {
    backend
        .login(credentials)
        .await
        .map_err(|e| AuthError::new(AuthAction::Login, Some(e)))?;
    backend
        .current_user()
        .await
        .ok_or_else(|| AuthError::new(AuthAction::Login, None))
}

/// Creates the account, logs in with the same credentials, and fetches the
/// profile.
///
/// # Errors
/// Returns an [`AuthError`] if any step fails.
pub async fn sign_up<B: Backend>(backend: &B, account: &NewAccount) -> Result<User, AuthError> {
    let fail = |e| AuthError::new(AuthAction::Signup, Some(e));

    backend.create_account(account).await.map_err(fail)?;
    let credentials = Credentials {
        email: account.email.clone(),
        password: account.password.clone(),
    };
    backend.login(&credentials).await.map_err(fail)?;
    backend
        .current_user()
        .await
        .ok_or_else(|| AuthError::new(AuthAction::Signup, None))
}

/// Ends the backend session.
///
/// # Errors
/// Returns the backend error; the local session is cleared regardless.
pub async fn sign_out<B: Backend>(backend: &B) -> Result<(), BackendError> {
    backend.logout().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::{Call, FakeBackend};

    fn ann() -> User {
        User {
            id: "user-1".to_string(),
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_resolve_session() {
        let backend = FakeBackend::new();
        assert_eq!(resolve_session(&backend).await, None);
        backend.sign_in_as(ann());
        assert_eq!(resolve_session(&backend).await, Some(ann()));
    }

    #[tokio::test]
    async fn test_sign_in_fetches_profile() {
        let backend = FakeBackend::new();
        backend.add_account(ann(), "secret1");
        let user = sign_in(
            &backend,
            &Credentials {
                email: "ann@example.com".to_string(),
                password: "secret1".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(user, ann());
        assert_eq!(
            backend.calls(),
            vec![Call::Login("ann@example.com".to_string()), Call::CurrentUser]
        );
    }

    #[tokio::test]
    async fn test_sign_in_failure_uses_backend_message() {
        let backend = FakeBackend::new();
        let err = sign_in(
            &backend,
            &Credentials {
                email: "nobody@example.com".to_string(),
                password: "secret1".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.user_message(), "Invalid credentials.");
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_sign_up_creates_then_logs_in() {
        let backend = FakeBackend::new();
        let user = sign_up(
            &backend,
            &NewAccount {
                name: "Bob".to_string(),
                email: "bob@example.com".to_string(),
                password: "Secret1!x".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(user.email, "bob@example.com");
        assert_eq!(
            backend.calls(),
            vec![
                Call::CreateAccount("bob@example.com".to_string()),
                Call::Login("bob@example.com".to_string()),
                Call::CurrentUser,
            ]
        );
    }

    #[tokio::test]
    async fn test_sign_up_duplicate_email() {
        let backend = FakeBackend::new();
        backend.add_account(ann(), "secret1");
        let err = sign_up(
            &backend,
            &NewAccount {
                name: "Ann".to_string(),
                email: "ann@example.com".to_string(),
                password: "Secret1!x".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.action, AuthAction::Signup);
        assert_eq!(
            err.user_message(),
            "A user with the same email already exists."
        );
    }

    #[test]
    fn test_missing_user_uses_fallback() {
        assert_eq!(
            AuthError::new(AuthAction::Login, None).to_string(),
            LOGIN_FAILED
        );
        assert_eq!(
            AuthError::new(AuthAction::Signup, None).to_string(),
            SIGNUP_FAILED
        );
    }

    #[tokio::test]
    async fn test_sign_out_clears_backend_session() {
        let backend = FakeBackend::new();
        backend.sign_in_as(ann());
        sign_out(&backend).await.unwrap();
        assert_eq!(backend.current_user().await, None);
    }
}
