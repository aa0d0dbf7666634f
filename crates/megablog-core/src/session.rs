//! Session store: the tri-state authentication flag plus the current user.
//!
//! The store starts in `Loading` and is resolved once at startup. After that
//! only [`SessionStore::login`] and [`SessionStore::logout`] write to it; every
//! other component reads it by reference.

use crate::models::User;

/// Authentication status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFlag {
    /// Startup resolution has not finished.
    Loading,
    Authenticated,
    Unauthenticated,
}

/// Owner of the session flag and the signed-in user.
#[derive(Debug, Clone)]
pub struct SessionStore {
    flag: SessionFlag,
    user: Option<User>,
    /// Bumped on every write so readers can detect changes cheaply.
    revision: u64,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Creates a store in the `Loading` state.
    pub fn new() -> Self {
        Self {
            flag: SessionFlag::Loading,
            user: None,
            revision: 0,
        }
    }

    /// Records a signed-in user.
    pub fn login(&mut self, user: User) {
        tracing::info!(user_id = %user.id, "session: login");
        self.flag = SessionFlag::Authenticated;
        self.user = Some(user);
        self.revision = self.revision.wrapping_add(1);
    }

    /// Clears the signed-in user.
    pub fn logout(&mut self) {
        tracing::info!("session: logout");
        self.flag = SessionFlag::Unauthenticated;
        self.user = None;
        self.revision = self.revision.wrapping_add(1);
    }

    /// Applies the startup lookup result via the regular login/logout writers.
    pub fn resolve(&mut self, user: Option<User>) {
        match user {
            Some(user) => self.login(user),
            None => self.logout(),
        }
    }

    pub fn flag(&self) -> SessionFlag {
        self.flag
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.flag == SessionFlag::Loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.flag == SessionFlag::Authenticated
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: "u1".to_string(),
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
        }
    }

    #[test]
    fn test_starts_loading_without_user() {
        let store = SessionStore::new();
        assert_eq!(store.flag(), SessionFlag::Loading);
        assert!(store.is_loading());
        assert!(store.user().is_none());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_resolve_with_user_authenticates() {
        let mut store = SessionStore::new();
        store.resolve(Some(user()));
        assert!(store.is_authenticated());
        assert_eq!(store.user().map(|u| u.id.as_str()), Some("u1"));
    }

    #[test]
    fn test_resolve_without_user_is_unauthenticated() {
        let mut store = SessionStore::new();
        store.resolve(None);
        assert_eq!(store.flag(), SessionFlag::Unauthenticated);
        assert!(!store.is_loading());
    }

    #[test]
    fn test_logout_clears_user_and_bumps_revision() {
        let mut store = SessionStore::new();
        store.login(user());
        let before = store.revision();
        store.logout();
        assert!(store.user().is_none());
        assert!(store.revision() > before);
    }
}
