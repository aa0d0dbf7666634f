//! Route guard state machine.
//!
//! ```text
//! Loading ──(session resolved)──► Deciding ──► Redirecting(route)
//!                                     ▲    └──► Rendering
//!                                     └──── any later session change
//! ```
//!
//! The guard never navigates by itself: a redirect is returned as
//! [`GuardOutcome::Redirect`] and the caller turns it into a navigation effect.

use crate::routes::Route;
use crate::session::{SessionFlag, SessionStore};

/// Session requirement of a guarded screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    /// Only signed-in users may see the screen.
    #[default]
    RequireAuth,
    /// Only signed-out users may see the screen (login, signup).
    RequireGuest,
}

/// Internal guard state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardPhase {
    Loading,
    Deciding,
    Redirecting(Route),
    Rendering,
}

/// What the caller should do after an evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Show the neutral loading indicator; do not navigate.
    Loading,
    /// Navigate to the route; do not render the screen.
    Redirect(Route),
    /// Render the guarded screen.
    Render,
}

/// Pure decision table.
pub fn decide(access: Access, flag: SessionFlag) -> GuardOutcome {
    match (access, flag) {
        (_, SessionFlag::Loading) => GuardOutcome::Loading,
        (Access::RequireAuth, SessionFlag::Unauthenticated) => GuardOutcome::Redirect(Route::Login),
        (Access::RequireGuest, SessionFlag::Authenticated) => GuardOutcome::Redirect(Route::Home),
        (Access::RequireAuth, SessionFlag::Authenticated)
        | (Access::RequireGuest, SessionFlag::Unauthenticated) => GuardOutcome::Render,
    }
}

/// Guard attached to one mounted screen.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    access: Access,
    phase: GuardPhase,
    seen_revision: Option<u64>,
}

impl RouteGuard {
    pub fn new(access: Access) -> Self {
        Self {
            access,
            phase: GuardPhase::Loading,
            seen_revision: None,
        }
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn phase(&self) -> &GuardPhase {
        &self.phase
    }

    /// True only once the guard has decided to render the screen.
    pub fn allows_render(&self) -> bool {
        self.phase == GuardPhase::Rendering
    }

    /// Runs the decision against the current session.
    pub fn evaluate(&mut self, session: &SessionStore) -> GuardOutcome {
        self.seen_revision = Some(session.revision());

        if session.is_loading() {
            self.phase = GuardPhase::Loading;
            return GuardOutcome::Loading;
        }

        self.phase = GuardPhase::Deciding;
        let outcome = decide(self.access, session.flag());
        self.phase = match &outcome {
            GuardOutcome::Loading => GuardPhase::Loading,
            GuardOutcome::Redirect(route) => GuardPhase::Redirecting(route.clone()),
            GuardOutcome::Render => GuardPhase::Rendering,
        };
        tracing::debug!(access = ?self.access, phase = ?self.phase, "guard evaluated");
        outcome
    }

    /// Re-evaluates if the session changed since the last evaluation.
    ///
    /// Returns `None` when nothing changed.
    pub fn on_session_change(&mut self, session: &SessionStore) -> Option<GuardOutcome> {
        if self.seen_revision == Some(session.revision()) {
            return None;
        }
        Some(self.evaluate(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    fn user() -> User {
        User {
            id: "u1".to_string(),
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
        }
    }

    #[test]
    fn test_unauthenticated_protected_redirects_to_login() {
        let mut session = SessionStore::new();
        session.logout();
        let mut guard = RouteGuard::new(Access::RequireAuth);

        assert_eq!(
            guard.evaluate(&session),
            GuardOutcome::Redirect(Route::Login)
        );
        assert!(!guard.allows_render());
        assert_eq!(guard.phase(), &GuardPhase::Redirecting(Route::Login));
    }

    #[test]
    fn test_authenticated_guest_only_redirects_home() {
        let mut session = SessionStore::new();
        session.login(user());
        let mut guard = RouteGuard::new(Access::RequireGuest);

        assert_eq!(guard.evaluate(&session), GuardOutcome::Redirect(Route::Home));
        assert!(!guard.allows_render());
    }

    #[test]
    fn test_loading_neither_renders_nor_redirects() {
        let session = SessionStore::new();
        for access in [Access::RequireAuth, Access::RequireGuest] {
            let mut guard = RouteGuard::new(access);
            assert_eq!(guard.evaluate(&session), GuardOutcome::Loading);
            assert_eq!(guard.phase(), &GuardPhase::Loading);
            assert!(!guard.allows_render());
        }
    }

    #[test]
    fn test_matching_session_renders() {
        let mut session = SessionStore::new();
        session.login(user());
        let mut guard = RouteGuard::new(Access::default());
        assert_eq!(guard.evaluate(&session), GuardOutcome::Render);
        assert!(guard.allows_render());

        let mut session = SessionStore::new();
        session.logout();
        let mut guard = RouteGuard::new(Access::RequireGuest);
        assert_eq!(guard.evaluate(&session), GuardOutcome::Render);
    }

    #[test]
    fn test_logout_while_mounted_redirects() {
        let mut session = SessionStore::new();
        session.login(user());
        let mut guard = RouteGuard::new(Access::RequireAuth);
        assert_eq!(guard.evaluate(&session), GuardOutcome::Render);

        assert_eq!(guard.on_session_change(&session), None);

        session.logout();
        assert_eq!(
            guard.on_session_change(&session),
            Some(GuardOutcome::Redirect(Route::Login))
        );
        assert!(!guard.allows_render());
    }

    #[test]
    fn test_loading_then_resolution_leaves_loading() {
        let mut session = SessionStore::new();
        let mut guard = RouteGuard::new(Access::RequireAuth);
        assert_eq!(guard.evaluate(&session), GuardOutcome::Loading);

        session.resolve(Some(user()));
        assert_eq!(
            guard.on_session_change(&session),
            Some(GuardOutcome::Render)
        );
    }
}
