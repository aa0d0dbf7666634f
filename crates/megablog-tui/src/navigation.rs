//! Header navigation and back history.

use megablog_core::routes::Route;
use megablog_core::session::{SessionFlag, SessionStore};

/// Routes visited before the current one.
#[derive(Debug, Default)]
pub struct History {
    stack: Vec<Route>,
}

/// Oldest entries are dropped past this depth.
const MAX_HISTORY: usize = 50;

impl History {
    pub fn push(&mut self, route: Route) {
        if self.stack.last() == Some(&route) {
            return;
        }
        if self.stack.len() == MAX_HISTORY {
            self.stack.remove(0);
        }
        self.stack.push(route);
    }

    pub fn pop(&mut self) -> Option<Route> {
        self.stack.pop()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavTarget {
    Go(Route),
    Logout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub target: NavTarget,
}

impl NavItem {
    fn go(label: &'static str, route: Route) -> Self {
        Self {
            label,
            target: NavTarget::Go(route),
        }
    }
}

/// Header items for the current session. F1 selects the first item, F2 the
/// second, and so on.
pub fn nav_items(session: &SessionStore) -> Vec<NavItem> {
    let home = NavItem::go("Home", Route::Home);
    match session.flag() {
        SessionFlag::Loading => vec![home],
        SessionFlag::Authenticated => vec![
            home,
            NavItem::go("All Posts", Route::AllPosts),
            NavItem::go("Add Post", Route::AddPost),
            NavItem {
                label: "Logout",
                target: NavTarget::Logout,
            },
        ],
        SessionFlag::Unauthenticated => vec![
            home,
            NavItem::go("Login", Route::Login),
            NavItem::go("Signup", Route::Signup),
        ],
    }
}

/// Item bound to function key `n` (1-based).
pub fn nav_item_for_key(session: &SessionStore, n: u8) -> Option<NavItem> {
    let index = usize::from(n).checked_sub(1)?;
    nav_items(session).into_iter().nth(index)
}

#[cfg(test)]
mod tests {
    use megablog_core::models::User;

    use super::*;

    #[test]
    fn test_items_follow_session() {
        let mut session = SessionStore::new();
        assert_eq!(nav_items(&session).len(), 1);

        session.logout();
        let labels: Vec<_> = nav_items(&session).iter().map(|i| i.label).collect();
        assert_eq!(labels, ["Home", "Login", "Signup"]);

        session.login(User {
            id: "u1".to_string(),
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
        });
        let labels: Vec<_> = nav_items(&session).iter().map(|i| i.label).collect();
        assert_eq!(labels, ["Home", "All Posts", "Add Post", "Logout"]);
        assert_eq!(
            nav_item_for_key(&session, 4).map(|i| i.target),
            Some(NavTarget::Logout)
        );
        assert_eq!(nav_item_for_key(&session, 0), None);
        assert_eq!(nav_item_for_key(&session, 5), None);
    }

    #[test]
    fn test_history_skips_duplicates() {
        let mut history = History::default();
        history.push(Route::Home);
        history.push(Route::Home);
        history.push(Route::AllPosts);
        assert_eq!(history.len(), 2);
        assert_eq!(history.pop(), Some(Route::AllPosts));
        assert_eq!(history.pop(), Some(Route::Home));
        assert!(history.is_empty());
    }
}
