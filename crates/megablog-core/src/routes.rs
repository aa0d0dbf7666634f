//! Client-side route table.

use std::fmt;
use std::str::FromStr;

use crate::guard::Access;

/// A navigable screen.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Signup,
    AllPosts,
    AddPost,
    EditPost(String),
    Post(String),
}

impl Route {
    /// URL-style path for this route.
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Signup => "/signup".to_string(),
            Route::AllPosts => "/all-posts".to_string(),
            Route::AddPost => "/add-post".to_string(),
            Route::EditPost(id) => format!("/edit-post/{id}"),
            Route::Post(id) => format!("/post/{id}"),
        }
    }

    /// Access requirement enforced by the route guard, if any.
    pub fn access(&self) -> Option<Access> {
        match self {
            Route::Home | Route::Post(_) => None,
            Route::Login | Route::Signup => Some(Access::RequireGuest),
            Route::AllPosts | Route::AddPost | Route::EditPost(_) => Some(Access::RequireAuth),
        }
    }

    /// Short label used in the header and window title.
    pub fn title(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Login => "Login",
            Route::Signup => "Signup",
            Route::AllPosts => "All Posts",
            Route::AddPost => "Add Post",
            Route::EditPost(_) => "Edit Post",
            Route::Post(_) => "Post",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let path = trimmed.trim_end_matches('/');
        let route = match path {
            "" => Route::Home,
            "/login" => Route::Login,
            "/signup" => Route::Signup,
            "/all-posts" => Route::AllPosts,
            "/add-post" => Route::AddPost,
            _ => {
                if let Some(id) = path.strip_prefix("/edit-post/")
                    && is_segment(id)
                {
                    Route::EditPost(id.to_string())
                } else if let Some(id) = path.strip_prefix("/post/")
                    && is_segment(id)
                {
                    Route::Post(id.to_string())
                } else {
                    return Err(format!("Unknown route: {trimmed}"));
                }
            }
        };
        Ok(route)
    }
}

fn is_segment(s: &str) -> bool {
    !s.is_empty() && !s.contains('/')
}
