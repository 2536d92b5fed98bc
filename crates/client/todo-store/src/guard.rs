//! Route protection.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::session::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Settings,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Dashboard => "/",
            Self::Settings => "/settings",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        [Self::Login, Self::Register, Self::Dashboard, Self::Settings]
            .into_iter()
            .find(|r| r.path() == path)
    }

    pub fn requires_session(&self) -> bool {
        matches!(self, Self::Dashboard | Self::Settings)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Outcome of asking to show a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    /// `from` is kept so login can send the user back.
    Redirect { to: Route, from: Route },
}

impl Navigation {
    /// Where to go after a successful login.
    pub fn post_login_target(from: Option<Route>) -> Route {
        match from {
            Some(route) if route.requires_session() => route,
            _ => Route::Dashboard,
        }
    }
}

/// Protected routes need an access token; the profile alone is not enough.
pub fn guard(session: &SessionState, requested: Route) -> Navigation {
    if requested.requires_session() && !session.is_authenticated() {
        debug!("Redirecting {} to login", requested);
        return Navigation::Redirect {
            to: Route::Login,
            from: requested,
        };
    }
    Navigation::Render(requested)
}
