//! Route table, navigation guard, and the navigator that ties them to a session

pub mod guard;
pub mod routes;

pub use guard::{evaluate, Decision};
pub use routes::{RouteDescriptor, RouteMatch, RouteTable, LOGIN_PATH, ROUTES};

use std::sync::Arc;
use tracing::{debug, info};

use crate::auth::SessionStore;

/// Result of asking to navigate to a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// The transition may proceed
    Proceed(RouteMatch),
    /// Rewritten to another path; the intended destination is dropped
    Redirect { to: &'static str },
    /// Authenticated, but the route's role check failed
    Blocked { route: &'static RouteDescriptor },
    NotFound { path: String },
}

/// Runs every transition through the guard
pub struct Navigator {
    table: RouteTable,
    session: Arc<SessionStore>,
}

impl Navigator {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self::with_table(RouteTable::default(), session)
    }

    pub fn with_table(table: RouteTable, session: Arc<SessionStore>) -> Self {
        Self { table, session }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Resolve `path` and decide whether the transition may proceed
    pub fn navigate(&self, path: &str) -> Navigation {
        debug!(path, "Navigating");

        let Some(matched) = self.table.resolve(path) else {
            return Navigation::NotFound {
                path: path.to_string(),
            };
        };

        match evaluate(matched.route, &self.session.snapshot()) {
            Decision::Allow => Navigation::Proceed(matched),
            Decision::RedirectToLogin => {
                info!(path, "Login required; redirecting to {}", LOGIN_PATH);
                Navigation::Redirect { to: LOGIN_PATH }
            }
            Decision::Deny => {
                info!(path, route = matched.route.name, "Access denied by role");
                Navigation::Blocked {
                    route: matched.route,
                }
            }
        }
    }
}
