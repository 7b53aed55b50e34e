//! Navigation guard
//!
//! Decides whether a transition into a route may proceed, given a snapshot of
//! the session. Checks run in a fixed order: public routes always pass, then
//! login is required, then the role set is consulted.

use tracing::debug;

use crate::auth::SessionSnapshot;

use super::routes::RouteDescriptor;

/// Outcome of evaluating one transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// Not logged in; the transition is rewritten to the login route
    RedirectToLogin,
    /// Logged in, but holding none of the route's allowed roles
    Deny,
}

/// Evaluate a transition. Pure: the same inputs always give the same decision.
pub fn evaluate(route: &RouteDescriptor, session: &SessionSnapshot) -> Decision {
    let decision = if !route.requires_auth {
        Decision::Allow
    } else if !session.authenticated {
        Decision::RedirectToLogin
    } else if !route.allowed_roles.is_empty()
        && !route
            .allowed_roles
            .iter()
            .any(|role| session.roles.contains(*role))
    {
        Decision::Deny
    } else {
        Decision::Allow
    };

    debug!(route = route.name, path = route.path, ?decision, "Guard evaluated");
    decision
}
