//! Static route table and path matching

use serde::Serialize;
use std::collections::BTreeMap;

use crate::auth::roles::{ADMIN, LIBRARIAN, USER};

/// Where unauthenticated transitions are sent
pub const LOGIN_PATH: &str = "/login";

/// Route metadata, fixed at build time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteDescriptor {
    pub name: &'static str,
    /// Path pattern; `:name` segments match any single segment
    pub path: &'static str,
    pub requires_auth: bool,
    /// Empty means any authenticated user
    pub allowed_roles: &'static [&'static str],
}

impl RouteDescriptor {
    pub const fn public(name: &'static str, path: &'static str) -> Self {
        Self {
            name,
            path,
            requires_auth: false,
            allowed_roles: &[],
        }
    }

    pub const fn authenticated(name: &'static str, path: &'static str) -> Self {
        Self {
            name,
            path,
            requires_auth: true,
            allowed_roles: &[],
        }
    }

    pub const fn restricted(
        name: &'static str,
        path: &'static str,
        allowed_roles: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            path,
            requires_auth: true,
            allowed_roles,
        }
    }

    /// Match a concrete path against this pattern, capturing `:params`
    pub fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let pattern: Vec<&str> = segments(self.path).collect();
        let actual: Vec<&str> = segments(path).collect();
        if pattern.len() != actual.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (expected, got) in pattern.iter().zip(&actual) {
            if let Some(name) = expected.strip_prefix(':') {
                params.insert(name.to_string(), (*got).to_string());
            } else if expected != got {
                return None;
            }
        }
        Some(params)
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    let path = path.split(['?', '#']).next().unwrap_or("");
    path.split('/').filter(|s| !s.is_empty())
}

const ANY_MEMBER: &[&str] = &[USER, LIBRARIAN, ADMIN];
const STAFF: &[&str] = &[LIBRARIAN, ADMIN];
const ADMIN_ONLY: &[&str] = &[ADMIN];

/// The application's routes. Literal routes precede parameterized siblings.
pub const ROUTES: &[RouteDescriptor] = &[
    RouteDescriptor::public("home", "/"),
    RouteDescriptor::public("login", LOGIN_PATH),
    RouteDescriptor::public("register", "/register"),
    RouteDescriptor::authenticated("books", "/books"),
    RouteDescriptor::restricted("add-book", "/books/add", ADMIN_ONLY),
    RouteDescriptor::restricted("edit-book", "/books/edit/:id", ADMIN_ONLY),
    RouteDescriptor::restricted("delete-book", "/books/delete/:id", ADMIN_ONLY),
    RouteDescriptor::authenticated("book-detail", "/books/:id"),
    RouteDescriptor::restricted("borrowings", "/borrowings", ANY_MEMBER),
    RouteDescriptor::authenticated("my-history", "/borrowings/history"),
    RouteDescriptor::restricted("overdue", "/borrowings/overdue", STAFF),
    RouteDescriptor::restricted("user-history", "/users/:id/history", STAFF),
    RouteDescriptor::restricted("users", "/users", ADMIN_ONLY),
    RouteDescriptor::restricted("user-detail", "/users/:id", ADMIN_ONLY),
];

/// A resolved route plus the parameters captured from the path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub route: &'static RouteDescriptor,
    pub params: BTreeMap<String, String>,
}

impl RouteMatch {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Ordered route lookup
#[derive(Debug, Clone, Copy)]
pub struct RouteTable {
    routes: &'static [RouteDescriptor],
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(ROUTES)
    }
}

impl RouteTable {
    pub const fn new(routes: &'static [RouteDescriptor]) -> Self {
        Self { routes }
    }

    /// First route whose pattern matches `path`
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        self.routes.iter().find_map(|route| {
            route
                .matches(path)
                .map(|params| RouteMatch { route, params })
        })
    }

    pub fn by_name(&self, name: &str) -> Option<&'static RouteDescriptor> {
        self.routes.iter().find(|route| route.name == name)
    }

    pub fn routes(&self) -> &'static [RouteDescriptor] {
        self.routes
    }
}
