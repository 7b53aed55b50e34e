//! Authentication models

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Role names as issued by the backend
pub mod roles {
    pub const ADMIN: &str = "ROLE_ADMIN";
    pub const LIBRARIAN: &str = "ROLE_LIBRARIAN";
    pub const USER: &str = "ROLE_USER";
}

/// Login credentials, sent verbatim to `POST /auth/login`
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Keep the password out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Cached identity claims for the logged-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    #[serde(default)]
    pub roles: BTreeSet<String>,
}

impl Profile {
    pub fn new<I, S>(username: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            username: username.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.roles.is_empty() {
            return write!(f, "{}", self.username);
        }
        let roles: Vec<&str> = self.roles.iter().map(String::as_str).collect();
        write!(f, "{} ({})", self.username, roles.join(", "))
    }
}

/// Body of a successful `POST /auth/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Absent or empty means the response is malformed
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl LoginResponse {
    /// Split into token and profile, or `None` if the token is missing
    pub fn into_session(self) -> Option<(String, Profile)> {
        let token = self.token.filter(|t| !t.is_empty())?;
        Some((token, Profile::new(self.username, self.roles)))
    }
}

/// Payload delivered to session observers on every login and logout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEvent {
    pub is_authenticated: bool,
    pub user: Option<Profile>,
}

impl SessionEvent {
    pub fn logged_in(profile: Profile) -> Self {
        Self {
            is_authenticated: true,
            user: Some(profile),
        }
    }

    pub fn logged_out() -> Self {
        Self {
            is_authenticated: false,
            user: None,
        }
    }
}
