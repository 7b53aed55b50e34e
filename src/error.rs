//! Error types for Libris

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config file not found. Run 'libris init' first.")]
    ConfigNotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Session storage error: {0}")]
    Storage(String),

    /// The request never completed (connection refused, timeout, dropped body).
    #[error("Network failure: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered 401; the local session has already been cleared.
    #[error("Not authenticated: the server rejected the session credentials")]
    Unauthenticated,

    #[error("Login response did not contain a token")]
    AuthResponseMalformed,

    /// A logout or invalidation happened while the login request was in flight.
    #[error("Login was superseded by a later session change")]
    LoginSuperseded,

    #[error("Server returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the error means the caller must log in again
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Error::Unauthenticated)
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
