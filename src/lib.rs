//! Libris - a terminal client for a library management backend
//!
//! The library exposes the pieces the `libris` binary is built from: the
//! session store, the route guard and navigator, and the typed API client.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod router;

pub use api::ApiClient;
pub use auth::SessionStore;
pub use config::Config;
pub use error::Error;
pub use router::Navigator;
