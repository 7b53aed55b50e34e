//! Client for the library backend's REST API

mod auth;
mod books;
mod borrowings;
pub mod client;
pub mod models;
mod users;

pub use client::ApiClient;
pub use models::*;
