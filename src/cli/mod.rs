//! CLI interface for Libris
//!
//! Each command is a navigation: it names a route path, the navigator runs the
//! guard against the current session, and only an allowed transition reaches
//! the API.

pub mod commands;
pub mod context;
pub mod login;
mod output;

pub use output::*;

pub use crate::config::OutputFormat;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "libris")]
#[command(author = "Krakaw")]
#[command(version)]
#[command(about = "Browse the catalog, borrow books and manage users of a library backend", long_about = None)]
pub struct Cli {
    /// Path to libris.toml (searched upward from the current directory by default)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, e.g. http://localhost:8080/api/v1
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Output format (defaults to the config file's setting)
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default libris.toml in the current directory
    Init,

    /// Show the backend, the session and which routes are reachable
    Status,

    /// Log in and keep the session for later commands
    Login {
        /// Username (prompted for if omitted)
        #[arg(short, long)]
        username: Option<String>,

        /// Password (prompted for if omitted)
        #[arg(long, env = "LIBRIS_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Create a new account
    Register {
        /// Username for the new account
        username: String,

        /// Requested role, e.g. ROLE_USER
        #[arg(short, long)]
        role: Option<String>,

        /// Password (prompted for if omitted)
        #[arg(long, env = "LIBRIS_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Browse and manage the catalog
    Books {
        #[command(subcommand)]
        action: BooksAction,
    },

    /// Borrow a book
    Borrow {
        /// ID of the book to borrow
        book_id: i64,

        /// Borrow on behalf of another user (staff only on the server side)
        #[arg(long)]
        user: Option<i64>,
    },

    /// Return a borrowed book
    Return {
        /// Borrowing record ID
        record_id: i64,
    },

    /// Extend the due date of a borrowed book
    Renew {
        /// Borrowing record ID
        record_id: i64,
    },

    /// Reserve a book that is currently unavailable
    Reserve {
        /// ID of the book to reserve
        book_id: i64,

        #[arg(long)]
        user: Option<i64>,
    },

    /// Cancel a reservation
    CancelReservation {
        /// Reservation record ID
        reservation_id: i64,
    },

    /// Show borrowing history (your own, or another user's with --user)
    History {
        #[arg(short, long)]
        user: Option<i64>,
    },

    /// List overdue borrowings
    Overdue,

    /// Manage user accounts
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
}

#[derive(Subcommand)]
pub enum BooksAction {
    /// List books, optionally filtered
    List {
        /// Case-insensitive partial title match
        #[arg(short, long)]
        title: Option<String>,

        /// Case-insensitive partial author match
        #[arg(short, long)]
        author: Option<String>,
    },

    /// Show one book
    Show { id: i64 },

    /// Add a book to the catalog
    Add {
        #[arg(long)]
        title: String,

        #[arg(long)]
        author: String,

        #[arg(long)]
        isbn: String,

        #[arg(long)]
        publisher: Option<String>,

        #[arg(long)]
        price: f64,

        #[arg(long)]
        quantity: i32,
    },

    /// Change fields of an existing book
    Edit {
        id: i64,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        author: Option<String>,

        #[arg(long)]
        isbn: Option<String>,

        #[arg(long)]
        publisher: Option<String>,

        #[arg(long)]
        price: Option<f64>,

        #[arg(long)]
        quantity: Option<i32>,
    },

    /// Remove a book from the catalog
    Delete {
        id: i64,

        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum UsersAction {
    /// List all users
    List,

    /// Show one user
    Show { id: i64 },

    /// Create a user
    Create {
        username: String,

        #[arg(short, long)]
        role: Option<String>,

        #[arg(long, env = "LIBRIS_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Change fields of an existing user
    Update {
        id: i64,

        #[arg(long)]
        username: Option<String>,

        #[arg(short, long)]
        role: Option<String>,

        #[arg(long)]
        enabled: Option<bool>,

        #[arg(long)]
        password: Option<String>,
    },

    /// Delete a user
    Delete {
        id: i64,

        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

impl Commands {
    /// Route path this command navigates to; `None` for commands outside the router
    pub fn route_path(&self) -> Option<String> {
        let path = match self {
            Commands::Init | Commands::Logout => return None,
            Commands::Status | Commands::Whoami => "/".to_string(),
            Commands::Login { .. } => crate::router::LOGIN_PATH.to_string(),
            Commands::Register { .. } => "/register".to_string(),
            Commands::Books { action } => match action {
                BooksAction::List { .. } => "/books".to_string(),
                BooksAction::Show { id } => format!("/books/{}", id),
                BooksAction::Add { .. } => "/books/add".to_string(),
                BooksAction::Edit { id, .. } => format!("/books/edit/{}", id),
                BooksAction::Delete { id, .. } => format!("/books/delete/{}", id),
            },
            Commands::Borrow { .. }
            | Commands::Return { .. }
            | Commands::Renew { .. }
            | Commands::Reserve { .. }
            | Commands::CancelReservation { .. } => "/borrowings".to_string(),
            Commands::History { user: None } => "/borrowings/history".to_string(),
            Commands::History { user: Some(id) } => format!("/users/{}/history", id),
            Commands::Overdue => "/borrowings/overdue".to_string(),
            Commands::Users { action } => match action {
                UsersAction::List | UsersAction::Create { .. } => "/users".to_string(),
                UsersAction::Show { id }
                | UsersAction::Update { id, .. }
                | UsersAction::Delete { id, .. } => format!("/users/{}", id),
            },
        };
        Some(path)
    }
}
