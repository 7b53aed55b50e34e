//! CLI command implementations

use anyhow::{anyhow, bail, Result};
use colored::Colorize;
use std::fs;

use crate::api::{Book, BookQuery, BorrowRequest, Registration, ReservationRequest, User};
use crate::cli::context::AppContext;
use crate::cli::{
    confirm, emit, error, info, login, print_book_detail, print_book_table, print_profile,
    print_record_detail, print_record_table, print_route_access, print_user_detail,
    print_user_table, success, warn, BooksAction, Commands, UsersAction,
};
use crate::config;
use crate::error::Error;

/// Initialize a new libris.toml configuration file
pub async fn init() -> Result<()> {
    let config_path = std::path::Path::new(config::loader::CONFIG_FILENAME);

    if config_path.exists() {
        warn("libris.toml already exists");
        return Ok(());
    }

    let content = config::loader::default_config_content();
    fs::write(config_path, content)?;

    success("Created libris.toml");
    info("Edit the api.base_url setting and run 'libris login' to get started");

    Ok(())
}

/// Run a command that goes through the router
pub async fn run(ctx: &AppContext, command: Commands) -> Result<()> {
    if let Commands::Logout = command {
        return logout(ctx);
    }

    let Some(path) = command.route_path() else {
        return Ok(());
    };
    if ctx.enter(&path).await?.is_none() {
        return Ok(());
    }

    let result = match command {
        Commands::Init | Commands::Logout => Ok(()),
        Commands::Status => status(ctx),
        Commands::Login { username, password } => {
            login::login_page(ctx, username, password).await.map(|_| ())
        }
        Commands::Whoami => whoami(ctx),
        Commands::Register {
            username,
            role,
            password,
        } => register(ctx, username, role, password).await,
        Commands::Books { action } => books(ctx, action).await,
        Commands::Borrow { book_id, user } => borrow(ctx, book_id, user).await,
        Commands::Return { record_id } => return_book(ctx, record_id).await,
        Commands::Renew { record_id } => renew(ctx, record_id).await,
        Commands::Reserve { book_id, user } => reserve(ctx, book_id, user).await,
        Commands::CancelReservation { reservation_id } => {
            cancel_reservation(ctx, reservation_id).await
        }
        Commands::History { user } => history(ctx, user).await,
        Commands::Overdue => overdue(ctx).await,
        Commands::Users { action } => users(ctx, action).await,
    };

    result.map_err(explain)
}

/// Add a next step to errors the user can act on
fn explain(err: anyhow::Error) -> anyhow::Error {
    match err.downcast_ref::<Error>() {
        Some(Error::Unauthenticated) => {
            warn("Your session is no longer valid. Run 'libris login' to sign in again.");
        }
        Some(Error::Network(_)) => {
            error("Could not reach the library server. Check api.base_url or LIBRIS_API_BASE_URL.");
        }
        _ => {}
    }
    err
}

/// Forget the stored session
pub fn logout(ctx: &AppContext) -> Result<()> {
    if !ctx.session.is_authenticated() {
        info("Not logged in");
    }
    ctx.session.logout();
    Ok(())
}

fn status(ctx: &AppContext) -> Result<()> {
    println!("{}", "Libris".bold().underline());
    println!();
    println!("  {} {}", "Server:".bold(), ctx.api.base_url().as_str().cyan());
    match ctx.session.profile() {
        Some(profile) if ctx.session.is_authenticated() => print_profile(&profile),
        _ if ctx.session.is_authenticated() => {
            println!("  {} logged in (profile unavailable)", "Session:".bold())
        }
        _ => println!("  {} {}", "Session:".bold(), "not logged in".yellow()),
    }
    println!();
    print_route_access(ctx.navigator.table().routes(), &ctx.session.snapshot());
    Ok(())
}

fn whoami(ctx: &AppContext) -> Result<()> {
    match ctx.session.profile() {
        Some(profile) if ctx.session.is_authenticated() => {
            emit(ctx.format, &profile, print_profile)
        }
        _ => {
            info("Not logged in");
            Ok(())
        }
    }
}

async fn register(
    ctx: &AppContext,
    username: String,
    role: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let registration = Registration {
        username,
        password: login::new_password(password)?,
        role,
    };

    let user = ctx.api.register(&registration).await?;
    success(&format!("Registered {}", user.username));
    info("Run 'libris login' to sign in");
    Ok(())
}

async fn books(ctx: &AppContext, action: BooksAction) -> Result<()> {
    match action {
        BooksAction::List { title, author } => {
            let books = ctx.api.list_books(&BookQuery { title, author }).await?;
            emit(ctx.format, books.as_slice(), print_book_table)
        }
        BooksAction::Show { id } => {
            let book = ctx.api.get_book(id).await?;
            emit(ctx.format, &book, print_book_detail)
        }
        BooksAction::Add {
            title,
            author,
            isbn,
            publisher,
            price,
            quantity,
        } => {
            let book = Book {
                id: None,
                title,
                author,
                isbn,
                publisher,
                price,
                quantity,
            };
            book.validate().map_err(|e| anyhow!(e))?;

            let created = ctx.api.create_book(&book).await?;
            success(&format!(
                "Added '{}' (id {})",
                created.title,
                created.id.map(|id| id.to_string()).unwrap_or_else(|| "?".to_string())
            ));
            Ok(())
        }
        BooksAction::Edit {
            id,
            title,
            author,
            isbn,
            publisher,
            price,
            quantity,
        } => {
            let mut book = ctx.api.get_book(id).await?;
            if let Some(title) = title {
                book.title = title;
            }
            if let Some(author) = author {
                book.author = author;
            }
            if let Some(isbn) = isbn {
                book.isbn = isbn;
            }
            if publisher.is_some() {
                book.publisher = publisher;
            }
            if let Some(price) = price {
                book.price = price;
            }
            if let Some(quantity) = quantity {
                book.quantity = quantity;
            }
            book.validate().map_err(|e| anyhow!(e))?;

            let updated = ctx.api.update_book(id, &book).await?;
            success(&format!("Updated '{}'", updated.title));
            Ok(())
        }
        BooksAction::Delete { id, force } => {
            if !force && !confirm(&format!("Delete book {}?", id)) {
                info("Cancelled");
                return Ok(());
            }
            ctx.api.delete_book(id).await?;
            success(&format!("Deleted book {}", id));
            Ok(())
        }
    }
}

async fn borrow(ctx: &AppContext, book_id: i64, user_id: Option<i64>) -> Result<()> {
    let record = ctx
        .api
        .borrow_book(&BorrowRequest { user_id, book_id })
        .await?;
    success("Book borrowed");
    emit(ctx.format, &record, print_record_detail)
}

async fn return_book(ctx: &AppContext, record_id: i64) -> Result<()> {
    let record = ctx.api.return_book(record_id).await?;
    success("Book returned");
    emit(ctx.format, &record, print_record_detail)
}

async fn renew(ctx: &AppContext, record_id: i64) -> Result<()> {
    let record = ctx.api.renew_book(record_id).await?;
    success("Loan renewed");
    emit(ctx.format, &record, print_record_detail)
}

async fn reserve(ctx: &AppContext, book_id: i64, user_id: Option<i64>) -> Result<()> {
    let record = ctx
        .api
        .reserve_book(&ReservationRequest { user_id, book_id })
        .await?;
    success("Book reserved");
    emit(ctx.format, &record, print_record_detail)
}

async fn cancel_reservation(ctx: &AppContext, reservation_id: i64) -> Result<()> {
    ctx.api.cancel_reservation(reservation_id).await?;
    success(&format!("Cancelled reservation {}", reservation_id));
    Ok(())
}

async fn history(ctx: &AppContext, user_id: Option<i64>) -> Result<()> {
    let records = match user_id {
        Some(id) => ctx.api.user_borrowing_history(id).await?,
        None => ctx.api.my_borrowing_history().await?,
    };
    emit(ctx.format, records.as_slice(), print_record_table)
}

async fn overdue(ctx: &AppContext) -> Result<()> {
    let records = ctx.api.overdue_books().await?;
    emit(ctx.format, records.as_slice(), print_record_table)
}

async fn users(ctx: &AppContext, action: UsersAction) -> Result<()> {
    match action {
        UsersAction::List => {
            let users = ctx.api.list_users().await?;
            emit(ctx.format, users.as_slice(), print_user_table)
        }
        UsersAction::Show { id } => {
            let user = ctx.api.get_user(id).await?;
            emit(ctx.format, &user, print_user_detail)
        }
        UsersAction::Create {
            username,
            role,
            password,
        } => {
            let user = User {
                id: None,
                username,
                password: Some(login::new_password(password)?),
                role,
                enabled: true,
            };
            let created = ctx.api.create_user(&user).await?;
            success(&format!("Created user {}", created.username));
            Ok(())
        }
        UsersAction::Update {
            id,
            username,
            role,
            enabled,
            password,
        } => {
            if username.is_none() && role.is_none() && enabled.is_none() && password.is_none() {
                bail!("Nothing to update; pass at least one of --username, --role, --enabled, --password");
            }

            let mut user = ctx.api.get_user(id).await?;
            if let Some(username) = username {
                user.username = username;
            }
            if role.is_some() {
                user.role = role;
            }
            if let Some(enabled) = enabled {
                user.enabled = enabled;
            }
            user.password = password;

            let updated = ctx.api.update_user(id, &user).await?;
            success(&format!("Updated user {}", updated.username));
            Ok(())
        }
        UsersAction::Delete { id, force } => {
            if !force && !confirm(&format!("Delete user {}?", id)) {
                info("Cancelled");
                return Ok(());
            }
            ctx.api.delete_user(id).await?;
            success(&format!("Deleted user {}", id));
            Ok(())
        }
    }
}
