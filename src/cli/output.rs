//! CLI output formatting utilities

use anyhow::Result;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use serde::Serialize;

use crate::api::{Book, BorrowStatus, BorrowingRecord, User};
use crate::auth::{Profile, SessionSnapshot};
use crate::config::OutputFormat;
use crate::router::{evaluate, Decision, RouteDescriptor};

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn warn(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

/// Print `value` as JSON or YAML, or hand it to `table` for the table format
pub fn emit<T, F>(format: OutputFormat, value: &T, table: F) -> Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T),
{
    match format {
        OutputFormat::Table => table(value),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
    }
    Ok(())
}

fn header(names: &[&str]) -> Vec<Cell> {
    names.iter().map(|n| Cell::new(n).fg(Color::Cyan)).collect()
}

fn new_table(names: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(names));
    table
}

/// Format a borrowing status as a colored string
pub fn format_status(status: &str) -> String {
    match status.parse::<BorrowStatus>() {
        Ok(BorrowStatus::Borrowed) => "Borrowed".green().to_string(),
        Ok(BorrowStatus::Reserved) => "Reserved".cyan().to_string(),
        Ok(BorrowStatus::Overdue) => "Overdue".red().to_string(),
        Ok(kind @ (BorrowStatus::Lost | BorrowStatus::Damaged)) => kind.to_string().red().to_string(),
        Ok(kind) => kind.to_string().dimmed().to_string(),
        Err(_) => status.to_string(),
    }
}

fn status_color(status: &str) -> Color {
    match status.parse::<BorrowStatus>() {
        Ok(BorrowStatus::Borrowed) => Color::Green,
        Ok(BorrowStatus::Reserved) => Color::Cyan,
        Ok(BorrowStatus::Overdue | BorrowStatus::Lost | BorrowStatus::Damaged) => Color::Red,
        _ => Color::Grey,
    }
}

/// Print a table of books
pub fn print_book_table(books: &[Book]) {
    if books.is_empty() {
        info("No books found.");
        return;
    }

    let mut table = new_table(&["ID", "Title", "Author", "ISBN", "Publisher", "Price", "Qty"]);
    for book in books {
        let qty_color = if book.quantity > 0 { Color::Green } else { Color::Red };
        table.add_row(vec![
            Cell::new(book.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())),
            Cell::new(&book.title),
            Cell::new(&book.author),
            Cell::new(&book.isbn),
            Cell::new(book.publisher.as_deref().unwrap_or("-")),
            Cell::new(format!("{:.2}", book.price)),
            Cell::new(book.quantity).fg(qty_color),
        ]);
    }

    println!("{table}");
}

/// Print detailed book information
pub fn print_book_detail(book: &Book) {
    println!("{}", "Book Details".bold().underline());
    println!();
    if let Some(id) = book.id {
        println!("  {} {}", "ID:".bold(), id);
    }
    println!("  {} {}", "Title:".bold(), book.title);
    println!("  {} {}", "Author:".bold(), book.author);
    println!("  {} {}", "ISBN:".bold(), book.isbn);
    if let Some(publisher) = &book.publisher {
        println!("  {} {}", "Publisher:".bold(), publisher);
    }
    println!("  {} {:.2}", "Price:".bold(), book.price);
    println!("  {} {}", "Available:".bold(), book.quantity);
}

/// Print a table of borrowing records
pub fn print_record_table(records: &[BorrowingRecord]) {
    if records.is_empty() {
        info("No borrowing records found.");
        return;
    }

    let mut table = new_table(&["ID", "Book", "User", "Borrowed", "Due", "Returned", "Status"]);
    for record in records {
        let book = match (&record.book_title, record.book_id) {
            (Some(title), _) => title.clone(),
            (None, Some(id)) => format!("#{}", id),
            (None, None) => "-".to_string(),
        };
        let status = record
            .status_kind()
            .map(|s| s.to_string())
            .unwrap_or_else(|| record.status.clone());

        table.add_row(vec![
            Cell::new(record.id),
            Cell::new(book),
            Cell::new(record.username.as_deref().unwrap_or("-")),
            Cell::new(
                record
                    .borrow_date
                    .or(record.reservation_date)
                    .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(
                record
                    .due_date
                    .or(record.reservation_expiry_date)
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(
                record
                    .return_date
                    .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(status).fg(status_color(&record.status)),
        ]);
    }

    println!("{table}");
}

/// Print a single borrowing record
pub fn print_record_detail(record: &BorrowingRecord) {
    let title = if record.is_reservation() {
        "Reservation"
    } else {
        "Borrowing Record"
    };
    println!("{}", title.bold().underline());
    println!();
    println!("  {} {}", "ID:".bold(), record.id);
    if let Some(book) = &record.book_title {
        println!("  {} {}", "Book:".bold(), book);
    }
    if let Some(user) = &record.username {
        println!("  {} {}", "User:".bold(), user);
    }
    println!("  {} {}", "Status:".bold(), format_status(&record.status));
    if let Some(due) = record.due_date {
        println!("  {} {}", "Due:".bold(), due.format("%Y-%m-%d"));
    }
    if let Some(expiry) = record.reservation_expiry_date {
        println!("  {} {}", "Hold until:".bold(), expiry.format("%Y-%m-%d"));
    }
}

/// Print a table of users
pub fn print_user_table(users: &[User]) {
    if users.is_empty() {
        info("No users found.");
        return;
    }

    let mut table = new_table(&["ID", "Username", "Role", "Enabled"]);
    for user in users {
        table.add_row(vec![
            Cell::new(user.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())),
            Cell::new(&user.username),
            Cell::new(user.role.as_deref().unwrap_or("-")),
            if user.enabled {
                Cell::new("yes").fg(Color::Green)
            } else {
                Cell::new("no").fg(Color::Red)
            },
        ]);
    }

    println!("{table}");
}

/// Print a single user
pub fn print_user_detail(user: &User) {
    println!("{}", "User Details".bold().underline());
    println!();
    if let Some(id) = user.id {
        println!("  {} {}", "ID:".bold(), id);
    }
    println!("  {} {}", "Username:".bold(), user.username);
    println!("  {} {}", "Role:".bold(), user.role.as_deref().unwrap_or("-"));
    let enabled = if user.enabled { "yes".green() } else { "no".red() };
    println!("  {} {}", "Enabled:".bold(), enabled);
}

/// Print the logged-in identity
pub fn print_profile(profile: &Profile) {
    println!("  {} {}", "User:".bold(), profile.username.cyan());
    if profile.roles.is_empty() {
        println!("  {} -", "Roles:".bold());
    } else {
        let roles: Vec<&str> = profile.roles.iter().map(String::as_str).collect();
        println!("  {} {}", "Roles:".bold(), roles.join(", "));
    }
}

/// Print every route with the decision the guard would make right now
pub fn print_route_access(routes: &[RouteDescriptor], session: &SessionSnapshot) {
    let mut table = new_table(&["Route", "Path", "Requires", "Access"]);
    for route in routes {
        let requires = if !route.requires_auth {
            "-".to_string()
        } else if route.allowed_roles.is_empty() {
            "login".to_string()
        } else {
            route.allowed_roles.join(" | ")
        };

        let access = match evaluate(route, session) {
            Decision::Allow => Cell::new("allowed").fg(Color::Green),
            Decision::RedirectToLogin => Cell::new("login required").fg(Color::Yellow),
            Decision::Deny => Cell::new("denied").fg(Color::Red),
        };

        table.add_row(vec![
            Cell::new(route.name),
            Cell::new(route.path),
            Cell::new(requires),
            access,
        ]);
    }

    println!("{table}");
}

/// Confirm an action with the user
pub fn confirm(message: &str) -> bool {
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .unwrap_or(false)
}
