//! Wire types for the library backend

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    pub author: String,
    pub isbn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    pub price: f64,
    pub quantity: i32,
}

impl Book {
    /// Client-side mirror of the backend's field validation
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Title cannot be blank".to_string());
        }
        if self.title.chars().count() > 255 {
            return Err("Title must be between 1 and 255 characters".to_string());
        }
        if self.author.trim().is_empty() {
            return Err("Author cannot be blank".to_string());
        }
        if self.isbn.trim().is_empty() {
            return Err("ISBN cannot be blank".to_string());
        }
        if !(self.price > 0.0) {
            return Err("Price must be positive".to_string());
        }
        if self.quantity <= 0 {
            return Err("Quantity must be a positive number".to_string());
        }
        Ok(())
    }
}

/// Search parameters for `GET /books`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookQuery {
    pub title: Option<String>,
    pub author: Option<String>,
}

impl BookQuery {
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs = Vec::new();
        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            pairs.push(("title", title));
        }
        if let Some(author) = self.author.as_deref().filter(|a| !a.is_empty()) {
            pairs.push(("author", author));
        }
        pairs
    }
}

/// Body for `POST /borrowings`; the backend takes the user from the token
/// when `user_id` is omitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub book_id: i64,
}

/// Body for `POST /borrowings/reservations`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub book_id: i64,
}

/// A borrowing or reservation record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowingRecord {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub book_id: Option<i64>,
    #[serde(default)]
    pub book_title: Option<String>,
    #[serde(default)]
    pub borrow_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub return_date: Option<NaiveDateTime>,
    /// Raw status string as sent by the server
    pub status: String,
    #[serde(default)]
    pub reservation_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub reservation_expiry_date: Option<NaiveDate>,
}

impl BorrowingRecord {
    /// Parsed status, `None` for values this client does not know
    pub fn status_kind(&self) -> Option<BorrowStatus> {
        self.status.parse().ok()
    }

    pub fn is_reservation(&self) -> bool {
        matches!(
            self.status_kind(),
            Some(
                BorrowStatus::Reserved
                    | BorrowStatus::ReservationCanceled
                    | BorrowStatus::ReservationExpired
            )
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BorrowStatus {
    Borrowed,
    Returned,
    Overdue,
    Reserved,
    ReservationCanceled,
    ReservationExpired,
    Lost,
    Damaged,
}

impl BorrowStatus {
    pub fn code(&self) -> &'static str {
        match self {
            BorrowStatus::Borrowed => "BORROWED",
            BorrowStatus::Returned => "RETURNED",
            BorrowStatus::Overdue => "OVERDUE",
            BorrowStatus::Reserved => "RESERVED",
            BorrowStatus::ReservationCanceled => "RESERVATION_CANCELED",
            BorrowStatus::ReservationExpired => "RESERVATION_EXPIRED",
            BorrowStatus::Lost => "LOST",
            BorrowStatus::Damaged => "DAMAGED",
        }
    }

    /// Still out of the library
    pub fn is_outstanding(&self) -> bool {
        matches!(self, BorrowStatus::Borrowed | BorrowStatus::Overdue)
    }
}

impl fmt::Display for BorrowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BorrowStatus::Borrowed => "Borrowed",
            BorrowStatus::Returned => "Returned",
            BorrowStatus::Overdue => "Overdue",
            BorrowStatus::Reserved => "Reserved",
            BorrowStatus::ReservationCanceled => "Reservation Canceled",
            BorrowStatus::ReservationExpired => "Reservation Expired",
            BorrowStatus::Lost => "Lost",
            BorrowStatus::Damaged => "Damaged",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for BorrowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace(' ', "_").as_str() {
            "BORROWED" => Ok(BorrowStatus::Borrowed),
            "RETURNED" => Ok(BorrowStatus::Returned),
            "OVERDUE" => Ok(BorrowStatus::Overdue),
            "RESERVED" => Ok(BorrowStatus::Reserved),
            "RESERVATION_CANCELED" | "RESERVATION_CANCELLED" => {
                Ok(BorrowStatus::ReservationCanceled)
            }
            "RESERVATION_EXPIRED" => Ok(BorrowStatus::ReservationExpired),
            "LOST" => Ok(BorrowStatus::Lost),
            "DAMAGED" => Ok(BorrowStatus::Damaged),
            other => Err(format!("unknown borrow status: {}", other)),
        }
    }
}

/// User account as exposed by `/users`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub username: String,
    /// Only ever sent, never shown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Body for `POST /users/register`
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_book() -> Book {
        Book {
            id: None,
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            isbn: "9780441013593".to_string(),
            publisher: None,
            price: 9.99,
            quantity: 3,
        }
    }

    #[test]
    fn test_book_validation() {
        assert!(sample_book().validate().is_ok());

        let mut book = sample_book();
        book.title = "  ".to_string();
        assert!(book.validate().is_err());

        let mut book = sample_book();
        book.price = 0.0;
        assert_eq!(book.validate().unwrap_err(), "Price must be positive");

        let mut book = sample_book();
        book.quantity = 0;
        assert!(book.validate().is_err());
    }

    #[test]
    fn test_new_book_omits_id() {
        let json = serde_json::to_value(sample_book()).unwrap();
        assert!(json.get("id").is_none());
        assert!(json.get("publisher").is_none());
    }

    #[test]
    fn test_book_query_skips_empty_filters() {
        let query = BookQuery {
            title: Some("dune".to_string()),
            author: Some(String::new()),
        };
        assert_eq!(query.pairs(), vec![("title", "dune")]);
        assert!(BookQuery::default().pairs().is_empty());
    }

    #[test]
    fn test_borrow_request_is_camel_case() {
        let json = serde_json::to_value(BorrowRequest {
            user_id: None,
            book_id: 5,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"bookId": 5}));
    }

    #[test]
    fn test_borrowing_record_from_server_json() {
        let record: BorrowingRecord = serde_json::from_str(
            r#"{
                "id": 11,
                "userId": 2,
                "username": "alice",
                "bookId": 5,
                "bookTitle": "Dune",
                "borrowDate": "2024-03-01T10:15:30",
                "dueDate": "2024-03-15",
                "returnDate": null,
                "status": "BORROWED"
            }"#,
        )
        .unwrap();
        assert_eq!(record.status_kind(), Some(BorrowStatus::Borrowed));
        assert_eq!(
            record.due_date,
            Some(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
        );
        assert!(!record.is_reservation());
    }

    #[test]
    fn test_unknown_status_is_preserved() {
        let record: BorrowingRecord =
            serde_json::from_str(r#"{"id": 1, "status": "IN_TRANSIT"}"#).unwrap();
        assert_eq!(record.status, "IN_TRANSIT");
        assert_eq!(record.status_kind(), None);
    }

    #[test]
    fn test_status_display_and_parse() {
        assert_eq!(
            BorrowStatus::ReservationCanceled.to_string(),
            "Reservation Canceled"
        );
        assert_eq!(
            "Reservation Canceled".parse::<BorrowStatus>(),
            Ok(BorrowStatus::ReservationCanceled)
        );
        assert!(BorrowStatus::Overdue.is_outstanding());
        assert!(!BorrowStatus::Returned.is_outstanding());
    }

    #[test]
    fn test_user_enabled_defaults_true() {
        let user: User = serde_json::from_str(r#"{"id":1,"username":"bob"}"#).unwrap();
        assert!(user.enabled);
        assert!(user.password.is_none());
    }
}
