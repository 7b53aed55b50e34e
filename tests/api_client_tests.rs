//! API client tests against an in-process fake backend
//! Covers header stamping, the 401 hook and the typed endpoints

use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use libris::api::{ApiClient, BookQuery, BorrowRequest, BorrowStatus, ReservationRequest};
use libris::auth::{roles, Credentials, MemoryStorage, SessionStore};
use libris::config::ApiConfig;
use libris::error::Error;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

const TOKEN: &str = "abc123";

/// What the fake backend saw and how it should behave
#[derive(Clone, Default)]
struct Backend {
    auth_headers: Arc<Mutex<Vec<Option<String>>>>,
    last_body: Arc<Mutex<Option<Value>>>,
}

impl Backend {
    fn record(&self, headers: &HeaderMap) -> Result<(), StatusCode> {
        let value = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let authorized = value.as_deref() == Some(format!("Bearer {}", TOKEN).as_str());
        self.auth_headers.lock().unwrap().push(value);
        if authorized {
            Ok(())
        } else {
            Err(StatusCode::UNAUTHORIZED)
        }
    }

    fn seen(&self) -> Vec<Option<String>> {
        self.auth_headers.lock().unwrap().clone()
    }
}

fn book(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "author": "Frank Herbert",
        "isbn": "9780441013593",
        "publisher": "Ace",
        "price": 9.99,
        "quantity": 3
    })
}

fn record(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "userId": 2,
        "username": "alice",
        "bookId": 1,
        "bookTitle": "Dune",
        "borrowDate": "2024-03-01T10:00:00",
        "dueDate": "2024-03-15",
        "status": status
    })
}

async fn login(Json(body): Json<Value>) -> Response {
    match (body["username"].as_str(), body["password"].as_str()) {
        (Some("alice"), Some("secret")) => Json(json!({
            "token": TOKEN,
            "username": "alice",
            "roles": ["ROLE_ADMIN"]
        }))
        .into_response(),
        (Some("broken"), _) => Json(json!({ "username": "broken", "roles": [] })).into_response(),
        // 200 with nothing in the body
        (Some("silent"), _) => StatusCode::OK.into_response(),
        _ => StatusCode::UNAUTHORIZED.into_response(),
    }
}

async fn register(State(backend): State<Backend>, Json(body): Json<Value>) -> Json<Value> {
    let username = body["username"].clone();
    *backend.last_body.lock().unwrap() = Some(body);
    Json(json!({ "id": 7, "username": username, "role": "ROLE_USER", "enabled": true }))
}

async fn list_books(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    backend.record(&headers)?;
    let books = [book(1, "Dune"), book(2, "Children of Dune"), book(3, "Hyperion")];
    let filtered: Vec<Value> = books
        .into_iter()
        .filter(|b| match query.get("title") {
            Some(title) => b["title"]
                .as_str()
                .unwrap_or_default()
                .to_lowercase()
                .contains(&title.to_lowercase()),
            None => true,
        })
        .collect();
    Ok(Json(Value::Array(filtered)))
}

async fn get_book(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    backend
        .record(&headers)
        .map_err(|status| (status, Json(json!({}))))?;
    if id == 1 {
        Ok(Json(book(1, "Dune")))
    } else {
        Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "status": 404, "message": format!("Book not found with id: {}", id) })),
        ))
    }
}

async fn delete_book(
    State(backend): State<Backend>,
    headers: HeaderMap,
) -> Result<StatusCode, StatusCode> {
    backend.record(&headers)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn borrow(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    backend.record(&headers)?;
    *backend.last_body.lock().unwrap() = Some(body);
    Ok(Json(record(10, "BORROWED")))
}

async fn reserve(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    backend.record(&headers)?;
    *backend.last_body.lock().unwrap() = Some(body);
    Ok(Json(json!({
        "id": 11,
        "bookId": 1,
        "status": "RESERVED",
        "reservationDate": "2024-03-01T10:00:00",
        "reservationExpiryDate": "2024-03-04"
    })))
}

async fn return_book(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Value>, StatusCode> {
    backend.record(&headers)?;
    let mut returned = record(id, "RETURNED");
    returned["returnDate"] = json!("2024-03-10T16:30:00");
    Ok(Json(returned))
}

async fn overdue(State(backend): State<Backend>, headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    backend.record(&headers)?;
    Ok(Json(json!([record(4, "OVERDUE"), record(5, "OVERDUE")])))
}

/// Answers 200 with a body that is not JSON, like a misrouted proxy page
async fn html_page(State(backend): State<Backend>, headers: HeaderMap) -> Result<String, StatusCode> {
    backend.record(&headers)?;
    Ok("<html><body>Maintenance</body></html>".to_string())
}

/// Always rejects, as if the token had been revoked server-side
async fn revoked() -> StatusCode {
    StatusCode::UNAUTHORIZED
}

async fn start_backend() -> (SocketAddr, Backend) {
    let backend = Backend::default();
    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/users/register", post(register))
        .route("/books", get(list_books))
        .route("/books/{id}", get(get_book).delete(delete_book))
        .route("/borrowings", post(borrow))
        .route("/borrowings/reservations", post(reserve))
        .route("/borrowings/{id}/return", put(return_book))
        .route("/borrowings/overdue", get(overdue))
        .route("/borrowings/history/me", get(html_page))
        .route("/users", get(revoked))
        .route("/users/{id}", delete(revoked))
        .with_state(backend.clone());
    let app = Router::new().nest("/api/v1", api);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, backend)
}

fn client(addr: SocketAddr) -> ApiClient {
    let config = ApiConfig {
        base_url: format!("http://{}/api/v1", addr),
        timeout_secs: 5,
    };
    ApiClient::new(&config, Arc::new(SessionStore::new(MemoryStorage::new()))).unwrap()
}

async fn logged_in_client(addr: SocketAddr) -> ApiClient {
    let api = client(addr);
    api.session()
        .login(&api, &Credentials::new("alice", "secret"))
        .await
        .unwrap();
    api
}

#[tokio::test]
async fn test_login_end_to_end() {
    let (addr, _backend) = start_backend().await;
    let api = client(addr);

    let profile = api
        .session()
        .login(&api, &Credentials::new("alice", "secret"))
        .await
        .unwrap();

    assert_eq!(profile.username, "alice");
    assert!(profile.has_role(roles::ADMIN));
    assert_eq!(api.session().token().as_deref(), Some(TOKEN));
}

#[tokio::test]
async fn test_wrong_password_is_unauthenticated() {
    let (addr, _backend) = start_backend().await;
    let api = client(addr);

    let result = api
        .session()
        .login(&api, &Credentials::new("alice", "nope"))
        .await;

    assert!(matches!(result, Err(Error::Unauthenticated)));
    assert!(!api.session().is_authenticated());
}

#[tokio::test]
async fn test_login_without_token_is_malformed() {
    let (addr, _backend) = start_backend().await;
    let api = client(addr);

    let result = api
        .session()
        .login(&api, &Credentials::new("broken", "x"))
        .await;

    assert!(matches!(result, Err(Error::AuthResponseMalformed)));
    assert!(!api.session().is_authenticated());
}

#[tokio::test]
async fn test_login_with_empty_body_is_malformed() {
    let (addr, _backend) = start_backend().await;
    let api = client(addr);

    let result = api
        .session()
        .login(&api, &Credentials::new("silent", "x"))
        .await;

    assert!(matches!(result, Err(Error::AuthResponseMalformed)));
    assert!(!api.session().is_authenticated());
    assert!(api.session().profile().is_none());
}

#[tokio::test]
async fn test_undecodable_body_is_not_a_network_error() {
    let (addr, _backend) = start_backend().await;
    let api = logged_in_client(addr).await;

    let result = api.my_borrowing_history().await;

    assert!(matches!(result, Err(Error::Json(_))));
    assert!(api.session().is_authenticated());
}

#[tokio::test]
async fn test_requests_carry_bearer_after_login_only() {
    let (addr, backend) = start_backend().await;
    let api = client(addr);

    let anonymous = api.list_books(&BookQuery::default()).await;
    assert!(matches!(anonymous, Err(Error::Unauthenticated)));

    api.session()
        .login(&api, &Credentials::new("alice", "secret"))
        .await
        .unwrap();
    let books = api.list_books(&BookQuery::default()).await.unwrap();
    assert_eq!(books.len(), 3);

    api.session().logout();
    let after_logout = api.list_books(&BookQuery::default()).await;
    assert!(matches!(after_logout, Err(Error::Unauthenticated)));

    let bearer = format!("Bearer {}", TOKEN);
    assert_eq!(backend.seen(), vec![None, Some(bearer), None]);
}

#[tokio::test]
async fn test_unauthorized_response_clears_session() {
    let (addr, _backend) = start_backend().await;
    let api = logged_in_client(addr).await;
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    api.session()
        .on_change(move |event| sink.lock().unwrap().push(event.is_authenticated));

    let result = api.list_users().await;

    assert!(result.unwrap_err().is_unauthenticated());
    assert!(!api.session().is_authenticated());
    assert!(api.session().profile().is_none());
    assert_eq!(*events.lock().unwrap(), vec![false]);

    // A second 401 with nobody logged in changes nothing
    let again = api.delete_user(3).await;
    assert!(matches!(again, Err(Error::Unauthenticated)));
    assert_eq!(events.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_book_query_filters() {
    let (addr, _backend) = start_backend().await;
    let api = logged_in_client(addr).await;

    let query = BookQuery {
        title: Some("dune".to_string()),
        author: None,
    };
    let books = api.list_books(&query).await.unwrap();
    let titles: Vec<&str> = books.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["Dune", "Children of Dune"]);
}

#[tokio::test]
async fn test_api_error_carries_server_message() {
    let (addr, _backend) = start_backend().await;
    let api = logged_in_client(addr).await;

    let book = api.get_book(1).await.unwrap();
    assert_eq!(book.publisher.as_deref(), Some("Ace"));

    match api.get_book(99).await {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Book not found with id: 99");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
    assert!(api.session().is_authenticated());
}

#[tokio::test]
async fn test_delete_accepts_empty_body() {
    let (addr, _backend) = start_backend().await;
    let api = logged_in_client(addr).await;

    api.delete_book(1).await.unwrap();
}

#[tokio::test]
async fn test_borrowing_lifecycle() {
    let (addr, backend) = start_backend().await;
    let api = logged_in_client(addr).await;

    let borrowed = api
        .borrow_book(&BorrowRequest {
            user_id: None,
            book_id: 1,
        })
        .await
        .unwrap();
    assert_eq!(borrowed.status_kind(), Some(BorrowStatus::Borrowed));
    assert_eq!(
        borrowed.due_date.map(|d| d.to_string()).as_deref(),
        Some("2024-03-15")
    );
    assert_eq!(
        backend.last_body.lock().unwrap().clone(),
        Some(json!({ "bookId": 1 }))
    );

    let returned = api.return_book(borrowed.id).await.unwrap();
    assert_eq!(returned.id, 10);
    assert_eq!(returned.status_kind(), Some(BorrowStatus::Returned));
    assert!(returned.return_date.is_some());

    let reservation = api
        .reserve_book(&ReservationRequest {
            user_id: Some(2),
            book_id: 1,
        })
        .await
        .unwrap();
    assert!(reservation.is_reservation());
    assert_eq!(
        backend.last_body.lock().unwrap().clone(),
        Some(json!({ "userId": 2, "bookId": 1 }))
    );

    let overdue = api.overdue_books().await.unwrap();
    assert_eq!(overdue.len(), 2);
    assert!(overdue
        .iter()
        .all(|r| r.status_kind() == Some(BorrowStatus::Overdue)));
}

#[tokio::test]
async fn test_register_does_not_log_in() {
    let (addr, backend) = start_backend().await;
    let api = client(addr);

    let user = api
        .register(&libris::api::Registration {
            username: "dave".to_string(),
            password: "pw".to_string(),
            role: None,
        })
        .await
        .unwrap();

    assert_eq!(user.id, Some(7));
    assert_eq!(user.username, "dave");
    assert!(!api.session().is_authenticated());
    assert_eq!(
        backend.last_body.lock().unwrap().clone(),
        Some(json!({ "username": "dave", "password": "pw" }))
    );
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    // Bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = client(addr);
    let result = api.list_books(&BookQuery::default()).await;
    assert!(matches!(result, Err(Error::Network(_))));
}
