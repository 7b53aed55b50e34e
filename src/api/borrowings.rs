//! Borrowing lifecycle endpoints
//!
//! Borrow and reserve omit the user id by default; the backend resolves the
//! user from the bearer token.

use reqwest::Method;

use crate::error::Result;

use super::client::ApiClient;
use super::models::{BorrowRequest, BorrowingRecord, ReservationRequest};

impl ApiClient {
    pub async fn borrow_book(&self, request: &BorrowRequest) -> Result<BorrowingRecord> {
        let request = self.request(Method::POST, "/borrowings")?.json(request);
        self.fetch(request).await
    }

    pub async fn return_book(&self, record_id: i64) -> Result<BorrowingRecord> {
        let request = self.request(Method::PUT, &format!("/borrowings/{}/return", record_id))?;
        self.fetch(request).await
    }

    pub async fn renew_book(&self, record_id: i64) -> Result<BorrowingRecord> {
        let request = self.request(Method::PUT, &format!("/borrowings/{}/renew", record_id))?;
        self.fetch(request).await
    }

    /// The returned record has status `RESERVED`
    pub async fn reserve_book(&self, request: &ReservationRequest) -> Result<BorrowingRecord> {
        let request = self
            .request(Method::POST, "/borrowings/reservations")?
            .json(request);
        self.fetch(request).await
    }

    pub async fn cancel_reservation(&self, reservation_id: i64) -> Result<()> {
        let request = self.request(
            Method::DELETE,
            &format!("/borrowings/reservations/{}", reservation_id),
        )?;
        self.send(request).await
    }

    /// History of the logged-in user
    pub async fn my_borrowing_history(&self) -> Result<Vec<BorrowingRecord>> {
        let request = self.request(Method::GET, "/borrowings/history/me")?;
        self.fetch(request).await
    }

    pub async fn overdue_books(&self) -> Result<Vec<BorrowingRecord>> {
        let request = self.request(Method::GET, "/borrowings/overdue")?;
        self.fetch(request).await
    }

    pub async fn user_borrowing_history(&self, user_id: i64) -> Result<Vec<BorrowingRecord>> {
        let request = self.request(
            Method::GET,
            &format!("/borrowings/history/user/{}", user_id),
        )?;
        self.fetch(request).await
    }
}
