//! Catalog endpoints

use reqwest::Method;

use crate::error::Result;

use super::client::ApiClient;
use super::models::{Book, BookQuery};

impl ApiClient {
    /// `GET /books`, optionally filtered by title and author
    pub async fn list_books(&self, query: &BookQuery) -> Result<Vec<Book>> {
        let request = self.request_with_query(Method::GET, "/books", &query.pairs())?;
        self.fetch(request).await
    }

    pub async fn get_book(&self, id: i64) -> Result<Book> {
        let request = self.request(Method::GET, &format!("/books/{}", id))?;
        self.fetch(request).await
    }

    pub async fn create_book(&self, book: &Book) -> Result<Book> {
        let request = self.request(Method::POST, "/books")?.json(book);
        self.fetch(request).await
    }

    pub async fn update_book(&self, id: i64, book: &Book) -> Result<Book> {
        let request = self
            .request(Method::PUT, &format!("/books/{}", id))?
            .json(book);
        self.fetch(request).await
    }

    pub async fn delete_book(&self, id: i64) -> Result<()> {
        let request = self.request(Method::DELETE, &format!("/books/{}", id))?;
        self.send(request).await
    }
}
