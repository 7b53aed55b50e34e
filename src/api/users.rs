//! User administration endpoints

use reqwest::Method;

use crate::error::Result;

use super::client::ApiClient;
use super::models::User;

impl ApiClient {
    pub async fn list_users(&self) -> Result<Vec<User>> {
        let request = self.request(Method::GET, "/users")?;
        self.fetch(request).await
    }

    pub async fn get_user(&self, id: i64) -> Result<User> {
        let request = self.request(Method::GET, &format!("/users/{}", id))?;
        self.fetch(request).await
    }

    pub async fn create_user(&self, user: &User) -> Result<User> {
        let request = self.request(Method::POST, "/users")?.json(user);
        self.fetch(request).await
    }

    pub async fn update_user(&self, id: i64, user: &User) -> Result<User> {
        let request = self
            .request(Method::PUT, &format!("/users/{}", id))?
            .json(user);
        self.fetch(request).await
    }

    pub async fn delete_user(&self, id: i64) -> Result<()> {
        let request = self.request(Method::DELETE, &format!("/users/{}", id))?;
        self.send(request).await
    }
}
