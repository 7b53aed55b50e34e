//! Login and registration endpoints

use async_trait::async_trait;
use reqwest::Method;

use crate::auth::{AuthBackend, Credentials, LoginResponse};
use crate::error::{Error, Result};

use super::client::ApiClient;
use super::models::{Registration, User};

#[async_trait]
impl AuthBackend for ApiClient {
    async fn authenticate(&self, credentials: &Credentials) -> Result<LoginResponse> {
        let request = self.request(Method::POST, "/auth/login")?.json(credentials);
        match self.fetch(request).await {
            // A 2xx whose body is empty or not a login record carries no token
            Err(Error::Json(_)) => Err(Error::AuthResponseMalformed),
            other => other,
        }
    }
}

impl ApiClient {
    /// `POST /users/register`; does not log the new user in
    pub async fn register(&self, registration: &Registration) -> Result<User> {
        let request = self
            .request(Method::POST, "/users/register")?
            .json(registration);
        self.fetch(request).await
    }
}
