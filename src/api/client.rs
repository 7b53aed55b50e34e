//! REST client for the library backend
//!
//! Every request passes through two hooks:
//! - on the way out, the session's outbound headers are merged in, so an
//!   authenticated session always sends `Authorization: Bearer <token>`;
//! - on the way back, HTTP 401 invalidates the local session before the
//!   error is returned, so a token the server has revoked is never resent.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::SessionStore;
use crate::config::ApiConfig;
use crate::error::{Error, Result};

/// HTTP client bound to one backend and one session
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: Arc<SessionStore>) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for an endpoint path such as `/books/1`
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| Error::InvalidUrl(format!("{}: {}", joined, e)))
    }

    /// Start a request with the session's outbound headers applied
    pub(crate) fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        self.request_with_query(method, path, &[])
    }

    pub(crate) fn request_with_query(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<RequestBuilder> {
        let mut url = self.endpoint(path)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        debug!(%method, %url, "Sending request");
        Ok(self
            .http
            .request(method, url)
            .headers(self.session.outbound_headers()))
    }

    /// Send a request and apply the response hook
    pub(crate) async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "Request did not complete");
            Error::Network(e)
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.session.invalidate();
            return Err(Error::Unauthenticated);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(status, &body);
            debug!(status = status.as_u16(), %message, "Request failed");
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    /// Send a request and decode its JSON body
    ///
    /// A body that arrives but does not decode is `Error::Json`, not `Network`.
    pub(crate) async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.execute(request).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| {
            debug!(error = %e, bytes = body.len(), "Response body is not the expected JSON");
            Error::Json(e)
        })
    }

    /// For endpoints whose body, if any, is not needed
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<()> {
        self.execute(request).await?;
        Ok(())
    }
}

/// Pull a readable message out of an error body
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for field in ["message", "error", "detail"] {
            if let Some(message) = value.get(field).and_then(|v| v.as_str()) {
                if !message.is_empty() {
                    return message.to_string();
                }
            }
        }
    }

    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}
