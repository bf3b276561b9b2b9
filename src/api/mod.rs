//! HTTP access to the marketplace backend.
//!
//! Every request goes through [`ApiClient::execute`], which attaches the current
//! bearer credential and, on a 401, renews the pair once and replays the request.

pub mod auth;
pub mod bookings;
pub mod catalog;
pub mod payments;
pub mod providers;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::ApiError;
use crate::models::{Envelope, RefreshRequest, TokenPair};
use crate::session::{Session, TokenRenewer};

/// A replayable description of one backend call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn query_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    pub fn page(self, page: &PageParams) -> Self {
        self.query_opt("page", page.page).query_opt("size", page.size)
    }

    pub fn json(mut self, body: &impl Serialize) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::Decode(format!("failed to encode request body: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }
}

/// A request on its way through the interceptor. `retried` is set once the
/// request has been replayed after a renewal, and stops a second renewal.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub request: ApiRequest,
    pub retried: bool,
}

impl Attempt {
    pub fn first(request: ApiRequest) -> Self {
        Self {
            request,
            retried: false,
        }
    }

    pub fn retry(self) -> Self {
        Self {
            request: self.request,
            retried: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PageParams {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl PageParams {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page: Some(page),
            size: Some(size),
        }
    }
}

/// The renewal call. Posted directly, never through the interceptor.
struct RefreshEndpoint {
    http: reqwest::Client,
    url: String,
}

#[async_trait]
impl TokenRenewer for RefreshEndpoint {
    async fn renew(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        tracing::debug!("requesting credential renewal");
        let response = self
            .http
            .post(&self.url)
            .json(&RefreshRequest {
                refresh_token: refresh_token.to_string(),
            })
            .send()
            .await?;
        read_envelope::<TokenPair>(response)
            .await?
            .data
            .ok_or_else(|| ApiError::Decode("refresh response carried no tokens".to_string()))
    }
}

async fn read_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<Envelope<T>, ApiError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<Envelope<T>>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()));
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
        .ok()
        .and_then(|env| env.message);
    tracing::debug!(%status, message = message.as_deref(), "backend returned an error");
    Err(ApiError::from_status(status, message))
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<Session>,
    refresh: RefreshEndpoint,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: Arc<Session>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::new();
        Self {
            refresh: RefreshEndpoint {
                http: http.clone(),
                url: format!("{base_url}/auth/refresh"),
            },
            http,
            base_url,
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(
        &self,
        request: &ApiRequest,
        access_token: Option<&str>,
    ) -> Result<reqwest::Response, ApiError> {
        let mut builder = self
            .http
            .request(request.method.clone(), self.url(&request.path));
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = access_token {
            builder = builder.bearer_auth(token);
        }
        Ok(builder.send().await?)
    }

    /// Sends `request` and returns the decoded envelope.
    #[tracing::instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<Envelope<T>, ApiError> {
        let mut attempt = Attempt::first(request);
        loop {
            let access_token = self.session.access_token();
            let response = self.send(&attempt.request, access_token.as_deref()).await?;

            if response.status() == StatusCode::UNAUTHORIZED
                && !attempt.retried
                && self.session.refresh_token().is_some()
            {
                tracing::debug!("access credential rejected, renewing once");
                self.session
                    .renew(access_token.as_deref(), &self.refresh)
                    .await?;
                attempt = attempt.retry();
                continue;
            }

            return read_envelope(response).await;
        }
    }

    /// Like [`execute`](Self::execute) but requires a `data` payload.
    pub async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let path = request.path.clone();
        self.execute::<T>(request)
            .await?
            .data
            .ok_or_else(|| ApiError::Decode(format!("response for {path} carried no data")))
    }

    /// For writes whose payload the caller ignores. Returns the server message.
    pub async fn submit(&self, request: ApiRequest) -> Result<Option<String>, ApiError> {
        Ok(self.execute::<serde_json::Value>(request).await?.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let req = ApiRequest::get("/bookings/my-bookings")
            .query_opt("status", None::<&str>)
            .page(&PageParams::new(0, 20));
        assert_eq!(req.method, Method::GET);
        assert_eq!(
            req.query,
            vec![
                ("page".to_string(), "0".to_string()),
                ("size".to_string(), "20".to_string())
            ]
        );
        assert!(req.body.is_none());
    }

    #[test]
    fn test_retry_marks_attempt() {
        let attempt = Attempt::first(ApiRequest::get("/categories"));
        assert!(!attempt.retried);
        let replay = attempt.retry();
        assert!(replay.retried);
        assert_eq!(replay.request.path, "/categories");
    }

    #[test]
    fn test_url_joins_paths() {
        let client = ApiClient::new("http://localhost:8080/api/", Arc::new(Session::in_memory()));
        assert_eq!(client.base_url(), "http://localhost:8080/api");
        assert_eq!(client.url("/bookings/1"), "http://localhost:8080/api/bookings/1");
        assert_eq!(client.url("categories"), "http://localhost:8080/api/categories");
    }
}
