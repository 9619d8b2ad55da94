//! Catalogue API client
//!
//! Joins resource paths onto the configured base URL and exposes one method
//! per verb the console uses.

use super::error::ApiError;
use super::http::HttpClient;
use anyhow::Result;
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;

/// Main API client
#[derive(Clone)]
pub struct ApiClient {
    pub http: HttpClient,
    base_url: String,
}

impl ApiClient {
    /// Create a client for `base_url` (no trailing slash needed)
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of a resource path such as `/actor/12`
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.http.send(Method::GET, &self.url(path), None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.http.send(Method::POST, &self.url(path), Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.http.send(Method::PATCH, &self.url(path), Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.http.send(Method::DELETE, &self.url(path), None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new("https://api.example.com/api:x/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "https://api.example.com/api:x");
        assert_eq!(client.url("/actor"), "https://api.example.com/api:x/actor");
        assert_eq!(client.url("actor/1"), "https://api.example.com/api:x/actor/1");
    }
}
