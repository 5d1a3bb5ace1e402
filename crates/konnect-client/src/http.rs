//! HTTP transport adapter for the Connect REST API.
//!
//! One request path for every verb: a fixed request timeout, non-2xx mapped
//! to [`Error::Api`] with the raw body text, and a JSON body returned only
//! when the server says the payload is JSON.

use crate::error::{Error, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Fixed per-request timeout; the only cancellation mechanism.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Thin wrapper around a [`reqwest::Client`] bound to one base URL.
#[derive(Debug, Clone)]
pub struct Http {
    client: reqwest::Client,
    base_url: String,
}

impl Http {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::connection(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(&self, path: &str) -> Result<Option<Value>> {
        self.execute(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Option<&Value>) -> Result<Option<Value>> {
        self.execute(Method::POST, path, body).await
    }

    pub async fn put(&self, path: &str, body: Option<&Value>) -> Result<Option<Value>> {
        self.execute(Method::PUT, path, body).await
    }

    pub async fn delete(&self, path: &str) -> Result<Option<Value>> {
        self.execute(Method::DELETE, path, None).await
    }

    /// Issue one request. 2xx with a JSON content type yields the parsed
    /// body; 2xx with any other content type yields `None` (success, empty
    /// payload). Any non-2xx status is an [`Error::Api`].
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Option<Value>> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "sending request");

        let mut request = self.client.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::connection(format!("{method} {url}: {e}")))?;

        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| {
                v.split(';')
                    .next()
                    .unwrap_or("")
                    .trim()
                    .eq_ignore_ascii_case("application/json")
            })
            .unwrap_or(false);

        let text = response
            .text()
            .await
            .map_err(|e| Error::connection(format!("{method} {url}: {e}")))?;

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: format!(
                    "{} {}: response status: {}, message: {}",
                    method,
                    url,
                    status.as_u16(),
                    text
                ),
            });
        }

        if is_json {
            Ok(Some(serde_json::from_str(&text)?))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_trimmed() {
        let http = Http::new("http://localhost:8083/").unwrap();
        assert_eq!(http.base_url(), "http://localhost:8083");

        let http = Http::new("http://localhost:8083").unwrap();
        assert_eq!(http.base_url(), "http://localhost:8083");
    }
}
