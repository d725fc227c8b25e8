//! Request dispatch
//!
//! One HTTP call in, parsed JSON or a typed failure out. The `Dispatcher`
//! trait is the seam the batch coordinator fans out through, so tests can
//! substitute a scripted implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::utils::error::RequestError;
use crate::utils::http::{get_client_with_timeout, get_shared_client};

/// HTTP methods the portal API uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET, no body
    Get,
    /// POST with a JSON body
    Post,
}

/// Issues a single HTTP request and resolves to parsed JSON or a typed failure
#[async_trait]
pub trait Dispatcher: Send + Sync + 'static {
    /// Execute one request. Any 2xx response resolves with the parsed JSON
    /// body (an empty body parses to an empty object). Any other status or a
    /// network failure resolves to a `RequestError`. No retries.
    async fn dispatch(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> std::result::Result<Value, RequestError>;
}

/// reqwest-backed dispatcher using the shared pooled client
#[derive(Debug, Clone)]
pub struct HttpDispatcher {
    client: Client,
}

impl HttpDispatcher {
    /// Create a dispatcher on the shared client (30s timeout)
    pub fn new() -> Self {
        Self {
            client: get_shared_client().clone(),
        }
    }

    /// Create a dispatcher with a specific per-request timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: (*get_client_with_timeout(timeout)).clone(),
        }
    }
}

impl Default for HttpDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Dispatcher for HttpDispatcher {
    async fn dispatch(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> std::result::Result<Value, RequestError> {
        let mut request = match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(?method, url, "dispatching request");
        let response = request
            .send()
            .await
            .map_err(|e| RequestError::network(format!("Network error: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RequestError::network(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(RequestError::http(
                status.as_u16(),
                extract_error_message(&text, status.as_u16()),
            ));
        }

        if text.trim().is_empty() {
            return Ok(Value::Object(serde_json::Map::new()));
        }
        serde_json::from_str(&text)
            .map_err(|e| RequestError::http(status.as_u16(), format!("Invalid JSON response: {}", e)))
    }
}

/// Pull a human-readable message out of the portal's JSON error envelope
/// (`error` or `message` string, or an `errors` list), falling back to a
/// generic status line for non-JSON bodies.
fn extract_error_message(body: &str, status: u16) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            if let Some(message) = value
                .get("error")
                .or_else(|| value.get("message"))
                .and_then(Value::as_str)
            {
                return Some(message.to_string());
            }
            value
                .get("errors")
                .and_then(Value::as_array)
                .map(|errors| {
                    errors
                        .iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join("; ")
                })
                .filter(|joined| !joined.is_empty())
        })
        .unwrap_or_else(|| format!("Request failed with status {}", status))
}
