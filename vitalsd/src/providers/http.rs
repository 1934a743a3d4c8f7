//! HTTP client abstraction for provider calls.
//!
//! This module defines the `HttpClient` trait so provider adapters can be exercised against a
//! recording mock instead of the network.

use crate::errors::{Error, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// A JSON POST to a provider endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Value,
}

/// Response from an HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as a string
    pub body: String,
}

/// Trait for executing provider HTTP requests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Send `request`, giving up after `timeout`.
    ///
    /// # Errors
    /// Returns [`Error::Provider`] if the request fails due to network issues or times out.
    /// Non-2xx statuses are returned as responses, not errors.
    async fn execute(&self, request: &HttpRequest, timeout: Duration) -> Result<HttpResponse>;
}

// ============================================================================
// Production Implementation using reqwest
// ============================================================================

/// Production HTTP client using reqwest.
#[derive(Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    #[tracing::instrument(skip(self, request), fields(url = %request.url))]
    async fn execute(&self, request: &HttpRequest, timeout: Duration) -> Result<HttpResponse> {
        tracing::debug!(timeout_ms = timeout.as_millis() as u64, "Executing provider request");

        let mut req = self.client.post(&request.url).timeout(timeout).json(&request.body);
        for (name, value) in &request.headers {
            req = req.header(*name, value);
        }

        let response = req.send().await.map_err(|e| {
            tracing::error!(url = %request.url, error = %e, "Provider request failed");
            Error::from(e)
        })?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        tracing::info!(status = status, response_len = body.len(), "Provider request completed");

        Ok(HttpResponse { status, body })
    }
}

// ============================================================================
// Test/Mock Implementation
// ============================================================================

/// Mock HTTP client for testing.
///
/// Responses are queued and returned in FIFO order regardless of URL; every call is recorded so
/// tests can assert that no request was made.
#[derive(Clone, Default)]
pub struct MockHttpClient {
    responses: Arc<Mutex<VecDeque<Result<HttpResponse>>>>,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

/// Record of a call made to the mock HTTP client.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub request: HttpRequest,
    pub timeout: Duration,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next call.
    pub fn add_response(&self, response: Result<HttpResponse>) {
        self.responses.lock().push_back(response);
    }

    /// Queue a 200 response with a JSON body.
    pub fn add_json(&self, body: Value) {
        self.add_response(Ok(HttpResponse {
            status: 200,
            body: body.to_string(),
        }));
    }

    /// Get all calls that have been made to this mock client.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    /// Get the number of calls made.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn execute(&self, request: &HttpRequest, timeout: Duration) -> Result<HttpResponse> {
        self.calls.lock().push(MockCall {
            request: request.clone(),
            timeout,
        });

        self.responses.lock().pop_front().unwrap_or_else(|| {
            Err(Error::Provider {
                message: format!("no mock response configured for {}", request.url),
            })
        })
    }
}
