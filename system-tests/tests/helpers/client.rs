// system-tests/tests/helpers/client.rs
// ============================================================================
// Module: Ruler HTTP Client
// Description: Thin JSON client for the Cosmic Ruler API.
// Purpose: Issue requests and capture status plus decoded body.
// Dependencies: reqwest, serde_json
// ============================================================================

use std::time::Duration;

use reqwest::Method;
use reqwest::RequestBuilder;
use serde_json::Value;

/// Status and decoded body of one response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Decoded JSON body, or `Null` when the body is empty or not JSON.
    pub body: Value,
}

impl ApiResponse {
    /// Returns the `error` message of an error body.
    pub fn error_message(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }

    /// Fails unless the status matches.
    pub fn expect_status(self, expected: u16) -> Result<Self, String> {
        if self.status == expected {
            Ok(self)
        } else {
            Err(format!("expected status {expected}, got {}: {}", self.status, self.body))
        }
    }
}

/// HTTP client bound to one server.
#[derive(Clone)]
pub struct RulerClient {
    /// Server base URL.
    base_url: String,
    /// Shared connection pool.
    client: reqwest::Client,
}

impl RulerClient {
    /// Creates a client with a per-request timeout.
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| format!("failed to build http client: {err}"))?;
        Ok(Self {
            base_url,
            client,
        })
    }

    /// Sends a GET request.
    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<ApiResponse, String> {
        self.send(self.request(Method::GET, path, token)).await
    }

    /// Sends a DELETE request.
    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<ApiResponse, String> {
        self.send(self.request(Method::DELETE, path, token)).await
    }

    /// Sends a JSON POST request.
    pub async fn post(
        &self,
        path: &str,
        token: Option<&str>,
        body: &Value,
    ) -> Result<ApiResponse, String> {
        self.send(self.request(Method::POST, path, token).json(body)).await
    }

    /// Sends a JSON PATCH request.
    pub async fn patch(
        &self,
        path: &str,
        token: Option<&str>,
        body: &Value,
    ) -> Result<ApiResponse, String> {
        self.send(self.request(Method::PATCH, path, token).json(body)).await
    }

    /// Sends a POST with a raw, possibly malformed, body.
    pub async fn post_raw(&self, path: &str, body: &'static str) -> Result<ApiResponse, String> {
        let request = self
            .request(Method::POST, path, None)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        self.send(request).await
    }

    /// Builds a request with optional bearer auth.
    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self.client.request(method, format!("{}{path}", self.base_url));
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends a request and decodes the body.
    async fn send(&self, request: RequestBuilder) -> Result<ApiResponse, String> {
        let response = request.send().await.map_err(|err| format!("request failed: {err}"))?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|err| format!("read body failed: {err}"))?;
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Ok(ApiResponse {
            status,
            body,
        })
    }
}
