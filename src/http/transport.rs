//! HTTP transport.
//!
//! # Responsibilities
//! - Perform exactly one HTTP request per `send`
//! - Decode the body as JSON
//! - Report every failure as a `TransportError` value
//!
//! # Design Decisions
//! - A non-2xx status with a JSON body is still a body: the API reports its
//!   own error decisions that way
//! - No retries here; the checkpoint engine owns retry policy

use async_trait::async_trait;
use reqwest::header::HeaderValue;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use crate::http::request::ApiRequest;

/// Errors produced by a transport. The engine treats all of them as
/// "no response produced".
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid value for header {name}: {reason}")]
    InvalidHeader { name: &'static str, reason: String },

    #[error("HTTP {status} with non-JSON body: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Sends one request and returns the decoded JSON body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportError>;
}

/// `Transport` backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }

    /// Use a preconfigured client (proxies, TLS roots, pool settings).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportError> {
        let mut builder = self.client.request(request.method, &request.url);

        for (name, value) in &request.headers {
            let value = HeaderValue::from_str(value).map_err(|e| TransportError::InvalidHeader {
                name: *name,
                reason: e.to_string(),
            })?;
            builder = builder.header(*name, value);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let resp = builder.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        match serde_json::from_str::<Value>(&text) {
            Ok(body) => {
                if !status.is_success() {
                    tracing::debug!(status = status.as_u16(), url = %request.url, "API returned error status with JSON body");
                }
                Ok(body)
            }
            Err(e) if status.is_success() => Err(TransportError::Decode(e)),
            Err(_) => Err(TransportError::Status {
                status: status.as_u16(),
                body: text,
            }),
        }
    }
}
