use std::sync::{Arc, Mutex};

use async_trait::async_trait;

/// Status line of a webhook response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    /// Reason phrase, e.g. `Internal Server Error`
    pub reason: String,
}

impl TransportResponse {
    pub fn new(status: u16, reason: &str) -> Self {
        TransportResponse {
            status,
            reason: reason.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Reason phrase, falling back to the numeric status when the server
    /// sent none.
    pub fn status_text(&self) -> String {
        if self.reason.is_empty() {
            self.status.to_string()
        } else {
            self.reason.clone()
        }
    }
}

/// The request never produced a response (DNS, connect, TLS, bad URL...).
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub Box<dyn std::error::Error + Send + Sync>);

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        TransportError(Box::new(e))
    }
}

/// Sends one JSON POST to a webhook URL.
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<TransportResponse, TransportError>;
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

/// reqwest-backed transport using the client's default timeouts.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        HttpTransport { client }
    }
}

#[async_trait]
impl WebhookTransport for HttpTransport {
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<TransportResponse, TransportError> {
        // .json() sets Content-Type: application/json
        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        Ok(TransportResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Recording
// ---------------------------------------------------------------------------

/// A request captured by [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub url: String,
    pub body: serde_json::Value,
}

/// Offline transport that records every request and answers with a fixed
/// status. Clones share the same log.
#[derive(Debug, Clone)]
pub struct RecordingTransport {
    response: TransportResponse,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl RecordingTransport {
    pub fn new(status: u16, reason: &str) -> Self {
        RecordingTransport {
            response: TransportResponse::new(status, reason),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl WebhookTransport for RecordingTransport {
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<TransportResponse, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedRequest {
                url: url.to_string(),
                body: body.clone(),
            });
        Ok(self.response.clone())
    }
}
