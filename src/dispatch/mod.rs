//! Webhook Dispatcher: turns a resource or plain message into a Discord
//! payload and POSTs it once. No retries; the caller decides what to commit.

pub mod payload;
pub mod transport;

use std::fmt;
use std::sync::Arc;

use crate::model::resource::NewResource;
use crate::util::clock::Clock;
use payload::{EmbedStyle, message_payload, resource_payload};
use transport::{TransportError, WebhookTransport};

/// Which kind of send failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendKind {
    Resource,
    Message,
}

impl fmt::Display for SendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendKind::Resource => write!(f, "resource"),
            SendKind::Message => write!(f, "message"),
        }
    }
}

/// Error type for webhook dispatch
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("no webhook URL provided")]
    MissingWebhook,
    #[error("failed to send {kind}: {reason}")]
    Rejected {
        kind: SendKind,
        status: u16,
        reason: String,
    },
    #[error("failed to send {kind}: {source}")]
    Network {
        kind: SendKind,
        #[source]
        source: TransportError,
    },
    #[error("could not encode {kind} payload: {source}")]
    Encode {
        kind: SendKind,
        #[source]
        source: serde_json::Error,
    },
}

impl DispatchError {
    /// The kind of send that failed, if a send was attempted.
    pub fn kind(&self) -> Option<SendKind> {
        match self {
            DispatchError::MissingWebhook => None,
            DispatchError::Rejected { kind, .. }
            | DispatchError::Network { kind, .. }
            | DispatchError::Encode { kind, .. } => Some(*kind),
        }
    }
}

pub struct Dispatcher {
    transport: Box<dyn WebhookTransport>,
    style: EmbedStyle,
    clock: Arc<dyn Clock>,
}

impl Dispatcher {
    pub fn new(transport: Box<dyn WebhookTransport>, style: EmbedStyle, clock: Arc<dyn Clock>) -> Self {
        Dispatcher {
            transport,
            style,
            clock,
        }
    }

    pub fn style(&self) -> &EmbedStyle {
        &self.style
    }

    /// Post `resource` as a single embed to its `webhook_url`.
    pub async fn send_resource(&self, resource: &NewResource) -> Result<(), DispatchError> {
        if resource.webhook_url.is_empty() {
            return Err(DispatchError::MissingWebhook);
        }
        let payload = resource_payload(resource, &self.style, self.clock.now());
        let body = serde_json::to_value(&payload).map_err(|e| DispatchError::Encode {
            kind: SendKind::Resource,
            source: e,
        })?;
        self.post(SendKind::Resource, &resource.webhook_url, &body).await
    }

    /// Post plain text `content` to `webhook_url`.
    pub async fn send_message(&self, webhook_url: &str, content: &str) -> Result<(), DispatchError> {
        if webhook_url.is_empty() {
            return Err(DispatchError::MissingWebhook);
        }
        let body = serde_json::to_value(message_payload(content)).map_err(|e| {
            DispatchError::Encode {
                kind: SendKind::Message,
                source: e,
            }
        })?;
        self.post(SendKind::Message, webhook_url, &body).await
    }

    async fn post(
        &self,
        kind: SendKind,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<(), DispatchError> {
        tracing::debug!(%kind, "posting to webhook");
        let response = self
            .transport
            .post_json(url, body)
            .await
            .map_err(|e| {
                tracing::warn!(%kind, error = %e, "webhook request failed");
                DispatchError::Network { kind, source: e }
            })?;
        if !response.is_success() {
            tracing::warn!(%kind, status = response.status, "webhook rejected payload");
            return Err(DispatchError::Rejected {
                kind,
                status: response.status,
                reason: response.status_text(),
            });
        }
        tracing::info!(%kind, status = response.status, "webhook accepted payload");
        Ok(())
    }
}
