//! Compose flows: check preconditions, dispatch, and only then commit.

use chrono::{DateTime, Utc};

use crate::dispatch::{DispatchError, Dispatcher};
use crate::model::resource::{Resource, ResourceDraft};
use crate::model::scheduled::{NewScheduledMessage, ScheduledKind, ScheduledMessage};
use crate::model::webhook::Webhook;
use crate::ops::store::{Store, StoreError};

/// Error type for compose flows
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("no webhook selected; pick one with `sf webhook select <id>`")]
    NoWebhookSelected,
    #[error("selected webhook not found: {0}")]
    WebhookNotFound(String),
    #[error("title is required")]
    MissingTitle,
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("template not found: {0}")]
    TemplateNotFound(String),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of [`send_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    Sent,
    Scheduled(ScheduledMessage),
}

fn require_selected(store: &Store) -> Result<Webhook, RelayError> {
    let id = store
        .selected_webhook_id()
        .ok_or(RelayError::NoWebhookSelected)?;
    store
        .webhook(id)
        .cloned()
        .ok_or_else(|| RelayError::WebhookNotFound(id.to_string()))
}

/// Send `draft` through the selected webhook and record it in history.
/// Nothing is recorded if the send fails.
pub async fn share_resource(
    store: &mut Store,
    dispatcher: &Dispatcher,
    draft: ResourceDraft,
) -> Result<Resource, RelayError> {
    if store.selected_webhook_id().is_none() {
        return Err(RelayError::NoWebhookSelected);
    }
    if draft.title.trim().is_empty() {
        return Err(RelayError::MissingTitle);
    }
    let webhook = require_selected(store)?;

    let new = draft.into_new(&webhook.id, &webhook.url);
    dispatcher.send_resource(&new).await?;
    let resource = store.add_resource(new)?;
    tracing::info!(id = %resource.id, webhook = %webhook.name, "resource shared");
    Ok(resource)
}

/// Send `content` through the selected webhook, or record it for later when
/// `schedule_at` is in the future. Scheduled entries are stored only;
/// nothing sends them when the time arrives.
pub async fn send_message(
    store: &mut Store,
    dispatcher: &Dispatcher,
    content: &str,
    schedule_at: Option<DateTime<Utc>>,
) -> Result<MessageOutcome, RelayError> {
    if store.selected_webhook_id().is_none() {
        return Err(RelayError::NoWebhookSelected);
    }
    if content.trim().is_empty() {
        return Err(RelayError::EmptyMessage);
    }
    let webhook = require_selected(store)?;

    if let Some(at) = schedule_at
        && at > store.now()
    {
        let scheduled = store.schedule_message(NewScheduledMessage {
            content: content.to_string(),
            webhook_id: webhook.id.clone(),
            scheduled_for: at,
            kind: ScheduledKind::Message,
            resource_data: None,
        })?;
        tracing::info!(id = %scheduled.id, at = %at, "message scheduled");
        return Ok(MessageOutcome::Scheduled(scheduled));
    }

    dispatcher.send_message(&webhook.url, content).await?;
    tracing::info!(webhook = %webhook.name, "message sent");
    Ok(MessageOutcome::Sent)
}

/// Send a stored template's content through the selected webhook.
pub async fn send_template(
    store: &mut Store,
    dispatcher: &Dispatcher,
    template_id: &str,
) -> Result<MessageOutcome, RelayError> {
    let content = store
        .template(template_id)
        .map(|t| t.content.clone())
        .ok_or_else(|| RelayError::TemplateNotFound(template_id.to_string()))?;
    send_message(store, dispatcher, &content, None).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::payload::EmbedStyle;
    use crate::dispatch::transport::RecordingTransport;
    use crate::io::storage::MemoryStorage;
    use crate::model::template::NewTemplate;
    use crate::model::webhook::NewWebhook;
    use crate::util::clock::{Clock, FixedClock, SequentialIds};
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap()
    }

    fn setup(status: u16, reason: &str) -> (Store, Dispatcher, RecordingTransport) {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(now()));
        let store = Store::open(
            Box::new(MemoryStorage::new()),
            Box::new(SequentialIds::new("id")),
            clock.clone(),
        )
        .unwrap();
        let transport = RecordingTransport::new(status, reason);
        let dispatcher = Dispatcher::new(Box::new(transport.clone()), EmbedStyle::default(), clock);
        (store, dispatcher, transport)
    }

    fn select_test_webhook(store: &mut Store) -> Webhook {
        let wh = store
            .add_webhook(NewWebhook {
                name: "Test".into(),
                url: "https://discord.com/api/webhooks/123/abc".into(),
                image_url: None,
            })
            .unwrap();
        store.set_selected_webhook(&wh.id).unwrap();
        wh
    }

    fn draft(title: &str, tags: &[&str]) -> ResourceDraft {
        ResourceDraft {
            title: title.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn share_commits_after_successful_send() {
        let (mut store, dispatcher, transport) = setup(204, "No Content");
        let wh = select_test_webhook(&mut store);

        let resource = share_resource(&mut store, &dispatcher, draft("Doc", &["x"]))
            .await
            .unwrap();

        assert_eq!(resource.webhook_id, wh.id);
        assert_eq!(resource.webhook_url, wh.url);
        assert_eq!(store.resources(), &[resource]);
        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].body["embeds"][0]["fields"][0]["value"], "#x");
    }

    #[tokio::test]
    async fn share_failure_commits_nothing() {
        let (mut store, dispatcher, _) = setup(500, "Internal Server Error");
        select_test_webhook(&mut store);
        let err = share_resource(&mut store, &dispatcher, draft("Doc", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Dispatch(DispatchError::Rejected { status: 500, .. })));
        assert!(store.resources().is_empty());
    }

    #[tokio::test]
    async fn share_requires_selection() {
        let (mut store, dispatcher, transport) = setup(204, "No Content");
        let err = share_resource(&mut store, &dispatcher, draft("Doc", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::NoWebhookSelected));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn share_requires_title() {
        let (mut store, dispatcher, transport) = setup(204, "No Content");
        select_test_webhook(&mut store);
        let err = share_resource(&mut store, &dispatcher, draft("   ", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::MissingTitle));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn dangling_selection_is_reported() {
        let (mut store, dispatcher, transport) = setup(204, "No Content");
        store.set_selected_webhook("ghost").unwrap();
        let err = send_message(&mut store, &dispatcher, "hi", None).await.unwrap_err();
        assert!(matches!(err, RelayError::WebhookNotFound(ref id) if id == "ghost"));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let (mut store, dispatcher, transport) = setup(204, "No Content");
        select_test_webhook(&mut store);
        let err = send_message(&mut store, &dispatcher, " \n ", None).await.unwrap_err();
        assert!(matches!(err, RelayError::EmptyMessage));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn message_send_does_not_touch_store() {
        let (mut store, dispatcher, transport) = setup(204, "No Content");
        select_test_webhook(&mut store);
        let before = store.snapshot().clone();
        let outcome = send_message(&mut store, &dispatcher, "hello", None).await.unwrap();
        assert_eq!(outcome, MessageOutcome::Sent);
        assert_eq!(store.snapshot(), &before);
        assert_eq!(transport.requests()[0].body["content"], "hello");
    }

    #[tokio::test]
    async fn failed_message_reports_and_leaves_store() {
        let (mut store, dispatcher, _) = setup(500, "Internal Server Error");
        select_test_webhook(&mut store);
        let before = store.snapshot().clone();
        let err = send_message(&mut store, &dispatcher, "hello", None).await.unwrap_err();
        assert_eq!(err.to_string(), "failed to send message: Internal Server Error");
        assert_eq!(store.snapshot(), &before);
    }

    #[tokio::test]
    async fn future_time_schedules_without_sending() {
        let (mut store, dispatcher, transport) = setup(204, "No Content");
        let wh = select_test_webhook(&mut store);
        let at = now() + Duration::hours(2);
        let outcome = send_message(&mut store, &dispatcher, "later", Some(at)).await.unwrap();
        let MessageOutcome::Scheduled(msg) = outcome else {
            panic!("expected scheduled outcome");
        };
        assert_eq!(msg.scheduled_for, at);
        assert_eq!(msg.webhook_id, wh.id);
        assert_eq!(msg.kind, ScheduledKind::Message);
        assert_eq!(store.scheduled_messages().len(), 1);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn past_time_sends_immediately() {
        let (mut store, dispatcher, transport) = setup(204, "No Content");
        select_test_webhook(&mut store);
        let at = now() - Duration::minutes(1);
        let outcome = send_message(&mut store, &dispatcher, "now", Some(at)).await.unwrap();
        assert_eq!(outcome, MessageOutcome::Sent);
        assert!(store.scheduled_messages().is_empty());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn template_content_is_sent() {
        let (mut store, dispatcher, transport) = setup(204, "No Content");
        select_test_webhook(&mut store);
        let t = store
            .add_template(NewTemplate {
                name: "standup".into(),
                content: "Standup in 5 minutes".into(),
            })
            .unwrap();
        send_template(&mut store, &dispatcher, &t.id).await.unwrap();
        assert_eq!(transport.requests()[0].body["content"], "Standup in 5 minutes");

        let err = send_template(&mut store, &dispatcher, "missing").await.unwrap_err();
        assert!(matches!(err, RelayError::TemplateNotFound(_)));
    }
}
