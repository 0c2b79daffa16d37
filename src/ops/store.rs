use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::io::storage::{StorageBackend, StorageError};
use crate::model::resource::{NewResource, Resource};
use crate::model::scheduled::{NewScheduledMessage, ScheduledMessage};
use crate::model::template::{MessageTemplate, NewTemplate, TemplatePatch};
use crate::model::webhook::{NewWebhook, Webhook, WebhookPatch};
use crate::util::clock::{Clock, IdGenerator};

/// Key the whole state blob is stored under.
pub const STORAGE_KEY: &str = "resource-sharing-storage";
/// Key an unreadable blob is copied to before the store starts fresh.
pub const BACKUP_KEY: &str = "resource-sharing-storage.bak";
/// Schema version written into the envelope.
pub const STATE_VERSION: u32 = 0;

/// Error type for store persistence
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("could not serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Everything the store persists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreState {
    #[serde(default)]
    pub webhooks: Vec<Webhook>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub templates: Vec<MessageTemplate>,
    #[serde(default)]
    pub scheduled_messages: Vec<ScheduledMessage>,
    #[serde(default)]
    pub selected_webhook_id: Option<String>,
}

#[derive(Deserialize)]
struct Envelope {
    state: StoreState,
    #[serde(default)]
    #[allow(dead_code)]
    version: u32,
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    state: &'a StoreState,
    version: u32,
}

/// Parse a persisted blob back into state.
pub fn decode_state(blob: &str) -> Result<StoreState, serde_json::Error> {
    let envelope: Envelope = serde_json::from_str(blob)?;
    Ok(envelope.state)
}

/// Serialize state into the persisted blob format.
pub fn encode_state(state: &StoreState) -> Result<String, serde_json::Error> {
    serde_json::to_string(&EnvelopeRef {
        state,
        version: STATE_VERSION,
    })
}

/// The single owner of all webhook, history, template and schedule records.
///
/// Every mutator changes the in-memory state first and then writes the full
/// snapshot to the backend under [`STORAGE_KEY`]. A write failure is
/// returned, but the in-memory change stays applied.
pub struct Store {
    state: StoreState,
    backend: Box<dyn StorageBackend>,
    ids: Box<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl Store {
    /// Rehydrate from the backend. Nothing stored yet means empty state. An
    /// unreadable blob is copied to [`BACKUP_KEY`] and the store starts empty.
    pub fn open(
        backend: Box<dyn StorageBackend>,
        ids: Box<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StoreError> {
        let state = match backend.get_item(STORAGE_KEY)? {
            None => StoreState::default(),
            Some(blob) => match decode_state(&blob) {
                Ok(state) => state,
                Err(e) => {
                    backend.set_item(BACKUP_KEY, &blob)?;
                    tracing::warn!(
                        error = %e,
                        backup = BACKUP_KEY,
                        "stored state could not be parsed; starting empty"
                    );
                    StoreState::default()
                }
            },
        };
        tracing::debug!(
            webhooks = state.webhooks.len(),
            resources = state.resources.len(),
            templates = state.templates.len(),
            scheduled = state.scheduled_messages.len(),
            "store loaded"
        );
        Ok(Store {
            state,
            backend,
            ids,
            clock,
        })
    }

    fn persist(&self) -> Result<(), StoreError> {
        let blob = encode_state(&self.state)?;
        self.backend.set_item(STORAGE_KEY, &blob)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Read accessors
    // -----------------------------------------------------------------------

    pub fn snapshot(&self) -> &StoreState {
        &self.state
    }

    pub fn webhooks(&self) -> &[Webhook] {
        &self.state.webhooks
    }

    pub fn resources(&self) -> &[Resource] {
        &self.state.resources
    }

    pub fn templates(&self) -> &[MessageTemplate] {
        &self.state.templates
    }

    pub fn scheduled_messages(&self) -> &[ScheduledMessage] {
        &self.state.scheduled_messages
    }

    pub fn selected_webhook_id(&self) -> Option<&str> {
        self.state.selected_webhook_id.as_deref()
    }

    pub fn webhook(&self, id: &str) -> Option<&Webhook> {
        self.state.webhooks.iter().find(|w| w.id == id)
    }

    /// The selected webhook, or `None` when nothing is selected or the
    /// pointer no longer resolves.
    pub fn selected_webhook(&self) -> Option<&Webhook> {
        self.selected_webhook_id().and_then(|id| self.webhook(id))
    }

    pub fn template(&self, id: &str) -> Option<&MessageTemplate> {
        self.state.templates.iter().find(|t| t.id == id)
    }

    /// Current time from the store's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // -----------------------------------------------------------------------
    // Webhooks
    // -----------------------------------------------------------------------

    pub fn add_webhook(&mut self, new: NewWebhook) -> Result<Webhook, StoreError> {
        let webhook = Webhook::from_new(self.ids.next_id(), new);
        self.state.webhooks.push(webhook.clone());
        tracing::debug!(id = %webhook.id, name = %webhook.name, "webhook added");
        self.persist()?;
        Ok(webhook)
    }

    /// Merge `patch` into the webhook with `id`. Returns the updated record,
    /// or `None` if no webhook has that id.
    pub fn update_webhook(
        &mut self,
        id: &str,
        patch: WebhookPatch,
    ) -> Result<Option<Webhook>, StoreError> {
        let updated = self
            .state
            .webhooks
            .iter_mut()
            .find(|w| w.id == id)
            .map(|w| {
                w.apply(patch);
                w.clone()
            });
        self.persist()?;
        Ok(updated)
    }

    /// Remove a webhook, clearing the selection if it pointed at it.
    /// Resources sent through it are kept.
    pub fn delete_webhook(&mut self, id: &str) -> Result<bool, StoreError> {
        let before = self.state.webhooks.len();
        self.state.webhooks.retain(|w| w.id != id);
        let removed = self.state.webhooks.len() != before;
        if self.state.selected_webhook_id.as_deref() == Some(id) {
            self.state.selected_webhook_id = None;
        }
        self.persist()?;
        Ok(removed)
    }

    /// Point the selection at `id`. The id is not checked against the
    /// registered webhooks; readers go through [`Store::selected_webhook`].
    pub fn set_selected_webhook(&mut self, id: &str) -> Result<(), StoreError> {
        self.state.selected_webhook_id = Some(id.to_string());
        self.persist()
    }

    // -----------------------------------------------------------------------
    // Resources
    // -----------------------------------------------------------------------

    /// Append a sent resource to history, stamping `id` and `created_at`.
    pub fn add_resource(&mut self, new: NewResource) -> Result<Resource, StoreError> {
        let resource = Resource::from_new(self.ids.next_id(), self.clock.now(), new);
        self.state.resources.push(resource.clone());
        tracing::debug!(id = %resource.id, title = %resource.title, "resource recorded");
        self.persist()?;
        Ok(resource)
    }

    pub fn delete_resource(&mut self, id: &str) -> Result<bool, StoreError> {
        let before = self.state.resources.len();
        self.state.resources.retain(|r| r.id != id);
        let removed = self.state.resources.len() != before;
        self.persist()?;
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Templates
    // -----------------------------------------------------------------------

    pub fn add_template(&mut self, new: NewTemplate) -> Result<MessageTemplate, StoreError> {
        let template = MessageTemplate::from_new(self.ids.next_id(), new);
        self.state.templates.push(template.clone());
        self.persist()?;
        Ok(template)
    }

    pub fn update_template(
        &mut self,
        id: &str,
        patch: TemplatePatch,
    ) -> Result<Option<MessageTemplate>, StoreError> {
        let updated = self
            .state
            .templates
            .iter_mut()
            .find(|t| t.id == id)
            .map(|t| {
                t.apply(patch);
                t.clone()
            });
        self.persist()?;
        Ok(updated)
    }

    pub fn delete_template(&mut self, id: &str) -> Result<bool, StoreError> {
        let before = self.state.templates.len();
        self.state.templates.retain(|t| t.id != id);
        let removed = self.state.templates.len() != before;
        self.persist()?;
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Scheduled messages
    // -----------------------------------------------------------------------

    /// Record a message for later. Nothing sends it when the time comes.
    pub fn schedule_message(
        &mut self,
        new: NewScheduledMessage,
    ) -> Result<ScheduledMessage, StoreError> {
        let message = ScheduledMessage::from_new(self.ids.next_id(), new);
        self.state.scheduled_messages.push(message.clone());
        tracing::debug!(id = %message.id, at = %message.scheduled_for, "message scheduled");
        self.persist()?;
        Ok(message)
    }

    pub fn delete_scheduled_message(&mut self, id: &str) -> Result<bool, StoreError> {
        let before = self.state.scheduled_messages.len();
        self.state.scheduled_messages.retain(|m| m.id != id);
        let removed = self.state.scheduled_messages.len() != before;
        self.persist()?;
        Ok(removed)
    }
}
