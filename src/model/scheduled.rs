use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::resource::ResourceDraft;

/// What a scheduled entry would send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduledKind {
    Message,
    Resource,
}

/// A send recorded for later. Nothing dispatches these when `scheduled_for`
/// passes; they are kept until deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledMessage {
    pub id: String,
    pub content: String,
    pub webhook_id: String,
    pub scheduled_for: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: ScheduledKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_data: Option<ResourceDraft>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScheduledMessage {
    pub content: String,
    pub webhook_id: String,
    pub scheduled_for: DateTime<Utc>,
    pub kind: ScheduledKind,
    pub resource_data: Option<ResourceDraft>,
}

impl ScheduledMessage {
    pub fn from_new(id: String, new: NewScheduledMessage) -> Self {
        ScheduledMessage {
            id,
            content: new.content,
            webhook_id: new.webhook_id,
            scheduled_for: new.scheduled_for,
            kind: new.kind,
            resource_data: new.resource_data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_under_type_key() {
        let json = r#"{
            "id": "s1",
            "content": "hello",
            "webhookId": "w1",
            "scheduledFor": "2030-01-01T09:00:00Z",
            "type": "message"
        }"#;
        let msg: ScheduledMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.kind, ScheduledKind::Message);
        assert!(msg.resource_data.is_none());

        let back = serde_json::to_value(&msg).unwrap();
        assert_eq!(back["type"], "message");
        assert!(back.get("resourceData").is_none());
    }
}
