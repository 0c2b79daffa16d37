use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// A link shared through a webhook and kept in history.
///
/// `id` and `created_at` are stamped by the store. `webhook_id` is a plain
/// reference: deleting the webhook leaves the resource in place, and readers
/// resolve it at display time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub tags: IndexSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub webhook_id: String,
    #[serde(default)]
    pub webhook_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// A resource about to be sent. Carries everything except the
/// store-assigned `id` and `created_at`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewResource {
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub tags: IndexSet<String>,
    pub file_url: Option<String>,
    pub webhook_id: String,
    pub webhook_url: String,
    pub username: Option<String>,
}

/// The user-authored part of a resource, before a webhook is attached.
/// Also stored as the payload of a scheduled resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub tags: IndexSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl ResourceDraft {
    /// Attach the target webhook, producing a sendable resource.
    pub fn into_new(self, webhook_id: &str, webhook_url: &str) -> NewResource {
        NewResource {
            title: self.title,
            description: self.description,
            url: self.url,
            tags: self.tags,
            file_url: self.file_url,
            webhook_id: webhook_id.to_string(),
            webhook_url: webhook_url.to_string(),
            username: self.username,
        }
    }
}

impl Resource {
    pub fn from_new(id: String, created_at: DateTime<Utc>, new: NewResource) -> Self {
        Resource {
            id,
            title: new.title,
            description: new.description,
            url: new.url,
            tags: new.tags,
            file_url: new.file_url,
            created_at,
            webhook_id: new.webhook_id,
            webhook_url: new.webhook_url,
            username: new.username,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn draft_into_new_attaches_webhook() {
        let draft = ResourceDraft {
            title: "Doc".into(),
            tags: ["x".to_string()].into_iter().collect(),
            ..Default::default()
        };
        let new = draft.into_new("wh-1", "https://discord.com/api/webhooks/1/t");
        assert_eq!(new.title, "Doc");
        assert_eq!(new.webhook_id, "wh-1");
        assert_eq!(new.webhook_url, "https://discord.com/api/webhooks/1/t");
        assert!(new.tags.contains("x"));
    }

    #[test]
    fn tags_keep_insertion_order_and_collapse_duplicates() {
        let json = r#"{
            "id": "r1",
            "title": "t",
            "tags": ["b", "a", "b"],
            "createdAt": "2025-05-01T10:00:00Z",
            "webhookId": "w"
        }"#;
        let r: Resource = serde_json::from_str(json).unwrap();
        assert_eq!(r.tags.iter().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(r.created_at, Utc.with_ymd_and_hms(2025, 5, 1, 10, 0, 0).unwrap());
        assert_eq!(r.webhook_url, "");
    }
}
