use serde::{Deserialize, Serialize};

/// A registered Discord incoming webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    pub id: String,
    pub name: String,
    pub url: String,
    /// Avatar shown next to the webhook in listings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Fields supplied when registering a webhook. The id is assigned by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewWebhook {
    pub name: String,
    pub url: String,
    pub image_url: Option<String>,
}

/// Partial update for a webhook. `None` leaves a field untouched;
/// `image_url: Some(None)` clears the image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebhookPatch {
    pub name: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<Option<String>>,
}

impl Webhook {
    pub fn from_new(id: String, new: NewWebhook) -> Self {
        Webhook {
            id,
            name: new.name,
            url: new.url,
            image_url: new.image_url,
        }
    }

    /// Merge the set fields of `patch` into this webhook.
    pub fn apply(&mut self, patch: WebhookPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(url) = patch.url {
            self.url = url;
        }
        if let Some(image_url) = patch.image_url {
            self.image_url = image_url;
        }
    }
}

impl WebhookPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.url.is_none() && self.image_url.is_none()
    }
}
