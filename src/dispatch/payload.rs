//! Discord webhook wire payloads.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::model::config::{DEFAULT_EMBED_COLOR, DEFAULT_FOOTER, EmbedConfig};
use crate::model::resource::NewResource;

/// Accent color and footer applied to resource embeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedStyle {
    pub color: u32,
    pub footer: String,
}

impl Default for EmbedStyle {
    fn default() -> Self {
        EmbedStyle {
            color: DEFAULT_EMBED_COLOR,
            footer: DEFAULT_FOOTER.to_string(),
        }
    }
}

impl From<&EmbedConfig> for EmbedStyle {
    fn from(config: &EmbedConfig) -> Self {
        EmbedStyle {
            color: config.color,
            footer: config.footer.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourcePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub embeds: Vec<Embed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileAttachment>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Embed {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub color: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    pub timestamp: String,
    pub footer: EmbedFooter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileAttachment {
    pub attachment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessagePayload {
    pub content: String,
}

/// `#a #b` for tags `a`, `b`.
pub fn format_tags<'a>(tags: impl IntoIterator<Item = &'a String>) -> String {
    tags.into_iter()
        .map(|t| format!("#{}", t))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build the embed payload for a resource sent at `sent_at`.
pub fn resource_payload(
    resource: &NewResource,
    style: &EmbedStyle,
    sent_at: DateTime<Utc>,
) -> ResourcePayload {
    let fields = if resource.tags.is_empty() {
        Vec::new()
    } else {
        vec![EmbedField {
            name: "Tags".to_string(),
            value: format_tags(&resource.tags),
            inline: false,
        }]
    };

    let embed = Embed {
        title: resource.title.clone(),
        description: resource.description.clone(),
        url: resource.url.clone(),
        color: style.color,
        fields,
        timestamp: sent_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        footer: EmbedFooter {
            text: style.footer.clone(),
        },
    };

    ResourcePayload {
        username: resource.username.clone(),
        embeds: vec![embed],
        files: resource.file_url.as_ref().map(|f| {
            vec![FileAttachment {
                attachment: f.clone(),
            }]
        }),
    }
}

pub fn message_payload(content: &str) -> MessagePayload {
    MessagePayload {
        content: content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sent_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap()
    }

    fn resource(tags: &[&str]) -> NewResource {
        NewResource {
            title: "Doc".into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            webhook_url: "https://discord.com/api/webhooks/123/abc".into(),
            ..Default::default()
        }
    }

    #[test]
    fn no_tags_omits_fields() {
        let payload = resource_payload(&resource(&[]), &EmbedStyle::default(), sent_at());
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value["embeds"][0].get("fields").is_none());
    }

    #[test]
    fn tags_collapse_into_one_field() {
        let payload = resource_payload(&resource(&["a", "b"]), &EmbedStyle::default(), sent_at());
        assert_eq!(
            payload.embeds[0].fields,
            vec![EmbedField {
                name: "Tags".into(),
                value: "#a #b".into(),
                inline: false,
            }]
        );
    }

    #[test]
    fn minimal_resource_wire_shape() {
        let payload = resource_payload(&resource(&["x"]), &EmbedStyle::default(), sent_at());
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "embeds": [{
                    "title": "Doc",
                    "color": 0xFF9933,
                    "fields": [{"name": "Tags", "value": "#x", "inline": false}],
                    "timestamp": "2025-05-01T12:00:00.000Z",
                    "footer": {"text": "ShareFlow made by iqlip 💖"}
                }]
            })
        );
    }

    #[test]
    fn optional_fields_are_carried() {
        let mut r = resource(&[]);
        r.description = Some("notes".into());
        r.url = Some("https://example.com/doc".into());
        r.username = Some("Librarian".into());
        r.file_url = Some("https://example.com/doc.pdf".into());
        let value = serde_json::to_value(resource_payload(&r, &EmbedStyle::default(), sent_at())).unwrap();
        assert_eq!(value["username"], "Librarian");
        assert_eq!(value["embeds"][0]["description"], "notes");
        assert_eq!(value["embeds"][0]["url"], "https://example.com/doc");
        assert_eq!(value["files"], json!([{"attachment": "https://example.com/doc.pdf"}]));
    }

    #[test]
    fn custom_style_applies() {
        let style = EmbedStyle {
            color: 0x00FF00,
            footer: "mine".into(),
        };
        let payload = resource_payload(&resource(&[]), &style, sent_at());
        assert_eq!(payload.embeds[0].color, 0x00FF00);
        assert_eq!(payload.embeds[0].footer.text, "mine");
    }

    #[test]
    fn message_payload_has_only_content() {
        let value = serde_json::to_value(message_payload("hi")).unwrap();
        assert_eq!(value, json!({"content": "hi"}));
    }
}
