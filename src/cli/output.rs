use serde::Serialize;

use crate::model::resource::Resource;
use crate::model::scheduled::{ScheduledKind, ScheduledMessage};
use crate::model::template::MessageTemplate;
use crate::model::webhook::Webhook;
use crate::ops::history::webhook_label;
use crate::util::unicode::{fit_to_width, truncate_to_width};

/// Width of the id column in listings
pub const SHORT_ID_LEN: usize = 8;
const TITLE_WIDTH: usize = 40;
const NAME_WIDTH: usize = 24;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct WebhookJson<'a> {
    #[serde(flatten)]
    pub webhook: &'a Webhook,
    pub selected: bool,
}

#[derive(Serialize)]
pub struct ResourceJson<'a> {
    #[serde(flatten)]
    pub resource: &'a Resource,
    pub webhook_name: &'a str,
}

#[derive(Serialize)]
pub struct ScheduledJson<'a> {
    #[serde(flatten)]
    pub message: &'a ScheduledMessage,
    pub webhook_name: &'a str,
    /// Always false: nothing sends scheduled messages automatically
    pub dispatched: bool,
}

#[derive(Serialize)]
pub struct TagsJson<'a> {
    pub tags: Vec<&'a str>,
    pub total: usize,
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// First few characters of an id, for compact listings.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((i, _)) => &id[..i],
        None => id,
    }
}

pub fn format_tags(tags: impl IntoIterator<Item = impl AsRef<str>>) -> String {
    tags.into_iter()
        .map(|t| format!("#{}", t.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `* a1b2c3d4  OSINT Updates            https://discord.com/api/webhooks/...`
pub fn format_webhook_line(webhook: &Webhook, selected: bool) -> String {
    let marker = if selected { '*' } else { ' ' };
    format!(
        "{} {:<8}  {}  {}",
        marker,
        short_id(&webhook.id),
        fit_to_width(&webhook.name, NAME_WIDTH),
        webhook.url
    )
}

/// One-line history entry plus indented detail lines.
pub fn format_resource(resource: &Resource, webhooks: &[Webhook]) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!(
        "{:<8}  {}  {}  → {}",
        short_id(&resource.id),
        resource.created_at.format("%Y-%m-%d %H:%M"),
        truncate_to_width(&resource.title, TITLE_WIDTH),
        webhook_label(webhooks, &resource.webhook_id),
    ));
    if let Some(ref url) = resource.url {
        lines.push(format!("          {}", url));
    }
    if let Some(ref description) = resource.description {
        for line in description.lines() {
            lines.push(format!("          {}", line));
        }
    }
    if !resource.tags.is_empty() {
        lines.push(format!("          {}", format_tags(&resource.tags)));
    }
    lines
}

pub fn format_template_line(template: &MessageTemplate) -> String {
    let first_line = template.content.lines().next().unwrap_or("");
    format!(
        "{:<8}  {}  {}",
        short_id(&template.id),
        fit_to_width(&template.name, NAME_WIDTH),
        truncate_to_width(first_line, TITLE_WIDTH)
    )
}

pub fn format_scheduled_line(message: &ScheduledMessage, webhooks: &[Webhook]) -> String {
    let kind = match message.kind {
        ScheduledKind::Message => "message",
        ScheduledKind::Resource => "resource",
    };
    let text = match (&message.kind, &message.resource_data) {
        (ScheduledKind::Resource, Some(data)) => data.title.as_str(),
        _ => message.content.as_str(),
    };
    format!(
        "{:<8}  {}  {:<8}  {}  → {}",
        short_id(&message.id),
        message.scheduled_for.format("%Y-%m-%d %H:%M"),
        kind,
        truncate_to_width(text, TITLE_WIDTH),
        webhook_label(webhooks, &message.webhook_id),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn webhook() -> Webhook {
        Webhook {
            id: "0123456789abcdef".into(),
            name: "Links".into(),
            url: "https://discord.com/api/webhooks/1/a".into(),
            image_url: None,
        }
    }

    #[test]
    fn short_id_truncates_long_ids() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("id-1"), "id-1");
    }

    #[test]
    fn webhook_line_marks_selection() {
        let line = format_webhook_line(&webhook(), true);
        assert!(line.starts_with("* 01234567  Links"));
        assert!(line.ends_with("https://discord.com/api/webhooks/1/a"));
        assert!(format_webhook_line(&webhook(), false).starts_with("  01234567"));
    }

    #[test]
    fn resource_lines_include_tags_and_orphan_label() {
        let resource = Resource {
            id: "r-1".into(),
            title: "Doc".into(),
            description: Some("line one\nline two".into()),
            url: Some("https://example.com".into()),
            tags: ["a".to_string(), "b".to_string()].into_iter().collect(),
            file_url: None,
            created_at: Utc.with_ymd_and_hms(2025, 5, 1, 9, 5, 0).unwrap(),
            webhook_id: "gone".into(),
            webhook_url: String::new(),
            username: None,
        };
        let lines = format_resource(&resource, &[webhook()]);
        assert_eq!(lines[0], "r-1       2025-05-01 09:05  Doc  → Unknown webhook");
        assert_eq!(lines[1], "          https://example.com");
        assert_eq!(lines[2], "          line one");
        assert_eq!(lines[3], "          line two");
        assert_eq!(lines[4], "          #a #b");
    }
}
