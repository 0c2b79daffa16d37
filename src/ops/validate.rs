use std::sync::LazyLock;

use indexmap::IndexSet;
use regex::Regex;

static DISCORD_WEBHOOK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://discord\.com/api/webhooks/\d+/.+$").expect("static regex")
});

/// Error type for input validation
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name and URL are required")]
    MissingField,
    #[error("invalid Discord webhook URL: {0}")]
    InvalidWebhookUrl(String),
}

/// Whether `url` looks like `https://discord.com/api/webhooks/<id>/<token>`.
pub fn is_webhook_url(url: &str) -> bool {
    DISCORD_WEBHOOK_RE.is_match(url)
}

/// Check the name and URL given for a new or edited webhook.
pub fn validate_webhook(name: &str, url: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() || url.trim().is_empty() {
        return Err(ValidationError::MissingField);
    }
    if !is_webhook_url(url) {
        return Err(ValidationError::InvalidWebhookUrl(url.to_string()));
    }
    Ok(())
}

/// Add a tag unless it is blank or already present. A leading `#` is
/// stripped. Returns whether the tag was added.
pub fn push_tag(tags: &mut IndexSet<String>, raw: &str) -> bool {
    let tag = raw.trim().trim_start_matches('#').trim();
    if tag.is_empty() {
        return false;
    }
    tags.insert(tag.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_discord_webhook_urls() {
        assert!(is_webhook_url("https://discord.com/api/webhooks/123/abc"));
        assert!(is_webhook_url(
            "https://discord.com/api/webhooks/112233445566/xYz-_token.part"
        ));
    }

    #[test]
    fn rejects_other_urls() {
        assert!(!is_webhook_url("http://discord.com/api/webhooks/123/abc"));
        assert!(!is_webhook_url("https://discord.com/api/webhooks/abc/def"));
        assert!(!is_webhook_url("https://discord.com/api/webhooks/123/"));
        assert!(!is_webhook_url("https://example.com/api/webhooks/123/abc"));
        assert!(!is_webhook_url(""));
    }

    #[test]
    fn validate_requires_name_and_url() {
        assert_eq!(
            validate_webhook("", "https://discord.com/api/webhooks/1/a"),
            Err(ValidationError::MissingField)
        );
        assert_eq!(validate_webhook("x", "  "), Err(ValidationError::MissingField));
        assert!(matches!(
            validate_webhook("x", "https://nope"),
            Err(ValidationError::InvalidWebhookUrl(_))
        ));
        assert!(validate_webhook("x", "https://discord.com/api/webhooks/1/a").is_ok());
    }

    #[test]
    fn push_tag_ignores_blank_and_duplicates() {
        let mut tags = IndexSet::new();
        assert!(push_tag(&mut tags, "rust"));
        assert!(push_tag(&mut tags, "#osint"));
        assert!(!push_tag(&mut tags, "rust"));
        assert!(!push_tag(&mut tags, "   "));
        assert!(!push_tag(&mut tags, "#"));
        assert_eq!(tags.iter().collect::<Vec<_>>(), vec!["rust", "osint"]);
    }
}
