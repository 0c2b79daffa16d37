use chrono::SecondsFormat;

use crate::model::resource::Resource;
use crate::model::webhook::Webhook;

/// Label shown for resources whose webhook has been deleted.
pub const UNKNOWN_WEBHOOK: &str = "Unknown webhook";

/// Criteria for narrowing the sent-resource history. Empty criteria match
/// everything.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    /// Case-insensitive substring of title or description
    pub search: Option<String>,
    /// Prefix of the RFC 3339 creation time, normally `YYYY-MM-DD`
    pub date: Option<String>,
    /// Exact tag the resource must carry
    pub tag: Option<String>,
}

impl HistoryFilter {
    pub fn matches(&self, resource: &Resource) -> bool {
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let in_title = resource.title.to_lowercase().contains(&needle);
            let in_description = resource
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !in_title && !in_description {
                return false;
            }
        }
        if let Some(date) = self.date.as_deref().filter(|d| !d.is_empty()) {
            let created = resource
                .created_at
                .to_rfc3339_opts(SecondsFormat::Millis, true);
            if !created.starts_with(date) {
                return false;
            }
        }
        if let Some(tag) = self.tag.as_deref()
            && !resource.has_tag(tag)
        {
            return false;
        }
        true
    }
}

/// Resources matching `filter`, in history order.
pub fn filter_resources<'a>(resources: &'a [Resource], filter: &HistoryFilter) -> Vec<&'a Resource> {
    resources.iter().filter(|r| filter.matches(r)).collect()
}

/// Every distinct tag used in history, in first-seen order.
pub fn all_tags(resources: &[Resource]) -> Vec<&str> {
    let mut seen = indexmap::IndexSet::new();
    for r in resources {
        for tag in &r.tags {
            seen.insert(tag.as_str());
        }
    }
    seen.into_iter().collect()
}

/// Display name of the webhook a resource was sent through.
pub fn webhook_label<'a>(webhooks: &'a [Webhook], webhook_id: &str) -> &'a str {
    webhooks
        .iter()
        .find(|w| w.id == webhook_id)
        .map(|w| w.name.as_str())
        .unwrap_or(UNKNOWN_WEBHOOK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn resource(id: &str, title: &str, description: Option<&str>, tags: &[&str], day: u32) -> Resource {
        Resource {
            id: id.into(),
            title: title.into(),
            description: description.map(String::from),
            url: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            file_url: None,
            created_at: Utc.with_ymd_and_hms(2025, 5, day, 8, 0, 0).unwrap(),
            webhook_id: "wh-1".into(),
            webhook_url: String::new(),
            username: None,
        }
    }

    fn sample() -> Vec<Resource> {
        vec![
            resource("r1", "Rust book", Some("The official guide"), &["rust", "docs"], 1),
            resource("r2", "Recon tools", None, &["osint"], 2),
            resource("r3", "Async in depth", Some("tokio internals, RUST flavored"), &["rust"], 2),
        ]
    }

    fn ids(rs: Vec<&Resource>) -> Vec<&str> {
        rs.into_iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn empty_filter_matches_all() {
        let rs = sample();
        assert_eq!(ids(filter_resources(&rs, &HistoryFilter::default())), vec!["r1", "r2", "r3"]);
    }

    #[test]
    fn search_covers_title_and_description_case_insensitively() {
        let rs = sample();
        let filter = HistoryFilter {
            search: Some("rust".into()),
            ..Default::default()
        };
        assert_eq!(ids(filter_resources(&rs, &filter)), vec!["r1", "r3"]);
    }

    #[test]
    fn date_is_prefix_of_created_at() {
        let rs = sample();
        let filter = HistoryFilter {
            date: Some("2025-05-02".into()),
            ..Default::default()
        };
        assert_eq!(ids(filter_resources(&rs, &filter)), vec!["r2", "r3"]);
    }

    #[test]
    fn criteria_combine() {
        let rs = sample();
        let filter = HistoryFilter {
            date: Some("2025-05-02".into()),
            tag: Some("rust".into()),
            search: Some("async".into()),
        };
        assert_eq!(ids(filter_resources(&rs, &filter)), vec!["r3"]);
    }

    #[test]
    fn all_tags_in_first_seen_order() {
        let rs = sample();
        assert_eq!(all_tags(&rs), vec!["rust", "docs", "osint"]);
    }

    #[test]
    fn orphaned_webhook_resolves_to_unknown() {
        let webhooks = vec![Webhook {
            id: "wh-1".into(),
            name: "Links".into(),
            url: "https://discord.com/api/webhooks/1/a".into(),
            image_url: None,
        }];
        assert_eq!(webhook_label(&webhooks, "wh-1"), "Links");
        assert_eq!(webhook_label(&webhooks, "gone"), UNKNOWN_WEBHOOK);
    }
}
