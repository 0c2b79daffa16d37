mod init;
pub use init::cmd_init;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexSet;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::dispatch::Dispatcher;
use crate::dispatch::payload::EmbedStyle;
use crate::dispatch::transport::HttpTransport;
use crate::io::config_io;
use crate::io::storage::FileStorage;
use crate::model::config::Config;
use crate::model::resource::ResourceDraft;
use crate::model::template::{NewTemplate, TemplatePatch};
use crate::model::webhook::{NewWebhook, WebhookPatch};
use crate::ops::history::{self, HistoryFilter};
use crate::ops::relay::{self, MessageOutcome};
use crate::ops::store::{Store, StoreError};
use crate::ops::validate;
use crate::util::clock::{Clock, SystemClock, UuidGenerator};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// What every command needs besides its own arguments.
pub struct Context {
    pub data_dir: PathBuf,
    pub config: Config,
    pub json: bool,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub async fn dispatch(command: Commands, ctx: Context) -> CmdResult {
    match command {
        // Init is handled in main.rs before config is loaded
        Commands::Init(args) => cmd_init(args, &ctx.data_dir),
        Commands::Webhook(cmd) => cmd_webhook(cmd, &ctx),
        Commands::Share(args) => cmd_share(args, &ctx).await,
        Commands::Msg(args) => cmd_msg(args, &ctx).await,
        Commands::History(cmd) => cmd_history(cmd, &ctx),
        Commands::Template(cmd) => cmd_template(cmd, &ctx).await,
        Commands::Scheduled(cmd) => cmd_scheduled(cmd, &ctx),
        Commands::Config(cmd) => cmd_config(cmd, &ctx),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn system_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

/// Open the file-backed store in the data directory.
pub fn open_store(data_dir: &Path, clock: Arc<dyn Clock>) -> Result<Store, StoreError> {
    Store::open(
        Box::new(FileStorage::new(data_dir)),
        Box::new(UuidGenerator),
        clock,
    )
}

fn http_dispatcher(config: &Config, clock: Arc<dyn Clock>) -> Dispatcher {
    Dispatcher::new(
        Box::new(HttpTransport::new()),
        EmbedStyle::from(&config.embed),
        clock,
    )
}

/// Resolve a user-typed id: an exact match wins, otherwise a unique prefix.
fn resolve_id<'a>(
    kind: &str,
    ids: impl IntoIterator<Item = &'a str>,
    query: &str,
) -> Result<String, String> {
    let mut matches = Vec::new();
    for id in ids {
        if id == query {
            return Ok(id.to_string());
        }
        if id.starts_with(query) {
            matches.push(id);
        }
    }
    match matches.len() {
        0 => Err(format!("{} not found: {}", kind, query)),
        1 => Ok(matches[0].to_string()),
        n => Err(format!(
            "ambiguous {} id \"{}\" matches {} entries; type more characters",
            kind, query, n
        )),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_schedule_time(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("invalid --at time \"{}\": {} (expected RFC 3339)", raw, e))
}

// ---------------------------------------------------------------------------
// Webhooks
// ---------------------------------------------------------------------------

fn cmd_webhook(cmd: WebhookCmd, ctx: &Context) -> CmdResult {
    let mut store = open_store(&ctx.data_dir, system_clock())?;
    match cmd.action {
        WebhookAction::Add(args) => {
            validate::validate_webhook(&args.name, &args.url)?;
            let webhook = store.add_webhook(NewWebhook {
                name: args.name,
                url: args.url,
                image_url: args.image,
            })?;
            if args.select {
                store.set_selected_webhook(&webhook.id)?;
            }
            println!("added webhook: {} ({})", webhook.name, short_id(&webhook.id));
            Ok(())
        }
        WebhookAction::List => {
            let selected = store.selected_webhook_id();
            if ctx.json {
                let items: Vec<WebhookJson> = store
                    .webhooks()
                    .iter()
                    .map(|w| WebhookJson {
                        webhook: w,
                        selected: selected == Some(w.id.as_str()),
                    })
                    .collect();
                return print_json(&items);
            }
            if store.webhooks().is_empty() {
                println!("(no webhooks; add one with `sf webhook add <name> <url>`)");
            }
            for w in store.webhooks() {
                println!("{}", format_webhook_line(w, selected == Some(w.id.as_str())));
            }
            Ok(())
        }
        WebhookAction::Edit(args) => {
            let id = resolve_id("webhook", store.webhooks().iter().map(|w| w.id.as_str()), &args.id)?;
            let patch = WebhookPatch {
                name: args.name,
                url: args.url,
                image_url: if args.clear_image {
                    Some(None)
                } else {
                    args.image.map(Some)
                },
            };
            if patch.is_empty() {
                return Err("nothing to change (use --name, --url, --image or --clear-image)".into());
            }
            if let Some(current) = store.webhook(&id) {
                let name = patch.name.as_deref().unwrap_or(&current.name);
                let url = patch.url.as_deref().unwrap_or(&current.url);
                validate::validate_webhook(name, url)?;
            }
            let updated = store
                .update_webhook(&id, patch)?
                .ok_or_else(|| format!("webhook not found: {}", id))?;
            println!("updated webhook: {} ({})", updated.name, short_id(&updated.id));
            Ok(())
        }
        WebhookAction::Rm(args) => {
            let id = resolve_id("webhook", store.webhooks().iter().map(|w| w.id.as_str()), &args.id)?;
            let was_selected = store.selected_webhook_id() == Some(id.as_str());
            store.delete_webhook(&id)?;
            println!("removed webhook: {}", short_id(&id));
            if was_selected {
                println!("(no webhook selected now)");
            }
            Ok(())
        }
        WebhookAction::Select(args) => {
            let id = resolve_id("webhook", store.webhooks().iter().map(|w| w.id.as_str()), &args.id)?;
            store.set_selected_webhook(&id)?;
            let name = store.webhook(&id).map(|w| w.name.as_str()).unwrap_or_default();
            println!("selected webhook: {} ({})", name, short_id(&id));
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Compose
// ---------------------------------------------------------------------------

async fn cmd_share(args: ShareArgs, ctx: &Context) -> CmdResult {
    let clock = system_clock();
    let mut store = open_store(&ctx.data_dir, clock.clone())?;
    let dispatcher = http_dispatcher(&ctx.config, clock);

    let mut tags = IndexSet::new();
    for tag in &args.tags {
        validate::push_tag(&mut tags, tag);
    }
    let draft = ResourceDraft {
        title: args.title,
        description: args.description,
        url: args.url,
        tags,
        file_url: args.file,
        username: args
            .username
            .or_else(|| ctx.config.compose.default_username().map(String::from)),
    };

    let resource = relay::share_resource(&mut store, &dispatcher, draft).await?;
    let label = history::webhook_label(store.webhooks(), &resource.webhook_id);
    println!("shared: {} ({}) → {}", resource.title, short_id(&resource.id), label);
    Ok(())
}

async fn cmd_msg(args: MsgArgs, ctx: &Context) -> CmdResult {
    let clock = system_clock();
    let mut store = open_store(&ctx.data_dir, clock.clone())?;
    let dispatcher = http_dispatcher(&ctx.config, clock);
    let at = args.at.as_deref().map(parse_schedule_time).transpose()?;

    match relay::send_message(&mut store, &dispatcher, &args.content, at).await? {
        MessageOutcome::Sent => println!("message sent"),
        MessageOutcome::Scheduled(msg) => {
            println!(
                "message scheduled for {} ({})",
                msg.scheduled_for.to_rfc3339(),
                short_id(&msg.id)
            );
            println!("note: scheduled messages are recorded only; nothing sends them automatically");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

fn cmd_history(cmd: HistoryCmd, ctx: &Context) -> CmdResult {
    let mut store = open_store(&ctx.data_dir, system_clock())?;
    match cmd.action {
        None => {
            let filter = HistoryFilter {
                search: cmd.filter.search,
                date: cmd.filter.date,
                tag: cmd.filter.tag.map(|t| t.trim_start_matches('#').to_string()),
            };
            let hits = history::filter_resources(store.resources(), &filter);
            if ctx.json {
                let items: Vec<ResourceJson> = hits
                    .iter()
                    .map(|&r| ResourceJson {
                        resource: r,
                        webhook_name: history::webhook_label(store.webhooks(), &r.webhook_id),
                    })
                    .collect();
                return print_json(&items);
            }
            if hits.is_empty() {
                println!("(no resources found)");
            }
            for r in hits {
                for line in format_resource(r, store.webhooks()) {
                    println!("{}", line);
                }
            }
            Ok(())
        }
        Some(HistoryAction::Rm(args)) => {
            let id = resolve_id("resource", store.resources().iter().map(|r| r.id.as_str()), &args.id)?;
            store.delete_resource(&id)?;
            println!("removed resource: {}", short_id(&id));
            Ok(())
        }
        Some(HistoryAction::Tags(args)) => {
            let all = history::all_tags(store.resources());
            let total = all.len();
            let shown: Vec<&str> = if args.all {
                all
            } else {
                all.into_iter().take(ctx.config.history.top_tags).collect()
            };
            if ctx.json {
                return print_json(&TagsJson { tags: shown, total });
            }
            if total == 0 {
                println!("(no tags yet)");
                return Ok(());
            }
            println!("{}", format_tags(&shown));
            if shown.len() < total {
                println!("({} more; use --all)", total - shown.len());
            }
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

async fn cmd_template(cmd: TemplateCmd, ctx: &Context) -> CmdResult {
    let clock = system_clock();
    let mut store = open_store(&ctx.data_dir, clock.clone())?;
    match cmd.action {
        TemplateAction::Add(args) => {
            if args.name.trim().is_empty() {
                return Err("template name is required".into());
            }
            let template = store.add_template(NewTemplate {
                name: args.name,
                content: args.content,
            })?;
            println!("added template: {} ({})", template.name, short_id(&template.id));
            Ok(())
        }
        TemplateAction::List => {
            if ctx.json {
                return print_json(&store.templates());
            }
            if store.templates().is_empty() {
                println!("(no templates)");
            }
            for t in store.templates() {
                println!("{}", format_template_line(t));
            }
            Ok(())
        }
        TemplateAction::Edit(args) => {
            let id = resolve_id("template", store.templates().iter().map(|t| t.id.as_str()), &args.id)?;
            let patch = TemplatePatch {
                name: args.name,
                content: args.content,
            };
            if patch.name.is_none() && patch.content.is_none() {
                return Err("nothing to change (use --name or --content)".into());
            }
            let updated = store
                .update_template(&id, patch)?
                .ok_or_else(|| format!("template not found: {}", id))?;
            println!("updated template: {} ({})", updated.name, short_id(&updated.id));
            Ok(())
        }
        TemplateAction::Rm(args) => {
            let id = resolve_id("template", store.templates().iter().map(|t| t.id.as_str()), &args.id)?;
            store.delete_template(&id)?;
            println!("removed template: {}", short_id(&id));
            Ok(())
        }
        TemplateAction::Send(args) => {
            let id = resolve_id("template", store.templates().iter().map(|t| t.id.as_str()), &args.id)?;
            let dispatcher = http_dispatcher(&ctx.config, clock);
            relay::send_template(&mut store, &dispatcher, &id).await?;
            println!("message sent");
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Scheduled
// ---------------------------------------------------------------------------

fn cmd_scheduled(cmd: ScheduledCmd, ctx: &Context) -> CmdResult {
    let mut store = open_store(&ctx.data_dir, system_clock())?;
    match cmd.action {
        ScheduledAction::List => {
            if ctx.json {
                let items: Vec<ScheduledJson> = store
                    .scheduled_messages()
                    .iter()
                    .map(|m| ScheduledJson {
                        message: m,
                        webhook_name: history::webhook_label(store.webhooks(), &m.webhook_id),
                        dispatched: false,
                    })
                    .collect();
                return print_json(&items);
            }
            if store.scheduled_messages().is_empty() {
                println!("(no scheduled messages)");
                return Ok(());
            }
            for m in store.scheduled_messages() {
                println!("{}", format_scheduled_line(m, store.webhooks()));
            }
            println!();
            println!("note: scheduled messages are recorded only; nothing sends them automatically");
            Ok(())
        }
        ScheduledAction::Rm(args) => {
            let id = resolve_id(
                "scheduled message",
                store.scheduled_messages().iter().map(|m| m.id.as_str()),
                &args.id,
            )?;
            store.delete_scheduled_message(&id)?;
            println!("removed scheduled message: {}", short_id(&id));
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn cmd_config(cmd: ConfigCmd, ctx: &Context) -> CmdResult {
    match cmd.action {
        ConfigAction::Get(args) => {
            println!("{}", config_io::get_value(&ctx.config, &args.key)?);
            Ok(())
        }
        ConfigAction::Set(args) => {
            let mut doc = config_io::read_config_doc(&ctx.data_dir)?;
            config_io::set_value(&mut doc, &args.key, &args.value)?;
            config_io::write_config_doc(&ctx.data_dir, &doc)?;
            println!("{} = {}", args.key, args.value);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_exact_beats_prefix() {
        let ids = ["abc", "abcdef"];
        assert_eq!(resolve_id("webhook", ids, "abc").unwrap(), "abc");
    }

    #[test]
    fn resolve_unique_prefix() {
        let ids = ["abc123", "def456"];
        assert_eq!(resolve_id("webhook", ids, "de").unwrap(), "def456");
    }

    #[test]
    fn resolve_ambiguous_and_missing() {
        let ids = ["abc123", "abc456"];
        let err = resolve_id("webhook", ids, "abc").unwrap_err();
        assert!(err.contains("ambiguous"));
        let err = resolve_id("webhook", ids, "zzz").unwrap_err();
        assert_eq!(err, "webhook not found: zzz");
    }

    #[test]
    fn schedule_time_accepts_offsets() {
        let t = parse_schedule_time("2030-01-01T10:00:00+01:00").unwrap();
        assert_eq!(t.to_rfc3339(), "2030-01-01T09:00:00+00:00");
        assert!(parse_schedule_time("tomorrow").is_err());
    }
}
