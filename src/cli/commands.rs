use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sf", about = concat!("sf v", env!("CARGO_PKG_VERSION"), " - share links and messages to Discord webhooks"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a starter config.toml in the data directory
    Init(InitArgs),
    /// Manage webhooks
    Webhook(WebhookCmd),
    /// Share a link through the selected webhook
    Share(ShareArgs),
    /// Send (or schedule) a plain message through the selected webhook
    Msg(MsgArgs),
    /// Browse shared resources
    History(HistoryCmd),
    /// Manage message templates
    Template(TemplateCmd),
    /// List or remove scheduled messages
    Scheduled(ScheduledCmd),
    /// Read or change config.toml
    Config(ConfigCmd),
}

// ---------------------------------------------------------------------------
// Init args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing config.toml
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Webhook args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct WebhookCmd {
    #[command(subcommand)]
    pub action: WebhookAction,
}

#[derive(Subcommand)]
pub enum WebhookAction {
    /// Register a webhook
    Add(WebhookAddArgs),
    /// List webhooks (* marks the selected one)
    List,
    /// Change a webhook's name, URL or image
    Edit(WebhookEditArgs),
    /// Remove a webhook
    Rm(IdArg),
    /// Select the webhook used by share and msg
    Select(IdArg),
}

#[derive(Args)]
pub struct WebhookAddArgs {
    /// Display name, e.g. "OSINT Updates"
    pub name: String,
    /// https://discord.com/api/webhooks/<id>/<token>
    pub url: String,
    /// Image URL shown next to the webhook
    #[arg(long)]
    pub image: Option<String>,
    /// Select the new webhook
    #[arg(long)]
    pub select: bool,
}

#[derive(Args)]
pub struct WebhookEditArgs {
    /// Webhook ID (or unique prefix)
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub url: Option<String>,
    #[arg(long, conflicts_with = "clear_image")]
    pub image: Option<String>,
    /// Remove the image
    #[arg(long)]
    pub clear_image: bool,
}

#[derive(Args)]
pub struct IdArg {
    /// Record ID (or unique prefix)
    pub id: String,
}

// ---------------------------------------------------------------------------
// Compose args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ShareArgs {
    /// Resource title
    pub title: String,
    #[arg(short, long)]
    pub description: Option<String>,
    /// Link target
    #[arg(short, long)]
    pub url: Option<String>,
    /// Tag (repeatable)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,
    /// File URL to attach
    #[arg(long)]
    pub file: Option<String>,
    /// Display name override for this post
    #[arg(long)]
    pub username: Option<String>,
}

#[derive(Args)]
pub struct MsgArgs {
    /// Message text
    pub content: String,
    /// Record for later instead of sending (RFC 3339, e.g. 2025-06-01T09:00:00Z)
    #[arg(long)]
    pub at: Option<String>,
}

// ---------------------------------------------------------------------------
// History args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct HistoryCmd {
    #[command(subcommand)]
    pub action: Option<HistoryAction>,
    #[command(flatten)]
    pub filter: HistoryFilterArgs,
}

#[derive(Args)]
pub struct HistoryFilterArgs {
    /// Match title or description (case-insensitive)
    #[arg(short, long)]
    pub search: Option<String>,
    /// Only resources shared on this date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,
    /// Only resources with this tag
    #[arg(long)]
    pub tag: Option<String>,
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// Remove a resource from history
    Rm(IdArg),
    /// List tags used in history
    Tags(HistoryTagsArgs),
}

#[derive(Args)]
pub struct HistoryTagsArgs {
    /// Show every tag instead of the first few
    #[arg(long)]
    pub all: bool,
}

// ---------------------------------------------------------------------------
// Template args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct TemplateCmd {
    #[command(subcommand)]
    pub action: TemplateAction,
}

#[derive(Subcommand)]
pub enum TemplateAction {
    /// Save a template
    Add(TemplateAddArgs),
    /// List templates
    List,
    /// Change a template's name or content
    Edit(TemplateEditArgs),
    /// Remove a template
    Rm(IdArg),
    /// Send a template's content through the selected webhook
    Send(IdArg),
}

#[derive(Args)]
pub struct TemplateAddArgs {
    pub name: String,
    pub content: String,
}

#[derive(Args)]
pub struct TemplateEditArgs {
    /// Template ID (or unique prefix)
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub content: Option<String>,
}

// ---------------------------------------------------------------------------
// Scheduled args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ScheduledCmd {
    #[command(subcommand)]
    pub action: ScheduledAction,
}

#[derive(Subcommand)]
pub enum ScheduledAction {
    /// List scheduled messages
    List,
    /// Remove a scheduled message
    Rm(IdArg),
}

// ---------------------------------------------------------------------------
// Config args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective value of a key (e.g. embed.footer)
    Get(ConfigGetArgs),
    /// Set a key in config.toml, keeping comments intact
    Set(ConfigSetArgs),
}

#[derive(Args)]
pub struct ConfigGetArgs {
    pub key: String,
}

#[derive(Args)]
pub struct ConfigSetArgs {
    pub key: String,
    pub value: String,
}
