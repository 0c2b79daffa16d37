use serde::{Deserialize, Serialize};

/// Default embed accent color (orange)
pub const DEFAULT_EMBED_COLOR: u32 = 0xFF9933;
/// Default embed footer text
pub const DEFAULT_FOOTER: &str = "ShareFlow made by iqlip 💖";

/// Configuration from config.toml. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub embed: EmbedConfig,
    #[serde(default)]
    pub compose: ComposeConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedConfig {
    /// Default: see src/cli/handlers/init.rs (CONFIG_TOML_TEMPLATE)
    #[serde(default = "default_color")]
    pub color: u32,
    /// Default: see src/cli/handlers/init.rs (CONFIG_TOML_TEMPLATE)
    #[serde(default = "default_footer")]
    pub footer: String,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        EmbedConfig {
            color: DEFAULT_EMBED_COLOR,
            footer: DEFAULT_FOOTER.to_string(),
        }
    }
}

fn default_color() -> u32 {
    DEFAULT_EMBED_COLOR
}

fn default_footer() -> String {
    DEFAULT_FOOTER.to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComposeConfig {
    /// Display-name override applied to shared resources when `--username`
    /// is not given. Empty means none.
    #[serde(default)]
    pub username: String,
}

impl ComposeConfig {
    pub fn default_username(&self) -> Option<&str> {
        let name = self.username.trim();
        (!name.is_empty()).then_some(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// How many tags `history tags` shows without `--all`
    #[serde(default = "default_top_tags")]
    pub top_tags: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig {
            top_tags: default_top_tags(),
        }
    }
}

fn default_top_tags() -> usize {
    7
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// tracing EnvFilter directive; RUST_LOG takes precedence
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "warn".to_string()
}
