use std::fs;
use std::path::{Path, PathBuf};

use crate::io::storage::atomic_write;
use crate::model::config::Config;

pub const CONFIG_FILE: &str = "config.toml";

/// Error type for config I/O operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("could not edit config.toml: {0}")]
    EditError(#[from] toml_edit::TomlError),
    #[error("unknown config key: {0}")]
    UnknownKey(String),
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

/// Load config.toml from the data directory. A missing file yields defaults.
pub fn load_config(data_dir: &Path) -> Result<Config, ConfigError> {
    let path = config_path(data_dir);
    if !path.exists() {
        return Ok(Config::default());
    }
    let text = fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

/// Read the config as a toml_edit document for format-preserving edits.
/// A missing file yields an empty document.
pub fn read_config_doc(data_dir: &Path) -> Result<toml_edit::DocumentMut, ConfigError> {
    let path = config_path(data_dir);
    if !path.exists() {
        return Ok(toml_edit::DocumentMut::new());
    }
    let text = fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    Ok(text.parse()?)
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config_doc(data_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ConfigError> {
    let path = config_path(data_dir);
    fs::create_dir_all(data_dir).map_err(|e| ConfigError::WriteError {
        path: data_dir.to_path_buf(),
        source: e,
    })?;
    atomic_write(&path, doc.to_string().as_bytes())
        .map_err(|e| ConfigError::WriteError { path, source: e })
}

/// Split a dotted key like `embed.footer` into `(section, field)`.
fn split_key(key: &str) -> Result<(&str, &str), ConfigError> {
    match key.split_once('.') {
        Some((section, field)) if !section.is_empty() && !field.is_empty() => {
            Ok((section, field))
        }
        _ => Err(ConfigError::UnknownKey(key.to_string())),
    }
}

/// Current effective value of a dotted key, after defaults are applied.
pub fn get_value(config: &Config, key: &str) -> Result<String, ConfigError> {
    let (section, field) = split_key(key)?;
    let value = toml::Value::try_from(config)
        .ok()
        .and_then(|v| v.get(section).and_then(|s| s.get(field)).cloned())
        .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
    Ok(match value {
        toml::Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Set a dotted key in the document. The raw value is read as a TOML
/// literal when it parses as one (numbers, booleans, quoted strings) and as
/// a bare string otherwise. The edited document must still deserialize into
/// a valid `Config` or the edit is rejected.
pub fn set_value(doc: &mut toml_edit::DocumentMut, key: &str, raw: &str) -> Result<(), ConfigError> {
    let (section, field) = split_key(key)?;
    if get_value(&Config::default(), key).is_err() {
        return Err(ConfigError::UnknownKey(key.to_string()));
    }

    let value = raw
        .parse::<toml_edit::Value>()
        .unwrap_or_else(|_| toml_edit::Value::from(raw));

    if !doc.contains_key(section) {
        doc[section] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc[section][field] = toml_edit::Item::Value(value);

    toml::from_str::<Config>(&doc.to_string())?;
    Ok(())
}
