//! Configuration management for MegaBlog.
//!
//! Loads configuration from ${MEGABLOG_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::PostStatus;

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Merges user config values into the default template.
///
/// New comments/sections from the template are always present, while the
/// user's customized values are preserved.
fn merge_with_template(user_config: &str) -> Result<String> {
    use toml_edit::DocumentMut;

    let mut doc: DocumentMut = default_config_template()
        .parse()
        .context("Failed to parse default config template")?;

    let user_doc: DocumentMut = user_config.parse().context("Failed to parse user config")?;

    merge_items(doc.as_table_mut(), user_doc.as_table());

    Ok(doc.to_string())
}

/// Recursively merges items from source table into target table.
fn merge_items(target: &mut toml_edit::Table, source: &toml_edit::Table) {
    use toml_edit::Item;

    for (key, value) in source.iter() {
        match value {
            Item::Value(v) => {
                target[key] = Item::Value(v.clone());
            }
            Item::Table(src_table) => {
                if let Some(Item::Table(target_table)) = target.get_mut(key) {
                    merge_items(target_table, src_table);
                } else {
                    target[key] = Item::Table(src_table.clone());
                }
            }
            Item::ArrayOfTables(src_arr) => {
                target[key] = Item::ArrayOfTables(src_arr.clone());
            }
            Item::None => {}
        }
    }
}

pub mod paths {
    //! Path resolution for MegaBlog configuration and data directories.
    //!
    //! MEGABLOG_HOME resolution order:
    //! 1. MEGABLOG_HOME environment variable (if set)
    //! 2. ~/.config/megablog (default)
    //! 3. ./.megablog when no home directory can be determined

    use std::path::PathBuf;

    /// Returns the user's home directory, if known.
    pub fn home_dir() -> Option<PathBuf> {
        dirs::home_dir()
    }

    /// Returns the MegaBlog home directory.
    pub fn megablog_home() -> PathBuf {
        if let Ok(home) = std::env::var("MEGABLOG_HOME")
            && !home.trim().is_empty()
        {
            return PathBuf::from(home);
        }

        home_dir().map_or_else(
            || PathBuf::from(".megablog"),
            |h| h.join(".config").join("megablog"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        megablog_home().join("config.toml")
    }

    /// Returns the path to the persisted session file.
    pub fn session_path() -> PathBuf {
        megablog_home().join("session.json")
    }

    /// Returns the directory holding log files.
    pub fn logs_dir() -> PathBuf {
        megablog_home().join("logs")
    }
}

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// API endpoint, including the `/v1` suffix.
    pub endpoint: String,
    pub project_id: String,
    pub database_id: String,
    pub collection_id: String,
    pub bucket_id: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl BackendConfig {
    pub const DEFAULT_ENDPOINT: &'static str = "https://cloud.appwrite.io/v1";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Resolves the effective backend settings (env > config > default).
    ///
    /// # Errors
    /// Returns an error if the endpoint is not a valid URL or an id is missing.
    pub fn resolve(&self) -> Result<ResolvedBackend> {
        let endpoint = resolve_endpoint(&self.endpoint)?;
        Ok(ResolvedBackend {
            endpoint,
            project_id: resolve_id(&self.project_id, "MEGABLOG_APPWRITE_PROJECT_ID", "project_id")?,
            database_id: resolve_id(
                &self.database_id,
                "MEGABLOG_APPWRITE_DATABASE_ID",
                "database_id",
            )?,
            collection_id: resolve_id(
                &self.collection_id,
                "MEGABLOG_APPWRITE_COLLECTION_ID",
                "collection_id",
            )?,
            bucket_id: resolve_id(&self.bucket_id, "MEGABLOG_APPWRITE_BUCKET_ID", "bucket_id")?,
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
        })
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            project_id: String::new(),
            database_id: String::new(),
            collection_id: String::new(),
            bucket_id: String::new(),
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Backend settings after env overrides and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBackend {
    /// Endpoint without a trailing slash.
    pub endpoint: String,
    pub project_id: String,
    pub database_id: String,
    pub collection_id: String,
    pub bucket_id: String,
    pub timeout: Duration,
}

fn resolve_endpoint(config_endpoint: &str) -> Result<String> {
    let raw = std::env::var("MEGABLOG_APPWRITE_URL")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| {
            let trimmed = config_endpoint.trim();
            if trimmed.is_empty() {
                BackendConfig::DEFAULT_ENDPOINT.to_string()
            } else {
                trimmed.to_string()
            }
        });
    let trimmed = raw.trim().trim_end_matches('/');
    url::Url::parse(trimmed).with_context(|| format!("Invalid backend endpoint URL: {trimmed}"))?;
    Ok(trimmed.to_string())
}

fn resolve_id(config_value: &str, env_var: &str, key: &str) -> Result<String> {
    if let Ok(value) = std::env::var(env_var) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
    }

    let trimmed = config_value.trim();
    if trimmed.is_empty() {
        anyhow::bail!("No {key} configured. Set {env_var} or {key} in [backend] of config.toml.");
    }
    Ok(trimmed.to_string())
}

/// Post editor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Status preselected for new posts.
    pub default_status: PostStatus,
    /// Delete a freshly uploaded image if the record mutation after it fails.
    pub compensate_failed_uploads: bool,
    /// Largest image accepted for upload, in bytes.
    pub max_image_bytes: u64,
}

impl EditorConfig {
    pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_status: PostStatus::Active,
            compensate_failed_uploads: false,
            max_image_bytes: Self::DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive (e.g. "info", "megablog_core=debug").
    pub level: String,
    /// File name inside the logs directory.
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: "megablog.log".to_string(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub editor: EditorConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a config file from the default template.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Sets one `section.key` value in the config file at `path`.
    ///
    /// The value type follows the template (integer, boolean or string).
    /// Creates the file from the template if it doesn't exist and keeps
    /// existing comments and values.
    ///
    /// # Errors
    /// Returns an error for unknown keys, values of the wrong type, or I/O failures.
    pub fn set_value_in(path: &Path, key: &str, raw_value: &str) -> Result<()> {
        use toml_edit::{DocumentMut, Item, value};

        let (section, field) = key
            .split_once('.')
            .with_context(|| format!("Config key must look like 'section.key', got '{key}'"))?;

        let contents = if path.exists() {
            let user_config = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            merge_with_template(&user_config)?
        } else {
            default_config_template().to_string()
        };

        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        let Some(Item::Table(table)) = doc.get_mut(section) else {
            anyhow::bail!("Unknown config section '{section}'");
        };
        let Some(current) = table.get(field) else {
            anyhow::bail!("Unknown config key '{key}'");
        };

        let new_item = if current.as_integer().is_some() {
            let parsed: i64 = raw_value
                .trim()
                .parse()
                .with_context(|| format!("'{key}' expects an integer, got '{raw_value}'"))?;
            value(parsed)
        } else if current.as_bool().is_some() {
            let parsed: bool = raw_value
                .trim()
                .parse()
                .with_context(|| format!("'{key}' expects true or false, got '{raw_value}'"))?;
            value(parsed)
        } else {
            value(raw_value.trim())
        };
        table[field] = new_item;

        let rendered = doc.to_string();
        toml::from_str::<Config>(&rendered)
            .with_context(|| format!("Invalid value for '{key}': {raw_value}"))?;

        Self::write_config(path, &rendered)
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_template_parses_to_defaults() {
        let config: Config = toml::from_str(default_config_template()).unwrap();
        assert_eq!(config.backend.endpoint, BackendConfig::DEFAULT_ENDPOINT);
        assert_eq!(config.editor.default_status, PostStatus::Active);
        assert!(!config.editor.compensate_failed_uploads);
        assert_eq!(
            config.editor.max_image_bytes,
            EditorConfig::DEFAULT_MAX_IMAGE_BYTES
        );
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.backend.timeout_secs, BackendConfig::DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[backend]\nproject_id = \"proj\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.backend.project_id, "proj");
        assert_eq!(config.backend.endpoint, BackendConfig::DEFAULT_ENDPOINT);
        assert_eq!(config.logging.file, "megablog.log");
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        Config::init(&path).unwrap();
        let err = Config::init(&path).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_set_value_preserves_comments_and_types() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        Config::init(&path).unwrap();

        Config::set_value_in(&path, "backend.project_id", "my-project").unwrap();
        Config::set_value_in(&path, "backend.timeout_secs", "5").unwrap();
        Config::set_value_in(&path, "editor.compensate_failed_uploads", "true").unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("# Appwrite API endpoint"));

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.backend.project_id, "my-project");
        assert_eq!(config.backend.timeout_secs, 5);
        assert!(config.editor.compensate_failed_uploads);
    }

    #[test]
    fn test_set_value_rejects_unknown_key_and_bad_value() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        assert!(Config::set_value_in(&path, "backend.nope", "x").is_err());
        assert!(Config::set_value_in(&path, "backend", "x").is_err());
        assert!(Config::set_value_in(&path, "backend.timeout_secs", "soon").is_err());
        assert!(Config::set_value_in(&path, "editor.default_status", "draft").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_resolve_requires_ids() {
        let backend = BackendConfig {
            project_id: "p".to_string(),
            ..BackendConfig::default()
        };
        // Only fails on ids that are unset in both env and config.
        if std::env::var("MEGABLOG_APPWRITE_DATABASE_ID").is_err() {
            let err = backend.resolve().unwrap_err();
            assert!(err.to_string().contains("database_id"));
        }
    }

    #[test]
    fn test_resolve_trims_trailing_slash() {
        if std::env::var("MEGABLOG_APPWRITE_URL").is_ok() {
            return;
        }
        let backend = BackendConfig {
            endpoint: "http://localhost:8080/v1/".to_string(),
            project_id: "p".to_string(),
            database_id: "d".to_string(),
            collection_id: "c".to_string(),
            bucket_id: "b".to_string(),
            timeout_secs: 0,
        };
        let resolved = backend.resolve().unwrap();
        assert_eq!(resolved.endpoint, "http://localhost:8080/v1");
        assert_eq!(resolved.timeout, Duration::from_secs(1));
    }
}
