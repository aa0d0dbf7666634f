//! Persisted backend session.
//!
//! Stores the session cookie in `<base>/session.json` with restricted
//! permissions (0600) so separate CLI invocations share one login.
//! The cookie is never logged.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::paths;

/// Saved session for one endpoint/project pair.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCache {
    pub endpoint: String,
    pub project_id: String,
    /// Value sent back in the `X-Fallback-Cookies` header.
    pub cookie: String,
    #[serde(default)]
    pub user_id: String,
}

impl std::fmt::Debug for SessionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCache")
            .field("endpoint", &self.endpoint)
            .field("project_id", &self.project_id)
            .field("cookie", &"<redacted>")
            .field("user_id", &self.user_id)
            .finish()
    }
}

impl SessionCache {
    pub fn cache_path() -> PathBuf {
        paths::session_path()
    }

    /// Returns `None` if the file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read session from {}", path.display()))?;
        let cache = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse session from {}", path.display()))?;
        Ok(Some(cache))
    }

    /// Returns true if this session was issued by the given backend.
    pub fn matches(&self, endpoint: &str, project_id: &str) -> bool {
        self.endpoint == endpoint && self.project_id == project_id
    }

    /// Saves with restricted permissions (0600).
    ///
    /// # Errors
    /// Returns an error if the directory or file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize session")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(path)
                .with_context(|| format!("Failed to open {} for writing", path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }

        #[cfg(not(unix))]
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)
                .with_context(|| format!("Failed to open {} for writing", path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }

        Ok(())
    }

    /// Removes the file. Missing files are not an error.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear_at(path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to remove session {}", path.display()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SessionCache {
        SessionCache {
            endpoint: "http://localhost/v1".to_string(),
            project_id: "proj".to_string(),
            cookie: r#"{"a_session_proj":"secret"}"#.to_string(),
            user_id: "u1".to_string(),
        }
    }

    #[test]
    fn test_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        assert_eq!(SessionCache::load_from(&path).unwrap(), None);
        sample().save_to(&path).unwrap();
        assert_eq!(SessionCache::load_from(&path).unwrap(), Some(sample()));

        SessionCache::clear_at(&path).unwrap();
        assert!(!path.exists());
        SessionCache::clear_at(&path).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_with_restricted_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        sample().save_to(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn test_debug_redacts_cookie() {
        let debug = format!("{:?}", sample());
        assert!(!debug.contains("secret"));
        assert!(sample().matches("http://localhost/v1", "proj"));
        assert!(!sample().matches("http://localhost/v1", "other"));
    }
}
