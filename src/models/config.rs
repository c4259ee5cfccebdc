use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_REGION: &str = "us-east-1";

/// Persisted user preferences, seeded at startup and written back after a
/// successful profile change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub download_dir: Option<PathBuf>,
}

fn default_profile() -> String {
    crate::models::domain::DEFAULT_PROFILE.to_string()
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            region: default_region(),
            download_dir: None,
        }
    }
}

impl Preferences {
    /// Directory downloads are written to.
    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Reads and writes `~/.config/s3nav/config.json`.
#[derive(Debug, Clone)]
pub struct PreferencesStore {
    path: PathBuf,
}

impl PreferencesStore {
    pub fn new() -> Result<Self> {
        let path = config_dir()?.join("config.json");
        Ok(Self { path })
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable files fall back to defaults.
    pub fn load(&self) -> Preferences {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %self.path.display(), error = %e, "cannot read preferences");
                }
                return Preferences::default();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "ignoring malformed preferences");
            Preferences::default()
        })
    }

    pub fn save(&self, preferences: &Preferences) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(preferences)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// `~/.config/s3nav`, also home of the log file.
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| Error::Config("Could not find home directory".into()))?;
    Ok(home.join(".config").join("s3nav"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let store = PreferencesStore::with_path(dir.path().join("config.json"));
        let prefs = store.load();
        assert_eq!(prefs, Preferences::default());
        assert_eq!(prefs.profile, "default");
        assert_eq!(prefs.region, "us-east-1");
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = PreferencesStore::with_path(dir.path().join("nested").join("config.json"));
        let prefs = Preferences {
            profile: "dev".into(),
            region: "eu-central-1".into(),
            download_dir: Some(PathBuf::from("/tmp/downloads")),
        };
        store.save(&prefs).unwrap();
        assert_eq!(store.load(), prefs);
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(PreferencesStore::with_path(path).load(), Preferences::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"profile":"ops"}"#).unwrap();
        let prefs = PreferencesStore::with_path(path).load();
        assert_eq!(prefs.profile, "ops");
        assert_eq!(prefs.region, DEFAULT_REGION);
        assert!(prefs.download_dir.is_none());
    }
}
