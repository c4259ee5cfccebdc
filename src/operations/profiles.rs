use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::models::domain::{Profile, DEFAULT_PROFILE};

/// Enumerates profile names from the shared AWS credentials and config files.
#[derive(Debug, Clone)]
pub struct ProfileSource {
    credentials_path: PathBuf,
    config_path: PathBuf,
}

impl ProfileSource {
    /// `~/.aws/credentials` and `~/.aws/config`, unless overridden by
    /// `AWS_SHARED_CREDENTIALS_FILE` / `AWS_CONFIG_FILE`.
    pub fn from_env() -> Result<Self> {
        let aws_dir = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not find home directory".into()))?
            .join(".aws");

        let credentials_path = std::env::var_os("AWS_SHARED_CREDENTIALS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| aws_dir.join("credentials"));
        let config_path = std::env::var_os("AWS_CONFIG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| aws_dir.join("config"));

        Ok(Self::with_paths(credentials_path, config_path))
    }

    pub fn with_paths(credentials_path: PathBuf, config_path: PathBuf) -> Self {
        Self {
            credentials_path,
            config_path,
        }
    }

    /// Merged, de-duplicated, sorted profile list. `default` is always present.
    /// An absent file counts as empty.
    pub fn list_profiles(&self) -> Vec<Profile> {
        let mut names = BTreeSet::new();
        names.insert(DEFAULT_PROFILE.to_string());

        if let Some(content) = read_optional(&self.credentials_path) {
            names.extend(credentials_sections(&content));
        }
        if let Some(content) = read_optional(&self.config_path) {
            names.extend(config_sections(&content));
        }

        names.into_iter().map(Profile::new).collect()
    }
}

fn read_optional(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "cannot read AWS profile file");
            }
            None
        }
    }
}

fn section_headers(content: &str) -> impl Iterator<Item = &str> {
    content.lines().filter_map(|line| {
        let line = line.trim();
        line.strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .map(str::trim)
            .filter(|name| !name.is_empty())
    })
}

/// Every `[name]` section of a credentials file.
fn credentials_sections(content: &str) -> Vec<String> {
    section_headers(content).map(str::to_string).collect()
}

/// `[profile name]` and `[default]` sections of a config file. Other sections
/// such as `[sso-session x]` or `[services x]` are not profiles.
fn config_sections(content: &str) -> Vec<String> {
    section_headers(content)
        .filter_map(|header| {
            if let Some(name) = header.strip_prefix("profile ") {
                let name = name.trim();
                (!name.is_empty()).then(|| name.to_string())
            } else if header.contains(char::is_whitespace) {
                None
            } else {
                Some(header.to_string())
            }
        })
        .collect()
}
