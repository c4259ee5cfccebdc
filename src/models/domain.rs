use chrono::{DateTime, Utc};
use std::path::PathBuf;

use super::list::ListEntry;

/// Name of the profile that is always offered, even without any config file.
pub const DEFAULT_PROFILE: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Profile {
    pub name: String,
}

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl Bucket {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectEntry {
    pub key: String,
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
    pub storage_class: String,
    pub is_directory: bool,
}

impl ObjectEntry {
    pub fn file(key: impl Into<String>, size: i64) -> Self {
        Self {
            key: key.into(),
            size,
            last_modified: None,
            storage_class: String::new(),
            is_directory: false,
        }
    }

    /// A common prefix returned by a delimited listing.
    pub fn directory(prefix: impl Into<String>) -> Self {
        Self {
            key: prefix.into(),
            size: 0,
            last_modified: None,
            storage_class: String::new(),
            is_directory: true,
        }
    }

    /// Last path segment of the key. Directories keep their trailing slash,
    /// so this is the name shown under the parent prefix.
    pub fn name(&self) -> &str {
        let trimmed = self.key.trim_end_matches('/');
        let start = trimmed.rfind('/').map(|i| i + 1).unwrap_or(0);
        &self.key[start..]
    }

    /// Last path segment of the key, without the trailing slash of a prefix.
    pub fn base_name(&self) -> &str {
        let trimmed = self.key.trim_end_matches('/');
        trimmed
            .rsplit_once('/')
            .map(|(_, name)| name)
            .unwrap_or(trimmed)
    }
}

impl ListEntry for Profile {
    fn label(&self) -> &str {
        &self.name
    }
}

impl ListEntry for Bucket {
    fn label(&self) -> &str {
        &self.name
    }
}

impl ListEntry for ObjectEntry {
    fn label(&self) -> &str {
        self.name()
    }
}

/// Outcome of a finished download. For a folder, `key` is the prefix and
/// `path` the local folder.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadReport {
    pub key: String,
    pub path: PathBuf,
    pub bytes: u64,
    pub files: usize,
}

/// Leading text of an object.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPreview {
    pub key: String,
    pub text: String,
    /// Bytes read from the object.
    pub bytes: u64,
    /// The object is longer than what was read.
    pub truncated: bool,
}

/// Parent of a `/`-delimited prefix: `a/b/` -> `a/`, `a/` -> ``.
pub fn parent_prefix(prefix: &str) -> String {
    prefix
        .trim_end_matches('/')
        .rsplit_once('/')
        .map(|(parent, _)| format!("{parent}/"))
        .unwrap_or_default()
}
