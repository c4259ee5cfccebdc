//! Streams objects to the local filesystem.
//!
//! Bytes go to a hidden `.part` sibling first and are renamed into place once
//! complete. An existing file is never replaced; the new one gets a numbered
//! name instead.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::DownloadReport;
use crate::operations::s3::{StorageGateway, DEFAULT_MAX_KEYS};

/// Downloads one object to `destination`, or next to it when that name is
/// taken.
pub async fn download_object(
    gateway: &dyn StorageGateway,
    bucket: &str,
    key: &str,
    destination: &Path,
    generation: u64,
) -> Result<DownloadReport> {
    let (path, bytes) = fetch_to_file(gateway, bucket, key, destination, generation).await?;
    Ok(DownloadReport {
        key: key.to_string(),
        path,
        bytes,
        files: 1,
    })
}

/// Downloads every object below `prefix` into the `destination` folder,
/// keeping the key layout below the prefix. Files finished before a failure
/// or cancellation stay on disk.
pub async fn download_folder(
    gateway: &dyn StorageGateway,
    bucket: &str,
    prefix: &str,
    destination: &Path,
    generation: u64,
) -> Result<DownloadReport> {
    let entries = gateway
        .list_all_objects(bucket, prefix, DEFAULT_MAX_KEYS)
        .await?;
    tokio::fs::create_dir_all(destination).await?;

    let mut bytes = 0;
    let mut files = 0;
    for entry in entries {
        let Some(relative) = relative_path(prefix, &entry.key) else {
            tracing::warn!(key = %entry.key, "skipping key that does not map to a local path");
            continue;
        };
        let target = destination.join(relative);
        let (_, written) = fetch_to_file(gateway, bucket, &entry.key, &target, generation).await?;
        bytes += written;
        files += 1;
    }

    Ok(DownloadReport {
        key: prefix.to_string(),
        path: destination.to_path_buf(),
        bytes,
        files,
    })
}

async fn fetch_to_file(
    gateway: &dyn StorageGateway,
    bucket: &str,
    key: &str,
    destination: &Path,
    generation: u64,
) -> Result<(PathBuf, u64)> {
    let mut body = gateway.fetch_object(bucket, key).await?;

    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let part = PartFile::new(destination, generation);
    let mut file = tokio::fs::File::create(&part.path).await?;
    let bytes = tokio::io::copy(&mut body, &mut file).await?;
    file.flush().await?;
    drop(file);

    let path = part.persist(destination).await?;
    Ok((path, bytes))
}

/// Key below `prefix` as a relative path. `None` for keys with empty, `.` or
/// `..` segments.
fn relative_path(prefix: &str, key: &str) -> Option<PathBuf> {
    let rest = key.strip_prefix(prefix)?;
    let mut path = PathBuf::new();
    for segment in rest.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return None;
        }
        path.push(segment);
    }
    Some(path)
}

/// `path` itself when free, else the first free `name (n).ext`.
async fn unique_destination(path: &Path) -> Result<PathBuf> {
    if !tokio::fs::try_exists(path).await? {
        return Ok(path.to_path_buf());
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut n = 1;
    loop {
        let candidate = path.with_file_name(format!("{stem} ({n}){extension}"));
        if !tokio::fs::try_exists(&candidate).await? {
            return Ok(candidate);
        }
        n += 1;
    }
}

/// Temp sibling owned by one download task. Deleted on drop unless persisted,
/// so a cancelled task never touches a newer download's file.
struct PartFile {
    path: PathBuf,
    persisted: bool,
}

impl PartFile {
    fn new(destination: &Path, generation: u64) -> Self {
        let name = destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path: destination.with_file_name(format!(".{name}.{generation}.part")),
            persisted: false,
        }
    }

    async fn persist(mut self, destination: &Path) -> Result<PathBuf> {
        let target = unique_destination(destination).await?;
        tokio::fs::rename(&self.path, &target).await?;
        self.persisted = true;
        Ok(target)
    }
}

impl Drop for PartFile {
    fn drop(&mut self) {
        if self.persisted {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %e, "cannot remove partial download");
            }
        }
    }
}
