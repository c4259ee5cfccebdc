use async_trait::async_trait;
use aws_config::environment::EnvironmentVariableCredentialsProvider;
use aws_config::meta::credentials::CredentialsProviderChain;
use aws_config::profile::ProfileFileCredentialsProvider;
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_sdk_s3::config::{BehaviorVersion, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};
use std::pin::Pin;
use std::sync::Arc;
use tokio::io::AsyncRead;

use crate::error::{Error, Result};
use crate::models::domain::{Bucket, ObjectEntry, Profile, DEFAULT_PROFILE};

/// Upper bound on keys returned by one listing page.
pub const DEFAULT_MAX_KEYS: i32 = 1000;

/// Streaming object content.
pub type ObjectBody = Pin<Box<dyn AsyncRead + Send>>;

/// Remote list/get/head operations, bound to one session's client.
///
/// Returns domain records only. Implemented by [`S3Gateway`] and by fakes in
/// tests.
#[async_trait]
pub trait StorageGateway: Send + Sync {
    async fn list_buckets(&self) -> Result<Vec<Bucket>>;

    /// One delimited page under `prefix`. Common prefixes come back as
    /// directory entries.
    async fn list_objects(&self, bucket: &str, prefix: &str, max_keys: i32)
        -> Result<Vec<ObjectEntry>>;

    /// One undelimited page of every object below `prefix`, for folder
    /// downloads. Folder placeholder keys are skipped.
    async fn list_all_objects(
        &self,
        bucket: &str,
        prefix: &str,
        max_keys: i32,
    ) -> Result<Vec<ObjectEntry>>;

    async fn fetch_object(&self, bucket: &str, key: &str) -> Result<ObjectBody>;

    /// Fails with [`Error::InvalidMetadata`] when size or modification time
    /// is missing.
    async fn stat_object(&self, bucket: &str, key: &str) -> Result<ObjectEntry>;
}

/// Builds a fresh gateway for a profile. Must not perform network I/O.
pub trait SessionFactory: Send + Sync {
    fn connect(&self, profile: &Profile, region: &str) -> Result<Arc<dyn StorageGateway>>;
}

/// Creates [`S3Gateway`]s from the shared AWS profile files.
pub struct S3SessionFactory {
    known_profiles: Vec<Profile>,
}

impl S3SessionFactory {
    pub fn new(known_profiles: Vec<Profile>) -> Self {
        Self { known_profiles }
    }
}

impl SessionFactory for S3SessionFactory {
    fn connect(&self, profile: &Profile, region: &str) -> Result<Arc<dyn StorageGateway>> {
        let region = region.trim();
        if region.is_empty() {
            return Err(Error::Credential(format!(
                "no region configured for profile '{}'",
                profile.name
            )));
        }
        if profile.name != DEFAULT_PROFILE && !self.known_profiles.contains(profile) {
            return Err(Error::Credential(format!(
                "profile '{}' is not defined in the AWS config or credentials files",
                profile.name
            )));
        }

        let from_file = ProfileFileCredentialsProvider::builder()
            .profile_name(&profile.name)
            .build();

        // The default profile also honours credentials exported in the environment.
        let credentials = if profile.name == DEFAULT_PROFILE {
            SharedCredentialsProvider::new(
                CredentialsProviderChain::first_try(
                    "Environment",
                    EnvironmentVariableCredentialsProvider::new(),
                )
                .or_else("Profile", from_file),
            )
        } else {
            SharedCredentialsProvider::new(from_file)
        };

        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(credentials)
            .build();

        tracing::info!(profile = %profile.name, region, "created S3 client");
        Ok(Arc::new(S3Gateway::new(Client::from_conf(config))))
    }
}

#[derive(Clone)]
pub struct S3Gateway {
    client: Client,
}

impl S3Gateway {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StorageGateway for S3Gateway {
    async fn list_buckets(&self) -> Result<Vec<Bucket>> {
        let resp = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| backend_error("Failed to list buckets", e))?;

        Ok(resp
            .buckets()
            .iter()
            .map(|b| Bucket {
                name: b.name().unwrap_or_default().to_string(),
                created_at: b.creation_date().and_then(to_chrono),
            })
            .collect())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        max_keys: i32,
    ) -> Result<Vec<ObjectEntry>> {
        let resp = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .delimiter("/")
            .max_keys(max_keys)
            .send()
            .await
            .map_err(|e| backend_error(&format!("Failed to list objects in '{bucket}'"), e))?;

        let mut entries = Vec::new();

        for cp in resp.common_prefixes() {
            if let Some(p) = cp.prefix() {
                entries.push(ObjectEntry::directory(p));
            }
        }

        // The folder placeholder object for the prefix itself is skipped.
        entries.extend(
            resp.contents()
                .iter()
                .filter(|obj| obj.key().is_some_and(|key| key != prefix))
                .map(entry_from_object),
        );

        Ok(entries)
    }

    async fn list_all_objects(
        &self,
        bucket: &str,
        prefix: &str,
        max_keys: i32,
    ) -> Result<Vec<ObjectEntry>> {
        let resp = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .max_keys(max_keys)
            .send()
            .await
            .map_err(|e| backend_error(&format!("Failed to list '{bucket}/{prefix}'"), e))?;

        if resp.is_truncated().unwrap_or(false) {
            tracing::warn!(bucket, prefix, max_keys, "folder listing truncated");
        }

        Ok(resp
            .contents()
            .iter()
            .filter(|obj| obj.key().is_some_and(|key| !key.ends_with('/')))
            .map(entry_from_object)
            .collect())
    }

    async fn fetch_object(&self, bucket: &str, key: &str) -> Result<ObjectBody> {
        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| backend_error(&format!("Failed to get '{key}'"), e))?;

        Ok(Box::pin(resp.body.into_async_read()))
    }

    async fn stat_object(&self, bucket: &str, key: &str) -> Result<ObjectEntry> {
        let resp = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| backend_error(&format!("Failed to get metadata of '{key}'"), e))?;

        entry_from_head(
            key,
            resp.content_length(),
            resp.last_modified().and_then(to_chrono),
            resp.storage_class().map(|c| c.as_str()),
        )
    }
}

fn entry_from_object(obj: &aws_sdk_s3::types::Object) -> ObjectEntry {
    ObjectEntry {
        key: obj.key().unwrap_or_default().to_string(),
        size: obj.size().unwrap_or(0),
        last_modified: obj.last_modified().and_then(to_chrono),
        storage_class: obj
            .storage_class()
            .map(|c| c.as_str().to_string())
            .unwrap_or_default(),
        is_directory: false,
    }
}

/// Head responses omit the storage class for STANDARD objects.
fn entry_from_head(
    key: &str,
    content_length: Option<i64>,
    last_modified: Option<DateTime<Utc>>,
    storage_class: Option<&str>,
) -> Result<ObjectEntry> {
    let size = content_length
        .ok_or_else(|| Error::InvalidMetadata(format!("'{key}' has no content length")))?;
    let last_modified = last_modified
        .ok_or_else(|| Error::InvalidMetadata(format!("'{key}' has no modification time")))?;

    Ok(ObjectEntry {
        key: key.to_string(),
        size,
        last_modified: Some(last_modified),
        storage_class: storage_class.unwrap_or("STANDARD").to_string(),
        is_directory: false,
    })
}

fn to_chrono(t: &aws_sdk_s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(t.secs(), t.subsec_nanos())
}

fn backend_error<E: std::error::Error>(action: &str, err: E) -> Error {
    Error::Backend(format!("{action}: {}", DisplayErrorContext(err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_without_size_is_invalid() {
        let err = entry_from_head("a.txt", None, Some(Utc::now()), None).unwrap_err();
        assert!(matches!(err, Error::InvalidMetadata(_)));
    }

    #[test]
    fn test_head_without_mtime_is_invalid() {
        let err = entry_from_head("a.txt", Some(10), None, None).unwrap_err();
        assert!(matches!(err, Error::InvalidMetadata(_)));
    }

    #[test]
    fn test_head_defaults_storage_class() {
        let entry = entry_from_head("a.txt", Some(10), Some(Utc::now()), None).unwrap();
        assert_eq!(entry.size, 10);
        assert_eq!(entry.storage_class, "STANDARD");
        assert!(!entry.is_directory);

        let entry = entry_from_head("b.txt", Some(1), Some(Utc::now()), Some("GLACIER")).unwrap();
        assert_eq!(entry.storage_class, "GLACIER");
    }

    #[test]
    fn test_entry_from_listed_object() {
        let obj = aws_sdk_s3::types::Object::builder()
            .key("logs/app.log")
            .size(42)
            .storage_class(aws_sdk_s3::types::ObjectStorageClass::StandardIa)
            .build();
        let entry = entry_from_object(&obj);
        assert_eq!(entry.key, "logs/app.log");
        assert_eq!(entry.size, 42);
        assert_eq!(entry.storage_class, "STANDARD_IA");
        assert!(entry.last_modified.is_none());
        assert!(!entry.is_directory);
    }

    #[test]
    fn test_connect_rejects_unknown_profile() {
        let factory = S3SessionFactory::new(vec![Profile::new("dev")]);
        let err = factory
            .connect(&Profile::new("staging"), "us-east-1")
            .err()
            .unwrap();
        assert!(matches!(err, Error::Credential(_)));
    }

    #[test]
    fn test_connect_rejects_empty_region() {
        let factory = S3SessionFactory::new(vec![Profile::new("dev")]);
        let err = factory.connect(&Profile::new("dev"), "  ").err().unwrap();
        assert!(matches!(err, Error::Credential(_)));
    }
}
