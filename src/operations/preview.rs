use tokio::io::AsyncReadExt;

use crate::error::{Error, Result};
use crate::models::ObjectPreview;
use crate::operations::s3::StorageGateway;

/// Bytes read from an object for its preview.
pub const PREVIEW_LIMIT: u64 = 100 * 1024;

/// Reads at most `limit` bytes of an object and decodes them as text.
pub async fn load_preview(
    gateway: &dyn StorageGateway,
    bucket: &str,
    key: &str,
    limit: u64,
) -> Result<ObjectPreview> {
    let body = gateway.fetch_object(bucket, key).await?;

    // One byte past the limit tells whether the object goes on.
    let mut buffer = Vec::new();
    body.take(limit.saturating_add(1)).read_to_end(&mut buffer).await?;
    let truncated = buffer.len() as u64 > limit;
    buffer.truncate(limit as usize);
    let bytes = buffer.len() as u64;

    let text = decode_text(key, buffer, truncated)?;
    let text = if !truncated && key.to_lowercase().ends_with(".json") {
        pretty_json(&text).unwrap_or(text)
    } else {
        text
    };

    Ok(ObjectPreview {
        key: key.to_string(),
        text,
        bytes,
        truncated,
    })
}

/// A multi-byte character cut by the read limit is dropped; any other
/// invalid sequence means the object is not text.
fn decode_text(key: &str, bytes: Vec<u8>, truncated: bool) -> Result<String> {
    let not_text = || Error::Preview(format!("'{key}' is not valid UTF-8 text"));
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) if truncated && e.utf8_error().error_len().is_none() => {
            let valid = e.utf8_error().valid_up_to();
            let mut bytes = e.into_bytes();
            bytes.truncate(valid);
            String::from_utf8(bytes).map_err(|_| not_text())
        }
        Err(_) => Err(not_text()),
    }
}

fn pretty_json(text: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    serde_json::to_string_pretty(&value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Bucket, ObjectEntry};
    use crate::operations::s3::ObjectBody;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct Objects(HashMap<&'static str, Vec<u8>>);

    #[async_trait]
    impl StorageGateway for Objects {
        async fn list_buckets(&self) -> Result<Vec<Bucket>> {
            Ok(Vec::new())
        }

        async fn list_objects(&self, _: &str, _: &str, _: i32) -> Result<Vec<ObjectEntry>> {
            Ok(Vec::new())
        }

        async fn list_all_objects(&self, _: &str, _: &str, _: i32) -> Result<Vec<ObjectEntry>> {
            Ok(Vec::new())
        }

        async fn fetch_object(&self, _: &str, key: &str) -> Result<ObjectBody> {
            let body = self
                .0
                .get(key)
                .cloned()
                .ok_or_else(|| Error::Backend(format!("NoSuchKey: {key}")))?;
            Ok(Box::pin(std::io::Cursor::new(body)))
        }

        async fn stat_object(&self, _: &str, key: &str) -> Result<ObjectEntry> {
            Ok(ObjectEntry::file(key, 0))
        }
    }

    fn gateway() -> Objects {
        let mut objects = HashMap::new();
        objects.insert("notes.txt", b"line one\nline two\n".to_vec());
        objects.insert("data.json", br#"{"name":"cat","tags":["a"]}"#.to_vec());
        objects.insert("broken.json", b"{not json".to_vec());
        objects.insert("image.png", vec![0x89, b'P', b'N', b'G', 0xff, 0xfe]);
        objects.insert("accent.txt", "aaé".as_bytes().to_vec());
        Objects(objects)
    }

    #[tokio::test]
    async fn test_text_is_returned_whole_under_the_limit() {
        let preview = load_preview(&gateway(), "b", "notes.txt", PREVIEW_LIMIT)
            .await
            .unwrap();
        assert_eq!(preview.text, "line one\nline two\n");
        assert_eq!(preview.bytes, 18);
        assert!(!preview.truncated);
    }

    #[tokio::test]
    async fn test_long_object_is_cut_at_the_limit() {
        let preview = load_preview(&gateway(), "b", "notes.txt", 4).await.unwrap();
        assert_eq!(preview.text, "line");
        assert!(preview.truncated);
    }

    #[tokio::test]
    async fn test_character_split_by_the_limit_is_dropped() {
        // "é" is two bytes; the limit keeps only its first one.
        let preview = load_preview(&gateway(), "b", "accent.txt", 3).await.unwrap();
        assert_eq!(preview.text, "aa");
        assert!(preview.truncated);
    }

    #[tokio::test]
    async fn test_binary_content_is_rejected() {
        let err = load_preview(&gateway(), "b", "image.png", PREVIEW_LIMIT)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Preview(_)));
    }

    #[tokio::test]
    async fn test_json_is_pretty_printed() {
        let preview = load_preview(&gateway(), "b", "data.json", PREVIEW_LIMIT)
            .await
            .unwrap();
        assert!(preview.text.starts_with("{\n"));
        assert!(preview.text.contains("  \"name\": \"cat\""));

        let raw = load_preview(&gateway(), "b", "broken.json", PREVIEW_LIMIT)
            .await
            .unwrap();
        assert_eq!(raw.text, "{not json");
    }
}
