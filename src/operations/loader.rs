use tokio::sync::{mpsc, oneshot};

use crate::app::{LoadKind, LoadRequest};
use crate::message::{LoadOutcome, Message};
use crate::operations::preview::load_preview;
use crate::operations::transfer::{download_folder, download_object};

/// Runs [`LoadRequest`]s on the tokio runtime and posts each outcome back to
/// the event loop as [`Message::Loaded`].
///
/// Downloads and previews each hold a oneshot cancel handle. Starting a new
/// one of the same kind cancels the previous.
pub struct Loader {
    tx: mpsc::UnboundedSender<Message>,
    download_cancel: Option<oneshot::Sender<()>>,
    preview_cancel: Option<oneshot::Sender<()>>,
}

impl Loader {
    pub fn new(tx: mpsc::UnboundedSender<Message>) -> Self {
        Self {
            tx,
            download_cancel: None,
            preview_cancel: None,
        }
    }

    pub fn spawn(&mut self, request: LoadRequest) {
        let LoadRequest {
            ticket,
            session,
            kind,
        } = request;
        let gateway = session.gateway;
        let generation = ticket.generation;
        let tx = self.tx.clone();

        match kind {
            LoadKind::Buckets => {
                tokio::spawn(async move {
                    let outcome = LoadOutcome::Buckets(gateway.list_buckets().await);
                    let _ = tx.send(Message::Loaded { ticket, outcome });
                });
            }
            LoadKind::Objects {
                bucket,
                prefix,
                max_keys,
            } => {
                tokio::spawn(async move {
                    let result = gateway.list_objects(&bucket, &prefix, max_keys).await;
                    let outcome = LoadOutcome::Objects(result);
                    let _ = tx.send(Message::Loaded { ticket, outcome });
                });
            }
            LoadKind::Stat { bucket, key } => {
                tokio::spawn(async move {
                    let outcome = LoadOutcome::Stat(gateway.stat_object(&bucket, &key).await);
                    let _ = tx.send(Message::Loaded { ticket, outcome });
                });
            }
            LoadKind::Preview { bucket, key, limit } => {
                let cancel_rx = arm(&mut self.preview_cancel);
                tokio::spawn(async move {
                    tokio::select! {
                        result = load_preview(gateway.as_ref(), &bucket, &key, limit) => {
                            let outcome = LoadOutcome::Preview(result);
                            let _ = tx.send(Message::Loaded { ticket, outcome });
                        }
                        _ = cancel_rx => tracing::debug!(%key, "preview cancelled"),
                    }
                });
            }
            LoadKind::Download {
                bucket,
                key,
                destination,
            } => {
                let cancel_rx = arm(&mut self.download_cancel);
                tokio::spawn(async move {
                    tokio::select! {
                        result = download_object(gateway.as_ref(), &bucket, &key, &destination, generation) => {
                            let outcome = LoadOutcome::Download(result);
                            let _ = tx.send(Message::Loaded { ticket, outcome });
                        }
                        _ = cancel_rx => tracing::debug!(%key, "download cancelled"),
                    }
                });
            }
            LoadKind::DownloadFolder {
                bucket,
                prefix,
                destination,
            } => {
                let cancel_rx = arm(&mut self.download_cancel);
                tokio::spawn(async move {
                    tokio::select! {
                        result = download_folder(gateway.as_ref(), &bucket, &prefix, &destination, generation) => {
                            let outcome = LoadOutcome::Download(result);
                            let _ = tx.send(Message::Loaded { ticket, outcome });
                        }
                        _ = cancel_rx => tracing::debug!(%prefix, "folder download cancelled"),
                    }
                });
            }
        }
    }

    /// Stops the running download, if any. No completion is posted for it.
    pub fn cancel_download(&mut self) {
        cancel(&mut self.download_cancel);
    }

    /// Stops the running preview read, if any.
    pub fn cancel_preview(&mut self) {
        cancel(&mut self.preview_cancel);
    }
}

/// Cancels whatever `slot` guards and installs a fresh handle.
fn arm(slot: &mut Option<oneshot::Sender<()>>) -> oneshot::Receiver<()> {
    cancel(slot);
    let (cancel_tx, cancel_rx) = oneshot::channel();
    *slot = Some(cancel_tx);
    cancel_rx
}

fn cancel(slot: &mut Option<oneshot::Sender<()>>) {
    if let Some(cancel) = slot.take() {
        let _ = cancel.send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{LoadScope, Session, Ticket};
    use crate::error::{Error, Result};
    use crate::models::{Bucket, DownloadReport, ObjectEntry, Profile};
    use crate::operations::s3::{ObjectBody, StorageGateway};
    use async_trait::async_trait;
    use std::path::Path;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::task::{Context, Poll};
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::io::{AsyncRead, ReadBuf};

    /// A body whose first byte never arrives.
    struct Stalled;

    impl AsyncRead for Stalled {
        fn poll_read(
            self: Pin<&mut Self>,
            _: &mut Context<'_>,
            _: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            Poll::Pending
        }
    }

    struct FakeGateway;

    #[async_trait]
    impl StorageGateway for FakeGateway {
        async fn list_buckets(&self) -> Result<Vec<Bucket>> {
            Ok(vec![Bucket::new("a"), Bucket::new("b")])
        }

        async fn list_objects(&self, _: &str, _: &str, _: i32) -> Result<Vec<ObjectEntry>> {
            Err(Error::Backend("AccessDenied".into()))
        }

        async fn list_all_objects(
            &self,
            _: &str,
            prefix: &str,
            _: i32,
        ) -> Result<Vec<ObjectEntry>> {
            Ok(vec![
                ObjectEntry::file(format!("{prefix}a.txt"), 11),
                ObjectEntry::file(format!("{prefix}deep/b.txt"), 11),
                ObjectEntry::file(format!("{prefix}../escape.txt"), 11),
            ])
        }

        async fn fetch_object(&self, _: &str, key: &str) -> Result<ObjectBody> {
            if key.ends_with("slow.bin") {
                Ok(Box::pin(tokio::io::repeat(7)))
            } else if key == "stalled.txt" {
                Ok(Box::pin(Stalled))
            } else {
                Ok(Box::pin(std::io::Cursor::new(b"hello world".to_vec())))
            }
        }

        async fn stat_object(&self, _: &str, key: &str) -> Result<ObjectEntry> {
            Err(Error::InvalidMetadata(key.to_string()))
        }
    }

    fn request(generation: u64, kind: LoadKind) -> LoadRequest {
        LoadRequest {
            ticket: Ticket {
                generation,
                session_id: 1,
                scope: LoadScope::Buckets,
            },
            session: Session {
                id: 1,
                profile: Profile::new("default"),
                region: "us-east-1".into(),
                gateway: Arc::new(FakeGateway),
            },
            kind,
        }
    }

    fn download(key: &str, destination: &Path) -> LoadKind {
        LoadKind::Download {
            bucket: "a".into(),
            key: key.into(),
            destination: destination.to_path_buf(),
        }
    }

    async fn next_download(rx: &mut mpsc::UnboundedReceiver<Message>) -> (u64, DownloadReport) {
        match rx.recv().await {
            Some(Message::Loaded {
                ticket,
                outcome: LoadOutcome::Download(Ok(report)),
            }) => (ticket.generation, report),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_bucket_listing_is_posted_back() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut loader = Loader::new(tx);
        loader.spawn(request(1, LoadKind::Buckets));

        match rx.recv().await {
            Some(Message::Loaded {
                ticket,
                outcome: LoadOutcome::Buckets(Ok(buckets)),
            }) => {
                assert_eq!(ticket.generation, 1);
                assert_eq!(buckets.len(), 2);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_backend_errors_are_posted_back() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut loader = Loader::new(tx);
        loader.spawn(request(
            1,
            LoadKind::Objects {
                bucket: "a".into(),
                prefix: String::new(),
                max_keys: 10,
            },
        ));

        assert!(matches!(
            rx.recv().await,
            Some(Message::Loaded {
                outcome: LoadOutcome::Objects(Err(Error::Backend(_))),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_download_writes_file() {
        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("nested").join("hello.txt");
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut loader = Loader::new(tx);
        loader.spawn(request(1, download("docs/hello.txt", &destination)));

        let (_, report) = next_download(&mut rx).await;
        assert_eq!(report.bytes, 11);
        assert_eq!(report.files, 1);
        assert_eq!(report.path, destination);
        assert_eq!(std::fs::read(&destination).unwrap(), b"hello world");
        assert_eq!(file_names(&dir.path().join("nested")), vec!["hello.txt"]);
    }

    #[tokio::test]
    async fn test_download_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("x.txt");
        std::fs::write(&destination, b"from a/x.txt").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut loader = Loader::new(tx);
        loader.spawn(request(1, download("b/x.txt", &destination)));

        let (_, report) = next_download(&mut rx).await;
        assert_eq!(report.path, dir.path().join("x (1).txt"));
        assert_eq!(std::fs::read(&destination).unwrap(), b"from a/x.txt");
        assert_eq!(std::fs::read(&report.path).unwrap(), b"hello world");
    }

    #[tokio::test]
    async fn test_cancelled_download_posts_nothing_and_cleans_up() {
        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("slow.bin");
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut loader = Loader::new(tx);
        loader.spawn(request(1, download("slow.bin", &destination)));

        tokio::time::sleep(Duration::from_millis(50)).await;
        loader.cancel_download();
        drop(loader);

        assert!(rx.recv().await.is_none());
        assert!(file_names(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_download_leaves_newer_download_alone() {
        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("report.txt");
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut loader = Loader::new(tx);

        loader.spawn(request(1, download("old/slow.bin", &destination)));
        tokio::time::sleep(Duration::from_millis(20)).await;
        // Starting the next download cancels the running one.
        loader.spawn(request(2, download("new/report.txt", &destination)));

        let (generation, report) = next_download(&mut rx).await;
        assert_eq!(generation, 2);
        assert_eq!(report.path, destination);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(std::fs::read(&destination).unwrap(), b"hello world");
        assert_eq!(file_names(dir.path()), vec!["report.txt"]);
    }

    #[tokio::test]
    async fn test_folder_download_keeps_layout() {
        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("2024");
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut loader = Loader::new(tx);
        loader.spawn(request(
            1,
            LoadKind::DownloadFolder {
                bucket: "a".into(),
                prefix: "photos/2024/".into(),
                destination: destination.clone(),
            },
        ));

        let (_, report) = next_download(&mut rx).await;
        assert_eq!(report.key, "photos/2024/");
        assert_eq!(report.files, 2);
        assert_eq!(report.bytes, 22);
        assert_eq!(report.path, destination);
        assert_eq!(std::fs::read(destination.join("a.txt")).unwrap(), b"hello world");
        assert_eq!(
            std::fs::read(destination.join("deep").join("b.txt")).unwrap(),
            b"hello world"
        );
        assert_eq!(file_names(dir.path()), vec!["2024"]);
    }

    #[tokio::test]
    async fn test_preview_is_posted_back() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut loader = Loader::new(tx);
        loader.spawn(request(
            3,
            LoadKind::Preview {
                bucket: "a".into(),
                key: "notes.txt".into(),
                limit: 5,
            },
        ));

        match rx.recv().await {
            Some(Message::Loaded {
                ticket,
                outcome: LoadOutcome::Preview(Ok(preview)),
            }) => {
                assert_eq!(ticket.generation, 3);
                assert_eq!(preview.text, "hello");
                assert!(preview.truncated);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cancelled_preview_posts_nothing() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut loader = Loader::new(tx);
        loader.spawn(request(
            1,
            LoadKind::Preview {
                bucket: "a".into(),
                key: "stalled.txt".into(),
                limit: 1024,
            },
        ));

        tokio::time::sleep(Duration::from_millis(20)).await;
        loader.cancel_preview();
        drop(loader);

        assert!(rx.recv().await.is_none());
    }
}
