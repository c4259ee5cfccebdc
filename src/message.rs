use crossterm::event::KeyEvent;

use crate::app::Ticket;
use crate::error::Result;
use crate::models::{Bucket, DownloadReport, ObjectEntry, ObjectPreview};

/// Everything the orchestrator reacts to, following The Elm Architecture (TEA):
/// terminal input from the host loop and completions from background loads.
#[derive(Debug)]
pub enum Message {
    // ===== Terminal Input =====
    Key(KeyEvent),
    Resize { width: u16, height: u16 },
    Tick,

    // ===== Async Operation Results =====
    Loaded { ticket: Ticket, outcome: LoadOutcome },
}

#[derive(Debug)]
pub enum LoadOutcome {
    Buckets(Result<Vec<Bucket>>),
    Objects(Result<Vec<ObjectEntry>>),
    Stat(Result<ObjectEntry>),
    Preview(Result<ObjectPreview>),
    /// A single object or a whole folder.
    Download(Result<DownloadReport>),
}
