use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::models::{Preferences, Profile};
use crate::operations::s3::StorageGateway;

/// The navigational page currently shown. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenState {
    Profile,
    Bucket,
    Object,
}

/// Live `(profile, region, client)` triple. Replaced, never mutated, when a
/// new profile is selected.
#[derive(Clone)]
pub struct Session {
    pub id: u64,
    pub profile: Profile,
    pub region: String,
    pub gateway: Arc<dyn StorageGateway>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("profile", &self.profile.name)
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

/// What a load was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadScope {
    Buckets,
    Objects { bucket: String, prefix: String },
    Object { bucket: String, key: String },
}

/// Tag carried by a load request and echoed back by its completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub generation: u64,
    pub session_id: u64,
    pub scope: LoadScope,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadKind {
    Buckets,
    Objects {
        bucket: String,
        prefix: String,
        max_keys: i32,
    },
    Stat {
        bucket: String,
        key: String,
    },
    Preview {
        bucket: String,
        key: String,
        limit: u64,
    },
    Download {
        bucket: String,
        key: String,
        destination: PathBuf,
    },
    /// Every object below `prefix`, into the local folder `destination`.
    DownloadFolder {
        bucket: String,
        prefix: String,
        destination: PathBuf,
    },
}

#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub ticket: Ticket,
    pub session: Session,
    pub kind: LoadKind,
}

/// Side effects requested by [`App::handle_input`](super::App::handle_input)
/// for the host loop to carry out.
#[derive(Debug)]
pub enum Effect {
    Quit,
    Load(LoadRequest),
    CancelDownload,
    CancelPreview,
    SavePreferences(Preferences),
}
