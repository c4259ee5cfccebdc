use crossterm::event::KeyEvent;

use super::screens::{ScreenEvent, ScreenModel};
use super::{App, Effect, LoadKind, LoadRequest, LoadScope, ScreenState, Session, Ticket};
use crate::error::Result;
use crate::handlers::GlobalAction;
use crate::message::{LoadOutcome, Message};
use crate::models::domain::parent_prefix;
use crate::models::{Bucket, DownloadReport, ObjectEntry, ObjectPreview, Profile};
use crate::operations::preview::PREVIEW_LIMIT;
use crate::operations::s3::DEFAULT_MAX_KEYS;
use crate::ui::helpers::format_size;

/// Central update function following The Elm Architecture (TEA).
/// Applies one message and returns the side effects the host must carry out.
pub fn update(app: &mut App, msg: Message) -> Vec<Effect> {
    match msg {
        Message::Key(key) => app.handle_key(&key),
        Message::Resize { width, height } => {
            app.profiles.resize(width, height);
            app.buckets.resize(width, height);
            app.objects.resize(width, height);
            Vec::new()
        }
        Message::Tick => {
            if app.pending.any() {
                app.spinner_frame = app.spinner_frame.wrapping_add(1);
            }
            Vec::new()
        }
        Message::Loaded { ticket, outcome } => {
            app.apply_outcome(ticket, outcome);
            Vec::new()
        }
    }
}

impl App {
    fn handle_key(&mut self, key: &KeyEvent) -> Vec<Effect> {
        if let Some(action) = self.keymap.global_action(key, self.is_capturing_text()) {
            return match action {
                GlobalAction::Quit => vec![Effect::Quit],
                GlobalAction::ToggleHelp => {
                    self.help_visible = !self.help_visible;
                    Vec::new()
                }
                GlobalAction::Back => self.back(),
                GlobalAction::Refresh => self.refresh(),
            };
        }

        // Any other key dismisses the help overlay.
        if self.help_visible {
            self.help_visible = false;
            return Vec::new();
        }

        let event = match self.state {
            ScreenState::Profile => self.profiles.handle_key(key),
            ScreenState::Bucket => self.buckets.handle_key(key),
            ScreenState::Object => self.objects.handle_key(key),
        };
        event.map(|e| self.on_screen_event(e)).unwrap_or_default()
    }

    fn on_screen_event(&mut self, event: ScreenEvent) -> Vec<Effect> {
        match event {
            ScreenEvent::ProfileChosen(profile) => self.choose_profile(profile),
            ScreenEvent::BucketChosen(bucket) => self.open_location(bucket.name, String::new()),
            ScreenEvent::PrefixChosen(prefix) => {
                let bucket = self.objects.bucket().to_string();
                self.open_location(bucket, prefix)
            }
            ScreenEvent::ParentPrefix => {
                let bucket = self.objects.bucket().to_string();
                let parent = parent_prefix(self.objects.prefix());
                self.open_location(bucket, parent)
            }
            ScreenEvent::ObjectInfo(key) => {
                let mut effects = self.cancel_preview();
                let bucket = self.objects.bucket().to_string();
                effects.extend(self.issue(LoadKind::Stat { bucket, key }));
                effects
            }
            ScreenEvent::Preview(key) => self.toggle_preview(key),
            ScreenEvent::Download(key) => self.start_download(key, false),
            ScreenEvent::DownloadFolder(prefix) => self.start_download(prefix, true),
            ScreenEvent::CancelDownload => {
                let effects = self.cancel_download();
                if effects.is_empty() {
                    self.status.info("No download in progress");
                } else {
                    self.status.info("Download cancelled");
                }
                effects
            }
        }
    }

    /// Replaces the session. The old one is torn down before the new one is
    /// built, so no load issued under it can be applied afterwards.
    pub(super) fn choose_profile(&mut self, profile: Profile) -> Vec<Effect> {
        let mut effects = self.cancel_download();
        effects.extend(self.cancel_preview());
        if let Some(old) = self.session.take() {
            tracing::info!(profile = %old.profile.name, "closing session");
        }
        self.pending = Default::default();
        self.buckets.reset(String::new());
        self.objects.open(String::new(), String::new());
        self.objects.set_loading(false);

        let region = self.preferences.region.clone();
        let gateway = match self.factory.connect(&profile, &region) {
            Ok(gateway) => gateway,
            Err(e) => {
                tracing::warn!(profile = %profile.name, error = %e, "cannot create session");
                self.status.error(e.to_string());
                return effects;
            }
        };

        self.sessions_created += 1;
        self.session = Some(Session {
            id: self.sessions_created,
            profile: profile.clone(),
            region: region.clone(),
            gateway,
        });
        self.state = ScreenState::Bucket;
        self.buckets.reset(format!("{} ({region})", profile.name));
        self.status
            .info(format!("Connected with profile '{}'", profile.name));

        effects.extend(self.issue(LoadKind::Buckets));
        self.buckets.set_loading(true);
        self.preferences.profile = profile.name;
        effects.push(Effect::SavePreferences(self.preferences.clone()));
        effects
    }

    fn open_location(&mut self, bucket: String, prefix: String) -> Vec<Effect> {
        self.state = ScreenState::Object;
        self.pending.stat = None;
        let mut effects = self.cancel_preview();
        self.objects.open(bucket.clone(), prefix.clone());
        let load = self.issue(LoadKind::Objects {
            bucket,
            prefix,
            max_keys: DEFAULT_MAX_KEYS,
        });
        if load.is_none() {
            self.objects.set_loading(false);
        }
        effects.extend(load);
        effects
    }

    /// Object -> Bucket. Listings, stats and previews for the Object screen
    /// become stale, and running reads are cancelled. No-op elsewhere.
    fn back(&mut self) -> Vec<Effect> {
        if self.state != ScreenState::Object {
            return Vec::new();
        }
        self.state = ScreenState::Bucket;
        self.pending.objects = None;
        self.pending.stat = None;
        self.objects.set_loading(false);
        let mut effects = self.cancel_download();
        if !effects.is_empty() {
            self.status.info("Download cancelled");
        }
        effects.extend(self.cancel_preview());
        effects
    }

    fn refresh(&mut self) -> Vec<Effect> {
        match self.state {
            ScreenState::Profile => Vec::new(),
            ScreenState::Bucket => {
                let load = self.issue(LoadKind::Buckets);
                if load.is_some() {
                    self.buckets.set_loading(true);
                }
                load.into_iter().collect()
            }
            ScreenState::Object => {
                let bucket = self.objects.bucket().to_string();
                let prefix = self.objects.prefix().to_string();
                let load = self.issue(LoadKind::Objects {
                    bucket,
                    prefix,
                    max_keys: DEFAULT_MAX_KEYS,
                });
                if load.is_some() {
                    self.objects.set_loading(true);
                }
                load.into_iter().collect()
            }
        }
    }

    /// `p` on the previewed file closes the pane; on any other file it
    /// loads that file's preview.
    fn toggle_preview(&mut self, key: String) -> Vec<Effect> {
        if self.objects.preview_key() == Some(key.as_str()) {
            self.objects.set_preview(None);
            return self.cancel_preview();
        }
        self.pending.stat = None;
        let bucket = self.objects.bucket().to_string();
        let load = self.issue(LoadKind::Preview {
            bucket,
            key: key.clone(),
            limit: PREVIEW_LIMIT,
        });
        if load.is_some() {
            self.status.info(format!("Loading preview of {key}..."));
        }
        load.into_iter().collect()
    }

    /// `key` is an object key, or a prefix when `folder` is set.
    fn start_download(&mut self, key: String, folder: bool) -> Vec<Effect> {
        if self.pending.download.is_some() {
            self.status.error("A download is already in progress");
            return Vec::new();
        }
        let name = ObjectEntry::file(key.as_str(), 0).base_name().to_string();
        if name.is_empty() || name == "." || name == ".." {
            self.status
                .error(format!("Cannot save '{key}' under a local name"));
            return Vec::new();
        }
        let destination = self.preferences.download_dir().join(name);
        let bucket = self.objects.bucket().to_string();
        let kind = if folder {
            LoadKind::DownloadFolder {
                bucket,
                prefix: key.clone(),
                destination,
            }
        } else {
            LoadKind::Download {
                bucket,
                key: key.clone(),
                destination,
            }
        };
        let load = self.issue(kind);
        if load.is_some() {
            self.status.info(format!("Downloading {key}..."));
        }
        load.into_iter().collect()
    }

    fn cancel_download(&mut self) -> Vec<Effect> {
        match self.pending.download.take() {
            Some(_) => vec![Effect::CancelDownload],
            None => Vec::new(),
        }
    }

    fn cancel_preview(&mut self) -> Vec<Effect> {
        match self.pending.preview.take() {
            Some(_) => vec![Effect::CancelPreview],
            None => Vec::new(),
        }
    }

    /// Tags a load with a fresh generation and records it as the one awaited
    /// for its kind. `None` without a session.
    fn issue(&mut self, kind: LoadKind) -> Option<Effect> {
        let session = self.session.clone()?;
        self.generation += 1;
        let generation = self.generation;

        let scope = match &kind {
            LoadKind::Buckets => {
                self.pending.buckets = Some(generation);
                LoadScope::Buckets
            }
            LoadKind::Objects { bucket, prefix, .. } => {
                self.pending.objects = Some(generation);
                LoadScope::Objects {
                    bucket: bucket.clone(),
                    prefix: prefix.clone(),
                }
            }
            LoadKind::Stat { bucket, key } => {
                self.pending.stat = Some(generation);
                LoadScope::Object {
                    bucket: bucket.clone(),
                    key: key.clone(),
                }
            }
            LoadKind::Preview { bucket, key, .. } => {
                self.pending.preview = Some(generation);
                LoadScope::Object {
                    bucket: bucket.clone(),
                    key: key.clone(),
                }
            }
            LoadKind::Download { bucket, key, .. } => {
                self.pending.download = Some(generation);
                LoadScope::Object {
                    bucket: bucket.clone(),
                    key: key.clone(),
                }
            }
            LoadKind::DownloadFolder { bucket, prefix, .. } => {
                self.pending.download = Some(generation);
                LoadScope::Objects {
                    bucket: bucket.clone(),
                    prefix: prefix.clone(),
                }
            }
        };

        tracing::debug!(generation, session = session.id, ?scope, "issuing load");
        Some(Effect::Load(LoadRequest {
            ticket: Ticket {
                generation,
                session_id: session.id,
                scope,
            },
            session,
            kind,
        }))
    }

    fn apply_outcome(&mut self, ticket: Ticket, outcome: LoadOutcome) {
        let live_session = self.session.as_ref().map(|s| s.id);
        if live_session != Some(ticket.session_id) {
            tracing::debug!(?ticket, "discarding completion from a closed session");
            return;
        }

        let applied = match outcome {
            LoadOutcome::Buckets(result) => self.apply_buckets(&ticket, result),
            LoadOutcome::Objects(result) => self.apply_objects(&ticket, result),
            LoadOutcome::Stat(result) => self.apply_stat(&ticket, result),
            LoadOutcome::Preview(result) => self.apply_preview(&ticket, result),
            LoadOutcome::Download(result) => self.apply_download(&ticket, result),
        };
        if !applied {
            tracing::debug!(?ticket, "discarding stale completion");
        }
    }

    fn apply_buckets(&mut self, ticket: &Ticket, result: Result<Vec<Bucket>>) -> bool {
        if !take_if_current(&mut self.pending.buckets, ticket.generation) {
            return false;
        }
        self.buckets.set_loading(false);
        match result {
            Ok(buckets) => {
                self.status.info(format!("Loaded {} buckets", buckets.len()));
                self.buckets.set_items(buckets);
            }
            Err(e) => self.status.error(e.to_string()),
        }
        true
    }

    fn apply_objects(
        &mut self,
        ticket: &Ticket,
        result: Result<Vec<ObjectEntry>>,
    ) -> bool {
        let LoadScope::Objects { bucket, prefix } = &ticket.scope else {
            return false;
        };
        if self.state != ScreenState::Object || !self.objects.is_at(bucket, prefix) {
            return false;
        }
        if !take_if_current(&mut self.pending.objects, ticket.generation) {
            return false;
        }
        self.objects.set_loading(false);
        match result {
            Ok(entries) => {
                self.status.info(format!("Loaded {} objects", entries.len()));
                self.objects.set_items(entries);
            }
            Err(e) => self.status.error(e.to_string()),
        }
        true
    }

    fn apply_stat(&mut self, ticket: &Ticket, result: Result<ObjectEntry>) -> bool {
        let LoadScope::Object { bucket, .. } = &ticket.scope else {
            return false;
        };
        if self.state != ScreenState::Object || self.objects.bucket() != bucket {
            return false;
        }
        if !take_if_current(&mut self.pending.stat, ticket.generation) {
            return false;
        }
        match result {
            Ok(entry) => self.objects.set_details(Some(entry)),
            Err(e) => {
                self.objects.set_details(None);
                self.status.error(e.to_string());
            }
        }
        true
    }

    fn apply_preview(&mut self, ticket: &Ticket, result: Result<ObjectPreview>) -> bool {
        let LoadScope::Object { bucket, .. } = &ticket.scope else {
            return false;
        };
        if self.state != ScreenState::Object || self.objects.bucket() != bucket {
            return false;
        }
        if !take_if_current(&mut self.pending.preview, ticket.generation) {
            return false;
        }
        match result {
            Ok(preview) => {
                if preview.truncated {
                    self.status.info(format!(
                        "Showing the first {} of {}",
                        format_size(preview.bytes),
                        preview.key
                    ));
                } else {
                    self.status.info(format!("Previewing {}", preview.key));
                }
                self.objects.set_preview(Some(preview));
            }
            Err(e) => {
                self.objects.set_preview(None);
                self.status.error(e.to_string());
            }
        }
        true
    }

    fn apply_download(&mut self, ticket: &Ticket, result: Result<DownloadReport>) -> bool {
        if !take_if_current(&mut self.pending.download, ticket.generation) {
            return false;
        }
        match result {
            Ok(report) => {
                tracing::info!(key = %report.key, path = %report.path.display(), files = report.files, "download finished");
                let text = match ticket.scope {
                    LoadScope::Objects { .. } => format!(
                        "Downloaded {} files from {} to {} ({})",
                        report.files,
                        report.key,
                        report.path.display(),
                        format_size(report.bytes)
                    ),
                    _ => format!(
                        "Downloaded {} to {} ({})",
                        report.key,
                        report.path.display(),
                        format_size(report.bytes)
                    ),
                };
                self.status.info(text);
            }
            Err(e) => self.status.error(e.to_string()),
        }
        true
    }
}

/// Clears `slot` when it holds `generation`.
fn take_if_current(slot: &mut Option<u64>, generation: u64) -> bool {
    if *slot == Some(generation) {
        *slot = None;
        true
    } else {
        false
    }
}
