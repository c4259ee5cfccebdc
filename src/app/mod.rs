pub mod screens;
mod state;
mod update;

pub use state::*;
pub use update::update;

use crate::handlers::KeyMap;
use crate::message::Message;
use crate::models::{Preferences, Profile, StatusMessage, StatusReporter};
use crate::operations::s3::SessionFactory;
use crate::ui::Theme;
use screens::{BucketScreen, ObjectScreen, ProfileScreen, ScreenModel, ScreenView};

const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

/// Generation of the outstanding request per load kind. `None` means nothing
/// is awaited and any completion of that kind is stale.
#[derive(Debug, Default, Clone, Copy)]
struct Pending {
    buckets: Option<u64>,
    objects: Option<u64>,
    stat: Option<u64>,
    preview: Option<u64>,
    download: Option<u64>,
}

impl Pending {
    fn any(&self) -> bool {
        self.buckets.is_some()
            || self.objects.is_some()
            || self.stat.is_some()
            || self.preview.is_some()
            || self.download.is_some()
    }
}

/// Everything the draw step needs for one frame.
#[derive(Debug, Clone)]
pub struct FrameView {
    pub screen: ScreenState,
    pub view: ScreenView,
    pub status: Option<StatusMessage>,
    /// `profile (region)` of the live session.
    pub session: Option<String>,
    pub spinner: Option<char>,
    pub help: Option<Vec<(String, &'static str)>>,
    pub theme: Theme,
}

/// Owns the active screen, the session and every outstanding load.
///
/// All mutation happens in [`App::handle_input`], one message at a time.
/// Background work is requested through the returned [`Effect`]s and comes
/// back as [`Message::Loaded`].
pub struct App {
    state: ScreenState,
    profiles: ProfileScreen,
    buckets: BucketScreen,
    objects: ObjectScreen,
    session: Option<Session>,
    sessions_created: u64,
    generation: u64,
    pending: Pending,
    status: StatusReporter,
    help_visible: bool,
    spinner_frame: usize,
    keymap: KeyMap,
    theme: Theme,
    factory: Box<dyn SessionFactory>,
    preferences: Preferences,
}

impl App {
    pub fn new(
        profiles: Vec<Profile>,
        preferences: Preferences,
        factory: Box<dyn SessionFactory>,
        keymap: KeyMap,
        theme: Theme,
    ) -> Self {
        let mut profile_screen = ProfileScreen::new(profiles, theme);
        profile_screen.highlight(&preferences.profile);

        Self {
            state: ScreenState::Profile,
            profiles: profile_screen,
            buckets: BucketScreen::new(theme),
            objects: ObjectScreen::new(theme),
            session: None,
            sessions_created: 0,
            generation: 0,
            pending: Pending::default(),
            status: StatusReporter::new(),
            help_visible: false,
            spinner_frame: 0,
            keymap,
            theme,
            factory,
            preferences,
        }
    }

    /// Processes one message to completion. Never blocks.
    pub fn handle_input(&mut self, message: Message) -> Vec<Effect> {
        update(self, message)
    }

    pub fn current_screen(&self) -> ScreenState {
        self.state
    }

    /// Selects a profile as if it had been confirmed on the Profile screen.
    pub fn select_profile(&mut self, name: &str) -> Vec<Effect> {
        self.profiles.highlight(name);
        self.choose_profile(Profile::new(name))
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.current()
    }

    pub fn is_help_visible(&self) -> bool {
        self.help_visible
    }

    pub fn is_loading(&self) -> bool {
        self.pending.any()
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn profile_screen(&self) -> &ProfileScreen {
        &self.profiles
    }

    pub fn bucket_screen(&self) -> &BucketScreen {
        &self.buckets
    }

    pub fn object_screen(&self) -> &ObjectScreen {
        &self.objects
    }

    /// Snapshot of the active screen plus the status bar. Pure.
    pub fn render(&self) -> FrameView {
        let view = match self.state {
            ScreenState::Profile => self.profiles.view(),
            ScreenState::Bucket => self.buckets.view(),
            ScreenState::Object => self.objects.view(),
        };

        FrameView {
            screen: self.state,
            view,
            status: self.status.current().cloned(),
            session: self
                .session
                .as_ref()
                .map(|s| format!("{} ({})", s.profile.name, s.region)),
            spinner: self
                .is_loading()
                .then(|| SPINNER[self.spinner_frame % SPINNER.len()]),
            help: self.help_visible.then(|| self.keymap.help_rows()),
            theme: self.theme,
        }
    }

    fn is_capturing_text(&self) -> bool {
        match self.state {
            ScreenState::Profile => self.profiles.is_capturing_text(),
            ScreenState::Bucket => self.buckets.is_capturing_text(),
            ScreenState::Object => self.objects.is_capturing_text(),
        }
    }
}
