//! The three navigational pages. Each owns a [`ListModel`] and turns key
//! presses into list movement or into a [`ScreenEvent`] for the orchestrator.

mod bucket;
mod object;
mod profile;

pub use bucket::BucketScreen;
pub use object::ObjectScreen;
pub use profile::ProfileScreen;

use crossterm::event::KeyEvent;
use ratatui::style::Style;

use crate::handlers::key_to_list_action;
use crate::models::{Bucket, ListAction, ListEntry, ListModel, Profile};

/// Rows taken by the header, hint line, status bar and list borders.
const CHROME_HEIGHT: u16 = 7;

/// Domain events raised by a screen.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenEvent {
    ProfileChosen(Profile),
    BucketChosen(Bucket),
    PrefixChosen(String),
    ParentPrefix,
    ObjectInfo(String),
    Preview(String),
    Download(String),
    DownloadFolder(String),
    CancelDownload,
}

/// Shared contract of the Profile, Bucket and Object screens.
pub trait ScreenModel {
    type Item;

    /// Replaces the item set wholesale and resets the selection.
    fn set_items(&mut self, items: Vec<Self::Item>);

    /// No-op on an empty list except for filter editing.
    fn handle_key(&mut self, key: &KeyEvent) -> Option<ScreenEvent>;

    fn resize(&mut self, width: u16, height: u16);

    fn view(&self) -> ScreenView;

    /// True while the filter prompt is open.
    fn is_capturing_text(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub label: String,
    pub detail: String,
    pub style: Style,
}

/// Render-ready snapshot of a screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenView {
    pub title: String,
    pub hint: &'static str,
    pub rows: Vec<RowView>,
    /// Highlighted row, relative to `rows`.
    pub selected: Option<usize>,
    /// `(selected + 1, visible count)`.
    pub position: Option<(usize, usize)>,
    pub filter: String,
    pub filtering: bool,
    pub loading: bool,
    pub empty_text: &'static str,
    pub details: Option<Vec<(String, String)>>,
    pub preview: Option<PreviewView>,
    /// Rows below the list taken by the details or preview pane, borders
    /// included.
    pub pane_height: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewView {
    pub title: String,
    pub lines: Vec<String>,
}

impl ScreenView {
    pub fn labels(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.label.as_str()).collect()
    }
}

/// Routes a key to the list. Returns the highlighted item only when the key
/// confirmed it.
fn list_key<'a, T: ListEntry>(list: &'a mut ListModel<T>, key: &KeyEvent) -> Option<&'a T> {
    let action = key_to_list_action(key, list.is_filtering())?;
    let confirmed = list.apply(action);
    if action == ListAction::Confirm {
        confirmed
    } else {
        None
    }
}

/// Rows left for list entries in a terminal of `height` rows.
fn list_height(height: u16) -> usize {
    usize::from(height.saturating_sub(CHROME_HEIGHT)).max(1)
}

/// The scroll window of `list` as rows, plus the window-relative selection.
fn window_rows<T: ListEntry>(
    list: &ListModel<T>,
    row: impl Fn(&T) -> RowView,
) -> (Vec<RowView>, Option<usize>) {
    let rows = list.window().map(|(_, item)| row(item)).collect();
    let selected = list
        .selected_index()
        .map(|i| i.saturating_sub(list.scroll_offset()));
    (rows, selected)
}

fn position<T: ListEntry>(list: &ListModel<T>) -> Option<(usize, usize)> {
    list.selected_index().map(|i| (i + 1, list.len()))
}
