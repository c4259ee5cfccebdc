use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{
    list_height, list_key, position, window_rows, PreviewView, RowView, ScreenEvent, ScreenModel,
    ScreenView, CHROME_HEIGHT,
};
use crate::models::{ListModel, ObjectEntry, ObjectPreview, SortCriteria};
use crate::ui::helpers::{format_size, format_timestamp};
use crate::ui::Theme;

const DETAIL_ROWS: u16 = 4;

/// Pane shown below the list.
#[derive(Debug, Clone)]
enum Pane {
    Details(ObjectEntry),
    Preview(ObjectPreview),
}

/// Objects of one `(bucket, prefix)` location.
pub struct ObjectScreen {
    list: ListModel<ObjectEntry>,
    bucket: String,
    prefix: String,
    loading: bool,
    sort: SortCriteria,
    pane: Option<Pane>,
    height: u16,
    theme: Theme,
}

impl ObjectScreen {
    pub fn new(theme: Theme) -> Self {
        Self {
            list: ListModel::empty(),
            bucket: String::new(),
            prefix: String::new(),
            loading: false,
            sort: SortCriteria::default(),
            pane: None,
            height: 0,
            theme,
        }
    }

    /// Points the screen at a new location and clears what was shown. The
    /// sort order is kept.
    pub fn open(&mut self, bucket: impl Into<String>, prefix: impl Into<String>) {
        self.bucket = bucket.into();
        self.prefix = prefix.into();
        self.list.set_items(Vec::new());
        self.loading = true;
        self.set_pane(None);
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn is_at(&self, bucket: &str, prefix: &str) -> bool {
        self.bucket == bucket && self.prefix == prefix
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn set_details(&mut self, details: Option<ObjectEntry>) {
        self.set_pane(details.map(Pane::Details));
    }

    pub fn set_preview(&mut self, preview: Option<ObjectPreview>) {
        self.set_pane(preview.map(Pane::Preview));
    }

    /// Key of the object whose preview is open.
    pub fn preview_key(&self) -> Option<&str> {
        match &self.pane {
            Some(Pane::Preview(preview)) => Some(&preview.key),
            _ => None,
        }
    }

    pub fn items(&self) -> &[ObjectEntry] {
        self.list.items()
    }

    fn set_pane(&mut self, pane: Option<Pane>) {
        self.pane = pane;
        self.relayout();
    }

    fn pane_height(&self) -> u16 {
        match &self.pane {
            None => 0,
            Some(Pane::Details(_)) => DETAIL_ROWS + 2,
            Some(Pane::Preview(_)) => (self.height.saturating_sub(CHROME_HEIGHT) / 2).max(3),
        }
    }

    // The list gets what the pane leaves over. Nothing to do before the
    // first resize.
    fn relayout(&mut self) {
        if self.height == 0 {
            return;
        }
        let height = self.height.saturating_sub(self.pane_height());
        self.list.set_visible_height(list_height(height));
    }

    fn cycle_sort(&mut self) {
        self.sort = self.sort.next();
        let sort = self.sort;
        self.list.sort_by(|a, b| sort.compare(a, b));
    }

    fn selected_file(&self) -> Option<&ObjectEntry> {
        self.list.selected_item().filter(|e| !e.is_directory)
    }

    fn command_key(&mut self, key: &KeyEvent) -> Option<Option<ScreenEvent>> {
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return None;
        }
        let event = match key.code {
            KeyCode::Backspace | KeyCode::Char('h') => {
                (!self.prefix.is_empty()).then_some(ScreenEvent::ParentPrefix)
            }
            KeyCode::Char('i') => self
                .selected_file()
                .map(|e| ScreenEvent::ObjectInfo(e.key.clone())),
            KeyCode::Char('p') => self
                .selected_file()
                .map(|e| ScreenEvent::Preview(e.key.clone())),
            KeyCode::Char('d') => self.list.selected_item().map(|e| {
                if e.is_directory {
                    ScreenEvent::DownloadFolder(e.key.clone())
                } else {
                    ScreenEvent::Download(e.key.clone())
                }
            }),
            KeyCode::Char('x') => Some(ScreenEvent::CancelDownload),
            KeyCode::Char('s') => {
                self.cycle_sort();
                None
            }
            _ => return None,
        };
        Some(event)
    }

    fn row(&self, entry: &ObjectEntry) -> RowView {
        let name = entry.name();
        if entry.is_directory {
            RowView {
                label: format!("📁 {name}"),
                detail: "<DIR>".to_string(),
                style: self.theme.directory,
            }
        } else {
            let size = u64::try_from(entry.size).map(format_size).unwrap_or_default();
            let modified = entry
                .last_modified
                .as_ref()
                .map(format_timestamp)
                .unwrap_or_default();
            RowView {
                label: format!("📄 {name}"),
                detail: format!("{size:>10}  {modified}"),
                style: self.theme.normal,
            }
        }
    }

    fn preview_view(&self, preview: &ObjectPreview) -> PreviewView {
        let mut title = format!("Preview: {} ({}", preview.key, format_size(preview.bytes));
        if preview.truncated {
            title.push_str(", truncated");
        }
        title.push(')');

        let rows = usize::from(self.pane_height().saturating_sub(2));
        PreviewView {
            title,
            lines: preview
                .text
                .lines()
                .take(rows)
                .map(|line| line.replace('\t', "    "))
                .collect(),
        }
    }
}

fn detail_rows(entry: &ObjectEntry) -> Vec<(String, String)> {
    let size = u64::try_from(entry.size).unwrap_or_default();
    vec![
        ("Key".to_string(), entry.key.clone()),
        (
            "Size".to_string(),
            format!("{} ({size} bytes)", format_size(size)),
        ),
        (
            "Last modified".to_string(),
            entry
                .last_modified
                .as_ref()
                .map(format_timestamp)
                .unwrap_or_default(),
        ),
        ("Storage class".to_string(), entry.storage_class.clone()),
    ]
}

impl ScreenModel for ObjectScreen {
    type Item = ObjectEntry;

    fn set_items(&mut self, mut items: Vec<ObjectEntry>) {
        let sort = self.sort;
        items.sort_by(|a, b| sort.compare(a, b));
        self.list.set_items(items);
    }

    fn handle_key(&mut self, key: &KeyEvent) -> Option<ScreenEvent> {
        if !self.list.is_filtering() {
            if let Some(event) = self.command_key(key) {
                return event;
            }
        }

        let entry = list_key(&mut self.list, key)?;
        Some(if entry.is_directory {
            ScreenEvent::PrefixChosen(entry.key.clone())
        } else {
            ScreenEvent::ObjectInfo(entry.key.clone())
        })
    }

    fn resize(&mut self, _width: u16, height: u16) {
        self.height = height;
        self.relayout();
    }

    fn view(&self) -> ScreenView {
        let (rows, selected) = window_rows(&self.list, |e| self.row(e));
        let (details, preview) = match &self.pane {
            Some(Pane::Details(entry)) => (Some(detail_rows(entry)), None),
            Some(Pane::Preview(preview)) => (None, Some(self.preview_view(preview))),
            None => (None, None),
        };
        ScreenView {
            title: format!("S3: {}/{} [{}]", self.bucket, self.prefix, self.sort.label()),
            hint: "enter: open/info  p: preview  s: sort  d: download  x: cancel  backspace: up  esc: buckets",
            rows,
            selected,
            position: position(&self.list),
            filter: self.list.filter().to_string(),
            filtering: self.list.is_filtering(),
            loading: self.loading,
            empty_text: if self.loading {
                "Loading objects..."
            } else {
                "No objects under this prefix"
            },
            details,
            preview,
            pane_height: self.pane_height(),
        }
    }

    fn is_capturing_text(&self) -> bool {
        self.list.is_filtering()
    }
}
