use crossterm::event::KeyEvent;

use super::{
    list_height, list_key, position, window_rows, RowView, ScreenEvent, ScreenModel, ScreenView,
};
use crate::models::{Bucket, ListModel};
use crate::ui::helpers::format_timestamp;
use crate::ui::Theme;

pub struct BucketScreen {
    list: ListModel<Bucket>,
    /// `profile (region)` of the session the buckets belong to.
    context: String,
    loading: bool,
    theme: Theme,
}

impl BucketScreen {
    pub fn new(theme: Theme) -> Self {
        Self {
            list: ListModel::empty(),
            context: String::new(),
            loading: false,
            theme,
        }
    }

    /// Forgets the previous session's buckets.
    pub fn reset(&mut self, context: impl Into<String>) {
        self.context = context.into();
        self.list.set_items(Vec::new());
        self.loading = false;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn items(&self) -> &[Bucket] {
        self.list.items()
    }
}

impl ScreenModel for BucketScreen {
    type Item = Bucket;

    fn set_items(&mut self, items: Vec<Bucket>) {
        self.list.set_items(items);
    }

    fn handle_key(&mut self, key: &KeyEvent) -> Option<ScreenEvent> {
        list_key(&mut self.list, key).map(|b| ScreenEvent::BucketChosen(b.clone()))
    }

    fn resize(&mut self, _width: u16, height: u16) {
        self.list.set_visible_height(list_height(height));
    }

    fn view(&self) -> ScreenView {
        let (rows, selected) = window_rows(&self.list, |b| RowView {
            label: format!("🪣 {}", b.name),
            detail: b.created_at.as_ref().map(format_timestamp).unwrap_or_default(),
            style: self.theme.normal,
        });
        ScreenView {
            title: format!("Buckets for: {}", self.context),
            hint: "enter: open  /: filter  r: refresh  ?: help  q: quit",
            rows,
            selected,
            position: position(&self.list),
            filter: self.list.filter().to_string(),
            filtering: self.list.is_filtering(),
            loading: self.loading,
            empty_text: if self.loading {
                "Loading buckets..."
            } else {
                "No buckets"
            },
            details: None,
            preview: None,
            pane_height: 0,
        }
    }

    fn is_capturing_text(&self) -> bool {
        self.list.is_filtering()
    }
}
