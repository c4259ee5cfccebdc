use crossterm::event::KeyEvent;

use super::{
    list_height, list_key, position, window_rows, RowView, ScreenEvent, ScreenModel, ScreenView,
};
use crate::models::{ListModel, Profile};
use crate::ui::Theme;

pub struct ProfileScreen {
    list: ListModel<Profile>,
    theme: Theme,
}

impl ProfileScreen {
    pub fn new(profiles: Vec<Profile>, theme: Theme) -> Self {
        Self {
            list: ListModel::new(profiles),
            theme,
        }
    }

    /// Moves the highlight to `name` if it is listed.
    pub fn highlight(&mut self, name: &str) -> bool {
        self.list.select_where(|p| p.name == name)
    }
}

impl ScreenModel for ProfileScreen {
    type Item = Profile;

    fn set_items(&mut self, items: Vec<Profile>) {
        self.list.set_items(items);
    }

    fn handle_key(&mut self, key: &KeyEvent) -> Option<ScreenEvent> {
        list_key(&mut self.list, key).map(|p| ScreenEvent::ProfileChosen(p.clone()))
    }

    fn resize(&mut self, _width: u16, height: u16) {
        self.list.set_visible_height(list_height(height));
    }

    fn view(&self) -> ScreenView {
        let (rows, selected) = window_rows(&self.list, |p| RowView {
            label: format!("👤 {}", p.name),
            detail: String::new(),
            style: self.theme.normal,
        });
        ScreenView {
            title: "AWS Profiles".to_string(),
            hint: "enter: connect  /: filter  ?: help  q: quit",
            rows,
            selected,
            position: position(&self.list),
            filter: self.list.filter().to_string(),
            filtering: self.list.is_filtering(),
            loading: false,
            empty_text: "No profiles found",
            details: None,
            preview: None,
            pane_height: 0,
        }
    }

    fn is_capturing_text(&self) -> bool {
        self.list.is_filtering()
    }
}
