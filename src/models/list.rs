use std::cmp::Ordering;

/// Anything a [`ListModel`] can show and filter.
pub trait ListEntry {
    /// Text displayed for the row and matched by the filter.
    fn label(&self) -> &str;
}

/// Movement, filter and confirm operations understood by every list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Confirm,
    StartFilter,
    FilterChar(char),
    FilterBackspace,
    AcceptFilter,
    ClearFilter,
}

/// Single-select list with substring filtering and a scroll window.
///
/// `selected` indexes the *visible* (filtered) rows. It is `None` exactly when
/// no row is visible and is re-established whenever items or the filter change.
#[derive(Debug, Clone)]
pub struct ListModel<T> {
    items: Vec<T>,
    visible: Vec<usize>,
    filter: String,
    filtering: bool,
    selected: Option<usize>,
    scroll_offset: usize,
    visible_height: usize,
}

impl<T: ListEntry> Default for ListModel<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: ListEntry> ListModel<T> {
    pub fn new(items: Vec<T>) -> Self {
        let mut model = Self {
            items,
            visible: Vec::new(),
            filter: String::new(),
            filtering: false,
            selected: None,
            scroll_offset: 0,
            visible_height: 10,
        };
        model.rebuild_view();
        model
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Replaces the item set wholesale. Selection goes back to the first
    /// visible row.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.rebuild_view();
    }

    /// Reorders the items with a stable sort. The highlighted item keeps the
    /// highlight.
    pub fn sort_by(&mut self, mut compare: impl FnMut(&T, &T) -> Ordering) {
        let highlighted = self.selected.and_then(|i| self.visible.get(i).copied());

        let mut order: Vec<usize> = (0..self.items.len()).collect();
        order.sort_by(|&a, &b| compare(&self.items[a], &self.items[b]));

        let mut slots: Vec<Option<T>> = std::mem::take(&mut self.items)
            .into_iter()
            .map(Some)
            .collect();
        self.items = order
            .iter()
            .filter_map(|&i| slots.get_mut(i).and_then(Option::take))
            .collect();
        self.rebuild_view();

        let moved = highlighted
            .and_then(|old| order.iter().position(|&i| i == old))
            .and_then(|new| self.visible.iter().position(|&i| i == new));
        if let Some(index) = moved {
            self.selected = Some(index);
            self.update_scroll_offset();
        }
    }

    fn rebuild_view(&mut self) {
        let needle = self.filter.to_lowercase();
        self.visible = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| needle.is_empty() || item.label().to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect();
        self.selected = if self.visible.is_empty() { None } else { Some(0) };
        self.scroll_offset = 0;
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of visible rows.
    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn get(&self, view_index: usize) -> Option<&T> {
        let data_index = *self.visible.get(view_index)?;
        self.items.get(data_index)
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&T> {
        self.selected.and_then(|i| self.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.visible.iter().filter_map(|&i| self.items.get(i))
    }

    /// Highlights the first visible row matching `predicate`.
    pub fn select_where(&mut self, predicate: impl Fn(&T) -> bool) -> bool {
        let found = self.iter().position(predicate);
        if let Some(index) = found {
            self.selected = Some(index);
            self.update_scroll_offset();
        }
        found.is_some()
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn is_filtering(&self) -> bool {
        self.filtering
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn set_visible_height(&mut self, height: usize) {
        self.visible_height = height.max(1);
        self.update_scroll_offset();
    }

    /// Visible rows that fit in the current scroll window, paired with their
    /// view index.
    pub fn window(&self) -> impl Iterator<Item = (usize, &T)> {
        self.iter()
            .enumerate()
            .skip(self.scroll_offset)
            .take(self.visible_height)
    }

    /// Applies one action. Returns the highlighted item on `Confirm`.
    pub fn apply(&mut self, action: ListAction) -> Option<&T> {
        match action {
            ListAction::Up => self.move_by(-1),
            ListAction::Down => self.move_by(1),
            ListAction::PageUp => self.move_by(-(self.page_size() as isize)),
            ListAction::PageDown => self.move_by(self.page_size() as isize),
            ListAction::Home => {
                if !self.is_empty() {
                    self.selected = Some(0);
                    self.update_scroll_offset();
                }
            }
            ListAction::End => {
                if !self.is_empty() {
                    self.selected = Some(self.len() - 1);
                    self.update_scroll_offset();
                }
            }
            ListAction::Confirm => return self.selected_item(),
            ListAction::StartFilter => self.filtering = true,
            ListAction::FilterChar(c) => {
                self.filter.push(c);
                self.rebuild_view();
            }
            ListAction::FilterBackspace => {
                if self.filter.pop().is_some() {
                    self.rebuild_view();
                }
            }
            ListAction::AcceptFilter => self.filtering = false,
            ListAction::ClearFilter => {
                self.filtering = false;
                if !self.filter.is_empty() {
                    self.filter.clear();
                    self.rebuild_view();
                }
            }
        }
        None
    }

    fn page_size(&self) -> usize {
        self.visible_height.saturating_sub(1).max(1)
    }

    // Clamps at both ends, no wraparound.
    fn move_by(&mut self, delta: isize) {
        let Some(current) = self.selected else {
            return;
        };
        let last = self.len() as isize - 1;
        let next = (current as isize + delta).clamp(0, last);
        self.selected = Some(next as usize);
        self.update_scroll_offset();
    }

    fn update_scroll_offset(&mut self) {
        let selected = self.selected.unwrap_or(0);
        if selected < self.scroll_offset {
            self.scroll_offset = selected;
        } else if selected >= self.scroll_offset + self.visible_height {
            self.scroll_offset = selected.saturating_sub(self.visible_height - 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl ListEntry for String {
        fn label(&self) -> &str {
            self
        }
    }

    fn model(labels: &[&str]) -> ListModel<String> {
        ListModel::new(labels.iter().map(|s| s.to_string()).collect())
    }

    fn assert_selection_valid(list: &ListModel<String>) {
        match list.selected_index() {
            None => assert!(list.is_empty()),
            Some(i) => assert!(i < list.len()),
        }
    }

    #[test]
    fn test_set_items_resets_selection() {
        let mut list = model(&["a", "b", "c"]);
        list.apply(ListAction::End);
        assert_eq!(list.selected_index(), Some(2));

        list.set_items(vec!["x".into()]);
        assert_eq!(list.selected_index(), Some(0));

        list.set_items(Vec::new());
        assert_eq!(list.selected_index(), None);
    }

    #[test]
    fn test_set_items_twice_is_stable() {
        let items: Vec<String> = vec!["one".into(), "two".into()];
        let mut list = ListModel::empty();
        list.set_items(items.clone());
        let first: Vec<String> = list.iter().cloned().collect();
        list.set_items(items);
        let second: Vec<String> = list.iter().cloned().collect();
        assert_eq!(first, second);
        assert_eq!(list.selected_index(), Some(0));
    }

    #[test]
    fn test_movement_clamps_without_wrapping() {
        let mut list = model(&["a", "b", "c"]);
        list.apply(ListAction::Up);
        assert_eq!(list.selected_index(), Some(0));
        for _ in 0..10 {
            list.apply(ListAction::Down);
        }
        assert_eq!(list.selected_index(), Some(2));
        list.apply(ListAction::PageDown);
        assert_eq!(list.selected_index(), Some(2));
        list.apply(ListAction::PageUp);
        assert_eq!(list.selected_index(), Some(0));
    }

    #[test]
    fn test_selection_always_valid_for_any_length() {
        let actions = [
            ListAction::Down,
            ListAction::PageDown,
            ListAction::Up,
            ListAction::End,
            ListAction::Home,
            ListAction::PageUp,
            ListAction::Down,
        ];
        for n in 0..12 {
            let labels: Vec<String> = (0..n).map(|i| format!("item-{i}")).collect();
            let mut list = ListModel::empty();
            list.set_visible_height(3);
            list.set_items(labels);
            assert_selection_valid(&list);
            for action in actions {
                list.apply(action);
                assert_selection_valid(&list);
            }
        }
    }

    #[test]
    fn test_empty_list_ignores_everything() {
        let mut list: ListModel<String> = ListModel::empty();
        for action in [ListAction::Down, ListAction::End, ListAction::Home] {
            list.apply(action);
        }
        assert_eq!(list.selected_index(), None);
        assert!(list.apply(ListAction::Confirm).is_none());
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let mut list = model(&["alpha", "Beta", "gamma", "alphabet"]);
        list.apply(ListAction::StartFilter);
        list.apply(ListAction::FilterChar('B'));
        let labels: Vec<&str> = list.iter().map(|s| s.as_str()).collect();
        assert_eq!(labels, vec!["Beta", "alphabet"]);
    }

    #[test]
    fn test_filter_narrows_monotonically() {
        let mut list = model(&["abc", "acb", "bac", "xyz", "ab"]);
        list.apply(ListAction::FilterChar('a'));
        let after_a: Vec<String> = list.iter().cloned().collect();
        list.apply(ListAction::FilterChar('b'));
        let after_ab: Vec<String> = list.iter().cloned().collect();
        assert!(after_ab.iter().all(|item| after_a.contains(item)));
        assert_eq!(after_ab, vec!["abc".to_string(), "ab".to_string()]);
    }

    #[test]
    fn test_confirm_acts_on_visible_row() {
        let mut list = model(&["red", "green", "blue"]);
        list.apply(ListAction::FilterChar('b'));
        assert_eq!(list.apply(ListAction::Confirm).map(String::as_str), Some("blue"));
    }

    #[test]
    fn test_filter_without_matches_clears_selection() {
        let mut list = model(&["red", "green"]);
        list.apply(ListAction::FilterChar('z'));
        assert!(list.is_empty());
        assert_eq!(list.selected_index(), None);
        list.apply(ListAction::ClearFilter);
        assert_eq!(list.len(), 2);
        assert_eq!(list.selected_index(), Some(0));
        assert!(!list.is_filtering());
    }

    #[test]
    fn test_window_follows_selection() {
        let labels: Vec<String> = (0..10).map(|i| i.to_string()).collect();
        let mut list = ListModel::new(labels);
        list.set_visible_height(3);
        for _ in 0..5 {
            list.apply(ListAction::Down);
        }
        assert_eq!(list.selected_index(), Some(5));
        assert_eq!(list.scroll_offset(), 3);
        let window: Vec<usize> = list.window().map(|(i, _)| i).collect();
        assert_eq!(window, vec![3, 4, 5]);
    }

    #[test]
    fn test_sort_keeps_highlighted_item() {
        let mut list = model(&["b", "c", "a", "d"]);
        list.set_visible_height(2);
        list.apply(ListAction::Down);
        assert_eq!(list.selected_item().map(String::as_str), Some("c"));

        list.sort_by(|a, b| b.cmp(a));
        let labels: Vec<&str> = list.iter().map(|s| s.as_str()).collect();
        assert_eq!(labels, vec!["d", "c", "b", "a"]);
        assert_eq!(list.selected_item().map(String::as_str), Some("c"));

        list.sort_by(|a, b| a.cmp(b));
        assert_eq!(list.selected_index(), Some(2));
        assert_eq!(list.scroll_offset(), 1);
    }

    #[test]
    fn test_sort_respects_filter() {
        let mut list = model(&["beta", "alpha", "gamma", "alphabet"]);
        list.apply(ListAction::FilterChar('a'));
        list.apply(ListAction::FilterChar('l'));
        list.sort_by(|a, b| b.cmp(a));
        let labels: Vec<&str> = list.iter().map(|s| s.as_str()).collect();
        assert_eq!(labels, vec!["alphabet", "alpha"]);
        assert_eq!(list.filter(), "al");
    }

    #[test]
    fn test_select_where() {
        let mut list = model(&["default", "dev", "prod"]);
        assert!(list.select_where(|p| p == "prod"));
        assert_eq!(list.selected_index(), Some(2));
        assert!(!list.select_where(|p| p == "missing"));
        assert_eq!(list.selected_index(), Some(2));
    }
}
