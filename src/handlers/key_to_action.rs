use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::models::ListAction;

/// Converts a key to a list action, depending on whether the list is
/// currently capturing filter text.
pub fn key_to_list_action(key: &KeyEvent, filtering: bool) -> Option<ListAction> {
    if filtering {
        filter_key_to_action(key)
    } else {
        navigation_key_to_action(key)
    }
}

fn navigation_key_to_action(key: &KeyEvent) -> Option<ListAction> {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(ListAction::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(ListAction::Down),
        KeyCode::PageUp => Some(ListAction::PageUp),
        KeyCode::PageDown => Some(ListAction::PageDown),
        KeyCode::Home | KeyCode::Char('g') => Some(ListAction::Home),
        KeyCode::End | KeyCode::Char('G') => Some(ListAction::End),
        KeyCode::Enter => Some(ListAction::Confirm),
        KeyCode::Char('/') => Some(ListAction::StartFilter),
        _ => None,
    }
}

fn filter_key_to_action(key: &KeyEvent) -> Option<ListAction> {
    match key.code {
        KeyCode::Enter => Some(ListAction::AcceptFilter),
        KeyCode::Esc => Some(ListAction::ClearFilter),
        KeyCode::Backspace => Some(ListAction::FilterBackspace),
        KeyCode::Up => Some(ListAction::Up),
        KeyCode::Down => Some(ListAction::Down),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(ListAction::FilterChar(c))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_vim_and_arrow_keys() {
        assert_eq!(key_to_list_action(&key(KeyCode::Char('j')), false), Some(ListAction::Down));
        assert_eq!(key_to_list_action(&key(KeyCode::Up), false), Some(ListAction::Up));
        assert_eq!(key_to_list_action(&key(KeyCode::Enter), false), Some(ListAction::Confirm));
        assert_eq!(
            key_to_list_action(&key(KeyCode::Char('/')), false),
            Some(ListAction::StartFilter)
        );
    }

    #[test]
    fn test_filtering_captures_letters() {
        assert_eq!(
            key_to_list_action(&key(KeyCode::Char('j')), true),
            Some(ListAction::FilterChar('j'))
        );
        assert_eq!(key_to_list_action(&key(KeyCode::Enter), true), Some(ListAction::AcceptFilter));
        assert_eq!(key_to_list_action(&key(KeyCode::Esc), true), Some(ListAction::ClearFilter));
        let ctrl_u = KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL);
        assert_eq!(key_to_list_action(&ctrl_u, true), None);
    }
}
