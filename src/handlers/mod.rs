mod key_to_action;
mod keymap;

pub use key_to_action::key_to_list_action;
pub use keymap::{GlobalAction, KeyBinding, KeyMap};
