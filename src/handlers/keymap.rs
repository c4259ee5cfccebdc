use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Keys handled by the orchestrator before the active screen sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalAction {
    Quit,
    ToggleHelp,
    Back,
    Refresh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    // SHIFT is implied by the character itself ('?', 'G').
    pub fn matches(&self, key: &KeyEvent) -> bool {
        let mut pressed = key.modifiers;
        pressed.remove(KeyModifiers::SHIFT);
        let mut bound = self.modifiers;
        bound.remove(KeyModifiers::SHIFT);
        self.code == key.code && pressed == bound
    }

    pub fn label(&self) -> String {
        let key = match self.code {
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Esc => "esc".to_string(),
            KeyCode::Enter => "enter".to_string(),
            KeyCode::F(n) => format!("F{n}"),
            other => format!("{other:?}").to_lowercase(),
        };
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            format!("ctrl+{key}")
        } else {
            key
        }
    }
}

/// Global key bindings. Built once at startup and handed to the [`App`](crate::App).
#[derive(Debug, Clone)]
pub struct KeyMap {
    pub quit: Vec<KeyBinding>,
    pub help: Vec<KeyBinding>,
    pub back: Vec<KeyBinding>,
    pub refresh: Vec<KeyBinding>,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            quit: vec![KeyBinding::plain(KeyCode::Char('q')), KeyBinding::ctrl('c')],
            help: vec![KeyBinding::plain(KeyCode::Char('?'))],
            back: vec![KeyBinding::plain(KeyCode::Esc)],
            refresh: vec![KeyBinding::plain(KeyCode::Char('r'))],
        }
    }
}

impl KeyMap {
    /// Resolves a key in precedence order quit, help, back, refresh.
    ///
    /// While a screen captures text only control-modified bindings apply, so
    /// typing `q` into a filter does not quit but `ctrl+c` still does.
    pub fn global_action(&self, key: &KeyEvent, capturing_text: bool) -> Option<GlobalAction> {
        let table = [
            (&self.quit, GlobalAction::Quit),
            (&self.help, GlobalAction::ToggleHelp),
            (&self.back, GlobalAction::Back),
            (&self.refresh, GlobalAction::Refresh),
        ];

        table.into_iter().find_map(|(bindings, action)| {
            bindings
                .iter()
                .filter(|b| !capturing_text || b.modifiers.contains(KeyModifiers::CONTROL))
                .any(|b| b.matches(key))
                .then_some(action)
        })
    }

    /// `(keys, description)` rows for the help overlay.
    pub fn help_rows(&self) -> Vec<(String, &'static str)> {
        fn join(bindings: &[KeyBinding]) -> String {
            bindings
                .iter()
                .map(KeyBinding::label)
                .collect::<Vec<_>>()
                .join("/")
        }
        vec![
            (join(&self.quit), "quit"),
            (join(&self.help), "toggle help"),
            (join(&self.back), "back to buckets"),
            (join(&self.refresh), "refresh current view"),
        ]
    }
}
