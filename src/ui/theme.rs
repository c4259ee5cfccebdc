use ratatui::style::{Color, Modifier, Style};

/// Immutable set of styles, built once at startup and handed to every screen
/// and to the draw step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub title: Style,
    pub hint: Style,
    pub border: Style,
    pub active_border: Style,
    pub selected: Style,
    pub directory: Style,
    pub normal: Style,
    pub muted: Style,
    pub info: Style,
    pub error: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            title: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            hint: Style::default().fg(Color::DarkGray),
            border: Style::default().fg(Color::Gray),
            active_border: Style::default().fg(Color::Yellow),
            selected: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            directory: Style::default().fg(Color::Blue),
            normal: Style::default(),
            muted: Style::default().fg(Color::DarkGray),
            info: Style::default().fg(Color::Green),
            error: Style::default().fg(Color::Red),
        }
    }
}
