use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::helpers::{centered_rect, truncate_string};
use crate::app::screens::{PreviewView, ScreenView};
use crate::app::FrameView;
use crate::models::MessageLevel;

const NAME_WIDTH: usize = 48;

pub fn draw(f: &mut Frame, frame: &FrameView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(frame.view.pane_height),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, frame, chunks[0]);
    let hint = Paragraph::new(frame.view.hint).style(frame.theme.hint);
    f.render_widget(hint, chunks[1]);
    draw_list(f, frame, chunks[2]);
    if let Some(details) = &frame.view.details {
        draw_details(f, frame, details, chunks[3]);
    } else if let Some(preview) = &frame.view.preview {
        draw_preview(f, frame, preview, chunks[3]);
    }
    draw_status_bar(f, frame, chunks[4]);

    if let Some(rows) = &frame.help {
        draw_help(f, frame, rows);
    }
}

fn draw_header(f: &mut Frame, frame: &FrameView, area: Rect) {
    let mut spans = vec![Span::styled("s3nav", frame.theme.title)];
    if let Some(session) = &frame.session {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(session.clone(), frame.theme.muted));
    }
    let header = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(frame.theme.border));
    f.render_widget(header, area);
}

fn list_title(view: &ScreenView) -> String {
    let mut title = format!(" {} ", view.title);
    if let Some((current, total)) = view.position {
        title.push_str(&format!("[{current}/{total}] "));
    }
    if view.filtering {
        title.push_str(&format!("filter: {}_ ", view.filter));
    } else if !view.filter.is_empty() {
        title.push_str(&format!("filter: {} ", view.filter));
    }
    title
}

fn draw_list(f: &mut Frame, frame: &FrameView, area: Rect) {
    let view = &frame.view;
    let block = Block::default()
        .title(list_title(view))
        .borders(Borders::ALL)
        .border_style(frame.theme.active_border);

    if view.rows.is_empty() {
        let empty = Paragraph::new(view.empty_text)
            .style(frame.theme.muted)
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = view
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let text = format!(
                "{:<width$} {}",
                truncate_string(&row.label, NAME_WIDTH),
                row.detail,
                width = NAME_WIDTH
            );
            let style = if Some(i) == view.selected {
                frame.theme.selected
            } else {
                row.style
            };
            ListItem::new(text).style(style)
        })
        .collect();

    f.render_widget(List::new(items).block(block), area);
}

fn draw_details(f: &mut Frame, frame: &FrameView, details: &[(String, String)], area: Rect) {
    let lines: Vec<Line> = details
        .iter()
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(format!("{label:<14}"), frame.theme.muted),
                Span::raw(value.clone()),
            ])
        })
        .collect();
    let pane = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Object info ")
                .borders(Borders::ALL)
                .border_style(frame.theme.border),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(pane, area);
}

fn draw_preview(f: &mut Frame, frame: &FrameView, preview: &PreviewView, area: Rect) {
    let lines: Vec<Line> = preview.lines.iter().map(|l| Line::raw(l.as_str())).collect();
    let pane = Paragraph::new(lines).block(
        Block::default()
            .title(format!(" {} ", preview.title))
            .borders(Borders::ALL)
            .border_style(frame.theme.border),
    );
    f.render_widget(pane, area);
}

fn draw_status_bar(f: &mut Frame, frame: &FrameView, area: Rect) {
    let mut spans = Vec::new();
    if let Some(spinner) = frame.spinner {
        spans.push(Span::styled(format!("{spinner} "), frame.theme.info));
    }
    if let Some(status) = &frame.status {
        let style = match status.level {
            MessageLevel::Info => frame.theme.info,
            MessageLevel::Error => frame.theme.error,
        };
        spans.push(Span::styled(
            format!("{} ", status.at.format("%H:%M:%S")),
            frame.theme.muted,
        ));
        spans.push(Span::styled(status.text.clone(), style));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_help(f: &mut Frame, frame: &FrameView, global: &[(String, &'static str)]) {
    let area = centered_rect(60, 70, f.area());

    let navigation = [
        ("↑/k ↓/j", "move selection"),
        ("PgUp/PgDn", "move by page"),
        ("Home/g End/G", "first / last row"),
        ("enter", "open or select"),
        ("/", "filter, enter accepts, esc clears"),
        ("backspace/h", "parent prefix"),
        ("i", "object info"),
        ("p", "preview text, again to close"),
        ("s", "cycle sort order"),
        ("d", "download file or folder"),
        ("x", "cancel download"),
    ];

    let mut lines = vec![Line::from(Span::styled("General", frame.theme.title))];
    lines.extend(
        global
            .iter()
            .map(|(keys, action)| help_line(frame, keys, action)),
    );
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled("Lists", frame.theme.title)));
    lines.extend(
        navigation
            .iter()
            .map(|(keys, action)| help_line(frame, keys, action)),
    );

    let help = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_style(frame.theme.active_border),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, area);
    f.render_widget(help, area);
}

fn help_line<'a>(frame: &FrameView, keys: &str, action: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("  {keys:<16}"), frame.theme.selected),
        Span::raw(action),
    ])
}
