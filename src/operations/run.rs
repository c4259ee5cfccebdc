use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::Stdout;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::app::{App, Effect};
use crate::message::Message;
use crate::models::PreferencesStore;
use crate::operations::loader::Loader;
use crate::ui;

const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Main application loop following The Elm Architecture (TEA).
///
/// Terminal input and load completions are fed into [`App::handle_input`]
/// one at a time; the frame is redrawn after every message.
pub async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    store: &PreferencesStore,
    startup: Vec<Effect>,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut loader = Loader::new(tx);

    let size = terminal.size()?;
    app.handle_input(Message::Resize {
        width: size.width,
        height: size.height,
    });
    if apply_effects(startup, &mut loader, store) {
        return Ok(());
    }

    loop {
        terminal.draw(|f| ui::draw(f, &app.render()))?;

        let message = tokio::select! {
            Some(message) = rx.recv() => message,
            _ = tokio::time::sleep(INPUT_POLL_INTERVAL) => {
                match poll_terminal()? {
                    Some(message) => message,
                    None => Message::Tick,
                }
            }
        };

        let effects = app.handle_input(message);
        if apply_effects(effects, &mut loader, store) {
            break;
        }
    }

    loader.cancel_download();
    loader.cancel_preview();
    Ok(())
}

/// Non-blocking read of one terminal event. Key releases and mouse/focus/
/// paste events are dropped.
fn poll_terminal() -> Result<Option<Message>> {
    if !event::poll(Duration::from_millis(0))? {
        return Ok(None);
    }
    let message = match event::read()? {
        // Windows sends both press and release
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(Message::Key(key)),
        Event::Resize(width, height) => Some(Message::Resize { width, height }),
        _ => None,
    };
    Ok(message)
}

/// Carries out effects in order. Returns `true` on quit.
fn apply_effects(effects: Vec<Effect>, loader: &mut Loader, store: &PreferencesStore) -> bool {
    for effect in effects {
        match effect {
            Effect::Quit => return true,
            Effect::Load(request) => loader.spawn(request),
            Effect::CancelDownload => loader.cancel_download(),
            Effect::CancelPreview => loader.cancel_preview(),
            Effect::SavePreferences(preferences) => {
                if let Err(e) = store.save(&preferences) {
                    tracing::warn!(path = %store.path().display(), error = %e, "cannot save preferences");
                }
            }
        }
    }
    false
}
