use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Cli;
use s3nav::handlers::KeyMap;
use s3nav::models::config::config_dir;
use s3nav::models::PreferencesStore;
use s3nav::operations::{ProfileSource, S3SessionFactory};
use s3nav::ui::Theme;
use s3nav::{run_app, App};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_dir = config_dir()?;
    init_tracing(&config_dir, cli.debug);

    let store = PreferencesStore::new()?;
    let mut preferences = store.load();
    if let Some(region) = cli.region {
        preferences.region = region;
    }

    let profiles = ProfileSource::from_env()?.list_profiles();
    tracing::info!(count = profiles.len(), "found AWS profiles");
    let factory = S3SessionFactory::new(profiles.clone());

    let mut app = App::new(
        profiles,
        preferences,
        Box::new(factory),
        KeyMap::default(),
        Theme::default(),
    );
    let startup = match cli.profile.as_deref() {
        Some(name) => app.select_profile(name),
        None => Vec::new(),
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, &store, startup).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.context("terminal session failed")
}

/// Logs go to `s3nav.log` in the config directory because the terminal is
/// owned by the UI. `RUST_LOG` wins unless `--debug` is given.
fn init_tracing(config_dir: &Path, debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let log_file = std::fs::create_dir_all(config_dir).and_then(|_| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(config_dir.join("s3nav.log"))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false);

    let _ = match log_file {
        Ok(file) => builder.with_writer(Mutex::new(file)).try_init(),
        Err(_) => builder.with_writer(io::sink).try_init(),
    };
}
