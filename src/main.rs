mod app;
mod config;
mod dikai;
mod handler;
mod tui;
mod ui;

use std::fs;
use std::sync::Mutex;
use std::time::Duration;
use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use app::App;
use tui::{EventHandler, Tui};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;
    tui::install_panic_hook();

    let mut terminal = tui::init()?;
    let mut events = EventHandler::new(Duration::from_millis(300));
    let mut app = App::new();

    info!("starting dikai chat client against {}", app.client.base_url());

    let result = run(&mut terminal, &mut events, &mut app).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut Tui, events: &mut EventHandler, app: &mut App) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }

        poll_answers(app).await;
    }
    Ok(())
}

/// Drain finished ask requests, appending answers in completion order.
/// Unfinished handles stay pending; nothing here blocks the UI.
async fn poll_answers(app: &mut App) {
    let mut i = 0;
    while i < app.pending.len() {
        if app.pending[i].is_finished() {
            let task = app.pending.swap_remove(i);
            let result = match task.await {
                Ok(result) => result,
                Err(join_err) => Err(join_err.into()),
            };
            app.push_answer(result);
        } else {
            i += 1;
        }
    }
}

/// Log to a file in the config directory; the terminal itself is the UI,
/// so nothing may be written to stdout or stderr while it runs.
fn init_logging() -> Result<()> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(());
    };
    let log_dir = config_dir.join("dikai");
    fs::create_dir_all(&log_dir)?;
    let log_file = fs::File::create(log_dir.join("dikai.log"))?;

    let filter = EnvFilter::try_from_env("DIKAI_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    Ok(())
}
