//! EyesOnAsset TUI - a terminal client for tracking assets and their owners.
//!
//! Every screen change passes through the route guard: protected screens
//! need a valid stored session, and the login screen sends a signed-in user
//! straight to the owner list.

mod app;
mod cli;
mod form;
mod ui;

use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use eyesonasset_core::config::{ENV_PASSWORD, ENV_USERNAME};
use eyesonasset_core::Config;

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file prefix inside `<cache_dir>/logs`
const LOG_FILE_NAME: &str = "eyesonasset.log";

fn env_filter() -> EnvFilter {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to stderr, for the one-shot commands
fn init_tracing_stderr() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter())
        .init();
}

/// Log to a daily file; the terminal belongs to the UI. Keep the guard alive
/// until exit so buffered lines are flushed.
fn init_tracing_file(cache_dir: &Path) -> WorkerGuard {
    let appender = tracing_appender::rolling::daily(cache_dir.join("logs"), LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter())
        .init();
    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let mut config = Config::load()?;
    config.apply_env();
    config.validate()?;

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    if let Some(command) = args.get(1) {
        match command.as_str() {
            "--login" => {
                init_tracing_stderr();
                return cli::login(config).await;
            }
            "--logout" => {
                init_tracing_stderr();
                return cli::logout(&config);
            }
            "--status" => {
                init_tracing_stderr();
                return cli::status(&config);
            }
            "--help" | "-h" => {
                println!("{}", cli::USAGE);
                return Ok(());
            }
            other => {
                eprintln!("Unknown argument: {}\n\n{}", other, cli::USAGE);
                std::process::exit(2);
            }
        }
    }

    let _log_guard = init_tracing_file(&config.cache_dir()?);
    info!(api = %config.api_base_url, "EyesOnAsset TUI starting");

    // Create app before touching the terminal so setup errors print normally
    let mut app = App::new(config)?;
    let home = app.home_path();
    app.navigate(&home);
    app.prefill_login(std::env::var(ENV_USERNAME).ok(), std::env::var(ENV_PASSWORD).ok());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("EyesOnAsset TUI shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();
        app.check_session();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
