//! Attendance - a terminal login client for the attendance tracker.
//!
//! Shows a login form until the gateway issues a session, then the signed-in
//! user. The session is kept between runs until logout or token expiry.

mod ui;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use attendance_core::{App, AppContext, Config, View};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ui::input::handle_input;
use ui::render::render;
use ui::state::{Mode, UiState};

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Prefills for the login form
const USERNAME_ENV: &str = "ATTENDANCE_USERNAME";
const PASSWORD_ENV: &str = "ATTENDANCE_PASSWORD";

fn env_filter() -> EnvFilter {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to stderr for the non-interactive commands
fn init_stderr_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter())
        .init();
}

/// Log to a daily file while the terminal belongs to the UI.
/// The returned guard flushes the writer when dropped.
fn init_file_tracing(cache_dir: &Path) -> WorkerGuard {
    let appender = tracing_appender::rolling::daily(cache_dir.join("logs"), "attendance.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter())
        .init();
    guard
}

fn load_config() -> Config {
    match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config, using defaults: {}", e);
            Config::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = load_config();
    let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    if let Some(command) = args.get(1) {
        init_stderr_tracing();
        let ctx = AppContext::from_config(config, &cache_dir)?;
        return match command.as_str() {
            "--status" => print_status(ctx),
            "--logout" => logout(ctx),
            "--login" => login_interactive(ctx).await,
            other => Err(anyhow::anyhow!(
                "Unknown option '{}'. Expected --status, --login or --logout",
                other
            )),
        };
    }

    let _guard = init_file_tracing(&cache_dir);
    info!("Attendance client starting");

    let username = std::env::var(USERNAME_ENV)
        .ok()
        .or_else(|| config.last_username.clone())
        .unwrap_or_default();
    let password = std::env::var(PASSWORD_ENV).unwrap_or_default();

    let ctx = AppContext::from_config(config, &cache_dir)?;
    let mut state = UiState::new(App::start(ctx), username, password);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut state).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("Attendance client shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut UiState,
) -> Result<()> {
    loop {
        terminal.draw(|f| render(f, state))?;

        // The frame above shows "Logging in..."; now send the request
        if matches!(state.mode, Mode::Submitting) {
            state.finish_login().await;
            continue;
        }

        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(state, key).await? {
                    return Ok(());
                }
            }
        }

        if matches!(state.mode, Mode::Quitting) {
            return Ok(());
        }
    }
}

// ============================================================================
// Command-line modes
// ============================================================================

/// Print the stored session, if any
fn print_status(ctx: AppContext) -> Result<()> {
    let app = App::start(ctx);
    match app.session() {
        Some(session) => {
            println!("Logged in.");
            if let Some(ref version) = session.backend_version {
                println!("Backend version: {}", version);
            }
            println!("{}", serde_json::to_string_pretty(&session.user)?);
        }
        None => println!("Not logged in."),
    }
    Ok(())
}

fn logout(ctx: AppContext) -> Result<()> {
    let mut app = App::start(ctx);
    app.logout().context("Failed to clear stored session")?;
    println!("Logged out.");
    Ok(())
}

/// Prompt on the terminal and run the same login flow as the form
async fn login_interactive(ctx: AppContext) -> Result<()> {
    let mut app = App::start(ctx);
    if app.view() == View::LoggedIn {
        println!("Already logged in. Use --logout first to switch users.");
        return Ok(());
    }

    println!("\n=== Attendance Login ===\n");
    let username = match app.context().config.last_username.clone() {
        Some(last_user) => {
            let input = prompt(&format!("Username [{}]: ", last_user))?;
            if input.is_empty() { last_user } else { input }
        }
        None => prompt("Username: ")?,
    };
    let password = rpassword::prompt_password("Password: ")?;

    println!("\nAuthenticating...");
    let result = app.submit(&username, &password).await;
    if let Some(status) = app.status() {
        println!("{}", status.text);
    }

    if result.is_ok() {
        let config = &mut app.context_mut().config;
        config.last_username = Some(username.trim().to_string());
        if let Err(e) = config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }
    result.map_err(anyhow::Error::from)
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}
