//! Blog Admin - a terminal client for administering a blog backend.
//!
//! Keyboard-driven management of posts and comments for an operator with an
//! admin account. Run without arguments for the TUI, or with one of the
//! `--login`, `--logout`, `--status` commands.

mod app;
mod ui;

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use blogadmin_core::api::{AdminClient, ApiClient, ApiError};
use blogadmin_core::auth::SessionManager;
use blogadmin_core::config::Config;
use blogadmin_core::utils::format_remaining;

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

const LOG_FILE_NAME: &str = "blogadmin.log";

const USAGE: &str = "\
Usage: blogadmin [COMMAND]

Commands:
  (none)      Start the terminal interface
  --login     Log in from the command line and store the credential
  --logout    Forget the stored credential
  --status    Check the stored credential against the backend
  --help      Show this message

Environment:
  BLOG_ADMIN_BASE_URL   Backend base URL (default http://localhost:3000)
  BLOG_ADMIN_EMAIL      Pre-fill the login email
  BLOG_ADMIN_PASSWORD   Pre-fill the login password
  RUST_LOG              Log filter (default warn)";

fn env_filter() -> EnvFilter {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to stderr; used by the one-shot commands.
fn init_cli_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter())
        .init();
}

/// Log to a file in the data directory; stderr would corrupt the terminal.
///
/// The returned guard flushes the writer when dropped.
fn init_tui_tracing(config: &Config) -> Result<WorkerGuard> {
    let log_dir = config.data_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let appender = tracing_appender::rolling::never(&log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter())
        .init();

    Ok(guard)
}

/// Build the process-wide session and the client that goes through it.
fn build_client(config: &Config) -> Result<AdminClient> {
    let api = ApiClient::from_config(config).context("Failed to create HTTP client")?;
    let store = config.token_store()?;
    let session = SessionManager::new(store, Arc::new(api.clone()));
    Ok(AdminClient::new(api, session))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::load().context("Failed to load configuration")?;

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        None => {}
        Some("--help") | Some("-h") => {
            println!("{}", USAGE);
            return Ok(());
        }
        Some(command) => {
            init_cli_tracing();
            let client = build_client(&config)?;
            return match command {
                "--login" => login_command(config, &client).await,
                "--logout" => logout_command(&client),
                "--status" => status_command(&client).await,
                other => {
                    eprintln!("Unknown option: {}\n\n{}", other, USAGE);
                    std::process::exit(2);
                }
            };
        }
    }

    let _log_guard = init_tui_tracing(&config)?;
    info!(base_url = %config.backend_url(), "Blog Admin starting");

    let client = build_client(&config)?;
    // Confirm a stored credential before the first screen is drawn
    client.session().validate_verified().await;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, client);
    app.start();

    // Main loop
    let result = run_app(&mut terminal, &mut app);

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

    info!("Blog Admin shutting down");
    Ok(())
}

/// Prompt for email and password, then store the issued credential
async fn login_command(mut config: Config, client: &AdminClient) -> Result<()> {
    println!("\n=== Blog Admin Login ({}) ===\n", client.api().base_url());

    let email = match config.login_email().map(str::to_string) {
        Some(last) => {
            let input = prompt(&format!("Email [{}]: ", last))?;
            if input.is_empty() {
                last
            } else {
                input
            }
        }
        None => prompt("Email: ")?,
    };

    let password = match config.login_password() {
        Some(password) => password.to_string(),
        None => rpassword::prompt_password("Password: ")?,
    };

    println!("\nAuthenticating...");
    match client.authenticate(&email, &password).await {
        Ok(()) => {}
        Err(ApiError::Unauthorized) => anyhow::bail!("Invalid email or password"),
        Err(e) => return Err(e).context("Login failed"),
    }

    config.last_email = Some(email);
    config.save()?;

    println!("Login successful!");
    if let Some(expiry) = client.session().expires_at() {
        println!("Session expires in {}", format_remaining(expiry, Utc::now()));
    }
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn logout_command(client: &AdminClient) -> Result<()> {
    client.logout();
    println!("Logged out.");
    Ok(())
}

/// Validate the stored credential and wait for the backend's answer
async fn status_command(client: &AdminClient) -> Result<()> {
    println!("Backend: {}", client.api().base_url());

    match client.session().validate_verified().await {
        Some(_) => {
            let remaining = client
                .session()
                .expires_at()
                .map(|expiry| format_remaining(expiry, Utc::now()))
                .unwrap_or_else(|| "unknown".to_string());
            println!("Logged in (expires in {})", remaining);
        }
        None => println!("Not logged in. Run `blogadmin --login`."),
    }
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key) {
                    return Ok(());
                }
            }
        }

        // Apply finished background work and session changes
        app.check_background_tasks();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
