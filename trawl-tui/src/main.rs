mod app;
mod bootstrap;
mod cli;
mod config;
mod filter;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::CrosstermBackend;
use ratatui::Terminal;

use app::{App, Mode, Pane};
use config::Settings;

/// Terminal search console over a trawl query backend.
///
/// Without a subcommand, launches the interactive TUI: type a query, pick a
/// data source in the selector, and the active search is re-run with the
/// new filter. Use `search` for scripting.
///
/// The backend must publish `config.json` (clientId, searchAppId) next to
/// its query API.
///
/// Output is auto-JSON when stdout is piped (for agents). Force with --json.
#[derive(Parser, Debug)]
#[command(name = "trawl", version)]
struct Args {
    /// Backend base URL serving config.json and the query API
    #[arg(long, global = true, env = "TRAWL_URL")]
    url: Option<String>,

    /// Token endpoint URL (default: {url}/auth/token)
    #[arg(long, global = true, env = "TRAWL_AUTH_URL")]
    auth_url: Option<String>,

    /// Predefined source id to offer in the selector (repeatable)
    #[arg(long = "source", global = true)]
    sources: Vec<String>,

    /// Force JSON output (auto-enabled when stdout is piped)
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Launch the interactive search console
    Tui,

    /// Run a single filtered query and print the results
    Search {
        /// Query text
        query: String,

        /// Restrict to one predefined source id (or ALL)
        #[arg(long)]
        source: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Tracing to stderr — never pollutes stdout
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let settings = Settings::load();
    let json = cli::use_json(args.json);

    if let Err(e) = run(args, settings).await {
        cli::handle_error(e, json);
    }
}

async fn run(args: Args, settings: Settings) -> Result<()> {
    let base_url = args
        .url
        .clone()
        .or(settings.url.clone())
        .context("No backend URL configured. Pass --url or set `url` in ~/.trawl.toml")?;
    let auth_url = args.auth_url.clone().or(settings.auth_url.clone());

    match args.command {
        None | Some(Command::Tui) => {
            let mut sources = settings.sources.clone();
            sources.extend(args.sources.clone());

            let app = bootstrap::init(bootstrap::BootstrapParams {
                base_url,
                auth_url,
                sources,
            })
            .await?;
            run_tui(app).await
        }
        Some(Command::Search { query, source }) => {
            let backend = bootstrap::connect(&base_url, auth_url).await?;
            bootstrap::authorize(&backend).await?;
            cli::search(
                backend.client.as_ref(),
                &backend.config.search_application_id,
                &query,
                source.as_deref(),
                cli::use_json(args.json),
            )
            .await
        }
    }
}

/// Restores the terminal via [`Drop`], so a panic inside the event loop
/// cannot leave raw mode enabled.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        io::stdout().execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = io::stdout().execute(LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = io::stdout().execute(LeaveAlternateScreen);
        original_hook(info);
    }));
}

async fn run_tui(mut app: App) -> Result<()> {
    install_panic_hook();
    let mut guard = TerminalGuard::new()?;
    run_loop(&mut guard.terminal, &mut app).await
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        app.drain_widget_events();
        terminal.draw(|frame| ui::draw(frame, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                match app.mode {
                    Mode::Normal => handle_normal_key(app, key),
                    Mode::Query => handle_query_key(app, key),
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true
        }
        KeyCode::Char('/') => app.enter_query_mode(),
        KeyCode::Tab => app.toggle_pane(),
        KeyCode::Up | KeyCode::Char('k') => app.move_up(),
        KeyCode::Down | KeyCode::Char('j') => app.move_down(),
        KeyCode::Enter => app.activate_selection(),
        KeyCode::Char('s') => {
            app.active_pane = Pane::Sources;
        }
        _ => {}
    }
}

fn handle_query_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_query(),
        KeyCode::Esc => app.cancel_query(),
        KeyCode::Tab => app.search_box.accept_first_suggestion(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true
        }
        KeyCode::Backspace => app.search_box.backspace(),
        KeyCode::Char(c) => app.search_box.insert_char(c),
        _ => {}
    }
}
