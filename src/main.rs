//! fplwatch - fantasy premier league prices, fixtures and live scores
//!
//! A terminal dashboard over the public fantasy premier league API, a
//! plain-text summary, and a small proxy with daily price snapshots.

use std::io;
use std::panic;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::Backend, backend::CrosstermBackend, Terminal};
use tracing::info;

use fplwatch::app::{App, AppState};
use fplwatch::cli::{Cli, Command, StartupConfig};
use fplwatch::clock::{Clock, SystemClock};
use fplwatch::config::AppConfig;
use fplwatch::data::FplClient;
use fplwatch::proxy::{ProxyServer, ProxyState};
use fplwatch::refresh::RefreshController;
use fplwatch::store::FileStore;
use fplwatch::views::build_dashboard;
use fplwatch::{logging, summary, ui};

type Controller = RefreshController<FileStore, FplClient, SystemClock>;

/// Sets up a panic hook that restores the terminal before printing the panic message.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

/// Renders the UI based on the current application state
fn render_ui(frame: &mut ratatui::Frame, app: &App) {
    match app.state {
        AppState::Loading => render_loading(frame),
        AppState::Dashboard => ui::render_dashboard(frame, app, Utc::now()),
    }
    if app.show_help {
        ui::render_help_overlay(frame);
    }
}

/// Renders a loading message while data is being fetched
fn render_loading(frame: &mut ratatui::Frame) {
    use ratatui::{
        layout::{Alignment, Constraint, Direction, Layout},
        style::{Color, Style},
        widgets::Paragraph,
    };

    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(3),
            Constraint::Percentage(45),
        ])
        .split(area);

    let loading_text = Paragraph::new("Loading league data...")
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);

    frame.render_widget(loading_text, chunks[1]);
}

fn build_client(config: &AppConfig) -> Result<FplClient> {
    let client = FplClient::build(&config.user_agent, config.timeout())
        .context("failed to build HTTP client")?;
    Ok(client.with_base_url(&config.api_base_url))
}

fn build_controller(config: &AppConfig) -> Result<Controller> {
    let cache_dir = config.resolved_cache_dir()?;
    Ok(RefreshController::new(
        FileStore::with_dir(cache_dir),
        build_client(config)?,
        SystemClock,
    )
    .with_policy(config.policy()))
}

async fn refresh(app: &mut App, controller: &Controller) {
    let outcome = controller.refresh_dashboard().await;
    info!(source = ?outcome.source, notice = ?outcome.notice, "dashboard refreshed");
    app.apply_outcome(outcome, controller.clock().now());
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    controller: &Controller,
) -> Result<()> {
    terminal.draw(|f| render_ui(f, app))?;
    refresh(app, controller).await;

    loop {
        terminal.draw(|f| render_ui(f, app))?;

        // Poll with a short timeout so the countdown keeps ticking
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.refresh_requested {
            refresh(app, controller).await;
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

async fn run_dashboard(config: &AppConfig, startup: StartupConfig) -> Result<()> {
    let cache_dir = config.resolved_cache_dir()?;
    let log_path = logging::init_file(&cache_dir)
        .with_context(|| format!("failed to open log file in {}", cache_dir.display()))?;
    info!(log = %log_path.display(), "starting dashboard");

    let controller = build_controller(config)?;
    let mut app = App::with_startup_config(startup, config.view_options());

    setup_panic_hook();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &controller).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}

async fn run_summary(config: &AppConfig) -> Result<()> {
    logging::init_stderr();
    let controller = build_controller(config)?;

    let outcome = controller.refresh_dashboard().await;
    print!("{}", summary::render_status(&outcome));

    let data = outcome
        .data
        .as_ref()
        .context("no league data available")?;
    let now = controller.clock().now();
    let dashboard = build_dashboard(data, now, config.view_options());
    println!();
    print!("{}", summary::render_dashboard(&dashboard, now));
    Ok(())
}

async fn run_serve(config: &AppConfig) -> Result<()> {
    logging::init_stderr();
    let addr = config.listen_socket()?;
    let snapshot_dir = config.resolved_snapshot_dir()?;
    info!(snapshots = %snapshot_dir.display(), "snapshot store ready");

    let state = ProxyState::new(
        build_client(config)?,
        Arc::new(FileStore::with_dir(snapshot_dir)),
        Arc::new(SystemClock),
    );
    ProxyServer::new(state)
        .run(addr)
        .await
        .with_context(|| format!("proxy server on {} failed", addr))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let startup = StartupConfig::from_cli(&cli)?;

    let config = cli.apply_to(AppConfig::load()?);
    config.validate()?;

    match cli.command() {
        Command::Dashboard { .. } => run_dashboard(&config, startup).await,
        Command::Summary => run_summary(&config).await,
        Command::Serve { .. } => run_serve(&config).await,
    }
}
