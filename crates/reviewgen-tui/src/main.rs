use std::fs::File;
use std::io;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use reviewgen_core::Category;
use reviewgen_service::GenerativeService;
use reviewgen_session::config::{GenerationArgs, ServiceArgs};
use reviewgen_session::{Clipboard, MemoryClipboard, SystemClipboard};
use reviewgen_tui::app::App;
use tracing::warn;
use tracing_subscriber::EnvFilter;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Parser)]
#[command(name = "reviewgen-tui", about = "Interactive review generator")]
struct TuiConfig {
    #[command(flatten)]
    service: ServiceArgs,

    #[command(flatten)]
    generation: GenerationArgs,

    /// Initial review category
    #[arg(short, long, default_value = "general_experience")]
    category: Category,
}

fn main() -> Result<()> {
    let config = TuiConfig::parse();
    init_logging()?;

    let presets = config
        .generation
        .load_presets()
        .context("failed to load presets")?;
    let session = config.generation.session_config(&config.service);
    let service = config.service.build_service();

    match SystemClipboard::new() {
        Ok(clipboard) => {
            let mut app = App::new(service, session, presets, clipboard)?;
            app.set_category(config.category);
            run_tui(app)
        }
        Err(e) => {
            warn!("system clipboard unavailable, copies stay in memory: {e}");
            let mut app = App::new(service, session, presets, MemoryClipboard::new())?;
            app.set_category(config.category);
            run_tui(app)
        }
    }
}

/// The terminal belongs to the UI, so logs only go to a file when asked.
fn init_logging() -> Result<()> {
    let Ok(path) = std::env::var("REVIEWGEN_LOG_FILE") else {
        return Ok(());
    };
    let file = File::create(&path).with_context(|| format!("failed to create log file {path}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run_tui<S, C>(app: App<S, C>) -> Result<()>
where
    S: GenerativeService + 'static,
    C: Clipboard,
{
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        eprintln!("Error: {e}");
    }

    result
}

fn event_loop<S, C>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App<S, C>,
) -> Result<()>
where
    S: GenerativeService + 'static,
    C: Clipboard,
{
    loop {
        app.tick(Instant::now());
        terminal.draw(|frame| app.render(frame))?;

        // Poll with a timeout while a generation or copy ack is pending,
        // block on the next key otherwise.
        if app.needs_polling() && !event::poll(POLL_INTERVAL)? {
            continue;
        }

        if let Event::Key(key) = event::read()? {
            // Ctrl+C always quits
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                break;
            }
            // q quits unless we're in an input mode
            if key.code == KeyCode::Char('q') && !app.is_input_mode() {
                break;
            }
            app.handle_key(key);
        }
    }

    Ok(())
}
