//! BasketLab TUI — pick a strategy and a basket, run, read the PnL chart.
//!
//! Panels:
//! 1. Baskets — basket selector
//! 2. Strategies — strategy selector
//! 3. Results — PnL chart, rows, total
//! 4. Help — keyboard shortcuts

use std::fs::{self, File};
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use basketlab_client::{default_config_path, ClientConfig, HttpService, API_URL_ENV};
use basketlab_tui::app::AppState;
use basketlab_tui::worker::{self, WorkerCommand};
use basketlab_tui::{input, ui};

#[derive(Parser)]
#[command(
    name = "basketlab-tui",
    about = "BasketLab TUI — pick a strategy and a basket, run, read the PnL chart"
)]
struct Args {
    /// Path to a TOML config file. Defaults to <config_dir>/basketlab/config.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Service base URL. Overrides the config file and BASKETLAB_API_URL.
    #[arg(long)]
    api_url: Option<String>,
}

fn main() -> Result<()> {
    // Parse before touching the terminal so --help and usage errors print normally.
    let args = Args::parse();

    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let default_path = dirs::config_dir().map(|d| default_config_path(&d));
    let config = ClientConfig::resolve(
        args.config.as_deref(),
        default_path.as_deref(),
        std::env::var(API_URL_ENV).ok(),
        args.api_url,
    )
    .context("load configuration")?;

    let log_path = config.log_file.clone().unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("basketlab")
            .join("basketlab.log")
    });
    init_logging(&log_path)?;
    info!(api_url = %config.api_url, log = %log_path.display(), "basketlab tui starting");

    let service = HttpService::new(&config).context("build HTTP client")?;

    // Worker channels
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let worker_handle = worker::spawn_worker(Box::new(service), cmd_rx, resp_tx);

    let mut app = AppState::new(cmd_tx.clone(), resp_rx);
    app.request_catalog();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    // Shutdown worker. A run still in flight finishes on its own; nothing waits for it.
    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    drop(app);
    if !worker_handle.is_finished() {
        info!("worker busy at exit; detaching");
    } else {
        let _ = worker_handle.join();
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("basketlab tui stopped");
    result
}

fn init_logging(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create log dir {}", dir.display()))?;
    }
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        // 1. Render
        terminal.draw(|f| ui::draw(f, app))?;

        // 2. Drain worker responses (non-blocking)
        app.drain_worker();

        // 3. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        // 4. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_means_defaults() {
        let args = Args::try_parse_from(["basketlab-tui"]).unwrap();
        assert!(args.config.is_none());
        assert!(args.api_url.is_none());
    }

    #[test]
    fn config_and_api_url_flags() {
        let args = Args::try_parse_from([
            "basketlab-tui",
            "--config",
            "/tmp/basketlab.toml",
            "--api-url",
            "http://10.0.0.5:8000",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("/tmp/basketlab.toml")));
        assert_eq!(args.api_url.as_deref(), Some("http://10.0.0.5:8000"));
    }

    #[test]
    fn help_is_not_read_as_a_config_path() {
        let err = Args::try_parse_from(["basketlab-tui", "--help"]).err().unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn bare_positional_is_rejected() {
        assert!(Args::try_parse_from(["basketlab-tui", "config.toml"]).is_err());
    }
}
