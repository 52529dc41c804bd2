//! Portfolio - terminal portfolio with a typewriter banner
//!
//! `show` runs the TUI banner; `serve` runs the tiny greeting backend.

mod config;
mod core;
mod frontend;
mod network;
mod storage;

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use frontend::Frontend;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(ClapParser)]
#[command(name = "portfolio")]
#[command(about = "Terminal portfolio with a typewriter banner", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Custom data directory (default: ~/.portfolio)
    /// Can also be set via PORTFOLIO_DIR environment variable
    #[arg(long, value_name = "DIR", global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the greeting backend
    Serve {
        /// Port to listen on (default: from config, 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Show the typing banner (default)
    Show {
        /// Language code to start with; saved like a button click
        #[arg(short, long, value_name = "CODE")]
        lang: Option<String>,
    },
}

fn env_filter(default: &str) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default))
}

/// Console logging for the backend
fn init_console_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter("info"))
        .with_writer(std::io::stderr)
        .init();
}

/// File logging for the TUI (use RUST_LOG to control level, e.g. RUST_LOG=debug)
fn init_file_logging() -> Result<()> {
    // TUI apps can't log to stdout, so we write to a file
    let log_path = config::Config::log_path()?;
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create data dir: {:?}", parent))?;
    }
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .context(format!("Failed to open log file: {:?}", log_path))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter("debug"))
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false) // No color codes in log file
        .init();
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<config::Config> {
    match path {
        Some(path) => config::Config::load_from_path(path),
        None => config::Config::load(),
    }
}

fn main() -> Result<()> {
    let Cli {
        config: config_path,
        data_dir,
        command,
    } = Cli::parse();

    // Set custom data directory if specified (via CLI or environment variable)
    if let Some(data_dir) = &data_dir {
        std::env::set_var(config::DATA_DIR_ENV, data_dir);
    }

    match command.unwrap_or(Commands::Show { lang: None }) {
        Commands::Serve { port } => {
            init_console_logging();
            let config = load_config(config_path.as_deref())?;
            run_server(port.unwrap_or(config.server.port))
        }
        Commands::Show { lang } => {
            init_file_logging()?;
            if let Some(data_dir) = &data_dir {
                tracing::info!("Using custom data directory: {:?}", data_dir);
            }
            let config = load_config(config_path.as_deref())?;
            run_tui(config, lang)
        }
    }
}

/// Run the greeting backend until Ctrl+C
fn run_server(port: u16) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let server = network::GreetingServer::bind(SocketAddr::from(([0, 0, 0, 0], port))).await?;

        tokio::select! {
            result = server.run() => result,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down backend");
                Ok(())
            }
        }
    })
}

/// Run TUI frontend
fn run_tui(config: config::Config, lang: Option<String>) -> Result<()> {
    // Drivers and the storage watcher are tokio tasks
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async_run_tui(config, lang))
}

/// Async TUI main loop
async fn async_run_tui(config: config::Config, lang: Option<String>) -> Result<()> {
    use crate::core::AppCore;
    use crate::frontend::TuiFrontend;
    use crate::storage::{PreferenceStore, StorageWatcher};

    let store = PreferenceStore::new(config::Config::storage_path()?);
    tracing::debug!("Preferences stored in {:?}", store.path());
    let storage_poll = config.storage.poll_interval();
    let poll_timeout = Duration::from_millis(config.ui.poll_timeout_ms);

    // Create core application state before touching the terminal so config
    // errors print normally
    let mut app_core = AppCore::new(config, store.clone(), lang.as_deref())?;

    // External edits to storage.toml arrive here
    let (_watcher, mut storage_rx) = StorageWatcher::spawn(store, storage_poll);

    let mut frontend = TuiFrontend::new()?;
    frontend.set_poll_timeout(poll_timeout);
    let (width, height) = frontend.size();
    tracing::debug!("Terminal size {}x{}", width, height);

    // Main event loop
    while app_core.running {
        // Poll for frontend events (keyboard, mouse, resize)
        let events = frontend.poll_events()?;
        for event in events {
            app_core.handle_event(event);
        }

        while let Ok(event) = storage_rx.try_recv() {
            app_core.handle_storage_event(event);
        }

        app_core.refresh();
        if app_core.needs_render {
            frontend.render(&mut app_core)?;
        }
    }

    frontend.cleanup()?;
    tracing::info!("Exited cleanly");
    Ok(())
}
