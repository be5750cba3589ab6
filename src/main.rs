use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod app;
mod client;
mod config;
mod handler;
mod tui;
mod ui;

use app::App;
use client::ReplyClient;
use config::Config;

#[derive(Parser)]
#[command(name = "careerchat")]
#[command(about = "Terminal chat client for the Career Guide reply service")]
struct Cli {
    /// Base URL of the reply service
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Write diagnostics to this file instead of the default location
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a single message and print the reply
    Send {
        /// The message to send
        message: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log_file.as_deref())?;

    let config = Config::load().unwrap_or_default();
    let endpoint = config.resolve_endpoint(cli.endpoint.as_deref());
    let client = ReplyClient::new(&endpoint);

    match cli.command {
        Some(Commands::Send { message }) => {
            let reply = client.send(&message).await?;
            println!("{}", reply);
            Ok(())
        }
        None => run_tui(client).await,
    }
}

/// The TUI owns the terminal, so diagnostics go to a file.
fn init_logging(path: Option<&Path>) -> Result<()> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => dirs::config_dir()
            .ok_or_else(|| anyhow!("could not determine config directory"))?
            .join("careerchat")
            .join("careerchat.log"),
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

async fn run_tui(client: ReplyClient) -> Result<()> {
    tracing::info!(endpoint = client.base_url(), "starting chat session");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();
    let mut app = App::new(client);

    let result = run_loop(&mut terminal, &mut events, &mut app).await;

    tui::restore()?;
    result
}

async fn run_loop(
    terminal: &mut tui::Tui,
    events: &mut tui::EventHandler,
    app: &mut App,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }

        // Finished exchanges land in the transcript here; the tick event
        // keeps this loop turning while requests are outstanding
        app.drain_exchanges().await;
    }
    Ok(())
}
