use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use zomato_chat_core::config::{API_PREFIX_ENV, BACKEND_URL_ENV};
use zomato_chat_core::{BackendClient, Config};

mod app;
mod handler;
mod scroll;
mod tui;
mod ui;

use app::App;

/// Terminal chat client for the Zomato AI assistant 🍕
#[derive(Parser, Debug)]
#[command(name = "zomato-chat")]
#[command(version, about, long_about = None)]
struct Args {
    /// Backend base URL
    #[arg(long, env = BACKEND_URL_ENV)]
    backend_url: Option<String>,

    /// Path prefix of the chat API on the backend
    #[arg(long, env = API_PREFIX_ENV)]
    api_prefix: Option<String>,

    /// Write the effective backend settings to the config file
    #[arg(long)]
    save_config: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug)
    #[arg(short = 'd', long)]
    debug: bool,

    /// Log file (the terminal belongs to the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args)?;

    let config = resolve_config(&args)?;
    if args.save_config {
        config.save()?;
        tracing::info!(path = %Config::get_config_path()?.display(), "saved config");
    }

    let api_base = config.api_base();
    tracing::info!(%api_base, "starting zomato-chat");

    let mut app = App::new(BackendClient::new(&api_base));
    app.check_health();

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = run(&mut terminal, &mut app).await;

    tui::restore()?;

    if let Err(e) = &result {
        tracing::error!("exiting with error: {:#}", e);
    }
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    let mut events = tui::EventHandler::new(tui::TICK_RATE);

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }

        app.poll_tasks().await;
    }

    Ok(())
}

/// Config file, then environment, then command line.
fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = Config::load().context("loading config")?.apply_env();

    if let Some(url) = &args.backend_url {
        config.backend_url = Some(url.clone());
    }
    if let Some(prefix) = &args.api_prefix {
        config.api_prefix = Some(prefix.clone());
    }

    Ok(config)
}

fn init_logging(args: &Args) -> Result<()> {
    let log_path = match &args.log_file {
        Some(path) => path.clone(),
        None => dirs::data_dir()
            .ok_or_else(|| anyhow!("Could not determine data directory"))?
            .join("zomato-chat")
            .join("zomato-chat.log"),
    };

    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("opening log file {}", log_path.display()))?;

    let default_filter = if args.debug {
        "debug,hyper=info,reqwest=info"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();

    Ok(())
}
