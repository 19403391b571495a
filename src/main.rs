use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use anyhow::Result;
use clap::{ArgAction, Parser};
use tracing::{error, info};

use contract_chat::config::{Config, API_URL_ENV};
use contract_chat::tui::{self, EventHandler, Tui};
use contract_chat::{handler, logging, ui, App, HttpApi};

#[derive(Parser)]
#[command(name = "contract-chat", version)]
#[command(about = "Upload a contract and ask questions about it")]
struct Cli {
    /// Base URL of the contract agent backend
    #[arg(long)]
    api_url: Option<String>,

    /// PDF to upload on start
    #[arg(short, long)]
    document: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Remember the resolved backend URL in the config file
    #[arg(long)]
    save_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|_| Config::new());

    let level = logging::level_for(cli.verbose, config.log_level.as_deref());
    let _log_guard = logging::init_or_warn(logging::log_dir(), logging::filter_for(&level));

    let env_url = std::env::var(API_URL_ENV).ok();
    let api_url = config.resolve_api_url(cli.api_url.as_deref(), env_url.as_deref());
    info!(%api_url, "starting contract-chat");

    if cli.save_config {
        config.api_base_url = Some(api_url.clone());
        config.save()?;
    }

    let api = HttpApi::new(&api_url, config.request_timeout())?;
    let mut app = App::new(Arc::new(api));

    if let Some(path) = cli.document {
        app.process_file(path);
    }

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app).await;
    tui::restore()?;

    if let Err(e) = &result {
        error!("exiting with error: {:#}", e);
    }
    result
}

async fn run(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new(Duration::from_millis(300));

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }

        app.poll_pending().await;
    }

    Ok(())
}
