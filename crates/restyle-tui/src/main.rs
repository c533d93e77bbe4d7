use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use restyle_core::{Config, IntakeSource};
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "restyle")]
#[command(version, about = "Restyle an image with a text prompt using a remote generation backend")]
struct Cli {
    /// Image to stage at startup
    image: Option<PathBuf>,

    /// Backend base URL (the request goes to <URL>/api/v1/generate)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Remember --endpoint in the config file
    #[arg(long, requires = "endpoint")]
    save_endpoint: bool,

    /// Give up on a generation request after this many seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Where saved results are written
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Log level when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = Some(endpoint.clone());
        }
        if let Some(timeout) = self.timeout {
            config.request_timeout_secs = Some(timeout);
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = Some(dir.clone());
        }
        if let Some(level) = &self.log_level {
            config.log_level = Some(level.clone());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, config_err) = match Config::load() {
        Ok(config) => (config, None),
        Err(err) => (Config::new(), Some(err)),
    };
    cli.apply(&mut config);

    let level = config.log_level.clone().unwrap_or_else(|| "info".to_string());
    let log_path = logging::init(&level)?;
    tracing::info!(log = %log_path.display(), endpoint = %config.endpoint(), "restyle starting");
    if let Some(err) = config_err {
        tracing::warn!(error = %err, "could not load config, using defaults");
    }

    if cli.save_endpoint {
        if let Some(endpoint) = &cli.endpoint {
            Config::save_endpoint(endpoint)?;
        }
    }

    let mut app = App::new(config)?;
    if let Some(image) = cli.image {
        app.open_file(image, IntakeSource::CommandLine);
    }

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = run(&mut terminal, &mut app).await;

    app.shutdown();
    tui::restore()?;
    tracing::info!("restyle exiting");

    result
}

async fn run(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }

    Ok(())
}
