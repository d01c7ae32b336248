use anyhow::Context;
use chatline::{
    api::HttpChatBackend,
    config::initialize_config,
    logging::{default_log_dir, init_logging, LogTarget},
    plain::run_plain,
    ui::run_ui,
    App,
};
use std::io::{self, IsTerminal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let plain = std::env::args().skip(1).any(|arg| arg == "--plain") || !io::stdout().is_terminal();

    let loaded = initialize_config().context("Failed to load configuration")?;
    let config = loaded.config;

    // The terminal UI owns the screen, so it logs to a file.
    let target = if plain {
        LogTarget::Stderr
    } else {
        let dir = match &config.log_dir {
            Some(dir) => dir.clone(),
            None => default_log_dir()?,
        };
        LogTarget::File(dir)
    };
    let _logger =
        init_logging(config.log_level.as_deref(), target).context("Failed to start logging")?;
    if loaded.created {
        log::info!("Wrote default config to {}", loaded.path.display());
    }

    let backend = HttpChatBackend::new(&config.server_url);
    log::info!("Chatting with {}", backend.endpoint());

    if plain {
        run_plain(backend).await?;
    } else {
        run_ui(App::new(backend, config.server_url.clone()))
            .await
            .context("Terminal UI failed")?;
    }

    Ok(())
}
