//! podcast-cli - 命令行工具
//!
//! 浏览节目列表并在终端中播放

mod browse;
mod cli;
mod player;

use anyhow::{Context, Result};
use clap::Parser;
use podcast_api::ApiClient;
use podcast_config::AppConfig;

use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();

    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Warn)
        .env()
        .with_colors(true)
        .with_threads(true)
        .with_local_timestamps()
        .init()
        .context("failed to build logger instance")?;

    let config = load_config(&cli)?;
    let source = ApiClient::new(&config.api);
    log::info!("using episode API at {}", source.base_url());

    match cli.command {
        Command::List { limit } => browse::list(
            &source,
            limit.unwrap_or(config.listing.page_size),
            config.listing.latest_count,
        ),
        Command::Show { id } => browse::show(&source, &id),
        Command::Play { ids, latest, start } => {
            let queue =
                player::build_queue(&source, &ids, latest.unwrap_or(config.listing.page_size))?;
            player::play(queue, start, config.engine)
        }
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    match &cli.config {
        Some(path) => {
            let mut config = podcast_config::load_from(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?;
            config.apply_overrides(|key| std::env::var(key).ok());
            Ok(config)
        }
        None => podcast_config::load_config().context("failed to load configuration"),
    }
}
