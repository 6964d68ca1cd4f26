use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::DogCeoClient;
use crate::app::App;
use crate::config::KeyResolver;
use crate::keyboard::Keyboard;
use crate::screen::{ScreenContext, ScreenSettings};

mod api;
mod app;
mod cli;
mod commands;
mod config;
mod keyboard;
mod navigation;
mod request;
mod screen;
mod search;
#[cfg(test)]
mod testing;
mod theme;
mod tui;
mod ui;

pub use theme::Theme;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _guard = initialize_logging()?;
    info!("Starting lazydog");

    let args = cli::Args::parse();

    let mut config = config::load(args.config.as_deref())?;
    args.apply(&mut config);

    let resolver = Arc::new(KeyResolver::new(Arc::new(config.keybindings.clone())));
    let theme = theme::theme_from_name(&config.theme.name);
    let api = Arc::new(DogCeoClient::new(&config.api.base_url, config.api.timeout())?);

    let context = ScreenContext {
        api,
        resolver,
        keyboard: Keyboard::new(),
        settings: ScreenSettings::from(&config),
    };

    let mut app = App::new(context, args.start.into(), theme);
    app.run().await?;

    Ok(())
}

fn initialize_logging() -> Result<WorkerGuard> {
    let directory = dirs::data_local_dir().map_or_else(
        || std::path::PathBuf::from("logs"),
        |path| path.join("lazydog").join("logs"),
    );
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::daily(&directory, "lazydog.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lazydog=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .init();

    Ok(guard)
}
