use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::AppConfig;
use crate::navigation::Route;

#[derive(Parser, Debug)]
#[command(name = "lazydog", version, about = "Browse dog breeds and their pictures")]
pub struct Args {
    /// Config file to use instead of the default location
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base URL of the Dog CEO API
    #[arg(long)]
    pub api_url: Option<String>,

    /// Theme name (e.g., "Catppuccin Latte")
    #[arg(short, long)]
    pub theme: Option<String>,

    /// Only show picture URLs, never download the pixels
    #[arg(long)]
    pub no_images: bool,

    /// Screen to start on
    #[arg(short, long, value_enum, default_value_t = StartScreen::List)]
    pub start: StartScreen,

    /// Report failed requests on screen instead of only logging them
    #[arg(long)]
    pub show_errors: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartScreen {
    List,
    Search,
}

impl From<StartScreen> for Route {
    fn from(start: StartScreen) -> Self {
        match start {
            StartScreen::List => Self::List,
            StartScreen::Search => Self::Search,
        }
    }
}

impl Args {
    /// Command line flags win over the config file.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(url) = &self.api_url {
            config.api.base_url.clone_from(url);
        }
        if let Some(theme) = &self.theme {
            config.theme.name.clone_from(theme);
        }
        if self.no_images {
            config.ui.images = false;
        }
        if self.show_errors {
            config.ui.show_fetch_errors = true;
        }
    }
}
