//! The three screens of the app.
//!
//! Screens own their state and a private message queue. The App (through
//! the [`Navigator`](crate::navigation::Navigator)) calls them in this order:
//!
//! 1. `init()` once, right after the screen is pushed
//! 2. `update()` to turn queued messages into [`ScreenMsg`]s
//! 3. for each event: `handle_tick()` or `handle_key()`, then `update()`
//! 4. `destroy()` when the screen is popped
//!
//! Every screen in the stack keeps getting `update()` calls, so a covered
//! screen still applies the results of its own requests.

mod breed_list;
mod breed_search;
mod image_display;

use std::fmt;
use std::sync::Arc;

use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use tracing::warn;

pub use breed_list::BreedListScreen;
pub use breed_search::BreedSearchScreen;
pub use image_display::ImageDisplayScreen;

use crate::Theme;
use crate::api::{DogApi, FetchError};
use crate::commands::Command;
use crate::config::{AppConfig, KeyResolver};
use crate::keyboard::Keyboard;
use crate::navigation::Route;
use crate::request::RequestPolicy;
use crate::ui::{EventResult, Keybinding, ToastType};

/// What a screen asks of the App.
pub enum ScreenMsg {
    Run(Vec<Box<dyn Command>>),
    Navigate(Route),
    Toast { message: String, toast_type: ToastType },
}

impl<T: Command> From<T> for ScreenMsg {
    fn from(value: T) -> Self {
        Self::Run(vec![Box::new(value)])
    }
}

impl fmt::Debug for ScreenMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Run(commands) => f
                .debug_tuple("Run")
                .field(&commands.iter().map(|c| c.name()).collect::<Vec<_>>())
                .finish(),
            Self::Navigate(route) => f.debug_tuple("Navigate").field(route).finish(),
            Self::Toast {
                message,
                toast_type,
            } => f
                .debug_struct("Toast")
                .field("message", message)
                .field("toast_type", toast_type)
                .finish(),
        }
    }
}

/// Knobs the screens read from the config.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScreenSettings {
    pub request_policy: RequestPolicy,
    pub show_fetch_errors: bool,
    pub render_images: bool,
}

impl From<&AppConfig> for ScreenSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            request_policy: config.requests.policy,
            show_fetch_errors: config.ui.show_fetch_errors,
            render_images: config.ui.images,
        }
    }
}

/// Shared handles every screen is built from.
#[derive(Clone)]
pub struct ScreenContext {
    pub api: Arc<dyn DogApi>,
    pub resolver: Arc<KeyResolver>,
    pub keyboard: Keyboard,
    pub settings: ScreenSettings,
}

pub trait Screen {
    /// The route this screen was created for.
    fn route(&self) -> Route;

    /// Queue startup messages.
    fn init(&mut self) {}

    /// Abandon outstanding work before the screen is dropped.
    fn destroy(&mut self) {}

    fn handle_tick(&mut self) {}

    fn handle_key(&mut self, key: KeyEvent) -> EventResult<()>;

    /// Process all queued messages.
    ///
    /// # Errors
    /// Returns an error if the screen ended up in a state it cannot handle.
    fn update(&mut self) -> Result<Vec<ScreenMsg>>;

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);

    /// Breadcrumb segments contributed by this screen.
    fn breadcrumbs(&self) -> Vec<String>;

    fn keybindings(&self) -> Vec<Keybinding> {
        vec![]
    }
}

/// Log a failed fetch and, when enabled, turn it into an error toast.
fn report_failure(what: &str, error: &FetchError, settings: ScreenSettings) -> Vec<ScreenMsg> {
    warn!(%error, "{what} failed");
    if settings.show_fetch_errors {
        vec![ScreenMsg::Toast {
            message: format!("{what} failed: {error}"),
            toast_type: ToastType::Error,
        }]
    } else {
        Vec::new()
    }
}
