//! Async commands pattern for side effects.
//!
//! Commands represent async operations that run outside the main event loop.
//! Screens return commands from `update()`, the App spawns them, and the
//! commands report back through the owning screen's message channel.

mod clipboard;
mod fetch;

use async_trait::async_trait;
use color_eyre::Result;
use tokio::sync::mpsc::UnboundedSender;

pub use clipboard::CopyToClipboardCmd;
pub use fetch::{FetchBreedsCmd, FetchRandomImageCmd, Fetched, LoadPixelsCmd};

use crate::app::AppMessage;

/// Async commands that perform side effects.
#[async_trait]
pub trait Command: Send + 'static {
    /// Human-readable name for logs and error messages.
    fn name(&self) -> String;

    async fn execute(self: Box<Self>, app_tx: UnboundedSender<AppMessage>) -> Result<()>;
}
