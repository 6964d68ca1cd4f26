//! Keyboard visibility notifications.
//!
//! The [`Keyboard`] is shared by the whole app and plays the role of the
//! system's on-screen keyboard: focusing a text input shows it, blurring the
//! input, navigating or losing terminal focus hides it. Screens that care hold
//! a [`KeyboardSubscription`], which stops listening when dropped.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct Keyboard {
    visible: Arc<watch::Sender<bool>>,
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Keyboard {
    pub fn new() -> Self {
        let (visible, _) = watch::channel(false);
        Self {
            visible: Arc::new(visible),
        }
    }

    pub fn show(&self) {
        self.set_visible(true);
    }

    pub fn hide(&self) {
        self.set_visible(false);
    }

    pub fn is_visible(&self) -> bool {
        *self.visible.borrow()
    }

    /// Start listening for show/hide notifications.
    pub fn subscribe(&self) -> KeyboardSubscription {
        let rx = self.visible.subscribe();
        debug!(listeners = self.listener_count(), "keyboard listener added");
        KeyboardSubscription { rx }
    }

    pub fn listener_count(&self) -> usize {
        self.visible.receiver_count()
    }

    fn set_visible(&self, visible: bool) {
        let changed = self.visible.send_if_modified(|current| {
            if *current == visible {
                false
            } else {
                *current = visible;
                true
            }
        });
        if changed {
            debug!(visible, "keyboard visibility changed");
        }
    }
}

/// A live keyboard listener.
pub struct KeyboardSubscription {
    rx: watch::Receiver<bool>,
}

impl KeyboardSubscription {
    /// The new visibility if it changed since the last poll.
    pub fn poll(&mut self) -> Option<bool> {
        match self.rx.has_changed() {
            Ok(true) => Some(*self.rx.borrow_and_update()),
            _ => None,
        }
    }

    pub fn is_visible(&self) -> bool {
        *self.rx.borrow()
    }
}

impl Drop for KeyboardSubscription {
    fn drop(&mut self) {
        debug!("keyboard listener removed");
    }
}
