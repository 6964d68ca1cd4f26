use std::sync::Arc;

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::Theme;
use crate::commands::Command;
use crate::config::{GlobalAction, KeyResolver};
use crate::keyboard::Keyboard;
use crate::navigation::{Navigator, Route};
use crate::screen::{ScreenContext, ScreenMsg};
use crate::tui::{Event, Tui};
use crate::ui::{
    Component, ErrorDialog, ErrorDialogEvent, EventResult, StatusBar, Toast, ToastManager,
    ToastType,
};

const FRAME_RATE: f64 = 30.0;
const TICK_RATE: f64 = 8.0;

/// Application-level messages.
///
/// Screen-specific results travel over each screen's own channel; only
/// lifecycle and feedback go through here.
#[derive(Debug, Clone)]
pub enum AppMessage {
    Tick,
    Render,
    Resize(u16, u16),
    Suspend,
    Resume,
    Quit,
    ClearScreen,
    DisplayError(String),
    ShowToast {
        message: String,
        toast_type: ToastType,
    },
    CommandCompleted {
        name: String,
        success: bool,
    },
}

pub struct App {
    navigator: Navigator,
    keyboard: Keyboard,
    resolver: Arc<KeyResolver>,
    theme: Theme,
    status_bar: StatusBar,
    toasts: ToastManager,
    error_dialog: Option<ErrorDialog>,
    should_quit: bool,
    should_suspend: bool,
    message_tx: UnboundedSender<AppMessage>,
    message_rx: UnboundedReceiver<AppMessage>,
}

impl App {
    pub fn new(context: ScreenContext, start: Route, theme: Theme) -> Self {
        let (message_tx, message_rx) = mpsc::unbounded_channel();
        Self {
            keyboard: context.keyboard.clone(),
            resolver: context.resolver.clone(),
            status_bar: StatusBar::new(context.resolver.clone()),
            navigator: Navigator::new(start, context),
            theme,
            toasts: ToastManager::new(),
            error_dialog: None,
            should_quit: false,
            should_suspend: false,
            message_tx,
            message_rx,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new(FRAME_RATE, TICK_RATE)?;
        tui.enter()?;

        loop {
            if let Some(event) = tui.next_event().await {
                self.handle_event(event)?;
            }
            self.handle_messages(&mut tui)?;

            if self.should_suspend {
                tui.suspend()?;
                self.message_tx.send(AppMessage::Resume)?;
                self.message_tx.send(AppMessage::ClearScreen)?;
                tui.resume()?;
            } else if self.should_quit {
                break;
            }
        }

        tui.exit()?;
        info!("Exiting lazydog");
        Ok(())
    }

    fn send(&self, message: AppMessage) {
        if self.message_tx.send(message).is_err() {
            warn!("app message channel closed");
        }
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Quit => self.message_tx.send(AppMessage::Quit)?,
            Event::Tick => self.message_tx.send(AppMessage::Tick)?,
            Event::Render => self.message_tx.send(AppMessage::Render)?,
            Event::Resize(width, height) => self.message_tx.send(AppMessage::Resize(width, height))?,
            Event::FocusLost => self.keyboard.hide(),
            Event::FocusGained => {}
            Event::Paste(text) => self.handle_paste(&text),
            Event::Key(key) => self.handle_key(key),
            Event::Error(e) => warn!(error = %e, "terminal event error"),
        }
        Ok(())
    }

    /// Pasted text is typed into the search input when it is being edited.
    fn handle_paste(&mut self, text: &str) {
        if !self.keyboard.is_visible() {
            return;
        }
        for c in text.chars().filter(|c| !c.is_control()) {
            self.navigator
                .current()
                .handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if let Some(dialog) = &mut self.error_dialog {
            if let Ok(EventResult::Event(ErrorDialogEvent::Dismissed)) = dialog.handle_key(key) {
                self.error_dialog = None;
            }
            return;
        }

        if self.navigator.current().handle_key(key).is_consumed() {
            return;
        }

        if self.resolver.matches_global(&key, GlobalAction::Quit) {
            self.send(AppMessage::Quit);
        } else if self.resolver.matches_global(&key, GlobalAction::Back) {
            if !self.navigator.back() {
                debug!("already at the root screen");
            }
        } else if self.resolver.matches_global(&key, GlobalAction::Suspend) {
            self.send(AppMessage::Suspend);
        }
    }

    fn handle_messages(&mut self, tui: &mut Tui) -> Result<()> {
        while let Ok(message) = self.message_rx.try_recv() {
            if !matches!(message, AppMessage::Tick | AppMessage::Render) {
                debug!(?message, "handling app message");
            }
            match message {
                AppMessage::Render => self.render(tui)?,
                AppMessage::Resize(width, height) => {
                    tui.resize(Rect::new(0, 0, width, height))?;
                    self.render(tui)?;
                }
                AppMessage::ClearScreen => tui.clear()?,
                other => self.update(other),
            }
        }
        self.process_screen_updates();
        Ok(())
    }

    /// Apply a message that does not need the terminal.
    fn update(&mut self, message: AppMessage) {
        match message {
            AppMessage::Tick => {
                self.navigator.handle_tick();
                self.toasts.handle_tick();
            }
            AppMessage::Quit => self.should_quit = true,
            AppMessage::Suspend => self.should_suspend = true,
            AppMessage::Resume => self.should_suspend = false,
            AppMessage::DisplayError(message) => {
                error!(%message, "showing error");
                self.error_dialog = Some(ErrorDialog::new(message, self.resolver.clone()));
            }
            AppMessage::ShowToast {
                message,
                toast_type,
            } => self.toasts.show(Toast::new(message, toast_type)),
            AppMessage::CommandCompleted { name, success } => {
                debug!(%name, success, "command finished");
            }
            AppMessage::Render | AppMessage::Resize(..) | AppMessage::ClearScreen => {}
        }
    }

    fn process_screen_updates(&mut self) {
        match self.navigator.update_all() {
            Ok(msgs) => {
                for msg in msgs {
                    self.dispatch(msg);
                }
            }
            Err(e) => self.send(AppMessage::DisplayError(format!("Screen update failed: {e}"))),
        }
    }

    fn dispatch(&mut self, msg: ScreenMsg) {
        match msg {
            ScreenMsg::Run(commands) => {
                for command in commands {
                    self.spawn_command(command);
                }
            }
            ScreenMsg::Navigate(route) => {
                if let Err(e) = self.navigator.navigate(route) {
                    self.send(AppMessage::DisplayError(e.to_string()));
                }
            }
            ScreenMsg::Toast {
                message,
                toast_type,
            } => self.toasts.show(Toast::new(message, toast_type)),
        }
    }

    fn spawn_command(&self, command: Box<dyn Command>) {
        let name = command.name();
        let tx = self.message_tx.clone();
        debug!(%name, "spawning command");

        tokio::spawn(async move {
            let success = match command.execute(tx.clone()).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(%name, error = %e, "command failed");
                    let _ = tx.send(AppMessage::DisplayError(format!("{name} failed: {e}")));
                    false
                }
            };
            let _ = tx.send(AppMessage::CommandCompleted { name, success });
        });
    }

    fn render(&mut self, tui: &mut Tui) -> Result<()> {
        tui.draw(|frame| self.draw(frame))?;
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) {
        let theme = self.theme;
        let [main_area, status_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(StatusBar::height())])
                .areas(frame.area());

        let breadcrumbs = self.navigator.breadcrumbs();
        let screen = self.navigator.current();
        screen.render(frame, main_area, &theme);
        let keybindings = screen.keybindings();

        self.status_bar
            .render_with_keybindings(frame, status_area, &theme, &breadcrumbs, &keybindings);
        self.toasts.render(frame, main_area, &theme);

        if let Some(dialog) = &mut self.error_dialog {
            dialog.render(frame, frame.area(), &theme);
        }
    }
}
