use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::Theme;
use crate::api::ImageUrl;
use crate::commands::CopyToClipboardCmd;
use crate::config::{DisplayAction, KeyResolver};
use crate::navigation::Route;
use crate::screen::{Screen, ScreenContext, ScreenMsg};
use crate::ui::{Component, EventResult, ImageView, Keybinding};

enum DisplayMsg {
    Load,
    Copy,
}

/// Full-screen picture. Holds nothing but the URL it was opened with.
pub struct ImageDisplayScreen {
    dog_image: ImageUrl,
    image: ImageView,
    resolver: Arc<KeyResolver>,
    msg_tx: UnboundedSender<DisplayMsg>,
    msg_rx: UnboundedReceiver<DisplayMsg>,
}

impl ImageDisplayScreen {
    pub fn new(dog_image: ImageUrl, context: &ScreenContext) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Self {
            dog_image,
            image: ImageView::new(context.api.clone(), context.settings.render_images),
            resolver: context.resolver.clone(),
            msg_tx,
            msg_rx,
        }
    }

    pub const fn dog_image(&self) -> &ImageUrl {
        &self.dog_image
    }
}

impl Screen for ImageDisplayScreen {
    fn route(&self) -> Route {
        Route::Display {
            dog_image: self.dog_image.clone(),
        }
    }

    fn init(&mut self) {
        let _ = self.msg_tx.send(DisplayMsg::Load);
    }

    fn destroy(&mut self) {
        self.image.cancel();
    }

    fn handle_tick(&mut self) {
        self.image.handle_tick();
    }

    fn handle_key(&mut self, key: KeyEvent) -> EventResult<()> {
        if self.resolver.matches_display(&key, DisplayAction::Copy) {
            let _ = self.msg_tx.send(DisplayMsg::Copy);
            return EventResult::Consumed;
        }
        EventResult::Ignored
    }

    fn update(&mut self) -> color_eyre::Result<Vec<ScreenMsg>> {
        self.image.update();

        let mut out = Vec::new();
        while let Ok(msg) = self.msg_rx.try_recv() {
            match msg {
                DisplayMsg::Load => {
                    if let Some(cmd) = self.image.show(self.dog_image.clone()) {
                        out.push(ScreenMsg::Run(vec![cmd]));
                    }
                }
                DisplayMsg::Copy => {
                    out.push(CopyToClipboardCmd::new(self.dog_image.as_str(), "image URL").into());
                }
            }
        }
        Ok(out)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .title(" Picture ")
            .title_style(Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border()));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.image.render(frame, inner, theme);
    }

    fn breadcrumbs(&self) -> Vec<String> {
        vec!["Picture".to_string()]
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        vec![Keybinding::new(
            self.resolver.display_display(DisplayAction::Copy),
            "Copy URL",
        )]
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::testing::{ApiCall, MockDogApi, context, png_bytes, settle};
    use crate::ui::buffer_lines;

    #[tokio::test]
    async fn test_renders_given_url_without_fetching() {
        let api = Arc::new(MockDogApi::new());
        let mut screen = ImageDisplayScreen::new("https://x/beagle.jpg".into(), &context(api.clone()));
        screen.init();
        assert!(settle(&mut screen).await.is_empty());
        assert!(api.calls().is_empty());

        let mut terminal = Terminal::new(TestBackend::new(40, 8)).unwrap();
        terminal
            .draw(|frame| screen.render(frame, frame.area(), &Theme::default()))
            .unwrap();
        let text = buffer_lines(terminal.backend().buffer()).join("\n");
        assert!(text.contains("https://x/beagle.jpg"));
    }

    #[tokio::test]
    async fn test_pixels_loaded_from_url() {
        let api = Arc::new(MockDogApi::new().with_bytes(png_bytes(2, 2)));
        let mut ctx = context(api.clone());
        ctx.settings.render_images = true;
        let mut screen = ImageDisplayScreen::new("https://x/beagle.jpg".into(), &ctx);
        screen.init();
        settle(&mut screen).await;

        assert_eq!(api.calls(), vec![ApiCall::ImageBytes("https://x/beagle.jpg".to_string())]);
    }

    #[test]
    fn test_copy_key_runs_clipboard_command() {
        let api = Arc::new(MockDogApi::new());
        let mut screen = ImageDisplayScreen::new("https://x/beagle.jpg".into(), &context(api));

        let copy = KeyEvent::new(KeyCode::Char('y'), KeyModifiers::NONE);
        assert_eq!(screen.handle_key(copy), EventResult::Consumed);
        assert!(matches!(screen.update().unwrap().as_slice(), [ScreenMsg::Run(cmds)] if cmds.len() == 1));

        let back = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(screen.handle_key(back), EventResult::Ignored);
    }
}
