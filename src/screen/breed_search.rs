use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::Theme;
use crate::api::{BreedName, DogApi, FetchError, ImageUrl};
use crate::commands::{FetchRandomImageCmd, Fetched};
use crate::config::{KeyResolver, SearchAction};
use crate::keyboard::{Keyboard, KeyboardSubscription};
use crate::navigation::Route;
use crate::request::RequestSlot;
use crate::screen::{Screen, ScreenContext, ScreenMsg, ScreenSettings, report_failure};
use crate::ui::{
    Component, EventResult, ImageView, Keybinding, Spinner, Tab, TabBar, TextInput,
    TextInputEvent,
};

enum SearchMsg {
    Submit,
    ImageLoaded(Fetched<ImageUrl>),
    SwitchTab(Tab),
}

impl From<Fetched<ImageUrl>> for SearchMsg {
    fn from(value: Fetched<ImageUrl>) -> Self {
        Self::ImageLoaded(value)
    }
}

/// Type a breed, get a random picture of it in place.
///
/// Editing happens while the keyboard is shown. The tab bar is hidden for as
/// long as the keyboard is visible.
pub struct BreedSearchScreen {
    api: Arc<dyn DogApi>,
    resolver: Arc<KeyResolver>,
    settings: ScreenSettings,
    input: TextInput,
    image: ImageView,
    tab_bar: TabBar,
    spinner: Spinner,
    keyboard: Keyboard,
    subscription: KeyboardSubscription,
    keyboard_visible: bool,
    slot: RequestSlot,
    last_error: Option<FetchError>,
    msg_tx: UnboundedSender<SearchMsg>,
    msg_rx: UnboundedReceiver<SearchMsg>,
}

impl BreedSearchScreen {
    pub fn new(context: &ScreenContext) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let subscription = context.keyboard.subscribe();
        Self {
            api: context.api.clone(),
            resolver: context.resolver.clone(),
            settings: context.settings,
            input: TextInput::new("Breed").with_placeholder("e.g. husky"),
            image: ImageView::new(context.api.clone(), context.settings.render_images),
            tab_bar: TabBar::new(Tab::Search, context.resolver.clone()),
            spinner: Spinner::new().with_label("Fetching picture"),
            keyboard: context.keyboard.clone(),
            keyboard_visible: subscription.is_visible(),
            subscription,
            slot: RequestSlot::new(context.settings.request_policy),
            last_error: None,
            msg_tx,
            msg_rx,
        }
    }

    pub const fn is_loading(&self) -> bool {
        self.slot.is_pending()
    }

    /// The input takes keystrokes exactly while the keyboard is shown.
    pub const fn is_editing(&self) -> bool {
        self.input.is_focused()
    }

    pub const fn tab_bar_visible(&self) -> bool {
        !self.keyboard_visible
    }

    pub fn input_value(&self) -> &str {
        self.input.value()
    }

    pub const fn image_url(&self) -> Option<&ImageUrl> {
        self.image.url()
    }

    pub const fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    fn queue(&self, msg: SearchMsg) {
        let _ = self.msg_tx.send(msg);
    }

    /// Pick up keyboard show/hide notifications.
    fn sync_keyboard(&mut self) {
        if let Some(visible) = self.subscription.poll() {
            debug!(visible, "search screen saw keyboard change");
            self.keyboard_visible = visible;
        }
        self.input.set_focused(self.keyboard_visible);
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match self.input.handle_key(key).unwrap_or(EventResult::Ignored) {
            EventResult::Event(TextInputEvent::Changed(_)) => {
                self.input.map_value(str::to_lowercase);
            }
            EventResult::Event(TextInputEvent::Submitted(_)) => {
                self.keyboard.hide();
                self.queue(SearchMsg::Submit);
            }
            EventResult::Event(TextInputEvent::Cancelled) => self.keyboard.hide(),
            EventResult::Consumed | EventResult::Ignored => {}
        }
        self.sync_keyboard();
    }

    fn process_message(&mut self, msg: SearchMsg) -> Vec<ScreenMsg> {
        match msg {
            SearchMsg::Submit => {
                let breed = BreedName::new(self.input.value().to_lowercase());
                debug!(%breed, "searching");
                self.slot
                    .begin()
                    .map(|ticket| {
                        let api = self.api.clone();
                        ScreenMsg::from(FetchRandomImageCmd::new(api, breed, ticket, self.msg_tx.clone()))
                    })
                    .into_iter()
                    .collect()
            }

            SearchMsg::ImageLoaded(Fetched { id, result }) => {
                if !self.slot.finish(id) {
                    return Vec::new();
                }
                match result {
                    Ok(url) => {
                        self.last_error = None;
                        self.image
                            .show(url)
                            .map(|cmd| ScreenMsg::Run(vec![cmd]))
                            .into_iter()
                            .collect()
                    }
                    Err(error) => {
                        let msgs = report_failure("Fetching a picture", &error, self.settings);
                        self.last_error = Some(error);
                        msgs
                    }
                }
            }

            SearchMsg::SwitchTab(Tab::List) => vec![ScreenMsg::Navigate(Route::List)],
            SearchMsg::SwitchTab(Tab::Search) => Vec::new(),
        }
    }

    fn render_result(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let error = self
            .last_error
            .as_ref()
            .filter(|_| self.settings.show_fetch_errors);

        if self.is_loading() {
            self.spinner.render(frame, inner, theme);
        } else if self.image.url().is_some() {
            self.image.render(frame, inner, theme);
        } else if let Some(error) = error {
            let line = Line::styled(format!("✗ {error}"), Style::default().fg(theme.error()));
            let area = inner.centered(Constraint::Fill(1), Constraint::Length(1));
            frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
        } else {
            let hint = format!(
                "Press {} and type a breed",
                self.resolver.display_search(SearchAction::Focus)
            );
            let line = Line::styled(hint, Style::default().fg(theme.overlay1()));
            let area = inner.centered(Constraint::Fill(1), Constraint::Length(1));
            frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
        }
    }
}

impl Screen for BreedSearchScreen {
    fn route(&self) -> Route {
        Route::Search
    }

    fn destroy(&mut self) {
        self.slot.cancel();
        self.image.cancel();
    }

    fn handle_tick(&mut self) {
        self.sync_keyboard();
        self.spinner.handle_tick();
        self.image.handle_tick();
    }

    fn handle_key(&mut self, key: KeyEvent) -> EventResult<()> {
        self.sync_keyboard();

        if self.keyboard_visible {
            self.handle_input_key(key);
            return EventResult::Consumed;
        }

        if self.resolver.matches_search(&key, SearchAction::Focus) {
            self.keyboard.show();
            self.sync_keyboard();
            return EventResult::Consumed;
        }
        if self.resolver.matches_search(&key, SearchAction::Submit) {
            self.queue(SearchMsg::Submit);
            return EventResult::Consumed;
        }

        match self.tab_bar.handle_key(key).unwrap_or(EventResult::Ignored) {
            EventResult::Event(tab) => {
                self.queue(SearchMsg::SwitchTab(tab));
                EventResult::Consumed
            }
            EventResult::Consumed => EventResult::Consumed,
            EventResult::Ignored => EventResult::Ignored,
        }
    }

    fn update(&mut self) -> color_eyre::Result<Vec<ScreenMsg>> {
        self.sync_keyboard();
        self.image.update();

        let mut out = Vec::new();
        while let Ok(msg) = self.msg_rx.try_recv() {
            out.extend(self.process_message(msg));
        }
        Ok(out)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let tabs_height = if self.tab_bar_visible() { 3 } else { 0 };
        let [input_area, result_area, tabs_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(tabs_height),
        ])
        .areas(area);

        self.input.render(frame, input_area, theme);
        self.render_result(frame, result_area, theme);
        if self.tab_bar_visible() {
            self.tab_bar.render(frame, tabs_area, theme);
        }
    }

    fn breadcrumbs(&self) -> Vec<String> {
        vec!["Search".to_string()]
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        if self.keyboard_visible {
            return vec![
                Keybinding::new("Enter", "Search"),
                Keybinding::new("Esc", "Done typing"),
            ];
        }
        let mut bindings = vec![
            Keybinding::new(self.resolver.display_search(SearchAction::Focus), "Type"),
            Keybinding::new(self.resolver.display_search(SearchAction::Submit), "Search"),
        ];
        bindings.extend(self.tab_bar.keybindings());
        bindings
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::testing::{ApiCall, MockDogApi, context, run_screen_commands, settle};
    use crate::ui::buffer_lines;

    fn press(screen: &mut BreedSearchScreen, code: KeyCode) -> EventResult<()> {
        screen.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(screen: &mut BreedSearchScreen, s: &str) {
        for c in s.chars() {
            let modifiers = if c.is_uppercase() { KeyModifiers::SHIFT } else { KeyModifiers::NONE };
            screen.handle_key(KeyEvent::new(KeyCode::Char(c), modifiers));
        }
    }

    fn screen(api: MockDogApi) -> (BreedSearchScreen, Arc<MockDogApi>, Keyboard) {
        let api = Arc::new(api);
        let ctx = context(api.clone());
        (BreedSearchScreen::new(&ctx), api, ctx.keyboard)
    }

    #[test]
    fn test_input_is_lowercased() {
        let (mut screen, _, _) = screen(MockDogApi::new());
        press(&mut screen, KeyCode::Char('i'));
        type_str(&mut screen, "HUSKY");
        assert_eq!(screen.input_value(), "husky");
    }

    #[test]
    fn test_lowercasing_keeps_cursor_after_expanded_char() {
        let (mut screen, _, _) = screen(MockDogApi::new());
        press(&mut screen, KeyCode::Char('i'));
        type_str(&mut screen, "İx");
        assert_eq!(screen.input_value(), "i\u{307}x");
    }

    #[tokio::test]
    async fn test_submit_requests_lowercased_breed() {
        let (mut screen, api, _) =
            screen(MockDogApi::new().with_image("pug", "https://x/pug.jpg"));

        press(&mut screen, KeyCode::Char('/'));
        type_str(&mut screen, "PuG");
        press(&mut screen, KeyCode::Enter);

        let msgs = screen.update().unwrap();
        assert!(screen.is_loading());
        let rest = run_screen_commands(msgs).await;
        assert!(rest.is_empty());

        // No navigation, the picture shows up in place
        assert!(settle(&mut screen).await.is_empty());
        assert!(!screen.is_loading());
        assert_eq!(screen.image_url(), Some(&ImageUrl::from("https://x/pug.jpg")));
        assert_eq!(api.calls(), vec![ApiCall::RandomImage("pug".to_string())]);
    }

    #[tokio::test]
    async fn test_empty_input_is_sent() {
        let (mut screen, api, _) = screen(MockDogApi::new());
        press(&mut screen, KeyCode::Enter);
        settle(&mut screen).await;
        assert_eq!(api.calls(), vec![ApiCall::RandomImage(String::new())]);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_image() {
        let (mut screen, _, _) = screen(
            MockDogApi::new()
                .with_image("pug", "https://x/pug.jpg")
                .with_image_error("akita", FetchError::Status(500)),
        );

        press(&mut screen, KeyCode::Char('i'));
        type_str(&mut screen, "pug");
        press(&mut screen, KeyCode::Enter);
        settle(&mut screen).await;

        press(&mut screen, KeyCode::Char('i'));
        press(&mut screen, KeyCode::Backspace);
        press(&mut screen, KeyCode::Backspace);
        press(&mut screen, KeyCode::Backspace);
        type_str(&mut screen, "akita");
        press(&mut screen, KeyCode::Enter);
        assert!(settle(&mut screen).await.is_empty());

        assert!(!screen.is_loading());
        assert_eq!(screen.last_error(), Some(&FetchError::Status(500)));
        assert_eq!(screen.image_url(), Some(&ImageUrl::from("https://x/pug.jpg")));
    }

    #[test]
    fn test_keyboard_drives_editing_and_tab_bar() {
        let (mut screen, _, keyboard) = screen(MockDogApi::new());
        assert!(!screen.is_editing());
        assert!(screen.tab_bar_visible());

        press(&mut screen, KeyCode::Char('i'));
        assert!(keyboard.is_visible());
        assert!(screen.is_editing());
        assert!(!screen.tab_bar_visible());

        // Tab keys are typed while editing
        press(&mut screen, KeyCode::Char('1'));
        assert_eq!(screen.input_value(), "1");

        press(&mut screen, KeyCode::Esc);
        assert!(!keyboard.is_visible());
        assert!(screen.tab_bar_visible());
    }

    #[test]
    fn test_keyboard_hidden_elsewhere() {
        let (mut screen, _, keyboard) = screen(MockDogApi::new());
        press(&mut screen, KeyCode::Char('i'));

        // Terminal focus lost
        keyboard.hide();
        screen.handle_tick();
        assert!(!screen.is_editing());
        assert!(screen.tab_bar_visible());
    }

    #[tokio::test]
    async fn test_tab_bar_navigation() {
        let (mut screen, _, _) = screen(MockDogApi::new());

        assert_eq!(press(&mut screen, KeyCode::Char('2')), EventResult::Consumed);
        assert!(screen.update().unwrap().is_empty());

        press(&mut screen, KeyCode::Char('1'));
        assert!(matches!(
            screen.update().unwrap().as_slice(),
            [ScreenMsg::Navigate(Route::List)]
        ));
    }

    #[test]
    fn test_subscription_released_on_drop() {
        let (screen, _, keyboard) = screen(MockDogApi::new());
        assert_eq!(keyboard.listener_count(), 1);
        drop(screen);
        assert_eq!(keyboard.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_render_shows_url_and_hides_tabs_while_editing() {
        let (mut screen, _, _) =
            screen(MockDogApi::new().with_image("pug", "https://x/pug.jpg"));
        press(&mut screen, KeyCode::Char('i'));
        type_str(&mut screen, "pug");
        press(&mut screen, KeyCode::Enter);
        settle(&mut screen).await;

        let draw = |screen: &mut BreedSearchScreen| {
            let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
            terminal
                .draw(|frame| screen.render(frame, frame.area(), &Theme::default()))
                .unwrap();
            buffer_lines(terminal.backend().buffer()).join("\n")
        };

        let text = draw(&mut screen);
        assert!(text.contains("https://x/pug.jpg"));
        assert!(text.contains("[1] List"));

        press(&mut screen, KeyCode::Char('i'));
        assert!(!draw(&mut screen).contains("[1] List"));
    }
}
