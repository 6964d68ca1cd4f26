use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Borders, ListItem, Paragraph};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::Theme;
use crate::api::{BreedName, DogApi, FetchError, ImageUrl};
use crate::commands::{FetchBreedsCmd, FetchRandomImageCmd, Fetched};
use crate::config::{BreedListAction, FilterAction, KeyResolver, NavAction};
use crate::navigation::Route;
use crate::request::RequestSlot;
use crate::screen::{Screen, ScreenContext, ScreenMsg, ScreenSettings, report_failure};
use crate::search::Matcher;
use crate::ui::{
    Component, EventResult, Keybinding, List, ListEvent, ListRow, Spinner, Tab, TabBar,
};

impl ListRow for BreedName {
    fn render_row(&self, _theme: &Theme) -> ListItem<'static> {
        ListItem::new(self.to_string())
    }

    fn matches(&self, query: &str) -> bool {
        Matcher::new().matches(self.as_str(), query)
    }
}

enum BreedListMsg {
    Load,
    BreedsLoaded(Fetched<Vec<BreedName>>),
    Select(BreedName),
    ImageLoaded(Fetched<ImageUrl>),
    SwitchTab(Tab),
}

impl From<Fetched<Vec<BreedName>>> for BreedListMsg {
    fn from(value: Fetched<Vec<BreedName>>) -> Self {
        Self::BreedsLoaded(value)
    }
}

impl From<Fetched<ImageUrl>> for BreedListMsg {
    fn from(value: Fetched<ImageUrl>) -> Self {
        Self::ImageLoaded(value)
    }
}

/// Every breed the API knows, in the order it lists them. Selecting one
/// fetches a random picture and opens it.
pub struct BreedListScreen {
    api: Arc<dyn DogApi>,
    resolver: Arc<KeyResolver>,
    settings: ScreenSettings,
    list: List<BreedName>,
    tab_bar: TabBar,
    spinner: Spinner,
    slot: RequestSlot,
    last_error: Option<FetchError>,
    msg_tx: UnboundedSender<BreedListMsg>,
    msg_rx: UnboundedReceiver<BreedListMsg>,
}

impl BreedListScreen {
    pub fn new(context: &ScreenContext) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Self {
            api: context.api.clone(),
            resolver: context.resolver.clone(),
            settings: context.settings,
            list: List::new(Vec::new(), context.resolver.clone()),
            tab_bar: TabBar::new(Tab::List, context.resolver.clone()),
            spinner: Spinner::new().with_label("Fetching breeds"),
            slot: RequestSlot::new(context.settings.request_policy),
            last_error: None,
            msg_tx,
            msg_rx,
        }
    }

    pub const fn is_loading(&self) -> bool {
        self.slot.is_pending()
    }

    pub const fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    /// Breeds currently shown, after the filter.
    pub fn visible_breeds(&self) -> Vec<BreedName> {
        self.list.visible_items().cloned().collect()
    }

    fn queue(&self, msg: BreedListMsg) {
        let _ = self.msg_tx.send(msg);
    }

    fn process_message(&mut self, msg: BreedListMsg) -> Vec<ScreenMsg> {
        match msg {
            BreedListMsg::Load => self
                .slot
                .begin()
                .map(|ticket| {
                    ScreenMsg::from(FetchBreedsCmd::new(self.api.clone(), ticket, self.msg_tx.clone()))
                })
                .into_iter()
                .collect(),

            BreedListMsg::BreedsLoaded(Fetched { id, result }) => {
                if !self.slot.finish(id) {
                    return Vec::new();
                }
                match result {
                    Ok(breeds) => {
                        debug!(count = breeds.len(), "breeds loaded");
                        self.last_error = None;
                        self.list.set_items(breeds);
                        Vec::new()
                    }
                    Err(error) => self.fail("Loading breeds", error),
                }
            }

            BreedListMsg::Select(breed) => {
                debug!(%breed, "breed selected");
                self.slot
                    .begin()
                    .map(|ticket| {
                        let api = self.api.clone();
                        ScreenMsg::from(FetchRandomImageCmd::new(api, breed, ticket, self.msg_tx.clone()))
                    })
                    .into_iter()
                    .collect()
            }

            BreedListMsg::ImageLoaded(Fetched { id, result }) => {
                if !self.slot.finish(id) {
                    return Vec::new();
                }
                match result {
                    Ok(dog_image) => {
                        self.last_error = None;
                        vec![ScreenMsg::Navigate(Route::Display { dog_image })]
                    }
                    Err(error) => self.fail("Fetching a picture", error),
                }
            }

            BreedListMsg::SwitchTab(Tab::Search) => vec![ScreenMsg::Navigate(Route::Search)],
            BreedListMsg::SwitchTab(Tab::List) => Vec::new(),
        }
    }

    fn fail(&mut self, what: &str, error: FetchError) -> Vec<ScreenMsg> {
        let msgs = report_failure(what, &error, self.settings);
        self.last_error = Some(error);
        msgs
    }

    fn render_list(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .title(format!(" Breeds ({}) ", self.list.items().len()))
            .title_style(Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.is_loading() {
            self.spinner.render(frame, inner, theme);
        } else {
            self.list.render(frame, inner, theme);
        }
    }
}

impl Screen for BreedListScreen {
    fn route(&self) -> Route {
        Route::List
    }

    fn init(&mut self) {
        self.queue(BreedListMsg::Load);
    }

    fn destroy(&mut self) {
        self.slot.cancel();
    }

    fn handle_tick(&mut self) {
        self.spinner.handle_tick();
    }

    fn handle_key(&mut self, key: KeyEvent) -> EventResult<()> {
        // The list is replaced by the spinner while loading
        if !self.is_loading() {
            match self.list.handle_key(key).unwrap_or(EventResult::Ignored) {
                EventResult::Event(ListEvent::Activated(breed)) => {
                    self.queue(BreedListMsg::Select(breed));
                    return EventResult::Consumed;
                }
                EventResult::Event(ListEvent::Changed(_)) | EventResult::Consumed => {
                    return EventResult::Consumed;
                }
                EventResult::Ignored => {}
            }
        }

        match self.tab_bar.handle_key(key).unwrap_or(EventResult::Ignored) {
            EventResult::Event(tab) => {
                self.queue(BreedListMsg::SwitchTab(tab));
                return EventResult::Consumed;
            }
            EventResult::Consumed => return EventResult::Consumed,
            EventResult::Ignored => {}
        }

        if self.resolver.matches_breeds(&key, BreedListAction::Reload) {
            self.queue(BreedListMsg::Load);
            return EventResult::Consumed;
        }

        EventResult::Ignored
    }

    fn update(&mut self) -> color_eyre::Result<Vec<ScreenMsg>> {
        let mut out = Vec::new();
        while let Ok(msg) = self.msg_rx.try_recv() {
            out.extend(self.process_message(msg));
        }
        Ok(out)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let error = self
            .last_error
            .as_ref()
            .filter(|_| self.settings.show_fetch_errors);

        let [error_area, list_area, tabs_area] = Layout::vertical([
            Constraint::Length(u16::from(error.is_some())),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .areas(area);

        if let Some(error) = error {
            let line = Line::styled(format!(" ✗ {error}"), Style::default().fg(theme.error()));
            frame.render_widget(Paragraph::new(line), error_area);
        }

        self.render_list(frame, list_area, theme);
        self.tab_bar.render(frame, tabs_area, theme);
    }

    fn breadcrumbs(&self) -> Vec<String> {
        vec!["Breeds".to_string()]
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        let mut bindings = vec![
            Keybinding::new(self.resolver.display_nav(NavAction::Select), "Picture"),
            Keybinding::new(self.resolver.display_filter(FilterAction::Toggle), "Filter"),
            Keybinding::new(self.resolver.display_breeds(BreedListAction::Reload), "Reload"),
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
    use crate::request::RequestPolicy;
    use crate::testing::{ApiCall, MockDogApi, context, context_with, run_screen_commands, settle};
    use crate::ui::buffer_lines;

    fn press(screen: &mut BreedListScreen, code: KeyCode) -> EventResult<()> {
        screen.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn names(breeds: &[BreedName]) -> Vec<&str> {
        breeds.iter().map(BreedName::as_str).collect()
    }

    async fn mounted(api: MockDogApi) -> (BreedListScreen, Arc<MockDogApi>) {
        let api = Arc::new(api);
        let mut screen = BreedListScreen::new(&context(api.clone()));
        screen.init();
        assert!(settle(&mut screen).await.is_empty());
        (screen, api)
    }

    #[tokio::test]
    async fn test_rendered_breeds_follow_response_order() {
        let (screen, api) =
            mounted(MockDogApi::new().with_breeds(&["whippet", "akita", "beagle", "akita"])).await;

        assert_eq!(
            names(&screen.visible_breeds()),
            vec!["whippet", "akita", "beagle", "akita"]
        );
        assert_eq!(api.calls(), vec![ApiCall::ListBreeds]);
        assert!(!screen.is_loading());
    }

    #[tokio::test]
    async fn test_loading_while_request_outstanding() {
        let api = Arc::new(MockDogApi::new().with_breeds(&["akita"]));
        let mut screen = BreedListScreen::new(&context(api));
        assert!(!screen.is_loading());

        screen.init();
        let msgs = screen.update().unwrap();
        assert!(screen.is_loading());

        run_screen_commands(msgs).await;
        screen.update().unwrap();
        assert!(!screen.is_loading());
    }

    #[tokio::test]
    async fn test_selecting_breed_opens_picture() {
        let (mut screen, api) = mounted(
            MockDogApi::new()
                .with_breeds(&["akita", "beagle"])
                .with_image("beagle", "https://x/beagle.jpg"),
        )
        .await;

        press(&mut screen, KeyCode::Down);
        assert_eq!(press(&mut screen, KeyCode::Enter), EventResult::Consumed);

        let msgs = screen.update().unwrap();
        assert!(screen.is_loading());
        run_screen_commands(msgs).await;

        let msgs = screen.update().unwrap();
        assert!(!screen.is_loading());
        assert!(matches!(
            msgs.as_slice(),
            [ScreenMsg::Navigate(Route::Display { dog_image })] if dog_image.as_str() == "https://x/beagle.jpg"
        ));
        assert_eq!(
            api.calls(),
            vec![ApiCall::ListBreeds, ApiCall::RandomImage("beagle".to_string())]
        );
    }

    #[tokio::test]
    async fn test_breed_sent_verbatim() {
        let (mut screen, api) = mounted(MockDogApi::new().with_breeds(&["Shiba Inu"])).await;
        press(&mut screen, KeyCode::Enter);
        settle(&mut screen).await;
        assert_eq!(api.calls()[1], ApiCall::RandomImage("Shiba Inu".to_string()));
    }

    #[tokio::test]
    async fn test_list_failure_is_silent_by_default() {
        let (screen, _) =
            mounted(MockDogApi::new().with_breeds_error(FetchError::Status(500))).await;
        assert!(!screen.is_loading());
        assert!(screen.visible_breeds().is_empty());
        assert_eq!(screen.last_error(), Some(&FetchError::Status(500)));
    }

    #[tokio::test]
    async fn test_image_failure_keeps_screen() {
        let (mut screen, _) = mounted(
            MockDogApi::new()
                .with_breeds(&["akita"])
                .with_image_error("akita", FetchError::TimedOut),
        )
        .await;

        press(&mut screen, KeyCode::Enter);
        let msgs = settle(&mut screen).await;
        assert!(msgs.is_empty());
        assert!(!screen.is_loading());
        assert_eq!(screen.last_error(), Some(&FetchError::TimedOut));
        assert_eq!(names(&screen.visible_breeds()), vec!["akita"]);
    }

    #[tokio::test]
    async fn test_failure_toast_when_enabled() {
        let api = Arc::new(MockDogApi::new().with_breeds_error(FetchError::Status(503)));
        let mut ctx = context(api);
        ctx.settings.show_fetch_errors = true;
        let mut screen = BreedListScreen::new(&ctx);
        screen.init();

        let msgs = settle(&mut screen).await;
        assert!(matches!(
            msgs.as_slice(),
            [ScreenMsg::Toast { toast_type: crate::ui::ToastType::Error, .. }]
        ));
    }

    #[tokio::test]
    async fn test_superseded_result_is_ignored() {
        let api = Arc::new(MockDogApi::new().with_breeds(&["akita"]));
        let mut screen = BreedListScreen::new(&context(api));
        screen.init();
        let first = screen.update().unwrap();

        // Reload while the first request is outstanding
        screen.queue(BreedListMsg::Load);
        let second = screen.update().unwrap();

        run_screen_commands(first).await;
        screen.update().unwrap();
        assert!(screen.is_loading());

        run_screen_commands(second).await;
        screen.update().unwrap();
        assert!(!screen.is_loading());
        assert_eq!(names(&screen.visible_breeds()), vec!["akita"]);
    }

    #[tokio::test]
    async fn test_reject_policy_keeps_first_request() {
        let api = Arc::new(MockDogApi::new().with_breeds(&["akita"]));
        let mut screen = BreedListScreen::new(&context_with(api, RequestPolicy::Reject));
        screen.init();
        assert_eq!(screen.update().unwrap().len(), 1);

        press(&mut screen, KeyCode::Char('r'));
        assert!(screen.update().unwrap().is_empty());
        assert!(screen.is_loading());
    }

    #[tokio::test]
    async fn test_tab_bar() {
        let (mut screen, _) = mounted(MockDogApi::new().with_breeds(&["akita"])).await;

        // Own tab is disabled
        assert_eq!(press(&mut screen, KeyCode::Char('1')), EventResult::Consumed);
        assert!(screen.update().unwrap().is_empty());

        press(&mut screen, KeyCode::Char('2'));
        assert!(matches!(
            screen.update().unwrap().as_slice(),
            [ScreenMsg::Navigate(Route::Search)]
        ));
    }

    #[tokio::test]
    async fn test_tab_bar_active_while_loading() {
        let api = Arc::new(MockDogApi::new());
        let mut screen = BreedListScreen::new(&context(api));
        screen.init();
        let _pending = screen.update().unwrap();
        assert!(screen.is_loading());

        // Enter goes nowhere while the spinner is up
        assert_eq!(press(&mut screen, KeyCode::Enter), EventResult::Ignored);
        press(&mut screen, KeyCode::Char('2'));
        assert!(matches!(
            screen.update().unwrap().as_slice(),
            [ScreenMsg::Navigate(Route::Search)]
        ));
    }

    #[tokio::test]
    async fn test_filter_narrows_rendered_breeds() {
        let (mut screen, _) =
            mounted(MockDogApi::new().with_breeds(&["akita", "bulldog", "beagle"])).await;

        press(&mut screen, KeyCode::Char('/'));
        press(&mut screen, KeyCode::Char('b'));
        press(&mut screen, KeyCode::Char('d'));
        assert_eq!(names(&screen.visible_breeds()), vec!["bulldog"]);

        press(&mut screen, KeyCode::Esc);
        assert_eq!(screen.visible_breeds().len(), 3);
    }

    #[tokio::test]
    async fn test_render_shows_breeds_and_tabs() {
        let (mut screen, _) = mounted(MockDogApi::new().with_breeds(&["akita", "beagle"])).await;
        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        terminal
            .draw(|frame| screen.render(frame, frame.area(), &Theme::default()))
            .unwrap();

        let text = buffer_lines(terminal.backend().buffer()).join("\n");
        assert!(text.contains("Breeds (2)"));
        assert!(text.contains("akita"));
        assert!(text.contains("beagle"));
        assert!(text.contains("Search"));
    }
}
