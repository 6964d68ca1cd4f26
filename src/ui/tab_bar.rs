//! Two-button bar switching between the list and search screens.

use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::Theme;
use crate::config::{KeyResolver, TabAction};
use crate::ui::{Component, EventResult, Keybinding, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    List,
    Search,
}

impl Tab {
    const ALL: [Self; 2] = [Self::List, Self::Search];

    const fn title(self) -> &'static str {
        match self {
            Self::List => "List",
            Self::Search => "Search",
        }
    }

    const fn action(self) -> TabAction {
        match self {
            Self::List => TabAction::List,
            Self::Search => TabAction::Search,
        }
    }
}

/// The tab of the current screen is disabled: its key is swallowed and does
/// nothing. The other tab's key emits that tab.
pub struct TabBar {
    current: Tab,
    resolver: Arc<KeyResolver>,
}

impl TabBar {
    pub const fn new(current: Tab, resolver: Arc<KeyResolver>) -> Self {
        Self { current, resolver }
    }

    pub fn is_enabled(&self, tab: Tab) -> bool {
        tab != self.current
    }

    pub fn keybindings(&self) -> Vec<Keybinding> {
        Tab::ALL
            .into_iter()
            .filter(|tab| self.is_enabled(*tab))
            .map(|tab| Keybinding::new(self.resolver.display_tab(tab.action()), tab.title()))
            .collect()
    }
}

impl Component for TabBar {
    type Output = Tab;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        let pressed = Tab::ALL
            .into_iter()
            .find(|tab| self.resolver.matches_tab(&key, tab.action()));

        Ok(match pressed {
            Some(tab) if self.is_enabled(tab) => tab.into(),
            Some(_) => EventResult::Consumed,
            None => EventResult::Ignored,
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let areas = Layout::horizontal([Constraint::Fill(1); 2]).split(area);

        for (tab, area) in Tab::ALL.into_iter().zip(areas.iter()) {
            let enabled = self.is_enabled(tab);
            let (border, text) = if enabled {
                (
                    Style::default().fg(theme.border()),
                    Style::default().fg(theme.text()),
                )
            } else {
                (
                    Style::default().fg(theme.border_focused()),
                    Style::default()
                        .fg(theme.overlay0())
                        .add_modifier(Modifier::BOLD),
                )
            };

            let label = Line::from(vec![
                Span::styled(
                    format!("[{}] ", self.resolver.display_tab(tab.action())),
                    Style::default().fg(theme.peach()),
                ),
                Span::styled(tab.title(), text),
            ])
            .centered();

            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(border);
            frame.render_widget(Paragraph::new(label).block(block), *area);
        }
    }
}
