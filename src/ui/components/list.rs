use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List as RatatuiList, ListItem, ListState, Paragraph};

use crate::Theme;
use crate::config::{FilterAction, KeyResolver, NavAction};
use crate::ui::{Component, EventResult, Result};

const PAGE_STEP: usize = 5;

pub enum ListEvent<T> {
    Changed(T),
    Activated(T),
}

pub trait ListRow {
    fn render_row(&self, theme: &Theme) -> ListItem<'static>;

    /// Whether the row survives the filter `query`.
    fn matches(&self, query: &str) -> bool;
}

/// Selectable list with keyboard navigation and an optional filter.
pub struct List<T: ListRow + Clone> {
    items: Vec<T>,
    /// Indices into `items` that pass the filter, in order.
    visible: Vec<usize>,
    state: ListState,
    query: String,
    /// Keys go to the filter prompt while true.
    filtering: bool,
    resolver: Arc<KeyResolver>,
}

impl<T: ListRow + Clone> List<T> {
    pub fn new(items: Vec<T>, resolver: Arc<KeyResolver>) -> Self {
        let mut list = Self {
            items: Vec::new(),
            visible: Vec::new(),
            state: ListState::default(),
            query: String::new(),
            filtering: false,
            resolver,
        };
        list.set_items(items);
        list
    }

    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.refilter();
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Rows currently shown, after filtering.
    pub fn visible_items(&self) -> impl Iterator<Item = &T> {
        self.visible.iter().map(|&i| &self.items[i])
    }

    pub fn selected(&self) -> Option<&T> {
        self.state
            .selected()
            .and_then(|i| self.visible.get(i))
            .map(|&i| &self.items[i])
    }

    pub const fn is_filtering(&self) -> bool {
        self.filtering
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    fn refilter(&mut self) {
        let selected = self.state.selected().and_then(|i| self.visible.get(i).copied());

        self.visible = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| self.query.is_empty() || item.matches(&self.query))
            .map(|(i, _)| i)
            .collect();

        // Keep the selected row if it is still visible
        let position = selected
            .and_then(|s| self.visible.iter().position(|&i| i == s))
            .or_else(|| (!self.visible.is_empty()).then_some(0));
        self.state.select(position);
    }

    fn change_event(&self, before: Option<usize>) -> EventResult<ListEvent<T>> {
        match self.selected() {
            Some(item) if self.state.selected() != before => ListEvent::Changed(item.clone()).into(),
            _ => EventResult::Consumed,
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) -> EventResult<ListEvent<T>> {
        if self.resolver.matches_filter(&key, FilterAction::Exit) {
            self.filtering = false;
            self.query.clear();
            self.refilter();
            return EventResult::Consumed;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => self.filtering = false,
            (KeyCode::Backspace, _) => {
                self.query.pop();
                self.refilter();
            }
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.query.push(c);
                self.refilter();
            }
            _ => {}
        }
        EventResult::Consumed
    }

    fn select_index(&mut self, index: usize) {
        if !self.visible.is_empty() {
            self.state.select(Some(index.min(self.visible.len() - 1)));
        }
    }
}

impl<T: ListRow + Clone> Component for List<T> {
    type Output = ListEvent<T>;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if self.filtering {
            return Ok(self.handle_filter_key(key));
        }

        if self.resolver.matches_filter(&key, FilterAction::Toggle) {
            self.filtering = true;
            return Ok(EventResult::Consumed);
        }
        if !self.query.is_empty() && self.resolver.matches_filter(&key, FilterAction::Exit) {
            self.query.clear();
            self.refilter();
            return Ok(EventResult::Consumed);
        }

        let before = self.state.selected();
        let current = before.unwrap_or(0);
        let last = self.visible.len().saturating_sub(1);

        if self.resolver.matches_nav(&key, NavAction::Down) {
            self.select_index(if before.is_some() { current + 1 } else { 0 });
        } else if self.resolver.matches_nav(&key, NavAction::Up) {
            self.select_index(current.saturating_sub(1));
        } else if self.resolver.matches_nav(&key, NavAction::Home) {
            self.select_index(0);
        } else if self.resolver.matches_nav(&key, NavAction::End) {
            self.select_index(last);
        } else if self.resolver.matches_nav(&key, NavAction::PageDown) {
            self.select_index(current + PAGE_STEP);
        } else if self.resolver.matches_nav(&key, NavAction::PageUp) {
            self.select_index(current.saturating_sub(PAGE_STEP));
        } else if self.resolver.matches_nav(&key, NavAction::Select) {
            return Ok(self
                .selected()
                .map_or(EventResult::Ignored, |item| ListEvent::Activated(item.clone()).into()));
        } else {
            return Ok(EventResult::Ignored);
        }

        Ok(self.change_event(before))
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let show_prompt = self.filtering || !self.query.is_empty();
        let [list_area, prompt_area] = Layout::vertical([
            Constraint::Min(0),
            Constraint::Length(u16::from(show_prompt)),
        ])
        .areas(area);

        let items: Vec<ListItem> = self
            .visible
            .iter()
            .map(|&i| self.items[i].render_row(theme))
            .collect();

        let list = RatatuiList::new(items)
            .highlight_style(
                Style::default()
                    .bg(theme.selection_bg())
                    .fg(theme.lavender())
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        frame.render_stateful_widget(list, list_area, &mut self.state);

        if show_prompt {
            let prompt_style = if self.filtering {
                Style::default().fg(theme.peach())
            } else {
                Style::default().fg(theme.overlay1())
            };
            let prompt = Line::from(vec![
                Span::styled("/", prompt_style),
                Span::styled(self.query.clone(), Style::default().fg(theme.text())),
                Span::styled(
                    format!("  {}/{}", self.visible.len(), self.items.len()),
                    Style::default().fg(theme.overlay0()),
                ),
            ]);
            frame.render_widget(Paragraph::new(prompt), prompt_area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Row(&'static str);

    impl ListRow for Row {
        fn render_row(&self, _theme: &Theme) -> ListItem<'static> {
            ListItem::new(self.0)
        }

        fn matches(&self, query: &str) -> bool {
            self.0.contains(query)
        }
    }

    fn list(rows: &[&'static str]) -> List<Row> {
        List::new(rows.iter().copied().map(Row).collect(), Arc::new(KeyResolver::default()))
    }

    fn press(list: &mut List<Row>, code: KeyCode) -> EventResult<ListEvent<Row>> {
        list.handle_key(KeyEvent::new(code, KeyModifiers::NONE)).unwrap()
    }

    #[test]
    fn test_first_row_selected() {
        let breeds = list(&["akita", "beagle"]);
        assert_eq!(breeds.selected(), Some(&Row("akita")));
        assert!(list(&[]).selected().is_none());
    }

    #[test]
    fn test_navigation_emits_changes() {
        let mut list = list(&["akita", "beagle", "corgi"]);
        assert!(matches!(press(&mut list, KeyCode::Down), EventResult::Event(ListEvent::Changed(Row("beagle")))));
        assert!(matches!(press(&mut list, KeyCode::End), EventResult::Event(ListEvent::Changed(Row("corgi")))));
        // Already at the end
        assert!(press(&mut list, KeyCode::Down).is_consumed());
        assert_eq!(list.selected(), Some(&Row("corgi")));
        assert!(matches!(press(&mut list, KeyCode::Home), EventResult::Event(ListEvent::Changed(Row("akita")))));
    }

    #[test]
    fn test_select_activates() {
        let mut list = list(&["akita", "beagle"]);
        press(&mut list, KeyCode::Char('j'));
        assert!(matches!(
            press(&mut list, KeyCode::Enter),
            EventResult::Event(ListEvent::Activated(Row("beagle")))
        ));
    }

    #[test]
    fn test_unknown_key_is_ignored() {
        let mut list = list(&["akita"]);
        assert!(!press(&mut list, KeyCode::Char('x')).is_consumed());
    }

    #[test]
    fn test_filter_narrows_rows() {
        let mut list = list(&["akita", "beagle", "bulldog"]);
        press(&mut list, KeyCode::Char('/'));
        assert!(list.is_filtering());

        // Navigation keys are typed into the prompt while filtering
        press(&mut list, KeyCode::Char('b'));
        press(&mut list, KeyCode::Char('u'));
        assert_eq!(list.query(), "bu");
        assert_eq!(list.visible_items().cloned().collect::<Vec<_>>(), vec![Row("bulldog")]);
        assert_eq!(list.selected(), Some(&Row("bulldog")));

        press(&mut list, KeyCode::Enter);
        assert!(!list.is_filtering());
        assert!(matches!(
            press(&mut list, KeyCode::Enter),
            EventResult::Event(ListEvent::Activated(Row("bulldog")))
        ));

        // Esc clears a committed filter
        press(&mut list, KeyCode::Esc);
        assert_eq!(list.visible_items().count(), 3);
        assert_eq!(list.selected(), Some(&Row("bulldog")));
    }

    #[test]
    fn test_filter_without_matches() {
        let mut list = list(&["akita"]);
        press(&mut list, KeyCode::Char('/'));
        press(&mut list, KeyCode::Char('z'));
        assert!(list.selected().is_none());
        press(&mut list, KeyCode::Enter);
        assert!(!press(&mut list, KeyCode::Enter).is_consumed());
    }

    #[test]
    fn test_set_items_resets_selection() {
        let mut list = list(&[]);
        assert!(list.selected().is_none());
        list.set_items(vec![Row("akita"), Row("beagle")]);
        assert_eq!(list.selected(), Some(&Row("akita")));
        assert_eq!(list.items().len(), 2);
    }
}
