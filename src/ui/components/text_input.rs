use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::Theme;
use crate::ui::{Component, EventResult, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextInputEvent {
    /// The value was edited; carries the new value.
    Changed(String),
    Submitted(String),
    Cancelled,
}

/// Single-line text field.
///
/// The cursor counts characters, not bytes.
pub struct TextInput {
    label: String,
    value: String,
    cursor: usize,
    placeholder: Option<String>,
    focused: bool,
}

impl TextInput {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: String::new(),
            cursor: 0,
            placeholder: None,
            focused: false,
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Rewrite the text on each side of the cursor with `f`.
    ///
    /// The cursor stays between the same characters even when `f` changes
    /// how many chars they take up.
    pub fn map_value(&mut self, f: impl Fn(&str) -> String) {
        let (before, after) = self.value.split_at(self.byte_offset(self.cursor));
        let before = f(before);
        let after = f(after);
        self.cursor = before.chars().count();
        self.value = before + &after;
    }

    pub const fn is_focused(&self) -> bool {
        self.focused
    }

    pub const fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_offset(&self, cursor: usize) -> usize {
        self.value
            .char_indices()
            .nth(cursor)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn insert_char(&mut self, c: char) {
        let at = self.byte_offset(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    fn delete_char_before_cursor(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let at = self.byte_offset(self.cursor);
        self.value.remove(at);
        true
    }

    fn delete_char_at_cursor(&mut self) -> bool {
        if self.cursor >= self.len() {
            return false;
        }
        let at = self.byte_offset(self.cursor);
        self.value.remove(at);
        true
    }

    fn delete_word_before_cursor(&mut self) -> bool {
        let chars: Vec<char> = self.value.chars().collect();
        let mut start = self.cursor;
        while start > 0 && chars[start - 1] == ' ' {
            start -= 1;
        }
        while start > 0 && chars[start - 1] != ' ' {
            start -= 1;
        }
        if start == self.cursor {
            return false;
        }
        let (from, to) = (self.byte_offset(start), self.byte_offset(self.cursor));
        self.value.replace_range(from..to, "");
        self.cursor = start;
        true
    }

    fn changed(&self, edited: bool) -> EventResult<TextInputEvent> {
        if edited {
            TextInputEvent::Changed(self.value.clone()).into()
        } else {
            EventResult::Consumed
        }
    }
}

impl Component for TextInput {
    type Output = TextInputEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        Ok(match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => TextInputEvent::Submitted(self.value.clone()).into(),
            (KeyCode::Esc, _) => TextInputEvent::Cancelled.into(),

            (KeyCode::Backspace, KeyModifiers::ALT) | (KeyCode::Char('w'), KeyModifiers::CONTROL) => {
                let edited = self.delete_word_before_cursor();
                self.changed(edited)
            }
            (KeyCode::Backspace, _) => {
                let edited = self.delete_char_before_cursor();
                self.changed(edited)
            }
            (KeyCode::Delete, _) => {
                let edited = self.delete_char_at_cursor();
                self.changed(edited)
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                let edited = !self.value.is_empty();
                self.value.clear();
                self.cursor = 0;
                self.changed(edited)
            }

            (KeyCode::Left, _) => {
                self.cursor = self.cursor.saturating_sub(1);
                EventResult::Consumed
            }
            (KeyCode::Right, _) => {
                self.cursor = (self.cursor + 1).min(self.len());
                EventResult::Consumed
            }
            (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => {
                self.cursor = 0;
                EventResult::Consumed
            }
            (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                self.cursor = self.len();
                EventResult::Consumed
            }

            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.insert_char(c);
                self.changed(true)
            }

            // Swallow everything else while focused
            _ => EventResult::Consumed,
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let input_style = Style::default().fg(theme.text());
        let cursor_style = Style::default()
            .fg(theme.base())
            .bg(theme.text())
            .add_modifier(Modifier::BOLD);
        let placeholder_style = Style::default().fg(theme.overlay0());

        let line = match (&self.placeholder, self.value.is_empty()) {
            (Some(placeholder), true) => {
                let mut spans = Vec::new();
                if self.focused {
                    spans.push(Span::styled(" ", cursor_style));
                }
                spans.push(Span::styled(placeholder.clone(), placeholder_style));
                Line::from(spans)
            }
            _ if self.focused => {
                let before: String = self.value.chars().take(self.cursor).collect();
                let at = self.value.chars().nth(self.cursor).unwrap_or(' ');
                let after: String = self.value.chars().skip(self.cursor + 1).collect();
                Line::from(vec![
                    Span::styled(before, input_style),
                    Span::styled(at.to_string(), cursor_style),
                    Span::styled(after, input_style),
                ])
            }
            _ => Line::from(Span::styled(self.value.clone(), input_style)),
        };

        let border_color = if self.focused {
            theme.border_focused()
        } else {
            theme.border()
        };
        let block = Block::default()
            .title(format!(" {} ", self.label))
            .title_style(Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color));

        frame.render_widget(Paragraph::new(line).block(block), area);
    }
}
