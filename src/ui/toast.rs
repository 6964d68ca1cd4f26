use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};

use super::Component;
use crate::Theme;

const TOAST_LIFETIME: Duration = Duration::from_secs(3);
const MAX_VISIBLE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastType {
    Success,
    Info,
    Error,
}

#[derive(Debug)]
pub struct Toast {
    message: String,
    toast_type: ToastType,
    created_at: Instant,
}

impl Toast {
    pub fn new(message: impl Into<String>, toast_type: ToastType) -> Self {
        Self {
            message: message.into(),
            toast_type,
            created_at: Instant::now(),
        }
    }

    fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= TOAST_LIFETIME
    }
}

/// Short-lived notifications stacked in the bottom-right corner.
#[derive(Default)]
pub struct ToastManager {
    toasts: VecDeque<Toast>,
}

impl ToastManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, toast: Toast) {
        self.toasts.push_back(toast);
        while self.toasts.len() > MAX_VISIBLE {
            self.toasts.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

impl Component for ToastManager {
    type Output = ();

    fn handle_tick(&mut self) {
        self.toasts.retain(|t| !t.is_expired());
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        const HEIGHT: u16 = 3;
        let width = 50u16.min(area.width.saturating_sub(4));

        // Newest at the bottom
        for (i, toast) in self.toasts.iter().rev().enumerate() {
            let offset = u16::try_from(i).unwrap_or(u16::MAX).saturating_mul(HEIGHT + 1);
            let Some(y) = area
                .bottom()
                .checked_sub(HEIGHT + 1 + offset)
                .filter(|y| *y >= area.y)
            else {
                break;
            };
            let x = area.x + area.width.saturating_sub(width + 2);
            let toast_area = Rect::new(x, y, width, HEIGHT);

            let (color, icon) = match toast.toast_type {
                ToastType::Success => (theme.green(), "✓"),
                ToastType::Info => (theme.blue(), "ℹ"),
                ToastType::Error => (theme.error(), "✗"),
            };

            frame.render_widget(Clear, toast_area);
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(color))
                .style(Style::default().bg(theme.surface0()));
            let paragraph = Paragraph::new(format!("{icon} {}", toast.message))
                .block(block)
                .style(Style::default().fg(theme.text()).add_modifier(Modifier::BOLD))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, toast_area);
        }
    }
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::ui::buffer_lines;

    #[test]
    fn test_keeps_newest_toasts() {
        let mut toasts = ToastManager::new();
        for i in 0..5 {
            toasts.show(Toast::new(format!("toast {i}"), ToastType::Info));
        }
        assert_eq!(toasts.len(), MAX_VISIBLE);
        assert_eq!(toasts.toasts.front().map(|t| t.message.as_str()), Some("toast 2"));
    }

    #[test]
    fn test_expired_toasts_removed_on_tick() {
        let mut toasts = ToastManager::new();
        let mut old = Toast::new("old", ToastType::Success);
        old.created_at = Instant::now() - TOAST_LIFETIME;
        toasts.show(old);
        toasts.show(Toast::new("fresh", ToastType::Error));

        toasts.handle_tick();
        assert_eq!(toasts.len(), 1);
    }

    #[test]
    fn test_renders_message() {
        let mut toasts = ToastManager::new();
        toasts.show(Toast::new("Copied image URL", ToastType::Success));

        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
        terminal
            .draw(|frame| toasts.render(frame, frame.area(), &Theme::default()))
            .unwrap();

        let lines = buffer_lines(terminal.backend().buffer());
        assert!(lines.iter().any(|l| l.contains("✓ Copied image URL")));
    }
}
