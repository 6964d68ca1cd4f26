use std::sync::Arc;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::Theme;
use crate::config::{GlobalAction, KeyResolver};
use crate::ui::Keybinding;

const LOGO: &[&str] = &[
    r"   / \__      ",
    r"  (    @\___  ",
    r"  /         O ",
    r" /   (_____/  ",
    r"/_____/   U   ",
];

const LOGO_WIDTH: u16 = 15;
const INFO_WIDTH: u16 = 30;

/// Bottom panel: where you are, what you can press, and a dog.
pub struct StatusBar {
    resolver: Arc<KeyResolver>,
}

impl StatusBar {
    pub const fn new(resolver: Arc<KeyResolver>) -> Self {
        Self { resolver }
    }

    pub const fn height() -> u16 {
        LOGO.len() as u16 + 2
    }

    pub fn render_with_keybindings(
        &self,
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        breadcrumbs: &[String],
        local_keybindings: &[Keybinding],
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [info_area, keys_area, logo_area] = Layout::horizontal([
            Constraint::Length(INFO_WIDTH),
            Constraint::Min(20),
            Constraint::Length(LOGO_WIDTH),
        ])
        .areas(inner);

        Self::render_breadcrumbs(frame, info_area, theme, breadcrumbs);
        self.render_keybindings(frame, keys_area, theme, local_keybindings);
        Self::render_logo(frame, logo_area, theme);
    }

    fn render_breadcrumbs(frame: &mut Frame, area: Rect, theme: &Theme, breadcrumbs: &[String]) {
        let width = area.width as usize;
        let mut lines = vec![Line::from(Span::styled(
            "lazydog",
            Style::default().fg(theme.lavender()).add_modifier(Modifier::BOLD),
        ))];
        lines.extend(breadcrumbs.iter().enumerate().map(|(depth, crumb)| {
            let indent = if depth == 0 { String::new() } else { format!("{}└ ", " ".repeat(depth - 1)) };
            Line::from(vec![
                Span::styled(indent.clone(), Style::default().fg(theme.surface2())),
                Span::styled(
                    truncate_str(crumb, width.saturating_sub(indent.chars().count())),
                    Style::default().fg(theme.text()),
                ),
            ])
        }));
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn render_keybindings(
        &self,
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        local_keybindings: &[Keybinding],
    ) {
        let global = self.global_keybindings();
        let hints: Vec<&Keybinding> = local_keybindings.iter().chain(global.iter()).collect();

        // Align the separators of every column
        let key_w = hints.iter().map(|kb| kb.key.chars().count()).max().unwrap_or(1);
        let desc_w = hints
            .iter()
            .map(|kb| kb.description.chars().count())
            .max()
            .unwrap_or(1);
        let col_width = u16::try_from(key_w + 3 + desc_w + 2).unwrap_or(u16::MAX);
        let num_cols = (area.width / col_width).max(1) as usize;
        let num_rows = (area.height as usize).max(1);

        let mut columns: Vec<Vec<Line>> = vec![Vec::new(); num_cols];
        for (i, kb) in hints.iter().enumerate() {
            let Some(column) = columns.get_mut(i / num_rows) else {
                break;
            };
            column.push(Line::from(vec![
                Span::styled(format!("{:>key_w$}", kb.key), Style::default().fg(theme.peach())),
                Span::styled(" │ ", Style::default().fg(theme.surface2())),
                Span::styled(kb.description.clone(), Style::default().fg(theme.subtext0())),
            ]));
        }

        let col_areas = Layout::horizontal(vec![Constraint::Length(col_width); num_cols]).split(area);
        for (lines, col_area) in columns.into_iter().zip(col_areas.iter()) {
            frame.render_widget(Paragraph::new(lines), *col_area);
        }
    }

    fn render_logo(frame: &mut Frame, area: Rect, theme: &Theme) {
        let style = Style::default().fg(theme.peach()).add_modifier(Modifier::BOLD);
        let lines: Vec<Line> = LOGO.iter().map(|l| Line::from(Span::styled(*l, style))).collect();
        frame.render_widget(Paragraph::new(lines), area);
    }

    pub fn global_keybindings(&self) -> Vec<Keybinding> {
        vec![
            Keybinding::new(self.resolver.display_global(GlobalAction::Back), "Back"),
            Keybinding::new(self.resolver.display_global(GlobalAction::Quit), "Quit"),
        ]
    }
}

/// Cut `s` to `max_width` characters, ending in "..." when shortened.
fn truncate_str(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else if max_width > 3 {
        let kept: String = s.chars().take(max_width - 3).collect();
        format!("{kept}...")
    } else {
        s.chars().take(max_width).collect()
    }
}
