//! Terminal picture renderer.
//!
//! Given a URL, [`ImageView`] downloads and decodes the picture through a
//! [`LoadPixelsCmd`] and paints it with `▀` half blocks: the foreground
//! colour is the upper pixel and the background the lower one, so each cell
//! carries two pixel rows. When pixels are disabled, or the download fails,
//! only a caption with the URL is drawn.

use std::sync::Arc;

use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::Theme;
use crate::api::{DogApi, ImageUrl};
use crate::commands::{Command, Fetched, LoadPixelsCmd};
use crate::request::{RequestPolicy, RequestSlot};
use crate::ui::{Component, Spinner};

enum Pixels {
    /// Not requested, either because pixels are off or nothing is shown.
    None,
    Loading,
    Ready(DynamicImage),
    Broken,
}

pub struct ImageView {
    api: Arc<dyn DogApi>,
    render_pixels: bool,
    url: Option<ImageUrl>,
    pixels: Pixels,
    slot: RequestSlot,
    /// Last scaled copy, with the cell area it was scaled for.
    fitted: Option<(u16, u16, RgbImage)>,
    spinner: Spinner,
    msg_tx: UnboundedSender<Fetched<DynamicImage>>,
    msg_rx: UnboundedReceiver<Fetched<DynamicImage>>,
}

impl ImageView {
    pub fn new(api: Arc<dyn DogApi>, render_pixels: bool) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Self {
            api,
            render_pixels,
            url: None,
            pixels: Pixels::None,
            slot: RequestSlot::new(RequestPolicy::Supersede),
            fitted: None,
            spinner: Spinner::new(),
            msg_tx,
            msg_rx,
        }
    }

    pub const fn url(&self) -> Option<&ImageUrl> {
        self.url.as_ref()
    }

    pub const fn is_loading(&self) -> bool {
        self.slot.is_pending()
    }

    pub const fn is_ready(&self) -> bool {
        matches!(self.pixels, Pixels::Ready(_))
    }

    pub const fn is_broken(&self) -> bool {
        matches!(self.pixels, Pixels::Broken)
    }

    /// Switch to `url`. Returns the download to run, if pixels are on.
    pub fn show(&mut self, url: ImageUrl) -> Option<Box<dyn Command>> {
        self.fitted = None;
        self.url = Some(url.clone());

        if !self.render_pixels {
            self.pixels = Pixels::None;
            return None;
        }

        let ticket = self.slot.begin()?;
        self.pixels = Pixels::Loading;
        Some(Box::new(LoadPixelsCmd::new(
            self.api.clone(),
            url,
            ticket,
            self.msg_tx.clone(),
        )))
    }

    /// Stop any download in progress.
    pub fn cancel(&mut self) {
        self.slot.cancel();
    }

    /// Apply finished downloads.
    pub fn update(&mut self) {
        while let Ok(Fetched { id, result }) = self.msg_rx.try_recv() {
            if !self.slot.finish(id) {
                continue;
            }
            match result {
                Ok(image) => {
                    debug!(width = image.width(), height = image.height(), "picture decoded");
                    self.fitted = None;
                    self.pixels = Pixels::Ready(image);
                }
                Err(error) => {
                    warn!(url = ?self.url, %error, "picture could not be loaded");
                    self.pixels = Pixels::Broken;
                }
            }
        }
    }

    fn fit(&mut self, area: Rect) -> Option<&RgbImage> {
        let Pixels::Ready(image) = &self.pixels else {
            return None;
        };
        let stale = !matches!(&self.fitted, Some((w, h, _)) if *w == area.width && *h == area.height);
        if stale {
            let (max_w, max_h) = (u32::from(area.width), u32::from(area.height) * 2);
            // Small pictures are drawn as is, never upscaled
            let scaled = if image.width() <= max_w && image.height() <= max_h {
                image.to_rgb8()
            } else {
                image.resize(max_w, max_h, FilterType::Triangle).to_rgb8()
            };
            self.fitted = Some((area.width, area.height, scaled));
        }
        self.fitted.as_ref().map(|(_, _, image)| image)
    }

    fn render_placeholder(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        match self.pixels {
            Pixels::Loading => self.spinner.render(frame, area, theme),
            Pixels::Broken => {
                let line = Line::from(Span::styled(
                    "✗ picture unavailable",
                    Style::default().fg(theme.error()).add_modifier(Modifier::BOLD),
                ));
                let area = area.centered(Constraint::Fill(1), Constraint::Length(1));
                frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
            }
            Pixels::None | Pixels::Ready(_) => {}
        }
    }
}

impl Component for ImageView {
    type Output = ();

    fn handle_tick(&mut self) {
        self.spinner.handle_tick();
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let Some(url) = self.url.clone() else {
            return;
        };

        let [picture_area, caption_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);

        let caption = Paragraph::new(Line::from(Span::styled(
            url.to_string(),
            Style::default().fg(theme.subtext0()),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(caption, caption_area);

        if let Some(image) = self.fit(picture_area) {
            paint_half_blocks(frame.buffer_mut(), picture_area, image, theme.base());
        } else {
            self.render_placeholder(frame, picture_area, theme);
        }
    }
}

/// Paint `image` centred in `area`, two pixel rows per cell.
///
/// `image` must already fit: at most `area.width` wide and `2 * area.height` tall.
fn paint_half_blocks(buffer: &mut Buffer, area: Rect, image: &RgbImage, background: Color) {
    let width = u16::try_from(image.width()).unwrap_or(u16::MAX).min(area.width);
    let rows = u16::try_from(image.height().div_ceil(2))
        .unwrap_or(u16::MAX)
        .min(area.height);
    let left = area.x + (area.width - width) / 2;
    let top = area.y + (area.height - rows) / 2;

    let color = |x: u16, y: u32| {
        let [r, g, b] = image.get_pixel(u32::from(x), y).0;
        Color::Rgb(r, g, b)
    };

    for row in 0..rows {
        let upper = u32::from(row) * 2;
        for col in 0..width {
            let lower = if upper + 1 < image.height() {
                color(col, upper + 1)
            } else {
                background
            };
            if let Some(cell) = buffer.cell_mut((left + col, top + row)) {
                cell.set_symbol("▀").set_fg(color(col, upper)).set_bg(lower);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::testing::{MockDogApi, png_bytes, run_commands};
    use crate::ui::buffer_lines;

    const RED: Color = Color::Rgb(255, 0, 0);
    const BLUE: Color = Color::Rgb(0, 0, 255);

    fn draw(view: &mut ImageView, width: u16, height: u16) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|frame| view.render(frame, frame.area(), &Theme::default()))
            .unwrap();
        terminal.backend().buffer().clone()
    }

    #[test]
    fn test_half_blocks_carry_two_rows() {
        let image = RgbImage::from_fn(2, 2, |_, y| {
            if y == 0 { image::Rgb([255, 0, 0]) } else { image::Rgb([0, 0, 255]) }
        });
        let area = Rect::new(0, 0, 4, 3);
        let mut buffer = Buffer::empty(area);
        paint_half_blocks(&mut buffer, area, &image, Color::Black);

        // Centred: one row, two columns
        let cell = &buffer[(1, 1)];
        assert_eq!(cell.symbol(), "▀");
        assert_eq!(cell.fg, RED);
        assert_eq!(cell.bg, BLUE);
        assert_eq!(buffer[(0, 1)].symbol(), " ");
        assert_eq!(buffer[(1, 0)].symbol(), " ");
    }

    #[test]
    fn test_odd_height_uses_background() {
        let image = RgbImage::from_pixel(1, 1, image::Rgb([255, 0, 0]));
        let area = Rect::new(0, 0, 1, 1);
        let mut buffer = Buffer::empty(area);
        paint_half_blocks(&mut buffer, area, &image, Color::Black);
        assert_eq!(buffer[(0, 0)].fg, RED);
        assert_eq!(buffer[(0, 0)].bg, Color::Black);
    }

    #[test]
    fn test_without_pixels_shows_url_only() {
        let mut view = ImageView::new(Arc::new(MockDogApi::new()), false);
        assert!(view.show("https://x/pug.jpg".into()).is_none());
        assert!(!view.is_loading());

        let lines = buffer_lines(&draw(&mut view, 30, 3));
        assert!(lines[2].contains("https://x/pug.jpg"));
    }

    #[tokio::test]
    async fn test_loads_and_paints_picture() {
        let api = Arc::new(MockDogApi::new().with_bytes(png_bytes(4, 4)));
        let mut view = ImageView::new(api, true);

        let command = view.show("https://x/pug.jpg".into()).unwrap();
        assert!(view.is_loading());

        run_commands(vec![command]).await;
        view.update();
        assert!(!view.is_loading());
        assert!(view.is_ready());

        let buffer = draw(&mut view, 4, 3);
        assert_eq!(buffer[(0, 0)].symbol(), "▀");
        assert_eq!(buffer[(0, 0)].fg, RED);
        assert_eq!(buffer[(0, 1)].bg, BLUE);
    }

    #[tokio::test]
    async fn test_failed_download_is_broken() {
        let mut view = ImageView::new(Arc::new(MockDogApi::new()), true);
        let command = view.show("https://x/missing.jpg".into()).unwrap();

        run_commands(vec![command]).await;
        view.update();
        assert!(view.is_broken());

        let lines = buffer_lines(&draw(&mut view, 30, 5));
        assert!(lines.iter().any(|l| l.contains("picture unavailable")));
    }

    #[tokio::test]
    async fn test_newer_url_wins() {
        let api = Arc::new(MockDogApi::new().with_bytes(png_bytes(2, 2)));
        let mut view = ImageView::new(api, true);

        let first = view.show("https://x/a.jpg".into()).unwrap();
        let second = view.show("https://x/b.jpg".into()).unwrap();

        // The first download was superseded and stays silent
        run_commands(vec![first]).await;
        view.update();
        assert!(view.is_loading());

        run_commands(vec![second]).await;
        view.update();
        assert!(view.is_ready());
        assert_eq!(view.url(), Some(&ImageUrl::from("https://x/b.jpg")));
    }
}
