use std::time::{Duration, Instant};

use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

use crate::ui::theme::Theme;

pub const DOT_INTERVAL: Duration = Duration::from_millis(500);

/// Animated 0..=3 dot counter driven by the UI tick.
#[derive(Clone, Debug)]
pub struct LoadingDots {
    count: u8,
    last_step: Instant,
}

impl LoadingDots {
    pub fn new() -> Self {
        Self {
            count: 0,
            last_step: Instant::now(),
        }
    }

    /// Start a fresh animation, as when a new loading period begins.
    pub fn reset(&mut self) {
        self.count = 0;
        self.last_step = Instant::now();
    }

    pub fn tick(&mut self, now: Instant) {
        if now.saturating_duration_since(self.last_step) >= DOT_INTERVAL {
            self.count = (self.count + 1) % 4;
            self.last_step = now;
        }
    }

    pub fn suffix(&self) -> String {
        ".".repeat(self.count as usize)
    }
}

impl Default for LoadingDots {
    fn default() -> Self {
        Self::new()
    }
}

/// Standalone loading line, e.g. "Generating sentence..".
pub struct LoadingBanner<'a> {
    label: &'a str,
    dots: &'a LoadingDots,
    theme: &'a Theme,
}

impl<'a> LoadingBanner<'a> {
    pub fn new(label: &'a str, dots: &'a LoadingDots, theme: &'a Theme) -> Self {
        Self { label, dots, theme }
    }
}

impl Widget for LoadingBanner<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        // Pad to the widest frame so the label does not shift while animating.
        let text = format!("{}{:<3}", self.label, self.dots.suffix());
        Paragraph::new(Line::from(Span::styled(text, Style::default().fg(colors.text_dim()))))
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_wraps_after_three() {
        let mut dots = LoadingDots::new();
        let start = dots.last_step;
        let mut seen = Vec::new();
        for step in 1..=5 {
            dots.tick(start + DOT_INTERVAL * step);
            seen.push(dots.suffix().len());
        }
        assert_eq!(seen, vec![1, 2, 3, 0, 1]);
    }

    #[test]
    fn ticks_inside_the_interval_do_nothing() {
        let mut dots = LoadingDots::new();
        let start = dots.last_step;
        dots.tick(start + Duration::from_millis(100));
        dots.tick(start + Duration::from_millis(499));
        assert_eq!(dots.suffix(), "");
    }

    #[test]
    fn suffix_and_reset() {
        let mut dots = LoadingDots::new();
        let start = dots.last_step;
        dots.tick(start + DOT_INTERVAL);
        dots.tick(start + DOT_INTERVAL * 2);
        assert_eq!(dots.suffix(), "..");
        dots.reset();
        assert_eq!(dots.suffix(), "");
    }

    #[test]
    fn banner_renders_label_with_dots() {
        let theme = Theme::default();
        let mut dots = LoadingDots::new();
        let start = dots.last_step;
        dots.tick(start + DOT_INTERVAL);
        let area = Rect::new(0, 0, 30, 1);
        let mut buf = Buffer::empty(area);
        LoadingBanner::new("Generating sentence", &dots, &theme).render(area, &mut buf);
        let row: String = (0..area.width).map(|x| buf[(x, 0)].symbol().to_string()).collect();
        assert!(row.contains("Generating sentence."));
    }
}
