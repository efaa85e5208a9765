use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Widget};

use crate::ui::theme::Theme;

/// One-row bordered bar. `None` renders an empty bar labelled "n/a".
pub struct ProgressBar<'a> {
    pub label: String,
    pub ratio: Option<f64>,
    pub theme: &'a Theme,
}

impl<'a> ProgressBar<'a> {
    pub fn new(label: &str, ratio: Option<f64>, theme: &'a Theme) -> Self {
        Self {
            label: label.to_string(),
            ratio: ratio.map(|r| r.clamp(0.0, 1.0)),
            theme,
        }
    }
}

impl Widget for ProgressBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", self.label))
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let ratio = self.ratio.unwrap_or(0.0);
        let filled_width = (ratio * inner.width as f64) as u16;
        let label = match self.ratio {
            Some(r) => format!("{:.0}%", r * 100.0),
            None => "n/a".to_string(),
        };

        for x in inner.x..inner.x + inner.width {
            let style = if x < inner.x + filled_width {
                Style::default().fg(colors.bg()).bg(colors.bar_filled())
            } else {
                Style::default().fg(colors.fg()).bg(colors.bar_empty())
            };
            buf[(x, inner.y)].set_style(style);
        }

        let label_x = inner.x + (inner.width.saturating_sub(label.len() as u16)) / 2;
        buf.set_string(label_x, inner.y, &label, Style::default().fg(colors.fg()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label_row(ratio: Option<f64>) -> String {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 20, 3);
        let mut buf = Buffer::empty(area);
        ProgressBar::new("Accuracy", ratio, &theme).render(area, &mut buf);
        (0..area.width).map(|x| buf[(x, 1)].symbol().to_string()).collect()
    }

    #[test]
    fn shows_percentage() {
        assert!(label_row(Some(0.75)).contains("75%"));
    }

    #[test]
    fn ratio_is_clamped() {
        assert!(label_row(Some(3.0)).contains("100%"));
    }

    #[test]
    fn unknown_ratio_is_not_applicable() {
        assert!(label_row(None).contains("n/a"));
    }
}
