use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

use crate::session::proficiency::ProficiencyState;
use crate::ui::components::loading::LoadingDots;
use crate::ui::theme::Theme;

pub struct ProficiencyLine<'a> {
    state: &'a ProficiencyState,
    dots: &'a LoadingDots,
    theme: &'a Theme,
}

impl<'a> ProficiencyLine<'a> {
    pub fn new(state: &'a ProficiencyState, dots: &'a LoadingDots, theme: &'a Theme) -> Self {
        Self { state, dots, theme }
    }
}

impl Widget for ProficiencyLine<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let value = if self.state.loading {
            Span::styled(
                format!("{:<3}", self.dots.suffix()),
                Style::default().fg(colors.text_dim()),
            )
        } else {
            Span::styled(
                self.state.display(),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )
        };
        let line = Line::from(vec![
            Span::styled(" Proficiency: ", Style::default().fg(colors.fg())),
            value,
            Span::styled("  [Ctrl-R] refresh", Style::default().fg(colors.text_dim())),
        ]);
        Paragraph::new(line).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(state: &ProficiencyState) -> String {
        let theme = Theme::default();
        let dots = LoadingDots::new();
        let area = Rect::new(0, 0, 50, 1);
        let mut buf = Buffer::empty(area);
        ProficiencyLine::new(state, &dots, &theme).render(area, &mut buf);
        (0..area.width).map(|x| buf[(x, 0)].symbol().to_string()).collect()
    }

    #[test]
    fn shows_question_mark_until_known() {
        assert!(rendered(&ProficiencyState::default()).contains("Proficiency: ?"));
    }

    #[test]
    fn shows_four_decimals() {
        let state = ProficiencyState {
            value: Some(0.5),
            loading: false,
        };
        assert!(rendered(&state).contains("0.5000"));
    }

    #[test]
    fn hides_value_while_loading() {
        let state = ProficiencyState {
            value: Some(0.5),
            loading: true,
        };
        assert!(!rendered(&state).contains("0.5000"));
    }
}
