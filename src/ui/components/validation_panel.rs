use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::drill::Round;
use crate::session::validation::ValidationMode;
use crate::ui::theme::Theme;

const LENIENCY_NOTE: &str =
    "(As long as it's roughly correct, that's ok. That is: the meaning is conveyed.)";

/// Rows the panel needs for `focus_count` focus words, border included.
pub fn panel_height(mode: ValidationMode, focus_count: usize) -> u16 {
    match mode {
        ValidationMode::Binary => 5,
        // One row per word plus note, blank line and hint.
        ValidationMode::PerWord => focus_count.max(1) as u16 + 5,
    }
}

pub struct ValidationPanel<'a> {
    round: &'a Round,
    focus_words: &'a [String],
    mode: ValidationMode,
    complete: bool,
    theme: &'a Theme,
}

impl<'a> ValidationPanel<'a> {
    pub fn new(
        round: &'a Round,
        focus_words: &'a [String],
        mode: ValidationMode,
        complete: bool,
        theme: &'a Theme,
    ) -> Self {
        Self {
            round,
            focus_words,
            mode,
            complete,
            theme,
        }
    }

    fn per_word_lines(&self) -> Vec<Line<'a>> {
        let colors = &self.theme.colors;
        let mut lines = Vec::new();
        if self.focus_words.is_empty() {
            lines.push(Line::from(Span::styled(
                "  No focus words in this sentence.",
                Style::default().fg(colors.text_dim()),
            )));
        }
        for (i, word) in self.focus_words.iter().enumerate() {
            let marker = if i == self.round.selected { ">" } else { " " };
            let (mark, style) = match self.round.validations.get(word) {
                Some(true) => ("✓", Style::default().fg(colors.success())),
                Some(false) => ("✗", Style::default().fg(colors.error())),
                None => ("·", Style::default().fg(colors.text_dim())),
            };
            let word_style = if i == self.round.selected {
                Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };
            lines.push(Line::from(vec![
                Span::styled(format!(" {marker} "), Style::default().fg(colors.accent())),
                Span::styled(format!("{mark} "), style),
                Span::styled(word.clone(), word_style),
            ]));
        }
        lines.push(Line::from(Span::styled(
            LENIENCY_NOTE,
            Style::default().fg(colors.text_dim()),
        )));
        lines.push(Line::from(""));
        let hint = if self.round.posting {
            Span::styled("Submitting...", Style::default().fg(colors.text_dim()))
        } else if self.complete {
            Span::styled(
                "[Enter] submit and continue",
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(
                "[Enter] correct  [Backspace] incorrect  [↑/↓] select  [y/n] set",
                Style::default().fg(colors.text_dim()),
            )
        };
        lines.push(Line::from(hint));
        lines
    }

    fn binary_lines(&self) -> Vec<Line<'a>> {
        let colors = &self.theme.colors;
        let hint = if self.round.posting {
            Span::styled("Submitting...", Style::default().fg(colors.text_dim()))
        } else {
            Span::styled(
                "[Enter] my translation is correct  [Backspace] it is wrong",
                Style::default().fg(colors.accent()),
            )
        };
        vec![
            Line::from(Span::styled(
                "Is your translation correct?",
                Style::default().fg(colors.fg()),
            )),
            Line::from(Span::styled(
                LENIENCY_NOTE,
                Style::default().fg(colors.text_dim()),
            )),
            Line::from(hint),
        ]
    }
}

impl Widget for ValidationPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let title = match self.mode {
            ValidationMode::PerWord => {
                let judged = self.round.validations.len();
                format!(" Judge each focus word ({judged}/{}) ", self.focus_words.len())
            }
            ValidationMode::Binary => " Judge your answer ".to_string(),
        };
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));

        let lines = match self.mode {
            ValidationMode::PerWord => self.per_word_lines(),
            ValidationMode::Binary => self.binary_lines(),
        };
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::validation::WordValidations;

    fn round() -> Round {
        Round {
            user_translation: "He gets up".to_string(),
            reference: "He gets up.".to_string(),
            validations: WordValidations::new(),
            selected: 0,
            posting: false,
        }
    }

    fn rendered(panel: ValidationPanel, height: u16) -> String {
        let area = Rect::new(0, 0, 100, height);
        let mut buf = Buffer::empty(area);
        panel.render(area, &mut buf);
        (0..height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn per_word_rows_show_judgment_marks() {
        let theme = Theme::default();
        let focus = vec!["Er".to_string(), "aufstehen".to_string()];
        let mut r = round();
        r.validations.judge(&focus, "Er", true);
        r.validations.judge(&focus, "aufstehen", false);
        let panel = ValidationPanel::new(&r, &focus, ValidationMode::PerWord, true, &theme);
        let text = rendered(panel, panel_height(ValidationMode::PerWord, 2));
        assert!(text.contains("✓ Er"));
        assert!(text.contains("✗ aufstehen"));
        assert!(text.contains("(2/2)"));
        assert!(text.contains("submit and continue"));
    }

    #[test]
    fn incomplete_round_shows_judging_hint() {
        let theme = Theme::default();
        let focus = vec!["aufstehen".to_string()];
        let r = round();
        let panel = ValidationPanel::new(&r, &focus, ValidationMode::PerWord, false, &theme);
        let text = rendered(panel, panel_height(ValidationMode::PerWord, 1));
        assert!(text.contains("[Backspace] incorrect"));
        assert!(text.contains("roughly correct"));
    }

    #[test]
    fn binary_panel_asks_for_one_verdict() {
        let theme = Theme::default();
        let r = round();
        let panel = ValidationPanel::new(&r, &[], ValidationMode::Binary, false, &theme);
        let text = rendered(panel, panel_height(ValidationMode::Binary, 0));
        assert!(text.contains("Is your translation correct?"));
    }
}
