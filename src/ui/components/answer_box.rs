use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::ui::layout::wrapped_line_count;
use crate::ui::line_input::{InputMode, LineInput};
use crate::ui::theme::Theme;

pub const MAX_TEXT_ROWS: u16 = 6;
const PLACEHOLDER: &str = "Enter your translation";

/// Rows needed to show `text` at `width` columns, plus the border.
pub fn height_for(text: &str, width: u16) -> u16 {
    let inner = width.saturating_sub(2) as usize;
    let rows = wrapped_line_count(text, inner).clamp(1, MAX_TEXT_ROWS as usize);
    rows as u16 + 2
}

/// Bordered text field for either the learner's answer or, in display mode,
/// a read-only text such as the reference translation.
pub struct AnswerBox<'a> {
    input: &'a LineInput,
    title: &'a str,
    theme: &'a Theme,
}

impl<'a> AnswerBox<'a> {
    pub fn new(input: &'a LineInput, title: &'a str, theme: &'a Theme) -> Self {
        Self {
            input,
            title,
            theme,
        }
    }
}

impl Widget for AnswerBox<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let editable = self.input.mode == InputMode::Editable;
        let active = editable && !self.input.disabled;

        let (border, bg) = if active {
            (colors.border_focused(), colors.bg())
        } else if editable {
            (colors.border(), colors.bg())
        } else {
            (colors.border(), colors.display_bg())
        };
        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(bg));

        let text_style = if editable {
            Style::default().fg(colors.fg())
        } else {
            Style::default().fg(colors.text_dim())
        };
        let cursor_style = Style::default()
            .fg(colors.input_cursor_fg())
            .bg(colors.input_cursor_bg());

        let lines: Vec<Line> = if self.input.value().is_empty() && editable {
            let mut spans = Vec::new();
            if active {
                spans.push(Span::styled(" ", cursor_style));
            }
            spans.push(Span::styled(
                PLACEHOLDER,
                Style::default()
                    .fg(colors.text_dim())
                    .add_modifier(Modifier::ITALIC),
            ));
            vec![Line::from(spans)]
        } else if active {
            cursor_lines(self.input, text_style, cursor_style)
        } else {
            self.input
                .value()
                .split('\n')
                .map(|l| Line::from(Span::styled(l.to_string(), text_style)))
                .collect()
        };

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

/// Split the input into lines with the cursor cell highlighted.
fn cursor_lines<'t>(input: &'t LineInput, text: Style, cursor: Style) -> Vec<Line<'t>> {
    let (before, at, after) = input.render_parts();
    let mut lines: Vec<Line> = Vec::new();
    let mut current: Vec<Span> = Vec::new();

    push_text(before, text, &mut lines, &mut current);
    match at {
        // A newline under the cursor shows as a highlighted cell at line end.
        Some('\n') => {
            current.push(Span::styled(" ", cursor));
            lines.push(Line::from(std::mem::take(&mut current)));
        }
        Some(ch) => current.push(Span::styled(ch.to_string(), cursor)),
        None => current.push(Span::styled(" ", cursor)),
    }
    push_text(after, text, &mut lines, &mut current);
    lines.push(Line::from(current));
    lines
}

fn push_text<'t>(s: &'t str, style: Style, lines: &mut Vec<Line<'t>>, current: &mut Vec<Span<'t>>) {
    let mut parts = s.split('\n');
    if let Some(first) = parts.next() {
        current.push(Span::styled(first, style));
    }
    for part in parts {
        lines.push(Line::from(std::mem::take(current)));
        current.push(Span::styled(part, style));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn render(input: &LineInput, width: u16, height: u16) -> Vec<String> {
        let theme = Theme::default();
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        AnswerBox::new(input, "Answer", &theme).render(area, &mut buf);
        (0..height)
            .map(|y| (0..width).map(|x| buf[(x, y)].symbol().to_string()).collect())
            .collect()
    }

    #[test]
    fn height_grows_with_text_and_is_capped() {
        assert_eq!(height_for("", 22), 3);
        assert_eq!(height_for(&"a".repeat(30), 22), 4);
        assert_eq!(height_for("a\nb\nc", 22), 5);
        assert_eq!(height_for(&"a".repeat(1000), 22), MAX_TEXT_ROWS + 2);
    }

    #[test]
    fn empty_editable_input_shows_placeholder() {
        let input = LineInput::new("");
        let rows = render(&input, 40, 3);
        assert!(rows[1].contains("Enter your translation"));
    }

    #[test]
    fn display_mode_shows_each_line() {
        let input = LineInput::display("He gets up.\nEarly.");
        let rows = render(&input, 30, 4);
        assert!(rows[1].contains("He gets up."));
        assert!(rows[2].contains("Early."));
    }

    #[test]
    fn shift_enter_newline_renders_on_its_own_row() {
        let mut input = LineInput::new("one");
        input.handle(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT));
        input.handle(KeyEvent::new(KeyCode::Char('t'), KeyModifiers::NONE));
        let rows = render(&input, 20, 4);
        assert!(rows[1].contains("one"));
        assert!(rows[2].contains('t'));
    }
}
