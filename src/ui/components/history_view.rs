use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::session::result::{HistoryEntry, Verdict};
use crate::store::schema::HistoryData;
use crate::ui::components::progress_bar::ProgressBar;
use crate::ui::theme::Theme;

/// Rows one history entry takes in the list.
const ENTRY_ROWS: usize = 4;

pub struct HistoryView<'a> {
    history: &'a HistoryData,
    /// Number of entries skipped from the newest end.
    scroll: usize,
    theme: &'a Theme,
}

impl<'a> HistoryView<'a> {
    pub fn new(history: &'a HistoryData, scroll: usize, theme: &'a Theme) -> Self {
        Self {
            history,
            scroll,
            theme,
        }
    }

    fn verdict_line(&self, verdict: &Verdict) -> Line<'a> {
        let colors = &self.theme.colors;
        match verdict {
            Verdict::Whole { is_correct: true } => {
                Line::from(Span::styled("   correct", Style::default().fg(colors.success())))
            }
            Verdict::Whole { is_correct: false } => {
                Line::from(Span::styled("   incorrect", Style::default().fg(colors.error())))
            }
            Verdict::PerWord {
                word_validations, ..
            } => {
                let mut spans = vec![Span::raw("  ")];
                for (word, correct) in word_validations.iter() {
                    let (mark, color) = if correct {
                        ("✓", colors.success())
                    } else {
                        ("✗", colors.error())
                    };
                    spans.push(Span::styled(
                        format!(" {mark} {word}"),
                        Style::default().fg(color),
                    ));
                }
                Line::from(spans)
            }
        }
    }

    fn entry_lines(&self, entry: &HistoryEntry) -> Vec<Line<'a>> {
        let colors = &self.theme.colors;
        vec![
            Line::from(vec![
                Span::styled(
                    entry.recorded_at.format("%Y-%m-%d %H:%M ").to_string(),
                    Style::default().fg(colors.text_dim()),
                ),
                Span::styled(
                    entry.sentence.clone(),
                    Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(Span::styled(
                format!("   you: {}", entry.user_translation.replace('\n', " ")),
                Style::default().fg(colors.fg()),
            )),
            Line::from(Span::styled(
                format!("   ref: {}", entry.reference),
                Style::default().fg(colors.text_dim()),
            )),
            self.verdict_line(&entry.verdict),
        ]
    }
}

/// Largest useful scroll offset for `count` entries in `height` rows.
pub fn max_scroll(count: usize, height: u16) -> usize {
    let visible = (height as usize / ENTRY_ROWS).max(1);
    count.saturating_sub(visible)
}

impl Widget for HistoryView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(" History ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(inner);

        let (correct, total) = self.history.tally();
        let summary = format!(
            " {} sentences, {correct}/{total} judgments correct",
            self.history.entries.len()
        );
        Paragraph::new(Line::from(Span::styled(summary, Style::default().fg(colors.fg()))))
            .render(layout[0], buf);

        ProgressBar::new("Accuracy", self.history.accuracy(), self.theme).render(layout[1], buf);

        if self.history.entries.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                " No results yet. Finish a sentence to start your history.",
                Style::default().fg(colors.text_dim()),
            )))
            .render(layout[2], buf);
            return;
        }

        let lines: Vec<Line> = self
            .history
            .entries
            .iter()
            .rev()
            .skip(self.scroll)
            .flat_map(|entry| self.entry_lines(entry))
            .collect();
        Paragraph::new(lines).render(layout[2], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(sentence: &str, is_correct: bool) -> HistoryEntry {
        HistoryEntry {
            recorded_at: Utc::now(),
            sentence: sentence.to_string(),
            user_translation: "answer".to_string(),
            reference: "reference".to_string(),
            verdict: Verdict::Whole { is_correct },
        }
    }

    fn rendered(history: &HistoryData, scroll: usize) -> String {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        HistoryView::new(history, scroll, &theme).render(area, &mut buf);
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn newest_entry_is_listed_first() {
        let mut history = HistoryData::default();
        history.entries.push(entry("Eins.", true));
        history.entries.push(entry("Zwei.", false));
        let text = rendered(&history, 0);
        let zwei = text.find("Zwei.").unwrap();
        let eins = text.find("Eins.").unwrap();
        assert!(zwei < eins);
        assert!(text.contains("1/2 judgments correct"));
        assert!(text.contains("50%"));
    }

    #[test]
    fn scrolling_skips_newest_entries() {
        let mut history = HistoryData::default();
        history.entries.push(entry("Eins.", true));
        history.entries.push(entry("Zwei.", false));
        let text = rendered(&history, 1);
        assert!(!text.contains("Zwei."));
        assert!(text.contains("Eins."));
    }

    #[test]
    fn max_scroll_keeps_a_page_visible() {
        assert_eq!(max_scroll(10, 8), 8);
        assert_eq!(max_scroll(1, 40), 0);
    }
}
