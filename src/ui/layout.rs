use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::session::drill::{DrillController, Reference};
use crate::ui::components::answer_box;
use crate::ui::components::sentence_view::layout_tokens;
use crate::ui::components::validation_panel::panel_height;

/// Widest the drill column grows; wider terminals get margins.
const MAX_COLUMN_WIDTH: u16 = 90;

/// Areas of the drill screen, top to bottom. Optional parts only exist in
/// the phase that shows them.
pub struct DrillLayout {
    pub header: Rect,
    pub sentence: Rect,
    pub answer: Rect,
    pub reference: Option<Rect>,
    pub judgments: Option<Rect>,
    pub proficiency: Rect,
    pub status: Rect,
    pub footer: Rect,
}

pub fn content_column(area: Rect) -> Rect {
    let width = area.width.min(MAX_COLUMN_WIDTH);
    Rect::new(area.x + (area.width - width) / 2, area.y, width, area.height)
}

impl DrillLayout {
    pub fn new(area: Rect, drill: &DrillController, footer_rows: u16) -> Self {
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(6),
                Constraint::Length(footer_rows.max(1)),
            ])
            .split(area);
        let column = content_column(outer[1]);
        let inner_width = column.width.saturating_sub(2);

        let sentence_rows = match drill.current.as_ref() {
            Some(current) if !drill.sentence_loading => {
                layout_tokens(&current.data.tokens, inner_width).height()
            }
            _ => 3,
        };
        let round = drill.round();

        let mut constraints = vec![
            Constraint::Length(sentence_rows.max(2) + 2),
            Constraint::Length(answer_box::height_for(drill.answer.value(), column.width)),
        ];
        if let Some(round) = round {
            constraints.push(Constraint::Length(answer_box::height_for(
                &round.reference,
                column.width,
            )));
            constraints.push(Constraint::Length(panel_height(
                drill.mode,
                drill.focus_words().len(),
            )));
        }
        constraints.push(Constraint::Length(1));
        constraints.push(Constraint::Length(1));
        constraints.push(Constraint::Min(0));

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(column);

        let (reference, judgments, rest) = if round.is_some() {
            (Some(rows[2]), Some(rows[3]), 4)
        } else {
            (None, None, 2)
        };

        Self {
            header: outer[0],
            sentence: rows[0],
            answer: rows[1],
            reference,
            judgments,
            proficiency: rows[rest],
            status: rows[rest + 1],
            footer: outer[2],
        }
    }
}

/// Footer hints for the drill in its current phase.
pub fn drill_hints(drill: &DrillController) -> Vec<&'static str> {
    let mut hints = Vec::new();
    if drill.round().is_none() {
        if drill.awaiting_reference() {
            let failed = drill
                .current
                .as_ref()
                .is_some_and(|c| c.reference == Reference::Failed);
            if failed {
                hints.push("[Enter] retry reference");
            }
        } else {
            hints.push("[Enter] submit");
            hints.push("[Shift+Enter] newline");
        }
    }
    hints.push("[Tab] next word");
    hints.push("[Ctrl+T] translate word");
    hints.push("[Ctrl+R] proficiency");
    hints.push("[Esc] quit drill");
    hints
}

/// Rows `text` occupies at `width` columns, counting explicit line breaks.
pub fn wrapped_line_count(text: &str, width: usize) -> usize {
    if width == 0 {
        return 0;
    }
    text.split('\n')
        .map(|line| line.chars().count().max(1).div_ceil(width))
        .sum()
}

pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    if width == 0 || hints.is_empty() {
        return Vec::new();
    }

    let prefix = "  ";
    let separator = "  ";
    let mut out: Vec<String> = Vec::new();
    let mut current = prefix.to_string();
    let mut has_hint = false;

    for hint in hints {
        if hint.is_empty() {
            continue;
        }
        let candidate = if has_hint {
            format!("{current}{separator}{hint}")
        } else {
            format!("{current}{hint}")
        };
        if candidate.chars().count() <= width {
            current = candidate;
            has_hint = true;
        } else {
            if has_hint {
                out.push(current);
            }
            current = format!("{prefix}{hint}");
            has_hint = true;
        }
    }

    if has_hint {
        out.push(current);
    }
    out
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    const MIN_POPUP_WIDTH: u16 = 60;
    const MIN_POPUP_HEIGHT: u16 = 18;

    let requested_w = area.width.saturating_mul(percent_x.min(100)) / 100;
    let requested_h = area.height.saturating_mul(percent_y.min(100)) / 100;

    let target_w = requested_w.max(MIN_POPUP_WIDTH).min(area.width);
    let target_h = requested_h.max(MIN_POPUP_HEIGHT).min(area.height);

    let left = area
        .x
        .saturating_add((area.width.saturating_sub(target_w)) / 2);
    let top = area
        .y
        .saturating_add((area.height.saturating_sub(target_h)) / 2);

    Rect::new(left, top, target_w, target_h)
}
