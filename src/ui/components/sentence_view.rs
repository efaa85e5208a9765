use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Widget};

use crate::session::sentence::{Lookup, SentenceData, Token};
use crate::ui::components::loading::{LoadingBanner, LoadingDots};
use crate::ui::theme::Theme;

/// Screen rows used by one wrapped line of tokens: the annotation row above
/// and the token row itself.
pub const ROWS_PER_LINE: u16 = 2;

/// Position of one token inside the sentence area, in cells relative to the
/// area's inner origin. `line` counts wrapped token lines, not screen rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacedToken {
    pub index: usize,
    pub x: u16,
    pub line: u16,
    pub width: u16,
}

impl PlacedToken {
    pub fn row(&self) -> u16 {
        self.line * ROWS_PER_LINE + 1
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenLayout {
    pub placed: Vec<PlacedToken>,
    pub lines: u16,
}

impl TokenLayout {
    pub fn height(&self) -> u16 {
        self.lines * ROWS_PER_LINE
    }
}

fn cell_width(text: &str) -> u16 {
    Span::raw(text).width().min(u16::MAX as usize) as u16
}

/// Lay tokens out left to right, wrapping only between tokens. A token wider
/// than the whole line gets a line of its own and is clipped when drawn.
pub fn layout_tokens(tokens: &[Token], width: u16) -> TokenLayout {
    if width == 0 || tokens.is_empty() {
        return TokenLayout::default();
    }

    let mut placed = Vec::with_capacity(tokens.len());
    let mut x = 0u16;
    let mut line = 0u16;

    for (index, token) in tokens.iter().enumerate() {
        let w = cell_width(&token.text);
        if x > 0 && x.saturating_add(w) > width {
            line += 1;
            x = 0;
        }
        placed.push(PlacedToken {
            index,
            x,
            line,
            width: w,
        });
        x = x.saturating_add(w);

        let ws = token.display_ws();
        if ws.contains('\n') {
            line += ws.matches('\n').count() as u16;
            x = 0;
        } else {
            x = x.saturating_add(cell_width(ws));
        }
    }

    let ends_on_break = tokens
        .last()
        .is_some_and(|t| t.trailing_ws.contains('\n'));
    let lines = if ends_on_break { line } else { line + 1 };
    TokenLayout {
        placed,
        lines: lines.max(1),
    }
}

/// Area the tokens are drawn in, inside the sentence block's border.
pub fn token_origin(area: Rect) -> Rect {
    sentence_block().inner(area)
}

/// Token index under the terminal cell (`column`, `row`), if any. Only the
/// token row counts; the annotation row above it is not a target.
pub fn hit_test(layout: &TokenLayout, inner: Rect, column: u16, row: u16) -> Option<usize> {
    if column < inner.x || row < inner.y {
        return None;
    }
    let (cx, cy) = (column - inner.x, row - inner.y);
    layout
        .placed
        .iter()
        .find(|p| p.row() == cy && cx >= p.x && cx < p.x.saturating_add(p.width))
        .map(|p| p.index)
}

fn sentence_block<'a>() -> Block<'a> {
    Block::bordered().title(" Sentence ")
}

pub struct SentenceView<'a> {
    data: Option<&'a SentenceData>,
    hovered: Option<u32>,
    loading: bool,
    dots: &'a LoadingDots,
    theme: &'a Theme,
}

impl<'a> SentenceView<'a> {
    pub fn new(
        data: Option<&'a SentenceData>,
        hovered: Option<u32>,
        loading: bool,
        dots: &'a LoadingDots,
        theme: &'a Theme,
    ) -> Self {
        Self {
            data,
            hovered,
            loading,
            dots,
            theme,
        }
    }

    fn annotation(&self, lookup: &Lookup) -> Option<(String, Style)> {
        let colors = &self.theme.colors;
        let base = Style::default().bg(colors.annotation_bg());
        match lookup {
            Lookup::Idle => None,
            Lookup::Loading => Some((
                format!("Loading{}", self.dots.suffix()),
                base.fg(colors.text_dim()),
            )),
            Lookup::Ready(text) => Some((text.clone(), base.fg(colors.accent()))),
            Lookup::Failed => Some(("translation failed".to_string(), base.fg(colors.error()))),
        }
    }
}

impl Widget for SentenceView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = sentence_block()
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        if self.loading {
            let banner_row = Rect::new(inner.x, inner.y + inner.height / 2, inner.width, 1);
            LoadingBanner::new("Generating sentence", self.dots, self.theme).render(banner_row, buf);
            return;
        }

        let Some(data) = self.data else {
            buf.set_string(
                inner.x,
                inner.y,
                "No sentence loaded. Press Enter to try again.",
                Style::default().fg(colors.text_dim()),
            );
            return;
        };

        let layout = layout_tokens(&data.tokens, inner.width);
        let right = inner.x + inner.width;
        let bottom = inner.y + inner.height;

        for placed in &layout.placed {
            let token = &data.tokens[placed.index];
            let y = inner.y + placed.row();
            if y >= bottom {
                break;
            }
            let x = inner.x + placed.x;
            let hovered = token.id.is_some() && token.id == self.hovered;

            let mut style = Style::default().fg(colors.fg());
            if hovered {
                style = style
                    .fg(colors.token_hover_fg())
                    .bg(colors.token_hover_bg());
            } else if token.is_clickable() && token.lookup.is_clicked() {
                style = style.add_modifier(Modifier::UNDERLINED);
            } else if !token.is_clickable() {
                style = style.fg(colors.text_dim());
            }
            buf.set_stringn(x, y, &token.text, (right - x) as usize, style);

            if hovered {
                if let Some((text, style)) = self.annotation(&token.lookup) {
                    buf.set_stringn(x, y - 1, &text, (right - x) as usize, style);
                }
            }
        }
    }
}
