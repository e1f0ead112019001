//! Table layout and rendering.
//!
//! Cells are rendered to inline text first, then columns are measured and,
//! when the table would overflow the width, the widest column is narrowed one
//! column at a time. Cells are then truncated or wrapped to their column,
//! aligned, and framed with the selected border glyphs.
//!
//! # Example
//!
//! ```rust
//! use markdansi::{strip, RenderOptions};
//!
//! let md = "| Name | Age |\n|------|----:|\n| Alice | 30 |";
//! let out = strip(md, &RenderOptions::new().with_width(40));
//! assert_eq!(
//!     out,
//!     "┌───────┬─────┐\n│ Name  │ Age │\n├───────┼─────┤\n│ Alice │  30 │\n└───────┴─────┘\n"
//! );
//! ```

use tracing::debug;

use crate::ast::{Align, Node};
use crate::options::BorderKind;
use crate::render::RenderContext;
use crate::wrap::{hard_wrap, truncate, visible_width, wrap_text_with};

/// Widest a column may start out before width negotiation.
pub const MAX_COLUMN_WIDTH: usize = 40;

// ============================================================================
// Border glyphs
// ============================================================================

/// Border characters for table rendering.
#[derive(Debug, Clone, Copy)]
pub struct TableBorder {
    /// Corner opening the top border.
    pub top_left: &'static str,
    /// Corner closing the top border.
    pub top_right: &'static str,
    /// Corner opening the bottom border.
    pub bottom_left: &'static str,
    /// Corner closing the bottom border.
    pub bottom_right: &'static str,
    /// Fill for horizontal border lines, repeated across each column.
    pub horizontal: &'static str,
    /// Outer edges of a row and the divider between its cells.
    pub vertical: &'static str,
    /// Where the header separator meets a column divider.
    pub cross: &'static str,
    /// Where the top border meets a column divider.
    pub top_t: &'static str,
    /// Where the bottom border meets a column divider.
    pub bottom_t: &'static str,
    /// Left end of the header separator.
    pub left_t: &'static str,
    /// Right end of the header separator.
    pub right_t: &'static str,
}

/// Box-drawing border.
pub const UNICODE_BORDER: TableBorder = TableBorder {
    top_left: "┌",
    top_right: "┐",
    bottom_left: "└",
    bottom_right: "┘",
    horizontal: "─",
    vertical: "│",
    cross: "┼",
    top_t: "┬",
    bottom_t: "┴",
    left_t: "├",
    right_t: "┤",
};

/// Plain ASCII border using `+`, `-` and `|`.
pub const ASCII_BORDER: TableBorder = TableBorder {
    top_left: "+",
    top_right: "+",
    bottom_left: "+",
    bottom_right: "+",
    horizontal: "-",
    vertical: "|",
    cross: "+",
    top_t: "+",
    bottom_t: "+",
    left_t: "+",
    right_t: "+",
};

/// Separator between cells when no border is drawn.
const PLAIN_SEPARATOR: &str = " | ";

/// Position of a horizontal border line within the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderPosition {
    Top,
    /// Between header and body.
    Middle,
    Bottom,
}

impl BorderKind {
    /// Glyph set for boxed borders; `None` for borderless tables.
    pub fn glyphs(self) -> Option<&'static TableBorder> {
        match self {
            BorderKind::Unicode => Some(&UNICODE_BORDER),
            BorderKind::Ascii => Some(&ASCII_BORDER),
            BorderKind::None => None,
        }
    }
}

/// Renders a horizontal border line.
///
/// `widths` are content widths; each column also spans `padding` on both
/// sides.
///
/// ```rust
/// use markdansi::table::{render_horizontal_border, BorderPosition, ASCII_BORDER};
///
/// let line = render_horizontal_border(&[5, 3, 7], &ASCII_BORDER, BorderPosition::Top, 1);
/// assert_eq!(line, "+-------+-----+---------+");
/// ```
pub fn render_horizontal_border(
    widths: &[usize],
    border: &TableBorder,
    position: BorderPosition,
    padding: usize,
) -> String {
    let (left, mid, right) = match position {
        BorderPosition::Top => (border.top_left, border.top_t, border.top_right),
        BorderPosition::Middle => (border.left_t, border.cross, border.right_t),
        BorderPosition::Bottom => (border.bottom_left, border.bottom_t, border.bottom_right),
    };
    let segments: Vec<String> = widths
        .iter()
        .map(|w| border.horizontal.repeat(w + padding * 2))
        .collect();
    format!("{left}{}{right}", segments.join(mid))
}

// ============================================================================
// Layout
// ============================================================================

/// Pads `content` to `width` columns according to `align`.
///
/// Centering puts the odd space on the right. Content already at or over
/// `width` is returned unchanged.
///
/// ```rust
/// use markdansi::ast::Align;
/// use markdansi::table::pad_content;
///
/// assert_eq!(pad_content("Hi", 6, Align::Left), "Hi    ");
/// assert_eq!(pad_content("Hi", 6, Align::Right), "    Hi");
/// assert_eq!(pad_content("Hi", 5, Align::Center), " Hi  ");
/// ```
pub fn pad_content(content: &str, width: usize, align: Align) -> String {
    let pad = width.saturating_sub(visible_width(content));
    if pad == 0 {
        return content.to_string();
    }
    match align {
        Align::None | Align::Left => format!("{content}{}", " ".repeat(pad)),
        Align::Right => format!("{}{content}", " ".repeat(pad)),
        Align::Center => {
            let left = pad / 2;
            format!("{}{content}{}", " ".repeat(left), " ".repeat(pad - left))
        }
    }
}

/// Columns a table adds around its content for the given border and padding.
pub fn border_overhead(columns: usize, border: BorderKind, padding: usize) -> usize {
    if columns == 0 {
        return 0;
    }
    match border {
        BorderKind::None => columns * padding * 2 + (columns - 1) * PLAIN_SEPARATOR.len(),
        BorderKind::Unicode | BorderKind::Ascii => columns * (padding * 2 + 1) + 1,
    }
}

/// Column content widths for a table, before any width negotiation.
///
/// Each column is as wide as its widest cell, capped at
/// [`MAX_COLUMN_WIDTH`] and at least one column.
pub fn natural_widths(cells: &[Vec<String>]) -> Vec<usize> {
    let columns = cells.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![1; columns];
    for row in cells {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(visible_width(cell).min(MAX_COLUMN_WIDTH));
        }
    }
    widths
}

/// Narrows columns until `overhead + sum(widths) <= limit`.
///
/// The first of the currently widest columns loses one column per step.
/// Columns never go below `floor`; if every column is at the floor the
/// table is left overflowing.
pub fn shrink_to_fit(widths: &mut [usize], overhead: usize, limit: usize, floor: usize) {
    let mut total: usize = widths.iter().sum::<usize>() + overhead;
    while total > limit {
        let Some((idx, &widest)) = widths
            .iter()
            .enumerate()
            .rev()
            .max_by_key(|(_, w)| **w)
        else {
            break;
        };
        if widest <= floor {
            break;
        }
        widths[idx] -= 1;
        total -= 1;
    }
}

// ============================================================================
// Rendering
// ============================================================================

pub(crate) fn render_table(
    ctx: &RenderContext<'_>,
    align: &[Align],
    rows: &[Node],
    indent: usize,
    tight: bool,
) -> Vec<String> {
    let settings = &ctx.options.table;
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            row.children()
                .iter()
                .map(|cell| ctx.render_inline(cell.children()).replace('\n', " "))
                .collect()
        })
        .collect();

    let mut widths = natural_widths(&cells);
    if widths.is_empty() {
        return Vec::new();
    }
    let overhead = border_overhead(widths.len(), settings.border, settings.padding);
    if ctx.options.wrap {
        if let Some(limit) = ctx.available_width(indent) {
            let floor = 1 + visible_width(&settings.ellipsis);
            let natural: usize = widths.iter().sum::<usize>() + overhead;
            shrink_to_fit(&mut widths, overhead, limit, floor);
            debug!(
                columns = widths.len(),
                natural,
                limit,
                widths = ?widths,
                "negotiated table widths"
            );
        }
    }

    let header_style = &ctx.options.theme.table_header;
    let cell_style = &ctx.options.theme.table_cell;
    let mut header = Vec::new();
    let mut body = Vec::new();
    for (row_idx, row) in cells.iter().enumerate() {
        let style = if row_idx == 0 { header_style } else { cell_style };
        let lines = layout_row(ctx, row, &widths, align)
            .into_iter()
            .map(|parts| {
                parts
                    .iter()
                    .map(|part| ctx.paint(part, style))
                    .collect::<Vec<_>>()
            });
        if row_idx == 0 {
            header.extend(lines);
        } else {
            body.extend(lines);
        }
    }

    let pad = " ".repeat(settings.padding);
    let mut out = Vec::new();
    match settings.border.glyphs() {
        None => {
            for parts in header.iter().chain(&body) {
                let padded: Vec<String> = parts.iter().map(|p| format!("{pad}{p}{pad}")).collect();
                out.push(padded.join(PLAIN_SEPARATOR).trim_end().to_string());
            }
        }
        Some(border) => {
            let line = |parts: &Vec<String>| {
                let padded: Vec<String> = parts.iter().map(|p| format!("{pad}{p}{pad}")).collect();
                format!("{v}{}{v}", padded.join(border.vertical), v = border.vertical)
            };
            let hline = |position| render_horizontal_border(&widths, border, position, settings.padding);
            out.push(hline(BorderPosition::Top));
            out.extend(header.iter().map(line));
            if !settings.dense && !body.is_empty() {
                out.push(hline(BorderPosition::Middle));
            }
            out.extend(body.iter().map(line));
            out.push(hline(BorderPosition::Bottom));
        }
    }
    if !tight {
        out.push(String::new());
    }
    out
}

/// Lays out one row: fits every cell to its column and pads the shorter
/// cells so all have the same number of lines.
fn layout_row(
    ctx: &RenderContext<'_>,
    row: &[String],
    widths: &[usize],
    align: &[Align],
) -> Vec<Vec<String>> {
    let settings = &ctx.options.table;
    let columns: Vec<Vec<String>> = widths
        .iter()
        .enumerate()
        .map(|(idx, &width)| {
            let cell = row.get(idx).map_or("", String::as_str);
            let lines = if settings.truncate {
                vec![truncate(cell, width, &settings.ellipsis)]
            } else {
                wrap_text_with(cell, width, true, ctx.options.orphans)
                    .into_iter()
                    .flat_map(|line| {
                        if visible_width(&line) > width {
                            hard_wrap(&line, width)
                        } else {
                            vec![line]
                        }
                    })
                    .collect()
            };
            let alignment = align.get(idx).copied().unwrap_or_default();
            lines
                .iter()
                .map(|line| pad_content(line, width, alignment))
                .collect()
        })
        .collect();

    let height = columns.iter().map(Vec::len).max().unwrap_or(1);
    (0..height)
        .map(|line| {
            columns
                .iter()
                .zip(widths)
                .map(|(col, &width)| col.get(line).cloned().unwrap_or_else(|| " ".repeat(width)))
                .collect()
        })
        .collect()
}
