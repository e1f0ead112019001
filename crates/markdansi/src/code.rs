//! Code block rendering: optional line-number gutter, hard wrapping and a
//! box with an inline language label.
//!
//! A boxed block with interior width `W` is `W + 4` columns wide on every
//! line:
//!
//! ```text
//! ┌ [bash]───────┐
//! │ echo hello   │
//! │ echo goodbye │
//! └──────────────┘
//! ```

use tracing::trace;

use crate::render::RenderContext;
use crate::wrap::{hard_wrap, truncate, visible_width};

const TOP_LEFT: &str = "┌";
const TOP_RIGHT: &str = "┐";
const BOTTOM_LEFT: &str = "└";
const BOTTOM_RIGHT: &str = "┘";
const HORIZONTAL: &str = "─";
const SIDE_LEFT: &str = "│ ";
const SIDE_RIGHT: &str = " │";
/// Columns the box adds around the interior.
const BOX_OVERHEAD: usize = 4;
const DIFF_LANG: &str = "diff";
const LABEL_ELLIPSIS: &str = "…";

/// Returns true when unlabelled code looks like a unified diff.
pub fn looks_like_diff(lines: &[&str]) -> bool {
    let file_header = lines
        .windows(2)
        .any(|pair| pair[0].starts_with("--- ") && pair[1].starts_with("+++ "));
    file_header || lines.iter().any(|line| line.starts_with("@@"))
}

/// One output row; `number` is set on the first chunk of each source line.
struct CodeRow {
    text: String,
    number: Option<usize>,
}

pub(crate) fn render_code_block(
    ctx: &RenderContext<'_>,
    value: &str,
    lang: Option<&str>,
    indent: usize,
    tight: bool,
) -> Vec<String> {
    let options = &ctx.options.code;
    let raw: Vec<&str> = value.split('\n').collect();

    let label = match lang {
        Some(lang) => Some(lang),
        None if looks_like_diff(&raw) => Some(DIFF_LANG),
        None => None,
    };
    let is_diff = label == Some(DIFF_LANG);
    let boxed = options.boxed && raw.len() > 1;

    let digits = raw.len().to_string().len();
    let gutter_width = if options.gutter { digits + 1 } else { 0 };

    let wrap_at = ctx
        .available_width(indent)
        .filter(|_| options.wrap && !is_diff)
        .map(|available| {
            let overhead = gutter_width + if boxed { BOX_OVERHEAD } else { 0 };
            available.saturating_sub(overhead).max(1)
        });
    trace!(lines = raw.len(), ?label, boxed, ?wrap_at, "render code block");

    let mut rows = Vec::with_capacity(raw.len());
    for (idx, line) in raw.iter().enumerate() {
        let chunks = match wrap_at {
            Some(width) if visible_width(line) > width => hard_wrap(line, width),
            _ => vec![(*line).to_string()],
        };
        for (part, chunk) in chunks.into_iter().enumerate() {
            rows.push(CodeRow {
                text: chunk,
                number: (part == 0).then_some(idx + 1),
            });
        }
    }

    let content: Vec<String> = rows
        .iter()
        .map(|row| {
            let body = highlight(ctx, &row.text, label);
            if !options.gutter {
                return body;
            }
            let number = row.number.map_or_else(String::new, |n| n.to_string());
            format!("{} {body}", ctx.dim(&format!("{number:>digits$}")))
        })
        .collect();

    let mut lines = if boxed {
        // Wrapped code keeps the box inside the width, label included.
        let label_cap = ctx
            .available_width(indent)
            .filter(|_| options.wrap)
            .map(|available| available.saturating_sub(BOX_OVERHEAD).max(1));
        draw_box(ctx, &content, label, label_cap)
    } else {
        content
    };
    if !tight {
        lines.push(String::new());
    }
    lines
}

fn highlight(ctx: &RenderContext<'_>, line: &str, lang: Option<&str>) -> String {
    match &ctx.options.highlighter {
        Some(highlighter) => highlighter(line, lang),
        None => ctx.paint(line, &ctx.options.theme.block_code),
    }
}

fn draw_box(
    ctx: &RenderContext<'_>,
    content: &[String],
    label: Option<&str>,
    label_cap: Option<usize>,
) -> Vec<String> {
    let label = label.map(|lang| match label_cap {
        Some(cap) if visible_width(lang) + 2 > cap => {
            format!("[{}]", truncate(lang, cap.saturating_sub(2).max(1), LABEL_ELLIPSIS))
        }
        _ => format!("[{lang}]"),
    });
    let label_width = label.as_deref().map_or(0, visible_width);
    let max_line = content.iter().map(|line| visible_width(line)).max().unwrap_or(0);
    let interior = max_line.max(label_width);

    let top = match &label {
        Some(label) => format!(
            "{TOP_LEFT} {label}{}{TOP_RIGHT}",
            HORIZONTAL.repeat(interior + 1 - label_width)
        ),
        None => format!("{TOP_LEFT}{}{TOP_RIGHT}", HORIZONTAL.repeat(interior + 2)),
    };
    let bottom = format!(
        "{BOTTOM_LEFT}{}{BOTTOM_RIGHT}",
        HORIZONTAL.repeat(interior + 2)
    );

    let left = ctx.dim(SIDE_LEFT);
    let right = ctx.dim(SIDE_RIGHT);
    let mut lines = Vec::with_capacity(content.len() + 2);
    lines.push(ctx.dim(&top));
    for line in content {
        let pad = interior.saturating_sub(visible_width(line));
        lines.push(format!("{left}{line}{}{right}", " ".repeat(pad)));
    }
    lines.push(ctx.dim(&bottom));
    lines
}
