//! Tree-to-text render engine.
//!
//! Rendering is one recursive walk over the syntax tree. Block renderers
//! return the lines they produce (without newlines); the only state threaded
//! downward is the list indent level, the tight-list flag and, inside block
//! quotes, a narrowed width.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::ast::Node;
use crate::code;
use crate::hyperlink::osc8;
use crate::options::ResolvedOptions;
use crate::style::{StyleIntent, Styler};
use crate::table;
use crate::wrap::{strip_ansi, visible_width, wrap_text_with, wrap_with_prefix_and};

/// Width of a thematic break, and its cap when wrapping.
const HR_WIDTH: usize = 40;
const HR_GLYPH: &str = "—";
const BULLET: &str = "-";

/// A `[label]: target` line left in a paragraph, e.g. a definition that
/// could not interrupt the paragraph above it.
static DEFINITION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[[^\]]+\]:\s").expect("static pattern")
});

/// Renders a parsed tree with resolved options.
///
/// The result ends with exactly one newline, or is empty when nothing
/// renders. With color off it contains no escape sequences at all.
pub fn render_tree(tree: &Node, options: &ResolvedOptions) -> String {
    let ctx = RenderContext::new(options);
    let lines = match tree {
        Node::Document(children) => ctx.render_blocks(children, 0, false),
        other => ctx.render_blocks(std::slice::from_ref(other), 0, false),
    };

    let mut body = lines.join("\n");
    let trimmed = body.trim_end_matches('\n').len();
    body.truncate(trimmed);
    if !body.is_empty() {
        body.push('\n');
    }
    if options.color {
        body
    } else {
        strip_ansi(&body)
    }
}

/// Per-call rendering state.
#[derive(Clone, Copy)]
pub(crate) struct RenderContext<'a> {
    pub options: &'a ResolvedOptions,
    pub styler: Styler,
    /// Width available to this subtree; narrower than the option inside quotes.
    pub width: Option<usize>,
}

impl<'a> RenderContext<'a> {
    pub fn new(options: &'a ResolvedOptions) -> Self {
        Self {
            options,
            styler: Styler::new(options.color),
            width: options.width,
        }
    }

    pub fn paint(&self, text: &str, intent: &StyleIntent) -> String {
        self.styler.paint(text, intent)
    }

    pub fn dim(&self, text: &str) -> String {
        self.styler.paint(text, &StyleIntent::new().dim())
    }

    /// Width for prose wrapping.
    pub fn wrap_width(&self) -> usize {
        self.width.unwrap_or(crate::options::DEFAULT_WIDTH)
    }

    /// Columns taken by list indentation at `indent`.
    pub fn indent_width(&self, indent: usize) -> usize {
        self.options.list_indent * indent
    }

    /// Width left for a block nested `indent` levels deep, if bounded.
    pub fn available_width(&self, indent: usize) -> Option<usize> {
        self.width
            .map(|w| w.saturating_sub(self.indent_width(indent)).max(1))
    }

    // ========================================================================
    // Blocks
    // ========================================================================

    /// Renders sibling blocks, never leaving two blank lines between them.
    pub fn render_blocks(&self, nodes: &[Node], indent: usize, tight: bool) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for node in nodes {
            let mut lines = self.render_block(node, indent, tight);
            if out.last().is_some_and(String::is_empty)
                && lines.first().is_some_and(String::is_empty)
            {
                lines.remove(0);
            }
            out.extend(lines);
        }
        out
    }

    fn render_block(&self, node: &Node, indent: usize, tight: bool) -> Vec<String> {
        trace!(kind = node.kind(), indent, tight, "render block");
        match node {
            Node::Document(children) => self.render_blocks(children, indent, tight),
            Node::Paragraph(children) => self.render_paragraph(children, indent, tight),
            Node::Heading { children, .. } => self.render_heading(children),
            Node::ThematicBreak => self.render_hr(),
            Node::Blockquote(children) => self.render_blockquote(children, indent, tight),
            Node::List {
                ordered,
                start,
                spread,
                items,
            } => self.render_list(items, *ordered, *start, *spread, indent),
            Node::ListItem { .. } => self.render_list_item(node, BULLET, indent, tight),
            Node::Code { value, lang } => {
                code::render_code_block(self, value, lang.as_deref(), indent, tight)
            }
            Node::Table { align, rows } => table::render_table(self, align, rows, indent, tight),
            inline if inline.is_inline() => {
                self.render_paragraph(std::slice::from_ref(inline), indent, tight)
            }
            _ => Vec::new(),
        }
    }

    fn render_paragraph(&self, children: &[Node], indent: usize, tight: bool) -> Vec<String> {
        let text = self.render_inline(children);
        let prefix = " ".repeat(self.indent_width(indent));
        let mut lines: Vec<String> = wrap_with_prefix_and(
            &text,
            self.wrap_width(),
            self.options.wrap,
            &prefix,
            self.options.orphans,
        )
        .into_iter()
        .map(|line| if line.trim().is_empty() { String::new() } else { line })
        .collect();
        if !tight {
            lines.push(String::new());
        }
        lines
    }

    /// Headings are never wrapped.
    fn render_heading(&self, children: &[Node]) -> Vec<String> {
        let text = self.render_inline(children).replace('\n', " ");
        vec![String::new(), self.paint(&text, &self.options.theme.heading)]
    }

    fn render_hr(&self) -> Vec<String> {
        let width = if self.options.wrap {
            self.width.unwrap_or(HR_WIDTH).min(HR_WIDTH)
        } else {
            HR_WIDTH
        };
        vec![self.paint(&HR_GLYPH.repeat(width), &self.options.theme.hr)]
    }

    fn render_blockquote(&self, children: &[Node], indent: usize, tight: bool) -> Vec<String> {
        let prefix_width = visible_width(&self.options.quote_prefix);
        let outer = self.indent_width(indent);
        // Children render flush left; the enclosing list item re-indents the
        // quoted lines as a whole.
        let inner = RenderContext {
            width: self
                .width
                .map(|w| w.saturating_sub(outer + prefix_width).max(1)),
            ..*self
        };
        let body = inner.render_blocks(children, 0, false).join("\n");
        let prefix = self.paint(&self.options.quote_prefix, &self.options.theme.quote);
        let mut lines = wrap_with_prefix_and(
            body.trim_end(),
            self.wrap_width().saturating_sub(outer).max(1),
            self.options.wrap,
            &prefix,
            self.options.orphans,
        );
        if !tight {
            lines.push(String::new());
        }
        lines
    }

    fn render_list(
        &self,
        items: &[Node],
        ordered: bool,
        start: u64,
        spread: bool,
        indent: usize,
    ) -> Vec<String> {
        let tight = !spread;
        if let Some((value, lang)) = collapse_code_items(items) {
            return code::render_code_block(self, &value, lang.as_deref(), indent, tight);
        }

        let mut lines = Vec::new();
        let mut number = start;
        for item in items {
            let marker = if ordered {
                format!("{number}.")
            } else {
                BULLET.to_string()
            };
            number = number.saturating_add(1);
            lines.extend(self.render_list_item(item, &marker, indent, tight));
        }
        if indent == 0 && tight && !lines.is_empty() {
            lines.push(String::new());
        }
        lines
    }

    /// Renders one item: marker (or task box) on the first content line,
    /// continuation lines aligned under the content.
    fn render_list_item(&self, item: &Node, marker: &str, indent: usize, tight: bool) -> Vec<String> {
        let (checked, children) = match item {
            Node::ListItem { checked, children } => (*checked, children.as_slice()),
            other => (None, std::slice::from_ref(other)),
        };
        let marker = match checked {
            Some(true) => "[x]",
            Some(false) => "[ ]",
            None => marker,
        };
        let marker = self.paint(marker, &self.options.theme.list_marker);
        let lead = " ".repeat(self.indent_width(indent));
        let child_indent = self.indent_width(indent + 1);

        let body = self.render_blocks(children, indent + 1, tight).join("\n");
        let mut content = body
            .trim_end()
            .split('\n')
            .skip_while(|line| line.trim().is_empty());

        let mut lines = Vec::new();
        match content.next() {
            Some(first) => {
                let first = first.trim_start();
                // A marker wider than the list indent pushes the first line past
                // the width the body was wrapped for.
                let room = self
                    .wrap_width()
                    .saturating_sub(lead.len() + visible_width(&marker) + 1)
                    .max(1);
                let rewrap = self.options.wrap
                    && matches!(children.first(), Some(Node::Paragraph(_)))
                    && visible_width(first) > room;
                if rewrap {
                    let mut pieces =
                        wrap_text_with(first, room, true, self.options.orphans).into_iter();
                    let head = pieces.next().unwrap_or_default();
                    lines.push(format!("{lead}{marker} {head}"));
                    let continuation = " ".repeat(child_indent);
                    lines.extend(pieces.map(|piece| format!("{continuation}{piece}")));
                } else {
                    lines.push(format!("{lead}{marker} {first}"));
                }
            }
            None => lines.push(format!("{lead}{marker}")),
        }
        for line in content {
            if line.is_empty() {
                lines.push(String::new());
                continue;
            }
            let spaces = line.len() - line.trim_start_matches(' ').len();
            let rest = &line[spaces.min(child_indent)..];
            lines.push(format!("{}{rest}", " ".repeat(child_indent)));
        }
        if !tight {
            lines.push(String::new());
        }
        lines
    }

    // ========================================================================
    // Inline content
    // ========================================================================

    /// Concatenates inline nodes into one styled run. Soft breaks become
    /// spaces; hard breaks stay as newlines.
    pub fn render_inline(&self, nodes: &[Node]) -> String {
        let theme = &self.options.theme;
        let mut out = String::new();
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(&soften_breaks(text)),
                Node::Emphasis(children) => {
                    out.push_str(&self.paint(&self.render_inline(children), &theme.emph));
                }
                Node::Strong(children) => {
                    out.push_str(&self.paint(&self.render_inline(children), &theme.strong));
                }
                Node::Delete(children) => {
                    let strike = StyleIntent::new().strike();
                    out.push_str(&self.paint(&self.render_inline(children), &strike));
                }
                Node::InlineCode(value) => out.push_str(&self.paint(value, &theme.inline_code)),
                Node::Link { url, children, .. } => {
                    out.push_str(&self.render_link(url, children));
                }
                Node::Image { url, alt, .. } => out.push_str(&self.render_link(url, alt)),
                Node::Break => out.push('\n'),
                Node::Html(_) => {}
                other => {
                    trace!(kind = other.kind(), "skipping block node in inline context");
                }
            }
        }
        out
    }

    fn render_link(&self, url: &str, label: &[Node]) -> String {
        let mut text = self.render_inline(label);
        if text.is_empty() {
            text = url.to_string();
        }
        if self.options.hyperlinks && !url.is_empty() {
            return osc8(url, &text);
        }
        let styled = self.paint(&text, &self.options.theme.link);
        if !url.is_empty() && strip_ansi(&text) != url {
            format!("{styled}{}", self.dim(&format!(" ({url})")))
        } else {
            styled
        }
    }
}

/// Joins soft-broken lines with spaces. A `[label]: target` line keeps its
/// own line and is set off from the prose above it by a blank line.
fn soften_breaks(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    let mut after_definition = false;
    for (idx, segment) in text.split('\n').enumerate() {
        let definition = DEFINITION_LINE.is_match(segment);
        if idx > 0 {
            out.push_str(match (definition, after_definition) {
                (true, false) => "\n\n",
                (true, true) | (false, true) => "\n",
                (false, false) => " ",
            });
        }
        out.push_str(segment);
        after_definition = definition;
    }
    out
}

/// A list whose items are each a single code block, merged into one block.
///
/// The language survives only when every item agrees on it.
fn collapse_code_items(items: &[Node]) -> Option<(String, Option<String>)> {
    if items.is_empty() {
        return None;
    }
    let mut values = Vec::with_capacity(items.len());
    let mut langs = Vec::with_capacity(items.len());
    for item in items {
        match item.children() {
            [Node::Code { value, lang }] => {
                values.push(value.as_str());
                langs.push(lang.as_deref());
            }
            _ => return None,
        }
    }
    let lang = langs[0].filter(|first| langs.iter().all(|l| l == &Some(*first)));
    Some((values.join("\n"), lang.map(str::to_string)))
}
