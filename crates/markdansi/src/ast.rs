//! Markdown syntax tree.
//!
//! The tree is a closed sum type: every node kind the renderer understands is a
//! variant of [`Node`], so adding a kind is caught by exhaustive matches in the
//! render dispatcher instead of silently producing nothing.

/// Column alignment declared by a table's delimiter row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    /// No alignment given (rendered left-aligned).
    #[default]
    None,
    /// `:---`
    Left,
    /// `:---:`
    Center,
    /// `---:`
    Right,
}

impl From<pulldown_cmark::Alignment> for Align {
    fn from(alignment: pulldown_cmark::Alignment) -> Self {
        match alignment {
            pulldown_cmark::Alignment::None => Self::None,
            pulldown_cmark::Alignment::Left => Self::Left,
            pulldown_cmark::Alignment::Center => Self::Center,
            pulldown_cmark::Alignment::Right => Self::Right,
        }
    }
}

/// A node of the markdown syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Root of a parsed document.
    Document(Vec<Node>),
    /// A paragraph of inline content.
    Paragraph(Vec<Node>),
    /// An ATX or setext heading.
    Heading {
        /// Heading level, 1 through 6.
        level: u8,
        children: Vec<Node>,
    },
    /// `---`, `***` or `___`.
    ThematicBreak,
    /// `> quoted` block content.
    Blockquote(Vec<Node>),
    /// An ordered or bullet list.
    List {
        ordered: bool,
        /// First number of an ordered list.
        start: u64,
        /// Loose list: items separated by blank lines.
        spread: bool,
        items: Vec<Node>,
    },
    /// One list item; `checked` is set for task list items.
    ListItem {
        checked: Option<bool>,
        children: Vec<Node>,
    },
    /// Fenced or indented code block.
    Code {
        value: String,
        lang: Option<String>,
    },
    /// A table; the first row is the header.
    Table {
        align: Vec<Align>,
        rows: Vec<Node>,
    },
    /// A table row (header or body).
    TableRow(Vec<Node>),
    /// A table cell holding inline content.
    TableCell(Vec<Node>),
    /// Literal text. Soft line breaks appear as `'\n'`.
    Text(String),
    /// `_emphasis_`
    Emphasis(Vec<Node>),
    /// `**strong**`
    Strong(Vec<Node>),
    /// `~~deleted~~`
    Delete(Vec<Node>),
    /// `` `code` ``
    InlineCode(String),
    /// `[label](url "title")`
    Link {
        url: String,
        title: Option<String>,
        children: Vec<Node>,
    },
    /// `![alt](url "title")`
    Image {
        url: String,
        title: Option<String>,
        alt: Vec<Node>,
    },
    /// Hard line break (two trailing spaces or a backslash).
    Break,
    /// Raw HTML, block or inline. Never rendered.
    Html(String),
}

impl Node {
    /// Returns true for node kinds that live inside paragraphs.
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            Node::Text(_)
                | Node::Emphasis(_)
                | Node::Strong(_)
                | Node::Delete(_)
                | Node::InlineCode(_)
                | Node::Link { .. }
                | Node::Image { .. }
                | Node::Break
        )
    }

    /// Short lowercase name of the node kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Document(_) => "document",
            Node::Paragraph(_) => "paragraph",
            Node::Heading { .. } => "heading",
            Node::ThematicBreak => "thematic_break",
            Node::Blockquote(_) => "blockquote",
            Node::List { .. } => "list",
            Node::ListItem { .. } => "list_item",
            Node::Code { .. } => "code",
            Node::Table { .. } => "table",
            Node::TableRow(_) => "table_row",
            Node::TableCell(_) => "table_cell",
            Node::Text(_) => "text",
            Node::Emphasis(_) => "emphasis",
            Node::Strong(_) => "strong",
            Node::Delete(_) => "delete",
            Node::InlineCode(_) => "inline_code",
            Node::Link { .. } => "link",
            Node::Image { .. } => "image",
            Node::Break => "break",
            Node::Html(_) => "html",
        }
    }

    /// Child nodes of a container, or an empty slice for leaves.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Document(children)
            | Node::Paragraph(children)
            | Node::Heading { children, .. }
            | Node::Blockquote(children)
            | Node::ListItem { children, .. }
            | Node::TableRow(children)
            | Node::TableCell(children)
            | Node::Emphasis(children)
            | Node::Strong(children)
            | Node::Delete(children)
            | Node::Link { children, .. } => children,
            Node::List { items, .. } => items,
            Node::Table { rows, .. } => rows,
            Node::Image { alt, .. } => alt,
            Node::ThematicBreak
            | Node::Code { .. }
            | Node::Text(_)
            | Node::InlineCode(_)
            | Node::Break
            | Node::Html(_) => &[],
        }
    }

    /// Concatenated literal text of this node and its descendants.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(text) | Node::InlineCode(text) => out.push_str(text),
            Node::Code { value, .. } => out.push_str(value),
            Node::Break => out.push('\n'),
            _ => {
                for child in self.children() {
                    child.collect_text(out);
                }
            }
        }
    }
}
