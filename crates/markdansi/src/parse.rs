//! Markdown parsing.
//!
//! Folds the flat pulldown-cmark event stream into a [`Node`] tree using an
//! explicit stack of open frames. Every `Start` pushes a frame, every `End`
//! pops it and attaches the finished node to its parent.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::ast::{Align, Node};

/// Parser extensions enabled for every document.
fn parser_options() -> Options {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);
    opts
}

/// Parses markdown text into a document tree.
///
/// # Example
///
/// ```rust
/// use markdansi::ast::Node;
/// use markdansi::parse::parse;
///
/// let doc = parse("# Title\n\nbody");
/// let Node::Document(children) = doc else { unreachable!() };
/// assert!(matches!(children[0], Node::Heading { level: 1, .. }));
/// ```
pub fn parse(markdown: &str) -> Node {
    let mut builder = TreeBuilder::new();
    for event in Parser::new_ext(markdown, parser_options()) {
        builder.handle_event(event);
    }
    builder.finish()
}

/// Parses markdown bytes, failing on invalid UTF-8.
pub fn parse_bytes(markdown: &[u8]) -> Result<Node, std::str::Utf8Error> {
    let text = std::str::from_utf8(markdown)?;
    Ok(parse(text))
}

#[derive(Debug)]
enum FrameKind {
    Document,
    Paragraph,
    Heading(u8),
    Blockquote,
    List { start: Option<u64>, loose: bool },
    Item { checked: Option<bool>, paragraphs: bool },
    CodeBlock { lang: Option<String> },
    HtmlBlock,
    Table(Vec<Align>),
    TableHead,
    TableRow,
    TableCell,
    Emphasis,
    Strong,
    Delete,
    Link { url: String, title: Option<String> },
    Image { url: String, title: Option<String> },
    /// Container we do not model; its children are spliced into the parent.
    Transparent,
    /// Container whose content is dropped (footnote definitions, metadata).
    Discard,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    children: Vec<Node>,
    /// Literal buffer for code and HTML blocks.
    text: String,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            text: String::new(),
        }
    }
}

struct TreeBuilder {
    stack: Vec<Frame>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Frame::new(FrameKind::Document)],
        }
    }

    fn top(&mut self) -> &mut Frame {
        // The document frame is never popped before `finish`.
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn handle_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(text) => {
                if matches!(
                    self.top().kind,
                    FrameKind::CodeBlock { .. } | FrameKind::HtmlBlock
                ) {
                    self.top().text.push_str(&text);
                } else {
                    self.push_text(&text);
                }
            }
            Event::Code(code) => self.push(Node::InlineCode(code.into_string())),
            Event::InlineMath(math) | Event::DisplayMath(math) => self.push_text(&math),
            Event::Html(html) | Event::InlineHtml(html) => {
                if matches!(self.top().kind, FrameKind::HtmlBlock) {
                    self.top().text.push_str(&html);
                } else {
                    self.push(Node::Html(html.into_string()));
                }
            }
            Event::FootnoteReference(label) => self.push_text(&format!("[^{label}]")),
            Event::SoftBreak => self.push_text("\n"),
            Event::HardBreak => self.push(Node::Break),
            Event::Rule => self.push(Node::ThematicBreak),
            Event::TaskListMarker(checked) => self.mark_task(checked),
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        let kind = match tag {
            Tag::Paragraph => {
                if let FrameKind::Item { paragraphs, .. } = &mut self.top().kind {
                    *paragraphs = true;
                }
                FrameKind::Paragraph
            }
            Tag::Heading { level, .. } => FrameKind::Heading(level as u8),
            Tag::BlockQuote(_) => FrameKind::Blockquote,
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .filter(|lang| !lang.is_empty())
                        .map(str::to_string),
                    CodeBlockKind::Indented => None,
                };
                FrameKind::CodeBlock { lang }
            }
            Tag::HtmlBlock => FrameKind::HtmlBlock,
            Tag::List(start) => FrameKind::List { start, loose: false },
            Tag::Item => FrameKind::Item {
                checked: None,
                paragraphs: false,
            },
            Tag::Table(alignments) => {
                FrameKind::Table(alignments.into_iter().map(Align::from).collect())
            }
            Tag::TableHead => FrameKind::TableHead,
            Tag::TableRow => FrameKind::TableRow,
            Tag::TableCell => FrameKind::TableCell,
            Tag::Emphasis => FrameKind::Emphasis,
            Tag::Strong => FrameKind::Strong,
            Tag::Strikethrough => FrameKind::Delete,
            Tag::Link {
                dest_url, title, ..
            } => FrameKind::Link {
                url: dest_url.into_string(),
                title: non_empty(title.into_string()),
            },
            Tag::Image {
                dest_url, title, ..
            } => FrameKind::Image {
                url: dest_url.into_string(),
                title: non_empty(title.into_string()),
            },
            Tag::FootnoteDefinition(_) | Tag::MetadataBlock(_) => FrameKind::Discard,
            _ => FrameKind::Transparent,
        };
        self.stack.push(Frame::new(kind));
    }

    fn close(&mut self, _tag: TagEnd) {
        if self.stack.len() <= 1 {
            return;
        }
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let Frame {
            kind,
            children,
            mut text,
        } = frame;

        let node = match kind {
            FrameKind::Document => return,
            FrameKind::Paragraph => Node::Paragraph(children),
            FrameKind::Heading(level) => Node::Heading { level, children },
            FrameKind::Blockquote => Node::Blockquote(children),
            FrameKind::List { start, loose } => Node::List {
                ordered: start.is_some(),
                start: start.unwrap_or(1),
                spread: loose,
                items: children,
            },
            FrameKind::Item {
                checked,
                paragraphs,
            } => {
                if paragraphs {
                    if let FrameKind::List { loose, .. } = &mut self.top().kind {
                        *loose = true;
                    }
                }
                Node::ListItem {
                    checked,
                    children: group_inline_runs(children),
                }
            }
            FrameKind::CodeBlock { lang } => {
                if text.ends_with('\n') {
                    text.pop();
                }
                Node::Code { value: text, lang }
            }
            FrameKind::HtmlBlock => Node::Html(text),
            FrameKind::Table(align) => Node::Table {
                align,
                rows: children,
            },
            FrameKind::TableHead | FrameKind::TableRow => Node::TableRow(children),
            FrameKind::TableCell => Node::TableCell(children),
            FrameKind::Emphasis => Node::Emphasis(children),
            FrameKind::Strong => Node::Strong(children),
            FrameKind::Delete => Node::Delete(children),
            FrameKind::Link { url, title } => Node::Link {
                url,
                title,
                children,
            },
            FrameKind::Image { url, title } => Node::Image {
                url,
                title,
                alt: children,
            },
            FrameKind::Transparent => {
                for child in children {
                    self.push(child);
                }
                return;
            }
            FrameKind::Discard => return,
        };
        self.push(node);
    }

    fn push(&mut self, node: Node) {
        self.top().children.push(node);
    }

    /// Appends text, merging with a preceding text node.
    fn push_text(&mut self, text: &str) {
        let children = &mut self.top().children;
        if let Some(Node::Text(last)) = children.last_mut() {
            last.push_str(text);
        } else {
            children.push(Node::Text(text.to_string()));
        }
    }

    fn mark_task(&mut self, value: bool) {
        for frame in self.stack.iter_mut().rev() {
            if let FrameKind::Item { checked, .. } = &mut frame.kind {
                *checked = Some(value);
                return;
            }
        }
    }

    fn finish(mut self) -> Node {
        while self.stack.len() > 1 {
            self.close(TagEnd::Paragraph);
        }
        let children = self
            .stack
            .pop()
            .map(|frame| frame.children)
            .unwrap_or_default();
        Node::Document(children)
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

/// Wraps runs of inline nodes into paragraphs.
///
/// Tight list items carry their inline content directly; grouping it gives the
/// renderer the same shape as a loose item.
fn group_inline_runs(children: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::with_capacity(children.len());
    let mut run: Vec<Node> = Vec::new();
    for child in children {
        if child.is_inline() {
            run.push(child);
        } else {
            if !run.is_empty() {
                out.push(Node::Paragraph(std::mem::take(&mut run)));
            }
            out.push(child);
        }
    }
    if !run.is_empty() {
        out.push(Node::Paragraph(run));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks(markdown: &str) -> Vec<Node> {
        match parse(markdown) {
            Node::Document(children) => children,
            other => panic!("expected document, got {other:?}"),
        }
    }

    #[test]
    fn test_heading_and_paragraph() {
        let doc = blocks("## Title\n\nHello *world*");
        assert!(matches!(doc[0], Node::Heading { level: 2, .. }));
        let Node::Paragraph(inline) = &doc[1] else {
            panic!("expected paragraph");
        };
        assert_eq!(inline[0], Node::Text("Hello ".into()));
        assert_eq!(inline[1], Node::Emphasis(vec![Node::Text("world".into())]));
    }

    #[test]
    fn test_soft_break_stays_in_text() {
        let doc = blocks("Hello\nworld");
        assert_eq!(doc[0], Node::Paragraph(vec![Node::Text("Hello\nworld".into())]));
    }

    #[test]
    fn test_hard_break() {
        let doc = blocks("one  \ntwo");
        let Node::Paragraph(inline) = &doc[0] else {
            panic!("expected paragraph");
        };
        assert!(inline.contains(&Node::Break));
    }

    #[test]
    fn test_tight_list() {
        let doc = blocks("- a\n- b");
        let Node::List {
            ordered,
            spread,
            items,
            ..
        } = &doc[0]
        else {
            panic!("expected list");
        };
        assert!(!ordered);
        assert!(!spread);
        assert_eq!(items.len(), 2);
        let Node::ListItem { children, .. } = &items[0] else {
            panic!("expected item");
        };
        assert_eq!(children[0], Node::Paragraph(vec![Node::Text("a".into())]));
    }

    #[test]
    fn test_loose_list() {
        let doc = blocks("- a\n\n- b");
        assert!(matches!(doc[0], Node::List { spread: true, .. }));
    }

    #[test]
    fn test_ordered_start() {
        let doc = blocks("3. three\n4. four");
        assert!(matches!(
            doc[0],
            Node::List {
                ordered: true,
                start: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_task_items() {
        let doc = blocks("- [ ] open\n- [x] done\n- plain");
        let Node::List { items, .. } = &doc[0] else {
            panic!("expected list");
        };
        let checked: Vec<Option<bool>> = items
            .iter()
            .map(|item| match item {
                Node::ListItem { checked, .. } => *checked,
                _ => None,
            })
            .collect();
        assert_eq!(checked, vec![Some(false), Some(true), None]);
    }

    #[test]
    fn test_fenced_code() {
        let doc = blocks("```rust ignore\nfn main() {}\n```");
        assert_eq!(
            doc[0],
            Node::Code {
                value: "fn main() {}".into(),
                lang: Some("rust".into()),
            }
        );
    }

    #[test]
    fn test_unlabelled_code() {
        let doc = blocks("```\nfoo\nbar\n```");
        assert_eq!(
            doc[0],
            Node::Code {
                value: "foo\nbar".into(),
                lang: None,
            }
        );
    }

    #[test]
    fn test_table() {
        let doc = blocks("| A | B |\n|:--|--:|\n| 1 | 2 |");
        let Node::Table { align, rows } = &doc[0] else {
            panic!("expected table");
        };
        assert_eq!(align, &vec![Align::Left, Align::Right]);
        assert_eq!(rows.len(), 2);
        let Node::TableRow(cells) = &rows[1] else {
            panic!("expected row");
        };
        assert_eq!(cells[0], Node::TableCell(vec![Node::Text("1".into())]));
    }

    #[test]
    fn test_html_is_kept_as_html() {
        let doc = blocks("<div>ignored</div>");
        assert!(matches!(doc[0], Node::Html(_)));
    }

    #[test]
    fn test_link_and_image() {
        let doc = blocks("[x](https://example.com \"t\") ![alt](a.png)");
        let Node::Paragraph(inline) = &doc[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(
            inline[0],
            Node::Link {
                url: "https://example.com".into(),
                title: Some("t".into()),
                children: vec![Node::Text("x".into())],
            }
        );
        assert!(matches!(inline[2], Node::Image { .. }));
    }

    #[test]
    fn test_parse_bytes_rejects_invalid_utf8() {
        assert!(parse_bytes(&[0xff, 0xfe]).is_err());
        assert!(parse_bytes(b"ok").is_ok());
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(parse(""), Node::Document(Vec::new()));
    }
}
