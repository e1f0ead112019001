//! Render options and their resolution.
//!
//! [`RenderOptions`] is what callers supply: every field optional. Resolution
//! against an [`Environment`] (terminal columns, TTY status, hyperlink support)
//! produces a fully populated [`ResolvedOptions`]. Every default lives in
//! [`RenderOptions::resolve`].

use std::fmt;
use std::io::IsTerminal;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::hyperlink;
use crate::theme::{Theme, ThemeChoice};
use crate::wrap::OrphanPolicy;

/// Fallback width when wrapping and the terminal width is unknown.
pub const DEFAULT_WIDTH: usize = 80;
const DEFAULT_LIST_INDENT: usize = 2;
const DEFAULT_QUOTE_PREFIX: &str = "│ ";
const DEFAULT_TABLE_PADDING: usize = 1;
const DEFAULT_TABLE_ELLIPSIS: &str = "…";

/// Per-line code highlighter: `(line, language) -> styled line`.
pub type Highlighter = Arc<dyn Fn(&str, Option<&str>) -> String + Send + Sync>;

// ============================================================================
// Ambient terminal state
// ============================================================================

/// Terminal state the defaults depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Environment {
    /// Terminal width in columns, if known.
    pub columns: Option<usize>,
    /// Whether color is appropriate for stdout (a TTY and `NO_COLOR` unset).
    pub is_tty: bool,
    /// Whether stdout's terminal understands OSC-8 hyperlinks.
    pub hyperlinks: bool,
}

impl Environment {
    /// A non-terminal environment with no width; useful for deterministic output.
    pub const PLAIN: Environment = Environment {
        columns: None,
        is_tty: false,
        hyperlinks: false,
    };

    /// Probes the current process's stdout and environment variables.
    pub fn detect() -> Self {
        let stdout_tty = std::io::stdout().is_terminal();
        let no_color = std::env::var("NO_COLOR").is_ok_and(|v| !v.is_empty());
        let env = Self {
            columns: detect_columns(),
            is_tty: stdout_tty && !no_color,
            hyperlinks: hyperlink::hyperlinks_supported(),
        };
        debug!(
            columns = ?env.columns,
            is_tty = env.is_tty,
            hyperlinks = env.hyperlinks,
            "detected environment"
        );
        env
    }
}

fn detect_columns() -> Option<usize> {
    #[cfg(feature = "native")]
    if let Ok((cols, _)) = crossterm::terminal::size() {
        if cols > 0 {
            return Some(usize::from(cols));
        }
    }
    std::env::var("COLUMNS")
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&cols| cols > 0)
}

// ============================================================================
// Table and code settings
// ============================================================================

/// Table border glyph set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderKind {
    /// Box-drawing characters.
    #[default]
    Unicode,
    /// `+`, `-` and `|`.
    Ascii,
    /// No box; cells joined with ` | `.
    None,
}

impl BorderKind {
    /// Parses a border name, falling back to [`BorderKind::Unicode`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "unicode" => BorderKind::Unicode,
            "ascii" => BorderKind::Ascii,
            "none" => BorderKind::None,
            other => {
                warn!(border = %other, "unknown table border, using unicode");
                BorderKind::Unicode
            }
        }
    }
}

/// User table settings; unset fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableOptions {
    pub border: Option<BorderKind>,
    pub padding: Option<usize>,
    pub dense: Option<bool>,
    pub truncate: Option<bool>,
    pub ellipsis: Option<String>,
}

/// User code block settings; unset fields take their defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodeOptions {
    /// Draw a box around multi-line blocks.
    pub boxed: Option<bool>,
    /// Show line numbers.
    pub gutter: Option<bool>,
    /// Hard-wrap long code lines to the available width.
    pub wrap: Option<bool>,
}

/// Resolved table settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSettings {
    pub border: BorderKind,
    pub padding: usize,
    pub dense: bool,
    pub truncate: bool,
    pub ellipsis: String,
}

/// Resolved code block settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeSettings {
    pub boxed: bool,
    pub gutter: bool,
    pub wrap: bool,
}

// ============================================================================
// RenderOptions
// ============================================================================

/// Caller-supplied render options.
///
/// ```rust
/// use markdansi::options::{Environment, RenderOptions};
///
/// let options = RenderOptions::new().with_width(60).with_color(false);
/// let resolved = options.resolve(&Environment::PLAIN);
/// assert_eq!(resolved.width, Some(60));
/// assert!(!resolved.hyperlinks);
/// ```
#[derive(Clone, Default)]
pub struct RenderOptions {
    pub wrap: Option<bool>,
    pub width: Option<usize>,
    pub color: Option<bool>,
    pub hyperlinks: Option<bool>,
    pub theme: Option<ThemeChoice>,
    pub highlighter: Option<Highlighter>,
    pub list_indent: Option<usize>,
    pub quote_prefix: Option<String>,
    pub table: TableOptions,
    pub code: CodeOptions,
    pub orphans: Option<OrphanPolicy>,
}

impl fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderOptions")
            .field("wrap", &self.wrap)
            .field("width", &self.width)
            .field("color", &self.color)
            .field("hyperlinks", &self.hyperlinks)
            .field("theme", &self.theme)
            .field("highlighter", &self.highlighter.as_ref().map(|_| "<fn>"))
            .field("list_indent", &self.list_indent)
            .field("quote_prefix", &self.quote_prefix)
            .field("table", &self.table)
            .field("code", &self.code)
            .field("orphans", &self.orphans)
            .finish()
    }
}

impl RenderOptions {
    /// Creates options with everything left to defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wrap(mut self, wrap: bool) -> Self {
        self.wrap = Some(wrap);
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = Some(color);
        self
    }

    /// Requests OSC-8 hyperlinks. Ignored when color is off.
    pub fn with_hyperlinks(mut self, hyperlinks: bool) -> Self {
        self.hyperlinks = Some(hyperlinks);
        self
    }

    pub fn with_theme(mut self, theme: impl Into<ThemeChoice>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    /// Sets a per-line code highlighter.
    pub fn with_highlighter<F>(mut self, highlighter: F) -> Self
    where
        F: Fn(&str, Option<&str>) -> String + Send + Sync + 'static,
    {
        self.highlighter = Some(Arc::new(highlighter));
        self
    }

    pub fn with_list_indent(mut self, indent: usize) -> Self {
        self.list_indent = Some(indent);
        self
    }

    pub fn with_quote_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.quote_prefix = Some(prefix.into());
        self
    }

    pub fn with_table_border(mut self, border: BorderKind) -> Self {
        self.table.border = Some(border);
        self
    }

    pub fn with_table_padding(mut self, padding: usize) -> Self {
        self.table.padding = Some(padding);
        self
    }

    pub fn with_table_dense(mut self, dense: bool) -> Self {
        self.table.dense = Some(dense);
        self
    }

    pub fn with_table_truncate(mut self, truncate: bool) -> Self {
        self.table.truncate = Some(truncate);
        self
    }

    pub fn with_table_ellipsis(mut self, ellipsis: impl Into<String>) -> Self {
        self.table.ellipsis = Some(ellipsis.into());
        self
    }

    pub fn with_code_box(mut self, boxed: bool) -> Self {
        self.code.boxed = Some(boxed);
        self
    }

    pub fn with_code_gutter(mut self, gutter: bool) -> Self {
        self.code.gutter = Some(gutter);
        self
    }

    pub fn with_code_wrap(mut self, wrap: bool) -> Self {
        self.code.wrap = Some(wrap);
        self
    }

    pub fn with_orphans(mut self, policy: OrphanPolicy) -> Self {
        self.orphans = Some(policy);
        self
    }

    /// Fills in every unset option from `env` and the built-in defaults.
    pub fn resolve(&self, env: &Environment) -> ResolvedOptions {
        let wrap = self.wrap.unwrap_or(true);
        let width = self
            .width
            .or_else(|| wrap.then(|| env.columns.unwrap_or(DEFAULT_WIDTH)));
        let color = self.color.unwrap_or(env.is_tty);
        let hyperlinks = color && self.hyperlinks.unwrap_or(env.hyperlinks);
        let theme = self.theme.clone().unwrap_or_default().resolve();

        let table = TableSettings {
            border: self.table.border.unwrap_or_default(),
            padding: self.table.padding.unwrap_or(DEFAULT_TABLE_PADDING),
            dense: self.table.dense.unwrap_or(false),
            truncate: self.table.truncate.unwrap_or(true),
            ellipsis: self
                .table
                .ellipsis
                .clone()
                .unwrap_or_else(|| DEFAULT_TABLE_ELLIPSIS.to_string()),
        };
        let code = CodeSettings {
            boxed: self.code.boxed.unwrap_or(true),
            gutter: self.code.gutter.unwrap_or(false),
            wrap: self.code.wrap.unwrap_or(true),
        };

        let resolved = ResolvedOptions {
            wrap,
            width,
            color,
            hyperlinks,
            theme,
            highlighter: self.highlighter.clone(),
            list_indent: self.list_indent.unwrap_or(DEFAULT_LIST_INDENT),
            quote_prefix: self
                .quote_prefix
                .clone()
                .unwrap_or_else(|| DEFAULT_QUOTE_PREFIX.to_string()),
            table,
            code,
            orphans: self.orphans.unwrap_or_default(),
        };
        debug!(
            wrap = resolved.wrap,
            width = ?resolved.width,
            color = resolved.color,
            hyperlinks = resolved.hyperlinks,
            "resolved render options"
        );
        resolved
    }
}

/// Fully populated options for one render call.
///
/// `hyperlinks` is never true while `color` is false.
#[derive(Clone)]
pub struct ResolvedOptions {
    pub wrap: bool,
    /// Target width; `None` means unbounded.
    pub width: Option<usize>,
    pub color: bool,
    pub hyperlinks: bool,
    pub theme: Theme,
    pub highlighter: Option<Highlighter>,
    pub list_indent: usize,
    pub quote_prefix: String,
    pub table: TableSettings,
    pub code: CodeSettings,
    pub orphans: OrphanPolicy,
}

impl fmt::Debug for ResolvedOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedOptions")
            .field("wrap", &self.wrap)
            .field("width", &self.width)
            .field("color", &self.color)
            .field("hyperlinks", &self.hyperlinks)
            .field("theme", &self.theme)
            .field("highlighter", &self.highlighter.as_ref().map(|_| "<fn>"))
            .field("list_indent", &self.list_indent)
            .field("quote_prefix", &self.quote_prefix)
            .field("table", &self.table)
            .field("code", &self.code)
            .field("orphans", &self.orphans)
            .finish()
    }
}
