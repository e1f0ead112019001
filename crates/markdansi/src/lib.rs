#![forbid(unsafe_code)]
// Allow these clippy lints for API ergonomics and terminal text code
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::use_self)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::redundant_closure_for_method_calls)]

//! # Markdansi
//!
//! Renders markdown to styled or plain terminal text.
//!
//! Markdansi parses CommonMark (plus tables, strikethrough and task lists)
//! and lays it out for a terminal of a given width:
//! - Width-aware wrapping that measures graphemes and ignores escape codes
//! - Themeable ANSI styling, or plain text with identical layout
//! - Boxed code blocks with optional line numbers and a highlighter hook
//! - Tables that shrink to fit, truncating or wrapping cells
//! - OSC-8 hyperlinks where the terminal supports them
//! - A live renderer that redraws a growing document in place
//!
//! ## Example
//!
//! ```rust
//! use markdansi::{render, strip, Renderer, RenderOptions};
//!
//! // Plain text, 40 columns
//! let out = strip("# Hello\n\nThis is **bold** text.", &RenderOptions::new().with_width(40));
//! assert_eq!(out, "\nHello\nThis is bold text.\n");
//!
//! // Styled, with a named theme
//! let styled = render(
//!     "`code`",
//!     &RenderOptions::new().with_color(true).with_theme("bright"),
//! );
//! assert!(styled.contains("\x1b[32mcode"));
//!
//! // A reusable renderer
//! let renderer = Renderer::new().with_width(60).with_color(false);
//! let out = renderer.render("- one\n- two");
//! assert_eq!(out, "- one\n- two\n");
//! ```

pub mod ast;
mod code;
pub mod hyperlink;
pub mod live;
pub mod options;
pub mod parse;
mod render;
pub mod style;
pub mod table;
pub mod theme;
pub mod wrap;

pub use ast::{Align, Node};
pub use code::looks_like_diff;
pub use hyperlink::{hyperlinks_supported, osc8};
pub use live::{LiveOptions, LiveRenderer};
pub use options::{
    BorderKind, CodeOptions, Environment, Highlighter, RenderOptions, ResolvedOptions,
    TableOptions,
};
pub use parse::{parse, parse_bytes};
pub use render::render_tree;
pub use style::{StyleIntent, Styler};
pub use theme::{PartialTheme, Theme, ThemeChoice};
pub use wrap::{
    hard_wrap, strip_ansi, visible_width, wrap_text, wrap_with_prefix, OrphanPolicy,
};

// ============================================================================
// Convenience Functions
// ============================================================================

/// Renders markdown, filling unset options from the current terminal.
pub fn render(markdown: &str, options: &RenderOptions) -> String {
    render_with_env(markdown, options, &Environment::detect())
}

/// Renders markdown against an explicit terminal environment.
pub fn render_with_env(markdown: &str, options: &RenderOptions, env: &Environment) -> String {
    let resolved = options.resolve(env);
    render_tree(&parse(markdown), &resolved)
}

/// Renders markdown as plain text: the same layout as [`render`] with color
/// and hyperlinks forced off.
pub fn strip(markdown: &str, options: &RenderOptions) -> String {
    let plain = options.clone().with_color(false).with_hyperlinks(false);
    render(markdown, &plain)
}

/// Binds `options` into a reusable render function.
///
/// ```rust
/// use markdansi::{create_renderer, RenderOptions};
///
/// let render = create_renderer(RenderOptions::new().with_color(false).with_width(20));
/// assert_eq!(render("*hi*"), "hi\n");
/// ```
pub fn create_renderer(options: RenderOptions) -> impl Fn(&str) -> String + Send + Sync {
    move |markdown| render(markdown, &options)
}

// ============================================================================
// Renderer
// ============================================================================

/// Reusable markdown renderer.
///
/// Options are resolved on every call, so a renderer without an explicit
/// environment follows terminal resizes.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    options: RenderOptions,
    env: Option<Environment>,
}

impl Renderer {
    /// Creates a renderer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all options.
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Pins the terminal environment instead of probing it per call.
    pub fn with_environment(mut self, env: Environment) -> Self {
        self.env = Some(env);
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.options = self.options.with_width(width);
        self
    }

    pub fn with_wrap(mut self, wrap: bool) -> Self {
        self.options = self.options.with_wrap(wrap);
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.options = self.options.with_color(color);
        self
    }

    pub fn with_hyperlinks(mut self, hyperlinks: bool) -> Self {
        self.options = self.options.with_hyperlinks(hyperlinks);
        self
    }

    pub fn with_theme(mut self, theme: impl Into<ThemeChoice>) -> Self {
        self.options = self.options.with_theme(theme);
        self
    }

    /// Options this renderer was built with.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Renders markdown to terminal text.
    pub fn render(&self, markdown: &str) -> String {
        let env = self.env.unwrap_or_else(Environment::detect);
        render_with_env(markdown, &self.options, &env)
    }

    /// Renders UTF-8 markdown bytes.
    pub fn render_bytes(&self, markdown: &[u8]) -> Result<String, std::str::Utf8Error> {
        std::str::from_utf8(markdown).map(|text| self.render(text))
    }
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        create_renderer, render, render_with_env, strip, BorderKind, Environment, LiveOptions,
        LiveRenderer, OrphanPolicy, PartialTheme, RenderOptions, Renderer, StyleIntent,
        ThemeChoice,
    };
}

// ============================================================================
// Tests
// ============================================================================
