#![forbid(unsafe_code)]
// Allow pedantic lints for early-stage API ergonomics.
#![allow(clippy::nursery)]
#![allow(clippy::pedantic)]

//! # markdansi CLI
//!
//! Command-line front end for the `markdansi` renderer.
//!
//! The binary is a thin wrapper; argument parsing, option mapping and the
//! input/output plumbing live here so they can be tested without spawning a
//! process.
//!
//! ## CLI usage
//!
//! ```bash
//! markdansi README.md
//! markdansi --width 60 --theme bright README.md
//! markdansi --no-color --table-border ascii -i notes.md -o notes.txt
//! cat README.md | markdansi -
//! slow-producer | markdansi --live
//! ```
//!
//! ## Library usage
//!
//! ```rust
//! use clap::Parser;
//! use markdansi_cli::Cli;
//!
//! let cli = Cli::try_parse_from(["markdansi", "--width", "60", "--no-color"]).unwrap();
//! let options = cli.render_options().unwrap();
//! assert_eq!(options.width, Some(60));
//! assert_eq!(options.color, Some(false));
//! ```

use std::borrow::Cow;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use markdansi::{
    BorderKind, Environment, LiveOptions, LiveRenderer, OrphanPolicy, PartialTheme,
    RenderOptions,
};
use thiserror::Error;
use tracing::debug;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "MARKDANSI_LOG";

const STDIN_NAME: &str = "<stdin>";
const LIVE_CHUNK: usize = 8 * 1024;

// =============================================================================
// Errors
// =============================================================================

/// Everything that can stop the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    ReadInput { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", path.display())]
    WriteOutput { path: PathBuf, source: io::Error },

    #[error("failed to read theme file {}: {source}", path.display())]
    ReadTheme { path: PathBuf, source: io::Error },

    #[error("invalid theme file {}: {source}", path.display())]
    ParseTheme {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write to stdout: {0}")]
    Stdout(#[source] io::Error),
}

impl CliError {
    /// True when stdout was closed by the reader (e.g. `markdansi | head`).
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, CliError::Stdout(err) if err.kind() == io::ErrorKind::BrokenPipe)
    }
}

// =============================================================================
// Arguments
// =============================================================================

/// Table border style accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TableBorder {
    Unicode,
    Ascii,
    None,
}

impl From<TableBorder> for BorderKind {
    fn from(border: TableBorder) -> Self {
        match border {
            TableBorder::Unicode => BorderKind::Unicode,
            TableBorder::Ascii => BorderKind::Ascii,
            TableBorder::None => BorderKind::None,
        }
    }
}

/// Render markdown to styled terminal text.
///
/// Options left unset fall back to the terminal: width from its columns (or
/// 80), color when stdout is a terminal and `NO_COLOR` is unset, hyperlinks
/// when the terminal is known to support them.
#[derive(Debug, Parser)]
#[command(name = "markdansi", version, about, long_about = None)]
pub struct Cli {
    /// Markdown file to render (`-` or absent reads stdin)
    #[arg(value_name = "FILE", conflicts_with = "input")]
    pub file: Option<PathBuf>,

    /// Input file (default: stdin)
    #[arg(short = 'i', long = "in", value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long = "out", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Wrap width (default: terminal columns or 80)
    #[arg(long, value_name = "N")]
    pub width: Option<usize>,

    /// Disable hard wrapping
    #[arg(long)]
    pub no_wrap: bool,

    /// Force ANSI styling on
    #[arg(long, overrides_with = "no_color")]
    pub color: bool,

    /// Disable ANSI and OSC output
    #[arg(long, overrides_with = "color")]
    pub no_color: bool,

    /// Force OSC-8 hyperlinks on (still requires color)
    #[arg(long, overrides_with = "no_links")]
    pub links: bool,

    /// Disable OSC-8 hyperlinks
    #[arg(long, overrides_with = "links")]
    pub no_links: bool,

    /// Built-in theme: default, dim, bright, solarized, monochrome, contrast
    #[arg(long, value_name = "NAME", conflicts_with = "theme_file")]
    pub theme: Option<String>,

    /// JSON theme file; roles it names override the default theme
    #[arg(long, value_name = "JSON")]
    pub theme_file: Option<PathBuf>,

    /// Spaces per list nesting level (default: 2)
    #[arg(long, value_name = "N")]
    pub list_indent: Option<usize>,

    /// Prefix for block quote lines (default: "│ ")
    #[arg(long, value_name = "STR", allow_hyphen_values = true)]
    pub quote_prefix: Option<String>,

    /// Table border style
    #[arg(long, value_enum, value_name = "KIND")]
    pub table_border: Option<TableBorder>,

    /// Spaces around table cell content (default: 1)
    #[arg(long, value_name = "N")]
    pub table_padding: Option<usize>,

    /// Omit the separator row under the table header
    #[arg(long)]
    pub table_dense: bool,

    /// Truncate overflowing cells instead of wrapping (default: true)
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub table_truncate: Option<bool>,

    /// Ellipsis for truncated cells (default: "…")
    #[arg(long, value_name = "STR")]
    pub table_ellipsis: Option<String>,

    /// Wrap long code lines (default: true)
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub code_wrap: Option<bool>,

    /// Draw a box around multi-line code blocks (default: true)
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub code_box: Option<bool>,

    /// Number code lines (default: false)
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub code_gutter: Option<bool>,

    /// Plain greedy wrapping; let short words dangle at line ends
    #[arg(long)]
    pub no_orphans: bool,

    /// Redraw the rendering in place as stdin arrives
    #[arg(long, conflicts_with_all = ["output", "input", "file"])]
    pub live: bool,
}

impl Cli {
    /// The file to read, or `None` for stdin.
    pub fn input_path(&self) -> Option<&Path> {
        self.input
            .as_deref()
            .or(self.file.as_deref())
            .filter(|path| *path != Path::new("-"))
    }

    /// Explicit color choice, if any.
    pub fn color_choice(&self) -> Option<bool> {
        tri_state(self.color, self.no_color)
    }

    /// Explicit hyperlink choice, if any.
    pub fn hyperlink_choice(&self) -> Option<bool> {
        tri_state(self.links, self.no_links)
    }

    /// Maps the arguments onto render options. Only flags that were given
    /// are set; everything else is left to the resolver.
    pub fn render_options(&self) -> Result<RenderOptions, CliError> {
        let mut options = RenderOptions::new();
        if self.no_wrap {
            options = options.with_wrap(false);
        }
        if let Some(width) = self.width {
            options = options.with_width(width);
        }
        if let Some(color) = self.color_choice() {
            options = options.with_color(color);
        }
        if let Some(links) = self.hyperlink_choice() {
            options = options.with_hyperlinks(links);
        }
        if let Some(path) = &self.theme_file {
            options = options.with_theme(load_theme(path)?);
        } else if let Some(name) = &self.theme {
            options = options.with_theme(name.as_str());
        }
        if let Some(indent) = self.list_indent {
            options = options.with_list_indent(indent);
        }
        if let Some(prefix) = &self.quote_prefix {
            options = options.with_quote_prefix(prefix.clone());
        }
        if let Some(border) = self.table_border {
            options = options.with_table_border(border.into());
        }
        if let Some(padding) = self.table_padding {
            options = options.with_table_padding(padding);
        }
        if self.table_dense {
            options = options.with_table_dense(true);
        }
        if let Some(truncate) = self.table_truncate {
            options = options.with_table_truncate(truncate);
        }
        if let Some(ellipsis) = &self.table_ellipsis {
            options = options.with_table_ellipsis(ellipsis.clone());
        }
        if let Some(wrap) = self.code_wrap {
            options = options.with_code_wrap(wrap);
        }
        if let Some(boxed) = self.code_box {
            options = options.with_code_box(boxed);
        }
        if let Some(gutter) = self.code_gutter {
            options = options.with_code_gutter(gutter);
        }
        if self.no_orphans {
            options = options.with_orphans(OrphanPolicy::Allow);
        }
        Ok(options)
    }
}

fn tri_state(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

// =============================================================================
// Input / output
// =============================================================================

/// Loads a JSON theme file.
pub fn load_theme(path: &Path) -> Result<PartialTheme, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::ReadTheme {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::ParseTheme {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads markdown from `path`, or all of stdin when `path` is `None`.
pub fn read_input(path: Option<&Path>) -> Result<String, CliError> {
    match path {
        Some(path) => fs::read_to_string(path).map_err(|source| CliError::ReadInput {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            let mut text = String::new();
            io::stdin()
                .lock()
                .read_to_string(&mut text)
                .map_err(|source| CliError::ReadInput {
                    path: PathBuf::from(STDIN_NAME),
                    source,
                })?;
            Ok(text)
        }
    }
}

/// Writes the rendering to `path`, or to stdout when `path` is `None`.
pub fn write_output(path: Option<&Path>, rendered: &str) -> Result<(), CliError> {
    match path {
        Some(path) => fs::write(path, rendered).map_err(|source| CliError::WriteOutput {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(CliError::Stdout)
        }
    }
}

/// Terminal environment for the chosen destination. A file is never a
/// terminal, so it gets no styling unless forced.
pub fn environment_for(output: Option<&Path>) -> Environment {
    let env = Environment::detect();
    match output {
        Some(_) => Environment {
            is_tty: false,
            hyperlinks: false,
            ..env
        },
        None => env,
    }
}

// =============================================================================
// Commands
// =============================================================================

/// Runs the CLI once: read, render, write.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    let options = cli.render_options()?;
    debug!(?options, live = cli.live, "parsed command line");

    if cli.live {
        return run_live(options, io::stdin().lock(), io::stdout().lock());
    }

    let markdown = read_input(cli.input_path())?;
    let output = cli.output.as_deref();
    let rendered = markdansi::render_with_env(&markdown, &options, &environment_for(output));
    write_output(output, &rendered)
}

/// Re-renders the accumulated input after every chunk read from `input`,
/// redrawing the frame in place on `out`.
pub fn run_live<R: Read, W: Write>(
    options: RenderOptions,
    mut input: R,
    out: W,
) -> Result<(), CliError> {
    let render = markdansi::create_renderer(options);
    let mut live = LiveRenderer::new(render, out, LiveOptions::default());
    let mut buffer = Vec::new();
    let mut chunk = vec![0u8; LIVE_CHUNK];

    let pumped = loop {
        let read = match input.read(&mut chunk) {
            Ok(0) => break Ok(()),
            Ok(read) => read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => {
                break Err(CliError::ReadInput {
                    path: PathBuf::from(STDIN_NAME),
                    source,
                });
            }
        };
        buffer.extend_from_slice(&chunk[..read]);
        if let Err(err) = live.render(&decode_prefix(&buffer)) {
            break Err(CliError::Stdout(err));
        }
    };

    let finished = live.finish().map_err(CliError::Stdout);
    pumped.and(finished)
}

/// Decodes the buffered input, holding back a multi-byte character that has
/// only partly arrived. Invalid bytes elsewhere are replaced.
fn decode_prefix(buffer: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(buffer) {
        Ok(text) => Cow::Borrowed(text),
        Err(err) if err.error_len().is_none() => {
            String::from_utf8_lossy(&buffer[..err.valid_up_to()])
        }
        Err(_) => String::from_utf8_lossy(buffer),
    }
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{Cli, CliError, TableBorder, run, run_live};
}
