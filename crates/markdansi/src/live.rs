//! In-place live redraw of a growing document.
//!
//! [`LiveRenderer`] re-renders the whole input on every update and repaints
//! the previous frame in place: it moves the cursor up over the lines it
//! wrote last time, clears and rewrites each line, and clears any stale lines
//! left over when the new frame is shorter.
//!
//! ```rust
//! use markdansi::live::{LiveOptions, LiveRenderer};
//!
//! let mut out = Vec::new();
//! let mut live = LiveRenderer::new(|input: &str| input.to_uppercase(), &mut out, LiveOptions::default());
//! live.render("hello").unwrap();
//! live.render("hello\nworld").unwrap();
//! live.finish().unwrap();
//!
//! let text = String::from_utf8(out).unwrap();
//! assert!(text.contains("\x1b[1A\r\x1b[2KHELLO\n\x1b[2KWORLD\n"));
//! ```

use std::io::{self, Write};

use tracing::trace;

/// Begin synchronized update (DEC private mode 2026).
pub const BEGIN_SYNC: &str = "\x1b[?2026h";
/// End synchronized update.
pub const END_SYNC: &str = "\x1b[?2026l";
pub const HIDE_CURSOR: &str = "\x1b[?25l";
pub const SHOW_CURSOR: &str = "\x1b[?25h";
/// Erase the entire current line.
pub const CLEAR_LINE: &str = "\x1b[2K";

/// Cursor-up sequence; empty for zero lines.
pub fn cursor_up(lines: usize) -> String {
    if lines == 0 {
        String::new()
    } else {
        format!("\x1b[{lines}A")
    }
}

/// Terminal behaviour of a [`LiveRenderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveOptions {
    /// Frame each redraw in synchronized-output markers.
    pub synchronized_output: bool,
    /// Hide the cursor from the first frame until [`LiveRenderer::finish`].
    pub hide_cursor: bool,
}

impl Default for LiveOptions {
    fn default() -> Self {
        Self {
            synchronized_output: true,
            hide_cursor: true,
        }
    }
}

/// Redraws successive frames in place on a terminal writer.
///
/// The renderer owns the line count of the last frame, so it must be driven
/// by a single owner; every method takes `&mut self`.
pub struct LiveRenderer<F, W>
where
    F: FnMut(&str) -> String,
    W: Write,
{
    render_frame: F,
    out: W,
    options: LiveOptions,
    previous_lines: usize,
    cursor_hidden: bool,
}

impl<F, W> LiveRenderer<F, W>
where
    F: FnMut(&str) -> String,
    W: Write,
{
    /// Creates a live renderer from a frame function and an output writer.
    pub fn new(render_frame: F, out: W, options: LiveOptions) -> Self {
        Self {
            render_frame,
            out,
            options,
            previous_lines: 0,
            cursor_hidden: false,
        }
    }

    /// Renders `input` and repaints it over the previous frame.
    pub fn render(&mut self, input: &str) -> io::Result<()> {
        let rendered = (self.render_frame)(input);
        let body = rendered.strip_suffix('\n').unwrap_or(&rendered);
        let lines: Vec<&str> = body.split('\n').collect();
        let new_lines = lines.len();
        let total = new_lines.max(self.previous_lines);

        let mut frame = String::new();
        if self.options.hide_cursor && !self.cursor_hidden {
            frame.push_str(HIDE_CURSOR);
            self.cursor_hidden = true;
        }
        if self.options.synchronized_output {
            frame.push_str(BEGIN_SYNC);
        }
        frame.push_str(&cursor_up(self.previous_lines));
        frame.push('\r');
        for idx in 0..total {
            frame.push_str(CLEAR_LINE);
            frame.push_str(lines.get(idx).copied().unwrap_or(""));
            frame.push('\n');
        }
        if self.options.synchronized_output {
            frame.push_str(END_SYNC);
        }

        trace!(previous = self.previous_lines, lines = new_lines, "live frame");
        self.out.write_all(frame.as_bytes())?;
        self.out.flush()?;
        self.previous_lines = new_lines;
        Ok(())
    }

    /// Restores the cursor if this renderer hid it.
    pub fn finish(&mut self) -> io::Result<()> {
        if self.options.hide_cursor && self.cursor_hidden {
            self.out.write_all(SHOW_CURSOR.as_bytes())?;
            self.out.flush()?;
            self.cursor_hidden = false;
        }
        Ok(())
    }

    /// Number of lines in the last frame written.
    pub fn previous_lines(&self) -> usize {
        self.previous_lines
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(input: &str) -> String {
        input.to_string()
    }

    fn output(live: LiveRenderer<fn(&str) -> String, Vec<u8>>) -> String {
        String::from_utf8(live.into_inner()).unwrap()
    }

    #[test]
    fn test_frames_use_control_sequences() {
        let mut live = LiveRenderer::new(identity as fn(&str) -> String, Vec::new(), LiveOptions::default());
        live.render("hello").unwrap();
        live.render("hello\nworld").unwrap();
        live.finish().unwrap();
        let out = output(live);

        assert!(out.starts_with(HIDE_CURSOR));
        assert!(out.contains(BEGIN_SYNC));
        assert!(out.contains(END_SYNC));
        assert!(out.contains(CLEAR_LINE));
        assert!(out.contains("\x1b[1A\r"));
        assert!(out.ends_with(SHOW_CURSOR));
        assert_eq!(out.matches(HIDE_CURSOR).count(), 1);
    }

    #[test]
    fn test_first_frame_exact() {
        let mut live = LiveRenderer::new(identity as fn(&str) -> String, Vec::new(), LiveOptions::default());
        live.render("a\nb\n").unwrap();
        assert_eq!(live.previous_lines(), 2);
        assert_eq!(
            output(live),
            "\x1b[?25l\x1b[?2026h\r\x1b[2Ka\n\x1b[2Kb\n\x1b[?2026l"
        );
    }

    #[test]
    fn test_shrinking_frame_clears_stale_lines() {
        let options = LiveOptions {
            synchronized_output: false,
            hide_cursor: false,
        };
        let mut live = LiveRenderer::new(identity as fn(&str) -> String, Vec::new(), options);
        live.render("one\ntwo\nthree").unwrap();
        live.render("one").unwrap();
        assert_eq!(live.previous_lines(), 1);
        let out = output(live);
        assert!(out.ends_with("\x1b[3A\r\x1b[2Kone\n\x1b[2K\n\x1b[2K\n"));
        assert!(!out.contains(BEGIN_SYNC));
        assert!(!out.contains(HIDE_CURSOR));
    }

    #[test]
    fn test_finish_without_hidden_cursor_writes_nothing() {
        let options = LiveOptions {
            synchronized_output: true,
            hide_cursor: false,
        };
        let mut live = LiveRenderer::new(identity as fn(&str) -> String, Vec::new(), options);
        live.finish().unwrap();
        assert_eq!(output(live), "");
    }

    #[test]
    fn test_cursor_up() {
        assert_eq!(cursor_up(0), "");
        assert_eq!(cursor_up(4), "\x1b[4A");
    }
}
