//! Width measurement and line wrapping.
//!
//! All measurements are in terminal display columns: escape sequences are
//! zero-width and each grapheme cluster counts with its display width, so a
//! styled string wraps exactly like its plain counterpart.
//!
//! ```rust
//! use markdansi::wrap::{visible_width, wrap_text};
//!
//! assert_eq!(visible_width("\x1b[1mbold\x1b[22m"), 4);
//! assert_eq!(wrap_text("one two three", 7, true), vec!["one two", "three"]);
//! ```

use std::sync::LazyLock;

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// A preposition followed by an article, matched against the last two words.
static ORPHAN_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:with|in|on|of|to|for) (?:a|an|the)$").expect("static pattern")
});

/// A single short function word, matched against the last word.
static ORPHAN_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:a|an|the|to|of|with|and|or|in|on|for)$").expect("static pattern")
});

/// How the greedy wrapper treats short function words left at a line end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrphanPolicy {
    /// Carry a dangling "with a" / "the" over to the next line.
    #[default]
    Avoid,
    /// Plain greedy wrapping.
    Allow,
}

#[derive(Clone, Copy, PartialEq)]
enum EscState {
    Normal,
    Esc,
    Csi,
    Osc,
    OscEsc,
}

/// Splits a string into alternating visible text and escape sequences.
///
/// Recognizes CSI sequences (`ESC [ ... final`) and OSC sequences
/// (`ESC ] ... BEL` or `ESC ] ... ESC \`). Any other two-byte escape is
/// treated as a complete sequence.
fn segments(s: &str) -> Vec<(bool, &str)> {
    let mut out = Vec::new();
    let mut state = EscState::Normal;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match state {
            EscState::Normal => {
                if c == '\x1b' {
                    if i > start {
                        out.push((false, &s[start..i]));
                    }
                    start = i;
                    state = EscState::Esc;
                }
            }
            EscState::Esc => match c {
                '[' => state = EscState::Csi,
                ']' => state = EscState::Osc,
                _ => {
                    let end = i + c.len_utf8();
                    out.push((true, &s[start..end]));
                    start = end;
                    state = EscState::Normal;
                }
            },
            EscState::Csi => {
                if ('@'..='~').contains(&c) {
                    let end = i + c.len_utf8();
                    out.push((true, &s[start..end]));
                    start = end;
                    state = EscState::Normal;
                }
            }
            EscState::Osc => {
                if c == '\x07' {
                    let end = i + 1;
                    out.push((true, &s[start..end]));
                    start = end;
                    state = EscState::Normal;
                } else if c == '\x1b' {
                    state = EscState::OscEsc;
                }
            }
            EscState::OscEsc => {
                let end = i + c.len_utf8();
                if c == '\\' {
                    out.push((true, &s[start..end]));
                    start = end;
                    state = EscState::Normal;
                } else {
                    state = EscState::Osc;
                }
            }
        }
    }

    if start < s.len() {
        // An unterminated escape is still invisible.
        out.push((state != EscState::Normal, &s[start..]));
    }
    out
}

/// Removes every ANSI CSI and OSC escape sequence from `s`.
pub fn strip_ansi(s: &str) -> String {
    if !s.contains('\x1b') {
        return s.to_string();
    }
    segments(s)
        .into_iter()
        .filter(|(is_escape, _)| !is_escape)
        .map(|(_, text)| text)
        .collect()
}

/// Display width of plain text, summed per grapheme cluster.
fn plain_width(s: &str) -> usize {
    s.graphemes(true).map(UnicodeWidthStr::width).sum()
}

/// Display width of `s` in terminal columns, ignoring escape sequences.
pub fn visible_width(s: &str) -> usize {
    if !s.contains('\x1b') {
        return plain_width(s);
    }
    segments(s)
        .into_iter()
        .filter(|(is_escape, _)| !is_escape)
        .map(|(_, text)| plain_width(text))
        .sum()
}

/// Splits text into maximal runs of whitespace and non-whitespace.
fn runs(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;
    for (i, c) in text.char_indices() {
        let space = c.is_whitespace();
        match in_space {
            Some(prev) if prev != space => {
                out.push(&text[start..i]);
                start = i;
            }
            _ => {}
        }
        in_space = Some(space);
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}

fn is_blank(run: &str) -> bool {
    run.chars().all(char::is_whitespace)
}

/// Finds a dangling function-word tail at the end of `line`.
///
/// Words are compared without their escape sequences so styled and plain
/// text make the same decision.
fn orphan_tail(line: &str) -> Option<&str> {
    let mut words: Vec<(usize, &str)> = Vec::new();
    let mut offset = 0;
    for run in runs(line) {
        if !is_blank(run) {
            words.push((offset, run));
        }
        offset += run.len();
    }

    let &(last_start, last) = words.last()?;
    let last_plain = strip_ansi(last);
    if let [.., (prev_start, prev), _] = words.as_slice() {
        let pair = format!("{} {last_plain}", strip_ansi(prev));
        if ORPHAN_PHRASE.is_match(&pair) {
            return Some(&line[*prev_start..]);
        }
    }
    ORPHAN_WORD.is_match(&last_plain).then(|| &line[last_start..])
}

/// Greedily wraps a single logical line to `width` columns.
///
/// Breaks only at whitespace. A word wider than `width` is never split; it
/// overflows on a line of its own. When `wrap` is false or `width` is zero
/// the text is returned unchanged as a single line. Dangling function words
/// are carried to the next line (see [`OrphanPolicy`]).
pub fn wrap_text(text: &str, width: usize, wrap: bool) -> Vec<String> {
    wrap_text_with(text, width, wrap, OrphanPolicy::Avoid)
}

/// [`wrap_text`] with an explicit orphan policy.
pub fn wrap_text_with(text: &str, width: usize, wrap: bool, orphans: OrphanPolicy) -> Vec<String> {
    if !wrap || width == 0 {
        return vec![text.to_string()];
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for run in runs(text) {
        let run_width = visible_width(run);
        let blank = is_blank(run);
        if !current.is_empty() && current_width + run_width > width && !blank {
            let line = current.trim_end();

            if orphans == OrphanPolicy::Avoid {
                if let Some(tail) = orphan_tail(line) {
                    let base = line[..line.len() - tail.len()].trim_end();
                    let carried = format!("{tail} {run}");
                    let carried_width = visible_width(&carried);
                    if !base.is_empty() && carried_width <= width {
                        lines.push(base.to_string());
                        current = carried;
                        current_width = carried_width;
                        continue;
                    }
                }
            }

            lines.push(line.to_string());
            current = run.to_string();
            current_width = run_width;
            continue;
        }
        current.push_str(run);
        current_width += run_width;
    }

    if !current.is_empty() {
        lines.push(current.trim_end().to_string());
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Wraps text with `prefix` prepended to every output line.
///
/// Hard newlines split the text into logical lines first; each is wrapped to
/// `width` minus the prefix's visible width (at least one column). With
/// wrapping disabled only the newline split happens.
pub fn wrap_with_prefix(text: &str, width: usize, wrap: bool, prefix: &str) -> Vec<String> {
    wrap_with_prefix_and(text, width, wrap, prefix, OrphanPolicy::Avoid)
}

/// [`wrap_with_prefix`] with an explicit orphan policy.
pub fn wrap_with_prefix_and(
    text: &str,
    width: usize,
    wrap: bool,
    prefix: &str,
    orphans: OrphanPolicy,
) -> Vec<String> {
    if !wrap {
        return text.split('\n').map(|line| format!("{prefix}{line}")).collect();
    }
    let inner = width.saturating_sub(visible_width(prefix)).max(1);
    text.split('\n')
        .flat_map(|line| wrap_text_with(line, inner, true, orphans))
        .map(|line| format!("{prefix}{line}"))
        .collect()
}

/// Splits `s` into chunks of at most `width` display columns.
///
/// Word boundaries are ignored; this is meant for code. Escape sequences are
/// carried along with the following character and never counted. Chunks are
/// split per character, so a multi-codepoint grapheme may be divided (known
/// limitation). A character wider than `width` gets a chunk of its own.
pub fn hard_wrap(s: &str, width: usize) -> Vec<String> {
    if width == 0 || s.is_empty() {
        return vec![s.to_string()];
    }
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for (is_escape, text) in segments(s) {
        if is_escape {
            current.push_str(text);
            continue;
        }
        for c in text.chars() {
            let w = c.width().unwrap_or(0);
            if current_width + w > width && current_width > 0 {
                chunks.push(std::mem::take(&mut current));
                current_width = 0;
            }
            current.push(c);
            current_width += w;
        }
    }
    if !current.is_empty() || chunks.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Truncates to `width` columns, ending with `ellipsis` when text was cut.
///
/// If `width` cannot hold more than the ellipsis, only as much of the
/// ellipsis as fits is returned. Escape sequences inside the kept prefix are
/// preserved and a reset is appended after them.
pub fn truncate(s: &str, width: usize, ellipsis: &str) -> String {
    if visible_width(s) <= width {
        return s.to_string();
    }
    let ellipsis_width = visible_width(ellipsis);
    if width <= ellipsis_width {
        return take_width(ellipsis, width);
    }

    let target = width - ellipsis_width;
    let mut out = String::new();
    let mut used = 0;
    let mut styled = false;
    'outer: for (is_escape, text) in segments(s) {
        if is_escape {
            out.push_str(text);
            styled = true;
            continue;
        }
        for g in text.graphemes(true) {
            let w = g.width();
            if used + w > target {
                break 'outer;
            }
            out.push_str(g);
            used += w;
        }
    }
    if styled {
        out.push_str("\x1b[0m");
    }
    out.push_str(ellipsis);
    out
}

/// Longest prefix of plain `s` that fits in `width` columns.
fn take_width(s: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for g in s.graphemes(true) {
        let w = g.width();
        if used + w > width {
            break;
        }
        out.push_str(g);
        used += w;
    }
    out
}
