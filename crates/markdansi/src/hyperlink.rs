//! OSC-8 hyperlinks and terminal support detection.

use std::io::IsTerminal;

/// Terminal programs known to render OSC-8 links.
const SUPPORTING_PROGRAMS: [&str; 4] = ["iTerm.app", "WezTerm", "vscode", "ghostty"];
/// Values of `TERM` known to render OSC-8 links.
const SUPPORTING_TERMS: [&str; 4] = ["xterm-kitty", "alacritty", "foot", "xterm-ghostty"];
/// Variables whose presence marks a supporting terminal.
const SUPPORTING_MARKERS: [&str; 4] = ["WT_SESSION", "KONSOLE_VERSION", "KITTY_WINDOW_ID", "DOMTERM"];
/// First VTE release with hyperlink support (0.50).
const MIN_VTE_VERSION: u32 = 5000;

/// Wraps `text` in an OSC-8 hyperlink to `url`.
///
/// ```rust
/// use markdansi::hyperlink::osc8;
///
/// assert_eq!(
///     osc8("https://example.com", "site"),
///     "\x1b]8;;https://example.com\x07site\x1b]8;;\x07"
/// );
/// ```
pub fn osc8(url: &str, text: &str) -> String {
    format!("\x1b]8;;{url}\x07{text}\x1b]8;;\x07")
}

/// Reports whether stdout's terminal likely supports OSC-8 hyperlinks.
pub fn hyperlinks_supported() -> bool {
    let is_tty = std::io::stdout().is_terminal();
    hyperlinks_supported_with(|key| std::env::var(key).ok(), is_tty)
}

/// Hyperlink detection over an arbitrary variable lookup.
///
/// `FORCE_HYPERLINK` wins when set (`0` disables). Otherwise a TTY is
/// required, CI and dumb terminals are refused, and known terminals are
/// recognised by `TERM_PROGRAM`, `VTE_VERSION`, marker variables or `TERM`.
pub fn hyperlinks_supported_with<F>(lookup: F, is_tty: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(force) = lookup("FORCE_HYPERLINK") {
        return force.trim() != "0";
    }
    if !is_tty || lookup("CI").is_some() {
        return false;
    }
    let term = lookup("TERM").unwrap_or_default();
    if term == "dumb" {
        return false;
    }
    if let Some(program) = lookup("TERM_PROGRAM") {
        if SUPPORTING_PROGRAMS.contains(&program.as_str()) {
            return true;
        }
    }
    if let Some(version) = lookup("VTE_VERSION") {
        if version.trim().parse::<u32>().is_ok_and(|v| v >= MIN_VTE_VERSION) {
            return true;
        }
    }
    if SUPPORTING_MARKERS.iter().any(|key| lookup(key).is_some()) {
        return true;
    }
    SUPPORTING_TERMS.contains(&term.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_osc8_format() {
        let link = osc8("https://example.com", "x");
        assert!(link.starts_with("\x1b]8;;https://example.com\x07"));
        assert!(link.ends_with("x\x1b]8;;\x07"));
    }

    #[test]
    fn test_force_overrides() {
        assert!(hyperlinks_supported_with(lookup(&[("FORCE_HYPERLINK", "1")]), false));
        assert!(!hyperlinks_supported_with(
            lookup(&[("FORCE_HYPERLINK", "0"), ("TERM_PROGRAM", "iTerm.app")]),
            true
        ));
    }

    #[test]
    fn test_requires_tty() {
        assert!(!hyperlinks_supported_with(lookup(&[("TERM_PROGRAM", "WezTerm")]), false));
        assert!(hyperlinks_supported_with(lookup(&[("TERM_PROGRAM", "WezTerm")]), true));
    }

    #[test]
    fn test_ci_and_dumb_refused() {
        assert!(!hyperlinks_supported_with(
            lookup(&[("CI", "true"), ("TERM_PROGRAM", "vscode")]),
            true
        ));
        assert!(!hyperlinks_supported_with(
            lookup(&[("TERM", "dumb"), ("WT_SESSION", "x")]),
            true
        ));
    }

    #[test]
    fn test_known_terminals() {
        assert!(hyperlinks_supported_with(lookup(&[("VTE_VERSION", "6003")]), true));
        assert!(!hyperlinks_supported_with(lookup(&[("VTE_VERSION", "4800")]), true));
        assert!(hyperlinks_supported_with(lookup(&[("KITTY_WINDOW_ID", "1")]), true));
        assert!(hyperlinks_supported_with(lookup(&[("TERM", "alacritty")]), true));
        assert!(!hyperlinks_supported_with(lookup(&[("TERM", "xterm-256color")]), true));
    }
}
