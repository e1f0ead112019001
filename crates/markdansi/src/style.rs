//! Style intents and the ANSI styler.
//!
//! A [`StyleIntent`] is a set of independent attributes (colors plus text
//! attributes). The [`Styler`] turns an intent into SGR escape sequences, or
//! passes text through untouched when color is disabled.
//!
//! ```rust
//! use markdansi::style::{StyleIntent, Styler};
//!
//! let styler = Styler::new(true);
//! let red_bold = StyleIntent::new().color("red").bold();
//! assert_eq!(styler.paint("x", &red_bold), "\x1b[31m\x1b[1mx\x1b[22m\x1b[39m");
//!
//! let plain = Styler::new(false);
//! assert_eq!(plain.paint("x", &red_bold), "x");
//! ```

use bitflags::bitflags;
use tracing::warn;

bitflags! {
    /// Text attributes of a style intent.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Attrs: u8 {
        const BOLD = 1 << 0;
        const ITALIC = 1 << 1;
        const UNDERLINE = 1 << 2;
        const DIM = 1 << 3;
        const STRIKE = 1 << 4;
    }
}

/// Open and close SGR codes, in application order.
const ATTR_CODES: [(Attrs, u8, u8); 5] = [
    (Attrs::BOLD, 1, 22),
    (Attrs::ITALIC, 3, 23),
    (Attrs::UNDERLINE, 4, 24),
    (Attrs::DIM, 2, 22),
    (Attrs::STRIKE, 9, 29),
];

/// Abstract style for one semantic role.
///
/// Any subset of attributes may be present at once.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "IntentRepr", into = "IntentRepr")
)]
pub struct StyleIntent {
    /// Named, ANSI-256 or hex foreground color.
    pub color: Option<String>,
    /// Named, ANSI-256 or hex background color.
    pub bg_color: Option<String>,
    /// Text attributes.
    pub attrs: Attrs,
}

impl StyleIntent {
    /// Creates an empty intent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the foreground color.
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Sets the background color.
    pub fn bg_color(mut self, color: impl Into<String>) -> Self {
        self.bg_color = Some(color.into());
        self
    }

    pub fn bold(mut self) -> Self {
        self.attrs |= Attrs::BOLD;
        self
    }

    pub fn italic(mut self) -> Self {
        self.attrs |= Attrs::ITALIC;
        self
    }

    pub fn underline(mut self) -> Self {
        self.attrs |= Attrs::UNDERLINE;
        self
    }

    pub fn dim(mut self) -> Self {
        self.attrs |= Attrs::DIM;
        self
    }

    pub fn strike(mut self) -> Self {
        self.attrs |= Attrs::STRIKE;
        self
    }

    /// Returns true when the intent changes nothing.
    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.bg_color.is_none() && self.attrs.is_empty()
    }
}

/// Serialized shape of a style intent: flat optional booleans.
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct IntentRepr {
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bg_color: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    bold: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    italic: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    underline: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    dim: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    strike: bool,
}

#[cfg(feature = "serde")]
impl From<IntentRepr> for StyleIntent {
    fn from(repr: IntentRepr) -> Self {
        let mut attrs = Attrs::empty();
        attrs.set(Attrs::BOLD, repr.bold);
        attrs.set(Attrs::ITALIC, repr.italic);
        attrs.set(Attrs::UNDERLINE, repr.underline);
        attrs.set(Attrs::DIM, repr.dim);
        attrs.set(Attrs::STRIKE, repr.strike);
        Self {
            color: repr.color,
            bg_color: repr.bg_color,
            attrs,
        }
    }
}

#[cfg(feature = "serde")]
impl From<StyleIntent> for IntentRepr {
    fn from(intent: StyleIntent) -> Self {
        Self {
            color: intent.color,
            bg_color: intent.bg_color,
            bold: intent.attrs.contains(Attrs::BOLD),
            italic: intent.attrs.contains(Attrs::ITALIC),
            underline: intent.attrs.contains(Attrs::UNDERLINE),
            dim: intent.attrs.contains(Attrs::DIM),
            strike: intent.attrs.contains(Attrs::STRIKE),
        }
    }
}

/// A terminal color resolved from its textual name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// One of the 16 basic colors (0-7 normal, 8-15 bright).
    Basic(u8),
    /// 256-color palette index.
    Ansi256(u8),
    /// 24-bit color.
    Rgb(u8, u8, u8),
}

const BASIC_NAMES: [&str; 8] = [
    "black", "red", "green", "yellow", "blue", "magenta", "cyan", "white",
];

impl Color {
    /// Parses a color name.
    ///
    /// Accepts the basic names (`red`, `redBright`, `gray`), ANSI-256 indices
    /// (`"196"`) and hex (`"#2aa198"`, `"#fff"`). A leading `bg` prefix as in
    /// `bgBlue` is ignored so background names can be passed as-is.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        if let Some(hex) = name.strip_prefix('#') {
            return parse_hex(hex);
        }
        if let Ok(index) = name.parse::<u8>() {
            return Some(Color::Ansi256(index));
        }

        let name = match name.strip_prefix("bg") {
            Some(rest) if rest.starts_with(|c: char| c.is_ascii_uppercase()) => rest,
            _ => name,
        };
        let lower = name.to_ascii_lowercase();
        match lower.as_str() {
            "gray" | "grey" | "blackbright" => return Some(Color::Basic(8)),
            _ => {}
        }
        let (base, bright) = match lower.strip_suffix("bright") {
            Some(base) => (base, true),
            None => (lower.as_str(), false),
        };
        BASIC_NAMES
            .iter()
            .position(|candidate| *candidate == base)
            .map(|index| Color::Basic(index as u8 + if bright { 8 } else { 0 }))
    }

    /// SGR foreground open code.
    fn fg_code(self) -> String {
        match self {
            Color::Basic(n) if n < 8 => format!("{}", 30 + n),
            Color::Basic(n) => format!("{}", 90 + n - 8),
            Color::Ansi256(n) => format!("38;5;{n}"),
            Color::Rgb(r, g, b) => format!("38;2;{r};{g};{b}"),
        }
    }

    /// SGR background open code.
    fn bg_code(self) -> String {
        match self {
            Color::Basic(n) if n < 8 => format!("{}", 40 + n),
            Color::Basic(n) => format!("{}", 100 + n - 8),
            Color::Ansi256(n) => format!("48;5;{n}"),
            Color::Rgb(r, g, b) => format!("48;2;{r};{g};{b}"),
        }
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        }
        _ => None,
    }
}

/// Applies style intents to text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Styler {
    enabled: bool,
}

impl Styler {
    /// Creates a styler; a disabled styler is the identity function.
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Returns true when escape sequences are emitted.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Wraps `text` in the escape sequences for `intent`.
    ///
    /// Attributes are applied in a fixed order (foreground, background, bold,
    /// italic, underline, dim, strike), the first being outermost. Each one
    /// closes with its own reset code rather than a full reset, and is
    /// re-opened after any identical close code inside `text`, so styles nest.
    pub fn paint(&self, text: &str, intent: &StyleIntent) -> String {
        if !self.enabled || intent.is_empty() {
            return text.to_string();
        }

        let mut layers: Vec<(String, &'static str)> = Vec::with_capacity(7);
        if let Some(name) = &intent.color {
            match Color::parse(name) {
                Some(color) => layers.push((color.fg_code(), "39")),
                None => warn!(color = %name, "ignoring unknown foreground color"),
            }
        }
        if let Some(name) = &intent.bg_color {
            match Color::parse(name) {
                Some(color) => layers.push((color.bg_code(), "49")),
                None => warn!(color = %name, "ignoring unknown background color"),
            }
        }
        for (attr, open, close) in ATTR_CODES {
            if intent.attrs.contains(attr) {
                layers.push((open.to_string(), close_code(close)));
            }
        }

        let mut out = text.to_string();
        for (open, close) in layers.iter().rev() {
            out = wrap_layer(&out, open, close);
        }
        out
    }
}

fn close_code(code: u8) -> &'static str {
    match code {
        22 => "22",
        23 => "23",
        24 => "24",
        29 => "29",
        _ => "0",
    }
}

fn wrap_layer(text: &str, open: &str, close: &str) -> String {
    let open_seq = format!("\x1b[{open}m");
    let close_seq = format!("\x1b[{close}m");
    let inner = if text.contains(&close_seq) {
        text.replace(&close_seq, &format!("{close_seq}{open_seq}"))
    } else {
        text.to_string()
    };
    format!("{open_seq}{inner}{close_seq}")
}
