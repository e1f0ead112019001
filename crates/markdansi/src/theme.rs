//! Built-in themes and theme resolution.
//!
//! A [`Theme`] maps every semantic role to a [`StyleIntent`]. Custom themes are
//! given as a [`PartialTheme`] and merged over the default theme one role at a
//! time.

use crate::style::StyleIntent;
use tracing::warn;

/// Name of the theme used when none is requested.
pub const DEFAULT_THEME: &str = "default";

/// Fully populated theme: one style intent per semantic role.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Theme {
    pub heading: StyleIntent,
    pub strong: StyleIntent,
    pub emph: StyleIntent,
    pub inline_code: StyleIntent,
    pub block_code: StyleIntent,
    pub link: StyleIntent,
    pub quote: StyleIntent,
    pub hr: StyleIntent,
    pub list_marker: StyleIntent,
    pub table_header: StyleIntent,
    pub table_cell: StyleIntent,
}

/// Theme with any subset of roles set.
///
/// `code` is a shared fallback for `inline_code` and `block_code` when those
/// are not given themselves.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct PartialTheme {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub heading: Option<StyleIntent>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub strong: Option<StyleIntent>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub emph: Option<StyleIntent>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub code: Option<StyleIntent>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub inline_code: Option<StyleIntent>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub block_code: Option<StyleIntent>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub link: Option<StyleIntent>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub quote: Option<StyleIntent>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub hr: Option<StyleIntent>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub list_marker: Option<StyleIntent>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub table_header: Option<StyleIntent>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub table_cell: Option<StyleIntent>,
}

impl PartialTheme {
    /// Merges this partial theme over `base`, role by role.
    pub fn merge_over(&self, base: &Theme) -> Theme {
        let pick = |role: &Option<StyleIntent>, fallback: &StyleIntent| {
            role.clone().unwrap_or_else(|| fallback.clone())
        };
        let code = |role: &Option<StyleIntent>, fallback: &StyleIntent| {
            role.clone()
                .or_else(|| self.code.clone())
                .unwrap_or_else(|| fallback.clone())
        };
        Theme {
            heading: pick(&self.heading, &base.heading),
            strong: pick(&self.strong, &base.strong),
            emph: pick(&self.emph, &base.emph),
            inline_code: code(&self.inline_code, &base.inline_code),
            block_code: code(&self.block_code, &base.block_code),
            link: pick(&self.link, &base.link),
            quote: pick(&self.quote, &base.quote),
            hr: pick(&self.hr, &base.hr),
            list_marker: pick(&self.list_marker, &base.list_marker),
            table_header: pick(&self.table_header, &base.table_header),
            table_cell: pick(&self.table_cell, &base.table_cell),
        }
    }
}

/// A theme request: a built-in name or an inline partial theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeChoice {
    Named(String),
    Custom(PartialTheme),
}

impl Default for ThemeChoice {
    fn default() -> Self {
        ThemeChoice::Named(DEFAULT_THEME.to_string())
    }
}

impl From<&str> for ThemeChoice {
    fn from(name: &str) -> Self {
        ThemeChoice::Named(name.to_string())
    }
}

impl From<PartialTheme> for ThemeChoice {
    fn from(theme: PartialTheme) -> Self {
        ThemeChoice::Custom(theme)
    }
}

impl ThemeChoice {
    /// Resolves the request to a complete theme.
    ///
    /// Unknown names resolve to the default theme.
    pub fn resolve(&self) -> Theme {
        match self {
            ThemeChoice::Named(name) => theme_by_name(name).unwrap_or_else(|| {
                warn!(theme = %name, "unknown theme, using default");
                default_theme()
            }),
            ThemeChoice::Custom(partial) => partial.merge_over(&default_theme()),
        }
    }
}

/// Names of the built-in themes.
pub const THEME_NAMES: [&str; 6] = [
    "default",
    "dim",
    "bright",
    "solarized",
    "monochrome",
    "contrast",
];

/// Looks up a built-in theme by name.
pub fn theme_by_name(name: &str) -> Option<Theme> {
    match name {
        "default" => Some(default_theme()),
        "dim" => Some(dim_theme()),
        "bright" => Some(bright_theme()),
        "solarized" => Some(solarized_theme()),
        "monochrome" => Some(monochrome_theme()),
        "contrast" => Some(contrast_theme()),
        _ => None,
    }
}

// ============================================================================
// Built-in Themes
// ============================================================================

/// Yellow headings, cyan code markers, blue underlined links.
pub fn default_theme() -> Theme {
    Theme {
        heading: StyleIntent::new().color("yellow").bold(),
        strong: StyleIntent::new().bold(),
        emph: StyleIntent::new().italic(),
        inline_code: StyleIntent::new().color("cyan"),
        block_code: StyleIntent::new().color("green"),
        link: StyleIntent::new().color("blue").underline(),
        quote: StyleIntent::new().dim(),
        hr: StyleIntent::new().dim(),
        list_marker: StyleIntent::new().color("cyan"),
        table_header: StyleIntent::new().color("yellow").bold(),
        table_cell: StyleIntent::new(),
    }
}

/// Default theme with muted headings and links.
pub fn dim_theme() -> Theme {
    Theme {
        heading: StyleIntent::new().color("white").bold().dim(),
        link: StyleIntent::new().color("blue").underline().dim(),
        ..default_theme()
    }
}

pub fn bright_theme() -> Theme {
    Theme {
        heading: StyleIntent::new().color("magenta").bold(),
        link: StyleIntent::new().color("cyan").underline(),
        inline_code: StyleIntent::new().color("green"),
        block_code: StyleIntent::new().color("green"),
        ..default_theme()
    }
}

pub fn solarized_theme() -> Theme {
    Theme {
        heading: StyleIntent::new().color("yellow").bold(),
        strong: StyleIntent::new().bold(),
        emph: StyleIntent::new().italic(),
        inline_code: StyleIntent::new().color("cyan"),
        block_code: StyleIntent::new().color("#2aa198"),
        link: StyleIntent::new().color("blue").underline(),
        quote: StyleIntent::new().color("gray"),
        hr: StyleIntent::new().color("gray"),
        list_marker: StyleIntent::new().color("cyan"),
        table_header: StyleIntent::new().color("yellow").bold(),
        table_cell: StyleIntent::new(),
    }
}

/// Attributes only, no colors.
pub fn monochrome_theme() -> Theme {
    Theme {
        heading: StyleIntent::new().bold(),
        strong: StyleIntent::new().bold(),
        emph: StyleIntent::new().italic(),
        inline_code: StyleIntent::new().dim(),
        block_code: StyleIntent::new().dim(),
        link: StyleIntent::new().underline(),
        quote: StyleIntent::new().dim(),
        hr: StyleIntent::new().dim(),
        list_marker: StyleIntent::new().dim(),
        table_header: StyleIntent::new().bold(),
        table_cell: StyleIntent::new(),
    }
}

pub fn contrast_theme() -> Theme {
    Theme {
        heading: StyleIntent::new().color("magenta").bold(),
        strong: StyleIntent::new().color("white").bold(),
        emph: StyleIntent::new().color("white").italic(),
        inline_code: StyleIntent::new().color("cyan").bold(),
        block_code: StyleIntent::new().color("green").bold(),
        link: StyleIntent::new().color("blue").underline(),
        quote: StyleIntent::new().color("gray"),
        hr: StyleIntent::new().color("gray"),
        list_marker: StyleIntent::new().color("yellow").bold(),
        table_header: StyleIntent::new().color("yellow").bold(),
        table_cell: StyleIntent::new().color("white"),
    }
}
