//! Terminal rendering of cards, table rows and the detail view
//!
//! Layout is computed on plain text first ([`StyledLine::text`]) and colored
//! last, so padding and column math never see escape codes.

pub mod card;
pub mod detail;
pub mod listing;
pub mod table;

use chrono::{DateTime, Local, Utc};
use colored::{ColoredString, Colorize};

use crate::model::{StatusKind, MAX_RATING};
use crate::palette::{hex_to_rgb, status_colors};

pub use card::{card_lines, grid_lines};
pub use detail::detail_lines;
pub use listing::{header_line, listing_lines, EMPTY_HINT, EMPTY_TITLE};
pub use table::table_lines;

/// Width thresholds in terminal columns
const COMPACT_BELOW: u16 = 64;
const MEDIUM_BELOW: u16 = 77;
const LARGE_BELOW: u16 = 103;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Breakpoint {
    Compact,
    Medium,
    Large,
    Wide,
}

/// Available drawing width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub columns: u16,
}

impl Viewport {
    pub fn new(columns: u16) -> Self {
        Self { columns }
    }

    pub fn breakpoint(&self) -> Breakpoint {
        match self.columns {
            c if c < COMPACT_BELOW => Breakpoint::Compact,
            c if c < MEDIUM_BELOW => Breakpoint::Medium,
            c if c < LARGE_BELOW => Breakpoint::Large,
            _ => Breakpoint::Wide,
        }
    }

    pub fn grid_columns(&self) -> usize {
        match self.breakpoint() {
            Breakpoint::Compact => 1,
            Breakpoint::Medium => 2,
            Breakpoint::Large => 3,
            Breakpoint::Wide => 4,
        }
    }

    pub fn is_compact(&self) -> bool {
        self.breakpoint() == Breakpoint::Compact
    }

    /// Characters of body text shown under a table row title
    pub fn table_excerpt_len(&self) -> usize {
        if self.is_compact() {
            60
        } else {
            120
        }
    }
}

/// Source of the current viewport. Rendering asks it instead of reading the
/// terminal directly.
pub trait ViewportObserver {
    fn viewport(&self) -> Viewport;
}

impl ViewportObserver for Viewport {
    fn viewport(&self) -> Viewport {
        *self
    }
}

/// The controlling terminal's width, `COLUMNS`, or 100 columns
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalViewport;

impl ViewportObserver for TerminalViewport {
    fn viewport(&self) -> Viewport {
        #[cfg(feature = "tui")]
        if let Ok((columns, _)) = crossterm::terminal::size() {
            return Viewport::new(columns);
        }

        let columns = std::env::var("COLUMNS")
            .ok()
            .and_then(|c| c.parse().ok())
            .unwrap_or(100);
        Viewport::new(columns)
    }
}

/// Five stars with `round(rating)` filled
pub fn stars(rating: f64) -> String {
    let filled = rating.clamp(0.0, MAX_RATING).round() as usize;
    let empty = MAX_RATING as usize - filled;
    format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
}

/// `(4.5)`
pub fn rating_suffix(rating: f64) -> String {
    format!("({:.1})", rating)
}

/// `Mar 7`, local time
pub fn short_date(at: Option<DateTime<Utc>>) -> String {
    at.map(|dt| dt.with_timezone(&Local).format("%b %-d").to_string())
        .unwrap_or_default()
}

/// `Mar 7, 2024`, local time
pub fn long_date(at: Option<DateTime<Utc>>) -> String {
    at.map(|dt| dt.with_timezone(&Local).format("%b %-d, %Y").to_string())
        .unwrap_or_default()
}

/// Cut to `width` characters, marking the cut with `…`
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(width - 1).collect();
    out.push('…');
    out
}

/// Truncate or right-pad to exactly `width` characters
pub fn fit(text: &str, width: usize) -> String {
    let cut = truncate(text, width);
    let len = cut.chars().count();
    format!("{}{}", cut, " ".repeat(width - len))
}

/// Collapse newlines so a body excerpt stays on one line
pub fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// How a line should be colored once laid out
#[derive(Debug, Clone, PartialEq)]
pub enum LineStyle {
    Plain,
    Heading,
    Dimmed,
    /// Foreground in a `#rrggbb` color
    Hex(String),
    Status(StatusKind),
    Rating,
    Selected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyledLine {
    pub text: String,
    pub style: LineStyle,
}

impl StyledLine {
    pub fn new(text: impl Into<String>, style: LineStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, LineStyle::Plain)
    }

    /// Apply the style to already-padded text
    pub fn paint_padded(&self, text: &str) -> ColoredString {
        match &self.style {
            LineStyle::Plain => text.normal(),
            LineStyle::Heading => text.bold(),
            LineStyle::Dimmed => text.dimmed(),
            LineStyle::Hex(hex) => paint_hex(text, hex),
            LineStyle::Status(kind) => paint_hex(text, status_colors(*kind).1),
            LineStyle::Rating => text.yellow(),
            LineStyle::Selected => text.cyan().bold(),
        }
    }

    pub fn paint(&self) -> ColoredString {
        self.paint_padded(&self.text)
    }
}

pub fn paint_hex(text: &str, hex: &str) -> ColoredString {
    match hex_to_rgb(hex) {
        Some((r, g, b)) => text.truecolor(r, g, b),
        None => text.normal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_breakpoints() {
        assert_eq!(Viewport::new(40).breakpoint(), Breakpoint::Compact);
        assert_eq!(Viewport::new(63).grid_columns(), 1);
        assert_eq!(Viewport::new(64).grid_columns(), 2);
        assert_eq!(Viewport::new(77).grid_columns(), 3);
        assert_eq!(Viewport::new(102).grid_columns(), 3);
        assert_eq!(Viewport::new(103).grid_columns(), 4);
        assert_eq!(Viewport::new(200).breakpoint(), Breakpoint::Wide);
    }

    #[test]
    fn test_table_excerpt_len_follows_viewport() {
        assert_eq!(Viewport::new(50).table_excerpt_len(), 60);
        assert_eq!(Viewport::new(120).table_excerpt_len(), 120);
    }

    #[test]
    fn test_stars() {
        assert_eq!(stars(0.0), "☆☆☆☆☆");
        assert_eq!(stars(3.5), "★★★★☆");
        assert_eq!(stars(4.4), "★★★★☆");
        assert_eq!(stars(5.0), "★★★★★");
        assert_eq!(stars(9.0), "★★★★★");
        assert_eq!(rating_suffix(4.0), "(4.0)");
    }

    #[test]
    fn test_dates() {
        // Midday UTC keeps the calendar day stable across local offsets
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap();
        assert_eq!(short_date(Some(at)), "Mar 7");
        assert_eq!(long_date(Some(at)), "Mar 7, 2024");
        assert_eq!(short_date(None), "");
    }

    #[test]
    fn test_fit_and_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 6), "hello…");
        assert_eq!(fit("ab", 4), "ab  ");
        assert_eq!(fit("abcdef", 4), "abc…");
        assert_eq!(single_line("a\n  b\tc"), "a b c");
    }
}
