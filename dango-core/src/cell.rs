//! Grid cells
//!
//! A cell holds one grapheme cluster (a base codepoint plus any combining
//! marks or ZWJ continuations), its display attributes, and an optional
//! hyperlink handle. Wide characters occupy two cells: the base cell with
//! width 2 and a width-0 continuation cell immediately after it.

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Underline rendering variants (SGR 4:0 .. 4:5 and SGR 21).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnderlineStyle {
    #[default]
    Single,
    Double,
    Curly,
    Dotted,
    Dashed,
}

/// The graphics rendition applied to a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CellAttributes {
    pub fg: Color,
    pub bg: Color,
    /// Underline color (SGR 58/59); `Default` follows the foreground.
    pub underline_color: Color,
    /// Bold (SGR 1).
    pub bold: bool,
    /// Faint (SGR 2).
    pub faint: bool,
    /// Italic (SGR 3).
    pub italic: bool,
    /// Underlined (SGR 4); the style picks the variant.
    pub underline: bool,
    pub underline_style: UnderlineStyle,
    /// Blinking (SGR 5/6).
    pub blink: bool,
    /// Reverse video (SGR 7).
    pub inverse: bool,
    /// Concealed (SGR 8).
    pub hidden: bool,
    /// Crossed out (SGR 9).
    pub crossed_out: bool,
}

impl CellAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Foreground after accounting for reverse video.
    pub fn effective_fg(&self) -> Color {
        if self.inverse {
            self.bg
        } else {
            self.fg
        }
    }

    /// Background after accounting for reverse video.
    pub fn effective_bg(&self) -> Color {
        if self.inverse {
            self.fg
        } else {
            self.bg
        }
    }
}

/// A single grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// The grapheme cluster; empty means blank.
    content: String,
    /// Display width: 1 normal, 2 wide, 0 for the trailing half of a wide
    /// character.
    width: u8,
    pub attrs: CellAttributes,
    /// Handle into the buffer's hyperlink table; 0 means none.
    pub hyperlink: u32,
}

impl Cell {
    pub fn new() -> Self {
        Self {
            content: String::new(),
            width: 1,
            attrs: CellAttributes::default(),
            hyperlink: 0,
        }
    }

    pub fn with_char(c: char) -> Self {
        let mut cell = Self::new();
        cell.set_char(c);
        cell
    }

    /// Replace the content with a single base character.
    pub fn set_char(&mut self, c: char) {
        self.content.clear();
        self.content.push(c);
        self.width = char_width(c);
    }

    /// Append a combining mark or joiner to the cluster. The cell's width
    /// is unchanged; a join never widens the base.
    pub fn push_codepoint(&mut self, c: char) {
        self.content.push(c);
    }

    /// The full cluster as UTF-8.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The codepoints of the cluster, base first.
    pub fn codepoints(&self) -> impl Iterator<Item = char> + '_ {
        self.content.chars()
    }

    pub fn last_codepoint(&self) -> Option<char> {
        self.content.chars().last()
    }

    /// The base character, or a space for blank cells.
    pub fn display_char(&self) -> char {
        self.content.chars().next().unwrap_or(' ')
    }

    pub fn is_blank(&self) -> bool {
        self.content.is_empty() || self.content == " "
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    /// Turn this cell into the trailing half of a wide character.
    pub fn make_continuation(&mut self, attrs: CellAttributes, hyperlink: u32) {
        self.content.clear();
        self.width = 0;
        self.attrs = attrs;
        self.hyperlink = hyperlink;
    }

    pub fn is_continuation(&self) -> bool {
        self.width == 0
    }

    /// Blank the cell, keeping the given attributes as its background.
    pub fn clear(&mut self, attrs: CellAttributes) {
        self.content.clear();
        self.width = 1;
        self.attrs = attrs;
        self.hyperlink = 0;
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::new()
    }
}

/// Display width of a character: 0 for combining marks and other zero-width
/// codepoints, 2 for east-asian wide and emoji presentation, otherwise 1.
pub fn char_width(c: char) -> u8 {
    use unicode_width::UnicodeWidthChar;
    match c.width() {
        Some(w) => w.min(2) as u8,
        // Control characters never reach a cell; treat defensively as 1.
        None => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_cell_is_blank() {
        let cell = Cell::new();
        assert!(cell.is_blank());
        assert_eq!(cell.width(), 1);
        assert_eq!(cell.display_char(), ' ');
    }

    #[test]
    fn narrow_char() {
        let cell = Cell::with_char('A');
        assert_eq!(cell.display_char(), 'A');
        assert_eq!(cell.width(), 1);
    }

    #[test]
    fn wide_char() {
        let cell = Cell::with_char('中');
        assert_eq!(cell.width(), 2);
    }

    #[test]
    fn combining_mark_joins_cluster() {
        let mut cell = Cell::with_char('e');
        cell.push_codepoint('\u{0301}');
        assert_eq!(cell.content(), "e\u{0301}");
        assert_eq!(cell.width(), 1);
        assert_eq!(cell.codepoints().count(), 2);
    }

    #[test]
    fn continuation_cell() {
        let mut cell = Cell::with_char('X');
        cell.make_continuation(CellAttributes::default(), 0);
        assert!(cell.is_continuation());
        assert!(cell.is_blank());
    }

    #[test]
    fn clear_keeps_attributes() {
        let mut attrs = CellAttributes::new();
        attrs.bg = Color::Indexed(4);
        let mut cell = Cell::with_char('X');
        cell.hyperlink = 7;
        cell.clear(attrs);
        assert!(cell.is_blank());
        assert_eq!(cell.attrs.bg, Color::Indexed(4));
        assert_eq!(cell.hyperlink, 0);
        assert_eq!(cell.width(), 1);
    }

    #[test]
    fn effective_colors_with_inverse() {
        let mut attrs = CellAttributes::new();
        attrs.fg = Color::Indexed(1);
        attrs.bg = Color::Indexed(0);
        attrs.inverse = true;
        assert_eq!(attrs.effective_fg(), Color::Indexed(0));
        assert_eq!(attrs.effective_bg(), Color::Indexed(1));
    }

    #[test]
    fn char_widths() {
        assert_eq!(char_width('a'), 1);
        assert_eq!(char_width('中'), 2);
        assert_eq!(char_width('\u{0301}'), 0);
    }
}
