//! Cursor state
//!
//! The cursor carries its 0-based position, the pending-wrap flag that
//! implements the DEC last-column behavior, the graphics rendition applied
//! to new characters, and the current hyperlink handle. The saved cursor
//! (DECSC) is a deep copy that also captures origin mode, autowrap, and the
//! charset table.

use serde::{Deserialize, Serialize};

use crate::cell::CellAttributes;
use crate::charset::CharsetTable;

/// Visual cursor shape (DECSCUSR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorShape {
    #[default]
    Block,
    Underscore,
    Bar,
}

/// Whether the cursor blinks (DECSCUSR odd/even selectors).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorDisplay {
    Steady,
    #[default]
    Blinking,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// 0-based row within the visible grid.
    pub row: usize,
    /// 0-based column.
    pub col: usize,
    /// Set after writing into the last column with autowrap on; the wrap
    /// happens when the next character arrives.
    pub pending_wrap: bool,
    /// Rendition applied to newly written cells.
    pub attrs: CellAttributes,
    /// Hyperlink handle stamped onto newly written cells; 0 means none.
    pub hyperlink: u32,
    pub shape: CursorShape,
    pub display: CursorDisplay,
}

impl Cursor {
    pub fn new() -> Self {
        Self {
            row: 0,
            col: 0,
            pending_wrap: false,
            attrs: CellAttributes::default(),
            hyperlink: 0,
            shape: CursorShape::Block,
            display: CursorDisplay::Blinking,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

/// The state captured by DECSC and restored by DECRC.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SavedCursor {
    pub row: usize,
    pub col: usize,
    pub attrs: CellAttributes,
    pub hyperlink: u32,
    pub pending_wrap: bool,
    pub origin: bool,
    pub auto_wrap: bool,
    pub charsets: CharsetTable,
}

impl SavedCursor {
    pub fn capture(cursor: &Cursor, origin: bool, auto_wrap: bool, charsets: &CharsetTable) -> Self {
        Self {
            row: cursor.row,
            col: cursor.col,
            attrs: cursor.attrs,
            hyperlink: cursor.hyperlink,
            pending_wrap: cursor.pending_wrap,
            origin,
            auto_wrap,
            charsets: charsets.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn new_cursor_at_home() {
        let cursor = Cursor::new();
        assert_eq!((cursor.row, cursor.col), (0, 0));
        assert!(!cursor.pending_wrap);
        assert_eq!(cursor.hyperlink, 0);
    }

    #[test]
    fn capture_snapshots_everything() {
        let mut cursor = Cursor::new();
        cursor.row = 4;
        cursor.col = 9;
        cursor.attrs.bold = true;
        cursor.attrs.fg = Color::Indexed(2);
        cursor.hyperlink = 3;

        let saved = SavedCursor::capture(&cursor, true, false, &CharsetTable::default());
        assert_eq!((saved.row, saved.col), (4, 9));
        assert!(saved.attrs.bold);
        assert_eq!(saved.attrs.fg, Color::Indexed(2));
        assert_eq!(saved.hyperlink, 3);
        assert!(saved.origin);
        assert!(!saved.auto_wrap);
    }

    #[test]
    fn default_saved_cursor_is_home() {
        let saved = SavedCursor::default();
        assert_eq!((saved.row, saved.col), (0, 0));
        assert_eq!(saved.attrs, CellAttributes::default());
    }
}
