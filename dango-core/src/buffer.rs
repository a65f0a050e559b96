//! Screen buffers
//!
//! One `ScreenBuffer` is a complete drawing surface: the visible grid, its
//! scrollback, cursor and saved cursor, margins, tab stops, modes, charset
//! table, and hyperlink table. The screen owns two of these (primary and
//! alternate) and applies commands to whichever is active.
//!
//! Coordinates are 0-based throughout; commands carry the protocol's
//! 1-based values and the screen converts at the boundary.

use serde::{Deserialize, Serialize};

use crate::cell::{char_width, CellAttributes};
use crate::charset::CharsetTable;
use crate::cursor::{Cursor, SavedCursor};
use crate::grid::Grid;
use crate::hyperlink::{Hyperlink, HyperlinkStore};
use crate::line::Line;
use crate::margin::Margin;
use crate::modes::{Mode, Modes};
use crate::scrollback::Scrollback;
use crate::tabs::TabStops;
use crate::Dimensions;

/// Zero width joiner; a character following one joins the previous cluster.
const ZWJ: char = '\u{200D}';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BufferKind {
    Primary,
    Alternate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenBuffer {
    kind: BufferKind,
    grid: Grid,
    history: Scrollback,
    pub cursor: Cursor,
    saved_cursor: SavedCursor,
    margin: Margin,
    pub(crate) tabs: TabStops,
    pub(crate) modes: Modes,
    pub(crate) charsets: CharsetTable,
    pub(crate) hyperlinks: HyperlinkStore,
    /// Last printed character, for REP.
    last_char: Option<char>,
    /// Position of the most recently written base cell, for grapheme
    /// continuation.
    last_cell: Option<(usize, usize)>,
}

impl ScreenBuffer {
    pub fn new(kind: BufferKind, dims: Dimensions, max_history: Option<usize>) -> Self {
        let history = match kind {
            // The alternate buffer never keeps history.
            BufferKind::Alternate => Scrollback::new(Some(0)),
            BufferKind::Primary => Scrollback::new(max_history),
        };
        Self {
            kind,
            grid: Grid::new(dims),
            history,
            cursor: Cursor::new(),
            saved_cursor: SavedCursor::default(),
            margin: Margin::full(dims),
            tabs: TabStops::new(),
            modes: Modes::new(),
            charsets: CharsetTable::new(),
            hyperlinks: HyperlinkStore::new(),
            last_char: None,
            last_cell: None,
        }
    }

    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn history(&self) -> &Scrollback {
        &self.history
    }

    pub fn margin(&self) -> &Margin {
        &self.margin
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    pub fn mode(&self, mode: Mode) -> bool {
        self.modes.enabled(mode)
    }

    /// Resolve a cell's hyperlink handle.
    pub fn hyperlink(&self, handle: u32) -> Option<&Hyperlink> {
        self.hyperlinks.get(handle)
    }

    /// The margin with the horizontal bounds collapsed to the full width
    /// unless DECLRMM is on; scroll operations act within this region.
    pub fn active_margin(&self) -> Margin {
        let mut margin = self.margin;
        if !self.modes.enabled(Mode::LeftRightMargin) {
            margin.left = 0;
            margin.right = self.cols() - 1;
        }
        margin
    }

    /// Left/right bounds that constrain the cursor, which follow the
    /// margins only while the cursor is inside them.
    fn cursor_bounds(&self) -> (usize, usize) {
        let margin = self.active_margin();
        if margin.contains(self.cursor.row, self.cursor.col) {
            (margin.left, margin.right)
        } else {
            (0, self.cols() - 1)
        }
    }

    // --- character output -------------------------------------------------

    /// Write one character at the cursor, handling charset translation,
    /// pending wrap, insert mode, wide pairs, and grapheme continuation.
    pub fn append_char(&mut self, c: char) {
        let c = self.charsets.apply(c);
        let width = char_width(c);

        // Zero-width codepoints and anything following a ZWJ join the
        // previously written cluster.
        if width == 0 || self.last_cell_ends_with_zwj() {
            self.join_previous(c);
            return;
        }

        let auto_wrap = self.modes.enabled(Mode::AutoWrap);
        if self.cursor.pending_wrap {
            if auto_wrap {
                let row = self.cursor.row;
                self.grid.line_mut(row).wrapped = true;
                self.wrap_to_next_line();
            }
            self.cursor.pending_wrap = false;
        }

        let (left, mut right) = self.cursor_bounds();
        let width_usize = usize::from(width);

        // A wide character needs a full pair of columns before the bound;
        // one that would touch the last column wraps first (or is pulled
        // left when autowrap is off).
        if width_usize == 2 && self.cursor.col + width_usize > right {
            if auto_wrap {
                let row = self.cursor.row;
                self.grid.line_mut(row).wrapped = true;
                self.wrap_to_next_line();
                right = self.cursor_bounds().1;
            } else {
                self.cursor.col = right.saturating_sub(1);
            }
        }

        if self.modes.enabled(Mode::Insert) {
            let (row, col) = (self.cursor.row, self.cursor.col);
            let attrs = self.cursor.attrs;
            self.grid
                .line_mut(row)
                .insert_cells(col, width_usize, right, attrs);
        }

        let (row, col) = (self.cursor.row, self.cursor.col);
        let attrs = self.cursor.attrs;
        let hyperlink = self.cursor.hyperlink;
        let cols = self.grid.cols();
        let line = self.grid.line_mut(row);
        line.sever_wide_pair(col);
        if width_usize == 2 {
            line.sever_wide_pair(col + 1);
        }
        let cell = line.cell_mut(col);
        cell.set_char(c);
        cell.attrs = attrs;
        cell.hyperlink = hyperlink;
        if width_usize == 2 && col + 1 < cols {
            line.cell_mut(col + 1).make_continuation(attrs, hyperlink);
        }

        self.last_char = Some(c);
        self.last_cell = Some((row, col));

        // Advance; landing past the bound arms the pending wrap instead,
        // which is the DEC last-column behavior.
        if col + width_usize <= right {
            self.cursor.col = col + width_usize;
        } else {
            self.cursor.col = right;
            if auto_wrap {
                self.cursor.pending_wrap = true;
            }
        }
    }

    pub fn last_char(&self) -> Option<char> {
        self.last_char
    }

    fn last_cell_ends_with_zwj(&self) -> bool {
        self.last_cell
            .and_then(|(row, col)| self.grid.get_line(row).and_then(|line| line.get(col)))
            .and_then(|cell| cell.last_codepoint())
            == Some(ZWJ)
    }

    fn join_previous(&mut self, c: char) {
        let Some((row, col)) = self.last_cell else {
            return;
        };
        if row >= self.grid.rows() || col >= self.grid.cols() {
            return;
        }
        let cell = self.grid.line_mut(row).cell_mut(col);
        if cell.content().is_empty() {
            return;
        }
        cell.push_codepoint(c);
    }

    /// Move to the left margin of the next line, scrolling at the bottom
    /// margin; used by autowrap.
    fn wrap_to_next_line(&mut self) {
        let margin = self.active_margin();
        if self.cursor.row == margin.bottom {
            self.scroll_up(1);
        } else if self.cursor.row + 1 < self.rows() {
            self.cursor.row += 1;
        }
        self.cursor.col = margin.left;
    }

    // --- control flow -----------------------------------------------------

    /// LF / IND: down one line, scrolling at the bottom margin.
    pub fn linefeed(&mut self) {
        self.cursor.pending_wrap = false;
        let margin = self.active_margin();
        if self.cursor.row == margin.bottom {
            self.scroll_up(1);
        } else if self.cursor.row + 1 < self.rows() {
            self.cursor.row += 1;
        }
    }

    /// RI: up one line, scrolling down at the top margin.
    pub fn reverse_index(&mut self) {
        self.cursor.pending_wrap = false;
        let margin = self.active_margin();
        if self.cursor.row == margin.top {
            self.scroll_down(1);
        } else if self.cursor.row > 0 {
            self.cursor.row -= 1;
        }
    }

    /// DECBI: left one column, scrolling the region right at the left
    /// margin.
    pub fn back_index(&mut self) {
        self.cursor.pending_wrap = false;
        let margin = self.active_margin();
        if self.cursor.col == margin.left && margin.contains_row(self.cursor.row) {
            self.shift_columns_right(1);
        } else if self.cursor.col > 0 {
            self.cursor.col -= 1;
        }
    }

    /// DECFI: right one column, scrolling the region left at the right
    /// margin.
    pub fn forward_index(&mut self) {
        self.cursor.pending_wrap = false;
        let margin = self.active_margin();
        if self.cursor.col == margin.right && margin.contains_row(self.cursor.row) {
            self.shift_columns_left(1);
        } else if self.cursor.col + 1 < self.cols() {
            self.cursor.col += 1;
        }
    }

    pub fn carriage_return(&mut self) {
        self.cursor.pending_wrap = false;
        let margin = self.active_margin();
        self.cursor.col = if self.cursor.col >= margin.left {
            margin.left
        } else {
            0
        };
    }

    pub fn backspace(&mut self) {
        let (left, right) = self.cursor_bounds();
        if self.cursor.pending_wrap && self.modes.enabled(Mode::ReverseWrapAround) {
            // The pending flag means the cursor visually sits past the
            // written cell; backspace just disarms it.
            self.cursor.pending_wrap = false;
            return;
        }
        self.cursor.pending_wrap = false;
        if self.cursor.col > left {
            self.cursor.col -= 1;
        } else if self.modes.enabled(Mode::ReverseWrapAround)
            && self.modes.enabled(Mode::AutoWrap)
            && self.cursor.row > self.active_margin().top
        {
            self.cursor.row -= 1;
            self.cursor.col = right;
        }
    }

    // --- cursor motion ----------------------------------------------------

    /// CUP/HVP with 0-based, origin-relative coordinates.
    pub fn move_cursor_to(&mut self, row: usize, col: usize) {
        self.cursor.pending_wrap = false;
        let margin = self.active_margin();
        if self.modes.enabled(Mode::Origin) {
            self.cursor.row = (margin.top + row).min(margin.bottom);
            self.cursor.col = (margin.left + col).min(margin.right);
        } else {
            self.cursor.row = row.min(self.rows() - 1);
            self.cursor.col = col.min(self.cols() - 1);
        }
    }

    pub fn move_up(&mut self, n: usize) {
        self.cursor.pending_wrap = false;
        let margin = self.active_margin();
        let limit = if self.cursor.row >= margin.top {
            margin.top
        } else {
            0
        };
        self.cursor.row = self.cursor.row.saturating_sub(n).max(limit);
    }

    pub fn move_down(&mut self, n: usize) {
        self.cursor.pending_wrap = false;
        let margin = self.active_margin();
        let limit = if self.cursor.row <= margin.bottom {
            margin.bottom
        } else {
            self.rows() - 1
        };
        self.cursor.row = (self.cursor.row + n).min(limit);
    }

    pub fn move_forward(&mut self, n: usize) {
        self.cursor.pending_wrap = false;
        let (_, right) = self.cursor_bounds();
        self.cursor.col = (self.cursor.col + n).min(right);
    }

    pub fn move_backward(&mut self, n: usize) {
        self.cursor.pending_wrap = false;
        let (left, _) = self.cursor_bounds();
        self.cursor.col = self.cursor.col.saturating_sub(n).max(left);
    }

    /// CHA/HPA with a 0-based column, origin-relative when applicable.
    pub fn move_to_column(&mut self, col: usize) {
        self.cursor.pending_wrap = false;
        if self.modes.enabled(Mode::Origin) {
            let margin = self.active_margin();
            self.cursor.col = (margin.left + col).min(margin.right);
        } else {
            self.cursor.col = col.min(self.cols() - 1);
        }
    }

    /// VPA with a 0-based row, origin-relative when applicable.
    pub fn move_to_line(&mut self, row: usize) {
        self.cursor.pending_wrap = false;
        if self.modes.enabled(Mode::Origin) {
            let margin = self.active_margin();
            self.cursor.row = (margin.top + row).min(margin.bottom);
        } else {
            self.cursor.row = row.min(self.rows() - 1);
        }
    }

    /// The cursor position as reported by CPR: origin-relative when origin
    /// mode is on.
    pub fn reported_cursor(&self) -> (usize, usize) {
        if self.modes.enabled(Mode::Origin) {
            let margin = self.active_margin();
            (
                self.cursor.row.saturating_sub(margin.top),
                self.cursor.col.saturating_sub(margin.left),
            )
        } else {
            (self.cursor.row, self.cursor.col)
        }
    }

    pub fn save_cursor(&mut self) {
        self.saved_cursor = SavedCursor::capture(
            &self.cursor,
            self.modes.enabled(Mode::Origin),
            self.modes.enabled(Mode::AutoWrap),
            &self.charsets,
        );
    }

    pub fn restore_cursor(&mut self) {
        let saved = self.saved_cursor.clone();
        self.cursor.row = saved.row.min(self.rows() - 1);
        self.cursor.col = saved.col.min(self.cols() - 1);
        self.cursor.attrs = saved.attrs;
        self.cursor.hyperlink = saved.hyperlink;
        self.cursor.pending_wrap = saved.pending_wrap;
        self.modes.set(Mode::Origin, saved.origin);
        self.modes.set(Mode::AutoWrap, saved.auto_wrap);
        self.charsets = saved.charsets;
    }

    // --- tabs -------------------------------------------------------------

    /// HT/CHT: forward to the n-th next tab stop, stopping at the right
    /// bound.
    pub fn tab_forward(&mut self, n: usize) {
        self.cursor.pending_wrap = false;
        let (_, right) = self.cursor_bounds();
        for _ in 0..n {
            match self.tabs.next_stop(self.cursor.col, right + 1) {
                Some(stop) => self.cursor.col = stop,
                None => {
                    self.cursor.col = right;
                    break;
                }
            }
        }
    }

    /// CBT: backward to the n-th previous tab stop, stopping at the left
    /// bound.
    pub fn tab_backward(&mut self, n: usize) {
        self.cursor.pending_wrap = false;
        let (left, _) = self.cursor_bounds();
        for _ in 0..n {
            match self.tabs.prev_stop(self.cursor.col) {
                Some(stop) if stop >= left => self.cursor.col = stop,
                _ => {
                    self.cursor.col = left;
                    break;
                }
            }
        }
    }

    pub fn set_tab_stop(&mut self) {
        let cols = self.cols();
        self.tabs.set(self.cursor.col, cols);
    }

    pub fn clear_tab_stop(&mut self) {
        let cols = self.cols();
        self.tabs.clear_at(self.cursor.col, cols);
    }

    // --- scrolling and regions --------------------------------------------

    /// Scroll the active region up; lines leaving a full-width region whose
    /// top is the first screen row feed the primary buffer's scrollback.
    pub fn scroll_up(&mut self, n: usize) {
        let margin = self.active_margin();
        self.scroll_up_in(&margin, n);
    }

    fn scroll_up_in(&mut self, margin: &Margin, n: usize) {
        let attrs = self.cursor.attrs;
        let evicted = self.grid.scroll_up(margin, n, attrs);
        let feeds_history = self.kind == BufferKind::Primary
            && margin.top == 0
            && margin.is_full_width(self.cols());
        if feeds_history {
            self.history.push_lines(evicted);
        }
    }

    pub fn scroll_down(&mut self, n: usize) {
        let margin = self.active_margin();
        let attrs = self.cursor.attrs;
        self.grid.scroll_down(&margin, n, attrs);
    }

    /// IL: only when the cursor is inside the region; the cursor moves to
    /// the left margin.
    pub fn insert_lines(&mut self, n: usize) {
        let margin = self.active_margin();
        if !margin.contains(self.cursor.row, self.cursor.col) {
            return;
        }
        let region = Margin {
            top: self.cursor.row,
            ..margin
        };
        let attrs = self.cursor.attrs;
        self.grid.scroll_down(&region, n, attrs);
        self.cursor.col = margin.left;
        self.cursor.pending_wrap = false;
    }

    /// DL: only when the cursor is inside the region; the cursor moves to
    /// the left margin.
    pub fn delete_lines(&mut self, n: usize) {
        let margin = self.active_margin();
        if !margin.contains(self.cursor.row, self.cursor.col) {
            return;
        }
        let region = Margin {
            top: self.cursor.row,
            ..margin
        };
        let attrs = self.cursor.attrs;
        // Deleted lines never reach scrollback.
        let _ = self.grid.scroll_up(&region, n, attrs);
        self.cursor.col = margin.left;
        self.cursor.pending_wrap = false;
    }

    /// DECIC: insert blank columns at the cursor within the region.
    pub fn insert_columns(&mut self, n: usize) {
        let margin = self.active_margin();
        if !margin.contains(self.cursor.row, self.cursor.col) {
            return;
        }
        let attrs = self.cursor.attrs;
        let col = self.cursor.col;
        for row in margin.top..=margin.bottom {
            self.grid
                .line_mut(row)
                .insert_cells(col, n, margin.right, attrs);
        }
    }

    /// DECDC: delete columns at the cursor within the region.
    pub fn delete_columns(&mut self, n: usize) {
        let margin = self.active_margin();
        if !margin.contains(self.cursor.row, self.cursor.col) {
            return;
        }
        let attrs = self.cursor.attrs;
        let col = self.cursor.col;
        for row in margin.top..=margin.bottom {
            self.grid
                .line_mut(row)
                .delete_cells(col, n, margin.right, attrs);
        }
    }

    fn shift_columns_right(&mut self, n: usize) {
        let margin = self.active_margin();
        let attrs = self.cursor.attrs;
        for row in margin.top..=margin.bottom {
            self.grid
                .line_mut(row)
                .insert_cells(margin.left, n, margin.right, attrs);
        }
    }

    fn shift_columns_left(&mut self, n: usize) {
        let margin = self.active_margin();
        let attrs = self.cursor.attrs;
        for row in margin.top..=margin.bottom {
            self.grid
                .line_mut(row)
                .delete_cells(margin.left, n, margin.right, attrs);
        }
    }

    /// DECSTBM: 0-based inclusive bounds; invalid pairs are ignored. The
    /// cursor homes, respecting origin mode.
    pub fn set_top_bottom_margin(&mut self, top: Option<usize>, bottom: Option<usize>) {
        let top = top.unwrap_or(0).min(self.rows() - 1);
        let bottom = bottom.unwrap_or(self.rows() - 1).min(self.rows() - 1);
        if top >= bottom {
            return;
        }
        self.margin.top = top;
        self.margin.bottom = bottom;
        self.move_cursor_to(0, 0);
    }

    /// DECSLRM: callers must already have checked DECLRMM.
    pub fn set_left_right_margin(&mut self, left: Option<usize>, right: Option<usize>) {
        let left = left.unwrap_or(0).min(self.cols() - 1);
        let right = right.unwrap_or(self.cols() - 1).min(self.cols() - 1);
        if left >= right {
            return;
        }
        self.margin.left = left;
        self.margin.right = right;
        self.move_cursor_to(0, 0);
    }

    pub fn reset_horizontal_margin(&mut self) {
        self.margin.left = 0;
        self.margin.right = self.cols() - 1;
    }

    pub fn reset_margin(&mut self) {
        self.margin = Margin::full(self.grid.dimensions());
    }

    // --- erasing and editing ----------------------------------------------

    pub fn clear_to_end_of_screen(&mut self) {
        let attrs = self.cursor.attrs;
        let (row, col) = (self.cursor.row, self.cursor.col);
        self.grid.clear_below(row, col, attrs);
    }

    pub fn clear_to_begin_of_screen(&mut self) {
        let attrs = self.cursor.attrs;
        let (row, col) = (self.cursor.row, self.cursor.col);
        self.grid.clear_above(row, col, attrs);
    }

    pub fn clear_screen(&mut self) {
        let attrs = self.cursor.attrs;
        self.grid.clear(attrs);
    }

    pub fn clear_to_end_of_line(&mut self) {
        let attrs = self.cursor.attrs;
        let (row, col) = (self.cursor.row, self.cursor.col);
        self.grid.line_mut(row).clear_from(col, attrs);
    }

    pub fn clear_to_begin_of_line(&mut self) {
        let attrs = self.cursor.attrs;
        let (row, col) = (self.cursor.row, self.cursor.col);
        self.grid.line_mut(row).clear_to(col, attrs);
    }

    pub fn clear_line(&mut self) {
        let attrs = self.cursor.attrs;
        let row = self.cursor.row;
        self.grid.line_mut(row).clear(attrs);
    }

    pub fn erase_characters(&mut self, n: usize) {
        let attrs = self.cursor.attrs;
        let (row, col) = (self.cursor.row, self.cursor.col);
        self.grid.line_mut(row).erase_cells(col, n, attrs);
    }

    pub fn insert_characters(&mut self, n: usize) {
        let (_, right) = self.cursor_bounds();
        let attrs = self.cursor.attrs;
        let (row, col) = (self.cursor.row, self.cursor.col);
        self.grid.line_mut(row).insert_cells(col, n, right, attrs);
    }

    pub fn delete_characters(&mut self, n: usize) {
        let (_, right) = self.cursor_bounds();
        let attrs = self.cursor.attrs;
        let (row, col) = (self.cursor.row, self.cursor.col);
        self.grid.line_mut(row).delete_cells(col, n, right, attrs);
    }

    /// DECALN: fill with 'E', reset margins, home the cursor.
    pub fn screen_alignment_pattern(&mut self) {
        self.reset_margin();
        for row in 0..self.rows() {
            let line = self.grid.line_mut(row);
            line.wrapped = false;
            line.marked = false;
            for cell in line.iter_mut() {
                cell.set_char('E');
                cell.attrs = CellAttributes::default();
                cell.hyperlink = 0;
            }
        }
        self.cursor.pending_wrap = false;
        self.cursor.row = 0;
        self.cursor.col = 0;
    }

    // --- marks ------------------------------------------------------------

    pub fn set_mark(&mut self) {
        let row = self.cursor.row;
        self.grid.line_mut(row).marked = true;
    }

    /// The next marked history line above `scroll_offset`, as a viewport
    /// offset (lines between the bottom and the mark).
    pub fn find_prev_marker(&self, scroll_offset: usize) -> Option<usize> {
        let len = self.history.len();
        let start = scroll_offset.min(len);
        (start + 1..=len).find(|&offset| {
            self.history
                .get_from_end(offset - 1)
                .is_some_and(|line| line.marked)
        })
    }

    /// The next marked history line below `scroll_offset`, defaulting to
    /// the live bottom (offset 0).
    pub fn find_next_marker(&self, scroll_offset: usize) -> Option<usize> {
        let start = scroll_offset.min(self.history.len());
        if start == 0 {
            return None;
        }
        Some(
            (1..start)
                .rev()
                .find(|&offset| {
                    self.history
                        .get_from_end(offset - 1)
                        .is_some_and(|line| line.marked)
                })
                .unwrap_or(0),
        )
    }

    // --- absolute addressing ----------------------------------------------

    /// ED 3: drop the history.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Rebound the history; only meaningful on the primary buffer.
    pub fn set_max_history(&mut self, max: Option<usize>) {
        if self.kind == BufferKind::Primary {
            self.history.set_max_lines(max);
        }
    }

    /// Total addressable lines: history plus the visible grid.
    pub fn total_lines(&self) -> usize {
        self.history.len() + self.rows()
    }

    /// Line by absolute index: 0 is the oldest history line.
    pub fn absolute_line(&self, index: usize) -> Option<&Line> {
        let history = self.history.len();
        if index < history {
            self.history.get(index)
        } else {
            self.grid.get_line(index - history)
        }
    }

    // --- lifecycle --------------------------------------------------------

    /// Resize per the screen contract: columns pad or truncate in place;
    /// on a row shrink, lines above the kept region move into the primary
    /// scrollback when the cursor would otherwise be cut off, and blank
    /// bottom rows are dropped otherwise (the alternate buffer never feeds
    /// scrollback); on growth blank rows append at the bottom. Margins
    /// reset, the cursor clamps.
    pub fn resize(&mut self, dims: Dimensions) {
        let attrs = CellAttributes::default();
        let old_rows = self.rows();

        if dims.rows < old_rows {
            let excess = old_rows - dims.rows;
            if self.cursor.row >= dims.rows {
                let removed = self.grid.take_top(excess);
                if self.kind == BufferKind::Primary {
                    self.history.push_lines(removed);
                }
                self.cursor.row = self.cursor.row.saturating_sub(excess);
            } else {
                self.grid.drop_bottom(excess);
            }
        } else if dims.rows > old_rows {
            self.grid.grow_bottom(dims.rows - old_rows, attrs);
        }

        if dims.cols != self.cols() {
            self.grid.resize_cols(dims.cols, attrs);
            self.history.resize_columns(dims.cols, attrs);
            self.tabs.resize(dims.cols);
        }

        self.margin = Margin::full(dims);
        self.cursor.row = self.cursor.row.min(dims.rows - 1);
        self.cursor.col = self.cursor.col.min(dims.cols - 1);
        self.cursor.pending_wrap = false;
        self.last_cell = None;
    }

    /// DECSTR-level reset: rendition, modes with visual defaults, margins,
    /// charsets, saved cursor. Grid content survives.
    pub fn reset_soft(&mut self) {
        self.cursor.attrs = CellAttributes::default();
        self.cursor.hyperlink = 0;
        self.cursor.pending_wrap = false;
        self.modes.set(Mode::Origin, false);
        self.modes.set(Mode::Insert, false);
        self.modes.set(Mode::AutoWrap, true);
        self.modes.set(Mode::VisibleCursor, true);
        self.modes.set(Mode::LeftRightMargin, false);
        self.reset_margin();
        self.charsets.reset();
        self.saved_cursor = SavedCursor::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn buffer() -> ScreenBuffer {
        ScreenBuffer::new(BufferKind::Primary, Dimensions::new(80, 24), Some(100))
    }

    fn write(buffer: &mut ScreenBuffer, text: &str) {
        for c in text.chars() {
            buffer.append_char(c);
        }
    }

    #[test]
    fn append_advances_cursor() {
        let mut buffer = buffer();
        write(&mut buffer, "Hello");
        assert_eq!(buffer.grid().line(0).text(), "Hello");
        assert_eq!((buffer.cursor.row, buffer.cursor.col), (0, 5));
    }

    #[test]
    fn last_column_arms_pending_wrap() {
        let mut buffer = ScreenBuffer::new(BufferKind::Primary, Dimensions::new(5, 3), None);
        write(&mut buffer, "abcde");
        assert_eq!(buffer.cursor.col, 4);
        assert!(buffer.cursor.pending_wrap);
        // The wrap happens only when the next character arrives.
        buffer.append_char('f');
        assert_eq!(buffer.cursor.row, 1);
        assert_eq!(buffer.cursor.col, 1);
        assert_eq!(buffer.grid().line(1).text(), "f");
        assert!(buffer.grid().line(0).wrapped);
    }

    #[test]
    fn wrap_scrolls_at_bottom() {
        let mut buffer = ScreenBuffer::new(BufferKind::Primary, Dimensions::new(3, 2), None);
        write(&mut buffer, "abcdefg");
        assert_eq!(buffer.grid().line(0).text(), "def");
        assert_eq!(buffer.grid().line(1).text(), "g");
        assert_eq!(buffer.history().len(), 1);
        assert_eq!(buffer.history().get(0).unwrap().text(), "abc");
    }

    #[test]
    fn wide_char_occupies_pair() {
        let mut buffer = buffer();
        buffer.append_char('中');
        assert_eq!(buffer.grid().line(0).cell(0).width(), 2);
        assert!(buffer.grid().line(0).cell(1).is_continuation());
        assert_eq!(buffer.cursor.col, 2);
    }

    #[test]
    fn wide_char_wraps_from_last_column() {
        let mut buffer = ScreenBuffer::new(BufferKind::Primary, Dimensions::new(80, 24), None);
        buffer.move_cursor_to(0, 78);
        buffer.append_char('中');
        // Columns 78/79 of row 0 stay untouched; the glyph lands at row 1.
        assert!(buffer.grid().line(0).cell(78).is_blank());
        assert!(buffer.grid().line(0).cell(79).is_blank());
        assert_eq!(buffer.grid().line(1).cell(0).display_char(), '中');
        assert!(buffer.grid().line(1).cell(1).is_continuation());
    }

    #[test]
    fn overwriting_wide_half_clears_partner() {
        let mut buffer = buffer();
        buffer.append_char('中');
        buffer.move_cursor_to(0, 1);
        buffer.append_char('x');
        assert!(buffer.grid().line(0).cell(0).is_blank());
        assert_eq!(buffer.grid().line(0).cell(1).display_char(), 'x');
    }

    #[test]
    fn combining_mark_joins_previous_cell() {
        let mut buffer = buffer();
        buffer.append_char('e');
        buffer.append_char('\u{0301}');
        let cell = buffer.grid().line(0).cell(0);
        assert_eq!(cell.content(), "e\u{0301}");
        assert_eq!(buffer.cursor.col, 1);
    }

    #[test]
    fn zwj_sequence_stays_in_one_cell() {
        let mut buffer = buffer();
        buffer.append_char('👩');
        buffer.append_char('\u{200D}');
        buffer.append_char('💻');
        let cell = buffer.grid().line(0).cell(0);
        assert_eq!(cell.codepoints().count(), 3);
        assert_eq!(buffer.cursor.col, 2);
    }

    #[test]
    fn insert_mode_shifts_right() {
        let mut buffer = buffer();
        write(&mut buffer, "ABC");
        buffer.move_cursor_to(0, 0);
        buffer.modes.set(Mode::Insert, true);
        buffer.append_char('X');
        assert_eq!(buffer.grid().line(0).text(), "XABC");
    }

    #[test]
    fn linefeed_and_reverse_index_scroll_within_margins() {
        let mut buffer = ScreenBuffer::new(BufferKind::Primary, Dimensions::new(10, 5), None);
        for row in 0..5 {
            buffer.move_cursor_to(row, 0);
            buffer.append_char((b'A' + row as u8) as char);
        }
        buffer.set_top_bottom_margin(Some(1), Some(3));
        buffer.move_cursor_to(3, 0);
        buffer.linefeed();
        // B scrolled away inside the region; A and E untouched.
        assert_eq!(buffer.grid().line(0).text(), "A");
        assert_eq!(buffer.grid().line(1).text(), "C");
        assert_eq!(buffer.grid().line(2).text(), "D");
        assert!(buffer.grid().line(3).is_blank());
        assert_eq!(buffer.grid().line(4).text(), "E");
        // Nothing entered history: the region top is not the screen top.
        assert_eq!(buffer.history().len(), 0);

        buffer.move_cursor_to(1, 0);
        buffer.reverse_index();
        assert!(buffer.grid().line(1).is_blank());
        assert_eq!(buffer.grid().line(2).text(), "C");
    }

    #[test]
    fn origin_mode_addresses_relative_to_margins() {
        let mut buffer = ScreenBuffer::new(BufferKind::Primary, Dimensions::new(20, 10), None);
        buffer.set_top_bottom_margin(Some(2), Some(7));
        buffer.modes.set(Mode::Origin, true);
        buffer.move_cursor_to(0, 0);
        assert_eq!(buffer.cursor.row, 2);
        // Addressing cannot leave the margins.
        buffer.move_cursor_to(50, 0);
        assert_eq!(buffer.cursor.row, 7);
        assert_eq!(buffer.reported_cursor(), (5, 0));
    }

    #[test]
    fn left_right_margins_constrain_motion() {
        let mut buffer = ScreenBuffer::new(BufferKind::Primary, Dimensions::new(20, 5), None);
        buffer.modes.set(Mode::LeftRightMargin, true);
        buffer.set_left_right_margin(Some(5), Some(10));
        buffer.move_cursor_to(0, 7);
        buffer.move_forward(99);
        assert_eq!(buffer.cursor.col, 10);
        buffer.move_backward(99);
        assert_eq!(buffer.cursor.col, 5);
        buffer.carriage_return();
        assert_eq!(buffer.cursor.col, 5);
    }

    #[test]
    fn wrap_respects_left_right_margins() {
        let mut buffer = ScreenBuffer::new(BufferKind::Primary, Dimensions::new(20, 5), None);
        buffer.modes.set(Mode::LeftRightMargin, true);
        buffer.set_left_right_margin(Some(2), Some(5));
        buffer.move_cursor_to(0, 2);
        write(&mut buffer, "abcdef");
        assert_eq!(buffer.cursor.row, 1);
        assert_eq!(buffer.grid().line(0).cell(2).display_char(), 'a');
        assert_eq!(buffer.grid().line(0).cell(5).display_char(), 'd');
        assert_eq!(buffer.grid().line(1).cell(2).display_char(), 'e');
        // Cells outside the margins stay blank.
        assert!(buffer.grid().line(0).cell(6).is_blank());
    }

    #[test]
    fn delete_characters_bounded_by_margin() {
        let mut buffer = ScreenBuffer::new(BufferKind::Primary, Dimensions::new(10, 2), None);
        write(&mut buffer, "ABCDEFGHIJ");
        buffer.modes.set(Mode::LeftRightMargin, true);
        buffer.set_left_right_margin(Some(2), Some(7));
        buffer.move_cursor_to(0, 3);
        buffer.delete_characters(2);
        assert_eq!(buffer.grid().line(0).text(), "ABCFGH  IJ");
    }

    #[test]
    fn tabs_move_and_clear() {
        let mut buffer = buffer();
        buffer.tab_forward(1);
        assert_eq!(buffer.cursor.col, 8);
        buffer.tab_forward(2);
        assert_eq!(buffer.cursor.col, 24);
        buffer.tab_backward(1);
        assert_eq!(buffer.cursor.col, 16);
        buffer.clear_tab_stop();
        buffer.move_cursor_to(0, 8);
        buffer.tab_forward(1);
        assert_eq!(buffer.cursor.col, 24);
    }

    #[test]
    fn save_restore_cursor_round_trip() {
        let mut buffer = buffer();
        buffer.move_cursor_to(3, 7);
        buffer.cursor.attrs.bold = true;
        buffer.cursor.attrs.fg = Color::Indexed(3);
        buffer.save_cursor();
        buffer.move_cursor_to(0, 0);
        buffer.cursor.attrs = CellAttributes::default();
        buffer.restore_cursor();
        assert_eq!((buffer.cursor.row, buffer.cursor.col), (3, 7));
        assert!(buffer.cursor.attrs.bold);
        assert_eq!(buffer.cursor.attrs.fg, Color::Indexed(3));
    }

    #[test]
    fn resize_rows_shrink_feeds_history() {
        let mut buffer = ScreenBuffer::new(BufferKind::Primary, Dimensions::new(10, 5), None);
        for row in 0..5 {
            buffer.move_cursor_to(row, 0);
            buffer.append_char((b'A' + row as u8) as char);
        }
        buffer.cursor.row = 4;
        buffer.resize(Dimensions::new(10, 3));
        assert_eq!(buffer.rows(), 3);
        assert_eq!(buffer.history().len(), 2);
        assert_eq!(buffer.history().get(0).unwrap().text(), "A");
        assert_eq!(buffer.grid().line(0).text(), "C");
        assert_eq!(buffer.cursor.row, 2);
    }

    #[test]
    fn resize_alternate_drops_rows() {
        let mut buffer = ScreenBuffer::new(BufferKind::Alternate, Dimensions::new(10, 5), None);
        write(&mut buffer, "top");
        buffer.resize(Dimensions::new(10, 3));
        assert_eq!(buffer.history().len(), 0);
    }

    #[test]
    fn alternate_never_keeps_history() {
        let mut buffer = ScreenBuffer::new(BufferKind::Alternate, Dimensions::new(3, 2), None);
        write(&mut buffer, "abcdefghi");
        assert_eq!(buffer.history().len(), 0);
    }

    #[test]
    fn reverse_wraparound_backspace() {
        let mut buffer = ScreenBuffer::new(BufferKind::Primary, Dimensions::new(5, 3), None);
        write(&mut buffer, "abcdef");
        assert_eq!((buffer.cursor.row, buffer.cursor.col), (1, 1));
        buffer.modes.set(Mode::ReverseWrapAround, true);
        buffer.backspace();
        buffer.backspace();
        assert_eq!((buffer.cursor.row, buffer.cursor.col), (0, 4));
    }

    #[test]
    fn alignment_pattern_fills_screen() {
        let mut buffer = ScreenBuffer::new(BufferKind::Primary, Dimensions::new(4, 2), None);
        buffer.set_top_bottom_margin(Some(0), Some(1));
        buffer.screen_alignment_pattern();
        assert_eq!(buffer.grid().line(0).text(), "EEEE");
        assert_eq!(buffer.grid().line(1).text(), "EEEE");
        assert_eq!((buffer.cursor.row, buffer.cursor.col), (0, 0));
    }

    #[test]
    fn markers_found_in_history() {
        let mut buffer = ScreenBuffer::new(BufferKind::Primary, Dimensions::new(5, 2), None);
        buffer.set_mark();
        for _ in 0..4 {
            buffer.linefeed();
        }
        // The marked line has scrolled into history.
        assert!(buffer.history().iter().any(|line| line.marked));
        let offset = buffer.find_prev_marker(0).unwrap();
        assert!(offset > 0);
        assert_eq!(buffer.find_next_marker(offset), Some(0));
    }
}
