//! The visible grid
//!
//! A `rows x cols` matrix of cells with margin-aware scrolling primitives.
//! Three scroll shapes exist, mirroring the DEC model:
//! - a boxed margin (left/right active): cell runs are copied within the
//!   rectangle and vacated runs blanked; no lines move,
//! - a full-width margin: whole lines are removed and blank lines inserted,
//!   with the removed lines returned so the caller can decide whether they
//!   enter scrollback,
//! - insert/delete lines are the same operations with the cursor row as the
//!   top of the region.

use serde::{Deserialize, Serialize};

use crate::cell::CellAttributes;
use crate::line::Line;
use crate::margin::Margin;
use crate::Dimensions;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    lines: Vec<Line>,
    cols: usize,
    rows: usize,
}

impl Grid {
    pub fn new(dims: Dimensions) -> Self {
        Self {
            lines: (0..dims.rows).map(|_| Line::new(dims.cols)).collect(),
            cols: dims.cols,
            rows: dims.rows,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            cols: self.cols,
            rows: self.rows,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn line(&self, row: usize) -> &Line {
        &self.lines[row]
    }

    pub fn line_mut(&mut self, row: usize) -> &mut Line {
        &mut self.lines[row]
    }

    pub fn get_line(&self, row: usize) -> Option<&Line> {
        self.lines.get(row)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter()
    }

    /// Blank every cell.
    pub fn clear(&mut self, attrs: CellAttributes) {
        for line in &mut self.lines {
            line.clear(attrs);
        }
    }

    /// Blank from the given position to the end of the screen (ED 0).
    pub fn clear_below(&mut self, row: usize, col: usize, attrs: CellAttributes) {
        if row >= self.rows {
            return;
        }
        self.lines[row].clear_from(col, attrs);
        for line in self.lines.iter_mut().skip(row + 1) {
            line.clear(attrs);
        }
    }

    /// Blank from the top of the screen through the given position (ED 1).
    pub fn clear_above(&mut self, row: usize, col: usize, attrs: CellAttributes) {
        if row >= self.rows {
            return;
        }
        for line in self.lines.iter_mut().take(row) {
            line.clear(attrs);
        }
        self.lines[row].clear_to(col, attrs);
    }

    /// Scroll the margin region up by `n`. Lines that leave a full-width
    /// region are returned (oldest first) for the caller's scrollback
    /// decision; a boxed region returns nothing.
    pub fn scroll_up(&mut self, margin: &Margin, n: usize, attrs: CellAttributes) -> Vec<Line> {
        if margin.bottom >= self.rows || margin.top > margin.bottom {
            return Vec::new();
        }
        let n = n.min(margin.height());
        if n == 0 {
            return Vec::new();
        }

        if !margin.is_full_width(self.cols) {
            // Boxed scroll: copy cell runs upward inside the rectangle.
            if n < margin.height() {
                for row in margin.top..=margin.bottom - n {
                    let run = self.lines[row + n].clone_range(margin.left, margin.right);
                    self.lines[row].paste_range(margin.left, run);
                }
            }
            for row in margin.bottom + 1 - n..=margin.bottom {
                self.lines[row].fill_range(margin.left, margin.right, attrs);
            }
            return Vec::new();
        }

        let mut evicted = Vec::with_capacity(n);
        for _ in 0..n {
            evicted.push(self.lines.remove(margin.top));
            self.lines
                .insert(margin.bottom, Line::with_attrs(self.cols, attrs));
        }
        evicted
    }

    /// Scroll the margin region down by `n`.
    pub fn scroll_down(&mut self, margin: &Margin, n: usize, attrs: CellAttributes) {
        if margin.bottom >= self.rows || margin.top > margin.bottom {
            return;
        }
        let n = n.min(margin.height());
        if n == 0 {
            return;
        }

        if !margin.is_full_width(self.cols) {
            for row in (margin.top + n..=margin.bottom).rev() {
                let run = self.lines[row - n].clone_range(margin.left, margin.right);
                self.lines[row].paste_range(margin.left, run);
            }
            for row in margin.top..margin.top + n {
                self.lines[row].fill_range(margin.left, margin.right, attrs);
            }
            return;
        }

        for _ in 0..n {
            self.lines.remove(margin.bottom);
            self.lines
                .insert(margin.top, Line::with_attrs(self.cols, attrs));
        }
    }

    /// Remove `n` lines from the top of the grid (for row shrink).
    pub fn take_top(&mut self, n: usize) -> Vec<Line> {
        let n = n.min(self.rows);
        let taken = self.lines.drain(..n).collect();
        self.rows -= n;
        taken
    }

    /// Drop `n` lines from the bottom of the grid (for row shrink while
    /// the cursor is in the kept region).
    pub fn drop_bottom(&mut self, n: usize) {
        let n = n.min(self.rows);
        self.lines.truncate(self.rows - n);
        self.rows -= n;
    }

    /// Append `n` blank lines at the bottom (for row growth).
    pub fn grow_bottom(&mut self, n: usize, attrs: CellAttributes) {
        for _ in 0..n {
            self.lines.push(Line::with_attrs(self.cols, attrs));
        }
        self.rows += n;
    }

    /// Change the column count of every line.
    pub fn resize_cols(&mut self, cols: usize, attrs: CellAttributes) {
        for line in &mut self.lines {
            line.resize(cols, attrs);
        }
        self.cols = cols;
    }
}
