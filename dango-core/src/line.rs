//! Grid lines
//!
//! A line is a fixed-width row of cells plus two flags: `wrapped`, set when
//! the next line is a soft-wrap continuation of this one (used to rebuild
//! logical lines), and `marked`, set by the mark command for jump
//! navigation.

use serde::{Deserialize, Serialize};

use crate::cell::{Cell, CellAttributes};

/// One row of the grid or scrollback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    cells: Vec<Cell>,
    /// True when the following line continues this one (soft wrap).
    pub wrapped: bool,
    /// True when a mark was set on this line.
    pub marked: bool,
}

impl Line {
    pub fn new(cols: usize) -> Self {
        Self {
            cells: vec![Cell::new(); cols],
            wrapped: false,
            marked: false,
        }
    }

    pub fn with_attrs(cols: usize, attrs: CellAttributes) -> Self {
        let mut line = Self::new(cols);
        for cell in &mut line.cells {
            cell.attrs = attrs;
        }
        line
    }

    pub fn cols(&self) -> usize {
        self.cells.len()
    }

    pub fn get(&self, col: usize) -> Option<&Cell> {
        self.cells.get(col)
    }

    pub fn get_mut(&mut self, col: usize) -> Option<&mut Cell> {
        self.cells.get_mut(col)
    }

    /// Cell at `col`; panics when out of bounds.
    pub fn cell(&self, col: usize) -> &Cell {
        &self.cells[col]
    }

    pub fn cell_mut(&mut self, col: usize) -> &mut Cell {
        &mut self.cells[col]
    }

    /// Blank the whole line and drop its flags.
    pub fn clear(&mut self, attrs: CellAttributes) {
        for cell in &mut self.cells {
            cell.clear(attrs);
        }
        self.wrapped = false;
        self.marked = false;
    }

    /// Blank from `col` to the end of the line.
    pub fn clear_from(&mut self, col: usize, attrs: CellAttributes) {
        self.sever_wide_pair(col);
        for cell in self.cells.iter_mut().skip(col) {
            cell.clear(attrs);
        }
        self.wrapped = false;
    }

    /// Blank from the start of the line through `col`.
    pub fn clear_to(&mut self, col: usize, attrs: CellAttributes) {
        if col + 1 < self.cells.len() {
            self.sever_wide_pair(col + 1);
        }
        for cell in self.cells.iter_mut().take(col + 1) {
            cell.clear(attrs);
        }
    }

    /// Blank the inclusive column range `left..=right` without shifting.
    pub fn fill_range(&mut self, left: usize, right: usize, attrs: CellAttributes) {
        let right = right.min(self.cells.len().saturating_sub(1));
        if left > right {
            return;
        }
        self.sever_wide_pair(left);
        if right + 1 < self.cells.len() {
            self.sever_wide_pair(right + 1);
        }
        for cell in &mut self.cells[left..=right] {
            cell.clear(attrs);
        }
    }

    /// Insert `n` blank cells at `col`, shifting right; cells pushed past
    /// `right` (inclusive bound) are lost.
    pub fn insert_cells(&mut self, col: usize, n: usize, right: usize, attrs: CellAttributes) {
        let right = right.min(self.cells.len().saturating_sub(1));
        if col > right {
            return;
        }
        let n = n.min(right - col + 1);
        if n == 0 {
            return;
        }
        self.sever_wide_pair(col);
        if right + 1 < self.cells.len() {
            self.sever_wide_pair(right + 1);
        }
        self.cells[col..=right].rotate_right(n);
        for cell in &mut self.cells[col..col + n] {
            cell.clear(attrs);
        }
    }

    /// Delete `n` cells at `col`, shifting left within the inclusive bound
    /// `right`; vacated cells at the bound are blanked.
    pub fn delete_cells(&mut self, col: usize, n: usize, right: usize, attrs: CellAttributes) {
        let right = right.min(self.cells.len().saturating_sub(1));
        if col > right {
            return;
        }
        let n = n.min(right - col + 1);
        if n == 0 {
            return;
        }
        self.sever_wide_pair(col);
        if right + 1 < self.cells.len() {
            self.sever_wide_pair(right + 1);
        }
        self.cells[col..=right].rotate_left(n);
        for cell in &mut self.cells[right + 1 - n..=right] {
            cell.clear(attrs);
        }
    }

    /// Blank `n` cells starting at `col` without shifting (ECH).
    pub fn erase_cells(&mut self, col: usize, n: usize, attrs: CellAttributes) {
        let end = col.saturating_add(n).min(self.cells.len());
        if col >= end {
            return;
        }
        self.sever_wide_pair(col);
        if end < self.cells.len() {
            self.sever_wide_pair(end);
        }
        for cell in &mut self.cells[col..end] {
            cell.clear(attrs);
        }
    }

    /// Keep wide pairs atomic: if `col` points into either half of a wide
    /// character, blank the partner half so no orphan remains.
    pub fn sever_wide_pair(&mut self, col: usize) {
        let Some(cell) = self.cells.get(col) else {
            return;
        };
        if cell.is_continuation() {
            if col > 0 {
                let attrs = self.cells[col - 1].attrs;
                self.cells[col - 1].clear(attrs);
            }
        } else if cell.width() == 2 && col + 1 < self.cells.len() {
            let attrs = self.cells[col + 1].attrs;
            self.cells[col + 1].clear(attrs);
        }
    }

    /// Clone the inclusive cell range `left..=right`.
    pub fn clone_range(&self, left: usize, right: usize) -> Vec<Cell> {
        let right = right.min(self.cells.len().saturating_sub(1));
        if left > right {
            return Vec::new();
        }
        self.cells[left..=right].to_vec()
    }

    /// Overwrite cells starting at `left` with the given run.
    pub fn paste_range(&mut self, left: usize, cells: Vec<Cell>) {
        for (offset, cell) in cells.into_iter().enumerate() {
            if let Some(slot) = self.cells.get_mut(left + offset) {
                *slot = cell;
            }
        }
    }

    /// Grow or shrink to `cols`, preserving the wrap flag.
    pub fn resize(&mut self, cols: usize, attrs: CellAttributes) {
        if cols > self.cells.len() {
            self.cells.resize_with(cols, || {
                let mut cell = Cell::new();
                cell.attrs = attrs;
                cell
            });
        } else {
            self.cells.truncate(cols);
        }
    }

    /// Decoded text with continuation halves skipped and trailing blanks
    /// trimmed; used for selection extraction.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for cell in &self.cells {
            if cell.is_continuation() {
                continue;
            }
            if cell.content().is_empty() {
                text.push(' ');
            } else {
                text.push_str(cell.content());
            }
        }
        text.trim_end().to_string()
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Cell::is_blank)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_with(text: &str, cols: usize) -> Line {
        let mut line = Line::new(cols);
        for (i, c) in text.chars().enumerate() {
            line.cell_mut(i).set_char(c);
        }
        line
    }

    #[test]
    fn new_line_dimensions() {
        let line = Line::new(80);
        assert_eq!(line.cols(), 80);
        assert!(!line.wrapped);
        assert!(!line.marked);
    }

    #[test]
    fn clear_from_and_to() {
        let mut line = line_with("ABCDEFGHIJ", 10);
        line.clear_from(5, CellAttributes::default());
        assert_eq!(line.cell(4).display_char(), 'E');
        assert!(line.cell(5).is_blank());

        let mut line = line_with("ABCDEFGHIJ", 10);
        line.clear_to(4, CellAttributes::default());
        assert!(line.cell(4).is_blank());
        assert_eq!(line.cell(5).display_char(), 'F');
    }

    #[test]
    fn insert_cells_shifts_within_bound() {
        let mut line = line_with("ABCDE", 5);
        line.insert_cells(2, 2, 4, CellAttributes::default());
        assert_eq!(line.cell(0).display_char(), 'A');
        assert_eq!(line.cell(1).display_char(), 'B');
        assert!(line.cell(2).is_blank());
        assert!(line.cell(3).is_blank());
        assert_eq!(line.cell(4).display_char(), 'C');
    }

    #[test]
    fn delete_cells_shifts_within_bound() {
        let mut line = line_with("ABCDE", 5);
        line.delete_cells(1, 2, 4, CellAttributes::default());
        assert_eq!(line.cell(0).display_char(), 'A');
        assert_eq!(line.cell(1).display_char(), 'D');
        assert_eq!(line.cell(2).display_char(), 'E');
        assert!(line.cell(3).is_blank());
        assert!(line.cell(4).is_blank());
    }

    #[test]
    fn insert_respects_right_margin() {
        let mut line = line_with("ABCDE", 5);
        // Only columns 0..=2 participate; D and E stay put.
        line.insert_cells(0, 1, 2, CellAttributes::default());
        assert!(line.cell(0).is_blank());
        assert_eq!(line.cell(1).display_char(), 'A');
        assert_eq!(line.cell(2).display_char(), 'B');
        assert_eq!(line.cell(3).display_char(), 'D');
        assert_eq!(line.cell(4).display_char(), 'E');
    }

    #[test]
    fn erase_cells_blanks_without_shifting() {
        let mut line = line_with("ABCDE", 5);
        line.erase_cells(1, 2, CellAttributes::default());
        assert_eq!(line.cell(0).display_char(), 'A');
        assert!(line.cell(1).is_blank());
        assert!(line.cell(2).is_blank());
        assert_eq!(line.cell(3).display_char(), 'D');
    }

    #[test]
    fn sever_wide_pair_from_either_half() {
        let mut line = Line::new(5);
        line.cell_mut(1).set_char('中');
        let attrs = line.cell(1).attrs;
        line.cell_mut(2).make_continuation(attrs, 0);

        // Overwriting the continuation half blanks the base.
        let mut a = line.clone();
        a.sever_wide_pair(2);
        assert!(a.cell(1).is_blank());

        // Overwriting the base blanks the continuation half.
        line.sever_wide_pair(1);
        assert!(line.cell(2).is_blank());
        assert!(!line.cell(2).is_continuation());
    }

    #[test]
    fn text_skips_continuations_and_trims() {
        let mut line = Line::new(6);
        line.cell_mut(0).set_char('中');
        let attrs = line.cell(0).attrs;
        line.cell_mut(1).make_continuation(attrs, 0);
        line.cell_mut(2).set_char('!');
        assert_eq!(line.text(), "中!");
    }

    #[test]
    fn resize_preserves_wrap_flag() {
        let mut line = line_with("AB", 2);
        line.wrapped = true;
        line.resize(4, CellAttributes::default());
        assert_eq!(line.cols(), 4);
        assert!(line.wrapped);
        line.resize(1, CellAttributes::default());
        assert_eq!(line.cols(), 1);
        assert!(line.wrapped);
    }
}
