//! Selection overlay
//!
//! The selector describes a selection in absolute coordinates (row 0 is the
//! oldest scrollback line), so the selection stays put while the viewport
//! scrolls. It holds no reference to the screen; the screen resolves word
//! boundaries and produces the final cell ranges.

use serde::{Deserialize, Serialize};

/// How the selection grows from its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionMode {
    /// Character-by-character, flowing across line ends.
    Linear,
    /// Rectangular region.
    Block,
    /// Like linear, extended to unicode word boundaries.
    Word,
    /// Whole lines.
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionState {
    /// Anchored, not yet extended.
    Waiting,
    /// Being extended.
    InProgress,
    /// Finalized.
    Complete,
}

/// An absolute, history-inclusive grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionPoint {
    pub row: usize,
    pub col: usize,
}

impl SelectionPoint {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// One selected cell run, as produced by `Screen::selection()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRange {
    /// Absolute row.
    pub row: usize,
    pub start_col: usize,
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    mode: SelectionMode,
    state: SelectionState,
    anchor: SelectionPoint,
    active: SelectionPoint,
}

impl Selector {
    pub fn new(mode: SelectionMode, anchor: SelectionPoint) -> Self {
        Self {
            mode,
            state: SelectionState::Waiting,
            anchor,
            active: anchor,
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn anchor(&self) -> SelectionPoint {
        self.anchor
    }

    /// Grow the selection to `point`.
    pub fn extend(&mut self, point: SelectionPoint) {
        if self.state != SelectionState::Complete {
            self.active = point;
            self.state = SelectionState::InProgress;
        }
    }

    /// Finalize; further `extend` calls are ignored.
    pub fn complete(&mut self) {
        self.state = SelectionState::Complete;
    }

    /// Anchor and active point in document order.
    pub fn bounds(&self) -> (SelectionPoint, SelectionPoint) {
        let (a, b) = (self.anchor, self.active);
        if a.row < b.row || (a.row == b.row && a.col <= b.col) {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// Whether the absolute cell lies inside the selection. Word mode is
    /// treated as linear here; the screen applies word expansion.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        if self.state == SelectionState::Waiting {
            return false;
        }
        let (start, end) = self.bounds();
        match self.mode {
            SelectionMode::Linear | SelectionMode::Word => {
                if row < start.row || row > end.row {
                    false
                } else if start.row == end.row {
                    col >= start.col && col <= end.col
                } else if row == start.row {
                    col >= start.col
                } else if row == end.row {
                    col <= end.col
                } else {
                    true
                }
            }
            SelectionMode::Line => row >= start.row && row <= end.row,
            SelectionMode::Block => {
                let (left, right) = if start.col <= end.col {
                    (start.col, end.col)
                } else {
                    (end.col, start.col)
                };
                row >= start.row && row <= end.row && col >= left && col <= right
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector(mode: SelectionMode, a: (usize, usize), b: (usize, usize)) -> Selector {
        let mut selector = Selector::new(mode, SelectionPoint::new(a.0, a.1));
        selector.extend(SelectionPoint::new(b.0, b.1));
        selector
    }

    #[test]
    fn waiting_selects_nothing() {
        let selector = Selector::new(SelectionMode::Linear, SelectionPoint::new(3, 3));
        assert_eq!(selector.state(), SelectionState::Waiting);
        assert!(!selector.contains(3, 3));
    }

    #[test]
    fn extend_transitions_state() {
        let mut selector = Selector::new(SelectionMode::Linear, SelectionPoint::new(0, 0));
        selector.extend(SelectionPoint::new(0, 5));
        assert_eq!(selector.state(), SelectionState::InProgress);
        selector.complete();
        assert_eq!(selector.state(), SelectionState::Complete);
        // Extending after completion is ignored.
        selector.extend(SelectionPoint::new(9, 9));
        assert!(!selector.contains(9, 9));
    }

    #[test]
    fn bounds_normalize_direction() {
        let backwards = selector(SelectionMode::Linear, (5, 10), (2, 3));
        let (start, end) = backwards.bounds();
        assert_eq!((start.row, start.col), (2, 3));
        assert_eq!((end.row, end.col), (5, 10));
    }

    #[test]
    fn linear_containment() {
        let selector = selector(SelectionMode::Linear, (1, 5), (3, 2));
        assert!(selector.contains(1, 5));
        assert!(selector.contains(1, 70));
        assert!(!selector.contains(1, 4));
        assert!(selector.contains(2, 0));
        assert!(selector.contains(3, 2));
        assert!(!selector.contains(3, 3));
    }

    #[test]
    fn single_row_linear() {
        let selector = selector(SelectionMode::Linear, (2, 4), (2, 8));
        assert!(selector.contains(2, 4));
        assert!(selector.contains(2, 8));
        assert!(!selector.contains(2, 3));
        assert!(!selector.contains(2, 9));
    }

    #[test]
    fn line_containment() {
        let selector = selector(SelectionMode::Line, (1, 5), (2, 0));
        assert!(selector.contains(1, 0));
        assert!(selector.contains(2, 79));
        assert!(!selector.contains(3, 0));
    }

    #[test]
    fn block_containment() {
        let selector = selector(SelectionMode::Block, (1, 10), (4, 4));
        assert!(selector.contains(1, 4));
        assert!(selector.contains(4, 10));
        assert!(!selector.contains(2, 3));
        assert!(!selector.contains(2, 11));
    }
}
