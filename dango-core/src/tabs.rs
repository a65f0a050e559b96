//! Tab stops
//!
//! A default comb every `tab_width` columns until the first explicit
//! change (HTS or TBC) materializes the stop list. Queries are bounded by
//! the caller's right margin.

use serde::{Deserialize, Serialize};

/// Default distance between tab stops.
pub const DEFAULT_TAB_WIDTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabStops {
    /// Explicit 0-based stop columns, sorted; empty means the default comb
    /// is in effect.
    stops: Vec<usize>,
    /// Comb spacing; 0 after TBC 3 (no default stops remain).
    tab_width: usize,
}

impl TabStops {
    pub fn new() -> Self {
        Self {
            stops: Vec::new(),
            tab_width: DEFAULT_TAB_WIDTH,
        }
    }

    pub fn tab_width(&self) -> usize {
        self.tab_width
    }

    pub fn set_tab_width(&mut self, width: usize) {
        self.tab_width = width;
        self.stops.clear();
    }

    fn materialize(&mut self, cols: usize) {
        if self.stops.is_empty() && self.tab_width > 0 {
            self.stops = (self.tab_width..cols).step_by(self.tab_width).collect();
        }
    }

    /// HTS: add a stop at `col`.
    pub fn set(&mut self, col: usize, cols: usize) {
        self.materialize(cols);
        if let Err(index) = self.stops.binary_search(&col) {
            self.stops.insert(index, col);
        }
    }

    /// TBC 0: remove the stop at `col`.
    pub fn clear_at(&mut self, col: usize, cols: usize) {
        self.materialize(cols);
        if let Ok(index) = self.stops.binary_search(&col) {
            self.stops.remove(index);
        }
    }

    /// TBC 3: remove every stop, including the default comb.
    pub fn clear_all(&mut self) {
        self.stops.clear();
        self.tab_width = 0;
    }

    /// The next stop strictly right of `col` and strictly below `cols`.
    pub fn next_stop(&self, col: usize, cols: usize) -> Option<usize> {
        if self.stops.is_empty() {
            if self.tab_width == 0 {
                return None;
            }
            let next = (col / self.tab_width + 1) * self.tab_width;
            return (next < cols).then_some(next);
        }
        self.stops
            .iter()
            .copied()
            .find(|&stop| stop > col && stop < cols)
    }

    /// The previous stop strictly left of `col`.
    pub fn prev_stop(&self, col: usize) -> Option<usize> {
        if self.stops.is_empty() {
            if self.tab_width == 0 || col == 0 {
                return None;
            }
            let prev = (col - 1) / self.tab_width * self.tab_width;
            return (prev > 0).then_some(prev);
        }
        self.stops.iter().rev().copied().find(|&stop| stop < col)
    }

    /// All effective stops below `cols`, for the DECTABSR report.
    pub fn stops(&self, cols: usize) -> Vec<usize> {
        if self.stops.is_empty() {
            if self.tab_width == 0 {
                return Vec::new();
            }
            return (self.tab_width..cols).step_by(self.tab_width).collect();
        }
        self.stops
            .iter()
            .copied()
            .filter(|&stop| stop < cols)
            .collect()
    }

    /// Drop explicit stops that no longer fit after a column shrink.
    pub fn resize(&mut self, cols: usize) {
        self.stops.retain(|&stop| stop < cols);
    }
}

impl Default for TabStops {
    fn default() -> Self {
        Self::new()
    }
}
