//! Scroll margins
//!
//! The active region of the screen. Vertical margins come from DECSTBM,
//! horizontal margins from DECSLRM (effective only while DECLRMM is set).
//! All bounds are 0-based and inclusive.

use serde::{Deserialize, Serialize};

use crate::Dimensions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margin {
    pub top: usize,
    pub bottom: usize,
    pub left: usize,
    pub right: usize,
}

impl Margin {
    /// The margin covering the whole screen.
    pub fn full(dims: Dimensions) -> Self {
        Self {
            top: 0,
            bottom: dims.rows.saturating_sub(1),
            left: 0,
            right: dims.cols.saturating_sub(1),
        }
    }

    pub fn height(&self) -> usize {
        self.bottom - self.top + 1
    }

    pub fn width(&self) -> usize {
        self.right - self.left + 1
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.contains_row(row) && self.contains_col(col)
    }

    pub fn contains_row(&self, row: usize) -> bool {
        (self.top..=self.bottom).contains(&row)
    }

    pub fn contains_col(&self, col: usize) -> bool {
        (self.left..=self.right).contains(&col)
    }

    pub fn is_full_width(&self, cols: usize) -> bool {
        self.left == 0 && self.right + 1 == cols
    }
}
