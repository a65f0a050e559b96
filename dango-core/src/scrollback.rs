//! Scrollback history
//!
//! Lines that scroll off the top of the primary buffer, kept in a bounded
//! deque. When the cap is exceeded the oldest lines are dropped; `None`
//! means unbounded.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::cell::CellAttributes;
use crate::line::Line;

/// Default history bound.
pub const DEFAULT_HISTORY_LINE_COUNT: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scrollback {
    lines: VecDeque<Line>,
    max_lines: Option<usize>,
}

impl Scrollback {
    pub fn new(max_lines: Option<usize>) -> Self {
        Self {
            lines: VecDeque::new(),
            max_lines,
        }
    }

    pub fn max_lines(&self) -> Option<usize> {
        self.max_lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn push(&mut self, line: Line) {
        if self.max_lines == Some(0) {
            return;
        }
        self.lines.push_back(line);
        self.clamp();
    }

    pub fn push_lines(&mut self, lines: Vec<Line>) {
        for line in lines {
            self.push(line);
        }
    }

    /// Line by age: 0 is the oldest.
    pub fn get(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    /// Line by recency: 0 is the newest.
    pub fn get_from_end(&self, index: usize) -> Option<&Line> {
        let len = self.lines.len();
        if index >= len {
            return None;
        }
        self.lines.get(len - 1 - index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Change the bound, evicting the oldest lines if necessary.
    pub fn set_max_lines(&mut self, max_lines: Option<usize>) {
        self.max_lines = max_lines;
        self.clamp();
    }

    /// Bring history lines to the new column count after a resize, so the
    /// render walk always sees full-width lines.
    pub fn resize_columns(&mut self, cols: usize, attrs: CellAttributes) {
        for line in &mut self.lines {
            line.resize(cols, attrs);
        }
    }

    fn clamp(&mut self) {
        if let Some(max) = self.max_lines {
            while self.lines.len() > max {
                self.lines.pop_front();
            }
        }
    }
}

impl Default for Scrollback {
    fn default() -> Self {
        Self::new(Some(DEFAULT_HISTORY_LINE_COUNT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_with(text: &str) -> Line {
        let mut line = Line::new(text.len().max(8));
        for (i, c) in text.chars().enumerate() {
            line.cell_mut(i).set_char(c);
        }
        line
    }

    #[test]
    fn push_and_index() {
        let mut history = Scrollback::new(Some(100));
        history.push(line_with("one"));
        history.push(line_with("two"));
        assert_eq!(history.len(), 2);
        assert_eq!(history.get(0).unwrap().text(), "one");
        assert_eq!(history.get_from_end(0).unwrap().text(), "two");
        assert_eq!(history.get_from_end(1).unwrap().text(), "one");
        assert!(history.get(5).is_none());
    }

    #[test]
    fn bounded_eviction() {
        let mut history = Scrollback::new(Some(3));
        for text in ["a", "b", "c", "d"] {
            history.push(line_with(text));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.get(0).unwrap().text(), "b");
        assert_eq!(history.get(2).unwrap().text(), "d");
    }

    #[test]
    fn zero_cap_keeps_nothing() {
        let mut history = Scrollback::new(Some(0));
        history.push(line_with("gone"));
        assert!(history.is_empty());
    }

    #[test]
    fn unbounded_history() {
        let mut history = Scrollback::new(None);
        for i in 0..100 {
            history.push(line_with(&format!("line{i}")));
        }
        assert_eq!(history.len(), 100);
    }

    #[test]
    fn shrinking_cap_evicts_oldest() {
        let mut history = Scrollback::new(None);
        for i in 0..10 {
            history.push(line_with(&format!("line{i}")));
        }
        history.set_max_lines(Some(4));
        assert_eq!(history.len(), 4);
        assert_eq!(history.get(0).unwrap().text(), "line6");
    }

    #[test]
    fn resize_columns() {
        let mut history = Scrollback::new(None);
        history.push(line_with("wide"));
        history.resize_columns(2, CellAttributes::default());
        assert_eq!(history.get(0).unwrap().cols(), 2);
    }
}
