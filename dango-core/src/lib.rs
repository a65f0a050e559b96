//! dango-core — terminal screen model
//!
//! The platform-independent core of a terminal emulator: it consumes the
//! byte stream through `dango-parser`, turns parse events into a closed
//! [`Command`] set, and applies them to a pair of screen buffers (primary
//! and alternate) with scrollback, margins, tabs, modes, hyperlinks,
//! selection, and a capability [`Host`] for everything the embedder owns
//! (replies, bell, title, mouse and color callbacks).
//!
//! The core is deterministic and infallible: the same bytes always produce
//! the same state, malformed input is substituted or dropped, and no
//! operation returns an error. Rendering is callback-driven; the screen
//! never touches fonts or pixels.

mod buffer;
mod builder;
mod cell;
mod charset;
mod color;
mod command;
mod cursor;
mod grid;
mod host;
mod hyperlink;
mod line;
mod margin;
mod modes;
mod screen;
mod scrollback;
mod selection;
mod tabs;

pub use buffer::{BufferKind, ScreenBuffer};
pub use builder::CommandBuilder;
pub use cell::{Cell, CellAttributes, UnderlineStyle};
pub use charset::{Charset, CharsetTable};
pub use color::{format_color_spec, palette_rgb, parse_color_spec, Color, Rgb};
pub use command::{
    Command, DynamicColorName, GraphicsRendition, ResizeUnit, TabClear,
};
pub use cursor::{Cursor, CursorDisplay, CursorShape, SavedCursor};
pub use grid::Grid;
pub use host::{Host, NullHost};
pub use hyperlink::{Hyperlink, HyperlinkStore};
pub use line::Line;
pub use margin::Margin;
pub use modes::{Mode, Modes, MouseProtocol, MouseTransport, MouseWheelMode};
pub use screen::{Screen, TerminalId};
pub use scrollback::{Scrollback, DEFAULT_HISTORY_LINE_COUNT};
pub use selection::{
    SelectionMode, SelectionPoint, SelectionRange, SelectionState, Selector,
};
pub use tabs::{TabStops, DEFAULT_TAB_WIDTH};

/// Screen dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub cols: usize,
    pub rows: usize,
}

impl Dimensions {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self { cols, rows }
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self { cols: 80, rows: 24 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_dimensions() {
        let dims = Dimensions::default();
        assert_eq!(dims.cols, 80);
        assert_eq!(dims.rows, 24);
    }
}
