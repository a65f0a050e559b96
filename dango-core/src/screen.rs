//! The screen
//!
//! `Screen` ties the parser, the command builder, and the two screen
//! buffers together: bytes go in through [`Screen::write`], commands are
//! applied to the active buffer, replies and side effects go out through
//! the [`Host`]. It also owns what sits above the buffers: the viewport
//! scroll offset, the window title and its save stack, the terminal
//! identity, and the selection.
//!
//! The screen is single threaded; host callbacks run synchronously on the
//! calling thread, in input order.

use dango_parser::Parser;
use log::trace;
use unicode_segmentation::UnicodeSegmentation;

use crate::buffer::{BufferKind, ScreenBuffer};
use crate::builder::CommandBuilder;
use crate::cell::{Cell, CellAttributes, UnderlineStyle};
use crate::color::{format_color_spec, Color};
use crate::command::{Command, GraphicsRendition, TabClear};
use crate::cursor::Cursor;
use crate::host::{Host, NullHost};
use crate::line::Line;
use crate::modes::{Mode, MouseProtocol, MouseTransport, MouseWheelMode};
use crate::scrollback::DEFAULT_HISTORY_LINE_COUNT;
use crate::selection::{SelectionMode, SelectionPoint, SelectionRange, SelectionState, Selector};
use crate::Dimensions;

/// The VT conformance level reported by DA1/DA2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TerminalId {
    Vt100,
    Vt220,
    Vt320,
    #[default]
    Vt420,
    Vt520,
}

impl TerminalId {
    /// DA1 reply: conformance level plus supported extensions.
    fn device_attributes(self) -> &'static str {
        match self {
            TerminalId::Vt100 => "\x1b[?1;2c",
            TerminalId::Vt220 => "\x1b[?62;1;6;9;15;22c",
            TerminalId::Vt320 => "\x1b[?63;1;6;9;15;22c",
            TerminalId::Vt420 => "\x1b[?64;1;6;9;15;21;22c",
            TerminalId::Vt520 => "\x1b[?65;1;6;9;15;21;22c",
        }
    }

    /// The DA2 model parameter.
    fn model(self) -> u16 {
        match self {
            TerminalId::Vt100 => 0,
            TerminalId::Vt220 => 1,
            TerminalId::Vt320 => 24,
            TerminalId::Vt420 => 41,
            TerminalId::Vt520 => 65,
        }
    }
}

pub struct Screen<H: Host = NullHost> {
    parser: Parser,
    builder: CommandBuilder,
    host: H,
    primary: ScreenBuffer,
    alternate: ScreenBuffer,
    active: BufferKind,
    size: Dimensions,
    max_history: Option<usize>,
    /// Viewport offset in history lines above the live bottom; 0 shows the
    /// live screen.
    scroll_offset: usize,
    window_title: String,
    icon_title: String,
    saved_titles: Vec<String>,
    terminal_id: TerminalId,
    selector: Option<Selector>,
}

impl Screen<NullHost> {
    /// A screen with no host; replies and side effects are dropped.
    pub fn new(size: Dimensions) -> Self {
        Self::with_host(size, NullHost)
    }
}

impl<H: Host> Screen<H> {
    pub fn with_host(size: Dimensions, host: H) -> Self {
        let max_history = Some(DEFAULT_HISTORY_LINE_COUNT);
        Self {
            parser: Parser::new(),
            builder: CommandBuilder::new(),
            host,
            primary: ScreenBuffer::new(BufferKind::Primary, size, max_history),
            alternate: ScreenBuffer::new(BufferKind::Alternate, size, max_history),
            active: BufferKind::Primary,
            size,
            max_history,
            scroll_offset: 0,
            window_title: String::new(),
            icon_title: String::new(),
            saved_titles: Vec::new(),
            terminal_id: TerminalId::default(),
            selector: None,
        }
    }

    // --- accessors --------------------------------------------------------

    pub fn size(&self) -> Dimensions {
        self.size
    }

    pub fn buffer(&self) -> &ScreenBuffer {
        match self.active {
            BufferKind::Primary => &self.primary,
            BufferKind::Alternate => &self.alternate,
        }
    }

    fn buffer_mut(&mut self) -> &mut ScreenBuffer {
        match self.active {
            BufferKind::Primary => &mut self.primary,
            BufferKind::Alternate => &mut self.alternate,
        }
    }

    pub fn buffer_kind(&self) -> BufferKind {
        self.active
    }

    pub fn is_alternate_screen(&self) -> bool {
        self.active == BufferKind::Alternate
    }

    pub fn cursor(&self) -> &Cursor {
        &self.buffer().cursor
    }

    pub fn line(&self, row: usize) -> &Line {
        self.buffer().grid().line(row)
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.buffer().grid().line(row).cell(col)
    }

    pub fn window_title(&self) -> &str {
        &self.window_title
    }

    pub fn icon_title(&self) -> &str {
        &self.icon_title
    }

    pub fn history_line_count(&self) -> usize {
        self.buffer().history().len()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn set_terminal_id(&mut self, id: TerminalId) {
        self.terminal_id = id;
    }

    pub fn set_tab_width(&mut self, width: usize) {
        self.primary.tabs.set_tab_width(width);
        self.alternate.tabs.set_tab_width(width);
    }

    /// Bound the primary scrollback; `None` means unbounded.
    pub fn set_max_history_line_count(&mut self, max: Option<usize>) {
        self.max_history = max;
        self.primary.set_max_history(max);
        self.scroll_offset = self.scroll_offset.min(self.primary.history().len());
    }

    // --- input ------------------------------------------------------------

    /// Feed raw bytes.
    pub fn write(&mut self, bytes: &[u8]) {
        let events = self.parser.parse_collect(bytes);
        let mut commands = Vec::with_capacity(events.len());
        for event in events {
            self.builder.build(event, &mut commands);
        }
        self.host.commands(&commands);
        for command in commands {
            self.apply(command);
        }
    }

    /// Feed text.
    pub fn write_str(&mut self, text: &str) {
        self.write(text.as_bytes());
    }

    /// Apply one command directly, bypassing the parser.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::AppendChar(c) => self.buffer_mut().append_char(c),
            Command::Bell => self.host.bell(),
            Command::Linefeed => {
                self.buffer_mut().linefeed();
                if self.buffer().mode(Mode::AutomaticNewline) {
                    self.buffer_mut().carriage_return();
                }
            }
            Command::Backspace => self.buffer_mut().backspace(),
            Command::FullReset => self.reset_hard(),
            Command::SoftTerminalReset => self.reset_soft(),

            Command::MoveCursorUp(n) => self.buffer_mut().move_up(n as usize),
            Command::MoveCursorDown(n) => self.buffer_mut().move_down(n as usize),
            Command::MoveCursorForward(n) => self.buffer_mut().move_forward(n as usize),
            Command::MoveCursorBackward(n) => self.buffer_mut().move_backward(n as usize),
            Command::MoveCursorTo { row, col } => self.buffer_mut().move_cursor_to(
                usize::from(row).saturating_sub(1),
                usize::from(col).saturating_sub(1),
            ),
            Command::MoveCursorToColumn(col) => self
                .buffer_mut()
                .move_to_column(usize::from(col).saturating_sub(1)),
            Command::MoveCursorToLine(row) => self
                .buffer_mut()
                .move_to_line(usize::from(row).saturating_sub(1)),
            Command::MoveCursorToBeginOfLine => self.buffer_mut().carriage_return(),
            Command::CursorNextLine(n) => {
                let buffer = self.buffer_mut();
                buffer.move_down(n as usize);
                buffer.carriage_return();
            }
            Command::CursorPreviousLine(n) => {
                let buffer = self.buffer_mut();
                buffer.move_up(n as usize);
                buffer.carriage_return();
            }
            Command::MoveCursorToNextTab(n) => self.buffer_mut().tab_forward(n as usize),
            Command::CursorBackwardTab(n) => self.buffer_mut().tab_backward(n as usize),
            Command::SaveCursor => self.buffer_mut().save_cursor(),
            Command::RestoreCursor => self.buffer_mut().restore_cursor(),
            Command::Index => self.buffer_mut().linefeed(),
            Command::ReverseIndex => self.buffer_mut().reverse_index(),
            Command::BackIndex => self.buffer_mut().back_index(),
            Command::ForwardIndex => self.buffer_mut().forward_index(),
            Command::RepeatPreviousCharacter(n) => {
                if let Some(c) = self.buffer().last_char() {
                    for _ in 0..n {
                        self.buffer_mut().append_char(c);
                    }
                }
            }

            Command::InsertCharacters(n) => self.buffer_mut().insert_characters(n as usize),
            Command::DeleteCharacters(n) => self.buffer_mut().delete_characters(n as usize),
            Command::InsertLines(n) => self.buffer_mut().insert_lines(n as usize),
            Command::DeleteLines(n) => self.buffer_mut().delete_lines(n as usize),
            Command::InsertColumns(n) => self.buffer_mut().insert_columns(n as usize),
            Command::DeleteColumns(n) => self.buffer_mut().delete_columns(n as usize),
            Command::EraseCharacters(n) => self.buffer_mut().erase_characters(n as usize),

            Command::ClearToEndOfScreen => self.buffer_mut().clear_to_end_of_screen(),
            Command::ClearToBeginOfScreen => self.buffer_mut().clear_to_begin_of_screen(),
            Command::ClearScreen => self.buffer_mut().clear_screen(),
            Command::ClearScrollbackBuffer => {
                self.buffer_mut().clear_history();
                self.scroll_offset = 0;
            }
            Command::ClearToEndOfLine => self.buffer_mut().clear_to_end_of_line(),
            Command::ClearToBeginOfLine => self.buffer_mut().clear_to_begin_of_line(),
            Command::ClearLine => self.buffer_mut().clear_line(),

            Command::ScrollUp(n) => self.buffer_mut().scroll_up(n as usize),
            Command::ScrollDown(n) => self.buffer_mut().scroll_down(n as usize),
            Command::SetTopBottomMargin { top, bottom } => {
                let top = top.map(|v| usize::from(v).saturating_sub(1));
                let bottom = bottom.map(|v| usize::from(v).saturating_sub(1));
                self.buffer_mut().set_top_bottom_margin(top, bottom);
            }
            Command::SetLeftRightMargin { left, right } => {
                if self.buffer().mode(Mode::LeftRightMargin) {
                    let left = left.map(|v| usize::from(v).saturating_sub(1));
                    let right = right.map(|v| usize::from(v).saturating_sub(1));
                    self.buffer_mut().set_left_right_margin(left, right);
                } else {
                    trace!("DECSLRM ignored while DECLRMM is reset");
                }
            }

            Command::HorizontalTabSet => self.buffer_mut().set_tab_stop(),
            Command::HorizontalTabClear(TabClear::UnderCursor) => {
                self.buffer_mut().clear_tab_stop()
            }
            Command::HorizontalTabClear(TabClear::All) => self.buffer_mut().tabs.clear_all(),

            Command::SetGraphicsRendition(gr) => {
                apply_rendition(&mut self.buffer_mut().cursor.attrs, gr)
            }
            Command::SetForegroundColor(color) => self.buffer_mut().cursor.attrs.fg = color,
            Command::SetBackgroundColor(color) => self.buffer_mut().cursor.attrs.bg = color,
            Command::SetUnderlineColor(color) => {
                self.buffer_mut().cursor.attrs.underline_color = color
            }

            Command::SetMode { mode, enable } => self.set_mode(mode, enable),
            Command::RequestMode { mode } => self.report_mode(mode),
            Command::SendMouseEvents { protocol, enable } => {
                let mode = match protocol {
                    MouseProtocol::X10 => Mode::MouseProtocolX10,
                    MouseProtocol::NormalTracking => Mode::MouseProtocolNormalTracking,
                    MouseProtocol::ButtonTracking => Mode::MouseProtocolButtonTracking,
                    MouseProtocol::AnyEventTracking => Mode::MouseProtocolAnyEventTracking,
                };
                self.buffer_mut().modes.set(mode, enable);
                self.host.set_mouse_protocol(protocol, enable);
            }
            Command::ApplicationKeypadMode(enable) => self.host.set_application_keypad(enable),

            Command::DesignateCharset { slot, charset } => {
                self.buffer_mut().charsets.designate(slot, charset)
            }
            Command::SingleShiftSelect { slot } => self.buffer_mut().charsets.single_shift(slot),
            Command::LockingShift { slot } => {
                if slot == 0 {
                    self.buffer_mut().charsets.shift_in();
                } else {
                    self.buffer_mut().charsets.shift_out();
                }
            }
            Command::SetCursorStyle { display, shape } => {
                let cursor = &mut self.buffer_mut().cursor;
                cursor.display = display;
                cursor.shape = shape;
                self.host.set_cursor_style(display, shape);
            }

            Command::DeviceStatusReport => self.host.reply("\x1b[0n"),
            Command::ReportCursorPosition => {
                let (row, col) = self.buffer().reported_cursor();
                self.host.reply(&format!("\x1b[{};{}R", row + 1, col + 1));
            }
            Command::ReportExtendedCursorPosition => {
                let (row, col) = self.buffer().reported_cursor();
                self.host.reply(&format!("\x1b[?{};{}R", row + 1, col + 1));
            }
            Command::SendDeviceAttributes => {
                self.host.reply(self.terminal_id.device_attributes())
            }
            Command::SendTerminalId => {
                let model = self.terminal_id.model();
                self.host.reply(&format!("\x1b[>{model};0;0c"));
            }
            Command::RequestTabStops => {
                let cols = self.buffer().cols();
                let stops: Vec<String> = self
                    .buffer()
                    .tabs
                    .stops(cols)
                    .into_iter()
                    .map(|stop| (stop + 1).to_string())
                    .collect();
                self.host
                    .reply(&format!("\x1bP2$u{}\x1b\\", stops.join("/")));
            }
            Command::ReportTextAreaSize => {
                let reply = format!("\x1b[8;{};{}t", self.size.rows, self.size.cols);
                self.host.reply(&reply);
            }

            Command::ChangeWindowTitle(title) => {
                self.host.set_window_title(&title);
                self.window_title = title;
            }
            Command::ChangeIconTitle(title) => self.icon_title = title,
            Command::SaveWindowTitle => self.saved_titles.push(self.window_title.clone()),
            Command::RestoreWindowTitle => {
                if let Some(title) = self.saved_titles.pop() {
                    self.host.set_window_title(&title);
                    self.window_title = title;
                }
            }
            Command::ResizeWindow {
                width,
                height,
                unit,
            } => self.host.resize_window(width, height, unit),

            Command::ScreenAlignmentPattern => self.buffer_mut().screen_alignment_pattern(),
            Command::SetMark => self.buffer_mut().set_mark(),
            Command::Notify { title, content } => self.host.notify(&title, &content),
            Command::Hyperlink { id, uri } => {
                if uri.is_empty() {
                    self.buffer_mut().cursor.hyperlink = 0;
                } else {
                    let buffer = self.buffer_mut();
                    let handle = buffer.hyperlinks.register(&id, &uri);
                    buffer.cursor.hyperlink = handle;
                }
            }

            Command::SetColorPalette { index, color } => {
                self.host.set_color_palette(index, color)
            }
            Command::RequestColorPalette(index) => {
                if let Some(rgb) = self.host.request_color_palette(index) {
                    let reply = format!("\x1b]4;{};{}\x1b\\", index, format_color_spec(rgb));
                    self.host.reply(&reply);
                }
            }
            Command::ResetColorPalette(index) => self.host.reset_color_palette(index),
            Command::SetDynamicColor { name, color } => {
                self.host.set_dynamic_color(name, color)
            }
            Command::RequestDynamicColor(name) => {
                if let Some(rgb) = self.host.request_dynamic_color(name) {
                    let reply =
                        format!("\x1b]{};{}\x1b\\", name.code(), format_color_spec(rgb));
                    self.host.reply(&reply);
                }
            }
            Command::ResetDynamicColor(name) => self.host.reset_dynamic_color(name),
        }
    }

    // --- modes ------------------------------------------------------------

    fn set_mode(&mut self, mode: Mode, enable: bool) {
        match mode {
            // ?1048 acts, it is not a stored flag.
            Mode::SaveCursor => {
                if enable {
                    self.buffer_mut().save_cursor();
                } else {
                    self.buffer_mut().restore_cursor();
                }
                return;
            }
            Mode::UseAlternateScreen => {
                self.select_buffer(if enable {
                    BufferKind::Alternate
                } else {
                    BufferKind::Primary
                });
                return;
            }
            Mode::UseAlternateScreenClear => {
                if enable {
                    self.select_buffer(BufferKind::Alternate);
                    self.alternate.clear_screen();
                } else {
                    self.select_buffer(BufferKind::Primary);
                }
                return;
            }
            Mode::UseAlternateScreenSaveCursor => {
                if enable {
                    self.primary.save_cursor();
                    self.select_buffer(BufferKind::Alternate);
                    self.alternate.clear_screen();
                    self.alternate.cursor.row = 0;
                    self.alternate.cursor.col = 0;
                    self.alternate.cursor.pending_wrap = false;
                } else {
                    self.select_buffer(BufferKind::Primary);
                    self.primary.restore_cursor();
                }
                return;
            }
            _ => {}
        }

        self.buffer_mut().modes.set(mode, enable);

        match mode {
            Mode::Origin => self.buffer_mut().move_cursor_to(0, 0),
            // Resetting DECLRMM also resets the horizontal margins.
            Mode::LeftRightMargin => {
                if !enable {
                    self.buffer_mut().reset_horizontal_margin();
                }
            }
            Mode::Column132 => {
                let buffer = self.buffer_mut();
                buffer.reset_margin();
                buffer.clear_screen();
                buffer.cursor.row = 0;
                buffer.cursor.col = 0;
                buffer.cursor.pending_wrap = false;
            }
            Mode::DesignateCharsetUsAscii => {
                if enable {
                    self.buffer_mut().charsets.reset();
                }
            }
            Mode::ApplicationCursorKeys => self.host.set_application_cursor_keys(enable),
            Mode::BracketedPaste => self.host.set_bracketed_paste(enable),
            Mode::FocusTracking => self.host.set_focus_events(enable),
            Mode::MouseExtended => self.host.set_mouse_transport(if enable {
                MouseTransport::Extended
            } else {
                MouseTransport::Default
            }),
            Mode::MouseSgr => self.host.set_mouse_transport(if enable {
                MouseTransport::Sgr
            } else {
                MouseTransport::Default
            }),
            Mode::MouseUrxvt => self.host.set_mouse_transport(if enable {
                MouseTransport::Urxvt
            } else {
                MouseTransport::Default
            }),
            Mode::MouseAlternateScroll => self.host.set_mouse_wheel_mode(if enable {
                MouseWheelMode::AlternateScroll
            } else {
                MouseWheelMode::Default
            }),
            _ => {}
        }
    }

    fn report_mode(&mut self, mode: Mode) {
        let enabled = match mode {
            Mode::UseAlternateScreen
            | Mode::UseAlternateScreenClear
            | Mode::UseAlternateScreenSaveCursor => self.active == BufferKind::Alternate,
            Mode::SaveCursor => false,
            _ => self.buffer().modes.enabled(mode),
        };
        let (private, number) = mode.number();
        let prefix = if private { "?" } else { "" };
        let value = if enabled { 1 } else { 2 };
        self.host.reply(&format!("\x1b[{prefix}{number};{value}$y"));
    }

    fn select_buffer(&mut self, kind: BufferKind) {
        if self.active != kind {
            self.active = kind;
            self.scroll_offset = 0;
            self.host.buffer_changed(kind);
        }
    }

    // --- rendering --------------------------------------------------------

    /// Walk the visible cells in row-major order: exactly `rows x cols`
    /// callback invocations, reading `scroll_offset` lines back into
    /// history.
    pub fn render<F>(&self, mut cb: F, scroll_offset: usize)
    where
        F: FnMut(usize, usize, &Cell),
    {
        let buffer = self.buffer();
        let history = buffer.history().len();
        let offset = scroll_offset.min(history);
        let blank = Cell::new();
        for row in 0..self.size.rows {
            let line = buffer.absolute_line(history - offset + row);
            for col in 0..self.size.cols {
                let cell = line.and_then(|line| line.get(col)).unwrap_or(&blank);
                cb(row, col, cell);
            }
        }
    }

    /// One visible grid row as text, space filled, full width.
    pub fn render_text_line(&self, row: usize) -> String {
        line_text(self.buffer().grid().line(row))
    }

    /// The visible grid as text, one `\n`-terminated line per row.
    pub fn render_text(&self) -> String {
        let mut text = String::with_capacity(self.size.rows * (self.size.cols + 1));
        for row in 0..self.size.rows {
            text.push_str(&self.render_text_line(row));
            text.push('\n');
        }
        text
    }

    /// The n-th history line as text, 1-based from the newest.
    pub fn render_history_text_line(&self, n: usize) -> Option<String> {
        if n == 0 {
            return None;
        }
        self.buffer()
            .history()
            .get_from_end(n - 1)
            .map(line_text)
    }

    /// A VT byte sequence that reproduces the visible state (text, colors,
    /// attributes, title, cursor) on a fresh screen of the same size.
    pub fn screenshot(&self) -> String {
        let buffer = self.buffer();
        let mut out = String::new();
        out.push_str("\x1b[?25l\x1b[0m");
        let mut last_attrs = CellAttributes::default();
        for row in 0..self.size.rows {
            out.push_str(&format!("\x1b[{};1H", row + 1));
            let line = buffer.grid().line(row);
            for col in 0..self.size.cols {
                let cell = line.cell(col);
                if cell.is_continuation() {
                    continue;
                }
                if cell.attrs != last_attrs {
                    out.push_str(&sgr_sequence(&cell.attrs));
                    last_attrs = cell.attrs;
                }
                if cell.content().is_empty() {
                    out.push(' ');
                } else {
                    out.push_str(cell.content());
                }
            }
        }
        out.push_str("\x1b[0m");
        if !self.window_title.is_empty() {
            out.push_str(&format!("\x1b]2;{}\x1b\\", self.window_title));
        }
        let cursor = &buffer.cursor;
        out.push_str(&format!("\x1b[{};{}H", cursor.row + 1, cursor.col + 1));
        if buffer.mode(Mode::VisibleCursor) {
            out.push_str("\x1b[?25h");
        }
        out
    }

    // --- viewport ---------------------------------------------------------

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Scroll the viewport up into history; true if it moved.
    pub fn viewport_scroll_up(&mut self, n: usize) -> bool {
        let max = self.buffer().history().len();
        let next = (self.scroll_offset + n).min(max);
        let moved = next != self.scroll_offset;
        self.scroll_offset = next;
        moved
    }

    /// Scroll the viewport back toward the live screen; true if it moved.
    pub fn viewport_scroll_down(&mut self, n: usize) -> bool {
        let next = self.scroll_offset.saturating_sub(n);
        let moved = next != self.scroll_offset;
        self.scroll_offset = next;
        moved
    }

    pub fn scroll_to_top(&mut self) -> bool {
        let max = self.buffer().history().len();
        let moved = self.scroll_offset != max;
        self.scroll_offset = max;
        moved
    }

    pub fn scroll_to_bottom(&mut self) -> bool {
        let moved = self.scroll_offset != 0;
        self.scroll_offset = 0;
        moved
    }

    /// Jump the viewport to the previous mark; true if one was found.
    pub fn scroll_mark_up(&mut self) -> bool {
        match self.buffer().find_prev_marker(self.scroll_offset) {
            Some(offset) => {
                self.scroll_offset = offset;
                true
            }
            None => false,
        }
    }

    /// Jump the viewport to the next mark (or the bottom); true if it moved.
    pub fn scroll_mark_down(&mut self) -> bool {
        match self.buffer().find_next_marker(self.scroll_offset) {
            Some(offset) => {
                self.scroll_offset = offset;
                true
            }
            None => false,
        }
    }

    // --- selection --------------------------------------------------------

    pub fn set_selector(&mut self, selector: Selector) {
        self.selector = Some(selector);
    }

    pub fn selector(&self) -> Option<&Selector> {
        self.selector.as_ref()
    }

    pub fn selector_mut(&mut self) -> Option<&mut Selector> {
        self.selector.as_mut()
    }

    pub fn clear_selection(&mut self) {
        self.selector = None;
    }

    /// The selected cell runs in absolute coordinates, ordered top to
    /// bottom. Word mode expands the end points to unicode word boundaries.
    pub fn selection(&self) -> Vec<SelectionRange> {
        let Some(selector) = &self.selector else {
            return Vec::new();
        };
        if selector.state() == SelectionState::Waiting {
            return Vec::new();
        }
        let buffer = self.buffer();
        let total = buffer.total_lines();
        let cols = buffer.cols();
        let (mut start, mut end) = selector.bounds();
        start.row = start.row.min(total - 1);
        end.row = end.row.min(total - 1);
        start.col = start.col.min(cols - 1);
        end.col = end.col.min(cols - 1);

        match selector.mode() {
            SelectionMode::Line => (start.row..=end.row)
                .map(|row| SelectionRange {
                    row,
                    start_col: 0,
                    length: cols,
                })
                .collect(),
            SelectionMode::Block => {
                let (left, right) = if start.col <= end.col {
                    (start.col, end.col)
                } else {
                    (end.col, start.col)
                };
                (start.row..=end.row)
                    .map(|row| SelectionRange {
                        row,
                        start_col: left,
                        length: right - left + 1,
                    })
                    .collect()
            }
            SelectionMode::Linear | SelectionMode::Word => {
                if selector.mode() == SelectionMode::Word {
                    start.col = self.word_boundary(start, false);
                    end.col = self.word_boundary(end, true);
                }
                if start.row == end.row {
                    return vec![SelectionRange {
                        row: start.row,
                        start_col: start.col,
                        length: end.col - start.col + 1,
                    }];
                }
                let mut ranges = Vec::with_capacity(end.row - start.row + 1);
                ranges.push(SelectionRange {
                    row: start.row,
                    start_col: start.col,
                    length: cols - start.col,
                });
                for row in start.row + 1..end.row {
                    ranges.push(SelectionRange {
                        row,
                        start_col: 0,
                        length: cols,
                    });
                }
                ranges.push(SelectionRange {
                    row: end.row,
                    start_col: 0,
                    length: end.col + 1,
                });
                ranges
            }
        }
    }

    /// Invoke the callback for every selected cell, in absolute
    /// coordinates.
    pub fn render_selection<F>(&self, mut cb: F)
    where
        F: FnMut(usize, usize, &Cell),
    {
        let buffer = self.buffer();
        for range in self.selection() {
            let Some(line) = buffer.absolute_line(range.row) else {
                continue;
            };
            for col in range.start_col..range.start_col + range.length {
                if let Some(cell) = line.get(col) {
                    cb(range.row, col, cell);
                }
            }
        }
    }

    /// The selected text, lines joined with `\n`.
    pub fn selection_text(&self) -> String {
        let buffer = self.buffer();
        let mut parts: Vec<String> = Vec::new();
        let mut last_row = None;
        for range in self.selection() {
            let Some(line) = buffer.absolute_line(range.row) else {
                continue;
            };
            let mut run = String::new();
            for col in range.start_col..range.start_col + range.length {
                if let Some(cell) = line.get(col) {
                    if cell.is_continuation() {
                        continue;
                    }
                    if cell.content().is_empty() {
                        run.push(' ');
                    } else {
                        run.push_str(cell.content());
                    }
                }
            }
            if last_row == Some(range.row) {
                if let Some(tail) = parts.last_mut() {
                    tail.push_str(&run);
                }
            } else {
                parts.push(run.trim_end().to_string());
            }
            last_row = Some(range.row);
        }
        parts.join("\n")
    }

    /// Expand along unicode word boundaries on the line under `point`.
    fn word_boundary(&self, point: SelectionPoint, forward: bool) -> usize {
        let Some(line) = self.buffer().absolute_line(point.row) else {
            return point.col;
        };
        let cells: Vec<(usize, char)> = line
            .iter()
            .enumerate()
            .filter(|(_, cell)| !cell.is_continuation())
            .map(|(col, cell)| (col, cell.display_char()))
            .collect();
        if cells.is_empty() {
            return point.col;
        }
        let text: String = cells.iter().map(|&(_, c)| c).collect();
        let target = cells
            .iter()
            .rposition(|&(col, _)| col <= point.col)
            .unwrap_or(0);

        let mut index = 0;
        for word in text.split_word_bounds() {
            let len = word.chars().count();
            if target < index + len {
                return if forward {
                    cells[index + len - 1].0
                } else {
                    cells[index].0
                };
            }
            index += len;
        }
        point.col
    }

    // --- lifecycle --------------------------------------------------------

    /// Resize both buffers; margins reset and cursors clamp per buffer.
    pub fn resize(&mut self, size: Dimensions) {
        if size.cols == 0 || size.rows == 0 || size == self.size {
            return;
        }
        self.primary.resize(size);
        self.alternate.resize(size);
        self.size = size;
        self.scroll_offset = self.scroll_offset.min(self.buffer().history().len());
    }

    /// DECSTR: rendition, margins, charsets, and mode defaults on the
    /// active buffer; content and history survive.
    pub fn reset_soft(&mut self) {
        self.buffer_mut().reset_soft();
    }

    /// RIS: everything goes, including scrollback, titles, and selection.
    pub fn reset_hard(&mut self) {
        self.primary = ScreenBuffer::new(BufferKind::Primary, self.size, self.max_history);
        self.alternate = ScreenBuffer::new(BufferKind::Alternate, self.size, self.max_history);
        if self.active != BufferKind::Primary {
            self.active = BufferKind::Primary;
            self.host.buffer_changed(BufferKind::Primary);
        }
        self.scroll_offset = 0;
        self.window_title.clear();
        self.icon_title.clear();
        self.saved_titles.clear();
        self.selector = None;
        self.parser.reset();
    }
}

/// One attribute change from the expanded SGR stream.
fn apply_rendition(attrs: &mut CellAttributes, gr: GraphicsRendition) {
    use GraphicsRendition as Gr;
    match gr {
        Gr::Reset => attrs.reset(),
        Gr::Bold => attrs.bold = true,
        Gr::Faint => attrs.faint = true,
        Gr::Italic => attrs.italic = true,
        Gr::Underline => {
            attrs.underline = true;
            attrs.underline_style = UnderlineStyle::Single;
        }
        Gr::DoublyUnderlined => {
            attrs.underline = true;
            attrs.underline_style = UnderlineStyle::Double;
        }
        Gr::CurlyUnderlined => {
            attrs.underline = true;
            attrs.underline_style = UnderlineStyle::Curly;
        }
        Gr::DottedUnderlined => {
            attrs.underline = true;
            attrs.underline_style = UnderlineStyle::Dotted;
        }
        Gr::DashedUnderlined => {
            attrs.underline = true;
            attrs.underline_style = UnderlineStyle::Dashed;
        }
        Gr::Blinking => attrs.blink = true,
        Gr::Inverse => attrs.inverse = true,
        Gr::Hidden => attrs.hidden = true,
        Gr::CrossedOut => attrs.crossed_out = true,
        Gr::Normal => {
            attrs.bold = false;
            attrs.faint = false;
        }
        Gr::NoItalic => attrs.italic = false,
        Gr::NoUnderline => {
            attrs.underline = false;
            attrs.underline_style = UnderlineStyle::Single;
        }
        Gr::NoBlinking => attrs.blink = false,
        Gr::NoInverse => attrs.inverse = false,
        Gr::NoHidden => attrs.hidden = false,
        Gr::NoCrossedOut => attrs.crossed_out = false,
    }
}

/// The SGR sequence that reproduces `attrs` from any prior state.
fn sgr_sequence(attrs: &CellAttributes) -> String {
    use std::fmt::Write;

    let mut seq = String::from("\x1b[0");
    if attrs.bold {
        seq.push_str(";1");
    }
    if attrs.faint {
        seq.push_str(";2");
    }
    if attrs.italic {
        seq.push_str(";3");
    }
    if attrs.underline {
        match attrs.underline_style {
            UnderlineStyle::Single => seq.push_str(";4"),
            UnderlineStyle::Double => seq.push_str(";4:2"),
            UnderlineStyle::Curly => seq.push_str(";4:3"),
            UnderlineStyle::Dotted => seq.push_str(";4:4"),
            UnderlineStyle::Dashed => seq.push_str(";4:5"),
        }
    }
    if attrs.blink {
        seq.push_str(";5");
    }
    if attrs.inverse {
        seq.push_str(";7");
    }
    if attrs.hidden {
        seq.push_str(";8");
    }
    if attrs.crossed_out {
        seq.push_str(";9");
    }
    match attrs.fg {
        Color::Default => {}
        Color::Indexed(n) if n < 8 => {
            let _ = write!(seq, ";3{n}");
        }
        Color::Indexed(n) => {
            let _ = write!(seq, ";38;5;{n}");
        }
        Color::Bright(n) => {
            let _ = write!(seq, ";9{}", n.min(7));
        }
        Color::Rgb(rgb) => {
            let _ = write!(seq, ";38;2;{};{};{}", rgb.r, rgb.g, rgb.b);
        }
    }
    match attrs.bg {
        Color::Default => {}
        Color::Indexed(n) if n < 8 => {
            let _ = write!(seq, ";4{n}");
        }
        Color::Indexed(n) => {
            let _ = write!(seq, ";48;5;{n}");
        }
        Color::Bright(n) => {
            let _ = write!(seq, ";10{}", n.min(7));
        }
        Color::Rgb(rgb) => {
            let _ = write!(seq, ";48;2;{};{};{}", rgb.r, rgb.g, rgb.b);
        }
    }
    match attrs.underline_color {
        Color::Default => {}
        Color::Indexed(n) => {
            let _ = write!(seq, ";58;5;{n}");
        }
        Color::Bright(n) => {
            let _ = write!(seq, ";58;5;{}", n.min(7) + 8);
        }
        Color::Rgb(rgb) => {
            let _ = write!(seq, ";58;2;{};{};{}", rgb.r, rgb.g, rgb.b);
        }
    }
    seq.push('m');
    seq
}

/// Full-width text of one line: continuation halves contribute nothing,
/// blank cells a space.
fn line_text(line: &Line) -> String {
    let mut text = String::new();
    for cell in line.iter() {
        if cell.is_continuation() {
            continue;
        }
        if cell.content().is_empty() {
            text.push(' ');
        } else {
            text.push_str(cell.content());
        }
    }
    text
}
