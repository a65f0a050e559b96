//! Command builder
//!
//! Maps parse events onto [`Command`] values following the xterm ctlseqs
//! dispatch tables: the C0 table, the two-character ESC table, CSI keyed on
//! (marker, intermediates, final byte), and OSC keyed on the numeric
//! selector. Unknown or malformed sequences are logged at trace level and
//! dropped; the builder never fails.

use dango_parser::{CsiEvent, EscEvent, Event, OscEvent, Params};
use log::trace;

use crate::charset::Charset;
use crate::color::{parse_color_spec, Color};
use crate::command::{Command, DynamicColorName, GraphicsRendition, ResizeUnit, TabClear};
use crate::cursor::{CursorDisplay, CursorShape};
use crate::modes::{Mode, MouseProtocol};

#[derive(Debug, Clone, Copy, Default)]
pub struct CommandBuilder;

impl CommandBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Translate one event, appending the resulting commands.
    pub fn build(&self, event: Event, out: &mut Vec<Command>) {
        match event {
            Event::Print(c) => out.push(Command::AppendChar(c)),
            Event::Control(byte) => self.control(byte, out),
            Event::Esc(esc) => self.esc(esc, out),
            Event::Csi(csi) => self.csi(csi, out),
            Event::Osc(osc) => self.osc(osc, out),
            Event::Dcs(dcs) => {
                trace!(
                    "ignoring DCS final {:?} with {} payload bytes",
                    dcs.final_byte as char,
                    dcs.data.len()
                );
            }
            Event::String(kind, data) => {
                trace!("ignoring {kind:?} string of {} bytes", data.len());
            }
        }
    }

    fn control(&self, byte: u8, out: &mut Vec<Command>) {
        match byte {
            0x07 => out.push(Command::Bell),
            0x08 => out.push(Command::Backspace),
            0x09 => out.push(Command::MoveCursorToNextTab(1)),
            0x0A | 0x0B | 0x0C => out.push(Command::Linefeed),
            0x0D => out.push(Command::MoveCursorToBeginOfLine),
            0x0E => out.push(Command::LockingShift { slot: 1 }),
            0x0F => out.push(Command::LockingShift { slot: 0 }),
            _ => trace!("ignoring control byte {byte:#04x}"),
        }
    }

    fn esc(&self, esc: EscEvent, out: &mut Vec<Command>) {
        match (esc.intermediates.as_slice(), esc.final_byte) {
            ([], b'7') => out.push(Command::SaveCursor),
            ([], b'8') => out.push(Command::RestoreCursor),
            ([], b'D') => out.push(Command::Index),
            ([], b'E') => {
                // NEL is IND plus CR.
                out.push(Command::Index);
                out.push(Command::MoveCursorToBeginOfLine);
            }
            ([], b'M') => out.push(Command::ReverseIndex),
            ([], b'6') => out.push(Command::BackIndex),
            ([], b'9') => out.push(Command::ForwardIndex),
            ([], b'H') => out.push(Command::HorizontalTabSet),
            ([], b'c') => out.push(Command::FullReset),
            ([], b'=') => out.push(Command::ApplicationKeypadMode(true)),
            ([], b'>') => out.push(Command::ApplicationKeypadMode(false)),
            ([], b'N') => out.push(Command::SingleShiftSelect { slot: 2 }),
            ([], b'O') => out.push(Command::SingleShiftSelect { slot: 3 }),
            ([b'#'], b'8') => out.push(Command::ScreenAlignmentPattern),
            ([b'('], designator) => out.push(Command::DesignateCharset {
                slot: 0,
                charset: Charset::from_designator(designator),
            }),
            ([b')'], designator) => out.push(Command::DesignateCharset {
                slot: 1,
                charset: Charset::from_designator(designator),
            }),
            ([b'*'], designator) => out.push(Command::DesignateCharset {
                slot: 2,
                charset: Charset::from_designator(designator),
            }),
            ([b'+'], designator) => out.push(Command::DesignateCharset {
                slot: 3,
                charset: Charset::from_designator(designator),
            }),
            (intermediates, final_byte) => {
                trace!(
                    "ignoring ESC {:?} {:?}",
                    intermediates,
                    final_byte as char
                );
            }
        }
    }

    fn csi(&self, csi: CsiEvent, out: &mut Vec<Command>) {
        match (csi.marker, csi.intermediates.as_slice(), csi.final_byte) {
            // Cursor motion
            (0, [], b'A') => out.push(Command::MoveCursorUp(csi.count(0))),
            (0, [], b'B' | b'e') => out.push(Command::MoveCursorDown(csi.count(0))),
            (0, [], b'C' | b'a') => out.push(Command::MoveCursorForward(csi.count(0))),
            (0, [], b'D') => out.push(Command::MoveCursorBackward(csi.count(0))),
            (0, [], b'E') => out.push(Command::CursorNextLine(csi.count(0))),
            (0, [], b'F') => out.push(Command::CursorPreviousLine(csi.count(0))),
            (0, [], b'G' | b'`') => out.push(Command::MoveCursorToColumn(csi.count(0))),
            (0, [], b'H' | b'f') => out.push(Command::MoveCursorTo {
                row: csi.count(0),
                col: csi.count(1),
            }),
            (0, [], b'd') => out.push(Command::MoveCursorToLine(csi.count(0))),
            (0, [], b'I') => out.push(Command::MoveCursorToNextTab(csi.count(0))),
            (0, [], b'Z') => out.push(Command::CursorBackwardTab(csi.count(0))),
            (0, [], b'b') => out.push(Command::RepeatPreviousCharacter(csi.count(0))),

            // Clearing
            (0, [], b'J') => match csi.selector(0) {
                0 => out.push(Command::ClearToEndOfScreen),
                1 => out.push(Command::ClearToBeginOfScreen),
                2 => out.push(Command::ClearScreen),
                3 => out.push(Command::ClearScrollbackBuffer),
                other => trace!("ignoring ED selector {other}"),
            },
            (0, [], b'K') => match csi.selector(0) {
                0 => out.push(Command::ClearToEndOfLine),
                1 => out.push(Command::ClearToBeginOfLine),
                2 => out.push(Command::ClearLine),
                other => trace!("ignoring EL selector {other}"),
            },

            // Editing
            (0, [], b'@') => out.push(Command::InsertCharacters(csi.count(0))),
            (0, [], b'P') => out.push(Command::DeleteCharacters(csi.count(0))),
            (0, [], b'L') => out.push(Command::InsertLines(csi.count(0))),
            (0, [], b'M') => out.push(Command::DeleteLines(csi.count(0))),
            (0, [], b'X') => out.push(Command::EraseCharacters(csi.count(0))),
            (0, [b'\''], b'}') => out.push(Command::InsertColumns(csi.count(0))),
            (0, [b'\''], b'~') => out.push(Command::DeleteColumns(csi.count(0))),

            // Scrolling and margins
            (0, [], b'S') => out.push(Command::ScrollUp(csi.count(0))),
            (0, [], b'T') => out.push(Command::ScrollDown(csi.count(0))),
            (0, [], b'r') => out.push(Command::SetTopBottomMargin {
                top: csi.params.get(0),
                bottom: csi.params.get(1),
            }),
            // CSI s is SCOSC without parameters, DECSLRM with them.
            (0, [], b's') => {
                if csi.params.is_empty() {
                    out.push(Command::SaveCursor);
                } else {
                    out.push(Command::SetLeftRightMargin {
                        left: csi.params.get(0),
                        right: csi.params.get(1),
                    });
                }
            }
            (0, [], b'u') => out.push(Command::RestoreCursor),

            // Tabs
            (0, [], b'g') => match csi.selector(0) {
                0 => out.push(Command::HorizontalTabClear(TabClear::UnderCursor)),
                3 => out.push(Command::HorizontalTabClear(TabClear::All)),
                other => trace!("ignoring TBC selector {other}"),
            },

            // Rendition
            (0, [], b'm') => self.sgr(&csi.params, out),

            // Modes
            (0, [], b'h') => self.ansi_modes(&csi.params, true, out),
            (0, [], b'l') => self.ansi_modes(&csi.params, false, out),
            (b'?', [], b'h') => self.dec_modes(&csi.params, true, out),
            (b'?', [], b'l') => self.dec_modes(&csi.params, false, out),
            (0, [b'$'], b'p') => match Mode::from_ansi(csi.selector(0)) {
                Some(mode) => out.push(Command::RequestMode { mode }),
                None => trace!("DECRQM for unknown ANSI mode {}", csi.selector(0)),
            },
            (b'?', [b'$'], b'p') => match Mode::from_dec(csi.selector(0)) {
                Some(mode) => out.push(Command::RequestMode { mode }),
                None => trace!("DECRQM for unknown DEC mode {}", csi.selector(0)),
            },

            // Reports
            (0, [], b'n') => match csi.selector(0) {
                5 => out.push(Command::DeviceStatusReport),
                6 => out.push(Command::ReportCursorPosition),
                other => trace!("ignoring DSR selector {other}"),
            },
            (b'?', [], b'n') => match csi.selector(0) {
                6 => out.push(Command::ReportExtendedCursorPosition),
                other => trace!("ignoring private DSR selector {other}"),
            },
            (0, [], b'c') => out.push(Command::SendDeviceAttributes),
            (b'>', [], b'c') => out.push(Command::SendTerminalId),
            (0, [b'$'], b'w') => match csi.selector(0) {
                2 => out.push(Command::RequestTabStops),
                other => trace!("ignoring DECRQPSR selector {other}"),
            },

            // Cursor style and resets
            (0, [b' '], b'q') => out.push(cursor_style(csi.selector(0))),
            (0, [b'!'], b'p') => out.push(Command::SoftTerminalReset),

            // Window manipulation
            (0, [], b't') => match csi.selector(0) {
                4 => out.push(Command::ResizeWindow {
                    width: csi.selector(2),
                    height: csi.selector(1),
                    unit: ResizeUnit::Pixels,
                }),
                8 => out.push(Command::ResizeWindow {
                    width: csi.selector(2),
                    height: csi.selector(1),
                    unit: ResizeUnit::Characters,
                }),
                18 => out.push(Command::ReportTextAreaSize),
                22 => out.push(Command::SaveWindowTitle),
                23 => out.push(Command::RestoreWindowTitle),
                other => trace!("ignoring window op {other}"),
            },

            (marker, intermediates, final_byte) => {
                trace!(
                    "ignoring CSI marker={marker:?} intermediates={intermediates:?} final={:?}",
                    final_byte as char
                );
            }
        }
    }

    fn ansi_modes(&self, params: &Params, enable: bool, out: &mut Vec<Command>) {
        for value in params.values() {
            match Mode::from_ansi(value) {
                Some(mode) => out.push(Command::SetMode { mode, enable }),
                None => trace!("ignoring unknown ANSI mode {value}"),
            }
        }
    }

    fn dec_modes(&self, params: &Params, enable: bool, out: &mut Vec<Command>) {
        for value in params.values() {
            let protocol = match value {
                9 => Some(MouseProtocol::X10),
                1000 => Some(MouseProtocol::NormalTracking),
                1002 => Some(MouseProtocol::ButtonTracking),
                1003 => Some(MouseProtocol::AnyEventTracking),
                _ => None,
            };
            if let Some(protocol) = protocol {
                out.push(Command::SendMouseEvents { protocol, enable });
                continue;
            }
            match Mode::from_dec(value) {
                Some(mode) => out.push(Command::SetMode { mode, enable }),
                None => trace!("ignoring unknown DEC mode {value}"),
            }
        }
    }

    fn sgr(&self, params: &Params, out: &mut Vec<Command>) {
        use GraphicsRendition as Gr;

        if params.is_empty() {
            out.push(Command::SetGraphicsRendition(Gr::Reset));
            return;
        }

        let mut i = 0;
        while i < params.len() {
            let value = params.raw(i);
            match value {
                0 => out.push(Command::SetGraphicsRendition(Gr::Reset)),
                1 => out.push(Command::SetGraphicsRendition(Gr::Bold)),
                2 => out.push(Command::SetGraphicsRendition(Gr::Faint)),
                3 => out.push(Command::SetGraphicsRendition(Gr::Italic)),
                4 => {
                    let style = match params.sub(i).first().copied() {
                        None | Some(1) => Gr::Underline,
                        Some(0) => Gr::NoUnderline,
                        Some(2) => Gr::DoublyUnderlined,
                        Some(3) => Gr::CurlyUnderlined,
                        Some(4) => Gr::DottedUnderlined,
                        Some(5) => Gr::DashedUnderlined,
                        Some(other) => {
                            trace!("ignoring underline style {other}");
                            i += 1;
                            continue;
                        }
                    };
                    out.push(Command::SetGraphicsRendition(style));
                }
                5 | 6 => out.push(Command::SetGraphicsRendition(Gr::Blinking)),
                7 => out.push(Command::SetGraphicsRendition(Gr::Inverse)),
                8 => out.push(Command::SetGraphicsRendition(Gr::Hidden)),
                9 => out.push(Command::SetGraphicsRendition(Gr::CrossedOut)),
                21 => out.push(Command::SetGraphicsRendition(Gr::DoublyUnderlined)),
                22 => out.push(Command::SetGraphicsRendition(Gr::Normal)),
                23 => out.push(Command::SetGraphicsRendition(Gr::NoItalic)),
                24 => out.push(Command::SetGraphicsRendition(Gr::NoUnderline)),
                25 => out.push(Command::SetGraphicsRendition(Gr::NoBlinking)),
                27 => out.push(Command::SetGraphicsRendition(Gr::NoInverse)),
                28 => out.push(Command::SetGraphicsRendition(Gr::NoHidden)),
                29 => out.push(Command::SetGraphicsRendition(Gr::NoCrossedOut)),
                30..=37 => out.push(Command::SetForegroundColor(Color::Indexed(
                    (value - 30) as u8,
                ))),
                38 => match extended_color(params, i) {
                    Some((color, consumed)) => {
                        out.push(Command::SetForegroundColor(color));
                        i += consumed;
                    }
                    None => trace!("malformed extended foreground color"),
                },
                39 => out.push(Command::SetForegroundColor(Color::Default)),
                40..=47 => out.push(Command::SetBackgroundColor(Color::Indexed(
                    (value - 40) as u8,
                ))),
                48 => match extended_color(params, i) {
                    Some((color, consumed)) => {
                        out.push(Command::SetBackgroundColor(color));
                        i += consumed;
                    }
                    None => trace!("malformed extended background color"),
                },
                49 => out.push(Command::SetBackgroundColor(Color::Default)),
                58 => match extended_color(params, i) {
                    Some((color, consumed)) => {
                        out.push(Command::SetUnderlineColor(color));
                        i += consumed;
                    }
                    None => trace!("malformed underline color"),
                },
                59 => out.push(Command::SetUnderlineColor(Color::Default)),
                90..=97 => out.push(Command::SetForegroundColor(Color::Bright(
                    (value - 90) as u8,
                ))),
                100..=107 => out.push(Command::SetBackgroundColor(Color::Bright(
                    (value - 100) as u8,
                ))),
                other => trace!("ignoring SGR {other}"),
            }
            i += 1;
        }
    }

    fn osc(&self, osc: OscEvent, out: &mut Vec<Command>) {
        let data = String::from_utf8_lossy(&osc.data);
        let (selector, payload) = match data.find(';') {
            Some(split) => (&data[..split], &data[split + 1..]),
            None => (data.as_ref(), ""),
        };
        let Ok(code) = selector.parse::<u16>() else {
            trace!("ignoring OSC with non-numeric selector {selector:?}");
            return;
        };

        match code {
            0 => {
                out.push(Command::ChangeIconTitle(payload.to_string()));
                out.push(Command::ChangeWindowTitle(payload.to_string()));
            }
            1 => out.push(Command::ChangeIconTitle(payload.to_string())),
            2 => out.push(Command::ChangeWindowTitle(payload.to_string())),
            4 => {
                let (index, spec) = match payload.split_once(';') {
                    Some(parts) => parts,
                    None => {
                        trace!("ignoring OSC 4 without a color spec");
                        return;
                    }
                };
                let Ok(index) = index.parse::<u8>() else {
                    trace!("ignoring OSC 4 with bad palette index {index:?}");
                    return;
                };
                if spec == "?" {
                    out.push(Command::RequestColorPalette(index));
                } else if let Some(color) = parse_color_spec(spec) {
                    out.push(Command::SetColorPalette { index, color });
                } else {
                    trace!("ignoring OSC 4 color spec {spec:?}");
                }
            }
            8 => {
                let (link_params, uri) = payload.split_once(';').unwrap_or(("", payload));
                let id = link_params
                    .split(':')
                    .find_map(|kv| kv.strip_prefix("id="))
                    .unwrap_or("");
                out.push(Command::Hyperlink {
                    id: id.to_string(),
                    uri: uri.to_string(),
                });
            }
            10 | 11 | 12 | 13 | 14 | 17 => {
                let Some(name) = DynamicColorName::from_code(code) else {
                    return;
                };
                if payload == "?" {
                    out.push(Command::RequestDynamicColor(name));
                } else if let Some(color) = parse_color_spec(payload) {
                    out.push(Command::SetDynamicColor { name, color });
                } else {
                    trace!("ignoring OSC {code} color spec {payload:?}");
                }
            }
            104 => {
                if payload.is_empty() {
                    out.push(Command::ResetColorPalette(None));
                } else if let Ok(index) = payload.parse::<u8>() {
                    out.push(Command::ResetColorPalette(Some(index)));
                } else {
                    trace!("ignoring OSC 104 index {payload:?}");
                }
            }
            110 | 111 | 112 | 113 | 114 | 117 => {
                if let Some(name) = DynamicColorName::from_code(code - 100) {
                    out.push(Command::ResetDynamicColor(name));
                }
            }
            // FinalTerm prompt mark; only the prompt-start fragment sets a
            // jump mark.
            133 => {
                if payload.starts_with('A') {
                    out.push(Command::SetMark);
                } else {
                    trace!("ignoring OSC 133 fragment {payload:?}");
                }
            }
            777 => {
                let mut parts = payload.splitn(3, ';');
                if parts.next() == Some("notify") {
                    let title = parts.next().unwrap_or("").to_string();
                    let content = parts.next().unwrap_or("").to_string();
                    out.push(Command::Notify { title, content });
                } else {
                    trace!("ignoring OSC 777 payload {payload:?}");
                }
            }
            1337 => {
                if payload == "SetMark" {
                    out.push(Command::SetMark);
                } else {
                    trace!("ignoring OSC 1337 payload {payload:?}");
                }
            }
            other => trace!("ignoring OSC {other}"),
        }
    }
}

/// Decode SGR 38/48/58 extended colors, in both the `;`-separated and the
/// `:`-subparameter forms. Returns the color and how many extra
/// `;`-parameters were consumed.
fn extended_color(params: &Params, i: usize) -> Option<(Color, usize)> {
    let sub = params.sub(i);
    if !sub.is_empty() {
        return match sub[0] {
            5 if sub.len() >= 2 => Some((Color::Indexed(sub[1].min(255) as u8), 0)),
            // 2:r:g:b or 2:colorspace:r:g:b
            2 if sub.len() >= 5 => Some((
                Color::rgb(
                    sub[2].min(255) as u8,
                    sub[3].min(255) as u8,
                    sub[4].min(255) as u8,
                ),
                0,
            )),
            2 if sub.len() == 4 => Some((
                Color::rgb(
                    sub[1].min(255) as u8,
                    sub[2].min(255) as u8,
                    sub[3].min(255) as u8,
                ),
                0,
            )),
            _ => None,
        };
    }
    match params.raw(i + 1) {
        5 if params.len() > i + 2 => Some((Color::Indexed(params.raw(i + 2).min(255) as u8), 2)),
        2 if params.len() > i + 4 => Some((
            Color::rgb(
                params.raw(i + 2).min(255) as u8,
                params.raw(i + 3).min(255) as u8,
                params.raw(i + 4).min(255) as u8,
            ),
            4,
        )),
        _ => None,
    }
}

/// DECSCUSR selector to cursor style.
fn cursor_style(selector: u16) -> Command {
    let (display, shape) = match selector {
        0 | 1 => (CursorDisplay::Blinking, CursorShape::Block),
        2 => (CursorDisplay::Steady, CursorShape::Block),
        3 => (CursorDisplay::Blinking, CursorShape::Underscore),
        4 => (CursorDisplay::Steady, CursorShape::Underscore),
        5 => (CursorDisplay::Blinking, CursorShape::Bar),
        _ => (CursorDisplay::Steady, CursorShape::Bar),
    };
    Command::SetCursorStyle { display, shape }
}
