//! VT escape sequence parser
//!
//! A byte-driven state machine after the VT500 series parser model
//! (https://vt100.net/emu/dec_ansi_parser), covering C0/C1 controls, ESC,
//! CSI, OSC, and DCS sequences plus SOS/PM/APC strings, with UTF-8 text
//! decoding interleaved in the ground state.
//!
//! The parser is streaming: bytes may arrive in arbitrary chunks and the
//! resulting events are identical. It never fails; malformed sequences are
//! consumed by the ignore states and the machine returns to ground.

use crate::event::{CsiEvent, DcsEvent, EscEvent, Event, OscEvent, StringKind};
use crate::params::Params;
use crate::utf8::{Utf8Decoder, Utf8Result, REPLACEMENT};

/// Cap on accumulated OSC/DCS payload bytes (1 MiB); excess is discarded.
const MAX_STRING_LEN: usize = 1024 * 1024;
/// Cap on collected intermediate bytes.
const MAX_INTERMEDIATES: usize = 4;

/// Parser states, as in the DEC/xterm reference machine. SOS, PM, and APC
/// share one state parameterized by [`StringKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    Ground,
    Escape,
    EscapeIntermediate,
    CsiEntry,
    CsiParam,
    CsiIntermediate,
    CsiIgnore,
    DcsEntry,
    DcsParam,
    DcsIntermediate,
    DcsPassthrough,
    DcsIgnore,
    OscString,
    SosPmApcString,
}

/// The escape sequence parser.
#[derive(Debug, Clone)]
pub struct Parser {
    state: ParserState,
    utf8: Utf8Decoder,
    param_bytes: Vec<u8>,
    intermediates: Vec<u8>,
    marker: u8,
    string_data: Vec<u8>,
    string_kind: StringKind,
    dcs_final: u8,
}

impl Parser {
    pub fn new() -> Self {
        Self {
            state: ParserState::Ground,
            utf8: Utf8Decoder::new(),
            param_bytes: Vec::with_capacity(64),
            intermediates: Vec::with_capacity(MAX_INTERMEDIATES),
            marker: 0,
            string_data: Vec::with_capacity(256),
            string_kind: StringKind::Apc,
            dcs_final: 0,
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Return to ground, discarding any partial sequence.
    pub fn reset(&mut self) {
        self.state = ParserState::Ground;
        self.utf8.reset();
        self.param_bytes.clear();
        self.intermediates.clear();
        self.marker = 0;
        self.string_data.clear();
        self.dcs_final = 0;
    }

    /// Parse a chunk of bytes, invoking `emit` for each completed event.
    pub fn parse<F>(&mut self, data: &[u8], mut emit: F)
    where
        F: FnMut(Event),
    {
        for &byte in data {
            self.advance(byte, &mut emit);
        }
    }

    /// Parse a chunk and collect the events into a vector.
    pub fn parse_collect(&mut self, data: &[u8]) -> Vec<Event> {
        let mut events = Vec::new();
        self.parse(data, |event| events.push(event));
        events
    }

    fn advance<F>(&mut self, byte: u8, emit: &mut F)
    where
        F: FnMut(Event),
    {
        // String-accumulating states consume almost everything.
        if matches!(
            self.state,
            ParserState::OscString
                | ParserState::DcsPassthrough
                | ParserState::DcsIgnore
                | ParserState::SosPmApcString
        ) {
            match byte {
                0x1B => {
                    // Likely ST (ESC \); finish now and let the Escape state
                    // swallow the backslash.
                    self.finish_string(emit);
                    self.state = ParserState::Escape;
                    self.intermediates.clear();
                }
                0x07 if self.state == ParserState::OscString => {
                    // BEL terminates OSC (xterm compatibility).
                    self.finish_string(emit);
                    self.state = ParserState::Ground;
                }
                0x9C => {
                    // 8-bit ST.
                    self.finish_string(emit);
                    self.state = ParserState::Ground;
                }
                0x18 | 0x1A => {
                    // CAN, SUB abort the string.
                    self.string_data.clear();
                    self.state = ParserState::Ground;
                }
                _ => {
                    if self.state != ParserState::DcsIgnore
                        && self.string_data.len() < MAX_STRING_LEN
                    {
                        self.string_data.push(byte);
                    }
                }
            }
            return;
        }

        // C0 controls execute from any non-string state, even inside CSI.
        if byte < 0x20 {
            match byte {
                0x1B => self.enter_escape(),
                0x18 | 0x1A => self.state = ParserState::Ground,
                0x07..=0x0F => emit(Event::Control(byte)),
                _ => {}
            }
            return;
        }

        // C1 controls, unless we are inside a UTF-8 sequence.
        if (0x80..=0x9F).contains(&byte) && !self.utf8.in_progress() {
            match byte {
                0x90 => self.enter_dcs(),
                0x98 => self.enter_string(StringKind::Sos),
                0x9B => self.enter_csi(),
                0x9D => self.enter_osc(),
                0x9E => self.enter_string(StringKind::Pm),
                0x9F => self.enter_string(StringKind::Apc),
                _ => {}
            }
            return;
        }

        match self.state {
            ParserState::Ground => self.ground(byte, emit),
            ParserState::Escape => self.escape(byte, emit),
            ParserState::EscapeIntermediate => self.escape_intermediate(byte, emit),
            ParserState::CsiEntry => self.csi_entry(byte, emit),
            ParserState::CsiParam => self.csi_param(byte, emit),
            ParserState::CsiIntermediate => self.csi_intermediate(byte, emit),
            ParserState::CsiIgnore => {
                if (0x40..=0x7E).contains(&byte) {
                    self.state = ParserState::Ground;
                }
            }
            ParserState::DcsEntry => self.dcs_entry(byte),
            ParserState::DcsParam => self.dcs_param(byte),
            ParserState::DcsIntermediate => self.dcs_intermediate(byte),
            // Handled above.
            ParserState::DcsPassthrough
            | ParserState::DcsIgnore
            | ParserState::OscString
            | ParserState::SosPmApcString => {}
        }
    }

    fn ground<F>(&mut self, byte: u8, emit: &mut F)
    where
        F: FnMut(Event),
    {
        if self.utf8.in_progress() || byte >= 0x80 {
            match self.utf8.feed(byte) {
                Utf8Result::Char(c) => emit(Event::Print(c)),
                Utf8Result::Pending => {}
                Utf8Result::Invalid { retry } => {
                    emit(Event::Print(REPLACEMENT));
                    if retry {
                        // The offending byte starts a fresh sequence.
                        self.ground(byte, emit);
                    }
                }
            }
        } else if (0x20..0x7F).contains(&byte) {
            emit(Event::Print(byte as char));
        }
        // 0x7F (DEL) is ignored.
    }

    fn enter_escape(&mut self) {
        self.state = ParserState::Escape;
        self.intermediates.clear();
        // A sequence start cancels any partial UTF-8 decode.
        self.utf8.reset();
    }

    fn escape<F>(&mut self, byte: u8, emit: &mut F)
    where
        F: FnMut(Event),
    {
        match byte {
            b'[' => self.enter_csi(),
            b']' => self.enter_osc(),
            b'P' => self.enter_dcs(),
            b'X' => self.enter_string(StringKind::Sos),
            b'^' => self.enter_string(StringKind::Pm),
            b'_' => self.enter_string(StringKind::Apc),
            // Stray ST.
            b'\\' => self.state = ParserState::Ground,
            0x20..=0x2F => {
                self.intermediates.push(byte);
                self.state = ParserState::EscapeIntermediate;
            }
            0x30..=0x7E => {
                emit(Event::Esc(EscEvent {
                    intermediates: Vec::new(),
                    final_byte: byte,
                }));
                self.state = ParserState::Ground;
            }
            _ => self.state = ParserState::Ground,
        }
    }

    fn escape_intermediate<F>(&mut self, byte: u8, emit: &mut F)
    where
        F: FnMut(Event),
    {
        match byte {
            0x20..=0x2F => {
                if self.intermediates.len() < MAX_INTERMEDIATES {
                    self.intermediates.push(byte);
                }
            }
            0x30..=0x7E => {
                emit(Event::Esc(EscEvent {
                    intermediates: std::mem::take(&mut self.intermediates),
                    final_byte: byte,
                }));
                self.state = ParserState::Ground;
            }
            _ => self.state = ParserState::Ground,
        }
    }

    fn enter_csi(&mut self) {
        self.state = ParserState::CsiEntry;
        self.param_bytes.clear();
        self.intermediates.clear();
        self.marker = 0;
    }

    fn csi_entry<F>(&mut self, byte: u8, emit: &mut F)
    where
        F: FnMut(Event),
    {
        match byte {
            b'<' | b'=' | b'>' | b'?' => {
                self.marker = byte;
                self.state = ParserState::CsiParam;
            }
            b'0'..=b'9' | b';' | b':' => {
                self.param_bytes.push(byte);
                self.state = ParserState::CsiParam;
            }
            0x20..=0x2F => {
                self.intermediates.push(byte);
                self.state = ParserState::CsiIntermediate;
            }
            0x40..=0x7E => self.dispatch_csi(byte, emit),
            _ => self.state = ParserState::CsiIgnore,
        }
    }

    fn csi_param<F>(&mut self, byte: u8, emit: &mut F)
    where
        F: FnMut(Event),
    {
        match byte {
            b'0'..=b'9' | b';' | b':' => self.param_bytes.push(byte),
            0x20..=0x2F => {
                self.intermediates.push(byte);
                self.state = ParserState::CsiIntermediate;
            }
            0x40..=0x7E => self.dispatch_csi(byte, emit),
            // A marker after parameters is malformed.
            _ => self.state = ParserState::CsiIgnore,
        }
    }

    fn csi_intermediate<F>(&mut self, byte: u8, emit: &mut F)
    where
        F: FnMut(Event),
    {
        match byte {
            0x20..=0x2F => {
                if self.intermediates.len() < MAX_INTERMEDIATES {
                    self.intermediates.push(byte);
                } else {
                    self.state = ParserState::CsiIgnore;
                }
            }
            0x40..=0x7E => self.dispatch_csi(byte, emit),
            _ => self.state = ParserState::CsiIgnore,
        }
    }

    fn dispatch_csi<F>(&mut self, final_byte: u8, emit: &mut F)
    where
        F: FnMut(Event),
    {
        emit(Event::Csi(CsiEvent {
            params: Params::parse(&self.param_bytes),
            intermediates: std::mem::take(&mut self.intermediates),
            marker: self.marker,
            final_byte,
        }));
        self.state = ParserState::Ground;
    }

    fn enter_osc(&mut self) {
        self.state = ParserState::OscString;
        self.string_data.clear();
    }

    fn enter_string(&mut self, kind: StringKind) {
        self.state = ParserState::SosPmApcString;
        self.string_kind = kind;
        self.string_data.clear();
    }

    fn enter_dcs(&mut self) {
        self.state = ParserState::DcsEntry;
        self.param_bytes.clear();
        self.intermediates.clear();
        self.marker = 0;
        self.string_data.clear();
        self.dcs_final = 0;
    }

    fn dcs_entry(&mut self, byte: u8) {
        match byte {
            b'<' | b'=' | b'>' | b'?' => {
                self.marker = byte;
                self.state = ParserState::DcsParam;
            }
            b'0'..=b'9' | b';' => {
                self.param_bytes.push(byte);
                self.state = ParserState::DcsParam;
            }
            b':' => self.state = ParserState::DcsIgnore,
            0x20..=0x2F => {
                self.intermediates.push(byte);
                self.state = ParserState::DcsIntermediate;
            }
            0x40..=0x7E => self.dcs_hook(byte),
            _ => self.state = ParserState::DcsIgnore,
        }
    }

    fn dcs_param(&mut self, byte: u8) {
        match byte {
            b'0'..=b'9' | b';' => self.param_bytes.push(byte),
            0x20..=0x2F => {
                self.intermediates.push(byte);
                self.state = ParserState::DcsIntermediate;
            }
            0x40..=0x7E => self.dcs_hook(byte),
            _ => self.state = ParserState::DcsIgnore,
        }
    }

    fn dcs_intermediate(&mut self, byte: u8) {
        match byte {
            0x20..=0x2F => {
                if self.intermediates.len() < MAX_INTERMEDIATES {
                    self.intermediates.push(byte);
                } else {
                    self.state = ParserState::DcsIgnore;
                }
            }
            0x40..=0x7E => self.dcs_hook(byte),
            _ => self.state = ParserState::DcsIgnore,
        }
    }

    fn dcs_hook(&mut self, final_byte: u8) {
        self.dcs_final = final_byte;
        self.state = ParserState::DcsPassthrough;
        self.string_data.clear();
    }

    fn finish_string<F>(&mut self, emit: &mut F)
    where
        F: FnMut(Event),
    {
        let data = std::mem::take(&mut self.string_data);
        match self.state {
            ParserState::OscString => emit(Event::Osc(OscEvent { data })),
            ParserState::DcsPassthrough => emit(Event::Dcs(DcsEvent {
                params: Params::parse(&self.param_bytes),
                intermediates: std::mem::take(&mut self.intermediates),
                final_byte: self.dcs_final,
                data,
            })),
            ParserState::SosPmApcString => emit(Event::String(self.string_kind, data)),
            // DcsIgnore: nothing to report.
            _ => {}
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text() {
        let mut parser = Parser::new();
        let events = parser.parse_collect(b"Hi");
        assert_eq!(events, vec![Event::Print('H'), Event::Print('i')]);
    }

    #[test]
    fn c0_controls() {
        let mut parser = Parser::new();
        let events = parser.parse_collect(b"\x07\x08\x09\x0A\x0D");
        assert_eq!(
            events,
            vec![
                Event::Control(0x07),
                Event::Control(0x08),
                Event::Control(0x09),
                Event::Control(0x0A),
                Event::Control(0x0D),
            ]
        );
    }

    #[test]
    fn csi_cursor_position() {
        let mut parser = Parser::new();
        let events = parser.parse_collect(b"\x1b[10;20H");
        assert_eq!(events.len(), 1);
        let Event::Csi(csi) = &events[0] else {
            panic!("expected CSI event");
        };
        assert_eq!(csi.final_byte, b'H');
        assert_eq!(csi.count(0), 10);
        assert_eq!(csi.count(1), 20);
        assert_eq!(csi.marker, 0);
    }

    #[test]
    fn csi_private_marker() {
        let mut parser = Parser::new();
        let events = parser.parse_collect(b"\x1b[?25h");
        let Event::Csi(csi) = &events[0] else {
            panic!("expected CSI event");
        };
        assert!(csi.is_private());
        assert_eq!(csi.selector(0), 25);
        assert_eq!(csi.final_byte, b'h');
    }

    #[test]
    fn csi_secondary_da_marker() {
        let mut parser = Parser::new();
        let events = parser.parse_collect(b"\x1b[>c");
        let Event::Csi(csi) = &events[0] else {
            panic!("expected CSI event");
        };
        assert_eq!(csi.marker, b'>');
        assert_eq!(csi.final_byte, b'c');
    }

    #[test]
    fn csi_intermediate_byte() {
        let mut parser = Parser::new();
        let events = parser.parse_collect(b"\x1b[2 q");
        let Event::Csi(csi) = &events[0] else {
            panic!("expected CSI event");
        };
        assert_eq!(csi.intermediates, vec![b' ']);
        assert_eq!(csi.final_byte, b'q');
        assert_eq!(csi.selector(0), 2);
    }

    #[test]
    fn esc_sequences() {
        let mut parser = Parser::new();
        let events = parser.parse_collect(b"\x1b7\x1b8\x1bD");
        let finals: Vec<u8> = events
            .iter()
            .map(|e| match e {
                Event::Esc(esc) => esc.final_byte,
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(finals, vec![b'7', b'8', b'D']);
    }

    #[test]
    fn esc_charset_designation() {
        let mut parser = Parser::new();
        let events = parser.parse_collect(b"\x1b(0");
        assert_eq!(
            events,
            vec![Event::Esc(EscEvent {
                intermediates: vec![b'('],
                final_byte: b'0',
            })]
        );
    }

    #[test]
    fn osc_bel_terminated() {
        let mut parser = Parser::new();
        let events = parser.parse_collect(b"\x1b]0;My Title\x07");
        assert_eq!(
            events,
            vec![Event::Osc(OscEvent {
                data: b"0;My Title".to_vec(),
            })]
        );
    }

    #[test]
    fn osc_st_terminated() {
        let mut parser = Parser::new();
        let events = parser.parse_collect(b"\x1b]8;;https://example.com\x1b\\A");
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            Event::Osc(OscEvent {
                data: b"8;;https://example.com".to_vec(),
            })
        );
        assert_eq!(events[1], Event::Print('A'));
    }

    #[test]
    fn dcs_passthrough() {
        let mut parser = Parser::new();
        let events = parser.parse_collect(b"\x1bP1;2qdata\x1b\\");
        assert_eq!(events.len(), 1);
        let Event::Dcs(dcs) = &events[0] else {
            panic!("expected DCS event");
        };
        assert_eq!(dcs.final_byte, b'q');
        assert_eq!(dcs.params.raw(0), 1);
        assert_eq!(dcs.params.raw(1), 2);
        assert_eq!(dcs.data, b"data");
    }

    #[test]
    fn apc_consumed_and_reported() {
        let mut parser = Parser::new();
        let events = parser.parse_collect(b"\x1b_payload\x1b\\X");
        assert_eq!(
            events,
            vec![
                Event::String(StringKind::Apc, b"payload".to_vec()),
                Event::Print('X'),
            ]
        );
    }

    #[test]
    fn can_aborts_sequence() {
        let mut parser = Parser::new();
        let events = parser.parse_collect(b"\x1b[12\x18A");
        assert_eq!(events, vec![Event::Print('A')]);
        assert_eq!(parser.state(), ParserState::Ground);
    }

    #[test]
    fn utf8_text() {
        let mut parser = Parser::new();
        let events = parser.parse_collect("世界 🎉".as_bytes());
        let chars: Vec<char> = events
            .iter()
            .filter_map(|e| match e {
                Event::Print(c) => Some(*c),
                _ => None,
            })
            .collect();
        assert_eq!(chars, vec!['世', '界', ' ', '🎉']);
    }

    #[test]
    fn invalid_utf8_replaced() {
        let mut parser = Parser::new();
        let events = parser.parse_collect(&[0xC3, b'A', 0xFF]);
        assert_eq!(
            events,
            vec![
                Event::Print(REPLACEMENT),
                Event::Print('A'),
                Event::Print(REPLACEMENT),
            ]
        );
    }

    #[test]
    fn streaming_across_chunks() {
        let mut parser = Parser::new();
        assert!(parser.parse_collect(b"\x1b[10").is_empty());
        let events = parser.parse_collect(b";20H");
        assert_eq!(events.len(), 1);
        let Event::Csi(csi) = &events[0] else {
            panic!("expected CSI event");
        };
        assert_eq!(csi.count(0), 10);
        assert_eq!(csi.count(1), 20);
    }

    #[test]
    fn streaming_utf8_across_chunks() {
        // '中' = 0xE4 0xB8 0xAD
        let mut parser = Parser::new();
        assert!(parser.parse_collect(&[0xE4]).is_empty());
        assert!(parser.parse_collect(&[0xB8]).is_empty());
        assert_eq!(parser.parse_collect(&[0xAD]), vec![Event::Print('中')]);
    }

    #[test]
    fn c0_executes_inside_csi() {
        // A CR in the middle of a CSI sequence executes immediately.
        let mut parser = Parser::new();
        let events = parser.parse_collect(b"\x1b[1\x0d2A");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], Event::Control(0x0D));
        let Event::Csi(csi) = &events[1] else {
            panic!("expected CSI event");
        };
        assert_eq!(csi.count(0), 12);
    }

    #[test]
    fn malformed_csi_is_ignored_to_final() {
        let mut parser = Parser::new();
        // A marker after parameters is malformed; the sequence is consumed
        // through its final byte without producing an event.
        let events = parser.parse_collect(b"\x1b[1?~ok");
        assert_eq!(events, vec![Event::Print('o'), Event::Print('k')]);
        assert_eq!(parser.state(), ParserState::Ground);
    }

    #[test]
    fn oversized_osc_payload_is_truncated() {
        let mut parser = Parser::new();
        let mut input = b"\x1b]2;".to_vec();
        input.extend(std::iter::repeat(b'x').take(2 * 1024 * 1024));
        input.extend_from_slice(b"\x07");
        let events = parser.parse_collect(&input);
        assert_eq!(events.len(), 1);
        let Event::Osc(osc) = &events[0] else {
            panic!("expected OSC event");
        };
        assert_eq!(osc.data.len(), MAX_STRING_LEN);
    }

    #[test]
    fn reset_returns_to_ground() {
        let mut parser = Parser::new();
        parser.parse_collect(b"\x1b[12");
        assert_eq!(parser.state(), ParserState::CsiParam);
        parser.reset();
        assert_eq!(parser.state(), ParserState::Ground);
        assert_eq!(parser.parse_collect(b"A"), vec![Event::Print('A')]);
    }
}
