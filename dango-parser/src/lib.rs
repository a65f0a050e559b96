//! dango-parser — streaming VT/xterm escape sequence parser
//!
//! Converts a terminal byte stream into parse events. The parser:
//! - handles arbitrary chunk boundaries (streaming),
//! - decodes UTF-8 in the ground state with U+FFFD substitution,
//! - recognizes C0/C1 controls, ESC, CSI, OSC, and DCS sequences,
//! - consumes SOS/PM/APC strings so the stream never desynchronizes,
//! - never surfaces an error; malformed input is dropped via ignore states.
//!
//! Reference: https://vt100.net/emu/dec_ansi_parser and
//! https://www.x.org/docs/xterm/ctlseqs.pdf

mod event;
mod params;
mod parser;
mod utf8;

pub use event::{CsiEvent, DcsEvent, EscEvent, Event, OscEvent, StringKind};
pub use params::{Param, Params};
pub use parser::{Parser, ParserState};
pub use utf8::{Utf8Decoder, Utf8Result, REPLACEMENT};
