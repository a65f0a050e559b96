//! Terminal modes
//!
//! Modes are kept as a set of [`Mode`] values per screen buffer, with the
//! ANSI (SM/RM) and DEC private (DECSET/DECRST) number mappings used by the
//! command builder and by DECRQM replies. Mouse protocol selection is
//! carried separately as typed enums for the host callbacks.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Every mode the screen tracks, ANSI and DEC private.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Mode {
    // ANSI modes (SM/RM)
    /// KAM - keyboard action mode (2).
    KeyboardAction,
    /// IRM - insert/replace mode (4).
    Insert,
    /// SRM - send/receive (local echo) mode (12).
    SendReceive,
    /// LNM - automatic newline (20).
    AutomaticNewline,

    // DEC private modes (DECSET/DECRST)
    /// DECCKM - application cursor keys (?1).
    ApplicationCursorKeys,
    /// Designate the USASCII charset and reset shifts (?2).
    DesignateCharsetUsAscii,
    /// DECCOLM - 132 column mode (?3).
    Column132,
    /// DECSCLM - smooth scroll (?4).
    SmoothScroll,
    /// DECSCNM - reverse video (?5).
    ReverseVideo,
    /// DECOM - origin mode (?6).
    Origin,
    /// DECAWM - autowrap (?7).
    AutoWrap,
    /// DECARM - autorepeat (?8).
    AutoRepeat,
    /// X10 mouse reporting (?9).
    MouseProtocolX10,
    /// rxvt toolbar visibility (?10).
    ShowToolbar,
    /// att610 cursor blinking (?12).
    CursorBlinking,
    /// DECTCEM - cursor visibility (?25).
    VisibleCursor,
    /// Reverse wraparound for backspace (?45).
    ReverseWrapAround,
    /// Alternate screen buffer, plain variant (?47).
    UseAlternateScreen,
    /// DECLRMM - left/right margin mode (?69).
    LeftRightMargin,
    /// VT200 mouse tracking (?1000).
    MouseProtocolNormalTracking,
    /// Button-event mouse tracking (?1002).
    MouseProtocolButtonTracking,
    /// Any-event mouse tracking (?1003).
    MouseProtocolAnyEventTracking,
    /// Focus in/out reporting (?1004).
    FocusTracking,
    /// UTF-8 extended mouse coordinates (?1005).
    MouseExtended,
    /// SGR extended mouse coordinates (?1006).
    MouseSgr,
    /// Alternate scroll: wheel sends cursor keys in the alternate screen
    /// (?1007).
    MouseAlternateScroll,
    /// urxvt extended mouse coordinates (?1015).
    MouseUrxvt,
    /// Alternate screen, cleared on entry (?1047).
    UseAlternateScreenClear,
    /// Save/restore cursor as a mode (?1048).
    SaveCursor,
    /// Alternate screen with cursor save and clear (?1049).
    UseAlternateScreenSaveCursor,
    /// Private color registers for image protocols (?1070).
    UsePrivateColorRegisters,
    /// Bracketed paste (?2004).
    BracketedPaste,
}

impl Mode {
    /// Map an SM/RM parameter to a mode.
    pub fn from_ansi(number: u16) -> Option<Mode> {
        match number {
            2 => Some(Mode::KeyboardAction),
            4 => Some(Mode::Insert),
            12 => Some(Mode::SendReceive),
            20 => Some(Mode::AutomaticNewline),
            _ => None,
        }
    }

    /// Map a DECSET/DECRST parameter to a mode.
    pub fn from_dec(number: u16) -> Option<Mode> {
        match number {
            1 => Some(Mode::ApplicationCursorKeys),
            2 => Some(Mode::DesignateCharsetUsAscii),
            3 => Some(Mode::Column132),
            4 => Some(Mode::SmoothScroll),
            5 => Some(Mode::ReverseVideo),
            6 => Some(Mode::Origin),
            7 => Some(Mode::AutoWrap),
            8 => Some(Mode::AutoRepeat),
            9 => Some(Mode::MouseProtocolX10),
            10 => Some(Mode::ShowToolbar),
            12 => Some(Mode::CursorBlinking),
            25 => Some(Mode::VisibleCursor),
            45 => Some(Mode::ReverseWrapAround),
            47 => Some(Mode::UseAlternateScreen),
            69 => Some(Mode::LeftRightMargin),
            1000 => Some(Mode::MouseProtocolNormalTracking),
            1002 => Some(Mode::MouseProtocolButtonTracking),
            1003 => Some(Mode::MouseProtocolAnyEventTracking),
            1004 => Some(Mode::FocusTracking),
            1005 => Some(Mode::MouseExtended),
            1006 => Some(Mode::MouseSgr),
            1007 => Some(Mode::MouseAlternateScroll),
            1015 => Some(Mode::MouseUrxvt),
            1047 => Some(Mode::UseAlternateScreenClear),
            1048 => Some(Mode::SaveCursor),
            1049 => Some(Mode::UseAlternateScreenSaveCursor),
            1070 => Some(Mode::UsePrivateColorRegisters),
            2004 => Some(Mode::BracketedPaste),
            _ => None,
        }
    }

    /// The wire number and whether it is DEC private; used by DECRQM.
    pub fn number(self) -> (bool, u16) {
        match self {
            Mode::KeyboardAction => (false, 2),
            Mode::Insert => (false, 4),
            Mode::SendReceive => (false, 12),
            Mode::AutomaticNewline => (false, 20),
            Mode::ApplicationCursorKeys => (true, 1),
            Mode::DesignateCharsetUsAscii => (true, 2),
            Mode::Column132 => (true, 3),
            Mode::SmoothScroll => (true, 4),
            Mode::ReverseVideo => (true, 5),
            Mode::Origin => (true, 6),
            Mode::AutoWrap => (true, 7),
            Mode::AutoRepeat => (true, 8),
            Mode::MouseProtocolX10 => (true, 9),
            Mode::ShowToolbar => (true, 10),
            Mode::CursorBlinking => (true, 12),
            Mode::VisibleCursor => (true, 25),
            Mode::ReverseWrapAround => (true, 45),
            Mode::UseAlternateScreen => (true, 47),
            Mode::LeftRightMargin => (true, 69),
            Mode::MouseProtocolNormalTracking => (true, 1000),
            Mode::MouseProtocolButtonTracking => (true, 1002),
            Mode::MouseProtocolAnyEventTracking => (true, 1003),
            Mode::FocusTracking => (true, 1004),
            Mode::MouseExtended => (true, 1005),
            Mode::MouseSgr => (true, 1006),
            Mode::MouseAlternateScroll => (true, 1007),
            Mode::MouseUrxvt => (true, 1015),
            Mode::UseAlternateScreenClear => (true, 1047),
            Mode::SaveCursor => (true, 1048),
            Mode::UseAlternateScreenSaveCursor => (true, 1049),
            Mode::UsePrivateColorRegisters => (true, 1070),
            Mode::BracketedPaste => (true, 2004),
        }
    }
}

/// The set of enabled modes for one screen buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modes {
    enabled: BTreeSet<Mode>,
}

impl Modes {
    pub fn new() -> Self {
        let mut modes = Self {
            enabled: BTreeSet::new(),
        };
        for mode in [
            Mode::AutoWrap,
            Mode::AutoRepeat,
            Mode::VisibleCursor,
            Mode::CursorBlinking,
        ] {
            modes.enabled.insert(mode);
        }
        modes
    }

    pub fn enabled(&self, mode: Mode) -> bool {
        self.enabled.contains(&mode)
    }

    pub fn set(&mut self, mode: Mode, enable: bool) {
        if enable {
            self.enabled.insert(mode);
        } else {
            self.enabled.remove(&mode);
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn iter(&self) -> impl Iterator<Item = Mode> + '_ {
        self.enabled.iter().copied()
    }
}

impl Default for Modes {
    fn default() -> Self {
        Self::new()
    }
}

/// Which mouse events are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseProtocol {
    X10,
    NormalTracking,
    ButtonTracking,
    AnyEventTracking,
}

/// How mouse coordinates are encoded on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MouseTransport {
    #[default]
    Default,
    Extended,
    Sgr,
    Urxvt,
}

/// What the mouse wheel does in the alternate screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MouseWheelMode {
    #[default]
    Default,
    AlternateScroll,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let modes = Modes::new();
        assert!(modes.enabled(Mode::AutoWrap));
        assert!(modes.enabled(Mode::VisibleCursor));
        assert!(!modes.enabled(Mode::Origin));
        assert!(!modes.enabled(Mode::BracketedPaste));
    }

    #[test]
    fn set_and_reset() {
        let mut modes = Modes::new();
        modes.set(Mode::Origin, true);
        modes.set(Mode::AutoWrap, false);
        assert!(modes.enabled(Mode::Origin));
        assert!(!modes.enabled(Mode::AutoWrap));
        modes.reset();
        assert!(!modes.enabled(Mode::Origin));
        assert!(modes.enabled(Mode::AutoWrap));
    }

    #[test]
    fn dec_number_round_trip() {
        for number in [1, 6, 7, 25, 47, 69, 1006, 1049, 2004] {
            let mode = Mode::from_dec(number).unwrap();
            assert_eq!(mode.number(), (true, number));
        }
    }

    #[test]
    fn ansi_number_round_trip() {
        for number in [2, 4, 12, 20] {
            let mode = Mode::from_ansi(number).unwrap();
            assert_eq!(mode.number(), (false, number));
        }
    }

    #[test]
    fn unknown_numbers_rejected() {
        assert_eq!(Mode::from_dec(9999), None);
        assert_eq!(Mode::from_ansi(7), None);
    }
}
