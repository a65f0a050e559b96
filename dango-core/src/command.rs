//! The command set
//!
//! Every operation the screen can perform, as one closed sum type. The
//! command builder produces these from parse events; the screen dispatches
//! on them exhaustively, so adding a variant forces every consumer to
//! handle it. Counts carried by motion and editing commands are always at
//! least 1 (a 0 or missing parameter reads as 1 at build time).

use serde::{Deserialize, Serialize};

use crate::charset::Charset;
use crate::color::{Color, Rgb};
use crate::cursor::{CursorDisplay, CursorShape};
use crate::modes::{Mode, MouseProtocol};

/// HorizontalTabClear selector (TBC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TabClear {
    UnderCursor,
    All,
}

/// Resize unit for window manipulation (XTWINOPS 4 / 8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizeUnit {
    Characters,
    Pixels,
}

/// The colors addressable through OSC 10..19 and their 11x resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DynamicColorName {
    DefaultForeground,
    DefaultBackground,
    TextCursor,
    MouseForeground,
    MouseBackground,
    HighlightBackground,
}

impl DynamicColorName {
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            10 => Some(Self::DefaultForeground),
            11 => Some(Self::DefaultBackground),
            12 => Some(Self::TextCursor),
            13 => Some(Self::MouseForeground),
            14 => Some(Self::MouseBackground),
            17 => Some(Self::HighlightBackground),
            _ => None,
        }
    }

    /// The OSC selector used when replying to a query.
    pub fn code(self) -> u16 {
        match self {
            Self::DefaultForeground => 10,
            Self::DefaultBackground => 11,
            Self::TextCursor => 12,
            Self::MouseForeground => 13,
            Self::MouseBackground => 14,
            Self::HighlightBackground => 17,
        }
    }
}

/// One SGR attribute change. Colors travel as separate commands so a single
/// `CSI ... m` may expand into several commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphicsRendition {
    /// SGR 0.
    Reset,
    Bold,
    Faint,
    Italic,
    Underline,
    DoublyUnderlined,
    CurlyUnderlined,
    DottedUnderlined,
    DashedUnderlined,
    Blinking,
    Inverse,
    Hidden,
    CrossedOut,
    /// SGR 22: neither bold nor faint.
    Normal,
    NoItalic,
    NoUnderline,
    NoBlinking,
    NoInverse,
    NoHidden,
    NoCrossedOut,
}

/// Everything the screen knows how to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Write one decoded character at the cursor.
    AppendChar(char),
    /// BEL.
    Bell,
    /// LF / VT / FF.
    Linefeed,
    /// BS.
    Backspace,
    /// RIS.
    FullReset,
    /// DECSTR.
    SoftTerminalReset,

    // Cursor motion
    /// CUU.
    MoveCursorUp(u16),
    /// CUD / VPR.
    MoveCursorDown(u16),
    /// CUF / HPR.
    MoveCursorForward(u16),
    /// CUB.
    MoveCursorBackward(u16),
    /// CUP / HVP (1-based).
    MoveCursorTo { row: u16, col: u16 },
    /// CHA / HPA (1-based).
    MoveCursorToColumn(u16),
    /// VPA (1-based).
    MoveCursorToLine(u16),
    /// CR.
    MoveCursorToBeginOfLine,
    /// CNL.
    CursorNextLine(u16),
    /// CPL.
    CursorPreviousLine(u16),
    /// HT / CHT.
    MoveCursorToNextTab(u16),
    /// CBT.
    CursorBackwardTab(u16),
    /// DECSC / SCOSC.
    SaveCursor,
    /// DECRC / SCORC.
    RestoreCursor,
    /// IND.
    Index,
    /// RI.
    ReverseIndex,
    /// DECBI.
    BackIndex,
    /// DECFI.
    ForwardIndex,
    /// REP.
    RepeatPreviousCharacter(u16),

    // Editing
    /// ICH.
    InsertCharacters(u16),
    /// DCH.
    DeleteCharacters(u16),
    /// IL.
    InsertLines(u16),
    /// DL.
    DeleteLines(u16),
    /// DECIC.
    InsertColumns(u16),
    /// DECDC.
    DeleteColumns(u16),
    /// ECH.
    EraseCharacters(u16),

    // Clearing
    /// ED 0.
    ClearToEndOfScreen,
    /// ED 1.
    ClearToBeginOfScreen,
    /// ED 2.
    ClearScreen,
    /// ED 3 (xterm).
    ClearScrollbackBuffer,
    /// EL 0.
    ClearToEndOfLine,
    /// EL 1.
    ClearToBeginOfLine,
    /// EL 2.
    ClearLine,

    // Scrolling and margins
    /// SU.
    ScrollUp(u16),
    /// SD.
    ScrollDown(u16),
    /// DECSTBM; `None` selects the screen edge.
    SetTopBottomMargin {
        top: Option<u16>,
        bottom: Option<u16>,
    },
    /// DECSLRM; only honored while DECLRMM (?69) is set.
    SetLeftRightMargin {
        left: Option<u16>,
        right: Option<u16>,
    },

    // Tabs
    /// HTS.
    HorizontalTabSet,
    /// TBC.
    HorizontalTabClear(TabClear),

    // Rendition
    /// One expanded SGR attribute.
    SetGraphicsRendition(GraphicsRendition),
    SetForegroundColor(Color),
    SetBackgroundColor(Color),
    /// SGR 58/59.
    SetUnderlineColor(Color),

    // Modes
    SetMode { mode: Mode, enable: bool },
    /// DECRQM.
    RequestMode { mode: Mode },
    /// Mouse protocol modes ?9 / ?1000 / ?1002 / ?1003.
    SendMouseEvents { protocol: MouseProtocol, enable: bool },
    /// DECKPAM / DECKPNM.
    ApplicationKeypadMode(bool),

    // Charsets
    /// SCS: designate `charset` into G`slot`.
    DesignateCharset { slot: u8, charset: Charset },
    /// SS2 / SS3.
    SingleShiftSelect { slot: u8 },
    /// SI (slot 0) / SO (slot 1).
    LockingShift { slot: u8 },
    /// DECSCUSR.
    SetCursorStyle {
        display: CursorDisplay,
        shape: CursorShape,
    },

    // Reports
    /// DSR 5.
    DeviceStatusReport,
    /// DSR 6 (CPR).
    ReportCursorPosition,
    /// DECXCPR.
    ReportExtendedCursorPosition,
    /// DA1.
    SendDeviceAttributes,
    /// DA2.
    SendTerminalId,
    /// DECTABSR request.
    RequestTabStops,
    /// XTWINOPS 18.
    ReportTextAreaSize,

    // Window and title
    /// OSC 2.
    ChangeWindowTitle(String),
    /// OSC 1.
    ChangeIconTitle(String),
    /// XTWINOPS 22.
    SaveWindowTitle,
    /// XTWINOPS 23.
    RestoreWindowTitle,
    /// XTWINOPS 4 / 8.
    ResizeWindow {
        width: u16,
        height: u16,
        unit: ResizeUnit,
    },

    /// DECALN.
    ScreenAlignmentPattern,
    /// Set a jump mark on the cursor line.
    SetMark,
    /// OSC 777;notify.
    Notify { title: String, content: String },
    /// OSC 8; an empty uri ends the link.
    Hyperlink { id: String, uri: String },

    // Colors
    /// OSC 4.
    SetColorPalette { index: u8, color: Rgb },
    /// OSC 4 with a `?` spec.
    RequestColorPalette(u8),
    /// OSC 104.
    ResetColorPalette(Option<u8>),
    /// OSC 10/11/12/...
    SetDynamicColor { name: DynamicColorName, color: Rgb },
    /// OSC 10/11/12 with a `?` spec.
    RequestDynamicColor(DynamicColorName),
    /// OSC 110/111/112/...
    ResetDynamicColor(DynamicColorName),
}
