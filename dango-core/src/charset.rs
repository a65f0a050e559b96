//! Character set handling
//!
//! G0-G3 designation (SCS), locking shifts (SI/SO), and single shifts
//! (SS2/SS3). Only the sets that matter in practice are translated: DEC
//! Special Graphics for line drawing and the British national set.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Charset {
    /// US-ASCII, the identity mapping.
    #[default]
    UsAscii,
    /// DEC Special Graphics (line drawing).
    Special,
    /// British national set (# becomes £).
    British,
}

impl Charset {
    /// The designation final byte from `ESC ( Fs` and friends.
    pub fn from_designator(designator: u8) -> Self {
        match designator {
            b'0' | b'2' => Charset::Special,
            b'A' => Charset::British,
            _ => Charset::UsAscii,
        }
    }

    pub fn remap(self, c: char) -> char {
        match self {
            Charset::UsAscii => c,
            Charset::British => {
                if c == '#' {
                    '£'
                } else {
                    c
                }
            }
            Charset::Special => special_graphics(c),
        }
    }
}

/// G0-G3 slots plus the active locking and single shifts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharsetTable {
    slots: [Charset; 4],
    /// Slot selected into GL by the locking shifts (0 after SI, 1 after SO).
    shift: usize,
    /// One-shot slot from SS2/SS3, consumed by the next character.
    single_shift: Option<usize>,
}

impl Default for CharsetTable {
    fn default() -> Self {
        Self {
            slots: [Charset::UsAscii; 4],
            shift: 0,
            single_shift: None,
        }
    }
}

impl CharsetTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn designate(&mut self, slot: u8, charset: Charset) {
        if let Some(entry) = self.slots.get_mut(usize::from(slot)) {
            *entry = charset;
        }
    }

    pub fn slot(&self, slot: u8) -> Charset {
        self.slots
            .get(usize::from(slot))
            .copied()
            .unwrap_or_default()
    }

    /// SI: select G0 into GL.
    pub fn shift_in(&mut self) {
        self.shift = 0;
        self.single_shift = None;
    }

    /// SO: select G1 into GL.
    pub fn shift_out(&mut self) {
        self.shift = 1;
        self.single_shift = None;
    }

    /// SS2/SS3: use G2/G3 for the next character only.
    pub fn single_shift(&mut self, slot: u8) {
        if (2..=3).contains(&slot) {
            self.single_shift = Some(usize::from(slot));
        }
    }

    /// Translate one character, consuming any pending single shift.
    pub fn apply(&mut self, c: char) -> char {
        let slot = self.single_shift.take().unwrap_or(self.shift);
        self.slots[slot].remap(c)
    }
}

/// DEC Special Graphics maps 0x5F-0x7E onto line-drawing glyphs.
fn special_graphics(c: char) -> char {
    match c {
        '`' => '◆',
        'a' => '▒',
        'b' => '␉',
        'c' => '␌',
        'd' => '␍',
        'e' => '␊',
        'f' => '°',
        'g' => '±',
        'h' => '␤',
        'i' => '␋',
        'j' => '┘',
        'k' => '┐',
        'l' => '┌',
        'm' => '└',
        'n' => '┼',
        'o' => '⎺',
        'p' => '⎻',
        'q' => '─',
        'r' => '⎼',
        's' => '⎽',
        't' => '├',
        'u' => '┤',
        'v' => '┴',
        'w' => '┬',
        'x' => '│',
        'y' => '≤',
        'z' => '≥',
        '{' => 'π',
        '|' => '≠',
        '}' => '£',
        '~' => '·',
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_identity() {
        let mut table = CharsetTable::new();
        assert_eq!(table.apply('q'), 'q');
        assert_eq!(table.apply('#'), '#');
    }

    #[test]
    fn designators() {
        assert_eq!(Charset::from_designator(b'B'), Charset::UsAscii);
        assert_eq!(Charset::from_designator(b'0'), Charset::Special);
        assert_eq!(Charset::from_designator(b'A'), Charset::British);
        assert_eq!(Charset::from_designator(b'Z'), Charset::UsAscii);
    }

    #[test]
    fn locking_shifts() {
        let mut table = CharsetTable::new();
        table.designate(1, Charset::Special);
        assert_eq!(table.apply('q'), 'q');
        table.shift_out();
        assert_eq!(table.apply('q'), '─');
        assert_eq!(table.apply('x'), '│');
        table.shift_in();
        assert_eq!(table.apply('q'), 'q');
    }

    #[test]
    fn single_shift_applies_once() {
        let mut table = CharsetTable::new();
        table.designate(2, Charset::Special);
        table.single_shift(2);
        assert_eq!(table.apply('q'), '─');
        assert_eq!(table.apply('q'), 'q');
    }

    #[test]
    fn british_pound() {
        let mut table = CharsetTable::new();
        table.designate(0, Charset::British);
        assert_eq!(table.apply('#'), '£');
        assert_eq!(table.apply('a'), 'a');
    }

    #[test]
    fn line_drawing_corners() {
        assert_eq!(Charset::Special.remap('l'), '┌');
        assert_eq!(Charset::Special.remap('k'), '┐');
        assert_eq!(Charset::Special.remap('m'), '└');
        assert_eq!(Charset::Special.remap('j'), '┘');
    }
}
