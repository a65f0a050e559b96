//! CSI parameter accumulation
//!
//! Parameters are semicolon-separated decimal numbers; each parameter may
//! carry colon-separated subparameters (used by SGR extended colors such as
//! `38:2::r:g:b` and underline styles `4:3`). A missing or empty parameter
//! reads as 0, and callers supply per-command defaults.

/// Parameters beyond this count are dropped.
const MAX_PARAMS: usize = 32;

/// A single parameter with its subparameters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Param {
    pub value: u16,
    pub sub: Vec<u16>,
}

impl Param {
    pub fn new(value: u16) -> Self {
        Self { value, sub: Vec::new() }
    }
}

/// An accumulated CSI (or DCS) parameter list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    params: Vec<Param>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a parameter list from plain values (test helper).
    pub fn from_values(values: &[u16]) -> Self {
        Self {
            params: values.iter().copied().map(Param::new).collect(),
        }
    }

    /// Parse the raw byte run collected between the introducer and the
    /// final byte. Digits accumulate with saturation; other bytes are
    /// ignored (intermediates are collected separately by the parser).
    pub fn parse(bytes: &[u8]) -> Self {
        let mut params: Vec<Param> = Vec::new();
        let mut current = Param::default();
        let mut acc: u16 = 0;
        let mut in_sub = false;

        fn close_value(current: &mut Param, acc: u16, in_sub: bool) {
            if in_sub {
                current.sub.push(acc);
            } else {
                current.value = acc;
            }
        }

        for &byte in bytes {
            match byte {
                b'0'..=b'9' => {
                    acc = acc.saturating_mul(10).saturating_add(u16::from(byte - b'0'));
                }
                b';' => {
                    close_value(&mut current, acc, in_sub);
                    if params.len() < MAX_PARAMS {
                        params.push(std::mem::take(&mut current));
                    }
                    acc = 0;
                    in_sub = false;
                }
                b':' => {
                    close_value(&mut current, acc, in_sub);
                    acc = 0;
                    in_sub = true;
                }
                _ => {}
            }
        }

        if !bytes.is_empty() {
            close_value(&mut current, acc, in_sub);
            if params.len() < MAX_PARAMS {
                params.push(current);
            }
        }

        Self { params }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Raw value at `index`; 0 when absent.
    pub fn raw(&self, index: usize) -> u16 {
        self.params.get(index).map(|p| p.value).unwrap_or(0)
    }

    /// Value at `index`, treating 0 (unspecified) as absent.
    pub fn get(&self, index: usize) -> Option<u16> {
        self.params.get(index).map(|p| p.value).filter(|&v| v != 0)
    }

    /// Value at `index`, with 0 and absent both replaced by `default`.
    pub fn get_or(&self, index: usize, default: u16) -> u16 {
        self.get(index).unwrap_or(default)
    }

    /// Subparameters of the parameter at `index`.
    pub fn sub(&self, index: usize) -> &[u16] {
        self.params.get(index).map(|p| p.sub.as_slice()).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.params.iter()
    }

    /// Iterate over the plain values, ignoring subparameters.
    pub fn values(&self) -> impl Iterator<Item = u16> + '_ {
        self.params.iter().map(|p| p.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input() {
        assert!(Params::parse(b"").is_empty());
    }

    #[test]
    fn single_value() {
        let params = Params::parse(b"42");
        assert_eq!(params.len(), 1);
        assert_eq!(params.get(0), Some(42));
    }

    #[test]
    fn multiple_values() {
        let params = Params::parse(b"1;2;3");
        let values: Vec<_> = params.values().collect();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn empty_positions_read_as_zero() {
        let params = Params::parse(b";5;");
        assert_eq!(params.len(), 3);
        assert_eq!(params.get(0), None);
        assert_eq!(params.get(1), Some(5));
        assert_eq!(params.get(2), None);
        assert_eq!(params.get_or(0, 1), 1);
        assert_eq!(params.raw(0), 0);
    }

    #[test]
    fn saturating_accumulation() {
        let params = Params::parse(b"99999");
        assert_eq!(params.get(0), Some(u16::MAX));
    }

    #[test]
    fn colon_subparameters() {
        // SGR true color with an empty colorspace id: 38:2::255:128:64
        let params = Params::parse(b"38:2::255:128:64");
        assert_eq!(params.len(), 1);
        assert_eq!(params.raw(0), 38);
        assert_eq!(params.sub(0), &[2, 0, 255, 128, 64]);
    }

    #[test]
    fn subparameters_and_following_params() {
        let params = Params::parse(b"4:3;58:5:99;1");
        assert_eq!(params.len(), 3);
        assert_eq!(params.raw(0), 4);
        assert_eq!(params.sub(0), &[3]);
        assert_eq!(params.raw(1), 58);
        assert_eq!(params.sub(1), &[5, 99]);
        assert_eq!(params.raw(2), 1);
        assert!(params.sub(2).is_empty());
    }

    #[test]
    fn parameter_count_is_bounded() {
        let input = "1;".repeat(100);
        let params = Params::parse(input.as_bytes());
        assert_eq!(params.len(), 32);
    }
}
