//! ESC/POS command builder
//!
//! Provides a fluent API for building ESC/POS byte sequences. The device
//! session builds one small sequence per printer call and writes it out
//! immediately.

use crate::encoding::{CODE_PAGE_WPC1252, encode_text};

/// Upside-down printing on (`ESC { '1'`)
pub const UPSIDE_DOWN_ON: &[u8] = b"\x1B{1";
/// Upside-down printing off (`ESC { '2'`)
pub const UPSIDE_DOWN_OFF: &[u8] = b"\x1B{2";
/// Smoothing on (`GS b 1`)
pub const SMOOTHING_ON: &[u8] = &[0x1D, b'b', 0x01];
/// Smoothing off (`GS b 2`)
pub const SMOOTHING_OFF: &[u8] = &[0x1D, b'b', 0x02];

/// Largest magnification step accepted by `GS !` (8x)
const MAX_TEXT_SIZE: u8 = 7;

/// ESC/POS command builder
///
/// Text is converted to windows-1252 as it is appended, so the buffer is
/// always ready to be written to the device.
#[derive(Debug, Default)]
pub struct EscPosBuilder {
    buf: Vec<u8>,
}

impl EscPosBuilder {
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(64),
        }
    }

    // === Setup ===

    /// Initialize printer (`ESC @`) and select the WPC1252 code page
    pub fn init(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x40]);
        self.buf.extend_from_slice(&[0x1B, 0x74, CODE_PAGE_WPC1252]);
        self
    }

    // === Text Output ===

    /// Write text without a trailing newline
    pub fn text(&mut self, s: &str) -> &mut Self {
        self.buf.extend_from_slice(&encode_text(s));
        self
    }

    /// Write text followed by newline
    pub fn line(&mut self, s: &str) -> &mut Self {
        self.text(s);
        self.buf.push(b'\n');
        self
    }

    /// Print and feed n lines (`ESC d n`)
    pub fn feed(&mut self, lines: u8) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x64, lines]);
        self
    }

    // === Alignment ===

    /// Align text to left (default)
    pub fn left(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x61, 0x00]);
        self
    }

    /// Align text to center
    pub fn center(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x61, 0x01]);
        self
    }

    /// Align text to right
    pub fn right(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x61, 0x02]);
        self
    }

    // === Text Style ===

    /// Character magnification (`GS ! n`)
    ///
    /// `width` and `height` are magnification steps: 0 is normal size,
    /// 7 is eight times. Larger values are clamped.
    pub fn text_size(&mut self, width: u8, height: u8) -> &mut Self {
        let w = width.min(MAX_TEXT_SIZE);
        let h = height.min(MAX_TEXT_SIZE);
        self.buf.extend_from_slice(&[0x1D, 0x21, (w << 4) | h]);
        self
    }

    // === Paper Control ===

    /// Full cut after feeding n lines (`GS V 66 n`)
    pub fn cut_feed(&mut self, lines: u8) -> &mut Self {
        self.buf.extend_from_slice(&[0x1D, 0x56, 0x42, lines]);
        self
    }

    // === Raw Commands ===

    /// Write raw bytes directly
    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    // === Build ===

    /// Take the accumulated bytes
    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_selects_code_page() {
        let mut b = EscPosBuilder::new();
        b.init();
        assert_eq!(b.build(), vec![0x1B, 0x40, 0x1B, 0x74, 16]);
    }

    #[test]
    fn test_text_size_is_clamped() {
        let mut b = EscPosBuilder::new();
        b.text_size(1, 1).text_size(9, 0);
        assert_eq!(b.build(), vec![0x1D, 0x21, 0x11, 0x1D, 0x21, 0x70]);
    }

    #[test]
    fn test_line_and_cut() {
        let mut b = EscPosBuilder::new();
        b.center().line("Hi").left().cut_feed(2);

        let data = b.build();
        assert_eq!(
            data,
            vec![
                0x1B, 0x61, 0x01, b'H', b'i', b'\n', 0x1B, 0x61, 0x00, 0x1D, 0x56, 0x42, 2
            ]
        );
    }

    #[test]
    fn test_orientation_sequences() {
        assert_eq!(UPSIDE_DOWN_ON, &[0x1B, b'{', b'1']);
        assert_eq!(UPSIDE_DOWN_OFF, &[0x1B, b'{', b'2']);
    }
}
