//! Code page utilities for receipt printers
//!
//! Epson-compatible printers print single-byte code pages. The session
//! selects WPC1252 on init, so text is converted from UTF-8 to windows-1252
//! before it is written to the device.

use tracing::instrument;

/// ESC/POS code page number for WPC1252 (used with `ESC t n`)
pub const CODE_PAGE_WPC1252: u8 = 16;

/// Printed width of a string in columns
///
/// Every character occupies one column on a single-byte code page,
/// unmappable ones included (they print as `?`).
pub fn text_width(s: &str) -> usize {
    s.chars().count()
}

/// Right-align `s` in a field of `width` columns
///
/// A field narrower than the text leaves it unpadded.
pub fn pad_left(s: &str, width: usize) -> String {
    let current = text_width(s);
    if current >= width {
        return s.to_string();
    }
    format!("{}{}", " ".repeat(width - current), s)
}

/// Convert UTF-8 text to windows-1252
///
/// Characters the code page cannot represent are replaced with `?` rather
/// than the numeric character references `encoding_rs` would emit.
#[instrument(skip(s), fields(len = s.len()))]
pub fn encode_text(s: &str) -> Vec<u8> {
    if s.is_ascii() {
        return s.as_bytes().to_vec();
    }

    let mut result = Vec::with_capacity(s.len());
    let mut buf = [0u8; 4];
    for c in s.chars() {
        let (cow, _, had_errors) = encoding_rs::WINDOWS_1252.encode(c.encode_utf8(&mut buf));
        if had_errors {
            result.push(b'?');
        } else {
            result.extend_from_slice(&cow);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passthrough() {
        assert_eq!(encode_text("Total: 12"), b"Total: 12".to_vec());
    }

    #[test]
    fn test_latin1_characters() {
        // é = 0xE9, € = 0x80 in windows-1252
        assert_eq!(encode_text("é€"), vec![0xE9, 0x80]);
    }

    #[test]
    fn test_unmappable_becomes_question_mark() {
        assert_eq!(encode_text("a中b"), b"a?b".to_vec());
    }

    #[test]
    fn test_pad_left() {
        assert_eq!(pad_left("1", 4), "   1");
        assert_eq!(pad_left("12345", 3), "12345");
        assert_eq!(text_width("héllo"), 5);
    }
}
