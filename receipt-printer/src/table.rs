//! Key/value tables
//!
//! Each row prints as `key: value` with the value right-aligned to the
//! printer's line width.

use std::fmt::Display;

use crate::encoding::{pad_left, text_width};

/// Renders key/value rows for a fixed line width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRenderer {
    width: usize,
    padding: usize,
}

impl TableRenderer {
    /// `padding` spaces indent each row and are also kept free on the right
    pub fn new(width: usize, padding: usize) -> Self {
        Self { width, padding }
    }

    /// Format one row
    ///
    /// A value wider than its field is printed as-is and overflows the line.
    pub fn row(&self, key: &dyn Display, value: &dyn Display) -> String {
        let key = key.to_string();
        let value = value.to_string();
        let field = self
            .width
            .saturating_sub(text_width(&key) + 2 + 2 * self.padding);

        format!(
            "{}{}: {}",
            " ".repeat(self.padding),
            key,
            pad_left(&value, field)
        )
    }

    pub fn render<K: Display, V: Display>(&self, rows: &[(K, V)]) -> Vec<String> {
        rows.iter().map(|(k, v)| self.row(k, v)).collect()
    }
}
