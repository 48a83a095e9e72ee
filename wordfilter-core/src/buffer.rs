// wordfilter-core/src/buffer.rs
//! The `EditBuffer` type and UTF-16 offset helpers.
//!
//! Cursor offsets handed over by an input field count UTF-16 code units, while
//! Rust strings and regex matches speak UTF-8 byte offsets. `Utf16IndexMapper`
//! translates between the two for one fixed string.
//!
//! License: MIT OR APACHE 2.0

use serde::{Deserialize, Serialize};

/// A text value plus a cursor offset, the unit the engines operate on.
///
/// `cursor` is a UTF-16 code unit index. Engines tolerate an out-of-range
/// cursor on input and always return one within `0..=utf16_len(text)`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EditBuffer {
    pub text: String,
    pub cursor: usize,
}

impl EditBuffer {
    pub fn new(text: impl Into<String>, cursor: usize) -> Self {
        Self {
            text: text.into(),
            cursor,
        }
    }

    /// A buffer with the cursor placed after the last character.
    pub fn at_end(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = utf16_len(&text);
        Self { text, cursor }
    }

    /// Length of the text in UTF-16 code units.
    pub fn len_utf16(&self) -> usize {
        utf16_len(&self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Length of `s` in UTF-16 code units.
pub fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

/// Maps byte indices of a string to UTF-16 code unit indices.
#[derive(Debug)]
pub struct Utf16IndexMapper {
    /// `map[b]` is the UTF-16 offset of byte `b`. Bytes inside a multi-byte
    /// character map to the offset of that character's start.
    map: Vec<usize>,
}

impl Utf16IndexMapper {
    pub fn new(text: &str) -> Self {
        let mut map = Vec::with_capacity(text.len() + 1);
        let mut units = 0usize;
        for ch in text.chars() {
            for _ in 0..ch.len_utf8() {
                map.push(units);
            }
            units += ch.len_utf16();
        }
        map.push(units);
        Self { map }
    }

    pub fn to_utf16(&self, byte_index: usize) -> usize {
        let idx = byte_index.min(self.map.len().saturating_sub(1));
        self.map[idx]
    }

    /// Total UTF-16 length of the mapped string.
    pub fn utf16_len(&self) -> usize {
        self.map.last().copied().unwrap_or(0)
    }
}
