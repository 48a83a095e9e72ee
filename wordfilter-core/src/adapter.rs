// wordfilter-core/src/adapter.rs
//! Buffer adapter seams between the engines and a live editable element.
//!
//! An adapter reads the element's text and cursor, writes results back, and
//! re-emits a generic "content changed" notification after every write so
//! other listeners observe the edit. An adapter must not route its own
//! notification back into the filter that caused it.
//!
//! `MemoryTextField` and `MemoryRichText` are in-memory elements for hosts
//! without a DOM and for tests.
//!
//! License: MIT OR APACHE 2.0

use anyhow::Result;
use thiserror::Error;

use crate::buffer::{utf16_len, EditBuffer};

/// A plain input or textarea with a native selection API.
pub trait TextFieldAdapter {
    /// Current value and caret position.
    fn read(&self) -> EditBuffer;

    /// Replaces the value and places the caret.
    fn apply(&mut self, buffer: &EditBuffer);

    /// Fires the element's "content changed" notification.
    fn notify_changed(&mut self);
}

/// A free-form rich-text container.
pub trait RichTextAdapter {
    /// Full text content plus an approximate caret offset taken from the
    /// active selection.
    fn read(&self) -> EditBuffer;

    /// Replaces the whole text content.
    fn set_text(&mut self, text: &str);

    /// Fires the element's "content changed" notification.
    fn notify_changed(&mut self);

    /// Places the caret at `offset` within the first text node.
    /// Failure is expected for some content shapes and is never retried.
    fn restore_cursor(&mut self, offset: usize) -> Result<()>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CursorRestoreError {
    #[error("container has no text node to place the cursor in")]
    NoTextNode,
}

/// In-memory text field.
#[derive(Debug, Clone, Default)]
pub struct MemoryTextField {
    pub buffer: EditBuffer,
    /// Number of change notifications emitted.
    pub change_events: usize,
}

impl MemoryTextField {
    pub fn new(buffer: EditBuffer) -> Self {
        Self {
            buffer,
            change_events: 0,
        }
    }

    /// Simulates the user typing `s` at the caret.
    pub fn type_str(&mut self, s: &str) {
        let units: Vec<u16> = self.buffer.text.encode_utf16().collect();
        let at = self.buffer.cursor.min(units.len());
        let mut next: Vec<u16> = units[..at].to_vec();
        next.extend(s.encode_utf16());
        next.extend_from_slice(&units[at..]);
        self.buffer = EditBuffer::new(String::from_utf16_lossy(&next), at + utf16_len(s));
    }
}

impl TextFieldAdapter for MemoryTextField {
    fn read(&self) -> EditBuffer {
        self.buffer.clone()
    }

    fn apply(&mut self, buffer: &EditBuffer) {
        self.buffer = buffer.clone();
    }

    fn notify_changed(&mut self) {
        self.change_events += 1;
    }
}

/// In-memory rich-text container made of text nodes.
///
/// The caret offset is relative to the node it sits in, which is why the
/// offset reported by `read` is only approximate once there are several nodes.
#[derive(Debug, Clone, Default)]
pub struct MemoryRichText {
    pub nodes: Vec<String>,
    pub cursor: usize,
    pub change_events: usize,
}

impl MemoryRichText {
    pub fn new<I, S>(nodes: I, cursor: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            nodes: nodes.into_iter().map(Into::into).collect(),
            cursor,
            change_events: 0,
        }
    }

    pub fn text(&self) -> String {
        self.nodes.concat()
    }
}

impl RichTextAdapter for MemoryRichText {
    fn read(&self) -> EditBuffer {
        EditBuffer::new(self.text(), self.cursor)
    }

    /// Setting text content collapses the container into one text node, or
    /// none when the text is empty.
    fn set_text(&mut self, text: &str) {
        self.nodes.clear();
        if !text.is_empty() {
            self.nodes.push(text.to_string());
        }
    }

    fn notify_changed(&mut self) {
        self.change_events += 1;
    }

    fn restore_cursor(&mut self, offset: usize) -> Result<()> {
        let first = self.nodes.first().ok_or(CursorRestoreError::NoTextNode)?;
        self.cursor = offset.min(utf16_len(first));
        Ok(())
    }
}
