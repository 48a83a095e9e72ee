// wordfilter-core/src/engines/plain_text.rs
//! A `SubstitutionEngine` for plain text fields (inputs and textareas).
//!
//! Rules are applied one after another. Each rule scans the text as it stood
//! before that rule's own edits, then splices its matches left to right into
//! a working copy held as UTF-16 code units, so that offsets line up with the
//! cursor reported by the field. A running offset carries the length change of
//! every earlier splice of the same rule.
//!
//! After a match, scanning resumes one character past the match start rather
//! than past its end. A trigger that overlaps itself (`"a a"` in `"a a a"`)
//! can be matched more than once and the later splice lands partly on the
//! earlier replacement. This is kept as is; see the tests.
//!
//! License: MIT OR APACHE 2.0

use anyhow::Result;
use log::debug;

use crate::buffer::{utf16_len, EditBuffer, Utf16IndexMapper};
use crate::config::RuleSet;
use crate::engine::{Substitution, SubstitutionEngine};
use crate::patterns::compiler::{get_or_compile_rules, BoundaryMode, CompiledRule};
use crate::substitution_match::{log_substitution_debug, record_occurrences};

#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextEngine;

impl PlainTextEngine {
    pub fn new() -> Self {
        Self
    }
}

/// Byte spans of every trigger match in `text`, re-scanning from one
/// character after each match start.
fn scan_spans(rule: &CompiledRule, text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut pos = 0usize;
    while pos < text.len() {
        let Some(caps) = rule.regex.captures_at(text, pos) else { break; };
        let Some(span) = rule.trigger_span(&caps) else { break; };
        spans.push((span.start(), span.end()));
        let step = text[span.start()..].chars().next().map_or(1, char::len_utf8);
        pos = span.start() + step;
    }
    spans
}

/// Replaces `working[start..end]` with `replacement`, clamping the range.
fn splice(working: &mut Vec<u16>, start: isize, end: isize, replacement: &[u16]) {
    let len = working.len() as isize;
    let start = start.clamp(0, len);
    let end = end.clamp(start, len);
    working.splice(start as usize..end as usize, replacement.iter().copied());
}

impl SubstitutionEngine for PlainTextEngine {
    fn name(&self) -> &'static str {
        "[plain_text]"
    }

    fn boundary(&self) -> BoundaryMode {
        BoundaryMode::Permissive
    }

    fn substitute(&self, buffer: &EditBuffer, rules: &RuleSet) -> Result<Substitution> {
        if buffer.text.is_empty() || rules.is_empty() {
            return Ok(Substitution::unchanged(buffer));
        }

        let compiled = get_or_compile_rules(rules, self.boundary())?;
        let mut working: Vec<u16> = buffer.text.encode_utf16().collect();
        // A caret past the end behaves like one at the end.
        let mut cursor = isize::try_from(buffer.cursor.min(working.len())).unwrap_or(isize::MAX);
        let mut changed = false;
        let mut summary = Vec::new();

        for rule in &compiled.rules {
            let scan_text = String::from_utf16_lossy(&working);
            let spans = scan_spans(rule, &scan_text);
            if spans.is_empty() {
                continue;
            }

            working = scan_text.encode_utf16().collect();
            let mapper = Utf16IndexMapper::new(&scan_text);
            let replacement: Vec<u16> = rule.replacement.encode_utf16().collect();
            let replacement_len = replacement.len() as isize;
            // Cursor in the coordinates of `scan_text`.
            let rule_cursor = cursor;
            let mut offset = 0isize;

            for &(start_byte, end_byte) in &spans {
                let start = mapper.to_utf16(start_byte) as isize;
                let end = mapper.to_utf16(end_byte) as isize;
                let delta = replacement_len - (end - start);

                if rule_cursor >= start && rule_cursor <= end {
                    cursor = start + offset + replacement_len;
                } else if rule_cursor > end {
                    cursor = rule_cursor + offset + delta;
                }

                splice(&mut working, start + offset, end + offset, &replacement);
                offset += delta;
            }

            changed = true;
            log_substitution_debug(self.name(), &rule.trigger, &rule.replacement, spans.len());
            record_occurrences(&mut summary, &rule.trigger, &rule.replacement, spans.len());
        }

        if !changed {
            return Ok(Substitution::unchanged(buffer));
        }

        let text = String::from_utf16_lossy(&working);
        let len = utf16_len(&text) as isize;
        let cursor = cursor.clamp(0, len) as usize;
        debug!(
            "{} Pass complete. Length {} -> {}, cursor {} -> {}.",
            self.name(),
            buffer.len_utf16(),
            len,
            buffer.cursor,
            cursor
        );

        Ok(Substitution {
            buffer: EditBuffer { text, cursor },
            changed,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_REPLACEMENT;

    fn rules(pairs: &[(&str, &str)]) -> RuleSet {
        pairs.iter().copied().collect()
    }

    fn run(pairs: &[(&str, &str)], text: &str, cursor: usize) -> Substitution {
        PlainTextEngine::new()
            .substitute(&EditBuffer::new(text, cursor), &rules(pairs))
            .unwrap()
    }

    #[test]
    fn test_empty_rule_set_is_identity() {
        let out = run(&[], "anything at all", 4);
        assert_eq!(out.buffer, EditBuffer::new("anything at all", 4));
        assert!(!out.changed);
    }

    #[test]
    fn test_empty_text_is_identity() {
        let out = run(&[("bad", "nice")], "", 0);
        assert_eq!(out.buffer.text, "");
        assert!(!out.changed);
    }

    #[test]
    fn test_basic_replace_cursor_at_end() {
        let out = run(&[("bad", "nice")], "this is bad", 11);
        assert_eq!(out.buffer, EditBuffer::new("this is nice", 12));
        assert!(out.changed);
    }

    #[test]
    fn test_cursor_inside_match_is_pinned_after_replacement() {
        let out = run(&[("bad", "terrible")], "bad day", 2);
        assert_eq!(out.buffer, EditBuffer::new("terrible day", 8));
    }

    #[test]
    fn test_cursor_after_match_shifts_by_delta() {
        let out = run(&[("hi", "hello")], "hi there", 8);
        assert_eq!(out.buffer, EditBuffer::new("hello there", 11));
    }

    #[test]
    fn test_cursor_before_match_is_untouched() {
        let out = run(&[("bad", "wonderful")], "a bad one", 1);
        assert_eq!(out.buffer, EditBuffer::new("a wonderful one", 1));
    }

    #[test]
    fn test_cursor_at_match_start_is_pinned() {
        let out = run(&[("bad", "ok")], "so bad", 3);
        assert_eq!(out.buffer, EditBuffer::new("so ok", 5));
    }

    #[test]
    fn test_cursor_far_past_end_lands_at_end() {
        let out = run(&[("bad", "ok")], "so bad", usize::MAX);
        assert_eq!(out.buffer, EditBuffer::new("so ok", 5));
        let out = run(&[("bad", "terrible")], "bad, bad", 1000);
        assert_eq!(out.buffer, EditBuffer::new("terrible, terrible", 18));
    }

    #[test]
    fn test_whole_word_boundary() {
        let out = run(&[("cat", "dog")], "category", 8);
        assert!(!out.changed);
        assert_eq!(out.buffer.text, "category");
    }

    #[test]
    fn test_case_insensitive_with_rule_casing() {
        let out = run(&[("Bad", "Nice")], "this is BAD and bad", 0);
        assert_eq!(out.buffer.text, "this is Nice and Nice");
        assert_eq!(out.summary[0].occurrences, 2);
    }

    #[test]
    fn test_empty_replacement_uses_placeholder() {
        let set = RuleSet::from_store_value(Some(&serde_json::json!({ "secret": "" })));
        let out = PlainTextEngine::new()
            .substitute(&EditBuffer::at_end("my secret"), &set)
            .unwrap();
        assert_eq!(out.buffer.text, format!("my {}", DEFAULT_REPLACEMENT));
    }

    #[test]
    fn test_trailing_punctuation_trigger_before_space() {
        let out = run(&[("bad,", "fine,")], "so bad, really", 14);
        assert_eq!(out.buffer.text, "so fine, really");
        assert_eq!(out.buffer.cursor, 15);
    }

    #[test]
    fn test_multiple_matches_shift_cursor_cumulatively() {
        let out = run(&[("a", "xyz")], "a b a c", 7);
        assert_eq!(out.buffer.text, "xyz b xyz c");
        assert_eq!(out.buffer.cursor, 11);
    }

    #[test]
    fn test_later_rule_sees_earlier_replacements() {
        let out = run(&[("one", "two"), ("two", "three")], "one", 3);
        assert_eq!(out.buffer.text, "three");
        assert_eq!(out.buffer.cursor, 5);
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let set = rules(&[("bad", "nice"), ("hi", "hello"), ("cat", "kitty")]);
        let engine = PlainTextEngine::new();
        let first = engine
            .substitute(&EditBuffer::new("hi, the cat is bad. Bad cat!", 10), &set)
            .unwrap();
        assert!(first.changed);
        let second = engine.substitute(&first.buffer, &set).unwrap();
        assert!(!second.changed);
        assert_eq!(second.buffer, first.buffer);
    }

    #[test]
    fn test_cursor_beyond_text_is_clamped() {
        let out = run(&[("bad", "ok")], "bad", 50);
        assert_eq!(out.buffer, EditBuffer::new("ok", 2));
    }

    #[test]
    fn test_utf16_cursor_with_astral_chars() {
        // '😀' is two UTF-16 units; cursor 6 is the end of "😀 bad".
        let out = run(&[("bad", "good")], "😀 bad", 6);
        assert_eq!(out.buffer, EditBuffer::new("😀 good", 7));
    }

    #[test]
    fn test_self_overlapping_trigger_rescans_inside_match() {
        // "a a" matches at 0..3 and again at 2..5. Both are spliced; the
        // second lands on the tail of the first replacement.
        let out = run(&[("a a", "b")], "a a a", 5);
        assert_eq!(out.buffer, EditBuffer::new("b", 1));
        assert_eq!(out.summary[0].occurrences, 2);

        let out = run(&[("a a", "xyz")], "a a a", 0);
        assert_eq!(out.buffer, EditBuffer::new("xyxyz", 0));
    }
}
