// wordfilter-core/tests/engine_properties_tests.rs
//! Behavioural properties of both substitution engines, exercised through the
//! public API.

use anyhow::Result;
use test_log::test;

use wordfilter_core::{
    headless_filter_string, EditBuffer, HeadlessEngineType, PlainTextEngine, RichTextEngine, RuleSet,
    SubstitutionEngine, UpsertOutcome, DEFAULT_REPLACEMENT,
};

fn rules(pairs: &[(&str, &str)]) -> RuleSet {
    pairs.iter().copied().collect()
}

fn plain(rules: &RuleSet, text: &str, cursor: usize) -> Result<(String, usize, bool)> {
    let out = PlainTextEngine::new().substitute(&EditBuffer::new(text, cursor), rules)?;
    Ok((out.buffer.text, out.buffer.cursor, out.changed))
}

#[test]
fn empty_rule_set_is_identity_for_both_engines() -> Result<()> {
    let empty = RuleSet::new();
    let engines: [Box<dyn SubstitutionEngine>; 2] = [Box::new(PlainTextEngine::new()), Box::new(RichTextEngine::new())];
    for engine in &engines {
        for (text, cursor) in [("", 0), ("anything at all", 3), ("😀 x", 2)] {
            let out = engine.substitute(&EditBuffer::new(text, cursor), &empty)?;
            assert_eq!(out.buffer, EditBuffer::new(text, cursor), "engine {}", engine.name());
            assert!(!out.changed);
        }
    }
    Ok(())
}

#[test]
fn whole_word_boundary_rejects_longer_words() -> Result<()> {
    let cat = rules(&[("cat", "dog")]);
    assert_eq!(plain(&cat, "category", 8)?, ("category".to_string(), 8, false));
    let rich = headless_filter_string(&cat, "category", None, HeadlessEngineType::RichText)?;
    assert!(!rich.changed);
    Ok(())
}

#[test]
fn basic_replace_with_cursor_at_end() -> Result<()> {
    let bad = rules(&[("bad", "nice")]);
    assert_eq!(plain(&bad, "this is bad", 11)?, ("this is nice".to_string(), 12, true));
    Ok(())
}

#[test]
fn cursor_inside_match_is_pinned_after_replacement() -> Result<()> {
    let bad = rules(&[("bad", "terrible")]);
    assert_eq!(plain(&bad, "bad day", 2)?, ("terrible day".to_string(), 8, true));
    Ok(())
}

#[test]
fn cursor_after_match_shifts_by_delta() -> Result<()> {
    let hi = rules(&[("hi", "hello")]);
    assert_eq!(plain(&hi, "hi there", 8)?, ("hello there".to_string(), 11, true));
    Ok(())
}

#[test]
fn matching_is_case_insensitive_and_uses_rule_casing() -> Result<()> {
    let bad = rules(&[("Bad", "Nice")]);
    assert_eq!(plain(&bad, "this is BAD", 11)?.0, "this is Nice");
    assert_eq!(plain(&bad, "bad", 3)?.0, "Nice");
    let rich = headless_filter_string(&bad, "BAD and bad", None, HeadlessEngineType::RichText)?;
    assert_eq!(rich.buffer.text, "Nice and Nice");
    Ok(())
}

#[test]
fn empty_replacement_substitutes_placeholder() -> Result<()> {
    let mut secret = RuleSet::new();
    secret.upsert("secret", "");
    let (text, cursor, changed) = plain(&secret, "my secret", 9)?;
    assert_eq!(text, format!("my {}", DEFAULT_REPLACEMENT));
    assert_eq!(cursor, 3 + DEFAULT_REPLACEMENT.len());
    assert!(changed);
    Ok(())
}

#[test]
fn engine_is_idempotent_on_its_own_output() -> Result<()> {
    let shipped = rules(&[("bad", "nice"), ("terrible", "great"), ("hate", "dislike")]);
    let (once, cursor, changed) = plain(&shipped, "I hate this terrible, bad day", 29)?;
    assert!(changed);
    assert_eq!(once, "I dislike this great, nice day");
    assert_eq!(plain(&shipped, &once, cursor)?, (once.clone(), cursor, false));

    let rich_once = headless_filter_string(&shipped, "I hate this terrible day", None, HeadlessEngineType::RichText)?;
    let rich_twice = headless_filter_string(&shipped, &rich_once.buffer.text, None, HeadlessEngineType::RichText)?;
    assert!(!rich_twice.changed);
    Ok(())
}

#[test]
fn upsert_overwrites_case_insensitively() {
    let mut set = RuleSet::new();
    assert_eq!(set.upsert("Bad", "x"), UpsertOutcome::Added);
    assert_eq!(set.upsert("bad", "y"), UpsertOutcome::Updated("Bad".to_string()));
    assert_eq!(set.len(), 1);
    let rule = set.get("Bad").expect("stored under original casing");
    assert_eq!(rule.replacement, "y");
}

#[test]
fn cursor_beyond_text_is_clamped() -> Result<()> {
    let bad = rules(&[("bad", "ok")]);
    assert_eq!(plain(&bad, "bad", 50)?, ("ok".to_string(), 2, true));
    let rich = headless_filter_string(&bad, "bad", Some(50), HeadlessEngineType::RichText)?;
    assert_eq!(rich.buffer.cursor, 2);
    Ok(())
}

#[test]
fn later_rules_see_earlier_replacements() -> Result<()> {
    let chained = rules(&[("one", "two"), ("two", "three")]);
    assert_eq!(plain(&chained, "one", 3)?.0, "three");
    let reversed = rules(&[("two", "three"), ("one", "two")]);
    assert_eq!(plain(&reversed, "one", 3)?.0, "two");
    Ok(())
}

#[test]
fn overlapping_rescan_quirk_is_preserved() -> Result<()> {
    // The re-scan resumes one character into each match, so a trigger that
    // overlaps itself is found twice and spliced twice.
    let overlap = rules(&[("a a", "b")]);
    let out = PlainTextEngine::new().substitute(&EditBuffer::new("a a a", 5), &overlap)?;
    assert_eq!(out.buffer, EditBuffer::new("b", 1));
    assert_eq!(out.summary[0].occurrences, 2);
    Ok(())
}

#[test]
fn cursor_offsets_are_utf16_units() -> Result<()> {
    let good = rules(&[("good", "great")]);
    // "😀" is two UTF-16 units, so "😀 good" has length 7.
    assert_eq!(plain(&good, "😀 good", 7)?, ("😀 great".to_string(), 8, true));
    assert_eq!(plain(&good, "good 😀", 0)?, ("great 😀".to_string(), 5, true));
    Ok(())
}

#[test]
fn snapshot_is_unaffected_by_later_edits() -> Result<()> {
    let mut live = rules(&[("bad", "nice")]);
    let snapshot = live.snapshot();
    live.upsert("bad", "awful");
    live.upsert("day", "night");
    assert_eq!(plain(&snapshot, "bad day", 7)?.0, "nice day");
    assert_eq!(plain(&live, "bad day", 7)?.0, "awful night");
    Ok(())
}

#[test]
fn long_trigger_is_stored_and_replaced() -> Result<()> {
    let long = "very".repeat(126);
    let mut set = RuleSet::new();
    assert_eq!(set.upsert(&long, "short"), UpsertOutcome::Added);

    let text = format!("say {} now", long);
    let (out, cursor, changed) = plain(&set, &text, text.len())?;
    assert_eq!(out, "say short now");
    assert_eq!(cursor, 13);
    assert!(changed);
    Ok(())
}
