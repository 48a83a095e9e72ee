//! compiler.rs - Compiles rule triggers into whole-word patterns and caches them.
//!
//! Every keystroke runs an engine over the current rule set, and the rule set
//! only changes when the store does. Compiled patterns therefore live in a
//! global, shared cache keyed by a hash of the rules and the boundary mode.
//! A hit is only used when the cached rules equal the requested ones, so a
//! hash collision costs a recompile rather than the wrong patterns.
//!
//! License: MIT OR APACHE 2.0

use anyhow::Result;
use lazy_static::lazy_static;
use log::{debug, warn};
use regex::{Captures, Match, Regex, RegexBuilder};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, PoisonError, RwLock};

use crate::config::RuleSet;
use crate::errors::WordFilterError;
use crate::validators::{check_trigger, TriggerCheck};

/// Upper bound on cached compilations before the cache is flushed.
const MAX_CACHED_RULE_SETS: usize = 64;

/// Triggers longer than this (in characters) still compile, with a warning.
const LONG_TRIGGER_WARN_CHARS: usize = 500;

/// How the edges of a trigger are constrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryMode {
    /// Word boundary on the left; word boundary, whitespace or end of text on
    /// the right. Lets a trigger ending in punctuation match before a space.
    Permissive,
    /// Word boundary on both sides.
    Strict,
}

/// A single trigger compiled for matching.
#[derive(Debug)]
pub struct CompiledRule {
    /// Pattern whose first capture group spans exactly the trigger.
    pub regex: Regex,
    /// The stored trigger, casing preserved.
    pub trigger: String,
    /// The replacement to splice in, already defaulted.
    pub replacement: String,
}

impl CompiledRule {
    /// The trigger's span within a set of captures. The right-hand boundary
    /// alternative may consume a whitespace character, which is not part of
    /// the span.
    pub fn trigger_span<'h>(&self, caps: &Captures<'h>) -> Option<Match<'h>> {
        caps.get(1)
    }
}

/// All compiled rules of one rule set, in the set's iteration order.
#[derive(Debug)]
pub struct CompiledRules {
    pub rules: Vec<CompiledRule>,
    pub boundary: BoundaryMode,
}

/// A cached compilation and the rules it was built from.
struct CacheEntry {
    rules: RuleSet,
    compiled: Arc<CompiledRules>,
}

impl CacheEntry {
    /// Order matters to the engines, so the comparison is positional.
    fn is_for(&self, rules: &RuleSet, boundary: BoundaryMode) -> bool {
        self.compiled.boundary == boundary
            && self.rules.len() == rules.len()
            && self.rules.iter().eq(rules.iter())
    }
}

lazy_static! {
    static ref COMPILED_RULES_CACHE: RwLock<HashMap<u64, CacheEntry>> = RwLock::new(HashMap::new());
}

/// Builds the pattern source for a trigger.
pub fn build_pattern(trigger: &str, boundary: BoundaryMode) -> String {
    let escaped = regex::escape(trigger);
    match boundary {
        BoundaryMode::Permissive => format!(r"\b({})(?:\b|\s|$)", escaped),
        BoundaryMode::Strict => format!(r"\b({})\b", escaped),
    }
}

fn cache_key(rules: &RuleSet, boundary: BoundaryMode) -> u64 {
    let mut hasher = DefaultHasher::new();
    rules.hash(&mut hasher);
    boundary.hash(&mut hasher);
    hasher.finish()
}

/// Compiles every rule of `rules` for the given boundary mode.
///
/// Rules with a blank trigger are skipped. A pattern that fails to build is
/// collected and reported together with any others.
pub fn compile_rules(rules: &RuleSet, boundary: BoundaryMode) -> Result<CompiledRules, WordFilterError> {
    debug!("Starting compilation of {} rules ({:?}).", rules.len(), boundary);

    let mut compiled_rules = Vec::with_capacity(rules.len());
    let mut compilation_errors = Vec::new();

    for rule in rules.iter() {
        if check_trigger(&rule.trigger) == TriggerCheck::Blank {
            continue;
        }
        let trigger_chars = rule.trigger.chars().count();
        if trigger_chars > LONG_TRIGGER_WARN_CHARS {
            warn!(
                "Trigger '{}' is {} characters long; compiling it anyway.",
                crate::substitution_match::loggable(&rule.trigger),
                trigger_chars
            );
        }

        let pattern = build_pattern(&rule.trigger, boundary);
        let regex_result = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .size_limit(10 * (1 << 20))
            .build();

        match regex_result {
            Ok(regex) => {
                log::debug!(
                    target: "wordfilter_core::compiler",
                    "Compiled pattern for trigger of {} chars.",
                    trigger_chars
                );
                compiled_rules.push(CompiledRule {
                    regex,
                    trigger: rule.trigger.clone(),
                    replacement: rule.effective_replacement().to_string(),
                });
            }
            Err(e) => {
                compilation_errors.push(WordFilterError::RuleCompilationError(
                    crate::substitution_match::loggable(&rule.trigger),
                    e,
                ));
            }
        }
    }

    if !compilation_errors.is_empty() {
        let error_message = compilation_errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<String>>()
            .join("\n");
        return Err(WordFilterError::Fatal(format!(
            "Failed to compile {} rule(s):\n{}",
            compilation_errors.len(),
            error_message
        )));
    }

    debug!("Finished compiling rules. Total compiled: {}.", compiled_rules.len());
    Ok(CompiledRules {
        rules: compiled_rules,
        boundary,
    })
}

/// Returns the compiled form of `rules`, compiling and caching it on a miss.
pub fn get_or_compile_rules(rules: &RuleSet, boundary: BoundaryMode) -> Result<Arc<CompiledRules>> {
    get_or_compile_keyed(cache_key(rules, boundary), rules, boundary)
}

fn get_or_compile_keyed(key: u64, rules: &RuleSet, boundary: BoundaryMode) -> Result<Arc<CompiledRules>> {
    {
        let cache = COMPILED_RULES_CACHE.read().unwrap_or_else(PoisonError::into_inner);
        match cache.get(&key) {
            Some(entry) if entry.is_for(rules, boundary) => return Ok(Arc::clone(&entry.compiled)),
            Some(_) => debug!("Cache key {} collides with different rules; recompiling.", key),
            None => debug!("Compiled rules not found in cache for key {}. Compiling now.", key),
        }
    }

    let compiled = Arc::new(compile_rules(rules, boundary)?);

    let mut cache = COMPILED_RULES_CACHE.write().unwrap_or_else(PoisonError::into_inner);
    if cache.len() >= MAX_CACHED_RULE_SETS {
        debug!("Compiled rules cache full ({} entries); flushing.", cache.len());
        cache.clear();
    }
    cache.insert(
        key,
        CacheEntry {
            rules: rules.snapshot(),
            compiled: Arc::clone(&compiled),
        },
    );
    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_one(trigger: &str, boundary: BoundaryMode) -> CompiledRule {
        let rules: RuleSet = [(trigger, "x")].into_iter().collect();
        compile_rules(&rules, boundary).unwrap().rules.remove(0)
    }

    #[test]
    fn test_whole_word_only() {
        let rule = compile_one("cat", BoundaryMode::Strict);
        assert!(!rule.regex.is_match("category"));
        assert!(!rule.regex.is_match("bobcat"));
        assert!(rule.regex.is_match("a cat."));
    }

    #[test]
    fn test_case_insensitive() {
        let rule = compile_one("Bad", BoundaryMode::Permissive);
        assert!(rule.regex.is_match("this is BAD"));
        assert!(rule.regex.is_match("bad"));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let rule = compile_one("a.b", BoundaryMode::Strict);
        assert!(rule.regex.is_match("x a.b y"));
        assert!(!rule.regex.is_match("x axb y"));
    }

    #[test]
    fn test_permissive_right_edge_excludes_whitespace_from_span() {
        let rule = compile_one("bad,", BoundaryMode::Permissive);
        let caps = rule.regex.captures("so bad, really").unwrap();
        assert_eq!(rule.trigger_span(&caps).unwrap().as_str(), "bad,");

        let strict = compile_one("bad,", BoundaryMode::Strict);
        assert!(!strict.regex.is_match("so bad, really"));
    }

    #[test]
    fn test_blank_triggers_are_skipped() {
        let rules = RuleSet::from_store_value(Some(&serde_json::json!({ "ok": "fine" })));
        let compiled = compile_rules(&rules, BoundaryMode::Strict).unwrap();
        assert_eq!(compiled.rules.len(), 1);
        assert_eq!(compiled.rules[0].replacement, "fine");
    }

    #[test]
    fn test_cache_returns_shared_instance() {
        let rules: RuleSet = [("cache-probe", "x")].into_iter().collect();
        let a = get_or_compile_rules(&rules, BoundaryMode::Permissive).unwrap();
        let b = get_or_compile_rules(&rules.snapshot(), BoundaryMode::Permissive).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        let c = get_or_compile_rules(&rules, BoundaryMode::Strict).unwrap();
        assert_eq!(c.boundary, BoundaryMode::Strict);
    }

    #[test]
    fn test_colliding_cache_key_does_not_return_other_rules() {
        let key = 0x5eed_c011_1de0_0001;
        let first: RuleSet = [("alpha-collide", "one")].into_iter().collect();
        let second: RuleSet = [("beta-collide", "two")].into_iter().collect();

        let a = get_or_compile_keyed(key, &first, BoundaryMode::Strict).unwrap();
        let b = get_or_compile_keyed(key, &second, BoundaryMode::Strict).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(b.rules[0].trigger, "beta-collide");

        let reordered: RuleSet = [("y", "2"), ("x", "1")].into_iter().collect();
        let ordered: RuleSet = [("x", "1"), ("y", "2")].into_iter().collect();
        let c = get_or_compile_keyed(key, &ordered, BoundaryMode::Strict).unwrap();
        let d = get_or_compile_keyed(key, &reordered, BoundaryMode::Strict).unwrap();
        assert_eq!(c.rules[0].trigger, "x");
        assert_eq!(d.rules[0].trigger, "y");
    }

    #[test]
    fn test_long_trigger_compiles_and_matches() {
        let long = "z".repeat(LONG_TRIGGER_WARN_CHARS + 1);
        let rule = compile_one(&long, BoundaryMode::Permissive);
        assert!(rule.regex.is_match(&format!("say {} now", long)));
    }
}
