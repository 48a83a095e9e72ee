// wordfilter-core/src/engines/mod.rs
//! Concrete `SubstitutionEngine` implementations.
//!
//! * `plain_text` - input/textarea model with exact cursor bookkeeping.
//! * `rich_text` - content-editable model with best-effort cursor placement.
//!
//! License: MIT OR APACHE 2.0

pub mod plain_text;
pub mod rich_text;
