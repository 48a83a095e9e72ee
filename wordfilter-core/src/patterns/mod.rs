//! Pattern construction for rule triggers.
//!
//! Triggers are literal words or phrases. This module turns them into
//! case-insensitive whole-word regular expressions, in one of two boundary
//! flavours, and caches the compiled result per rule set.

pub mod compiler;
