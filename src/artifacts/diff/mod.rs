//! Diff algorithms over normalized documents
//!
//! This module implements the comparison pipeline:
//!
//! - `matcher`: generic longest-matching-block sequence matcher
//! - `line`: line-level diffing of two normalized documents
//! - `inline`: token-level diffing within an edited line pair
//! - `context`: context windowing with hunk headers
//!
//! Line diffing drives the other three: the matcher classifies line
//! ranges, similar replaced pairs are refined inline, and the result is
//! optionally reduced to hunks around the changes.

pub mod context;
pub mod inline;
pub mod line;
pub mod matcher;
