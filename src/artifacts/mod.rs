//! Core data structures and algorithms
//!
//! This module contains the document model and the comparison machinery:
//!
//! - `core`: shared utilities (pager wrapper)
//! - `error`: crate-wide error and result types
//! - `model`: normalized documents, diff lines, and configuration
//! - `normalize`: Markdown canonicalization pipeline
//! - `diff`: sequence matching, line/inline diffing, context windows

pub mod core;
pub mod diff;
pub mod error;
pub mod model;
pub mod normalize;
