//! Command implementations
//!
//! The CLI exposes a single diff operation; this module holds its
//! input loading, rendering dispatch, and pager plumbing.

pub mod diff;
