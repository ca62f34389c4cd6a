//! Low-level primitives
//!
//! Syntax highlighting bridge and the highlighted-content cache.

pub mod highlighter;
