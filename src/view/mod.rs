//! View layer
//!
//! Scroll arithmetic and the set of lines materialized for rendering.

pub mod viewport;
