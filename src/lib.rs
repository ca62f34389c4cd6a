//! Editable text core for a code editor.
//!
//! A piece table over an immutable set of original chunks plus one
//! append-only added buffer, with line indexing, a cursor and selection
//! model, a viewport window that materializes lines incrementally, and an
//! edit coalescer that turns bursts of keystrokes into single commits.
//!
//! [`state::EditorState`] is the session object tying these together.

pub mod config;
pub mod error;
pub mod input;
pub mod model;
pub mod primitives;
pub mod state;
pub mod view;

pub use error::{Error, Result};
