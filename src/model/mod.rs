//! Document model: buffer storage, line indexing, cursor and selection

pub mod cursor;
pub mod event;
pub mod line_index;
pub mod piece_table;
pub mod selection;

pub use piece_table::Position;
