//! Selection state and operations.
//!
//! A selection is a `start` (where it was anchored) and an `end` (where the
//! user extended it to). Nothing else is stored; every predicate is derived
//! from the pair:
//!
//! - **collapsed**: `start == end`, a plain cursor
//! - **reversed**: `end` comes before `start` in document order
//! - **multi-line**: the endpoints are on different lines
//!
//! Non-extending moves reset both endpoints, extending moves only touch `end`.

use crate::model::cursor::clamp_position;
use crate::model::piece_table::{PieceTable, Position};

/// Exactly one of these describes any selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionShape {
    Collapsed,
    Reversed,
    ForwardMultiLine,
    ForwardSingleLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    start: Position,
    end: Position,
}

impl Selection {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A collapsed selection at `position`
    pub fn at(position: Position) -> Self {
        Self::new(position, position)
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    /// Anchor the selection at `position`, collapsing it
    pub fn set_start(&mut self, position: Position) {
        self.start = position;
        self.end = position;
    }

    /// Move the extending endpoint, keeping `start` fixed
    pub fn set_end(&mut self, position: Position) {
        self.end = position;
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    pub fn is_reversed(&self) -> bool {
        self.start.line > self.end.line
            || (self.start.line == self.end.line && self.start.column > self.end.column)
    }

    pub fn is_multi_line(&self) -> bool {
        self.start.line != self.end.line
    }

    pub fn shape(&self) -> SelectionShape {
        if self.is_collapsed() {
            SelectionShape::Collapsed
        } else if self.is_reversed() {
            SelectionShape::Reversed
        } else if self.is_multi_line() {
            SelectionShape::ForwardMultiLine
        } else {
            SelectionShape::ForwardSingleLine
        }
    }

    /// Endpoints in document order
    pub fn normalized(&self) -> (Position, Position) {
        if self.is_reversed() {
            (self.end, self.start)
        } else {
            (self.start, self.end)
        }
    }

    /// Collapse onto `start`; returns the position the cursor should move to
    pub fn collapse_to_start(&mut self) -> Position {
        self.end = self.start;
        self.start
    }

    /// Collapse onto `end`; returns the position the cursor should move to
    pub fn collapse_to_end(&mut self) -> Position {
        self.start = self.end;
        self.end
    }

    /// Select the whole document
    pub fn select_all(&mut self, table: &PieceTable) {
        let last = table.line_count() - 1;
        self.start = Position::zero();
        self.end = Position::new(last, table.line_length(last).unwrap_or(0));
    }

    /// Re-clamp both endpoints into the document
    pub fn clamp(&mut self, table: &PieceTable) {
        self.start = clamp_position(table, self.start);
        self.end = clamp_position(table, self.end);
    }
}
