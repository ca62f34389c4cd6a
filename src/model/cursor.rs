//! Cursor position and movement
//!
//! The cursor is a `(line, column)` pair that always stays inside the
//! document: line in `[0, line_count - 1]`, column in `[0, line_length]` and on
//! a character boundary. Moves past the document edges clamp instead of failing.
//!
//! Vertical moves remember the column the user asked for (the preferred
//! column), so passing through a short line does not lose the horizontal
//! position:
//!
//! ```text
//! a long line with the cursor at column 20
//! short
//! another long line, cursor returns to column 20
//! ```

use crate::error::Result;
use crate::model::piece_table::{PieceTable, Position};

/// Cursor state including position and preferred column.
///
/// # Examples
///
/// ```
/// use piecework::model::cursor::Cursor;
/// use piecework::model::piece_table::{PieceTable, Position};
///
/// let table = PieceTable::new(["Hello\nWorld"]);
/// let mut cursor = Cursor::new();
/// cursor.move_right(&table);
/// assert_eq!(cursor.position(), Position::new(0, 1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    position: Position,
    preferred_column: usize,
}

impl Cursor {
    /// Creates a new cursor at position (0, 0).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cursor at the specified position, without clamping.
    pub fn at(position: Position) -> Self {
        Self {
            position,
            preferred_column: position.column,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn line(&self) -> usize {
        self.position.line
    }

    pub fn column(&self) -> usize {
        self.position.column
    }

    /// Returns the preferred column for vertical movement.
    pub fn preferred_column(&self) -> usize {
        self.preferred_column
    }

    /// Document byte offset of the cursor
    pub fn offset(&self, table: &PieceTable) -> Result<usize> {
        table.position_to_offset(self.position.line, self.position.column)
    }

    /// Moves to `position`, clamped into the document, and makes its column
    /// the preferred one.
    pub fn move_to(&mut self, table: &PieceTable, position: Position) {
        self.position = clamp_position(table, position);
        self.preferred_column = self.position.column;
    }

    /// Re-clamps the current position, e.g. after the document changed
    pub fn clamp(&mut self, table: &PieceTable) {
        let clamped = clamp_position(table, self.position);
        if clamped != self.position {
            self.position = clamped;
            self.preferred_column = clamped.column;
        }
    }

    // ============================================================================
    // Horizontal Movement
    // ============================================================================

    /// One character right; wraps to the start of the next line.
    pub fn move_right(&mut self, table: &PieceTable) {
        let Position { line, column } = self.position;
        let content = table.line_content(line).unwrap_or_default();
        if column < content.len() {
            let next = content[column..]
                .chars()
                .next()
                .map_or(content.len(), |ch| column + ch.len_utf8());
            self.move_to(table, Position::new(line, next));
        } else if line + 1 < table.line_count() {
            self.move_to(table, Position::new(line + 1, 0));
        }
    }

    /// One character left; wraps to the end of the previous line.
    pub fn move_left(&mut self, table: &PieceTable) {
        let Position { line, column } = self.position;
        if column > 0 {
            let content = table.line_content(line).unwrap_or_default();
            let column = column.min(content.len());
            let prev = content[..column]
                .chars()
                .next_back()
                .map_or(0, |ch| column - ch.len_utf8());
            self.move_to(table, Position::new(line, prev));
        } else if line > 0 {
            let len = table.line_length(line - 1).unwrap_or(0);
            self.move_to(table, Position::new(line - 1, len));
        }
    }

    pub fn move_to_line_start(&mut self, table: &PieceTable) {
        self.move_to(table, Position::new(self.position.line, 0));
    }

    pub fn move_to_line_end(&mut self, table: &PieceTable) {
        let len = table.line_length(self.position.line).unwrap_or(0);
        self.move_to(table, Position::new(self.position.line, len));
    }

    pub fn move_to_document_start(&mut self, table: &PieceTable) {
        self.move_to(table, Position::zero());
    }

    pub fn move_to_document_end(&mut self, table: &PieceTable) {
        let last = table.line_count() - 1;
        let len = table.line_length(last).unwrap_or(0);
        self.move_to(table, Position::new(last, len));
    }

    // ============================================================================
    // Vertical Movement
    // ============================================================================

    pub fn move_up(&mut self, table: &PieceTable) {
        self.move_lines(table, -1);
    }

    pub fn move_down(&mut self, table: &PieceTable) {
        self.move_lines(table, 1);
    }

    pub fn page_up(&mut self, table: &PieceTable, rows: usize) {
        self.move_lines(table, -(rows.max(1) as isize));
    }

    pub fn page_down(&mut self, table: &PieceTable, rows: usize) {
        self.move_lines(table, rows.max(1) as isize);
    }

    /// Moves `delta` lines, keeping the preferred column where the target
    /// line is long enough.
    fn move_lines(&mut self, table: &PieceTable, delta: isize) {
        let last = table.line_count() - 1;
        let target = self.position.line.saturating_add_signed(delta).min(last);
        if target == self.position.line {
            return;
        }
        let wanted = Position::new(target, self.preferred_column);
        self.position = clamp_position(table, wanted);
    }
}

/// Clamp a position into the document and onto a character boundary
pub fn clamp_position(table: &PieceTable, position: Position) -> Position {
    let line = position.line.min(table.line_count() - 1);
    let content = table.line_content(line).unwrap_or_default();
    let column = floor_char_boundary(&content, position.column);
    Position::new(line, column)
}

/// Largest character boundary of `text` that is `<= index`
pub fn floor_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    (0..=index)
        .rev()
        .find(|&i| text.is_char_boundary(i))
        .unwrap_or(0)
}
