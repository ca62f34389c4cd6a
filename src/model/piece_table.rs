//! Piece table with per-chunk line tracking
//!
//! The document is the in-order concatenation of [`Piece`]s. Each piece points
//! into one [`StringBuffer`] of the [`BufferStore`]: either an immutable
//! original chunk (as loaded) or the single append-only added chunk. Piece
//! bounds are stored as line/column pairs *within the chunk*, so splitting a
//! piece only needs the chunk's line-start table, never a scan of the document.

use crate::error::{Error, Result};
use crate::model::line_index::{
    compute_line_starts, find_line_for_offset, normalize, LineEnding, Normalizer,
};
use lru::LruCache;
use std::cell::RefCell;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::ops::{Bound, RangeBounds};

/// Default number of partial `get_text` results kept around
pub const DEFAULT_RANGE_CACHE_CAPACITY: usize = 32;

/// A chunk of text plus its line-start table
#[derive(Debug, Clone)]
pub struct StringBuffer {
    text: String,
    line_starts: Vec<usize>,
    eol: LineEnding,
}

impl StringBuffer {
    /// Create a buffer from already-normalized text
    pub fn new(text: String, eol: LineEnding) -> Self {
        let line_starts = compute_line_starts(&text, eol);
        StringBuffer {
            text,
            line_starts,
            eol,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn line_starts(&self) -> &[usize] {
        &self.line_starts
    }

    /// Get the number of line feeds (separators) in this buffer
    pub fn line_feed_count(&self) -> usize {
        self.line_starts.len() - 1
    }

    /// Append normalized text and extend the line-start table.
    /// Returns the offset where the appended data starts
    pub fn append(&mut self, data: &str) -> usize {
        let start_offset = self.text.len();
        self.text.push_str(data);
        let sep = self.eol.as_str();
        self.line_starts.extend(
            data.match_indices(sep)
                .map(|(i, _)| start_offset + i + sep.len()),
        );
        start_offset
    }

    /// Byte offset of a chunk-relative line/column pair
    pub fn offset_at(&self, cursor: BufferCursor) -> usize {
        self.line_starts[cursor.line] + cursor.column
    }

    /// Chunk-relative line/column pair of a byte offset
    pub fn cursor_at(&self, offset: usize) -> BufferCursor {
        let line = find_line_for_offset(&self.line_starts, offset);
        BufferCursor {
            line,
            column: offset - self.line_starts[line],
        }
    }
}

/// Identifies which buffer a piece of text comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferLocation {
    /// Data is in an original chunk (index into the chunk list)
    Original(usize),
    /// Data is in the added buffer
    Added,
}

/// One added buffer plus N original chunks
#[derive(Debug, Clone)]
pub struct BufferStore {
    original: Vec<StringBuffer>,
    added: StringBuffer,
}

impl BufferStore {
    fn new(original: Vec<StringBuffer>, eol: LineEnding) -> Self {
        BufferStore {
            original,
            added: StringBuffer::new(String::new(), eol),
        }
    }

    pub fn get(&self, location: BufferLocation) -> &StringBuffer {
        match location {
            BufferLocation::Original(index) => &self.original[index],
            BufferLocation::Added => &self.added,
        }
    }

    pub fn original_count(&self) -> usize {
        self.original.len()
    }

    pub fn added(&self) -> &StringBuffer {
        &self.added
    }
}

/// A line/column position inside one [`StringBuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BufferCursor {
    pub line: usize,
    pub column: usize,
}

/// A contiguous run of document text, stored as a range of one buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub location: BufferLocation,
    pub start: BufferCursor,
    pub end: BufferCursor,
    pub line_feed_count: usize,
    pub length: usize,
}

/// Statistics about the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableStats {
    pub total_bytes: usize,
    pub line_count: usize,
    pub piece_count: usize,
    pub original_chunks: usize,
    pub added_bytes: usize,
}

/// Position in document coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,   // 0-indexed line number
    pub column: usize, // Byte offset within the line
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    pub fn zero() -> Self {
        Self::default()
    }
}

#[derive(Debug)]
struct ContentCache {
    lines: HashMap<usize, String>,
    ranges: LruCache<(usize, usize), String>,
}

impl ContentCache {
    fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            lines: HashMap::new(),
            ranges: LruCache::new(capacity),
        }
    }

    fn clear(&mut self) {
        self.lines.clear();
        self.ranges.clear();
    }
}

/// The editable document
#[derive(Debug)]
pub struct PieceTable {
    buffers: BufferStore,
    pieces: Vec<Piece>,
    eol: LineEnding,
    length: usize,
    line_count: usize,
    /// Monotonic version counter, bumped on every effective mutation
    version: u64,
    cache: RefCell<ContentCache>,
}

impl PieceTable {
    /// Create a table from initial chunks, detecting the line ending from the
    /// first non-empty chunk
    pub fn new<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let chunks: Vec<S> = chunks.into_iter().collect();
        let eol = chunks
            .iter()
            .map(AsRef::<str>::as_ref)
            .find(|chunk| !chunk.is_empty())
            .map(LineEnding::detect)
            .unwrap_or_default();
        Self::with_line_ending(chunks, eol)
    }

    /// Create a table whose text is normalized to `eol`
    pub fn with_line_ending<I, S>(chunks: I, eol: LineEnding) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalizer = Normalizer::new(eol);
        let mut original = Vec::new();
        let mut pieces = Vec::new();

        for chunk in chunks {
            let text = normalizer.push(AsRef::<str>::as_ref(&chunk));
            // Empty chunks never become pieces
            if text.is_empty() {
                continue;
            }
            let buffer = StringBuffer::new(text, eol);
            let end = buffer.cursor_at(buffer.len());
            pieces.push(Piece {
                location: BufferLocation::Original(original.len()),
                start: BufferCursor::default(),
                end,
                line_feed_count: buffer.line_feed_count(),
                length: buffer.len(),
            });
            original.push(buffer);
        }

        let mut table = PieceTable {
            buffers: BufferStore::new(original, eol),
            pieces,
            eol,
            length: 0,
            line_count: 1,
            version: 0,
            cache: RefCell::new(ContentCache::new(DEFAULT_RANGE_CACHE_CAPACITY)),
        };
        table.recompute_totals();
        tracing::debug!(
            bytes = table.length,
            lines = table.line_count,
            chunks = table.buffers.original_count(),
            eol = table.eol.display_name(),
            "piece table created"
        );
        table
    }

    /// Create an empty table
    pub fn empty() -> Self {
        Self::with_line_ending(std::iter::empty::<&str>(), LineEnding::default())
    }

    /// Resize the partial-range text cache (drops its contents)
    pub fn set_range_cache_capacity(&mut self, capacity: usize) {
        *self.cache.get_mut() = ContentCache::new(capacity);
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    pub fn line_ending(&self) -> LineEnding {
        self.eol
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn buffers(&self) -> &BufferStore {
        &self.buffers
    }

    pub fn stats(&self) -> TableStats {
        TableStats {
            total_bytes: self.length,
            line_count: self.line_count,
            piece_count: self.pieces.len(),
            original_chunks: self.buffers.original_count(),
            added_bytes: self.buffers.added().len(),
        }
    }

    /// Insert text at a document byte offset.
    ///
    /// The text is normalized to the document line ending and appended to the
    /// added buffer; the piece containing `offset` is split around a new piece
    /// pointing at the appended range.
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<()> {
        if offset > self.length {
            return Err(Error::OutOfRange {
                offset,
                length: 0,
                document_length: self.length,
            });
        }
        self.check_boundary(offset)?;

        let text = normalize(text, self.eol);
        if text.is_empty() {
            return Ok(());
        }

        let added_end = self.buffers.added.len();
        let start = self.buffers.added.append(&text);
        let start_cursor = self.buffers.added.cursor_at(start);
        let end_cursor = self.buffers.added.cursor_at(start + text.len());
        let new_piece = Piece {
            location: BufferLocation::Added,
            start: start_cursor,
            end: end_cursor,
            line_feed_count: end_cursor.line - start_cursor.line,
            length: text.len(),
        };

        if !self.extend_added_piece(offset, added_end, &new_piece) {
            let mut pieces = Vec::with_capacity(self.pieces.len() + 2);
            let mut inserted = false;
            let mut piece_start = 0;

            for piece in &self.pieces {
                let piece_end = piece_start + piece.length;
                if !inserted && offset == piece_start {
                    pieces.push(new_piece);
                    pieces.push(*piece);
                    inserted = true;
                } else if !inserted && offset > piece_start && offset < piece_end {
                    let split = offset - piece_start;
                    pieces.push(self.slice(piece, 0, split));
                    pieces.push(new_piece);
                    pieces.push(self.slice(piece, split, piece.length));
                    inserted = true;
                } else {
                    pieces.push(*piece);
                }
                piece_start = piece_end;
            }
            if !inserted {
                pieces.push(new_piece);
            }
            self.pieces = pieces;
        }

        tracing::trace!(offset, bytes = text.len(), pieces = self.pieces.len(), "insert");
        self.after_mutation();
        Ok(())
    }

    /// Delete `length` bytes starting at `offset`
    pub fn delete(&mut self, offset: usize, length: usize) -> Result<()> {
        let end = offset
            .checked_add(length)
            .filter(|end| *end <= self.length)
            .ok_or(Error::OutOfRange {
                offset,
                length,
                document_length: self.length,
            })?;
        if length == 0 {
            return Ok(());
        }
        self.check_boundary(offset)?;
        self.check_boundary(end)?;

        let mut pieces = Vec::with_capacity(self.pieces.len() + 1);
        let mut piece_start = 0;
        for piece in &self.pieces {
            let piece_end = piece_start + piece.length;
            if piece_end <= offset || piece_start >= end {
                pieces.push(*piece);
            } else {
                if piece_start < offset {
                    pieces.push(self.slice(piece, 0, offset - piece_start));
                }
                if piece_end > end {
                    pieces.push(self.slice(piece, end - piece_start, piece.length));
                }
            }
            piece_start = piece_end;
        }
        self.pieces = pieces;

        tracing::trace!(offset, length, pieces = self.pieces.len(), "delete");
        self.after_mutation();
        Ok(())
    }

    /// Text of a range of lines (end exclusive), joined with the document line ending.
    ///
    /// `..` returns the whole document. Only genuine sub-ranges are cached.
    pub fn get_text(&self, lines: impl RangeBounds<usize>) -> String {
        let (start, end) = self.resolve_lines(lines);
        if start == 0 && end == self.line_count {
            return self.full_text();
        }
        if start >= end {
            return String::new();
        }
        if let Some(text) = self.cache.borrow_mut().ranges.get(&(start, end)) {
            return text.clone();
        }
        let text = self.get_lines_content(start..end).join(self.eol.as_str());
        self.cache.borrow_mut().ranges.put((start, end), text.clone());
        text
    }

    /// Contents of a range of lines (end exclusive), without separators
    pub fn get_lines_content(&self, lines: impl RangeBounds<usize>) -> Vec<String> {
        let (start, end) = self.resolve_lines(lines);
        (start..end)
            .filter_map(|line| self.line_content(line))
            .collect()
    }

    /// Content of one line without its separator; `None` past the last line
    pub fn line_content(&self, line: usize) -> Option<String> {
        if line >= self.line_count {
            return None;
        }
        match self.try_line_content(line) {
            Ok(content) => Some(content),
            Err(e) => {
                tracing::error!(line, error = %e, "line lookup failed");
                None
            }
        }
    }

    /// Like [`line_content`](Self::line_content) but reports a missing line
    /// as [`Error::LineNotFound`]
    pub fn try_line_content(&self, line: usize) -> Result<String> {
        if let Some(content) = self.cache.borrow().lines.get(&line) {
            return Ok(content.clone());
        }
        let content = self.line_segments(line)?.concat();
        self.cache.borrow_mut().lines.insert(line, content.clone());
        Ok(content)
    }

    /// Length in bytes of one line without its separator; `None` past the last line
    pub fn line_length(&self, line: usize) -> Option<usize> {
        if line >= self.line_count {
            return None;
        }
        if let Some(content) = self.cache.borrow().lines.get(&line) {
            return Some(content.len());
        }
        match self.line_segments(line) {
            Ok(segments) => Some(segments.iter().map(|s| s.len()).sum()),
            Err(e) => {
                tracing::error!(line, error = %e, "line lookup failed");
                None
            }
        }
    }

    /// Document byte offset of a line/column position
    pub fn position_to_offset(&self, line: usize, column: usize) -> Result<usize> {
        match self.line_length(line) {
            Some(line_length) if column <= line_length => {
                Ok(self.line_start_offset(line)? + column)
            }
            _ => Err(Error::PositionOutOfRange {
                line,
                column,
                line_count: self.line_count,
            }),
        }
    }

    /// Line/column position of a document byte offset
    pub fn offset_to_position(&self, offset: usize) -> Result<Position> {
        if offset > self.length {
            return Err(Error::OutOfRange {
                offset,
                length: 0,
                document_length: self.length,
            });
        }

        let mut piece_start = 0;
        let mut lines_before = 0;
        // Bytes of the current document line seen in earlier pieces
        let mut column_before = 0;
        for piece in &self.pieces {
            let buffer = self.buffers.get(piece.location);
            if offset < piece_start + piece.length {
                let buffer_offset = buffer.offset_at(piece.start) + (offset - piece_start);
                let buffer_line = find_line_for_offset(buffer.line_starts(), buffer_offset);
                let line_in_piece = buffer_line - piece.start.line;
                let column = if line_in_piece == 0 {
                    column_before + (buffer_offset - buffer.offset_at(piece.start))
                } else {
                    buffer_offset - buffer.line_starts()[buffer_line]
                };
                return Ok(Position::new(lines_before + line_in_piece, column));
            }
            if piece.line_feed_count > 0 {
                column_before = piece.end.column;
            } else {
                column_before += piece.length;
            }
            lines_before += piece.line_feed_count;
            piece_start += piece.length;
        }

        Ok(Position::new(lines_before, column_before))
    }

    /// Check the structural invariants of the table
    pub fn check_invariants(&self) -> bool {
        let length: usize = self.pieces.iter().map(|p| p.length).sum();
        let line_feeds: usize = self.pieces.iter().map(|p| p.line_feed_count).sum();
        length == self.length
            && line_feeds + 1 == self.line_count
            && self.pieces.iter().all(|p| {
                let buffer = self.buffers.get(p.location);
                p.length > 0
                    && p.end.line - p.start.line == p.line_feed_count
                    && buffer.offset_at(p.end) - buffer.offset_at(p.start) == p.length
            })
    }

    fn after_mutation(&mut self) {
        self.recompute_totals();
        self.version += 1;
        self.cache.get_mut().clear();
        debug_assert!(
            self.check_invariants(),
            "piece table invariants violated: {:?}",
            self.stats()
        );
    }

    fn recompute_totals(&mut self) {
        self.length = self.pieces.iter().map(|p| p.length).sum();
        self.line_count = 1 + self
            .pieces
            .iter()
            .map(|p| p.line_feed_count)
            .sum::<usize>();
    }

    /// Grow the piece that ends at `offset` in place when it already ends at
    /// the old end of the added buffer
    fn extend_added_piece(&mut self, offset: usize, added_end: usize, new_piece: &Piece) -> bool {
        let mut piece_end = 0;
        for piece in self.pieces.iter_mut() {
            piece_end += piece.length;
            if piece_end < offset {
                continue;
            }
            if piece_end == offset
                && piece.location == BufferLocation::Added
                && self.buffers.added.offset_at(piece.end) == added_end
            {
                piece.end = new_piece.end;
                piece.line_feed_count += new_piece.line_feed_count;
                piece.length += new_piece.length;
                return true;
            }
            return false;
        }
        false
    }

    /// Re-slice a piece to `[from, to)` of its own bytes.
    ///
    /// The line feed count is the number of separators inside the slice, read
    /// off the owning buffer's line-start table.
    fn slice(&self, piece: &Piece, from: usize, to: usize) -> Piece {
        let buffer = self.buffers.get(piece.location);
        let base = buffer.offset_at(piece.start);
        let start = buffer.cursor_at(base + from);
        let end = buffer.cursor_at(base + to);
        Piece {
            location: piece.location,
            start,
            end,
            line_feed_count: end.line - start.line,
            length: to - from,
        }
    }

    fn full_text(&self) -> String {
        let mut text = String::with_capacity(self.length);
        for piece in &self.pieces {
            text.push_str(self.piece_text(piece));
        }
        text
    }

    fn piece_text(&self, piece: &Piece) -> &str {
        let buffer = self.buffers.get(piece.location);
        &buffer.text()[buffer.offset_at(piece.start)..buffer.offset_at(piece.end)]
    }

    /// Byte of the document at `offset`, if any
    fn byte_at(&self, offset: usize) -> Option<u8> {
        let mut piece_start = 0;
        for piece in &self.pieces {
            if offset < piece_start + piece.length {
                let buffer = self.buffers.get(piece.location);
                let index = buffer.offset_at(piece.start) + (offset - piece_start);
                return buffer.text().as_bytes().get(index).copied();
            }
            piece_start += piece.length;
        }
        None
    }

    /// Reject offsets inside a character or inside a CRLF separator
    fn check_boundary(&self, offset: usize) -> Result<()> {
        match self.byte_at(offset) {
            Some(byte) if (byte & 0xC0) == 0x80 => Err(Error::NotCharBoundary { offset }),
            Some(b'\n') if self.eol == LineEnding::CRLF => Err(Error::SplitsLineEnding { offset }),
            _ => Ok(()),
        }
    }

    fn resolve_lines(&self, lines: impl RangeBounds<usize>) -> (usize, usize) {
        let start = match lines.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let end = match lines.end_bound() {
            Bound::Included(&e) => e.saturating_add(1),
            Bound::Excluded(&e) => e,
            Bound::Unbounded => self.line_count,
        };
        let end = end.min(self.line_count);
        (start.min(end), end)
    }

    /// Slices of every piece that holds part of `line`, in order
    fn line_segments(&self, line: usize) -> Result<Vec<&str>> {
        if line >= self.line_count {
            return Err(Error::LineNotFound { line });
        }
        if self.pieces.is_empty() {
            return Ok(Vec::new());
        }

        let eol_len = self.eol.separator_len();
        let mut segments = Vec::new();
        let mut found = false;
        let mut lines_before = 0;
        for piece in &self.pieces {
            let lines_after = lines_before + piece.line_feed_count;
            if lines_after < line {
                lines_before = lines_after;
                continue;
            }
            if lines_before > line {
                break;
            }
            found = true;

            let buffer = self.buffers.get(piece.location);
            let line_in_piece = line - lines_before;
            let start = if line_in_piece == 0 {
                buffer.offset_at(piece.start)
            } else {
                *buffer
                    .line_starts()
                    .get(piece.start.line + line_in_piece)
                    .ok_or(Error::LineNotFound { line })?
            };
            let end = if line_in_piece == piece.line_feed_count {
                buffer.offset_at(piece.end)
            } else {
                buffer
                    .line_starts()
                    .get(piece.start.line + line_in_piece + 1)
                    .ok_or(Error::LineNotFound { line })?
                    - eol_len
            };
            segments.push(&buffer.text()[start..end]);

            if line_in_piece < piece.line_feed_count {
                break;
            }
            lines_before = lines_after;
        }

        if found {
            Ok(segments)
        } else {
            Err(Error::LineNotFound { line })
        }
    }

    /// Document offset of the first byte of `line`
    fn line_start_offset(&self, line: usize) -> Result<usize> {
        if line == 0 {
            return Ok(0);
        }
        let mut piece_start = 0;
        let mut lines_before = 0;
        for piece in &self.pieces {
            if lines_before + piece.line_feed_count >= line {
                let buffer = self.buffers.get(piece.location);
                let line_start = buffer
                    .line_starts()
                    .get(piece.start.line + (line - lines_before))
                    .ok_or(Error::LineNotFound { line })?;
                return Ok(piece_start + (line_start - buffer.offset_at(piece.start)));
            }
            lines_before += piece.line_feed_count;
            piece_start += piece.length;
        }
        Err(Error::LineNotFound { line })
    }
}

impl Default for PieceTable {
    fn default() -> Self {
        Self::empty()
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Operation {
        Insert { offset: usize, text: String },
        Delete { offset: usize, bytes: usize },
    }

    fn operation_strategy() -> impl Strategy<Value = Vec<Operation>> {
        prop::collection::vec(
            prop_oneof![
                3 => (0usize..400, "[a-c\n]{0,6}")
                    .prop_map(|(offset, text)| Operation::Insert { offset, text }),
                2 => (0usize..400, 0usize..12)
                    .prop_map(|(offset, bytes)| Operation::Delete { offset, bytes }),
            ],
            100..150,
        )
    }

    proptest! {
        #[test]
        fn prop_matches_shadow_string(
            initial in prop::collection::vec("[x-z\n]{0,8}", 0..4),
            operations in operation_strategy()
        ) {
            let mut table = PieceTable::with_line_ending(&initial, LineEnding::LF);
            let mut shadow: String = initial.concat();

            for op in operations {
                match op {
                    Operation::Insert { offset, text } => {
                        let offset = offset % (shadow.len() + 1);
                        table.insert(offset, &text).unwrap();
                        shadow.insert_str(offset, &text);
                    }
                    Operation::Delete { offset, bytes } => {
                        let offset = offset % (shadow.len() + 1);
                        let bytes = bytes.min(shadow.len() - offset);
                        table.delete(offset, bytes).unwrap();
                        shadow.replace_range(offset..offset + bytes, "");
                    }
                }
                prop_assert_eq!(table.get_text(..), shadow.clone());
                prop_assert_eq!(table.line_count(), shadow.split('\n').count());
                prop_assert!(table.check_invariants());
            }

            let lines: Vec<&str> = shadow.split('\n').collect();
            for (i, line) in lines.iter().enumerate() {
                prop_assert_eq!(table.line_content(i), Some(line.to_string()));
            }
        }

        #[test]
        fn prop_position_round_trip(
            chunks in prop::collection::vec("[a-b\n]{0,10}", 1..5),
            inserts in prop::collection::vec((0usize..60, "[c\n]{1,3}"), 0..10)
        ) {
            let mut table = PieceTable::with_line_ending(&chunks, LineEnding::LF);
            for (offset, text) in inserts {
                let offset = offset % (table.len() + 1);
                table.insert(offset, &text).unwrap();
            }
            for line in 0..table.line_count() {
                let length = table.line_length(line).unwrap();
                for column in 0..=length {
                    let offset = table.position_to_offset(line, column).unwrap();
                    prop_assert_eq!(
                        table.offset_to_position(offset).unwrap(),
                        Position::new(line, column)
                    );
                }
            }
        }

        #[test]
        fn prop_noop_edits_preserve_text(text in "[a-d\n]{0,30}", offset in 0usize..40) {
            let mut table = PieceTable::with_line_ending([text.as_str()], LineEnding::LF);
            let offset = offset % (text.len() + 1);
            table.insert(offset, "").unwrap();
            table.delete(offset, 0).unwrap();
            prop_assert_eq!(table.get_text(..), text.clone());
            prop_assert_eq!(table.line_count(), text.split('\n').count());
        }
    }
}
