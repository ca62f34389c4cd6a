//! Keystroke coalescing.
//!
//! Typing does not touch the piece table directly. Each keystroke extends a
//! single pending run (an insertion or a deletion on one line) and re-arms a
//! quiet-interval timer. Once no input has arrived for the whole interval the
//! run is handed back for one commit, so a burst of typing becomes one piece
//! instead of one piece per character.
//!
//! Like the file-change debouncer this is a pure data structure: the current
//! time is always passed in, which keeps it deterministic under test.

use crate::model::piece_table::Position;
use std::time::{Duration, Instant};

/// Default quiet interval in milliseconds.
pub const DEFAULT_QUIET_INTERVAL_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingKind {
    /// Text typed at `start`
    Insert(String),
    /// Bytes removed starting at `start`
    Delete(usize),
}

/// An uncommitted edit run, in committed-document coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    /// Document offset the run commits at
    pub offset: usize,
    /// Line/column of `offset`
    pub start: Position,
    pub kind: PendingKind,
}

impl PendingEdit {
    /// Column the cursor sits at once the run is applied
    pub fn cursor_column(&self) -> usize {
        match &self.kind {
            PendingKind::Insert(text) => self.start.column + text.len(),
            PendingKind::Delete(_) => self.start.column,
        }
    }

    pub fn is_noop(&self) -> bool {
        match &self.kind {
            PendingKind::Insert(text) => text.is_empty(),
            PendingKind::Delete(length) => *length == 0,
        }
    }

    /// Apply the run to the committed content of its line
    pub fn apply_to_line(&self, committed: &str) -> String {
        let column = self.start.column.min(committed.len());
        match &self.kind {
            PendingKind::Insert(text) => {
                let mut line = String::with_capacity(committed.len() + text.len());
                line.push_str(&committed[..column]);
                line.push_str(text);
                line.push_str(&committed[column..]);
                line
            }
            PendingKind::Delete(length) => {
                let end = (column + length).min(committed.len());
                format!("{}{}", &committed[..column], &committed[end..])
            }
        }
    }

    /// Visual length of the line given its committed length
    pub fn apply_to_length(&self, committed: usize) -> usize {
        match &self.kind {
            PendingKind::Insert(text) => committed + text.len(),
            PendingKind::Delete(length) => committed.saturating_sub(*length),
        }
    }
}

/// Debounces keystrokes into single edits.
///
/// Every accepted keystroke resets the quiet timer. Methods that return
/// `false` could not extend the current run; the caller commits the run with
/// [`force_flush`](Self::force_flush) and tries again.
#[derive(Debug)]
pub struct EditCoalescer {
    pending: Option<PendingEdit>,
    last_input: Option<Instant>,
    quiet_interval: Duration,
}

impl EditCoalescer {
    pub fn new(quiet_interval_ms: u64) -> Self {
        Self {
            pending: None,
            last_input: None,
            quiet_interval: Duration::from_millis(quiet_interval_ms),
        }
    }

    /// Creates a coalescer with the default quiet interval (500ms).
    pub fn with_default() -> Self {
        Self::new(DEFAULT_QUIET_INTERVAL_MS)
    }

    pub fn pending(&self) -> Option<&PendingEdit> {
        self.pending.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_none()
    }

    /// When the pending run becomes due, if there is one
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref()?;
        self.last_input.map(|t| t + self.quiet_interval)
    }

    /// Type `text` with the cursor at `at` (visual coordinates), whose
    /// committed offset is `offset`.
    pub fn insert(&mut self, at: Position, offset: usize, text: &str, now: Instant) -> bool {
        match &mut self.pending {
            None => {
                self.pending = Some(PendingEdit {
                    offset,
                    start: at,
                    kind: PendingKind::Insert(text.to_string()),
                });
            }
            Some(run) if run.start.line == at.line && run.cursor_column() == at.column => {
                match &mut run.kind {
                    PendingKind::Insert(pending) => pending.push_str(text),
                    PendingKind::Delete(_) => return false,
                }
            }
            Some(_) => return false,
        }
        self.arm(now);
        true
    }

    /// Backspace over `bytes` bytes left of the cursor at `at`.
    pub fn delete_backward(&mut self, at: Position, offset: usize, bytes: usize, now: Instant) -> bool {
        if bytes > at.column || bytes > offset {
            return false;
        }
        match &mut self.pending {
            None => {
                self.pending = Some(PendingEdit {
                    offset: offset - bytes,
                    start: Position::new(at.line, at.column - bytes),
                    kind: PendingKind::Delete(bytes),
                });
            }
            Some(run) if run.start.line == at.line && run.cursor_column() == at.column => {
                match &mut run.kind {
                    PendingKind::Insert(text) if text.len() >= bytes => {
                        text.truncate(text.len() - bytes);
                    }
                    PendingKind::Insert(_) => return false,
                    PendingKind::Delete(length) => {
                        *length += bytes;
                        run.offset -= bytes;
                        run.start.column -= bytes;
                    }
                }
            }
            Some(_) => return false,
        }
        self.arm(now);
        true
    }

    /// Forward-delete `bytes` bytes right of the cursor at `at`.
    pub fn delete_forward(&mut self, at: Position, offset: usize, bytes: usize, now: Instant) -> bool {
        match &mut self.pending {
            None => {
                self.pending = Some(PendingEdit {
                    offset,
                    start: at,
                    kind: PendingKind::Delete(bytes),
                });
            }
            Some(PendingEdit {
                start,
                kind: PendingKind::Delete(length),
                ..
            }) if *start == at => *length += bytes,
            Some(_) => return false,
        }
        self.arm(now);
        true
    }

    /// Take the pending run if the quiet interval has elapsed
    pub fn flush_ready(&mut self, now: Instant) -> Option<PendingEdit> {
        let deadline = self.deadline()?;
        if now >= deadline {
            self.force_flush()
        } else {
            None
        }
    }

    /// Take the pending run regardless of the timer
    pub fn force_flush(&mut self) -> Option<PendingEdit> {
        self.last_input = None;
        self.pending.take()
    }

    fn arm(&mut self, now: Instant) {
        self.last_input = Some(now);
    }
}

impl Default for EditCoalescer {
    fn default() -> Self {
        Self::with_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_new_coalescer_is_empty() {
        let coalescer = EditCoalescer::new(500);
        assert!(coalescer.is_empty());
        assert_eq!(coalescer.deadline(), None);
    }

    #[test]
    fn test_typing_run_is_not_flushed_immediately() {
        let mut coalescer = EditCoalescer::new(500);
        let now = Instant::now();
        assert!(coalescer.insert(Position::new(0, 3), 3, "a", now));
        assert!(coalescer.flush_ready(now).is_none());
        assert!(coalescer.flush_ready(now + ms(499)).is_none());
        assert!(coalescer.flush_ready(now + ms(500)).is_some());
    }

    #[test]
    fn test_each_keystroke_rearms_timer() {
        let mut coalescer = EditCoalescer::new(500);
        let start = Instant::now();
        coalescer.insert(Position::new(0, 0), 0, "a", start);
        coalescer.insert(Position::new(0, 1), 0, "b", start + ms(400));
        coalescer.insert(Position::new(0, 2), 0, "c", start + ms(800));

        assert!(coalescer.flush_ready(start + ms(1000)).is_none());
        let run = coalescer.flush_ready(start + ms(1300)).unwrap();
        assert_eq!(run.offset, 0);
        assert_eq!(run.kind, PendingKind::Insert("abc".to_string()));
        assert!(coalescer.is_empty());
    }

    #[test]
    fn test_non_contiguous_insert_is_refused() {
        let mut coalescer = EditCoalescer::new(500);
        let now = Instant::now();
        coalescer.insert(Position::new(0, 0), 0, "ab", now);
        assert!(!coalescer.insert(Position::new(0, 5), 5, "x", now));
        assert!(!coalescer.insert(Position::new(1, 2), 9, "x", now));
        assert_eq!(
            coalescer.pending().map(|p| p.kind.clone()),
            Some(PendingKind::Insert("ab".to_string()))
        );
    }

    #[test]
    fn test_backspace_eats_pending_insert() {
        let mut coalescer = EditCoalescer::new(500);
        let now = Instant::now();
        coalescer.insert(Position::new(2, 4), 20, "xyz", now);
        assert!(coalescer.delete_backward(Position::new(2, 7), 20, 1, now));
        let run = coalescer.force_flush().unwrap();
        assert_eq!(run.kind, PendingKind::Insert("xy".to_string()));
        assert_eq!(run.offset, 20);
    }

    #[test]
    fn test_backspace_run_grows_leftward() {
        let mut coalescer = EditCoalescer::new(500);
        let now = Instant::now();
        assert!(coalescer.delete_backward(Position::new(0, 5), 5, 1, now));
        assert!(coalescer.delete_backward(Position::new(0, 4), 4, 2, now));
        let run = coalescer.force_flush().unwrap();
        assert_eq!(run.offset, 2);
        assert_eq!(run.start, Position::new(0, 2));
        assert_eq!(run.kind, PendingKind::Delete(3));
    }

    #[test]
    fn test_forward_delete_run_grows_rightward() {
        let mut coalescer = EditCoalescer::new(500);
        let now = Instant::now();
        assert!(coalescer.delete_forward(Position::new(1, 1), 4, 1, now));
        assert!(coalescer.delete_forward(Position::new(1, 1), 4, 1, now));
        assert!(!coalescer.delete_backward(Position::new(1, 3), 6, 1, now));
        let run = coalescer.force_flush().unwrap();
        assert_eq!(run.kind, PendingKind::Delete(2));
    }

    #[test]
    fn test_apply_to_line() {
        let insert = PendingEdit {
            offset: 2,
            start: Position::new(0, 2),
            kind: PendingKind::Insert("XY".to_string()),
        };
        assert_eq!(insert.apply_to_line("abcd"), "abXYcd");
        assert_eq!(insert.apply_to_length(4), 6);
        assert_eq!(insert.cursor_column(), 4);

        let delete = PendingEdit {
            offset: 1,
            start: Position::new(0, 1),
            kind: PendingKind::Delete(2),
        };
        assert_eq!(delete.apply_to_line("abcd"), "ad");
        assert_eq!(delete.apply_to_length(4), 2);
    }
}
