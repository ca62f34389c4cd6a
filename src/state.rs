//! Per-document editing session
//!
//! `EditorState` owns everything one open document needs: the piece table,
//! cursor, selection, viewport window, edit coalescer and highlight cache.
//! Nothing is shared between sessions and there are no back-pointers; callers
//! borrow the session and use its accessors.
//!
//! The cursor is kept in *visual* coordinates. While a typing run is pending
//! it sits where the user sees it, which may be past the end of the committed
//! line. Any command other than continuing the run commits the run first, so
//! outside of a run visual and committed coordinates are the same.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::input::coalescer::{EditCoalescer, PendingEdit, PendingKind};
use crate::model::cursor::Cursor;
use crate::model::event::{EditorEvent, EventQueue, Movement};
use crate::model::line_index::{normalize, LineEnding};
use crate::model::piece_table::{PieceTable, Position};
use crate::model::selection::Selection;
use crate::primitives::highlighter::{
    HighlightCache, HighlightProvider, HighlightRequest, HighlightResponse, HighlightWorker,
};
use crate::view::viewport::{LineRange, ViewportWindow, WindowDelta};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Bytes of leading text inspected for line-ending detection
const DETECTION_SAMPLE_BYTES: usize = 8 * 1024;

/// One line as handed to the renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineContent {
    pub content: String,
    /// `content` is highlighter markup rather than plain text
    pub is_highlighted: bool,
}

/// Footer/status information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInfo {
    /// 0-indexed cursor line
    pub line: usize,
    pub column: usize,
    pub line_count: usize,
    pub has_selection: bool,
    pub line_ending: &'static str,
    /// Typed text not yet committed to the piece table
    pub pending: bool,
    pub version: u64,
}

/// What one call to [`EditorState::process_frame`] did
#[derive(Debug, Default)]
pub struct FrameReport {
    pub events: usize,
    /// Set when a pending run was committed because its quiet interval elapsed
    pub committed: bool,
    /// Viewport pass result, if one ran this frame
    pub viewport: Option<WindowDelta>,
    pub highlighted_lines: usize,
    /// Events that returned an error; later events in the frame still run
    pub failed_events: usize,
}

pub struct EditorState {
    table: PieceTable,
    cursor: Cursor,
    selection: Selection,
    window: ViewportWindow,
    coalescer: EditCoalescer,
    highlights: HighlightCache,
    events: EventQueue,

    /// Committed content of the materialized lines
    rendered: BTreeMap<usize, String>,

    path: Option<PathBuf>,
    language: String,

    frame_interval: Duration,
    last_viewport_pass: Option<Instant>,

    worker: Option<HighlightWorker>,
    /// Generation and range of the last highlight request sent
    requested: Option<(u64, LineRange)>,
}

impl EditorState {
    /// Create a session over `chunks` (e.g. successive reads of a file)
    pub fn new<I, S>(chunks: I, config: &Config) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let chunks: Vec<S> = chunks.into_iter().collect();
        let mut sample = String::new();
        for chunk in &chunks {
            if sample.len() >= DETECTION_SAMPLE_BYTES {
                break;
            }
            sample.push_str(AsRef::<str>::as_ref(chunk));
        }
        let eol = config.line_ending.resolve(&sample);

        let mut table = PieceTable::with_line_ending(chunks, eol);
        table.set_range_cache_capacity(config.range_cache_capacity);

        let mut highlights = HighlightCache::new();
        highlights.invalidate_all(table.version());

        Self {
            table,
            cursor: Cursor::new(),
            selection: Selection::default(),
            window: ViewportWindow::new(0.0, config.line_height, config.viewport_margin),
            coalescer: EditCoalescer::new(config.quiet_interval_ms),
            highlights,
            events: EventQueue::new(),
            rendered: BTreeMap::new(),
            path: None,
            language: config.language.clone(),
            frame_interval: Duration::from_millis(config.frame_interval_ms),
            last_viewport_pass: None,
            worker: None,
            requested: None,
        }
    }

    /// Session over a single string
    pub fn from_text(text: &str, config: &Config) -> Self {
        Self::new([text], config)
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Highlight visible lines on a background worker using `provider`
    pub fn with_highlighter<P: HighlightProvider>(mut self, provider: P) -> Self {
        self.worker = Some(HighlightWorker::spawn(provider));
        self
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    /// Committed document
    pub fn table(&self) -> &PieceTable {
        &self.table
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn viewport(&self) -> &ViewportWindow {
        &self.window
    }

    pub fn pending(&self) -> Option<&PendingEdit> {
        self.coalescer.pending()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn line_ending(&self) -> LineEnding {
        self.table.line_ending()
    }

    pub fn line_count(&self) -> usize {
        self.table.line_count()
    }

    pub fn status(&self) -> StatusInfo {
        StatusInfo {
            line: self.cursor.line(),
            column: self.cursor.column(),
            line_count: self.table.line_count(),
            has_selection: !self.selection.is_collapsed(),
            line_ending: self.table.line_ending().display_name(),
            pending: !self.coalescer.is_empty(),
            version: self.table.version(),
        }
    }

    /// Content of `line` as the user sees it: highlighted markup when the
    /// cache has it, otherwise plain text with any pending run applied.
    pub fn line_content(&self, line: usize) -> Option<LineContent> {
        if let Some(run) = self.pending_on(line) {
            let committed = self.committed_line(line)?;
            return Some(LineContent {
                content: run.apply_to_line(&committed),
                is_highlighted: false,
            });
        }
        if let Some(markup) = self.highlights.get(line) {
            return Some(LineContent {
                content: markup.to_string(),
                is_highlighted: true,
            });
        }
        self.committed_line(line).map(|content| LineContent {
            content,
            is_highlighted: false,
        })
    }

    /// Visual length of `line` in bytes; `None` past the last line
    pub fn line_length(&self, line: usize) -> Option<usize> {
        let committed = self.table.line_length(line)?;
        Some(match self.pending_on(line) {
            Some(run) => run.apply_to_length(committed),
            None => committed,
        })
    }

    /// Lines currently materialized by the viewport, in order
    pub fn materialized_lines(&self) -> Vec<(usize, LineContent)> {
        self.rendered
            .keys()
            .filter_map(|&line| self.line_content(line).map(|content| (line, content)))
            .collect()
    }

    /// Visible lines as of the last viewport pass
    pub fn visible_lines(&self) -> Vec<(usize, LineContent)> {
        self.window
            .visible()
            .lines()
            .filter_map(|line| self.line_content(line).map(|content| (line, content)))
            .collect()
    }

    fn pending_on(&self, line: usize) -> Option<&PendingEdit> {
        self.coalescer.pending().filter(|run| run.start.line == line)
    }

    fn committed_line(&self, line: usize) -> Option<String> {
        match self.rendered.get(&line) {
            Some(content) => Some(content.clone()),
            None => self.table.line_content(line),
        }
    }

    /// Plain visual text of `line`
    fn visual_line(&self, line: usize) -> String {
        let committed = self.committed_line(line).unwrap_or_default();
        match self.pending_on(line) {
            Some(run) => run.apply_to_line(&committed),
            None => committed,
        }
    }

    /// Visual document offset of the cursor
    fn visual_offset(&self) -> Result<usize> {
        Ok(self.table.position_to_offset(self.cursor.line(), 0)? + self.cursor.column())
    }

    // ============================================================================
    // Editing
    // ============================================================================

    /// Type text at the cursor, replacing the selection if there is one.
    ///
    /// Single-line text extends the pending run; text containing a line break
    /// is committed right away.
    pub fn type_text(&mut self, text: &str, now: Instant) -> Result<()> {
        let text = normalize(text, self.table.line_ending());
        if text.is_empty() {
            return Ok(());
        }
        if !self.selection.is_collapsed() {
            self.delete_selection()?;
        }
        if text.contains(self.table.line_ending().as_str()) {
            return self.insert_now(&text);
        }

        let at = self.cursor.position();
        let offset = self.visual_offset()?;
        if !self.coalescer.insert(at, offset, &text, now) {
            self.commit_pending()?;
            let offset = self.cursor.offset(&self.table)?;
            self.coalescer.insert(at, offset, &text, now);
        }
        self.set_cursor_visual(Position::new(at.line, at.column + text.len()));
        Ok(())
    }

    /// Break the line at the cursor
    pub fn newline(&mut self, now: Instant) -> Result<()> {
        let eol = self.table.line_ending().as_str();
        self.type_text(eol, now)
    }

    /// Insert pasted text at the cursor as one committed edit
    pub fn paste(&mut self, text: &str) -> Result<()> {
        if !self.selection.is_collapsed() {
            self.delete_selection()?;
        }
        self.insert_now(text)
    }

    /// Delete the character before the cursor, or the selection
    pub fn backspace(&mut self, now: Instant) -> Result<()> {
        if !self.selection.is_collapsed() {
            return self.delete_selection();
        }
        let at = self.cursor.position();
        if at.column == 0 {
            if at.line == 0 {
                return Ok(());
            }
            // Join with the previous line
            self.commit_pending()?;
            let offset = self.cursor.offset(&self.table)?;
            let separator = self.table.line_ending().separator_len();
            let previous_len = self.table.line_length(at.line - 1).unwrap_or(0);
            self.table.delete(offset - separator, separator)?;
            self.after_commit(at.line - 1, true);
            self.place_cursor(Position::new(at.line - 1, previous_len));
            return Ok(());
        }

        let line = self.visual_line(at.line);
        let column = at.column.min(line.len());
        let Some(ch) = line[..column].chars().next_back() else {
            return Ok(());
        };
        let bytes = ch.len_utf8();
        let offset = self.visual_offset()?;
        if !self.coalescer.delete_backward(at, offset, bytes, now) {
            self.commit_pending()?;
            let offset = self.cursor.offset(&self.table)?;
            self.coalescer.delete_backward(at, offset, bytes, now);
        }
        self.set_cursor_visual(Position::new(at.line, column - bytes));
        Ok(())
    }

    /// Delete the character after the cursor, or the selection
    pub fn delete_forward(&mut self, now: Instant) -> Result<()> {
        if !self.selection.is_collapsed() {
            return self.delete_selection();
        }
        let at = self.cursor.position();
        let line = self.visual_line(at.line);
        if at.column >= line.len() {
            if at.line + 1 >= self.table.line_count() {
                return Ok(());
            }
            // Join the next line onto this one
            self.commit_pending()?;
            let offset = self.cursor.offset(&self.table)?;
            let separator = self.table.line_ending().separator_len();
            self.table.delete(offset, separator)?;
            self.after_commit(at.line, true);
            self.place_cursor(at);
            return Ok(());
        }

        let Some(ch) = line[at.column..].chars().next() else {
            return Ok(());
        };
        let bytes = ch.len_utf8();
        let offset = self.visual_offset()?;
        if !self.coalescer.delete_forward(at, offset, bytes, now) {
            self.commit_pending()?;
            let offset = self.cursor.offset(&self.table)?;
            self.coalescer.delete_forward(at, offset, bytes, now);
        }
        self.set_cursor_visual(at);
        Ok(())
    }

    /// Delete the selected text and collapse onto its start
    pub fn delete_selection(&mut self) -> Result<()> {
        self.commit_pending()?;
        if self.selection.is_collapsed() {
            return Ok(());
        }
        self.selection.clamp(&self.table);
        let (start, end) = self.selection.normalized();
        let start_offset = self.table.position_to_offset(start.line, start.column)?;
        let end_offset = self.table.position_to_offset(end.line, end.column)?;
        self.table.delete(start_offset, end_offset - start_offset)?;
        self.after_commit(start.line, start.line != end.line);
        self.place_cursor(start);
        Ok(())
    }

    /// Commit the pending run, if any
    pub fn flush(&mut self) -> Result<()> {
        self.commit_pending()
    }

    /// Commit pending edits and return the destination path with the full text
    pub fn text_for_save(&mut self) -> Result<(PathBuf, String)> {
        self.commit_pending()?;
        let path = self.path.clone().ok_or(Error::MissingPath)?;
        Ok((path, self.table.get_text(..)))
    }

    fn insert_now(&mut self, text: &str) -> Result<()> {
        self.commit_pending()?;
        let offset = self.cursor.offset(&self.table)?;
        let before = self.table.line_count();
        let line = self.cursor.line();
        self.table.insert(offset, text)?;
        let inserted = normalize(text, self.table.line_ending()).len();
        self.after_commit(line, self.table.line_count() != before);
        let end = self.table.offset_to_position(offset + inserted)?;
        self.place_cursor(end);
        Ok(())
    }

    fn commit_pending(&mut self) -> Result<()> {
        match self.coalescer.force_flush() {
            Some(run) => self.commit(run),
            None => Ok(()),
        }
    }

    fn commit(&mut self, run: PendingEdit) -> Result<()> {
        if run.is_noop() {
            return Ok(());
        }
        match &run.kind {
            PendingKind::Insert(text) => self.table.insert(run.offset, text)?,
            PendingKind::Delete(length) => self.table.delete(run.offset, *length)?,
        }
        tracing::debug!(
            "committed {:?} at offset {} (line {}), version {}",
            run.kind,
            run.offset,
            run.start.line,
            self.table.version()
        );
        self.after_commit(run.start.line, false);
        Ok(())
    }

    /// Invalidate derived state after the piece table changed
    fn after_commit(&mut self, first_line: usize, lines_shifted: bool) {
        self.highlights.invalidate_all(self.table.version());
        self.requested = None;
        if lines_shifted {
            self.window.mark_dirty_from(first_line);
            self.rendered.retain(|&line, _| line < first_line);
        } else {
            self.window.mark_dirty(LineRange::new(first_line, first_line));
            self.rendered.remove(&first_line);
        }
        if self.table.is_empty() {
            self.window.reset();
        }
    }

    // ============================================================================
    // Cursor & Selection
    // ============================================================================

    /// Move the cursor; with `extend` the selection anchor stays put and only
    /// the selection end follows the cursor.
    pub fn move_cursor(&mut self, movement: Movement, extend: bool) -> Result<()> {
        self.commit_pending()?;
        let table = &self.table;
        let rows = self.window.rows();
        match movement {
            Movement::Left => self.cursor.move_left(table),
            Movement::Right => self.cursor.move_right(table),
            Movement::Up => self.cursor.move_up(table),
            Movement::Down => self.cursor.move_down(table),
            Movement::LineStart => self.cursor.move_to_line_start(table),
            Movement::LineEnd => self.cursor.move_to_line_end(table),
            Movement::DocumentStart => self.cursor.move_to_document_start(table),
            Movement::DocumentEnd => self.cursor.move_to_document_end(table),
            Movement::PageUp => self.cursor.page_up(table, rows),
            Movement::PageDown => self.cursor.page_down(table, rows),
        }
        let position = self.cursor.position();
        if extend {
            self.selection.set_end(position);
        } else {
            self.selection.set_start(position);
        }
        self.window.ensure_visible(position.line);
        Ok(())
    }

    /// Move the cursor to `position` (clamped), collapsing the selection
    pub fn set_cursor(&mut self, position: Position) -> Result<()> {
        self.commit_pending()?;
        self.place_cursor(position);
        self.window.ensure_visible(self.cursor.line());
        Ok(())
    }

    pub fn select_all(&mut self) -> Result<()> {
        self.commit_pending()?;
        self.selection.select_all(&self.table);
        self.cursor.move_to(&self.table, self.selection.end());
        Ok(())
    }

    /// Collapse the selection onto its start and move the cursor there
    pub fn collapse_selection_to_start(&mut self) -> Result<()> {
        self.commit_pending()?;
        let position = self.selection.collapse_to_start();
        self.cursor.move_to(&self.table, position);
        Ok(())
    }

    pub fn collapse_selection_to_end(&mut self) -> Result<()> {
        self.commit_pending()?;
        let position = self.selection.collapse_to_end();
        self.cursor.move_to(&self.table, position);
        Ok(())
    }

    /// Selected text, if the selection is not collapsed
    pub fn selected_text(&mut self) -> Result<Option<String>> {
        self.commit_pending()?;
        if self.selection.is_collapsed() {
            return Ok(None);
        }
        let (start, end) = self.selection.normalized();
        let start = self.table.position_to_offset(start.line, start.column)?;
        let end = self.table.position_to_offset(end.line, end.column)?;
        let first = self.table.offset_to_position(start)?.line;
        let last = self.table.offset_to_position(end)?.line;
        let text = self.table.get_text(first..last + 1);
        let line_start = self.table.position_to_offset(first, 0)?;
        Ok(Some(text[start - line_start..end - line_start].to_string()))
    }

    /// Clamp into the committed table and collapse the selection there
    fn place_cursor(&mut self, position: Position) {
        self.cursor.move_to(&self.table, position);
        self.selection.set_start(self.cursor.position());
    }

    /// Set the cursor inside a pending run, where the committed table does
    /// not describe the line yet
    fn set_cursor_visual(&mut self, position: Position) {
        self.cursor = Cursor::at(position);
        self.selection.set_start(position);
    }

    // ============================================================================
    // Viewport
    // ============================================================================

    pub fn scroll_to(&mut self, scroll_top: f32) {
        self.window.scroll_to(scroll_top);
    }

    pub fn resize(&mut self, height: f32) {
        self.window.resize(height);
    }

    /// Recompute the window now and fetch or drop lines accordingly
    pub fn update_viewport(&mut self) -> WindowDelta {
        let delta = self.window.update(self.table.line_count());
        if delta.full {
            self.rendered.clear();
        }
        for line in &delta.evicted {
            self.rendered.remove(line);
            self.highlights.evict(*line);
        }
        for &line in delta.entered.iter().chain(&delta.refreshed) {
            match self.table.line_content(line) {
                Some(content) => {
                    self.rendered.insert(line, content);
                }
                None => {
                    self.rendered.remove(&line);
                }
            }
        }
        delta
    }

    // ============================================================================
    // Highlighting
    // ============================================================================

    /// Request highlighting of the visible lines.
    ///
    /// Commits pending edits first; returns false without a worker.
    pub fn request_highlight(&mut self) -> Result<bool> {
        self.commit_pending()?;
        let Some(worker) = &self.worker else {
            return Ok(false);
        };
        let lines = self.window.visible();
        let generation = self.table.version();
        let request = HighlightRequest {
            generation,
            lines,
            text: self.table.get_lines_content(lines.start..lines.end + 1),
            language: self.language.clone(),
        };
        let sent = worker.request(request);
        if sent {
            self.requested = Some((generation, lines));
        } else {
            tracing::warn!("highlight worker is not running");
        }
        Ok(sent)
    }

    /// Store a highlight result; stale results are rejected
    pub fn apply_highlight(&mut self, response: HighlightResponse) -> Result<usize> {
        self.highlights.apply(response)
    }

    /// Apply every response the worker has produced so far
    pub fn poll_highlights(&mut self) -> usize {
        let responses = match &self.worker {
            Some(worker) => worker.try_recv_all(),
            None => return 0,
        };
        let mut applied = 0;
        for response in responses {
            match self.apply_highlight(response) {
                Ok(count) => applied += count,
                Err(Error::StaleHighlightResult { expected, received }) => {
                    tracing::debug!(
                        "discarding highlight for generation {} (current {})",
                        received,
                        expected
                    );
                }
                Err(e) => tracing::warn!("highlight failed: {}", e),
            }
        }
        applied
    }

    fn wants_highlight(&self) -> bool {
        if self.worker.is_none() || !self.coalescer.is_empty() {
            return false;
        }
        let visible = self.window.visible();
        if self.requested == Some((self.table.version(), visible)) {
            return false;
        }
        visible.lines().any(|line| self.highlights.get(line).is_none())
    }

    // ============================================================================
    // Event Loop
    // ============================================================================

    pub fn push_event(&mut self, event: EditorEvent) {
        self.events.push(event);
    }

    /// Apply one event immediately
    pub fn handle_event(&mut self, event: EditorEvent, now: Instant) -> Result<()> {
        match event {
            EditorEvent::Type { text } => self.type_text(&text, now),
            EditorEvent::Backspace => self.backspace(now),
            EditorEvent::Delete => self.delete_forward(now),
            EditorEvent::Move { movement, extend } => self.move_cursor(movement, extend),
            EditorEvent::SelectAll => self.select_all(),
            EditorEvent::Scroll { scroll_top } => {
                self.scroll_to(scroll_top);
                Ok(())
            }
            EditorEvent::Resize { height } => {
                self.resize(height);
                Ok(())
            }
            EditorEvent::Tick => Ok(()),
        }
    }

    /// Run one frame: drain queued events in order, commit a run whose quiet
    /// interval has elapsed, run at most one viewport pass, and exchange
    /// highlight requests and results.
    pub fn process_frame(&mut self, now: Instant) -> Result<FrameReport> {
        let mut report = FrameReport::default();

        let events = self.events.drain_frame();
        report.events = events.len();
        for event in events {
            if let Err(e) = self.handle_event(event.clone(), now) {
                tracing::warn!("event {:?} failed: {}", event, e);
                report.failed_events += 1;
            }
        }

        if let Some(run) = self.coalescer.flush_ready(now) {
            self.commit(run)?;
            report.committed = true;
        }

        let frame_due = self
            .last_viewport_pass
            .map_or(true, |last| now.duration_since(last) >= self.frame_interval);
        if self.window.needs_update() && frame_due {
            report.viewport = Some(self.update_viewport());
            self.last_viewport_pass = Some(now);
        }

        report.highlighted_lines = self.poll_highlights();
        if self.wants_highlight() {
            self.request_highlight()?;
        }

        Ok(report)
    }

    /// When the next frame has timed work to do, if ever
    pub fn next_deadline(&self) -> Option<Instant> {
        self.coalescer.deadline()
    }
}
