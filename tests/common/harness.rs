// EditorTestHarness - drives an EditorState on a virtual clock

#![allow(dead_code)]

use piecework::config::Config;
use piecework::model::event::{EditorEvent, Movement};
use piecework::model::piece_table::Position;
use piecework::state::{EditorState, FrameReport};
use std::time::{Duration, Instant};

/// Virtual time that passes between two processed events
const EVENT_STEP: Duration = Duration::from_millis(1);

pub struct EditorTestHarness {
    state: EditorState,
    /// Virtual clock; only advances when the harness says so
    now: Instant,
}

impl EditorTestHarness {
    /// Session over `text` with the default config and a 200px viewport
    pub fn new(text: &str) -> Self {
        Self::with_config(text, Config::default())
    }

    pub fn with_config(text: &str, config: Config) -> Self {
        Self::from_state(EditorState::from_text(text, &config))
    }

    pub fn from_state(state: EditorState) -> Self {
        let mut harness = Self {
            state,
            now: Instant::now(),
        };
        harness.send(EditorEvent::Resize { height: 200.0 });
        harness
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut EditorState {
        &mut self.state
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    /// Queue an event and run one frame
    pub fn send(&mut self, event: EditorEvent) -> FrameReport {
        self.state.push_event(event);
        self.frame()
    }

    /// Run one frame at the current time, then step the clock
    pub fn frame(&mut self) -> FrameReport {
        let report = self
            .state
            .process_frame(self.now)
            .expect("frame failed");
        self.now += EVENT_STEP;
        report
    }

    pub fn type_text(&mut self, text: &str) {
        self.send(EditorEvent::Type {
            text: text.to_string(),
        });
    }

    pub fn backspace(&mut self) {
        self.send(EditorEvent::Backspace);
    }

    pub fn delete(&mut self) {
        self.send(EditorEvent::Delete);
    }

    pub fn move_cursor(&mut self, movement: Movement) {
        self.send(EditorEvent::Move {
            movement,
            extend: false,
        });
    }

    pub fn extend_selection(&mut self, movement: Movement) {
        self.send(EditorEvent::Move {
            movement,
            extend: true,
        });
    }

    pub fn scroll_to(&mut self, scroll_top: f32) -> FrameReport {
        self.send(EditorEvent::Scroll { scroll_top })
    }

    /// Let `ms` milliseconds of virtual time pass, then run a frame
    pub fn wait(&mut self, ms: u64) -> FrameReport {
        self.now += Duration::from_millis(ms);
        self.send(EditorEvent::Tick)
    }

    /// Commit any pending edit
    pub fn flush(&mut self) {
        self.state.flush().expect("flush failed");
    }

    /// Committed document text
    pub fn get_buffer_content(&self) -> String {
        self.state.table().get_text(..)
    }

    /// Document text as the user sees it, including uncommitted typing
    pub fn get_visual_content(&self) -> String {
        let eol = self.state.line_ending().as_str();
        (0..self.state.line_count())
            .map(|line| {
                self.state
                    .line_content(line)
                    .map(|l| l.content)
                    .unwrap_or_default()
            })
            .collect::<Vec<_>>()
            .join(eol)
    }

    /// Visual byte offset of the cursor
    pub fn cursor_offset(&self) -> usize {
        let Position { line, column } = self.state.cursor().position();
        let eol_len = self.state.line_ending().separator_len();
        let before: usize = (0..line)
            .map(|l| self.state.line_length(l).unwrap_or(0) + eol_len)
            .sum();
        before + column
    }

    pub fn cursor_position(&self) -> Position {
        self.state.cursor().position()
    }

    pub fn assert_buffer_content(&self, expected: &str) {
        assert_eq!(
            self.get_buffer_content(),
            expected,
            "committed content mismatch"
        );
    }

    pub fn assert_visual_content(&self, expected: &str) {
        assert_eq!(self.get_visual_content(), expected, "visual content mismatch");
    }

    /// Run frames until every visible line is highlighted or `timeout` elapses
    /// in real time. Returns whether highlighting completed.
    pub fn wait_for_highlights(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.frame();
            let done = self
                .state
                .visible_lines()
                .iter()
                .all(|(_, line)| line.is_highlighted);
            if done {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
    }
}
