use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Cursor movement commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Movement {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    LineEnd,
    DocumentStart,
    DocumentEnd,
    PageUp,
    PageDown,
}

/// Input delivered to a session, processed in order once per frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditorEvent {
    /// Insert text at the cursor (typing, Enter, or a paste)
    Type { text: String },

    Backspace,

    /// Forward delete
    Delete,

    /// Move the cursor; `extend` keeps the selection anchor in place
    Move { movement: Movement, extend: bool },

    SelectAll,

    /// New scroll offset in pixels
    Scroll { scroll_top: f32 },

    /// New viewport height in pixels
    Resize { height: f32 },

    /// No input; lets timers fire
    Tick,
}

impl EditorEvent {
    /// Events that only change what is visible
    pub fn is_viewport_only(&self) -> bool {
        matches!(self, EditorEvent::Scroll { .. } | EditorEvent::Resize { .. })
    }
}

/// FIFO of pending events.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<EditorEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: EditorEvent) {
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Take everything queued for this frame.
    ///
    /// Within each burst of consecutive viewport events only the last
    /// `Scroll` and the last `Resize` survive; their order relative to edits
    /// is preserved.
    pub fn drain_frame(&mut self) -> Vec<EditorEvent> {
        let mut out: Vec<EditorEvent> = Vec::with_capacity(self.events.len());
        let mut burst_start = 0;
        for event in self.events.drain(..) {
            if !event.is_viewport_only() {
                out.push(event);
                burst_start = out.len();
                continue;
            }
            let same_kind = out[burst_start..]
                .iter()
                .position(|e| std::mem::discriminant(e) == std::mem::discriminant(&event));
            match same_kind {
                Some(i) => {
                    out.remove(burst_start + i);
                    out.push(event);
                }
                None => out.push(event),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_burst_collapses_to_last() {
        let mut queue = EventQueue::new();
        for top in [10.0, 20.0, 30.0] {
            queue.push(EditorEvent::Scroll { scroll_top: top });
        }
        queue.push(EditorEvent::Resize { height: 300.0 });
        queue.push(EditorEvent::Scroll { scroll_top: 40.0 });

        let events = queue.drain_frame();
        assert_eq!(
            events,
            vec![
                EditorEvent::Resize { height: 300.0 },
                EditorEvent::Scroll { scroll_top: 40.0 },
            ]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_edits_split_bursts() {
        let mut queue = EventQueue::new();
        queue.push(EditorEvent::Scroll { scroll_top: 10.0 });
        queue.push(EditorEvent::Type {
            text: "a".to_string(),
        });
        queue.push(EditorEvent::Scroll { scroll_top: 20.0 });
        queue.push(EditorEvent::Scroll { scroll_top: 25.0 });

        let events = queue.drain_frame();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], EditorEvent::Scroll { scroll_top: 10.0 });
        assert_eq!(events[2], EditorEvent::Scroll { scroll_top: 25.0 });
    }

    #[test]
    fn test_event_serializes() {
        let event = EditorEvent::Move {
            movement: Movement::PageDown,
            extend: true,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: EditorEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
