// End-to-end tests - driving a session through its event queue

mod common;

use common::harness::EditorTestHarness;
use piecework::config::{Config, LineEndingConfig};
use piecework::error::Error;
use piecework::model::event::{EditorEvent, Movement};
use piecework::model::line_index::LineEnding;
use piecework::model::piece_table::Position;
use piecework::primitives::highlighter::HighlightResponse;
use piecework::state::EditorState;
use piecework::view::viewport::LineRange;
use std::time::Duration;
use tempfile::TempDir;

fn numbered_lines(count: usize) -> String {
    (0..count)
        .map(|i| format!("Line {i} with some content"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A burst of typing lands in the piece table as one edit
#[test]
fn test_typing_burst_commits_once() {
    let mut harness = EditorTestHarness::new("Hello World");
    harness.move_cursor(Movement::LineEnd);
    for ch in "!!!".chars() {
        harness.type_text(&ch.to_string());
    }

    harness.assert_visual_content("Hello World!!!");
    harness.assert_buffer_content("Hello World");
    assert!(harness.state().status().pending);

    // Not yet quiet for long enough
    let report = harness.wait(300);
    assert!(!report.committed);

    let report = harness.wait(500);
    assert!(report.committed);
    harness.assert_buffer_content("Hello World!!!");
    assert_eq!(harness.state().table().version(), 1);
    assert_eq!(harness.state().table().pieces().len(), 2);
}

/// Editing in two places commits the first run before starting the second
#[test]
fn test_edit_in_two_places() {
    let mut harness = EditorTestHarness::new("first\nsecond\nthird");
    harness.move_cursor(Movement::LineEnd);
    harness.type_text(" line");
    harness.move_cursor(Movement::DocumentEnd);
    harness.type_text(" line");

    harness.assert_buffer_content("first line\nsecond\nthird");
    harness.assert_visual_content("first line\nsecond\nthird line");
    harness.flush();
    harness.assert_buffer_content("first line\nsecond\nthird line");
}

#[test]
fn test_enter_splits_line_and_keeps_typing() {
    let mut harness = EditorTestHarness::new("abcdef");
    for _ in 0..3 {
        harness.move_cursor(Movement::Right);
    }
    harness.type_text("\n");
    harness.type_text("X");

    harness.assert_buffer_content("abc\ndef");
    harness.assert_visual_content("abc\nXdef");
    assert_eq!(harness.cursor_position(), Position::new(1, 1));
}

#[test]
fn test_backspace_across_pending_and_committed_text() {
    let mut harness = EditorTestHarness::new("one\ntwo");
    harness.move_cursor(Movement::DocumentEnd);
    harness.type_text("xy");
    // y, x, o, w, t, the line break, then e
    for _ in 0..7 {
        harness.backspace();
    }
    harness.flush();
    harness.assert_buffer_content("on");
    assert_eq!(harness.cursor_position(), Position::new(0, 2));
}

#[test]
fn test_selection_replace() {
    let mut harness = EditorTestHarness::new("The quick brown fox");
    for _ in 0..4 {
        harness.move_cursor(Movement::Right);
    }
    for _ in 0..5 {
        harness.extend_selection(Movement::Right);
    }
    let selection = *harness.state().selection();
    assert_eq!(selection.start(), Position::new(0, 4));
    assert_eq!(selection.end(), Position::new(0, 9));

    harness.type_text("slow");
    harness.assert_visual_content("The slow brown fox");
    assert!(harness.state().selection().is_collapsed());
}

#[test]
fn test_reversed_selection_delete() {
    let mut harness = EditorTestHarness::new("alpha\nbeta\ngamma");
    harness.move_cursor(Movement::DocumentEnd);
    harness.extend_selection(Movement::Up);
    harness.extend_selection(Movement::LineStart);
    assert!(harness.state().selection().is_reversed());
    assert!(harness.state().selection().is_multi_line());

    harness.delete();
    harness.assert_buffer_content("alpha\n");
    assert_eq!(harness.cursor_position(), Position::new(1, 0));
}

#[test]
fn test_select_all_delete_rebuilds_viewport() {
    let mut harness = EditorTestHarness::new(&numbered_lines(100));
    harness.send(EditorEvent::SelectAll);
    assert_eq!(harness.state().selection().end().line, 99);

    harness.backspace();
    harness.assert_buffer_content("");
    let report = harness.wait(20);
    let delta = report.viewport.expect("viewport pass");
    assert!(delta.full);
    assert_eq!(delta.entered, vec![0]);
    assert_eq!(harness.state().line_count(), 1);
}

#[test]
fn test_scrolling_is_incremental() {
    let mut harness = EditorTestHarness::new(&numbered_lines(500));
    harness.wait(20);
    assert_eq!(harness.state().viewport().visible(), LineRange::new(0, 10));
    assert_eq!(harness.state().viewport().extra(), LineRange::new(0, 40));

    harness.state_mut().push_event(EditorEvent::Scroll { scroll_top: 100.0 });
    harness.state_mut().push_event(EditorEvent::Scroll { scroll_top: 200.0 });
    let report = harness.wait(20);
    // Both scrolls collapse into one, plus the tick
    assert_eq!(report.events, 2);
    let delta = report.viewport.expect("viewport pass");
    assert!(!delta.full);
    assert_eq!(delta.entered, (41..=50).collect::<Vec<_>>());
    assert!(delta.evicted.is_empty());

    let visible = harness.state().visible_lines();
    assert_eq!(visible[0].0, 10);
    assert_eq!(visible[0].1.content, "Line 10 with some content");
    assert_eq!(harness.state().materialized_lines().len(), 51);
}

#[test]
fn test_cursor_moves_scroll_viewport() {
    let mut harness = EditorTestHarness::new(&numbered_lines(100));
    harness.move_cursor(Movement::PageDown);
    assert_eq!(harness.cursor_position().line, 10);
    harness.move_cursor(Movement::PageDown);
    harness.move_cursor(Movement::PageDown);
    assert_eq!(harness.cursor_position().line, 30);
    harness.wait(20);
    assert!(harness.state().viewport().visible().contains(30));

    harness.move_cursor(Movement::DocumentStart);
    harness.wait(20);
    assert_eq!(harness.state().viewport().visible().start, 0);
}

#[test]
fn test_edit_refreshes_materialized_lines() {
    let mut harness = EditorTestHarness::new("a\nb\nc\nd");
    harness.wait(20);
    harness.move_cursor(Movement::Down);
    harness.type_text("\n");
    let report = harness.wait(20);
    let delta = report.viewport.expect("viewport pass");
    assert_eq!(delta.refreshed, vec![1, 2, 3]);
    assert_eq!(delta.entered, vec![4]);

    let lines: Vec<String> = harness
        .state()
        .materialized_lines()
        .into_iter()
        .map(|(_, l)| l.content)
        .collect();
    assert_eq!(lines, vec!["a", "", "b", "c", "d"]);
}

#[test]
fn test_background_highlighting() {
    let state = EditorState::from_text("let a = 1;\nlet b = 2;", &Config::default())
        .with_highlighter(|text: &str, _language: &str| -> anyhow::Result<String> {
            Ok(text.to_uppercase())
        });
    let mut harness = EditorTestHarness::from_state(state);

    assert!(harness.wait_for_highlights(Duration::from_secs(5)));
    let line = harness.state().line_content(1).unwrap();
    assert_eq!(line.content, "LET B = 2;");
    assert!(line.is_highlighted);

    // A pending run shows plain text on its own line only
    harness.move_cursor(Movement::LineEnd);
    harness.type_text(" // x");
    let line = harness.state().line_content(0).unwrap();
    assert_eq!(line.content, "let a = 1; // x");
    assert!(!line.is_highlighted);
    assert!(harness.state().line_content(1).unwrap().is_highlighted);

    // Committing invalidates everything, then a new request goes out
    harness.wait(600);
    assert!(!harness.state().line_content(1).unwrap().is_highlighted);
    assert!(harness.wait_for_highlights(Duration::from_secs(5)));
    assert_eq!(
        harness.state().line_content(0).unwrap().content,
        "LET A = 1; // X"
    );
}

#[test]
fn test_stale_highlight_is_discarded() {
    let mut harness = EditorTestHarness::new("abc");
    let stale = HighlightResponse {
        generation: harness.state().table().version(),
        lines: LineRange::new(0, 0),
        result: Ok(vec!["<b>abc</b>".to_string()]),
    };
    harness.type_text("x");
    harness.flush();

    let result = harness.state_mut().apply_highlight(stale);
    assert_eq!(
        result,
        Err(Error::StaleHighlightResult {
            expected: 1,
            received: 0
        })
    );
    assert!(!harness.state().line_content(0).unwrap().is_highlighted);
}

#[test]
fn test_save_flushes_pending_edits() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("test.txt");
    std::fs::write(&file_path, "saved\n").unwrap();

    let content = std::fs::read_to_string(&file_path).unwrap();
    let state = EditorState::from_text(&content, &Config::default()).with_path(&file_path);
    let mut harness = EditorTestHarness::from_state(state);

    harness.move_cursor(Movement::LineEnd);
    harness.type_text(" text");
    let (path, text) = harness.state_mut().text_for_save().unwrap();
    std::fs::write(&path, text).unwrap();

    assert_eq!(std::fs::read_to_string(&file_path).unwrap(), "saved text\n");
    assert!(!harness.state().status().pending);
}

#[test]
fn test_save_without_path() {
    let mut harness = EditorTestHarness::new("scratch");
    assert_eq!(harness.state_mut().text_for_save(), Err(Error::MissingPath));
}

#[test]
fn test_crlf_document_round_trip() {
    let mut harness = EditorTestHarness::new("one\r\ntwo\r\n");
    assert_eq!(harness.state().line_ending(), LineEnding::CRLF);
    assert_eq!(harness.state().line_count(), 3);

    harness.move_cursor(Movement::LineEnd);
    harness.type_text("\n1");
    harness.flush();
    harness.assert_buffer_content("one\r\n1\r\ntwo\r\n");
    assert_eq!(harness.state().status().line_ending, "CRLF");
}

#[test]
fn test_forced_line_ending_normalizes_content() {
    let config = Config {
        line_ending: LineEndingConfig::Lf,
        ..Config::default()
    };
    let harness = EditorTestHarness::with_config("a\r\nb\rc", config);
    harness.assert_buffer_content("a\nb\nc");
}

#[test]
fn test_multibyte_typing_and_movement() {
    let mut harness = EditorTestHarness::new("héllo");
    harness.move_cursor(Movement::Right);
    harness.move_cursor(Movement::Right);
    assert_eq!(harness.cursor_position(), Position::new(0, 3));
    harness.type_text("ü");
    harness.backspace();
    harness.backspace();
    harness.flush();
    harness.assert_buffer_content("hllo");
}

#[test]
fn test_status_reports_cursor() {
    let mut harness = EditorTestHarness::new("ab\ncd");
    harness.move_cursor(Movement::Down);
    harness.extend_selection(Movement::Right);
    let status = harness.state().status();
    assert_eq!((status.line, status.column), (1, 1));
    assert_eq!(status.line_count, 2);
    assert!(status.has_selection);
    assert!(!status.pending);
}
