//! Line endings and line-start tables
//!
//! Every chunk of text held by the piece table is normalized to a single
//! document-wide line ending, so a line-start table is just the offsets that
//! follow each occurrence of that ending. All helpers here are pure functions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Line ending format used by a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// Unix/Linux/Mac format (\n)
    LF,
    /// Windows format (\r\n)
    CRLF,
    /// Old Mac format (\r) - rare but supported
    CR,
}

impl Default for LineEnding {
    fn default() -> Self {
        // Default to LF (Unix) for new files
        Self::LF
    }
}

impl LineEnding {
    /// Get the string representation of this line ending
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LF => "\n",
            Self::CRLF => "\r\n",
            Self::CR => "\r",
        }
    }

    /// Length of the separator in bytes
    pub fn separator_len(&self) -> usize {
        self.as_str().len()
    }

    /// Get the display name for status bar
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::LF => "LF",
            Self::CRLF => "CRLF",
            Self::CR => "CR",
        }
    }

    /// Detect the dominant line ending of a text sample.
    ///
    /// Only the first 8KB are inspected. Majority vote wins; ties and
    /// samples without any line ending fall back to LF.
    pub fn detect(text: &str) -> LineEnding {
        let bytes = text.as_bytes();
        let sample = &bytes[..bytes.len().min(8 * 1024)];

        let mut crlf_count = 0;
        let mut lf_only_count = 0;
        let mut cr_only_count = 0;

        let mut i = 0;
        while i < sample.len() {
            match sample[i] {
                b'\r' if sample.get(i + 1) == Some(&b'\n') => {
                    crlf_count += 1;
                    i += 2;
                    continue;
                }
                b'\r' => cr_only_count += 1,
                b'\n' => lf_only_count += 1,
                _ => {}
            }
            i += 1;
        }

        if crlf_count > lf_only_count && crlf_count > cr_only_count {
            LineEnding::CRLF
        } else if cr_only_count > lf_only_count && cr_only_count > crlf_count {
            LineEnding::CR
        } else {
            LineEnding::LF
        }
    }
}

/// Rewrites `\r\n`, `\r` and `\n` into one target line ending.
///
/// State is carried between calls so a `\r` at the end of one chunk and a
/// `\n` at the start of the next still count as a single separator.
#[derive(Debug, Clone)]
pub struct Normalizer {
    eol: LineEnding,
    pending_cr: bool,
}

impl Normalizer {
    pub fn new(eol: LineEnding) -> Self {
        Self {
            eol,
            pending_cr: false,
        }
    }

    /// Normalize the next chunk of a stream
    pub fn push(&mut self, chunk: &str) -> String {
        let mut out = String::with_capacity(chunk.len());
        for ch in chunk.chars() {
            match ch {
                '\r' => {
                    out.push_str(self.eol.as_str());
                    self.pending_cr = true;
                }
                '\n' => {
                    if !self.pending_cr {
                        out.push_str(self.eol.as_str());
                    }
                    self.pending_cr = false;
                }
                other => {
                    out.push(other);
                    self.pending_cr = false;
                }
            }
        }
        out
    }
}

/// Normalize a standalone string to `eol`
pub fn normalize(text: &str, eol: LineEnding) -> String {
    Normalizer::new(eol).push(text)
}

/// Compute the line-start table of normalized text.
///
/// Entry 0 is always 0; every other entry is the offset just past a separator.
pub fn compute_line_starts(text: &str, eol: LineEnding) -> Vec<usize> {
    let mut line_starts = vec![0];
    let sep = eol.as_str();
    line_starts.extend(text.match_indices(sep).map(|(i, _)| i + sep.len()));
    line_starts
}

/// Index of the last line whose start is `<= offset`.
///
/// `line_starts` must be sorted. Offsets before the first recorded start map to 0.
pub fn find_line_for_offset(line_starts: &[usize], offset: usize) -> usize {
    line_starts
        .partition_point(|&start| start <= offset)
        .saturating_sub(1)
}
