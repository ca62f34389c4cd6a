//! Background syntax highlighting
//!
//! Highlighting is the only work that leaves the control thread. The session
//! sends the text of a line range to a worker thread together with the
//! document version it was taken from; the worker asks a [`HighlightProvider`]
//! for markup and sends it back over a channel. Responses only ever land in
//! the [`HighlightCache`], and a response whose generation no longer matches
//! the document version is dropped.

use crate::error::{Error, Result};
use crate::view::viewport::LineRange;
use std::collections::HashMap;
use std::sync::mpsc;
use std::thread::JoinHandle;

/// Turns plain text into markup for one language.
///
/// Treated as a pure function of its inputs.
pub trait HighlightProvider: Send + 'static {
    fn highlight(&self, text: &str, language: &str) -> anyhow::Result<String>;
}

impl<F> HighlightProvider for F
where
    F: Fn(&str, &str) -> anyhow::Result<String> + Send + 'static,
{
    fn highlight(&self, text: &str, language: &str) -> anyhow::Result<String> {
        self(text, language)
    }
}

/// Escapes text for HTML-like markup without adding any styling
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainMarkup;

impl HighlightProvider for PlainMarkup {
    fn highlight(&self, text: &str, _language: &str) -> anyhow::Result<String> {
        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            match ch {
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '&' => out.push_str("&amp;"),
                other => out.push(other),
            }
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightRequest {
    /// Document version the text was read at
    pub generation: u64,
    pub lines: LineRange,
    /// One entry per line in `lines`
    pub text: Vec<String>,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightResponse {
    pub generation: u64,
    pub lines: LineRange,
    /// Markup per line, or the provider's error message
    pub result: std::result::Result<Vec<String>, String>,
}

fn run_request<P: HighlightProvider>(provider: &P, request: HighlightRequest) -> HighlightResponse {
    let joined = request.text.join("\n");
    let result = provider
        .highlight(&joined, &request.language)
        .map_err(|e| format!("{e:#}"))
        .and_then(|markup| {
            let lines: Vec<String> = markup.split('\n').map(str::to_string).collect();
            if lines.len() == request.text.len() {
                Ok(lines)
            } else {
                Err(format!(
                    "provider returned {} lines for {} requested",
                    lines.len(),
                    request.text.len()
                ))
            }
        });
    HighlightResponse {
        generation: request.generation,
        lines: request.lines,
        result,
    }
}

/// Highlights on a dedicated thread.
///
/// Dropping the worker closes the request channel and joins the thread.
pub struct HighlightWorker {
    requests: Option<mpsc::Sender<HighlightRequest>>,
    responses: mpsc::Receiver<HighlightResponse>,
    handle: Option<JoinHandle<()>>,
}

impl HighlightWorker {
    pub fn spawn<P: HighlightProvider>(provider: P) -> Self {
        let (request_tx, request_rx) = mpsc::channel::<HighlightRequest>();
        let (response_tx, response_rx) = mpsc::channel();

        let handle = std::thread::spawn(move || {
            for request in request_rx {
                tracing::trace!(
                    "highlighting lines {:?} at generation {}",
                    request.lines,
                    request.generation
                );
                if response_tx.send(run_request(&provider, request)).is_err() {
                    break;
                }
            }
            tracing::debug!("highlight worker exiting");
        });

        Self {
            requests: Some(request_tx),
            responses: response_rx,
            handle: Some(handle),
        }
    }

    /// Queue a request; returns false if the worker has stopped
    pub fn request(&self, request: HighlightRequest) -> bool {
        match &self.requests {
            Some(tx) => tx.send(request).is_ok(),
            None => false,
        }
    }

    /// Drain every response that has arrived so far
    pub fn try_recv_all(&self) -> Vec<HighlightResponse> {
        self.responses.try_iter().collect()
    }

    /// Block until the next response arrives
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<HighlightResponse> {
        self.responses.recv_timeout(timeout).ok()
    }
}

impl Drop for HighlightWorker {
    fn drop(&mut self) {
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("highlight worker panicked");
            }
        }
    }
}

/// Highlighted markup per line, valid for one document generation
#[derive(Debug, Default)]
pub struct HighlightCache {
    generation: u64,
    lines: HashMap<usize, String>,
}

impl HighlightCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, line: usize) -> Option<&str> {
        self.lines.get(&line).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Drop everything and start accepting results for `generation`
    pub fn invalidate_all(&mut self, generation: u64) {
        self.lines.clear();
        self.generation = generation;
    }

    pub fn evict(&mut self, line: usize) {
        self.lines.remove(&line);
    }

    /// Store a response if it was computed against the current generation.
    ///
    /// Returns the number of lines stored.
    pub fn apply(&mut self, response: HighlightResponse) -> Result<usize> {
        if response.generation != self.generation {
            return Err(Error::StaleHighlightResult {
                expected: self.generation,
                received: response.generation,
            });
        }
        let markup = response.result.map_err(Error::HighlightFailed)?;
        let count = markup.len();
        for (line, content) in response.lines.lines().zip(markup) {
            self.lines.insert(line, content);
        }
        Ok(count)
    }
}
