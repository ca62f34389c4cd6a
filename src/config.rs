use crate::model::line_index::LineEnding;
use anyhow::Context;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Line ending setting; `auto` detects it from the loaded text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LineEndingConfig {
    #[default]
    Auto,
    Lf,
    Crlf,
    Cr,
}

impl LineEndingConfig {
    /// Concrete line ending for a document whose text starts with `sample`
    pub fn resolve(&self, sample: &str) -> LineEnding {
        match self {
            Self::Auto => LineEnding::detect(sample),
            Self::Lf => LineEnding::LF,
            Self::Crlf => LineEnding::CRLF,
            Self::Cr => LineEnding::CR,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    /// Line separator used throughout the document ("auto", "lf", "crlf", "cr")
    #[serde(default)]
    pub line_ending: LineEndingConfig,

    /// Milliseconds without input before typed text is committed
    #[serde(default = "default_quiet_interval_ms")]
    pub quiet_interval_ms: u64,

    /// Rows kept materialized above and below the visible range
    #[serde(default = "default_viewport_margin")]
    pub viewport_margin: usize,

    /// Height of one line in pixels
    #[serde(default = "default_line_height")]
    pub line_height: f32,

    /// Minimum milliseconds between two viewport passes
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// Entries kept in the partial-range text cache
    #[serde(default = "default_range_cache_capacity")]
    pub range_cache_capacity: usize,

    /// Language extension handed to the highlight provider (e.g. "rs", "js")
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_quiet_interval_ms() -> u64 {
    crate::input::coalescer::DEFAULT_QUIET_INTERVAL_MS
}

fn default_viewport_margin() -> usize {
    crate::view::viewport::DEFAULT_VIEWPORT_MARGIN
}

fn default_line_height() -> f32 {
    20.0
}

fn default_frame_interval_ms() -> u64 {
    16
}

fn default_range_cache_capacity() -> usize {
    crate::model::piece_table::DEFAULT_RANGE_CACHE_CAPACITY
}

fn default_language() -> String {
    "txt".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            line_ending: LineEndingConfig::default(),
            quiet_interval_ms: default_quiet_interval_ms(),
            viewport_margin: default_viewport_margin(),
            line_height: default_line_height(),
            frame_interval_ms: default_frame_interval_ms(),
            range_cache_capacity: default_range_cache_capacity(),
            language: default_language(),
        }
    }
}

impl Config {
    /// Parse configuration from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Failed to parse config")
    }

    /// Load configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        Self::from_json_str(&contents)
            .with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// JSON schema of the configuration, pretty-printed
    pub fn schema_json() -> anyhow::Result<String> {
        let schema = schemars::schema_for!(Config);
        serde_json::to_string_pretty(&schema).context("Failed to serialize config schema")
    }
}
