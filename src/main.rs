use anyhow::{Context, Result as AnyhowResult};
use clap::Parser;
use piecework::config::Config;
use piecework::model::event::{EditorEvent, Movement};
use piecework::primitives::highlighter::PlainMarkup;
use piecework::state::EditorState;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Size of the chunks a file is split into when loaded
const LOAD_CHUNK_BYTES: usize = 64 * 1024;

/// Load a file into a piece table and print a viewport window of it
#[derive(Parser, Debug)]
#[command(name = "piecework")]
#[command(about = "Piece-table text core: load a file and print a window of it", long_about = None)]
#[command(version)]
struct Args {
    /// File to open
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Path to log file (default: stderr)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Scroll offset in pixels
    #[arg(long, default_value_t = 0.0)]
    scroll_top: f32,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 400.0)]
    height: f32,

    /// Move the cursor to this 1-indexed line before printing
    #[arg(long, value_name = "LINE")]
    goto: Option<usize>,

    /// Print highlighter markup instead of plain text
    #[arg(long)]
    highlight: bool,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,

    /// Print the configuration JSON schema and exit
    #[arg(long)]
    dump_schema: bool,
}

fn init_tracing(log_file: Option<&Path>) -> AnyhowResult<()> {
    let filter = EnvFilter::from_default_env();
    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

/// Read a file as a sequence of chunks, split on character boundaries
fn read_chunks(path: &Path) -> AnyhowResult<Vec<String>> {
    let mut file =
        std::fs::File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let text = String::from_utf8(bytes)
        .with_context(|| format!("{} is not valid UTF-8", path.display()))?;

    let mut chunks = Vec::new();
    let mut rest = text.as_str();
    while !rest.is_empty() {
        let mut split = rest.len().min(LOAD_CHUNK_BYTES);
        while !rest.is_char_boundary(split) {
            split -= 1;
        }
        let (chunk, tail) = rest.split_at(split);
        chunks.push(chunk.to_string());
        rest = tail;
    }
    Ok(chunks)
}

fn main() -> AnyhowResult<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_deref())?;

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if args.dump_schema {
        println!("{}", Config::schema_json()?);
        return Ok(());
    }
    if args.dump_config {
        println!(
            "{}",
            serde_json::to_string_pretty(&config).context("Failed to serialize config")?
        );
        return Ok(());
    }

    let chunks = match &args.file {
        Some(path) => read_chunks(path)?,
        None => Vec::new(),
    };
    tracing::info!("loaded {} chunk(s)", chunks.len());

    let mut state = EditorState::new(chunks, &config);
    if let Some(path) = &args.file {
        state.set_path(path);
    }
    if args.highlight {
        state = state.with_highlighter(PlainMarkup);
    }

    let now = Instant::now();
    state.push_event(EditorEvent::Resize {
        height: args.height,
    });
    state.push_event(EditorEvent::Scroll {
        scroll_top: args.scroll_top,
    });
    if let Some(line) = args.goto {
        state.push_event(EditorEvent::Move {
            movement: Movement::DocumentStart,
            extend: false,
        });
        for _ in 1..line {
            state.push_event(EditorEvent::Move {
                movement: Movement::Down,
                extend: false,
            });
        }
    }
    state.process_frame(now)?;

    if args.highlight {
        let deadline = now + std::time::Duration::from_secs(2);
        while state.visible_lines().iter().any(|(_, l)| !l.is_highlighted)
            && Instant::now() < deadline
        {
            std::thread::sleep(std::time::Duration::from_millis(5));
            state.poll_highlights();
        }
    }

    for (line, content) in state.visible_lines() {
        println!("{:>6} {}", line + 1, content.content);
    }

    let status = state.status();
    let stats = state.table().stats();
    println!(
        "-- Ln {}, Col {} | {} lines | {} | {} pieces, {} chunk(s)",
        status.line + 1,
        status.column + 1,
        status.line_count,
        status.line_ending,
        stats.piece_count,
        stats.original_chunks
    );
    Ok(())
}
