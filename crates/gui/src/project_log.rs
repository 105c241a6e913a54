//! Project log: the numbered place/erase history and its text format.
//!
//! Each line is `N:P(x,y,z)` or `N:E(x,y,z)` with 1-based coordinates.
//! Loading treats the file as untrusted input: file-level limits are checked
//! before any line is replayed, and replay happens on a staging grid that is
//! only handed back if the whole file is accepted.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDateTime;
use nom::{
    character::complete::{char, digit1, one_of},
    combinator::{all_consuming, map},
    sequence::{delimited, preceded, terminated, tuple},
    IResult,
};
use shared::{GridExtent, LogEvent};

use crate::error::{LineRejection, LogLoadError, SaveError};
use crate::grid::VoxelGrid;
use crate::validation::validate_coords;

/// Limits applied when loading a log file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLimits {
    pub max_file_bytes: u64,
    pub max_lines: usize,
    pub max_line_chars: usize,
    /// Per line, for each of `P(..)` and `E(..)`
    pub max_tokens_per_line: usize,
    /// Cumulative placements during replay
    pub max_cubes: usize,
}

impl Default for LogLimits {
    fn default() -> Self {
        Self {
            max_file_bytes: 1024 * 1024,
            max_lines: 100_000,
            max_line_chars: 100_000,
            max_tokens_per_line: 100,
            max_cubes: 100_000,
        }
    }
}

/// Append-only event history
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectLog {
    events: Vec<LogEvent>,
}

impl ProjectLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: LogEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[LogEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Numbered text lines, starting at 1
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.events
            .iter()
            .enumerate()
            .map(|(i, event)| event.to_line(i + 1))
    }

    pub fn to_text(&self) -> String {
        self.lines().collect::<Vec<_>>().join("\n")
    }
}

impl FromIterator<LogEvent> for ProjectLog {
    fn from_iter<I: IntoIterator<Item = LogEvent>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

// ── Grammar ───────────────────────────────────────────────

/// `(x,y,z)` as raw digit strings
fn coord_triple(input: &str) -> IResult<&str, [&str; 3]> {
    map(
        delimited(
            char('('),
            tuple((digit1, preceded(char(','), digit1), preceded(char(','), digit1))),
            char(')'),
        ),
        |(x, y, z)| [x, y, z],
    )(input)
}

/// `P(x,y,z)` or `E(x,y,z)`
fn command(input: &str) -> IResult<&str, (char, [&str; 3])> {
    tuple((one_of("PE"), coord_triple))(input)
}

/// `N:` prefix followed by exactly one command and nothing else
fn numbered_line(input: &str) -> IResult<&str, (char, [&str; 3])> {
    all_consuming(preceded(terminated(digit1, char(':')), command))(input)
}

/// True if `line` matches the persisted line grammar (coordinates unchecked)
pub fn matches_line_grammar(line: &str) -> bool {
    numbered_line(line).is_ok()
}

/// Count `P(x,y,z)` and `E(x,y,z)` occurrences anywhere in `line`
fn count_commands(line: &str) -> (usize, usize) {
    let mut place = 0;
    let mut erase = 0;
    for (i, c) in line.char_indices() {
        if c != 'P' && c != 'E' {
            continue;
        }
        if coord_triple(&line[i + 1..]).is_ok() {
            if c == 'P' {
                place += 1;
            } else {
                erase += 1;
            }
        }
    }
    (place, erase)
}

/// Parse one persisted line into an event.
///
/// The sequence number is not kept; applied events are renumbered.
pub fn parse_line(line: &str) -> Result<LogEvent, LineRejection> {
    let (_, (tag, [x, y, z])) = numbered_line(line).map_err(|_| LineRejection::Malformed)?;

    // Digit runs too long for u64 are out of range by definition
    let coord = |s: &str| s.parse::<u64>().unwrap_or(u64::MAX);
    let pos = validate_coords(coord(x), coord(y), coord(z))?;

    Ok(match tag {
        'P' => LogEvent::place(pos),
        _ => LogEvent::erase(pos),
    })
}

/// Check one raw line against the per-line limits, the grammar and the grid.
pub fn check_line(
    line: &str,
    extent: &GridExtent,
    limits: &LogLimits,
) -> Result<LogEvent, LineRejection> {
    if line.len() > limits.max_line_chars && line.chars().count() > limits.max_line_chars {
        return Err(LineRejection::TooLong);
    }

    let (place, erase) = count_commands(line);
    if place > limits.max_tokens_per_line || erase > limits.max_tokens_per_line {
        return Err(LineRejection::TooManyTokens);
    }

    let event = parse_line(line)?;
    if !extent.contains(event.pos().to_cell()) {
        return Err(LineRejection::OutsideGrid);
    }
    Ok(event)
}

/// Drop every line that does not match the line grammar
pub fn sanitize_log_text(text: &str) -> String {
    text.lines()
        .filter(|line| matches_line_grammar(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `project_log_YYYY-MM-DD_HH-MM-SS.txt`
pub fn default_log_file_name(now: NaiveDateTime) -> String {
    format!("project_log_{}.txt", now.format("%Y-%m-%d_%H-%M-%S"))
}

/// Result of replaying a log file
#[derive(Debug, Clone, Default)]
pub struct LoadedLog {
    pub grid: VoxelGrid,
    /// Applied events, renumbered from 1
    pub events: ProjectLog,
    /// Skipped lines as `(1-based line number, reason)`
    pub rejections: Vec<(usize, LineRejection)>,
}

/// Replay log text into a fresh grid.
///
/// Place and Erase lines are both applied in order. Lines that fail a
/// per-line check are skipped and reported. File-level limits fail the
/// whole load.
pub fn load_log_text(
    text: &str,
    extent: &GridExtent,
    limits: &LogLimits,
) -> Result<LoadedLog, LogLoadError> {
    let count = text.lines().count();
    if count > limits.max_lines {
        return Err(LogLoadError::TooManyLines {
            count,
            limit: limits.max_lines,
        });
    }

    let mut loaded = LoadedLog::default();
    let mut placed = 0usize;

    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let event = match check_line(line, extent, limits) {
            Ok(event) => event,
            Err(reason) => {
                tracing::warn!(line = i + 1, %reason, "skipping log line");
                loaded.rejections.push((i + 1, reason));
                continue;
            }
        };

        let cell = event.pos().to_cell();
        match event {
            LogEvent::Place { .. } => {
                if placed >= limits.max_cubes {
                    return Err(LogLoadError::TooManyCubes {
                        limit: limits.max_cubes,
                    });
                }
                placed += 1;
                loaded.grid.add(cell);
            }
            LogEvent::Erase { .. } => {
                loaded.grid.remove(cell);
            }
        }
        loaded.events.push(event);
    }

    tracing::info!(
        cubes = loaded.grid.len(),
        events = loaded.events.len(),
        rejected = loaded.rejections.len(),
        "replayed project log"
    );
    Ok(loaded)
}

/// Read and replay a log file.
///
/// The read itself is capped at one byte past the size limit, so files whose
/// metadata under-reports their length (pipes, devices, `/proc`) are still
/// bounded.
pub fn load_log_file(
    path: &Path,
    extent: &GridExtent,
    limits: &LogLimits,
) -> Result<LoadedLog, LogLoadError> {
    let file = File::open(path)?;
    let size = file.metadata()?.len();
    if size > limits.max_file_bytes {
        return Err(LogLoadError::FileTooLarge {
            size,
            limit: limits.max_file_bytes,
        });
    }

    let mut bytes = Vec::new();
    file.take(limits.max_file_bytes.saturating_add(1))
        .read_to_end(&mut bytes)?;
    if bytes.len() as u64 > limits.max_file_bytes {
        return Err(LogLoadError::FileTooLarge {
            size: bytes.len() as u64,
            limit: limits.max_file_bytes,
        });
    }
    let text = String::from_utf8(bytes).map_err(|_| LogLoadError::NotUtf8)?;
    load_log_text(&text, extent, limits)
}

/// Write the sanitized log to `path` through a temporary sibling file.
pub fn save_log_file(path: &Path, log: &ProjectLog) -> Result<(), SaveError> {
    let text = sanitize_log_text(&log.to_text());
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".part");
    let tmp = std::path::PathBuf::from(tmp);

    if let Err(e) = std::fs::write(&tmp, text).and_then(|()| std::fs::rename(&tmp, path)) {
        let _ = std::fs::remove_file(&tmp);
        tracing::error!(path = %path.display(), error = %e, "failed to save project log");
        return Err(e.into());
    }

    tracing::info!(path = %path.display(), events = log.len(), "saved project log");
    Ok(())
}
