//! Engine and editor log analysis.
//!
//! Keyboard Maestro writes plain-text logs where each line starts with a
//! `YYYY-MM-DD HH:MM:SS` timestamp. The engine reports macro failures only
//! here, never through the scripting interface, so error triage means
//! parsing these files: classify lines by error keywords, attribute them to
//! macros by name, and aggregate over a time window.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use chrono::{Duration, NaiveDateTime};
use regex::Regex;
use serde::Serialize;

use crate::error::Result;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Substrings that mark a log line as an error report.
const ERROR_KEYWORDS: [&str; 4] = ["failed", "error", "cancelled", "timeout"];

/// How many raw error lines an [`ErrorSummary`] carries.
const RECENT_ERROR_LINES: usize = 10;

/// Key that collects error lines naming no macro.
pub const UNATTRIBUTED: &str = "Unknown";

static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}) (.*)$"#).expect("timestamp regex")
});

static MACRO_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)macro "([^"]+)""#).expect("macro name regex"));

static ACTION_INDEX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\baction (\d+)\b"#).expect("action index regex"));

/// One timestamped log entry. Lines without the timestamp prefix (the
/// continuations of multi-line messages) are dropped during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub timestamp: NaiveDateTime,
    pub message: String,
}

impl LogEntry {
    /// Whether the message carries one of the engine's error keywords.
    pub fn is_error(&self) -> bool {
        let lower = self.message.to_lowercase();
        ERROR_KEYWORDS.iter().any(|k| lower.contains(k))
    }

    /// Macro name quoted in the message, from patterns such as
    /// `Macro "name"` and `Execute macro "name"`.
    pub fn macro_name(&self) -> Option<String> {
        MACRO_NAME_RE
            .captures(&self.message)
            .map(|c| c[1].to_string())
    }

    /// 1-based action position named in the message, when present
    /// (`... in Pause action 3 ...`).
    pub fn action_index(&self) -> Option<usize> {
        ACTION_INDEX_RE
            .captures(&self.message)
            .and_then(|c| c[1].parse().ok())
    }

    /// Reconstruct the line as it appeared in the file.
    pub fn format_line(&self) -> String {
        format!("{} {}", self.timestamp.format(TIMESTAMP_FORMAT), self.message)
    }
}

/// Error picture for one macro within the summary window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MacroErrorCount {
    pub name: String,
    pub count: usize,
    /// Message of the macro's most recent in-window error.
    pub last_message: String,
    pub last_timestamp: NaiveDateTime,
}

/// Aggregated error picture over a recent time window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorSummary {
    pub window_minutes: u64,
    /// Every in-window error line.
    pub total_errors: usize,
    /// Per-macro counts, highest first. Lines naming no macro are
    /// collected under [`UNATTRIBUTED`].
    pub by_macro: Vec<MacroErrorCount>,
    /// Up to ten most recent error lines across all macros, oldest first.
    pub recent: Vec<String>,
}

/// Parse raw log text into entries. Lines without the timestamp prefix
/// are dropped.
pub fn parse_entries(text: &str) -> Vec<LogEntry> {
    text.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<LogEntry> {
    let caps = TIMESTAMP_RE.captures(line)?;
    let timestamp = NaiveDateTime::parse_from_str(&caps[1], TIMESTAMP_FORMAT).ok()?;
    Some(LogEntry {
        timestamp,
        message: caps[2].to_string(),
    })
}

/// Read a log file and parse its last `limit` lines, in file order.
pub fn tail_entries(path: &Path, limit: usize) -> Result<Vec<LogEntry>> {
    let text = fs::read_to_string(path)?;
    let lines: Vec<&str> = text.lines().collect();
    let keep_from = lines.len().saturating_sub(limit);
    Ok(lines[keep_from..].iter().filter_map(|l| parse_line(l)).collect())
}

/// Summarize the error entries of `entries` that fall within
/// `window_minutes` of `now`.
pub fn summarize_entries(
    entries: &[LogEntry],
    window_minutes: u64,
    now: NaiveDateTime,
) -> ErrorSummary {
    // Windows too wide for chrono to represent behave as unbounded.
    let cutoff = i64::try_from(window_minutes)
        .ok()
        .and_then(Duration::try_minutes)
        .and_then(|d| now.checked_sub_signed(d))
        .unwrap_or(NaiveDateTime::MIN);

    let mut total_errors = 0;
    let mut groups: std::collections::BTreeMap<String, MacroErrorCount> =
        std::collections::BTreeMap::new();
    let mut recent = Vec::new();

    for entry in entries {
        if entry.timestamp < cutoff || !entry.is_error() {
            continue;
        }
        total_errors += 1;
        let name = entry.macro_name().unwrap_or_else(|| UNATTRIBUTED.to_string());
        groups
            .entry(name.clone())
            .and_modify(|g| {
                g.count += 1;
                // Entries arrive in file order, so the latest one wins.
                g.last_message = entry.message.clone();
                g.last_timestamp = entry.timestamp;
            })
            .or_insert_with(|| MacroErrorCount {
                name,
                count: 1,
                last_message: entry.message.clone(),
                last_timestamp: entry.timestamp,
            });
        recent.push(entry.format_line());
    }

    let drop = recent.len().saturating_sub(RECENT_ERROR_LINES);
    recent.drain(..drop);

    let mut by_macro: Vec<MacroErrorCount> = groups.into_values().collect();
    by_macro.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

    ErrorSummary {
        window_minutes,
        total_errors,
        by_macro,
        recent,
    }
}

/// Read a log file and summarize its recent errors.
pub fn summarize_errors(path: &Path, window_minutes: u64, now: NaiveDateTime) -> Result<ErrorSummary> {
    let text = fs::read_to_string(path)?;
    let entries = parse_entries(&text);
    Ok(summarize_entries(&entries, window_minutes, now))
}
