//! Script parser.
//!
//! A script is literal shell input. Each line becomes one [`ScriptStep`]:
//!
//! | Line | Step |
//! |------|------|
//! | empty or whitespace only | [`BlankLine`] |
//! | starts with `#` | [`Comment`] |
//! | starts with `@` | a directive: `@pause`, `@sleep <secs>`, `@typing-interval <secs>` |
//! | anything else | [`ShellLine`] |
//!
//! The top-level entry points are [`parse_str`] and [`parse_file`].

use crate::command::ScriptStep;
use crate::commands::{BlankLine, Comment, Pause, ShellLine, Sleep, TypingInterval};
use crate::error::ReplayError;
use anyhow::{Context as _, Result, anyhow};
use std::path::Path;
use std::time::Duration;

const DIRECTIVE_MARKER: char = '@';
const COMMENT_MARKER: char = '#';

/// Parse a script from a string slice and return one step per line.
///
/// Lines keep their trailing newline so they can be typed verbatim. A final
/// line without one gets one, and `\r\n` endings become `\n`.
///
/// # Errors
///
/// Returns an error if a directive is unknown or has a malformed argument.
///
/// # Example
///
/// ```
/// use playpty::parse_str;
///
/// let steps = parse_str("@sleep 1\necho hello\n\n# done\n").unwrap();
/// assert_eq!(steps.len(), 4);
/// ```
pub fn parse_str(content: &str) -> Result<Vec<Box<dyn ScriptStep>>> {
    let mut steps = Vec::new();
    for (line_num, raw) in content.split_inclusive('\n').enumerate() {
        let line = normalize_line(raw);
        let step = parse_line(&line, line_num + 1)
            .with_context(|| format!("Failed to parse line {}: {}", line_num + 1, line.trim_end()))?;
        steps.push(step);
    }
    Ok(steps)
}

/// Parse a script from a file and return one step per line.
///
/// Reads the entire file into memory and delegates to [`parse_str`].
///
/// # Errors
///
/// Returns [`ReplayError::ScriptNotFound`] if the file does not exist, or an
/// error if it cannot be read or is malformed.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Vec<Box<dyn ScriptStep>>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ReplayError::ScriptNotFound(path.to_path_buf()).into());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script file: {}", path.display()))?;
    parse_str(&content)
}

type ParseFn = fn(&str) -> Result<Box<dyn ScriptStep>>;

static DIRECTIVES: &[(&str, ParseFn)] = &[
    (Pause::NAME, Pause::parse_boxed),
    (Sleep::NAME, Sleep::parse_boxed),
    (TypingInterval::NAME, TypingInterval::parse_boxed),
];

fn normalize_line(raw: &str) -> String {
    let body = raw.strip_suffix('\n').unwrap_or(raw);
    let body = body.strip_suffix('\r').unwrap_or(body);
    format!("{body}\n")
}

/// Classify one newline-terminated line.
fn parse_line(line: &str, line_num: usize) -> Result<Box<dyn ScriptStep>> {
    let content = line.trim();
    if content.is_empty() {
        return BlankLine::parse_boxed(line);
    }
    if content.starts_with(COMMENT_MARKER) {
        return Comment::parse_boxed(line);
    }
    if let Some(directive) = content.strip_prefix(DIRECTIVE_MARKER) {
        return parse_directive(directive, line_num);
    }
    ShellLine::parse_boxed(line)
}

/// Dispatch a directive (without its `@`) to the matching parser.
///
/// To add a new directive, add one entry to [`DIRECTIVES`] using its `NAME`
/// constant and `parse_boxed` function pointer.
fn parse_directive(directive: &str, line_num: usize) -> Result<Box<dyn ScriptStep>> {
    let (name, args) = directive
        .split_once(char::is_whitespace)
        .unwrap_or((directive, ""));
    DIRECTIVES
        .iter()
        .find(|(directive_name, _)| *directive_name == name)
        .map(|(_, parse)| parse(args))
        .unwrap_or_else(|| {
            Err(ReplayError::Parse {
                line: line_num,
                message: format!("Unknown directive: {DIRECTIVE_MARKER}{name}"),
            }
            .into())
        })
}

/// Parse a directive duration: plain seconds (`2`, `0.05`) or a suffixed
/// duration (`1.5s`, `500ms`).
pub fn parse_seconds(s: &str) -> Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return Err(anyhow!("Expected a duration in seconds"));
    }
    match s.parse::<f64>() {
        Ok(secs) => Duration::try_from_secs_f64(secs)
            .with_context(|| format!("Invalid seconds value: {s}")),
        Err(_) => parse_duration(s),
    }
}

/// Parse a duration string: `1s`, `500ms`, `1.5s`.
pub(crate) fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if let Some(ms_str) = s.strip_suffix("ms") {
        let ms: u64 = ms_str
            .trim()
            .parse()
            .context("Invalid milliseconds value")?;
        Ok(Duration::from_millis(ms))
    } else if let Some(s_str) = s.strip_suffix('s') {
        let secs: f64 = s_str.trim().parse().context("Invalid seconds value")?;
        Duration::try_from_secs_f64(secs).context("Invalid seconds value")
    } else {
        Err(anyhow!("Duration must be seconds or end with 's' or 'ms', got: {}", s))
    }
}
