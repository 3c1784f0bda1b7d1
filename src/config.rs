//! Session and player configuration.

use std::time::Duration;

const DEFAULT_TERM: &str = "xterm-256color";
const FALLBACK_SHELL: &str = "sh";

/// How the shell session is launched.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Shell program; also exported to the child as `SHELL`.
    pub shell: String,
    /// Exported to the child as `TERM`.
    pub term: String,
    /// Forced prompt. Empty means keep the shell's own prompt.
    pub ps1: String,
    /// Variable names copied from this process's environment when present.
    pub env_passthrough: Vec<String>,
    /// Terminal width. Zero leaves the default geometry.
    pub cols: u16,
    /// Terminal height. Zero leaves the default geometry.
    pub rows: u16,
    pub probe: ProbeTimeouts,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            shell: std::env::var("SHELL").unwrap_or_else(|_| FALLBACK_SHELL.to_string()),
            term: DEFAULT_TERM.to_string(),
            ps1: String::new(),
            env_passthrough: Vec::new(),
            cols: 0,
            rows: 0,
            probe: ProbeTimeouts::default(),
        }
    }
}

/// Read timeouts used while draining startup output and probing the prompt.
#[derive(Debug, Clone, Copy)]
pub struct ProbeTimeouts {
    /// A read that comes back empty after this long means the shell is idle.
    pub settle: Duration,
    /// How long to wait for the first response to a probe newline.
    pub first_response: Duration,
    /// Maximum bytes taken per read.
    pub read_chunk: usize,
}

impl Default for ProbeTimeouts {
    fn default() -> Self {
        Self {
            settle: Duration::from_secs(1),
            first_response: Duration::from_secs(10),
            read_chunk: 1024,
        }
    }
}

/// Pacing of the script player.
#[derive(Debug, Clone, Copy)]
pub struct PlayerConfig {
    /// Delay after every typed character. `@typing-interval` overrides it.
    pub typing_interval: Duration,
    /// Pause after a blank line. Zero disables it.
    pub empty_line_interval: Duration,
    /// Fraction (0..=1) by which each character delay is randomly varied.
    pub typing_jitter: f64,
    /// How often the player checks for a fresh prompt.
    pub prompt_poll: Duration,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            typing_interval: Duration::from_millis(100),
            empty_line_interval: Duration::from_secs(1),
            typing_jitter: 0.0,
            prompt_poll: Duration::from_millis(100),
        }
    }
}
