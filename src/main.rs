use anyhow::{Context, Result};
use clap::Parser;
use playpty::parser::parse_seconds;
use playpty::{PlayerConfig, ProbeTimeouts, Session, SessionConfig, parse_file};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "playpty",
    about = "Replay a script of shell commands into a PTY with human-like typing",
    version
)]
struct Args {
    /// Script file with the shell commands to replay
    file: PathBuf,

    /// Force this PS1 prompt in the shell
    #[arg(long, default_value = "")]
    ps1: String,

    /// Shell to run
    #[arg(long, env = "SHELL", default_value = "sh")]
    shell: String,

    /// TERM value for the shell
    #[arg(long, default_value = "xterm-256color")]
    term: String,

    /// Terminal width (zero or less keeps the default)
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    cols: i32,

    /// Terminal height (zero or less keeps the default)
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    rows: i32,

    /// Environment variables to pass through to the shell
    #[arg(long, num_args = 1..)]
    env: Vec<String>,

    /// Delay after each typed character, in seconds
    #[arg(long, default_value = "0.1", value_parser = parse_seconds)]
    typing_interval: Duration,

    /// Pause after a blank line, in seconds
    #[arg(long, default_value = "1", value_parser = parse_seconds)]
    empty_line_interval: Duration,

    /// Random variation of the typing delay, as a fraction of it (0 to 1)
    #[arg(long, default_value_t = 0.0)]
    typing_jitter: f64,
}

impl Args {
    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            shell: self.shell.clone(),
            term: self.term.clone(),
            ps1: self.ps1.clone(),
            env_passthrough: self.env.clone(),
            cols: dimension(self.cols),
            rows: dimension(self.rows),
            probe: ProbeTimeouts::default(),
        }
    }

    fn player_config(&self) -> PlayerConfig {
        PlayerConfig {
            typing_interval: self.typing_interval,
            empty_line_interval: self.empty_line_interval,
            typing_jitter: self.typing_jitter,
            ..PlayerConfig::default()
        }
    }
}

/// Map a command-line dimension to the terminal size; 0 means no resize.
fn dimension(value: i32) -> u16 {
    u16::try_from(value).unwrap_or(if value > 0 { u16::MAX } else { 0 })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Stdout carries the transcript, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    let steps = parse_file(&args.file)
        .with_context(|| format!("Failed to load script: {}", args.file.display()))?;

    let mut session = Session::start(&args.session_config()).context("Failed to start shell session")?;

    let played = session.play(&steps, args.player_config()).await;
    session.close().context("Failed to close shell session")?;
    played.context("Failed to play script")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_geometry_means_no_resize() {
        let args =
            Args::try_parse_from(["playpty", "demo.sh", "--cols", "-1", "--rows", "-1"]).unwrap();
        let config = args.session_config();
        assert_eq!((config.cols, config.rows), (0, 0));
    }

    #[test]
    fn test_geometry_defaults_to_no_resize() {
        let config = Args::try_parse_from(["playpty", "demo.sh"])
            .unwrap()
            .session_config();
        assert_eq!((config.cols, config.rows), (0, 0));
    }

    #[test]
    fn test_positive_geometry_is_kept() {
        let args =
            Args::try_parse_from(["playpty", "demo.sh", "--cols", "120", "--rows", "40"]).unwrap();
        let config = args.session_config();
        assert_eq!((config.cols, config.rows), (120, 40));
        assert_eq!(dimension(100_000), u16::MAX);
    }
}
