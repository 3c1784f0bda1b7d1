//! # playpty
//!
//! Replay a script of shell commands into a pseudo-terminal with human-like
//! typing, for recording terminal demos.
//!
//! The script is plain shell input. Each command line is typed one character
//! at a time and the next line only starts once the shell has printed its
//! prompt again, so the recording shows every command finish before the
//! next one is typed.
//!
//! ## Quick start
//!
//! ```no_run
//! use playpty::{PlayerConfig, Session, SessionConfig, parse_str};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let steps = parse_str("# a tiny demo\necho hello\n@sleep 1\nls\n")?;
//!
//!     let config = SessionConfig {
//!         shell: "bash".to_string(),
//!         ps1: "$ ".to_string(),
//!         ..SessionConfig::default()
//!     };
//!     let mut session = Session::start(&config)?;
//!     session.play(&steps, PlayerConfig::default()).await?;
//!     session.close()
//! }
//! ```
//!
//! ## How the prompt is found
//!
//! Before replay the shell is sent bare newlines and whatever it prints after
//! the last carriage return is taken as its prompt. Up to three samples are
//! taken and the majority wins, which copes with prompts that show the time.
//! While the script runs, a relay thread mirrors the shell's output and
//! stamps the moment the output ends with that prompt; the player compares
//! that stamp with the moment it finished typing.
//!
//! ## Script syntax
//!
//! | Line | Effect |
//! |------|--------|
//! | `ls -la` | Typed character by character, then wait for the prompt |
//! | `echo a \` | Typed, no wait: the shell expects more input |
//! | `clear` | Typed, no wait |
//! | `# comment` | Typed verbatim, no wait |
//! | *(blank)* | Newline typed, then the empty-line pause |
//! | `@pause` | Wait for Enter on the operator's terminal |
//! | `@sleep 2` | Pause for 2 seconds (`1.5s` and `500ms` also work) |
//! | `@typing-interval 0.05` | Change the per-character delay |
//!
//! ## Custom output handling
//!
//! By default [`Session::start`] mirrors the shell to stdout. Use
//! [`Session::start_with_handler`] to capture it instead:
//!
//! ```no_run
//! use playpty::{PlayerConfig, Session, SessionConfig, parse_str};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let captured = std::sync::Arc::new(std::sync::Mutex::new(Vec::<u8>::new()));
//!     let sink = captured.clone();
//!
//!     let mut session = Session::start_with_handler(&SessionConfig::default(), move |data| {
//!         sink.lock().unwrap().extend_from_slice(data);
//!     })?;
//!     session.play(&parse_str("echo hi\n")?, PlayerConfig::default()).await?;
//!     session.close()?;
//!
//!     println!("{}", String::from_utf8_lossy(&captured.lock().unwrap()));
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod commands;
pub mod config;
pub mod error;
pub mod parser;
pub mod player;
pub mod prompt;
pub mod pty;
pub mod pty_reader;
pub mod relay;
pub mod session;
pub mod timing;

pub use command::{Context, ScriptStep};
pub use commands::{BlankLine, Comment, Pause, ShellLine, Sleep, TypingInterval};
pub use config::{PlayerConfig, ProbeTimeouts, SessionConfig};
pub use error::ReplayError;
pub use parser::{parse_file, parse_str};
pub use player::Player;
pub use prompt::PromptSignature;
pub use pty_reader::PtyReader;
pub use session::Session;
pub use timing::TimingState;
