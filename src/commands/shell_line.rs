//! [`ShellLine`] step — a command typed into the shell.

use crate::command::{Context, ScriptStep};
use anyhow::Result;
use async_trait::async_trait;

const CONTINUATION: &str = "\\\n";
const CLEAR_SCREEN: &str = "clear";

/// Types a command one character at a time, then waits for the shell to
/// print a fresh prompt before the next line runs.
///
/// The wait is skipped for lines ending in a `\` continuation, where the
/// shell is still collecting input, and for `clear`, whose prompt redraw is
/// not reliably seen.
pub struct ShellLine {
    /// The line as read, including its trailing newline.
    pub line: String,
}

impl ShellLine {
    pub const NAME: &'static str = "command";

    pub fn new(line: impl Into<String>) -> Self {
        Self { line: line.into() }
    }

    pub fn is_continuation(&self) -> bool {
        self.line.ends_with(CONTINUATION)
    }

    pub fn is_clear_screen(&self) -> bool {
        self.line.trim() == CLEAR_SCREEN
    }

    pub fn waits_for_prompt(&self) -> bool {
        !self.is_continuation() && !self.is_clear_screen()
    }
}

#[async_trait(?Send)]
impl ScriptStep for ShellLine {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: &str) -> Result<Self> {
        Ok(Self::new(args))
    }

    async fn execute(&self, ctx: &mut Context<'_>) -> Result<()> {
        ctx.type_text(&self.line).await?;
        if self.waits_for_prompt() {
            ctx.wait_for_prompt().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::testing::*;
    use crate::error::ReplayError;
    use crate::pty::PtyInput;
    use crate::timing::TimingState;
    use std::io::Cursor;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    #[test]
    fn test_waits_for_prompt() {
        assert!(ShellLine::new("echo hi\n").waits_for_prompt());
        assert!(!ShellLine::new("echo a \\\n").waits_for_prompt());
        assert!(!ShellLine::new("clear\n").waits_for_prompt());
        assert!(!ShellLine::new("  clear  \n").waits_for_prompt());
        assert!(ShellLine::new("clear; ls\n").waits_for_prompt());
        // Only a backslash right before the newline continues the line.
        assert!(ShellLine::new("echo a \\ \n").waits_for_prompt());
    }

    #[tokio::test]
    async fn test_command_waits_for_prompt_after_typing() {
        let timing = Arc::new(TimingState::new());
        let mut input = RecordingInput::default();
        let mut operator = Cursor::new(Vec::new());
        let mut ctx = context(&mut input, &mut operator, timing.clone(), &fast_config());

        // A prompt seen before typing does not count.
        timing.mark_prompt_seen();

        let relay_timing = timing.clone();
        let relay = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(200));
            relay_timing.mark_prompt_seen();
        });

        let start = Instant::now();
        ShellLine::new("echo hi\n").execute(&mut ctx).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(200));
        assert!(timing.last_prompt_seen() > timing.last_typing_finished());
        relay.join().unwrap();

        drop(ctx);
        assert_eq!(input.written, b"echo hi\n");
    }

    /// A shell that prints its prompt before the newline's write returns.
    struct InstantShell {
        timing: Arc<TimingState>,
        written: Vec<u8>,
    }

    impl PtyInput for InstantShell {
        fn write(&mut self, data: &[u8]) -> Result<(), ReplayError> {
            self.written.extend_from_slice(data);
            if data == b"\n" {
                self.timing.mark_prompt_seen();
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_prompt_during_final_keystroke_is_not_lost() {
        let timing = Arc::new(TimingState::new());
        let mut shell = InstantShell {
            timing: timing.clone(),
            written: Vec::new(),
        };
        let mut operator = Cursor::new(Vec::new());
        let mut ctx = crate::command::Context::new(
            &mut shell,
            &mut operator,
            timing.clone(),
            null_output(),
            "$ ",
            &fast_config(),
        );

        for line in ["echo hi\n", "true\n", "echo done\n"] {
            tokio::time::timeout(Duration::from_secs(2), ShellLine::new(line).execute(&mut ctx))
                .await
                .expect("prompt printed during the last keystroke was missed")
                .unwrap();
            assert!(timing.is_acknowledged());
        }
        drop(ctx);
        assert_eq!(shell.written, b"echo hi\ntrue\necho done\n");
    }

    #[tokio::test]
    async fn test_continuation_does_not_wait() {
        let timing = Arc::new(TimingState::new());
        let mut input = RecordingInput::default();
        let mut operator = Cursor::new(Vec::new());
        let mut ctx = context(&mut input, &mut operator, timing, &fast_config());

        tokio::time::timeout(
            Duration::from_secs(2),
            ShellLine::new("echo one \\\n").execute(&mut ctx),
        )
        .await
        .expect("continuation line waited for a prompt")
        .unwrap();
        drop(ctx);
        assert_eq!(input.written, b"echo one \\\n");
    }

    #[tokio::test]
    async fn test_clear_does_not_wait() {
        let timing = Arc::new(TimingState::new());
        let mut input = RecordingInput::default();
        let mut operator = Cursor::new(Vec::new());
        let mut ctx = context(&mut input, &mut operator, timing, &fast_config());

        tokio::time::timeout(
            Duration::from_secs(2),
            ShellLine::new("clear\n").execute(&mut ctx),
        )
        .await
        .expect("clear waited for a prompt")
        .unwrap();
    }
}
