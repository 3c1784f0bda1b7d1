use crate::command::{Context, ScriptStep};
use crate::config::PlayerConfig;
use crate::pty::PtyInput;
use crate::relay::OutputHandler;
use crate::timing::TimingState;
use anyhow::{Context as _, Result};
use std::io::BufRead;
use std::sync::Arc;
use tracing::{debug, trace};

/// Plays a parsed script into the shell, one step at a time.
///
/// Commands are paced against the prompt: the player only moves on once the
/// output relay has stamped a prompt after the command's last character.
pub struct Player {
    config: PlayerConfig,
    timing: Arc<TimingState>,
    output_handler: OutputHandler,
    prompt_display: String,
}

impl Player {
    pub fn new(
        config: PlayerConfig,
        timing: Arc<TimingState>,
        output_handler: OutputHandler,
        prompt_display: impl Into<String>,
    ) -> Self {
        Self {
            config,
            timing,
            output_handler,
            prompt_display: prompt_display.into(),
        }
    }

    /// Execute every step in order.
    ///
    /// `operator` supplies the Enter presses `@pause` waits for.
    pub async fn play(
        &self,
        input: &mut dyn PtyInput,
        operator: &mut dyn BufRead,
        steps: &[Box<dyn ScriptStep>],
    ) -> Result<()> {
        let mut ctx = Context::new(
            input,
            operator,
            self.timing.clone(),
            self.output_handler.clone(),
            self.prompt_display.clone(),
            &self.config,
        );

        debug!(steps = steps.len(), "Playing script");
        for (idx, step) in steps.iter().enumerate() {
            trace!(line = idx + 1, step = step.name(), "Executing");
            step.execute(&mut ctx)
                .await
                .with_context(|| format!("Failed to execute line {} ({})", idx + 1, step.name()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::testing::{RecordingInput, fast_config, null_output};
    use crate::error::ReplayError;
    use crate::parser::parse_str;
    use std::io::Cursor;
    use std::time::{Duration, Instant};

    fn player(timing: Arc<TimingState>, config: PlayerConfig) -> Player {
        Player::new(config, timing, null_output(), "$ ")
    }

    #[tokio::test]
    async fn test_directives_never_reach_the_shell() {
        let timing = Arc::new(TimingState::new());
        let mut input = RecordingInput::default();
        let mut operator = Cursor::new(b"\n".to_vec());
        let steps = parse_str("@typing-interval 0.001\n@sleep 10ms\n@pause\n").unwrap();

        player(timing, fast_config())
            .play(&mut input, &mut operator, &steps)
            .await
            .unwrap();
        assert!(input.written.is_empty());
    }

    #[tokio::test]
    async fn test_comments_and_blanks_take_only_configured_delays() {
        let timing = Arc::new(TimingState::new());
        let mut input = RecordingInput::default();
        let mut operator = Cursor::new(Vec::new());
        let mut config = fast_config();
        config.empty_line_interval = Duration::from_millis(50);
        let steps = parse_str("# one\n\n# two\n\n").unwrap();

        let start = Instant::now();
        tokio::time::timeout(
            Duration::from_secs(5),
            player(timing, config).play(&mut input, &mut operator, &steps),
        )
        .await
        .expect("comment/blank script blocked")
        .unwrap();
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(100));
        assert!(elapsed < Duration::from_secs(2));
        assert_eq!(input.written, b"# one\n\n# two\n\n");
    }

    #[tokio::test]
    async fn test_typing_interval_applies_to_following_lines() {
        let timing = Arc::new(TimingState::new());
        let mut input = RecordingInput::default();
        let mut operator = Cursor::new(Vec::new());
        let steps = parse_str("@typing-interval 30ms\n# abcd\n").unwrap();

        let start = Instant::now();
        player(timing, fast_config())
            .play(&mut input, &mut operator, &steps)
            .await
            .unwrap();
        // Seven characters at 30ms each.
        assert!(start.elapsed() >= Duration::from_millis(210));
    }

    #[tokio::test]
    async fn test_sleep_delays_next_command() {
        let timing = Arc::new(TimingState::new());
        let mut input = RecordingInput::default();
        let mut operator = Cursor::new(Vec::new());
        let steps = parse_str("@sleep 0.2\necho done \\\n").unwrap();

        let start = Instant::now();
        player(timing, fast_config())
            .play(&mut input, &mut operator, &steps)
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(200));
        assert_eq!(input.written, b"echo done \\\n");
    }

    #[tokio::test]
    async fn test_each_command_waits_for_its_own_prompt() {
        let timing = Arc::new(TimingState::new());
        let mut input = RecordingInput::default();
        let mut operator = Cursor::new(Vec::new());
        let steps = parse_str("true\ntrue\n").unwrap();

        // Stand-in relay: answer every typed command with a prompt.
        let relay_timing = timing.clone();
        let relay = std::thread::spawn(move || {
            let mut answered = 0;
            let deadline = Instant::now() + Duration::from_secs(5);
            while answered < 2 && Instant::now() < deadline {
                if relay_timing.last_typing_finished() > relay_timing.last_prompt_seen() {
                    std::thread::sleep(Duration::from_millis(20));
                    relay_timing.mark_prompt_seen();
                    answered += 1;
                }
                std::thread::sleep(Duration::from_millis(1));
            }
            answered
        });

        tokio::time::timeout(
            Duration::from_secs(5),
            player(timing.clone(), fast_config()).play(&mut input, &mut operator, &steps),
        )
        .await
        .expect("player did not see its prompts")
        .unwrap();

        assert_eq!(relay.join().unwrap(), 2);
        assert!(timing.is_acknowledged());
        assert_eq!(input.written, b"true\ntrue\n");
    }

    #[tokio::test]
    async fn test_ended_session_fails_the_run() {
        let timing = Arc::new(TimingState::new());
        timing.mark_session_ended();
        let mut input = RecordingInput::default();
        let mut operator = Cursor::new(Vec::new());
        let steps = parse_str("exit\n").unwrap();

        let err = player(timing, fast_config())
            .play(&mut input, &mut operator, &steps)
            .await
            .unwrap_err();
        assert!(
            err.downcast_ref::<ReplayError>()
                .is_some_and(ReplayError::is_session_ended)
        );
        assert!(format!("{err:#}").contains("line 1"));
    }
}
