//! The [`ScriptStep`] trait and the [`Context`] type steps receive when executed.

use crate::config::PlayerConfig;
use crate::error::ReplayError;
use crate::pty::PtyInput;
use crate::relay::OutputHandler;
use crate::timing::TimingState;
use anyhow::Result;
use async_trait::async_trait;
use rand::Rng;
use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::task::block_in_place;
use tokio::time::sleep;

/// Execution context passed to [`ScriptStep::execute`].
///
/// Holds the shell input, the timing state shared with the output relay and
/// the pacing that directives may change while the script runs.
pub struct Context<'a> {
    pub(crate) input: &'a mut dyn PtyInput,
    pub(crate) operator: &'a mut dyn BufRead,
    pub(crate) timing: Arc<TimingState>,
    pub(crate) output_handler: OutputHandler,
    pub(crate) prompt_display: String,
    pub(crate) typing_interval: Duration,
    pub(crate) empty_line_interval: Duration,
    pub(crate) typing_jitter: f64,
    pub(crate) prompt_poll: Duration,
}

impl<'a> Context<'a> {
    pub fn new(
        input: &'a mut dyn PtyInput,
        operator: &'a mut dyn BufRead,
        timing: Arc<TimingState>,
        output_handler: OutputHandler,
        prompt_display: impl Into<String>,
        config: &PlayerConfig,
    ) -> Self {
        Self {
            input,
            operator,
            timing,
            output_handler,
            prompt_display: prompt_display.into(),
            typing_interval: config.typing_interval,
            empty_line_interval: config.empty_line_interval,
            typing_jitter: config.typing_jitter.clamp(0.0, 1.0),
            prompt_poll: config.prompt_poll,
        }
    }

    /// Type `text` into the shell one character at a time.
    ///
    /// Every character is followed by the current typing delay. The moment
    /// just before the final character is written becomes the
    /// last-typing-finished timestamp.
    pub async fn type_text(&mut self, text: &str) -> Result<(), ReplayError> {
        let mut buf = [0u8; 4];
        let mut chars = text.chars().peekable();
        while let Some(ch) = chars.next() {
            if chars.peek().is_none() {
                // Stamp before writing: the relay may see the answering
                // prompt before this write even returns.
                let at = self.timing.now();
                self.input.write(ch.encode_utf8(&mut buf).as_bytes())?;
                self.timing.mark_typing_finished_at(at);
            } else {
                self.input.write(ch.encode_utf8(&mut buf).as_bytes())?;
            }
            sleep(self.char_delay()).await;
        }
        Ok(())
    }

    /// Block until the shell has printed a prompt after the last typed line.
    ///
    /// A shell that never answers keeps this waiting. A session that has
    /// ended fails with [`ReplayError::SessionEnded`].
    pub async fn wait_for_prompt(&self) -> Result<(), ReplayError> {
        loop {
            if self.timing.is_acknowledged() {
                return Ok(());
            }
            if self.timing.session_ended() {
                return Err(ReplayError::SessionEnded(None));
            }
            sleep(self.prompt_poll).await;
        }
    }

    /// Pass bytes through the output handler (e.g. to stdout or a custom sink).
    pub fn emit(&self, data: &[u8]) {
        (self.output_handler)(data);
    }

    /// Block until the operator enters a line.
    ///
    /// On a multi-threaded runtime the read is moved off the worker with
    /// `block_in_place`. A current-thread runtime has no other worker to hand
    /// its tasks to, so there the read simply blocks.
    pub fn wait_for_operator(&mut self) -> std::io::Result<()> {
        let mut line = String::new();
        let operator = &mut *self.operator;
        let mut read = || operator.read_line(&mut line).map(|_| ());
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                block_in_place(read)
            }
            _ => read(),
        }
    }

    pub fn typing_interval(&self) -> Duration {
        self.typing_interval
    }

    pub fn set_typing_interval(&mut self, interval: Duration) {
        self.typing_interval = interval;
    }

    pub fn empty_line_interval(&self) -> Duration {
        self.empty_line_interval
    }

    pub fn prompt_display(&self) -> &str {
        &self.prompt_display
    }

    fn char_delay(&self) -> Duration {
        if self.typing_jitter <= 0.0 || self.typing_interval.is_zero() {
            return self.typing_interval;
        }
        let base = self.typing_interval.as_secs_f64();
        let spread = base * self.typing_jitter;
        let secs = rand::thread_rng().gen_range(base - spread..=base + spread);
        Duration::from_secs_f64(secs.max(0.0))
    }
}

/// A single step of a replay script: one script line.
///
/// Implement this trait to add a new directive. Then:
///
/// 1. Define `pub const NAME: &'static str` on your struct, the directive
///    keyword without its `@` (e.g. `"sleep"`).
/// 2. Re-export the struct from `src/commands/mod.rs`.
/// 3. Add one entry to the `DIRECTIVES` registry in [`crate::parser`]:
///    `(MyDirective::NAME, MyDirective::parse_boxed)`.
#[async_trait(?Send)]
pub trait ScriptStep: 'static {
    /// The step name, accessible at runtime through a trait object.
    fn name(&self) -> &'static str;

    /// Parse this step from its argument string. Directives receive the text
    /// after the keyword; line steps receive the whole line.
    fn parse(args: &str) -> Result<Self>
    where
        Self: Sized;

    /// Parse and box this step. Used as the function-pointer type stored in
    /// the directive registry.
    fn parse_boxed(args: &str) -> Result<Box<dyn ScriptStep>>
    where
        Self: Sized,
    {
        Ok(Box::new(Self::parse(args)?))
    }

    /// Execute the step using the provided player context.
    async fn execute(&self, ctx: &mut Context<'_>) -> Result<()>;
}
