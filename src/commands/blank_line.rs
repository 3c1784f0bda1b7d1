//! [`BlankLine`] step — an empty script line.

use crate::command::{Context, ScriptStep};
use anyhow::Result;
use async_trait::async_trait;
use tokio::time::sleep;

/// Types a bare newline, then pauses for the empty-line interval.
///
/// Never waits for the prompt: a blank line is pacing, not a command.
pub struct BlankLine;

impl BlankLine {
    pub const NAME: &'static str = "blank";
}

#[async_trait(?Send)]
impl ScriptStep for BlankLine {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(_args: &str) -> Result<Self> {
        Ok(Self)
    }

    async fn execute(&self, ctx: &mut Context<'_>) -> Result<()> {
        ctx.type_text("\n").await?;
        let pause = ctx.empty_line_interval();
        if !pause.is_zero() {
            sleep(pause).await;
        }
        Ok(())
    }
}
