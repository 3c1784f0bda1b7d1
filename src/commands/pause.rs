//! [`Pause`] directive — waits for the operator before continuing.
//!
//! Script syntax: `@pause`

use crate::command::{Context, ScriptStep};
use anyhow::{Context as _, Result, anyhow};
use async_trait::async_trait;

/// Waits for the operator to press Enter, then redraws the prompt.
///
/// The operator's Enter echoes on the local terminal and moves the cursor,
/// so the prompt is shown again to keep the recording looking continuous.
pub struct Pause;

impl Pause {
    pub const NAME: &'static str = "pause";
}

#[async_trait(?Send)]
impl ScriptStep for Pause {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: &str) -> Result<Self> {
        if !args.trim().is_empty() {
            return Err(anyhow!("@pause takes no arguments"));
        }
        Ok(Self)
    }

    async fn execute(&self, ctx: &mut Context<'_>) -> Result<()> {
        ctx.wait_for_operator()
            .context("Failed to read operator input")?;
        ctx.emit(ctx.prompt_display().as_bytes());
        Ok(())
    }
}
