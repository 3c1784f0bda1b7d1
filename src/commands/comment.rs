//! [`Comment`] step — a `#` line typed into the transcript.

use crate::command::{Context, ScriptStep};
use anyhow::Result;
use async_trait::async_trait;

/// Types a comment line verbatim so it shows up in the recording.
///
/// The shell prints nothing but a new prompt for it, so there is nothing to
/// wait for.
pub struct Comment {
    pub line: String,
}

impl Comment {
    pub const NAME: &'static str = "comment";
}

#[async_trait(?Send)]
impl ScriptStep for Comment {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: &str) -> Result<Self> {
        Ok(Self {
            line: args.to_string(),
        })
    }

    async fn execute(&self, ctx: &mut Context<'_>) -> Result<()> {
        ctx.type_text(&self.line).await?;
        Ok(())
    }
}
