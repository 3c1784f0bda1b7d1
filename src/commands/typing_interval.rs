//! [`TypingInterval`] directive — changes the per-character typing delay.
//!
//! Script syntax: `@typing-interval 0.05`

use crate::command::{Context, ScriptStep};
use crate::parser::parse_seconds;
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Sets the typing delay used by every following line.
pub struct TypingInterval {
    pub interval: Duration,
}

impl TypingInterval {
    pub const NAME: &'static str = "typing-interval";
}

#[async_trait(?Send)]
impl ScriptStep for TypingInterval {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: &str) -> Result<Self> {
        Ok(Self {
            interval: parse_seconds(args)?,
        })
    }

    async fn execute(&self, ctx: &mut Context<'_>) -> Result<()> {
        debug!(interval = ?self.interval, "Typing interval changed");
        ctx.set_typing_interval(self.interval);
        Ok(())
    }
}
