//! [`Sleep`] directive — suspends the player for a fixed duration.
//!
//! Script syntax: `@sleep 2`, `@sleep 1.5s` or `@sleep 500ms`

use crate::command::{Context, ScriptStep};
use crate::parser::parse_seconds;
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Pauses execution for a fixed duration before running the next line.
pub struct Sleep {
    pub duration: Duration,
}

impl Sleep {
    pub const NAME: &'static str = "sleep";
}

#[async_trait(?Send)]
impl ScriptStep for Sleep {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: &str) -> Result<Self> {
        Ok(Self {
            duration: parse_seconds(args)?,
        })
    }

    async fn execute(&self, _ctx: &mut Context<'_>) -> Result<()> {
        tokio::time::sleep(self.duration).await;
        Ok(())
    }
}
