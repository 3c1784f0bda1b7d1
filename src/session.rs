//! One shell, one script: wiring the PTY, prompt detection, relay and player.

use crate::command::ScriptStep;
use crate::config::{PlayerConfig, SessionConfig};
use crate::player::Player;
use crate::prompt::{PromptSignature, clear_header, detect_prompt};
use crate::pty::PtySession;
use crate::relay::{OutputHandler, spawn_relay, stdout_handler};
use crate::timing::TimingState;
use anyhow::{Context as _, Result};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// How long `close` waits for the relay to mirror the shell's last output.
const RELAY_DRAIN: Duration = Duration::from_secs(2);

/// A shell running in a PTY with its prompt learned and its output relayed.
pub struct Session {
    pty: PtySession,
    relay: Option<JoinHandle<()>>,
    timing: Arc<TimingState>,
    prompt: PromptSignature,
    output_handler: OutputHandler,
}

impl Session {
    /// Start a session that mirrors the shell's output to stdout.
    pub fn start(config: &SessionConfig) -> Result<Self> {
        Self::start_inner(config, stdout_handler())
    }

    /// Start a session whose output goes to `handler`.
    ///
    /// Spawns the shell, applies the terminal geometry, discards the startup
    /// output, learns the prompt and starts the relay. The learned prompt is
    /// then shown once, since detection swallowed the shell's own copy.
    pub fn start_with_handler<F>(config: &SessionConfig, handler: F) -> Result<Self>
    where
        F: Fn(&[u8]) + Send + Sync + 'static,
    {
        Self::start_inner(config, Arc::new(handler))
    }

    fn start_inner(config: &SessionConfig, output_handler: OutputHandler) -> Result<Self> {
        let (mut pty, mut reader) = PtySession::spawn(config)?;

        let prompt = match pty
            .resize(config.cols, config.rows)
            .and_then(|()| {
                clear_header(&mut pty, &mut reader, &config.ps1, &config.probe)
                    .context("Failed to clear shell startup output")?;
                detect_prompt(&mut pty, &mut reader, &config.probe)
                    .context("Failed to detect shell prompt")
            }) {
            Ok(prompt) => prompt,
            Err(err) => {
                let _ = pty.close();
                return Err(err);
            }
        };
        info!(?prompt, "Detected prompt");

        let timing = Arc::new(TimingState::new());
        let relay = spawn_relay(reader, prompt.clone(), timing.clone(), output_handler.clone())
            .context("Failed to start output relay")?;

        output_handler(prompt.display().as_bytes());

        Ok(Self {
            pty,
            relay: Some(relay),
            timing,
            prompt,
            output_handler,
        })
    }

    pub fn prompt(&self) -> &PromptSignature {
        &self.prompt
    }

    /// Play `steps` into the shell. `@pause` waits on this process's stdin.
    pub async fn play(&mut self, steps: &[Box<dyn ScriptStep>], config: PlayerConfig) -> Result<()> {
        let player = Player::new(
            config,
            self.timing.clone(),
            self.output_handler.clone(),
            self.prompt.display(),
        );
        let stdin = std::io::stdin();
        let mut operator = stdin.lock();
        player.play(&mut self.pty, &mut operator, steps).await
    }

    /// Close the terminal and wait briefly for the relay to finish.
    pub fn close(mut self) -> Result<()> {
        debug!(running = self.pty.is_running(), "Closing session");
        self.pty.close()?;

        let deadline = Instant::now() + RELAY_DRAIN;
        while !self.timing.session_ended() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        match self.relay.take() {
            Some(relay) if self.timing.session_ended() => {
                let _ = relay.join();
            }
            // Something else still holds the terminal open; leave the relay be.
            Some(_) => debug!("Relay still running at close"),
            None => {}
        }
        info!("Session closed");
        Ok(())
    }
}
