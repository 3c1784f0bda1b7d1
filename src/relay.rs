//! Background relay of shell output to the operator.

use crate::prompt::PromptSignature;
use crate::pty_reader::PtyReader;
use crate::timing::TimingState;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, trace};

/// Sink for the mirrored shell output.
pub type OutputHandler = Arc<dyn Fn(&[u8]) + Send + Sync>;

const READ_TIMEOUT: Duration = Duration::from_secs(2);
const READ_CHUNK: usize = 1024;
/// Output without a prompt is trimmed to its tail once it grows past this.
const BUFFER_CAP: usize = 16 * 1024;

/// Rolling view of recent output used to spot the prompt at its tail.
pub(crate) struct PromptWatcher {
    prompt: PromptSignature,
    buffer: Vec<u8>,
}

impl PromptWatcher {
    pub(crate) fn new(prompt: PromptSignature) -> Self {
        Self {
            prompt,
            buffer: Vec::new(),
        }
    }

    /// Feed a chunk of output. Returns true when the output now ends with the
    /// prompt, in which case the buffer starts over.
    pub(crate) fn push(&mut self, chunk: &[u8]) -> bool {
        self.buffer.extend_from_slice(chunk);
        if self.buffer.ends_with(self.prompt.as_bytes()) {
            self.buffer.clear();
            return true;
        }

        let keep = BUFFER_CAP.max(self.prompt.as_bytes().len());
        if self.buffer.len() > 2 * keep {
            self.buffer.drain(..self.buffer.len() - keep);
        }
        false
    }
}

/// Start the relay thread.
///
/// The relay mirrors every chunk to `output` as soon as it arrives and stamps
/// `last_prompt_seen` whenever the output ends with `prompt`. It runs until the
/// reader reports the session ended, then flags that on `timing` and exits.
pub fn spawn_relay(
    mut reader: PtyReader,
    prompt: PromptSignature,
    timing: Arc<TimingState>,
    output: OutputHandler,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("playpty-relay".to_string())
        .spawn(move || {
            let mut watcher = PromptWatcher::new(prompt);
            loop {
                let chunk = match reader.read_with_timeout(READ_TIMEOUT, READ_CHUNK) {
                    Ok(Some(chunk)) => chunk,
                    Ok(None) => continue,
                    Err(_) => break,
                };
                output(&chunk);
                if watcher.push(&chunk) {
                    trace!("Prompt seen");
                    timing.mark_prompt_seen();
                }
            }
            debug!("Relay finished");
            timing.mark_session_ended();
        })
}

/// Output handler that writes to stdout and flushes after every chunk.
pub fn stdout_handler() -> OutputHandler {
    use std::io::Write;
    Arc::new(|data: &[u8]| {
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(data);
        let _ = stdout.flush();
    })
}
