use crate::error::ReplayError;
use std::io::Read;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

/// Read side of the PTY master.
///
/// A background thread drains the blocking reader into a channel so reads can
/// be bounded by a timeout. When the underlying stream hits EOF or fails the
/// thread exits, the channel disconnects and every later read reports
/// [`ReplayError::SessionEnded`].
pub struct PtyReader {
    rx: Receiver<Vec<u8>>,
    pending: Vec<u8>,
}

impl PtyReader {
    /// Spawn a background thread reading from `reader`.
    pub fn spawn<R: Read + Send + 'static>(mut reader: R) -> Self {
        let (tx, rx) = channel();

        thread::spawn(move || {
            let mut buffer = [0u8; 4096];
            loop {
                match reader.read(&mut buffer) {
                    Ok(0) => break, // EOF
                    Ok(n) => {
                        if tx.send(buffer[..n].to_vec()).is_err() {
                            break; // Receiver dropped
                        }
                    }
                    Err(_) => break,
                }
            }
        });

        Self::from_channel(rx)
    }

    /// Wrap an existing chunk channel.
    pub fn from_channel(rx: Receiver<Vec<u8>>) -> Self {
        Self {
            rx,
            pending: Vec::new(),
        }
    }

    /// Wait up to `timeout` for output.
    ///
    /// Returns `Ok(None)` when nothing arrived in time, otherwise at most
    /// `max_length` bytes. Bytes beyond `max_length` are kept for the next
    /// call. Never blocks longer than `timeout`.
    pub fn read_with_timeout(
        &mut self,
        timeout: Duration,
        max_length: usize,
    ) -> Result<Option<Vec<u8>>, ReplayError> {
        if self.pending.is_empty() {
            match self.rx.recv_timeout(timeout) {
                Ok(chunk) => self.pending = chunk,
                Err(RecvTimeoutError::Timeout) => return Ok(None),
                Err(RecvTimeoutError::Disconnected) => return Err(ReplayError::SessionEnded(None)),
            }
        }

        let n = max_length.max(1).min(self.pending.len());
        let rest = self.pending.split_off(n);
        Ok(Some(std::mem::replace(&mut self.pending, rest)))
    }
}
