//! Learning the shell's prompt before replay starts.
//!
//! The prompt is found empirically: send a bare newline, collect everything
//! the shell prints until it goes quiet, and keep what follows the last
//! carriage return. Prompts that embed changing content (a clock, a counter)
//! are handled by sampling up to three times and taking the majority.

use crate::config::ProbeTimeouts;
use crate::error::ReplayError;
use crate::pty::PtyInput;
use crate::pty_reader::PtyReader;
use std::fmt;
use tracing::debug;

/// The exact bytes the shell prints when it is ready for input.
#[derive(Clone, PartialEq, Eq)]
pub struct PromptSignature(Vec<u8>);

impl PromptSignature {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The prompt as shown to the operator, without leading whitespace.
    ///
    /// Matching always uses [`as_bytes`](Self::as_bytes), which keeps the
    /// leading bytes.
    pub fn display(&self) -> String {
        String::from_utf8_lossy(&self.0).trim_start().to_string()
    }
}

impl fmt::Debug for PromptSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PromptSignature({:?})", String::from_utf8_lossy(&self.0))
    }
}

/// Discard the shell's startup output.
///
/// When `ps1` is non-empty the prompt is forced first with `export PS1=...`.
pub fn clear_header(
    input: &mut dyn PtyInput,
    reader: &mut PtyReader,
    ps1: &str,
    timeouts: &ProbeTimeouts,
) -> Result<(), ReplayError> {
    if !ps1.is_empty() {
        input.write(format!("export PS1='{ps1}'\n").as_bytes())?;
    }
    let mut discarded = 0;
    while let Some(chunk) = reader.read_with_timeout(timeouts.settle, timeouts.read_chunk)? {
        discarded += chunk.len();
    }
    debug!(discarded, "Cleared shell header");
    Ok(())
}

/// Take one prompt sample by sending a bare newline.
pub fn probe_prompt(
    input: &mut dyn PtyInput,
    reader: &mut PtyReader,
    timeouts: &ProbeTimeouts,
) -> Result<Vec<u8>, ReplayError> {
    input.write(b"\n")?;

    let mut output = reader
        .read_with_timeout(timeouts.first_response, timeouts.read_chunk)?
        .unwrap_or_default();
    while let Some(chunk) = reader.read_with_timeout(timeouts.settle, timeouts.read_chunk)? {
        output.extend_from_slice(&chunk);
    }

    let prompt = after_last_carriage_return(&output).to_vec();
    debug!(sample = ?String::from_utf8_lossy(&prompt), "Prompt probe");
    Ok(prompt)
}

/// The bytes after the last `\r`, or everything when there is none.
pub(crate) fn after_last_carriage_return(output: &[u8]) -> &[u8] {
    match output.iter().rposition(|&b| b == b'\r') {
        Some(idx) => &output[idx + 1..],
        None => output,
    }
}

/// Majority vote over up to three samples produced by `probe`.
///
/// The first two samples win when they agree. Otherwise a third is taken and
/// accepted if it matches either of them. Three distinct samples fail.
pub fn stabilize<F>(mut probe: F) -> Result<PromptSignature, ReplayError>
where
    F: FnMut() -> Result<Vec<u8>, ReplayError>,
{
    let first = probe()?;
    let second = probe()?;
    if first == second {
        return Ok(PromptSignature::new(first));
    }

    let third = probe()?;
    if second == third {
        return Ok(PromptSignature::new(second));
    }
    if first == third {
        return Ok(PromptSignature::new(first));
    }

    Err(ReplayError::PromptDetection {
        samples: [first, second, third].map(|s| String::from_utf8_lossy(&s).into_owned()),
    })
}

/// Probe the shell until a stable prompt signature is found.
///
/// An empty signature would match every chunk of output, so it is rejected.
pub fn detect_prompt(
    input: &mut dyn PtyInput,
    reader: &mut PtyReader,
    timeouts: &ProbeTimeouts,
) -> Result<PromptSignature, ReplayError> {
    let prompt = stabilize(|| probe_prompt(&mut *input, &mut *reader, timeouts))?;
    if prompt.as_bytes().is_empty() {
        return Err(ReplayError::EmptyPrompt);
    }
    Ok(prompt)
}
