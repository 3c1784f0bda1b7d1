//! Timestamps shared between the script player and the output relay.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Monotonic timestamps exchanged across the player/relay boundary.
///
/// Timestamps are nanoseconds since `origin`. The player owns
/// `last_typing_finished`, the relay owns `last_prompt_seen`; each side only
/// reads the other's value.
#[derive(Debug)]
pub struct TimingState {
    origin: Instant,
    last_typing_finished: AtomicU64,
    last_prompt_seen: AtomicU64,
    session_ended: AtomicBool,
}

impl TimingState {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            last_typing_finished: AtomicU64::new(0),
            last_prompt_seen: AtomicU64::new(0),
            session_ended: AtomicBool::new(false),
        }
    }

    fn now_nanos(&self) -> u64 {
        // Clamp to at least 1 so a fresh mark is always after the initial zero.
        (self.origin.elapsed().as_nanos() as u64).max(1)
    }

    /// Time elapsed since this state was created.
    pub fn now(&self) -> Duration {
        Duration::from_nanos(self.now_nanos())
    }

    /// Record that the last character of a line was just written.
    pub fn mark_typing_finished(&self) {
        self.last_typing_finished.store(self.now_nanos(), Ordering::Release);
    }

    /// Record the last character of a line as written at `at`.
    ///
    /// Callers take `at` before the write so a prompt the write provokes is
    /// always stamped later, however quickly the shell answers.
    pub fn mark_typing_finished_at(&self, at: Duration) {
        self.last_typing_finished.store(at.as_nanos() as u64, Ordering::Release);
    }

    /// Record that the prompt signature was just observed.
    pub fn mark_prompt_seen(&self) {
        self.last_prompt_seen.store(self.now_nanos(), Ordering::Release);
    }

    pub fn last_typing_finished(&self) -> Duration {
        Duration::from_nanos(self.last_typing_finished.load(Ordering::Acquire))
    }

    pub fn last_prompt_seen(&self) -> Duration {
        Duration::from_nanos(self.last_prompt_seen.load(Ordering::Acquire))
    }

    /// A typed line is acknowledged once a prompt has been seen strictly
    /// after its last character was written.
    pub fn is_acknowledged(&self) -> bool {
        self.last_prompt_seen.load(Ordering::Acquire)
            > self.last_typing_finished.load(Ordering::Acquire)
    }

    pub fn mark_session_ended(&self) {
        self.session_ended.store(true, Ordering::Release);
    }

    pub fn session_ended(&self) -> bool {
        self.session_ended.load(Ordering::Acquire)
    }
}

impl Default for TimingState {
    fn default() -> Self {
        Self::new()
    }
}
