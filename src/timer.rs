use std::time::{Duration, Instant};

use tracing::info;

/// Logs the wall-clock time a phase took when dropped.
#[derive(Debug, Clone)]
pub struct PhaseTimer {
    phase: &'static str,
    start: Instant,
}

impl PhaseTimer {
    pub fn new(phase: &'static str) -> Self {
        Self {
            phase,
            start: Instant::now(),
        }
    }

    /// Wall-clock time since the timer started.
    pub fn wall(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for PhaseTimer {
    fn drop(&mut self) {
        info!(phase = self.phase, wall = ?self.start.elapsed(), "phase finished");
    }
}
