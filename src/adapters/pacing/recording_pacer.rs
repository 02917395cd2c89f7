//! Instant pacing that records each requested delay.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::ports::Pacer;

#[derive(Debug, Clone, Default)]
pub struct RecordingPacer {
    pauses: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingPacer {
    pub fn new() -> Self {
        Self::default()
    }

    fn pauses_guard(&self) -> MutexGuard<'_, Vec<Duration>> {
        self.pauses.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Every delay requested so far, in order.
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses_guard().clone()
    }

    pub fn total(&self) -> Duration {
        self.pauses_guard().iter().sum()
    }

    pub fn clear(&self) {
        self.pauses_guard().clear();
    }
}

#[async_trait]
impl Pacer for RecordingPacer {
    async fn pause(&self, duration: Duration) {
        self.pauses_guard().push(duration);
        tokio::task::yield_now().await;
    }
}
