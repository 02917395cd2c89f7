//! Real-time pacing.

use async_trait::async_trait;
use std::time::Duration;

use crate::ports::Pacer;

/// Sleeps for the requested delay. Zero returns without yielding.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}
