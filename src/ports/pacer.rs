//! Pacer Port - waits between scripted chat steps.

use async_trait::async_trait;
use std::time::Duration;

/// Suspends the current task for a simulated delay.
///
/// Production sleeps on the tokio timer; tests record the requested delays
/// and return at once.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, duration: Duration);
}
