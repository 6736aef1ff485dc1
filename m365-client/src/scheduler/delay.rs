//! Wait primitive used between polls
//!
//! Kept behind a trait so callers (and tests) can substitute their own
//! timer without touching the runtime's clock.

use async_trait::async_trait;
use std::time::Duration;

/// Suspends the current task for a duration
#[async_trait]
pub trait Delay: Send + Sync {
    async fn wait(&self, duration: Duration);
}

/// Delay backed by `tokio::time::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
