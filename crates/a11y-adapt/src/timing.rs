//! Injectable timing: the provider rate-limit cooldown and the bounded poll policy.
//!
//! All waits go through `tokio::time`, so tests running on a paused clock
//! complete instantly while still observing the configured delays.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Fixed interval plus an upper bound on attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl TimingPolicy {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Longest total time the policy can wait.
    pub fn budget(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts)
    }
}

/// Serializes generative calls within one pipeline run.
///
/// The first call goes straight through; every later call first waits the
/// configured delay, keeping the run under the provider's per-credential
/// requests-per-minute ceiling.
#[derive(Debug)]
pub struct Cooldown {
    delay: Duration,
    calls: u32,
}

impl Cooldown {
    pub fn new(delay: Duration) -> Self {
        Self { delay, calls: 0 }
    }

    /// Wait out the cooldown if a call already went through, then count this one.
    pub async fn ready(&mut self) {
        if self.calls > 0 && !self.delay.is_zero() {
            tracing::info!(
                "Waiting {}s before the next generative call to stay under the rate limit",
                self.delay.as_secs()
            );
            tokio::time::sleep(self.delay).await;
        }
        self.calls += 1;
    }

    /// Number of calls let through so far.
    pub fn calls(&self) -> u32 {
        self.calls
    }
}
