//! Between-chunk pacing to stay under the metadata provider's request quota.
//!
//! The provider enforces a per-minute ceiling on lookups. The engine never
//! issues more than one chunk of lookups at a time, and a [`Pacer`] decides
//! how long to hold off before the next chunk goes out.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use panoflag_core::pacing::FixedPacer;
//!
//! // One minute between chunks, plus up to five seconds of jitter.
//! let pacer = FixedPacer::new(Duration::from_secs(60))
//!     .with_jitter(Duration::from_secs(5));
//! ```

use std::time::Duration;

use crate::config::DEFAULT_PACING_INTERVAL;
use crate::traits::Pacer;

/// Sleeps a fixed interval between chunks.
#[derive(Debug, Clone)]
pub struct FixedPacer {
    /// Base cooldown between the end of one chunk and the start of the next.
    pub interval: Duration,

    /// Maximum random jitter added on top of `interval` (uniform [0, jitter]).
    ///
    /// Set to `Duration::ZERO` to disable.
    pub jitter: Duration,
}

impl FixedPacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            jitter: Duration::ZERO,
        }
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Compute the effective cooldown for a single wait (interval + random jitter).
    fn effective_delay(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.interval;
        }
        let jitter_ms = rand_jitter_ms(self.jitter.as_millis() as u64);
        self.interval + Duration::from_millis(jitter_ms)
    }
}

impl Default for FixedPacer {
    /// 60 seconds, no jitter.
    fn default() -> Self {
        Self::new(DEFAULT_PACING_INTERVAL)
    }
}

impl Pacer for FixedPacer {
    async fn wait_before_next_chunk(&self, next_chunk: usize) {
        let delay = self.effective_delay();
        if delay.is_zero() {
            return;
        }
        tracing::info!(
            next_chunk,
            sleep_secs = delay.as_secs_f64(),
            "Sleeping to not exceed the provider's per-minute quota"
        );
        tokio::time::sleep(delay).await;
        tracing::info!(next_chunk, "Done sleeping");
    }
}

/// Dispatches the next chunk immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPacer;

impl Pacer for NoPacer {
    async fn wait_before_next_chunk(&self, _next_chunk: usize) {}
}

// Xorshift seeded from the clock. Good enough for jitter, not for anything else.
fn rand_jitter_ms(max_ms: u64) -> u64 {
    if max_ms == 0 {
        return 0;
    }
    let mut x = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    x % max_ms
}
