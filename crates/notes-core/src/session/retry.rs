//! Bounded polling with exponential backoff and jitter.

use std::future::Future;
use std::time::Duration;

use crate::error::Result;

/// How long to wait for something to appear on-chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl PollPolicy {
    /// Backoff before attempt `attempt + 1`, without jitter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.max_delay)
    }
}

/// Call `probe` until it yields a value or the attempts run out.
///
/// Transient errors count as a failed attempt; any other error ends polling
/// immediately. Returns `Ok(None)` when every attempt came back empty.
pub async fn poll_until<T, F, Fut>(policy: &PollPolicy, mut probe: F) -> Result<Option<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    for attempt in 0..policy.max_attempts {
        match probe(attempt).await {
            Ok(Some(value)) => return Ok(Some(value)),
            Ok(None) => tracing::debug!(attempt, "poll attempt came back empty"),
            Err(err) if err.is_retryable() => {
                tracing::warn!(attempt, "poll attempt failed: {}", err)
            }
            Err(err) => return Err(err),
        }

        if attempt + 1 < policy.max_attempts {
            tokio::time::sleep(with_jitter(policy.delay_for(attempt))).await;
        }
    }
    Ok(None)
}

/// Add up to 25% random jitter.
fn with_jitter(delay: Duration) -> Duration {
    let mut bytes = [0u8; 2];
    if getrandom::getrandom(&mut bytes).is_err() {
        return delay;
    }
    let permille = u32::from(u16::from_le_bytes(bytes) % 1001);
    delay + delay.mul_f64(f64::from(permille) / 4000.0)
}
