use std::future::Future;
use std::time::Duration;

use crate::app::Result;

/// Bounded, fixed-interval polling budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, interval: Duration) -> Self {
        Self { attempts, interval }
    }
}

/// Probe up to `policy.attempts` times, sleeping `policy.interval` between
/// probes, until the probe yields a value.
///
/// Returns `Ok(None)` when the budget is exhausted. A probe error stops
/// polling immediately. The probe receives the 1-based attempt number.
pub async fn poll<T, F, Fut>(policy: RetryPolicy, mut probe: F) -> Result<Option<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    for attempt in 1..=policy.attempts {
        if let Some(value) = probe(attempt).await? {
            return Ok(Some(value));
        }
        if attempt < policy.attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }
    Ok(None)
}
