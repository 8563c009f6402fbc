//! Bounded sleep-then-check polling shared by the asynchronous adapters.

use rpchub_core::{CallError, CallResult};
use std::future::Future;
use std::time::Duration;

/// Retry budget for one wait loop: how long to sleep between checks and how
/// many checks to make before giving up with a
/// [`PollTimeout`](CallError::PollTimeout).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollPolicy {
    pub const fn new(interval: Duration, max_attempts: u32) -> Self {
        Self { interval, max_attempts }
    }
}

/// Sleep, check, repeat until `check` yields a value or the budget runs out.
/// Errors from `check` abort the loop immediately.
pub(crate) async fn poll_until<T, F, Fut>(
    policy: PollPolicy,
    waiting_for: &str,
    mut check: F,
) -> CallResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = CallResult<Option<T>>>,
{
    for attempt in 1..=policy.max_attempts {
        tokio::time::sleep(policy.interval).await;
        if let Some(value) = check().await? {
            tracing::debug!(attempt, waiting_for, "poll condition reached");
            return Ok(value);
        }
    }
    Err(CallError::PollTimeout {
        attempts: policy.max_attempts,
        waiting_for: waiting_for.to_string(),
    })
}
