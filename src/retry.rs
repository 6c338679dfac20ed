//! secondary rate limit retries
//!
//! a 403 carrying `Retry-After: <seconds>` means "wait, then try again".
//! every other status ends the transmit loop.

use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// retry budget for one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    timeout: Duration,
    retry_count: u32,
}

impl RetryPolicy {
    /// `timeout_secs` of zero disables the time budget
    pub fn new(timeout_secs: u64, retry_count: u32) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_secs),
            retry_count,
        }
    }

    /// a single attempt, no retries
    pub fn once() -> Self {
        Self::new(0, 0)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// retries allowed after the first attempt
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// begin a transmit loop; the deadline is fixed here, once
    pub(crate) fn start(&self) -> RetryState {
        RetryState {
            attempt: 0,
            attempts_remaining: self.retry_count,
            // a budget past the clock's range means no deadline
            deadline: if self.timeout.is_zero() {
                None
            } else {
                Instant::now().checked_add(self.timeout)
            },
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::once()
    }
}

/// what the transmit loop does after a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// the response is final
    Done,
    /// sleep, then send again
    Wait(Duration),
}

/// per-call loop state, never shared
#[derive(Debug)]
pub(crate) struct RetryState {
    attempt: u32,
    attempts_remaining: u32,
    deadline: Option<Instant>,
}

impl RetryState {
    /// zero-based index of the current attempt
    pub(crate) fn attempt(&self) -> u32 {
        self.attempt
    }

    /// fail once the time budget is spent
    pub(crate) fn check_deadline(&self, url: &str) -> Result<()> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(Error::RateLimitTimeout {
                url: url.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// decide whether the response ends the loop
    pub(crate) fn next(&mut self, status: StatusCode, headers: &HeaderMap) -> Result<Step> {
        if status != StatusCode::FORBIDDEN {
            return Ok(Step::Done);
        }
        let Some(wait) = retry_after(headers)? else {
            return Ok(Step::Done);
        };
        if self.attempts_remaining == 0 {
            return Ok(Step::Done);
        }
        self.attempts_remaining -= 1;
        self.attempt += 1;
        Ok(Step::Wait(wait))
    }
}

/// parse `Retry-After` as whole seconds; absent or blank is `None`
pub(crate) fn retry_after(headers: &HeaderMap) -> Result<Option<Duration>> {
    let Some(value) = headers.get(RETRY_AFTER) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|err| Error::Encoding(format!("invalid retry-after header: {err}")))?
        .trim();
    if value.is_empty() {
        return Ok(None);
    }
    let secs: u64 = value
        .parse()
        .map_err(|err| Error::Encoding(format!("invalid retry-after header {value:?}: {err}")))?;
    Ok(Some(Duration::from_secs(secs)))
}

/// sleep for `duration` unless `ctx` is cancelled first
pub(crate) async fn wait(duration: Duration, ctx: &CancellationToken) -> Result<()> {
    tokio::select! {
        biased;
        _ = ctx.cancelled() => Err(Error::Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}
