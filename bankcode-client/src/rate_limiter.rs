//! Token bucket rate limiter for outbound requests.
//!
//! The free plan of the BankCode API allows roughly one request every three
//! seconds. A single limiter is shared by every clone of a client so that
//! concurrent callers are throttled as a group.

use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::config::Plan;
use crate::error::{BankCodeError, Result};

/// Interval between requests on the free plan.
pub const FREE_PLAN_INTERVAL: Duration = Duration::from_secs(3);

/// Token bucket rate limiter.
///
/// Tokens refill continuously at one per `interval` up to `burst`. A caller
/// that finds the bucket empty reserves the next token anyway and sleeps
/// until it would have been refilled, so waiters are served in arrival
/// order and none is dropped.
#[derive(Debug)]
pub struct RateLimiter {
    bucket: Option<TokenBucket>,
}

#[derive(Debug)]
struct TokenBucket {
    interval: Duration,
    burst: u32,
    state: Mutex<BucketState>,
}

#[derive(Debug)]
struct BucketState {
    /// Available tokens; negative while reservations are outstanding.
    tokens: f64,
    /// When `tokens` was last brought up to date.
    updated_at: Instant,
    /// Time at which the latest reservation may proceed.
    last_reserved_at: Instant,
}

impl TokenBucket {
    fn refill(&self, state: &mut BucketState, now: Instant) {
        let elapsed = now.saturating_duration_since(state.updated_at);
        let refilled = elapsed.as_secs_f64() / self.interval.as_secs_f64();
        state.tokens = (state.tokens + refilled).min(f64::from(self.burst));
        state.updated_at = now;
    }

    fn deficit_wait(&self, tokens: f64) -> Duration {
        if tokens >= 0.0 {
            Duration::ZERO
        } else {
            self.interval.mul_f64(-tokens)
        }
    }

    fn cancel_reservation(&self, act_at: Instant) {
        let now = Instant::now();
        let mut state = self.state.lock();
        // Later reservations were timed against this one; leave them be.
        if act_at < state.last_reserved_at || act_at <= now {
            return;
        }
        self.refill(&mut state, now);
        state.tokens = (state.tokens + 1.0).min(f64::from(self.burst));
        state.last_reserved_at = now;
    }
}

impl RateLimiter {
    /// Creates a limiter allowing one request per `interval` with the given burst.
    ///
    /// A zero interval or zero burst yields an unlimited limiter.
    #[must_use]
    pub fn new(interval: Duration, burst: u32) -> Self {
        if interval.is_zero() || burst == 0 {
            return Self::unlimited();
        }

        let now = Instant::now();
        Self {
            bucket: Some(TokenBucket {
                interval,
                burst,
                state: Mutex::new(BucketState {
                    tokens: f64::from(burst),
                    updated_at: now,
                    last_reserved_at: now,
                }),
            }),
        }
    }

    /// Creates a limiter allowing one request per `interval` with no burst.
    #[must_use]
    pub fn every(interval: Duration) -> Self {
        Self::new(interval, 1)
    }

    /// Creates a pass-through limiter that never waits.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self { bucket: None }
    }

    /// Creates the limiter matching a plan tier.
    #[must_use]
    pub fn for_plan(plan: Plan) -> Self {
        match plan {
            Plan::Free => Self::every(FREE_PLAN_INTERVAL),
            Plan::Standard | Plan::Pro => Self::unlimited(),
        }
    }

    /// Returns true if this limiter never waits.
    #[must_use]
    pub const fn is_unlimited(&self) -> bool {
        self.bucket.is_none()
    }

    /// Returns the refill interval, or `None` for an unlimited limiter.
    #[must_use]
    pub fn interval(&self) -> Option<Duration> {
        self.bucket.as_ref().map(|b| b.interval)
    }

    /// Returns the burst size, or `None` for an unlimited limiter.
    #[must_use]
    pub fn burst(&self) -> Option<u32> {
        self.bucket.as_ref().map(|b| b.burst)
    }

    /// Returns how long a request arriving now would have to wait.
    #[must_use]
    pub fn wait_time(&self) -> Duration {
        let Some(bucket) = &self.bucket else {
            return Duration::ZERO;
        };

        let mut state = bucket.state.lock();
        bucket.refill(&mut state, Instant::now());
        bucket.deficit_wait(state.tokens - 1.0)
    }

    /// Takes a token if one is available right now.
    pub fn try_acquire(&self) -> bool {
        let Some(bucket) = &self.bucket else {
            return true;
        };

        let now = Instant::now();
        let mut state = bucket.state.lock();
        bucket.refill(&mut state, now);
        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            state.last_reserved_at = state.last_reserved_at.max(now);
            true
        } else {
            false
        }
    }

    /// Waits until a request may be sent.
    ///
    /// # Errors
    ///
    /// Returns [`BankCodeError::Cancelled`] if `cancel` fires before a token
    /// is available. The reserved token is handed back in that case, and
    /// also when the returned future is dropped mid-wait.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(BankCodeError::Cancelled);
        }

        let Some(bucket) = &self.bucket else {
            return Ok(());
        };

        let now = Instant::now();
        let act_at = {
            let mut state = bucket.state.lock();
            bucket.refill(&mut state, now);
            state.tokens -= 1.0;
            let act_at = now + bucket.deficit_wait(state.tokens);
            state.last_reserved_at = state.last_reserved_at.max(act_at);
            act_at
        };

        if act_at <= now {
            return Ok(());
        }

        trace!(wait_ms = (act_at - now).as_millis(), "Waiting for rate limiter");

        let reservation = Reservation {
            bucket,
            act_at,
            armed: true,
        };
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(BankCodeError::Cancelled),
            () = tokio::time::sleep_until(act_at) => {
                reservation.complete();
                Ok(())
            }
        }
    }
}

/// A pending token. Handed back to the bucket when dropped before the wait
/// completes, whether through the cancellation token or by dropping the
/// `acquire` future.
struct Reservation<'a> {
    bucket: &'a TokenBucket,
    act_at: Instant,
    armed: bool,
}

impl Reservation<'_> {
    fn complete(mut self) {
        self.armed = false;
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.bucket.cancel_reservation(self.act_at);
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::for_plan(Plan::Free)
    }
}
