//! Generic retry loop for cloud API calls.
//!
//! [`wait_for_expected`] re-issues a request until an evaluation function
//! accepts the outcome, declares it fatal, or the retry budget runs out. It
//! serves both the idempotent create/delete calls and status polling.

use std::fmt::Display;
use std::future::Future;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::time::sleep;
use tracing::debug;

/// Pause between attempts when a policy does not override it.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(5);

/// Attempt budget for calls expected to settle quickly.
pub const DEFAULT_RETRY_TIMES: u32 = 12;

/// Attempt budget for best-effort calls such as teardown.
pub const SHORT_RETRY_TIMES: u32 = 3;

/// Bounds applied to a retry loop.
///
/// The loop stops at whichever of `max_attempts` or `timeout` is reached
/// first. When both are `None` the loop only ends on success or a fatal
/// evaluation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryPolicy {
    /// Pause between attempts.
    pub interval: Duration,
    /// Maximum number of attempts.
    pub max_attempts: Option<u32>,
    /// Maximum wall-clock time spent retrying.
    pub timeout: Option<Duration>,
}

impl RetryPolicy {
    /// Builds a policy bounded by an attempt count at the default interval.
    #[must_use]
    pub const fn attempts(max_attempts: u32) -> Self {
        Self {
            interval: DEFAULT_RETRY_INTERVAL,
            max_attempts: Some(max_attempts),
            timeout: None,
        }
    }

    /// Builds a policy bounded by elapsed time at the default interval.
    #[must_use]
    pub const fn timeout(timeout: Duration) -> Self {
        Self {
            interval: DEFAULT_RETRY_INTERVAL,
            max_attempts: None,
            timeout: Some(timeout),
        }
    }

    /// Overrides the pause between attempts.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::attempts(DEFAULT_RETRY_TIMES)
    }
}

/// Verdict reached by an evaluation function for one attempt.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Evaluation<T, E> {
    /// The attempt produced the expected value.
    Accept(T),
    /// The attempt should be repeated. Carries the error, if any, so it can
    /// be reported once the budget is spent.
    Retry(Option<E>),
    /// The attempt failed in a way that retrying cannot fix.
    Stop(E),
}

/// Errors returned by [`wait_for_expected`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RetryError<E>
where
    E: std::error::Error + 'static,
{
    /// The evaluation declared an attempt fatal.
    #[error(transparent)]
    Stopped(E),
    /// Every permitted attempt was made without success.
    #[error(
        "evaluate failed after {attempts} attempts with {interval:?} retry interval: {}",
        last_error_text(.last.as_ref())
    )]
    Exhausted {
        /// Number of attempts made.
        attempts: u32,
        /// Pause used between attempts.
        interval: Duration,
        /// Error returned by the final attempt, if it failed.
        #[source]
        last: Option<E>,
    },
    /// The time budget elapsed without success.
    #[error(
        "evaluate failed after {timeout:?} timeout with {interval:?} retry interval: {}",
        last_error_text(.last.as_ref())
    )]
    TimedOut {
        /// Time budget that elapsed.
        timeout: Duration,
        /// Pause used between attempts.
        interval: Duration,
        /// Error returned by the final attempt, if it failed.
        #[source]
        last: Option<E>,
    },
}

impl<E> RetryError<E>
where
    E: std::error::Error + 'static,
{
    /// Returns the most relevant underlying error, if any.
    #[must_use]
    pub const fn last_error(&self) -> Option<&E> {
        match self {
            Self::Stopped(err) => Some(err),
            Self::Exhausted { last, .. } | Self::TimedOut { last, .. } => last.as_ref(),
        }
    }
}

fn last_error_text<E: Display>(last: Option<&E>) -> String {
    last.map_or_else(|| String::from("<no error>"), ToString::to_string)
}

/// Issues `request` until `evaluate` accepts or stops, or `policy` runs out.
///
/// Each attempt's outcome is handed to `evaluate` by value; the accepted
/// value is what the function returns. Attempts are separated by
/// `policy.interval`; no pause follows the final attempt.
///
/// # Errors
///
/// Returns [`RetryError::Stopped`] when `evaluate` declares an outcome fatal,
/// and [`RetryError::Exhausted`] or [`RetryError::TimedOut`] when the budget
/// is spent.
pub async fn wait_for_expected<T, U, E, F, Fut, V>(
    policy: &RetryPolicy,
    mut request: F,
    mut evaluate: V,
) -> Result<U, RetryError<E>>
where
    E: std::error::Error + 'static,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    V: FnMut(Result<T, E>) -> Evaluation<U, E>,
{
    let started = Instant::now();
    let mut attempts: u32 = 0;

    loop {
        attempts = attempts.saturating_add(1);
        let last = match evaluate(request().await) {
            Evaluation::Accept(value) => return Ok(value),
            Evaluation::Stop(err) => return Err(RetryError::Stopped(err)),
            Evaluation::Retry(last) => last,
        };

        if policy.max_attempts.is_some_and(|max| attempts >= max) {
            return Err(RetryError::Exhausted {
                attempts,
                interval: policy.interval,
                last,
            });
        }
        if let Some(timeout) = policy.timeout
            && started.elapsed() >= timeout
        {
            return Err(RetryError::TimedOut {
                timeout,
                interval: policy.interval,
                last,
            });
        }

        debug!(
            attempt = attempts,
            error = %last_error_text(last.as_ref()),
            "retrying after {:?}",
            policy.interval
        );
        sleep(policy.interval).await;
    }
}
