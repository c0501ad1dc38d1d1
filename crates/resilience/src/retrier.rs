//! Retry loop with backoff, jitter and a retry-worthiness predicate.

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::classify::{is_rate_limited, RemoteFailure};
use crate::policy::RetryPolicy;

/// Information passed to the `on_retry` hook before each wait.
#[derive(Debug)]
pub struct RetryEvent<'a, E> {
    /// Which retry is about to happen (1-indexed).
    pub attempt: u32,
    /// How long the loop will sleep before it.
    pub delay: Duration,
    /// The failure that triggered the retry.
    pub error: &'a E,
}

/// Final failure of a retry loop.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// The predicate classified the failure as not worth retrying.
    #[error("non-retryable failure after {attempts} attempt(s): {error}")]
    Rejected { attempts: u32, error: E },

    /// Every allowed attempt failed.
    #[error("retries exhausted after {attempts} attempt(s): {error}")]
    Exhausted { attempts: u32, error: E },
}

impl<E> RetryError<E> {
    /// Total attempts made (initial + retries).
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Rejected { attempts, .. } | RetryError::Exhausted { attempts, .. } => *attempts,
        }
    }

    pub fn error(&self) -> &E {
        match self {
            RetryError::Rejected { error, .. } | RetryError::Exhausted { error, .. } => error,
        }
    }

    pub fn into_inner(self) -> E {
        match self {
            RetryError::Rejected { error, .. } | RetryError::Exhausted { error, .. } => error,
        }
    }
}

impl<E: RemoteFailure> RemoteFailure for RetryError<E> {
    fn status(&self) -> Option<u16> {
        self.error().status()
    }
}

type Predicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;
type Hook<E> = Arc<dyn Fn(&RetryEvent<'_, E>) -> anyhow::Result<()> + Send + Sync>;

/// Retries an async operation according to a [`RetryPolicy`].
///
/// ```rust,ignore
/// let retrier = Retrier::new(RetryPolicy::default())
///     .on_retry(|e| { tracing::warn!(attempt = e.attempt, "rate limited"); Ok(()) });
/// let user = retrier.run(|| store.update(id, fields)).await?;
/// ```
pub struct Retrier<E> {
    policy: RetryPolicy,
    should_retry: Predicate<E>,
    on_retry: Option<Hook<E>>,
}

impl<E> Clone for Retrier<E> {
    fn clone(&self) -> Self {
        Self {
            policy: self.policy.clone(),
            should_retry: Arc::clone(&self.should_retry),
            on_retry: self.on_retry.clone(),
        }
    }
}

impl<E: RemoteFailure + 'static> Retrier<E> {
    /// Retrier that only retries rate-limit failures.
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_predicate(policy, |e: &E| is_rate_limited(e))
    }
}

impl<E> Retrier<E> {
    /// Retrier with a custom retry-worthiness predicate.
    pub fn with_predicate<P>(policy: RetryPolicy, should_retry: P) -> Self
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Self {
            policy,
            should_retry: Arc::new(should_retry),
            on_retry: None,
        }
    }

    /// Install a hook called before each backoff wait.
    ///
    /// Hook errors and panics are logged and discarded.
    pub fn on_retry<H>(mut self, hook: H) -> Self
    where
        H: Fn(&RetryEvent<'_, E>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.on_retry = Some(Arc::new(hook));
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `op` until it succeeds, the failure is not retryable, or the retry
    /// budget is spent.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut retries = 0u32;

        loop {
            let error = match op().await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if !(self.should_retry)(&error) {
                return Err(RetryError::Rejected {
                    attempts: retries + 1,
                    error,
                });
            }
            if !self.policy.should_retry(retries) {
                return Err(RetryError::Exhausted {
                    attempts: retries + 1,
                    error,
                });
            }

            retries += 1;
            let delay = self.policy.delay_for_attempt(retries);
            self.notify(retries, delay, &error);
            drop(error);

            tokio::time::sleep(delay).await;
        }
    }

    fn notify(&self, attempt: u32, delay: Duration, error: &E) {
        let Some(hook) = &self.on_retry else {
            return;
        };

        let event = RetryEvent {
            attempt,
            delay,
            error,
        };
        match panic::catch_unwind(AssertUnwindSafe(|| hook(&event))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(attempt, error = %e, "retry hook failed; ignoring"),
            Err(_) => debug!(attempt, "retry hook panicked; ignoring"),
        }
    }
}
