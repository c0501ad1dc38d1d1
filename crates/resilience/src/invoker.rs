//! Remote function invocation that never fails the caller.
//!
//! Used for auxiliary endpoints where a degraded answer beats an error
//! surfaced to an interactive client.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::classify::RemoteFailure;
use crate::policy::RetryPolicy;
use crate::retrier::Retrier;

/// Raw response from a remote function.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: serde_json::Value,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvokeError {
    #[error("remote function returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl RemoteFailure for InvokeError {
    fn status(&self) -> Option<u16> {
        match self {
            InvokeError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Transport for named remote functions.
#[async_trait::async_trait]
pub trait RemoteFunctions: Send + Sync {
    async fn call(&self, name: &str, payload: &serde_json::Value) -> Result<RemoteResponse, InvokeError>;
}

/// Outcome of [`ResilientInvoker::invoke`].
///
/// `degraded == true` means `data` is the caller's fallback; treat it as
/// advisory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationResult<T> {
    pub data: T,
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub degraded: bool,
}

impl<T> InvocationResult<T> {
    pub fn fallback(data: T) -> Self {
        Self {
            data,
            status: 200,
            headers: BTreeMap::new(),
            degraded: true,
        }
    }
}

/// Calls remote functions with a few linearly spaced retries, then falls back.
pub struct ResilientInvoker<C: ?Sized> {
    client: Arc<C>,
    retries: u32,
    delay: Duration,
}

impl<C: ?Sized> Clone for ResilientInvoker<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            retries: self.retries,
            delay: self.delay,
        }
    }
}

impl<C: RemoteFunctions + ?Sized> ResilientInvoker<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            retries: 2,
            delay: Duration::from_millis(1000),
        }
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Base delay; retry `k` waits `k * delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Invoke `name` with `payload`. Always resolves.
    pub async fn invoke<T>(&self, name: &str, payload: serde_json::Value, fallback: T) -> InvocationResult<T>
    where
        T: DeserializeOwned,
    {
        let function = name.to_string();
        let retrier = Retrier::with_predicate(
            RetryPolicy::linear(self.retries, self.delay),
            |_: &InvokeError| true,
        )
        .on_retry(move |event| {
            warn!(
                function = %function,
                attempt = event.attempt,
                delay_ms = event.delay.as_millis() as u64,
                error = %event.error,
                "remote function failed; retrying"
            );
            Ok(())
        });

        let attempts = AtomicU32::new(0);
        let (client, payload, attempts) = (&self.client, &payload, &attempts);

        let outcome = retrier
            .run(move || async move {
                let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
                debug!(function = name, attempt, "invoking remote function");

                let response = client.call(name, payload).await?;
                let data = serde_json::from_value::<T>(response.body)
                    .map_err(|e| InvokeError::Decode(e.to_string()))?;

                Ok(InvocationResult {
                    data,
                    status: response.status,
                    headers: response.headers,
                    degraded: false,
                })
            })
            .await;

        match outcome {
            Ok(result) => result,
            Err(err) => {
                warn!(
                    function = name,
                    attempts = err.attempts(),
                    error = %err.error(),
                    "remote function unavailable; returning fallback"
                );
                InvocationResult::fallback(fallback)
            }
        }
    }
}
