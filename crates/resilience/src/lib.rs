//! Resilient remote invocation.
//!
//! ## Components
//!
//! - `RetryPolicy`: backoff schedule (exponential or linear) with a jitter range
//! - `Retrier`: retries an async operation while a predicate says the failure
//!   is worth retrying (by default: rate limiting only)
//! - `ResilientInvoker`: calls a named remote function and degrades to a
//!   caller-supplied fallback instead of failing

pub mod classify;
pub mod invoker;
pub mod policy;
pub mod retrier;

pub use classify::{is_rate_limited, RemoteFailure, TOO_MANY_REQUESTS};
pub use invoker::{InvocationResult, InvokeError, RemoteFunctions, RemoteResponse, ResilientInvoker};
pub use policy::{BackoffStrategy, JitterRange, PolicyError, RetryPolicy};
pub use retrier::{RetryError, RetryEvent, Retrier};
