//! Maintenance jobs run against the entity store.
//!
//! Each job is a stateless, externally triggered invocation. Concurrent runs
//! are safe because every mutation is idempotent or last-write-wins; partial
//! progress is kept when a run fails midway.
//!
//! - `InvitationExpirer`: declines pending invitations older than the TTL
//! - `PresenceUpdater`: bumps `last_seen` for named users
//! - `ParticipantCounter`: counts participants per tournament in bounded batches

pub mod invitations;
pub mod participants;
pub mod presence;

#[cfg(test)]
pub(crate) mod testing;

use boardkeep_resilience::{Retrier, RetryError, RetryPolicy};
use tracing::warn;

use crate::store::StoreError;

pub use invitations::{ExpirySummary, InvitationExpirer, INVITATION_TTL};
pub use participants::{ids_from_request, ParticipantCounter, COUNT_BATCH_SIZE};
pub use presence::{PresenceReport, PresenceUpdater, TouchedUser};

/// Job failure surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobError {
    #[error("user not found: {0}")]
    UserNotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("job misconfigured: {0}")]
    Misconfigured(String),
}

impl From<RetryError<StoreError>> for JobError {
    fn from(err: RetryError<StoreError>) -> Self {
        JobError::Store(err.into_inner())
    }
}

/// Rate-limit-aware retrier for store calls made by `job`.
pub fn store_retrier(job: &'static str, policy: RetryPolicy) -> Retrier<StoreError> {
    Retrier::new(policy).on_retry(move |event| {
        warn!(
            job,
            attempt = event.attempt,
            delay_ms = event.delay.as_millis() as u64,
            error = %event.error,
            "entity store rate limited; backing off"
        );
        Ok(())
    })
}
