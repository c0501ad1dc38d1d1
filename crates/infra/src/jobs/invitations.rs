//! Invitation expirer: declines pending invitations past their TTL.

use std::sync::Arc;

use boardkeep_core::{Entity, Invitation, InvitationStatus};
use boardkeep_resilience::{Retrier, RetryPolicy};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{store_retrier, JobError};
use crate::store::{fields, Collection, Criteria, EntityStore, Sort, StoreError};

/// Pending invitations older than this are declined.
pub const INVITATION_TTL: Duration = Duration::milliseconds(60_000);

/// Most recent pending invitations examined per run.
pub const SCAN_LIMIT: usize = 500;

const JOB: &str = "cleanupInvitations";

/// Outcome of one sweep. Only `cleaned` is reported to callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExpirySummary {
    pub scanned: usize,
    /// Invitations the store confirmed as declined.
    pub cleaned: usize,
    /// No usable `created_at`.
    pub skipped: usize,
    pub failed: usize,
}

pub struct InvitationExpirer {
    store: Arc<dyn EntityStore>,
    retrier: Retrier<StoreError>,
    ttl: Duration,
}

impl InvitationExpirer {
    pub fn new(store: Arc<dyn EntityStore>, policy: RetryPolicy) -> Self {
        Self {
            store,
            retrier: store_retrier(JOB, policy),
            ttl: INVITATION_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sweep pending invitations as of `now`.
    ///
    /// Fails only when the candidate query itself fails; per-invitation update
    /// failures are logged and counted in `failed`.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<ExpirySummary, JobError> {
        let invitations = Collection::<Invitation>::new(self.store.as_ref());
        let criteria = Criteria::new().eq("status", InvitationStatus::Pending.as_str());
        let newest_first = Sort::desc("created_at");

        let pending = self
            .retrier
            .run(|| invitations.filter(&criteria, Some(&newest_first), Some(SCAN_LIMIT)))
            .await?;

        let mut summary = ExpirySummary {
            scanned: pending.len(),
            ..ExpirySummary::default()
        };

        for invitation in &pending {
            if invitation.age_at(now).is_none() {
                debug!(job = JOB, id = %invitation.id, "no usable created_at; skipping");
                summary.skipped += 1;
                continue;
            }
            if !invitation.is_expired(now, self.ttl) {
                continue;
            }

            let id = &invitation.id;
            let patch = fields("status", InvitationStatus::Declined.as_str());
            let declined = self
                .retrier
                .run(|| self.store.update(Invitation::NAME, id, patch.clone()))
                .await;

            match declined {
                Ok(_) => summary.cleaned += 1,
                Err(err) => {
                    summary.failed += 1;
                    warn!(job = JOB, id = %id, error = %err, "failed to decline invitation");
                }
            }
        }

        info!(
            job = JOB,
            scanned = summary.scanned,
            cleaned = summary.cleaned,
            skipped = summary.skipped,
            failed = summary.failed,
            "invitation sweep finished"
        );
        Ok(summary)
    }
}
