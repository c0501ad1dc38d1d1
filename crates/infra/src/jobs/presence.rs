//! Presence updater: stamps `last_seen = now` on named users.
//!
//! Last-write-wins; concurrent runs racing on the same user are harmless.

use std::sync::Arc;

use boardkeep_core::{Entity, RecordId, UserPresence};
use boardkeep_resilience::{Retrier, RetryPolicy};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::{store_retrier, JobError};
use crate::store::{fields, Collection, EntityStore, Sort, StoreError};

/// Most recently seen users scanned per run.
pub const USER_SCAN_LIMIT: usize = 1000;

const JOB: &str = "updateUserPresence";

/// A user whose `last_seen` was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TouchedUser {
    pub id: RecordId,
    pub username: String,
    pub last_seen: String,
}

/// Result of the set variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PresenceReport {
    /// Stored usernames that were updated.
    pub updated: Vec<String>,
    /// Targets with no matching user, as requested.
    #[serde(rename = "notFound")]
    pub not_found: Vec<String>,
    /// Matched users whose update failed.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<String>,
}

pub struct PresenceUpdater {
    store: Arc<dyn EntityStore>,
    retrier: Retrier<StoreError>,
}

impl PresenceUpdater {
    pub fn new(store: Arc<dyn EntityStore>, policy: RetryPolicy) -> Self {
        Self {
            store,
            retrier: store_retrier(JOB, policy),
        }
    }

    /// Touch the first user whose username matches `username` (any case).
    pub async fn touch_user(&self, username: &str, now: DateTime<Utc>) -> Result<TouchedUser, JobError> {
        let key = username.to_lowercase();
        let user = self
            .recent_users()
            .await?
            .into_iter()
            .find(|u| u.username_key() == key)
            .ok_or_else(|| JobError::UserNotFound(username.to_string()))?;

        let last_seen = presence_timestamp(now);
        self.write_last_seen(&user.id, &last_seen).await?;

        info!(job = JOB, id = %user.id, username = %user.username, "presence updated");
        Ok(TouchedUser {
            id: user.id,
            username: user.username,
            last_seen,
        })
    }

    /// Touch every user matching one of `targets`.
    ///
    /// Each target is consumed by its first match, so duplicate usernames in
    /// the store are updated once. Unmatched targets land in `not_found` in
    /// input order.
    pub async fn touch_users(&self, targets: &[String], now: DateTime<Utc>) -> Result<PresenceReport, JobError> {
        let mut pending: Vec<&str> = Vec::with_capacity(targets.len());
        for target in targets.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
            let key = target.to_lowercase();
            if !pending.iter().any(|p| p.to_lowercase() == key) {
                pending.push(target);
            }
        }

        let mut report = PresenceReport::default();
        if pending.is_empty() {
            return Ok(report);
        }

        let users = self.recent_users().await?;
        let last_seen = presence_timestamp(now);

        for user in users {
            let key = user.username_key();
            let Some(pos) = pending.iter().position(|t| t.to_lowercase() == key) else {
                continue;
            };
            pending.remove(pos);

            match self.write_last_seen(&user.id, &last_seen).await {
                Ok(()) => report.updated.push(user.username),
                Err(err) => {
                    warn!(job = JOB, id = %user.id, username = %user.username, error = %err, "presence update failed");
                    report.failed.push(user.username);
                }
            }

            if pending.is_empty() {
                break;
            }
        }

        report.not_found = pending.into_iter().map(str::to_string).collect();
        info!(
            job = JOB,
            updated = report.updated.len(),
            not_found = report.not_found.len(),
            failed = report.failed.len(),
            "presence sweep finished"
        );
        Ok(report)
    }

    async fn recent_users(&self) -> Result<Vec<UserPresence>, JobError> {
        let users = Collection::<UserPresence>::new(self.store.as_ref());
        let most_recent = Sort::desc("last_seen");
        Ok(self
            .retrier
            .run(|| users.list(Some(&most_recent), Some(USER_SCAN_LIMIT)))
            .await?)
    }

    async fn write_last_seen(&self, id: &RecordId, last_seen: &str) -> Result<(), JobError> {
        let patch = fields("last_seen", last_seen);
        self.retrier
            .run(|| self.store.update(UserPresence::NAME, id, patch.clone()))
            .await?;
        Ok(())
    }
}

/// `last_seen` wire format: RFC 3339, millisecond precision, `Z` suffix.
pub fn presence_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}
