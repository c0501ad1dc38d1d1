//! Participant counter: per-tournament participant counts in bounded batches.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use boardkeep_core::{Participant, TournamentId};
use boardkeep_resilience::{Retrier, RetryPolicy};
use futures::future::join_all;
use serde_json::{Number, Value};
use tracing::{debug, warn};

use super::store_retrier;
use crate::store::{Collection, Criteria, EntityStore, StoreError};

/// Concurrency ceiling: ids counted at once. Batches run one after another.
pub const COUNT_BATCH_SIZE: usize = 10;

const JOB: &str = "countParticipants";

pub struct ParticipantCounter {
    store: Arc<dyn EntityStore>,
    retrier: Retrier<StoreError>,
}

impl ParticipantCounter {
    pub fn new(store: Arc<dyn EntityStore>, policy: RetryPolicy) -> Self {
        Self {
            store,
            retrier: store_retrier(JOB, policy),
        }
    }

    /// Count participants for each distinct id. Never fails: an id whose
    /// query fails counts as 0.
    pub async fn count(&self, ids: &[TournamentId]) -> BTreeMap<TournamentId, u64> {
        let mut seen = HashSet::new();
        let ids: Vec<&TournamentId> = ids.iter().filter(|id| seen.insert(*id)).collect();

        let mut counts = BTreeMap::new();
        for batch in ids.chunks(COUNT_BATCH_SIZE) {
            let results = join_all(batch.iter().map(|id| self.count_one(id))).await;
            counts.extend(batch.iter().map(|id| (*id).clone()).zip(results));
        }
        counts
    }

    async fn count_one(&self, tournament: &TournamentId) -> u64 {
        let participants = Collection::<Participant>::new(self.store.as_ref());
        let criteria = Criteria::new().eq("tournament_id", tournament.as_str());
        let found = self
            .retrier
            .run(|| participants.filter(&criteria, None, None))
            .await;

        match found {
            Ok(participants) => participants
                .iter()
                .filter(|p| p.tournament_id.as_ref() == Some(tournament))
                .count() as u64,
            Err(err) => {
                warn!(job = JOB, tournament_id = %tournament, error = %err, "participant count failed; reporting 0");
                0
            }
        }
    }
}

/// Tournament ids from a `{ "ids": [...] }` body, deduplicated in order.
///
/// Non-empty strings are kept and non-zero numbers are stringified; anything
/// else is dropped. A missing or non-array `ids` yields nothing.
pub fn ids_from_request(body: &Value) -> Vec<TournamentId> {
    let Some(raw) = body.get("ids").and_then(Value::as_array) else {
        debug!(job = JOB, "request has no id list");
        return Vec::new();
    };

    let mut ids: Vec<TournamentId> = Vec::with_capacity(raw.len());
    for value in raw {
        let id = match value {
            Value::String(s) => TournamentId::new(s.as_str()).ok(),
            Value::Number(n) => number_id(n),
            _ => None,
        };
        if let Some(id) = id {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}

/// Integral numbers print without a fraction (`7.0` → `"7"`); zero and
/// non-finite values are not ids.
fn number_id(n: &Number) -> Option<TournamentId> {
    let raw = if let Some(i) = n.as_i64() {
        (i != 0).then(|| i.to_string())?
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        let f = n.as_f64().filter(|f| f.is_finite() && *f != 0.0)?;
        if f.fract() == 0.0 && f.abs() < 9.007_199_254_740_992e15 {
            (f as i64).to_string()
        } else {
            f.to_string()
        }
    };
    TournamentId::new(raw).ok()
}
